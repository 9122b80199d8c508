//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{EventBus, InMemoryBank, PartyId, RepaymentPolicy};
use crate::service::LedgerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ledger service for all business logic.
    pub ledger_service: Arc<LedgerService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Bank handle for the credit endpoint; `None` disables it.
    pub faucet: Option<Arc<InMemoryBank>>,
}

impl AppState {
    /// Wires a ledger backed by an [`InMemoryBank`].
    #[must_use]
    pub fn in_memory(
        owner: PartyId,
        repayment_policy: RepaymentPolicy,
        event_bus_capacity: usize,
        faucet_enabled: bool,
    ) -> Self {
        let bank = Arc::new(InMemoryBank::new());
        let event_bus = EventBus::new(event_bus_capacity);
        let ledger_service = Arc::new(LedgerService::new(
            owner,
            Arc::<InMemoryBank>::clone(&bank),
            event_bus.clone(),
            repayment_policy,
        ));
        Self {
            ledger_service,
            event_bus,
            faucet: faucet_enabled.then_some(bank),
        }
    }
}

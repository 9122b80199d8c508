//! Service layer: business logic orchestration.
//!
//! [`LedgerService`] turns the domain types into atomic escrow operations
//! and emits events through the [`super::domain::EventBus`].

pub mod ledger_service;

pub use ledger_service::{LedgerService, LedgerSummary};

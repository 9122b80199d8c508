//! Domain layer: identities, ledger accounting, mortgage state machine,
//! value transfer and the event system.
//!
//! Nothing in this module performs I/O. The service layer composes these
//! types into atomic ledger operations.

pub mod event_bus;
pub mod ledger_event;
pub mod mortgage;
pub mod mortgage_id;
pub mod mortgage_registry;
pub mod party_id;
pub mod pool;
pub mod transfer;

pub use event_bus::EventBus;
pub use ledger_event::LedgerEvent;
pub use mortgage::{Mortgage, MortgageState, MortgageTerms, RepaymentPolicy};
pub use mortgage_id::MortgageId;
pub use mortgage_registry::MortgageRegistry;
pub use party_id::PartyId;
pub use pool::Pool;
pub use transfer::{Account, InMemoryBank, Transfer, TransferBatch, TransferError, ValueTransfer};

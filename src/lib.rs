//! # loanpool-gateway
//!
//! REST API and WebSocket gateway for a pooled-capital mortgage escrow
//! ledger.
//!
//! Lenders contribute capital to a shared pool. Borrowers apply for
//! mortgages naming a deposit, a loan amount and a vendor. The ledger
//! owner approves or rejects applications. When the borrower sends the
//! exact deposit, the deposit and the loan capital are paid to the vendor
//! in one all-or-nothing step; repayments then flow back into the pool
//! until the loan is cleared.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LedgerService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Pool + MortgageRegistry (domain/)
//!     └── ValueTransfer / InMemoryBank (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

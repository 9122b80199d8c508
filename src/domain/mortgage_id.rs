//! Type-safe mortgage identifier.
//!
//! [`MortgageId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! mortgage identifiers cannot be confused with party identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a mortgage application.
///
/// Generated once by the ledger when a borrower applies and returned to
/// the caller; it is the only handle through which the mortgage is
/// approved, funded and repaid afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct MortgageId(uuid::Uuid);

impl MortgageId {
    /// Creates a new random `MortgageId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `MortgageId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for MortgageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MortgageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for MortgageId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<MortgageId> for uuid::Uuid {
    fn from(id: MortgageId) -> Self {
        id.0
    }
}

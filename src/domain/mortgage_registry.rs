//! Concurrent mortgage storage with per-mortgage locking.
//!
//! [`MortgageRegistry`] stores every mortgage created by the ledger in a
//! `HashMap` where each entry is individually protected by a
//! [`tokio::sync::RwLock`]. Operations on distinct mortgages never contend
//! on the same entry lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::MortgageId;
use super::mortgage::{Mortgage, MortgageState};
use crate::error::EscrowError;

/// Central store for all mortgages created by the ledger.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<Mortgage>>` for fine-grained per-mortgage locking.
#[derive(Debug)]
pub struct MortgageRegistry {
    mortgages: RwLock<HashMap<MortgageId, Arc<RwLock<Mortgage>>>>,
}

impl MortgageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mortgages: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a newly created mortgage.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::Internal`] if a mortgage with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, mortgage: Mortgage) -> Result<MortgageId, EscrowError> {
        let id = mortgage.id();
        let mut map = self.mortgages.write().await;
        if map.contains_key(&id) {
            return Err(EscrowError::Internal(format!("mortgage {id} already exists")));
        }
        map.insert(id, Arc::new(RwLock::new(mortgage)));
        Ok(id)
    }

    /// Returns the mortgage behind its per-mortgage lock.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::MortgageNotFound`] if no mortgage with the
    /// given ID exists.
    pub async fn get(&self, id: MortgageId) -> Result<Arc<RwLock<Mortgage>>, EscrowError> {
        let map = self.mortgages.read().await;
        map.get(&id).cloned().ok_or(EscrowError::MortgageNotFound(id))
    }

    /// Returns `true` if the ledger created a mortgage with this ID.
    pub async fn contains(&self, id: MortgageId) -> bool {
        self.mortgages.read().await.contains_key(&id)
    }

    /// Returns snapshots of all mortgages, oldest application first,
    /// optionally filtered by state.
    pub async fn list(&self, state_filter: Option<MortgageState>) -> Vec<Mortgage> {
        let map = self.mortgages.read().await;
        let mut snapshots = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let mortgage = entry_lock.read().await;
            if let Some(filter) = state_filter
                && mortgage.state() != filter
            {
                continue;
            }
            snapshots.push(mortgage.clone());
        }
        snapshots.sort_by_key(Mortgage::created_at);
        snapshots
    }

    /// Returns the number of mortgages in the registry.
    pub async fn len(&self) -> usize {
        self.mortgages.read().await.len()
    }

    /// Returns `true` if the registry contains no mortgages.
    pub async fn is_empty(&self) -> bool {
        self.mortgages.read().await.is_empty()
    }
}

impl Default for MortgageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

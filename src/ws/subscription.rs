//! Per-connection subscription manager.
//!
//! Tracks which mortgages a WebSocket client follows and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::MortgageId;

/// Manages the set of mortgage subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed mortgages. Ignored while `subscribe_all` is set.
    mortgage_ids: HashSet<MortgageId>,
    /// Wildcard `"*"`: every mortgage plus ledger-level events.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds mortgages to the subscription set and optionally enables the
    /// wildcard.
    pub fn subscribe(&mut self, ids: &[MortgageId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.mortgage_ids.extend(ids.iter().copied());
    }

    /// Removes mortgages from the subscription set. `wildcard` turns the
    /// wildcard off.
    pub fn unsubscribe(&mut self, ids: &[MortgageId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.mortgage_ids.remove(id);
        }
    }

    /// Returns `true` if an event about `mortgage_id` should be delivered.
    /// Events that concern no mortgage reach wildcard subscribers only.
    #[must_use]
    pub fn matches(&self, mortgage_id: Option<MortgageId>) -> bool {
        self.subscribe_all || mortgage_id.is_some_and(|id| self.mortgage_ids.contains(&id))
    }

    /// Returns the number of explicitly subscribed mortgages.
    #[must_use]
    pub fn count(&self) -> usize {
        self.mortgage_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub const fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

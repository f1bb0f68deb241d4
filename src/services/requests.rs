// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cancellable view requests.
//!
//! A view starts at most one request per key. Starting a new one cancels the
//! previous request, and a request's result is only handed back if it is still
//! the current one when it finishes.

use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Which view a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    ActivityList,
    ActivityDetails,
}

struct Slot {
    id: u64,
    cancel: CancellationToken,
}

/// Handle for one started request.
#[derive(Debug, Clone)]
pub struct RequestTicket<K> {
    key: K,
    id: u64,
    cancel: CancellationToken,
}

impl<K> RequestTicket<K> {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Tracks the live request per key.
pub struct RequestTracker<K> {
    slots: DashMap<K, Slot>,
    next_id: AtomicU64,
}

impl<K: Eq + Hash + Clone> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<K: Eq + Hash + Clone + std::fmt::Debug> RequestTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `key`, cancelling the one it supersedes.
    pub fn begin(&self, key: K) -> RequestTicket<K> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let previous = self.slots.insert(
            key.clone(),
            Slot {
                id,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(key = ?key, superseded = previous.id, "Cancelling superseded request");
            previous.cancel.cancel();
        }

        RequestTicket { key, id, cancel }
    }

    /// Finish a request. Returns whether it was still current.
    pub fn finish(&self, ticket: &RequestTicket<K>) -> bool {
        !ticket.is_cancelled()
            && self
                .slots
                .remove_if(&ticket.key, |_, slot| slot.id == ticket.id)
                .is_some()
    }

    /// Cancel whatever is in flight for `key` (the view went away).
    pub fn cancel(&self, key: &K) {
        if let Some((_, slot)) = self.slots.remove(key) {
            slot.cancel.cancel();
        }
    }

    pub fn in_flight(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Run `fut` as the current request for `key`.
    ///
    /// Returns `None` if the request was superseded or cancelled before it
    /// completed; its result is dropped.
    pub async fn run<F, T>(&self, key: K, fut: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin(key);

        let output = tokio::select! {
            _ = ticket.cancel.cancelled() => None,
            value = fut => Some(value),
        };

        let current = self.finish(&ticket);
        match output {
            Some(value) if current => Some(value),
            _ => {
                tracing::debug!(key = ?ticket.key, request = ticket.id, "Discarding superseded request result");
                None
            }
        }
    }
}

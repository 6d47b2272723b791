// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-actor pending workflow state.
//!
//! Multi-step flows (registering an occupant, confirming an amount) park a
//! pending state under the actor's id between turns. Absence of an entry is
//! the idle state. Entries expire lazily after the configured TTL, so an
//! abandoned prompt from yesterday cannot swallow today's unrelated input.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// What an awaited amount will be applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmTarget {
    /// A forwarded proof submission; the occupant is resolved from the
    /// sender's identity at confirmation time.
    Proof { submission_id: i64, sender_id: i64 },
    /// A directly chosen occupant.
    Occupant { id: i64 },
}

/// Pending state of one actor's multi-step flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    /// Occupant was told how to pay and may send a receipt image next.
    AwaitingProof,
    /// Admin is registering an occupant into `room`; the next text is the name.
    AwaitingOccupantName { room: u32 },
    /// Name captured; the next text is the contact (numeric id or handle).
    AwaitingOccupantContact { room: u32, name: String },
    /// The next text is a payment amount for `target`.
    AwaitingAmount { target: ConfirmTarget },
    /// The next text replaces the daily price setting.
    AwaitingPrice,
    /// The next text replaces the payment card setting.
    AwaitingCard,
}

struct Entry {
    state: PendingState,
    set_at: Instant,
}

/// Concurrent map of actor id to pending state.
pub struct SessionMap {
    inner: Mutex<HashMap<i64, Entry>>,
    ttl: Duration,
}

impl SessionMap {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Park a pending state for an actor, replacing any previous one.
    pub async fn set(&self, actor_id: i64, state: PendingState) {
        let mut map = self.inner.lock().await;
        map.insert(
            actor_id,
            Entry {
                state,
                set_at: Instant::now(),
            },
        );
    }

    /// Remove and return the actor's pending state. Expired entries are
    /// dropped as if they never existed.
    pub async fn take(&self, actor_id: i64) -> Option<PendingState> {
        let mut map = self.inner.lock().await;
        let entry = map.remove(&actor_id)?;
        if entry.set_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.state)
    }

    /// Drop the actor's pending state, if any.
    pub async fn clear(&self, actor_id: i64) {
        let mut map = self.inner.lock().await;
        map.remove(&actor_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn take_removes_the_entry() {
        let map = SessionMap::new(Duration::from_secs(3600));
        map.set(1, PendingState::AwaitingProof).await;
        assert_eq!(map.take(1).await, Some(PendingState::AwaitingProof));
        assert_eq!(map.take(1).await, None);
    }

    #[tokio::test]
    async fn actors_are_isolated() {
        let map = SessionMap::new(Duration::from_secs(3600));
        map.set(1, PendingState::AwaitingOccupantName { room: 3 }).await;
        map.set(
            2,
            PendingState::AwaitingAmount {
                target: ConfirmTarget::Occupant { id: 9 },
            },
        )
        .await;

        assert_eq!(
            map.take(1).await,
            Some(PendingState::AwaitingOccupantName { room: 3 })
        );
        assert_eq!(
            map.take(2).await,
            Some(PendingState::AwaitingAmount {
                target: ConfirmTarget::Occupant { id: 9 },
            })
        );
    }

    #[tokio::test]
    async fn set_replaces_previous_state() {
        let map = SessionMap::new(Duration::from_secs(3600));
        map.set(1, PendingState::AwaitingProof).await;
        map.set(1, PendingState::AwaitingPrice).await;
        assert_eq!(map.take(1).await, Some(PendingState::AwaitingPrice));
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let map = SessionMap::new(Duration::ZERO);
        map.set(1, PendingState::AwaitingProof).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(map.take(1).await, None);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let map = SessionMap::new(Duration::from_secs(3600));
        map.set(1, PendingState::AwaitingCard).await;
        map.clear(1).await;
        map.clear(1).await;
        assert_eq!(map.take(1).await, None);
    }
}

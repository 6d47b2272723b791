// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room numbering, capacity policy, and remaining-time arithmetic.

use chrono::{DateTime, Utc};
use rentio_config::model::TenancyConfig;
use rentio_core::types::Occupant;

/// Static room layout and capacity rules, taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RoomPolicy {
    room_count: u32,
    room_limit: u32,
}

impl RoomPolicy {
    pub fn new(config: &TenancyConfig) -> Self {
        Self {
            room_count: config.room_count,
            room_limit: config.room_limit,
        }
    }

    /// Rooms are numbered 1 through `room_count`.
    pub fn valid_room(&self, room: u32) -> bool {
        (1..=self.room_count).contains(&room)
    }

    pub fn room_count(&self) -> u32 {
        self.room_count
    }

    /// Maximum occupants per room, passed to the storage layer so the
    /// capacity check shares the registration transaction.
    pub fn room_limit(&self) -> u32 {
        self.room_limit
    }
}

/// Signed whole days and leftover hours until `paid_until`.
///
/// Negative values mean the stay lapsed that long ago. Both components
/// truncate toward zero, so 2 days 23 hours remaining reports as `(2, 23)`.
pub fn days_remaining(paid_until: DateTime<Utc>, now: DateTime<Utc>) -> (i64, i64) {
    let delta = paid_until - now;
    let days = delta.num_days();
    let hours = delta.num_hours() - days * 24;
    (days, hours)
}

/// Whether an occupant's remaining days put them in the warning window.
pub fn expiring_soon(days_left: i64, threshold_days: i64) -> bool {
    days_left <= threshold_days
}

/// Human-oriented remaining-time line for one occupant, used in room
/// detail views. Occupants with no payment period yet report `None`.
pub fn remaining_for(occupant: &Occupant, now: DateTime<Utc>) -> Option<(i64, i64)> {
    occupant.paid_until_ts().map(|until| days_remaining(until, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn policy() -> RoomPolicy {
        RoomPolicy {
            room_count: 24,
            room_limit: 4,
        }
    }

    #[test]
    fn rooms_are_one_indexed() {
        let p = policy();
        assert!(!p.valid_room(0));
        assert!(p.valid_room(1));
        assert!(p.valid_room(24));
        assert!(!p.valid_room(25));
    }

    #[test]
    fn remaining_splits_days_and_hours() {
        let now = Utc::now();
        let until = now + Duration::days(2) + Duration::hours(23);
        assert_eq!(days_remaining(until, now), (2, 23));
    }

    #[test]
    fn remaining_is_negative_after_lapse() {
        let now = Utc::now();
        let until = now - Duration::days(1) - Duration::hours(6);
        let (days, hours) = days_remaining(until, now);
        assert_eq!(days, -1);
        assert_eq!(hours, -6);
    }

    #[test]
    fn exactly_now_is_zero() {
        let now = Utc::now();
        assert_eq!(days_remaining(now, now), (0, 0));
    }

    #[test]
    fn warning_window_includes_threshold_and_below() {
        assert!(expiring_soon(3, 3));
        assert!(expiring_soon(0, 3));
        assert!(expiring_soon(-2, 3));
        assert!(!expiring_soon(4, 3));
    }
}

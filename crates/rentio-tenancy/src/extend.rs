// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paid-until date extension.
//!
//! A confirmed amount buys stay time at the daily price, with sub-day
//! precision: half the daily price buys twelve hours. The extension base is
//! the current paid-until date when it lies in the future, otherwise the
//! confirmation instant, so an expired occupant never gets credit for the
//! lapsed gap.

use chrono::{DateTime, Duration, Utc};
use rentio_core::RentioError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Compute the new paid-until instant after confirming `amount`.
///
/// The result is strictly later than both `now` and the previous
/// paid-until date; paid-until only ever moves forward.
pub fn extend_paid_until(
    paid_until: Option<DateTime<Utc>>,
    amount: i64,
    price_per_day: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, RentioError> {
    if amount <= 0 {
        return Err(RentioError::InvalidAmount {
            reason: format!("amount must be positive, got {amount}"),
        });
    }
    if price_per_day <= 0 {
        return Err(RentioError::InvalidAmount {
            reason: format!("price_per_day must be positive, got {price_per_day}"),
        });
    }

    let base = match paid_until {
        Some(until) if until > now => until,
        _ => now,
    };
    let seconds = (amount as f64 / price_per_day as f64 * SECONDS_PER_DAY).round() as i64;
    let bought = Duration::try_seconds(seconds).ok_or_else(|| RentioError::InvalidAmount {
        reason: format!("amount {amount} buys more time than a date can hold"),
    })?;
    base.checked_add_signed(bought)
        .ok_or_else(|| RentioError::InvalidAmount {
            reason: format!("amount {amount} buys more time than a date can hold"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    const PRICE: i64 = 26_666;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn first_payment_starts_from_now() {
        let now = at("2026-08-27T12:00:00Z");
        let result = extend_paid_until(None, PRICE, PRICE, now).unwrap();
        assert_eq!(result, now + Duration::days(1));
    }

    #[test]
    fn future_paid_until_is_the_extension_base() {
        let now = at("2026-08-27T12:00:00Z");
        let until = now + Duration::days(5);
        let result = extend_paid_until(Some(until), 2 * PRICE, PRICE, now).unwrap();
        assert_eq!(result, now + Duration::days(7));
    }

    #[test]
    fn expired_occupant_gets_no_credit_for_the_gap() {
        let now = at("2026-08-27T12:00:00Z");
        let lapsed = now - Duration::days(2);
        let result = extend_paid_until(Some(lapsed), PRICE, PRICE, now).unwrap();
        assert_eq!(result, now + Duration::days(1));
    }

    #[test]
    fn partial_amount_buys_partial_day() {
        let now = at("2026-08-27T00:00:00Z");
        let result = extend_paid_until(None, PRICE / 2, PRICE, now).unwrap();
        // 13333 / 26666 of a day, rounded to whole seconds.
        let expected_secs = (13_333.0 / 26_666.0 * 86_400.0_f64).round() as i64;
        assert_eq!(result, now + Duration::seconds(expected_secs));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let now = Utc::now();
        let err = extend_paid_until(None, 0, PRICE, now).unwrap_err();
        assert!(matches!(err, RentioError::InvalidAmount { .. }));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let now = Utc::now();
        let err = extend_paid_until(None, -100, PRICE, now).unwrap_err();
        assert!(matches!(err, RentioError::InvalidAmount { .. }));
    }

    #[test]
    fn astronomical_amount_is_rejected_not_panicking() {
        let now = Utc::now();
        // Exceeds the representable duration range at the default price.
        let err = extend_paid_until(None, 3_000_000_000_000_000, PRICE, now).unwrap_err();
        assert!(matches!(err, RentioError::InvalidAmount { .. }));

        let err = extend_paid_until(None, i64::MAX, 1, now).unwrap_err();
        assert!(matches!(err, RentioError::InvalidAmount { .. }));

        // Fits in a duration but lands past the last representable date.
        let err = extend_paid_until(None, 3_000_000_000_000, PRICE, now).unwrap_err();
        assert!(matches!(err, RentioError::InvalidAmount { .. }));
    }

    #[test]
    fn nonpositive_price_is_rejected() {
        let now = Utc::now();
        let err = extend_paid_until(None, 100, 0, now).unwrap_err();
        assert!(matches!(err, RentioError::InvalidAmount { .. }));
    }

    proptest! {
        #[test]
        fn extension_always_moves_forward(
            amount in 1i64..10_000_000,
            offset_days in -30i64..30,
        ) {
            let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
            let until = Some(now + Duration::days(offset_days));
            let result = extend_paid_until(until, amount, PRICE, now).unwrap();
            prop_assert!(result > now);
            if let Some(u) = until {
                prop_assert!(result > u);
            }
        }

        #[test]
        fn larger_amount_buys_later_date(
            amount in 1i64..10_000_000,
            extra in 1i64..1_000_000,
        ) {
            let now = Utc.with_ymd_and_hms(2026, 8, 27, 12, 0, 0).unwrap();
            let small = extend_paid_until(None, amount, PRICE, now).unwrap();
            let large = extend_paid_until(None, amount + extra, PRICE, now).unwrap();
            prop_assert!(large >= small);
        }
    }
}

// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic income reports delivered to admins.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rentio_core::types::{Contact, Notification};
use rentio_core::{ChannelAdapter, RentioError, StorageAdapter};
use tracing::info;

/// The `YYYY-MM` key for the month the given instant falls in.
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// The `YYYY-MM` key for the month before the given instant.
pub fn previous_month_key(at: DateTime<Utc>) -> String {
    let (year, month) = if at.month() == 1 {
        (at.year() - 1, 12)
    } else {
        (at.year(), at.month() - 1)
    };
    format!("{year:04}-{month:02}")
}

/// Render the income summary for one month.
pub async fn render_month_report(
    storage: &Arc<dyn StorageAdapter>,
    year_month: &str,
) -> Result<String, RentioError> {
    let month_total = storage.monthly_income(year_month).await?;
    let rooms = storage.room_income().await?;

    let mut lines = vec![format!("Income report for {year_month}")];
    for (room, total) in &rooms {
        lines.push(format!("Room {room}: {total}"));
    }
    let all_time: i64 = rooms.iter().map(|(_, total)| total).sum();
    lines.push(format!("This month: {month_total}"));
    lines.push(format!("All time: {all_time}"));
    Ok(lines.join("\n"))
}

/// Send the month's income summary to every admin.
///
/// Returns the number of admins the report was delivered to.
pub async fn send_month_report(
    storage: &Arc<dyn StorageAdapter>,
    channel: &Arc<dyn ChannelAdapter>,
    year_month: &str,
) -> Result<usize, RentioError> {
    let text = render_month_report(storage, year_month).await?;
    let admins = storage.list_admins().await?;
    for admin in &admins {
        channel
            .send(Notification::text(Contact::UserId(*admin), text.clone()))
            .await?;
    }
    info!(year_month, recipients = admins.len(), "month report sent");
    Ok(admins.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rentio_core::types::{format_ts, NewOccupant};
    use rentio_test_utils::{temp_storage, MockChannel};

    #[test]
    fn month_keys_are_zero_padded() {
        let march = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(month_key(march), "2026-03");
        assert_eq!(previous_month_key(march), "2026-02");
    }

    #[test]
    fn previous_month_wraps_the_year() {
        let january = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 5).unwrap();
        assert_eq!(previous_month_key(january), "2025-12");
    }

    #[tokio::test]
    async fn report_reaches_every_admin() {
        let (storage, _dir) = temp_storage().await;
        let mock = Arc::new(MockChannel::new());
        let channel = mock.clone() as Arc<dyn ChannelAdapter>;
        storage.ensure_first_admin(10).await.unwrap();

        let now = Utc::now();
        let id = storage
            .create_occupant(
                &NewOccupant {
                    room: 2,
                    name: "payer".to_string(),
                    contact: Contact::UserId(55),
                    phone: None,
                    document_ref: None,
                },
                8,
            )
            .await
            .unwrap();
        storage
            .apply_payment(id, 80_000, &format_ts(now), &format_ts(now))
            .await
            .unwrap();

        let sent_to = send_month_report(&storage, &channel, &month_key(now))
            .await
            .unwrap();
        assert_eq!(sent_to, 1);

        let sent = mock.sent_notifications().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, Contact::UserId(10));
        assert!(sent[0].text.contains("Room 2: 80000"), "got: {}", sent[0].text);
        assert!(sent[0].text.contains("This month: 80000"));
    }
}

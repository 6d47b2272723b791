// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Rentio workspace.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a delivered channel message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a [`crate::PluginAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// Canonical timestamp format used in storage and notifications.
///
/// RFC 3339 UTC with millisecond precision, matching SQLite's
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`.
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp back into a UTC instant.
pub fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// External contact identity of a person.
///
/// A person may be referenced by a textual handle (e.g. `@ali`) before their
/// numeric platform identity is known; the two are mutually exclusive in any
/// one record and reconciled one-way via
/// [`crate::StorageAdapter::bind_contact_if_unbound`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contact {
    /// Concrete numeric platform identity.
    UserId(i64),
    /// Textual handle, stored lowercase without the `@` prefix.
    Handle(String),
}

impl Contact {
    /// Parse admin input into a contact: all-digit input becomes a numeric
    /// identity, anything else a normalized handle.
    pub fn parse(input: &str) -> Option<Contact> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(id) = trimmed.parse::<i64>() {
            return Some(Contact::UserId(id));
        }
        let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if handle.is_empty() {
            return None;
        }
        Some(Contact::Handle(handle.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contact::UserId(id) => write!(f, "{id}"),
            Contact::Handle(h) => write!(f, "@{h}"),
        }
    }
}

/// Reference to the external actor behind an inbound interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    /// Numeric platform identity of the actor.
    pub id: i64,
    /// Textual handle, when the platform exposes one. Used for one-way
    /// handle-to-id reconciliation of occupant contacts.
    pub handle: Option<String>,
}

impl ActorRef {
    pub fn new(id: i64) -> Self {
        Self { id, handle: None }
    }

    pub fn with_handle(id: i64, handle: impl Into<String>) -> Self {
        Self {
            id,
            handle: Some(handle.into()),
        }
    }
}

/// A typed inbound intent delivered by a channel adapter.
///
/// The core never parses raw transport payloads; the adapter translates
/// platform updates into one of these variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Actor opened or reset their session.
    StartSession { actor: ActorRef },
    /// Free-form text input (names, amounts, settings values).
    SubmitText { actor: ActorRef, text: String },
    /// An image was submitted; `image_ref` is an opaque transport file reference.
    SubmitImage { actor: ActorRef, image_ref: String },
    /// A presented choice was selected.
    SelectOption { actor: ActorRef, option_id: String },
}

impl Intent {
    /// The actor that produced this intent.
    pub fn actor(&self) -> &ActorRef {
        match self {
            Intent::StartSession { actor }
            | Intent::SubmitText { actor, .. }
            | Intent::SubmitImage { actor, .. }
            | Intent::SelectOption { actor, .. } => actor,
        }
    }
}

/// A selectable choice attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Opaque option id echoed back in [`Intent::SelectOption`].
    pub id: String,
    /// Human-readable label.
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// An outbound notification emitted by the core.
///
/// Delivery and formatting are the channel adapter's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// External identity to deliver to.
    pub target: Contact,
    /// Message body.
    pub text: String,
    /// Optional image to attach (opaque transport file reference).
    pub image_ref: Option<String>,
    /// Optional choices rendered as buttons by capable transports.
    pub choices: Vec<Choice>,
}

impl Notification {
    pub fn text(target: Contact, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            image_ref: None,
            choices: Vec::new(),
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }
}

/// A person currently assigned to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: i64,
    pub room: u32,
    pub name: String,
    /// Numeric contact identity; mutually exclusive with `handle`.
    pub user_id: Option<i64>,
    /// Textual contact handle (lowercase, no `@`); mutually exclusive with `user_id`.
    pub handle: Option<String>,
    pub phone: Option<String>,
    /// Opaque reference to an identity-document image.
    pub document_ref: Option<String>,
    /// Timestamp through which the stay is paid; `None` means no active
    /// payment period yet. Only ever moves forward.
    pub paid_until: Option<String>,
    /// Cache of the ledger sum for this occupant; monotonically non-decreasing.
    pub accrued_total: i64,
    pub created_at: String,
}

impl Occupant {
    /// The occupant's contact identity.
    pub fn contact(&self) -> Option<Contact> {
        match (self.user_id, &self.handle) {
            (Some(id), _) => Some(Contact::UserId(id)),
            (None, Some(h)) => Some(Contact::Handle(h.clone())),
            (None, None) => None,
        }
    }

    /// Parsed `paid_until` instant, if set and well-formed.
    pub fn paid_until_ts(&self) -> Option<DateTime<Utc>> {
        self.paid_until.as_deref().and_then(parse_ts)
    }
}

/// Fields for registering a new occupant.
#[derive(Debug, Clone)]
pub struct NewOccupant {
    pub room: u32,
    pub name: String,
    pub contact: Contact,
    pub phone: Option<String>,
    pub document_ref: Option<String>,
}

/// Partial update of mutable occupant profile fields.
///
/// `paid_until` and `accrued_total` are deliberately absent; those are only
/// touched by the ledger-extension path.
#[derive(Debug, Clone, Default)]
pub struct OccupantUpdate {
    pub name: Option<String>,
    pub contact: Option<Contact>,
    pub phone: Option<String>,
    pub document_ref: Option<String>,
}

/// An append-only confirmed payment fact. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub occupant_id: i64,
    /// Amount in the smallest currency unit; always positive.
    pub amount: i64,
    pub confirmed_at: String,
}

/// A submitted payment proof awaiting (or past) admin confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSubmission {
    pub id: i64,
    /// Numeric identity of the submitting actor.
    pub sender_id: i64,
    pub image_ref: String,
    pub submitted_at: String,
    /// Set once the proof has been confirmed; replays are rejected.
    pub consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_parse_numeric() {
        assert_eq!(Contact::parse("12345"), Some(Contact::UserId(12345)));
    }

    #[test]
    fn contact_parse_handle_strips_at_and_lowercases() {
        assert_eq!(
            Contact::parse("@Ali_Rent"),
            Some(Contact::Handle("ali_rent".into()))
        );
        assert_eq!(Contact::parse("ali"), Some(Contact::Handle("ali".into())));
    }

    #[test]
    fn contact_parse_rejects_empty() {
        assert_eq!(Contact::parse("   "), None);
        assert_eq!(Contact::parse("@"), None);
    }

    #[test]
    fn contact_display_roundtrips_through_parse() {
        let handle = Contact::Handle("ali".into());
        assert_eq!(Contact::parse(&handle.to_string()), Some(handle));
        let id = Contact::UserId(42);
        assert_eq!(Contact::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn timestamp_roundtrip() {
        let now = Utc::now();
        let formatted = format_ts(now);
        let parsed = parse_ts(&formatted).unwrap();
        assert!((now - parsed).num_milliseconds().abs() <= 1);
    }

    #[test]
    fn parse_ts_rejects_garbage() {
        assert!(parse_ts("not a time").is_none());
    }

    #[test]
    fn intent_actor_accessor() {
        let actor = ActorRef::with_handle(7, "ali");
        let intent = Intent::SubmitText {
            actor: actor.clone(),
            text: "hello".into(),
        };
        assert_eq!(intent.actor(), &actor);
    }

    #[test]
    fn occupant_contact_prefers_user_id() {
        let occ = Occupant {
            id: 1,
            room: 2,
            name: "Ali".into(),
            user_id: Some(100),
            handle: None,
            phone: None,
            document_ref: None,
            paid_until: None,
            accrued_total: 0,
            created_at: format_ts(Utc::now()),
        };
        assert_eq!(occ.contact(), Some(Contact::UserId(100)));
    }

    #[test]
    fn notification_builder() {
        let note = Notification::text(Contact::UserId(1), "hi")
            .with_image("file-123")
            .with_choices(vec![Choice::new("ok", "OK")]);
        assert_eq!(note.image_ref.as_deref(), Some("file-123"));
        assert_eq!(note.choices.len(), 1);
    }
}

// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent dispatch and the payment confirmation workflow.
//!
//! The engine is transport-agnostic: it consumes [`Intent`] values and
//! returns the [`Notification`]s to deliver. Admins drive a menu of rooms,
//! registrations, and settings; occupants submit receipt images that are
//! forwarded to every admin for confirmation.
//!
//! Role resolution is storage-backed: the first distinct caller of an empty
//! deployment is promoted to administrator, everyone else is treated as an
//! occupant.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rentio_config::model::RentioConfig;
use rentio_core::types::{
    format_ts, Choice, Contact, Intent, NewOccupant, Notification, Occupant,
};
use rentio_core::{ActorRef, RentioError, StorageAdapter};
use rentio_storage::queries::settings::{SETTING_PAYMENT_CARD, SETTING_PRICE_PER_DAY};
use rentio_tenancy::rooms::{days_remaining, expiring_soon, remaining_for, RoomPolicy};
use rentio_tenancy::PaymentLedger;
use tracing::{info, warn};

use crate::pending::{ConfirmTarget, PendingState, SessionMap};

// Stable option ids echoed back through SelectOption.
const OPT_ROOMS: &str = "rooms";
const OPT_REPORT: &str = "report";
const OPT_SET_PRICE: &str = "setprice";
const OPT_SET_CARD: &str = "setcard";
const OPT_CANCEL: &str = "cancel";

/// Transport-agnostic workflow engine.
pub struct WorkflowEngine {
    storage: Arc<dyn StorageAdapter>,
    ledger: PaymentLedger,
    policy: RoomPolicy,
    sessions: SessionMap,
    warning_threshold_days: i64,
}

impl WorkflowEngine {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: &RentioConfig) -> Self {
        let ledger = PaymentLedger::new(
            Arc::clone(&storage),
            config.tenancy.price_per_day as i64,
        );
        Self {
            storage,
            ledger,
            policy: RoomPolicy::new(&config.tenancy),
            sessions: SessionMap::new(Duration::from_secs(config.workflow.pending_ttl_secs)),
            warning_threshold_days: config.scanner.warning_threshold_days,
        }
    }

    /// Handle one inbound intent and return the notifications to deliver.
    pub async fn handle_intent(&self, intent: Intent) -> Result<Vec<Notification>, RentioError> {
        self.handle_intent_at(intent, Utc::now()).await
    }

    /// Like [`WorkflowEngine::handle_intent`] with an explicit clock, for tests.
    pub async fn handle_intent_at(
        &self,
        intent: Intent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        let actor = intent.actor().clone();

        // Any inbound interaction may resolve a handle-only contact to a
        // numeric identity.
        if let Some(handle) = &actor.handle {
            self.storage
                .bind_contact_if_unbound(handle, actor.id)
                .await?;
        }
        if self.storage.ensure_first_admin(actor.id).await? {
            info!(user_id = actor.id, "first contact promoted to administrator");
        }

        let result = if self.storage.is_admin(actor.id).await? {
            self.handle_admin(&actor, intent, now).await
        } else {
            self.handle_occupant(&actor, intent, now).await
        };

        // Domain rejections bounce back to the initiating actor; faults
        // propagate to the caller.
        match result {
            Err(e) if e.is_recoverable() => {
                warn!(user_id = actor.id, error = %e, "intent rejected");
                Ok(vec![Self::reply(actor.id, e.to_string())])
            }
            other => other,
        }
    }

    fn reply(actor_id: i64, text: impl Into<String>) -> Notification {
        Notification::text(Contact::UserId(actor_id), text)
    }

    // --- Occupant side ---

    async fn handle_occupant(
        &self,
        actor: &ActorRef,
        intent: Intent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        match intent {
            Intent::SubmitImage { image_ref, .. } => {
                self.sessions.take(actor.id).await;
                self.accept_proof(actor, &image_ref, now).await
            }
            // Anything else restates the payment instructions.
            _ => {
                self.sessions.set(actor.id, PendingState::AwaitingProof).await;
                let card = self.storage.get_setting(SETTING_PAYMENT_CARD).await?;
                let text = match card {
                    Some(card) => format!(
                        "Pay to card {card}, then send a photo of the receipt here."
                    ),
                    None => "Send a photo of your payment receipt here.".to_string(),
                };
                Ok(vec![Self::reply(actor.id, text)])
            }
        }
    }

    /// Record a submitted receipt image and forward it to every admin with
    /// a confirmation button.
    async fn accept_proof(
        &self,
        actor: &ActorRef,
        image_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        let submission_id = self
            .storage
            .record_proof(actor.id, image_ref, &format_ts(now))
            .await?;
        info!(user_id = actor.id, submission_id, "payment proof received");

        let sender = match self
            .storage
            .find_occupant_by_contact(&Contact::UserId(actor.id))
            .await?
        {
            Some(occ) => format!("{} (room {})", occ.name, occ.room),
            None => match &actor.handle {
                Some(h) => format!("@{h} ({})", actor.id),
                None => format!("unregistered sender {}", actor.id),
            },
        };

        let mut notes = vec![Self::reply(
            actor.id,
            "Receipt received. You will be notified once it is confirmed.",
        )];
        for admin in self.storage.list_admins().await? {
            notes.push(
                Notification::text(
                    Contact::UserId(admin),
                    format!("Payment receipt from {sender}."),
                )
                .with_image(image_ref)
                .with_choices(vec![Choice::new(
                    format!("ack:{submission_id}"),
                    "Confirm payment",
                )]),
            );
        }
        Ok(notes)
    }

    // --- Admin side ---

    async fn handle_admin(
        &self,
        actor: &ActorRef,
        intent: Intent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        match intent {
            Intent::StartSession { .. } | Intent::SubmitImage { .. } => {
                self.sessions.clear(actor.id).await;
                Ok(vec![self.main_menu(actor.id)])
            }
            Intent::SelectOption { option_id, .. } => {
                // A button press abandons whatever prompt was pending.
                self.sessions.clear(actor.id).await;
                self.handle_admin_option(actor, &option_id, now).await
            }
            Intent::SubmitText { text, .. } => {
                match self.sessions.take(actor.id).await {
                    Some(PendingState::AwaitingOccupantName { room }) => {
                        self.capture_name(actor, room, &text).await
                    }
                    Some(PendingState::AwaitingOccupantContact { room, name }) => {
                        self.capture_contact(actor, room, name, &text).await
                    }
                    Some(PendingState::AwaitingAmount { target }) => {
                        self.confirm_amount(actor, target, &text, now).await
                    }
                    Some(PendingState::AwaitingPrice) => {
                        self.capture_price(actor, &text).await
                    }
                    Some(PendingState::AwaitingCard) => self.capture_card(actor, &text).await,
                    Some(PendingState::AwaitingProof) | None => {
                        Ok(vec![self.main_menu(actor.id)])
                    }
                }
            }
        }
    }

    async fn handle_admin_option(
        &self,
        actor: &ActorRef,
        option_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        if option_id == OPT_ROOMS {
            return Ok(vec![self.room_grid(actor.id)]);
        }
        if option_id == OPT_REPORT {
            return self.month_report(actor, now).await;
        }
        if option_id == OPT_SET_PRICE {
            self.sessions.set(actor.id, PendingState::AwaitingPrice).await;
            let current = self.ledger.price_per_day().await?;
            return Ok(vec![Self::reply(
                actor.id,
                format!("Current price per day is {current}. Send the new price."),
            )]);
        }
        if option_id == OPT_SET_CARD {
            self.sessions.set(actor.id, PendingState::AwaitingCard).await;
            return Ok(vec![Self::reply(actor.id, "Send the new payment card number.")]);
        }
        if option_id == OPT_CANCEL {
            return Ok(vec![Self::reply(actor.id, "Cancelled.")]);
        }
        if let Some(room) = parse_suffix(option_id, "room:") {
            return self.room_detail(actor, room, now).await;
        }
        if let Some(room) = parse_suffix(option_id, "add:") {
            if !self.policy.valid_room(room) {
                return Err(RentioError::Internal(format!("invalid room {room}")));
            }
            self.sessions
                .set(actor.id, PendingState::AwaitingOccupantName { room })
                .await;
            return Ok(vec![Self::reply(
                actor.id,
                format!("Registering into room {room}. Send the occupant's name."),
            )]);
        }
        if let Some(id) = parse_suffix::<i64>(option_id, "rm:") {
            let occ = self.storage.get_occupant(id).await?;
            self.storage.delete_occupant(id).await?;
            info!(occupant_id = id, room = occ.room, "occupant removed");
            return Ok(vec![Self::reply(
                actor.id,
                format!("Removed {} from room {}.", occ.name, occ.room),
            )]);
        }
        if let Some(id) = parse_suffix::<i64>(option_id, "pay:") {
            let occ = self.storage.get_occupant(id).await?;
            self.sessions
                .set(
                    actor.id,
                    PendingState::AwaitingAmount {
                        target: ConfirmTarget::Occupant { id },
                    },
                )
                .await;
            return Ok(vec![Self::reply(
                actor.id,
                format!("Send the amount received from {}.", occ.name),
            )]);
        }
        if let Some(submission_id) = parse_suffix::<i64>(option_id, "ack:") {
            let proof = self.storage.get_proof(submission_id).await?;
            if proof.consumed {
                return Err(RentioError::AlreadyConfirmed {
                    submission: submission_id,
                });
            }
            self.sessions
                .set(
                    actor.id,
                    PendingState::AwaitingAmount {
                        target: ConfirmTarget::Proof {
                            submission_id,
                            sender_id: proof.sender_id,
                        },
                    },
                )
                .await;
            return Ok(vec![Self::reply(actor.id, "Send the amount on the receipt.")]);
        }
        Ok(vec![self.main_menu(actor.id)])
    }

    async fn capture_name(
        &self,
        actor: &ActorRef,
        room: u32,
        text: &str,
    ) -> Result<Vec<Notification>, RentioError> {
        let name = text.trim();
        if name.is_empty() {
            self.sessions
                .set(actor.id, PendingState::AwaitingOccupantName { room })
                .await;
            return Ok(vec![Self::reply(actor.id, "Name cannot be empty. Send the name.")]);
        }
        self.sessions
            .set(
                actor.id,
                PendingState::AwaitingOccupantContact {
                    room,
                    name: name.to_string(),
                },
            )
            .await;
        Ok(vec![Self::reply(
            actor.id,
            "Send the occupant's contact: a numeric id or an @handle.",
        )])
    }

    async fn capture_contact(
        &self,
        actor: &ActorRef,
        room: u32,
        name: String,
        text: &str,
    ) -> Result<Vec<Notification>, RentioError> {
        let Some(contact) = Contact::parse(text) else {
            self.sessions
                .set(
                    actor.id,
                    PendingState::AwaitingOccupantContact { room, name },
                )
                .await;
            return Ok(vec![Self::reply(
                actor.id,
                "Could not read that contact. Send a numeric id or an @handle.",
            )]);
        };

        let id = self
            .storage
            .create_occupant(
                &NewOccupant {
                    room,
                    name: name.clone(),
                    contact: contact.clone(),
                    phone: None,
                    document_ref: None,
                },
                self.policy.room_limit(),
            )
            .await?;
        info!(occupant_id = id, room, "occupant registered");
        Ok(vec![Self::reply(
            actor.id,
            format!("Registered {name} ({contact}) into room {room}."),
        )])
    }

    /// Parse the confirmed amount and apply it through the ledger.
    async fn confirm_amount(
        &self,
        actor: &ActorRef,
        target: ConfirmTarget,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        let amount: i64 = match text.trim().parse() {
            Ok(n) if n > 0 => n,
            _ => {
                // Leave the prompt armed so the admin can retype the amount.
                self.sessions
                    .set(
                        actor.id,
                        PendingState::AwaitingAmount {
                            target: target.clone(),
                        },
                    )
                    .await;
                return Err(RentioError::InvalidAmount {
                    reason: format!("expected a positive whole number, got {:?}", text.trim()),
                });
            }
        };

        // The proof's consumed flag and the ledger row commit in one storage
        // transaction; a failure anywhere leaves the proof open for retry.
        let (occupant, new_until, notify_target) = match target {
            ConfirmTarget::Occupant { id } => {
                let occ = self.storage.get_occupant(id).await?;
                let contact = occ.contact();
                let (occupant, new_until) = self.ledger.record_payment(id, amount, now).await?;
                (occupant, new_until, contact)
            }
            ConfirmTarget::Proof {
                submission_id,
                sender_id,
            } => {
                let contact = Contact::UserId(sender_id);
                let occ = self
                    .storage
                    .find_occupant_by_contact(&contact)
                    .await?
                    .ok_or_else(|| RentioError::UnknownOccupant {
                        contact: contact.to_string(),
                    })?;
                let (occupant, new_until) = self
                    .ledger
                    .record_proof_payment(submission_id, occ.id, amount, now)
                    .await?;
                (occupant, new_until, Some(contact))
            }
        };
        let (days, hours) = days_remaining(new_until, now);

        let mut notes = vec![Self::reply(
            actor.id,
            format!(
                "Recorded {amount} for {}. Paid until {} ({days} d {hours} h).",
                occupant.name,
                format_ts(new_until)
            ),
        )];
        if let Some(contact) = notify_target {
            notes.push(Notification::text(
                contact,
                format!(
                    "Payment of {amount} confirmed. You are paid until {} ({days} d {hours} h).",
                    format_ts(new_until)
                ),
            ));
        }
        Ok(notes)
    }

    async fn capture_price(
        &self,
        actor: &ActorRef,
        text: &str,
    ) -> Result<Vec<Notification>, RentioError> {
        let price: i64 = match text.trim().parse() {
            Ok(n) if n > 0 => n,
            _ => {
                self.sessions.set(actor.id, PendingState::AwaitingPrice).await;
                return Err(RentioError::InvalidAmount {
                    reason: format!("expected a positive whole number, got {:?}", text.trim()),
                });
            }
        };
        self.storage
            .set_setting(SETTING_PRICE_PER_DAY, &price.to_string())
            .await?;
        info!(price, "price per day updated");
        Ok(vec![Self::reply(
            actor.id,
            format!("Price per day set to {price}."),
        )])
    }

    async fn capture_card(
        &self,
        actor: &ActorRef,
        text: &str,
    ) -> Result<Vec<Notification>, RentioError> {
        let card = text.trim();
        if card.is_empty() {
            self.sessions.set(actor.id, PendingState::AwaitingCard).await;
            return Ok(vec![Self::reply(
                actor.id,
                "Card number cannot be empty. Send the new card number.",
            )]);
        }
        self.storage.set_setting(SETTING_PAYMENT_CARD, card).await?;
        Ok(vec![Self::reply(actor.id, format!("Payment card set to {card}."))])
    }

    // --- Views ---

    fn main_menu(&self, actor_id: i64) -> Notification {
        Self::reply(actor_id, "What would you like to do?").with_choices(vec![
            Choice::new(OPT_ROOMS, "Rooms"),
            Choice::new(OPT_REPORT, "Monthly report"),
            Choice::new(OPT_SET_PRICE, "Set price"),
            Choice::new(OPT_SET_CARD, "Set card"),
        ])
    }

    fn room_grid(&self, actor_id: i64) -> Notification {
        let choices = (1..=self.policy.room_count())
            .map(|room| Choice::new(format!("room:{room}"), room.to_string()))
            .collect();
        Self::reply(actor_id, "Pick a room.").with_choices(choices)
    }

    async fn room_detail(
        &self,
        actor: &ActorRef,
        room: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        if !self.policy.valid_room(room) {
            return Err(RentioError::Internal(format!("invalid room {room}")));
        }
        let occupants = self.storage.occupants_in_room(room).await?;

        let mut text = format!("Room {room}\n");
        let mut choices = Vec::new();
        if occupants.is_empty() {
            text.push_str("No occupants.\n");
        }
        for occ in &occupants {
            text.push_str(&occupant_line(occ, now, self.warning_threshold_days));
            choices.push(Choice::new(
                format!("pay:{}", occ.id),
                format!("Add payment: {}", occ.name),
            ));
            choices.push(Choice::new(format!("rm:{}", occ.id), format!("Remove: {}", occ.name)));
        }
        let income: i64 = occupants.iter().map(|o| o.accrued_total).sum();
        text.push_str(&format!("Room income: {income}"));

        choices.push(Choice::new(format!("add:{room}"), "Add occupant"));
        choices.push(Choice::new(OPT_ROOMS, "Back"));
        Ok(vec![Self::reply(actor.id, text).with_choices(choices)])
    }

    async fn month_report(
        &self,
        actor: &ActorRef,
        now: DateTime<Utc>,
    ) -> Result<Vec<Notification>, RentioError> {
        let month = now.format("%Y-%m").to_string();
        let per_room = self.ledger.room_income().await?;
        let month_total = self.ledger.monthly_income(&month).await?;

        let mut text = format!("Income report, {month}\n");
        let mut all_time = 0i64;
        for (room, income) in &per_room {
            text.push_str(&format!("Room {room}: {income}\n"));
            all_time += income;
        }
        text.push_str(&format!("This month: {month_total}\nAll time: {all_time}"));
        Ok(vec![Self::reply(actor.id, text)])
    }
}

fn occupant_line(occ: &Occupant, now: DateTime<Utc>, threshold_days: i64) -> String {
    match remaining_for(occ, now) {
        Some((days, hours)) if expiring_soon(days, threshold_days) => format!(
            "{}: {days} d {hours} h left (!), total {}\n",
            occ.name, occ.accrued_total
        ),
        Some((days, hours)) => format!(
            "{}: {days} d {hours} h left, total {}\n",
            occ.name, occ.accrued_total
        ),
        None => format!("{}: no payment yet\n", occ.name),
    }
}

fn parse_suffix<T: std::str::FromStr>(option_id: &str, prefix: &str) -> Option<T> {
    option_id.strip_prefix(prefix)?.parse().ok()
}

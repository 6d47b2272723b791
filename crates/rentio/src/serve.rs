// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rentio serve` command implementation.
//!
//! Starts the full bot: SQLite storage, the workflow engine, the Telegram
//! channel, and the background expiry scanner. Inbound intents are handled
//! one at a time; every notification the engine emits is pushed back out
//! through the channel. Supports graceful shutdown via signal handlers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rentio_config::model::RentioConfig;
use rentio_core::error::RentioError;
use rentio_core::{ChannelAdapter, StorageAdapter};
use rentio_scanner::report;
use rentio_scanner::ExpiryScanner;
use rentio_storage::SqliteStorage;
use rentio_telegram::TelegramChannel;
use rentio_workflow::WorkflowEngine;
use tracing::{debug, error, info, warn};

use crate::shutdown;

/// Runs the `rentio serve` command.
pub async fn run_serve(config: RentioConfig) -> Result<(), RentioError> {
    // Initialize tracing subscriber.
    init_tracing(&config.bot.log_level);

    info!(bot = %config.bot.name, "starting rentio serve");

    // Initialize storage.
    let storage: Arc<dyn StorageAdapter> = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    // Connect the Telegram channel.
    let channel: Arc<dyn ChannelAdapter> = {
        let mut telegram = TelegramChannel::new(config.telegram.clone())?;
        telegram.connect().await?;
        Arc::new(telegram)
    };

    let engine = WorkflowEngine::new(Arc::clone(&storage), &config);

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Spawn the expiry scanner background task.
    {
        let scanner = ExpiryScanner::new(
            Arc::clone(&storage),
            Arc::clone(&channel),
            config.scanner.clone(),
        );
        let scan_storage = Arc::clone(&storage);
        let scan_channel = Arc::clone(&channel);
        let scan_cancel = cancel.clone();
        let interval_secs = config.scanner.interval_secs;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            // Skip the first immediate tick.
            interval.tick().await;
            let mut current_month = report::month_key(Utc::now());

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let now = Utc::now();

                        match scanner.run_scan(now).await {
                            Ok(outcome) if outcome.fired > 0 => {
                                info!(fired = outcome.fired, "expiry reminders sent");
                            }
                            Ok(_) => {
                                debug!("expiry scan found nothing to send");
                            }
                            Err(e) => {
                                warn!(error = %e, "expiry scan failed (non-fatal)");
                            }
                        }

                        // On month rollover, deliver the closed month's report.
                        let month = report::month_key(now);
                        if month != current_month {
                            let closed = report::previous_month_key(now);
                            match report::send_month_report(&scan_storage, &scan_channel, &closed)
                                .await
                            {
                                Ok(recipients) => {
                                    info!(month = %closed, recipients, "month report delivered");
                                }
                                Err(e) => {
                                    warn!(error = %e, month = %closed, "month report failed");
                                }
                            }
                            current_month = month;
                        }
                    }
                    _ = scan_cancel.cancelled() => {
                        info!("expiry scanner shutting down");
                        break;
                    }
                }
            }
        });
        info!(
            interval_secs,
            threshold_days = config.scanner.warning_threshold_days,
            "expiry scanner started"
        );
    }

    // Main intent loop.
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("serve loop shutting down");
                break;
            }
            intent = channel.receive() => {
                let intent = match intent {
                    Ok(intent) => intent,
                    Err(e) => {
                        error!(error = %e, "channel receive failed, stopping");
                        break;
                    }
                };
                match engine.handle_intent(intent).await {
                    Ok(notes) => {
                        for note in notes {
                            if let Err(e) = channel.send(note).await {
                                // Handle-only targets stay undeliverable until
                                // the occupant messages the bot once.
                                warn!(error = %e, "notification delivery failed");
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "intent handling failed");
                    }
                }
            }
        }
    }

    channel.shutdown().await?;
    storage.close().await?;

    info!("rentio serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rentio={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

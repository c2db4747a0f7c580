// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lunara serve` command implementation.
//!
//! Wires the full bot: SQLite storage, the message catalog, the WhatsApp
//! channel, the conversation engine, and the daily reminder scanner, then
//! runs the bot loop until a shutdown signal arrives.

use std::sync::Arc;

use lunara_bot::{shutdown, BotLoop, Engine};
use lunara_config::model::LunaraConfig;
use lunara_core::error::LunaraError;
use lunara_core::{ChannelAdapter, UserStore};
use lunara_cron::ReminderScanner;
use lunara_i18n::Catalog;
use lunara_storage::SqliteStore;
use lunara_whatsapp::WhatsAppChannel;
use tracing::{error, info};

/// Runs the `lunara serve` command.
pub async fn run_serve(config: LunaraConfig) -> Result<(), LunaraError> {
    // Initialize tracing subscriber.
    init_tracing(&config.agent.log_level);

    info!(name = config.agent.name.as_str(), "starting lunara serve");

    // Initialize storage (runs migrations).
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    // Load the message catalog.
    let catalog = Arc::new(Catalog::builtin(&config.bot.reference_language)?);
    info!(
        languages = %catalog.language_names().collect::<Vec<_>>().join(", "),
        reference = catalog.reference(),
        "message catalog loaded"
    );

    // Initialize the WhatsApp channel.
    let mut whatsapp = WhatsAppChannel::new(config.whatsapp.clone()).map_err(|e| {
        error!(error = %e, "failed to initialize WhatsApp channel");
        eprintln!(
            "error: WhatsApp credentials required. Set whatsapp.access_token and \
             whatsapp.phone_number_id via config or LUNARA_WHATSAPP_* env vars."
        );
        e
    })?;
    whatsapp.connect().await?;
    let channel: Arc<dyn ChannelAdapter + Send + Sync> = Arc::new(whatsapp);

    // Build the conversation engine.
    let store_dyn: Arc<dyn UserStore> = store.clone();
    let engine = Arc::new(Engine::new(store_dyn.clone(), catalog.clone(), &config.bot));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Spawn the daily reminder scanner. A scanner failure (bad cron
    // expression) is fatal: it cancels the whole process rather than running
    // silently without reminders.
    {
        let scanner = ReminderScanner::new(
            store_dyn,
            channel.clone(),
            catalog.clone(),
            config.bot.reminder_lead_days,
        );
        let cron_expr = config.bot.reminder_cron.clone();
        let scan_cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = scanner.run(&cron_expr, scan_cancel.clone()).await {
                error!(error = %e, "reminder scanner failed, shutting down");
                scan_cancel.cancel();
            }
        });
        info!(
            cron = config.bot.reminder_cron.as_str(),
            lead_days = config.bot.reminder_lead_days,
            "reminder scanner started"
        );
    }

    // Run the bot loop until cancelled.
    let bot = BotLoop::new(channel, engine);
    bot.run(cancel).await?;

    // Checkpoint and close storage.
    store.close().await?;

    info!("lunara serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lunara={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

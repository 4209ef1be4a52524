//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix
//! - Application: Registry, Dispatcher, Keywords, Health Check
//! - Interface: Built-in Commands
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{member::StrippedRoomMemberEvent, message::SyncRoomMessageEvent},
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

use crate::application::dispatcher::Dispatcher;
use crate::application::health::spawn_health_check;
use crate::application::registry::CommandRegistry;
use crate::domain::config::AppConfig;
use crate::infrastructure::matrix::{self, MatrixService};
use crate::strings::messages;

#[derive(Parser, Debug)]
#[command(name = "bitbot", about = "Matrix command and keyword bot")]
struct Cli {
    /// Path to the configuration file (.json, .yaml or .yml)
    #[arg(short, long, env = "CONFIG_FILE", default_value = "data/config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    // 2. Logging Setup
    let _guard = init_logging(Path::new(&config.data_dir))?;
    tracing::info!("Starting bitbot...");
    tracing::info!("{}", messages::config_loaded(&config.user_id));

    // 3. Command Registry & Dispatcher
    let registry = Arc::new(CommandRegistry::load(interface::commands::builtin()));
    let dispatcher = Arc::new(Dispatcher::new(config.clone(), registry)?);

    // 4. Matrix Setup
    let password = config.resolve_password().context(messages::NO_PASSWORD)?;
    let client = Client::builder()
        .homeserver_url(&config.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(&config.user_id, &password)
        .initial_device_display_name(&config.device_name)
        .send()
        .await
        .context("Login failed")?;

    tracing::info!("Logged in as {}", config.user_id);

    if let Some(name) = &config.display_name {
        tracing::info!("{}", messages::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", messages::set_display_name_fail(&e.to_string()));
        }
    }

    if let Some(health) = config.health_check.clone() {
        spawn_health_check(health);
    }

    // 5. Event Handlers
    let start_time = std::time::SystemTime::now();

    let message_dispatcher = dispatcher.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let dispatcher = message_dispatcher.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            if matrix::is_backlog(ev.origin_server_ts().get().into(), start_time) {
                return;
            }

            let Some(message) = matrix::to_incoming(&room, original_msg) else {
                return;
            };
            tracing::info!("Received message from {}: \n{}", message.sender, message.body);

            let chat = MatrixService::new(room);
            match dispatcher.on_message(&chat, &message).await {
                Ok(outcome) => tracing::debug!("{} -> {:?}", message.event_id, outcome),
                Err(e) => tracing::error!("Failed to dispatch message: {:#}", e),
            }
        }
    });

    let invite_dispatcher = dispatcher.clone();
    client.add_event_handler(move |ev: StrippedRoomMemberEvent, room: Room| {
        let dispatcher = invite_dispatcher.clone();
        async move {
            let invite = matrix::to_invite(&room, &ev);
            // Joining retries with backoff, keep the sync loop moving meanwhile
            tokio::spawn(async move {
                let chat = MatrixService::new(room);
                dispatcher.on_invite(&chat, &invite).await;
            });
        }
    });

    // 6. Sync Loop
    tracing::info!("{}", messages::SYNC_LOOP_START);
    tokio::select! {
        res = client.sync(SyncSettings::default()) => {
            if let Err(e) = res {
                tracing::error!("{}", messages::sync_loop_fail(&e.to_string()));
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("{}", messages::SHUTDOWN);
        }
    }

    Ok(())
}

/// File log (cleared every start) plus stdout, filtered by `RUST_LOG`.
fn init_logging(data_dir: &Path) -> Result<WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    if !data_dir.exists() {
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = data_dir.join("session.log");
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(data_dir, "session.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

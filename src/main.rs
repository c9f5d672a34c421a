//! Arena Duel - side-scrolling melee duel core
//!
//! This is the main entry point. It handles:
//! - The fixed-tick match loop (player vs enemies)
//! - The TCP command channel for a remote controller
//! - Local keyboard input read from the console
//! - Publishing scene snapshots for rendering and audio

mod app;
mod config;
mod game;
mod remote;
mod util;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{console, presenter, AppState};
use crate::config::Config;
use crate::game::{GameMatch, MatchSettings};
use crate::remote::CommandChannel;
use crate::util::net::{local_ip, pairing_string};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Arena Duel");

    let state = AppState::new(config);
    let config = state.config.clone();

    // Create the match
    let settings = MatchSettings::from(config.as_ref());
    let (game_match, handle) = GameMatch::new(&settings, state.subscribe_shutdown());

    // A bind failure at startup is the one fatal network error
    let channel = CommandChannel::bind(
        config.command_addr,
        handle.control(),
        config.command_rate_limit,
        state.subscribe_shutdown(),
    )?;
    let port = channel.local_addr().port();
    let channel_status = channel.status();
    info!(pairing = %pairing_string(local_ip(), port), "Controller pairing address");

    let channel_task = tokio::spawn(async move {
        if let Err(e) = channel.run().await {
            error!(error = %e, "Command channel stopped, continuing with keyboard only");
        }
    });

    tokio::spawn(presenter::log_scene(handle.subscribe()));

    // Detached: the thread ends with the process or when stdin closes
    if let Err(e) = console::spawn(handle.control()) {
        warn!(error = %e, "Console input unavailable, remote control only");
    }

    let mut match_task = tokio::spawn(game_match.run());

    tokio::select! {
        outcome = &mut match_task => {
            match outcome {
                Ok(Some(outcome)) => info!(outcome = outcome.message(), "Match complete"),
                Ok(None) => info!("Match left before a result"),
                Err(e) => error!(error = %e, "Match task failed"),
            }
        }
        _ = shutdown_signal() => {
            state.shutdown();
            if let Err(e) = match_task.await {
                error!(error = %e, "Match task failed");
            }
        }
    }

    if let Some(peer) = channel_status.active_peer() {
        info!(peer = %peer, "Disconnecting controller");
    }
    state.shutdown();
    if let Err(e) = channel_task.await {
        error!(error = %e, "Command channel task failed");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}

//! Headless presenter that logs what a renderer and audio player would show

use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::game::snapshot::{GameEvent, SceneSnapshot};
use crate::game::MatchPhase;

/// Consume snapshots until the match drops its sender
pub async fn log_scene(mut snapshots: broadcast::Receiver<SceneSnapshot>) {
    loop {
        match snapshots.recv().await {
            Ok(snapshot) => present(&snapshot),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(lagged_count = n, "Presenter lagged, skipping {} snapshots", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Snapshot channel closed");
                break;
            }
        }
    }
}

fn present(snapshot: &SceneSnapshot) {
    for cue in &snapshot.cues {
        debug!(tick = snapshot.tick, cue = ?cue, "Play cue");
    }

    for event in &snapshot.events {
        match event {
            GameEvent::Hit {
                attacker_id,
                target_id,
                remaining_health,
                ..
            } => debug!(attacker_id, target_id, hp = remaining_health, "HP"),
            GameEvent::Kill { victim_id, .. } => info!(victim_id, "Knocked out"),
        }
    }

    if let MatchPhase::Ended(outcome) = snapshot.phase {
        info!(tick = snapshot.tick, "{}", outcome.message());
    }

    match serde_json::to_string(snapshot) {
        Ok(json) => trace!(snapshot = %json, "Scene"),
        Err(e) => warn!(error = %e, "Failed to encode snapshot"),
    }
}

//! Game simulation modules

pub mod animation;
pub mod combat;
pub mod entity;
pub mod input;
pub mod r#match;
pub mod physics;
pub mod snapshot;

pub use r#match::{GameMatch, MatchPhase, MatchSettings};

use std::net::SocketAddr;

use tokio::sync::mpsc;

use self::input::{KeyEvent, RemoteCommand};

/// Input routed to the match loop. Drained once per tick in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// Command from the remote controller
    Remote(RemoteCommand),
    /// Local keyboard event
    Key(KeyEvent),
    /// A remote controller attached to the command channel
    ControllerConnected(SocketAddr),
    /// The remote controller went away
    ControllerDisconnected(SocketAddr),
    /// Leave the menu and start fighting
    StartRequested,
}

#[derive(Debug, thiserror::Error)]
#[error("match is no longer accepting input")]
pub struct MatchClosed;

/// Handle to the player's input queue. This is the only authority the
/// command channel and the console have over the match.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    input_tx: mpsc::Sender<PlayerInput>,
}

impl ControlHandle {
    pub fn new(input_tx: mpsc::Sender<PlayerInput>) -> Self {
        Self { input_tx }
    }

    pub async fn send(&self, input: PlayerInput) -> Result<(), MatchClosed> {
        self.input_tx.send(input).await.map_err(|_| MatchClosed)
    }

    /// Send from a plain thread. Panics if called from inside the runtime.
    pub fn blocking_send(&self, input: PlayerInput) -> Result<(), MatchClosed> {
        self.input_tx.blocking_send(input).map_err(|_| MatchClosed)
    }
}

//! Command channel accept loop

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::game::{ControlHandle, PlayerInput};
use crate::util::rate_limit::CommandRateLimiter;

use super::handler::handle_connection;

/// Pending connections the OS may queue before `accept`
pub const LISTEN_BACKLOG: u32 = 5;

/// Command channel errors
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("failed to bind command channel on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("command channel accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// Which controller, if any, currently owns the channel
#[derive(Debug, Default)]
pub struct ChannelStatus {
    active: Mutex<Option<SocketAddr>>,
}

impl ChannelStatus {
    pub fn active_peer(&self) -> Option<SocketAddr> {
        *self.active.lock()
    }

    /// Claim the single controller slot. Fails if another peer holds it.
    fn try_claim(&self, peer: SocketAddr) -> bool {
        let mut active = self.active.lock();
        if active.is_some() {
            return false;
        }
        *active = Some(peer);
        true
    }

    fn release(&self, peer: SocketAddr) {
        let mut active = self.active.lock();
        if *active == Some(peer) {
            *active = None;
        }
    }
}

/// TCP server relaying one remote controller's commands to the player
pub struct CommandChannel {
    listener: TcpListener,
    local_addr: SocketAddr,
    control: ControlHandle,
    status: Arc<ChannelStatus>,
    rate_limit: u32,
    shutdown: watch::Receiver<bool>,
}

impl CommandChannel {
    /// Bind and start listening. Must be called inside a tokio runtime.
    pub fn bind(
        addr: SocketAddr,
        control: ControlHandle,
        rate_limit: u32,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, ChannelError> {
        let bind_err = |source| ChannelError::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        info!(addr = %local_addr, "Command channel listening");

        Ok(Self {
            listener,
            local_addr,
            control,
            status: Arc::new(ChannelStatus::default()),
            rate_limit,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn status(&self) -> Arc<ChannelStatus> {
        self.status.clone()
    }

    /// Accept controllers until shutdown. Only one controller is serviced at
    /// a time; others are closed on arrival. An accept error ends the loop.
    pub async fn run(mut self) -> Result<(), ChannelError> {
        let mut sessions = JoinSet::new();

        let result = loop {
            if *self.shutdown.borrow() {
                break Ok(());
            }

            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                Some(_) = sessions.join_next(), if !sessions.is_empty() => continue,
                _ = self.shutdown.changed() => break Ok(()),
            };

            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "Command channel accept failed");
                    break Err(ChannelError::Accept(e));
                }
            };

            if !self.status.try_claim(peer) {
                warn!(
                    peer = %peer,
                    active = ?self.status.active_peer(),
                    "Rejecting controller, another one is connected"
                );
                drop(stream);
                continue;
            }

            info!(peer = %peer, "Controller connection established");
            if self
                .control
                .send(PlayerInput::ControllerConnected(peer))
                .await
                .is_err()
            {
                debug!(peer = %peer, "Match gone before controller attached");
            }

            let control = self.control.clone();
            let status = self.status.clone();
            let limiter = CommandRateLimiter::new(self.rate_limit);
            let shutdown = self.shutdown.clone();
            sessions.spawn(async move {
                handle_connection(stream, peer, control.clone(), limiter, shutdown).await;
                status.release(peer);
                let _ = control.send(PlayerInput::ControllerDisconnected(peer)).await;
            });
        };

        // Handlers observe the same shutdown signal and close their sockets
        while sessions.join_next().await.is_some() {}
        info!(addr = %self.local_addr, "Command channel stopped");

        result
    }
}

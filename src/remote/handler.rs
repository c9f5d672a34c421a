//! Per-connection controller handler

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::game::{ControlHandle, PlayerInput};
use crate::util::rate_limit::CommandRateLimiter;

use super::protocol::{decode_chunk, RECV_BUFFER_SIZE};

/// Why a connection handler returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// Peer closed its end (empty read)
    PeerClosed,
    /// Read failed
    ReadError,
    /// Shutdown was signalled
    Shutdown,
    /// The match stopped accepting input
    MatchClosed,
}

/// Counters for one controller session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub forwarded: usize,
    pub ignored: usize,
    pub reason: Disconnect,
}

/// Read commands from `stream` and forward them to the player until the peer
/// goes away or shutdown is signalled. Dropping the stream closes the socket.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    control: ControlHandle,
    rate_limiter: CommandRateLimiter,
    mut shutdown: watch::Receiver<bool>,
) -> SessionSummary
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(RECV_BUFFER_SIZE);
    let mut forwarded = 0;
    let mut ignored = 0;

    let reason = 'session: loop {
        if *shutdown.borrow() {
            break 'session Disconnect::Shutdown;
        }

        // Capacity is fixed, so one read never exceeds RECV_BUFFER_SIZE
        buf.clear();
        let read = tokio::select! {
            read = stream.read_buf(&mut buf) => read,
            _ = shutdown.changed() => break 'session Disconnect::Shutdown,
        };

        match read {
            Ok(0) => break 'session Disconnect::PeerClosed,
            Ok(_) => {}
            Err(e) => {
                warn!(peer = %peer, error = %e, "Controller read failed");
                break 'session Disconnect::ReadError;
            }
        }

        let chunk = match std::str::from_utf8(&buf) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(peer = %peer, error = %e, "Dropping non UTF-8 chunk");
                ignored += 1;
                continue;
            }
        };
        debug!(peer = %peer, chunk = chunk, "Received from controller");

        for decoded in decode_chunk(chunk) {
            let command = match decoded {
                Ok(command) => command,
                Err(e) => {
                    warn!(peer = %peer, error = %e, "Ignoring controller command");
                    ignored += 1;
                    continue;
                }
            };

            if !rate_limiter.check() {
                warn!(peer = %peer, command = %command, "Rate limited controller command");
                ignored += 1;
                continue;
            }

            if control.send(PlayerInput::Remote(command)).await.is_err() {
                debug!(peer = %peer, "Input channel closed");
                break 'session Disconnect::MatchClosed;
            }
            forwarded += 1;
        }
    };

    info!(peer = %peer, reason = ?reason, forwarded, ignored, "Controller session ended");

    SessionSummary {
        forwarded,
        ignored,
        reason,
    }
}

//! Local keyboard source fed from stdin, one key per line
//!
//! `d`, `a`, `space`, `q` and `esc` press a key; a leading `^` releases it
//! (`^d`). `start` leaves the menu.

use std::io::{self, BufRead};
use std::thread;

use tracing::{debug, info, warn};

use crate::game::input::{Key, KeyEvent, UnknownCommand};
use crate::game::{ControlHandle, PlayerInput};

/// Parse one console line into a queued input
pub fn parse_line(line: &str) -> Result<PlayerInput, UnknownCommand> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("start") {
        return Ok(PlayerInput::StartRequested);
    }

    let event = match line.strip_prefix('^') {
        Some(name) => KeyEvent::Up(name.parse::<Key>()?),
        None => KeyEvent::Down(line.parse::<Key>()?),
    };
    Ok(PlayerInput::Key(event))
}

/// Forward keys until the reader hits EOF or the match stops taking input
pub fn read_keys(reader: impl BufRead, control: &ControlHandle) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Console read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let input = match parse_line(&line) {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "Ignoring console input");
                continue;
            }
        };

        debug!(input = ?input, "Console input");
        if control.blocking_send(input).is_err() {
            debug!("Match closed, console input stopped");
            break;
        }
    }
}

/// Read stdin on a dedicated thread. Must stay off the tokio blocking pool,
/// where a pending stdin read stalls runtime shutdown.
pub fn spawn(control: ControlHandle) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            read_keys(io::stdin().lock(), &control);
            info!("Console input closed");
        })
}

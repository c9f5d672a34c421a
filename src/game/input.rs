//! Input intents from the remote controller and the local keyboard

use std::fmt;
use std::str::FromStr;

use super::entity::{Fighter, Horizontal};

/// Commands understood on the remote control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Right,
    Left,
    Jump,
    Attack,
}

impl RemoteCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteCommand::Right => "Right",
            RemoteCommand::Left => "Left",
            RemoteCommand::Jump => "Jump",
            RemoteCommand::Attack => "Attack",
        }
    }

    /// Apply to the controlled fighter. Every remote command first clears
    /// horizontal intent, so the most recent command always wins.
    pub fn apply(self, fighter: &mut Fighter) {
        fighter.intent.horizontal = Horizontal::None;

        match self {
            RemoteCommand::Right => fighter.intent.horizontal = Horizontal::Right,
            RemoteCommand::Left => fighter.intent.horizontal = Horizontal::Left,
            RemoteCommand::Jump => {
                fighter.trigger_jump();
            }
            RemoteCommand::Attack => {
                fighter.trigger_attack();
            }
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for RemoteCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Right" => Ok(RemoteCommand::Right),
            "Left" => Ok(RemoteCommand::Left),
            "Jump" => Ok(RemoteCommand::Jump),
            "Attack" => Ok(RemoteCommand::Attack),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

/// Keys the local input source reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Move right
    D,
    /// Move left
    A,
    /// Jump
    Space,
    /// Attack
    Q,
    /// Quit
    Escape,
}

impl FromStr for Key {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "d" => Ok(Key::D),
            "a" => Ok(Key::A),
            "space" => Ok(Key::Space),
            "q" => Ok(Key::Q),
            "esc" | "escape" => Ok(Key::Escape),
            _ => Err(UnknownCommand(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// Tracks held movement keys so releasing one direction falls back to the
/// other if it is still held.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyboardState {
    right_held: bool,
    left_held: bool,
}

impl KeyboardState {
    pub fn apply(&mut self, fighter: &mut Fighter, event: KeyEvent) {
        match event {
            KeyEvent::Down(Key::D) => {
                self.right_held = true;
                fighter.intent.horizontal = Horizontal::Right;
            }
            KeyEvent::Down(Key::A) => {
                self.left_held = true;
                fighter.intent.horizontal = Horizontal::Left;
            }
            KeyEvent::Down(Key::Space) => {
                fighter.trigger_jump();
            }
            KeyEvent::Down(Key::Q) => {
                fighter.trigger_attack();
            }
            KeyEvent::Up(Key::D) => {
                self.right_held = false;
                if fighter.intent.horizontal == Horizontal::Right {
                    fighter.intent.horizontal = if self.left_held {
                        Horizontal::Left
                    } else {
                        Horizontal::None
                    };
                }
            }
            KeyEvent::Up(Key::A) => {
                self.left_held = false;
                if fighter.intent.horizontal == Horizontal::Left {
                    fighter.intent.horizontal = if self.right_held {
                        Horizontal::Right
                    } else {
                        Horizontal::None
                    };
                }
            }
            KeyEvent::Down(Key::Escape)
            | KeyEvent::Up(Key::Space | Key::Q | Key::Escape) => {}
        }
    }
}

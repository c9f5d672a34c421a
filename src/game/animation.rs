//! Action state machine and sprite frame selection
//!
//! Each tick the action is re-derived from intent flags in fixed priority
//! order (Jump > Attack > Run > Idle). Jump and Attack are one-shot: they run
//! until their strip is exhausted, then clear their trigger flag and fall back
//! to Idle. Animation and physics only meet through the `jumping` flag, so an
//! entity can still be airborne after its Jump animation has ended.

use serde::Serialize;

use super::entity::{Facing, Intent};

/// Frames advanced per tick (4 ticks per displayed frame)
pub const ANIMATION_SPEED: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Idle,
    Run,
    Jump,
    Attack,
}

impl Action {
    pub const COUNT: usize = 4;

    /// Derive the action purely from the current flags
    pub fn derive(intent: &Intent) -> Self {
        if intent.jumping {
            Action::Jump
        } else if intent.attacking {
            Action::Attack
        } else if intent.is_moving() {
            Action::Run
        } else {
            Action::Idle
        }
    }

    const fn index(self) -> usize {
        match self {
            Action::Idle => 0,
            Action::Run => 1,
            Action::Jump => 2,
            Action::Attack => 3,
        }
    }

    /// Cue played when an entity enters this action
    pub fn cue(self) -> Option<SoundCue> {
        match self {
            Action::Idle => None,
            Action::Run => Some(SoundCue::Step),
            Action::Jump => Some(SoundCue::Jump),
            Action::Attack => Some(SoundCue::Attack),
        }
    }
}

/// Named audio cues for the external audio player (fire-and-forget)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Jump,
    Attack,
    Step,
    Victory,
    Defeat,
}

/// Frame counts per action, indexed by `Action`. A count of zero means the
/// entity has no dedicated strip and reuses its Idle strip.
#[derive(Debug, PartialEq)]
pub struct AnimationTable {
    frame_counts: [u32; Action::COUNT],
    pub frame_width: f32,
    pub frame_height: f32,
}

impl AnimationTable {
    pub const fn new(
        idle: u32,
        run: u32,
        jump: u32,
        attack: u32,
        frame_width: f32,
        frame_height: f32,
    ) -> Self {
        // Idle is the fallback strip and must always have a frame.
        let idle = if idle == 0 { 1 } else { idle };
        Self {
            frame_counts: [idle, run, jump, attack],
            frame_width,
            frame_height,
        }
    }

    /// The strip actually displayed for an action
    pub fn strip(&self, action: Action) -> Action {
        if self.frame_counts[action.index()] == 0 {
            Action::Idle
        } else {
            action
        }
    }

    pub fn frame_count(&self, action: Action) -> u32 {
        self.frame_counts[self.strip(action).index()]
    }
}

pub static PLAYER_ANIMATIONS: AnimationTable = AnimationTable::new(4, 8, 15, 8, 96.0, 96.0);

/// Enemies have no Jump strip
pub static ENEMY_ANIMATIONS: AnimationTable = AnimationTable::new(18, 24, 0, 7, 96.0, 96.0);

/// What the renderer should draw for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSelector {
    pub strip: Action,
    pub frame: u32,
    /// Mirror horizontally (entity faces left)
    pub mirrored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationState {
    pub action: Action,
    /// Fractional frame accumulator
    pub frame_index: f32,
}

impl AnimationState {
    /// Advance one tick. May clear the one-shot flags in `intent` when their
    /// animation completes. Returns the cue to play if the action changed.
    pub fn step(&mut self, intent: &mut Intent, table: &AnimationTable) -> Option<SoundCue> {
        let previous = self.action;
        self.action = Action::derive(intent);

        let mut cue = None;
        if self.action != previous {
            self.frame_index = 0.0;
            cue = self.action.cue();
        }

        self.frame_index += ANIMATION_SPEED;
        if self.frame_index >= table.frame_count(self.action) as f32 {
            match self.action {
                Action::Jump => intent.jumping = false,
                Action::Attack => intent.attacking = false,
                Action::Idle | Action::Run => {}
            }
            self.action = Action::Idle;
            self.frame_index = 0.0;
        }

        cue
    }

    pub fn frame(&self, table: &AnimationTable, facing: Facing) -> FrameSelector {
        let count = table.frame_count(self.action);
        FrameSelector {
            strip: table.strip(self.action),
            frame: (self.frame_index.floor() as u32).min(count.saturating_sub(1)),
            mirrored: facing != Facing::Right,
        }
    }
}

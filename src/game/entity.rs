//! Fighter entities: the player and enemies share one capability set

use serde::Serialize;

use super::animation::{AnimationState, AnimationTable, ENEMY_ANIMATIONS, PLAYER_ANIMATIONS};
use super::combat::EnemyStats;
use super::physics::JUMP_IMPULSE;

pub type EntityId = u32;

/// Player starting stats
pub const PLAYER_HEALTH: u32 = 100;
pub const PLAYER_ATTACK_DAMAGE: u32 = 10;

/// Which side of the fight an entity is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

/// Horizontal movement intent. A single value, so left and right can never
/// both be requested at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizontal {
    #[default]
    None,
    Left,
    Right,
}

/// Per-tick desired actions, distinct from the resulting physical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    pub horizontal: Horizontal,
    /// One-shot: cleared when the Jump animation completes
    pub jumping: bool,
    /// One-shot: cleared when the Attack animation completes
    pub attacking: bool,
}

impl Intent {
    pub fn is_moving(&self) -> bool {
        self.horizontal != Horizontal::None
    }
}

/// Axis-aligned bounding box, `y` grows downwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap; boxes that only share an edge do not collide
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Enemy-only attack cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyState {
    /// Multiplier fixed at spawn
    pub difficulty: u32,
    /// Ticks until the next attack may land
    pub attack_timer: u32,
    /// Ticks between attacks
    pub attack_frequency: u32,
}

/// A combatant in the arena
#[derive(Debug, Clone)]
pub struct Fighter {
    pub id: EntityId,
    pub role: Role,

    // Position (top-left) and vertical motion
    pub x: f32,
    pub y: f32,
    pub vel_y: f32,
    pub facing: Facing,
    pub on_ground: bool,

    pub intent: Intent,

    // Combat
    pub health: u32,
    pub attack_damage: u32,
    pub alive: bool,

    pub animation: AnimationState,
    pub frames: &'static AnimationTable,

    pub enemy: Option<EnemyState>,
}

impl Fighter {
    pub fn player(id: EntityId, x: f32, y: f32) -> Self {
        Self {
            id,
            role: Role::Player,
            x,
            y,
            vel_y: 0.0,
            facing: Facing::Right,
            on_ground: true,
            intent: Intent::default(),
            health: PLAYER_HEALTH,
            attack_damage: PLAYER_ATTACK_DAMAGE,
            alive: true,
            animation: AnimationState::default(),
            frames: &PLAYER_ANIMATIONS,
            enemy: None,
        }
    }

    pub fn enemy(id: EntityId, x: f32, y: f32, difficulty: u32) -> Self {
        let stats = EnemyStats::for_difficulty(difficulty);
        Self {
            id,
            role: Role::Enemy,
            x,
            y,
            vel_y: 0.0,
            facing: Facing::Left,
            on_ground: true,
            intent: Intent::default(),
            health: stats.health,
            attack_damage: stats.attack_damage,
            alive: true,
            animation: AnimationState::default(),
            frames: &ENEMY_ANIMATIONS,
            enemy: Some(EnemyState {
                difficulty: stats.difficulty,
                attack_timer: 0,
                attack_frequency: stats.attack_frequency,
            }),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.frames.frame_width,
            height: self.frames.frame_height,
        }
    }

    /// Start a jump unless one is already in progress. Returns true if the
    /// launch impulse was applied.
    pub fn trigger_jump(&mut self) -> bool {
        if self.intent.jumping {
            return false;
        }
        self.intent.jumping = true;
        self.on_ground = false;
        self.vel_y = JUMP_IMPULSE;
        true
    }

    /// Start an attack unless one is already in progress
    pub fn trigger_attack(&mut self) -> bool {
        if self.intent.attacking {
            return false;
        }
        self.intent.attacking = true;
        true
    }

    /// Subtract damage, clamping at zero. Returns true if this hit killed.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

//! Arena motion: horizontal movement, gravity, ground and boundary clamps

use super::entity::{Facing, Fighter, Horizontal};

/// Downward acceleration in units/tick²
pub const GRAVITY: f32 = 0.4;
/// Initial vertical velocity of a jump (negative is up)
pub const JUMP_IMPULSE: f32 = -10.0;
/// Player horizontal speed in units/tick
pub const PLAYER_RUN_SPEED: f32 = 5.0;
/// Enemy chase speed in units/tick
pub const ENEMY_CHASE_SPEED: f32 = 2.0;

/// Playable area. The floor line is `height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Physics system for updating fighter positions
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Move by the fighter's horizontal intent at `speed`, then clamp
    pub fn apply_movement(fighter: &mut Fighter, speed: f32, arena: &Arena) {
        match fighter.intent.horizontal {
            Horizontal::Right => {
                fighter.x += speed;
                fighter.facing = Facing::Right;
            }
            Horizontal::Left => {
                fighter.x -= speed;
                fighter.facing = Facing::Left;
            }
            Horizontal::None => {}
        }

        Self::clamp_horizontal(fighter, arena);
    }

    /// One-axis seek towards `target_x`. Sets the chaser's horizontal intent
    /// so the Run animation follows the movement. Exact equality stands still.
    pub fn chase(fighter: &mut Fighter, target_x: f32, arena: &Arena) {
        fighter.intent.horizontal = if fighter.x < target_x {
            Horizontal::Right
        } else if fighter.x > target_x {
            Horizontal::Left
        } else {
            Horizontal::None
        };

        Self::apply_movement(fighter, ENEMY_CHASE_SPEED, arena);
    }

    /// Integrate gravity while airborne and resolve floor/ceiling contact
    pub fn apply_gravity(fighter: &mut Fighter, arena: &Arena) {
        if fighter.on_ground {
            return;
        }

        fighter.vel_y += GRAVITY;
        fighter.y += fighter.vel_y;

        let height = fighter.bounds().height;
        if fighter.y + height >= arena.height {
            fighter.y = arena.height - height;
            fighter.vel_y = 0.0;
            fighter.on_ground = true;
        }

        // Hitting the ceiling stops the ascent; the fighter stays airborne and
        // falls back under gravity.
        if fighter.y < 0.0 {
            fighter.y = 0.0;
            fighter.vel_y = 0.0;
        }
    }

    /// Keep the bounding box inside `[0, arena.width]`
    pub fn clamp_horizontal(fighter: &mut Fighter, arena: &Arena) {
        let width = fighter.bounds().width;
        if fighter.x < 0.0 {
            fighter.x = 0.0;
        }
        if fighter.x + width > arena.width {
            fighter.x = (arena.width - width).max(0.0);
        }
    }

    /// Pull a spawn point inside the arena. A grounded fighter is stood on
    /// the floor line; an airborne one stays at or above it.
    pub fn clamp_spawn(fighter: &mut Fighter, arena: &Arena) {
        Self::clamp_horizontal(fighter, arena);
        let floor_y = (arena.height - fighter.bounds().height).max(0.0);
        fighter.y = if fighter.on_ground {
            floor_y
        } else {
            fighter.y.clamp(0.0, floor_y)
        };
    }

    /// Check collision between two fighters
    pub fn overlaps(a: &Fighter, b: &Fighter) -> bool {
        a.bounds().intersects(&b.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::default()
    }

    #[test]
    fn player_runs_right_fifty_units_in_ten_ticks() {
        let mut player = Fighter::player(0, 450.0, 600.0);
        player.intent.horizontal = Horizontal::Right;
        for _ in 0..10 {
            PhysicsSystem::apply_movement(&mut player, PLAYER_RUN_SPEED, &arena());
        }
        assert_eq!(player.x, 500.0);
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn driven_past_left_edge_clamps_to_zero() {
        let mut player = Fighter::player(0, -100.0, 600.0);
        PhysicsSystem::clamp_horizontal(&mut player, &arena());
        assert_eq!(player.bounds().left(), 0.0);
    }

    #[test]
    fn driven_past_right_edge_clamps_to_arena_width() {
        let arena = arena();
        let mut player = Fighter::player(0, arena.width + 100.0, 600.0);
        PhysicsSystem::clamp_horizontal(&mut player, &arena);
        assert_eq!(player.bounds().right(), arena.width);
    }

    #[test]
    fn enemy_chases_player_and_stands_still_on_equality() {
        let arena = arena();
        let mut enemy = Fighter::enemy(1, 900.0, 600.0, 1);

        PhysicsSystem::chase(&mut enemy, 450.0, &arena);
        assert_eq!(enemy.x, 898.0);
        assert_eq!(enemy.facing, Facing::Left);
        assert_eq!(enemy.intent.horizontal, Horizontal::Left);

        PhysicsSystem::chase(&mut enemy, 1000.0, &arena);
        assert_eq!(enemy.x, 900.0);
        assert_eq!(enemy.facing, Facing::Right);

        PhysicsSystem::chase(&mut enemy, 900.0, &arena);
        assert_eq!(enemy.x, 900.0);
        assert_eq!(enemy.intent.horizontal, Horizontal::None);
        assert_eq!(enemy.facing, Facing::Right);
    }

    #[test]
    fn jump_arc_lands_on_the_floor() {
        let arena = arena();
        let mut player = Fighter::player(0, 450.0, 600.0);
        assert!(player.trigger_jump());

        let mut ticks = 0;
        while !player.on_ground {
            PhysicsSystem::apply_gravity(&mut player, &arena);
            ticks += 1;
            assert!(ticks < 200, "never landed");
        }

        assert_eq!(player.vel_y, 0.0);
        assert_eq!(player.bounds().bottom(), arena.height);
        assert!(ticks > 40);
    }

    #[test]
    fn grounded_fighter_ignores_gravity() {
        let mut player = Fighter::player(0, 450.0, 600.0);
        PhysicsSystem::apply_gravity(&mut player, &arena());
        assert_eq!(player.y, 600.0);
        assert_eq!(player.vel_y, 0.0);
    }

    #[test]
    fn grounded_spawn_stands_on_the_floor() {
        let arena = arena();
        let mut player = Fighter::player(0, 450.0, 600.0);
        PhysicsSystem::clamp_spawn(&mut player, &arena);
        assert!(player.on_ground);
        assert_eq!(player.bounds().bottom(), arena.height);

        let mut below = Fighter::player(0, 450.0, 900.0);
        PhysicsSystem::clamp_spawn(&mut below, &arena);
        assert_eq!(below.bounds().bottom(), arena.height);
    }

    #[test]
    fn ceiling_stops_ascent_without_grounding() {
        let mut player = Fighter::player(0, 450.0, 3.0);
        player.trigger_jump();
        PhysicsSystem::apply_gravity(&mut player, &arena());

        assert_eq!(player.y, 0.0);
        assert_eq!(player.vel_y, 0.0);
        assert!(!player.on_ground);

        PhysicsSystem::apply_gravity(&mut player, &arena());
        assert!(player.y > 0.0);
    }
}

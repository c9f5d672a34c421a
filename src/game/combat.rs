//! Combat system - melee hit detection, damage and removal

use super::entity::{EntityId, Fighter};
use super::physics::PhysicsSystem;

/// Highest accepted enemy difficulty
pub const MAX_ENEMY_DIFFICULTY: u32 = 1000;

/// Enemy stats derived from difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStats {
    pub difficulty: u32,
    pub health: u32,
    pub attack_damage: u32,
    /// Ticks between attacks
    pub attack_frequency: u32,
}

impl EnemyStats {
    pub fn for_difficulty(difficulty: u32) -> Self {
        let difficulty = difficulty.clamp(1, MAX_ENEMY_DIFFICULTY);
        Self {
            difficulty,
            health: 50 * difficulty,
            attack_damage: 5 * difficulty,
            attack_frequency: (60 / difficulty).max(15),
        }
    }
}

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitResult {
    pub attacker_id: EntityId,
    pub target_id: EntityId,
    pub damage: u32,
    pub remaining_health: u32,
    pub target_killed: bool,
}

/// Combat system for resolving melee exchanges
pub struct CombatSystem;

impl CombatSystem {
    /// Player strikes every overlapping enemy each tick it is attacking.
    /// Killed enemies are removed from `enemies` before returning.
    pub fn resolve_player_attack(player: &Fighter, enemies: &mut Vec<Fighter>) -> Vec<HitResult> {
        if !player.alive || !player.intent.attacking {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for enemy in enemies.iter_mut() {
            if !enemy.alive || !PhysicsSystem::overlaps(player, enemy) {
                continue;
            }

            let killed = enemy.take_damage(player.attack_damage);
            hits.push(HitResult {
                attacker_id: player.id,
                target_id: enemy.id,
                damage: player.attack_damage,
                remaining_health: enemy.health,
                target_killed: killed,
            });
        }

        enemies.retain(|enemy| enemy.alive);
        hits
    }

    /// Each enemy attacks on a fixed cadence: its timer counts down every tick
    /// and an attack lands when it reaches zero while overlapping the player.
    pub fn resolve_enemy_attacks(enemies: &mut [Fighter], player: &mut Fighter) -> Vec<HitResult> {
        let mut hits = Vec::new();

        for enemy in enemies.iter_mut() {
            if !enemy.alive {
                continue;
            }
            let overlapping = PhysicsSystem::overlaps(enemy, player);
            let Some(state) = enemy.enemy.as_mut() else {
                continue;
            };

            state.attack_timer = state.attack_timer.saturating_sub(1);
            if state.attack_timer > 0 || !overlapping || !player.alive {
                continue;
            }

            state.attack_timer = state.attack_frequency;
            enemy.intent.attacking = true;

            let killed = player.take_damage(enemy.attack_damage);
            hits.push(HitResult {
                attacker_id: enemy.id,
                target_id: player.id,
                damage: enemy.attack_damage,
                remaining_health: player.health,
                target_killed: killed,
            });
        }

        hits
    }
}

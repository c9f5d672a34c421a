//! Scene snapshots handed to the renderer and audio player

use serde::Serialize;

use super::animation::{FrameSelector, SoundCue};
use super::combat::HitResult;
use super::entity::{EntityId, Fighter, Role};
use super::MatchPhase;

/// What an external presenter needs to draw one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub role: Role,
    pub x: f32,
    pub y: f32,
    pub health: u32,
    pub alive: bool,
    pub frame: FrameSelector,
}

impl From<&Fighter> for EntityView {
    fn from(fighter: &Fighter) -> Self {
        Self {
            id: fighter.id,
            role: fighter.role,
            x: fighter.x,
            y: fighter.y,
            health: fighter.health,
            alive: fighter.alive,
            frame: fighter.animation.frame(fighter.frames, fighter.facing),
        }
    }
}

/// Game events that occurred during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Melee hit registered
    Hit {
        attacker_id: EntityId,
        target_id: EntityId,
        damage: u32,
        remaining_health: u32,
    },

    /// Entity health reached zero
    Kill {
        killer_id: EntityId,
        victim_id: EntityId,
    },
}

impl GameEvent {
    pub fn from_hits(hits: Vec<HitResult>) -> impl Iterator<Item = GameEvent> {
        hits.into_iter().flat_map(|hit| {
            let kill = hit.target_killed.then_some(GameEvent::Kill {
                killer_id: hit.attacker_id,
                victim_id: hit.target_id,
            });
            std::iter::once(GameEvent::Hit {
                attacker_id: hit.attacker_id,
                target_id: hit.target_id,
                damage: hit.damage,
                remaining_health: hit.remaining_health,
            })
            .chain(kill)
        })
    }
}

/// Full visual/audio state for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    pub player: EntityView,
    pub enemies: Vec<EntityView>,
    /// Cues to play this tick
    pub cues: Vec<SoundCue>,
    pub events: Vec<GameEvent>,
}

/// Builds one snapshot per tick, carrying the cues and events recorded
/// since the previous one
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    pending_cues: Vec<SoundCue>,
    pending_events: Vec<GameEvent>,
}

impl SnapshotBuilder {
    /// Queue a tick's cues and events for the next snapshot
    pub fn record(&mut self, cues: Vec<SoundCue>, events: Vec<GameEvent>) {
        self.pending_cues.extend(cues);
        self.pending_events.extend(events);
    }

    /// Build a snapshot message, draining pending cues and events
    pub fn build(
        &mut self,
        tick: u64,
        phase: MatchPhase,
        player: &Fighter,
        enemies: &[Fighter],
    ) -> SceneSnapshot {
        SceneSnapshot {
            tick,
            phase,
            player: EntityView::from(player),
            enemies: enemies.iter().map(EntityView::from).collect(),
            cues: std::mem::take(&mut self.pending_cues),
            events: std::mem::take(&mut self.pending_events),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::animation::Action;

    #[test]
    fn kill_follows_its_hit() {
        let hits = vec![
            HitResult {
                attacker_id: 0,
                target_id: 1,
                damage: 10,
                remaining_health: 0,
                target_killed: true,
            },
            HitResult {
                attacker_id: 0,
                target_id: 2,
                damage: 10,
                remaining_health: 40,
                target_killed: false,
            },
        ];

        let events: Vec<GameEvent> = GameEvent::from_hits(hits).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            GameEvent::Kill {
                killer_id: 0,
                victim_id: 1
            }
        );
    }

    #[test]
    fn build_drains_recorded_cues() {
        let mut builder = SnapshotBuilder::default();
        let player = Fighter::player(0, 450.0, 600.0);

        builder.record(vec![SoundCue::Step], Vec::new());
        builder.record(vec![SoundCue::Attack], Vec::new());

        let snapshot = builder.build(2, MatchPhase::InProgress, &player, &[]);
        assert_eq!(snapshot.cues, vec![SoundCue::Step, SoundCue::Attack]);
        assert_eq!(snapshot.player.frame.strip, Action::Idle);

        let next = builder.build(3, MatchPhase::InProgress, &player, &[]);
        assert!(next.cues.is_empty());
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut builder = SnapshotBuilder::default();
        let player = Fighter::player(0, 450.0, 600.0);
        let enemy = Fighter::enemy(1, 900.0, 600.0, 1);
        let snapshot = builder.build(7, MatchPhase::InProgress, &player, &[enemy]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["tick"], 7);
        assert_eq!(json["enemies"][0]["role"], "enemy");
        assert_eq!(json["player"]["frame"]["strip"], "idle");
    }
}

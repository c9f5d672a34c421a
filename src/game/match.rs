//! Match state and fixed-tick loop

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::util::time::{tick_duration, Timer};

use super::animation::SoundCue;
use super::combat::CombatSystem;
use super::entity::{EntityId, Fighter};
use super::input::{Key, KeyEvent, KeyboardState};
use super::physics::{Arena, PhysicsSystem, PLAYER_RUN_SPEED};
use super::snapshot::{GameEvent, SceneSnapshot, SnapshotBuilder};
use super::{ControlHandle, PlayerInput};

/// Where the player starts (top-left of the sprite)
pub const PLAYER_SPAWN: (f32, f32) = (450.0, 600.0);
/// Where the first enemy starts
pub const ENEMY_SPAWN: (f32, f32) = (900.0, 600.0);
/// Horizontal gap between additional enemies
pub const ENEMY_SPACING: f32 = 120.0;

/// How a finished match went for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every enemy is down
    Victory,
    /// The player is down
    Defeat,
}

impl Outcome {
    /// Overlay text for the game-over screen
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Victory => "K.O.",
            Outcome::Defeat => "Try it Again",
        }
    }

    pub fn cue(self) -> SoundCue {
        match self {
            Outcome::Victory => SoundCue::Victory,
            Outcome::Defeat => SoundCue::Defeat,
        }
    }
}

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Menu: waiting for a controller or a start request
    Waiting,
    /// Fight in progress
    InProgress,
    /// Match ended
    Ended(Outcome),
}

/// Match parameters, fixed at match start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    pub arena: Arena,
    pub enemy_difficulty: u32,
    pub enemy_count: usize,
    pub wait_for_controller: bool,
    /// After the outcome, keep the loop alive until quit
    pub hold_game_over: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            enemy_difficulty: 1,
            enemy_count: 1,
            wait_for_controller: false,
            hold_game_over: true,
        }
    }
}

impl From<&Config> for MatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            arena: Arena {
                width: config.arena_width,
                height: config.arena_height,
            },
            enemy_difficulty: config.enemy_difficulty,
            enemy_count: config.enemy_count,
            wait_for_controller: config.wait_for_controller,
            hold_game_over: config.hold_game_over,
        }
    }
}

/// Cues and events produced by one tick
#[derive(Debug, Default)]
pub struct TickOutput {
    pub cues: Vec<SoundCue>,
    pub events: Vec<GameEvent>,
}

/// Match state (owned by match task)
pub struct MatchState {
    pub phase: MatchPhase,
    pub tick: u64,
    pub arena: Arena,
    pub player: Fighter,
    /// Active enemies; removed the tick they die
    pub enemies: Vec<Fighter>,
    pub keyboard: KeyboardState,
    pub quit_requested: bool,
}

impl MatchState {
    pub fn new(settings: &MatchSettings) -> Self {
        let arena = settings.arena;

        let mut player = Fighter::player(0, PLAYER_SPAWN.0, PLAYER_SPAWN.1);
        PhysicsSystem::clamp_spawn(&mut player, &arena);

        let enemies = (0..settings.enemy_count)
            .map(|i| {
                let id = i as EntityId + 1;
                let x = ENEMY_SPAWN.0 + ENEMY_SPACING * i as f32;
                let mut enemy = Fighter::enemy(id, x, ENEMY_SPAWN.1, settings.enemy_difficulty);
                PhysicsSystem::clamp_spawn(&mut enemy, &arena);
                enemy
            })
            .collect();

        let phase = if settings.wait_for_controller {
            MatchPhase::Waiting
        } else {
            MatchPhase::InProgress
        };

        Self {
            phase,
            tick: 0,
            arena,
            player,
            enemies,
            keyboard: KeyboardState::default(),
            quit_requested: false,
        }
    }

    /// Apply one queued input. Intents only reach the player while the fight
    /// is on; menu and game-over screens ignore them.
    pub fn apply_input(&mut self, input: PlayerInput) {
        match input {
            PlayerInput::Key(KeyEvent::Down(Key::Escape)) => {
                info!("Quit requested");
                self.quit_requested = true;
            }
            PlayerInput::ControllerConnected(peer) => {
                info!(peer = %peer, "Controller attached");
                self.start();
            }
            PlayerInput::ControllerDisconnected(peer) => {
                info!(peer = %peer, "Controller detached");
            }
            PlayerInput::StartRequested => self.start(),
            PlayerInput::Remote(command) => {
                if self.phase == MatchPhase::InProgress {
                    command.apply(&mut self.player);
                } else {
                    debug!(command = %command, "Ignoring command outside of fight");
                }
            }
            PlayerInput::Key(event) => {
                if self.phase == MatchPhase::InProgress {
                    self.keyboard.apply(&mut self.player, event);
                }
            }
        }
    }

    fn start(&mut self) {
        if self.phase == MatchPhase::Waiting {
            self.phase = MatchPhase::InProgress;
            info!(enemies = self.enemies.len(), "Fight started");
        }
    }

    /// Run a single simulation tick: physics, animation, combat, then the
    /// terminal check. Nothing moves outside `InProgress`.
    pub fn run_tick(&mut self) -> TickOutput {
        let mut output = TickOutput::default();
        self.tick += 1;

        if self.phase != MatchPhase::InProgress {
            return output;
        }

        self.update_physics();
        output.cues.extend(self.update_animation());
        output.events.extend(self.update_combat());

        if let Some(outcome) = self.check_outcome() {
            self.phase = MatchPhase::Ended(outcome);
            output.cues.push(outcome.cue());
            info!(tick = self.tick, outcome = outcome.message(), "Match over");
        }

        output
    }

    fn update_physics(&mut self) {
        let arena = self.arena;

        if self.player.alive {
            PhysicsSystem::apply_movement(&mut self.player, PLAYER_RUN_SPEED, &arena);
            PhysicsSystem::apply_gravity(&mut self.player, &arena);
        }

        let target_x = self.player.x;
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            PhysicsSystem::chase(enemy, target_x, &arena);
            PhysicsSystem::apply_gravity(enemy, &arena);
        }
    }

    fn update_animation(&mut self) -> Vec<SoundCue> {
        let mut cues = Vec::new();
        for fighter in std::iter::once(&mut self.player).chain(self.enemies.iter_mut()) {
            if !fighter.alive {
                continue;
            }
            let frames = fighter.frames;
            if let Some(cue) = fighter.animation.step(&mut fighter.intent, frames) {
                cues.push(cue);
            }
        }
        cues
    }

    fn update_combat(&mut self) -> Vec<GameEvent> {
        let mut hits = CombatSystem::resolve_player_attack(&self.player, &mut self.enemies);
        hits.extend(CombatSystem::resolve_enemy_attacks(
            &mut self.enemies,
            &mut self.player,
        ));

        for hit in &hits {
            debug!(
                attacker = hit.attacker_id,
                target = hit.target_id,
                damage = hit.damage,
                health = hit.remaining_health,
                "Hit"
            );
            if hit.target_killed {
                info!(victim = hit.target_id, killer = hit.attacker_id, "Fighter down");
            }
        }

        GameEvent::from_hits(hits).collect()
    }

    fn check_outcome(&self) -> Option<Outcome> {
        if !self.player.alive {
            Some(Outcome::Defeat)
        } else if self.enemies.is_empty() {
            Some(Outcome::Victory)
        } else {
            None
        }
    }
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub input_tx: mpsc::Sender<PlayerInput>,
    pub snapshot_tx: broadcast::Sender<SceneSnapshot>,
}

impl MatchHandle {
    /// Handle scoped to the player's intents, for the command channel
    pub fn control(&self) -> ControlHandle {
        ControlHandle::new(self.input_tx.clone())
    }

    /// Subscribe to per-tick scene snapshots
    pub fn subscribe(&self) -> broadcast::Receiver<SceneSnapshot> {
        self.snapshot_tx.subscribe()
    }
}

/// The match loop
pub struct GameMatch {
    state: MatchState,
    input_rx: mpsc::Receiver<PlayerInput>,
    snapshot_tx: broadcast::Sender<SceneSnapshot>,
    snapshot_builder: SnapshotBuilder,
    hold_game_over: bool,
    shutdown: watch::Receiver<bool>,
}

impl GameMatch {
    /// Create a new match
    pub fn new(settings: &MatchSettings, shutdown: watch::Receiver<bool>) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);

        let handle = MatchHandle {
            input_tx,
            snapshot_tx: snapshot_tx.clone(),
        };

        let game_match = Self {
            state: MatchState::new(settings),
            input_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::default(),
            hold_game_over: settings.hold_game_over,
            shutdown,
        };

        (game_match, handle)
    }

    /// Run the fixed-tick loop until quit or shutdown. Without
    /// `hold_game_over` the loop also returns as soon as the match ends.
    /// Returns the outcome if the fight was decided.
    pub async fn run(self) -> Option<Outcome> {
        self.run_with_period(tick_duration()).await
    }

    async fn run_with_period(mut self, period: Duration) -> Option<Outcome> {
        info!(
            enemies = self.state.enemies.len(),
            phase = ?self.state.phase,
            "Match loop started"
        );
        let timer = Timer::new();
        let mut finished = None;

        let mut tick_interval = interval(period);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Match loop stopping on shutdown");
                        return finished;
                    }
                    continue;
                }
            }

            // Drain input queue
            self.process_inputs();
            if self.state.quit_requested {
                return finished;
            }
            if finished.is_some() {
                continue;
            }

            // Run simulation tick
            let output = self.state.run_tick();
            self.snapshot_builder.record(output.cues, output.events);

            let snapshot = self.snapshot_builder.build(
                self.state.tick,
                self.state.phase,
                &self.state.player,
                &self.state.enemies,
            );

            // No subscribers is fine; presenters are optional
            let _ = self.snapshot_tx.send(snapshot);

            if let MatchPhase::Ended(outcome) = self.state.phase {
                info!(
                    outcome = outcome.message(),
                    ticks = self.state.tick,
                    elapsed_ms = timer.elapsed_ms(),
                    "Match finished"
                );
                if !self.hold_game_over {
                    return Some(outcome);
                }
                info!("Showing game-over screen until quit");
                finished = Some(outcome);
            }
        }
    }

    /// Process all pending inputs in arrival order
    fn process_inputs(&mut self) {
        loop {
            match self.input_rx.try_recv() {
                Ok(input) => self.state.apply_input(input),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    warn!("All input sources closed");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::animation::Action;
    use crate::game::entity::{Facing, Horizontal};
    use crate::game::input::RemoteCommand;
    use crate::game::physics::JUMP_IMPULSE;

    fn fight() -> MatchState {
        MatchState::new(&MatchSettings::default())
    }

    #[test]
    fn run_right_for_ten_ticks() {
        let mut state = fight();
        state.enemies[0].x = 1100.0;
        state.apply_input(PlayerInput::Remote(RemoteCommand::Right));

        for _ in 0..10 {
            state.run_tick();
            assert_eq!(state.player.animation.action, Action::Run);
            assert_eq!(state.player.facing, Facing::Right);
        }
        assert_eq!(state.player.x, 500.0);
    }

    #[test]
    fn five_attack_ticks_on_fresh_enemy_win_the_match() {
        let mut state = fight();
        state.enemies[0].x = state.player.x + 10.0;
        // Keep the enemy from hitting back during the exchange
        state.enemies[0].enemy.as_mut().unwrap().attack_timer = 100;
        state.apply_input(PlayerInput::Remote(RemoteCommand::Attack));

        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(state.run_tick().events);
        }

        assert!(state.enemies.is_empty());
        assert_eq!(state.phase, MatchPhase::Ended(Outcome::Victory));
        assert!(events.contains(&GameEvent::Kill {
            killer_id: 0,
            victim_id: 1
        }));
    }

    #[test]
    fn jump_lands_and_animation_ends_on_its_own() {
        let mut state = fight();
        state.enemies[0].x = 1100.0;
        state.apply_input(PlayerInput::Remote(RemoteCommand::Jump));
        assert_eq!(state.player.vel_y, JUMP_IMPULSE);
        assert!(!state.player.on_ground);

        let mut landed_at = None;
        let mut anim_done_at = None;
        for tick in 1..=120 {
            state.run_tick();
            if landed_at.is_none() && state.player.on_ground {
                landed_at = Some(tick);
                assert_eq!(state.player.vel_y, 0.0);
            }
            if anim_done_at.is_none() && !state.player.intent.jumping {
                anim_done_at = Some(tick);
            }
        }

        assert_eq!(anim_done_at, Some(60));
        assert!(landed_at.is_some_and(|tick| tick < 60));
    }

    #[test]
    fn repeated_jump_commands_do_not_relaunch() {
        let mut state = fight();
        state.apply_input(PlayerInput::Remote(RemoteCommand::Jump));
        state.run_tick();
        let vel = state.player.vel_y;

        state.apply_input(PlayerInput::Remote(RemoteCommand::Jump));
        assert_eq!(state.player.vel_y, vel);
    }

    #[test]
    fn same_tick_commands_resolve_last_wins() {
        let mut state = fight();
        state.apply_input(PlayerInput::Remote(RemoteCommand::Right));
        state.apply_input(PlayerInput::Remote(RemoteCommand::Left));
        assert_eq!(state.player.intent.horizontal, Horizontal::Left);
    }

    #[test]
    fn enemy_wins_when_player_health_runs_out() {
        let mut state = fight();
        state.enemies[0].x = state.player.x;
        state.player.health = 5;

        let output = state.run_tick();
        assert_eq!(state.phase, MatchPhase::Ended(Outcome::Defeat));
        assert_eq!(state.player.health, 0);
        assert!(!state.player.alive);
        assert!(output.cues.contains(&SoundCue::Defeat));

        // No further simulation and no resurrection
        let before = state.player.x;
        state.run_tick();
        assert_eq!(state.player.x, before);
        assert!(!state.player.alive);
    }

    #[test]
    fn waiting_match_ignores_intents_until_controller_connects() {
        let mut state = MatchState::new(&MatchSettings {
            wait_for_controller: true,
            ..MatchSettings::default()
        });
        assert_eq!(state.phase, MatchPhase::Waiting);

        state.apply_input(PlayerInput::Remote(RemoteCommand::Right));
        state.run_tick();
        assert_eq!(state.player.x, PLAYER_SPAWN.0);

        state.apply_input(PlayerInput::ControllerConnected("127.0.0.1:5000".parse().unwrap()));
        assert_eq!(state.phase, MatchPhase::InProgress);
    }

    #[test]
    fn multiple_enemies_spawn_spaced_inside_arena() {
        let state = MatchState::new(&MatchSettings {
            enemy_count: 5,
            ..MatchSettings::default()
        });
        assert_eq!(state.enemies.len(), 5);
        assert_eq!(state.enemies[1].x, ENEMY_SPAWN.0 + ENEMY_SPACING);
        for enemy in &state.enemies {
            assert!(enemy.bounds().right() <= state.arena.width);
        }
    }

    #[test]
    fn health_never_increases_over_a_long_fight() {
        let mut state = fight();
        state.enemies[0].x = state.player.x + 20.0;
        let mut last_player = state.player.health;
        let mut last_enemy = state.enemies[0].health;

        for tick in 0..600 {
            if tick % 40 == 0 {
                state.apply_input(PlayerInput::Remote(RemoteCommand::Attack));
            }
            state.run_tick();
            assert!(state.player.health <= last_player);
            last_player = state.player.health;
            if let Some(enemy) = state.enemies.first() {
                assert!(enemy.health <= last_enemy);
                assert!(enemy.alive);
                last_enemy = enemy.health;
            }
        }
    }

    #[test]
    fn start_request_leaves_the_menu() {
        let mut state = MatchState::new(&MatchSettings {
            wait_for_controller: true,
            ..MatchSettings::default()
        });
        state.apply_input(PlayerInput::StartRequested);
        assert_eq!(state.phase, MatchPhase::InProgress);

        state.apply_input(PlayerInput::Key(KeyEvent::Down(Key::D)));
        state.run_tick();
        assert_eq!(state.player.x, PLAYER_SPAWN.0 + PLAYER_RUN_SPEED);
    }

    #[test]
    fn fighters_spawn_standing_on_the_floor() {
        let mut state = fight();
        let floor = state.arena.height;
        assert!(state.player.on_ground);
        assert_eq!(state.player.bounds().bottom(), floor);
        assert_eq!(state.enemies[0].bounds().bottom(), floor);

        state.enemies[0].x = 1100.0;
        state.apply_input(PlayerInput::Remote(RemoteCommand::Jump));
        for _ in 0..120 {
            state.run_tick();
        }
        assert!(state.player.on_ground);
        assert_eq!(state.player.y, state.enemies[0].y);
    }

    #[test]
    fn escape_requests_quit() {
        let mut state = fight();
        state.apply_input(PlayerInput::Key(KeyEvent::Down(Key::Escape)));
        assert!(state.quit_requested);
    }

    #[tokio::test]
    async fn loop_publishes_snapshots_and_reports_victory() {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let settings = MatchSettings {
            hold_game_over: false,
            ..MatchSettings::default()
        };
        let (game_match, handle) = GameMatch::new(&settings, shutdown_rx);
        let mut snapshots = handle.subscribe();

        let control = handle.control();
        control
            .send(PlayerInput::Key(KeyEvent::Down(Key::Q)))
            .await
            .unwrap();

        let mut game_match = game_match;
        game_match.state.enemies[0].x = game_match.state.player.x;
        game_match.state.enemies[0].health = 10;

        let outcome = game_match.run_with_period(Duration::from_millis(1)).await;
        assert_eq!(outcome, Some(Outcome::Victory));

        let snapshot = snapshots.recv().await.unwrap();
        assert_eq!(snapshot.phase, MatchPhase::Ended(Outcome::Victory));
        assert!(snapshot.enemies.is_empty());
        assert!(snapshot.cues.contains(&SoundCue::Victory));
    }

    #[tokio::test]
    async fn game_over_screen_holds_until_escape() {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (mut game_match, handle) = GameMatch::new(&MatchSettings::default(), shutdown_rx);
        let mut snapshots = handle.subscribe();
        game_match.state.player.health = 0;
        game_match.state.player.alive = false;

        let control = handle.control();
        let task = tokio::spawn(game_match.run_with_period(Duration::from_millis(1)));

        let snapshot = snapshots.recv().await.unwrap();
        assert_eq!(snapshot.phase, MatchPhase::Ended(Outcome::Defeat));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        control
            .send(PlayerInput::Key(KeyEvent::Down(Key::Escape)))
            .await
            .unwrap();
        assert_eq!(task.await.unwrap(), Some(Outcome::Defeat));
    }

    #[tokio::test]
    async fn loop_stops_on_shutdown() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (game_match, _handle) = GameMatch::new(
            &MatchSettings {
                wait_for_controller: true,
                ..MatchSettings::default()
            },
            shutdown_rx,
        );

        let task = tokio::spawn(game_match.run_with_period(Duration::from_millis(1)));
        shutdown_tx.send(true).unwrap();
        assert_eq!(task.await.unwrap(), None);
    }
}

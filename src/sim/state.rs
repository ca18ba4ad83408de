//! Game state and level lifecycle
//!
//! `GameState` is the single aggregate the host owns: the player, the
//! current world, counters and the seeded RNG. Nothing lives in statics.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Cannon, Cannonball, Coin, Debris, Enemy, Flag, Platform, Player};
use super::generate::generate_world;
use super::level::LevelSet;
use crate::consts::*;

/// Level lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Start screen, no level loaded
    #[default]
    Idle,
    /// Active gameplay; the only phase in which `tick` does anything
    Running,
    /// Flag reached, waiting for the next level
    LevelComplete,
    /// Flag of the final level reached
    Won,
    /// Run ended (fall, enemy, cannonball)
    GameOver,
}

/// Discrete outcomes of a tick or transition, for HUD/audio/leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// New total score
    ScoreChanged(u64),
    /// New level number
    LevelChanged(u32),
    Jumped,
    CoinCollected,
    PlatformBroken,
    EnemyDefeated,
    CannonFired,
    /// Flag reached on the given level
    LevelComplete(u32),
    /// Final level completed
    GameWon,
    GameOver { score: u64 },
}

/// Everything generated for one level instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub platforms: Vec<Platform>,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub debris: Vec<Debris>,
    pub cannons: Vec<Cannon>,
    pub cannonballs: Vec<Cannonball>,
    /// Present once a level has been generated
    pub flag: Option<Flag>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Drives level generation and trick/debris rolls
    pub rng: Pcg32,
    pub levels: LevelSet,
    /// Current level (1-based, 0 before the first start)
    pub level: u32,
    pub score: u64,
    /// Best score seen; the host seeds it from storage
    pub high_score: u64,
    pub phase: GamePhase,
    /// Ticks simulated in the current level
    pub time_ticks: u64,
    pub player: Player,
    pub world: World,
    /// Left edge of the view, derived from the player every tick
    pub camera_x: f32,
}

impl GameState {
    /// Create an idle game with the reference levels
    pub fn new(seed: u64) -> Self {
        Self::with_levels(seed, LevelSet::default())
    }

    pub fn with_levels(seed: u64, levels: LevelSet) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            levels,
            level: 0,
            score: 0,
            high_score: 0,
            phase: GamePhase::Idle,
            time_ticks: 0,
            player: Player::default(),
            world: World::default(),
            camera_x: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Start a fresh run at level 1
    pub fn start(&mut self) -> Vec<GameEvent> {
        log::info!("Starting new run (seed {})", self.seed);
        self.score = 0;
        self.level = 1;
        let mut events = vec![GameEvent::ScoreChanged(0)];
        self.load_level(&mut events);
        events
    }

    /// Same as `start`; kept as its own entry point for hosts
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.start()
    }

    /// Advance to the next level. Only valid right after a level completes.
    pub fn next_level(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::LevelComplete {
            log::debug!("next_level ignored in phase {:?}", self.phase);
            return events;
        }
        self.level += 1;
        self.load_level(&mut events);
        events
    }

    /// The "confirm" action (jump key outside of a run)
    pub fn confirm(&mut self) -> Vec<GameEvent> {
        match self.phase {
            GamePhase::Idle | GamePhase::Won | GamePhase::GameOver => self.start(),
            GamePhase::LevelComplete => self.next_level(),
            GamePhase::Running => Vec::new(),
        }
    }

    /// Discard the current world and player state, build the level anew
    fn load_level(&mut self, events: &mut Vec<GameEvent>) {
        let Some(config) = self.levels.get(self.level) else {
            log::error!("No configuration for level {}", self.level);
            self.phase = GamePhase::Won;
            return;
        };

        self.world = generate_world(config, &mut self.rng);
        self.player = Player::default();
        self.camera_x = 0.0;
        self.time_ticks = 0;
        self.phase = GamePhase::Running;

        log::info!("Level {} loaded", self.level);
        events.push(GameEvent::LevelChanged(self.level));
    }

    /// Add points and report the new total
    pub fn add_score(&mut self, points: u64, events: &mut Vec<GameEvent>) {
        self.score += points;
        events.push(GameEvent::ScoreChanged(self.score));
    }

    /// Raise the best score if beaten; returns true if it changed
    pub fn checkpoint_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            true
        } else {
            false
        }
    }

    /// End the run. Only the first call while running has any effect.
    pub fn game_over(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.checkpoint_high_score();
        log::info!("Game over at level {} with score {}", self.level, self.score);
        events.push(GameEvent::GameOver { score: self.score });
    }

    /// Flag reached: stop the run and decide between next level and win
    pub fn complete_level(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.checkpoint_high_score();
        events.push(GameEvent::LevelComplete(self.level));

        if self.levels.is_final(self.level) {
            self.phase = GamePhase::Won;
            log::info!("Final level cleared with score {}", self.score);
            events.push(GameEvent::GameWon);
        } else {
            self.phase = GamePhase::LevelComplete;
            log::info!("Level {} complete, score {}", self.level, self.score);
        }
    }

    /// Center the view on the player, clamped to the world
    pub fn update_camera(&mut self) {
        let target = self.player.pos.x - (SCREEN_WIDTH / 2.0 - PLAYER_WIDTH / 2.0);
        let max = (self.world.width - SCREEN_WIDTH).max(0.0);
        self.camera_x = target.clamp(0.0, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_idle() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.level, 0);
        assert!(state.world.flag.is_none());
    }

    #[test]
    fn test_start_generates_level_one() {
        let mut state = GameState::new(1);
        let events = state.start();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.level, 1);
        assert_eq!(state.world.width, 5000.0);
        assert!(state.world.flag.is_some());
        assert_eq!(
            events,
            vec![GameEvent::ScoreChanged(0), GameEvent::LevelChanged(1)]
        );
    }

    #[test]
    fn test_next_level_only_after_completion() {
        let mut state = GameState::new(2);
        state.start();
        assert!(state.next_level().is_empty());
        assert_eq!(state.level, 1);

        let mut events = Vec::new();
        state.complete_level(&mut events);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(events, vec![GameEvent::LevelComplete(1)]);

        state.score = 300;
        let events = state.next_level();
        assert_eq!(events, vec![GameEvent::LevelChanged(2)]);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.world.width, 6500.0);
        // Score carries over between levels
        assert_eq!(state.score, 300);
    }

    #[test]
    fn test_final_level_wins() {
        let mut state = GameState::new(3);
        state.start();
        state.level = 3;
        let mut events = Vec::new();
        state.complete_level(&mut events);
        assert_eq!(state.phase, GamePhase::Won);
        assert_eq!(
            events,
            vec![GameEvent::LevelComplete(3), GameEvent::GameWon]
        );
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut state = GameState::new(4);
        state.start();
        state.score = 150;
        let mut events = Vec::new();
        state.game_over(&mut events);
        state.game_over(&mut events);
        assert_eq!(events, vec![GameEvent::GameOver { score: 150 }]);
        assert_eq!(state.high_score, 150);
    }

    #[test]
    fn test_high_score_not_lowered() {
        let mut state = GameState::new(5);
        state.high_score = 1000;
        state.score = 200;
        assert!(!state.checkpoint_high_score());
        assert_eq!(state.high_score, 1000);
    }

    #[test]
    fn test_confirm_walks_the_lifecycle() {
        let mut state = GameState::new(6);
        state.confirm();
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.confirm().is_empty());

        let mut events = Vec::new();
        state.complete_level(&mut events);
        state.confirm();
        assert_eq!(state.level, 2);

        state.game_over(&mut events);
        state.score = 75;
        state.confirm();
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_restart_regenerates_world() {
        let mut state = GameState::new(7);
        state.start();
        let first: Vec<_> = state.world.platforms.iter().map(|p| p.rect).collect();
        state.restart();
        let second: Vec<_> = state.world.platforms.iter().map(|p| p.rect).collect();
        // Same RNG stream continues, so the layout differs
        assert_ne!(first, second);
    }

    #[test]
    fn test_camera_clamps() {
        let mut state = GameState::new(8);
        state.start();
        state.player.pos.x = 10.0;
        state.update_camera();
        assert_eq!(state.camera_x, 0.0);

        state.player.pos.x = 2000.0;
        state.update_camera();
        assert_eq!(state.camera_x, 2000.0 - (SCREEN_WIDTH / 2.0 - PLAYER_WIDTH / 2.0));

        state.player.pos.x = state.world.width;
        state.update_camera();
        assert_eq!(state.camera_x, state.world.width - SCREEN_WIDTH);
    }
}

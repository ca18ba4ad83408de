//! Poppies Run - a side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, game state)
//! - `platform`: Fixed-timestep driver and input mapping
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `leaderboard`: Top-10 scores and best score
//! - `settings`: Host preferences

pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use leaderboard::Leaderboard;
pub use settings::Settings;

/// Game configuration constants
///
/// Physics values are expressed per tick, not per second.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Fixed timestep in milliseconds, as reported by browser timestamps
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Elapsed time per host callback is capped to avoid catch-up bursts
    pub const MAX_FRAME_MS: f64 = 200.0;

    /// Logical screen size
    pub const SCREEN_WIDTH: f32 = 1200.0;
    pub const SCREEN_HEIGHT: f32 = 700.0;

    /// Player collision box (the drawn sprite is 120x170)
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 100.0;
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = 400.0;

    /// Player movement
    pub const PLAYER_SPEED: f32 = 6.0;
    pub const JUMP_FORCE: f32 = -24.0;
    pub const GRAVITY: f32 = 0.9;
    /// Horizontal velocity multiplier per tick without input
    pub const MOVE_DAMPING: f32 = 0.8;
    /// Upward velocity multiplier when jump is released early
    pub const JUMP_CUT: f32 = 0.4;
    /// Tolerance for landing on top / bumping from below
    pub const CONTACT_TOLERANCE: f32 = 10.0;
    /// Player dies below this y
    pub const FALL_DEATH_Y: f32 = 800.0;

    /// Tricks (radians per tick)
    pub const FLIP_CHANCE: f32 = 0.25;
    pub const SPIN_CHANCE: f32 = 0.10;
    pub const FLIP_STEP: f32 = 0.15;
    pub const SPIN_STEP: f32 = 0.2;

    /// Walk cycle
    pub const WALK_FRAMES: u32 = 4;
    pub const WALK_FRAME_TICKS: u32 = 8;
    pub const ENEMY_WALK_FRAME_TICKS: u32 = 10;
    pub const WALK_SPEED_THRESHOLD: f32 = 0.5;

    /// Scoring
    pub const SCORE_PLATFORM_BREAK: u64 = 25;
    pub const SCORE_COIN: u64 = 50;
    pub const SCORE_ENEMY: u64 = 100;

    /// Vertical velocity after breaking a platform (positive is down)
    pub const BREAK_BOUNCE: f32 = 2.0;
    /// Fraction of the jump force applied after a stomp
    pub const STOMP_BOUNCE: f32 = 0.6;
    /// How far below an enemy's top the player's feet may be for a stomp
    pub const STOMP_TOLERANCE: f32 = 20.0;

    /// Coin hit box edge (the drawn coin is smaller)
    pub const COIN_HIT_SIZE: f32 = 30.0;

    /// Debris
    pub const DEBRIS_PER_BREAK: usize = 6;
    pub const DEBRIS_LIFETIME: u32 = 60;
    pub const DEBRIS_GRAVITY: f32 = 0.4;

    /// Floor and platforms
    pub const FLOOR_Y: f32 = 600.0;
    pub const FLOOR_HEIGHT: f32 = 100.0;
    pub const PLATFORM_HEIGHT: f32 = 40.0;
    /// Widest floor gap the generator produces
    pub const MAX_FLOOR_GAP: f32 = 200.0;

    /// Flag
    pub const FLAG_OFFSET: f32 = 300.0;
    pub const FLAG_WIDTH: f32 = 60.0;
    pub const FLAG_HEIGHT: f32 = 120.0;

    /// Cannons
    pub const CANNON_WIDTH: f32 = 90.0;
    pub const CANNON_HEIGHT: f32 = 55.0;
    pub const CANNONBALL_SIZE: f32 = 12.0;
    pub const CANNONBALL_SPEED_X: f32 = 3.0;
    pub const CANNONBALL_SPEED_Y: f32 = -1.5;
    /// Cannonballs this far outside the world are dropped
    pub const CANNONBALL_MARGIN_X: f32 = 50.0;
    pub const CANNONBALL_MIN_Y: f32 = -100.0;
}

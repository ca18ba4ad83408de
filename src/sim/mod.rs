//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod entity;
pub mod generate;
pub mod geom;
pub mod level;
pub mod state;
pub mod tick;

pub use entity::{Cannon, Cannonball, Coin, Debris, Enemy, Flag, Platform, PlatformKind, Player, Trick};
pub use generate::{flag_is_reachable, generate_world};
pub use geom::{Rect, coin_overlap, rects_overlap};
pub use level::{LevelConfig, LevelConfigError, LevelSet};
pub use state::{GameEvent, GamePhase, GameState, World};
pub use tick::{TickInput, tick};

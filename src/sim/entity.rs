//! Entity records
//!
//! Plain state owned by the simulation. Behavior lives in `tick` and
//! `generate`; the helpers here only keep per-entity invariants.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::*;

/// Cosmetic rotation performed during a jump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Trick {
    #[default]
    None,
    /// Full forward rotation, angle in radians
    Flip { rotation: f32 },
    /// Rotation around the vertical axis, angle in radians
    Spin { angle: f32 },
}

impl Trick {
    pub fn is_active(&self) -> bool {
        !matches!(self, Trick::None)
    }

    /// Advance the rotation by one tick; clears itself after a full turn
    pub fn advance(&mut self) {
        use std::f32::consts::TAU;
        match self {
            Trick::Flip { rotation } => {
                *rotation += FLIP_STEP;
                if *rotation >= TAU {
                    *self = Trick::None;
                }
            }
            Trick::Spin { angle } => {
                *angle += SPIN_STEP;
                if *angle >= TAU {
                    *self = Trick::None;
                }
            }
            Trick::None => {}
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the collision box
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub facing_right: bool,
    /// Jump started and not yet landed
    pub jump_held: bool,
    /// Early-release cut already applied to this jump
    pub jump_cut: bool,
    /// A single enum keeps flip and spin mutually exclusive
    pub trick: Trick,
    pub walk_frame: u32,
    pub walk_timer: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            vel: Vec2::ZERO,
            grounded: false,
            facing_right: true,
            jump_held: false,
            jump_cut: false,
            trick: Trick::None,
            walk_frame: 0,
            walk_timer: 0,
        }
    }
}

impl Player {
    pub fn size() -> Vec2 {
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Self::size(),
        }
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + PLAYER_HEIGHT
    }

    /// Snap onto a surface at `top` and clear airborne state
    pub fn land(&mut self, top: f32) {
        self.pos.y = top - PLAYER_HEIGHT;
        self.vel.y = 0.0;
        self.grounded = true;
        self.trick = Trick::None;
    }
}

/// Platform kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Ground segment, never breaks
    Floor,
    /// Floating platform, may be breakable
    Floating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
    pub breakable: bool,
    pub broken: bool,
}

impl Platform {
    pub fn floor(x: f32, width: f32) -> Self {
        Self {
            rect: Rect::new(x, FLOOR_Y, width, FLOOR_HEIGHT),
            kind: PlatformKind::Floor,
            breakable: false,
            broken: false,
        }
    }

    pub fn floating(x: f32, y: f32, width: f32, breakable: bool) -> Self {
        Self {
            rect: Rect::new(x, y, width, PLATFORM_HEIGHT),
            kind: PlatformKind::Floating,
            breakable,
            broken: false,
        }
    }

    /// Only floating platforms flagged breakable can ever break
    pub fn can_break(&self) -> bool {
        self.breakable && self.kind == PlatformKind::Floating
    }
}

/// A patrolling enemy bound to one platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub size: Vec2,
    /// Patrol center
    pub base_x: f32,
    /// Patrol half-range
    pub range: f32,
    pub speed: f32,
    /// +1 right, -1 left
    pub direction: f32,
    /// Top of the platform the enemy stands on
    pub platform_y: f32,
    pub walk_frame: u32,
    pub walk_timer: u32,
    pub defeated: bool,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Walk one step and turn around at the patrol bounds
    pub fn patrol(&mut self) {
        self.pos.x += self.speed * self.direction;
        if self.pos.x <= self.base_x - self.range {
            self.direction = 1.0;
        } else if self.pos.x >= self.base_x + self.range {
            self.direction = -1.0;
        }

        self.walk_timer += 1;
        if self.walk_timer >= ENEMY_WALK_FRAME_TICKS {
            self.walk_timer = 0;
            self.walk_frame = (self.walk_frame + 1) % WALK_FRAMES;
        }
    }
}

/// Collected coins stay in the list so renderers can skip them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
}

impl Coin {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            collected: false,
        }
    }
}

/// Fragment of a broken platform (visual only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Ticks left before removal
    pub life: u32,
}

impl Debris {
    /// Integrate one tick; returns false once expired
    pub fn update(&mut self) -> bool {
        self.pos += self.vel;
        self.vel.y += DEBRIS_GRAVITY;
        self.rotation += self.rotation_speed;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }
}

/// A stationary turret on a floor segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cannon {
    pub rect: Rect,
    /// +1 fires right, -1 fires left
    pub direction: f32,
    /// Ticks until next shot
    pub fire_timer: u32,
    /// Ticks between shots
    pub fire_rate: u32,
}

impl Cannon {
    /// Count down; returns a new cannonball when the timer runs out
    pub fn update(&mut self) -> Option<Cannonball> {
        self.fire_timer = self.fire_timer.saturating_sub(1);
        if self.fire_timer > 0 {
            return None;
        }
        self.fire_timer = self.fire_rate;

        let muzzle_x = if self.direction > 0.0 {
            self.rect.right() - 5.0
        } else {
            self.rect.left() - 10.0
        };
        Some(Cannonball {
            rect: Rect::new(
                muzzle_x,
                self.rect.top() + 5.0,
                CANNONBALL_SIZE,
                CANNONBALL_SIZE,
            ),
            vel: Vec2::new(self.direction * CANNONBALL_SPEED_X, CANNONBALL_SPEED_Y),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cannonball {
    pub rect: Rect,
    pub vel: Vec2,
}

impl Cannonball {
    /// Still inside the world (with margin) and not gone off the top
    pub fn in_bounds(&self, world_width: f32) -> bool {
        let x = self.rect.left();
        x >= -CANNONBALL_MARGIN_X
            && x <= world_width + CANNONBALL_MARGIN_X
            && self.rect.top() >= CANNONBALL_MIN_Y
    }
}

/// Goal flag; `pos` is the foot of the pole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub pos: Vec2,
    pub size: Vec2,
    pub reached: bool,
}

impl Flag {
    pub fn new(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, FLOOR_Y),
            size: Vec2::new(FLAG_WIDTH, FLAG_HEIGHT),
            reached: false,
        }
    }

    /// Hit box spanning the pole, rising from the foot
    pub fn hitbox(&self) -> Rect {
        Rect {
            pos: Vec2::new(self.pos.x, self.pos.y - self.size.y),
            size: self.size,
        }
    }
}

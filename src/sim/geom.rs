//! Axis-aligned box geometry
//!
//! Screen coordinates: origin at the top-left of the world, y grows downward.
//! Every collision in the game is box vs box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::COIN_HIT_SIZE;

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        rects_overlap(self, other)
    }
}

/// Check whether two boxes overlap (touching edges do not count)
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Check whether a box touches a coin at `coin_pos`
///
/// Coins are tested with a fixed square hit box, independent of how large
/// the coin sprite is drawn.
#[inline]
pub fn coin_overlap(player: &Rect, coin_pos: Vec2) -> bool {
    let hit = Rect {
        pos: coin_pos,
        size: Vec2::splat(COIN_HIT_SIZE),
    };
    rects_overlap(player, &hit)
}

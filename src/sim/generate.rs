//! Procedural level generation
//!
//! A level is rebuilt from scratch for every start or level transition.
//! Generation is a pure function of the level config and the random source,
//! so a seeded RNG reproduces the same layout.

use glam::Vec2;
use rand::Rng;

use super::entity::{Cannon, Coin, Enemy, Flag, Platform, PlatformKind};
use super::geom::Rect;
use super::level::LevelConfig;
use super::state::World;
use crate::consts::*;

/// Floor segment width range
const FLOOR_SEGMENT_MIN: f32 = 400.0;
const FLOOR_SEGMENT_MAX: f32 = 1000.0;
const FLOOR_GAP_MIN: f32 = 120.0;
/// No gaps before this x (spawn area)
const FLOOR_GAP_START: f32 = 800.0;
/// Segments starting closer than this to the flag are widened to reach it
const FLAG_APPROACH: f32 = 600.0;
/// Floor a segment must extend past the flag when widened
const FLAG_RUNOUT: f32 = 200.0;
/// Floor needed past the flag x for the segment to count as covering it
const FLAG_CLEARANCE: f32 = 80.0;

const FLOATING_START_X: f32 = 400.0;
const FLOATING_START_Y: f32 = 400.0;
const FLOATING_END_MARGIN: f32 = 500.0;
const FLOATING_MIN_Y: f32 = 200.0;
const FLOATING_MAX_Y: f32 = 450.0;
const EXTRA_MIN_Y: f32 = 180.0;
const EXTRA_MAX_Y: f32 = 480.0;
const EXTRA_PLATFORM_CHANCE: f64 = 0.3;
const EXTRA_BREAKABLE_CHANCE: f32 = 0.4;
const PLATFORM_COIN_CHANCE: f64 = 0.5;

const ENEMY_START_X: f32 = 800.0;
const ENEMY_END_MARGIN: f32 = 400.0;
const ENEMY_MARGIN_LEFT: f32 = 30.0;
const ENEMY_MARGIN_RIGHT: f32 = 80.0;

const COIN_START_X: f32 = 250.0;
const COIN_END_MARGIN: f32 = 200.0;
const COIN_ARC_CHANCE: f64 = 0.3;
const COIN_STACK_CHANCE: f64 = 0.4;

/// Generate a complete world for one level
pub fn generate_world<R: Rng + ?Sized>(config: &LevelConfig, rng: &mut R) -> World {
    let width = config.world_width;
    let flag = Flag::new(width - FLAG_OFFSET);

    let mut floors = generate_floor(width, flag.pos.x, config.gap_chance, rng);
    if repair_floor(&mut floors, &flag) {
        log::warn!("Floor layout repaired to keep the flag reachable");
    }

    let mut platforms = floors;
    let mut coins = Vec::new();
    generate_floating(config, rng, &mut platforms, &mut coins);

    let enemies = place_enemies(config, rng, &platforms);
    place_coin_patterns(width, rng, &mut coins);
    let cannons = place_cannons(config, rng, &platforms);

    log::info!(
        "Generated world: width={}, platforms={}, enemies={}, coins={}, cannons={}",
        width,
        platforms.len(),
        enemies.len(),
        coins.len(),
        cannons.len()
    );

    World {
        width,
        platforms,
        enemies,
        coins,
        debris: Vec::new(),
        cannons,
        cannonballs: Vec::new(),
        flag: Some(flag),
    }
}

/// Floor segments of random width with occasional gaps
fn generate_floor<R: Rng + ?Sized>(
    width: f32,
    flag_x: f32,
    gap_chance: f32,
    rng: &mut R,
) -> Vec<Platform> {
    let mut floors = Vec::new();
    let mut x = 0.0;

    while x < width {
        let mut segment = rng.random_range(FLOOR_SEGMENT_MIN..FLOOR_SEGMENT_MAX);

        let covers_flag = x <= flag_x && x + segment >= flag_x + FLAG_CLEARANCE;
        let near_flag = flag_x > x && flag_x - x < FLAG_APPROACH;
        if near_flag && !covers_flag {
            segment = segment.max(flag_x - x + FLAG_RUNOUT);
        }
        floors.push(Platform::floor(x, segment));

        // Gaps must end well before the flag
        let gap_allowed = x > FLOOR_GAP_START && x + segment + MAX_FLOOR_GAP < flag_x - 100.0;
        if gap_allowed && rng.random::<f32>() < gap_chance {
            x += segment + rng.random_range(FLOOR_GAP_MIN..MAX_FLOOR_GAP);
        } else {
            x += segment;
        }
    }

    floors
}

/// Floor spans sorted by left edge
fn floor_spans<'a>(platforms: impl Iterator<Item = &'a Platform>) -> Vec<(f32, f32)> {
    let mut spans: Vec<(f32, f32)> = platforms
        .filter(|p| p.kind == PlatformKind::Floor)
        .map(|p| (p.rect.left(), p.rect.right()))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    spans
}

fn spans_reach_flag(spans: &[(f32, f32)], flag: &Flag) -> bool {
    let flag_x = flag.pos.x;
    let flag_end = flag_x + flag.size.x;

    let Some(&(first_left, first_right)) = spans.first() else {
        return false;
    };
    if first_left > PLAYER_SPAWN_X {
        return false;
    }

    // Walk the floor from the spawn point; every gap must be jumpable
    let mut reach = first_right;
    for &(left, right) in &spans[1..] {
        if reach >= flag_end {
            break;
        }
        if left - reach > MAX_FLOOR_GAP {
            return false;
        }
        reach = reach.max(right);
    }

    reach >= flag_end
        && spans
            .iter()
            .any(|&(left, right)| left <= flag_x && right >= flag_end)
}

/// Check that the floor is walkable (with jumpable gaps) from the spawn
/// point to the flag, and that the flag stands on floor
pub fn flag_is_reachable(world: &World) -> bool {
    let Some(flag) = &world.flag else {
        return false;
    };
    spans_reach_flag(&floor_spans(world.platforms.iter()), flag)
}

/// Close oversized gaps and widen the segment under the flag
///
/// Returns true if anything had to change.
fn repair_floor(floors: &mut Vec<Platform>, flag: &Flag) -> bool {
    if spans_reach_flag(&floor_spans(floors.iter()), flag) {
        return false;
    }

    floors.sort_by(|a, b| a.rect.left().total_cmp(&b.rect.left()));
    if floors.first().is_none_or(|p| p.rect.left() > PLAYER_SPAWN_X) {
        let end = floors
            .first()
            .map_or(flag.pos.x + FLAG_RUNOUT, |p| p.rect.left());
        floors.insert(0, Platform::floor(0.0, end));
    }

    for i in 1..floors.len() {
        let prev_right = floors[i - 1].rect.right();
        let gap = floors[i].rect.left() - prev_right;
        if gap > MAX_FLOOR_GAP {
            floors[i - 1].rect.size.x += gap;
        }
    }

    let flag_end = flag.pos.x + FLAG_RUNOUT;
    if let Some(under) = floors
        .iter_mut()
        .rev()
        .find(|p| p.rect.left() <= flag.pos.x)
    {
        if under.rect.right() < flag_end {
            under.rect.size.x = flag_end - under.rect.left();
        }
    }

    true
}

/// Floating platforms, their coins and occasional extra platforms
fn generate_floating<R: Rng + ?Sized>(
    config: &LevelConfig,
    rng: &mut R,
    platforms: &mut Vec<Platform>,
    coins: &mut Vec<Coin>,
) {
    let mut x = FLOATING_START_X;
    let mut last_y = FLOATING_START_Y;

    while x < config.world_width - FLOATING_END_MARGIN {
        x += rng.random_range(220.0..500.0);

        let y = (last_y + (rng.random::<f32>() - 0.5) * 180.0).clamp(FLOATING_MIN_Y, FLOATING_MAX_Y);
        last_y = y;

        let width = rng.random_range(120.0..220.0);
        let breakable = rng.random::<f32>() < config.breakable_chance;
        platforms.push(Platform::floating(x, y, width, breakable));

        if rng.random_bool(PLATFORM_COIN_CHANCE) {
            coins.push(Coin::new(x + width / 2.0 - 15.0, y - 60.0));
        }

        if rng.random_bool(EXTRA_PLATFORM_CHANCE) {
            let extra_x = x + rng.random_range(100.0..250.0);
            // Go the other way from where this platform sits
            let offset = rng.random_range(100.0..180.0);
            let extra_y = if y > 350.0 { y - offset } else { y + offset };
            if extra_y > EXTRA_MIN_Y && extra_y < EXTRA_MAX_Y {
                let extra_width = rng.random_range(100.0..180.0);
                let breakable = rng.random::<f32>() < EXTRA_BREAKABLE_CHANCE;
                platforms.push(Platform::floating(extra_x, extra_y, extra_width, breakable));
            }
        }
    }
}

/// Enemies at advancing positions, each standing on a solid platform
fn place_enemies<R: Rng + ?Sized>(
    config: &LevelConfig,
    rng: &mut R,
    platforms: &[Platform],
) -> Vec<Enemy> {
    let mut enemies = Vec::new();
    let mut x = ENEMY_START_X;

    while x < config.world_width - ENEMY_END_MARGIN {
        let next = x + config.enemy_spacing + rng.random::<f32>() * config.enemy_spacing;
        if next <= x {
            log::warn!("Enemy spacing {} too small to advance, stopping", config.enemy_spacing);
            break;
        }
        x = next;

        let Some(platform) = platforms.iter().find(|p| {
            !p.breakable
                && x >= p.rect.left() + ENEMY_MARGIN_LEFT
                && x <= p.rect.right() - ENEMY_MARGIN_RIGHT
        }) else {
            log::debug!("No platform for enemy at x={x:.0}, skipping");
            continue;
        };

        let top = platform.rect.top();
        enemies.push(Enemy {
            pos: Vec2::new(x, top - PLAYER_HEIGHT),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            base_x: x,
            range: rng.random_range(60.0..140.0),
            speed: 1.0 + rng.random::<f32>() * (config.enemy_speed - 1.0),
            direction: 1.0,
            platform_y: top,
            walk_frame: 0,
            walk_timer: 0,
            defeated: false,
        });
    }

    enemies
}

/// Free-floating coins in arcs, vertical stacks and singles
fn place_coin_patterns<R: Rng + ?Sized>(width: f32, rng: &mut R, coins: &mut Vec<Coin>) {
    use std::f32::consts::PI;

    let mut x = COIN_START_X;
    while x < width - COIN_END_MARGIN {
        x += rng.random_range(200.0..500.0);

        if rng.random_bool(COIN_ARC_CHANCE) {
            let base_y = rng.random_range(300.0..450.0);
            for i in 0..5 {
                let arc_y = base_y - (i as f32 / 4.0 * PI).sin() * 80.0;
                coins.push(Coin::new(x + i as f32 * 40.0, arc_y));
            }
            x += 200.0;
        } else if rng.random_bool(COIN_STACK_CHANCE) {
            let base_y = rng.random_range(250.0..350.0);
            for i in 0..3 {
                coins.push(Coin::new(x, base_y + i as f32 * 50.0));
            }
        } else {
            coins.push(Coin::new(x, rng.random_range(220.0..500.0)));
        }
    }
}

/// Cannons at even intervals, each snapped onto the nearest floor segment
/// wide enough to hold it
fn place_cannons<R: Rng + ?Sized>(
    config: &LevelConfig,
    rng: &mut R,
    platforms: &[Platform],
) -> Vec<Cannon> {
    let mut cannons = Vec::new();
    if config.cannon_count == 0 || config.cannon_fire_rate == 0 {
        return cannons;
    }

    let spacing = config.world_width / (config.cannon_count + 1) as f32;
    // Snapping further than half an interval would bunch cannons together
    let max_snap = spacing / 2.0;

    for i in 0..config.cannon_count {
        let target_x = spacing * (i + 1) as f32;

        let snapped = platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Floor && p.rect.size.x > CANNON_WIDTH + 1.0)
            .map(|p| {
                let x = target_x.clamp(p.rect.left(), p.rect.right() - CANNON_WIDTH);
                (x, p.rect.top())
            })
            .filter(|(x, _)| (x - target_x).abs() <= max_snap)
            .min_by(|a, b| (a.0 - target_x).abs().total_cmp(&(b.0 - target_x).abs()));

        let Some((x, floor_top)) = snapped else {
            log::debug!("No floor for cannon near x={target_x:.0}, skipping");
            continue;
        };

        cannons.push(Cannon {
            rect: Rect::new(x, floor_top - CANNON_HEIGHT, CANNON_WIDTH, CANNON_HEIGHT),
            direction: if rng.random_bool(0.5) { -1.0 } else { 1.0 },
            fire_timer: rng.random_range(0..config.cannon_fire_rate),
            fire_rate: config.cannon_fire_rate,
        });
    }

    cannons
}

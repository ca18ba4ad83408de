//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation by one 1/60 s step.
//!
//! Processing order:
//!   1. Horizontal input (with exponential slowdown)
//!   2. Jump start and trick roll
//!   3. Early-release jump cut
//!   4. Trick and walk animation
//!   5. Gravity
//!   6. Horizontal move + resolution
//!   7. Vertical move + resolution (landing, head bumps, breaking)
//!   8. Debris, broken platform pruning
//!   9. World clamp, camera, fall death
//!  10. Enemies, coins, cannons
//!  11. Flag

use glam::Vec2;
use rand::Rng;

use super::entity::{Debris, Player, Trick};
use super::geom::{Rect, coin_overlap};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Logical input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump went down since the previous tick
    pub jump_pressed: bool,
    /// Jump is currently held
    pub jump_held: bool,
}

/// Advance the game state by one fixed timestep
///
/// Does nothing unless the game is running. Returns what happened during
/// the tick, in order.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Running {
        return events;
    }
    state.time_ticks += 1;

    apply_move_input(&mut state.player, input);
    try_jump(state, input, &mut events);
    apply_jump_cut(&mut state.player, input);
    animate_player(&mut state.player);

    // No terminal velocity
    state.player.vel.y += GRAVITY;

    move_horizontal(state);
    move_vertical(state, &mut events);

    state.world.debris.retain_mut(Debris::update);
    state.world.platforms.retain(|p| !p.broken);

    let max_x = (state.world.width - PLAYER_WIDTH).max(0.0);
    state.player.pos.x = state.player.pos.x.clamp(0.0, max_x);

    state.update_camera();

    if state.player.pos.y > FALL_DEATH_Y {
        state.game_over(&mut events);
        return events;
    }

    if update_enemies(state, &mut events) {
        return events;
    }
    collect_coins(state, &mut events);
    if update_cannons(state, &mut events) {
        return events;
    }
    check_flag(state, &mut events);

    events
}

fn apply_move_input(player: &mut Player, input: &TickInput) {
    if input.move_left {
        player.vel.x = -PLAYER_SPEED;
        player.facing_right = false;
    } else if input.move_right {
        player.vel.x = PLAYER_SPEED;
        player.facing_right = true;
    } else {
        player.vel.x *= MOVE_DAMPING;
    }
}

fn try_jump(state: &mut GameState, input: &TickInput, events: &mut Vec<GameEvent>) {
    let player = &mut state.player;
    if !input.jump_pressed || !player.grounded {
        return;
    }

    player.vel.y = JUMP_FORCE;
    player.grounded = false;
    player.jump_held = true;
    player.jump_cut = false;

    let roll: f32 = state.rng.random();
    player.trick = if roll < FLIP_CHANCE {
        Trick::Flip { rotation: 0.0 }
    } else if roll < FLIP_CHANCE + SPIN_CHANCE {
        Trick::Spin { angle: 0.0 }
    } else {
        Trick::None
    };

    events.push(GameEvent::Jumped);
}

/// Releasing jump while still rising shortens the jump, once per jump
fn apply_jump_cut(player: &mut Player, input: &TickInput) {
    if !input.jump_held && player.jump_held && !player.jump_cut && player.vel.y < 0.0 {
        player.vel.y *= JUMP_CUT;
        player.jump_cut = true;
    }
    if player.grounded {
        player.jump_held = false;
        player.jump_cut = false;
    }
}

fn animate_player(player: &mut Player) {
    if player.grounded {
        player.trick = Trick::None;
    } else {
        player.trick.advance();
    }

    if player.grounded && player.vel.x.abs() > WALK_SPEED_THRESHOLD {
        player.walk_timer += 1;
        if player.walk_timer >= WALK_FRAME_TICKS {
            player.walk_timer = 0;
            player.walk_frame = (player.walk_frame + 1) % WALK_FRAMES;
        }
    } else {
        player.walk_frame = 0;
        player.walk_timer = 0;
    }
}

/// Move along x and push out of any platform entered from the side
///
/// The pre-move edge decides the side, so this only holds while the
/// per-tick speed is below the platform width.
fn move_horizontal(state: &mut GameState) {
    let player = &mut state.player;
    player.pos.x += player.vel.x;

    for platform in state.world.platforms.iter().filter(|p| !p.broken) {
        if !player.rect().overlaps(&platform.rect) {
            continue;
        }
        let vx = player.vel.x;
        if vx > 0.0 && player.pos.x + PLAYER_WIDTH - vx <= platform.rect.left() {
            player.pos.x = platform.rect.left() - PLAYER_WIDTH;
            player.vel.x = 0.0;
        } else if vx < 0.0 && player.pos.x - vx >= platform.rect.right() {
            player.pos.x = platform.rect.right();
            player.vel.x = 0.0;
        }
    }
}

/// Move along y; land on tops, bump or break undersides
fn move_vertical(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let GameState {
        player, world, rng, ..
    } = state;

    player.pos.y += player.vel.y;
    player.grounded = false;

    let mut broken = 0;
    for platform in world.platforms.iter_mut() {
        if platform.broken || !player.rect().overlaps(&platform.rect) {
            continue;
        }

        let vy = player.vel.y;
        if vy > 0.0 && player.bottom() - vy <= platform.rect.top() + CONTACT_TOLERANCE {
            player.land(platform.rect.top());
        } else if vy < 0.0 && player.pos.y - vy >= platform.rect.bottom() - CONTACT_TOLERANCE {
            if platform.can_break() {
                platform.broken = true;
                spawn_debris(&platform.rect, rng, &mut world.debris);
                player.vel.y = BREAK_BOUNCE;
                broken += 1;
            } else {
                player.pos.y = platform.rect.bottom();
                player.vel.y = 0.0;
            }
        }
    }

    for _ in 0..broken {
        events.push(GameEvent::PlatformBroken);
        state.add_score(SCORE_PLATFORM_BREAK, events);
    }
}

fn spawn_debris<R: Rng + ?Sized>(rect: &Rect, rng: &mut R, debris: &mut Vec<Debris>) {
    use std::f32::consts::TAU;

    for _ in 0..DEBRIS_PER_BREAK {
        let pos = rect.pos + Vec2::new(rng.random::<f32>(), rng.random::<f32>()) * rect.size;
        debris.push(Debris {
            pos,
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 8.0,
                -rng.random::<f32>() * 8.0 - 2.0,
            ),
            size: 8.0 + rng.random::<f32>() * 12.0,
            rotation: rng.random::<f32>() * TAU,
            rotation_speed: (rng.random::<f32>() - 0.5) * 0.3,
            life: DEBRIS_LIFETIME,
        });
    }
}

/// Patrol enemies and resolve contact. Returns true if the player died.
fn update_enemies(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let player = &mut state.player;
    let mut defeated = 0;
    let mut killed = false;

    for enemy in state.world.enemies.iter_mut() {
        enemy.patrol();

        if enemy.defeated || !player.rect().overlaps(&enemy.rect()) {
            continue;
        }

        // Feet were above the enemy's head (within tolerance) before this tick's fall
        let vy = player.vel.y;
        let stomp = vy > 0.0 && player.bottom() - vy <= enemy.pos.y + STOMP_TOLERANCE;
        if stomp {
            enemy.defeated = true;
            player.vel.y = JUMP_FORCE * STOMP_BOUNCE;
            defeated += 1;
        } else {
            killed = true;
            break;
        }
    }

    state.world.enemies.retain(|e| !e.defeated);
    for _ in 0..defeated {
        events.push(GameEvent::EnemyDefeated);
        state.add_score(SCORE_ENEMY, events);
    }

    if killed {
        state.game_over(events);
    }
    killed
}

fn collect_coins(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player_rect = state.player.rect();
    let mut collected = 0;

    for coin in state.world.coins.iter_mut().filter(|c| !c.collected) {
        if coin_overlap(&player_rect, coin.pos) {
            coin.collected = true;
            collected += 1;
        }
    }

    for _ in 0..collected {
        events.push(GameEvent::CoinCollected);
        state.add_score(SCORE_COIN, events);
    }
}

/// Fire cannons and move cannonballs. Returns true if the player was hit.
fn update_cannons(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let world = &mut state.world;
    for cannon in world.cannons.iter_mut() {
        if let Some(ball) = cannon.update() {
            world.cannonballs.push(ball);
            events.push(GameEvent::CannonFired);
        }
    }

    let player_rect = state.player.rect();
    let width = world.width;
    let mut hit = false;
    world.cannonballs.retain_mut(|ball| {
        ball.rect.pos += ball.vel;
        if !ball.in_bounds(width) {
            return false;
        }
        if ball.rect.overlaps(&player_rect) {
            hit = true;
            return false;
        }
        true
    });

    if hit {
        state.game_over(events);
    }
    hit
}

fn check_flag(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player_rect = state.player.rect();
    let Some(flag) = state.world.flag.as_mut() else {
        return;
    };
    if flag.reached || !player_rect.overlaps(&flag.hitbox()) {
        return;
    }
    flag.reached = true;
    state.complete_level(events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Cannon, Cannonball, Coin, Enemy, Flag, Platform};
    use crate::sim::state::World;

    fn running_state(platforms: Vec<Platform>) -> GameState {
        let mut state = GameState::new(12345);
        state.phase = GamePhase::Running;
        state.level = 1;
        state.world = World {
            width: 3000.0,
            platforms,
            ..Default::default()
        };
        state
    }

    /// Player standing still on the floor at `x`
    fn stand_at(state: &mut GameState, x: f32) {
        state.player.pos = Vec2::new(x, FLOOR_Y - PLAYER_HEIGHT);
        state.player.vel = Vec2::ZERO;
        state.player.grounded = true;
    }

    fn enemy_at(x: f32, y: f32) -> Enemy {
        Enemy {
            pos: Vec2::new(x, y),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            base_x: x,
            range: 100.0,
            speed: 1.0,
            direction: 1.0,
            platform_y: FLOOR_Y,
            walk_frame: 0,
            walk_timer: 0,
            defeated: false,
        }
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut state = GameState::new(1);
        let before = state.player.pos;
        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.player.pos, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_rest_on_floor() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);

        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert!(state.player.grounded);
        assert_eq!(state.player.pos, Vec2::new(200.0, FLOOR_Y - PLAYER_HEIGHT));
    }

    #[test]
    fn test_jump_from_ground() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);

        let input = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input);
        assert_eq!(events, vec![GameEvent::Jumped]);
        assert!(!state.player.grounded);
        assert!(state.player.jump_held);
        // Gravity has already been applied once this tick
        assert!((state.player.vel.y - (JUMP_FORCE + GRAVITY)).abs() < 1e-4);
        assert!(state.player.bottom() < FLOOR_Y);
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_no_jump_while_airborne() {
        let mut state = running_state(Vec::new());
        state.player.vel.y = 3.0;
        let input = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input);
        assert!(!events.contains(&GameEvent::Jumped));
        assert!((state.player.vel.y - (3.0 + GRAVITY)).abs() < 1e-4);
    }

    #[test]
    fn test_jump_cut_applies_once() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        tick(&mut state, &jump);
        let rising = state.player.vel.y;

        tick(&mut state, &TickInput::default());
        assert!(state.player.jump_cut);
        let expected = rising * JUMP_CUT + GRAVITY;
        assert!((state.player.vel.y - expected).abs() < 1e-4);

        tick(&mut state, &TickInput::default());
        assert!((state.player.vel.y - (expected + GRAVITY)).abs() < 1e-4);
    }

    #[test]
    fn test_holding_jump_keeps_full_height() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        tick(&mut state, &jump);
        let hold = TickInput {
            jump_held: true,
            ..Default::default()
        };
        tick(&mut state, &hold);
        assert!(!state.player.jump_cut);
        assert!((state.player.vel.y - (JUMP_FORCE + 2.0 * GRAVITY)).abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_slowdown_is_gradual() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        tick(&mut state, &right);
        assert_eq!(state.player.vel.x, PLAYER_SPEED);
        assert!(state.player.facing_right);

        tick(&mut state, &TickInput::default());
        assert!((state.player.vel.x - PLAYER_SPEED * MOVE_DAMPING).abs() < 1e-5);
        assert!(state.player.pos.x > 206.0);

        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        tick(&mut state, &left);
        assert_eq!(state.player.vel.x, -PLAYER_SPEED);
        assert!(!state.player.facing_right);
    }

    #[test]
    fn test_walk_cycle_advances_only_when_moving() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..=WALK_FRAME_TICKS {
            tick(&mut state, &right);
        }
        assert_eq!(state.player.walk_frame, 1);

        // Velocity decays below the threshold eventually
        for _ in 0..30 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.walk_frame, 0);
        assert_eq!(state.player.walk_timer, 0);
    }

    #[test]
    fn test_run_into_wall_from_left() {
        // Floating platform low enough to block a walking player
        let wall = Platform::floating(300.0, 540.0, 100.0, false);
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0), wall]);
        stand_at(&mut state, 236.0);

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        tick(&mut state, &right);
        assert_eq!(state.player.pos.x, 300.0 - PLAYER_WIDTH);
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_run_into_wall_from_right() {
        let wall = Platform::floating(300.0, 540.0, 100.0, false);
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0), wall]);
        stand_at(&mut state, 404.0);

        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        tick(&mut state, &left);
        assert_eq!(state.player.pos.x, 400.0);
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_head_bump_on_solid_platform() {
        let solid = Platform::floating(100.0, 300.0, 200.0, false);
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0), solid]);
        state.player.pos = Vec2::new(120.0, 345.0);
        state.player.vel = Vec2::new(0.0, -10.0);

        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.player.pos.y, 340.0);
        assert_eq!(state.player.vel.y, 0.0);
        assert_eq!(state.world.platforms.len(), 2);
    }

    #[test]
    fn test_break_platform_from_below() {
        let fragile = Platform::floating(100.0, 300.0, 200.0, true);
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0), fragile]);
        state.player.pos = Vec2::new(120.0, 345.0);
        state.player.vel = Vec2::new(PLAYER_SPEED, -10.0);
        state.score = 10;

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        let events = tick(&mut state, &right);
        assert_eq!(
            events,
            vec![GameEvent::PlatformBroken, GameEvent::ScoreChanged(35)]
        );
        assert_eq!(state.score, 10 + SCORE_PLATFORM_BREAK);
        assert_eq!(state.world.debris.len(), DEBRIS_PER_BREAK);
        assert_eq!(state.player.vel.y, BREAK_BOUNCE);
        // Broken platform is gone by the end of the tick
        assert_eq!(state.world.platforms.len(), 1);
        assert!(state.world.platforms.iter().all(|p| !p.breakable));
    }

    #[test]
    fn test_landing_on_breakable_does_not_break() {
        let fragile = Platform::floating(100.0, 300.0, 200.0, true);
        let mut state = running_state(vec![fragile]);
        state.player.pos = Vec2::new(120.0, 300.0 - PLAYER_HEIGHT - 2.0);
        state.player.vel = Vec2::new(0.0, 4.0);
        state.player.trick = Trick::Flip { rotation: 1.0 };

        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert!(state.player.grounded);
        assert_eq!(state.player.bottom(), 300.0);
        assert_eq!(state.player.trick, Trick::None);
        assert_eq!(state.world.platforms.len(), 1);
    }

    #[test]
    fn test_debris_expires() {
        let fragile = Platform::floating(100.0, 300.0, 200.0, true);
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0), fragile]);
        state.player.pos = Vec2::new(120.0, 345.0);
        state.player.vel = Vec2::new(0.0, -10.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.world.debris.len(), DEBRIS_PER_BREAK);

        for _ in 0..DEBRIS_LIFETIME {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.world.debris.is_empty());
    }

    #[test]
    fn test_coin_collected_once() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        state.world.coins.push(Coin::new(210.0, 520.0));

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(
            events,
            vec![GameEvent::CoinCollected, GameEvent::ScoreChanged(SCORE_COIN)]
        );
        assert!(state.world.coins[0].collected);

        let events = tick(&mut state, &TickInput::default());
        assert!(events.is_empty());
        assert_eq!(state.score, SCORE_COIN);
        // Collected coins stay in the list
        assert_eq!(state.world.coins.len(), 1);
    }

    #[test]
    fn test_stomp_enemy() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        state.world.enemies.push(enemy_at(300.0, FLOOR_Y - PLAYER_HEIGHT));
        state.player.pos = Vec2::new(300.0, 400.0);
        state.player.vel = Vec2::new(0.0, 5.0);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(
            events,
            vec![GameEvent::EnemyDefeated, GameEvent::ScoreChanged(SCORE_ENEMY)]
        );
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.world.enemies.is_empty());
        assert!((state.player.vel.y - JUMP_FORCE * STOMP_BOUNCE).abs() < 1e-4);
        assert!(state.player.vel.y < 0.0);
    }

    #[test]
    fn test_defeated_enemy_pays_nothing() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        let mut enemy = enemy_at(300.0, FLOOR_Y - PLAYER_HEIGHT);
        enemy.defeated = true;
        state.world.enemies.push(enemy);
        state.score = 150;
        state.player.pos = Vec2::new(300.0, 400.0);
        state.player.vel = Vec2::new(0.0, 5.0);

        let events = tick(&mut state, &TickInput::default());
        assert!(!events.contains(&GameEvent::EnemyDefeated));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert_eq!(state.score, 150);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.world.enemies.is_empty());
        // No stomp bounce either
        assert!((state.player.vel.y - (5.0 + GRAVITY)).abs() < 1e-4);
    }

    #[test]
    fn test_side_contact_with_enemy_kills() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 300.0);
        state.world.enemies.push(enemy_at(330.0, FLOOR_Y - PLAYER_HEIGHT));

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(events, vec![GameEvent::GameOver { score: 0 }]);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.world.enemies.len(), 1);
    }

    #[test]
    fn test_fall_death_fires_once() {
        let mut state = running_state(Vec::new());
        state.score = 400;
        state.player.pos = Vec2::new(500.0, FALL_DEATH_Y - 0.5);
        state.player.vel = Vec2::new(0.0, 10.0);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(events, vec![GameEvent::GameOver { score: 400 }]);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.high_score, 400);

        for _ in 0..10 {
            assert!(tick(&mut state, &TickInput::default()).is_empty());
        }
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_camera_follows_into_the_fall() {
        let mut state = running_state(Vec::new());
        state.player.pos = Vec2::new(2000.0, FALL_DEATH_Y - 0.5);
        state.player.vel = Vec2::new(0.0, 10.0);
        state.camera_x = 0.0;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.camera_x, 2000.0 - (SCREEN_WIDTH / 2.0 - PLAYER_WIDTH / 2.0));
    }

    #[test]
    fn test_world_clamp() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 2.0);
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        tick(&mut state, &left);
        assert_eq!(state.player.pos.x, 0.0);

        stand_at(&mut state, 3000.0 - PLAYER_WIDTH - 1.0);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        tick(&mut state, &right);
        assert_eq!(state.player.pos.x, 3000.0 - PLAYER_WIDTH);
    }

    #[test]
    fn test_cannonball_hits_player() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 140.0);
        state.world.cannons.push(Cannon {
            rect: Rect::new(200.0, FLOOR_Y - CANNON_HEIGHT, CANNON_WIDTH, CANNON_HEIGHT),
            direction: -1.0,
            fire_timer: 1,
            fire_rate: 100,
        });

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(
            events,
            vec![GameEvent::CannonFired, GameEvent::GameOver { score: 0 }]
        );
        assert!(state.world.cannonballs.is_empty());
        assert_eq!(state.world.cannons[0].fire_timer, 100);
    }

    #[test]
    fn test_cannonball_leaves_world() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 1000.0);
        state.world.cannonballs.push(Cannonball {
            rect: Rect::new(-45.0, 300.0, CANNONBALL_SIZE, CANNONBALL_SIZE),
            vel: Vec2::new(-CANNONBALL_SPEED_X, CANNONBALL_SPEED_Y),
        });

        tick(&mut state, &TickInput::default());
        assert_eq!(state.world.cannonballs.len(), 1);
        tick(&mut state, &TickInput::default());
        assert!(state.world.cannonballs.is_empty());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_cannonball_leaves_through_top() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        state.world.cannonballs.push(Cannonball {
            rect: Rect::new(1500.0, CANNONBALL_MIN_Y + 1.0, CANNONBALL_SIZE, CANNONBALL_SIZE),
            vel: Vec2::new(CANNONBALL_SPEED_X, CANNONBALL_SPEED_Y),
        });

        tick(&mut state, &TickInput::default());
        assert!(state.world.cannonballs.is_empty());
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_reach_flag() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        state.world.flag = Some(Flag::new(500.0));
        stand_at(&mut state, 470.0);
        state.score = 900;
        state.high_score = 100;

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(events, vec![GameEvent::LevelComplete(1)]);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert!(state.world.flag.as_ref().unwrap().reached);
        assert_eq!(state.high_score, 900);

        // Run loop stopped
        assert!(tick(&mut state, &TickInput::default()).is_empty());
    }

    #[test]
    fn test_reach_final_flag_wins() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        state.level = 3;
        state.world.flag = Some(Flag::new(500.0));
        stand_at(&mut state, 470.0);

        let events = tick(&mut state, &TickInput::default());
        assert_eq!(
            events,
            vec![GameEvent::LevelComplete(3), GameEvent::GameWon]
        );
        assert_eq!(state.phase, GamePhase::Won);
    }

    #[test]
    fn test_tricks_never_overlap_and_reset_on_landing() {
        let mut state = running_state(vec![Platform::floor(0.0, 3000.0)]);
        stand_at(&mut state, 200.0);
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        let hold = TickInput {
            jump_held: true,
            ..Default::default()
        };

        let mut saw_trick = false;
        for _ in 0..40 {
            tick(&mut state, &jump);
            while !state.player.grounded {
                saw_trick |= state.player.trick.is_active();
                tick(&mut state, &hold);
            }
            assert_eq!(state.player.trick, Trick::None);
        }
        assert!(saw_trick);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        state1.start();
        state2.start();

        let inputs = [
            TickInput {
                move_right: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                jump_pressed: true,
                jump_held: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                jump_held: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..60 {
            for input in &inputs {
                let e1 = tick(&mut state1, input);
                let e2 = tick(&mut state2, input);
                assert_eq!(e1, e2);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.world.cannonballs.len(), state2.world.cannonballs.len());
    }
}

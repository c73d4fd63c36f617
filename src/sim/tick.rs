//! Per-frame simulation tick
//!
//! Advances the entity store by one display frame. Ordering matters: later
//! phases read what earlier phases mutated in the same tick.

use glam::Vec2;
use rand::Rng;

use super::collision::{aabb_overlap, strike_enemy};
use super::state::{Enemy, EnemyKind, GameEvent, GameState, Particle, Projectile, Rgba};
use crate::consts::*;

/// Host-provided context for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Simulation is frozen (but still ticked) while false
    pub active: bool,
    /// Current score, drives spawn pacing and enemy speed
    pub score: u64,
    /// Wall-clock timestamp in milliseconds
    pub now_ms: f64,
}

/// Milliseconds between enemy spawns at the given score
pub fn spawn_interval_ms(score: u64) -> f64 {
    (SPAWN_BASE_INTERVAL_MS - score as f64 / SPAWN_SCORE_DIVISOR).max(SPAWN_MIN_INTERVAL_MS)
}

/// Descent speed for enemies spawned at the given score
pub fn enemy_speed(score: u64) -> f32 {
    ENEMY_BASE_SPEED + (score as f32 / ENEMY_SPEED_SCORE_DIVISOR).min(ENEMY_MAX_BONUS_SPEED)
}

/// Advance the game state by one frame, returning events for the host
pub fn tick(state: &mut GameState, input: &TickInput, rng: &mut impl Rng) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Shake keeps decaying while frozen so the camera settles under overlays
    state.screen_shake *= SHAKE_DECAY;

    if !input.active {
        return events;
    }

    state.player.follow_target();

    if input.now_ms - state.last_spawn_ms >= spawn_interval_ms(input.score) {
        spawn_enemy(state, input.score, rng);
        state.last_spawn_ms = input.now_ms;
    }

    for projectile in state.projectiles.iter_mut() {
        projectile.bounds.y -= projectile.speed;
        if projectile.bounds.y < PROJECTILE_CEILING {
            projectile.active = false;
        }
    }
    state.projectiles.retain(|p| p.active);

    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life -= PARTICLE_FADE;
    }
    state.particles.retain(|p| p.life > 0.0);

    let floor = state.viewport.height;
    for enemy in state.enemies.iter_mut() {
        enemy.bounds.y += enemy.speed;

        if aabb_overlap(&enemy.bounds, &state.player.bounds) && !state.game_over {
            state.game_over = true;
            log::info!("Interceptor hit by {} [{}]", enemy.name, enemy.kind.as_str());
            events.push(GameEvent::GameOver);
        }

        if enemy.bounds.y > floor {
            // Escaped: gone without score or event
            enemy.hp = 0;
            continue;
        }

        let strike = strike_enemy(enemy, &mut state.projectiles);
        if strike.destroyed {
            state.screen_shake = SHAKE_DESTROY;
            spawn_burst(&mut state.particles, enemy.bounds.center(), enemy.color, rng);
            log::debug!("Destroyed {} [{}]", enemy.name, enemy.kind.as_str());
            events.push(GameEvent::EnemyDestroyed {
                kind: enemy.kind,
                name: enemy.name,
                points: enemy.points,
            });
        }
    }
    state.enemies.retain(|e| e.is_alive());
    state.projectiles.retain(|p| p.active);

    events
}

/// Fire a twin volley if the cooldown has elapsed. Returns true on success.
pub fn fire(state: &mut GameState, now_ms: f64) -> bool {
    if let Some(last) = state.last_shot_ms
        && now_ms - last < FIRE_COOLDOWN_MS
    {
        return false;
    }

    let hull = state.player.bounds;
    let muzzles = [
        hull.x + MUZZLE_LEFT,
        hull.x + hull.width - MUZZLE_RIGHT_INSET,
    ];
    for x in muzzles {
        state.projectiles.push(Projectile::new(x, hull.y + MUZZLE_Y));
    }

    state.screen_shake = (state.screen_shake + SHAKE_PER_SHOT).min(SHAKE_SHOT_CAP);
    state.last_shot_ms = Some(now_ms);
    true
}

/// Spawn one enemy of a random archetype just above the viewport
fn spawn_enemy(state: &mut GameState, score: u64, rng: &mut impl Rng) {
    let kind = EnemyKind::ALL[rng.random_range(0..EnemyKind::ALL.len())];
    let span = (state.viewport.width - ENEMY_SIZE).max(0.0);
    let x = rng.random::<f32>() * span;
    state.enemies.push(Enemy::new(kind, x, enemy_speed(score)));
}

/// Scatter a burst of debris particles from a point
fn spawn_burst(particles: &mut Vec<Particle>, origin: Vec2, color: Rgba, rng: &mut impl Rng) {
    let spread = PARTICLE_MAX_SPEED * 2.0;
    particles.extend((0..BURST_PARTICLES).map(|_| Particle {
        pos: origin,
        vel: Vec2::new(
            (rng.random::<f32>() - 0.5) * spread,
            (rng.random::<f32>() - 0.5) * spread,
        ),
        life: 1.0,
        size: rng.random::<f32>() * PARTICLE_SIZE_RANGE + PARTICLE_MIN_SIZE,
        color,
    }));
}

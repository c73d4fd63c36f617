//! Entity store and core simulation types
//!
//! One session's worth of mutable truth: the player, projectiles, enemies,
//! particles, and the frame-local timers the simulation reads.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{Viewport, hex_color};

/// RGBA color in 0-1 floats
pub type Rgba = [f32; 4];

/// Axis-aligned bounding box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// The player's interceptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub bounds: Bounds,
    pub speed: f32,
    pub color: Rgba,
    /// Desired horizontal center, set by pointer input
    pub target_x: f32,
    /// Carried for a future multi-hit model; contact is always fatal today
    pub health: u32,
}

impl Player {
    /// Player centered horizontally near the bottom of the viewport
    pub fn centered(viewport: Viewport) -> Self {
        let x = viewport.width / 2.0;
        Self {
            bounds: Bounds::new(
                x,
                viewport.height - PLAYER_BOTTOM_OFFSET,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            speed: PLAYER_SPEED,
            color: hex_color(0x06b6d4),
            target_x: x,
            health: PLAYER_HEALTH,
        }
    }

    /// Horizontal distance between the steering target and the hull center
    pub fn steering_delta(&self) -> f32 {
        self.target_x - self.bounds.center().x
    }

    /// Ease toward the steering target; no clamping against the viewport
    pub fn follow_target(&mut self) {
        self.bounds.x += self.steering_delta() * PLAYER_FOLLOW;
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub bounds: Bounds,
    pub speed: f32,
    pub color: Rgba,
    pub active: bool,
}

impl Projectile {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            bounds: Bounds::new(x, y, PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
            speed: PROJECTILE_SPEED,
            color: hex_color(0xfbbf24),
            active: true,
        }
    }
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Recon,
    Heavy,
    Stealth,
    Interceptor,
}

/// Static per-archetype data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDescriptor {
    /// Display label, also the topic for intel briefings
    pub name: &'static str,
    pub color: Rgba,
    pub points: u32,
    pub icon: &'static str,
}

const ENEMY_TABLE: [EnemyDescriptor; 4] = [
    EnemyDescriptor {
        name: "X-1 Recon Drone",
        color: hex_color(0x22d3ee),
        points: 150,
        icon: "microchip",
    },
    EnemyDescriptor {
        name: "EMP Sentry Bot",
        color: hex_color(0xef4444),
        points: 200,
        icon: "bolt",
    },
    EnemyDescriptor {
        name: "Stealth Predator",
        color: hex_color(0xa855f7),
        points: 300,
        icon: "eye-slash",
    },
    EnemyDescriptor {
        name: "Tactical Walker",
        color: hex_color(0xf59e0b),
        points: 250,
        icon: "robot",
    },
];

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Recon,
        EnemyKind::Heavy,
        EnemyKind::Stealth,
        EnemyKind::Interceptor,
    ];

    pub fn descriptor(self) -> &'static EnemyDescriptor {
        &ENEMY_TABLE[self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Recon => "recon",
            EnemyKind::Heavy => "heavy",
            EnemyKind::Stealth => "stealth",
            EnemyKind::Interceptor => "interceptor",
        }
    }
}

/// A descending enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub bounds: Bounds,
    pub speed: f32,
    pub color: Rgba,
    pub kind: EnemyKind,
    pub hp: i32,
    pub max_hp: i32,
    pub points: u32,
    pub name: &'static str,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, speed: f32) -> Self {
        let desc = kind.descriptor();
        Self {
            bounds: Bounds::new(x, -ENEMY_SIZE, ENEMY_SIZE, ENEMY_SIZE),
            speed,
            color: desc.color,
            kind,
            hp: ENEMY_HP,
            max_hp: ENEMY_HP,
            points: desc.points,
            name: desc.name,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// A particle for destruction debris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
    pub color: Rgba,
}

/// Something the host needs to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// An enemy was shot down
    EnemyDestroyed {
        kind: EnemyKind,
        name: &'static str,
        points: u32,
    },
    /// The player collided with an enemy
    GameOver,
}

/// Complete entity store for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub viewport: Viewport,
    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    /// Render jitter magnitude (pixels)
    pub screen_shake: f32,
    /// Timestamp of the last successful volley (ms)
    pub last_shot_ms: Option<f64>,
    /// Timestamp of the last spawn (ms)
    pub last_spawn_ms: f64,
    /// Latched once the collision signal has been emitted
    pub game_over: bool,
}

impl GameState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            player: Player::centered(viewport),
            projectiles: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            screen_shake: 0.0,
            last_shot_ms: None,
            last_spawn_ms: 0.0,
            game_over: false,
        }
    }

    /// Start a fresh session in the current viewport
    pub fn reset(&mut self) {
        *self = Self::new(self.viewport);
    }

    /// Total entities besides the player
    pub fn entity_count(&self) -> usize {
        self.projectiles.len() + self.enemies.len() + self.particles.len()
    }
}

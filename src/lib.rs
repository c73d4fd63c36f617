//! Cyber Ops - A browser arcade shooter with tactical intel briefings
//!
//! Core modules:
//! - `sim`: Entity store and per-frame simulation (movement, spawning, collisions)
//! - `renderer`: Scene tessellation and WebGPU rendering pipeline
//! - `session`: Screen phases, score, and the frame driver contract
//! - `intel`: Tactical intel briefings (remote generation with offline fallback)
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `highscore`: Persisted high score
//! - `hud`: HUD labels and class toggling for the DOM host
//! - `settings`: Player preferences (quality, screen shake)

pub mod highscore;
pub mod hud;
pub mod intel;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscore::HighScore;
pub use session::{FactRequest, FrameOutput, GamePhase, Session};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Player interceptor size (pixels)
    pub const PLAYER_WIDTH: f32 = 90.0;
    pub const PLAYER_HEIGHT: f32 = 70.0;
    pub const PLAYER_SPEED: f32 = 15.0;
    pub const PLAYER_HEALTH: u32 = 100;
    /// Player sits this far above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 150.0;
    /// Fraction of the steering delta applied per tick
    pub const PLAYER_FOLLOW: f32 = 0.12;

    /// Projectile defaults
    pub const PROJECTILE_WIDTH: f32 = 4.0;
    pub const PROJECTILE_HEIGHT: f32 = 30.0;
    pub const PROJECTILE_SPEED: f32 = 25.0;
    /// Projectiles above this y are retired
    pub const PROJECTILE_CEILING: f32 = -100.0;
    /// Twin muzzle offsets from the player's left edge
    pub const MUZZLE_LEFT: f32 = 10.0;
    pub const MUZZLE_RIGHT_INSET: f32 = 15.0;
    pub const MUZZLE_Y: f32 = 10.0;
    /// Minimum time between volleys (ms)
    pub const FIRE_COOLDOWN_MS: f64 = 100.0;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 70.0;
    pub const ENEMY_HP: i32 = 1;
    pub const ENEMY_BASE_SPEED: f32 = 4.0;
    /// Score per point of extra enemy speed
    pub const ENEMY_SPEED_SCORE_DIVISOR: f32 = 3500.0;
    pub const ENEMY_MAX_BONUS_SPEED: f32 = 6.0;

    /// Spawn pacing (ms)
    pub const SPAWN_BASE_INTERVAL_MS: f64 = 1000.0;
    pub const SPAWN_MIN_INTERVAL_MS: f64 = 400.0;
    pub const SPAWN_SCORE_DIVISOR: f64 = 20.0;

    /// Particle bursts
    pub const BURST_PARTICLES: usize = 20;
    pub const PARTICLE_MAX_SPEED: f32 = 6.0;
    pub const PARTICLE_MIN_SIZE: f32 = 2.0;
    pub const PARTICLE_SIZE_RANGE: f32 = 4.0;
    pub const PARTICLE_FADE: f32 = 0.03;

    /// Screen shake
    pub const SHAKE_DECAY: f32 = 0.85;
    pub const SHAKE_PER_SHOT: f32 = 3.0;
    pub const SHAKE_SHOT_CAP: f32 = 10.0;
    pub const SHAKE_DESTROY: f32 = 20.0;

    /// Scoring
    pub const POINTS_PER_KILL: u64 = 100;
    /// An intel briefing interrupts play every this many points
    pub const INTEL_INTERVAL: u64 = 500;
    /// Give up waiting on a briefing after this long (ms)
    pub const INTEL_TIMEOUT_MS: i32 = 8000;
}

/// Screen-space size of the play area in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Convert a `0xRRGGBB` color into opaque RGBA floats
pub const fn hex_color(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of I/O:
//! - Time arrives through `TickInput`, never read from a clock
//! - Randomness comes from a caller-supplied RNG
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{StrikeResult, aabb_overlap, strike_enemy};
pub use state::{
    Bounds, Enemy, EnemyDescriptor, EnemyKind, GameEvent, GameState, Particle, Player, Projectile,
    Rgba,
};
pub use tick::{TickInput, enemy_speed, fire, spawn_interval_ms, tick};

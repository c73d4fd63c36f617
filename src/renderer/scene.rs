//! Scene tessellation
//!
//! Turns the entity store into one triangle list plus text labels. This is a
//! pure read of [`GameState`]; the only randomness is the camera jitter the
//! caller passes in.
//!
//! Draw order sets layering: particles, player, projectiles, enemies.

use glam::Vec2;
use rand::Rng;

use super::shapes::{self, with_alpha};
use super::vertex::{Vertex, colors};
use crate::settings::Settings;
use crate::sim::{Enemy, GameState, Particle, Player, Projectile};

/// Degrees of hull rotation per unit of tilt
const TILT_DEGREES: f32 = 15.0;
/// Tilt per pixel of steering delta
const TILT_PER_PIXEL: f32 = 0.02;
/// Enemy hull top edge is inset this far on each side
const ENEMY_TOP_INSET: f32 = 20.0;
/// Tracer streak trails behind the projectile
const STREAK_OFFSET: f32 = 30.0;
const STREAK_LENGTH: f32 = 50.0;
const STREAK_ALPHA: f32 = 0.3;

pub const ENEMY_LABEL: &str = "TARGET";

/// Text drawn on top of the triangle list
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: &'static str,
    /// Center of the text in screen pixels
    pub pos: Vec2,
    pub color: [f32; 4],
}

/// One frame's draw data
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
}

/// Rendering knobs derived from settings
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub glow: bool,
    pub circle_segments: u32,
    pub screen_shake: bool,
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            glow: settings.quality.glow_enabled(),
            circle_segments: settings.quality.circle_segments(),
            screen_shake: settings.effective_screen_shake(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Random camera offset for the current shake magnitude
pub fn shake_offset(magnitude: f32, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        (rng.random::<f32>() - 0.5) * magnitude,
        (rng.random::<f32>() - 0.5) * magnitude,
    )
}

/// Hull rotation in radians for the player's current steering
pub fn player_tilt(player: &Player) -> f32 {
    (player.steering_delta() * TILT_PER_PIXEL * TILT_DEGREES).to_radians()
}

/// Build the frame for `state`, offset by `jitter`
pub fn build_frame(state: &GameState, jitter: Vec2, options: &RenderOptions) -> Frame {
    let mut frame = Frame::default();
    let out = &mut frame.vertices;

    for particle in &state.particles {
        draw_particle(out, particle, options);
    }
    draw_player(out, &state.player, options);
    for projectile in &state.projectiles {
        draw_projectile(out, projectile, options);
    }
    for enemy in &state.enemies {
        draw_enemy(out, enemy, options);
        frame.labels.push(Label {
            text: ENEMY_LABEL,
            pos: enemy.bounds.center(),
            color: colors::LABEL,
        });
    }

    let jitter = if options.screen_shake { jitter } else { Vec2::ZERO };
    shapes::translate(&mut frame.vertices, jitter);
    for label in &mut frame.labels {
        label.pos += jitter;
    }
    frame
}

fn draw_particle(out: &mut Vec<Vertex>, particle: &Particle, options: &RenderOptions) {
    let color = with_alpha(particle.color, particle.life);
    if options.glow {
        shapes::glow(out, particle.pos, particle.size * 2.5, color, options.circle_segments);
    }
    shapes::circle(out, particle.pos, particle.size, color, options.circle_segments);
}

fn draw_player(out: &mut Vec<Vertex>, player: &Player, options: &RenderOptions) {
    let b = player.bounds;
    let pivot = b.center();
    let start = out.len();

    if options.glow {
        shapes::glow(out, pivot, b.width * 0.7, colors::PLAYER_GLOW, options.circle_segments);
    }
    // Fuselage
    shapes::rect(out, b.x + 35.0, b.y + 10.0, 20.0, b.height - 20.0, colors::PLAYER_BODY);
    // Swept wings
    shapes::triangle(
        out,
        Vec2::new(b.x, b.y + b.height - 10.0),
        Vec2::new(b.x + b.width / 2.0, b.y),
        Vec2::new(b.x + b.width, b.y + b.height - 10.0),
        colors::PLAYER_WINGS,
    );
    // Cockpit detail
    shapes::rect_outline(
        out,
        shapes::rect_corners(b.x + 40.0, b.y + 20.0, 10.0, 30.0),
        1.0,
        colors::DETAIL,
    );

    let tilt = player_tilt(player);
    for v in &mut out[start..] {
        let p = shapes::rotate_about(Vec2::from(v.position), pivot, tilt);
        v.position = p.to_array();
    }
}

fn draw_projectile(out: &mut Vec<Vertex>, projectile: &Projectile, options: &RenderOptions) {
    let b = projectile.bounds;
    if options.glow {
        shapes::rect(
            out,
            b.x - 4.0,
            b.y - 4.0,
            b.width + 8.0,
            b.height + 8.0,
            with_alpha(projectile.color, 0.35),
        );
    }
    shapes::rect(out, b.x, b.y, b.width, b.height, colors::TRACER_CORE);
    shapes::rect(
        out,
        b.x,
        b.y + STREAK_OFFSET,
        b.width,
        STREAK_LENGTH,
        with_alpha(colors::TRACER_CORE, STREAK_ALPHA),
    );
}

fn draw_enemy(out: &mut Vec<Vertex>, enemy: &Enemy, options: &RenderOptions) {
    let b = enemy.bounds;
    if options.glow {
        shapes::glow(out, b.center(), b.width * 0.8, enemy.color, options.circle_segments);
    }
    shapes::quad(
        out,
        [
            Vec2::new(b.x + ENEMY_TOP_INSET, b.y),
            Vec2::new(b.x + b.width - ENEMY_TOP_INSET, b.y),
            Vec2::new(b.x + b.width, b.y + b.height),
            Vec2::new(b.x, b.y + b.height),
        ],
        enemy.color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use crate::sim::{EnemyKind, fire};

    fn flat() -> RenderOptions {
        RenderOptions {
            glow: false,
            circle_segments: 8,
            screen_shake: true,
        }
    }

    fn state() -> GameState {
        let mut state = GameState::new(Viewport::new(800.0, 600.0));
        // Park the player so it has no tilt
        state.player.target_x = state.player.bounds.center().x;
        state
    }

    #[test]
    fn test_player_only_frame() {
        let frame = build_frame(&state(), Vec2::ZERO, &flat());
        // body (6) + wings (3) + outline (4 lines * 6)
        assert_eq!(frame.vertices.len(), 33);
        assert!(frame.labels.is_empty());
    }

    #[test]
    fn test_enemies_drawn_last_with_label() {
        let mut state = state();
        fire(&mut state, 0.0);
        let mut enemy = Enemy::new(EnemyKind::Stealth, 100.0, 4.0);
        enemy.bounds.y = 50.0;
        state.enemies.push(enemy);

        let frame = build_frame(&state, Vec2::ZERO, &flat());

        let tail = &frame.vertices[frame.vertices.len() - 6..];
        assert!(tail.iter().all(|v| v.color == EnemyKind::Stealth.descriptor().color));
        assert_eq!(frame.labels.len(), 1);
        assert_eq!(frame.labels[0].text, ENEMY_LABEL);
        assert_eq!(frame.labels[0].pos, Vec2::new(135.0, 85.0));
    }

    #[test]
    fn test_particle_alpha_follows_life() {
        let mut state = state();
        state.particles.push(Particle {
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::ZERO,
            life: 0.25,
            size: 3.0,
            color: [1.0, 0.0, 0.0, 1.0],
        });

        let frame = build_frame(&state, Vec2::ZERO, &flat());

        // Particles come first
        assert_eq!(frame.vertices[0].color[3], 0.25);
    }

    #[test]
    fn test_jitter_moves_everything() {
        let mut state = state();
        state.enemies.push(Enemy::new(EnemyKind::Recon, 100.0, 4.0));
        let still = build_frame(&state, Vec2::ZERO, &flat());
        let shaken = build_frame(&state, Vec2::new(3.0, -2.0), &flat());

        for (a, b) in still.vertices.iter().zip(&shaken.vertices) {
            assert!((b.position[0] - a.position[0] - 3.0).abs() < 1e-4);
            assert!((b.position[1] - a.position[1] + 2.0).abs() < 1e-4);
        }
        assert_eq!(shaken.labels[0].pos - still.labels[0].pos, Vec2::new(3.0, -2.0));
    }

    #[test]
    fn test_shake_disabled_ignores_jitter() {
        let options = RenderOptions {
            screen_shake: false,
            ..flat()
        };
        let a = build_frame(&state(), Vec2::ZERO, &options);
        let b = build_frame(&state(), Vec2::new(9.0, 9.0), &options);
        assert_eq!(a.vertices, b.vertices);
    }

    #[test]
    fn test_player_tilts_toward_target() {
        let mut state = state();
        state.player.target_x += 100.0;
        // 100px * 0.02 * 15 degrees
        assert!((player_tilt(&state.player) - 30f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_shake_offset_bounded() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            let o = shake_offset(20.0, &mut rng);
            assert!(o.x.abs() <= 10.0 && o.y.abs() <= 10.0);
        }
        assert_eq!(shake_offset(0.0, &mut rng), Vec2::ZERO);
    }
}

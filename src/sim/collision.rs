//! Collision detection for axis-aligned boxes
//!
//! Every gameplay contact (player vs enemy, projectile vs enemy) is a plain
//! AABB overlap test; there is no response beyond what the tick decides.

use super::state::{Bounds, Enemy, Projectile};

/// Result of resolving one enemy against the projectile list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrikeResult {
    /// Projectiles consumed by this enemy
    pub hits: u32,
    /// Whether this enemy's hp dropped to zero
    pub destroyed: bool,
}

/// Strict AABB overlap; boxes that only share an edge do not collide
#[inline]
pub fn aabb_overlap(a: &Bounds, b: &Bounds) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// Test an enemy against every active projectile.
///
/// Each overlapping projectile deals one point of damage and is deactivated.
/// Once the enemy is dead it stops absorbing shots, so a single enemy can
/// only ever be destroyed once.
pub fn strike_enemy(enemy: &mut Enemy, projectiles: &mut [Projectile]) -> StrikeResult {
    let mut result = StrikeResult::default();
    for projectile in projectiles.iter_mut().filter(|p| p.active) {
        if !enemy.is_alive() {
            break;
        }
        if aabb_overlap(&projectile.bounds, &enemy.bounds) {
            enemy.hp -= 1;
            projectile.active = false;
            result.hits += 1;
            if !enemy.is_alive() {
                result.destroyed = true;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EnemyKind;

    fn enemy_at(x: f32, y: f32) -> Enemy {
        let mut e = Enemy::new(EnemyKind::Recon, x, 4.0);
        e.bounds.y = y;
        e
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(aabb_overlap(&a, &Bounds::new(5.0, 5.0, 10.0, 10.0)));
        assert!(aabb_overlap(&a, &Bounds::new(-5.0, -5.0, 30.0, 30.0))); // containment
        assert!(!aabb_overlap(&a, &Bounds::new(10.0, 0.0, 10.0, 10.0))); // shared edge
        assert!(!aabb_overlap(&a, &Bounds::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_single_hit_destroys_one_hp_enemy() {
        let mut enemy = enemy_at(100.0, 100.0);
        let mut shots = vec![Projectile::new(120.0, 120.0)];

        let result = strike_enemy(&mut enemy, &mut shots);

        assert_eq!(result, StrikeResult { hits: 1, destroyed: true });
        assert!(!shots[0].active);
        assert!(!enemy.is_alive());
    }

    #[test]
    fn test_dead_enemy_does_not_absorb_extra_shots() {
        let mut enemy = enemy_at(100.0, 100.0);
        let mut shots = vec![Projectile::new(110.0, 110.0), Projectile::new(130.0, 110.0)];

        let result = strike_enemy(&mut enemy, &mut shots);

        assert_eq!(result.hits, 1);
        assert!(result.destroyed);
        assert!(!shots[0].active);
        assert!(shots[1].active, "second shot should fly on");
    }

    #[test]
    fn test_inactive_projectiles_are_ignored() {
        let mut enemy = enemy_at(100.0, 100.0);
        let mut shot = Projectile::new(110.0, 110.0);
        shot.active = false;
        let mut shots = vec![shot];

        let result = strike_enemy(&mut enemy, &mut shots);

        assert_eq!(result, StrikeResult::default());
        assert!(enemy.is_alive());
    }

    #[test]
    fn test_multi_hp_enemy_takes_several_hits() {
        let mut enemy = enemy_at(100.0, 100.0);
        enemy.hp = 2;
        enemy.max_hp = 2;
        let mut shots = vec![Projectile::new(110.0, 110.0)];

        let first = strike_enemy(&mut enemy, &mut shots);
        assert_eq!(first, StrikeResult { hits: 1, destroyed: false });

        let mut more = vec![Projectile::new(110.0, 110.0)];
        let second = strike_enemy(&mut enemy, &mut more);
        assert!(second.destroyed);
    }
}

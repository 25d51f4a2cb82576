//! Enemy AI, contact damage, hit-scan shooting and death animation

use glam::Vec2;

use super::collision::slide_move;
use super::grid::TileGrid;
use super::state::{Enemy, Player};
use crate::consts::*;
use crate::heading;

/// What happened to the player during an enemy update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactOutcome {
    pub player_hit: bool,
}

/// Advance every enemy one tick
///
/// Dying enemies count down and go inert; threats steer toward the player
/// until inside the stop distance and deal contact damage when the player
/// is not invulnerable. At most one life is lost per tick.
pub fn update_enemies(grid: &TileGrid, enemies: &mut [Enemy], player: &mut Player) -> ContactOutcome {
    let mut outcome = ContactOutcome::default();
    let target = player.pose.pos;

    for enemy in enemies.iter_mut().filter(|e| e.alive) {
        if enemy.death_frames > 0 {
            enemy.death_frames -= 1;
            if enemy.death_frames == 0 {
                enemy.alive = false;
            }
            continue;
        }

        let to_player = target - enemy.pos;
        let dist = to_player.length();
        if dist > ENEMY_STOP_DISTANCE {
            let step = to_player / dist * ENEMY_SPEED;
            enemy.pos = slide_move(grid, enemy.pos, step);
        }

        if dist < ENEMY_DAMAGE_DISTANCE && player.invulnerable_frames == 0 && player.lives > 0 {
            player.lives -= 1;
            player.invulnerable_frames = INVULNERABILITY_FRAMES;
            outcome.player_hit = true;
            log::debug!("Player hit, {} lives left", player.lives);
        }
    }

    outcome
}

/// True if `target` lies inside the firing cone from `origin`
///
/// Dot product keeps the target in front; the cross/dot ratio gives its
/// angular deviation from the facing direction.
pub fn in_firing_cone(origin: Vec2, facing: f32, target: Vec2) -> bool {
    let to = target - origin;
    let dist = to.length();
    if dist >= SHOT_RANGE {
        return false;
    }
    let forward = heading(facing);
    let dot = forward.dot(to);
    if dot <= 0.0 {
        return false;
    }
    let cross = forward.perp_dot(to);
    cross.abs().atan2(dot) < SHOT_CONE
}

/// Resolve a trigger press: the first threat in the cone starts dying
///
/// Returns the index of the enemy hit. Only one enemy may be hit per press.
pub fn fire(enemies: &mut [Enemy], player: &mut Player) -> Option<usize> {
    let origin = player.pose.pos;
    let facing = player.pose.angle;
    let (index, enemy) = enemies
        .iter_mut()
        .enumerate()
        .find(|(_, e)| e.is_threat() && in_firing_cone(origin, facing, e.pos))?;
    enemy.death_frames = DEATH_ANIMATION_FRAMES;
    player.kills += 1;
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Pose;

    fn arena() -> TileGrid {
        TileGrid::parse(&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ])
        .unwrap()
    }

    fn player_at(x: f32, y: f32, angle: f32) -> Player {
        Player::new(Pose::new(x, y, angle))
    }

    #[test]
    fn test_enemy_closes_then_stops() {
        let grid = arena();
        let mut player = player_at(2.5, 2.5, 0.0);
        let mut enemies = vec![Enemy::spawn(Vec2::new(6.5, 2.5))];
        update_enemies(&grid, &mut enemies, &mut player);
        assert!((enemies[0].pos.x - (6.5 - ENEMY_SPEED)).abs() < 1e-5);

        enemies[0].pos = Vec2::new(3.3, 2.5);
        update_enemies(&grid, &mut enemies, &mut player);
        assert_eq!(enemies[0].pos, Vec2::new(3.3, 2.5));
    }

    #[test]
    fn test_contact_damage_respects_invulnerability() {
        let grid = arena();
        let mut player = player_at(2.5, 2.5, 0.0);
        let mut enemies = vec![Enemy::spawn(Vec2::new(2.6, 2.5)), Enemy::spawn(Vec2::new(2.5, 2.6))];
        let outcome = update_enemies(&grid, &mut enemies, &mut player);
        assert!(outcome.player_hit);
        assert_eq!(player.lives, MAX_LIVES - 1);
        assert_eq!(player.invulnerable_frames, INVULNERABILITY_FRAMES);

        let outcome = update_enemies(&grid, &mut enemies, &mut player);
        assert!(!outcome.player_hit);
        assert_eq!(player.lives, MAX_LIVES - 1);
    }

    #[test]
    fn test_firing_cone() {
        let origin = Vec2::new(1.0, 1.0);
        assert!(in_firing_cone(origin, 0.0, Vec2::new(5.0, 1.2)));
        assert!(!in_firing_cone(origin, 0.0, Vec2::new(5.0, 2.0)));
        assert!(!in_firing_cone(origin, 0.0, Vec2::new(-5.0, 1.0)));
        assert!(!in_firing_cone(origin, 0.0, Vec2::new(1.0 + SHOT_RANGE, 1.0)));
    }

    #[test]
    fn test_fire_hits_one_enemy_and_skips_dying() {
        let mut player = player_at(1.5, 2.5, 0.0);
        let mut enemies = vec![
            Enemy::spawn(Vec2::new(4.5, 2.5)),
            Enemy::spawn(Vec2::new(6.5, 2.5)),
        ];
        assert_eq!(fire(&mut enemies, &mut player), Some(0));
        assert_eq!(player.kills, 1);
        assert_eq!(enemies[0].death_frames, DEATH_ANIMATION_FRAMES);
        assert_eq!(enemies[1].death_frames, 0);

        // The dying enemy cannot be re-killed
        assert_eq!(fire(&mut enemies, &mut player), Some(1));
        assert_eq!(fire(&mut enemies, &mut player), None);
        assert_eq!(player.kills, 2);
    }

    #[test]
    fn test_death_animation_runs_out() {
        let grid = arena();
        let mut player = player_at(1.5, 1.5, 0.0);
        let mut enemies = vec![Enemy::spawn(Vec2::new(1.6, 1.5))];
        enemies[0].death_frames = DEATH_ANIMATION_FRAMES;
        player.invulnerable_frames = 0;
        for _ in 0..DEATH_ANIMATION_FRAMES {
            let outcome = update_enemies(&grid, &mut enemies, &mut player);
            assert!(!outcome.player_hit);
        }
        assert!(!enemies[0].alive);
        assert_eq!(player.lives, MAX_LIVES);
    }
}

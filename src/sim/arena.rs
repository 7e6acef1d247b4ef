//! Static arena layouts
//!
//! Walls are built once when a round starts and never move.

use rand::Rng;

use super::geometry::{Rect, Wall};
use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH, BORDER_THICKNESS};

/// Which obstacle set to build inside the border
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Border only
    Open,
    /// Horizontal bar crossed by a vertical one
    Cross,
    /// Four corner pillars and a center block
    Pillars,
    /// One horizontal and one vertical bar at random spots
    Scattered,
}

impl Layout {
    /// Layout for a stage index (0-based)
    pub fn for_stage(stage: u32) -> Self {
        match stage {
            0 => Layout::Cross,
            1 => Layout::Pillars,
            _ => Layout::Scattered,
        }
    }
}

/// The four border walls
pub fn border_walls() -> Vec<Wall> {
    let t = BORDER_THICKNESS;
    vec![
        Rect::new(0.0, 0.0, ARENA_WIDTH, t),
        Rect::new(0.0, ARENA_HEIGHT - t, ARENA_WIDTH, t),
        Rect::new(0.0, 0.0, t, ARENA_HEIGHT),
        Rect::new(ARENA_WIDTH - t, 0.0, t, ARENA_HEIGHT),
    ]
}

/// Border plus the obstacles of `layout`
pub fn build<R: Rng + ?Sized>(layout: Layout, rng: &mut R) -> Vec<Wall> {
    let mut walls = border_walls();
    match layout {
        Layout::Open => {}
        Layout::Cross => {
            walls.push(Rect::new(300.0, 200.0, 200.0, 20.0));
            walls.push(Rect::new(390.0, 100.0, 20.0, 400.0));
        }
        Layout::Pillars => {
            walls.extend([
                Rect::new(200.0, 200.0, 50.0, 50.0),
                Rect::new(550.0, 200.0, 50.0, 50.0),
                Rect::new(200.0, 350.0, 50.0, 50.0),
                Rect::new(550.0, 350.0, 50.0, 50.0),
                Rect::new(350.0, 275.0, 100.0, 50.0),
            ]);
        }
        Layout::Scattered => {
            let (x, y) = random_anchor(rng);
            walls.push(Rect::new(x, y, 100.0, 20.0));
            let (x, y) = random_anchor(rng);
            walls.push(Rect::new(x, y, 20.0, 100.0));
        }
    }
    walls
}

/// Top-left corner for a scattered obstacle, kept clear of the border
fn random_anchor<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let x = 150.0 + rng.random::<f32>() * 500.0;
    let y = 150.0 + rng.random::<f32>() * 300.0;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_open_arena_is_just_the_border() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(build(Layout::Open, &mut rng).len(), 4);
    }

    #[test]
    fn test_stage_layouts() {
        assert_eq!(Layout::for_stage(0), Layout::Cross);
        assert_eq!(Layout::for_stage(1), Layout::Pillars);
        assert_eq!(Layout::for_stage(7), Layout::Scattered);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(build(Layout::Pillars, &mut rng).len(), 9);
    }

    #[test]
    fn test_scattered_stays_inside_border() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            for wall in &build(Layout::Scattered, &mut rng)[4..] {
                assert!(wall.x >= BORDER_THICKNESS && wall.right() <= ARENA_WIDTH - BORDER_THICKNESS);
                assert!(wall.y >= BORDER_THICKNESS && wall.bottom() <= ARENA_HEIGHT - BORDER_THICKNESS);
            }
        }
    }

    #[test]
    fn test_player_spawn_is_clear_in_every_layout() {
        use crate::consts::{PLAYER_SPAWN_X, PLAYER_SPAWN_Y, TANK_SIZE};
        let spawn = Rect::centered(Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y), TANK_SIZE, TANK_SIZE);
        let mut rng = Pcg32::seed_from_u64(2);
        for layout in [Layout::Open, Layout::Cross, Layout::Pillars] {
            assert!(build(layout, &mut rng).iter().all(|w| !spawn.overlaps(w)));
        }
    }
}

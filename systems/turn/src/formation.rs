use std::f32::consts::TAU;

use astrobots_core::{ArenaConfig, Color};
use glam::Vec2;

/// Hull colours handed out to ships in roster order.
pub const PALETTE: [Color; 8] = [
    Color::from_rgb(255, 80, 80),
    Color::from_rgb(80, 255, 80),
    Color::from_rgb(80, 180, 255),
    Color::from_rgb(255, 255, 80),
    Color::from_rgb(255, 80, 255),
    Color::from_rgb(80, 255, 255),
    Color::from_rgb(255, 160, 0),
    Color::from_rgb(128, 0, 128),
];

/// Starting position and heading of a ship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Position in world units.
    pub position: Vec2,
    /// Heading in degrees.
    pub heading: f32,
}

impl Placement {
    /// Creates a placement from a position and heading.
    #[must_use]
    pub const fn new(position: Vec2, heading: f32) -> Self {
        Self { position, heading }
    }
}

/// Spreads `count` ships evenly on a circle of `spawn_radius` around the
/// arena centre, each facing away from it.
#[must_use]
pub fn circle_formation(config: &ArenaConfig, count: usize) -> Vec<Placement> {
    let center = config.center();
    (0..count)
        .map(|index| {
            let angle = index as f32 / count as f32 * TAU;
            let position = center + Vec2::new(angle.cos(), angle.sin()) * config.spawn_radius;
            Placement::new(position, angle.to_degrees())
        })
        .collect()
}

/// Colour assigned to the ship at `index` in the roster.
#[must_use]
pub fn color_for(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ships_face_outward_on_the_spawn_circle() {
        let config = ArenaConfig::default();
        let placements = circle_formation(&config, 4);

        assert_eq!(placements.len(), 4);
        for placement in &placements {
            let outward = placement.position - config.center();
            assert!((outward.length() - config.spawn_radius).abs() < 1e-3);
            let facing = Vec2::new(
                placement.heading.to_radians().cos(),
                placement.heading.to_radians().sin(),
            );
            assert!(facing.dot(outward.normalize()) > 0.999);
        }
        assert_eq!(placements[0].heading, 0.0);
        assert!((placements[1].heading - 90.0).abs() < 1e-3);
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(color_for(0), color_for(PALETTE.len()));
        assert_ne!(color_for(0), color_for(1));
    }
}

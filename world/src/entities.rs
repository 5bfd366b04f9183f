use astrobots_core::{
    ArenaConfig, AsteroidId, Color, ScanReading, ShipId, ShipSnapshot, ShipStatus, TorpedoId,
};
use glam::Vec2;

use crate::geometry::Capsule;

/// Mutable ship record owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Ship {
    pub(crate) id: ShipId,
    pub(crate) name: String,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) heading: f32,
    /// Heading frozen when the turn started. Other ships aim at this hull.
    pub(crate) turn_start_heading: f32,
    pub(crate) hp: u32,
    pub(crate) fuel: f32,
    pub(crate) phaser_cooldown: u32,
    pub(crate) photon_cooldown: u32,
    pub(crate) scan: ScanReading,
    pub(crate) color: Color,
    pub(crate) alive: bool,
}

impl Ship {
    pub(crate) fn hull(&self, config: &ArenaConfig) -> Capsule {
        Capsule::hull(
            self.position,
            self.heading,
            config.hull_half_length,
            config.hull_radius,
        )
    }

    /// Hull as it stood when the current turn started.
    pub(crate) fn turn_start_hull(&self, config: &ArenaConfig) -> Capsule {
        Capsule::hull(
            self.position,
            self.turn_start_heading,
            config.hull_half_length,
            config.hull_radius,
        )
    }

    pub(crate) fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            velocity: self.velocity,
            heading: self.heading,
            hp: self.hp,
            fuel: self.fuel,
            phaser_cooldown: self.phaser_cooldown,
            photon_cooldown: self.photon_cooldown,
            scan: self.scan,
            color: self.color,
            alive: self.alive,
        }
    }

    pub(crate) fn status(&self, max_hp: u32) -> ShipStatus {
        if !self.alive {
            return ShipStatus::INACTIVE;
        }
        ShipStatus {
            alive: true,
            hp: self.hp,
            max_hp,
            fuel: self.fuel,
            phaser_cooldown: self.phaser_cooldown,
            photon_cooldown: self.photon_cooldown,
            scan: self.scan,
        }
    }
}

/// Drifting rock with a convex outline.
#[derive(Clone, Debug, PartialEq)]
pub struct Asteroid {
    /// Identifier of the asteroid.
    pub id: AsteroidId,
    /// Centre of the asteroid in world units.
    pub position: Vec2,
    /// Drift per turn.
    pub velocity: Vec2,
    /// Radius of the bounding circle.
    pub radius: f32,
    /// Convex outline relative to the centre, in winding order.
    pub outline: Vec<Vec2>,
    /// Impact accumulated from hits and contacts.
    pub impact: u32,
    /// Whether the asteroid is still in play.
    pub alive: bool,
}

impl Asteroid {
    /// Outline placed around `center` instead of the stored position.
    #[must_use]
    pub fn outline_at(&self, center: Vec2) -> Vec<Vec2> {
        self.outline.iter().map(|offset| center + *offset).collect()
    }
}

/// Photon torpedo in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Torpedo {
    /// Identifier of the torpedo.
    pub id: TorpedoId,
    /// Ship that launched the torpedo; never struck by it.
    pub owner: ShipId,
    /// Position after the latest physics step, unwrapped until collisions resolve.
    pub position: Vec2,
    /// Position before the latest physics step.
    pub previous: Vec2,
    /// Displacement per turn.
    pub velocity: Vec2,
    /// Physics steps left before the torpedo expires.
    pub fuse: u32,
    /// Animation counter advanced every physics step.
    pub phase: u32,
    /// Whether the torpedo is still in flight.
    pub alive: bool,
}

/// Phaser discharge drawn for the turn it was fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaserBeam {
    /// Ship that fired.
    pub owner: ShipId,
    /// Muzzle position.
    pub start: Vec2,
    /// Point where the beam stopped.
    pub end: Vec2,
    /// Colour of the firing ship.
    pub color: Color,
    /// Whether the beam is still displayed.
    pub alive: bool,
}

/// Cosmetic spark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current position.
    pub position: Vec2,
    /// Displacement per turn.
    pub velocity: Vec2,
    /// Turns the particle has existed.
    pub age: u32,
    /// Turns the particle lives for.
    pub lifetime: u32,
    /// Tint of the particle.
    pub color: Color,
    /// Whether the particle is still displayed.
    pub alive: bool,
}

/// Cosmetic fragment of a destroyed hull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisSegment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
    /// Displacement per turn.
    pub velocity: Vec2,
    /// Rotation per turn in degrees.
    pub spin: f32,
    /// Turns the segment has existed.
    pub age: u32,
    /// Turns the segment lives for.
    pub lifetime: u32,
    /// Tint of the segment.
    pub color: Color,
    /// Whether the segment is still displayed.
    pub alive: bool,
}

/// Value broadcast by a ship during the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signal {
    /// Ship that broadcast the value.
    pub ship: ShipId,
    /// Broadcast value.
    pub value: i32,
}

/// Phaser damage waiting for collision resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PendingHit {
    pub(crate) target: astrobots_core::Target,
    pub(crate) damage: u32,
}

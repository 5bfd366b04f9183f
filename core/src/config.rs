//! Tunable parameters for a match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every tunable knob of the arena simulation.
///
/// Missing fields fall back to [`ArenaConfig::default`] when deserialised, so a
/// configuration file only needs to list the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width in world units.
    pub width: f32,
    /// Arena height in world units.
    pub height: f32,
    /// Number of turns after which the match ends.
    pub max_turns: u32,
    /// Seed for asteroid shapes, edge spawns and cosmetic effects.
    pub seed: u64,
    /// Hit points each ship starts with.
    pub ship_hp: u32,
    /// Fuel each ship starts with.
    pub ship_fuel: f32,
    /// Velocity gained per unit of thrust power.
    pub thrust_accel: f32,
    /// Fuel consumed per unit of thrust power.
    pub fuel_per_power: f32,
    /// Upper bound on ship speed in world units per turn.
    pub max_ship_speed: f32,
    /// Half the length of the capsule hull along the heading.
    pub hull_half_length: f32,
    /// Radius of the capsule hull.
    pub hull_radius: f32,
    /// Reach of the phaser beam.
    pub phaser_range: f32,
    /// Damage dealt by a phaser hit.
    pub phaser_damage: u32,
    /// Turns the phaser needs to recharge.
    pub phaser_cooldown: u32,
    /// Torpedo speed relative to the launching ship.
    pub photon_speed: f32,
    /// Turns a torpedo flies before expiring.
    pub photon_lifetime: u32,
    /// Damage dealt by a torpedo hit.
    pub photon_damage: u32,
    /// Turns the photon launcher needs to recharge.
    pub photon_cooldown: u32,
    /// Collision radius of a torpedo.
    pub photon_radius: f32,
    /// Maximum scan distance.
    pub scan_range: f32,
    /// Full angular width of the scan cone in degrees.
    pub scan_fov_degrees: f32,
    /// Damage dealt to ships by hull contact.
    pub contact_damage: u32,
    /// Asteroid population the arena tries to maintain.
    pub asteroid_target: usize,
    /// Accumulated impact that breaks an asteroid apart.
    pub asteroid_integrity: u32,
    /// Smallest asteroid radius.
    pub asteroid_min_radius: f32,
    /// Largest asteroid radius.
    pub asteroid_max_radius: f32,
    /// Largest asteroid drift speed.
    pub asteroid_max_speed: f32,
    /// Turns between edge spawns while the population is below target.
    pub edge_spawn_cooldown: u32,
    /// Distance from the arena centre at which ships are placed.
    pub spawn_radius: f32,
    /// Informational script cost budget per ship.
    pub script_budget: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            max_turns: 1000,
            seed: 0x5eed_a57e_0b07_5001,
            ship_hp: 10,
            ship_fuel: 100.0,
            thrust_accel: 0.5,
            fuel_per_power: 1.0,
            max_ship_speed: 12.0,
            hull_half_length: 15.0,
            hull_radius: 7.5,
            phaser_range: 450.0,
            phaser_damage: 2,
            phaser_cooldown: 10,
            photon_speed: 30.0,
            photon_lifetime: 40,
            photon_damage: 3,
            photon_cooldown: 20,
            photon_radius: 5.0,
            scan_range: 600.0,
            scan_fov_degrees: 60.0,
            contact_damage: 1,
            asteroid_target: 8,
            asteroid_integrity: 4,
            asteroid_min_radius: 20.0,
            asteroid_max_radius: 45.0,
            asteroid_max_speed: 2.0,
            edge_spawn_cooldown: 60,
            spawn_radius: 300.0,
            script_budget: 40,
        }
    }
}

/// Reasons an [`ArenaConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The arena has no area.
    #[error("arena dimensions must be positive and finite, got {width}x{height}")]
    EmptyArena {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// The match could never run a turn.
    #[error("max_turns must be at least 1")]
    NoTurns,
    /// Ships would be destroyed before the first turn.
    #[error("ship_hp must be at least 1")]
    NoHitPoints,
    /// A value that must be finite and non-negative was not.
    #[error("{field} must be a finite non-negative number, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: f32,
    },
    /// The asteroid radius range is inverted or empty.
    #[error("asteroid radius range {min}..{max} is invalid")]
    AsteroidRadius {
        /// Configured minimum radius.
        min: f32,
        /// Configured maximum radius.
        max: f32,
    },
}

impl ArenaConfig {
    /// Checks that the configuration describes a playable arena.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sized = |extent: f32| extent > 0.0 && extent.is_finite();
        if !(sized(self.width) && sized(self.height)) {
            return Err(ConfigError::EmptyArena {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_turns == 0 {
            return Err(ConfigError::NoTurns);
        }
        if self.ship_hp == 0 {
            return Err(ConfigError::NoHitPoints);
        }

        let non_negative = [
            ("ship_fuel", self.ship_fuel),
            ("thrust_accel", self.thrust_accel),
            ("fuel_per_power", self.fuel_per_power),
            ("max_ship_speed", self.max_ship_speed),
            ("hull_half_length", self.hull_half_length),
            ("hull_radius", self.hull_radius),
            ("phaser_range", self.phaser_range),
            ("photon_speed", self.photon_speed),
            ("photon_radius", self.photon_radius),
            ("scan_range", self.scan_range),
            ("scan_fov_degrees", self.scan_fov_degrees),
            ("asteroid_max_speed", self.asteroid_max_speed),
            ("spawn_radius", self.spawn_radius),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let (min, max) = (self.asteroid_min_radius, self.asteroid_max_radius);
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(ConfigError::AsteroidRadius { min, max });
        }

        Ok(())
    }

    /// Centre point of the arena.
    #[must_use]
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

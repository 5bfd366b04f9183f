use std::f32::consts::TAU;

use astrobots_core::{ArenaConfig, AsteroidId, Event};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    entities::Asteroid,
    geometry::{heading_vector, shortest_delta},
};

const OUTLINE_VERTICES: std::ops::RangeInclusive<usize> = 7..=11;
const PLACEMENT_ATTEMPTS: usize = 16;
const SHIP_CLEARANCE: f32 = 80.0;

/// Asteroid population together with its spawn cadence.
#[derive(Debug)]
pub(crate) struct AsteroidField {
    asteroids: Vec<Asteroid>,
    next_id: u32,
    spawn_cooldown: u32,
    rng: ChaCha8Rng,
}

impl AsteroidField {
    pub(crate) fn new(config: &ArenaConfig) -> Self {
        Self {
            asteroids: Vec::new(),
            next_id: 0,
            spawn_cooldown: config.edge_spawn_cooldown,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    pub(crate) fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub(crate) fn asteroids_mut(&mut self) -> &mut [Asteroid] {
        &mut self.asteroids
    }

    pub(crate) fn living_count(&self) -> usize {
        self.asteroids
            .iter()
            .filter(|asteroid| asteroid.alive)
            .count()
    }

    /// Scatters `count` asteroids across the arena, keeping clear of `ships`
    /// when a free spot can be found.
    pub(crate) fn scatter(
        &mut self,
        count: usize,
        ships: &[Vec2],
        config: &ArenaConfig,
        out_events: &mut Vec<Event>,
    ) {
        for _ in 0..count {
            let radius = self.roll_radius(config);
            let mut position = self.roll_position(config);
            for _ in 0..PLACEMENT_ATTEMPTS {
                let crowded = ships.iter().any(|ship| {
                    shortest_delta(position, *ship, config.width, config.height).length()
                        < radius + SHIP_CLEARANCE
                });
                if !crowded {
                    break;
                }
                position = self.roll_position(config);
            }
            let velocity = self.roll_drift(config);
            let _ = self.insert(position, velocity, radius, out_events);
        }
    }

    /// Counts down the edge spawn timer and releases one asteroid from a
    /// random edge when the population is below target.
    pub(crate) fn replenish(&mut self, config: &ArenaConfig, out_events: &mut Vec<Event>) {
        self.spawn_cooldown = self.spawn_cooldown.saturating_sub(1);
        if self.living_count() >= config.asteroid_target || self.spawn_cooldown > 0 {
            return;
        }

        let radius = self.roll_radius(config);
        let along = self.rng.gen_range(0.0..1.0_f32);
        // Opposite edges share a seam on the torus, so only the drift differs.
        let (position, inward) = match self.rng.gen_range(0..4_u8) {
            0 => (Vec2::new(along * config.width, 0.0), 90.0),
            1 => (Vec2::new(0.0, along * config.height), 180.0),
            2 => (Vec2::new(along * config.width, 0.0), 270.0),
            _ => (Vec2::new(0.0, along * config.height), 0.0),
        };
        let spread = self.rng.gen_range(-45.0..=45.0_f32);
        let speed = self.rng.gen_range(0.0..=config.asteroid_max_speed);
        let velocity = heading_vector(inward + spread) * speed;

        let id = self.insert(position, velocity, radius, out_events);
        self.spawn_cooldown = config.edge_spawn_cooldown;
        debug!(asteroid = id.get(), x = position.x, y = position.y, "asteroid entered from edge");
    }

    pub(crate) fn purge(&mut self) {
        self.asteroids.retain(|asteroid| asteroid.alive);
    }

    fn insert(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        radius: f32,
        out_events: &mut Vec<Event>,
    ) -> AsteroidId {
        let id = AsteroidId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let outline = self.roll_outline(radius);
        self.asteroids.push(Asteroid {
            id,
            position,
            velocity,
            radius,
            outline,
            impact: 0,
            alive: true,
        });
        out_events.push(Event::AsteroidSpawned {
            asteroid: id,
            position,
        });
        id
    }

    fn roll_radius(&mut self, config: &ArenaConfig) -> f32 {
        self.rng
            .gen_range(config.asteroid_min_radius..=config.asteroid_max_radius)
    }

    fn roll_position(&mut self, config: &ArenaConfig) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(0.0..config.width),
            self.rng.gen_range(0.0..config.height),
        )
    }

    fn roll_drift(&mut self, config: &ArenaConfig) -> Vec2 {
        let direction = heading_vector(self.rng.gen_range(0.0..360.0));
        direction * self.rng.gen_range(0.0..=config.asteroid_max_speed)
    }

    /// Points on a rotated ellipse in angular order; always convex.
    fn roll_outline(&mut self, radius: f32) -> Vec<Vec2> {
        let count = self.rng.gen_range(OUTLINE_VERTICES);
        let aspect = self.rng.gen_range(0.7..=1.0_f32);
        let rotation = heading_vector(self.rng.gen_range(0.0..360.0));
        let step = TAU / count as f32;

        (0..count)
            .map(|index| {
                let jitter = self.rng.gen_range(-0.35..=0.35_f32) * step;
                let angle = index as f32 * step + jitter;
                let local = Vec2::new(angle.cos() * radius, angle.sin() * radius * aspect);
                rotation.rotate(local)
            })
            .collect()
    }
}

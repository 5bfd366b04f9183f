use astrobots_core::Color;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    entities::{DebrisSegment, Particle},
    geometry::{heading_vector, wrap_position},
};

const EFFECTS_STREAM: u64 = 0x0eff_ec75_0000_0001;

const SPARK_LIFETIME: std::ops::RangeInclusive<u32> = 8..=20;
const DEBRIS_LIFETIME: std::ops::RangeInclusive<u32> = 30..=60;
const SPARK_DRAG: f32 = 0.92;

/// Cosmetic particles and hull fragments.
///
/// Effects draw from their own random stream so that gameplay randomness is
/// unaffected by how many sparks a collision produces.
#[derive(Debug)]
pub(crate) struct Effects {
    particles: Vec<Particle>,
    debris: Vec<DebrisSegment>,
    rng: ChaCha8Rng,
}

impl Effects {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            debris: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed ^ EFFECTS_STREAM),
        }
    }

    pub(crate) fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn debris(&self) -> &[DebrisSegment] {
        &self.debris
    }

    /// Sprays `count` sparks outward from `origin`.
    pub(crate) fn burst(&mut self, origin: Vec2, drift: Vec2, color: Color, count: usize) {
        for _ in 0..count {
            let direction = heading_vector(self.rng.gen_range(0.0..=360.0));
            let speed = self.rng.gen_range(0.5..=3.0);
            let lifetime = self.rng.gen_range(SPARK_LIFETIME);
            self.particles.push(Particle {
                position: origin,
                velocity: drift + direction * speed,
                age: 0,
                lifetime,
                color,
                alive: true,
            });
        }
    }

    /// Breaks a ship outline into tumbling segments.
    pub(crate) fn shatter(
        &mut self,
        center: Vec2,
        heading: f32,
        velocity: Vec2,
        size: f32,
        color: Color,
    ) {
        let nose = center + heading_vector(heading) * size;
        let left = center + heading_vector(heading + 140.0) * size * 0.6;
        let right = center + heading_vector(heading - 140.0) * size * 0.6;

        for (start, end) in [(nose, left), (left, right), (right, nose)] {
            let midpoint = (start + end) * 0.5;
            let outward = (midpoint - center).normalize_or_zero();
            let speed = self.rng.gen_range(0.5..=2.0);
            let spin = self.rng.gen_range(-12.0..=12.0);
            let lifetime = self.rng.gen_range(DEBRIS_LIFETIME);
            self.debris.push(DebrisSegment {
                start,
                end,
                velocity: velocity + outward * speed,
                spin,
                age: 0,
                lifetime,
                color,
                alive: true,
            });
        }
        self.burst(center, velocity, color, 24);
    }

    /// Moves and ages every effect, retiring the expired ones.
    pub(crate) fn advance(&mut self, width: f32, height: f32) {
        for particle in self.particles.iter_mut().filter(|particle| particle.alive) {
            particle.position = wrap_position(particle.position + particle.velocity, width, height);
            particle.velocity *= SPARK_DRAG;
            particle.age += 1;
            particle.alive = particle.age < particle.lifetime;
        }

        for segment in self.debris.iter_mut().filter(|segment| segment.alive) {
            let midpoint = (segment.start + segment.end) * 0.5 + segment.velocity;
            let half = rotate_degrees((segment.end - segment.start) * 0.5, segment.spin);
            let midpoint = wrap_position(midpoint, width, height);
            segment.start = midpoint - half;
            segment.end = midpoint + half;
            segment.age += 1;
            segment.alive = segment.age < segment.lifetime;
        }
    }

    pub(crate) fn purge(&mut self) {
        self.particles.retain(|particle| particle.alive);
        self.debris.retain(|segment| segment.alive);
    }
}

fn rotate_degrees(vector: Vec2, degrees: f32) -> Vec2 {
    heading_vector(degrees).rotate(vector)
}

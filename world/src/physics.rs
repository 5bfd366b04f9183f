//! Motion integration and collision resolution.
//!
//! Ships and asteroids are tested per frame. Torpedoes are swept along the
//! segment they travelled during the last step, because at torpedo speeds a
//! hull can sit entirely between two sampled positions.

use astrobots_core::{Color, Event, Target};
use glam::Vec2;
use tracing::info;

use crate::{
    effects::Effects,
    entities::{Asteroid, Ship},
    geometry::{shortest_delta, sweep_polygon, wrap_position, Capsule},
    World,
};

const ROCK: Color = Color::from_rgb(150, 130, 110);
const DETONATION: Color = Color::from_rgb(255, 200, 80);

/// Records `target` when it is struck earlier along a sweep than the current best.
pub(crate) fn keep_earliest(best: &mut Option<(f32, Target)>, along: f32, target: Target) {
    if best.map_or(true, |(current, _)| along < current) {
        *best = Some((along, target));
    }
}

pub(crate) fn advance(world: &mut World, out_events: &mut Vec<Event>) {
    let (width, height) = (world.config.width, world.config.height);

    for ship in world.ships.iter_mut().filter(|ship| ship.alive) {
        ship.position = wrap_position(ship.position + ship.velocity, width, height);
    }

    for asteroid in world
        .field
        .asteroids_mut()
        .iter_mut()
        .filter(|asteroid| asteroid.alive)
    {
        asteroid.position = wrap_position(asteroid.position + asteroid.velocity, width, height);
    }

    for torpedo in world.torpedoes.iter_mut().filter(|torpedo| torpedo.alive) {
        if torpedo.fuse == 0 {
            torpedo.alive = false;
            out_events.push(Event::TorpedoExpired {
                torpedo: torpedo.id,
            });
            continue;
        }
        torpedo.fuse -= 1;
        torpedo.previous = torpedo.position;
        torpedo.position += torpedo.velocity;
        torpedo.phase = torpedo.phase.wrapping_add(1);
    }

    world.effects.advance(width, height);
}

pub(crate) fn resolve_collisions(world: &mut World, out_events: &mut Vec<Event>) {
    apply_pending_hits(world, out_events);
    ship_asteroid_contacts(world, out_events);
    ship_ship_contacts(world, out_events);
    torpedo_hits(world, out_events);

    let (width, height) = (world.config.width, world.config.height);
    for torpedo in world.torpedoes.iter_mut().filter(|torpedo| torpedo.alive) {
        torpedo.position = wrap_position(torpedo.position, width, height);
    }
}

fn apply_pending_hits(world: &mut World, out_events: &mut Vec<Event>) {
    let World {
        config,
        ships,
        field,
        pending_hits,
        effects,
        ..
    } = world;

    for hit in pending_hits.drain(..) {
        match hit.target {
            Target::Ship(id) => {
                if let Some(ship) = ships.iter_mut().find(|ship| ship.id == id) {
                    damage_ship(ship, hit.damage, config.hull_half_length, effects, out_events);
                }
            }
            Target::Asteroid(id) => {
                if let Some(asteroid) = field
                    .asteroids_mut()
                    .iter_mut()
                    .find(|asteroid| asteroid.id == id)
                {
                    damage_asteroid(
                        asteroid,
                        hit.damage,
                        config.asteroid_integrity,
                        effects,
                        out_events,
                    );
                }
            }
        }
    }
}

fn ship_asteroid_contacts(world: &mut World, out_events: &mut Vec<Event>) {
    let World {
        config,
        ships,
        field,
        effects,
        ..
    } = world;
    let reach = config.hull_half_length + config.hull_radius;

    for ship in ships.iter_mut() {
        for asteroid in field.asteroids_mut().iter_mut() {
            if !ship.alive {
                break;
            }
            if !asteroid.alive {
                continue;
            }

            let offset =
                shortest_delta(ship.position, asteroid.position, config.width, config.height);
            if offset.length() > asteroid.radius + reach {
                continue;
            }
            let outline = asteroid.outline_at(ship.position + offset);
            if !ship.hull(config).overlaps_polygon(&outline) {
                continue;
            }

            let normal = (-offset).normalize_or_zero();
            let approach = ship.velocity.dot(normal);
            if approach < 0.0 {
                ship.velocity -= normal * 2.0 * approach;
            }
            damage_ship(
                ship,
                config.contact_damage,
                config.hull_half_length,
                effects,
                out_events,
            );
            damage_asteroid(asteroid, 1, config.asteroid_integrity, effects, out_events);
        }
    }
}

fn ship_ship_contacts(world: &mut World, out_events: &mut Vec<Event>) {
    let World {
        config,
        ships,
        effects,
        ..
    } = world;

    for second in 1..ships.len() {
        let (head, tail) = ships.split_at_mut(second);
        let other = &mut tail[0];
        for ship in head.iter_mut() {
            if !ship.alive || !other.alive {
                continue;
            }
            let offset = shortest_delta(ship.position, other.position, config.width, config.height);
            let other_hull = Capsule::hull(
                ship.position + offset,
                other.heading,
                config.hull_half_length,
                config.hull_radius,
            );
            if !ship.hull(config).overlaps(&other_hull) {
                continue;
            }

            std::mem::swap(&mut ship.velocity, &mut other.velocity);
            damage_ship(
                ship,
                config.contact_damage,
                config.hull_half_length,
                effects,
                out_events,
            );
            damage_ship(
                other,
                config.contact_damage,
                config.hull_half_length,
                effects,
                out_events,
            );
        }
    }
}

fn torpedo_hits(world: &mut World, out_events: &mut Vec<Event>) {
    let World {
        config,
        ships,
        field,
        torpedoes,
        effects,
        ..
    } = world;

    for torpedo in torpedoes.iter_mut().filter(|torpedo| torpedo.alive) {
        let (from, to) = (torpedo.previous, torpedo.position);
        let mut earliest = None;

        for ship in ships
            .iter()
            .filter(|ship| ship.alive && ship.id != torpedo.owner)
        {
            let center = from + shortest_delta(from, ship.position, config.width, config.height);
            let hull = ship.hull(config).translated(center - ship.position);
            if let Some(along) = hull.sweep(from, to, config.photon_radius) {
                keep_earliest(&mut earliest, along, Target::Ship(ship.id));
            }
        }
        for asteroid in field.asteroids().iter().filter(|asteroid| asteroid.alive) {
            let center =
                from + shortest_delta(from, asteroid.position, config.width, config.height);
            let outline = asteroid.outline_at(center);
            if let Some(along) = sweep_polygon(from, to, &outline, config.photon_radius) {
                keep_earliest(&mut earliest, along, Target::Asteroid(asteroid.id));
            }
        }

        let Some((along, target)) = earliest else {
            continue;
        };
        torpedo.alive = false;
        out_events.push(Event::TorpedoDetonated {
            torpedo: torpedo.id,
            target,
        });
        let blast = wrap_position(from.lerp(to, along), config.width, config.height);
        effects.burst(blast, Vec2::ZERO, DETONATION, 12);

        match target {
            Target::Ship(id) => {
                if let Some(ship) = ships.iter_mut().find(|ship| ship.id == id) {
                    damage_ship(
                        ship,
                        config.photon_damage,
                        config.hull_half_length,
                        effects,
                        out_events,
                    );
                }
            }
            Target::Asteroid(id) => {
                if let Some(asteroid) = field
                    .asteroids_mut()
                    .iter_mut()
                    .find(|asteroid| asteroid.id == id)
                {
                    damage_asteroid(
                        asteroid,
                        config.photon_damage,
                        config.asteroid_integrity,
                        effects,
                        out_events,
                    );
                }
            }
        }
    }
}

/// Removes hit points from a living ship, destroying it at zero.
fn damage_ship(
    ship: &mut Ship,
    amount: u32,
    size: f32,
    effects: &mut Effects,
    out_events: &mut Vec<Event>,
) {
    if !ship.alive || amount == 0 {
        return;
    }

    let damage = amount.min(ship.hp);
    ship.hp -= damage;
    out_events.push(Event::ShipDamaged {
        ship: ship.id,
        damage,
        hp: ship.hp,
    });
    effects.burst(ship.position, ship.velocity, ship.color, 6);

    if ship.hp == 0 {
        ship.alive = false;
        out_events.push(Event::ShipDestroyed { ship: ship.id });
        effects.shatter(ship.position, ship.heading, ship.velocity, size, ship.color);
        info!(ship = ship.id.get(), name = %ship.name, "ship destroyed");
    }
}

fn damage_asteroid(
    asteroid: &mut Asteroid,
    amount: u32,
    integrity: u32,
    effects: &mut Effects,
    out_events: &mut Vec<Event>,
) {
    if !asteroid.alive {
        return;
    }

    asteroid.impact = asteroid.impact.saturating_add(amount);
    if asteroid.impact >= integrity {
        asteroid.alive = false;
        out_events.push(Event::AsteroidDestroyed {
            asteroid: asteroid.id,
        });
        effects.burst(asteroid.position, asteroid.velocity, ROCK, 16);
    } else {
        out_events.push(Event::AsteroidDamaged {
            asteroid: asteroid.id,
            impact: asteroid.impact,
        });
        effects.burst(asteroid.position, asteroid.velocity, ROCK, 4);
    }
}

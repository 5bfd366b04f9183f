//! Ship verbs issued by programs through `Command::Act`.

use astrobots_core::{Event, ScanReading, ShipAction, ShipId, Target, TorpedoId};
use glam::Vec2;

use crate::{
    entities::{PendingHit, PhaserBeam, Ship, Signal, Torpedo},
    geometry::{
        angle_difference, bearing_of, heading_vector, normalize_degrees, shortest_delta,
        sweep_polygon,
    },
    physics::keep_earliest,
    World,
};

/// Gap between the hull tip and a freshly launched torpedo.
const LAUNCH_CLEARANCE: f32 = 1.0;

pub(crate) fn act(
    world: &mut World,
    ship: ShipId,
    action: ShipAction,
    out_events: &mut Vec<Event>,
) {
    let Some(index) = world.ship_index(ship) else {
        return;
    };
    if !world.ships[index].alive {
        return;
    }

    match action {
        ShipAction::Thrust { power } => thrust(world, index, power),
        ShipAction::TurnDegrees { degrees } => {
            let ship = &mut world.ships[index];
            ship.heading = normalize_degrees(ship.heading + degrees as f32);
        }
        ShipAction::FirePhaser => fire_phaser(world, index, out_events),
        ShipAction::FirePhoton => fire_photon(world, index, out_events),
        ShipAction::Scan => scan(world, index, out_events),
        ShipAction::TurnToScan => {
            let ship = &mut world.ships[index];
            if ship.scan.hit {
                ship.heading = ship.scan.bearing;
            }
        }
        ShipAction::Signal { value } => {
            world.signals.push(Signal { ship, value });
            out_events.push(Event::SignalBroadcast { ship, value });
        }
        ShipAction::Wait => {}
    }
}

fn thrust(world: &mut World, index: usize, power: f32) {
    let config = &world.config;
    let ship = &mut world.ships[index];
    if power.is_nan() || power <= 0.0 || ship.fuel <= 0.0 {
        return;
    }

    let cost = power * config.fuel_per_power;
    let power = if cost > ship.fuel {
        ship.fuel / config.fuel_per_power
    } else {
        power
    };
    ship.fuel = (ship.fuel - power * config.fuel_per_power).max(0.0);
    ship.velocity += heading_vector(ship.heading) * power * config.thrust_accel;
    ship.velocity = ship.velocity.clamp_length_max(config.max_ship_speed);
}

fn fire_phaser(world: &mut World, index: usize, out_events: &mut Vec<Event>) {
    let config = &world.config;
    let shooter = &world.ships[index];
    if shooter.phaser_cooldown > 0 {
        return;
    }

    let origin = shooter.position;
    let reach = origin + heading_vector(shooter.heading) * config.phaser_range;
    let mut earliest = None;

    for other in world
        .ships
        .iter()
        .filter(|other| other.alive && other.id != shooter.id)
    {
        let center = origin + shortest_delta(origin, other.position, config.width, config.height);
        let hull = other
            .turn_start_hull(config)
            .translated(center - other.position);
        if let Some(along) = hull.sweep(origin, reach, 0.0) {
            keep_earliest(&mut earliest, along, Target::Ship(other.id));
        }
    }
    for asteroid in world.field.asteroids().iter().filter(|asteroid| asteroid.alive) {
        let center =
            origin + shortest_delta(origin, asteroid.position, config.width, config.height);
        if let Some(along) = sweep_polygon(origin, reach, &asteroid.outline_at(center), 0.0) {
            keep_earliest(&mut earliest, along, Target::Asteroid(asteroid.id));
        }
    }

    let end = earliest.map_or(reach, |(along, _)| origin.lerp(reach, along));
    let hit = earliest.map(|(_, target)| target);
    let (owner, color) = (shooter.id, shooter.color);

    world.beams.push(PhaserBeam {
        owner,
        start: origin,
        end,
        color,
        alive: true,
    });
    if let Some(target) = hit {
        world.pending_hits.push(PendingHit {
            target,
            damage: config.phaser_damage,
        });
    }
    world.ships[index].phaser_cooldown = config.phaser_cooldown;
    out_events.push(Event::PhaserFired { ship: owner, hit });
}

fn fire_photon(world: &mut World, index: usize, out_events: &mut Vec<Event>) {
    let config = &world.config;
    let ship = &mut world.ships[index];
    if ship.photon_cooldown > 0 {
        return;
    }

    let direction = heading_vector(ship.heading);
    let offset =
        config.hull_half_length + config.hull_radius + config.photon_radius + LAUNCH_CLEARANCE;
    let muzzle = ship.position + direction * offset;
    let torpedo = TorpedoId::new(world.next_torpedo_id);
    world.next_torpedo_id = world.next_torpedo_id.wrapping_add(1);

    world.torpedoes.push(Torpedo {
        id: torpedo,
        owner: ship.id,
        position: muzzle,
        previous: muzzle,
        velocity: ship.velocity + direction * config.photon_speed,
        fuse: config.photon_lifetime,
        phase: 0,
        alive: true,
    });
    ship.photon_cooldown = config.photon_cooldown;
    out_events.push(Event::TorpedoLaunched {
        ship: ship.id,
        torpedo,
    });
}

fn scan(world: &mut World, index: usize, out_events: &mut Vec<Event>) {
    let config = &world.config;
    let observer: &Ship = &world.ships[index];
    let half_fov = config.scan_fov_degrees * 0.5;

    let ships = world
        .ships
        .iter()
        .filter(|other| other.alive && other.id != observer.id)
        .map(|other| other.position);
    let asteroids = world
        .field
        .asteroids()
        .iter()
        .filter(|asteroid| asteroid.alive)
        .map(|asteroid| asteroid.position);

    let mut nearest: Option<(f32, f32)> = None;
    for position in ships.chain(asteroids) {
        let offset: Vec2 = shortest_delta(observer.position, position, config.width, config.height);
        let distance = offset.length();
        if distance > config.scan_range {
            continue;
        }
        let bearing = if distance > 0.0 {
            bearing_of(offset)
        } else {
            observer.heading
        };
        if angle_difference(observer.heading, bearing).abs() > half_fov {
            continue;
        }
        if nearest.map_or(true, |(closest, _)| distance < closest) {
            nearest = Some((distance, bearing));
        }
    }

    let reading = nearest.map_or_else(ScanReading::default, |(distance, bearing)| ScanReading {
        hit: true,
        distance: distance.round() as i32,
        bearing,
    });
    let ship = observer.id;
    world.ships[index].scan = reading;
    out_events.push(Event::ScanCompleted { ship, reading });
}

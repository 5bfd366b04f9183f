#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state for AstroBots.
//!
//! The world owns every ship, asteroid, torpedo and cosmetic effect. All
//! mutation flows through [`apply`]; read access goes through [`query`].

mod asteroids;
mod effects;
mod entities;
mod geometry;
mod physics;
mod verbs;

use astrobots_core::{
    ArenaConfig, Color, Command, Event, ShipAction, ShipId, ShipPort, ShipStatus,
};
use glam::Vec2;
use tracing::{debug, warn};

use asteroids::AsteroidField;
use effects::Effects;
use entities::{PendingHit, Ship};
use geometry::wrap_position;

pub use entities::{Asteroid, DebrisSegment, Particle, PhaserBeam, Signal, Torpedo};

/// Represents the state of the arena.
#[derive(Debug)]
pub struct World {
    config: ArenaConfig,
    turn: u32,
    ships: Vec<Ship>,
    field: AsteroidField,
    torpedoes: Vec<Torpedo>,
    next_torpedo_id: u32,
    beams: Vec<PhaserBeam>,
    pending_hits: Vec<PendingHit>,
    signals: Vec<Signal>,
    effects: Effects,
}

impl World {
    /// Creates an empty arena governed by the provided configuration.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            field: AsteroidField::new(&config),
            effects: Effects::new(config.seed),
            config,
            turn: 0,
            ships: Vec::new(),
            torpedoes: Vec::new(),
            next_torpedo_id: 0,
            beams: Vec::new(),
            pending_hits: Vec::new(),
            signals: Vec::new(),
        }
    }

    fn ship_index(&self, ship: ShipId) -> Option<usize> {
        self.ships
            .binary_search_by_key(&ship, |candidate| candidate.id)
            .ok()
    }

    fn spawn_ship(
        &mut self,
        id: ShipId,
        name: String,
        position: Vec2,
        heading: f32,
        color: Color,
        out_events: &mut Vec<Event>,
    ) {
        let index = match self.ships.binary_search_by_key(&id, |ship| ship.id) {
            Ok(_) => {
                warn!(ship = id.get(), "ignoring duplicate ship spawn");
                return;
            }
            Err(index) => index,
        };

        let position = wrap_position(position, self.config.width, self.config.height);
        let heading = geometry::normalize_degrees(heading);
        debug!(ship = id.get(), %name, x = position.x, y = position.y, "ship spawned");
        self.ships.insert(
            index,
            Ship {
                id,
                name,
                position,
                velocity: Vec2::ZERO,
                heading,
                turn_start_heading: heading,
                hp: self.config.ship_hp,
                fuel: self.config.ship_fuel,
                phaser_cooldown: 0,
                photon_cooldown: 0,
                scan: Default::default(),
                color,
                alive: true,
            },
        );
        out_events.push(Event::ShipSpawned { ship: id, position });
    }

    fn start_turn(&mut self, turn: u32, out_events: &mut Vec<Event>) {
        self.turn = turn;
        self.beams.clear();
        self.signals.clear();
        self.pending_hits.clear();
        for ship in self.ships.iter_mut().filter(|ship| ship.alive) {
            ship.phaser_cooldown = ship.phaser_cooldown.saturating_sub(1);
            ship.photon_cooldown = ship.photon_cooldown.saturating_sub(1);
            ship.turn_start_heading = ship.heading;
        }
        out_events.push(Event::TurnStarted { turn });
    }

    fn finish_turn(&mut self, out_events: &mut Vec<Event>) {
        self.torpedoes.retain(|torpedo| torpedo.alive);
        self.beams.retain(|beam| beam.alive);
        self.field.purge();
        self.effects.purge();
        self.field.replenish(&self.config, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnShip {
            ship,
            name,
            position,
            heading,
            color,
        } => world.spawn_ship(ship, name, position, heading, color, out_events),
        Command::SeedAsteroids { count } => {
            let ships: Vec<Vec2> = world
                .ships
                .iter()
                .filter(|ship| ship.alive)
                .map(|ship| ship.position)
                .collect();
            world.field.scatter(count, &ships, &world.config, out_events);
        }
        Command::StartTurn { turn } => world.start_turn(turn, out_events),
        Command::Act { ship, action } => verbs::act(world, ship, action, out_events),
        Command::AdvancePhysics => physics::advance(world, out_events),
        Command::ResolveCollisions => physics::resolve_collisions(world, out_events),
        Command::FinishTurn => world.finish_turn(out_events),
    }
}

/// Drives a single ship of the world on behalf of its program.
///
/// Every action is applied immediately through [`apply`], so a later
/// instruction in the same program observes the effects of earlier ones.
/// Other ships are only seen as they stood when the turn started.
#[derive(Debug)]
pub struct WorldShipPort<'a> {
    world: &'a mut World,
    ship: ShipId,
    out_events: &'a mut Vec<Event>,
}

/// Creates a [`ShipPort`] bound to the provided ship.
pub fn ship_port<'a>(
    world: &'a mut World,
    ship: ShipId,
    out_events: &'a mut Vec<Event>,
) -> WorldShipPort<'a> {
    WorldShipPort {
        world,
        ship,
        out_events,
    }
}

impl ShipPort for WorldShipPort<'_> {
    fn status(&self) -> ShipStatus {
        query::ship_status(self.world, self.ship)
    }

    fn act(&mut self, action: ShipAction) {
        apply(
            self.world,
            Command::Act {
                ship: self.ship,
                action,
            },
            self.out_events,
        );
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use astrobots_core::{ArenaConfig, ShipId, ShipStatus, ShipView};

    use super::{Asteroid, DebrisSegment, Particle, PhaserBeam, Signal, Torpedo, World};

    /// Configuration the arena was created with.
    #[must_use]
    pub fn config(world: &World) -> &ArenaConfig {
        &world.config
    }

    /// Index of the most recently started turn, zero before the first one.
    #[must_use]
    pub fn turn(world: &World) -> u32 {
        world.turn
    }

    /// Captures a read-only view of every ship, destroyed ones included.
    #[must_use]
    pub fn ship_view(world: &World) -> ShipView {
        ShipView::from_snapshots(world.ships.iter().map(|ship| ship.snapshot()).collect())
    }

    /// Status of a ship as its program observes it.
    ///
    /// Unknown and destroyed ships report [`ShipStatus::INACTIVE`].
    #[must_use]
    pub fn ship_status(world: &World, ship: ShipId) -> ShipStatus {
        world
            .ship_index(ship)
            .map_or(ShipStatus::INACTIVE, |index| {
                world.ships[index].status(world.config.ship_hp)
            })
    }

    /// Identifiers of the ships still in play, in ascending order.
    #[must_use]
    pub fn living_ships(world: &World) -> Vec<ShipId> {
        world
            .ships
            .iter()
            .filter(|ship| ship.alive)
            .map(|ship| ship.id)
            .collect()
    }

    /// Asteroids currently tracked by the arena.
    #[must_use]
    pub fn asteroids(world: &World) -> &[Asteroid] {
        world.field.asteroids()
    }

    /// Number of asteroids still in play.
    #[must_use]
    pub fn asteroid_count(world: &World) -> usize {
        world.field.living_count()
    }

    /// Torpedoes currently tracked by the arena.
    #[must_use]
    pub fn torpedoes(world: &World) -> &[Torpedo] {
        &world.torpedoes
    }

    /// Phaser beams fired during the current turn.
    #[must_use]
    pub fn beams(world: &World) -> &[PhaserBeam] {
        &world.beams
    }

    /// Cosmetic sparks.
    #[must_use]
    pub fn particles(world: &World) -> &[Particle] {
        world.effects.particles()
    }

    /// Cosmetic hull fragments.
    #[must_use]
    pub fn debris(world: &World) -> &[DebrisSegment] {
        world.effects.debris()
    }

    /// Signals broadcast during the current turn.
    #[must_use]
    pub fn signals(world: &World) -> &[Signal] {
        &world.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astrobots_core::{ScanReading, Target};

    fn quiet_config() -> ArenaConfig {
        ArenaConfig {
            width: 1000.0,
            height: 800.0,
            asteroid_target: 0,
            ..ArenaConfig::default()
        }
    }

    fn spawn(world: &mut World, id: u32, position: Vec2, heading: f32) -> ShipId {
        let ship = ShipId::new(id);
        apply(
            world,
            Command::SpawnShip {
                ship,
                name: format!("ship-{id}"),
                position,
                heading,
                color: Color::from_rgb(200, 200, 200),
            },
            &mut Vec::new(),
        );
        ship
    }

    fn act(world: &mut World, ship: ShipId, action: ShipAction) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Act { ship, action }, &mut events);
        events
    }

    fn snapshot(world: &World, ship: ShipId) -> astrobots_core::ShipSnapshot {
        query::ship_view(world)
            .get(ship)
            .cloned()
            .expect("ship exists")
    }

    #[test]
    fn spawned_ships_are_sorted_and_wrapped() {
        let mut world = World::new(quiet_config());
        let _ = spawn(&mut world, 2, Vec2::new(1010.0, -5.0), -90.0);
        let _ = spawn(&mut world, 1, Vec2::new(10.0, 10.0), 0.0);

        let view = query::ship_view(&world);
        let ids: Vec<u32> = view.iter().map(|ship| ship.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);

        let second = view.get(ShipId::new(2)).expect("second ship");
        assert!((second.position - Vec2::new(10.0, 795.0)).length() < 1.0e-3);
        assert_eq!(second.heading, 270.0);
        assert_eq!(second.hp, world.config.ship_hp);
    }

    #[test]
    fn duplicate_spawn_is_ignored() {
        let mut world = World::new(quiet_config());
        let ship = spawn(&mut world, 1, Vec2::new(10.0, 10.0), 0.0);
        let _ = spawn(&mut world, 1, Vec2::new(500.0, 500.0), 0.0);

        assert_eq!(query::ship_view(&world).iter().count(), 1);
        assert_eq!(snapshot(&world, ship).position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn thrust_scales_power_to_remaining_fuel() {
        let mut world = World::new(ArenaConfig {
            ship_fuel: 1.0,
            ..quiet_config()
        });
        let ship = spawn(&mut world, 1, Vec2::new(100.0, 100.0), 0.0);

        let _ = act(&mut world, ship, ShipAction::Thrust { power: 5.0 });

        let state = snapshot(&world, ship);
        assert_eq!(state.fuel, 0.0);
        let expected = world.config.thrust_accel;
        assert!((state.velocity - Vec2::new(expected, 0.0)).length() < 1.0e-5);
    }

    #[test]
    fn thrust_without_fuel_or_power_is_ignored() {
        let mut world = World::new(ArenaConfig {
            ship_fuel: 0.0,
            ..quiet_config()
        });
        let ship = spawn(&mut world, 1, Vec2::new(100.0, 100.0), 0.0);

        let _ = act(&mut world, ship, ShipAction::Thrust { power: 2.0 });
        let _ = act(&mut world, ship, ShipAction::Thrust { power: -3.0 });

        let state = snapshot(&world, ship);
        assert_eq!(state.fuel, 0.0);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn speed_is_clamped() {
        let mut world = World::new(quiet_config());
        let ship = spawn(&mut world, 1, Vec2::new(100.0, 100.0), 0.0);

        for _ in 0..10 {
            let _ = act(&mut world, ship, ShipAction::Thrust { power: 9.0 });
        }

        let state = snapshot(&world, ship);
        assert!(state.velocity.length() <= world.config.max_ship_speed + 1.0e-4);
    }

    #[test]
    fn turning_normalises_heading() {
        let mut world = World::new(quiet_config());
        let ship = spawn(&mut world, 1, Vec2::new(100.0, 100.0), 10.0);

        let _ = act(&mut world, ship, ShipAction::TurnDegrees { degrees: -30 });
        assert_eq!(snapshot(&world, ship).heading, 340.0);

        let _ = act(&mut world, ship, ShipAction::TurnDegrees { degrees: 740 });
        assert_eq!(snapshot(&world, ship).heading, 0.0);
    }

    #[test]
    fn phaser_damage_waits_for_collision_resolution() {
        let mut world = World::new(quiet_config());
        let shooter = spawn(&mut world, 1, Vec2::new(100.0, 400.0), 0.0);
        let target = spawn(&mut world, 2, Vec2::new(300.0, 400.0), 90.0);

        let events = act(&mut world, shooter, ShipAction::FirePhaser);
        assert_eq!(
            events,
            vec![Event::PhaserFired {
                ship: shooter,
                hit: Some(Target::Ship(target)),
            }]
        );
        assert_eq!(snapshot(&world, target).hp, world.config.ship_hp);
        assert_eq!(query::beams(&world).len(), 1);
        let beam_end = query::beams(&world)[0].end;
        let surface = 300.0 - world.config.hull_radius;
        assert!((beam_end.x - surface).abs() < 1.0e-2, "beam stops at the hull");

        let mut events = Vec::new();
        apply(&mut world, Command::ResolveCollisions, &mut events);
        let expected_hp = world.config.ship_hp - world.config.phaser_damage;
        assert_eq!(snapshot(&world, target).hp, expected_hp);
        assert!(events.contains(&Event::ShipDamaged {
            ship: target,
            damage: world.config.phaser_damage,
            hp: expected_hp,
        }));
    }

    #[test]
    fn phaser_aims_at_the_hull_from_turn_start() {
        let mut world = World::new(quiet_config());
        let dodger = spawn(&mut world, 1, Vec2::new(300.0, 400.0), 0.0);
        let gunner = spawn(&mut world, 2, Vec2::new(310.0, 100.0), 90.0);
        apply(&mut world, Command::StartTurn { turn: 1 }, &mut Vec::new());

        let _ = act(&mut world, dodger, ShipAction::TurnDegrees { degrees: 90 });
        let events = act(&mut world, gunner, ShipAction::FirePhaser);
        assert_eq!(
            events,
            vec![Event::PhaserFired {
                ship: gunner,
                hit: Some(Target::Ship(dodger)),
            }]
        );

        apply(&mut world, Command::StartTurn { turn: 2 }, &mut Vec::new());
        assert_eq!(snapshot(&world, dodger).heading, 90.0);
        for turn in 3..=world.config.phaser_cooldown + 1 {
            apply(&mut world, Command::StartTurn { turn }, &mut Vec::new());
        }
        let events = act(&mut world, gunner, ShipAction::FirePhaser);
        assert_eq!(
            events,
            vec![Event::PhaserFired {
                ship: gunner,
                hit: None,
            }]
        );
    }

    #[test]
    fn phaser_respects_cooldown() {
        let mut world = World::new(quiet_config());
        let shooter = spawn(&mut world, 1, Vec2::new(100.0, 400.0), 0.0);

        assert_eq!(act(&mut world, shooter, ShipAction::FirePhaser).len(), 1);
        assert!(act(&mut world, shooter, ShipAction::FirePhaser).is_empty());

        for turn in 1..=world.config.phaser_cooldown {
            apply(&mut world, Command::StartTurn { turn }, &mut Vec::new());
        }
        assert_eq!(snapshot(&world, shooter).phaser_cooldown, 0);
        assert_eq!(act(&mut world, shooter, ShipAction::FirePhaser).len(), 1);
    }

    #[test]
    fn scan_sees_across_the_seam() {
        let mut world = World::new(quiet_config());
        let observer = spawn(&mut world, 1, Vec2::new(980.0, 400.0), 0.0);
        let _ = spawn(&mut world, 2, Vec2::new(80.0, 400.0), 0.0);

        let _ = act(&mut world, observer, ShipAction::Scan);
        let scan = snapshot(&world, observer).scan;
        assert!(scan.hit);
        assert_eq!(scan.distance, 100);
        assert!(scan.bearing.abs() < 1.0e-3);
    }

    #[test]
    fn scan_outside_field_of_view_clears_hit() {
        let mut world = World::new(quiet_config());
        let observer = spawn(&mut world, 1, Vec2::new(500.0, 400.0), 0.0);
        let _ = spawn(&mut world, 2, Vec2::new(600.0, 400.0), 0.0);

        let _ = act(&mut world, observer, ShipAction::Scan);
        assert!(snapshot(&world, observer).scan.hit);

        let _ = act(&mut world, observer, ShipAction::TurnDegrees { degrees: 180 });
        let _ = act(&mut world, observer, ShipAction::Scan);
        assert_eq!(snapshot(&world, observer).scan, ScanReading::default());
    }

    #[test]
    fn turn_to_scan_faces_the_detection() {
        let mut world = World::new(quiet_config());
        let observer = spawn(&mut world, 1, Vec2::new(500.0, 400.0), 30.0);
        let _ = spawn(&mut world, 2, Vec2::new(600.0, 500.0), 0.0);

        let _ = act(&mut world, observer, ShipAction::Scan);
        let _ = act(&mut world, observer, ShipAction::TurnToScan);
        assert!((snapshot(&world, observer).heading - 45.0).abs() < 1.0e-3);
    }

    #[test]
    fn swept_torpedo_hits_between_samples() {
        let mut world = World::new(ArenaConfig {
            photon_speed: 40.0,
            ..quiet_config()
        });
        let shooter = spawn(&mut world, 1, Vec2::new(300.0, 500.0), 0.0);
        let target = spawn(&mut world, 2, Vec2::new(500.0, 500.0), 90.0);

        world.torpedoes.push(Torpedo {
            id: astrobots_core::TorpedoId::new(9),
            owner: shooter,
            position: Vec2::new(480.0, 500.0),
            previous: Vec2::new(480.0, 500.0),
            velocity: Vec2::new(40.0, 0.0),
            fuse: 10,
            phase: 0,
            alive: true,
        });

        apply(&mut world, Command::AdvancePhysics, &mut Vec::new());
        let torpedo = query::torpedoes(&world)[0];
        assert_eq!(torpedo.position, Vec2::new(520.0, 500.0));

        let mut events = Vec::new();
        apply(&mut world, Command::ResolveCollisions, &mut events);
        assert!(events.contains(&Event::TorpedoDetonated {
            torpedo: torpedo.id,
            target: Target::Ship(target),
        }));
        let expected_hp = world.config.ship_hp - world.config.photon_damage;
        assert_eq!(snapshot(&world, target).hp, expected_hp);

        let mut rerun = Vec::new();
        apply(&mut world, Command::ResolveCollisions, &mut rerun);
        assert!(rerun.is_empty(), "a consumed torpedo never strikes twice");
        assert_eq!(snapshot(&world, target).hp, expected_hp);
    }

    #[test]
    fn torpedo_expires_when_fuse_runs_out() {
        let mut world = World::new(ArenaConfig {
            photon_lifetime: 2,
            ..quiet_config()
        });
        let shooter = spawn(&mut world, 1, Vec2::new(100.0, 100.0), 0.0);
        let _ = act(&mut world, shooter, ShipAction::FirePhoton);

        let mut events = Vec::new();
        for _ in 0..3 {
            apply(&mut world, Command::AdvancePhysics, &mut events);
            apply(&mut world, Command::ResolveCollisions, &mut events);
        }
        assert!(matches!(events.last(), Some(Event::TorpedoExpired { .. })));

        apply(&mut world, Command::FinishTurn, &mut Vec::new());
        assert!(query::torpedoes(&world).is_empty());
    }

    #[test]
    fn destroyed_ships_ignore_verbs_and_physics() {
        let mut world = World::new(ArenaConfig {
            ship_hp: 1,
            ..quiet_config()
        });
        let shooter = spawn(&mut world, 1, Vec2::new(100.0, 400.0), 0.0);
        let target = spawn(&mut world, 2, Vec2::new(300.0, 400.0), 90.0);

        let _ = act(&mut world, shooter, ShipAction::FirePhaser);
        let mut events = Vec::new();
        apply(&mut world, Command::ResolveCollisions, &mut events);
        assert!(events.contains(&Event::ShipDestroyed { ship: target }));

        let before = snapshot(&world, target);
        assert!(!before.alive);
        assert_eq!(before.hp, 0);
        assert_eq!(query::ship_status(&world, target), ShipStatus::INACTIVE);

        for action in [
            ShipAction::Thrust { power: 3.0 },
            ShipAction::TurnDegrees { degrees: 45 },
            ShipAction::FirePhoton,
            ShipAction::Scan,
        ] {
            assert!(act(&mut world, target, action).is_empty());
        }
        apply(&mut world, Command::StartTurn { turn: 1 }, &mut Vec::new());
        apply(&mut world, Command::AdvancePhysics, &mut Vec::new());
        assert_eq!(snapshot(&world, target), before);
        assert_eq!(query::living_ships(&world), vec![shooter]);
        assert!(!query::debris(&world).is_empty());
    }

    #[test]
    fn signals_last_for_one_turn() {
        let mut world = World::new(quiet_config());
        let ship = spawn(&mut world, 1, Vec2::new(100.0, 100.0), 0.0);

        let events = act(&mut world, ship, ShipAction::Signal { value: 7 });
        assert_eq!(events, vec![Event::SignalBroadcast { ship, value: 7 }]);
        assert_eq!(query::signals(&world), &[Signal { ship, value: 7 }]);

        apply(&mut world, Command::StartTurn { turn: 1 }, &mut Vec::new());
        assert!(query::signals(&world).is_empty());
    }

    #[test]
    fn finish_turn_refills_asteroids_from_the_edge() {
        let mut world = World::new(ArenaConfig {
            asteroid_target: 2,
            edge_spawn_cooldown: 1,
            ..quiet_config()
        });

        let mut events = Vec::new();
        apply(&mut world, Command::FinishTurn, &mut events);
        assert_eq!(query::asteroid_count(&world), 1);
        apply(&mut world, Command::FinishTurn, &mut events);
        apply(&mut world, Command::FinishTurn, &mut events);
        assert_eq!(query::asteroid_count(&world), 2);
        assert_eq!(events.len(), 2);
    }
}

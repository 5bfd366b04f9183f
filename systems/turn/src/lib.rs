#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn orchestration for an AstroBots match.
//!
//! A [`Match`] compiles every ship's program once, places the ships, and then
//! drives the arena one turn at a time: cooldowns tick, each living ship's
//! program runs in id order, motion is integrated, collisions resolve, and the
//! arena is tidied before termination is checked.

mod formation;
mod log;

use std::fmt::Write as _;

use astrobots_core::{ArenaConfig, Command, ConfigError, Event, Program, ShipId};
use astrobots_system_program_builder::ProgramSupplier;
use astrobots_system_vm::Vm;
use astrobots_world::{self as world, query, World};
use glam::Vec2;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use formation::{circle_formation, color_for, Placement, PALETTE};
pub use log::{LogBuffer, LogSink, LOG_CAPACITY};

/// Reasons a match cannot be set up.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MatchError {
    /// The arena configuration was rejected.
    #[error("invalid arena configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// No ship programs were supplied.
    #[error("a match needs at least one ship")]
    NoShips,
    /// The explicit formation does not cover every ship.
    #[error("{ships} ship(s) supplied but {placements} placement(s)")]
    FormationMismatch {
        /// Number of suppliers.
        ships: usize,
        /// Number of placements.
        placements: usize,
    },
}

/// Final result of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Exactly one ship survived.
    Win(ShipId),
    /// Zero or several ships survived.
    Draw,
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    /// Programs are being compiled and ships placed.
    Setup,
    /// Turns are being played.
    Running,
    /// The match has ended.
    Finished(Outcome),
}

#[derive(Debug)]
struct Contestant {
    id: ShipId,
    name: String,
    program: Program,
}

/// A single AstroBots match.
#[derive(Debug)]
pub struct Match<S> {
    world: World,
    vm: Vm,
    contestants: Vec<Contestant>,
    phase: MatchPhase,
    turn: u32,
    camera: Vec2,
    events: Vec<Event>,
    sink: S,
}

impl<S> Match<S>
where
    S: LogSink,
{
    /// Sets up a match with ships spread on the spawn circle.
    pub fn new(
        config: ArenaConfig,
        suppliers: &[Box<dyn ProgramSupplier>],
        sink: S,
    ) -> Result<Self, MatchError> {
        let formation = circle_formation(&config, suppliers.len());
        Self::with_formation(config, suppliers, formation, sink)
    }

    /// Sets up a match with explicit starting placements, one per supplier.
    pub fn with_formation(
        config: ArenaConfig,
        suppliers: &[Box<dyn ProgramSupplier>],
        formation: Vec<Placement>,
        sink: S,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        if suppliers.is_empty() {
            return Err(MatchError::NoShips);
        }
        if formation.len() != suppliers.len() {
            return Err(MatchError::FormationMismatch {
                ships: suppliers.len(),
                placements: formation.len(),
            });
        }

        let asteroid_target = config.asteroid_target;
        let budget = config.script_budget;
        let camera = config.center();
        let mut game = Self {
            world: World::new(config),
            vm: Vm::new(),
            contestants: Vec::with_capacity(suppliers.len()),
            phase: MatchPhase::Setup,
            turn: 0,
            camera,
            events: Vec::new(),
            sink,
        };

        for (index, (supplier, placement)) in suppliers.iter().zip(formation).enumerate() {
            let id = ShipId::new(u32::try_from(index).unwrap_or(u32::MAX));
            let name = supplier.name().to_owned();
            let program = game.compile(supplier.as_ref(), budget);

            world::apply(
                &mut game.world,
                Command::SpawnShip {
                    ship: id,
                    name: name.clone(),
                    position: placement.position,
                    heading: placement.heading,
                    color: color_for(index),
                },
                &mut game.events,
            );
            game.contestants.push(Contestant { id, name, program });
        }

        world::apply(
            &mut game.world,
            Command::SeedAsteroids {
                count: asteroid_target,
            },
            &mut game.events,
        );
        game.update_camera();
        game.phase = MatchPhase::Running;
        info!(ships = game.contestants.len(), "match ready");
        Ok(game)
    }

    fn compile(&mut self, supplier: &dyn ProgramSupplier, budget: u32) -> Program {
        let name = supplier.name();
        match supplier.compile() {
            Ok(compiled) => {
                let mut line = format!("{name} script cost {}/{budget}", compiled.cost());
                if compiled.exceeds(budget) {
                    line.push_str(" (EXCEEDS LIMIT)");
                }
                self.sink.log(&line);
                compiled.into_program()
            }
            Err(error) => {
                warn!(%name, %error, "ship program failed to build");
                self.sink.log(&format!("{name} program rejected: {error}"));
                Program::default()
            }
        }
    }

    /// Advances the turn counter and resets per-turn state.
    ///
    /// Returns `false` when the match is not running or the counter passed
    /// the turn limit, in which case the match finishes.
    pub fn start_turn(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.turn += 1;
        if self.turn > query::config(&self.world).max_turns {
            self.finish();
            return false;
        }

        self.events.clear();
        debug!(turn = self.turn, "turn started");
        world::apply(
            &mut self.world,
            Command::StartTurn { turn: self.turn },
            &mut self.events,
        );
        true
    }

    /// Runs the program of every living ship once, in ascending id order.
    pub fn run_ships(&mut self) {
        if !self.is_running() {
            return;
        }
        let Self {
            world,
            vm,
            contestants,
            events,
            sink,
            turn,
            ..
        } = self;

        for contestant in contestants.iter() {
            if !query::ship_status(world, contestant.id).alive {
                continue;
            }
            let mut port = world::ship_port(world, contestant.id, events);
            if let Err(error) = vm.run(&contestant.program, &mut port) {
                warn!(ship = contestant.id.get(), turn = *turn, %error, "ship program aborted");
                sink.log(&format!(
                    "{} program aborted on turn {turn}: {error}",
                    contestant.name
                ));
            }
        }
    }

    /// Integrates motion of every living entity.
    pub fn advance_physics(&mut self) {
        if self.is_running() {
            world::apply(&mut self.world, Command::AdvancePhysics, &mut self.events);
        }
    }

    /// Resolves contact damage, weapon hits and destruction.
    pub fn resolve_collisions(&mut self) {
        if !self.is_running() {
            return;
        }
        let from = self.events.len();
        world::apply(&mut self.world, Command::ResolveCollisions, &mut self.events);

        let destroyed: Vec<ShipId> = self.events[from..]
            .iter()
            .filter_map(|event| match event {
                Event::ShipDestroyed { ship } => Some(*ship),
                _ => None,
            })
            .collect();
        for ship in destroyed {
            let line = format!("{} destroyed on turn {}", self.name_of(ship), self.turn);
            self.sink.log(&line);
        }
    }

    /// Purges dead entities, maintains the asteroid population, refreshes
    /// the camera focus and checks whether the match has ended.
    pub fn finish_turn(&mut self) {
        if !self.is_running() {
            return;
        }
        world::apply(&mut self.world, Command::FinishTurn, &mut self.events);
        self.update_camera();

        let alive = query::living_ships(&self.world).len();
        if alive <= 1 || self.turn >= query::config(&self.world).max_turns {
            self.finish();
        }
    }

    /// Plays one full turn. Does nothing once the match has finished.
    pub fn step(&mut self) {
        if !self.start_turn() {
            return;
        }
        self.run_ships();
        self.advance_physics();
        self.resolve_collisions();
        self.finish_turn();
    }

    /// Plays turns until the match finishes and reports the outcome.
    pub fn run_to_completion(&mut self) -> Outcome {
        loop {
            if let MatchPhase::Finished(outcome) = self.phase {
                return outcome;
            }
            self.step();
        }
    }

    fn finish(&mut self) {
        let survivors = query::living_ships(&self.world);
        let outcome = match survivors.as_slice() {
            [winner] => Outcome::Win(*winner),
            _ => Outcome::Draw,
        };
        let turn = self.turn.min(query::config(&self.world).max_turns);
        let line = match outcome {
            Outcome::Win(ship) => format!("{} wins on turn {turn}", self.name_of(ship)),
            Outcome::Draw => format!("draw after {turn} turns"),
        };
        info!(turn, ?outcome, "match finished");
        self.sink.log(&line);
        self.phase = MatchPhase::Finished(outcome);
    }

    fn update_camera(&mut self) {
        let view = query::ship_view(&self.world);
        let (sum, count) = view
            .alive()
            .fold((Vec2::ZERO, 0u32), |(sum, count), ship| {
                (sum + ship.position, count + 1)
            });
        if count > 0 {
            self.camera = sum / count as f32;
        }
    }

    fn name_of(&self, ship: ShipId) -> &str {
        self.contestants
            .iter()
            .find(|contestant| contestant.id == ship)
            .map_or("unknown", |contestant| contestant.name.as_str())
    }
}

impl<S> Match<S> {
    fn is_running(&self) -> bool {
        self.phase == MatchPhase::Running
    }

    /// Reports whether the match has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Finished(_))
    }

    /// Outcome of a finished match.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            MatchPhase::Finished(outcome) => Some(outcome),
            MatchPhase::Setup | MatchPhase::Running => None,
        }
    }

    /// The sole surviving ship of a finished match.
    #[must_use]
    pub fn winner(&self) -> Option<ShipId> {
        match self.outcome() {
            Some(Outcome::Win(ship)) => Some(ship),
            _ => None,
        }
    }

    /// Reports whether the match finished without a single survivor.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.outcome() == Some(Outcome::Draw)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Number of the most recently started turn, zero before the first.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Read-only access to the arena.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mean position of the living ships, used to centre a view.
    #[must_use]
    pub const fn camera_focus(&self) -> Vec2 {
        self.camera
    }

    /// Events emitted since the current turn started.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Names of the ships in id order.
    pub fn ship_names(&self) -> impl Iterator<Item = (ShipId, &str)> {
        self.contestants
            .iter()
            .map(|contestant| (contestant.id, contestant.name.as_str()))
    }

    /// Log sink the match writes to.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Serialises the turn and every ship's kinematic state.
    ///
    /// The format is `turn;x,y,vx,vy,angle,hp,fuel,alive;...` with one
    /// group per ship in id order and `alive` written as `1` or `0`.
    #[must_use]
    pub fn state_string(&self) -> String {
        let mut state = format!("{};", self.turn);
        for ship in query::ship_view(&self.world).iter() {
            let _ = write!(
                state,
                "{},{},{},{},{},{},{},{};",
                ship.position.x,
                ship.position.y,
                ship.velocity.x,
                ship.velocity.y,
                ship.heading,
                ship.hp,
                ship.fuel,
                u8::from(ship.alive),
            );
        }
        state
    }
}

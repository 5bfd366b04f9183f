#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the AstroBots engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative arena world, and pure systems. The turn orchestrator submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what happened. Ship programs never touch the world directly:
//! the virtual machine drives a ship exclusively through the [`ShipPort`]
//! seam, issuing [`ShipAction`] verbs and reading back a [`ShipStatus`].

mod config;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{ArenaConfig, ConfigError};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "AstroBots arena online.";

/// Divisor applied to the inline thrust operand to recover the power multiplier.
pub const THRUST_POWER_SCALE: f32 = 10.0;

/// Unique identifier assigned to a ship. Ship identifiers double as the
/// fixed execution order of ship programs within a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(u32);

impl ShipId {
    /// Creates a new ship identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an asteroid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AsteroidId(u32);

impl AsteroidId {
    /// Creates a new asteroid identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a photon torpedo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TorpedoId(u32);

impl TorpedoId {
    /// Creates a new torpedo identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Instruction kinds understood by the ship virtual machine.
///
/// Every opcode has a fixed arity: the number of inline operand words that
/// immediately follow it in the instruction stream. Numeric codes are stable
/// and must never be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Does nothing for one instruction.
    Wait,
    /// Applies forward thrust; operand is power multiplied by [`THRUST_POWER_SCALE`].
    Thrust,
    /// Rotates the heading by the signed operand in degrees.
    TurnDeg,
    /// Fires the phaser along the current heading.
    FirePhaser,
    /// Launches a photon torpedo along the current heading.
    FirePhoton,
    /// Performs a directional scan along the current heading.
    Scan,
    /// Broadcasts the operand as a signal for the current turn.
    Signal,
    /// Rotates the heading to face the last scan hit.
    TurnToScan,
    /// Sets the condition flag when the last scan hit something.
    IfSeen,
    /// Sets the condition flag when the last scan hit within the operand range.
    IfScanLe,
    /// Sets the condition flag when the ship has lost any hit points.
    IfDamaged,
    /// Sets the condition flag when hit points are at most the operand.
    IfHpLe,
    /// Sets the condition flag when fuel is at most the operand.
    IfFuelLe,
    /// Sets the condition flag when the phaser is off cooldown.
    IfCanFirePhaser,
    /// Sets the condition flag when the photon launcher is off cooldown.
    IfCanFirePhoton,
    /// Jumps to the operand target when the condition flag is false.
    JumpIfFalse,
    /// Jumps to the operand target unconditionally.
    Jump,
    /// Terminates execution for the current turn.
    End,
}

impl Opcode {
    const ALL: [Opcode; 18] = [
        Opcode::Wait,
        Opcode::Thrust,
        Opcode::TurnDeg,
        Opcode::FirePhaser,
        Opcode::FirePhoton,
        Opcode::Scan,
        Opcode::Signal,
        Opcode::TurnToScan,
        Opcode::IfSeen,
        Opcode::IfScanLe,
        Opcode::IfDamaged,
        Opcode::IfHpLe,
        Opcode::IfFuelLe,
        Opcode::IfCanFirePhaser,
        Opcode::IfCanFirePhoton,
        Opcode::JumpIfFalse,
        Opcode::Jump,
        Opcode::End,
    ];

    /// Numeric word used to encode the opcode in an instruction stream.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Wait => 0,
            Self::Thrust => 1,
            Self::TurnDeg => 2,
            Self::FirePhaser => 3,
            Self::FirePhoton => 4,
            Self::Scan => 5,
            Self::Signal => 6,
            Self::TurnToScan => 7,
            Self::IfSeen => 8,
            Self::IfScanLe => 9,
            Self::IfDamaged => 10,
            Self::IfHpLe => 11,
            Self::IfFuelLe => 12,
            Self::IfCanFirePhaser => 13,
            Self::IfCanFirePhoton => 14,
            Self::JumpIfFalse => 15,
            Self::Jump => 16,
            Self::End => 17,
        }
    }

    /// Decodes a numeric word into an opcode, returning `None` for unknown codes.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Number of inline operand words that follow the opcode.
    ///
    /// Condition opcodes always carry one operand, even when the condition
    /// ignores it, so that every condition occupies the same stream layout.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Thrust
            | Self::TurnDeg
            | Self::Signal
            | Self::IfSeen
            | Self::IfScanLe
            | Self::IfDamaged
            | Self::IfHpLe
            | Self::IfFuelLe
            | Self::IfCanFirePhaser
            | Self::IfCanFirePhoton
            | Self::JumpIfFalse
            | Self::Jump => 1,
            Self::Wait
            | Self::FirePhaser
            | Self::FirePhoton
            | Self::Scan
            | Self::TurnToScan
            | Self::End => 0,
        }
    }

    /// Reports whether the opcode reads ship state into the condition flag.
    #[must_use]
    pub const fn is_condition(self) -> bool {
        matches!(
            self,
            Self::IfSeen
                | Self::IfScanLe
                | Self::IfDamaged
                | Self::IfHpLe
                | Self::IfFuelLe
                | Self::IfCanFirePhaser
                | Self::IfCanFirePhoton
        )
    }

    /// Reports whether the operand of the opcode is a jump target.
    #[must_use]
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::JumpIfFalse | Self::Jump)
    }
}

/// Conditions a program may test before entering a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// The last scan detected something.
    Seen,
    /// The last scan detected something no further away than the range.
    ScanWithin(i32),
    /// The ship has fewer hit points than it started with.
    Damaged,
    /// The ship has at most the given number of hit points.
    HpAtMost(i32),
    /// The ship has at most the given amount of fuel.
    FuelAtMost(i32),
    /// The phaser may fire this turn.
    PhaserReady,
    /// The photon launcher may fire this turn.
    PhotonReady,
}

impl Condition {
    /// Opcode that evaluates the condition.
    #[must_use]
    pub const fn opcode(self) -> Opcode {
        match self {
            Self::Seen => Opcode::IfSeen,
            Self::ScanWithin(_) => Opcode::IfScanLe,
            Self::Damaged => Opcode::IfDamaged,
            Self::HpAtMost(_) => Opcode::IfHpLe,
            Self::FuelAtMost(_) => Opcode::IfFuelLe,
            Self::PhaserReady => Opcode::IfCanFirePhaser,
            Self::PhotonReady => Opcode::IfCanFirePhoton,
        }
    }

    /// Operand word emitted after the condition opcode. Parameterless
    /// conditions emit a zero placeholder.
    #[must_use]
    pub const fn operand(self) -> i32 {
        match self {
            Self::ScanWithin(value) | Self::HpAtMost(value) | Self::FuelAtMost(value) => value,
            Self::Seen | Self::Damaged | Self::PhaserReady | Self::PhotonReady => 0,
        }
    }
}

/// Immutable instruction stream compiled for a single ship.
///
/// The stream is a flat sequence of words: each opcode is followed inline by
/// the number of operands given by [`Opcode::arity`]. Jump operands are word
/// indices into the same stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    words: Vec<i32>,
}

impl Program {
    /// Wraps a pre-encoded word sequence.
    #[must_use]
    pub fn from_words(words: Vec<i32>) -> Self {
        Self { words }
    }

    /// Word at the provided index, if it lies within the stream.
    #[must_use]
    pub fn word(&self, index: usize) -> Option<i32> {
        self.words.get(index).copied()
    }

    /// Raw encoded words of the stream.
    #[must_use]
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// Number of words in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Reports whether the stream contains no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Iterates over `(index, opcode, operands)` triples by walking the stream
    /// with each opcode's arity. Iteration stops at the first unknown opcode or
    /// truncated operand.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, Opcode, &[i32])> + '_ {
        let mut pc = 0usize;
        std::iter::from_fn(move || {
            let opcode = Opcode::from_code(self.word(pc)?)?;
            let start = pc + 1;
            let end = start + opcode.arity();
            let operands = self.words.get(start..end)?;
            let index = pc;
            pc = end;
            Some((index, opcode, operands))
        })
    }
}

/// Verbs a ship program may ask the arena to perform for its ship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShipAction {
    /// Accelerates along the heading with the given power multiplier.
    Thrust {
        /// Power multiplier; non-positive values are ignored.
        power: f32,
    },
    /// Rotates the heading by a signed number of degrees.
    TurnDegrees {
        /// Signed rotation in degrees.
        degrees: i32,
    },
    /// Fires the hit-scan phaser along the heading.
    FirePhaser,
    /// Launches a photon torpedo along the heading.
    FirePhoton,
    /// Scans for the nearest object within the field of view.
    Scan,
    /// Turns to face the last scan hit.
    TurnToScan,
    /// Broadcasts a signal value for the current turn.
    Signal {
        /// Value broadcast to the arena.
        value: i32,
    },
    /// Does nothing.
    Wait,
}

/// Result of the most recent directional scan performed by a ship.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReading {
    /// Whether anything was detected.
    pub hit: bool,
    /// Distance to the nearest detection, rounded to whole world units.
    pub distance: i32,
    /// Absolute bearing of the nearest detection in degrees.
    pub bearing: f32,
}

/// State of a single ship as observed by its own program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipStatus {
    /// Whether the ship is still in play.
    pub alive: bool,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points the ship started the match with.
    pub max_hp: u32,
    /// Remaining fuel.
    pub fuel: f32,
    /// Turns until the phaser may fire again.
    pub phaser_cooldown: u32,
    /// Turns until the photon launcher may fire again.
    pub photon_cooldown: u32,
    /// Most recent scan result.
    pub scan: ScanReading,
}

impl ShipStatus {
    /// Status reported for a ship that does not exist or has been destroyed.
    pub const INACTIVE: Self = Self {
        alive: false,
        hp: 0,
        max_hp: 0,
        fuel: 0.0,
        phaser_cooldown: 0,
        photon_cooldown: 0,
        scan: ScanReading {
            hit: false,
            distance: 0,
            bearing: 0.0,
        },
    };
}

/// Seam between a ship program and the arena that owns the ship.
///
/// Implementations apply every action to the ship immediately so that later
/// instructions in the same program observe its effects.
pub trait ShipPort {
    /// Captures the ship's current status.
    fn status(&self) -> ShipStatus;

    /// Applies the provided action to the ship.
    fn act(&mut self, action: ShipAction);
}

/// Anything a weapon can strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A ship hull.
    Ship(ShipId),
    /// An asteroid.
    Asteroid(AsteroidId),
}

/// RGB colour applied to ships, beams and cosmetic effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places a new ship into the arena.
    SpawnShip {
        /// Identifier the ship will be known by.
        ship: ShipId,
        /// Display name of the ship.
        name: String,
        /// Initial position in world units.
        position: Vec2,
        /// Initial heading in degrees.
        heading: f32,
        /// Appearance of the ship.
        color: Color,
    },
    /// Scatters asteroids across the arena.
    SeedAsteroids {
        /// Number of asteroids to create.
        count: usize,
    },
    /// Resets per-turn transient state and ticks cooldowns.
    StartTurn {
        /// One-based index of the turn that is starting.
        turn: u32,
    },
    /// Applies a ship verb on behalf of a ship program.
    Act {
        /// Ship performing the action.
        ship: ShipId,
        /// Verb to perform.
        action: ShipAction,
    },
    /// Integrates motion for every living entity.
    AdvancePhysics,
    /// Resolves contact, weapon hits and damage.
    ResolveCollisions,
    /// Purges dead entities and maintains the asteroid population.
    FinishTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A ship entered the arena.
    ShipSpawned {
        /// Identifier of the new ship.
        ship: ShipId,
        /// Position the ship was placed at.
        position: Vec2,
    },
    /// An asteroid entered the arena.
    AsteroidSpawned {
        /// Identifier of the new asteroid.
        asteroid: AsteroidId,
        /// Position the asteroid was placed at.
        position: Vec2,
    },
    /// A new turn began.
    TurnStarted {
        /// One-based index of the turn.
        turn: u32,
    },
    /// A ship completed a scan.
    ScanCompleted {
        /// Ship that scanned.
        ship: ShipId,
        /// Reading recorded for the ship.
        reading: ScanReading,
    },
    /// A ship fired its phaser.
    PhaserFired {
        /// Ship that fired.
        ship: ShipId,
        /// First object struck by the beam, if any.
        hit: Option<Target>,
    },
    /// A ship launched a photon torpedo.
    TorpedoLaunched {
        /// Ship that fired.
        ship: ShipId,
        /// Identifier of the new torpedo.
        torpedo: TorpedoId,
    },
    /// A ship broadcast a signal.
    SignalBroadcast {
        /// Ship that broadcast.
        ship: ShipId,
        /// Broadcast value.
        value: i32,
    },
    /// A ship lost hit points.
    ShipDamaged {
        /// Ship that was damaged.
        ship: ShipId,
        /// Hit points removed (after clamping).
        damage: u32,
        /// Hit points remaining.
        hp: u32,
    },
    /// A ship's hit points reached zero.
    ShipDestroyed {
        /// Ship that was destroyed.
        ship: ShipId,
    },
    /// A torpedo struck something and was consumed.
    TorpedoDetonated {
        /// Torpedo that detonated.
        torpedo: TorpedoId,
        /// Object that was struck.
        target: Target,
    },
    /// A torpedo's fuse ran out.
    TorpedoExpired {
        /// Torpedo that expired.
        torpedo: TorpedoId,
    },
    /// An asteroid absorbed an impact without breaking apart.
    AsteroidDamaged {
        /// Asteroid that was struck.
        asteroid: AsteroidId,
        /// Total impact accumulated so far.
        impact: u32,
    },
    /// An asteroid accumulated enough impact to break apart.
    AsteroidDestroyed {
        /// Asteroid that was destroyed.
        asteroid: AsteroidId,
    },
}

/// Immutable representation of a single ship's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipSnapshot {
    /// Unique identifier assigned to the ship.
    pub id: ShipId,
    /// Display name of the ship.
    pub name: String,
    /// Position in world units.
    pub position: Vec2,
    /// Velocity in world units per turn.
    pub velocity: Vec2,
    /// Heading in degrees within `[0, 360)`.
    pub heading: f32,
    /// Remaining hit points.
    pub hp: u32,
    /// Remaining fuel.
    pub fuel: f32,
    /// Turns until the phaser may fire again.
    pub phaser_cooldown: u32,
    /// Turns until the photon launcher may fire again.
    pub photon_cooldown: u32,
    /// Most recent scan result.
    pub scan: ScanReading,
    /// Appearance assigned to the ship.
    pub color: Color,
    /// Whether the ship is still in play.
    pub alive: bool,
}

/// Read-only snapshot describing every ship in the arena, destroyed or not.
#[derive(Clone, Debug, Default)]
pub struct ShipView {
    snapshots: Vec<ShipSnapshot>,
}

impl ShipView {
    /// Creates a new ship view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ShipSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured ship snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the snapshots of ships that are still alive.
    pub fn alive(&self) -> impl Iterator<Item = &ShipSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.alive)
    }

    /// Looks up the snapshot of the provided ship.
    #[must_use]
    pub fn get(&self, ship: ShipId) -> Option<&ShipSnapshot> {
        self.snapshots
            .binary_search_by_key(&ship, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ShipSnapshot> {
        self.snapshots
    }
}

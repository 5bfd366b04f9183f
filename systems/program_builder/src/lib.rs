#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that assembles ship programs from structured authoring calls.
//!
//! Ship authors describe behaviour with primitive actions and nested
//! conditional blocks. The builder lowers those calls into the flat
//! [`Program`] word stream understood by the virtual machine, patching jump
//! targets as blocks close.
//!
//! ```
//! use astrobots_core::Condition;
//! use astrobots_system_program_builder::ProgramBuilder;
//!
//! let mut builder = ProgramBuilder::new();
//! builder.scan();
//! builder.if_else(
//!     Condition::Seen,
//!     |then| {
//!         then.turn_to_scan();
//!         then.thrust(2.0);
//!     },
//!     |otherwise| {
//!         otherwise.thrust(4.0);
//!     },
//! );
//! let compiled = builder.finish().expect("balanced blocks");
//! assert_eq!(compiled.cost(), 2 + 1 + 2 + 2);
//! ```

use astrobots_core::{Condition, Opcode, Program, THRUST_POWER_SCALE};
use thiserror::Error;

/// Script cost of a thrust action.
pub const THRUST_COST: u32 = 2;
/// Script cost of a relative turn or a turn toward the last scan.
pub const TURN_COST: u32 = 1;
/// Script cost of firing the phaser.
pub const PHASER_COST: u32 = 3;
/// Script cost of launching a photon torpedo.
pub const PHOTON_COST: u32 = 4;
/// Script cost of a scan.
pub const SCAN_COST: u32 = 2;
/// Script cost of broadcasting a signal.
pub const SIGNAL_COST: u32 = 1;
/// Script cost of waiting.
pub const WAIT_COST: u32 = 0;

/// Identifies an open conditional block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHandle(u32);

impl BlockHandle {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Authoring defects reported when a program is finished.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A block was closed or given an else branch while a nested block was open.
    #[error("block {handle} was closed while block {innermost} is still open")]
    OutOfOrder {
        /// Handle passed by the author.
        handle: u32,
        /// Innermost open block.
        innermost: u32,
    },
    /// A handle was used after its block had already been closed, or never opened.
    #[error("block {handle} is not open")]
    NotOpen {
        /// Handle passed by the author.
        handle: u32,
    },
    /// A block received a second else branch.
    #[error("block {handle} already has an else branch")]
    DuplicateElse {
        /// Handle passed by the author.
        handle: u32,
    },
    /// Blocks were still open when the program was finished.
    #[error("{open} block(s) left open")]
    Unclosed {
        /// Number of blocks that were never closed.
        open: usize,
    },
    /// A jump target does not fit in an instruction word.
    #[error("program grew beyond the addressable range")]
    TooLong,
}

/// Finished program together with its informational script cost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompiledProgram {
    program: Program,
    cost: u32,
}

impl CompiledProgram {
    /// Compiled instruction stream.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Sum of the fixed costs of every primitive action in the program.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Reports whether the cost exceeds the provided budget.
    #[must_use]
    pub const fn exceeds(&self, budget: u32) -> bool {
        self.cost > budget
    }

    /// Consumes the compiled program, yielding the instruction stream.
    #[must_use]
    pub fn into_program(self) -> Program {
        self.program
    }
}

#[derive(Debug)]
struct Frame {
    handle: BlockHandle,
    jump_if_false: usize,
    jump_to_end: Option<usize>,
}

/// Incrementally assembles a ship program.
///
/// Misuse never panics: the first defect is recorded and surfaced by
/// [`ProgramBuilder::finish`].
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    words: Vec<i32>,
    cost: u32,
    frames: Vec<Frame>,
    next_handle: u32,
    error: Option<BuildError>,
}

impl ProgramBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Running cost of the actions emitted so far.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of words emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Reports whether nothing has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Accelerates along the heading. Power is stored in tenths.
    pub fn thrust(&mut self, power: f32) {
        let operand = (power * THRUST_POWER_SCALE).round() as i32;
        self.emit(Opcode::Thrust, Some(operand), THRUST_COST)
    }

    /// Rotates the heading by a signed number of degrees.
    pub fn turn_degrees(&mut self, degrees: i32) {
        self.emit(Opcode::TurnDeg, Some(degrees), TURN_COST)
    }

    /// Fires the phaser.
    pub fn fire_phaser(&mut self) {
        self.emit(Opcode::FirePhaser, None, PHASER_COST)
    }

    /// Launches a photon torpedo.
    pub fn fire_photon(&mut self) {
        self.emit(Opcode::FirePhoton, None, PHOTON_COST)
    }

    /// Scans along the heading.
    pub fn scan(&mut self) {
        self.emit(Opcode::Scan, None, SCAN_COST)
    }

    /// Broadcasts a value for the current turn.
    pub fn signal(&mut self, value: i32) {
        self.emit(Opcode::Signal, Some(value), SIGNAL_COST)
    }

    /// Does nothing for one instruction.
    pub fn wait(&mut self) {
        self.emit(Opcode::Wait, None, WAIT_COST)
    }

    /// Turns to face the last scan detection.
    pub fn turn_to_scan(&mut self) {
        self.emit(Opcode::TurnToScan, None, TURN_COST)
    }

    /// Opens a block that only runs when `condition` holds.
    ///
    /// Emits the condition followed by a `JumpIfFalse` whose target is patched
    /// once the block gains an else branch or closes.
    pub fn begin_if(&mut self, condition: Condition) -> BlockHandle {
        self.words.push(condition.opcode().code());
        self.words.push(condition.operand());
        self.words.push(Opcode::JumpIfFalse.code());
        let jump_if_false = self.placeholder();

        let handle = BlockHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.frames.push(Frame {
            handle,
            jump_if_false,
            jump_to_end: None,
        });
        handle
    }

    /// Starts the alternate branch of the innermost block.
    ///
    /// The true branch jumps over the alternate; the false jump of the
    /// condition lands at the start of the alternate.
    pub fn begin_else(&mut self, handle: BlockHandle) -> BlockHandle {
        if !self.is_innermost(handle) {
            return handle;
        }
        if self
            .frames
            .last()
            .is_some_and(|frame| frame.jump_to_end.is_some())
        {
            self.record(BuildError::DuplicateElse { handle: handle.0 });
            return handle;
        }

        self.words.push(Opcode::Jump.code());
        let jump_to_end = self.placeholder();
        let alternate = self.words.len();
        if let Some(jump_if_false) = self.frames.last().map(|frame| frame.jump_if_false) {
            self.patch(jump_if_false, alternate);
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.jump_to_end = Some(jump_to_end);
        }
        handle
    }

    /// Closes the innermost block, patching its pending jump to the current end.
    pub fn end_block(&mut self, handle: BlockHandle) {
        if !self.is_innermost(handle) {
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let end = self.words.len();
        match frame.jump_to_end {
            Some(jump_to_end) => self.patch(jump_to_end, end),
            None => self.patch(frame.jump_if_false, end),
        }
    }

    /// Emits a block whose body is authored by `body`; the block closes when
    /// the closure returns.
    pub fn if_then<F>(&mut self, condition: Condition, body: F)
    where
        F: FnOnce(&mut Self),
    {
        let handle = self.begin_if(condition);
        body(self);
        self.end_block(handle);
    }

    /// Emits a block with both branches authored by closures.
    pub fn if_else<T, E>(&mut self, condition: Condition, then: T, otherwise: E)
    where
        T: FnOnce(&mut Self),
        E: FnOnce(&mut Self),
    {
        let handle = self.begin_if(condition);
        then(self);
        let handle = self.begin_else(handle);
        otherwise(self);
        self.end_block(handle);
    }

    /// Terminates the program with `End` and returns it with its cost.
    pub fn finish(mut self) -> Result<CompiledProgram, BuildError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if !self.frames.is_empty() {
            return Err(BuildError::Unclosed {
                open: self.frames.len(),
            });
        }
        self.words.push(Opcode::End.code());
        Ok(CompiledProgram {
            program: Program::from_words(self.words),
            cost: self.cost,
        })
    }

    fn emit(&mut self, opcode: Opcode, operand: Option<i32>, cost: u32) {
        self.words.push(opcode.code());
        self.words.extend(operand);
        self.cost = self.cost.saturating_add(cost);
    }

    fn placeholder(&mut self) -> usize {
        self.words.push(0);
        self.words.len() - 1
    }

    fn patch(&mut self, index: usize, target: usize) {
        match i32::try_from(target) {
            Ok(target) => self.words[index] = target,
            Err(_) => self.record(BuildError::TooLong),
        }
    }

    fn is_innermost(&mut self, handle: BlockHandle) -> bool {
        let error = match self.frames.last() {
            Some(frame) if frame.handle == handle => return true,
            Some(frame) if self.frames.iter().any(|open| open.handle == handle) => {
                BuildError::OutOfOrder {
                    handle: handle.0,
                    innermost: frame.handle.0,
                }
            }
            _ => BuildError::NotOpen { handle: handle.0 },
        };
        self.record(error);
        false
    }

    fn record(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// Source of a ship's name and program.
pub trait ProgramSupplier {
    /// Display name of the ship.
    fn name(&self) -> &str;

    /// Emits the ship's behaviour into the builder.
    fn build(&self, builder: &mut ProgramBuilder);

    /// Builds and finishes the program in a fresh builder.
    fn compile(&self) -> Result<CompiledProgram, BuildError> {
        let mut builder = ProgramBuilder::new();
        self.build(&mut builder);
        builder.finish()
    }
}

/// Supplier backed by a closure.
#[derive(Clone, Debug)]
pub struct FnSupplier<F> {
    name: String,
    build: F,
}

/// Wraps a name and a closure into a [`ProgramSupplier`].
pub fn supplier<F>(name: impl Into<String>, build: F) -> FnSupplier<F>
where
    F: Fn(&mut ProgramBuilder),
{
    FnSupplier {
        name: name.into(),
        build,
    }
}

impl<F> ProgramSupplier for FnSupplier<F>
where
    F: Fn(&mut ProgramBuilder),
{
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, builder: &mut ProgramBuilder) {
        (self.build)(builder);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bytecode interpreter that runs one ship program for one turn.
//!
//! The interpreter owns no arena state. It reads the ship's status and issues
//! verbs exclusively through the [`ShipPort`] it is handed, so the same
//! program can drive a real arena ship or a test double.

use astrobots_core::{Opcode, Program, ShipAction, ShipPort, ShipStatus, THRUST_POWER_SCALE};
use thiserror::Error;

/// How a program stopped without faulting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// Reached an `End` instruction.
    End,
    /// Reached a word that is not a known opcode.
    UnknownOpcode(i32),
    /// Ran past the last word of the stream.
    RanOffEnd,
    /// The ship was not alive, so nothing ran.
    Inactive,
}

/// Result of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Halt {
    /// Why execution stopped.
    pub reason: HaltReason,
    /// Instructions dispatched before stopping.
    pub steps: usize,
}

/// Faults that abort a ship's program for the current turn.
///
/// Actions dispatched before the fault stand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VmError {
    /// More instructions were dispatched than the step cap allows.
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded {
        /// Cap that was exceeded.
        limit: usize,
    },
    /// An instruction at the end of the stream is missing its operand.
    #[error("{opcode:?} at word {pc} is missing its operand")]
    TruncatedOperand {
        /// Index of the instruction.
        pc: usize,
        /// Instruction whose operand is missing.
        opcode: Opcode,
    },
    /// A jump points outside the stream.
    #[error("jump at word {pc} targets {target}, outside 0..={len}")]
    JumpOutOfBounds {
        /// Index of the jump instruction.
        pc: usize,
        /// Requested target.
        target: i32,
        /// Length of the stream.
        len: usize,
    },
}

/// Ship program interpreter.
///
/// The program counter and condition flag start fresh on every run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vm {
    step_limit: Option<usize>,
}

impl Vm {
    /// Creates an interpreter whose step cap equals the program length.
    #[must_use]
    pub const fn new() -> Self {
        Self { step_limit: None }
    }

    /// Creates an interpreter with an explicit step cap.
    #[must_use]
    pub const fn with_step_limit(limit: usize) -> Self {
        Self {
            step_limit: Some(limit),
        }
    }

    /// Step cap applied to the provided program.
    #[must_use]
    pub fn step_limit_for(&self, program: &Program) -> usize {
        self.step_limit.unwrap_or_else(|| program.len())
    }

    /// Runs `program` against `port` until it ends or faults.
    pub fn run<P>(&self, program: &Program, port: &mut P) -> Result<Halt, VmError>
    where
        P: ShipPort + ?Sized,
    {
        if !port.status().alive {
            return Ok(Halt {
                reason: HaltReason::Inactive,
                steps: 0,
            });
        }

        let limit = self.step_limit_for(program);
        let mut pc = 0usize;
        let mut flag = false;
        let mut steps = 0usize;

        loop {
            let Some(word) = program.word(pc) else {
                return Ok(Halt {
                    reason: HaltReason::RanOffEnd,
                    steps,
                });
            };
            let Some(opcode) = Opcode::from_code(word) else {
                return Ok(Halt {
                    reason: HaltReason::UnknownOpcode(word),
                    steps,
                });
            };
            if steps >= limit {
                return Err(VmError::StepLimitExceeded { limit });
            }
            steps += 1;

            let at = pc;
            let operand = if opcode.arity() > 0 {
                program
                    .word(at + 1)
                    .ok_or(VmError::TruncatedOperand { pc: at, opcode })?
            } else {
                0
            };
            pc = at + 1 + opcode.arity();

            match opcode {
                Opcode::Wait => {}
                Opcode::Thrust => port.act(ShipAction::Thrust {
                    power: operand as f32 / THRUST_POWER_SCALE,
                }),
                Opcode::TurnDeg => port.act(ShipAction::TurnDegrees { degrees: operand }),
                Opcode::FirePhaser => port.act(ShipAction::FirePhaser),
                Opcode::FirePhoton => port.act(ShipAction::FirePhoton),
                Opcode::Scan => port.act(ShipAction::Scan),
                Opcode::Signal => port.act(ShipAction::Signal { value: operand }),
                Opcode::TurnToScan => port.act(ShipAction::TurnToScan),
                Opcode::IfSeen
                | Opcode::IfScanLe
                | Opcode::IfDamaged
                | Opcode::IfHpLe
                | Opcode::IfFuelLe
                | Opcode::IfCanFirePhaser
                | Opcode::IfCanFirePhoton => {
                    flag = evaluate(opcode, operand, &port.status());
                }
                Opcode::JumpIfFalse => {
                    if !flag {
                        pc = jump_target(at, operand, program.len())?;
                    }
                }
                Opcode::Jump => pc = jump_target(at, operand, program.len())?,
                Opcode::End => {
                    return Ok(Halt {
                        reason: HaltReason::End,
                        steps,
                    })
                }
            }
        }
    }
}

fn evaluate(opcode: Opcode, operand: i32, status: &ShipStatus) -> bool {
    match opcode {
        Opcode::IfSeen => status.scan.hit,
        Opcode::IfScanLe => status.scan.hit && status.scan.distance <= operand,
        Opcode::IfDamaged => status.hp < status.max_hp,
        Opcode::IfHpLe => i64::from(status.hp) <= i64::from(operand),
        Opcode::IfFuelLe => status.fuel <= operand as f32,
        Opcode::IfCanFirePhaser => status.phaser_cooldown == 0,
        Opcode::IfCanFirePhoton => status.photon_cooldown == 0,
        _ => false,
    }
}

fn jump_target(pc: usize, target: i32, len: usize) -> Result<usize, VmError> {
    usize::try_from(target)
        .ok()
        .filter(|index| *index <= len)
        .ok_or(VmError::JumpOutOfBounds { pc, target, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_target_accepts_stream_end() {
        assert_eq!(jump_target(0, 4, 4), Ok(4));
        assert!(jump_target(0, 5, 4).is_err());
        assert!(jump_target(0, -1, 4).is_err());
    }

    #[test]
    fn fuel_condition_compares_against_whole_units() {
        let status = ShipStatus {
            fuel: 40.0,
            ..ShipStatus::INACTIVE
        };
        assert!(evaluate(Opcode::IfFuelLe, 40, &status));
        assert!(!evaluate(Opcode::IfFuelLe, 39, &status));
    }
}

use astrobots_core::{Condition, Opcode, Program, ScanReading, ShipAction, ShipPort, ShipStatus};
use astrobots_system_program_builder::ProgramBuilder;
use astrobots_system_vm::{Halt, HaltReason, Vm, VmError};

/// Records every action and answers status queries from a fixed snapshot,
/// updating the scan reading when a scan is issued.
struct RecordingPort {
    status: ShipStatus,
    scan_result: ScanReading,
    actions: Vec<ShipAction>,
}

impl RecordingPort {
    fn new() -> Self {
        Self {
            status: ShipStatus {
                alive: true,
                hp: 10,
                max_hp: 10,
                fuel: 100.0,
                ..ShipStatus::INACTIVE
            },
            scan_result: ScanReading::default(),
            actions: Vec::new(),
        }
    }

    fn seeing(distance: i32) -> Self {
        let mut port = Self::new();
        port.scan_result = ScanReading {
            hit: true,
            distance,
            bearing: 90.0,
        };
        port
    }
}

impl ShipPort for RecordingPort {
    fn status(&self) -> ShipStatus {
        self.status
    }

    fn act(&mut self, action: ShipAction) {
        if action == ShipAction::Scan {
            self.status.scan = self.scan_result;
        }
        self.actions.push(action);
    }
}

fn build(author: impl FnOnce(&mut ProgramBuilder)) -> Program {
    let mut builder = ProgramBuilder::new();
    author(&mut builder);
    builder.finish().expect("balanced program").into_program()
}

fn pursuit() -> Program {
    build(|builder| {
        builder.scan();
        builder.if_else(
            Condition::Seen,
            |seen| {
                seen.turn_to_scan();
                seen.thrust(2.0);
            },
            |unseen| unseen.turn_degrees(15),
        );
    })
}

#[test]
fn true_branch_runs_and_skips_alternate() {
    let mut port = RecordingPort::seeing(120);
    let halt = Vm::new().run(&pursuit(), &mut port).expect("program runs");

    assert_eq!(halt.reason, HaltReason::End);
    assert_eq!(
        port.actions,
        vec![
            ShipAction::Scan,
            ShipAction::TurnToScan,
            ShipAction::Thrust { power: 2.0 },
        ],
    );
}

#[test]
fn false_branch_skips_body() {
    let mut port = RecordingPort::new();
    let _ = Vm::new().run(&pursuit(), &mut port).expect("program runs");

    assert_eq!(
        port.actions,
        vec![ShipAction::Scan, ShipAction::TurnDegrees { degrees: 15 }],
        "an unseen target must not trigger the pursuit body",
    );
}

#[test]
fn scan_range_condition_requires_a_hit_within_range() {
    let program = build(|builder| {
        builder.scan();
        builder.if_then(Condition::ScanWithin(300), |near| near.fire_phaser());
    });

    let mut near = RecordingPort::seeing(300);
    let _ = Vm::new().run(&program, &mut near).expect("runs");
    assert!(near.actions.contains(&ShipAction::FirePhaser));

    let mut far = RecordingPort::seeing(301);
    let _ = Vm::new().run(&program, &mut far).expect("runs");
    assert!(!far.actions.contains(&ShipAction::FirePhaser));

    let mut blind = RecordingPort::new();
    let _ = Vm::new().run(&program, &mut blind).expect("runs");
    assert!(!blind.actions.contains(&ShipAction::FirePhaser));
}

#[test]
fn status_conditions_read_the_port() {
    let program = build(|builder| {
        builder.if_then(Condition::Damaged, |b| b.signal(1));
        builder.if_then(Condition::HpAtMost(6), |b| b.signal(2));
        builder.if_then(Condition::FuelAtMost(35), |b| b.signal(3));
        builder.if_then(Condition::PhaserReady, |b| b.signal(4));
        builder.if_then(Condition::PhotonReady, |b| b.signal(5));
    });

    let mut port = RecordingPort::new();
    port.status.hp = 6;
    port.status.fuel = 20.0;
    port.status.photon_cooldown = 3;
    let _ = Vm::new().run(&program, &mut port).expect("runs");

    assert_eq!(
        port.actions,
        vec![
            ShipAction::Signal { value: 1 },
            ShipAction::Signal { value: 2 },
            ShipAction::Signal { value: 3 },
            ShipAction::Signal { value: 4 },
        ],
    );
}

#[test]
fn thrust_operand_is_tenths_of_power() {
    let program = Program::from_words(vec![Opcode::Thrust.code(), 25, Opcode::End.code()]);
    let mut port = RecordingPort::new();
    let _ = Vm::new().run(&program, &mut port).expect("runs");
    assert_eq!(port.actions, vec![ShipAction::Thrust { power: 2.5 }]);
}

#[test]
fn inactive_ship_never_runs() {
    let mut port = RecordingPort::seeing(10);
    port.status.alive = false;

    let halt = Vm::new().run(&pursuit(), &mut port).expect("runs");

    assert_eq!(
        halt,
        Halt {
            reason: HaltReason::Inactive,
            steps: 0,
        }
    );
    assert!(port.actions.is_empty());
}

#[test]
fn unknown_opcode_and_stream_end_terminate_normally() {
    let mut port = RecordingPort::new();
    let unknown = Program::from_words(vec![Opcode::Scan.code(), 99, Opcode::Scan.code()]);
    let halt = Vm::new().run(&unknown, &mut port).expect("runs");
    assert_eq!(halt.reason, HaltReason::UnknownOpcode(99));
    assert_eq!(port.actions, vec![ShipAction::Scan]);

    let mut port = RecordingPort::new();
    let open_ended = Program::from_words(vec![Opcode::Wait.code(), Opcode::Scan.code()]);
    let halt = Vm::new().run(&open_ended, &mut port).expect("runs");
    assert_eq!(
        halt,
        Halt {
            reason: HaltReason::RanOffEnd,
            steps: 2,
        }
    );

    let halt = Vm::new()
        .run(&Program::default(), &mut RecordingPort::new())
        .expect("runs");
    assert_eq!(halt.reason, HaltReason::RanOffEnd);
}

#[test]
fn backward_jump_hits_the_step_cap() {
    let looping = Program::from_words(vec![Opcode::Scan.code(), Opcode::Jump.code(), 0]);
    let mut port = RecordingPort::new();

    let result = Vm::new().run(&looping, &mut port);

    assert_eq!(result, Err(VmError::StepLimitExceeded { limit: 3 }));
    assert_eq!(port.actions, vec![ShipAction::Scan, ShipAction::Scan]);

    let mut port = RecordingPort::new();
    let result = Vm::with_step_limit(10).run(&looping, &mut port);
    assert_eq!(result, Err(VmError::StepLimitExceeded { limit: 10 }));
    assert_eq!(port.actions.len(), 5);
}

#[test]
fn malformed_streams_abort_with_context() {
    let truncated = Program::from_words(vec![Opcode::Scan.code(), Opcode::TurnDeg.code()]);
    let mut port = RecordingPort::new();
    assert_eq!(
        Vm::new().run(&truncated, &mut port),
        Err(VmError::TruncatedOperand {
            pc: 1,
            opcode: Opcode::TurnDeg,
        })
    );
    assert_eq!(port.actions, vec![ShipAction::Scan], "earlier actions stand");

    let wild = Program::from_words(vec![Opcode::Jump.code(), 40, Opcode::End.code()]);
    assert_eq!(
        Vm::new().run(&wild, &mut RecordingPort::new()),
        Err(VmError::JumpOutOfBounds {
            pc: 0,
            target: 40,
            len: 3,
        })
    );
}

#[test]
fn every_run_starts_from_a_clear_flag() {
    let program = build(|builder| {
        builder.scan();
        builder.if_then(Condition::Seen, |b| b.fire_photon());
    });
    let vm = Vm::new();

    let mut port = RecordingPort::seeing(50);
    let _ = vm.run(&program, &mut port).expect("runs");
    port.scan_result = ScanReading::default();
    port.actions.clear();
    let _ = vm.run(&program, &mut port).expect("runs");

    assert_eq!(port.actions, vec![ShipAction::Scan]);
}

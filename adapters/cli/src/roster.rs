//! Ships that fly in the default match.

use astrobots_core::Condition;
use astrobots_system_program_builder::{supplier, ProgramBuilder, ProgramSupplier};

/// Builds the default roster in spawn order.
pub(crate) fn default_roster() -> Vec<Box<dyn ProgramSupplier>> {
    vec![
        Box::new(supplier("Hunter", hunter)),
        Box::new(supplier("Drone", skirmisher)),
        Box::new(supplier("Miner", miner)),
        Box::new(supplier("Graeme", skirmisher)),
        Box::new(supplier("BeepBoop", beep_boop)),
    ]
}

/// Closes on anything it sees, firing every weapon that is ready.
fn hunter(ship: &mut ProgramBuilder) {
    ship.scan();
    ship.if_else(
        Condition::Seen,
        |seen| {
            seen.turn_to_scan();
            seen.if_then(Condition::ScanWithin(500), |close| {
                close.if_then(Condition::PhaserReady, |ready| ready.fire_phaser());
                close.if_then(Condition::PhotonReady, |ready| ready.fire_photon());
            });
            seen.thrust(2.0);
        },
        |unseen| unseen.thrust(4.0),
    );
    ship.if_then(Condition::FuelAtMost(40), |low| {
        low.scan();
        low.if_then(Condition::ScanWithin(300), |near| {
            near.turn_to_scan();
            near.thrust(2.0);
        });
    });
}

/// Holds its heading and lobs torpedoes at whatever drifts into view.
fn skirmisher(ship: &mut ProgramBuilder) {
    ship.scan();
    ship.if_then(Condition::Seen, |seen| {
        seen.if_then(Condition::ScanWithin(450), |close| {
            close.thrust(3.0);
            close.if_then(Condition::PhotonReady, |ready| ready.fire_photon());
        });
    });
    ship.if_then(Condition::HpAtMost(6), |hurt| hurt.thrust(2.0));
    evade_when_low(ship, 35, 200);
}

/// Works in close with the phaser and runs when hit.
fn miner(ship: &mut ProgramBuilder) {
    ship.scan();
    ship.if_else(
        Condition::Seen,
        |seen| {
            seen.turn_to_scan();
            seen.thrust(2.0);
            seen.if_then(Condition::ScanWithin(150), |close| {
                close.if_then(Condition::PhaserReady, |ready| ready.fire_phaser());
            });
        },
        |unseen| unseen.thrust(4.0),
    );
    ship.if_then(Condition::Damaged, |hurt| {
        hurt.scan();
        hurt.if_then(Condition::Seen, |seen| {
            seen.if_then(Condition::ScanWithin(350), |close| close.thrust(3.0));
        });
    });
}

fn beep_boop(ship: &mut ProgramBuilder) {
    ship.scan();
    ship.if_then(Condition::Seen, |seen| {
        seen.turn_to_scan();
        seen.if_then(Condition::ScanWithin(450), |close| {
            close.thrust(3.0);
            close.if_then(Condition::PhotonReady, |ready| ready.fire_photon());
            close.if_then(Condition::PhotonReady, |ready| ready.fire_photon());
        });
    });
    ship.if_then(Condition::HpAtMost(6), |hurt| hurt.thrust(2.0));
    evade_when_low(ship, 35, 200);
}

fn evade_when_low(ship: &mut ProgramBuilder, fuel: i32, range: i32) {
    ship.if_then(Condition::FuelAtMost(fuel), |low| {
        low.scan();
        low.if_then(Condition::ScanWithin(range), |near| {
            near.turn_to_scan();
            near.thrust(2.0);
        });
    });
}

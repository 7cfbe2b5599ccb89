//! Outage scenarios driven through `PowerService::tick` with synthetic
//! timestamps: detection edges, the emergency sequence, light policy and
//! preemption by power restore.

use crate::mock_hw::{ActuatorCall, Rig};

use powerguard::app::commands::{Command, LightCommand};
use powerguard::app::ports::Output;
use powerguard::fsm::StateId;
use powerguard::topics;

/// Mains present until `onset`, then the system rail collapses to 0.5 V
/// in a dark room.
fn rig_with_outage_at(onset: u64) -> Rig {
    let mut rig = Rig::new();
    rig.run_until(onset - 100);
    rig.hw.secondary_v = 0.5;
    rig.hw.light_percent = 20.0;
    rig
}

fn restore(rig: &mut Rig) {
    rig.hw.secondary_v = 5.0;
}

// ── Outage outlasting the emergency window ───────────────────

#[test]
fn dark_outage_runs_full_sequence() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(1_000);

    assert_eq!(
        rig.sink.published_at(topics::OUTAGE_STATUS, "POWER_CUT"),
        vec![1_000]
    );
    assert_eq!(rig.hw.sets(Output::SystemRelay, true), vec![1_000]);
    assert_eq!(rig.hw.sets(Output::EmergencyLight, true), vec![1_000]);
    assert_eq!(rig.svc.sequencer_state(), StateId::Armed);
    assert!(rig.svc.emergency_active());

    rig.run_until(1_100);
    assert!(rig.hw.pulses(Output::AuxRelay).is_empty());

    rig.run_until(1_200);
    assert_eq!(rig.hw.pulses(Output::AuxRelay), vec![(1_200, 10)]);
    assert_eq!(rig.svc.sequencer_state(), StateId::Expiring);
    assert!(rig.svc.aux_pulse_fired());

    rig.run_until(60_900);
    assert!(rig.hw.output(Output::SystemRelay));
    assert!(rig.hw.sets(Output::SystemRelay, false).is_empty());

    rig.run_until(61_000);
    assert_eq!(rig.hw.sets(Output::SystemRelay, false), vec![61_000]);
    assert_eq!(rig.hw.sets(Output::AuxRelay, false), vec![61_000]);
    assert_eq!(rig.svc.sequencer_state(), StateId::Idle);
    assert!(!rig.svc.emergency_active());
    assert!(
        rig.sink
            .statuses()
            .iter()
            .any(|s| s == "Emergency sequence complete. Systems OFF.")
    );

    // The light stays with the policy while the outage lasts.
    rig.run_until(90_000);
    assert!(rig.hw.output(Output::EmergencyLight));
    assert!(rig.svc.outage_active());
    assert_eq!(rig.hw.pulses(Output::AuxRelay).len(), 1);
}

#[test]
fn stalled_loop_pulses_and_releases_in_one_tick() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(1_000);
    assert_eq!(rig.svc.sequencer_state(), StateId::Armed);

    // Next pass only after the whole window has gone by.
    rig.tick_at(70_000);

    assert_eq!(rig.hw.pulses(Output::AuxRelay), vec![(70_000, 10)]);
    assert_eq!(rig.hw.sets(Output::SystemRelay, false), vec![70_000]);
    assert_eq!(rig.hw.sets(Output::AuxRelay, false), vec![70_000]);
    assert_eq!(rig.svc.sequencer_state(), StateId::Idle);
    assert!(!rig.svc.emergency_active());

    let pulse_at = rig
        .hw
        .calls
        .iter()
        .position(|(_, c)| *c == ActuatorCall::Pulse(Output::AuxRelay, 10));
    let release_at = rig
        .hw
        .calls
        .iter()
        .position(|(_, c)| *c == ActuatorCall::Set(Output::SystemRelay, false));
    assert!(pulse_at < release_at, "aux pulse must precede the release");
}

#[test]
fn onset_alert_reports_both_rails() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(1_000);
    assert_eq!(
        rig.sink.chats(),
        vec!["Power Cut Detected!\nMain Voltage: 12.00V\nSystem Voltage: 0.50V".to_string()]
    );
}

// ── Restore inside the window preempts it ────────────────────

#[test]
fn restore_preempts_emergency_window() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(29_900);
    restore(&mut rig);
    rig.run_until(30_000);

    assert_eq!(
        rig.sink.published_at(topics::OUTAGE_STATUS, "NORMAL"),
        vec![30_000]
    );
    assert_eq!(rig.hw.sets(Output::SystemRelay, false), vec![30_000]);
    assert_eq!(rig.hw.sets(Output::AuxRelay, false), vec![30_000]);
    assert_eq!(rig.hw.sets(Output::EmergencyLight, false), vec![30_000]);
    assert_eq!(rig.svc.sequencer_state(), StateId::Idle);
    assert_eq!(
        rig.sink.published_at(topics::COMMAND_STATUS, "CLEAR_LOG"),
        vec![30_000]
    );

    // 12 V × 100 mA for 29 s = 9.67 mWh
    assert_eq!(
        rig.sink.published_at(
            topics::OUTAGE_HISTORY,
            r#"{"duration":29000,"startV":12.00,"endV":12.00,"drop":0.00,"energy":9.67}"#
        ),
        vec![30_000]
    );
    assert!(
        rig.sink
            .chats()
            .contains(&"Power Restored.\nDuration: 29 seconds\nEnergy Used: 9.67 mWh".to_string())
    );

    // Nothing left to expire at the old deadline.
    rig.run_until(62_000);
    assert_eq!(rig.hw.sets(Output::SystemRelay, false), vec![30_000]);
}

#[test]
fn restore_after_window_only_clears_light() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(69_900);
    restore(&mut rig);
    rig.run_until(70_000);

    assert_eq!(rig.hw.sets(Output::SystemRelay, false), vec![61_000]);
    assert_eq!(rig.hw.sets(Output::EmergencyLight, false), vec![70_000]);
    assert!(!rig.svc.outage_active());
}

#[test]
fn history_reports_voltage_drop() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(1_000);
    rig.hw.primary_v = 11.5;
    rig.run_until(4_900);
    restore(&mut rig);
    rig.run_until(5_000);
    assert_eq!(
        rig.sink.published_at(
            topics::OUTAGE_HISTORY,
            r#"{"duration":4000,"startV":12.00,"endV":11.50,"drop":0.50,"energy":1.28}"#
        ),
        vec![5_000]
    );
}

// ── Manual light before the outage ───────────────────────────

#[test]
fn manual_light_bypasses_policy() {
    let mut rig = Rig::new();
    rig.run_until(400);
    rig.command(500, Command::EmergencyLight(LightCommand::On));
    assert!(rig.svc.light_manual());
    assert!(rig.hw.output(Output::EmergencyLight));

    // Bright room: the policy alone would say OFF.
    rig.hw.secondary_v = 0.5;
    rig.hw.light_percent = 90.0;
    rig.run_until(45_000);
    assert!(rig.hw.output(Output::EmergencyLight));
    assert!(rig.hw.sets(Output::EmergencyLight, false).is_empty());

    restore(&mut rig);
    rig.run_until(46_000);
    assert!(!rig.svc.outage_active());
    assert!(rig.hw.output(Output::EmergencyLight));
}

// ── Light change waits for the recheck ───────────────────────

#[test]
fn light_change_applies_at_recheck_tick() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(10_000);
    rig.hw.light_percent = 50.0;
    rig.run_until(20_900);
    assert!(rig.hw.output(Output::EmergencyLight));

    rig.run_until(21_000);
    assert_eq!(rig.hw.sets(Output::EmergencyLight, false), vec![21_000]);
    assert!(!rig.hw.output(Output::EmergencyLight));
}

#[test]
fn auto_resumes_policy_at_next_recheck() {
    let mut rig = Rig::new();
    rig.run_until(400);
    rig.command(500, Command::EmergencyLight(LightCommand::On));
    rig.hw.secondary_v = 0.5;
    rig.hw.light_percent = 90.0;
    rig.run_until(5_000);
    rig.command(5_050, Command::EmergencyLight(LightCommand::Auto));
    assert!(!rig.svc.light_manual());
    assert!(rig.hw.output(Output::EmergencyLight));

    // Onset was at 500, so the first recheck lands at 20 500.
    rig.run_until(20_400);
    assert!(rig.hw.output(Output::EmergencyLight));
    rig.run_until(20_500);
    assert_eq!(rig.hw.sets(Output::EmergencyLight, false), vec![20_500]);
}

// ── Re-arm ───────────────────────────────────────────────────

#[test]
fn second_outage_rearms_from_fresh_onset() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(4_900);
    restore(&mut rig);
    rig.run_until(7_900);
    rig.hw.secondary_v = 0.5;
    rig.run_until(70_000);

    assert_eq!(
        rig.hw.pulses(Output::AuxRelay),
        vec![(1_200, 10), (8_200, 10)]
    );
    assert_eq!(rig.hw.sets(Output::SystemRelay, true), vec![1_000, 8_000]);
    assert_eq!(rig.hw.sets(Output::SystemRelay, false), vec![5_000, 68_000]);
    assert_eq!(
        rig.sink.published_at(topics::OUTAGE_STATUS, "POWER_CUT"),
        vec![1_000, 8_000]
    );
}

#[test]
fn steady_outage_emits_single_edge() {
    let mut rig = rig_with_outage_at(1_000);
    rig.run_until(30_000);
    assert_eq!(
        rig.sink
            .published_at(topics::OUTAGE_STATUS, "POWER_CUT")
            .len(),
        1
    );
    assert!(rig.sink.published_at(topics::OUTAGE_STATUS, "NORMAL").is_empty());
}

#[test]
fn readings_are_published_every_acquisition() {
    let mut rig = Rig::new();
    rig.run_until(500);
    assert_eq!(rig.hw.reads, 6);
    assert_eq!(
        rig.sink.published_at(topics::PRIMARY_VOLTAGE, "12.000").len(),
        6
    );
    assert_eq!(
        rig.sink.published_at(topics::SECONDARY_POWER, "100.00").len(),
        6
    );
}

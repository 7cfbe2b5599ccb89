//! Remote commands decoded from raw topic/payload pairs and applied to
//! the service.

use crate::mock_hw::{ActuatorCall, Rig};

use powerguard::app::commands::Command;
use powerguard::app::ports::{ActuatorPort, Output};
use powerguard::topics;

fn send(rig: &mut Rig, topic: &str, payload: &str) -> bool {
    match Command::decode(topic, payload.as_bytes()) {
        Some(cmd) => {
            let t = rig.now_ms;
            rig.command(t, cmd);
            true
        }
        None => false,
    }
}

#[test]
fn system_relay_off_runs_two_pulse_heartbeat_when_aux_idle() {
    let mut rig = Rig::new();
    assert!(send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "OFF"));

    let calls: Vec<_> = rig.hw.calls.iter().map(|(_, c)| *c).collect();
    assert_eq!(
        calls,
        vec![
            ActuatorCall::Set(Output::SystemRelay, false),
            ActuatorCall::Settle(1_000),
            ActuatorCall::Pulse(Output::AuxRelay, 10),
            ActuatorCall::Settle(100),
            ActuatorCall::Pulse(Output::AuxRelay, 10),
        ]
    );
    assert_eq!(
        rig.sink.published_at(topics::SYSTEM_RELAY_STATUS, "OFF"),
        vec![0]
    );
}

#[test]
fn system_relay_off_pulses_once_when_aux_active() {
    let mut rig = Rig::new();
    rig.hw.set_output(Output::AuxRelay, true);
    rig.hw.calls.clear();

    assert!(send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "0"));
    assert_eq!(rig.hw.pulses(Output::AuxRelay).len(), 1);
}

#[test]
fn system_relay_on_and_pulse() {
    let mut rig = Rig::new();
    assert!(send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "1"));
    assert!(rig.hw.output(Output::SystemRelay));
    assert_eq!(rig.sink.published_at(topics::SYSTEM_RELAY_STATUS, "ON"), vec![0]);

    assert!(send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "PULSE"));
    assert_eq!(rig.hw.pulses(Output::SystemRelay), vec![(0, 2_000_000)]);
    assert!(rig.hw.output(Output::SystemRelay));
}

#[test]
fn aux_on_and_off_are_the_same_short_pulse() {
    let mut rig = Rig::new();
    assert!(send(&mut rig, topics::AUX_RELAY_CONTROL, "ON"));
    assert!(send(&mut rig, topics::AUX_RELAY_CONTROL, "OFF"));
    assert_eq!(rig.hw.pulses(Output::AuxRelay), vec![(0, 10), (0, 10)]);
    assert!(!rig.hw.output(Output::AuxRelay));
    assert_eq!(
        rig.sink.published_at(topics::AUX_RELAY_STATUS, "PULSE").len(),
        2
    );

    assert!(send(&mut rig, topics::AUX_RELAY_CONTROL, "PULSE"));
    assert_eq!(rig.hw.pulses(Output::AuxRelay).last(), Some(&(0, 2_000_000)));
}

#[test]
fn light_commands_latch_and_release_override() {
    let mut rig = Rig::new();
    assert!(send(&mut rig, topics::EMERGENCY_LIGHT_CONTROL, "ON"));
    assert!(rig.svc.light_manual());
    assert!(rig.hw.output(Output::EmergencyLight));
    assert!(send(&mut rig, topics::EMERGENCY_LIGHT_CONTROL, "0"));
    assert!(rig.svc.light_manual());
    assert!(!rig.hw.output(Output::EmergencyLight));

    assert!(send(&mut rig, topics::EMERGENCY_LIGHT_CONTROL, "AUTO"));
    assert!(!rig.svc.light_manual());
    assert_eq!(
        rig.sink.published_at(topics::EMERGENCY_LIGHT_STATUS, "AUTO"),
        vec![0]
    );
}

#[test]
fn indicator_follows_command_and_republishes() {
    let mut rig = Rig::new();
    assert!(send(&mut rig, topics::INDICATOR_CONTROL, "ON"));
    assert!(rig.hw.output(Output::StatusIndicator));
    assert_eq!(rig.sink.published_at(topics::INDICATOR_STATUS, "ON"), vec![0]);
}

#[test]
fn repeated_on_does_not_toggle() {
    let mut rig = Rig::new();
    for _ in 0..2 {
        assert!(send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "ON"));
        assert!(send(&mut rig, topics::EMERGENCY_LIGHT_CONTROL, "ON"));
        assert!(send(&mut rig, topics::INDICATOR_CONTROL, "ON"));
    }
    assert!(rig.hw.output(Output::SystemRelay));
    assert!(rig.hw.output(Output::EmergencyLight));
    assert!(rig.hw.output(Output::StatusIndicator));
    assert!(rig.hw.sets(Output::SystemRelay, false).is_empty());
}

#[test]
fn unknown_payloads_and_topics_are_ignored() {
    let mut rig = Rig::new();
    assert!(!send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "on"));
    assert!(!send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "AUTO"));
    assert!(!send(&mut rig, topics::EMERGENCY_LIGHT_CONTROL, "PULSE"));
    assert!(!send(&mut rig, topics::INDICATOR_CONTROL, "PULSE"));
    assert!(!send(&mut rig, "esp32/unknown", "ON"));
    assert!(rig.hw.calls.is_empty());
}

#[test]
fn command_during_sequence_overrides_relay_until_window_end() {
    let mut rig = Rig::new();
    rig.run_until(900);
    rig.hw.secondary_v = 0.5;
    rig.run_until(5_000);
    assert!(send(&mut rig, topics::SYSTEM_RELAY_CONTROL, "ON"));
    rig.run_until(61_000);
    assert!(!rig.hw.output(Output::SystemRelay));
}

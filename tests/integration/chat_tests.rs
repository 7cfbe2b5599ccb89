//! Chat-bot commands: `/status` wakes the system relay if needed, takes a
//! forced reading and reports; `/start` greets.

use crate::mock_hw::{ActuatorCall, Rig};

use powerguard::adapters::telegram::parse_updates;
use powerguard::app::chat::{ChatCommand, GREETING, WAKING_UP};
use powerguard::app::ports::Output;
use powerguard::topics;

fn ask(rig: &mut Rig, cmd: ChatCommand) {
    let t = rig.now_ms;
    rig.svc.handle_chat(cmd, t, &mut rig.hw, &mut rig.sink);
}

#[test]
fn status_wakes_relay_reports_and_sleeps_again() {
    let mut rig = Rig::new();
    rig.run_until(1_000);
    let reads = rig.hw.reads;
    rig.hw.calls.clear();

    ask(&mut rig, ChatCommand::Status);

    let calls: Vec<_> = rig.hw.calls.iter().map(|(_, c)| *c).collect();
    assert_eq!(
        calls,
        vec![
            ActuatorCall::Set(Output::SystemRelay, true),
            ActuatorCall::Settle(500),
            ActuatorCall::Set(Output::SystemRelay, false),
        ]
    );
    assert_eq!(rig.hw.reads, reads + 1);
    assert_eq!(
        rig.sink.published_at(topics::SYSTEM_RELAY_STATUS, "OFF"),
        vec![1_000]
    );

    let chats = rig.sink.chats();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0], WAKING_UP);
    assert!(chats[1].contains("Voltage: 12.00 V"));
    assert!(chats[1].ends_with("_(System returned to sleep mode)_"));
}

#[test]
fn status_leaves_energised_relay_alone() {
    let mut rig = Rig::new();
    rig.run_until(900);
    rig.hw.secondary_v = 0.5;
    rig.run_until(2_000);
    rig.hw.calls.clear();

    ask(&mut rig, ChatCommand::Status);

    assert!(rig.hw.calls.is_empty());
    let report = rig.sink.chats().pop().unwrap();
    assert!(!report.contains("sleep mode"));
}

#[test]
fn forced_refresh_does_not_run_detection() {
    let mut rig = Rig::new();
    rig.run_until(1_000);
    rig.hw.secondary_v = 0.2;

    ask(&mut rig, ChatCommand::Status);

    assert!(!rig.svc.outage_active());
    assert!((rig.svc.latest_readings().secondary.voltage_v() - 0.2).abs() < 1e-6);

    // The next periodic acquisition picks it up.
    rig.run_until(1_100);
    assert!(rig.svc.outage_active());
}

#[test]
fn start_greets() {
    let mut rig = Rig::new();
    ask(&mut rig, ChatCommand::Start);
    assert_eq!(rig.sink.chats(), vec![GREETING.to_string()]);
    assert!(rig.hw.calls.is_empty());
}

#[test]
fn only_authorised_chat_reaches_the_service() {
    let body = br#"{"ok":true,"result":[
        {"update_id":1,"message":{"chat":{"id":555},"text":"/status"}},
        {"update_id":2,"message":{"chat":{"id":42},"text":" /start "}}
    ]}"#;
    let mut rig = Rig::new();
    for update in parse_updates(body).unwrap() {
        if let Some(cmd) = ChatCommand::from_update(&update, "42") {
            ask(&mut rig, cmd);
        }
    }
    assert_eq!(rig.sink.chats(), vec![GREETING.to_string()]);
}

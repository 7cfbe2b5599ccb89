//! Fuzz target: inbound MQTT command decoding
//!
//! Splits the input into a topic and a payload and runs both through the
//! bounded inbound queue entry and `Command::decode`.  Neither may panic,
//! and a message that fits the queue must decode to the same command as
//! the raw pair.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use powerguard::adapters::channels::MqttInbound;
use powerguard::app::commands::Command;

fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    let (topic, rest) = data.split_at(split);
    let payload = rest.get(1..).unwrap_or(&[]);
    let Ok(topic) = core::str::from_utf8(topic) else {
        return;
    };

    let direct = Command::decode(topic, payload);
    if let Some(msg) = MqttInbound::message(topic, payload) {
        assert_eq!(msg.command(), direct);
    }
});

//! Fuzz target: Telegram `getUpdates` parsing
//!
//! Feeds arbitrary bytes to the response parser and every resulting
//! update through the chat command filter.
//!
//! cargo fuzz run fuzz_chat_updates

#![no_main]

use libfuzzer_sys::fuzz_target;
use powerguard::adapters::telegram::{UpdateQueue, parse_updates};
use powerguard::app::chat::ChatCommand;

fuzz_target!(|data: &[u8]| {
    let Ok(updates) = parse_updates(data) else {
        return;
    };

    let mut queue = UpdateQueue::new();
    let before = queue.offset();
    queue.absorb(updates);
    assert!(queue.offset() >= before);

    while let Some(update) = queue.pop() {
        let _ = ChatCommand::from_update(&update, "12345");
    }
});

//! Telegram Bot API chat adapter.
//!
//! Long-polling is replaced by short `getUpdates` polls driven from the
//! control loop.  Parsing, URL building and the update queue are plain
//! code tested on the host; the HTTPS client is ESP-IDF only.
//!
//! ```text
//!   getUpdates?offset=N ──▶ parse_updates ──▶ UpdateQueue ──▶ poll_update
//!   AppEvent::Chat ──▶ ChatSink ──▶ sendMessage
//! ```

use core::fmt::Write;

use log::{debug, warn};
use serde::Deserialize;

use crate::app::chat::ChatUpdate;
use crate::app::events::{AppEvent, bounded};
use crate::app::ports::{ChatPort, EventSink};
use crate::error::CommsError;

pub const API_BASE: &str = "https://api.telegram.org";

/// Updates requested per poll, and the depth of the local queue.
pub const BATCH: usize = 8;

/// Longest request URL built (token + percent-encoded message).
pub const URL_CAPACITY: usize = 1536;

pub type Url = heapless::String<URL_CAPACITY>;

// ───────────────────────────────────────────────────────────────
// Wire format
// ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<RawUpdate>,
}

#[derive(Deserialize)]
struct RawUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Deserialize)]
struct RawMessage {
    chat: RawChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct RawChat {
    id: i64,
}

/// Decode a `getUpdates` response body.
///
/// Updates without a message (edits, callbacks) come back with empty
/// text so their ids still advance the offset.
pub fn parse_updates(body: &[u8]) -> Result<Vec<ChatUpdate>, CommsError> {
    let resp: UpdatesResponse =
        serde_json::from_slice(body).map_err(|_| CommsError::ChatDecodeFailed)?;
    if !resp.ok {
        return Err(CommsError::ChatRequestFailed);
    }
    Ok(resp
        .result
        .into_iter()
        .map(|u| {
            let (chat_id, text) = match u.message {
                Some(m) => (
                    crate::app::events::bounded_fmt(format_args!("{}", m.chat.id)),
                    bounded(m.text.as_deref().unwrap_or_default()),
                ),
                None => (heapless::String::new(), heapless::String::new()),
            };
            ChatUpdate {
                update_id: u.update_id,
                chat_id,
                text,
            }
        })
        .collect())
}

/// Percent-encode everything outside the URL unreserved set.
pub fn percent_encode<const N: usize>(out: &mut heapless::String<N>, s: &str) -> Result<(), CommsError> {
    for b in s.bytes() {
        let ok = if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(b)).is_ok()
        } else {
            write!(out, "%{b:02X}").is_ok()
        };
        if !ok {
            return Err(CommsError::PayloadTooLarge);
        }
    }
    Ok(())
}

pub fn updates_url(token: &str, offset: i64) -> Result<Url, CommsError> {
    let mut url = Url::new();
    write!(
        url,
        "{API_BASE}/bot{token}/getUpdates?offset={offset}&limit={BATCH}&timeout=0"
    )
    .map_err(|_| CommsError::PayloadTooLarge)?;
    Ok(url)
}

pub fn send_url(token: &str, chat_id: &str, text: &str) -> Result<Url, CommsError> {
    let mut url = Url::new();
    write!(url, "{API_BASE}/bot{token}/sendMessage?parse_mode=Markdown&chat_id=")
        .map_err(|_| CommsError::PayloadTooLarge)?;
    percent_encode(&mut url, chat_id)?;
    url.push_str("&text=").map_err(|_| CommsError::PayloadTooLarge)?;
    percent_encode(&mut url, text)?;
    Ok(url)
}

// ───────────────────────────────────────────────────────────────
// Update queue
// ───────────────────────────────────────────────────────────────

/// Pending updates plus the acknowledge offset.
///
/// The offset only moves past updates that were actually queued, so a
/// burst larger than the queue is fetched again on the next poll.
#[derive(Default)]
pub struct UpdateQueue {
    offset: i64,
    pending: heapless::Deque<ChatUpdate, BATCH>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset for the next `getUpdates`.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Queue freshly fetched updates.  Returns how many were taken.
    pub fn absorb(&mut self, updates: Vec<ChatUpdate>) -> usize {
        let mut taken = 0;
        for u in updates {
            if u.update_id < self.offset {
                continue;
            }
            let next = u.update_id.saturating_add(1);
            if self.pending.push_back(u).is_err() {
                break;
            }
            self.offset = next;
            taken += 1;
        }
        taken
    }

    pub fn pop(&mut self) -> Option<ChatUpdate> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// Forwards [`AppEvent::Chat`] texts to a [`ChatPort`].
pub struct ChatSink<C> {
    port: C,
}

impl<C: ChatPort> ChatSink<C> {
    pub fn new(port: C) -> Self {
        Self { port }
    }

    pub fn port_mut(&mut self) -> &mut C {
        &mut self.port
    }
}

impl<C: ChatPort> EventSink for ChatSink<C> {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::Chat(text) = event {
            if let Err(e) = self.port.send(text) {
                warn!("Chat send failed: {e}");
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF HTTPS client
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
pub use client::TelegramClient;

#[cfg(feature = "espidf")]
mod client {
    use core::time::Duration;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use log::{debug, warn};

    use super::{UpdateQueue, parse_updates, send_url, updates_url};
    use crate::app::chat::ChatUpdate;
    use crate::app::ports::ChatPort;
    use crate::error::CommsError;

    /// Largest response body read; bigger bodies are truncated and fail
    /// to parse.
    const BODY_CAPACITY: usize = 8 * 1024;

    /// Bot client.  With an empty token it stays silent.
    pub struct TelegramClient {
        token: heapless::String<64>,
        chat_id: heapless::String<24>,
        queue: UpdateQueue,
    }

    impl TelegramClient {
        pub fn new(token: &str, chat_id: &str) -> Self {
            Self {
                token: crate::app::events::bounded(token),
                chat_id: crate::app::events::bounded(chat_id),
                queue: UpdateQueue::new(),
            }
        }

        fn get(url: &str) -> Result<Vec<u8>, CommsError> {
            let conf = Configuration {
                crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
                timeout: Some(Duration::from_secs(5)),
                ..Default::default()
            };
            let mut conn = EspHttpConnection::new(&conf).map_err(|e| {
                warn!("Chat: HTTP init failed: {e}");
                CommsError::ChatRequestFailed
            })?;
            conn.initiate_request(Method::Get, url, &[])
                .and_then(|()| conn.initiate_response())
                .map_err(|e| {
                    debug!("Chat: request failed: {e}");
                    CommsError::ChatRequestFailed
                })?;
            if conn.status() != 200 {
                debug!("Chat: HTTP {}", conn.status());
                return Err(CommsError::ChatRequestFailed);
            }

            let mut body = Vec::new();
            let mut buf = [0u8; 512];
            loop {
                let n = conn.read(&mut buf).map_err(|_| CommsError::ChatRequestFailed)?;
                if n == 0 || body.len() + n > BODY_CAPACITY {
                    break;
                }
                body.extend_from_slice(&buf[..n]);
            }
            Ok(body)
        }
    }

    impl ChatPort for TelegramClient {
        fn poll_update(&mut self) -> Result<Option<ChatUpdate>, CommsError> {
            if self.token.is_empty() {
                return Ok(None);
            }
            if self.queue.is_empty() {
                let url = updates_url(&self.token, self.queue.offset())?;
                let updates = parse_updates(&Self::get(&url)?)?;
                self.queue.absorb(updates);
            }
            Ok(self.queue.pop())
        }

        fn send(&mut self, text: &str) -> Result<(), CommsError> {
            if self.token.is_empty() || self.chat_id.is_empty() {
                debug!("Chat: no bot configured, message dropped");
                return Ok(());
            }
            let url = send_url(&self.token, &self.chat_id, text)?;
            Self::get(&url).map(|_| ())
        }
    }
}

/// Drain every pending update from `port`, handing each to `f`.
///
/// Stops on the first transport error, which is logged.
pub fn drain_updates<C: ChatPort>(port: &mut C, mut f: impl FnMut(ChatUpdate)) {
    loop {
        match port.poll_update() {
            Ok(Some(update)) => f(update),
            Ok(None) => break,
            Err(e) => {
                debug!("Chat poll: {e}");
                break;
            }
        }
    }
}

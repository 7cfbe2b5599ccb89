//! Mock hardware and event sink for integration tests.
//!
//! `MockHardware` serves whatever rail and light values the test sets and
//! records every actuator call with the loop time it happened at.
//! `RecordingSink` keeps every emitted event, also time-stamped.

use powerguard::adapters::publisher::render;
use powerguard::app::events::AppEvent;
use powerguard::app::ports::{ActuatorPort, EventSink, Output, SensorPort};
use powerguard::app::service::PowerService;
use powerguard::config::SystemConfig;
use powerguard::readings::{RailReading, ReadingSet};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Set(Output, bool),
    Pulse(Output, u32),
    Settle(u32),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub now_ms: u64,
    pub primary_v: f32,
    pub primary_ma: f32,
    pub secondary_v: f32,
    pub light_percent: f32,
    pub reads: u32,
    pub calls: Vec<(u64, ActuatorCall)>,
    state: [bool; 4],
}

#[allow(dead_code)]
impl MockHardware {
    /// Mains present, daylight.
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            primary_v: 12.0,
            primary_ma: 100.0,
            secondary_v: 5.0,
            light_percent: 80.0,
            reads: 0,
            calls: Vec::new(),
            state: [false; 4],
        }
    }

    fn slot(output: Output) -> usize {
        match output {
            Output::SystemRelay => 0,
            Output::AuxRelay => 1,
            Output::EmergencyLight => 2,
            Output::StatusIndicator => 3,
        }
    }

    pub fn output(&self, output: Output) -> bool {
        self.state[Self::slot(output)]
    }

    /// Times at which `output` was pulsed.
    pub fn pulses(&self, output: Output) -> Vec<(u64, u32)> {
        self.calls
            .iter()
            .filter_map(|(t, c)| match c {
                ActuatorCall::Pulse(o, hold) if *o == output => Some((*t, *hold)),
                _ => None,
            })
            .collect()
    }

    /// Times at which `output` was driven to `on`.
    pub fn sets(&self, output: Output, on: bool) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|(t, c)| match c {
                ActuatorCall::Set(o, v) if *o == output && *v == on => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self, now_ms: u64) -> ReadingSet {
        self.reads += 1;
        ReadingSet {
            primary: RailReading::new(self.primary_v, self.primary_ma),
            secondary: RailReading::new(self.secondary_v, 20.0),
            light_percent: self.light_percent,
            sampled_at_ms: now_ms,
        }
    }
}

impl ActuatorPort for MockHardware {
    fn set_output(&mut self, output: Output, on: bool) {
        self.state[Self::slot(output)] = on;
        self.calls.push((self.now_ms, ActuatorCall::Set(output, on)));
    }

    fn is_on(&self, output: Output) -> bool {
        self.output(output)
    }

    fn pulse(&mut self, output: Output, hold_us: u32) {
        self.calls.push((self.now_ms, ActuatorCall::Pulse(output, hold_us)));
    }

    fn settle(&mut self, ms: u32) {
        self.calls.push((self.now_ms, ActuatorCall::Settle(ms)));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub now_ms: u64,
    pub events: Vec<(u64, AppEvent)>,
}

#[allow(dead_code)]
impl RecordingSink {
    /// Every MQTT publish the recorded events render to.
    pub fn published(&self) -> Vec<(u64, &'static str, String)> {
        self.events
            .iter()
            .flat_map(|(t, e)| {
                render(e)
                    .into_iter()
                    .map(move |(topic, payload)| (*t, topic, payload.as_str().to_string()))
            })
            .collect()
    }

    /// Times at which `payload` was published on `topic`.
    pub fn published_at(&self, topic: &str, payload: &str) -> Vec<u64> {
        self.published()
            .into_iter()
            .filter(|(_, t, p)| *t == topic && p == payload)
            .map(|(t, _, _)| t)
            .collect()
    }

    pub fn chats(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|(_, e)| match e {
                AppEvent::Chat(text) => Some(text.as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|(_, e)| match e {
                AppEvent::CommandStatus(text) => Some(text.as_str().to_string()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push((self.now_ms, event.clone()));
    }
}

// ── Harness ───────────────────────────────────────────────────

/// Loop step used by every scenario.
pub const STEP_MS: u64 = 100;

pub struct Rig {
    pub svc: PowerService,
    pub hw: MockHardware,
    pub sink: RecordingSink,
    pub now_ms: u64,
    next_tick_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    /// Service with acquisition on every loop step, started at t=0.
    pub fn new() -> Self {
        let config = SystemConfig {
            acquisition_interval_ms: STEP_MS,
            ..SystemConfig::default()
        };
        let mut svc = PowerService::new(config);
        let mut sink = RecordingSink::default();
        svc.start(0, &mut sink);
        Self {
            svc,
            hw: MockHardware::new(),
            sink,
            now_ms: 0,
            next_tick_ms: 0,
        }
    }

    fn stamp(&mut self, t: u64) {
        self.now_ms = t;
        self.hw.now_ms = t;
        self.sink.now_ms = t;
    }

    /// Tick once at exactly `t`.
    pub fn tick_at(&mut self, t: u64) {
        self.stamp(t);
        self.svc.tick(t, &mut self.hw, &mut self.sink);
    }

    /// Tick every `STEP_MS` from where the last run stopped up to and
    /// including `until`.
    pub fn run_until(&mut self, until: u64) {
        while self.next_tick_ms <= until {
            self.tick_at(self.next_tick_ms);
            self.next_tick_ms += STEP_MS;
        }
    }

    pub fn command(&mut self, t: u64, cmd: powerguard::app::commands::Command) {
        self.stamp(t);
        self.svc.handle_command(cmd, &mut self.hw, &mut self.sink);
    }
}

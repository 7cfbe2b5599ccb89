//! Application service, the hexagonal core.
//!
//! [`PowerService`] owns the reading buffer, outage detector, sequencer
//! and light controller.  It exposes a clean, hardware-agnostic API.  All
//! I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters and synthetic timestamps.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         PowerService          │
//! ActuatorPort ◀──│ Detector · Sequencer · Light  │
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info};

use crate::config::SystemConfig;
use crate::fsm::context::SequencerRequests;
use crate::fsm::{Sequencer, StateId};
use crate::light::{LightController, LightDecision};
use crate::outage::{OutageDetector, OutageEdge, OutageOnset, OutageReport};
use crate::readings::{ReadingBuffer, ReadingSet};
use crate::timers::Periodic;

use super::chat::{self, ChatCommand};
use super::commands::{Command, LightCommand, RelayCommand};
use super::events::{AppEvent, LightStatus, OutageStatus, RelayId, RelayStatus};
use super::ports::{ActuatorPort, EventSink, Output, SensorPort};

// ───────────────────────────────────────────────────────────────
// PowerService
// ───────────────────────────────────────────────────────────────

pub struct PowerService {
    config: SystemConfig,
    readings: ReadingBuffer,
    detector: OutageDetector,
    sequencer: Sequencer,
    light: LightController,
    signal: Periodic,
    chat_poll: Periodic,
    tick_count: u64,
}

impl PowerService {
    /// Construct the service.  Call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            readings: ReadingBuffer::new(config.acquisition_interval_ms),
            detector: OutageDetector::new(config.outage_threshold_v),
            sequencer: Sequencer::new(&config),
            light: LightController::new(
                config.light_on_below_percent,
                config.light_recheck_interval_ms,
            ),
            signal: Periodic::new(config.signal_interval_ms),
            chat_poll: Periodic::new(config.chat_poll_interval_ms),
            tick_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.signal.start(now_ms);
        self.chat_poll.start(now_ms);
        sink.emit(&AppEvent::Started);
        info!(
            "PowerService started: outage below {:.2} V, light below {:.0}%",
            self.config.outage_threshold_v, self.config.light_on_below_percent
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One pass of the control loop at `now_ms`:
    /// acquisition (when due) → detector and integrator → sequencer →
    /// periodic light check.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Acquisition, and the detector on every fresh reading
        if self.readings.acquisition_due(now_ms) {
            let set = hw.read_all(now_ms);
            self.readings.store(set);
            sink.emit(&AppEvent::Readings(set));

            match self.detector.evaluate(&set, now_ms) {
                Some(OutageEdge::Began(onset)) => self.on_outage_began(&onset, now_ms, hw, sink),
                Some(OutageEdge::Ended(report)) => self.on_outage_ended(&report, now_ms, hw, sink),
                None => {}
            }
        }

        // 2. Sequencer deadlines
        let req = self.sequencer.tick(now_ms);
        if !req.is_empty() {
            self.apply_sequencer(req, hw, sink);
            if req.system_relay == Some(false) {
                sink.emit(&AppEvent::status(
                    "Emergency sequence complete. Systems OFF.",
                ));
            }
        }

        // 3. Recurring light check while the outage lasts
        let light_percent = self.readings.latest().light_percent;
        if let Some(decision) = self.light.poll_recheck(light_percent, now_ms) {
            match decision {
                LightDecision::On => {
                    self.drive_light(true, hw, sink);
                    sink.emit(&AppEvent::status(
                        "20s check: light below threshold - keeping light ON",
                    ));
                }
                LightDecision::Off => self.drive_light(false, hw, sink),
                LightDecision::Manual => debug!("Light recheck skipped: manual override"),
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a decoded remote command.
    pub fn handle_command(
        &mut self,
        cmd: Command,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        info!("Command: {:?}", cmd);
        match cmd {
            Command::Indicator(s) => {
                hw.set_output(Output::StatusIndicator, s.is_on());
                sink.emit(&AppEvent::IndicatorStatus(s.is_on()));
            }
            Command::SystemRelay(RelayCommand::On) => {
                hw.set_output(Output::SystemRelay, true);
                emit_relay(sink, RelayId::System, RelayStatus::On);
            }
            Command::SystemRelay(RelayCommand::Off) => {
                hw.set_output(Output::SystemRelay, false);
                emit_relay(sink, RelayId::System, RelayStatus::Off);
                self.heartbeat(hw, sink);
            }
            Command::SystemRelay(RelayCommand::Pulse) => {
                hw.pulse(Output::SystemRelay, self.hold_pulse_us());
                emit_relay(sink, RelayId::System, RelayStatus::Pulse);
            }
            Command::AuxRelay(RelayCommand::On | RelayCommand::Off) => {
                hw.pulse(Output::AuxRelay, self.config.short_pulse_us);
                emit_relay(sink, RelayId::Aux, RelayStatus::Pulse);
            }
            Command::AuxRelay(RelayCommand::Pulse) => {
                hw.pulse(Output::AuxRelay, self.hold_pulse_us());
                emit_relay(sink, RelayId::Aux, RelayStatus::Pulse);
            }
            Command::EmergencyLight(LightCommand::On) => {
                self.light.set_manual();
                self.drive_light(true, hw, sink);
            }
            Command::EmergencyLight(LightCommand::Off) => {
                self.light.set_manual();
                self.drive_light(false, hw, sink);
            }
            Command::EmergencyLight(LightCommand::Auto) => {
                self.light.set_auto();
                sink.emit(&AppEvent::LightStatus(LightStatus::Auto));
            }
        }
    }

    /// Answer a chat-bot command.
    pub fn handle_chat(
        &mut self,
        cmd: ChatCommand,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        match cmd {
            ChatCommand::Start => sink.emit(&AppEvent::chat(chat::GREETING)),
            ChatCommand::Status => {
                sink.emit(&AppEvent::chat(chat::WAKING_UP));

                let was_off = !hw.is_on(Output::SystemRelay);
                if was_off {
                    info!("Chat status: waking system relay");
                    hw.set_output(Output::SystemRelay, true);
                    hw.settle(self.config.status_wake_settle_ms);
                }

                let set = self.force_refresh(now_ms, hw);
                let report = chat::status_report(&set, was_off);

                if was_off {
                    hw.set_output(Output::SystemRelay, false);
                    emit_relay(sink, RelayId::System, RelayStatus::Off);
                    info!("Chat status: system relay back to sleep");
                }
                sink.emit(&AppEvent::Chat(report));
            }
        }
    }

    /// Take a sample now, outside the acquisition cadence.
    ///
    /// Only the reading buffer is updated; outage detection stays on the
    /// periodic path.
    pub fn force_refresh(&mut self, now_ms: u64, hw: &mut impl SensorPort) -> ReadingSet {
        let set = hw.read_all(now_ms);
        self.readings.store(set);
        set
    }

    // ── Housekeeping ──────────────────────────────────────────

    /// Publish link RSSI on its cadence.  Skipped while the link is down.
    pub fn poll_signal(&mut self, now_ms: u64, rssi: Option<i8>, sink: &mut impl EventSink) {
        if let (true, Some(rssi)) = (self.signal.poll(now_ms), rssi) {
            sink.emit(&AppEvent::SignalStrength(rssi));
        }
    }

    /// Whether the chat channel should be polled at `now_ms`.
    pub fn chat_poll_due(&mut self, now_ms: u64) -> bool {
        self.chat_poll.poll(now_ms)
    }

    /// Messaging session (re)established: announce the indicator state.
    pub fn on_transport_connected(&mut self, hw: &impl ActuatorPort, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::IndicatorStatus(hw.is_on(Output::StatusIndicator)));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn latest_readings(&self) -> ReadingSet {
        self.readings.latest()
    }

    pub fn outage_active(&self) -> bool {
        self.detector.is_active()
    }

    pub fn sequencer_state(&self) -> StateId {
        self.sequencer.state()
    }

    pub fn emergency_active(&self) -> bool {
        self.sequencer.emergency_active()
    }

    pub fn aux_pulse_fired(&self) -> bool {
        self.sequencer.aux_pulse_fired()
    }

    pub fn light_manual(&self) -> bool {
        self.light.is_manual()
    }

    /// Energy of the current (or most recent) outage.
    pub fn energy_mwh(&self) -> f32 {
        self.detector.energy_mwh()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_outage_began(
        &mut self,
        onset: &OutageOnset,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::OutageStatus(OutageStatus::PowerCut));
        sink.emit(&AppEvent::status(
            "POWER CUT DETECTED! Starting emergency sequence...",
        ));
        sink.emit(&AppEvent::Chat(chat::outage_alert(onset)));

        let req = self.sequencer.begin(now_ms);
        self.apply_sequencer(req, hw, sink);
        sink.emit(&AppEvent::status("Step 1: system relay turned ON"));

        match self.light.on_onset(self.readings.latest().light_percent, now_ms) {
            LightDecision::On => {
                self.drive_light(true, hw, sink);
                sink.emit(&AppEvent::status(
                    "Power cut! Light intensity low - emergency light ON",
                ));
            }
            LightDecision::Off => self.drive_light(false, hw, sink),
            LightDecision::Manual => debug!("Onset light policy skipped: manual override"),
        }
    }

    fn on_outage_ended(
        &mut self,
        report: &OutageReport,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::OutageHistory(*report));

        if let Some(on) = self.light.on_end().level() {
            self.drive_light(on, hw, sink);
        }

        sink.emit(&AppEvent::OutageStatus(OutageStatus::Normal));
        sink.emit(&AppEvent::ClearLog);
        sink.emit(&AppEvent::status("Power restored."));
        sink.emit(&AppEvent::Chat(chat::restore_alert(report)));

        let req = self.sequencer.preempt(now_ms);
        if !req.is_empty() {
            info!("Emergency window interrupted by power restore");
            self.apply_sequencer(req, hw, sink);
        }
    }

    fn apply_sequencer(
        &self,
        req: SequencerRequests,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        // Pulse before release: a late tick can carry both.
        if req.aux_pulse {
            hw.pulse(Output::AuxRelay, self.config.short_pulse_us);
            emit_relay(sink, RelayId::Aux, RelayStatus::Pulse);
            sink.emit(&AppEvent::status("Step 2: aux relay pulse sent"));
        }
        if let Some(on) = req.system_relay {
            hw.set_output(Output::SystemRelay, on);
            emit_relay(sink, RelayId::System, RelayStatus::from(on));
        }
        if let Some(on) = req.aux_relay {
            hw.set_output(Output::AuxRelay, on);
            emit_relay(sink, RelayId::Aux, RelayStatus::from(on));
        }
    }

    /// After a manual system-relay OFF: let the relay settle, then pulse
    /// the aux relay twice if it is idle, once if it is active.
    fn heartbeat(&self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.settle(self.config.relay_settle_ms);
        if hw.is_on(Output::AuxRelay) {
            hw.pulse(Output::AuxRelay, self.config.short_pulse_us);
            sink.emit(&AppEvent::status("Heartbeat: aux relay pulsed once"));
        } else {
            hw.pulse(Output::AuxRelay, self.config.short_pulse_us);
            hw.settle(self.config.heartbeat_gap_ms);
            hw.pulse(Output::AuxRelay, self.config.short_pulse_us);
            sink.emit(&AppEvent::status("Heartbeat: aux relay pulsed twice"));
        }
    }

    fn drive_light(&self, on: bool, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_output(Output::EmergencyLight, on);
        sink.emit(&AppEvent::LightStatus(if on {
            LightStatus::On
        } else {
            LightStatus::Off
        }));
    }

    fn hold_pulse_us(&self) -> u32 {
        self.config.hold_pulse_ms.saturating_mul(1_000)
    }
}

fn emit_relay(sink: &mut impl EventSink, relay: RelayId, status: RelayStatus) {
    sink.emit(&AppEvent::RelayStatus { relay, status });
}

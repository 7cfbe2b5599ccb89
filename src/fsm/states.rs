//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  IDLE ──[outage began]──▶ ARMED ──[now ≥ onset+200ms]──▶ EXPIRING
//!    ▲                        │  ▲                            │
//!    │                        │  └────[outage began again]────┤
//!    │                  [outage ended]                        │
//!    ├────────────────────────┘                               │
//!    ├──[pulse and now ≥ onset+60s in the same tick]          │
//!    └──────────[now ≥ onset+60s  or  outage ended]───────────┘
//! ```
//!
//! Entering `Armed` always starts a fresh window: the engine re-runs
//! `armed_enter` even when the machine is already armed.

use super::context::SequencerContext;
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Armed
        StateDescriptor {
            id: StateId::Armed,
            name: "Armed",
            on_enter: Some(armed_enter),
            on_exit: None,
            on_update: armed_update,
        },
        // Index 2: Expiring
        StateDescriptor {
            id: StateId::Expiring,
            name: "Expiring",
            on_enter: None,
            on_exit: None,
            on_update: expiring_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SequencerContext) {
    ctx.pulse_deadline.cancel();
    // Nothing to stand down at boot.
    if !ctx.emergency_active {
        return;
    }
    ctx.emergency_active = false;
    ctx.requests.system_relay = Some(false);
    ctx.requests.aux_relay = Some(false);
    info!(
        "IDLE: emergency window closed after {} ms, relays released",
        ctx.elapsed_since_onset()
    );
}

fn idle_update(_ctx: &mut SequencerContext) -> Option<StateId> {
    // Left only through an outage edge.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED state: system relay on, waiting for the delayed aux pulse
// ═══════════════════════════════════════════════════════════════════════════

fn armed_enter(ctx: &mut SequencerContext) {
    ctx.onset_ms = ctx.now_ms;
    ctx.emergency_active = true;
    ctx.aux_pulse_fired = false;
    ctx.pulse_deadline
        .arm_at(ctx.onset_ms.saturating_add(ctx.aux_pulse_delay_ms));
    ctx.requests.system_relay = Some(true);
    info!(
        "ARMED: onset at {} ms, aux pulse due in {} ms",
        ctx.onset_ms, ctx.aux_pulse_delay_ms
    );
}

fn armed_update(ctx: &mut SequencerContext) -> Option<StateId> {
    if ctx.aux_pulse_fired || !ctx.pulse_deadline.poll(ctx.now_ms) {
        return None;
    }
    ctx.aux_pulse_fired = true;
    ctx.requests.aux_pulse = true;
    info!(
        "ARMED: aux pulse fired {} ms after onset",
        ctx.elapsed_since_onset()
    );
    // A late tick may already be past the window as well.
    Some(expiring_update(ctx).unwrap_or(StateId::Expiring))
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXPIRING state: counting down the emergency window
// ═══════════════════════════════════════════════════════════════════════════

fn expiring_update(ctx: &mut SequencerContext) -> Option<StateId> {
    if ctx.emergency_active && ctx.window_elapsed() {
        return Some(StateId::Idle);
    }
    None
}

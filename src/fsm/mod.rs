//! Function-pointer finite state machine driving the emergency sequence.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ StateId  │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Idle     │ fn(ctx)   │    -     │ fn(ctx)->Option<> │   │
//! │  │ Armed    │ fn(ctx)   │    -     │ fn(ctx)->Option<> │   │
//! │  │ Expiring │    -      │    -     │ fn(ctx)->Option<> │   │
//! │  └──────────┴───────────┴──────────┴───────────────────┘   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut SequencerContext`.
//!
//! [`Sequencer`] wraps engine and context and is what the service uses:
//! outage edges go in, [`SequencerRequests`] come out.

pub mod context;
pub mod states;

use context::{SequencerContext, SequencerRequests};
use log::info;

use crate::config::SystemConfig;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Armed = 1,
    Expiring = 2,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `StateId`.  Out-of-range falls back to
    /// `Idle` (asserts in debug builds).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Armed,
            2 => Self::Expiring,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut SequencerContext);

/// Per-tick update.  Returns `Some(next)` to transition, `None` to stay.
pub type StateUpdateFn = fn(&mut SequencerContext) -> Option<StateId>;

/// Static descriptor for a single state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    /// Uptime at which the current state was entered (ms).
    state_entered_ms: u64,
    transitions: u32,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            state_entered_ms: 0,
            transitions: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut SequencerContext) {
        info!("Sequencer starting in state: {}", self.table[self.current].name);
        self.state_entered_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick at `ctx.now_ms`.
    pub fn tick(&mut self, ctx: &mut SequencerContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Transition unless already in `next`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut SequencerContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// Transition even when already in `next`, re-running its exit/enter.
    pub fn reenter(&mut self, next: StateId, ctx: &mut SequencerContext) {
        self.transition(next, ctx);
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn ms_in_current_state(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.state_entered_ms)
    }

    /// Transitions executed since construction.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut SequencerContext) {
        let next_idx = next_id as usize;

        info!(
            "Sequencer transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entered_ms = ctx.now_ms;
        self.transitions = self.transitions.wrapping_add(1);

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Sequencer facade
// ---------------------------------------------------------------------------

/// The actuation sequencer: engine plus blackboard.
///
/// Every method returns the output changes requested during that call.
pub struct Sequencer {
    fsm: Fsm,
    ctx: SequencerContext,
}

impl Sequencer {
    pub fn new(config: &SystemConfig) -> Self {
        let mut ctx = SequencerContext::new(config);
        let mut fsm = Fsm::new(states::build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);
        Self { fsm, ctx }
    }

    /// Outage began at `now_ms`: (re)arm with a fresh onset.
    pub fn begin(&mut self, now_ms: u64) -> SequencerRequests {
        self.ctx.now_ms = now_ms;
        self.fsm.reenter(StateId::Armed, &mut self.ctx);
        self.ctx.take_requests()
    }

    /// Outage ended at `now_ms`: close the window early if it is still open.
    pub fn preempt(&mut self, now_ms: u64) -> SequencerRequests {
        self.ctx.now_ms = now_ms;
        if self.ctx.emergency_active {
            info!("Sequencer: outage ended inside the emergency window");
            self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        }
        self.ctx.take_requests()
    }

    /// Poll the deadlines at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> SequencerRequests {
        self.ctx.now_ms = now_ms;
        self.fsm.tick(&mut self.ctx);
        self.ctx.take_requests()
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn emergency_active(&self) -> bool {
        self.ctx.emergency_active
    }

    pub fn aux_pulse_fired(&self) -> bool {
        self.ctx.aux_pulse_fired
    }

    pub fn onset_ms(&self) -> u64 {
        self.ctx.onset_ms
    }

    /// Deadline of the pending aux pulse, if armed.
    pub fn pulse_deadline(&self) -> Option<u64> {
        self.ctx.pulse_deadline.deadline()
    }

    pub fn transition_count(&self) -> u32 {
        self.fsm.transition_count()
    }
}

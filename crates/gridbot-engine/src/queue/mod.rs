//! Action queue — total ordering of commands against one robot.
//!
//! Every public API call appends a [`QueueEntry`]; the session's tick
//! drains exactly one entry at a time, waiting for that entry's transition
//! to complete before beginning the next. A failing entry settles its own
//! completion signal and never blocks the queue. A readiness gate holds
//! all entries until the scene finishes construction: commands issued
//! before boot are queued silently rather than rejected, so there is no
//! race between scene boot and program start.

pub mod signal;

use std::collections::VecDeque;

use log::{debug, trace};

use crate::api::types::{ActionResult, Direction};
use signal::{completion_pair, CommandHandle, SignalSetter};

/// A robot-affecting operation, as stored in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One 90° turn; negative = counter-clockwise, positive = clockwise.
    Rotate { delta: i8 },
    /// Turn (in single steps) until facing the target direction.
    Face { target: Direction },
    /// Step n cells in the facing direction, or its reverse.
    Move { steps: u32, reverse: bool },
    /// Jump to a cell without animation.
    Teleport { x: i32, y: i32 },
    Pickup,
    Drop,
    ResetLevel,
    LoadNextLevel,
}

/// One queued call: label for diagnostics, the operation, and the signal
/// settled when the operation finishes.
#[derive(Debug)]
pub struct QueueEntry {
    pub label: &'static str,
    pub command: Command,
    pub signal: SignalSetter,
}

/// The entry currently being executed. `remaining` counts the unit steps
/// (cells or turns) left; `turn` carries the per-step rotation delta for
/// multi-turn commands.
#[derive(Debug)]
pub struct ActiveEntry {
    pub entry: QueueEntry,
    pub remaining: u32,
    pub turn: i8,
}

/// Strictly-ordered single-consumer command queue.
#[derive(Debug, Default)]
pub struct ActionQueue {
    backlog: VecDeque<QueueEntry>,
    active: Option<ActiveEntry>,
    ready: bool,
    ready_waiters: Vec<SignalSetter>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. The returned handle settles when the command's
    /// effect completes or fails.
    pub fn enqueue(&mut self, label: &'static str, command: Command) -> CommandHandle {
        let (signal, handle) = completion_pair();
        trace!("enqueue {label} ({} pending)", self.backlog.len());
        self.backlog.push_back(QueueEntry {
            label,
            command,
            signal,
        });
        handle
    }

    /// A handle settled exactly once, when the scene finishes construction.
    /// Already settled if the queue is ready.
    pub fn ready_handle(&mut self) -> CommandHandle {
        if self.ready {
            return CommandHandle::settled(Ok(()));
        }
        let (setter, handle) = completion_pair();
        self.ready_waiters.push(setter);
        handle
    }

    /// Open the gate: resolve all ready handles and allow draining.
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        for waiter in self.ready_waiters.drain(..) {
            waiter.settle(Ok(()));
        }
        debug!("queue ready; {} command(s) held", self.backlog.len());
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveEntry> {
        self.active.as_mut()
    }

    /// Promote the next backlog entry to active. None if gated, busy, or
    /// empty.
    pub fn begin_next(&mut self) -> Option<&mut ActiveEntry> {
        if !self.ready || self.active.is_some() {
            return None;
        }
        let entry = self.backlog.pop_front()?;
        trace!("begin {}", entry.label);
        self.active = Some(ActiveEntry {
            entry,
            remaining: 0,
            turn: 0,
        });
        self.active.as_mut()
    }

    /// Settle the active entry's signal and clear it so the drain proceeds.
    pub fn finish_active(&mut self, result: ActionResult) {
        if let Some(active) = self.active.take() {
            if let Err(err) = &result {
                debug!("{} failed: {err}", active.entry.label);
            } else {
                trace!("{} done", active.entry.label);
            }
            active.entry.signal.settle(result);
        }
    }

    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// No entry active and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.backlog.is_empty()
    }
}

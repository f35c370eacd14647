//! Single-threaded completion signals.
//!
//! Every public command returns a [`CommandHandle`]; the queue settles the
//! paired [`SignalSetter`] exactly once when the command's effect finishes
//! (or fails). This replaces nested completion callbacks with an explicit
//! pollable value, which keeps the queue's ordering guarantees testable
//! without any renderer. Everything runs on the render tick, so plain
//! `Rc<RefCell<...>>` cells suffice — no futures, no atomics.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::types::ActionResult;

type Cell = Rc<RefCell<Option<ActionResult>>>;

/// Producer half: settles the signal once. Dropping an unsettled setter
/// leaves the handle pending forever, mirroring a stalled completion
/// callback — an accepted risk, not a panic.
#[derive(Debug)]
pub struct SignalSetter {
    cell: Cell,
}

impl SignalSetter {
    /// Settle the signal. Later calls are ignored (first result wins).
    pub fn settle(&self, result: ActionResult) {
        let mut slot = self.cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(result);
        }
    }
}

/// Consumer half: poll for the settled result.
#[derive(Debug, Clone)]
pub struct CommandHandle {
    cell: Cell,
}

impl CommandHandle {
    /// The settled result, if any. Cloned out; polling never consumes.
    pub fn poll(&self) -> Option<ActionResult> {
        self.cell.borrow().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// A handle that is already settled, for requests rejected at the call
    /// boundary (e.g. an unknown direction name).
    pub fn settled(result: ActionResult) -> Self {
        Self {
            cell: Rc::new(RefCell::new(Some(result))),
        }
    }
}

/// Create a linked setter/handle pair.
pub fn completion_pair() -> (SignalSetter, CommandHandle) {
    let cell: Cell = Rc::new(RefCell::new(None));
    (
        SignalSetter { cell: cell.clone() },
        CommandHandle { cell },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ActionError;

    #[test]
    fn starts_pending() {
        let (_setter, handle) = completion_pair();
        assert!(!handle.is_settled());
        assert!(handle.poll().is_none());
    }

    #[test]
    fn settles_once() {
        let (setter, handle) = completion_pair();
        setter.settle(Ok(()));
        setter.settle(Err(ActionError::Busy));
        assert_eq!(handle.poll(), Some(Ok(())));
    }

    #[test]
    fn failure_is_carried() {
        let (setter, handle) = completion_pair();
        setter.settle(Err(ActionError::Blocked { x: 1, y: 2 }));
        assert_eq!(handle.poll(), Some(Err(ActionError::Blocked { x: 1, y: 2 })));
    }

    #[test]
    fn pre_settled_handle() {
        let handle = CommandHandle::settled(Err(ActionError::NotCarrying));
        assert!(handle.is_settled());
    }
}

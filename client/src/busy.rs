use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Action, ValidationError};

/// Per-control "in flight" flag.
///
/// Acquiring hands out a [`BusyGuard`]; the flag drops back to idle when the
/// guard goes away, whichever way the handler exits.
#[derive(Debug)]
pub struct BusyFlag {
    action: Action,
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            busy: AtomicBool::new(false),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Result<BusyGuard<'_>, ValidationError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard { flag: self })
            .map_err(|_| ValidationError::Busy(self.action))
    }
}

#[derive(Debug)]
pub struct BusyGuard<'a> {
    flag: &'a BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a token renewal is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

/// Single-flight guard for token renewal.
///
/// `Idle -> Refreshing` only through [`RefreshGate::try_begin`], which fails while
/// another renewal holds the permit. `Refreshing -> Idle` happens when the permit
/// is dropped, whatever the renewal outcome.
#[derive(Debug, Default)]
pub struct RefreshGate {
    refreshing: AtomicBool,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RefreshPhase {
        if self.refreshing.load(Ordering::Acquire) {
            RefreshPhase::Refreshing
        } else {
            RefreshPhase::Idle
        }
    }

    /// Enters `Refreshing` if the gate is idle.
    pub fn try_begin(&self) -> Option<RefreshPermit<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshPermit { gate: self })
    }
}

/// Held for the duration of one renewal.
#[derive(Debug)]
pub struct RefreshPermit<'a> {
    gate: &'a RefreshGate,
}

impl Drop for RefreshPermit<'_> {
    fn drop(&mut self) {
        self.gate.refreshing.store(false, Ordering::Release);
    }
}

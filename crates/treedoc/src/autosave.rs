//! Autosave hooks.
//!
//! The engine never writes anything by itself. After every call that changed
//! the document, [`TreeDocApi`](crate::api::TreeDocApi) invokes
//! [`AutosaveTrigger::trigger_autosave`]. What happens next is the host's
//! business: any `FnMut()` closure works as a trigger.
//!
//! [`DebouncedAutosave`] implements the usual trailing debounce: each trigger
//! pushes the deadline out again, and the host polls it from its event loop.
//! A save therefore always writes the document as it is at fire time.

use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

pub trait AutosaveTrigger {
    fn trigger_autosave(&mut self);
}

impl<F: FnMut()> AutosaveTrigger for F {
    fn trigger_autosave(&mut self) {
        self()
    }
}

/// Ignores every trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAutosave;

impl AutosaveTrigger for NoopAutosave {
    fn trigger_autosave(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct DebouncedAutosave {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for DebouncedAutosave {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebouncedAutosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules a save `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consumes the pending save if it is due. Returns `true` when the caller
    /// should write now.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.deadline = None;
        true
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl AutosaveTrigger for DebouncedAutosave {
    fn trigger_autosave(&mut self) {
        self.schedule(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_trigger() {
        let mut count = 0;
        {
            let mut trigger = || count += 1;
            trigger.trigger_autosave();
            trigger.trigger_autosave();
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_debounce_fires_once_after_delay() {
        let mut autosave = DebouncedAutosave::new(Duration::from_millis(100));
        let start = Instant::now();
        assert!(!autosave.fire(start));

        autosave.schedule(start);
        assert!(autosave.is_pending());
        assert!(!autosave.fire(start + Duration::from_millis(99)));
        assert!(autosave.fire(start + Duration::from_millis(100)));
        assert!(!autosave.is_pending());
        assert!(!autosave.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_new_trigger_pushes_deadline_out() {
        let mut autosave = DebouncedAutosave::new(Duration::from_millis(100));
        let start = Instant::now();
        autosave.schedule(start);
        autosave.schedule(start + Duration::from_millis(80));

        assert!(!autosave.is_due(start + Duration::from_millis(150)));
        assert!(autosave.is_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel() {
        let mut autosave = DebouncedAutosave::default();
        assert_eq!(autosave.delay(), DEFAULT_DEBOUNCE);
        autosave.trigger_autosave();
        autosave.cancel();
        assert!(autosave.deadline().is_none());
    }
}

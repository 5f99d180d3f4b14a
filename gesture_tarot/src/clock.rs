//! Time source and the one-shot confirmation timer.
//!
//! Every time-dependent piece of the controller reads a [`Clock`] so tests
//! can step virtual time with [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time since an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction.
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self { SystemClock::new() }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration { self.origin.elapsed() }
}

/// Virtual time.  Clones share the same reading, so a test keeps one
/// handle and gives another to the controller.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self { ManualClock::default() }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration { self.now.get() }
}

// ════════════════════════════════════════════════════════════════════════════
// OneShotTimer
// ════════════════════════════════════════════════════════════════════════════

/// A cancellable deadline carrying a payload.  Fires at most once per
/// `schedule`.
#[derive(Clone, Debug)]
pub struct OneShotTimer<T> {
    pending: Option<(Duration, T)>,
}

impl<T> Default for OneShotTimer<T> {
    fn default() -> Self { OneShotTimer { pending: None } }
}

impl<T> OneShotTimer<T> {
    pub fn new() -> Self { OneShotTimer::default() }

    /// Arm the timer, replacing any pending deadline.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) {
        self.pending = Some((now + delay, payload));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool { self.pending.is_some() }

    /// Take the payload if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now >= *at => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn fires_once_at_deadline() {
        let mut t = OneShotTimer::new();
        t.schedule(ms(100), ms(1000), "card");

        assert_eq!(t.fire_if_due(ms(1099)), None);
        assert_eq!(t.fire_if_due(ms(1100)), Some("card"));
        assert_eq!(t.fire_if_due(ms(5000)), None);
        assert!(!t.is_pending());
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut t = OneShotTimer::new();
        t.schedule(ms(0), ms(10), 1);
        t.cancel();
        assert_eq!(t.fire_if_due(ms(100)), None);
    }

    #[test]
    fn manual_clock_is_shared() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(ms(250));
        b.advance(ms(250));
        assert_eq!(a.now(), ms(500));
    }
}

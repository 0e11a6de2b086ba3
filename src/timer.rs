use std::time::{Duration, Instant};

/// The source of wall clock time for the timers.
///
/// Stored in the chipset as a boxed trait object, so that tests can
/// move time by hand.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// The current point in time.
    fn now(&self) -> Instant;
}

/// The [`Clock`](Clock) backed by the monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Represents a timer inside of the chip infrastruture, it will count down to
/// zero from what ever number given at a fixed interval.
///
/// The timer does not run on its own, [`decay`](Timer::decay) has to be called with
/// the current time. It removes exactly one step per interval that passed since the
/// last step, so it does not matter how often it is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// the current value of the timer
    value: u8,
    /// when the next decrement is due, `None` while the timer is stopped
    deadline: Option<Instant>,
    /// the time between two decrements
    interval: Duration,
}

impl Timer {
    /// Will create a new stopped timer.
    pub fn new(interval: Duration) -> Self {
        Self {
            value: 0,
            deadline: None,
            interval,
        }
    }

    /// Will set the value from which the timer shall count down from, the first
    /// decrement is due one interval after `now`.
    pub fn set_value(&mut self, value: u8, now: Instant) {
        self.value = value;
        self.deadline = if value > 0 {
            Some(now + self.interval)
        } else {
            None
        };
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// The point in time the next decrement is due.
    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Removes one step for every interval elapsed until `now` and returns the
    /// amount of steps removed.
    pub fn decay(&mut self, now: Instant) -> u8 {
        let deadline = match self.deadline {
            Some(deadline) if now >= deadline => deadline,
            _ => return 0,
        };

        let interval = self.interval.as_nanos().max(1);
        let elapsed = (now - deadline).as_nanos() / interval + 1;
        let steps = u8::try_from(elapsed).unwrap_or(u8::MAX).min(self.value);

        self.value -= steps;
        self.deadline = if self.value > 0 {
            // steps is smaller than the previous value here, so it fits into the multiplication
            Some(deadline + self.interval * u32::from(steps))
        } else {
            None
        };
        steps
    }
}

/// A struct that triggers an event periodically at a given interval.
#[derive(Debug, Clone)]
pub struct IntervalTrigger {
    interval: f64,
    next_trigger: f64,
}

impl IntervalTrigger {
    /// Creates a new `IntervalTrigger` that fires at time zero and then every
    /// `interval` seconds.
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            next_trigger: 0.0,
        }
    }

    /// Returns true if the event should be triggered at the given time. After
    /// a long gap the trigger fires once and resumes on the interval grid.
    pub fn trigger(&mut self, time: f64) -> bool {
        if time < self.next_trigger {
            return false;
        }
        if self.interval > 0.0 {
            let next = ((time / self.interval).floor() + 1.0) * self.interval;
            // beyond 2^53 intervals the grid collapses onto `time`
            self.next_trigger = if next > time {
                next
            } else {
                time + self.interval
            };
        }
        true
    }
}

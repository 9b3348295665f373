use std::time::Instant;

// Loop timestamps recorded on pad hits and the playback clock both have to
// come from the same monotonic source, otherwise recorded and canned events
// won't line up against the loop position. The machine takes raw `now_us`
// values read from one shared clock, so tests can drive time by hand.
pub trait Clock: Send + Sync {
    /// Microseconds since some fixed origin. Never goes backwards.
    fn now_us(&self) -> u64;
}

/// Wall clock counting from process start.
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

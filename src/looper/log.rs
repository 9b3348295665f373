use crate::shared::MAX_LOOP_EVENTS;

/// One recorded or canned trigger: which pad, and when relative to loop
/// start. Canned patterns use track 255 as an end marker; the log itself
/// never stores the marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopEvent {
    pub track: u8,
    pub at_us: u64,
}

// Capacity-bounded event log. Append-only while recording; a push beyond
// capacity is dropped without disturbing what's already stored.
#[derive(Clone, Debug)]
pub struct LoopLog {
    events: Vec<LoopEvent>,
    duration_us: u64,
}

impl Default for LoopLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopLog {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(MAX_LOOP_EVENTS),
            duration_us: 0,
        }
    }

    /// Append an event; returns false if the log is full and the event was
    /// dropped.
    pub fn push(&mut self, event: LoopEvent) -> bool {
        if self.events.len() >= MAX_LOOP_EVENTS {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.duration_us = 0;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[LoopEvent] {
        &self.events
    }

    pub fn duration_us(&self) -> u64 {
        self.duration_us
    }

    pub fn set_duration_us(&mut self, duration_us: u64) {
        self.duration_us = duration_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_beyond_capacity_drops_and_preserves_existing() {
        let mut log = LoopLog::new();
        for i in 0..MAX_LOOP_EVENTS {
            assert!(log.push(LoopEvent {
                track: (i % 6) as u8,
                at_us: i as u64,
            }));
        }
        assert_eq!(log.len(), MAX_LOOP_EVENTS);
        assert!(!log.push(LoopEvent { track: 0, at_us: 999 }));
        assert_eq!(log.len(), MAX_LOOP_EVENTS);
        // existing entries untouched
        assert_eq!(log.events()[0], LoopEvent { track: 0, at_us: 0 });
        assert_eq!(
            log.events()[MAX_LOOP_EVENTS - 1].at_us,
            (MAX_LOOP_EVENTS - 1) as u64
        );
    }

    #[test]
    fn clear_resets_events_and_duration() {
        let mut log = LoopLog::new();
        log.push(LoopEvent { track: 1, at_us: 10 });
        log.set_duration_us(5000);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.duration_us(), 0);
    }
}

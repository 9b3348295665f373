use super::log::LoopLog;

// Loop playback clock and event matcher. Ticked at 1 kHz; each tick
// advances by the measured delta and fires every event whose timestamp
// falls in the half-open interval just crossed, so an event fires exactly
// once per traversal no matter how the tick period jitters.
#[derive(Clone, Debug)]
pub struct LoopPlayer {
    clock_us: u64,
    /// Set after a restart so the next tick's interval is closed at 0 and
    /// t=0 events fire immediately.
    fresh: bool,
}

impl Default for LoopPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopPlayer {
    pub fn new() -> Self {
        Self {
            clock_us: 0,
            fresh: true,
        }
    }

    /// Rewind to the top of the loop (play pressed, beat loaded, recording
    /// finished).
    pub fn reset(&mut self) {
        self.clock_us = 0;
        self.fresh = true;
    }

    pub fn pos_us(&self) -> u64 {
        self.clock_us
    }

    /// Advance by `delta_us` against `log` and append the tracks to fire
    /// into `out`. The caller owns and reuses `out`; nothing is allocated
    /// here on the steady path.
    ///
    /// Matching: interval `(prev, prev+delta]` taken modulo the duration.
    /// A wrap tick matches both `t == duration` and `t == 0` events (the
    /// two encodings of the loop boundary that canned patterns use), and a
    /// fresh start closes the interval so `t == 0` fires on the first tick.
    pub fn tick(&mut self, delta_us: u64, log: &LoopLog, out: &mut Vec<u8>) {
        let duration = log.duration_us();
        if duration == 0 {
            return;
        }
        if delta_us == 0 && !self.fresh {
            return;
        }

        let prev = self.clock_us;
        let new = prev + delta_us;

        if self.fresh {
            self.fresh = false;
            // closed interval [0, new]
            for e in log.events() {
                if e.at_us <= new {
                    out.push(e.track);
                }
            }
        } else if new < duration {
            for e in log.events() {
                if e.at_us > prev && e.at_us <= new {
                    out.push(e.track);
                }
            }
        } else {
            // wrap: (prev, duration] plus [0, overshoot]
            let overshoot = new - duration;
            for e in log.events() {
                if e.at_us > prev || e.at_us <= overshoot {
                    out.push(e.track);
                }
            }
        }

        self.clock_us = if new >= duration { new % duration } else { new };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::log::LoopEvent;

    fn log_with(duration_us: u64, events: &[(u8, u64)]) -> LoopLog {
        let mut log = LoopLog::new();
        for &(track, at_us) in events {
            log.push(LoopEvent { track, at_us });
        }
        log.set_duration_us(duration_us);
        log
    }

    /// Run `ticks` 1 ms ticks and count fires per track.
    fn run(player: &mut LoopPlayer, log: &LoopLog, ticks: usize) -> [usize; 6] {
        let mut counts = [0usize; 6];
        let mut fired = Vec::new();
        for _ in 0..ticks {
            fired.clear();
            player.tick(1000, log, &mut fired);
            for &t in &fired {
                counts[t as usize] += 1;
            }
        }
        counts
    }

    #[test]
    fn zero_duration_never_fires() {
        let log = log_with(0, &[(0, 0)]);
        let mut p = LoopPlayer::new();
        let counts = run(&mut p, &log, 10);
        assert_eq!(counts[0], 0);
    }

    #[test]
    fn t0_event_fires_on_first_tick_after_start() {
        let log = log_with(1_000_000, &[(0, 0)]);
        let mut p = LoopPlayer::new();
        let mut fired = Vec::new();
        p.tick(1000, &log, &mut fired);
        assert_eq!(fired, vec![0]);
    }

    #[test]
    fn scenario_a_two_pads_repeat_every_loop() {
        // pad 0 at t=0, pad 3 at t=500 ms, duration 1 s
        let log = log_with(1_000_000, &[(0, 0), (3, 500_000)]);
        let mut p = LoopPlayer::new();

        let mut fired = Vec::new();
        let mut fires: Vec<(u64, u8)> = Vec::new();
        // one tick short of the third wrap, so the downbeat of traversal 4
        // doesn't inflate the counts
        for _ in 0..2999 {
            fired.clear();
            let before = p.pos_us();
            p.tick(1000, &log, &mut fired);
            for &t in &fired {
                fires.push((before, t));
            }
        }
        let pad0: Vec<u64> = fires.iter().filter(|f| f.1 == 0).map(|f| f.0).collect();
        let pad3: Vec<u64> = fires.iter().filter(|f| f.1 == 3).map(|f| f.0).collect();
        assert_eq!(pad0.len(), 3);
        assert_eq!(pad3.len(), 3);
        assert_eq!(p.pos_us(), 999_000);
        // each within one tick of nominal time
        for at in pad0 {
            assert!(at == 0 || at >= 999_000, "pad0 fired at clock {at}");
        }
        for at in pad3 {
            assert!((499_000..500_000).contains(&at), "pad3 fired at clock {at}");
        }
    }

    #[test]
    fn each_event_fires_exactly_once_per_traversal() {
        let log = log_with(10_000, &[(1, 2_500), (2, 5_000), (3, 7_499)]);
        let mut p = LoopPlayer::new();
        let counts = run(&mut p, &log, 50); // 5 traversals at 1 ms ticks
        for track in 1..4 {
            assert_eq!(counts[track], 5, "track {track} fired {} times", counts[track]);
        }
    }

    #[test]
    fn boundary_event_not_duplicated_across_wrap() {
        // t=0 and t=duration both denote the wrap instant; each fires once
        // per traversal even though they land on the same tick
        let log = log_with(4_000, &[(0, 0), (1, 4_000)]);
        let mut p = LoopPlayer::new();
        let counts = run(&mut p, &log, 12); // 3 traversals
        // t=0 fires at the start of each traversal; the 12th tick is also
        // the downbeat of traversal 4, hence one extra
        assert_eq!(counts[0], 4);
        assert_eq!(counts[1], 3);
    }

    #[test]
    fn jittered_deltas_still_fire_exactly_once() {
        let log = log_with(9_000, &[(0, 1_000), (1, 4_500), (2, 8_999)]);
        let mut p = LoopPlayer::new();
        let deltas = [700u64, 1300, 900, 1100, 1000, 800, 1200];
        let mut counts = [0usize; 6];
        let mut fired = Vec::new();
        let mut elapsed = 0u64;
        let mut i = 0;
        while elapsed < 27_000 {
            // exactly 3 traversals worth of time
            let d = deltas[i % deltas.len()].min(27_000 - elapsed);
            elapsed += d;
            fired.clear();
            p.tick(d, &log, &mut fired);
            for &t in &fired {
                counts[t as usize] += 1;
            }
            i += 1;
        }
        assert_eq!(&counts[..3], &[3, 3, 3]);
    }

    #[test]
    fn reset_replays_from_the_top() {
        let log = log_with(5_000, &[(2, 0)]);
        let mut p = LoopPlayer::new();
        let mut fired = Vec::new();
        p.tick(1000, &log, &mut fired);
        assert_eq!(fired, vec![2]);
        fired.clear();
        p.tick(1000, &log, &mut fired);
        assert!(fired.is_empty());
        p.reset();
        fired.clear();
        p.tick(1000, &log, &mut fired);
        assert_eq!(fired, vec![2]);
        assert_eq!(p.pos_us(), 1000);
    }
}

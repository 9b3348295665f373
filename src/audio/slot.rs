use super::library::SampleLibrary;

// One pad's voice. Playback is a countdown: arming sets `remaining` to the
// assigned sample's length and the mixer reads index `total_len - remaining`
// each tick. Invariants: 0 <= remaining <= total_len, and playing implies
// remaining > 0 once armed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackSlot {
    sample: Option<usize>,
    total_len: usize,
    remaining: usize,
    playing: bool,
}

impl TrackSlot {
    pub fn assigned(sample: usize, total_len: usize) -> Self {
        Self {
            sample: Some(sample),
            total_len,
            remaining: 0,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Point the slot at a different sample. Deliberately leaves `remaining`
    /// and `playing` untouched, as a reassignment can land mid-playback;
    /// the bounds check in `mix_step` stops the voice if the new sample is
    /// shorter than what's left.
    pub fn set_sample(&mut self, sample: Option<usize>, total_len: usize) {
        self.sample = sample;
        self.total_len = total_len;
    }

    /// Restart the voice from the top of its sample. Arming an empty slot
    /// is a no-op.
    pub fn arm(&mut self) {
        if self.sample.is_some() && self.total_len > 0 {
            self.remaining = self.total_len;
            self.playing = true;
        }
    }

    pub fn stop(&mut self) {
        self.remaining = 0;
        self.playing = false;
    }

    /// One mixer tick: the slot's current amplitude, widened for the
    /// accumulator. Any out-of-bounds read or missing sample silences the
    /// voice instead of reading past the buffer.
    #[inline]
    pub fn mix_step(&mut self, library: &SampleLibrary) -> i32 {
        if !self.playing {
            return 0;
        }
        let Some(sample) = self.sample.and_then(|s| library.get(s)) else {
            self.stop();
            return 0;
        };
        let index = self.total_len.wrapping_sub(self.remaining);
        let amp = if index < self.total_len {
            sample.amplitude_at(index)
        } else {
            None
        };
        match amp {
            Some(a) => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.playing = false;
                }
                a as i32
            }
            None => {
                self.stop();
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::library::{Sample, SampleLibrary};

    fn lib(lens: &[usize]) -> SampleLibrary {
        let samples = lens
            .iter()
            .enumerate()
            .map(|(i, &n)| Sample::new(format!("s{i}"), vec![100; n.max(1)]))
            .collect();
        SampleLibrary::from_samples(samples)
    }

    #[test]
    fn voice_terminates_after_exactly_len_ticks() {
        let library = lib(&[5]);
        let mut slot = TrackSlot::assigned(0, 5);
        slot.arm();
        for _ in 0..5 {
            assert!(slot.is_playing());
            assert_eq!(slot.mix_step(&library), 100);
        }
        assert!(!slot.is_playing());
        assert_eq!(slot.mix_step(&library), 0);
    }

    #[test]
    fn arming_empty_slot_is_a_noop() {
        let library = lib(&[5]);
        let mut slot = TrackSlot::default();
        slot.arm();
        assert!(!slot.is_playing());
        assert_eq!(slot.mix_step(&library), 0);
    }

    #[test]
    fn missing_sample_stops_voice_silently() {
        let library = lib(&[5]);
        let mut slot = TrackSlot::assigned(3, 5); // index 3 not in library
        slot.arm();
        assert_eq!(slot.mix_step(&library), 0);
        assert!(!slot.is_playing());
    }

    #[test]
    fn reassignment_to_shorter_sample_never_reads_out_of_bounds() {
        let library = lib(&[10, 2]);
        let mut slot = TrackSlot::assigned(0, 10);
        slot.arm();
        for _ in 0..4 {
            slot.mix_step(&library);
        }
        // mid-playback reassignment: 6 ticks remain but the new sample
        // only has 2 frames, so index 4 is out of bounds
        slot.set_sample(Some(1), 2);
        assert_eq!(slot.mix_step(&library), 0);
        assert!(!slot.is_playing());
    }

    #[test]
    fn rearm_restarts_from_top() {
        let library = lib(&[3]);
        let mut slot = TrackSlot::assigned(0, 3);
        slot.arm();
        slot.mix_step(&library);
        slot.arm();
        let mut ticks = 0;
        while slot.is_playing() {
            slot.mix_step(&library);
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }
}

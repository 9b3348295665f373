use crate::shared::SAMPLE_RATE;

// The sound catalog. Seven slots, same lineup as the hardware build this
// reproduces: five drums plus two longer audio loops. Samples are mono
// 16-bit at the mixer rate and are synthesized once at startup so the
// binary needs no asset files; the loader can overwrite a slot from a WAV
// before the library is shared with the audio thread.

pub const SOUND_SLOTS: usize = 7;

pub const SOUND_NAMES: [&str; SOUND_SLOTS] = [
    "Kick", "Tom1", "Tom2", "Snare", "Crash", "Audio", "Rick Roll",
];

#[derive(Clone, Debug)]
pub struct Sample {
    name: String,
    data: Vec<i16>,
}

impl Sample {
    pub fn new(name: impl Into<String>, data: Vec<i16>) -> Self {
        let data = if data.is_empty() { vec![0] } else { data };
        Self { name: name.into(), data }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always at least 1; construction pads empty data with one zero frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn amplitude_at(&self, index: usize) -> Option<i16> {
        self.data.get(index).copied()
    }
}

/// Immutable once shared: built (and optionally patched from WAV files) on
/// the main thread, then moved behind an `Arc` for the mixer.
pub struct SampleLibrary {
    samples: Vec<Sample>,
}

impl SampleLibrary {
    pub fn default_catalog() -> Self {
        let samples = vec![
            Sample::new(SOUND_NAMES[0], synth_kick()),
            Sample::new(SOUND_NAMES[1], synth_tom(200.0)),
            Sample::new(SOUND_NAMES[2], synth_tom(150.0)),
            Sample::new(SOUND_NAMES[3], synth_snare()),
            Sample::new(SOUND_NAMES[4], synth_crash()),
            Sample::new(SOUND_NAMES[5], synth_melody(&AUDIO_LOOP_NOTES)),
            Sample::new(SOUND_NAMES[6], synth_melody(&RICK_ROLL_NOTES)),
        ];
        Self { samples }
    }

    #[cfg(test)]
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Swap a slot's audio data in place, keeping its catalog name.
    /// Only callable before the library is shared.
    pub fn replace_data(&mut self, index: usize, data: Vec<i16>) {
        if let Some(slot) = self.samples.get_mut(index) {
            if !data.is_empty() {
                slot.data = data;
            }
        }
    }
}

// ── Synthesis ─────────────────────────────────────────────────────

const TAU: f32 = std::f32::consts::TAU;

fn seconds(s: f32) -> usize {
    (SAMPLE_RATE as f32 * s) as usize
}

fn to_i16(x: f32) -> i16 {
    (x.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Pitch-swept sine, 120 Hz falling to 45 Hz.
fn synth_kick() -> Vec<i16> {
    let n = seconds(0.35);
    let mut phase = 0.0f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let freq = 45.0 + 75.0 * (1.0 - t) * (1.0 - t);
            phase += TAU * freq / SAMPLE_RATE as f32;
            let env = (-5.0 * t).exp();
            to_i16(0.9 * env * phase.sin())
        })
        .collect()
}

fn synth_tom(freq: f32) -> Vec<i16> {
    let n = seconds(0.3);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let env = (-6.0 * t).exp();
            to_i16(0.8 * env * (TAU * freq * i as f32 / SAMPLE_RATE as f32).sin())
        })
        .collect()
}

fn synth_snare() -> Vec<i16> {
    let n = seconds(0.25);
    let mut rng = NoiseGen::new(0x5eed);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let tone = (TAU * 185.0 * i as f32 / SAMPLE_RATE as f32).sin();
            let mix = 0.6 * rng.next() + 0.4 * tone;
            to_i16(0.8 * (-9.0 * t).exp() * mix)
        })
        .collect()
}

fn synth_crash() -> Vec<i16> {
    let n = seconds(0.8);
    let mut rng = NoiseGen::new(0xc4a5);
    let mut prev = 0.0f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let white = rng.next();
            // first difference brightens the noise toward a cymbal-ish hiss
            let bright = white - prev;
            prev = white;
            to_i16(0.7 * (-3.5 * t).exp() * bright)
        })
        .collect()
}

// (frequency Hz, duration ms); 0.0 Hz is a rest
const AUDIO_LOOP_NOTES: [(f32, u32); 8] = [
    (261.63, 180),
    (329.63, 180),
    (392.00, 180),
    (523.25, 180),
    (392.00, 180),
    (329.63, 180),
    (261.63, 180),
    (0.0, 180),
];

const RICK_ROLL_NOTES: [(f32, u32); 9] = [
    (220.00, 150),
    (246.94, 150),
    (293.66, 150),
    (246.94, 150),
    (369.99, 300),
    (369.99, 300),
    (329.63, 450),
    (0.0, 150),
    (220.00, 150),
];

fn synth_melody(notes: &[(f32, u32)]) -> Vec<i16> {
    let mut out = Vec::new();
    for &(freq, ms) in notes {
        let n = seconds(ms as f32 / 1000.0);
        for i in 0..n {
            if freq == 0.0 {
                out.push(0);
                continue;
            }
            let t = i as f32 / n as f32;
            let env = (1.0 - t).min(8.0 * t).min(1.0);
            let s = (TAU * freq * i as f32 / SAMPLE_RATE as f32).sin();
            out.push(to_i16(0.5 * env * s));
        }
    }
    out
}

/// xorshift white noise in [-1, 1]; deterministic so tests and the audible
/// result are reproducible.
struct NoiseGen {
    state: u32,
}

impl NoiseGen {
    fn new(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    fn next(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_seven_named_nonempty_samples() {
        let lib = SampleLibrary::default_catalog();
        assert_eq!(lib.len(), SOUND_SLOTS);
        for (i, name) in SOUND_NAMES.iter().enumerate() {
            let s = lib.get(i).unwrap();
            assert_eq!(s.name(), *name);
            assert!(s.len() > 0);
        }
    }

    #[test]
    fn out_of_range_index_is_none() {
        let lib = SampleLibrary::default_catalog();
        assert!(lib.get(SOUND_SLOTS).is_none());
    }

    #[test]
    fn amplitudes_stay_in_range() {
        // to_i16 clamps, but make sure the generators actually stay sane
        let lib = SampleLibrary::default_catalog();
        for i in 0..lib.len() {
            let s = lib.get(i).unwrap();
            for j in 0..s.len() {
                s.amplitude_at(j).unwrap();
            }
            assert!(s.amplitude_at(s.len()).is_none());
        }
    }

    #[test]
    fn replace_data_ignores_empty_and_bad_index() {
        let mut lib = SampleLibrary::default_catalog();
        let before = lib.get(0).unwrap().len();
        lib.replace_data(0, vec![]);
        assert_eq!(lib.get(0).unwrap().len(), before);
        lib.replace_data(99, vec![1, 2, 3]); // no panic
        lib.replace_data(0, vec![5; 10]);
        assert_eq!(lib.get(0).unwrap().len(), 10);
        assert_eq!(lib.get(0).unwrap().name(), "Kick");
    }
}

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::audio::library::{SOUND_SLOTS, SampleLibrary};
use crate::shared::SAMPLE_RATE;

// WAV import. Any .wav files found in the samples directory replace the
// synthesized catalog slots in filename order, after the same conversion
// the hardware build's offline tool applied: downmix to mono, resample to
// the mixer rate, scale to full 16-bit range. Runs once at startup, before
// the library is shared with the audio thread.

/// Sorted .wav paths in `dir`; missing or unreadable dirs just yield none.
pub fn index_wav_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
        })
        .collect();
    paths.sort();
    paths
}

/// Replace catalog slots from `dir`, one file per slot. Returns how many
/// slots were overridden; a file that fails to decode is skipped.
pub fn import_into_library(dir: &Path, library: &mut SampleLibrary) -> usize {
    let mut imported = 0;
    for (slot, path) in index_wav_in_dir(dir).into_iter().take(SOUND_SLOTS).enumerate() {
        match load_mono_i16(&path, SAMPLE_RATE) {
            Ok(data) => {
                info!(slot, path = %path.display(), frames = data.len(), "sample imported");
                library.replace_data(slot, data);
                imported += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable wav");
            }
        }
    }
    imported
}

/// Decode a WAV to mono i16 at `target_rate`.
pub fn load_mono_i16(path: &Path, target_rate: u32) -> anyhow::Result<Vec<i16>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono: Vec<f32> = samples
        .chunks(channels)
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect();

    let resampled = resample_linear(&mono, spec.sample_rate, target_rate);

    // scale to full range; anything already normalized passes through
    let peak = resampled.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
    let gain = if peak > 1.0 { 1.0 / peak } else { 1.0 };
    Ok(resampled
        .iter()
        .map(|&x| (x * gain * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
        .collect())
}

fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = ((samples.len() as f64) * ratio).round().max(1.0) as usize;
    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            let frac = (src_pos - idx as f64) as f32;
            if idx + 1 >= samples.len() {
                *samples.last().unwrap_or(&0.0)
            } else {
                samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, spec: hound::WavSpec, frames: &[i16]) {
        let mut w = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            w.write_sample(s).unwrap();
        }
        w.finalize().unwrap();
    }

    #[test]
    fn stereo_44k_becomes_mono_22k() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        // 44100 stereo frames = 1 second
        let frames: Vec<i16> = (0..44_100 * 2).map(|i| if i % 2 == 0 { 1000 } else { -1000 }).collect();
        write_wav(&path, spec, &frames);

        let data = load_mono_i16(&path, 22_050).unwrap();
        // one second at the target rate, downmixed to silence
        assert_eq!(data.len(), 22_050);
        assert!(data.iter().all(|&s| s.abs() <= 1));
    }

    #[test]
    fn mono_at_target_rate_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let frames: Vec<i16> = vec![100, 200, -300, 400];
        write_wav(&path, spec, &frames);

        let data = load_mono_i16(&path, 22_050).unwrap();
        assert_eq!(data, frames);
    }

    #[test]
    fn index_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&dir.path().join("b.wav"), spec, &[0]);
        write_wav(&dir.path().join("a.WAV"), spec, &[0]);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let paths = index_wav_in_dir(dir.path());
        assert_eq!(paths.len(), 2);
        assert!(paths[0].file_name().unwrap().to_str().unwrap().starts_with('a'));
    }

    #[test]
    fn import_replaces_leading_slots_only() {
        let dir = tempfile::tempdir().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        write_wav(&dir.path().join("kick.wav"), spec, &[42; 7]);

        let mut lib = SampleLibrary::default_catalog();
        let tom_len = lib.get(1).unwrap().len();
        assert_eq!(import_into_library(dir.path(), &mut lib), 1);
        assert_eq!(lib.get(0).unwrap().len(), 7);
        assert_eq!(lib.get(1).unwrap().len(), tom_len);
    }

    #[test]
    fn missing_dir_yields_nothing() {
        let mut lib = SampleLibrary::default_catalog();
        assert_eq!(import_into_library(Path::new("/nonexistent"), &mut lib), 0);
    }
}

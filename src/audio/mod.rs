use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::info;

use crate::audio_api::AudioCommand;
use crate::shared::{PWM_WRAP, SAMPLE_RATE};

pub mod engine;
pub mod library;
pub mod slot;

use engine::Engine;
use library::SampleLibrary;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    /// Fire-and-forget; if the command queue is somehow full the command is
    /// dropped rather than blocking an input or looper context.
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }
}

/// Open the default output device and move the engine into its callback.
/// The callback is the PWM/mixer-timer pair of the original hardware: it
/// drains pending commands, then pulls duty values from the mixer at
/// 22.05 kHz regardless of the device rate.
pub fn start_audio(
    library: Arc<SampleLibrary>,
    playing_mask: Arc<AtomicU32>,
) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let config = device
        .default_output_config()
        .context("no default output config")?;

    let channels = config.channels() as usize;
    let device_rate = config.sample_rate();
    info!(device_rate, channels, "audio output open");

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let stream = build_output_stream_f32(
                &device,
                &config.into(),
                rx,
                library,
                playing_mask,
                channels,
                device_rate,
            )?;
            stream.play().context("failed to play output stream")?;
            Ok(AudioHandle {
                tx,
                _output_stream: stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other} (only f32 supported)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    library: Arc<SampleLibrary>,
    playing_mask: Arc<AtomicU32>,
    channels: usize,
    device_rate: u32,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(library, playing_mask);

    // mixer ticks advanced per device frame (zero-order hold upsampling)
    let step = SAMPLE_RATE as f64 / device_rate.max(1) as f64;
    let mut acc = 0.0f64;
    let mut last = duty_to_f32((PWM_WRAP / 2) as u16); // silence
    let mut scratch: Vec<u16> = Vec::with_capacity(4096);

    let err_fn = |err| eprintln!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }
            let frames = data.len() / channels.max(1);
            let ticks = (acc + frames as f64 * step) as usize;
            scratch.clear();
            engine.render(&mut scratch, ticks);
            let mut idx = 0usize;
            for frame in data.chunks_mut(channels) {
                acc += step;
                while acc >= 1.0 {
                    if idx < scratch.len() {
                        last = duty_to_f32(scratch[idx]);
                        idx += 1;
                    }
                    acc -= 1.0;
                }
                for ch in frame.iter_mut() {
                    *ch = last;
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Duty `0..PWM_WRAP` back to a centered float, the inverse of the mixer's
/// amplitude→duty mapping.
fn duty_to_f32(duty: u16) -> f32 {
    (duty as f32 / (PWM_WRAP - 1) as f32) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_endpoints_map_to_full_scale() {
        assert_eq!(duty_to_f32(0), -1.0);
        assert_eq!(duty_to_f32((PWM_WRAP - 1) as u16), 1.0);
        let mid = duty_to_f32((PWM_WRAP / 2) as u16);
        assert!(mid.abs() < 0.001);
    }
}

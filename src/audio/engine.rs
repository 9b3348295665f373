use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::audio_api::AudioCommand;
use crate::shared::{PWM_WRAP, TRACK_COUNT};

use super::library::SampleLibrary;
use super::slot::TrackSlot;

/// Where mixed duty values go. The cpal stream adapts them to float frames;
/// tests capture them in a Vec.
pub trait PwmSink {
    fn write_duty(&mut self, duty: u16);
}

impl PwmSink for Vec<u16> {
    fn write_duty(&mut self, duty: u16) {
        self.push(duty);
    }
}

// The mixer. Owned exclusively by the audio callback thread; everything it
// shares outward is the lock-free playing mask (one bit per pad, for the
// pad lights). The mix path does no allocation and takes no locks.
pub struct Engine {
    library: Arc<SampleLibrary>,
    slots: [TrackSlot; TRACK_COUNT],
    playing_mask: Arc<AtomicU32>,
}

impl Engine {
    /// Slots start with the default 1:1 pad→sound assignment.
    pub fn new(library: Arc<SampleLibrary>, playing_mask: Arc<AtomicU32>) -> Self {
        let slots = std::array::from_fn(|i| match library.get(i) {
            Some(s) => TrackSlot::assigned(i, s.len()),
            None => TrackSlot::default(),
        });
        Self {
            library,
            slots,
            playing_mask,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Trigger { track } => {
                if let Some(slot) = self.slots.get_mut(track as usize) {
                    slot.arm();
                }
            }
            AudioCommand::Assign { track, sound } => {
                if let Some(slot) = self.slots.get_mut(track as usize) {
                    match self.library.get(sound) {
                        Some(s) => slot.set_sample(Some(sound), s.len()),
                        None => slot.set_sample(None, 0),
                    }
                }
            }
        }
    }

    /// One sample period: sum every active voice, clip to the 16-bit range,
    /// and map onto the PWM duty range. Always returns a value in
    /// `0..PWM_WRAP`, no matter how many voices are summed.
    pub fn mix_tick(&mut self) -> u16 {
        let mut sum: i32 = 0;
        for slot in &mut self.slots {
            sum += slot.mix_step(&self.library);
        }
        let clipped = sum.clamp(i16::MIN as i32, i16::MAX as i32);
        // [-32768, 32767] → [0, PWM_WRAP-1], linear
        (((clipped + 32768) as u32 * PWM_WRAP) / 65536) as u16
    }

    /// Render a block of sample ticks into a sink and publish the playing
    /// mask once at the end of the block.
    pub fn render<S: PwmSink>(&mut self, sink: &mut S, ticks: usize) {
        for _ in 0..ticks {
            let duty = self.mix_tick();
            sink.write_duty(duty);
        }
        self.publish_mask();
    }

    /// Refresh the lock-free pad-light mask from the slot states.
    pub fn publish_mask(&self) {
        let mut mask = 0u32;
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_playing() {
                mask |= 1 << i;
            }
        }
        self.playing_mask.store(mask, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn slot(&self, track: usize) -> &TrackSlot {
        &self.slots[track]
    }
}

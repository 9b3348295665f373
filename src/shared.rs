// Machine-wide constants and the display snapshot.
//
// The layout mirrors the hardware this emulates: six pads, each with one
// voice, mixed into a single PWM channel at 22.05 kHz with 12-bit duty
// resolution, plus two status LEDs driven by the record/play flags.

/// Number of pads, and therefore of mixer voices.
pub const TRACK_COUNT: usize = 6;

/// Mixer tick rate in Hz.
pub const SAMPLE_RATE: u32 = 22_050;

/// PWM counter wrap; duty values are always in `0..PWM_WRAP`.
pub const PWM_WRAP: u32 = 4096;

/// Capacity of the loop event log.
pub const MAX_LOOP_EVENTS: usize = 1000;

/// Track id that terminates a canned beat pattern.
pub const END_OF_PATTERN: u8 = 255;

/// Looper tick period.
pub const TICK_MS: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
}

impl LedState {
    pub fn from_flag(on: bool) -> Self {
        if on { LedState::On } else { LedState::Off }
    }
}

// Read-only snapshot the TUI renders every frame. The render loop never
// touches machine or engine state directly, it just draws this.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub pads_lit: [bool; TRACK_COUNT],
    pub record_led: LedState,
    pub play_led: LedState,
    pub mode_label: &'static str,
    /// Sample name assigned to each pad.
    pub assignments: [String; TRACK_COUNT],
    /// Pad currently targeted by sound-select, if any.
    pub select_cursor: Option<u8>,
    /// Name of the active canned beat, when one is loaded and playing.
    pub beat_name: Option<String>,
    pub event_count: usize,
    pub loop_duration_ms: u64,
    pub loop_pos_ms: u64,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            pads_lit: [false; TRACK_COUNT],
            record_led: LedState::Off,
            play_led: LedState::Off,
            mode_label: "IDLE",
            assignments: std::array::from_fn(|_| String::new()),
            select_cursor: None,
            beat_name: None,
            event_count: 0,
            loop_duration_ms: 0,
            loop_pos_ms: 0,
        }
    }
}

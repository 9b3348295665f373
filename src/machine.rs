use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{info, warn};

use crate::audio::library::SampleLibrary;
use crate::audio_api::AudioCommand;
use crate::input::{InputAction, ModeButton};
use crate::looper::beats::BeatCatalog;
use crate::looper::log::{LoopEvent, LoopLog};
use crate::looper::player::LoopPlayer;
use crate::shared::{DisplayState, LedState, TRACK_COUNT};

/// Exclusive operating mode, derived from the flags for display and
/// assertions. Playing and classic-beat playback coexist internally;
/// classic-beat is the more specific label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Recording,
    Playing,
    ClassicBeatPlaying,
    SoundSelect,
}

// The control core: mode state machine plus input dispatcher. Lives behind
// an Arc<Mutex<_>> shared by the key-event path and the 1 kHz looper
// thread; every method is a short critical section that never blocks on
// I/O. Audio work is returned as commands for the caller to send, so the
// engine's slot updates stay on the audio thread.
pub struct Machine {
    library: Arc<SampleLibrary>,
    playing_mask: Arc<AtomicU32>,
    beats: BeatCatalog,

    recording: bool,
    playing: bool,
    classic_beat: bool,
    sound_select: bool,

    /// pad → library sound index; mutated only in sound-select mode
    assignments: [usize; TRACK_COUNT],
    log: LoopLog,
    player: LoopPlayer,
    record_start_us: u64,
    last_tick_us: Option<u64>,

    /// which beat the beat-select button lands on next; starts on funk
    current_beat: usize,
    /// pad being configured in sound-select mode
    select_cursor: Option<u8>,
    selected_sound: usize,

    fired: Vec<u8>,
}

impl Machine {
    pub fn new(
        library: Arc<SampleLibrary>,
        beats: BeatCatalog,
        playing_mask: Arc<AtomicU32>,
    ) -> Self {
        Self {
            library,
            playing_mask,
            beats,
            recording: false,
            playing: false,
            classic_beat: false,
            sound_select: false,
            assignments: std::array::from_fn(|i| i),
            log: LoopLog::new(),
            player: LoopPlayer::new(),
            record_start_us: 0,
            last_tick_us: None,
            current_beat: 2,
            select_cursor: None,
            selected_sound: 0,
            fired: Vec::new(),
        }
    }

    /// Dispatch one classified input. Audio commands to send are appended
    /// to `out`.
    pub fn handle_input(&mut self, action: InputAction, now_us: u64, out: &mut Vec<AudioCommand>) {
        match action {
            InputAction::PadHit(pad) => self.pad_hit(pad, now_us, out),
            InputAction::Mode(ModeButton::SoundSelect) => self.toggle_sound_select(),
            InputAction::Mode(button) => {
                if self.sound_select {
                    return; // mode buttons are dead while reassigning sounds
                }
                match button {
                    ModeButton::Record => self.toggle_record(now_us),
                    ModeButton::Play => self.toggle_play(),
                    ModeButton::Clear => self.clear_loop(),
                    ModeButton::BeatSelect => self.next_beat(),
                    ModeButton::SoundSelect => {} // handled above
                }
            }
        }
    }

    fn pad_hit(&mut self, pad: u8, now_us: u64, out: &mut Vec<AudioCommand>) {
        if self.sound_select {
            self.configure_pad(pad, out);
            return;
        }
        out.push(AudioCommand::Trigger { track: pad });
        if self.recording {
            let at_us = now_us.saturating_sub(self.record_start_us);
            if !self.log.push(LoopEvent { track: pad, at_us }) {
                warn!(pad, "loop log full, event dropped");
            }
        }
    }

    fn configure_pad(&mut self, pad: u8, out: &mut Vec<AudioCommand>) {
        match self.select_cursor {
            Some(cur) if cur == pad => {
                // second hit on the same pad: advance to the next sound
                self.selected_sound = (self.selected_sound + 1) % self.library.len();
                self.assignments[pad as usize] = self.selected_sound;
                info!(
                    pad,
                    sound = self.sound_name(self.selected_sound),
                    "pad reassigned"
                );
                out.push(AudioCommand::Assign {
                    track: pad,
                    sound: self.selected_sound,
                });
                out.push(AudioCommand::Trigger { track: pad });
            }
            _ => {
                // designate this pad and preview its current sound
                self.select_cursor = Some(pad);
                self.selected_sound = self.assignments[pad as usize];
                info!(
                    pad,
                    sound = self.sound_name(self.selected_sound),
                    "configuring pad"
                );
                out.push(AudioCommand::Trigger { track: pad });
            }
        }
    }

    fn toggle_sound_select(&mut self) {
        self.sound_select = !self.sound_select;
        if self.sound_select {
            // reassignment takes the machine over completely
            self.recording = false;
            self.playing = false;
            self.classic_beat = false;
            self.select_cursor = None;
            self.selected_sound = 0;
            info!("sound select on");
        } else {
            info!("sound select off");
        }
    }

    fn toggle_record(&mut self, now_us: u64) {
        if !self.recording {
            self.recording = true;
            self.classic_beat = false;
            self.log.clear();
            self.record_start_us = now_us;
            info!("recording started");
        } else {
            self.recording = false;
            self.log
                .set_duration_us(now_us.saturating_sub(self.record_start_us));
            info!(
                events = self.log.len(),
                duration_ms = self.log.duration_us() / 1000,
                "recording stopped"
            );
            if !self.log.is_empty() {
                self.playing = true;
                self.player.reset();
            }
        }
    }

    fn toggle_play(&mut self) {
        self.playing = !self.playing;
        if self.playing {
            self.player.reset();
        }
        info!(playing = self.playing, "play toggled");
    }

    fn clear_loop(&mut self) {
        self.log.clear();
        self.classic_beat = false;
        info!("loop cleared");
    }

    fn next_beat(&mut self) {
        if self.beats.is_empty() {
            return;
        }
        self.current_beat = (self.current_beat + 1) % self.beats.len();
        if self.beats.load_into(self.current_beat, &mut self.log) {
            self.classic_beat = true;
            self.playing = true;
            self.recording = false;
            self.player.reset();
            info!(
                beat = self.beats.name(self.current_beat),
                events = self.log.len(),
                "classic beat loaded"
            );
        }
    }

    /// One looper tick. Advances the loop clock by the delta since the last
    /// call and appends a `Trigger` for each event crossed.
    pub fn tick(&mut self, now_us: u64, out: &mut Vec<AudioCommand>) {
        let delta = match self.last_tick_us {
            Some(prev) => now_us.saturating_sub(prev),
            None => 0,
        };
        self.last_tick_us = Some(now_us);
        if !self.playing {
            return;
        }
        self.fired.clear();
        self.player.tick(delta, &self.log, &mut self.fired);
        for &track in &self.fired {
            if (track as usize) < TRACK_COUNT {
                out.push(AudioCommand::Trigger { track });
            }
        }
    }

    pub fn mode(&self) -> Mode {
        if self.sound_select {
            Mode::SoundSelect
        } else if self.recording {
            Mode::Recording
        } else if self.classic_beat && self.playing {
            Mode::ClassicBeatPlaying
        } else if self.playing {
            Mode::Playing
        } else {
            Mode::Idle
        }
    }

    fn sound_name(&self, sound: usize) -> &str {
        self.library.get(sound).map(|s| s.name()).unwrap_or("")
    }

    /// Snapshot for the TUI. Indicator state is recomputed from the flags
    /// every time, no matter which transition last changed them.
    pub fn display_state(&self) -> DisplayState {
        let mask = self.playing_mask.load(Ordering::Relaxed);
        DisplayState {
            pads_lit: std::array::from_fn(|i| mask & (1 << i) != 0),
            record_led: LedState::from_flag(self.recording),
            play_led: LedState::from_flag(self.playing),
            mode_label: match self.mode() {
                Mode::Idle => "IDLE",
                Mode::Recording => "REC",
                Mode::Playing => "PLAY",
                Mode::ClassicBeatPlaying => "BEAT",
                Mode::SoundSelect => "SOUND SEL",
            },
            assignments: std::array::from_fn(|i| {
                self.sound_name(self.assignments[i]).to_string()
            }),
            select_cursor: self.select_cursor,
            beat_name: (self.classic_beat)
                .then(|| self.beats.name(self.current_beat))
                .flatten()
                .map(str::to_string),
            event_count: self.log.len(),
            loop_duration_ms: self.log.duration_us() / 1000,
            loop_pos_ms: self.player.pos_us() / 1000,
        }
    }

    #[cfg(test)]
    pub fn assignment(&self, pad: usize) -> usize {
        self.assignments[pad]
    }

    #[cfg(test)]
    pub fn log(&self) -> &LoopLog {
        &self.log
    }
}

use std::path::Path;

use serde::Deserialize;

use crate::shared::END_OF_PATTERN;

use super::log::{LoopEvent, LoopLog};

// Canned beat patterns. Each is a (track, millisecond-offset) sequence
// terminated by track 255, with a fixed loop duration. Track numbers:
// 0=kick, 1=tom1, 2=tom2, 3=snare, 4=crash.

/// Upper bound on events copied out of any one pattern.
pub const MAX_BEAT_EVENTS: usize = 50;

const BILLIE_JEAN: &[(u8, u64)] = &[
    (4, 0),
    (0, 0),
    (4, 250),
    (4, 500),
    (3, 500),
    (4, 750),
    (4, 1000),
    (0, 1000),
    (4, 1250),
    (4, 1500),
    (3, 1500),
    (4, 1750),
    (0, 2000),
    (END_OF_PATTERN, 0),
];

const HIP_HOP: &[(u8, u64)] = &[
    (0, 0),
    (3, 500),
    (0, 750),
    (0, 1000),
    (3, 1500),
    (4, 1750),
    (0, 2000),
    (END_OF_PATTERN, 0),
];

const FUNK: &[(u8, u64)] = &[
    (0, 0),
    (4, 125),
    (3, 250),
    (4, 375),
    (0, 500),
    (4, 625),
    (3, 750),
    (0, 875),
    (4, 1000),
    (3, 1250),
    (0, 1500),
    (4, 1625),
    (3, 1750),
    (4, 1875),
    (0, 2000),
    (END_OF_PATTERN, 0),
];

#[derive(Clone, Debug)]
pub struct Beat {
    pub name: String,
    /// (track, ms offset) pairs, possibly ending in the 255 marker.
    pattern: Vec<(u8, u64)>,
    pub duration_ms: u64,
}

impl Beat {
    fn builtin(name: &str, pattern: &[(u8, u64)], duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_vec(),
            duration_ms,
        }
    }
}

pub struct BeatCatalog {
    beats: Vec<Beat>,
}

impl Default for BeatCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BeatCatalog {
    pub fn builtin() -> Self {
        Self {
            beats: vec![
                Beat::builtin("Billie Jean", BILLIE_JEAN, 2000),
                Beat::builtin("Hip-Hop", HIP_HOP, 2000),
                Beat::builtin("Funk", FUNK, 2000),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.beats.get(index).map(|b| b.name.as_str())
    }

    /// Load beat `index` into the log: clear it, copy events up to the end
    /// marker converting ms→µs, set the duration from the table. A bad
    /// index leaves the log untouched; loading the same beat twice yields
    /// identical state.
    pub fn load_into(&self, index: usize, log: &mut LoopLog) -> bool {
        let Some(beat) = self.beats.get(index) else {
            return false;
        };
        log.clear();
        for &(track, at_ms) in beat.pattern.iter().take(MAX_BEAT_EVENTS) {
            if track == END_OF_PATTERN {
                break;
            }
            log.push(LoopEvent {
                track,
                at_us: at_ms * 1000,
            });
        }
        log.set_duration_us(beat.duration_ms * 1000);
        true
    }

    /// Append user patterns from a `beats.json` next to the samples
    /// directory. The file is a list of `{name, duration_ms, events}`
    /// entries; see `UserBeat`.
    pub fn extend_from_file(&mut self, path: &Path) -> anyhow::Result<usize> {
        let data = std::fs::read_to_string(path)?;
        let user: Vec<UserBeat> = serde_json::from_str(&data)?;
        let added = user.len();
        for u in user {
            self.beats.push(u.into_beat());
        }
        Ok(added)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserBeat {
    name: String,
    duration_ms: u64,
    events: Vec<UserBeatEvent>,
}

#[derive(Debug, Deserialize)]
pub struct UserBeatEvent {
    track: u8,
    at_ms: u64,
}

impl UserBeat {
    fn into_beat(self) -> Beat {
        Beat {
            name: self.name,
            pattern: self.events.iter().map(|e| (e.track, e.at_ms)).collect(),
            duration_ms: self.duration_ms,
        }
    }
}

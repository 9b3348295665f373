// Commands the control side sends to the audio engine. The engine lives
// inside the output-stream callback and owns the track slots outright, so
// arming and reassignment always happen between mix ticks; a slot's
// reference, length, and playing flag can never be observed half-updated
// by the mixer.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCommand {
    /// Arm a pad's voice: restart its assigned sample from the top.
    Trigger { track: u8 },
    /// Point a pad at a different library sound. An out-of-range sound
    /// index empties the slot.
    Assign { track: u8, sound: usize },
}

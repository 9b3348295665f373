use crate::shared::TRACK_COUNT;

// Trigger-source layer. The hardware this models existed in two builds:
// pull-up push buttons (active low) and capacitive touch pads (active
// high), plus a variant where the mode controls arrived on external
// digital lines. All three reduce to "which edge on which line counts as
// an activation", so the dispatcher is written once against classified
// actions.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Rise,
    Fall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Pad(u8),
    Record,
    Play,
    Clear,
    BeatSelect,
    SoundSelect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TriggerTech {
    /// Pull-up push button: pressing pulls the line low.
    #[default]
    EdgeButton,
    /// Capacitive pad: touch drives the line high.
    TouchPad,
    /// Mode lines driven by an external controller, asserted high.
    ExternalLine,
}

impl TriggerTech {
    pub fn activating_edge(self) -> Edge {
        match self {
            TriggerTech::EdgeButton => Edge::Fall,
            TriggerTech::TouchPad | TriggerTech::ExternalLine => Edge::Rise,
        }
    }
}

/// A raw edge on a monitored line, before classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    pub line: Line,
    pub edge: Edge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeButton {
    Record,
    Play,
    Clear,
    BeatSelect,
    SoundSelect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    PadHit(u8),
    Mode(ModeButton),
}

/// Classify a raw edge. Non-activating edges (releases) and out-of-range
/// pad lines produce nothing.
pub fn classify(tech: TriggerTech, event: EdgeEvent) -> Option<InputAction> {
    if event.edge != tech.activating_edge() {
        return None;
    }
    match event.line {
        Line::Pad(n) => (n < TRACK_COUNT as u8).then_some(InputAction::PadHit(n)),
        Line::Record => Some(InputAction::Mode(ModeButton::Record)),
        Line::Play => Some(InputAction::Mode(ModeButton::Play)),
        Line::Clear => Some(InputAction::Mode(ModeButton::Clear)),
        Line::BeatSelect => Some(InputAction::Mode(ModeButton::BeatSelect)),
        Line::SoundSelect => Some(InputAction::Mode(ModeButton::SoundSelect)),
    }
}

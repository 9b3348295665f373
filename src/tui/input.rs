use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::input::{Edge, EdgeEvent, Line, TriggerTech};

// Keyboard front end. Keys stand in for the physical lines:
//
//   1 2 3 4 5 6   pads
//   r             record toggle
//   p             play toggle
//   c             clear loop
//   b             classic beat select
//   s             sound select toggle
//   Esc           quit
//
// With keyboard-enhancement enabled we get real press/release events, so a
// key press becomes the technology's activating edge and the release the
// opposite one, the same stream a GPIO interrupt would deliver.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Edge(EdgeEvent),
    Quit,
}

pub fn poll_input(timeout: Duration, tech: TriggerTech) -> anyhow::Result<Vec<UiEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }
    if let Event::Key(key) = event::read()? {
        let edge = match key.kind {
            KeyEventKind::Press => tech.activating_edge(),
            KeyEventKind::Release => opposite(tech.activating_edge()),
            KeyEventKind::Repeat => return Ok(vec![]),
        };
        if key.code == KeyCode::Esc && key.kind == KeyEventKind::Press {
            return Ok(vec![UiEvent::Quit]);
        }
        if let Some(line) = key_line(key.code) {
            return Ok(vec![UiEvent::Edge(EdgeEvent { line, edge })]);
        }
    }
    Ok(vec![])
}

fn opposite(edge: Edge) -> Edge {
    match edge {
        Edge::Rise => Edge::Fall,
        Edge::Fall => Edge::Rise,
    }
}

fn key_line(code: KeyCode) -> Option<Line> {
    match code {
        KeyCode::Char(c @ '1'..='6') => Some(Line::Pad(c as u8 - b'1')),
        KeyCode::Char('r') => Some(Line::Record),
        KeyCode::Char('p') => Some(Line::Play),
        KeyCode::Char('c') => Some(Line::Clear),
        KeyCode::Char('b') => Some(Line::BeatSelect),
        KeyCode::Char('s') => Some(Line::SoundSelect),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_pads() {
        assert_eq!(key_line(KeyCode::Char('1')), Some(Line::Pad(0)));
        assert_eq!(key_line(KeyCode::Char('6')), Some(Line::Pad(5)));
        assert_eq!(key_line(KeyCode::Char('7')), None);
    }

    #[test]
    fn mode_keys_map_to_mode_lines() {
        assert_eq!(key_line(KeyCode::Char('r')), Some(Line::Record));
        assert_eq!(key_line(KeyCode::Char('s')), Some(Line::SoundSelect));
        assert_eq!(key_line(KeyCode::Char('x')), None);
    }
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::shared::{DisplayState, LedState, TRACK_COUNT};

const PAD_KEYS: [&str; TRACK_COUNT] = ["1", "2", "3", "4", "5", "6"];

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // mode + LEDs + loop info
            Constraint::Length(5), // pad row
            Constraint::Min(9),    // assignments + help
        ])
        .split(area);

    draw_status(frame, sections[0], state);
    draw_pads(frame, sections[1], state);
    draw_assignments(frame, sections[2], state);
}

fn led(label: &str, on: LedState) -> String {
    match on {
        LedState::On => format!("[● {label}]"),
        LedState::Off => format!("[  {label}]"),
    }
}

fn draw_status(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let loop_info = if state.loop_duration_ms > 0 {
        format!(
            "  loop {} ev  {}/{} ms",
            state.event_count, state.loop_pos_ms, state.loop_duration_ms
        )
    } else {
        format!("  loop {} ev", state.event_count)
    };
    let beat = state
        .beat_name
        .as_deref()
        .map(|n| format!("  beat: {n}"))
        .unwrap_or_default();
    let text = format!(
        " {}  {} {}{}{}",
        state.mode_label,
        led("REC", state.record_led),
        led("PLAY", state.play_led),
        loop_info,
        beat,
    );
    let block = Block::default().borders(Borders::ALL).title("padkit");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_pads(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, TRACK_COUNT as u32); TRACK_COUNT])
        .split(area);

    for (i, cell) in cols.iter().enumerate() {
        let lit = state.pads_lit[i];
        let targeted = state.select_cursor == Some(i as u8);
        let style = if lit {
            Style::default().fg(Color::Black).bg(Color::LightMagenta)
        } else if targeted {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(PAD_KEYS[i]);
        let label = if targeted { ">>" } else { "" };
        frame.render_widget(Paragraph::new(label).style(style).block(block), *cell);
    }
}

fn draw_assignments(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut lines: Vec<Line> = state
        .assignments
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cursor = if state.select_cursor == Some(i as u8) {
                ">"
            } else {
                " "
            };
            Line::from(format!("{cursor} pad {}: {name}", i + 1))
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(
        "1-6 pads   r record   p play   c clear   b beat   s sound select   esc quit",
    ));
    let block = Block::default().borders(Borders::ALL).title("sounds");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

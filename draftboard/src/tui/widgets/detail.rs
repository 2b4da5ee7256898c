// Player detail panel for the highlighted row.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::board::player::{InjuryStatus, Player};
use crate::tui::ViewState;

/// Labelled attributes shown under the header, in order.
const ATTRIBUTE_ROWS: [(&str, &str); 9] = [
    ("Projection", "proj"),
    ("ADP", "adp"),
    ("Consistency", "consistency_rating"),
    ("Ceiling", "ceiling_projection"),
    ("Floor", "floor_projection"),
    ("RZ Touches", "redzone_touches"),
    ("2024 Pts", "last_season_points"),
    ("SOS", "strength_of_schedule"),
    ("Age", "age"),
];

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Player");
    let lines = match state.selected_row() {
        Some(row) => detail_lines(&row.player),
        None => vec![Line::from(Span::styled(
            "No players to show",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

pub fn detail_lines(p: &Player) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let injury = p.injury();

    let mut lines = vec![
        Line::from(Span::styled(
            p.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} · {}", p.pos, p.team)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Tier: ", label),
            Span::raw(p.tier.map_or_else(|| "--".to_string(), |t| t.to_string())),
            Span::styled("   Bye: ", label),
            Span::raw(p.bye_week_label()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(injury.label().to_string(), Style::default().fg(injury_color(&injury))),
        ]),
        Line::from(vec![
            Span::styled("Score: ", label),
            Span::raw(format!("{:.1}", p.score)),
            Span::styled("   Confidence: ", label),
            Span::styled(
                format!("{}%", p.confidence()),
                Style::default().fg(confidence_color(p.confidence())),
            ),
        ]),
        Line::from(""),
    ];

    for (name, key) in ATTRIBUTE_ROWS {
        lines.push(Line::from(vec![
            Span::styled(format!("{name}: "), label),
            Span::raw(p.display_attr(key)),
        ]));
    }
    lines
}

/// Green from 85%, orange from 65%, red below.
pub fn confidence_color(level: u8) -> Color {
    match level {
        85.. => Color::Green,
        65..=84 => Color::Rgb(255, 165, 0),
        _ => Color::Red,
    }
}

pub fn injury_color(status: &InjuryStatus) -> Color {
    match status {
        InjuryStatus::Healthy => Color::Green,
        InjuryStatus::Questionable => Color::Yellow,
        InjuryStatus::Doubtful => Color::LightRed,
        InjuryStatus::Out => Color::Red,
        InjuryStatus::Other(_) => Color::Magenta,
    }
}

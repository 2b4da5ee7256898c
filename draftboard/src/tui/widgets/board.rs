// Board widget: ranked table of available players.
//
// Rank, Name, Pos, Team, Tier, Score, Proj, ADP. Rows still settling after a
// draft are drawn dimmed and struck through.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::board::player::Player;
use crate::tui::{BoardRow, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let header = Row::new(vec!["#", "Name", "Pos", "Team", "Tier", "Score", "Proj", "ADP"])
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let mut rank = 0;
    let rows: Vec<Row> = state
        .rows
        .iter()
        .map(|row| {
            let rank_label = if row.removing {
                "-".to_string()
            } else {
                rank += 1;
                rank.to_string()
            };
            board_row(row, rank_label)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(18),
        Constraint::Length(4),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title(state)))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !state.rows.is_empty() {
        table_state.select(Some(state.selected));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn board_row(row: &BoardRow, rank: String) -> Row<'static> {
    let p = &row.player;
    let style = if row.removing {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(tier_color(p.tier))
    };

    Row::new(vec![
        Cell::from(rank),
        Cell::from(p.name.clone()),
        Cell::from(p.pos.clone()),
        Cell::from(p.team.clone()),
        Cell::from(p.tier.map_or_else(|| "--".to_string(), |t| t.to_string())),
        Cell::from(format!("{:.1}", p.score)),
        Cell::from(format_number(p, "proj")),
        Cell::from(format_number(p, "adp")),
    ])
    .style(style)
}

/// One-decimal display of a numeric attribute, `--` when missing.
pub fn format_number(player: &Player, key: &str) -> String {
    player
        .number(key)
        .map_or_else(|| "--".to_string(), |v| format!("{v:.1}"))
}

pub fn tier_color(tier: Option<u32>) -> Color {
    match tier {
        Some(1) => Color::Green,
        Some(2) => Color::Cyan,
        Some(3) => Color::Yellow,
        Some(4) => Color::LightRed,
        _ => Color::White,
    }
}

fn title(state: &ViewState) -> String {
    let mut title = format!("Available [{}]", state.query.position_filter);
    if !state.query.search_text().is_empty() {
        title.push_str(&format!(" \"{}\"", state.query.search_text()));
    }
    title.push_str(&format!(" ({})", state.summary.remaining));
    title
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::player::PlayerId;
    use crate::tui::tests::{board, player};

    fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn format_number_handles_missing() {
        let p = player(1, "Alice", "QB", 90.0);
        assert_eq!(format_number(&p, "proj"), "15.5");
        assert_eq!(format_number(&p, "ceiling_projection"), "--");
    }

    #[test]
    fn tier_colors() {
        assert_eq!(tier_color(Some(1)), Color::Green);
        assert_eq!(tier_color(None), Color::White);
        assert_eq!(tier_color(Some(9)), Color::White);
    }

    #[test]
    fn renders_player_names() {
        let backend = ratatui::backend::TestBackend::new(90, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_board(board(
            vec![player(1, "Alice", "QB", 90.0), player(2, "Bob", "RB", 80.0)],
            vec![],
        ));

        terminal.draw(|frame| render(frame, frame.area(), &state)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Alice"));
        assert!(text.contains("Bob"));
        assert!(text.contains("Available [ALL]"));
    }

    #[test]
    fn settling_row_is_crossed_out() {
        let backend = ratatui::backend::TestBackend::new(90, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_board(board(
            vec![player(1, "Alice", "QB", 90.0), player(2, "Bob", "RB", 80.0)],
            vec![],
        ));
        state.apply_board(board(vec![player(2, "Bob", "RB", 80.0)], vec![PlayerId::Number(1)]));

        terminal.draw(|frame| render(frame, frame.area(), &state)).unwrap();
        let buffer = terminal.backend().buffer();
        let crossed = buffer
            .content()
            .iter()
            .any(|c| c.symbol() == "A" && c.modifier.contains(Modifier::CROSSED_OUT));
        assert!(crossed, "settling row should be crossed out");
    }

    #[test]
    fn render_empty_board_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(60, 8);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal.draw(|frame| render(frame, frame.area(), &state)).unwrap();
    }
}

// Status bar widget: counts, query, metrics, load time, notices.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::source::{format_updated, CatalogOrigin};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(status_spans(state)))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn status_spans(state: &ViewState) -> Vec<Span<'static>> {
    let sep = || Span::styled(" | ", Style::default().fg(Color::Gray));
    let mut spans = vec![
        Span::styled(
            format!(" {} remaining", state.summary.remaining),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(
            format!("{} drafted", state.summary.drafted),
            Style::default().fg(Color::White),
        ),
        sep(),
        Span::raw(format!("Pos: {}", state.query.position_filter)),
        sep(),
        Span::raw(format!("Sort: {}", state.query.sort_label())),
    ];

    if state.search_mode || !state.search_text.is_empty() {
        spans.push(sep());
        let cursor = if state.search_mode { "_" } else { "" };
        spans.push(Span::styled(
            format!("Search: {}{}", state.search_text, cursor),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(metrics) = &state.metrics_text {
        spans.push(sep());
        spans.push(Span::raw(metrics.clone()));
    }

    if let Some(at) = &state.updated_at {
        spans.push(sep());
        let mut text = format!("Updated {}", format_updated(at));
        if let Some(origin) = state.origin.filter(|o| *o != CatalogOrigin::Primary) {
            text.push_str(&format!(" ({})", origin.label()));
        }
        spans.push(Span::styled(text, Style::default().fg(origin_color(state.origin))));
    }

    if let Some(notice) = &state.notice {
        spans.push(sep());
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    spans
}

fn origin_color(origin: Option<CatalogOrigin>) -> Color {
    match origin {
        Some(CatalogOrigin::Primary) | None => Color::Gray,
        Some(CatalogOrigin::Cache) => Color::Yellow,
        Some(CatalogOrigin::Empty) => Color::Red,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn text(state: &ViewState) -> String {
        status_spans(state)
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn default_state_shows_counts_and_query() {
        let state = ViewState::default();
        assert_eq!(text(&state), " 0 remaining | 0 drafted | Pos: ALL | Sort: Score ↓");
    }

    #[test]
    fn shows_search_metrics_and_notice() {
        let mut state = ViewState::default();
        state.search_text = "bob".into();
        state.metrics_text = Some("Ensemble RMSE: 4.01".into());
        state.notice = Some("Nothing to undo".into());
        let t = text(&state);
        assert!(t.contains("Search: bob"));
        assert!(t.contains("Ensemble RMSE: 4.01"));
        assert!(t.ends_with("Nothing to undo"));
    }

    #[test]
    fn search_mode_shows_cursor() {
        let mut state = ViewState::default();
        state.search_mode = true;
        assert!(text(&state).contains("Search: _"));
    }

    #[test]
    fn cached_origin_is_flagged() {
        let mut state = ViewState::default();
        state.updated_at = Local.with_ymd_and_hms(2024, 9, 1, 15, 7, 0).single();
        state.origin = Some(CatalogOrigin::Primary);
        assert!(text(&state).contains("Updated 3:07 PM"));
        assert!(!text(&state).contains("(live)"));

        state.origin = Some(CatalogOrigin::Cache);
        assert!(text(&state).contains("Updated 3:07 PM (cached)"));
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}

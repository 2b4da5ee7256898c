// Terminal UI: board table, player detail, status bar.
//
// The TUI keeps a `ViewState` mirroring the last board the app published.
// `UiUpdate` messages are applied as they arrive and the screen is redrawn at
// ~30 fps. Key presses become `UserCommand`s for the app loop.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::board::player::Player;
use crate::board::query::ViewQuery;
use crate::board::session::{BoardView, Summary};
use crate::protocol::{UiUpdate, UserCommand};
use crate::source::CatalogOrigin;

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// One row of the board as drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    pub player: Player,
    /// Drafted and waiting for its removal delay to pass.
    pub removing: bool,
}

/// TUI-local state, updated from `UiUpdate`s and key presses.
#[derive(Debug, Default)]
pub struct ViewState {
    pub rows: Vec<BoardRow>,
    pub summary: Summary,
    pub query: ViewQuery,
    pub can_undo: bool,
    /// Index into `rows` of the highlighted player.
    pub selected: usize,
    /// Whether keystrokes are going into the search box.
    pub search_mode: bool,
    pub search_text: String,
    /// Waiting for y/n after pressing `R`.
    pub confirm_reset: bool,
    pub origin: Option<CatalogOrigin>,
    pub updated_at: Option<DateTime<Local>>,
    pub metrics_text: Option<String>,
    pub notice: Option<String>,
}

impl ViewState {
    /// Replace the board, keeping rows that are still settling visible (dimmed)
    /// at their previous position. A settling row that no longer matches the
    /// position filter or search is dropped at once.
    pub fn apply_board(&mut self, board: BoardView) {
        let mut rows: Vec<BoardRow> = board
            .players
            .into_iter()
            .map(|player| BoardRow {
                player,
                removing: false,
            })
            .collect();

        for (old_idx, old) in self.rows.iter().enumerate() {
            let settling = board.removing.contains(&old.player.id);
            let still_listed = rows.iter().any(|r| r.player.id == old.player.id);
            if settling && !still_listed && matches_query(&old.player, &board.query) {
                let at = old_idx.min(rows.len());
                rows.insert(
                    at,
                    BoardRow {
                        player: old.player.clone(),
                        removing: true,
                    },
                );
            }
        }

        self.rows = rows;
        self.summary = board.summary;
        self.query = board.query;
        self.can_undo = board.can_undo;
        self.clamp_selection();
    }

    pub fn selected_row(&self) -> Option<&BoardRow> {
        self.rows.get(self.selected)
    }

    pub fn select_next(&mut self, step: usize) {
        self.selected = self.selected.saturating_add(step);
        self.clamp_selection();
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}

fn matches_query(player: &Player, query: &ViewQuery) -> bool {
    let search = query.search_text();
    query.position_filter.matches(&player.pos)
        && (search.is_empty() || player.name.to_lowercase().contains(search))
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Board(board) => state.apply_board(*board),
        UiUpdate::Loaded { origin, at } => {
            state.origin = Some(origin);
            state.updated_at = Some(at);
        }
        UiUpdate::Metrics(rmse) => {
            state.metrics_text = Some(crate::metrics::format_rmse(rmse));
        }
        UiUpdate::Notice(text) => state.notice = Some(text),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::board::render(frame, layout.board, state);
    widgets::detail::render(frame, layout.detail, state);
    render_help_bar(frame, &layout, state);
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let text = if state.confirm_reset {
        " Reset the whole board? y:Yes  n:No"
    } else if state.search_mode {
        " Type to search | Enter:Keep | Esc:Clear"
    } else {
        " j/k:Move | x:Draft | u:Undo | /:Search | p:Pos | s/S:Sort | a:Asc/Desc | R:Reset | q:Quit"
    };
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI until the user quits or the app loop goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal before the default panic output.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::board::player::PlayerId;
    use crate::board::query::PositionFilter;
    use serde_json::json;

    pub(crate) fn player(id: i64, name: &str, pos: &str, score: f64) -> Player {
        serde_json::from_value(json!({
            "id": id, "name": name, "team": "KC", "pos": pos, "score": score,
            "tier": 2, "proj": 15.5, "adp": 12.0, "injury": "Questionable"
        }))
        .unwrap()
    }

    pub(crate) fn board(players: Vec<Player>, removing: Vec<PlayerId>) -> BoardView {
        BoardView {
            summary: Summary {
                remaining: players.len(),
                drafted: removing.len(),
            },
            players,
            query: ViewQuery::default(),
            removing,
            can_undo: false,
        }
    }

    fn row_names(state: &ViewState) -> Vec<(&str, bool)> {
        state
            .rows
            .iter()
            .map(|r| (r.player.name.as_str(), r.removing))
            .collect()
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.rows.is_empty());
        assert_eq!(state.selected, 0);
        assert!(!state.search_mode);
        assert!(state.notice.is_none());
        assert!(state.selected_row().is_none());
    }

    #[test]
    fn settling_row_stays_in_place_dimmed() {
        let a = player(1, "Alice", "QB", 90.0);
        let b = player(2, "Bob", "RB", 80.0);
        let c = player(3, "Cam", "WR", 70.0);
        let mut state = ViewState::default();
        state.apply_board(board(vec![a.clone(), b.clone(), c.clone()], vec![]));

        state.apply_board(board(vec![a.clone(), c.clone()], vec![PlayerId::Number(2)]));
        assert_eq!(
            row_names(&state),
            vec![("Alice", false), ("Bob", true), ("Cam", false)]
        );

        state.apply_board(board(vec![a, c], vec![]));
        assert_eq!(row_names(&state), vec![("Alice", false), ("Cam", false)]);
    }

    #[test]
    fn settling_row_outside_new_filter_is_dropped() {
        let a = player(1, "Alice", "QB", 90.0);
        let b = player(2, "Bob", "RB", 80.0);
        let mut state = ViewState::default();
        state.apply_board(board(vec![a.clone(), b.clone()], vec![]));
        state.apply_board(board(vec![a.clone()], vec![PlayerId::Number(2)]));
        assert_eq!(row_names(&state), vec![("Alice", false), ("Bob", true)]);

        // Switched to QBs while Bob is still settling.
        let mut qbs = board(vec![a.clone()], vec![PlayerId::Number(2)]);
        qbs.query = ViewQuery::default().with_position(PositionFilter::Only("QB".into()));
        state.apply_board(qbs);
        assert_eq!(row_names(&state), vec![("Alice", false)]);
    }

    #[test]
    fn settling_row_outside_new_search_is_dropped() {
        let a = player(1, "Alice", "QB", 90.0);
        let b = player(2, "Bob", "RB", 80.0);
        let mut state = ViewState::default();
        state.apply_board(board(vec![a.clone(), b], vec![]));

        let mut searched = board(vec![a], vec![PlayerId::Number(2)]);
        searched.query = ViewQuery::default().with_search("ali");
        state.apply_board(searched);
        assert_eq!(row_names(&state), vec![("Alice", false)]);
    }

    #[test]
    fn selection_is_clamped_when_rows_shrink() {
        let mut state = ViewState::default();
        state.apply_board(board(
            vec![player(1, "A", "QB", 3.0), player(2, "B", "QB", 2.0), player(3, "C", "QB", 1.0)],
            vec![],
        ));
        state.select_next(10);
        assert_eq!(state.selected, 2);

        state.apply_board(board(vec![player(1, "A", "QB", 3.0)], vec![]));
        assert_eq!(state.selected, 0);
        state.select_prev(5);
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn apply_ui_update_loaded_and_metrics() {
        let mut state = ViewState::default();
        let at = Local::now();
        apply_ui_update(
            &mut state,
            UiUpdate::Loaded {
                origin: CatalogOrigin::Cache,
                at,
            },
        );
        apply_ui_update(&mut state, UiUpdate::Metrics(3.456));
        assert_eq!(state.origin, Some(CatalogOrigin::Cache));
        assert_eq!(state.updated_at, Some(at));
        assert_eq!(state.metrics_text.as_deref(), Some("Ensemble RMSE: 3.46"));
    }

    #[test]
    fn apply_ui_update_notice() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Notice("Nothing to undo".into()));
        assert_eq!(state.notice.as_deref(), Some("Nothing to undo"));
    }

    #[test]
    fn render_frame_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(120, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.apply_board(board(vec![player(1, "Alice", "QB", 90.0)], vec![]));
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        state.confirm_reset = true;
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    }
}

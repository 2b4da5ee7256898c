// App orchestrator: owns the draft session and turns user commands into
// board updates for the TUI.
//
// All state changes happen inside `run`, one message at a time. Removal
// timers run as spawned tasks and report back through an internal channel.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::player::PlayerId;
use crate::board::session::{BoardView, DraftOutcome, DraftSession, Renderer};
use crate::protocol::{UiUpdate, UserCommand};

/// Events generated inside the app task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A drafted row's removal delay elapsed. `generation` ties the event to
    /// the draft that started it, so timers from an undone draft are ignored.
    Settle { id: PlayerId, generation: u64 },
}

// ---------------------------------------------------------------------------
// ChannelRenderer
// ---------------------------------------------------------------------------

/// Renderer that forwards boards to the TUI over its update channel.
///
/// `render` only keeps the latest board; `flush` delivers it, waiting for
/// room in the channel so a busy TUI never misses a mutation.
pub struct ChannelRenderer {
    tx: mpsc::Sender<UiUpdate>,
    pending: Option<BoardView>,
}

impl ChannelRenderer {
    pub fn new(tx: mpsc::Sender<UiUpdate>) -> Self {
        Self { tx, pending: None }
    }

    pub async fn flush(&mut self) {
        let Some(board) = self.pending.take() else {
            return;
        };
        if self.tx.send(UiUpdate::Board(Box::new(board))).await.is_err() {
            debug!("UI channel closed, board not delivered");
        }
    }
}

impl Renderer for ChannelRenderer {
    fn render(&mut self, board: &BoardView) {
        self.pending = Some(board.clone());
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: DraftSession,
    pub removal_delay: Duration,
    /// Latest settle generation per in-flight id.
    pending_settles: HashMap<PlayerId, u64>,
    next_generation: u64,
}

impl AppState {
    pub fn new(session: DraftSession, removal_delay: Duration) -> Self {
        AppState {
            session,
            removal_delay,
            pending_settles: HashMap::new(),
            next_generation: 0,
        }
    }

    fn player_name(&self, id: &PlayerId) -> String {
        self.session
            .catalog()
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Run the app loop until the TUI quits or drops its command sender.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(64);
    let mut renderer = ChannelRenderer::new(ui_tx.clone());

    state.session.publish(&mut renderer);
    renderer.flush().await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &mut renderer, &ui_tx, &event_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            Some(event) = event_rx.recv() => {
                handle_app_event(&mut state, event, &mut renderer).await;
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    renderer: &mut ChannelRenderer,
    ui_tx: &mpsc::Sender<UiUpdate>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match cmd {
        UserCommand::SetPositionFilter(filter) => {
            debug!("Position filter: {}", filter);
            state.session.set_position_filter(filter);
        }
        UserCommand::SetSearchText(text) => {
            state.session.set_search_text(&text);
        }
        UserCommand::SetSort {
            primary,
            secondary,
            ascending,
        } => {
            state.session.set_sort(primary, secondary, ascending);
            debug!("Sort: {}", state.session.query().sort_label());
        }
        UserCommand::RequestDraft(id) => match state.session.request_draft(&id) {
            DraftOutcome::Committed => {
                let notice = format!("Drafted {}", state.player_name(&id));
                let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                schedule_settle(state, id, event_tx);
            }
            DraftOutcome::InFlight => return,
            DraftOutcome::AlreadyDrafted => {
                let notice = format!("{} is already drafted", state.player_name(&id));
                let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                return;
            }
            DraftOutcome::UnknownPlayer => {
                let _ = ui_tx
                    .send(UiUpdate::Notice(format!("Unknown player {id}")))
                    .await;
                return;
            }
        },
        UserCommand::RequestUndo => match state.session.request_undo() {
            Some(id) => {
                state.pending_settles.remove(&id);
                let notice = format!("Restored {}", state.player_name(&id));
                let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
            }
            None => {
                let _ = ui_tx
                    .send(UiUpdate::Notice("Nothing to undo".to_string()))
                    .await;
                return;
            }
        },
        UserCommand::ResetBoard => {
            state.session.reset();
            state.pending_settles.clear();
            let _ = ui_tx.send(UiUpdate::Notice("Board reset".to_string())).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
            return;
        }
    }

    state.session.publish(renderer);
    renderer.flush().await;
}

/// Start the removal timer for a freshly drafted id, or settle at once when
/// there is no delay.
fn schedule_settle(state: &mut AppState, id: PlayerId, event_tx: &mpsc::Sender<AppEvent>) {
    if state.removal_delay.is_zero() {
        state.session.settle(&id);
        return;
    }

    state.next_generation += 1;
    let generation = state.next_generation;
    state.pending_settles.insert(id.clone(), generation);

    let delay = state.removal_delay;
    let tx = event_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx.send(AppEvent::Settle { id, generation }).await.is_err() {
            debug!("App loop gone before removal settled");
        }
    });
}

async fn handle_app_event(state: &mut AppState, event: AppEvent, renderer: &mut ChannelRenderer) {
    match event {
        AppEvent::Settle { id, generation } => {
            if state.pending_settles.get(&id) != Some(&generation) {
                debug!("Ignoring stale settle for {} (generation {})", id, generation);
                return;
            }
            state.pending_settles.remove(&id);
            if state.session.settle(&id) {
                state.session.publish(renderer);
                renderer.flush().await;
            } else {
                warn!("Settle for {} found nothing in flight", id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::catalog::PlayerCatalog;
    use crate::board::query::{PositionFilter, SortKey};
    use crate::db::{MemoryStore, StateStore, DRAFTED_KEY};
    use serde_json::json;
    use std::sync::Arc;

    fn catalog() -> PlayerCatalog {
        PlayerCatalog::load(&json!([
            {"id": 1, "name": "Alice", "team": "KC", "pos": "QB", "score": 90},
            {"id": 2, "name": "Bob", "team": "SF", "pos": "RB", "score": 80},
            {"id": 3, "name": "Cam", "team": "NO", "pos": "WR", "score": 70},
        ]))
        .unwrap()
    }

    struct Harness {
        cmd_tx: mpsc::Sender<UserCommand>,
        ui_rx: mpsc::Receiver<UiUpdate>,
        store: Arc<MemoryStore>,
        handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    }

    fn start(delay: Duration) -> Harness {
        start_with_capacity(delay, 64)
    }

    fn start_with_capacity(delay: Duration, ui_capacity: usize) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let session = DraftSession::new(catalog(), Box::new(store.clone()));
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(ui_capacity);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, AppState::new(session, delay)));
        Harness {
            cmd_tx,
            ui_rx,
            store,
            handle,
        }
    }

    async fn next_board(rx: &mut mpsc::Receiver<UiUpdate>) -> BoardView {
        loop {
            match rx.recv().await.expect("ui channel closed") {
                UiUpdate::Board(board) => return *board,
                _ => continue,
            }
        }
    }

    async fn next_notice(rx: &mut mpsc::Receiver<UiUpdate>) -> String {
        loop {
            match rx.recv().await.expect("ui channel closed") {
                UiUpdate::Notice(text) => return text,
                _ => continue,
            }
        }
    }

    fn names(board: &BoardView) -> Vec<&str> {
        board.players.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn publishes_initial_board() {
        let mut h = start(Duration::ZERO);
        let board = next_board(&mut h.ui_rx).await;
        assert_eq!(names(&board), vec!["Alice", "Bob", "Cam"]);
        assert_eq!(board.summary.remaining, 3);
    }

    #[tokio::test]
    async fn draft_and_undo_round_trip() {
        let mut h = start(Duration::ZERO);
        next_board(&mut h.ui_rx).await;

        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(1))).await.unwrap();
        assert_eq!(next_notice(&mut h.ui_rx).await, "Drafted Alice");
        let board = next_board(&mut h.ui_rx).await;
        assert_eq!(names(&board), vec!["Bob", "Cam"]);
        assert_eq!(board.summary.drafted, 1);
        assert!(board.removing.is_empty());
        assert_eq!(h.store.load_state(DRAFTED_KEY).unwrap(), Some(json!([1])));

        h.cmd_tx.send(UserCommand::RequestUndo).await.unwrap();
        assert_eq!(next_notice(&mut h.ui_rx).await, "Restored Alice");
        let board = next_board(&mut h.ui_rx).await;
        assert_eq!(names(&board), vec!["Alice", "Bob", "Cam"]);
        assert_eq!(board.summary.drafted, 0);
    }

    #[tokio::test]
    async fn undo_with_nothing_drafted_reports_it() {
        let mut h = start(Duration::ZERO);
        next_board(&mut h.ui_rx).await;
        h.cmd_tx.send(UserCommand::RequestUndo).await.unwrap();
        assert_eq!(next_notice(&mut h.ui_rx).await, "Nothing to undo");
    }

    #[tokio::test]
    async fn query_commands_republish() {
        let mut h = start(Duration::ZERO);
        next_board(&mut h.ui_rx).await;

        h.cmd_tx
            .send(UserCommand::SetPositionFilter(PositionFilter::Only("RB".into())))
            .await
            .unwrap();
        assert_eq!(names(&next_board(&mut h.ui_rx).await), vec!["Bob"]);

        h.cmd_tx
            .send(UserCommand::SetPositionFilter(PositionFilter::All))
            .await
            .unwrap();
        next_board(&mut h.ui_rx).await;

        h.cmd_tx
            .send(UserCommand::SetSort {
                primary: SortKey::Name,
                secondary: None,
                ascending: false,
            })
            .await
            .unwrap();
        assert_eq!(names(&next_board(&mut h.ui_rx).await), vec!["Cam", "Bob", "Alice"]);

        h.cmd_tx.send(UserCommand::SetSearchText("A".into())).await.unwrap();
        assert_eq!(names(&next_board(&mut h.ui_rx).await), vec!["Cam", "Alice"]);
    }

    #[tokio::test(start_paused = true)]
    async fn drafted_row_settles_after_delay() {
        let mut h = start(Duration::from_millis(300));
        next_board(&mut h.ui_rx).await;

        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(2))).await.unwrap();
        let board = next_board(&mut h.ui_rx).await;
        assert_eq!(board.removing, vec![PlayerId::Number(2)]);

        // A second draft of the same player while it settles is ignored.
        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(2))).await.unwrap();

        let board = next_board(&mut h.ui_rx).await;
        assert!(board.removing.is_empty());
        assert_eq!(board.summary.drafted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn undo_cancels_pending_settle() {
        let mut h = start(Duration::from_millis(300));
        next_board(&mut h.ui_rx).await;

        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(3))).await.unwrap();
        next_board(&mut h.ui_rx).await;
        h.cmd_tx.send(UserCommand::RequestUndo).await.unwrap();
        let board = next_board(&mut h.ui_rx).await;
        assert!(board.removing.is_empty());
        assert_eq!(board.summary.drafted, 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        // The stale timer produced no further board.
        assert!(h.ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_clears_drafts() {
        let mut h = start(Duration::ZERO);
        next_board(&mut h.ui_rx).await;
        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(1))).await.unwrap();
        next_board(&mut h.ui_rx).await;

        h.cmd_tx.send(UserCommand::ResetBoard).await.unwrap();
        assert_eq!(next_notice(&mut h.ui_rx).await, "Board reset");
        let board = next_board(&mut h.ui_rx).await;
        assert_eq!(board.summary.drafted, 0);
        assert!(h.store.load_state(DRAFTED_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let h = start(Duration::ZERO);
        h.cmd_tx.send(UserCommand::Quit).await.unwrap();
        assert!(h.handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn closed_command_channel_stops_the_loop() {
        let h = start(Duration::ZERO);
        drop(h.cmd_tx);
        assert!(h.handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn slow_ui_still_gets_every_board() {
        let mut h = start_with_capacity(Duration::ZERO, 2);
        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(1))).await.unwrap();
        h.cmd_tx.send(UserCommand::RequestDraft(PlayerId::Number(2))).await.unwrap();
        h.cmd_tx.send(UserCommand::Quit).await.unwrap();

        // Let the app run into the full channel before the UI starts reading.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let mut boards = Vec::new();
        let mut notices = Vec::new();
        while let Some(update) = h.ui_rx.recv().await {
            match update {
                UiUpdate::Board(board) => boards.push(names(&board).join(",")),
                UiUpdate::Notice(text) => notices.push(text),
                _ => {}
            }
        }
        h.handle.await.unwrap().unwrap();

        assert_eq!(boards, vec!["Alice,Bob,Cam", "Bob,Cam", "Cam"]);
        assert_eq!(notices, vec!["Drafted Alice", "Drafted Bob"]);
    }
}

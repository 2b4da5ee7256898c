// Messages passed between the app loop and the TUI.

use chrono::{DateTime, Local};

use crate::board::player::PlayerId;
use crate::board::query::{PositionFilter, SortKey};
use crate::board::session::BoardView;
use crate::source::CatalogOrigin;

/// Intents sent from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SetPositionFilter(PositionFilter),
    SetSearchText(String),
    SetSort {
        primary: SortKey,
        secondary: Option<SortKey>,
        ascending: bool,
    },
    RequestDraft(PlayerId),
    RequestUndo,
    ResetBoard,
    Quit,
}

/// Updates pushed from the app loop to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// A freshly computed board.
    Board(Box<BoardView>),
    /// Where the catalog came from and when it was loaded.
    Loaded {
        origin: CatalogOrigin,
        at: DateTime<Local>,
    },
    /// Mean model RMSE, once metrics have been fetched.
    Metrics(f64),
    /// Short-lived status line message.
    Notice(String),
}

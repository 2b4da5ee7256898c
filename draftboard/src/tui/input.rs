// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState changes (selection, search editing).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::board::query::SortKey;
use crate::protocol::UserCommand;

const PAGE_SIZE: usize = 20;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should reach the app loop and
/// `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports press and release on some platforms.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_reset {
        return handle_confirm_reset(key_event, view_state);
    }

    if view_state.search_mode {
        return handle_search_mode(key_event, view_state);
    }

    // Any fresh key press retires the last notice.
    view_state.notice = None;

    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.select_prev(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.select_next(1);
            None
        }
        KeyCode::PageUp => {
            view_state.select_prev(PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            view_state.select_next(PAGE_SIZE);
            None
        }
        KeyCode::Home | KeyCode::Char('g') => {
            view_state.selected = 0;
            None
        }
        KeyCode::End | KeyCode::Char('G') => {
            view_state.select_next(usize::MAX);
            None
        }

        KeyCode::Char('x') | KeyCode::Enter => {
            let row = view_state.selected_row()?;
            if row.removing {
                return None;
            }
            Some(UserCommand::RequestDraft(row.player.id.clone()))
        }
        KeyCode::Char('u') => Some(UserCommand::RequestUndo),

        KeyCode::Char('/') => {
            view_state.search_mode = true;
            None
        }
        KeyCode::Esc => {
            if view_state.search_text.is_empty() {
                return None;
            }
            view_state.search_text.clear();
            Some(UserCommand::SetSearchText(String::new()))
        }

        KeyCode::Char('p') => Some(UserCommand::SetPositionFilter(
            view_state.query.position_filter.next(),
        )),
        KeyCode::Char('s') => Some(UserCommand::SetSort {
            primary: view_state.query.primary_sort.next(),
            secondary: view_state.query.secondary_sort,
            ascending: view_state.query.ascending,
        }),
        KeyCode::Char('S') => Some(UserCommand::SetSort {
            primary: view_state.query.primary_sort,
            secondary: next_secondary(view_state.query.secondary_sort),
            ascending: view_state.query.ascending,
        }),
        KeyCode::Char('a') => Some(UserCommand::SetSort {
            primary: view_state.query.primary_sort,
            secondary: view_state.query.secondary_sort,
            ascending: !view_state.query.ascending,
        }),

        KeyCode::Char('R') => {
            view_state.confirm_reset = true;
            None
        }
        KeyCode::Char('q') => Some(UserCommand::Quit),

        _ => None,
    }
}

/// `y` resets, `n`/Esc cancels, everything else is swallowed.
fn handle_confirm_reset(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm_reset = false;
            Some(UserCommand::ResetBoard)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_reset = false;
            None
        }
        _ => None,
    }
}

/// Search box editing. Every edit is sent straight to the app so the board
/// narrows as you type.
fn handle_search_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.search_mode = false;
            view_state.search_text.clear();
            Some(UserCommand::SetSearchText(String::new()))
        }
        KeyCode::Enter => {
            view_state.search_mode = false;
            None
        }
        KeyCode::Backspace => {
            view_state.search_text.pop()?;
            Some(UserCommand::SetSearchText(view_state.search_text.clone()))
        }
        KeyCode::Char(c) => {
            view_state.search_text.push(c);
            Some(UserCommand::SetSearchText(view_state.search_text.clone()))
        }
        _ => None,
    }
}

/// None -> first sort key -> ... -> last sort key -> None
fn next_secondary(current: Option<SortKey>) -> Option<SortKey> {
    match current {
        None => Some(SortKey::ALL[0]),
        Some(key) => {
            let idx = SortKey::ALL.iter().position(|k| *k == key)?;
            SortKey::ALL.get(idx + 1).copied()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Draft session: owns the catalog, query, ledger and store, and turns user
// intents into board updates.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::catalog::PlayerCatalog;
use super::ledger::DraftLedger;
use super::player::{Player, PlayerId};
use super::query::{PositionFilter, SortKey, ViewQuery};
use super::view::compute_view;
use crate::db::{self, StateStore};

/// Remaining/drafted player counts shown above the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub remaining: usize,
    pub drafted: usize,
}

/// Everything a renderer needs to draw one frame of the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub players: Vec<Player>,
    pub summary: Summary,
    pub query: ViewQuery,
    /// Ids committed but still settling out of the visible list.
    pub removing: Vec<PlayerId>,
    pub can_undo: bool,
}

/// Anything that can draw a board.
pub trait Renderer {
    fn render(&mut self, board: &BoardView);
}

/// Result of a draft request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    Committed,
    AlreadyDrafted,
    /// A removal for this id is still settling.
    InFlight,
    UnknownPlayer,
}

pub struct DraftSession {
    catalog: PlayerCatalog,
    query: ViewQuery,
    ledger: DraftLedger,
    store: Box<dyn StateStore>,
    in_flight: HashSet<PlayerId>,
}

impl DraftSession {
    pub fn new(catalog: PlayerCatalog, store: Box<dyn StateStore>) -> Self {
        Self::with_query(catalog, store, ViewQuery::default())
    }

    pub fn with_query(catalog: PlayerCatalog, store: Box<dyn StateStore>, query: ViewQuery) -> Self {
        DraftSession {
            catalog,
            query,
            ledger: DraftLedger::new(),
            store,
            in_flight: HashSet::new(),
        }
    }

    pub fn catalog(&self) -> &PlayerCatalog {
        &self.catalog
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn ledger(&self) -> &DraftLedger {
        &self.ledger
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    // ------------------------------------------------------------------
    // Query intents
    // ------------------------------------------------------------------

    pub fn set_position_filter(&mut self, filter: PositionFilter) {
        self.query.position_filter = filter;
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.query.set_search_text(text);
    }

    pub fn set_sort(&mut self, primary: SortKey, secondary: Option<SortKey>, ascending: bool) {
        self.query.primary_sort = primary;
        self.query.secondary_sort = secondary;
        self.query.ascending = ascending;
    }

    // ------------------------------------------------------------------
    // Draft intents
    // ------------------------------------------------------------------

    /// Draft a player. A committed id stays in flight until [`settle`] is
    /// called for it.
    ///
    /// [`settle`]: DraftSession::settle
    pub fn request_draft(&mut self, id: &PlayerId) -> DraftOutcome {
        if self.in_flight.contains(id) {
            debug!("Draft of {} ignored: removal still settling", id);
            return DraftOutcome::InFlight;
        }
        if !self.catalog.contains(id) {
            warn!("Draft requested for unknown player {}", id);
            return DraftOutcome::UnknownPlayer;
        }
        if !self.ledger.commit(&mut self.catalog, id) {
            return DraftOutcome::AlreadyDrafted;
        }

        self.in_flight.insert(id.clone());
        info!("Drafted {} ({} drafted)", id, self.ledger.len());
        self.persist_drafted();
        DraftOutcome::Committed
    }

    /// Finish the removal of `id`. Returns whether it was in flight.
    pub fn settle(&mut self, id: &PlayerId) -> bool {
        self.in_flight.remove(id)
    }

    pub fn is_in_flight(&self, id: &PlayerId) -> bool {
        self.in_flight.contains(id)
    }

    /// Undo the latest draft. `None` means there was nothing to undo.
    pub fn request_undo(&mut self) -> Option<PlayerId> {
        let id = self.ledger.undo(&mut self.catalog)?;
        self.in_flight.remove(&id);
        info!("Undid draft of {} ({} drafted)", id, self.ledger.len());
        self.persist_drafted();
        Some(id)
    }

    /// Undraft everyone and forget the persisted drafted ids.
    pub fn reset(&mut self) {
        self.ledger.reset(&mut self.catalog);
        self.in_flight.clear();
        if let Err(e) = self.store.clear_board() {
            warn!("Failed to clear persisted board: {}", e);
        }
        info!("Board reset");
    }

    /// Restore drafted state from the store. Meant for startup only.
    ///
    /// Returns the number of ids restored. Read failures leave the board
    /// empty and are logged.
    pub fn rehydrate_from_store(&mut self) -> usize {
        let ids = match db::load_drafted_ids(self.store.as_ref()) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Failed to read drafted players, starting clean: {}", e);
                Vec::new()
            }
        };
        let requested = ids.len();
        self.ledger.rehydrate(&mut self.catalog, ids);
        self.in_flight.clear();
        if self.ledger.len() < requested {
            debug!(
                "Skipped {} persisted ids not present in the catalog",
                requested - self.ledger.len()
            );
        }
        self.ledger.len()
    }

    fn persist_drafted(&self) {
        if let Err(e) = db::save_drafted_ids(self.store.as_ref(), self.ledger.entries()) {
            warn!("Failed to persist drafted players: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn summary(&self) -> Summary {
        Summary {
            remaining: self.catalog.remaining_count(),
            drafted: self.catalog.drafted_count(),
        }
    }

    /// Compute the current board.
    pub fn board(&self) -> BoardView {
        let players = compute_view(&self.catalog, &self.query)
            .into_iter()
            .cloned()
            .collect();
        let mut removing: Vec<PlayerId> = self.in_flight.iter().cloned().collect();
        removing.sort();
        BoardView {
            players,
            summary: self.summary(),
            query: self.query.clone(),
            removing,
            can_undo: !self.ledger.is_empty(),
        }
    }

    pub fn publish<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.render(&self.board());
    }
}

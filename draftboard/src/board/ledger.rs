// Draft ledger: ordered history of drafted ids, used for undo.

use super::catalog::PlayerCatalog;
use super::player::PlayerId;

/// Drafted player ids in draft order (oldest first).
///
/// The ledger and the catalog's drafted flags move together: every id in the
/// ledger is drafted in the catalog, and a committed id appears exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftLedger {
    entries: Vec<PlayerId>,
}

impl DraftLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft `id`. Returns `false` without touching anything when the player
    /// is unknown or already drafted.
    pub fn commit(&mut self, catalog: &mut PlayerCatalog, id: &PlayerId) -> bool {
        if !catalog.mark_drafted(id) {
            return false;
        }
        self.entries.push(id.clone());
        true
    }

    /// Reverse the most recent draft. `None` when there is nothing to undo.
    pub fn undo(&mut self, catalog: &mut PlayerCatalog) -> Option<PlayerId> {
        let id = self.entries.pop()?;
        catalog.mark_undrafted(&id);
        Some(id)
    }

    /// Replace the ledger with `ids` (in order), marking each drafted.
    ///
    /// Ids the catalog does not know and repeats are skipped. Any previously
    /// drafted state is cleared first.
    pub fn rehydrate<I>(&mut self, catalog: &mut PlayerCatalog, ids: I)
    where
        I: IntoIterator<Item = PlayerId>,
    {
        catalog.clear_drafted();
        self.entries.clear();
        for id in ids {
            if catalog.mark_drafted(&id) {
                self.entries.push(id);
            }
        }
    }

    /// Drop every entry and undraft everyone.
    pub fn reset(&mut self, catalog: &mut PlayerCatalog) {
        catalog.clear_drafted();
        self.entries.clear();
    }

    pub fn entries(&self) -> &[PlayerId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&PlayerId> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> PlayerCatalog {
        PlayerCatalog::load(&json!([
            {"id": 1, "name": "Alice", "team": "KC", "pos": "QB", "score": 90},
            {"id": 2, "name": "Bob", "team": "SF", "pos": "RB", "score": 80},
            {"id": "x3", "name": "Cam", "team": "NO", "pos": "WR", "score": 70},
        ]))
        .unwrap()
    }

    #[test]
    fn commit_marks_and_appends() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        assert!(ledger.commit(&mut c, &PlayerId::Number(1)));
        assert!(c.is_drafted(&PlayerId::Number(1)));
        assert_eq!(ledger.entries(), &[PlayerId::Number(1)]);
    }

    #[test]
    fn commit_refuses_unknown_and_repeat() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        assert!(!ledger.commit(&mut c, &PlayerId::Number(42)));
        assert!(ledger.commit(&mut c, &PlayerId::Number(2)));
        assert!(!ledger.commit(&mut c, &PlayerId::Number(2)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn commit_then_undo_restores_state() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        ledger.commit(&mut c, &PlayerId::Number(1));
        let before_flags: Vec<bool> = c.all().map(|p| c.is_drafted(&p.id)).collect();
        let before_len = ledger.len();

        assert!(ledger.commit(&mut c, &PlayerId::from("x3")));
        assert_eq!(ledger.undo(&mut c), Some(PlayerId::from("x3")));

        let after_flags: Vec<bool> = c.all().map(|p| c.is_drafted(&p.id)).collect();
        assert_eq!(before_flags, after_flags);
        assert_eq!(ledger.len(), before_len);
    }

    #[test]
    fn undo_on_empty_is_noop() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        assert_eq!(ledger.undo(&mut c), None);
        assert_eq!(c.drafted_count(), 0);
    }

    #[test]
    fn undo_is_last_in_first_out() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        ledger.commit(&mut c, &PlayerId::Number(2));
        ledger.commit(&mut c, &PlayerId::Number(1));
        assert_eq!(ledger.undo(&mut c), Some(PlayerId::Number(1)));
        assert_eq!(ledger.undo(&mut c), Some(PlayerId::Number(2)));
        assert_eq!(ledger.undo(&mut c), None);
    }

    #[test]
    fn rehydrate_keeps_order_and_skips_unknown_and_repeats() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        ledger.rehydrate(
            &mut c,
            vec![
                PlayerId::from("x3"),
                PlayerId::Number(99),
                PlayerId::Number(1),
                PlayerId::from("x3"),
            ],
        );
        assert_eq!(ledger.entries(), &[PlayerId::from("x3"), PlayerId::Number(1)]);
        assert_eq!(c.drafted_count(), 2);
        assert_eq!(ledger.last(), Some(&PlayerId::Number(1)));
    }

    #[test]
    fn rehydrate_replaces_previous_contents() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        ledger.commit(&mut c, &PlayerId::Number(2));
        ledger.rehydrate(&mut c, vec![PlayerId::Number(1)]);
        assert!(!c.is_drafted(&PlayerId::Number(2)));
        assert_eq!(ledger.entries(), &[PlayerId::Number(1)]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut c = catalog();
        let mut ledger = DraftLedger::new();
        ledger.commit(&mut c, &PlayerId::Number(1));
        ledger.commit(&mut c, &PlayerId::Number(2));
        ledger.reset(&mut c);
        assert!(ledger.is_empty());
        assert_eq!(c.drafted_count(), 0);
    }
}

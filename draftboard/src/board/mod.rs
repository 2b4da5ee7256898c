// Board core: players, the view query, view computation, the draft ledger,
// and the session that ties them together.

pub mod catalog;
pub mod ledger;
pub mod player;
pub mod query;
pub mod session;
pub mod view;

pub use catalog::{LoadError, PlayerCatalog};
pub use ledger::DraftLedger;
pub use player::{InjuryStatus, Player, PlayerId, Position};
pub use query::{PositionFilter, SortKey, ViewQuery};
pub use session::{BoardView, DraftOutcome, DraftSession, Renderer, Summary};
pub use view::compute_view;

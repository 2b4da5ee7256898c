// View query: the position filter, search text, and sort criteria.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::Position;

// ---------------------------------------------------------------------------
// PositionFilter
// ---------------------------------------------------------------------------

/// Either every position or a single position code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionFilter {
    #[default]
    All,
    Only(String),
}

impl PositionFilter {
    /// Parse `"ALL"` (any case) or a position code. Codes are upper-cased.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("ALL") {
            PositionFilter::All
        } else {
            PositionFilter::Only(trimmed.to_uppercase())
        }
    }

    pub fn matches(&self, pos: &str) -> bool {
        match self {
            PositionFilter::All => true,
            PositionFilter::Only(code) => code == pos,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PositionFilter::All => "ALL",
            PositionFilter::Only(code) => code.as_str(),
        }
    }

    /// Next filter in the board's tab order: ALL, QB, RB, WR, TE, K, DST, ALL.
    pub fn next(&self) -> Self {
        let current = match self {
            PositionFilter::All => None,
            PositionFilter::Only(code) => Position::from_str_pos(code),
        };
        let idx = current.and_then(|pos| Position::ALL.iter().position(|p| *p == pos));
        match idx {
            None => PositionFilter::Only(Position::ALL[0].display_str().to_string()),
            Some(i) if i + 1 < Position::ALL.len() => {
                PositionFilter::Only(Position::ALL[i + 1].display_str().to_string())
            }
            Some(_) => PositionFilter::All,
        }
    }
}

impl fmt::Display for PositionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Player attributes the board can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Score,
    Name,
    Team,
    Position,
    Tier,
    Projection,
    Adp,
    Consistency,
    Ceiling,
    Floor,
    RedzoneTouches,
    LastSeasonPoints,
    StrengthOfSchedule,
    Age,
    ByeWeek,
}

impl SortKey {
    /// Cycle order used by the sort selector.
    pub const ALL: [SortKey; 15] = [
        SortKey::Score,
        SortKey::Projection,
        SortKey::Adp,
        SortKey::Tier,
        SortKey::Consistency,
        SortKey::Ceiling,
        SortKey::Floor,
        SortKey::RedzoneTouches,
        SortKey::LastSeasonPoints,
        SortKey::StrengthOfSchedule,
        SortKey::Age,
        SortKey::ByeWeek,
        SortKey::Name,
        SortKey::Team,
        SortKey::Position,
    ];

    /// The record key this sort reads.
    pub fn field_name(&self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::Name => "name",
            SortKey::Team => "team",
            SortKey::Position => "pos",
            SortKey::Tier => "tier",
            SortKey::Projection => "proj",
            SortKey::Adp => "adp",
            SortKey::Consistency => "consistency_rating",
            SortKey::Ceiling => "ceiling_projection",
            SortKey::Floor => "floor_projection",
            SortKey::RedzoneTouches => "redzone_touches",
            SortKey::LastSeasonPoints => "last_season_points",
            SortKey::StrengthOfSchedule => "strength_of_schedule",
            SortKey::Age => "age",
            SortKey::ByeWeek => "bye_week",
        }
    }

    pub fn from_field(s: &str) -> Option<Self> {
        let s = s.trim();
        SortKey::ALL
            .iter()
            .copied()
            .find(|k| k.field_name().eq_ignore_ascii_case(s))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Score => "Score",
            SortKey::Name => "Name",
            SortKey::Team => "Team",
            SortKey::Position => "Pos",
            SortKey::Tier => "Tier",
            SortKey::Projection => "Proj",
            SortKey::Adp => "ADP",
            SortKey::Consistency => "Consistency",
            SortKey::Ceiling => "Ceiling",
            SortKey::Floor => "Floor",
            SortKey::RedzoneTouches => "RZ Touches",
            SortKey::LastSeasonPoints => "2024 Pts",
            SortKey::StrengthOfSchedule => "SOS",
            SortKey::Age => "Age",
            SortKey::ByeWeek => "Bye",
        }
    }

    pub fn next(&self) -> Self {
        let idx = SortKey::ALL.iter().position(|k| k == self).unwrap_or(0);
        SortKey::ALL[(idx + 1) % SortKey::ALL.len()]
    }
}

// ---------------------------------------------------------------------------
// ViewQuery
// ---------------------------------------------------------------------------

/// Current filter/search/sort criteria for the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub position_filter: PositionFilter,
    /// Always stored lower-cased.
    search_text: String,
    pub primary_sort: SortKey,
    pub secondary_sort: Option<SortKey>,
    pub ascending: bool,
}

impl Default for ViewQuery {
    fn default() -> Self {
        ViewQuery {
            position_filter: PositionFilter::All,
            search_text: String::new(),
            primary_sort: SortKey::Score,
            secondary_sort: None,
            ascending: false,
        }
    }
}

impl ViewQuery {
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.search_text = text.to_lowercase();
    }

    pub fn with_search(mut self, text: &str) -> Self {
        self.set_search_text(text);
        self
    }

    pub fn with_position(mut self, filter: PositionFilter) -> Self {
        self.position_filter = filter;
        self
    }

    pub fn with_sort(mut self, primary: SortKey, secondary: Option<SortKey>, ascending: bool) -> Self {
        self.primary_sort = primary;
        self.secondary_sort = secondary;
        self.ascending = ascending;
        self
    }

    /// Compact description for the status bar, e.g. `Score ↓ / ADP`.
    pub fn sort_label(&self) -> String {
        let arrow = if self.ascending { "↑" } else { "↓" };
        match self.secondary_sort {
            Some(second) => format!("{} {} / {}", self.primary_sort.label(), arrow, second.label()),
            None => format!("{} {}", self.primary_sort.label(), arrow),
        }
    }
}

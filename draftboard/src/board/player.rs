// Player records, identifiers, and position codes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Stable player identifier as delivered by the data source.
///
/// Projection feeds use either numeric ids or string ids (e.g. "4362628" or
/// "sleeper_1234"), so both shapes are accepted and round-trip unchanged
/// through persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Number(n) => write!(f, "{n}"),
            PlayerId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for PlayerId {
    fn from(n: i64) -> Self {
        PlayerId::Number(n)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Fantasy football position codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Kicker,
    Defense,
}

impl Position {
    /// Every position in board display order.
    pub const ALL: [Position; 6] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Kicker,
        Position::Defense,
    ];

    /// Parse a position code. "DEF" and "D/ST" are accepted for defenses.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" => Some(Position::Kicker),
            "DST" | "D/ST" | "DEF" => Some(Position::Defense),
            _ => None,
        }
    }

    /// The code as it appears in the data feed.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One athlete record from the projections feed.
///
/// Only the identifying fields and `score` are interpreted by the board; all
/// remaining keys (projection, ADP, ceiling, injury, ...) are kept verbatim in
/// `attributes` so new columns in the feed never break loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub pos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    pub score: f64,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Player {
    /// Raw display attribute by feed key. `null` counts as missing.
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    /// Numeric display attribute. Numeric strings (e.g. `"12.5"`) are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.attr(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Text display attribute.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    /// Display form of an attribute, `--` when missing.
    pub fn display_attr(&self, key: &str) -> String {
        match self.attr(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
            None => "--".to_string(),
        }
    }

    pub fn injury(&self) -> InjuryStatus {
        InjuryStatus::parse(self.text("injury"))
    }

    /// Bye week as shown on the board, `TBD` when unknown.
    pub fn bye_week_label(&self) -> String {
        match self.attr("bye_week") {
            Some(_) => self.display_attr("bye_week"),
            None => "TBD".to_string(),
        }
    }

    pub fn confidence(&self) -> u8 {
        confidence_level(self.score, self.tier)
    }
}

// ---------------------------------------------------------------------------
// Injury status
// ---------------------------------------------------------------------------

/// Injury designation reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjuryStatus {
    Healthy,
    Questionable,
    Doubtful,
    Out,
    /// Any other designation (IR, PUP, suspended...) kept verbatim.
    Other(String),
}

impl InjuryStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return InjuryStatus::Healthy;
        };
        match raw.to_lowercase().as_str() {
            "healthy" => InjuryStatus::Healthy,
            "questionable" => InjuryStatus::Questionable,
            "doubtful" => InjuryStatus::Doubtful,
            "out" => InjuryStatus::Out,
            _ => InjuryStatus::Other(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InjuryStatus::Healthy => "Healthy",
            InjuryStatus::Questionable => "Questionable",
            InjuryStatus::Doubtful => "Doubtful",
            InjuryStatus::Out => "Out",
            InjuryStatus::Other(s) => s.as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Model confidence (50..=95) derived from the ensemble score and tier.
///
/// Each tier has its own ceiling and slope around a tier-typical score; the
/// result never drops below 50.
pub fn confidence_level(score: f64, tier: Option<u32>) -> u8 {
    let raw = match tier {
        Some(1) => (85.0 + (score - 95.0) * 2.0).min(95.0),
        Some(2) => (80.0 + (score - 85.0) * 1.5).min(90.0),
        Some(3) => (75.0 + (score - 75.0) * 1.2).min(85.0),
        Some(4) => (70.0 + (score - 65.0)).min(80.0),
        _ => (60.0 + (score - 50.0) * 0.8).min(75.0),
    };
    raw.round().max(50.0) as u8
}

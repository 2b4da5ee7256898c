// View computation: filter -> search -> sort over the catalog.
//
// Pure functions only. The visible list is recomputed from scratch on every
// call; callers own any caching.

use std::cmp::Ordering;

use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::catalog::PlayerCatalog;
use super::player::Player;
use super::query::{SortKey, ViewQuery};

/// A single sort key's value for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

/// Read the value `key` names from a player.
pub fn sort_value(player: &Player, key: SortKey) -> SortValue<'_> {
    match key {
        SortKey::Score => SortValue::Number(player.score),
        SortKey::Name => SortValue::Text(&player.name),
        SortKey::Team => SortValue::Text(&player.team),
        SortKey::Position => SortValue::Text(&player.pos),
        SortKey::Tier => player
            .tier
            .map_or(SortValue::Missing, |t| SortValue::Number(f64::from(t))),
        other => match player.attr(other.field_name()) {
            Some(Value::Number(n)) => n.as_f64().map_or(SortValue::Missing, SortValue::Number),
            Some(Value::String(s)) => SortValue::Text(s),
            _ => SortValue::Missing,
        },
    }
}

/// Compare two values of one sort key.
///
/// Missing values sort first when ascending and last when descending.
/// Present values compare naturally and the result is reversed for
/// descending order.
pub fn compare_values(a: SortValue<'_>, b: SortValue<'_>, ascending: bool) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, _) => {
            if ascending {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (_, SortValue::Missing) => {
            if ascending {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (a, b) => {
            let ord = compare_present(a, b);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

fn compare_present(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (SortValue::Text(x), SortValue::Text(y)) => collate(x, y),
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Dictionary-style string ordering. Accents and case are ignored first, so
/// "Émile" files under E; ties then put unaccented before accented and
/// lower-case before upper-case.
pub fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Lower-case `s` and strip combining marks after canonical decomposition.
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two players under the query's primary and secondary keys.
pub fn compare_players(a: &Player, b: &Player, query: &ViewQuery) -> Ordering {
    let primary = compare_values(
        sort_value(a, query.primary_sort),
        sort_value(b, query.primary_sort),
        query.ascending,
    );
    match query.secondary_sort {
        Some(key) if primary == Ordering::Equal => {
            compare_values(sort_value(a, key), sort_value(b, key), query.ascending)
        }
        _ => primary,
    }
}

/// Compute the ordered list of visible players.
///
/// Drafted players, players outside the position filter, and players whose
/// lower-cased name does not contain the search text are dropped. The rest
/// are sorted with `sort_by`, which is stable, so players equal on every
/// active key keep their catalog order.
pub fn compute_view<'a>(catalog: &'a PlayerCatalog, query: &ViewQuery) -> Vec<&'a Player> {
    let search = query.search_text();
    let mut visible: Vec<&Player> = catalog
        .all()
        .filter(|p| !catalog.is_drafted(&p.id))
        .filter(|p| query.position_filter.matches(&p.pos))
        .filter(|p| search.is_empty() || p.name.to_lowercase().contains(search))
        .collect();

    visible.sort_by(|a, b| compare_players(a, b, query));
    visible
}

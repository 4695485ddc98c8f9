use std::collections::BTreeMap;

use super::domain::{DOMAINS, level_label};

/// Scores as returned by the backend, keyed by domain letter.
pub type ScoreMap = BTreeMap<String, i64>;

/// Shown in place of a level for domains the backend has not scored.
pub const PLACEHOLDER: &str = "—";

/// One rendered row of the score table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Renders the full score table.
///
/// Always returns one row per domain in `A`..`G` order, whatever subset of
/// keys `scores` holds. Keys outside the domain set are ignored.
pub fn score_rows(scores: &ScoreMap) -> Vec<ScoreRow> {
    DOMAINS
        .iter()
        .map(|domain| ScoreRow {
            key: domain.key,
            label: domain.label,
            value: scores.get(domain.key).map_or_else(
                || PLACEHOLDER.to_string(),
                |level| format!("{level} · {}", level_label(*level).unwrap_or("Unknown")),
            ),
        })
        .collect()
}

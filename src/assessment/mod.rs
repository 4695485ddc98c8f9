//! Assessment domain tables and panel rendering.
//!
//! The backend scores seven fixed competency domains on a 0-3 maturity
//! scale. Rendering never depends on which keys the backend returned: the
//! score table always has one row per domain, in key order.

mod domain;
mod report;
mod scoreboard;

pub use domain::{DOMAINS, Domain, LEVELS, level_label, print_domains};
pub use report::render_report;
pub use scoreboard::{PLACEHOLDER, ScoreMap, ScoreRow, score_rows};

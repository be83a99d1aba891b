//! # Ladder Pulse
//!
//! Ranking, snapshot-archival and keyset-pagination engine for a periodic
//! competitive-game ladder.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (teams, snapshots, league hierarchy)
//! - **storage**: Ordered in-memory tables with JSONL persistence
//! - **rank**: Full-season rank computation and population aggregation
//! - **archive**: Snapshot capture, tiered retention and compaction
//! - **period**: Fixed-bucket activity rollups
//! - **page**: Keyset pagination over the ranked ladder
//! - **service**: Constructor-wired facade with season-scoped job locks
//! - **config**: Configuration loading and validation

pub mod archive;
pub mod config;
pub mod models;
pub mod page;
pub mod period;
pub mod rank;
pub mod service;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "52w", "30d", "6h", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('w') {
        (n, 7 * 86400)
    } else if let Some(n) = s.strip_suffix('d') {
        (n, 86400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_weeks() {
        assert_eq!(parse_duration("2w"), Some(Duration::from_secs(1_209_600)));
    }

    #[test]
    fn test_parse_duration_days() {
        assert_eq!(parse_duration("30d"), Some(Duration::from_secs(2_592_000)));
    }

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("6h"), Some(Duration::from_secs(21600)));
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("30m"), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_parse_duration_default_seconds() {
        assert_eq!(parse_duration("120"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_parse_duration_empty() {
        assert_eq!(parse_duration(""), None);
    }
}

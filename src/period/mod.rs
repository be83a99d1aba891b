//! Fixed-bucket activity rollups.
//!
//! Consumes the team snapshot archive and produces one [`PeriodSnapshot`]
//! per (season, period, bucket start): distinct players, total games played,
//! and the delta against the previous existing bucket of the same series.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{AccountId, Period, PeriodSnapshot, SeasonId};
use crate::storage::LadderStore;

/// Create the period row for the bucket containing `now`, if it does not
/// exist yet. Returns the created row, or `None` when the slot was already
/// filled (the ledger is append-only).
///
/// Distinct players are deduplicated by account: one player on two teams
/// counts once. Games are summed over the latest snapshot of each team as of
/// the bucket start, across both snapshot tiers. The delta is taken against
/// the latest existing earlier bucket of the same (season, period) series; a
/// gap in the series does not corrupt it. No earlier bucket means a `None`
/// delta, which is "no prior data", not zero growth.
pub fn update_period_snapshot(
    store: &mut LadderStore,
    season: SeasonId,
    period: Period,
    now: DateTime<Utc>,
) -> Option<PeriodSnapshot> {
    let period_start = period.truncate(now);
    if store.period(season, period, period_start).is_some() {
        debug!(
            "Period snapshot for season {} {:?} @ {} already exists",
            season, period, period_start
        );
        return None;
    }

    let mut players: HashSet<AccountId> = HashSet::new();
    let mut games_played: u64 = 0;
    for team in store.season_teams(season) {
        if let Some(snapshot) = store.latest_snapshot_at(team.id, period_start) {
            games_played += u64::from(snapshot.games);
            players.extend(team.members.iter().copied());
        }
    }

    let games_since_previous = store
        .latest_period_before(season, period, period_start)
        .map(|previous| games_played as i64 - previous.games_played as i64);

    let row = PeriodSnapshot {
        season,
        period,
        period_start,
        player_count: players.len() as u32,
        games_played,
        games_since_previous,
    };
    store.insert_period(row.clone());
    info!(
        "Period snapshot: season {} {:?} @ {}: {} players, {} games ({:?} delta)",
        season, period, period_start, row.player_count, row.games_played, row.games_since_previous
    );
    Some(row)
}

/// The most recent period rows of a season with bucket start <= `to`,
/// oldest first.
pub fn find_period_summary(
    store: &LadderStore,
    season: SeasonId,
    period: Period,
    to: DateTime<Utc>,
    limit: usize,
) -> Vec<PeriodSnapshot> {
    store
        .periods_up_to(season, period, to, limit)
        .into_iter()
        .cloned()
        .collect()
}

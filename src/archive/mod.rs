//! Snapshot capture, tiered retention and compaction.
//!
//! Lifecycle of a team snapshot row:
//! 1. `take_snapshot` captures ranked teams into the main tier.
//! 2. `archive` moves rows older than the main retention depth into the
//!    archive tier.
//! 3. `clean_archive` downsamples each team's archived history to the rows
//!    that define the shape of its rating curve: earliest, latest, minimum
//!    and maximum rating of the window.
//! 4. `remove_expired` deletes rows past the absolute horizon, no
//!    exceptions.
//!
//! `run_maintenance` runs phases 2-4 in that order against a single `now`
//! cutoff, so one phase never archives a row another phase already decided
//! to delete.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::RetentionConfig;
use crate::models::{LeagueId, PopulationSnapshot, QueueType, TeamId, TeamSnapshot};
use crate::storage::{LadderStore, SnapshotTier, StorageError};

/// Outcome of one capture run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub captured: u32,
    /// Teams skipped for having no computed rank (or no rating).
    pub skipped_unranked: u32,
    /// Rows rejected by the (team id, timestamp) uniqueness constraint.
    pub duplicates: u32,
    /// Teams whose league had no population snapshot yet; captured with
    /// zero counts.
    pub missing_population: u32,
}

/// Outcome of one maintenance cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceSummary {
    pub archived: usize,
    pub compacted: usize,
    pub expired_main: usize,
    pub expired_archive: usize,
}

/// Capture a point-in-time snapshot of each listed team.
///
/// Teams without a computed rank produce no row. Each snapshot embeds the
/// current population counts of the team's league; a missing population
/// snapshot is a consistency gap, logged and captured as zero counts rather
/// than failing the batch. Duplicate (team id, timestamp) rows are skipped,
/// which makes repeated calls with the same `now` idempotent.
pub fn take_snapshot(
    store: &mut LadderStore,
    team_ids: &[TeamId],
    primary_queue: QueueType,
    now: DateTime<Utc>,
) -> CaptureSummary {
    let mut summary = CaptureSummary::default();

    for &team_id in team_ids {
        let Some(team) = store.team(team_id).cloned() else {
            debug!("Team {} not found, skipping snapshot", team_id);
            summary.skipped_unranked += 1;
            continue;
        };

        let population = match store
            .league_id(&team.league_bucket())
            .and_then(|league_id| store.population(league_id).copied())
        {
            Some(population) => population,
            None => {
                warn!(
                    "No population snapshot for team {}'s league; capturing zero counts",
                    team_id
                );
                summary.missing_population += 1;
                PopulationSnapshot::empty(LeagueId(0))
            }
        };

        let secondary = team.key.queue != primary_queue;
        let Some(snapshot) = TeamSnapshot::capture(&team, &population, now, secondary) else {
            summary.skipped_unranked += 1;
            continue;
        };

        match store.insert_snapshot(snapshot) {
            Ok(()) => summary.captured += 1,
            Err(StorageError::DuplicateSnapshot { .. }) => {
                debug!("Snapshot for team {} at {} already exists", team_id, now);
                summary.duplicates += 1;
            }
            Err(err) => {
                warn!("Failed to store snapshot for team {}: {}", team_id, err);
            }
        }
    }

    info!(
        "Captured {} snapshots ({} unranked, {} duplicates)",
        summary.captured, summary.skipped_unranked, summary.duplicates
    );
    summary
}

/// Move main-tier rows older than `cutoff` into the archive tier.
pub fn archive(store: &mut LadderStore, cutoff: DateTime<Utc>) -> usize {
    let keys = store.snapshot_keys_before(SnapshotTier::Main, cutoff);
    let moved = store.move_to_archive(&keys);
    info!("Archived {} snapshots older than {}", moved, cutoff);
    moved
}

/// Compact each team's archived history older than `cutoff`.
///
/// Min/max-preserving downsampling: per team, the window collapses to the
/// union of its earliest row, latest row, minimum-rating row and
/// maximum-rating row (ties resolved to the earliest timestamp). Everything
/// else is deleted. The deletions for the whole run are collected first and
/// applied at once, so a failure can never leave a window half-compacted.
pub fn clean_archive(store: &mut LadderStore, cutoff: DateTime<Utc>) -> usize {
    let mut to_delete: Vec<(TeamId, DateTime<Utc>)> = Vec::new();

    for team_id in store.archived_team_ids_before(cutoff) {
        let window = store.archived_team_window(team_id, cutoff);
        to_delete.extend(redundant_rows(&window));
    }

    let removed = store.remove_snapshots(SnapshotTier::Archive, &to_delete);
    info!("Compacted archive: removed {} redundant snapshots", removed);
    removed
}

/// Keys of the rows in one team's window that are safe to delete.
fn redundant_rows(window: &[&TeamSnapshot]) -> Vec<(TeamId, DateTime<Utc>)> {
    if window.len() <= 2 {
        return Vec::new();
    }

    // The window is in timestamp order, so first/last are the edges. min/max
    // scans pick the earliest row on rating ties.
    let first = window[0].timestamp;
    let last = window[window.len() - 1].timestamp;
    let min = window
        .iter()
        .min_by_key(|s| (s.rating, s.timestamp))
        .map(|s| s.timestamp);
    let max = window
        .iter()
        .max_by_key(|s| (s.rating, std::cmp::Reverse(s.timestamp)))
        .map(|s| s.timestamp);

    window
        .iter()
        .filter(|s| {
            let ts = s.timestamp;
            ts != first && ts != last && Some(ts) != min && Some(ts) != max
        })
        .map(|s| (s.team_id, s.timestamp))
        .collect()
}

/// Delete rows older than `horizon` from both tiers, extrema included.
pub fn remove_expired(store: &mut LadderStore, horizon: DateTime<Utc>) -> (usize, usize) {
    let main_keys = store.snapshot_keys_before(SnapshotTier::Main, horizon);
    let main_removed = store.remove_snapshots(SnapshotTier::Main, &main_keys);
    let archive_keys = store.snapshot_keys_before(SnapshotTier::Archive, horizon);
    let archive_removed = store.remove_snapshots(SnapshotTier::Archive, &archive_keys);
    info!(
        "Expired {} main / {} archived snapshots older than {}",
        main_removed, archive_removed, horizon
    );
    (main_removed, archive_removed)
}

/// One full maintenance cycle: archive, then compact, then expire, all
/// against the same `now`.
pub fn run_maintenance(
    store: &mut LadderStore,
    retention: &RetentionConfig,
    now: DateTime<Utc>,
) -> MaintenanceSummary {
    let mut summary = MaintenanceSummary::default();

    if let Some(main) = retention.main_duration() {
        summary.archived = archive(store, now - main);
    } else {
        warn!("Invalid main retention {:?}, skipping archive phase", retention.main);
    }
    if let Some(depth) = retention.archive_duration() {
        summary.compacted = clean_archive(store, now - depth);
    } else {
        warn!(
            "Invalid archive retention {:?}, skipping compaction phase",
            retention.archive
        );
    }
    if let Some(max) = retention.max_duration() {
        let (main_removed, archive_removed) = remove_expired(store, now - max);
        summary.expired_main = main_removed;
        summary.expired_archive = archive_removed;
    } else {
        warn!("Invalid max retention {:?}, skipping expiry phase", retention.max);
    }

    summary
}

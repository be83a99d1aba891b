//! The constructor-wired facade over the ranking, archival, period and
//! pagination components.
//!
//! Write-side batch jobs (rank recompute, snapshot capture, maintenance,
//! period rollup) are single-writer per season: each takes the season's
//! advisory lock so a recompute can never race a capture into reading
//! half-updated ranks. Jobs against different seasons run concurrently.
//! Read-side queries take only the shared store lock and never wait on the
//! advisory locks; a page may legitimately reflect ranks from a recompute in
//! progress.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::archive::{self, CaptureSummary, MaintenanceSummary};
use crate::config::AppConfig;
use crate::models::{Period, PeriodSnapshot, SeasonId, TeamId, TeamUpsert};
use crate::page::{self, Page, PageError, PageRequest};
use crate::period;
use crate::rank::{self, RankSummary};
use crate::storage::{LadderStore, StorageConfig, StorageError};

/// Errors surfaced by the service facade.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Pagination error: {0}")]
    Page(#[from] PageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("A lock was poisoned by a panicking writer")]
    LockPoisoned,
}

/// The ladder engine service.
pub struct LadderService {
    store: RwLock<LadderStore>,
    config: AppConfig,
    season_locks: Mutex<HashMap<SeasonId, Arc<Mutex<()>>>>,
    maintenance_lock: Mutex<()>,
}

impl LadderService {
    pub fn new(store: LadderStore, config: AppConfig) -> Self {
        Self {
            store: RwLock::new(store),
            config,
            season_locks: Mutex::new(HashMap::new()),
            maintenance_lock: Mutex::new(()),
        }
    }

    /// Load the store from the configured data directory.
    pub fn open(config: AppConfig) -> Result<Self, ServiceError> {
        let storage = StorageConfig::new(config.data_dir.clone());
        let store = LadderStore::load(&storage)?;
        Ok(Self::new(store, config))
    }

    /// Persist the store back to the configured data directory.
    pub fn persist(&self) -> Result<(), ServiceError> {
        let storage = StorageConfig::new(self.config.data_dir.clone());
        let store = self.store.read().map_err(|_| ServiceError::LockPoisoned)?;
        store.save(&storage)?;
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The advisory lock serializing write-side batch jobs for one season.
    fn season_lock(&self, season: SeasonId) -> Result<Arc<Mutex<()>>, ServiceError> {
        let mut locks = self
            .season_locks
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?;
        Ok(locks
            .entry(season)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    // ── Write-side operations ───────────────────────────────────

    /// Upsert one team from the ingestion stream. Keyed by the natural id
    /// tuple; never touches the derived rank fields.
    pub fn ingest_team(&self, upsert: TeamUpsert) -> Result<TeamId, ServiceError> {
        let mut store = self.store.write().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(store.upsert_team(upsert))
    }

    /// Full-season rank recompute plus the joint population upsert.
    pub fn compute_ranks(&self, season: SeasonId) -> Result<RankSummary, ServiceError> {
        let lock = self.season_lock(season)?;
        let _guard = lock.lock().map_err(|_| ServiceError::LockPoisoned)?;
        debug!("Season {} advisory lock acquired for rank recompute", season);
        let mut store = self.store.write().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(rank::compute_ranks(&mut store, season))
    }

    /// Capture snapshots for the listed teams of a season.
    pub fn take_snapshot(
        &self,
        season: SeasonId,
        team_ids: &[TeamId],
        now: DateTime<Utc>,
    ) -> Result<CaptureSummary, ServiceError> {
        let lock = self.season_lock(season)?;
        let _guard = lock.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let mut store = self.store.write().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(archive::take_snapshot(
            &mut store,
            team_ids,
            self.config.primary_queue,
            now,
        ))
    }

    /// Capture snapshots for every team of a season.
    pub fn snapshot_season(
        &self,
        season: SeasonId,
        now: DateTime<Utc>,
    ) -> Result<CaptureSummary, ServiceError> {
        let team_ids: Vec<TeamId> = {
            let store = self.store.read().map_err(|_| ServiceError::LockPoisoned)?;
            store.season_teams(season).iter().map(|t| t.id).collect()
        };
        self.take_snapshot(season, &team_ids, now)
    }

    /// One archive → compact → expire cycle against a single `now`.
    pub fn run_maintenance(&self, now: DateTime<Utc>) -> Result<MaintenanceSummary, ServiceError> {
        let _guard = self
            .maintenance_lock
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?;
        let mut store = self.store.write().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(archive::run_maintenance(
            &mut store,
            &self.config.retention,
            now,
        ))
    }

    /// Create the period row for the bucket containing `now`, if absent.
    pub fn update_period_snapshot(
        &self,
        season: SeasonId,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<Option<PeriodSnapshot>, ServiceError> {
        let lock = self.season_lock(season)?;
        let _guard = lock.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let mut store = self.store.write().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(period::update_period_snapshot(&mut store, season, period, now))
    }

    // ── Read-side operations ────────────────────────────────────

    /// Keyset-paginated slice of the ranked set. Lock-free with respect to
    /// the season advisory locks.
    pub fn find_page(&self, request: &PageRequest) -> Result<Page, ServiceError> {
        let store = self.store.read().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(page::find_page(&store, &self.config.pagination, request)?)
    }

    /// The most recent period rows of a season, oldest first.
    pub fn find_period_summary(
        &self,
        season: SeasonId,
        period: Period,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<PeriodSnapshot>, ServiceError> {
        let store = self.store.read().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(period::find_period_summary(&store, season, period, to, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccountId, DivisionId, LeagueType, QueueType, Region, TeamKey, TeamType,
    };
    use crate::page::{Cursor, Direction, LadderFilter};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn upsert(legacy_id: u64, rating: i32, account: u64) -> TeamUpsert {
        TeamUpsert {
            key: TeamKey {
                season: SeasonId(40),
                region: Region::Eu,
                queue: QueueType::Solo,
                team_type: TeamType::Arranged,
                legacy_id,
            },
            league_type: LeagueType::Gold,
            tier: 0,
            division_id: DivisionId(1),
            rating: Some(rating),
            wins: 10,
            losses: 5,
            ties: 0,
            members: vec![AccountId(account)],
            last_played: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn service() -> LadderService {
        LadderService::new(LadderStore::new(), AppConfig::default())
    }

    #[test]
    fn test_ingest_rank_snapshot_page_end_to_end() {
        let service = service();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();

        let a = service.ingest_team(upsert(1, 2100, 11)).unwrap();
        let b = service.ingest_team(upsert(2, 2300, 12)).unwrap();
        let c = service.ingest_team(upsert(3, 1900, 13)).unwrap();

        let ranks = service.compute_ranks(SeasonId(40)).unwrap();
        assert_eq!(ranks.ranked_teams, 3);
        assert_eq!(ranks.unrated_teams, 0);

        let capture = service.snapshot_season(SeasonId(40), now).unwrap();
        assert_eq!(capture.captured, 3);
        assert_eq!(capture.duplicates, 0);

        let filter = LadderFilter::new(SeasonId(40), QueueType::Solo, TeamType::Arranged);
        let page = service.find_page(&PageRequest::new(filter, 10)).unwrap();
        let ids: Vec<TeamId> = page.rows.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b, a, c]);
        assert_eq!(page.rows[0].global_rank, Some(1));
        assert!(!page.meta.has_more_forward);
    }

    #[test]
    fn test_re_ingest_updates_in_place() {
        let service = service();
        let id = service.ingest_team(upsert(1, 2100, 11)).unwrap();
        service.compute_ranks(SeasonId(40)).unwrap();

        let again = service.ingest_team(upsert(1, 2250, 11)).unwrap();
        assert_eq!(again, id);

        let filter = LadderFilter::new(SeasonId(40), QueueType::Solo, TeamType::Arranged);
        let page = service.find_page(&PageRequest::new(filter, 10)).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].rating, Some(2250));
    }

    #[test]
    fn test_page_errors_surface_through_the_facade() {
        let service = service();
        let filter = LadderFilter::new(SeasonId(40), QueueType::Solo, TeamType::Arranged);
        let request =
            PageRequest::new(filter, 5).with_cursor(Cursor::new(0, TeamId(1)), Direction::Forward)
                .with_page_diff(999);
        assert!(matches!(
            service.find_page(&request),
            Err(ServiceError::Page(PageError::JumpTooLarge { .. }))
        ));
    }

    #[test]
    fn test_repeat_capture_at_same_timestamp_counts_duplicates() {
        let service = service();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        service.ingest_team(upsert(1, 2100, 11)).unwrap();
        service.compute_ranks(SeasonId(40)).unwrap();

        let first = service.snapshot_season(SeasonId(40), now).unwrap();
        assert_eq!(first.captured, 1);
        let second = service.snapshot_season(SeasonId(40), now).unwrap();
        assert_eq!(second.captured, 0);
        assert_eq!(second.duplicates, 1);
    }

    #[test]
    fn test_period_rollup_and_summary() {
        let service = service();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        service.ingest_team(upsert(1, 2100, 11)).unwrap();
        service.ingest_team(upsert(2, 2300, 12)).unwrap();
        service.compute_ranks(SeasonId(40)).unwrap();
        service.snapshot_season(SeasonId(40), now).unwrap();

        let row = service
            .update_period_snapshot(SeasonId(40), Period::Day, now)
            .unwrap()
            .unwrap();
        assert_eq!(row.player_count, 2);
        // Same bucket again is a no-op.
        assert!(service
            .update_period_snapshot(SeasonId(40), Period::Day, now)
            .unwrap()
            .is_none());

        let summary = service
            .find_period_summary(SeasonId(40), Period::Day, now, 10)
            .unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].period_start, row.period_start);
    }

    #[test]
    fn test_maintenance_runs_under_the_default_retention() {
        let service = service();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        service.ingest_team(upsert(1, 2100, 11)).unwrap();
        service.compute_ranks(SeasonId(40)).unwrap();
        service.snapshot_season(SeasonId(40), now).unwrap();

        // A fresh snapshot is inside every retention window.
        let summary = service.run_maintenance(now).unwrap();
        assert_eq!(summary, MaintenanceSummary::default());
    }

    #[test]
    fn test_persist_and_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.data_dir = dir.path().to_path_buf();

        let service = LadderService::new(LadderStore::new(), config.clone());
        service.ingest_team(upsert(1, 2100, 11)).unwrap();
        service.compute_ranks(SeasonId(40)).unwrap();
        service.persist().unwrap();

        let reopened = LadderService::open(config).unwrap();
        let filter = LadderFilter::new(SeasonId(40), QueueType::Solo, TeamType::Arranged);
        let page = reopened.find_page(&PageRequest::new(filter, 10)).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].global_rank, Some(1));
    }
}

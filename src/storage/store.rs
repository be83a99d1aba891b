//! The in-memory ordered store for all ladder tables.
//!
//! Tables live in BTreeMaps so every query the engine needs is an ordered
//! range scan:
//! - teams by surrogate id, with a unique natural-key index and an ordered
//!   (rating desc, id asc) ladder index for keyset pagination;
//! - team snapshots by (team id, timestamp), split into a main and an
//!   archive tier;
//! - population snapshots by league id (latest state);
//! - period snapshots by (season, period start).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{
    League, LeagueBucket, LeagueId, Period, PeriodSnapshot, PopulationSnapshot, SeasonId, Team,
    TeamId, TeamKey, TeamSnapshot, TeamUpsert,
};

use super::{JsonlFile, StorageConfig, StorageError, TableFile};

/// Sort key of the ladder index: descending rating, ascending team id.
///
/// The id tie-break makes the order total, so two teams with equal rating
/// always rank reproducibly and keyset cursors never skip or repeat rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderKey {
    pub rating: i32,
    pub team_id: TeamId,
}

impl LadderKey {
    pub fn new(rating: i32, team_id: TeamId) -> Self {
        Self { rating, team_id }
    }
}

impl Ord for LadderKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .rating
            .cmp(&self.rating)
            .then_with(|| self.team_id.cmp(&other.team_id))
    }
}

impl PartialOrd for LadderKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Which snapshot partition a row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotTier {
    Main,
    Archive,
}

type SnapshotKey = (TeamId, DateTime<Utc>);

/// All ladder tables plus their indexes.
#[derive(Debug, Default)]
pub struct LadderStore {
    teams: BTreeMap<TeamId, Team>,
    natural: HashMap<TeamKey, TeamId>,
    ladder_index: BTreeSet<LadderKey>,

    leagues: BTreeMap<LeagueId, League>,
    league_index: HashMap<LeagueBucket, LeagueId>,

    population: BTreeMap<LeagueId, PopulationSnapshot>,

    main_snapshots: BTreeMap<SnapshotKey, TeamSnapshot>,
    archive_snapshots: BTreeMap<SnapshotKey, TeamSnapshot>,

    periods: BTreeMap<(SeasonId, Period, DateTime<Utc>), PeriodSnapshot>,

    next_team_id: u64,
    next_league_id: u64,
}

impl LadderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Teams ───────────────────────────────────────────────────

    /// Upsert a team by its natural key, as consumed from ingestion.
    ///
    /// Updates the authoritative fields (league placement, rating, record,
    /// members, last played) and leaves the derived rank fields untouched.
    pub fn upsert_team(&mut self, up: TeamUpsert) -> TeamId {
        if let Some(&id) = self.natural.get(&up.key) {
            if let Some(team) = self.teams.get_mut(&id) {
                if let Some(old_rating) = team.rating {
                    self.ladder_index.remove(&LadderKey::new(old_rating, id));
                }
                team.league_type = up.league_type;
                team.tier = up.tier;
                team.division_id = up.division_id;
                team.rating = up.rating;
                team.wins = up.wins;
                team.losses = up.losses;
                team.ties = up.ties;
                team.members = up.members;
                team.last_played = up.last_played;
                if let Some(rating) = up.rating {
                    self.ladder_index.insert(LadderKey::new(rating, id));
                }
                return id;
            }
        }

        let id = TeamId(self.next_team_id);
        self.next_team_id += 1;

        let team = Team {
            id,
            key: up.key.clone(),
            league_type: up.league_type,
            tier: up.tier,
            division_id: up.division_id,
            rating: up.rating,
            wins: up.wins,
            losses: up.losses,
            ties: up.ties,
            members: up.members,
            last_played: up.last_played,
            global_rank: None,
            region_rank: None,
            league_rank: None,
        };
        if let Some(rating) = team.rating {
            self.ladder_index.insert(LadderKey::new(rating, id));
        }
        self.natural.insert(up.key, id);
        self.teams.insert(id, team);
        debug!("Created team {}", id);
        id
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    pub fn find_team(&self, key: &TeamKey) -> Option<&Team> {
        self.natural.get(key).and_then(|id| self.teams.get(id))
    }

    /// All teams of a season, in id order.
    pub fn season_teams(&self, season: SeasonId) -> Vec<&Team> {
        self.teams
            .values()
            .filter(|t| t.key.season == season)
            .collect()
    }

    /// Overwrite the derived rank fields of a team. Rating is untouched, so
    /// the ladder index stays valid.
    pub fn set_ranks(
        &mut self,
        id: TeamId,
        global: Option<u32>,
        region: Option<u32>,
        league: Option<u32>,
    ) -> bool {
        match self.teams.get_mut(&id) {
            Some(team) => {
                team.global_rank = global;
                team.region_rank = region;
                team.league_rank = league;
                true
            }
            None => false,
        }
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    // ── Ladder index scans ──────────────────────────────────────

    /// Teams strictly after `cursor` in (rating desc, id asc) order. `None`
    /// starts at the top of the ladder.
    pub fn ladder_after(&self, cursor: Option<LadderKey>) -> impl Iterator<Item = &Team> + '_ {
        let lower = match cursor {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        self.ladder_index
            .range((lower, Bound::Unbounded))
            .filter_map(move |key| self.teams.get(&key.team_id))
    }

    /// Teams strictly before `cursor`, walked backwards (ascending rating).
    /// `None` starts at the bottom of the ladder.
    pub fn ladder_before(&self, cursor: Option<LadderKey>) -> impl Iterator<Item = &Team> + '_ {
        let upper = match cursor {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        self.ladder_index
            .range((Bound::Unbounded, upper))
            .rev()
            .filter_map(move |key| self.teams.get(&key.team_id))
    }

    // ── Leagues and population ──────────────────────────────────

    pub fn find_or_create_league(&mut self, bucket: LeagueBucket) -> LeagueId {
        if let Some(&id) = self.league_index.get(&bucket) {
            return id;
        }
        let id = LeagueId(self.next_league_id);
        self.next_league_id += 1;
        self.leagues.insert(
            id,
            League {
                id,
                season: bucket.season,
                region: bucket.region,
                queue: bucket.queue,
                team_type: bucket.team_type,
                league_type: bucket.league_type,
            },
        );
        self.league_index.insert(bucket, id);
        id
    }

    pub fn league(&self, id: LeagueId) -> Option<&League> {
        self.leagues.get(&id)
    }

    pub fn league_id(&self, bucket: &LeagueBucket) -> Option<LeagueId> {
        self.league_index.get(bucket).copied()
    }

    /// Latest-state upsert, keyed by league id.
    pub fn upsert_population(&mut self, population: PopulationSnapshot) {
        self.population.insert(population.league_id, population);
    }

    pub fn population(&self, league_id: LeagueId) -> Option<&PopulationSnapshot> {
        self.population.get(&league_id)
    }

    // ── Team snapshots ──────────────────────────────────────────

    /// Insert into the main tier. The (team id, timestamp) uniqueness
    /// constraint rejects duplicates.
    pub fn insert_snapshot(&mut self, snapshot: TeamSnapshot) -> Result<(), StorageError> {
        let key = (snapshot.team_id, snapshot.timestamp);
        if self.main_snapshots.contains_key(&key) || self.archive_snapshots.contains_key(&key) {
            return Err(StorageError::DuplicateSnapshot {
                team_id: key.0,
                timestamp: key.1,
            });
        }
        self.main_snapshots.insert(key, snapshot);
        Ok(())
    }

    fn tier(&self, tier: SnapshotTier) -> &BTreeMap<SnapshotKey, TeamSnapshot> {
        match tier {
            SnapshotTier::Main => &self.main_snapshots,
            SnapshotTier::Archive => &self.archive_snapshots,
        }
    }

    /// Keys of all rows in a tier strictly older than `cutoff`.
    pub fn snapshot_keys_before(&self, tier: SnapshotTier, cutoff: DateTime<Utc>) -> Vec<SnapshotKey> {
        self.tier(tier)
            .iter()
            .filter(|((_, ts), _)| *ts < cutoff)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Move main-tier rows into the archive tier. Returns how many moved.
    pub fn move_to_archive(&mut self, keys: &[SnapshotKey]) -> usize {
        let mut moved = 0;
        for key in keys {
            if let Some(snapshot) = self.main_snapshots.remove(key) {
                self.archive_snapshots.insert(*key, snapshot);
                moved += 1;
            }
        }
        moved
    }

    /// Delete rows from a tier. Returns how many were removed.
    pub fn remove_snapshots(&mut self, tier: SnapshotTier, keys: &[SnapshotKey]) -> usize {
        let map = match tier {
            SnapshotTier::Main => &mut self.main_snapshots,
            SnapshotTier::Archive => &mut self.archive_snapshots,
        };
        let mut removed = 0;
        for key in keys {
            if map.remove(key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Archived rows of one team strictly older than `cutoff`, in timestamp
    /// order.
    pub fn archived_team_window(
        &self,
        team_id: TeamId,
        cutoff: DateTime<Utc>,
    ) -> Vec<&TeamSnapshot> {
        self.archive_snapshots
            .range((team_id, DateTime::<Utc>::MIN_UTC)..(team_id, cutoff))
            .map(|(_, snapshot)| snapshot)
            .collect()
    }

    /// Team ids with at least one archived row older than `cutoff`.
    pub fn archived_team_ids_before(&self, cutoff: DateTime<Utc>) -> BTreeSet<TeamId> {
        self.archive_snapshots
            .iter()
            .filter(|((_, ts), _)| *ts < cutoff)
            .map(|((team_id, _), _)| *team_id)
            .collect()
    }

    /// The latest snapshot of a team with timestamp <= `at`, across both
    /// tiers.
    pub fn latest_snapshot_at(&self, team_id: TeamId, at: DateTime<Utc>) -> Option<&TeamSnapshot> {
        let range = (team_id, DateTime::<Utc>::MIN_UTC)..=(team_id, at);
        let main = self
            .main_snapshots
            .range(range.clone())
            .next_back()
            .map(|(_, s)| s);
        let archived = self
            .archive_snapshots
            .range(range)
            .next_back()
            .map(|(_, s)| s);
        match (main, archived) {
            (Some(a), Some(b)) => Some(if a.timestamp >= b.timestamp { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    /// All snapshots of one team in a tier, in timestamp order.
    pub fn team_snapshots(&self, tier: SnapshotTier, team_id: TeamId) -> Vec<&TeamSnapshot> {
        self.tier(tier)
            .range((team_id, DateTime::<Utc>::MIN_UTC)..=(team_id, DateTime::<Utc>::MAX_UTC))
            .map(|(_, snapshot)| snapshot)
            .collect()
    }

    pub fn snapshot_count(&self, tier: SnapshotTier) -> usize {
        self.tier(tier).len()
    }

    // ── Period snapshots ────────────────────────────────────────

    /// Insert a period row. Returns false (and leaves the existing row) when
    /// the (season, period, period start) slot is already filled; the ledger
    /// is append-only.
    pub fn insert_period(&mut self, period: PeriodSnapshot) -> bool {
        let key = (period.season, period.period, period.period_start);
        if self.periods.contains_key(&key) {
            return false;
        }
        self.periods.insert(key, period);
        true
    }

    pub fn period(
        &self,
        season: SeasonId,
        period: Period,
        start: DateTime<Utc>,
    ) -> Option<&PeriodSnapshot> {
        self.periods.get(&(season, period, start))
    }

    /// Latest period snapshot of a season with start strictly before
    /// `before`. Gaps are fine: this is "the previous existing row", not
    /// "start minus one unit".
    pub fn latest_period_before(
        &self,
        season: SeasonId,
        period: Period,
        before: DateTime<Utc>,
    ) -> Option<&PeriodSnapshot> {
        self.periods
            .range((season, period, DateTime::<Utc>::MIN_UTC)..(season, period, before))
            .next_back()
            .map(|(_, row)| row)
    }

    /// The most recent `limit` period rows of a season with start <= `to`,
    /// returned oldest first.
    pub fn periods_up_to(
        &self,
        season: SeasonId,
        period: Period,
        to: DateTime<Utc>,
        limit: usize,
    ) -> Vec<&PeriodSnapshot> {
        let mut rows: Vec<&PeriodSnapshot> = self
            .periods
            .range((season, period, DateTime::<Utc>::MIN_UTC)..=(season, period, to))
            .rev()
            .take(limit)
            .map(|(_, row)| row)
            .collect();
        rows.reverse();
        rows
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Load the store from the data directory. Missing files read as empty
    /// tables.
    pub fn load(config: &StorageConfig) -> Result<Self, StorageError> {
        let teams: Vec<Team> =
            JsonlFile::new(config.table_path(TableFile::Teams)).read_all()?;
        let leagues: Vec<League> =
            JsonlFile::new(config.table_path(TableFile::Leagues)).read_all()?;
        let population: Vec<PopulationSnapshot> =
            JsonlFile::new(config.table_path(TableFile::Population)).read_all()?;
        let periods: Vec<PeriodSnapshot> =
            JsonlFile::new(config.table_path(TableFile::Periods)).read_all()?;
        let main: Vec<TeamSnapshot> =
            JsonlFile::new(config.table_path(TableFile::SnapshotsMain)).read_all()?;
        let archive: Vec<TeamSnapshot> =
            JsonlFile::new(config.table_path(TableFile::SnapshotsArchive)).read_all()?;

        let mut store = Self::new();
        for team in teams {
            store.next_team_id = store.next_team_id.max(team.id.as_inner() + 1);
            if let Some(rating) = team.rating {
                store.ladder_index.insert(LadderKey::new(rating, team.id));
            }
            store.natural.insert(team.key.clone(), team.id);
            store.teams.insert(team.id, team);
        }
        for league in leagues {
            store.next_league_id = store.next_league_id.max(league.id.as_inner() + 1);
            store.league_index.insert(league.bucket(), league.id);
            store.leagues.insert(league.id, league);
        }
        for pop in population {
            store.population.insert(pop.league_id, pop);
        }
        for period in periods {
            store
                .periods
                .insert((period.season, period.period, period.period_start), period);
        }
        for snapshot in main {
            store
                .main_snapshots
                .insert((snapshot.team_id, snapshot.timestamp), snapshot);
        }
        for snapshot in archive {
            store
                .archive_snapshots
                .insert((snapshot.team_id, snapshot.timestamp), snapshot);
        }

        info!(
            "Loaded store: {} teams, {} main / {} archived snapshots, {} periods",
            store.teams.len(),
            store.main_snapshots.len(),
            store.archive_snapshots.len(),
            store.periods.len()
        );
        Ok(store)
    }

    /// Write every table back to the data directory.
    pub fn save(&self, config: &StorageConfig) -> Result<(), StorageError> {
        JsonlFile::new(config.table_path(TableFile::Teams)).write_all(self.teams.values())?;
        JsonlFile::new(config.table_path(TableFile::Leagues)).write_all(self.leagues.values())?;
        JsonlFile::new(config.table_path(TableFile::Population))
            .write_all(self.population.values())?;
        JsonlFile::new(config.table_path(TableFile::Periods)).write_all(self.periods.values())?;
        JsonlFile::new(config.table_path(TableFile::SnapshotsMain))
            .write_all(self.main_snapshots.values())?;
        JsonlFile::new(config.table_path(TableFile::SnapshotsArchive))
            .write_all(self.archive_snapshots.values())?;
        debug!("Saved store to {:?}", config.data_dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DivisionId, LeagueType, QueueType, Region, TeamType};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn upsert(season: u32, legacy_id: u64, rating: Option<i32>) -> TeamUpsert {
        TeamUpsert {
            key: TeamKey {
                season: SeasonId(season),
                region: Region::Eu,
                queue: QueueType::Solo,
                team_type: TeamType::Arranged,
                legacy_id,
            },
            league_type: LeagueType::Gold,
            tier: 1,
            division_id: DivisionId(4),
            rating,
            wins: 10,
            losses: 5,
            ties: 0,
            members: vec![crate::models::AccountId(legacy_id)],
            last_played: Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap(),
        }
    }

    fn snapshot(team_id: u64, ts: DateTime<Utc>, rating: i32) -> TeamSnapshot {
        TeamSnapshot {
            team_id: TeamId(team_id),
            timestamp: ts,
            division_id: DivisionId(4),
            wins: 1,
            games: 2,
            rating,
            global_rank: 1,
            region_rank: 1,
            league_rank: 1,
            global_team_count: 10,
            region_team_count: 5,
            league_team_count: 2,
            secondary: false,
        }
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_upsert_is_keyed_by_natural_key() {
        let mut store = LadderStore::new();
        let id1 = store.upsert_team(upsert(40, 100, Some(3000)));
        let id2 = store.upsert_team(upsert(40, 100, Some(3100)));
        let id3 = store.upsert_team(upsert(40, 101, Some(3000)));

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(store.team_count(), 2);
        assert_eq!(store.team(id1).unwrap().rating, Some(3100));
    }

    #[test]
    fn test_upsert_preserves_rank_fields() {
        let mut store = LadderStore::new();
        let id = store.upsert_team(upsert(40, 100, Some(3000)));
        store.set_ranks(id, Some(1), Some(1), Some(1));

        store.upsert_team(upsert(40, 100, Some(3200)));
        let team = store.team(id).unwrap();
        assert_eq!(team.rating, Some(3200));
        assert_eq!(team.global_rank, Some(1));
    }

    #[test]
    fn test_ladder_index_order_and_rating_updates() {
        let mut store = LadderStore::new();
        let a = store.upsert_team(upsert(40, 1, Some(3000)));
        let b = store.upsert_team(upsert(40, 2, Some(3500)));
        let c = store.upsert_team(upsert(40, 3, Some(3000)));

        let order: Vec<TeamId> = store.ladder_after(None).map(|t| t.id).collect();
        // Highest rating first, id breaks the 3000 tie.
        assert_eq!(order, vec![b, a, c]);

        // Re-rate team a above b; index must follow.
        store.upsert_team(upsert(40, 1, Some(3600)));
        let order: Vec<TeamId> = store.ladder_after(None).map(|t| t.id).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn test_unrated_team_not_in_ladder_index() {
        let mut store = LadderStore::new();
        store.upsert_team(upsert(40, 1, None));
        store.upsert_team(upsert(40, 2, Some(3000)));
        assert_eq!(store.ladder_after(None).count(), 1);
    }

    #[test]
    fn test_ladder_scans_are_exclusive_of_cursor() {
        let mut store = LadderStore::new();
        let a = store.upsert_team(upsert(40, 1, Some(3000)));
        let b = store.upsert_team(upsert(40, 2, Some(2900)));
        let c = store.upsert_team(upsert(40, 3, Some(2800)));

        let after: Vec<TeamId> = store
            .ladder_after(Some(LadderKey::new(3000, a)))
            .map(|t| t.id)
            .collect();
        assert_eq!(after, vec![b, c]);

        let before: Vec<TeamId> = store
            .ladder_before(Some(LadderKey::new(2800, c)))
            .map(|t| t.id)
            .collect();
        assert_eq!(before, vec![b, a]);
    }

    #[test]
    fn test_snapshot_uniqueness_constraint() {
        let mut store = LadderStore::new();
        let at = ts(10, 0);
        store.insert_snapshot(snapshot(1, at, 3000)).unwrap();
        let dup = store.insert_snapshot(snapshot(1, at, 3100));
        assert!(matches!(dup, Err(StorageError::DuplicateSnapshot { .. })));
        assert_eq!(store.snapshot_count(SnapshotTier::Main), 1);
    }

    #[test]
    fn test_move_to_archive_and_window() {
        let mut store = LadderStore::new();
        for day in 1..=5 {
            store.insert_snapshot(snapshot(1, ts(day, 0), 3000 + day as i32)).unwrap();
        }
        let keys = store.snapshot_keys_before(SnapshotTier::Main, ts(4, 0));
        assert_eq!(keys.len(), 3);
        assert_eq!(store.move_to_archive(&keys), 3);
        assert_eq!(store.snapshot_count(SnapshotTier::Main), 2);
        assert_eq!(store.snapshot_count(SnapshotTier::Archive), 3);

        let window = store.archived_team_window(TeamId(1), ts(3, 0));
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].timestamp, ts(1, 0));
    }

    #[test]
    fn test_duplicate_rejected_across_tiers() {
        let mut store = LadderStore::new();
        let at = ts(2, 0);
        store.insert_snapshot(snapshot(1, at, 3000)).unwrap();
        let keys = store.snapshot_keys_before(SnapshotTier::Main, ts(3, 0));
        store.move_to_archive(&keys);
        assert!(store.insert_snapshot(snapshot(1, at, 3000)).is_err());
    }

    #[test]
    fn test_latest_snapshot_at_spans_tiers() {
        let mut store = LadderStore::new();
        store.insert_snapshot(snapshot(1, ts(1, 0), 2900)).unwrap();
        store.insert_snapshot(snapshot(1, ts(5, 0), 3100)).unwrap();
        let keys = store.snapshot_keys_before(SnapshotTier::Main, ts(2, 0));
        store.move_to_archive(&keys);

        // As of day 3 only the archived row qualifies.
        let latest = store.latest_snapshot_at(TeamId(1), ts(3, 0)).unwrap();
        assert_eq!(latest.rating, 2900);
        // As of day 6 the main-tier row is newer.
        let latest = store.latest_snapshot_at(TeamId(1), ts(6, 0)).unwrap();
        assert_eq!(latest.rating, 3100);
        // Before any snapshot there is nothing.
        assert!(store.latest_snapshot_at(TeamId(1), ts(1, 0) - chrono::Duration::hours(1)).is_none());
    }

    #[test]
    fn test_period_ledger_is_append_only() {
        let mut store = LadderStore::new();
        let period = PeriodSnapshot {
            season: SeasonId(40),
            period: Period::Day,
            period_start: ts(1, 0),
            player_count: 10,
            games_played: 100,
            games_since_previous: None,
        };
        assert!(store.insert_period(period.clone()));
        assert!(!store.insert_period(PeriodSnapshot {
            games_played: 999,
            ..period
        }));
        assert_eq!(
            store
                .period(SeasonId(40), Period::Day, ts(1, 0))
                .unwrap()
                .games_played,
            100
        );
    }

    #[test]
    fn test_latest_period_before_tolerates_gaps() {
        let mut store = LadderStore::new();
        for (day, games) in [(1, 100u64), (4, 130)] {
            store.insert_period(PeriodSnapshot {
                season: SeasonId(40),
                period: Period::Day,
                period_start: ts(day, 0),
                player_count: 5,
                games_played: games,
                games_since_previous: None,
            });
        }
        // Day 3 has no row; the previous existing one is day 1.
        let prev = store
            .latest_period_before(SeasonId(40), Period::Day, ts(3, 0))
            .unwrap();
        assert_eq!(prev.games_played, 100);
        let prev = store
            .latest_period_before(SeasonId(40), Period::Day, ts(5, 0))
            .unwrap();
        assert_eq!(prev.games_played, 130);
        assert!(store
            .latest_period_before(SeasonId(40), Period::Day, ts(1, 0))
            .is_none());
        // A different granularity is a different series.
        assert!(store
            .latest_period_before(SeasonId(40), Period::Hour, ts(3, 0))
            .is_none());
    }

    #[test]
    fn test_periods_up_to_returns_oldest_first() {
        let mut store = LadderStore::new();
        for day in 1..=4 {
            store.insert_period(PeriodSnapshot {
                season: SeasonId(40),
                period: Period::Day,
                period_start: ts(day, 0),
                player_count: day,
                games_played: day as u64 * 10,
                games_since_previous: None,
            });
        }
        let rows = store.periods_up_to(SeasonId(40), Period::Day, ts(3, 0), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period_start, ts(2, 0));
        assert_eq!(rows[1].period_start, ts(3, 0));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let mut store = LadderStore::new();
        let id = store.upsert_team(upsert(40, 100, Some(3000)));
        store.set_ranks(id, Some(1), Some(1), Some(1));
        let league = store.find_or_create_league(store.team(id).unwrap().league_bucket());
        store.upsert_population(PopulationSnapshot {
            league_id: league,
            global_team_count: 1,
            region_team_count: 1,
            league_team_count: 1,
        });
        store.insert_snapshot(snapshot(id.as_inner(), ts(1, 0), 3000)).unwrap();
        store.insert_period(PeriodSnapshot {
            season: SeasonId(40),
            period: Period::Day,
            period_start: ts(1, 0),
            player_count: 1,
            games_played: 15,
            games_since_previous: None,
        });
        store.save(&config).unwrap();

        let loaded = LadderStore::load(&config).unwrap();
        assert_eq!(loaded.team_count(), 1);
        assert_eq!(loaded.team(id).unwrap().global_rank, Some(1));
        assert_eq!(loaded.snapshot_count(SnapshotTier::Main), 1);
        assert_eq!(loaded.population(league).unwrap().global_team_count, 1);
        assert_eq!(
            loaded.periods_up_to(SeasonId(40), Period::Day, ts(2, 0), 10).len(),
            1
        );

        // Indexes are rebuilt, and new ids continue past loaded ones.
        let mut loaded = loaded;
        assert_eq!(loaded.ladder_after(None).count(), 1);
        let fresh = loaded.upsert_team(upsert(40, 999, Some(2000)));
        assert!(fresh.as_inner() > id.as_inner());
    }
}

//! Ranked team model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, DivisionId, LeagueType, QueueType, Region, SeasonId, TeamId, TeamType};

/// Natural identity of a team: one ranked participant-group per
/// (season, region, queue, team type, legacy ladder id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamKey {
    pub season: SeasonId,
    pub region: Region,
    pub queue: QueueType,
    pub team_type: TeamType,
    pub legacy_id: u64,
}

/// League-scope partition key: the bucket a team's league rank is computed
/// within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueBucket {
    pub season: SeasonId,
    pub region: Region,
    pub queue: QueueType,
    pub team_type: TeamType,
    pub league_type: LeagueType,
}

/// A ranked team.
///
/// Rating and the win/loss record are authoritative, updated from ingestion.
/// The three rank fields are derived: overwritten wholesale by every rank
/// recompute, `None` until the first recompute or while the team is unrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Surrogate id assigned by the store.
    pub id: TeamId,

    /// Natural identity.
    pub key: TeamKey,

    /// Current league band.
    pub league_type: LeagueType,

    /// 0-based tier index within the league.
    pub tier: u8,

    /// Ladder division the team currently sits in.
    pub division_id: DivisionId,

    /// Skill score driving sort order. `None` = unrated: excluded from
    /// ranking entirely.
    pub rating: Option<i32>,

    pub wins: u32,
    pub losses: u32,
    pub ties: u32,

    /// Underlying player accounts. Distinct-player counts deduplicate on
    /// these, not on teams.
    pub members: Vec<AccountId>,

    /// Last time the team played a ladder game.
    pub last_played: DateTime<Utc>,

    /// Derived rank across every ranked team in the season.
    pub global_rank: Option<u32>,

    /// Derived rank within the team's region.
    pub region_rank: Option<u32>,

    /// Derived rank within the team's league bucket.
    pub league_rank: Option<u32>,
}

impl Team {
    /// Create a new team with no record and no rating.
    pub fn new(id: TeamId, key: TeamKey, league_type: LeagueType, division_id: DivisionId) -> Self {
        Self {
            id,
            key,
            league_type,
            tier: 0,
            division_id,
            rating: None,
            wins: 0,
            losses: 0,
            ties: 0,
            members: Vec::new(),
            last_played: Utc::now(),
            global_rank: None,
            region_rank: None,
            league_rank: None,
        }
    }

    /// Builder method to set the rating.
    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Builder method to set the win/loss/tie record.
    pub fn with_record(mut self, wins: u32, losses: u32, ties: u32) -> Self {
        self.wins = wins;
        self.losses = losses;
        self.ties = ties;
        self
    }

    /// Builder method to set the member accounts.
    pub fn with_members(mut self, members: Vec<AccountId>) -> Self {
        self.members = members;
        self
    }

    /// Total ladder games on record.
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// The league-scope bucket this team is ranked within.
    pub fn league_bucket(&self) -> LeagueBucket {
        LeagueBucket {
            season: self.key.season,
            region: self.key.region,
            queue: self.key.queue,
            team_type: self.key.team_type,
            league_type: self.league_type,
        }
    }

    /// Clear all derived rank fields.
    pub fn clear_ranks(&mut self) {
        self.global_rank = None;
        self.region_rank = None;
        self.league_rank = None;
    }
}

/// A team upsert consumed from the ingestion collaborator. Keyed by the
/// natural id tuple; never carries rank fields (those are derived).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamUpsert {
    pub key: TeamKey,
    pub league_type: LeagueType,
    pub tier: u8,
    pub division_id: DivisionId,
    pub rating: Option<i32>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub members: Vec<AccountId>,
    pub last_played: DateTime<Utc>,
}

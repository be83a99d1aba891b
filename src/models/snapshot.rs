//! Historical snapshot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DivisionId, LeagueId, Team, TeamId};

/// Team counts for one league's scopes: the denominators needed to interpret
/// a rank ("rank 5 of 200"). Latest-state, upserted once per league per
/// recompute run; historical values survive only as copies embedded in
/// [`TeamSnapshot`] rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub league_id: LeagueId,
    pub global_team_count: u32,
    pub region_team_count: u32,
    pub league_team_count: u32,
}

impl PopulationSnapshot {
    /// A zero-count placeholder, used when a snapshot is captured before the
    /// league's population has ever been computed.
    pub fn empty(league_id: LeagueId) -> Self {
        Self {
            league_id,
            global_team_count: 0,
            region_team_count: 0,
            league_team_count: 0,
        }
    }
}

/// An immutable point-in-time record of one team's ladder state.
///
/// Created only by the snapshot archiver; never mutated afterwards. The
/// compaction step deletes redundant rows, it never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub team_id: TeamId,
    pub timestamp: DateTime<Utc>,
    pub division_id: DivisionId,
    pub wins: u32,
    pub games: u32,
    pub rating: i32,
    pub global_rank: u32,
    pub region_rank: u32,
    pub league_rank: u32,
    /// Population counts at capture time, copied from the league's current
    /// [`PopulationSnapshot`].
    pub global_team_count: u32,
    pub region_team_count: u32,
    pub league_team_count: u32,
    /// True when the team's queue differs from the primary ladder queue, so
    /// trend consumers can separate auxiliary-format samples.
    pub secondary: bool,
}

impl TeamSnapshot {
    /// Capture a snapshot of a ranked team.
    ///
    /// Returns `None` if the team has no computed rank or no rating; unranked
    /// teams produce no history.
    pub fn capture(
        team: &Team,
        population: &PopulationSnapshot,
        timestamp: DateTime<Utc>,
        secondary: bool,
    ) -> Option<Self> {
        let rating = team.rating?;
        Some(Self {
            team_id: team.id,
            timestamp,
            division_id: team.division_id,
            wins: team.wins,
            games: team.games_played(),
            rating,
            global_rank: team.global_rank?,
            region_rank: team.region_rank?,
            league_rank: team.league_rank?,
            global_team_count: population.global_team_count,
            region_team_count: population.region_team_count,
            league_team_count: population.league_team_count,
            secondary,
        })
    }
}

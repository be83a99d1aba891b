//! League / tier / division hierarchy.
//!
//! Pure partition keys for ranking scopes. A league owns tiers (rating
//! bands), a tier owns divisions (ladder partitions). Tier rating bounds are
//! externally supplied per-season calibration data; nothing in this crate
//! computes them.

use serde::{Deserialize, Serialize};

use super::{
    DivisionId, LeagueBucket, LeagueId, LeagueType, QueueType, Region, SeasonId, TeamType, TierId,
};

/// A league: one ladder band per (season, region, queue, team type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub season: SeasonId,
    pub region: Region,
    pub queue: QueueType,
    pub team_type: TeamType,
    pub league_type: LeagueType,
}

impl League {
    /// The partition bucket this league represents.
    pub fn bucket(&self) -> LeagueBucket {
        LeagueBucket {
            season: self.season,
            region: self.region,
            queue: self.queue,
            team_type: self.team_type,
            league_type: self.league_type,
        }
    }
}

/// A rating band within a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub league_id: LeagueId,
    /// 0-based index within the league, 0 is the highest band.
    pub index: u8,
    pub min_rating: i32,
    pub max_rating: i32,
}

/// A ladder division within a tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub tier_id: TierId,
    /// External ladder id assigned by the game.
    pub ladder_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_bucket() {
        let league = League {
            id: LeagueId(1),
            season: SeasonId(40),
            region: Region::Kr,
            queue: QueueType::Solo,
            team_type: TeamType::Arranged,
            league_type: LeagueType::Grandmaster,
        };
        let bucket = league.bucket();
        assert_eq!(bucket.region, Region::Kr);
        assert_eq!(bucket.league_type, LeagueType::Grandmaster);
    }

    #[test]
    fn test_hierarchy_serialization() {
        let tier = Tier {
            id: TierId(2),
            league_id: LeagueId(1),
            index: 0,
            min_rating: 4800,
            max_rating: 5200,
        };
        let json = serde_json::to_string(&tier).unwrap();
        let back: Tier = serde_json::from_str(&json).unwrap();
        assert_eq!(back.league_id, LeagueId(1));
        assert_eq!(back.min_rating, 4800);
    }
}

//! Ladder partition enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Game region. A team is ranked within exactly one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Us,
    Eu,
    Kr,
    Cn,
}

impl Region {
    pub fn all() -> [Region; 4] {
        [Region::Us, Region::Eu, Region::Kr, Region::Cn]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Us => write!(f, "US"),
            Region::Eu => write!(f, "EU"),
            Region::Kr => write!(f, "KR"),
            Region::Cn => write!(f, "CN"),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "kr" => Ok(Region::Kr),
            "cn" => Ok(Region::Cn),
            other => Err(format!("unknown region: {}", other)),
        }
    }
}

/// Matchmaking queue. `Solo` is the primary ladder; everything else is an
/// auxiliary format whose snapshots are flagged as secondary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    #[default]
    Solo,
    Duo,
    Trio,
    Quad,
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueType::Solo => write!(f, "solo"),
            QueueType::Duo => write!(f, "duo"),
            QueueType::Trio => write!(f, "trio"),
            QueueType::Quad => write!(f, "quad"),
        }
    }
}

impl std::str::FromStr for QueueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "solo" => Ok(QueueType::Solo),
            "duo" => Ok(QueueType::Duo),
            "trio" => Ok(QueueType::Trio),
            "quad" => Ok(QueueType::Quad),
            other => Err(format!("unknown queue: {}", other)),
        }
    }
}

/// Whether the team was formed up front or matched at queue time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TeamType {
    #[default]
    Arranged,
    Random,
}

impl fmt::Display for TeamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamType::Arranged => write!(f, "arranged"),
            TeamType::Random => write!(f, "random"),
        }
    }
}

impl std::str::FromStr for TeamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arranged" => Ok(TeamType::Arranged),
            "random" => Ok(TeamType::Random),
            other => Err(format!("unknown team type: {}", other)),
        }
    }
}

/// League ladder band, lowest to highest. Boundaries between leagues are
/// per-season calibration data supplied from outside the ranking core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueType {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
}

impl fmt::Display for LeagueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeagueType::Bronze => "bronze",
            LeagueType::Silver => "silver",
            LeagueType::Gold => "gold",
            LeagueType::Platinum => "platinum",
            LeagueType::Diamond => "diamond",
            LeagueType::Master => "master",
            LeagueType::Grandmaster => "grandmaster",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for LeagueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bronze" => Ok(LeagueType::Bronze),
            "silver" => Ok(LeagueType::Silver),
            "gold" => Ok(LeagueType::Gold),
            "platinum" => Ok(LeagueType::Platinum),
            "diamond" => Ok(LeagueType::Diamond),
            "master" => Ok(LeagueType::Master),
            "grandmaster" => Ok(LeagueType::Grandmaster),
            other => Err(format!("unknown league: {}", other)),
        }
    }
}

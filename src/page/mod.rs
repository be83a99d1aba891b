//! Keyset pagination over the ranked ladder.
//!
//! Pages are anchored to a (rating, team id) cursor instead of a numeric
//! offset, so traversal stays stable while the underlying set mutates and a
//! page deep in the ladder costs the same as the first one. The ordering is
//! the one the rank calculator uses: rating descending, team id ascending on
//! ties.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::PaginationConfig;
use crate::models::{LeagueType, QueueType, Region, SeasonId, Team, TeamId, TeamType};
use crate::storage::{LadderKey, LadderStore};

/// Pagination input errors. All are rejected synchronously, before any row
/// is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Malformed cursor: {0}")]
    MalformedCursor(String),

    #[error("Page size must be greater than 0")]
    ZeroCount,

    #[error("Page size {got} exceeds maximum {max}")]
    CountTooLarge { got: u32, max: u32 },

    #[error("Page jump {got} exceeds maximum {max}")]
    JumpTooLarge { got: u32, max: u32 },
}

/// The last-seen sort key. Rows strictly after it (in the requested
/// direction) form the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub rating: i32,
    pub id: TeamId,
}

impl Cursor {
    pub fn new(rating: i32, id: TeamId) -> Self {
        Self { rating, id }
    }

    /// Opaque caller-facing token, `<rating>.<team id>`.
    pub fn token(&self) -> String {
        format!("{}.{}", self.rating, self.id)
    }

    /// Parse a token produced by [`Cursor::token`].
    pub fn parse(token: &str) -> Result<Self, PageError> {
        let (rating, id) = token
            .split_once('.')
            .ok_or_else(|| PageError::MalformedCursor(token.to_string()))?;
        let rating: i32 = rating
            .parse()
            .map_err(|_| PageError::MalformedCursor(token.to_string()))?;
        let id: u64 = id
            .parse()
            .map_err(|_| PageError::MalformedCursor(token.to_string()))?;
        Ok(Self::new(rating, TeamId(id)))
    }

    fn key(&self) -> LadderKey {
        LadderKey::new(self.rating, self.id)
    }
}

/// Traversal direction relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// Partition filter over the ranked set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderFilter {
    pub season: SeasonId,
    pub queue: QueueType,
    pub team_type: TeamType,
    /// `None` = all regions (global ladder).
    pub region: Option<Region>,
    /// `None` = all leagues.
    pub league_type: Option<LeagueType>,
}

impl LadderFilter {
    pub fn new(season: SeasonId, queue: QueueType, team_type: TeamType) -> Self {
        Self {
            season,
            queue,
            team_type,
            region: None,
            league_type: None,
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_league(mut self, league_type: LeagueType) -> Self {
        self.league_type = Some(league_type);
        self
    }

    fn matches(&self, team: &Team) -> bool {
        team.key.season == self.season
            && team.key.queue == self.queue
            && team.key.team_type == self.team_type
            && self.region.map_or(true, |r| team.key.region == r)
            && self.league_type.map_or(true, |l| team.league_type == l)
    }
}

/// One page request.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub filter: LadderFilter,
    /// `None` starts at the extreme end appropriate to the direction: the
    /// top of the ladder for forward, the bottom for backward.
    pub cursor: Option<Cursor>,
    pub direction: Direction,
    /// Whole-page jump distance from the cursor; 1 is the adjacent page.
    pub page_diff: u32,
    /// Rows per page.
    pub count: u32,
}

impl PageRequest {
    pub fn new(filter: LadderFilter, count: u32) -> Self {
        Self {
            filter,
            cursor: None,
            direction: Direction::Forward,
            page_diff: 1,
            count,
        }
    }

    pub fn with_cursor(mut self, cursor: Cursor, direction: Direction) -> Self {
        self.cursor = Some(cursor);
        self.direction = direction;
        self
    }

    pub fn with_page_diff(mut self, page_diff: u32) -> Self {
        self.page_diff = page_diff;
        self
    }

    fn validate(&self, limits: &PaginationConfig) -> Result<(), PageError> {
        if self.count == 0 {
            return Err(PageError::ZeroCount);
        }
        if self.count > limits.max_page_size {
            return Err(PageError::CountTooLarge {
                got: self.count,
                max: limits.max_page_size,
            });
        }
        if self.page_diff == 0 || self.page_diff > limits.max_page_diff {
            return Err(PageError::JumpTooLarge {
                got: self.page_diff,
                max: limits.max_page_diff,
            });
        }
        Ok(())
    }
}

/// Page metadata: the edge cursors and whether more rows exist beyond them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Anchored at the first row; paging backward from it yields the
    /// preceding page.
    pub start_cursor: Option<Cursor>,
    /// Anchored at the last row; paging forward from it yields the next
    /// page.
    pub end_cursor: Option<Cursor>,
    pub has_more_forward: bool,
    pub has_more_backward: bool,
}

/// One page of the ranked set, rows always in (rating desc, id asc) order.
#[derive(Debug, Clone)]
pub struct Page {
    pub rows: Vec<Team>,
    pub meta: PageMeta,
}

/// Serve a page request against the current committed state. Lock-free:
/// a page may legitimately reflect ranks from mid-recompute.
pub fn find_page(
    store: &LadderStore,
    limits: &PaginationConfig,
    request: &PageRequest,
) -> Result<Page, PageError> {
    request.validate(limits)?;

    let skip = (request.page_diff as usize - 1) * request.count as usize;
    let take = request.count as usize;
    let anchor = request.cursor.map(|c| c.key());

    let mut rows: Vec<Team> = match request.direction {
        Direction::Forward => store
            .ladder_after(anchor)
            .filter(|team| request.filter.matches(team))
            .skip(skip)
            .take(take + 1)
            .cloned()
            .collect(),
        Direction::Backward => store
            .ladder_before(anchor)
            .filter(|team| request.filter.matches(team))
            .skip(skip)
            .take(take + 1)
            .cloned()
            .collect(),
    };

    // The extra row only signals that another page exists in the traversal
    // direction.
    let has_extra = rows.len() > take;
    rows.truncate(take);
    if request.direction == Direction::Backward {
        // Backward traversal walks up the ladder; flip back to display
        // order.
        rows.reverse();
    }

    let start_cursor = rows.first().and_then(edge_cursor);
    let end_cursor = rows.last().and_then(edge_cursor);

    let (has_more_forward, has_more_backward) = match request.direction {
        Direction::Forward => {
            let backward = match start_cursor.or(request.cursor) {
                Some(cursor) => store
                    .ladder_before(Some(cursor.key()))
                    .any(|team| request.filter.matches(team)),
                None => false,
            };
            (has_extra, backward)
        }
        Direction::Backward => {
            let forward = match end_cursor.or(request.cursor) {
                Some(cursor) => store
                    .ladder_after(Some(cursor.key()))
                    .any(|team| request.filter.matches(team)),
                None => false,
            };
            (forward, has_extra)
        }
    };

    Ok(Page {
        rows,
        meta: PageMeta {
            start_cursor,
            end_cursor,
            has_more_forward,
            has_more_backward,
        },
    })
}

fn edge_cursor(team: &Team) -> Option<Cursor> {
    team.rating.map(|rating| Cursor::new(rating, team.id))
}

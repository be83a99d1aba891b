//! Rank computation and population aggregation.
//!
//! One joint batch per season: every rated team gets its global, region and
//! league-bucket rank, then the population counts those ranks are read
//! against are recomputed from the exact same team set. Running the two
//! together is what keeps a snapshot from embedding counts computed from a
//! different team-set version than the ranks it annotates.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::models::{LeagueBucket, Region, SeasonId, TeamId};
use crate::storage::LadderStore;

/// Outcome of a full-season recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSummary {
    pub season: SeasonId,
    /// Teams that received ranks.
    pub ranked_teams: u32,
    /// Teams excluded from ranking for having no rating.
    pub unrated_teams: u32,
    /// Leagues whose population snapshot was upserted.
    pub leagues_updated: u32,
}

struct Row {
    id: TeamId,
    rating: i32,
    region: Region,
    bucket: LeagueBucket,
}

/// Full-season rank recompute, followed by the population upsert.
///
/// Orders every team with a rating by (rating desc, id asc) and assigns
/// contiguous 1-based ranks per scope. Unrated teams get their rank fields
/// cleared. Idempotent: re-running against an unchanged team set writes the
/// same ranks and counts.
pub fn compute_ranks(store: &mut LadderStore, season: SeasonId) -> RankSummary {
    let mut rated: Vec<Row> = Vec::new();
    let mut unrated: Vec<(TeamId, LeagueBucket, u32)> = Vec::new();
    for team in store.season_teams(season) {
        match team.rating {
            Some(rating) => rated.push(Row {
                id: team.id,
                rating,
                region: team.key.region,
                bucket: team.league_bucket(),
            }),
            None => unrated.push((team.id, team.league_bucket(), team.games_played())),
        }
    }

    // Descending rating; the ascending-id tie-break makes the order total
    // and the recompute reproducible.
    rated.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.id.cmp(&b.id)));

    let mut region_counters: HashMap<Region, u32> = HashMap::new();
    let mut bucket_counters: HashMap<LeagueBucket, u32> = HashMap::new();
    let assignments: Vec<(TeamId, u32, u32, u32)> = rated
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let global = i as u32 + 1;
            let region = region_counters.entry(row.region).or_insert(0);
            *region += 1;
            let bucket = bucket_counters.entry(row.bucket).or_insert(0);
            *bucket += 1;
            (row.id, global, *region, *bucket)
        })
        .collect();

    for (id, global, region, league) in &assignments {
        store.set_ranks(*id, Some(*global), Some(*region), Some(*league));
    }
    for (id, _, _) in &unrated {
        store.set_ranks(*id, None, None, None);
    }

    let leagues_updated = update_population(store, &rated, &unrated);

    let summary = RankSummary {
        season,
        ranked_teams: assignments.len() as u32,
        unrated_teams: unrated.len() as u32,
        leagues_updated,
    };
    info!(
        "Season {}: ranked {} teams ({} unrated), {} league populations updated",
        season, summary.ranked_teams, summary.unrated_teams, summary.leagues_updated
    );

    summary
}

/// Recompute population counts from the team set the ranks were just
/// assigned from, and upsert one snapshot per league.
fn update_population(
    store: &mut LadderStore,
    rated: &[Row],
    unrated: &[(TeamId, LeagueBucket, u32)],
) -> u32 {
    // Ranked teams always count toward population; unrated teams count only
    // when they have games on record.
    let counted = rated.iter().map(|row| row.bucket).chain(
        unrated
            .iter()
            .filter(|(_, _, games)| *games > 0)
            .map(|(_, bucket, _)| *bucket),
    );

    let mut per_bucket: HashMap<LeagueBucket, u32> = HashMap::new();
    let mut per_region: HashMap<Region, u32> = HashMap::new();
    let mut global = 0u32;
    for bucket in counted {
        *per_bucket.entry(bucket).or_insert(0) += 1;
        *per_region.entry(bucket.region).or_insert(0) += 1;
        global += 1;
    }

    let mut updated = 0;
    for (bucket, league_count) in &per_bucket {
        let league_id = store.find_or_create_league(*bucket);
        let region_count = per_region.get(&bucket.region).copied().unwrap_or(0);
        store.upsert_population(crate::models::PopulationSnapshot {
            league_id,
            global_team_count: global,
            region_team_count: region_count,
            league_team_count: *league_count,
        });
        debug!(
            "League {} population: {} league / {} region / {} global",
            league_id, league_count, region_count, global
        );
        updated += 1;
    }
    updated
}

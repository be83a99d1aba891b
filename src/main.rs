use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ladder_pulse::config::AppConfig;
use ladder_pulse::models::{LeagueType, Period, QueueType, Region, SeasonId, TeamType, TeamUpsert};
use ladder_pulse::page::{Cursor, Direction, LadderFilter, PageRequest};
use ladder_pulse::parse_duration;
use ladder_pulse::service::LadderService;
use ladder_pulse::storage::JsonlFile;

#[derive(Parser)]
#[command(name = "ladder-pulse")]
#[command(about = "Ladder ranking, snapshot archival and pagination engine")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply team upserts from a JSONL file
    Ingest {
        /// Path to a JSONL file of team records
        path: String,
    },

    /// Recompute ranks and league populations for a season
    Ranks {
        /// Season number
        #[arg(long)]
        season: u32,
    },

    /// Capture a snapshot of every ranked team in a season
    Snapshot {
        /// Season number
        #[arg(long)]
        season: u32,

        /// Capture timestamp (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Run one archive / compact / expire maintenance cycle
    Maintain {
        /// Cycle timestamp (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Roll up and show period activity for a season
    Periods {
        /// Season number
        #[arg(long)]
        season: u32,

        /// Bucket size: hour, day, week or month
        #[arg(long, default_value = "day")]
        period: String,

        /// Max buckets to show
        #[arg(long, default_value = "12")]
        limit: usize,
    },

    /// Show one page of the ranked ladder
    Page {
        /// Season number
        #[arg(long)]
        season: u32,

        /// Matchmaking queue
        #[arg(long, default_value = "solo")]
        queue: String,

        /// Team type: arranged or random
        #[arg(long, default_value = "arranged")]
        team_type: String,

        /// Restrict to one region (us, eu, kr, cn)
        #[arg(long)]
        region: Option<String>,

        /// Restrict to one league band
        #[arg(long)]
        league: Option<String>,

        /// Cursor token from a previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Page toward the top of the ladder instead of down it
        #[arg(long)]
        backward: bool,

        /// Whole-page jump distance from the cursor
        #[arg(long, default_value = "1")]
        page_diff: u32,

        /// Rows per page
        #[arg(long, default_value = "25")]
        count: u32,
    },

    /// Run the snapshot and maintenance jobs on their configured cadences
    Run {
        /// Season to operate on
        #[arg(long)]
        season: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting ladder-pulse v{}", env!("CARGO_PKG_VERSION"));

    let service = LadderService::open(config)?;

    match cli.command {
        Commands::Ingest { path } => {
            let upserts: Vec<TeamUpsert> = JsonlFile::new(PathBuf::from(&path))
                .read_all()
                .with_context(|| format!("Failed to read {}", path))?;
            let total = upserts.len();
            for upsert in upserts {
                service.ingest_team(upsert)?;
            }
            service.persist()?;
            println!("Ingested {} team records from {}", total, path);
        }
        Commands::Ranks { season } => {
            let summary = service.compute_ranks(SeasonId(season))?;
            service.persist()?;
            println!("\n=== Rank Recompute (season {}) ===", season);
            println!("Ranked teams:     {}", summary.ranked_teams);
            println!("Unrated teams:    {}", summary.unrated_teams);
            println!("Leagues updated:  {}", summary.leagues_updated);
        }
        Commands::Snapshot { season, at } => {
            let now = parse_at(at)?;
            let summary = service.snapshot_season(SeasonId(season), now)?;
            service.persist()?;
            println!("\n=== Snapshot Capture (season {} @ {}) ===", season, now);
            println!("Captured:           {}", summary.captured);
            println!("Skipped unranked:   {}", summary.skipped_unranked);
            println!("Duplicates:         {}", summary.duplicates);
            println!("Missing population: {}", summary.missing_population);
        }
        Commands::Maintain { at } => {
            let now = parse_at(at)?;
            let summary = service.run_maintenance(now)?;
            service.persist()?;
            println!("\n=== Maintenance Cycle (@ {}) ===", now);
            println!("Archived:        {}", summary.archived);
            println!("Compacted away:  {}", summary.compacted);
            println!("Expired main:    {}", summary.expired_main);
            println!("Expired archive: {}", summary.expired_archive);
        }
        Commands::Periods {
            season,
            period,
            limit,
        } => {
            let period: Period = period
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let now = Utc::now();
            let _ = service.update_period_snapshot(SeasonId(season), period, now)?;
            service.persist()?;

            let rows = service.find_period_summary(SeasonId(season), period, now, limit)?;
            if rows.is_empty() {
                println!("No period data for season {}.", season);
            } else {
                println!(
                    "\n=== {:?} Activity (season {}) ===\n",
                    period, season
                );
                println!("{:<22} {:>8} {:>10} {:>8}", "start", "players", "games", "delta");
                for row in &rows {
                    let delta = row
                        .games_since_previous
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<22} {:>8} {:>10} {:>8}",
                        row.period_start.format("%Y-%m-%d %H:%M"),
                        row.player_count,
                        row.games_played,
                        delta
                    );
                }
            }
        }
        Commands::Page {
            season,
            queue,
            team_type,
            region,
            league,
            cursor,
            backward,
            page_diff,
            count,
        } => {
            let queue: QueueType = queue.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let team_type: TeamType =
                team_type.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let mut filter = LadderFilter::new(SeasonId(season), queue, team_type);
            if let Some(region) = region {
                let region: Region = region.parse().map_err(|e: String| anyhow::anyhow!(e))?;
                filter = filter.with_region(region);
            }
            if let Some(league) = league {
                let league: LeagueType =
                    league.parse().map_err(|e: String| anyhow::anyhow!(e))?;
                filter = filter.with_league(league);
            }

            let mut request = PageRequest::new(filter, count).with_page_diff(page_diff);
            if let Some(token) = cursor {
                let direction = if backward {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                request = request.with_cursor(Cursor::parse(&token)?, direction);
            } else if backward {
                request.direction = Direction::Backward;
            }

            let page = service.find_page(&request)?;
            if page.rows.is_empty() {
                println!("No teams on this page.");
            } else {
                println!(
                    "{:>6} {:>8} {:>7} {:<12} {:>9}",
                    "rank", "team", "rating", "league", "record"
                );
                for team in &page.rows {
                    println!(
                        "{:>6} {:>8} {:>7} {:<12} {:>9}",
                        team.global_rank
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        team.id.to_string(),
                        team.rating
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        team.league_type.to_string(),
                        format!("{}-{}-{}", team.wins, team.losses, team.ties)
                    );
                }
                if let Some(cursor) = page.meta.end_cursor {
                    if page.meta.has_more_forward {
                        println!("\nNext page: --cursor {}", cursor.token());
                    }
                }
                if let Some(cursor) = page.meta.start_cursor {
                    if page.meta.has_more_backward {
                        println!("Previous page: --cursor {} --backward", cursor.token());
                    }
                }
            }
        }
        Commands::Run { season } => {
            run_daemon(&service, SeasonId(season)).await?;
        }
    }

    Ok(())
}

/// Snapshot captures, rank recomputes and period rollups on one cadence,
/// maintenance on another, until interrupted.
async fn run_daemon(service: &LadderService, season: SeasonId) -> Result<()> {
    let schedule = &service.config().schedule;
    let snapshot_every = parse_duration(&schedule.snapshot_interval)
        .with_context(|| format!("Invalid snapshot_interval: {}", schedule.snapshot_interval))?;
    let maintain_every = parse_duration(&schedule.maintenance_interval).with_context(|| {
        format!(
            "Invalid maintenance_interval: {}",
            schedule.maintenance_interval
        )
    })?;

    tracing::info!(
        "Running season {} jobs: snapshots every {}, maintenance every {}",
        season,
        schedule.snapshot_interval,
        schedule.maintenance_interval
    );

    let mut snapshot_tick = tokio::time::interval(snapshot_every);
    let mut maintain_tick = tokio::time::interval(maintain_every);
    // Both intervals fire immediately; let the first snapshot cycle land
    // before the first maintenance cycle.
    snapshot_tick.tick().await;
    maintain_tick.tick().await;
    run_snapshot_cycle(service, season);
    service.persist()?;

    loop {
        tokio::select! {
            _ = snapshot_tick.tick() => {
                run_snapshot_cycle(service, season);
                if let Err(e) = service.persist() {
                    tracing::error!("Persist failed after snapshot cycle: {}", e);
                }
            }
            _ = maintain_tick.tick() => {
                let now = Utc::now();
                match service.run_maintenance(now) {
                    Ok(summary) => tracing::info!(
                        "Maintenance: {} archived, {} compacted, {} + {} expired",
                        summary.archived,
                        summary.compacted,
                        summary.expired_main,
                        summary.expired_archive
                    ),
                    Err(e) => tracing::error!("Maintenance cycle failed: {}", e),
                }
                if let Err(e) = service.persist() {
                    tracing::error!("Persist failed after maintenance cycle: {}", e);
                }
            }
        }
    }
}

fn run_snapshot_cycle(service: &LadderService, season: SeasonId) {
    let now = Utc::now();

    match service.compute_ranks(season) {
        Ok(summary) => tracing::info!(
            "Ranked {} teams ({} unrated) in season {}",
            summary.ranked_teams,
            summary.unrated_teams,
            season
        ),
        Err(e) => {
            tracing::error!("Rank recompute failed: {}", e);
            return;
        }
    }

    match service.snapshot_season(season, now) {
        Ok(summary) => tracing::info!(
            "Captured {} snapshots ({} skipped, {} duplicates)",
            summary.captured,
            summary.skipped_unranked,
            summary.duplicates
        ),
        Err(e) => {
            tracing::error!("Snapshot capture failed: {}", e);
            return;
        }
    }

    for period in [Period::Hour, Period::Day, Period::Week, Period::Month] {
        match service.update_period_snapshot(season, period, now) {
            Ok(Some(row)) => tracing::info!(
                "New {:?} rollup at {}: {} players, {} games",
                period,
                row.period_start,
                row.player_count,
                row.games_played
            ),
            Ok(None) => {}
            Err(e) => tracing::error!("{:?} rollup failed: {}", period, e),
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = PathBuf::from(&cli.config);
    let mut config = if path.exists() {
        AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", cli.config))?
    } else {
        AppConfig::default()
    };
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }
    if let Some(ref log_level) = cli.log_level {
        config.log_level = log_level.clone();
    }
    Ok(config)
}

fn parse_at(at: Option<String>) -> Result<DateTime<Utc>> {
    match at {
        Some(s) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Ok(dt.with_timezone(&Utc)),
            Err(_) => bail!("Invalid --at timestamp (expected RFC 3339): {}", s),
        },
        None => Ok(Utc::now()),
    }
}

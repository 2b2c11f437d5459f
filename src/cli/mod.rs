//! drawdesk CLI
//!
//! Commands:
//! - `drawdesk period` - Latest settled draw number
//! - `drawdesk draws` - Recent draw results
//! - `drawdesk news <QUERY>` - Headlines for a query
//! - `drawdesk recommend` - Frequency-weighted number picks
//! - `drawdesk hot` - Most and least drawn numbers

pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::config::AppConfig;
use crate::domain::DrawHistory;
use crate::logging::init_logging;
use crate::lotto::WeightPolicy;
use crate::services::Desk;
use output::{
    describe_attempts, print_items, print_notice, DrawRow, FrequencyRow, GameRow, HeadlineRow,
    OutputMode,
};

/// Draw results, headlines and number picks
#[derive(Parser, Debug)]
#[command(name = "drawdesk")]
#[command(author, version, about = "Lottery draw results, headlines and number recommendations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding default.toml and per-environment overrides
    #[arg(long, global = true, default_value = "config", env = "DRAWDESK_CONFIG_DIR")]
    pub config_dir: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the latest settled draw number
    Period,

    /// Show recent draw results, most recent first
    Draws {
        /// Number of draws (defaults to lotto.history_window)
        #[arg(short, long)]
        window: Option<u32>,
    },

    /// Show headlines for a search query
    News {
        /// Search query
        query: String,
    },

    /// Recommend number combinations weighted by recent frequency
    Recommend {
        /// Weight policy: hot, cold or balanced
        #[arg(short, long, default_value = "hot")]
        policy: WeightPolicy,
        /// Number of games
        #[arg(short, long, default_value = "5")]
        games: usize,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the most and least drawn numbers in the history window
    Hot {
        #[arg(short, long, default_value = "6")]
        top: usize,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = AppConfig::load_from(&self.config_dir)
            .with_context(|| format!("loading configuration from {}", self.config_dir))?;
        init_logging(&config.logging);

        let mode = OutputMode::from_json_flag(self.json);
        let desk = Desk::new(config)?;

        match self.command {
            Commands::Period => show_period(&desk, mode),
            Commands::Draws { window } => show_draws(&desk, window, mode).await,
            Commands::News { query } => show_news(&desk, &query, mode).await,
            Commands::Recommend {
                policy,
                games,
                seed,
            } => show_recommendations(&desk, policy, games, seed, mode).await,
            Commands::Hot { top } => show_hot(&desk, top, mode).await,
        }
    }
}

fn show_period(desk: &Desk, mode: OutputMode) -> Result<()> {
    let period = desk.current_period();
    let draw_date = desk.resolver().draw_date(period);

    match mode {
        OutputMode::Json => {
            let value = json!({
                "period": period,
                "draw_date": draw_date.map(|d| d.to_string()),
                "draw_day": desk.resolver().draw_day().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputMode::Table => {
            if period == 0 {
                println!("No draw has settled yet.");
            } else {
                match draw_date {
                    Some(date) => println!("Latest draw: #{period} ({date})"),
                    None => println!("Latest draw: #{period}"),
                }
            }
        }
    }
    Ok(())
}

async fn show_draws(desk: &Desk, window: Option<u32>, mode: OutputMode) -> Result<()> {
    let history = match window {
        Some(w) => desk.draws_window(w).await?,
        None => desk.latest_draws().await?,
    };

    if let DrawHistory::Degraded { reason, .. } = &history {
        print_notice(mode, &format!("Draw results unavailable ({reason}); showing a placeholder."));
    }
    let rows: Vec<DrawRow> = history.records().iter().map(DrawRow::from).collect();
    print_items(&rows, &history, mode)
}

async fn show_news(desk: &Desk, query: &str, mode: OutputMode) -> Result<()> {
    let outcome = desk.headlines(query).await?;

    match outcome.strategy() {
        Some(strategy) => print_notice(mode, &format!("source: {strategy}")),
        None => {
            print_notice(mode, &format!("No headlines found for '{query}'."));
            for line in describe_attempts(&outcome) {
                print_notice(mode, &format!("  {line}"));
            }
        }
    }
    let rows: Vec<HeadlineRow> = outcome.records().iter().map(HeadlineRow::from).collect();
    print_items(&rows, &outcome, mode)
}

async fn show_recommendations(
    desk: &Desk,
    policy: WeightPolicy,
    games: usize,
    seed: Option<u64>,
    mode: OutputMode,
) -> Result<()> {
    let picks = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            desk.recommend_with_rng(policy, games, &mut rng).await?
        }
        None => desk.recommend(policy, games).await?,
    };

    print_notice(mode, &format!("policy: {policy}"));
    print_items(&GameRow::rows(&picks), &picks, mode)
}

async fn show_hot(desk: &Desk, top: usize, mode: OutputMode) -> Result<()> {
    let table = desk.frequency().await?;
    if table.total() == 0 {
        print_notice(mode, "No draw results available to count.");
    }

    let to_rows = |pairs: Vec<(u8, u32)>| -> Vec<FrequencyRow> {
        pairs
            .into_iter()
            .map(|(number, count)| FrequencyRow { number, count })
            .collect()
    };
    let hottest = to_rows(table.hottest(top));
    let coldest = to_rows(table.coldest(top));

    match mode {
        OutputMode::Json => {
            let value = json!({ "hottest": hottest, "coldest": coldest });
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        OutputMode::Table => {
            println!("Most drawn");
            print_items(&hottest, &hottest, mode)?;
            println!("Least drawn");
            print_items(&coldest, &coldest, mode)
        }
    }
}

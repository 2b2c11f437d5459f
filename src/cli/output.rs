//! Output formatting for `drawdesk` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::{AttemptFailure, DrawRecord, FeedOutcome, Record};
use crate::lotto::Recommendation;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a slice of rows as a table, or the serializable source as JSON.
pub fn print_items<T: Tabled, S: Serialize + ?Sized>(
    rows: &[T],
    source: &S,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if rows.is_empty() {
                println!("(no results)");
            } else {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{table}");
            }
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(source)?);
        }
    }
    Ok(())
}

/// Notice shown above degraded or empty results in table mode.
pub fn print_notice(mode: OutputMode, message: &str) {
    if mode == OutputMode::Table {
        println!("! {message}");
    }
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{n:02}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Tabled)]
pub struct DrawRow {
    #[tabled(rename = "Draw")]
    pub draw: u32,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Numbers")]
    pub numbers: String,
    #[tabled(rename = "Bonus")]
    pub bonus: String,
}

impl From<&DrawRecord> for DrawRow {
    fn from(d: &DrawRecord) -> Self {
        Self {
            draw: d.period_id(),
            date: d.date().to_string(),
            numbers: format_numbers(d.numbers()),
            bonus: format!("{:02}", d.bonus()),
        }
    }
}

#[derive(Debug, Tabled)]
pub struct HeadlineRow {
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Published")]
    pub published: String,
    #[tabled(rename = "Link")]
    pub link: String,
}

impl From<&Record> for HeadlineRow {
    fn from(r: &Record) -> Self {
        Self {
            title: r.title.clone(),
            published: r.published.clone().unwrap_or_else(|| "-".to_string()),
            link: r.link.clone(),
        }
    }
}

#[derive(Debug, Tabled)]
pub struct GameRow {
    #[tabled(rename = "Game")]
    pub game: usize,
    #[tabled(rename = "Numbers")]
    pub numbers: String,
}

impl GameRow {
    pub fn rows(games: &[Recommendation]) -> Vec<Self> {
        games
            .iter()
            .enumerate()
            .map(|(i, g)| GameRow {
                game: i + 1,
                numbers: g.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct FrequencyRow {
    #[tabled(rename = "Number")]
    pub number: u8,
    #[tabled(rename = "Count")]
    pub count: u32,
}

/// One line per strategy that came back empty, for the "no data" notice.
pub fn describe_attempts(outcome: &FeedOutcome) -> Vec<String> {
    match outcome {
        FeedOutcome::Found { .. } => Vec::new(),
        FeedOutcome::Empty { attempts } => attempts
            .iter()
            .map(|a| match &a.failure {
                AttemptFailure::Empty => format!("{}: no results", a.strategy),
                AttemptFailure::Failed(reason) => format!("{}: {}", a.strategy, reason),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StrategyAttempt;

    #[test]
    fn test_draw_row_formats_numbers() {
        let draw = DrawRecord::new(1, [1, 9, 10, 22, 33, 45], 3, "2002-12-07").unwrap();
        let row = DrawRow::from(&draw);
        assert_eq!(row.numbers, "01 09 10 22 33 45");
        assert_eq!(row.bonus, "03");
    }

    #[test]
    fn test_describe_attempts() {
        let outcome = FeedOutcome::Empty {
            attempts: vec![
                StrategyAttempt {
                    strategy: "scrape".into(),
                    failure: AttemptFailure::Failed("Upstream returned 503".into()),
                },
                StrategyAttempt {
                    strategy: "feed".into(),
                    failure: AttemptFailure::Empty,
                },
            ],
        };
        assert_eq!(
            describe_attempts(&outcome),
            vec!["scrape: Upstream returned 503", "feed: no results"]
        );
    }
}

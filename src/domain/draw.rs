use serde::Serialize;

use crate::error::{DeskError, Result};

/// Smallest drawable number
pub const MIN_NUMBER: u8 = 1;
/// Largest drawable number
pub const MAX_NUMBER: u8 = 45;
/// Main numbers per draw
pub const NUMBERS_PER_DRAW: usize = 6;

/// Period id carried by the placeholder record; real draws start at 1.
pub const PLACEHOLDER_PERIOD: u32 = 0;

/// Results of one settled draw. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawRecord {
    period_id: u32,
    numbers: [u8; NUMBERS_PER_DRAW],
    bonus: u8,
    date: String,
}

fn in_range(n: u8) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&n)
}

impl DrawRecord {
    /// Build a record, enforcing six distinct in-range numbers and an in-range bonus.
    /// The bonus may repeat a main number.
    pub fn new(
        period_id: u32,
        numbers: [u8; NUMBERS_PER_DRAW],
        bonus: u8,
        date: impl Into<String>,
    ) -> Result<Self> {
        if let Some(bad) = numbers.iter().find(|n| !in_range(**n)) {
            return Err(DeskError::Parse(format!(
                "draw {period_id}: number {bad} outside {MIN_NUMBER}..={MAX_NUMBER}"
            )));
        }
        for (i, n) in numbers.iter().enumerate() {
            if numbers[i + 1..].contains(n) {
                return Err(DeskError::Parse(format!(
                    "draw {period_id}: number {n} appears twice"
                )));
            }
        }
        if !in_range(bonus) {
            return Err(DeskError::Parse(format!(
                "draw {period_id}: bonus {bonus} outside {MIN_NUMBER}..={MAX_NUMBER}"
            )));
        }

        Ok(Self {
            period_id,
            numbers,
            bonus,
            date: date.into(),
        })
    }

    /// Well-formed stand-in used when no draw could be fetched at all.
    pub fn placeholder() -> Self {
        Self {
            period_id: PLACEHOLDER_PERIOD,
            numbers: [1, 2, 3, 4, 5, 6],
            bonus: 7,
            date: "unavailable".to_string(),
        }
    }

    pub fn period_id(&self) -> u32 {
        self.period_id
    }

    pub fn numbers(&self) -> &[u8; NUMBERS_PER_DRAW] {
        &self.numbers
    }

    pub fn bonus(&self) -> u8 {
        self.bonus
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}

/// Draw history handed to consumers.
///
/// Degradation is carried by the variant rather than by a magic date string.
/// Built through [`from_fetched`](Self::from_fetched), [`records`](Self::records)
/// is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DrawHistory {
    Live { records: Vec<DrawRecord> },
    Degraded { reason: String, placeholder: DrawRecord },
}

impl DrawHistory {
    /// Wrap fetched records, degrading to the placeholder if there are none.
    pub fn from_fetched(records: Vec<DrawRecord>, low: u32, high: u32) -> Self {
        if records.is_empty() {
            DrawHistory::degraded(format!("no draw between {low} and {high} could be fetched"))
        } else {
            DrawHistory::Live { records }
        }
    }

    /// Placeholder history with an explicit reason.
    pub fn degraded(reason: impl Into<String>) -> Self {
        DrawHistory::Degraded {
            reason: reason.into(),
            placeholder: DrawRecord::placeholder(),
        }
    }

    pub fn records(&self) -> &[DrawRecord] {
        match self {
            DrawHistory::Live { records } => records,
            DrawHistory::Degraded { placeholder, .. } => std::slice::from_ref(placeholder),
        }
    }

    /// Records that came from upstream; empty when degraded
    pub fn live_records(&self) -> &[DrawRecord] {
        match self {
            DrawHistory::Live { records } => records,
            DrawHistory::Degraded { .. } => &[],
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, DrawHistory::Degraded { .. })
    }

    pub fn latest(&self) -> Option<&DrawRecord> {
        self.records().first()
    }
}

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::domain::{DrawRecord, MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_DRAW};
use crate::error::{DeskError, Result};

/// Weighted draws attempted before falling back to a uniform pick of distinct numbers.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

const SYMBOLS: usize = MAX_NUMBER as usize;
const COLD_CEILING: u32 = 100;

// ── Frequency table ─────────────────────────────────────────────

/// How often each number appeared across a window of draws (main numbers only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u32; SYMBOLS],
}

impl FrequencyTable {
    pub fn from_history(history: &[DrawRecord]) -> Self {
        let mut counts = [0u32; SYMBOLS];
        for n in history.iter().flat_map(|d| d.numbers().iter()) {
            counts[usize::from(*n - MIN_NUMBER)] += 1;
        }
        Self { counts }
    }

    /// Build from explicit counts; numbers outside the drawable range are ignored.
    pub fn from_counts(counts: impl IntoIterator<Item = (u8, u32)>) -> Self {
        let mut table = [0u32; SYMBOLS];
        for (n, c) in counts {
            if (MIN_NUMBER..=MAX_NUMBER).contains(&n) {
                table[usize::from(n - MIN_NUMBER)] = c;
            }
        }
        Self { counts: table }
    }

    /// Occurrences of `n`; 0 for numbers never seen or out of range.
    pub fn count(&self, n: u8) -> u32 {
        if (MIN_NUMBER..=MAX_NUMBER).contains(&n) {
            self.counts[usize::from(n - MIN_NUMBER)]
        } else {
            0
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    fn ranked(&self) -> Vec<(u8, u32)> {
        (MIN_NUMBER..=MAX_NUMBER).map(|n| (n, self.count(n))).collect()
    }

    /// The `top` most frequent numbers, ties going to the smaller number.
    pub fn hottest(&self, top: usize) -> Vec<(u8, u32)> {
        let mut ranked = self.ranked();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top);
        ranked
    }

    /// The `top` least frequent numbers, ties going to the smaller number.
    pub fn coldest(&self, top: usize) -> Vec<(u8, u32)> {
        let mut ranked = self.ranked();
        ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.truncate(top);
        ranked
    }
}

// ── Weight policy ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Favor numbers drawn often
    Hot,
    /// Favor numbers drawn rarely
    Cold,
    /// Uniform
    #[default]
    Balanced,
}

impl WeightPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Cold => "cold",
            Self::Balanced => "balanced",
        }
    }

    /// Sampling weight of `n`; always at least 1.
    ///
    /// Widened to `u64` so the sum over all 45 numbers cannot overflow
    /// whatever the counts are.
    pub fn weight(&self, table: &FrequencyTable, n: u8) -> u64 {
        let count = table.count(n);
        match self {
            Self::Hot => u64::from(count) + 1,
            Self::Cold => u64::from(COLD_CEILING.saturating_sub(count).max(1)),
            Self::Balanced => 1,
        }
    }
}

impl fmt::Display for WeightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WeightPolicy {
    type Err = DeskError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Self::Hot),
            "cold" => Ok(Self::Cold),
            "balanced" | "uniform" => Ok(Self::Balanced),
            other => Err(DeskError::InvalidArgument(format!(
                "invalid policy '{other}'; expected hot|cold|balanced"
            ))),
        }
    }
}

// ── Recommendation ──────────────────────────────────────────────

/// Six distinct numbers in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    numbers: [u8; NUMBERS_PER_DRAW],
}

impl Recommendation {
    fn from_distinct(mut numbers: [u8; NUMBERS_PER_DRAW]) -> Self {
        numbers.sort_unstable();
        Self { numbers }
    }

    pub fn numbers(&self) -> &[u8; NUMBERS_PER_DRAW] {
        &self.numbers
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.numbers.iter().map(|n| format!("{n:02}")).collect();
        write!(f, "{}", parts.join(" "))
    }
}

// ── Sampler ─────────────────────────────────────────────────────

/// Draws recommendations weighted by historical frequency.
///
/// Each attempt samples six numbers with replacement; an attempt that repeats
/// a number is thrown away. After `max_attempts` rejected attempts a uniform
/// sample without replacement is used, so every call terminates.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyWeightedSampler {
    max_attempts: usize,
}

impl Default for FrequencyWeightedSampler {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl FrequencyWeightedSampler {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    pub fn recommend(
        &self,
        history: &[DrawRecord],
        policy: WeightPolicy,
        k_games: usize,
    ) -> Result<Vec<Recommendation>> {
        self.recommend_with_rng(history, policy, k_games, &mut rand::thread_rng())
    }

    pub fn recommend_with_rng<R: Rng + ?Sized>(
        &self,
        history: &[DrawRecord],
        policy: WeightPolicy,
        k_games: usize,
        rng: &mut R,
    ) -> Result<Vec<Recommendation>> {
        let table = FrequencyTable::from_history(history);
        self.recommend_from_table(&table, policy, k_games, rng)
    }

    pub fn recommend_from_table<R: Rng + ?Sized>(
        &self,
        table: &FrequencyTable,
        policy: WeightPolicy,
        k_games: usize,
        rng: &mut R,
    ) -> Result<Vec<Recommendation>> {
        if k_games == 0 {
            return Err(DeskError::InvalidArgument(
                "at least one game must be requested".to_string(),
            ));
        }

        let weights: Vec<u64> = (MIN_NUMBER..=MAX_NUMBER)
            .map(|n| policy.weight(table, n))
            .collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|e| DeskError::Internal(format!("invalid sampling weights: {e}")))?;

        Ok((0..k_games).map(|_| self.draw_one(&dist, rng)).collect())
    }

    fn draw_one<R: Rng + ?Sized>(&self, dist: &WeightedIndex<u64>, rng: &mut R) -> Recommendation {
        for _ in 0..self.max_attempts {
            let picks: [u8; NUMBERS_PER_DRAW] =
                std::array::from_fn(|_| symbol(dist.sample(rng)));
            if is_distinct(&picks) {
                return Recommendation::from_distinct(picks);
            }
        }

        debug!(
            attempts = self.max_attempts,
            "weighted draw kept colliding, using uniform fallback"
        );
        let indices = rand::seq::index::sample(rng, SYMBOLS, NUMBERS_PER_DRAW);
        let mut picks = [0u8; NUMBERS_PER_DRAW];
        for (slot, idx) in picks.iter_mut().zip(indices.iter()) {
            *slot = symbol(idx);
        }
        Recommendation::from_distinct(picks)
    }
}

/// Number for a zero-based index into the 1..=45 range.
fn symbol(idx: usize) -> u8 {
    MIN_NUMBER + idx as u8
}

fn is_distinct(picks: &[u8]) -> bool {
    picks
        .iter()
        .enumerate()
        .all(|(i, n)| !picks[i + 1..].contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn history() -> Vec<DrawRecord> {
        vec![
            DrawRecord::new(3, [1, 7, 12, 20, 33, 45], 2, "c").unwrap(),
            DrawRecord::new(2, [7, 8, 12, 21, 34, 44], 3, "b").unwrap(),
            DrawRecord::new(1, [7, 9, 13, 22, 35, 43], 4, "a").unwrap(),
        ]
    }

    fn assert_valid(rec: &Recommendation) {
        let n = rec.numbers();
        assert!(n.iter().all(|x| (1..=45).contains(x)), "{rec}");
        assert!(n.windows(2).all(|w| w[0] < w[1]), "not strictly ascending: {rec}");
    }

    #[test]
    fn test_frequency_table() {
        let table = FrequencyTable::from_history(&history());
        assert_eq!(table.count(7), 3);
        assert_eq!(table.count(12), 2);
        assert_eq!(table.count(2), 0); // bonus numbers are not counted
        assert_eq!(table.count(0), 0);
        assert_eq!(table.total(), 18);
        assert_eq!(table.hottest(2), vec![(7, 3), (12, 2)]);
        assert_eq!(table.coldest(2), vec![(2, 0), (3, 0)]);
    }

    #[test]
    fn test_policy_weights() {
        let table = FrequencyTable::from_counts([(7, 3), (9, 250)]);
        assert_eq!(WeightPolicy::Hot.weight(&table, 7), 4);
        assert_eq!(WeightPolicy::Hot.weight(&table, 8), 1);
        assert_eq!(WeightPolicy::Cold.weight(&table, 7), 97);
        assert_eq!(WeightPolicy::Cold.weight(&table, 9), 1);
        assert_eq!(WeightPolicy::Balanced.weight(&table, 9), 1);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("HOT".parse::<WeightPolicy>().unwrap(), WeightPolicy::Hot);
        assert_eq!(" cold ".parse::<WeightPolicy>().unwrap(), WeightPolicy::Cold);
        assert!("lucky".parse::<WeightPolicy>().is_err());
        assert_eq!(WeightPolicy::Balanced.to_string(), "balanced");
    }

    #[test]
    fn test_every_policy_yields_valid_games() {
        let sampler = FrequencyWeightedSampler::default();
        let mut rng = StdRng::seed_from_u64(42);
        for policy in [WeightPolicy::Hot, WeightPolicy::Cold, WeightPolicy::Balanced] {
            let games = sampler
                .recommend_with_rng(&history(), policy, 5, &mut rng)
                .unwrap();
            assert_eq!(games.len(), 5);
            games.iter().for_each(assert_valid);
        }
    }

    #[test]
    fn test_dominant_symbol_still_terminates() {
        let table = FrequencyTable::from_counts([(7, 1_000_000)]);
        let sampler = FrequencyWeightedSampler::new(10);
        let mut rng = StdRng::seed_from_u64(7);

        let games = sampler
            .recommend_from_table(&table, WeightPolicy::Hot, 20, &mut rng)
            .unwrap();
        assert_eq!(games.len(), 20);
        games.iter().for_each(assert_valid);
    }

    #[test]
    fn test_huge_counts_do_not_overflow_weights() {
        let table = FrequencyTable::from_counts([(1, u32::MAX), (2, u32::MAX)]);
        assert_eq!(WeightPolicy::Hot.weight(&table, 1), u64::from(u32::MAX) + 1);
        assert_eq!(table.total(), 2 * u64::from(u32::MAX));
        let sampler = FrequencyWeightedSampler::new(5);
        let mut rng = StdRng::seed_from_u64(11);

        for policy in [WeightPolicy::Hot, WeightPolicy::Cold, WeightPolicy::Balanced] {
            let games = sampler
                .recommend_from_table(&table, policy, 3, &mut rng)
                .unwrap();
            assert_eq!(games.len(), 3);
            games.iter().for_each(assert_valid);
        }
    }

    #[test]
    fn test_empty_history_is_uniform_not_error() {
        let sampler = FrequencyWeightedSampler::default();
        let games = sampler.recommend(&[], WeightPolicy::Hot, 1).unwrap();
        assert_valid(&games[0]);
    }

    #[test]
    fn test_zero_games_rejected() {
        let sampler = FrequencyWeightedSampler::default();
        let err = sampler.recommend(&history(), WeightPolicy::Hot, 0).unwrap_err();
        assert!(matches!(err, DeskError::InvalidArgument(_)));
    }

    #[test]
    fn test_history_is_untouched() {
        let before = history();
        let after = before.clone();
        let sampler = FrequencyWeightedSampler::default();
        sampler.recommend(&after, WeightPolicy::Cold, 3).unwrap();
        assert_eq!(before, after);
    }
}

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};

use crate::config::LottoConfig;
use crate::error::{DeskError, Result};

const CADENCE_DAYS: i64 = 7;

/// Maps a point in time to the most recent settled draw number.
///
/// Draw #1 happens on `epoch`; one draw follows every seven days on the same
/// weekday. On draw day the new draw only counts once local time reaches
/// `cutoff`, so callers never ask upstream for a draw that has no result yet.
#[derive(Debug, Clone, Copy)]
pub struct PeriodResolver {
    epoch: NaiveDate,
    cutoff: NaiveTime,
    offset: FixedOffset,
}

impl PeriodResolver {
    pub fn new(epoch: NaiveDate, cutoff: NaiveTime, offset: FixedOffset) -> Self {
        Self {
            epoch,
            cutoff,
            offset,
        }
    }

    pub fn from_config(config: &LottoConfig) -> Result<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).ok_or_else(|| {
            DeskError::InvalidConfig(format!(
                "lotto.utc_offset_hours out of range: {}",
                config.utc_offset_hours
            ))
        })?;
        Ok(Self::new(config.epoch, config.draw_cutoff, offset))
    }

    pub fn draw_day(&self) -> Weekday {
        self.epoch.weekday()
    }

    /// Latest settled draw number at `now`; 0 before draw #1 has settled.
    pub fn current_period(&self, now: DateTime<Utc>) -> u32 {
        let local = now.with_timezone(&self.offset);
        let days = (local.date_naive() - self.epoch).num_days();
        if days < 0 {
            return 0;
        }

        let mut period = days / CADENCE_DAYS + 1;
        if local.weekday() == self.draw_day() && local.time() < self.cutoff {
            period -= 1;
        }
        u32::try_from(period).unwrap_or(u32::MAX)
    }

    /// Calendar date on which draw `period` takes place.
    pub fn draw_date(&self, period: u32) -> Option<NaiveDate> {
        let weeks = i64::from(period.checked_sub(1)?);
        self.epoch.checked_add_signed(Duration::days(weeks * CADENCE_DAYS))
    }
}

//! Common types used across the ledger

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Default shop timezone offset (Indochina Time, UTC+7)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Longest report range, in days (ten years plus leap days)
pub const MAX_RANGE_DAYS: i64 = 3660;

/// Shop-local clock offset used to decide which calendar day an instant falls on
pub fn shop_offset(hours: i32) -> Option<FixedOffset> {
    hours.checked_mul(3600).and_then(FixedOffset::east_opt)
}

/// Inclusive date range for reports.
///
/// Both endpoints are calendar days in the shop's local time. When compared
/// against instants, `start` is widened to its first nanosecond and `end` to
/// its last nanosecond. A range spans at most [`MAX_RANGE_DAYS`] days and
/// keeps a day of margin from the edges of the representable calendar, so
/// its bounds exist for every offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RangeParts")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RangeParts {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RangeParts> for DateRange {
    type Error = &'static str;

    fn try_from(parts: RangeParts) -> Result<Self, Self::Error> {
        Self::new(parts.start, parts.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if end < start {
            return Err("Range end must not be before range start");
        }
        if (end - start).num_days() >= MAX_RANGE_DAYS {
            return Err("Range must not span more than 3660 days");
        }
        if start.pred_opt().is_none() || end.succ_opt().is_none() {
            return Err("Range is outside the supported calendar");
        }
        Ok(Self { start, end })
    }

    /// A range covering a single calendar day
    pub fn single_day(day: NaiveDate) -> Result<Self, &'static str> {
        Self::new(day, day)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// UTC instants bounding the range: local start-of-day of `start` and
    /// local end-of-day (23:59:59.999999999) of `end`.
    pub fn bounds(&self, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        // `new` keeps a day of margin, so neither side saturates in practice
        let from =
            local_to_utc(start_of_day(self.start), offset).unwrap_or(DateTime::<Utc>::MIN_UTC);
        let to = end_of_day(self.end)
            .and_then(|local| local_to_utc(local, offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (from, to)
    }

    pub fn contains_instant(&self, at: DateTime<Utc>, offset: FixedOffset) -> bool {
        let (from, to) = self.bounds(offset);
        at >= from && at <= to
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every calendar day in the range, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Calendar day an instant falls on in shop-local time
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    start_of_day(date)
        .checked_add_signed(Duration::days(1))?
        .checked_sub_signed(Duration::nanoseconds(1))
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let utc = local.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
    Some(Utc.from_utc_datetime(&utc))
}

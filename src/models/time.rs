//! Time windows, slot timing and start-date parsing.
//!
//! # Time Model
//! Matches carry wall-clock `NaiveDateTime`s. Durations are whole minutes.
//! A slot is one match plus the break that follows it. All fields start
//! their match of a slot at the same time.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: NaiveDateTime,
    /// Interval end (exclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Duration of this window in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether a timestamp falls within this window.
    #[inline]
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes from the end of `self` to the start of `later`.
    ///
    /// Negative when the windows overlap.
    pub fn gap_minutes_to(&self, later: &Self) -> i64 {
        (later.start - self.end).num_minutes()
    }
}

/// Per-phase match timing.
///
/// `match = game + (periods - 1) * halftime + extra`, `slot = match + break`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTiming {
    /// Playing time of one match (minutes).
    pub game_minutes: u32,
    /// Break after each match (minutes).
    pub break_minutes: u32,
    /// Number of periods (halves, thirds, ...).
    pub periods: u32,
    /// Break between periods (minutes).
    pub halftime_minutes: u32,
    /// Reserved time for deciding drawn knockout matches (minutes).
    pub extra_minutes: u32,
}

impl SlotTiming {
    /// Default playing time when the configured value is unusable.
    pub const DEFAULT_GAME_MINUTES: u32 = 10;

    /// Creates a single-period timing.
    pub fn new(game_minutes: u32, break_minutes: u32) -> Self {
        Self {
            game_minutes,
            break_minutes,
            periods: 1,
            halftime_minutes: 0,
            extra_minutes: 0,
        }
    }

    /// Sets multi-period play.
    pub fn with_periods(mut self, periods: u32, halftime_minutes: u32) -> Self {
        self.periods = periods;
        self.halftime_minutes = halftime_minutes;
        self
    }

    /// Reserves extra minutes per match.
    pub fn with_extra_minutes(mut self, extra_minutes: u32) -> Self {
        self.extra_minutes = extra_minutes;
        self
    }

    /// Whether the timing can produce a positive match duration.
    pub fn is_usable(&self) -> bool {
        self.game_minutes > 0
    }

    /// Replaces unusable values with defaults.
    ///
    /// Zero game time becomes [`Self::DEFAULT_GAME_MINUTES`]; zero periods
    /// become one. Returns `true` if anything was substituted.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;
        if self.game_minutes == 0 {
            self.game_minutes = Self::DEFAULT_GAME_MINUTES;
            changed = true;
        }
        if self.periods == 0 {
            self.periods = 1;
            changed = true;
        }
        changed
    }

    /// Duration of one match including halftime breaks (minutes).
    pub fn match_minutes(&self) -> i64 {
        let halftimes = self.periods.saturating_sub(1) as i64 * self.halftime_minutes as i64;
        self.game_minutes as i64 + halftimes + self.extra_minutes as i64
    }

    /// Duration of one slot: match plus trailing break (minutes).
    pub fn slot_minutes(&self) -> i64 {
        self.match_minutes() + self.break_minutes as i64
    }

    /// Window of the match at `local_slot` counted from `phase_start`.
    pub fn window(&self, phase_start: NaiveDateTime, local_slot: u32) -> TimeWindow {
        let start = phase_start + Duration::minutes(self.slot_minutes() * local_slot as i64);
        TimeWindow::new(start, start + Duration::minutes(self.match_minutes()))
    }
}

impl Default for SlotTiming {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAME_MINUTES, 2)
    }
}

/// Parses a start date in ISO (`YYYY-MM-DD`) or German (`DD.MM.YYYY`) format.
pub fn parse_start_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
        .ok()
}

/// Parses a start time (`HH:MM` or `HH:MM:SS`).
pub fn parse_start_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

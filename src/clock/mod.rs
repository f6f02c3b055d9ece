//! Tick-driven clock engine.
//!
//! Owns the wall-clock [`Calendar`], the up-time counters and the
//! minute-boundary snapshots.  The scheduler polls it once per pass; the
//! power-fail retention loop polls it once per wake.
//!
//! ```text
//!   TickSource.current_seconds()
//!            │  delta (whole seconds, never skipped)
//!            ▼
//!   advance_one_second() ×delta ──▶ Calendar cascade  s→m→h→d→M→y
//!            │
//!            ▼
//!   detect_new_minute() ──▶ true once per boundary
//!            │
//!            └─ minute-of-day == 0 ──▶ daily rollover callback
//! ```
//!
//! [`poll_tick_source`](ClockEngine::poll_tick_source) and
//! [`detect_new_minute`](ClockEngine::detect_new_minute) run inside the
//! low-power retention loop, so neither logs nor blocks.

pub mod calendar;
pub mod format;

use crate::app::ports::TickSource;
use crate::config::{ScheduleTable, TimeFormat};
use crate::error::ClockError;
use calendar::{Calendar, IrrigationDay, MAX_YEAR, MIN_YEAR, day_of_week, days_in_month};

/// Counters that cover one calendar day and reset at local midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodCounters {
    /// Programs queued for auto-start today.
    pub auto_starts: u16,
    /// Schedule slots missed because the queue was full.
    pub missed_starts: u16,
    /// Primary-rail outages ridden out today.
    pub power_failures: u16,
}

/// The clock engine.
#[derive(Debug, Clone)]
pub struct ClockEngine {
    calendar: Calendar,
    /// Seconds since init.  Bumped once per `advance_one_second`.
    uptime_secs: u32,
    /// Milliseconds since init, wraps at `u32::MAX` (~49.7 days).
    millis: u32,
    /// Tick-source seconds reading at the previous poll.
    last_tick: u32,
    prev_minute_of_day: u16,
    cur_minute_of_day: u16,
    counters: PeriodCounters,
}

impl Default for ClockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockEngine {
    pub fn new() -> Self {
        Self::with_calendar(Calendar::default())
    }

    /// Start from a specific calendar (e.g. restored from a battery RTC).
    pub fn with_calendar(calendar: Calendar) -> Self {
        let minute_of_day = calendar.minute_of_day();
        Self {
            calendar,
            uptime_secs: 0,
            millis: 0,
            last_tick: 0,
            prev_minute_of_day: minute_of_day,
            cur_minute_of_day: minute_of_day,
            counters: PeriodCounters::default(),
        }
    }

    // ── Tick advance ──────────────────────────────────────────

    /// Advance the calendar by exactly one second.
    pub fn advance_one_second(&mut self) {
        self.calendar.tick_second();
        self.uptime_secs = self.uptime_secs.wrapping_add(1);
        self.millis = self.millis.wrapping_add(1000);
    }

    /// Catch the calendar up with the tick source.
    ///
    /// Calls [`advance_one_second`](Self::advance_one_second) once per whole
    /// second elapsed since the previous poll.  Returns the number of seconds
    /// advanced.  Safe in the low-power retention loop.
    pub fn poll_tick_source(&mut self, ticks: &(impl TickSource + ?Sized)) -> u32 {
        let now = ticks.current_seconds();
        let delta = now.wrapping_sub(self.last_tick);
        for _ in 0..delta {
            self.advance_one_second();
        }
        self.last_tick = now;

        // Whole-second advances can leave our counter up to a second past
        // the source, so a reading that far behind is adopted as well.
        let source_ms = ticks.current_millis();
        let ahead = source_ms.wrapping_sub(self.millis);
        let behind = self.millis.wrapping_sub(source_ms);
        if ahead < u32::MAX / 2 || behind < 1000 {
            self.millis = source_ms;
        }
        delta
    }

    /// Report a minute boundary, exactly once per crossing.
    ///
    /// When the new minute is local midnight, `on_midnight` runs once and
    /// the period counters are zeroed.
    pub fn detect_new_minute(&mut self, on_midnight: impl FnOnce()) -> bool {
        self.cur_minute_of_day = self.calendar.minute_of_day();
        if self.cur_minute_of_day == self.prev_minute_of_day {
            return false;
        }
        self.prev_minute_of_day = self.cur_minute_of_day;
        if self.cur_minute_of_day == 0 {
            on_midnight();
            self.counters = PeriodCounters::default();
        }
        true
    }

    // ── Clock set ─────────────────────────────────────────────

    /// Replace the calendar after validating every field.
    ///
    /// `month` is 1-based.  On any failure the calendar is untouched.  The
    /// minute snapshots are left alone, so a clock set that changes the
    /// minute-of-day surfaces as one boundary on the next
    /// [`detect_new_minute`](Self::detect_new_minute).
    pub fn set_clock(
        &mut self,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), ClockError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ClockError::YearOutOfRange);
        }
        if !(1..=12).contains(&month) {
            return Err(ClockError::MonthOutOfRange);
        }
        if day == 0 || day > days_in_month(year, month - 1) {
            return Err(ClockError::DayOutOfRange);
        }
        if hour > 23 {
            return Err(ClockError::HourOutOfRange);
        }
        if minute > 59 {
            return Err(ClockError::MinuteOutOfRange);
        }
        if second > 59 {
            return Err(ClockError::SecondOutOfRange);
        }

        self.calendar = Calendar {
            year,
            month: month - 1,
            day,
            weekday: day_of_week(year, month, day),
            hour,
            minute,
            second,
        };
        Ok(())
    }

    // ── Schedule lookup ───────────────────────────────────────

    /// True when the current minute-of-day equals today's slot for `program`.
    pub fn matches_schedule_slot(&self, program: usize, table: &ScheduleTable) -> bool {
        self.schedule_slot_today(program, table)
            .is_some_and(|slot| slot == self.calendar.minute_of_day())
    }

    /// Today's slot for `program`, looked up with the Monday-first numbering.
    pub fn schedule_slot_today(&self, program: usize, table: &ScheduleTable) -> Option<u16> {
        table.slot(self.irrigation_day(), program)
    }

    /// Today in schedule-table numbering.
    pub fn irrigation_day(&self) -> IrrigationDay {
        IrrigationDay::from(self.calendar.weekday())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn minute_of_day(&self) -> u16 {
        self.calendar.minute_of_day()
    }

    pub fn uptime_secs(&self) -> u32 {
        self.uptime_secs
    }

    pub fn millis(&self) -> u32 {
        self.millis
    }

    /// Milliseconds since `since`, correct across one `u32` wrap.
    pub fn elapsed_ms(&self, since: u32) -> u32 {
        self.millis.wrapping_sub(since)
    }

    pub fn counters(&self) -> &PeriodCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut PeriodCounters {
        &mut self.counters
    }

    // ── Formatting ────────────────────────────────────────────

    pub fn format_hour_minute(&self, style: TimeFormat) -> format::HourMinute {
        format::hour_minute(self.calendar.hour(), self.calendar.minute(), style)
    }

    pub fn format_date_time(&self, style: TimeFormat) -> format::DateTimeText {
        format::date_time(&self.calendar, style)
    }

    pub fn format_debug_timestamp(&self) -> format::DebugTimestamp {
        format::debug_timestamp(&self.calendar)
    }

    pub fn format_uptime(&self) -> format::UptimeText {
        format::uptime(self.uptime_secs)
    }
}

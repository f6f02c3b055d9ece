//! Calendar arithmetic: day counts, leap years, weekday numbering.
//!
//! Two weekday numberings coexist in the controller:
//!
//! ```text
//!   Weekday        Sun=0 Mon=1 Tue=2 Wed=3 Thu=4 Fri=5 Sat=6   (calendar)
//!   IrrigationDay  Mon=0 Tue=1 Wed=2 Thu=3 Fri=4 Sat=5 Sun=6   (schedule table)
//! ```
//!
//! They are separate types; the only bridge is `From<Weekday> for IrrigationDay`.

/// First year the clock accepts.
pub const MIN_YEAR: u16 = 2008;
/// Last year the clock accepts.
pub const MAX_YEAR: u16 = 2099;

/// Minutes in one day; minute-of-day values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Days per month, indexed by zero-based month.  February carries 29; the
/// non-leap reduction is applied where the table is consulted.
pub const DAYS_IN_MONTH: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Leap-year rule used throughout the controller: every fourth year.
///
/// Century years are not excluded.  No affected year (2100) lies inside
/// `MIN_YEAR..=MAX_YEAR`.
pub const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0
}

/// Number of days in a zero-based `month` of `year`.
pub fn days_in_month(year: u16, month0: u8) -> u8 {
    let days = DAYS_IN_MONTH[(month0 % 12) as usize];
    if month0 == 1 && !is_leap_year(year) {
        days - 1
    } else {
        days
    }
}

/// Three-letter month abbreviation for a zero-based month.
pub fn month_name(month0: u8) -> &'static str {
    MONTH_NAMES[(month0 % 12) as usize]
}

// ═══════════════════════════════════════════════════════════════
//  Weekday numberings
// ═══════════════════════════════════════════════════════════════

/// Calendar weekday, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Convert a `0..=6` index (Sunday = 0).  Wraps modulo 7.
    pub const fn from_index(idx: u8) -> Self {
        match idx % 7 {
            0 => Self::Sunday,
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            _ => Self::Saturday,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Three-letter abbreviation.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Sunday => "Sun",
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
        }
    }
}

/// Schedule-table weekday, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IrrigationDay {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl IrrigationDay {
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Row index into the schedule table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<Weekday> for IrrigationDay {
    fn from(day: Weekday) -> Self {
        // Sunday moves from the front of the week to the back.
        Self::ALL[((day.index() + 6) % 7) as usize]
    }
}

/// Weekday for a Gregorian date, via Sakamoto's congruence.
///
/// `month` is 1-based.  Valid from 1752-09-14 (the Gregorian switchover in
/// the British calendar) onward.
pub fn day_of_week(year: u16, month: u8, day: u8) -> Weekday {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let m = month.clamp(1, 12);
    let y = if m < 3 { year - 1 } else { year };
    let dow = (y + y / 4 - y / 100 + y / 400 + OFFSETS[(m - 1) as usize] + day as u16) % 7;
    Weekday::from_index(dow as u8)
}

// ═══════════════════════════════════════════════════════════════
//  Calendar state
// ═══════════════════════════════════════════════════════════════

/// Wall-clock date and time.  `weekday` is always derived from the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub(crate) year: u16,
    /// Zero-based month (0 = January).
    pub(crate) month: u8,
    pub(crate) day: u8,
    pub(crate) weekday: Weekday,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) second: u8,
}

impl Default for Calendar {
    /// Power-on value: 2008-01-01 00:00:00.
    fn default() -> Self {
        Self {
            year: MIN_YEAR,
            month: 0,
            day: 1,
            weekday: day_of_week(MIN_YEAR, 1, 1),
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl Calendar {
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Zero-based month.
    pub fn month0(&self) -> u8 {
        self.month
    }

    /// One-based month, as presented on the wire and in text.
    pub fn month(&self) -> u8 {
        self.month + 1
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Minutes since local midnight (`0..1440`).
    pub fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Advance by one second, cascading through every calendar field.
    pub(crate) fn tick_second(&mut self) {
        self.second += 1;
        if self.second < 60 {
            return;
        }
        self.second = 0;
        self.minute += 1;
        if self.minute < 60 {
            return;
        }
        self.minute = 0;
        self.hour += 1;
        if self.hour < 24 {
            return;
        }
        self.hour = 0;
        self.day += 1;
        let limit = DAYS_IN_MONTH[self.month as usize];
        if self.day > limit || (self.month == 1 && self.day == 29 && !is_leap_year(self.year)) {
            self.day = 1;
            self.month += 1;
            if self.month >= 12 {
                self.month = 0;
                self.year += 1;
            }
        }
        self.weekday = day_of_week(self.year, self.month + 1, self.day);
    }
}

//! Unified error types for the irrigation controller core.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level pass loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through the scheduler and status paths without
//! allocation.
//!
//! Only two error classes travel as `Result`s: validation failures (clock
//! set, configuration) and capacity conditions (auto-start queue full).
//! Environmental faults and software error conditions are sticky bits in
//! [`Registers`](crate::registers::Registers), not errors.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A clock-set request carried an out-of-range field.
    Clock(ClockError),
    /// A schedule slot could not be acted on.
    Schedule(ScheduleError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

/// The first field that failed validation in a clock-set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Year outside the supported 2008–2099 span.
    YearOutOfRange,
    /// Month outside 1–12.
    MonthOutOfRange,
    /// Day is zero or beyond the month's length.
    DayOutOfRange,
    /// Hour above 23.
    HourOutOfRange,
    /// Minute above 59.
    MinuteOutOfRange,
    /// Second above 59.
    SecondOutOfRange,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YearOutOfRange => write!(f, "year out of range"),
            Self::MonthOutOfRange => write!(f, "month out of range"),
            Self::DayOutOfRange => write!(f, "day out of range"),
            Self::HourOutOfRange => write!(f, "hour out of range"),
            Self::MinuteOutOfRange => write!(f, "minute out of range"),
            Self::SecondOutOfRange => write!(f, "second out of range"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// A program is already pending or running; the slot is missed.
    QueueFull { program: u8 },
    /// Program index beyond the schedule table.
    UnknownProgram { program: u8 },
    /// Slot minute is not a valid minute-of-day.
    SlotOutOfRange { minute: u16 },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull { program } => {
                write!(f, "auto-start queue full (program {program})")
            }
            Self::UnknownProgram { program } => write!(f, "unknown program {program}"),
            Self::SlotOutOfRange { minute } => {
                write!(f, "slot minute {minute} out of range")
            }
        }
    }
}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Core-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

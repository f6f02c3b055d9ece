//! Text rendering for times, dates, up-time and run-time durations.
//!
//! Every helper writes into a stack-allocated `heapless::String`; capacities
//! are sized for the longest possible output so writes cannot fail.

use core::fmt::Write;

use heapless::String;

use super::calendar::{Calendar, month_name};
use crate::config::TimeFormat;

/// "12:59 PM" / "23:59" / "23.59".
pub type HourMinute = String<8>;
/// "Thu Feb 29, 2024 12:00 PM".
pub type DateTimeText = String<32>;
/// "YYYY-MM-DD HH:MM:SS".
pub type DebugTimestamp = String<19>;
/// "49710 days 06:28:15".
pub type UptimeText = String<24>;
/// "1193046:28:15".
pub type RunTimeText = String<16>;

/// Render an hour and minute in the chosen style.
///
/// * `TwelveHour`: `h:MM AM`, hour 0 shows as 12, no leading zero.
/// * `TwentyFourHourUs`: `HH:MM`.
/// * `TwentyFourHourRegional`: `HH.MM`.
pub fn hour_minute(hour: u8, minute: u8, style: TimeFormat) -> HourMinute {
    let mut out = HourMinute::new();
    let _ = match style {
        TimeFormat::TwelveHour => {
            let suffix = if hour < 12 { "AM" } else { "PM" };
            let h12 = match hour % 12 {
                0 => 12,
                h => h,
            };
            write!(out, "{}:{:02} {}", h12, minute, suffix)
        }
        TimeFormat::TwentyFourHourUs => write!(out, "{:02}:{:02}", hour, minute),
        TimeFormat::TwentyFourHourRegional => write!(out, "{:02}.{:02}", hour, minute),
    };
    out
}

/// Full human-readable date and time: `Thu Feb 29, 2024 12:00 PM`.
pub fn date_time(cal: &Calendar, style: TimeFormat) -> DateTimeText {
    let mut out = DateTimeText::new();
    let _ = write!(
        out,
        "{} {} {}, {} {}",
        cal.weekday().short_name(),
        month_name(cal.month0()),
        cal.day(),
        cal.year(),
        hour_minute(cal.hour(), cal.minute(), style),
    );
    out
}

/// ISO-like date and time used to prefix diagnostic text.
pub fn debug_timestamp(cal: &Calendar) -> DebugTimestamp {
    let mut out = DebugTimestamp::new();
    let _ = write!(
        out,
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        cal.year(),
        cal.month(),
        cal.day(),
        cal.hour(),
        cal.minute(),
        cal.second(),
    );
    out
}

/// Elapsed up-time as `N day(s) HH:MM:SS`.
pub fn uptime(total_secs: u32) -> UptimeText {
    let days = total_secs / 86_400;
    let rem = total_secs % 86_400;
    let mut out = UptimeText::new();
    let _ = write!(
        out,
        "{} {} {:02}:{:02}:{:02}",
        days,
        if days == 1 { "day" } else { "days" },
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    );
    out
}

/// Run time given in minutes as `H:MM`.
pub fn run_minutes(minutes: u32) -> RunTimeText {
    let mut out = RunTimeText::new();
    let _ = write!(out, "{}:{:02}", minutes / 60, minutes % 60);
    out
}

/// Run time given in seconds as `H:MM:SS`.
pub fn run_seconds(secs: u32) -> RunTimeText {
    let mut out = RunTimeText::new();
    let _ = write!(
        out,
        "{}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    );
    out
}

//! Fuzz target: `ClockEngine::set_clock` followed by ticking
//!
//! Feeds arbitrary field values to `set_clock`, then advances the clock by
//! an arbitrary number of seconds, verifying:
//! - No panics for any input
//! - A rejected set leaves the calendar untouched
//! - The weekday always matches the date
//!
//! cargo fuzz run fuzz_set_clock

#![no_main]

use irrigation_core::clock::ClockEngine;
use irrigation_core::clock::calendar::day_of_week;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    let year = u16::from_be_bytes([data[0], data[1]]);
    let (month, day, hour, minute, second) = (data[2], data[3], data[4], data[5], data[6]);
    let ticks = u16::from_be_bytes([data[7], data[8]]);

    let mut clock = ClockEngine::new();
    let before = *clock.calendar();
    if clock.set_clock(year, month, day, hour, minute, second).is_err() {
        assert_eq!(*clock.calendar(), before, "rejected set must not mutate");
    }

    for _ in 0..ticks {
        clock.advance_one_second();
    }
    let cal = clock.calendar();
    assert_eq!(cal.weekday(), day_of_week(cal.year(), cal.month(), cal.day()));
    assert!(cal.hour() <= 23 && cal.minute() <= 59 && cal.second() <= 59);
});

//! Peripheral drivers: watchdog and low-power control.

pub mod sleep;
pub mod watchdog;

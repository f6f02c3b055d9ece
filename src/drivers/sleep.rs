//! Low-power control for riding out a primary-rail outage.
//!
//! Implements [`PowerControl`]:
//!
//! - peripheral shutdown / restart drives a load-switch enable pin that
//!   feeds everything except the MCU and RTC;
//! - the low-power wait is ESP-IDF light sleep with a one-second timer
//!   wakeup (the tick interrupt), or a thread sleep on host;
//! - the reset wait spins without taming the watchdog.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::PowerControl;

/// Light-sleep wakeup period.
pub const WAKE_INTERVAL_US: u64 = 1_000_000;

/// Sleep and peripheral power control.
pub struct SleepControl<P> {
    peripheral_enable: P,
    peripherals_on: bool,
}

impl<P: OutputPin> SleepControl<P> {
    /// Takes the load-switch enable pin and powers peripherals up.
    pub fn new(peripheral_enable: P) -> Self {
        let mut ctl = Self {
            peripheral_enable,
            peripherals_on: false,
        };
        ctl.restart_peripherals();
        ctl
    }

    pub fn peripherals_on(&self) -> bool {
        self.peripherals_on
    }
}

impl<P: OutputPin> PowerControl for SleepControl<P> {
    fn shutdown_peripherals(&mut self) {
        // Called just before the retention loop; logging is still allowed.
        if self.peripheral_enable.set_low().is_err() {
            warn!("Peripheral load switch did not open");
        }
        self.peripherals_on = false;
    }

    #[cfg(feature = "espidf")]
    fn enter_low_power_wait(&mut self) {
        unsafe {
            esp_idf_svc::sys::esp_sleep_enable_timer_wakeup(WAKE_INTERVAL_US);
            esp_idf_svc::sys::esp_light_sleep_start();
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn enter_low_power_wait(&mut self) {
        std::thread::sleep(std::time::Duration::from_micros(WAKE_INTERVAL_US));
    }

    fn restart_peripherals(&mut self) {
        if self.peripheral_enable.set_high().is_err() {
            warn!("Peripheral load switch did not close");
        }
        self.peripherals_on = true;
    }

    #[cfg(feature = "espidf")]
    fn await_watchdog_reset(&mut self) {
        loop {
            core::hint::spin_loop();
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn await_watchdog_reset(&mut self) {
        warn!("SleepControl(sim): watchdog reset requested, returning");
    }
}

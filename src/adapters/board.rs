//! Board bundle: one value implementing every board port.
//!
//! The scheduler takes a single `&mut impl Board`; this adapter assembles
//! one from its parts and delegates each port to the part that owns it.

use crate::adapters::time::UptimeTicks;
use crate::app::ports::{
    IndicatorPort, PowerControl, RailSensors, TickSource, WatchdogPort,
};
use crate::drivers::watchdog::Watchdog;

pub struct BoardAdapter<R, I, P> {
    pub rails: R,
    pub indicators: I,
    pub power: P,
    pub ticks: UptimeTicks,
    pub watchdog: Watchdog,
}

impl<R, I, P> BoardAdapter<R, I, P>
where
    R: RailSensors,
    I: IndicatorPort,
    P: PowerControl,
{
    pub fn new(rails: R, indicators: I, power: P) -> Self {
        Self {
            rails,
            indicators,
            power,
            ticks: UptimeTicks::new(),
            watchdog: Watchdog::new(),
        }
    }
}

impl<R, I, P> TickSource for BoardAdapter<R, I, P> {
    fn current_seconds(&self) -> u32 {
        self.ticks.current_seconds()
    }

    fn current_millis(&self) -> u32 {
        self.ticks.current_millis()
    }
}

impl<R: RailSensors, I, P> RailSensors for BoardAdapter<R, I, P> {
    fn primary_rail_ok(&mut self) -> bool {
        self.rails.primary_rail_ok()
    }

    fn secondary_rail_ok(&mut self) -> bool {
        self.rails.secondary_rail_ok()
    }
}

impl<R, I, P> WatchdogPort for BoardAdapter<R, I, P> {
    fn tame(&mut self) {
        self.watchdog.tame();
    }
}

impl<R, I, P: PowerControl> PowerControl for BoardAdapter<R, I, P> {
    fn shutdown_peripherals(&mut self) {
        self.power.shutdown_peripherals();
    }

    fn enter_low_power_wait(&mut self) {
        self.power.enter_low_power_wait();
    }

    fn restart_peripherals(&mut self) {
        self.power.restart_peripherals();
    }

    fn await_watchdog_reset(&mut self) {
        self.power.await_watchdog_reset();
    }
}

impl<R, I: IndicatorPort, P> IndicatorPort for BoardAdapter<R, I, P> {
    fn set_error_indicator(&mut self, on: bool) {
        self.indicators.set_error_indicator(on);
    }

    fn set_fault_indicator(&mut self, on: bool) {
        self.indicators.set_fault_indicator(on);
    }
}

//! Hardware adapters over `embedded-hal` digital pins.
//!
//! The board-specific HAL hands over pins; everything here is generic over
//! the `embedded_hal::digital` traits so the same code runs against
//! ESP-IDF GPIO drivers on target and plain fakes in host tests.
//!
//! | Adapter          | Implements     | Pins                          |
//! |------------------|----------------|-------------------------------|
//! | [`RailMonitor`]  | RailSensors    | two power-good inputs         |
//! | [`IndicatorLeds`]| IndicatorPort  | error LED, fault LED outputs  |

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{IndicatorPort, RailSensors};

// ── Rail sense ────────────────────────────────────────────────

/// Power-good sense for the primary and secondary rails.  Inputs read
/// high while the rail is present.  A failed read counts as rail lost.
///
/// No logging here: the primary read also runs inside the low-power
/// retention loop.
pub struct RailMonitor<P, S> {
    primary: P,
    secondary: S,
}

impl<P: InputPin, S: InputPin> RailMonitor<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: InputPin, S: InputPin> RailSensors for RailMonitor<P, S> {
    fn primary_rail_ok(&mut self) -> bool {
        self.primary.is_high().unwrap_or(false)
    }

    fn secondary_rail_ok(&mut self) -> bool {
        self.secondary.is_high().unwrap_or(false)
    }
}

// ── Indicators ────────────────────────────────────────────────

/// Aggregate error and fault LEDs, active high.
pub struct IndicatorLeds<E, F> {
    error: E,
    fault: F,
}

impl<E: OutputPin, F: OutputPin> IndicatorLeds<E, F> {
    /// Takes the pins and switches both LEDs off.
    pub fn new(error: E, fault: F) -> Self {
        let mut leds = Self { error, fault };
        leds.set_error_indicator(false);
        leds.set_fault_indicator(false);
        leds
    }
}

fn drive(pin: &mut impl OutputPin, on: bool) {
    let res = if on { pin.set_high() } else { pin.set_low() };
    if res.is_err() {
        log::warn!("Indicator pin write failed");
    }
}

impl<E: OutputPin, F: OutputPin> IndicatorPort for IndicatorLeds<E, F> {
    fn set_error_indicator(&mut self, on: bool) {
        drive(&mut self.error, on);
    }

    fn set_fault_indicator(&mut self, on: bool) {
        drive(&mut self.fault, on);
    }
}

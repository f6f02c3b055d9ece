//! Fault and error registers.
//!
//! Two independent sticky bitsets:
//!
//! * **errors** (16 bits): software conditions, e.g. clock never set.
//! * **faults** (32 bits): hardware conditions, e.g. secondary rail lost.
//!
//! ## Bit lifecycle
//!
//! 1. A subsystem detects a condition and sets its bit.
//! 2. Every set/clear recomputes the aggregate (any bit ⇒ indicator on)
//!    and drives the matching indicator output once.
//! 3. The bit stays set until the subsystem that owns it clears it.
//!    Nothing expires on its own.
//!
//! Bit indices past the register width are ignored, so newer callers can
//! name bits an older core does not know about.

use core::fmt;

use crate::app::ports::IndicatorPort;
use log::{error, info};

/// Width of the error register.
pub const ERROR_BITS: u8 = 16;
/// Width of the fault register.
pub const FAULT_BITS: u8 = 32;

/// Named software error bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorFlag {
    /// The wall clock has not been set since boot.
    ClockNotSet = 0,
    /// Stored configuration failed its checksum.
    ConfigChecksum = 1,
    /// Schedule table rejected by validation.
    ScheduleInvalid = 2,
}

impl ErrorFlag {
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ErrorFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockNotSet => write!(f, "clock not set"),
            Self::ConfigChecksum => write!(f, "config checksum"),
            Self::ScheduleInvalid => write!(f, "schedule invalid"),
        }
    }
}

/// Named hardware fault bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultFlag {
    /// Secondary (valve supply) rail is down.
    SecondaryRail = 0,
    /// Moisture probe unreadable.
    MoistureSensor = 1,
    /// Valve driver reports over-current.
    ValveOverCurrent = 2,
    /// Radio module unresponsive.
    Radio = 3,
}

impl FaultFlag {
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FaultFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecondaryRail => write!(f, "secondary rail down"),
            Self::MoistureSensor => write!(f, "moisture sensor"),
            Self::ValveOverCurrent => write!(f, "valve over-current"),
            Self::Radio => write!(f, "radio"),
        }
    }
}

/// The two register banks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    errors: u16,
    faults: u32,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Errors ────────────────────────────────────────────────

    pub fn set_error(&mut self, bit: u8, indicator: &mut dyn IndicatorPort) {
        if bit >= ERROR_BITS {
            return;
        }
        if self.errors & (1 << bit) == 0 {
            error!("ERROR SET: bit {bit}");
        }
        self.errors |= 1 << bit;
        indicator.set_error_indicator(self.errors != 0);
    }

    pub fn clear_error(&mut self, bit: u8, indicator: &mut dyn IndicatorPort) {
        if bit >= ERROR_BITS {
            return;
        }
        if self.errors & (1 << bit) != 0 {
            info!("ERROR CLEARED: bit {bit}");
        }
        self.errors &= !(1 << bit);
        indicator.set_error_indicator(self.errors != 0);
    }

    pub fn is_error_set(&self, bit: u8) -> bool {
        bit < ERROR_BITS && self.errors & (1 << bit) != 0
    }

    pub fn raise(&mut self, flag: ErrorFlag, indicator: &mut dyn IndicatorPort) {
        self.set_error(flag.bit(), indicator);
    }

    pub fn resolve(&mut self, flag: ErrorFlag, indicator: &mut dyn IndicatorPort) {
        self.clear_error(flag.bit(), indicator);
    }

    pub fn has_error(&self, flag: ErrorFlag) -> bool {
        self.is_error_set(flag.bit())
    }

    /// Whole error register.
    pub fn errors(&self) -> u16 {
        self.errors
    }

    // ── Faults ────────────────────────────────────────────────

    pub fn set_fault(&mut self, bit: u8, indicator: &mut dyn IndicatorPort) {
        if bit >= FAULT_BITS {
            return;
        }
        if self.faults & (1 << bit) == 0 {
            error!("FAULT SET: bit {bit}");
        }
        self.faults |= 1 << bit;
        indicator.set_fault_indicator(self.faults != 0);
    }

    pub fn clear_fault(&mut self, bit: u8, indicator: &mut dyn IndicatorPort) {
        if bit >= FAULT_BITS {
            return;
        }
        if self.faults & (1 << bit) != 0 {
            info!("FAULT CLEARED: bit {bit}");
        }
        self.faults &= !(1 << bit);
        indicator.set_fault_indicator(self.faults != 0);
    }

    pub fn is_fault_set(&self, bit: u8) -> bool {
        bit < FAULT_BITS && self.faults & (1 << bit) != 0
    }

    pub fn has_fault(&self, flag: FaultFlag) -> bool {
        self.is_fault_set(flag.bit())
    }

    /// Whole fault register.
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// True if **any** error bit is set.
    pub fn any_error(&self) -> bool {
        self.errors != 0
    }

    /// True if **any** fault bit is set.
    pub fn any_fault(&self) -> bool {
        self.faults != 0
    }
}

//! System configuration parameters
//!
//! All tunable parameters consumed by the supervisory core, including the
//! schedule table.  Persisting them is the configuration subsystem's job;
//! this module only defines the in-memory model and its serde shape.

use serde::{Deserialize, Serialize};

use crate::clock::calendar::{IrrigationDay, MINUTES_PER_DAY};
use crate::error::{Error, Result, ScheduleError};

/// Number of irrigation programs in the schedule table.
pub const PROGRAM_COUNT: usize = 4;

/// Clock display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// `h:MM AM`
    #[default]
    TwelveHour,
    /// `HH:MM`
    TwentyFourHourUs,
    /// `HH.MM`
    TwentyFourHourRegional,
}

/// Start minute-of-day per (irrigation weekday, program).  `None` = no start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTable {
    slots: [[Option<u16>; PROGRAM_COUNT]; 7],
}

impl ScheduleTable {
    /// Slot for `program` on `day`, or `None` if unset or out of range.
    pub fn slot(&self, day: IrrigationDay, program: usize) -> Option<u16> {
        self.slots[day.index()].get(program).copied().flatten()
    }

    pub fn set_slot(
        &mut self,
        day: IrrigationDay,
        program: usize,
        minute: Option<u16>,
    ) -> Result<()> {
        if let Some(m) = minute.filter(|m| *m >= MINUTES_PER_DAY) {
            return Err(ScheduleError::SlotOutOfRange { minute: m }.into());
        }
        let cell = self.slots[day.index()]
            .get_mut(program)
            .ok_or(ScheduleError::UnknownProgram { program: program as u8 })?;
        *cell = minute;
        Ok(())
    }

    /// Set the same slot for `program` on every day of the week.
    pub fn set_daily(&mut self, program: usize, minute: Option<u16>) -> Result<()> {
        for day in IrrigationDay::ALL {
            self.set_slot(day, program, minute)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let in_range = self
            .slots
            .iter()
            .flatten()
            .flatten()
            .all(|m| *m < MINUTES_PER_DAY);
        if in_range {
            Ok(())
        } else {
            Err(Error::Config("schedule slot beyond end of day"))
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Display ---
    /// Style used by the hour:minute and date-time helpers
    pub time_format: TimeFormat,

    // --- Pulse mode / multi-unit ---
    /// Pulse-mode operation across several controllers
    pub pulse_mode: bool,
    /// This unit drives the other controllers
    pub is_master: bool,
    /// Minutes before a slot at which a slave probes the master
    pub pulse_lead_minutes: u16,

    // --- Timing ---
    /// Expected upper bound for one scheduler pass (milliseconds)
    pub pass_budget_ms: u32,

    // --- Schedule ---
    pub schedule: ScheduleTable,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::TwelveHour,

            pulse_mode: false,
            is_master: true,
            pulse_lead_minutes: 2,

            pass_budget_ms: 50,

            schedule: ScheduleTable::default(),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.pulse_lead_minutes >= MINUTES_PER_DAY {
            return Err(Error::Config("pulse lead time must be under one day"));
        }
        if self.pass_budget_ms == 0 {
            return Err(Error::Config("pass budget must be non-zero"));
        }
        self.schedule.validate()
    }

    /// 16-bit wrapping byte sum over the postcard encoding.
    ///
    /// Reported in the extended status block so a remote monitor can
    /// detect configuration drift.
    pub fn checksum(&self) -> Result<u16> {
        let mut buf = [0u8; 256];
        let bytes = postcard::to_slice(self, &mut buf)
            .map_err(|_| Error::Config("config does not fit checksum buffer"))?;
        Ok(bytes
            .iter()
            .fold(0u16, |acc, b| acc.wrapping_add(*b as u16)))
    }
}

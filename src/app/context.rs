//! Shared mutable context threaded through every core operation.
//!
//! `SystemContext` is the single struct the scheduler, the power-fail
//! handler and status reporting read from and write to: the clock, the
//! event log, the registers, the operating flags, per-program schedule
//! state and configuration.  It is owned by the main loop and lent out by
//! `&mut`, so there is exactly one writer at a time and no locks.

use log::{info, warn};

use crate::app::ports::IndicatorPort;
use crate::clock::ClockEngine;
use crate::clock::format::{DateTimeText, HourMinute};
use crate::config::{PROGRAM_COUNT, SystemConfig};
use crate::error::ClockError;
use crate::event_log::{EVENT_LOG_CAPACITY, EventKind, EventLog};
use crate::registers::{ErrorFlag, Registers};
use crate::status::{self, EXTENDED_STATUS_LEN, OperatingStatus, WateringTotals};

/// Per-program schedule bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleState {
    /// A stop command arrived for this program's current slot; the slot
    /// must not restart it.  Cleared once the slot time has passed.
    pub stop_pending: [bool; PROGRAM_COUNT],
}

impl ScheduleState {
    /// Hold off today's slot for `program`.  Out-of-range programs are ignored.
    pub fn request_stop(&mut self, program: usize) {
        if let Some(flag) = self.stop_pending.get_mut(program) {
            *flag = true;
        }
    }
}

/// The shared context.
pub struct SystemContext {
    pub clock: ClockEngine,
    pub log: EventLog<EVENT_LOG_CAPACITY>,
    pub registers: Registers,
    pub status: OperatingStatus,
    pub schedule: ScheduleState,
    pub config: SystemConfig,
}

impl SystemContext {
    /// Fresh context at boot.  The clock has not been set, so that error is
    /// raised immediately.
    ///
    /// A config that fails [`SystemConfig::validate`] is replaced by the
    /// defaults and `ScheduleInvalid` is raised; the scheduler only ever
    /// sees validated values.
    pub fn new(config: SystemConfig, indicator: &mut dyn IndicatorPort) -> Self {
        let mut ctx = Self {
            clock: ClockEngine::new(),
            log: EventLog::new(),
            registers: Registers::new(),
            status: OperatingStatus::default(),
            schedule: ScheduleState::default(),
            config: SystemConfig::default(),
        };
        ctx.registers.raise(ErrorFlag::ClockNotSet, indicator);
        ctx.log_event(EventKind::Boot, 0);
        if let Err(e) = ctx.apply_config(config, indicator) {
            warn!("Config rejected at boot ({}), running on defaults", e);
            ctx.registers.raise(ErrorFlag::ScheduleInvalid, indicator);
        }
        ctx
    }

    /// Install a new config if it validates.  On success `ScheduleInvalid`
    /// clears; on failure the running config is kept.
    pub fn apply_config(
        &mut self,
        config: SystemConfig,
        indicator: &mut dyn IndicatorPort,
    ) -> crate::error::Result<()> {
        config.validate()?;
        self.config = config;
        self.registers.resolve(ErrorFlag::ScheduleInvalid, indicator);
        Ok(())
    }

    /// Append to the event log, stamped with the clock's millisecond counter.
    pub fn log_event(&mut self, kind: EventKind, data: u16) {
        self.log.append(self.clock.millis(), kind, data);
    }

    /// Validated clock set.  On success the clock-not-set error clears and a
    /// `ClockSet` record is logged; on failure nothing changes.
    #[allow(clippy::too_many_arguments)]
    pub fn set_clock(
        &mut self,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        indicator: &mut dyn IndicatorPort,
    ) -> Result<(), ClockError> {
        self.clock.set_clock(year, month, day, hour, minute, second)?;
        self.registers.resolve(ErrorFlag::ClockNotSet, indicator);
        self.log_event(EventKind::ClockSet, year);
        info!("Clock set to {}", self.date_time_text());
        Ok(())
    }

    // ── Display ──────────────────────────────────────────────

    /// Current hour and minute in the configured style.
    pub fn time_text(&self) -> HourMinute {
        self.clock.format_hour_minute(self.config.time_format)
    }

    /// Current date and time in the configured style.
    pub fn date_time_text(&self) -> DateTimeText {
        self.clock.format_date_time(self.config.time_format)
    }

    // ── Status reporting ─────────────────────────────────────

    /// `[exception, status]` for remote queries.
    pub fn status_bytes(&self) -> [u8; 2] {
        [
            status::exception_byte(&self.status, &self.registers),
            status::status_byte(&self.status, &self.config),
        ]
    }

    /// 17-byte extended status block.  An unencodable config reports a
    /// zero checksum.
    pub fn extended_status(&self, totals: WateringTotals) -> [u8; EXTENDED_STATUS_LEN] {
        status::extended_status(
            &self.registers,
            self.config.checksum().unwrap_or(0),
            self.clock.calendar(),
            totals,
        )
    }
}

//! Operating state and the status bytes reported to remote monitors.
//!
//! ```text
//!  exception byte            status byte
//!  ┌─┬─┬─┬─┬─┬─┬─┬─┐         ┌─┬─┬─┬─┬─────────┐
//!  │ │ │ │P│F│E│I│O│         │U│M│ │ │  state  │
//!  └─┴─┴─┴─┴─┴─┴─┴─┘         └─┴─┴─┴─┴─────────┘
//!   O off  I inhibited        state  low nibble (OperatingState)
//!   E software error          M      unit is master
//!   F hardware fault          U      pulse mode enabled
//!   P paused
//! ```
//!
//! The extended block is a fixed 17-byte big-endian layout:
//!
//! | offset | len | field                          |
//! |--------|-----|--------------------------------|
//! | 0      | 2   | error register                 |
//! | 2      | 4   | fault register                 |
//! | 6      | 2   | configuration checksum         |
//! | 8      | 5   | year-2000, month, day, hour, minute |
//! | 13     | 2   | today's watering minutes       |
//! | 15     | 2   | yesterday's watering minutes   |

use crate::clock::calendar::Calendar;
use crate::config::SystemConfig;
use crate::registers::Registers;

pub const EXC_OFF: u8 = 0x01;
pub const EXC_INHIBITED: u8 = 0x02;
pub const EXC_SOFTWARE_ERROR: u8 = 0x04;
pub const EXC_HARDWARE_FAULT: u8 = 0x08;
pub const EXC_PAUSED: u8 = 0x10;

pub const STATUS_STATE_MASK: u8 = 0x0F;
pub const STATUS_MASTER: u8 = 0x40;
pub const STATUS_PULSE_MODE: u8 = 0x80;

/// Length of the extended status block.
pub const EXTENDED_STATUS_LEN: usize = 17;

/// Top-level operating state, set by command handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OperatingState {
    #[default]
    Idle = 0,
    Autorun = 1,
    Test = 2,
    Manual = 3,
    Force = 4,
}

/// Operating state plus the mode flags read by the power-fail handler and
/// status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingStatus {
    pub state: OperatingState,
    pub auto_enabled: bool,
    pub inhibited: bool,
    /// Irrigation paused by the power-fail handler.
    pub paused: bool,
    /// A command handler asked for a hardware reset.
    pub reset_requested: bool,
    /// A remotely commanded start is in effect; scheduled starts are held off.
    pub remote_start_suppressed: bool,
}

impl Default for OperatingStatus {
    fn default() -> Self {
        Self {
            state: OperatingState::Idle,
            auto_enabled: true,
            inhibited: false,
            paused: false,
            reset_requested: false,
            remote_start_suppressed: false,
        }
    }
}

/// Accumulated watering minutes, owned by the irrigation subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WateringTotals {
    pub today_minutes: u16,
    pub yesterday_minutes: u16,
}

/// Exception bitset for remote queries.
pub fn exception_byte(status: &OperatingStatus, regs: &Registers) -> u8 {
    let mut byte = 0;
    if !status.auto_enabled {
        byte |= EXC_OFF;
    }
    if status.inhibited {
        byte |= EXC_INHIBITED;
    }
    if regs.any_error() {
        byte |= EXC_SOFTWARE_ERROR;
    }
    if regs.any_fault() {
        byte |= EXC_HARDWARE_FAULT;
    }
    if status.paused {
        byte |= EXC_PAUSED;
    }
    byte
}

/// Operating-state nibble with the mode bits on top.
pub fn status_byte(status: &OperatingStatus, config: &SystemConfig) -> u8 {
    let mut byte = status.state as u8 & STATUS_STATE_MASK;
    if config.is_master {
        byte |= STATUS_MASTER;
    }
    if config.pulse_mode {
        byte |= STATUS_PULSE_MODE;
    }
    byte
}

/// Fill the 17-byte extended status block.
pub fn extended_status(
    regs: &Registers,
    config_checksum: u16,
    calendar: &Calendar,
    totals: WateringTotals,
) -> [u8; EXTENDED_STATUS_LEN] {
    let mut out = [0u8; EXTENDED_STATUS_LEN];
    out[0..2].copy_from_slice(&regs.errors().to_be_bytes());
    out[2..6].copy_from_slice(&regs.faults().to_be_bytes());
    out[6..8].copy_from_slice(&config_checksum.to_be_bytes());
    out[8] = (calendar.year() - 2000) as u8;
    out[9] = calendar.month();
    out[10] = calendar.day();
    out[11] = calendar.hour();
    out[12] = calendar.minute();
    out[13..15].copy_from_slice(&totals.today_minutes.to_be_bytes());
    out[15..17].copy_from_slice(&totals.yesterday_minutes.to_be_bytes());
    out
}

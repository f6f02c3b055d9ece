//! Placeholder subsystems for a core running without its collaborators.
//!
//! The supervisory core is built and brought up before the irrigation,
//! moisture, UI, radio and configuration-store subsystems are attached.
//! [`DetachedSubsystem`] stands in for all five: every poll is a no-op,
//! queries report an idle subsystem, and the calls the core makes are
//! counted so bring-up logs show the scheduler is alive.

use log::debug;

use crate::app::ports::{
    ConfigStorePort, IrrigationPort, MoisturePort, RadioPort, SubsystemPoll, YieldPoint,
};
use crate::status::WateringTotals;

#[derive(Debug, Default)]
pub struct DetachedSubsystem {
    name: &'static str,
    polls: u64,
    queued: Option<usize>,
    paused: bool,
}

impl DetachedSubsystem {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl SubsystemPoll for DetachedSubsystem {
    fn poll(&mut self, _yield_point: &mut dyn YieldPoint) {
        self.polls = self.polls.wrapping_add(1);
    }
}

impl MoisturePort for DetachedSubsystem {
    fn force_resample(&mut self) {
        debug!("{}: resample requested", self.name);
    }
}

impl IrrigationPort for DetachedSubsystem {
    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_watering(&self) -> bool {
        false
    }

    fn is_program_pending_or_running(&self) -> bool {
        self.queued.is_some()
    }

    fn queue_auto_start(&mut self, program: usize) {
        debug!("{}: program {} queued, nothing attached to run it", self.name, program);
        self.queued = Some(program);
    }

    fn rollover_daily_totals(&mut self) {
        // Nothing attached to run programs, so nothing ran today.
        self.queued = None;
    }

    fn watering_totals(&self) -> WateringTotals {
        WateringTotals::default()
    }
}

impl RadioPort for DetachedSubsystem {
    fn probe_master(&mut self, program: usize) {
        debug!("{}: master probe for program {} dropped", self.name, program);
    }

    fn reinitialize(&mut self) {
        debug!("{}: reinitialize", self.name);
    }
}

impl ConfigStorePort for DetachedSubsystem {
    fn write_in_progress(&self) -> bool {
        false
    }
}

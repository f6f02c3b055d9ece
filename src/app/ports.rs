//! Port traits: the hexagonal boundary between the supervisory core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler / PowerFailHandler / ClockEngine
//! ```
//!
//! Two groups:
//!
//! * **Board ports** (tick source, rails, watchdog, power control,
//!   indicators) are implemented by one hardware adapter and bundled by
//!   the [`Board`] blanket trait.
//! * **Subsystem ports** (moisture, irrigation, UI, radio, configuration)
//!   each expose a single non-blocking [`SubsystemPoll::poll`] plus the few
//!   queries the core needs.  Their internals are not the core's concern.
//!   Each poll receives a [`YieldPoint`] for long-running work.

use crate::status::WateringTotals;

// ───────────────────────────────────────────────────────────────
// Board ports
// ───────────────────────────────────────────────────────────────

/// Interrupt-driven time base.  Both counters start at zero at boot and
/// never decrement; `current_millis` wraps at `u32::MAX`.
pub trait TickSource {
    /// Whole seconds since boot.
    fn current_seconds(&self) -> u32;

    /// Milliseconds since boot.
    fn current_millis(&self) -> u32;
}

/// Power-good sense lines for the two monitored rails.
pub trait RailSensors {
    /// Mains/primary supply present.
    fn primary_rail_ok(&mut self) -> bool;

    /// Valve/secondary supply present.
    fn secondary_rail_ok(&mut self) -> bool;
}

/// Hardware watchdog.
pub trait WatchdogPort {
    /// Extend the watchdog deadline.
    fn tame(&mut self);
}

/// Low-power control used while riding out a primary-rail outage.
pub trait PowerControl {
    /// Switch off every peripheral not needed for time keeping.
    fn shutdown_peripherals(&mut self);

    /// Sleep until the next tick interrupt.
    fn enter_low_power_wait(&mut self);

    /// Bring peripherals back after power is restored.
    fn restart_peripherals(&mut self);

    /// Spin without taming the watchdog until it resets the device.
    /// Hosted implementations return immediately.
    fn await_watchdog_reset(&mut self);
}

/// Aggregate error / fault indicator outputs.
pub trait IndicatorPort {
    fn set_error_indicator(&mut self, on: bool);

    fn set_fault_indicator(&mut self, on: bool);
}

/// Everything the core needs from the board, in one bound.
pub trait Board: TickSource + RailSensors + WatchdogPort + PowerControl + IndicatorPort {}

impl<T> Board for T where T: TickSource + RailSensors + WatchdogPort + PowerControl + IndicatorPort {}

// ───────────────────────────────────────────────────────────────
// Subsystem ports
// ───────────────────────────────────────────────────────────────

/// Handed to every poll.  Work that may outlast the pass budget calls
/// [`yield_now`](YieldPoint::yield_now) between steps.
pub trait YieldPoint {
    /// Tame the watchdog and check both rails.  If the primary rail is
    /// down this returns only after the outage has been ridden out.
    fn yield_now(&mut self);
}

/// A subsystem driven by the scheduler once per pass.
///
/// `poll` must return within the normal pass budget, or call
/// `yield_point.yield_now()` often enough to stay inside it.
pub trait SubsystemPoll {
    fn poll(&mut self, yield_point: &mut dyn YieldPoint);
}

/// Soil moisture sampling.
pub trait MoisturePort: SubsystemPoll {
    /// Discard the current sample and measure again on the next poll.
    fn force_resample(&mut self);
}

/// Irrigation program execution.
pub trait IrrigationPort: SubsystemPoll {
    /// Stop water flow, keeping program progress.  Called once per pause.
    fn pause(&mut self);

    /// Continue a paused program.  Called once per resume.
    fn resume(&mut self);

    /// A valve is currently open.
    fn is_watering(&self) -> bool;

    /// A program is queued or running; the auto-start queue holds one.
    fn is_program_pending_or_running(&self) -> bool;

    /// Queue `program` for automatic start.
    fn queue_auto_start(&mut self, program: usize);

    /// Move today's watering total to yesterday and start a new day.
    fn rollover_daily_totals(&mut self);

    fn watering_totals(&self) -> WateringTotals;
}

/// Radio link to a monitoring station and, in pulse mode, other units.
pub trait RadioPort: SubsystemPoll {
    /// Ask the master unit whether `program` is about to start.
    fn probe_master(&mut self, program: usize);

    /// Re-initialise the link after a power outage.
    fn reinitialize(&mut self);
}

/// Persistent configuration store.
pub trait ConfigStorePort: SubsystemPoll {
    /// A flash write is in flight and must not be interrupted.
    fn write_in_progress(&self) -> bool;
}

/// The five external subsystems, in poll order.
pub struct Subsystems<'a> {
    pub moisture: &'a mut dyn MoisturePort,
    pub irrigation: &'a mut dyn IrrigationPort,
    pub ui: &'a mut dyn SubsystemPoll,
    pub radio: &'a mut dyn RadioPort,
    pub config: &'a mut dyn ConfigStorePort,
}

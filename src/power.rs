//! Power-fail handling for the two monitored supply rails.
//!
//! ```text
//!   primary rail lost                          secondary rail
//!   ─────────────────                          ──────────────
//!   tame ─▶ log PowerFail ─▶ pause             OK ─▶ not OK : log, set fault, pause
//!     ─▶ let irrigation react once             not OK ─▶ OK : log, clear fault, resume
//!     ─▶ log LowPowerEnter ─▶ shutdown
//!     ─▶ ┌──────────────── retention loop ───────────────┐
//!        │ sleep ─▶ tame ─▶ tick poll ─▶ minute check    │
//!        │ count consecutive OK seconds, exit at 3        │
//!        └───────────────────────────────────────────────┘
//!     ─▶ log outage length ─▶ restart ─▶ radio re-init
//!     ─▶ moisture resample ─▶ resume if secondary OK
//! ```
//!
//! The retention loop is the only blocking wait in the core.  Its body runs
//! in a restricted context: it touches the clock and the watchdog and reads
//! the rail, nothing else, and never logs.

use log::{info, warn};

use crate::app::context::SystemContext;
use crate::app::ports::{
    Board, IrrigationPort, MoisturePort, RadioPort, Subsystems, WatchdogPort, YieldPoint,
};
use crate::debug_line;
use crate::event_log::EventKind;
use crate::registers::FaultFlag;

/// Consecutive OK seconds required before the primary rail counts as back.
pub const RESTORE_HYSTERESIS_SECS: u8 = 3;

/// Detects rail loss and restoration and drives pause/resume.
#[derive(Debug, Default)]
pub struct PowerFailHandler {
    /// Uptime second at which the current or last outage began.
    fail_timestamp: u32,
    outages: u32,
    last_outage_secs: Option<u32>,
}

// ───────────────────────────────────────────────────────────────
// Peers
// ───────────────────────────────────────────────────────────────

/// Requests held back for a subsystem that was inside its own poll when
/// the handler needed it.  Delivered once that poll returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deferred {
    pub resample: bool,
    pub reinitialize: bool,
    pub rollovers: u32,
    /// Pause state irrigation last acted on, if it changed while absent.
    pub paused_before: Option<bool>,
}

impl Deferred {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn deliver_to_moisture(&self, moisture: &mut dyn MoisturePort) {
        if self.resample {
            moisture.force_resample();
        }
    }

    pub fn deliver_to_radio(&self, radio: &mut dyn RadioPort) {
        if self.reinitialize {
            radio.reinitialize();
        }
    }

    /// Replays missed rollovers, then the net pause change only: a pause
    /// and resume that both happened mid-poll cancel out.
    pub fn deliver_to_irrigation(&self, paused_now: bool, irrigation: &mut dyn IrrigationPort) {
        for _ in 0..self.rollovers {
            irrigation.rollover_daily_totals();
        }
        if self.paused_before.is_some_and(|before| before != paused_now) {
            if paused_now {
                irrigation.pause();
            } else {
                irrigation.resume();
            }
        }
    }
}

/// The subsystems the handler acts on.  A subsystem that is mid-poll is
/// absent and its requests go to [`Deferred`].
#[derive(Default)]
pub struct Peers<'a> {
    moisture: Option<&'a mut dyn MoisturePort>,
    irrigation: Option<&'a mut dyn IrrigationPort>,
    radio: Option<&'a mut dyn RadioPort>,
    deferred: Deferred,
}

impl<'a> Peers<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    /// Every peer present.
    pub fn all(subs: &'a mut Subsystems<'_>) -> Self {
        Self::none()
            .with_moisture(&mut *subs.moisture)
            .with_irrigation(&mut *subs.irrigation)
            .with_radio(&mut *subs.radio)
    }

    pub fn with_moisture(mut self, moisture: &'a mut dyn MoisturePort) -> Self {
        self.moisture = Some(moisture);
        self
    }

    pub fn with_irrigation(mut self, irrigation: &'a mut dyn IrrigationPort) -> Self {
        self.irrigation = Some(irrigation);
        self
    }

    pub fn with_radio(mut self, radio: &'a mut dyn RadioPort) -> Self {
        self.radio = Some(radio);
        self
    }

    pub fn deferred(&self) -> Deferred {
        self.deferred
    }

    /// Pause once; a second pause while already paused does nothing.
    fn pause_irrigation(&mut self, ctx: &mut SystemContext) {
        if !ctx.status.paused {
            self.set_paused(ctx, true);
        }
    }

    fn resume_irrigation(&mut self, ctx: &mut SystemContext) {
        if ctx.status.paused {
            self.set_paused(ctx, false);
        }
    }

    fn set_paused(&mut self, ctx: &mut SystemContext, paused: bool) {
        let before = ctx.status.paused;
        ctx.status.paused = paused;
        match self.irrigation.as_deref_mut() {
            Some(irrigation) if paused => irrigation.pause(),
            Some(irrigation) => irrigation.resume(),
            None => {
                self.deferred.paused_before.get_or_insert(before);
            }
        }
    }

    fn rollover_daily_totals(&mut self) {
        match self.irrigation.as_deref_mut() {
            Some(irrigation) => irrigation.rollover_daily_totals(),
            None => self.deferred.rollovers = self.deferred.rollovers.saturating_add(1),
        }
    }

    fn reinitialize_radio(&mut self) {
        match self.radio.as_deref_mut() {
            Some(radio) => radio.reinitialize(),
            None => self.deferred.reinitialize = true,
        }
    }

    fn force_resample(&mut self) {
        match self.moisture.as_deref_mut() {
            Some(moisture) => moisture.force_resample(),
            None => self.deferred.resample = true,
        }
    }
}

/// Yield point for a poll made while an outage is already being handled:
/// tames the watchdog and nothing else.
struct TameOnly<'a>(&'a mut dyn WatchdogPort);

impl YieldPoint for TameOnly<'_> {
    fn yield_now(&mut self) {
        self.0.tame();
    }
}

impl PowerFailHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of primary-rail outages ridden out since boot.
    pub fn outages(&self) -> u32 {
        self.outages
    }

    /// Length in seconds of the most recent outage.
    pub fn last_outage_secs(&self) -> Option<u32> {
        self.last_outage_secs
    }

    /// One power check.  Returns `true` when a primary-rail outage was
    /// ridden out during this call.
    pub fn check<B: Board>(
        &mut self,
        ctx: &mut SystemContext,
        board: &mut B,
        peers: &mut Peers<'_>,
    ) -> bool {
        let outage = !board.primary_rail_ok();
        if outage {
            self.ride_out_primary_loss(ctx, board, peers);
        }
        Self::check_secondary_rail(ctx, board, peers);
        outage
    }

    // ── Primary rail ─────────────────────────────────────────

    fn ride_out_primary_loss<B: Board>(
        &mut self,
        ctx: &mut SystemContext,
        board: &mut B,
        peers: &mut Peers<'_>,
    ) {
        board.tame();
        warn!("Primary rail lost, entering low-power retention");
        ctx.log_event(EventKind::PowerFail, 0);
        peers.pause_irrigation(ctx);
        // Absent when the outage was seen from irrigation's own poll, which
        // carries on by itself once the yield returns.
        if let Some(irrigation) = peers.irrigation.as_deref_mut().filter(|i| i.is_watering()) {
            irrigation.poll(&mut TameOnly(&mut *board));
        }
        ctx.log_event(EventKind::LowPowerEnter, 0);
        board.shutdown_peripherals();

        self.fail_timestamp = ctx.clock.uptime_secs();
        let counters = ctx.clock.counters_mut();
        counters.power_failures = counters.power_failures.saturating_add(1);

        Self::hold_until_restored(ctx, board, peers);

        let outage = ctx.clock.uptime_secs().wrapping_sub(self.fail_timestamp);
        if outage > u32::from(u16::MAX) {
            ctx.log_event(EventKind::PowerRestoredHigh, (outage >> 16) as u16);
            ctx.log_event(EventKind::PowerRestoredLow, outage as u16);
        } else {
            ctx.log_event(EventKind::PowerRestored, outage as u16);
        }
        self.outages = self.outages.wrapping_add(1);
        self.last_outage_secs = Some(outage);

        board.restart_peripherals();
        peers.reinitialize_radio();
        peers.force_resample();
        if board.secondary_rail_ok() {
            peers.resume_irrigation(ctx);
        }

        info!("Primary rail restored after {} s", outage);
        debug_line!(ctx.clock, "power restored, outage {} s", outage);
    }

    /// Block in low-power wait until the primary rail has read OK for
    /// [`RESTORE_HYSTERESIS_SECS`] consecutive seconds.
    ///
    /// Each wake tames the watchdog and keeps the clock running, including
    /// the daily rollover if midnight passes while on battery.  A rail read
    /// happens only on wakes where at least one second elapsed.
    pub fn hold_until_restored<B: Board>(
        ctx: &mut SystemContext,
        board: &mut B,
        peers: &mut Peers<'_>,
    ) {
        let mut ok_secs = 0u8;
        while ok_secs < RESTORE_HYSTERESIS_SECS {
            board.enter_low_power_wait();
            board.tame();
            let advanced = ctx.clock.poll_tick_source(&*board);
            ctx.clock.detect_new_minute(|| peers.rollover_daily_totals());
            if advanced == 0 {
                continue;
            }
            if board.primary_rail_ok() {
                ok_secs += 1;
            } else {
                ok_secs = 0;
            }
        }
    }

    // ── Secondary rail ───────────────────────────────────────

    /// Edge-triggered: the fault bit remembers the last state seen.
    fn check_secondary_rail<B: Board>(
        ctx: &mut SystemContext,
        board: &mut B,
        peers: &mut Peers<'_>,
    ) {
        let ok = board.secondary_rail_ok();
        let faulted = ctx.registers.has_fault(FaultFlag::SecondaryRail);

        if !ok && !faulted {
            warn!("Secondary rail lost");
            ctx.log_event(EventKind::SecondaryRailFail, 0);
            ctx.registers
                .set_fault(FaultFlag::SecondaryRail.bit(), &mut *board);
            peers.pause_irrigation(ctx);
        } else if ok && faulted {
            info!("Secondary rail restored");
            ctx.log_event(EventKind::SecondaryRailRestored, 0);
            ctx.registers
                .clear_fault(FaultFlag::SecondaryRail.bit(), &mut *board);
            peers.resume_irrigation(ctx);
        }
    }
}

//! Cooperative main loop.
//!
//! One pass polls everything in a fixed order, with a power check between
//! every pair so a rail loss is noticed within one subsystem's poll rather
//! than one full pass.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          run_pass                            │
//! │                                                              │
//! │  reset requested? ──yes──▶ drain config writes ─▶ starve WDT │
//! │        │no                                                   │
//! │        ▼                                                     │
//! │  tame ─▶ power ─▶ clock ─▶ power ─▶ moisture ─▶ power        │
//! │        ─▶ irrigation ─▶ power ─▶ ui ─▶ power ─▶ radio        │
//! │        ─▶ power ─▶ config                                    │
//! │                                                              │
//! │  clock: tick poll ─▶ new minute? ─▶ auto mode? ─▶ slots      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each subsystem poll gets a [`YieldPoint`] that tames the watchdog and
//! runs the same power check, so a long poll can ride out an outage from
//! inside itself.  Anything the power-fail handler wanted from that
//! subsystem meanwhile is delivered when the poll returns.

use log::{debug, info, trace, warn};

use crate::app::context::SystemContext;
use crate::app::ports::{Board, IrrigationPort, Subsystems, YieldPoint};
use crate::config::PROGRAM_COUNT;
use crate::error::ScheduleError;
use crate::event_log::EventKind;
use crate::power::{Deferred, Peers, PowerFailHandler};

// ═══════════════════════════════════════════════════════════════
//  Pass outcome
// ═══════════════════════════════════════════════════════════════

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every subsystem was polled; run another pass.
    Completed,
    /// A reset was requested and the watchdog is being starved.  On
    /// hardware this never returns; hosted runs stop here.
    ResetPending,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// The cooperative scheduler.  Owns the power-fail handler; all other
/// state lives in [`SystemContext`].
#[derive(Debug, Default)]
pub struct Scheduler {
    power: PowerFailHandler,
    passes: u64,
    overruns: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(&self) -> &PowerFailHandler {
        &self.power
    }

    /// Completed passes since boot.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Passes that took longer than the configured budget.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Run passes until a reset is pending, or until `max_passes` have
    /// completed when a bound is given.
    pub fn run<B: Board>(
        &mut self,
        ctx: &mut SystemContext,
        board: &mut B,
        subs: &mut Subsystems<'_>,
        max_passes: Option<u64>,
    ) -> PassOutcome {
        info!("Scheduler running");
        let mut done = 0u64;
        loop {
            if max_passes.is_some_and(|max| done >= max) {
                return PassOutcome::Completed;
            }
            if self.run_pass(ctx, board, subs) == PassOutcome::ResetPending {
                return PassOutcome::ResetPending;
            }
            done += 1;
        }
    }

    /// One pass of the main loop.
    pub fn run_pass<B: Board>(
        &mut self,
        ctx: &mut SystemContext,
        board: &mut B,
        subs: &mut Subsystems<'_>,
    ) -> PassOutcome {
        if ctx.status.reset_requested {
            return Self::starve_for_reset(ctx, board, subs);
        }

        let started = board.current_millis();
        board.tame();

        let mut outage = self.power.check(ctx, board, &mut Peers::all(subs));
        Self::poll_clock(ctx, board, subs);
        outage |= self.power.check(ctx, board, &mut Peers::all(subs));

        let peers = Peers::none()
            .with_irrigation(&mut *subs.irrigation)
            .with_radio(&mut *subs.radio);
        let moisture = &mut *subs.moisture;
        let (seen, deferred) = self.poll_with_yield(ctx, board, peers, |y| moisture.poll(y));
        deferred.deliver_to_moisture(&mut *subs.moisture);
        outage |= seen | self.power.check(ctx, board, &mut Peers::all(subs));

        let peers = Peers::none()
            .with_moisture(&mut *subs.moisture)
            .with_radio(&mut *subs.radio);
        let irrigation = &mut *subs.irrigation;
        let (seen, deferred) = self.poll_with_yield(ctx, board, peers, |y| irrigation.poll(y));
        deferred.deliver_to_irrigation(ctx.status.paused, &mut *subs.irrigation);
        outage |= seen | self.power.check(ctx, board, &mut Peers::all(subs));

        let peers = Peers::none()
            .with_moisture(&mut *subs.moisture)
            .with_irrigation(&mut *subs.irrigation)
            .with_radio(&mut *subs.radio);
        let ui = &mut *subs.ui;
        let (seen, _) = self.poll_with_yield(ctx, board, peers, |y| ui.poll(y));
        outage |= seen | self.power.check(ctx, board, &mut Peers::all(subs));

        let peers = Peers::none()
            .with_moisture(&mut *subs.moisture)
            .with_irrigation(&mut *subs.irrigation);
        let radio = &mut *subs.radio;
        let (seen, deferred) = self.poll_with_yield(ctx, board, peers, |y| radio.poll(y));
        deferred.deliver_to_radio(&mut *subs.radio);
        outage |= seen | self.power.check(ctx, board, &mut Peers::all(subs));

        let peers = Peers::none()
            .with_moisture(&mut *subs.moisture)
            .with_irrigation(&mut *subs.irrigation)
            .with_radio(&mut *subs.radio);
        let config = &mut *subs.config;
        let (seen, _) = self.poll_with_yield(ctx, board, peers, |y| config.poll(y));
        outage |= seen;

        self.passes = self.passes.wrapping_add(1);

        // An outage inflates the pass time by its own length.
        let elapsed = board.current_millis().wrapping_sub(started);
        if !outage && elapsed > ctx.config.pass_budget_ms {
            self.overruns = self.overruns.wrapping_add(1);
            warn!(
                "Pass {} took {} ms (budget {} ms)",
                self.passes, elapsed, ctx.config.pass_budget_ms
            );
        } else {
            trace!("Pass {} took {} ms", self.passes, elapsed);
        }
        PassOutcome::Completed
    }

    /// Run one subsystem poll with a live yield point.  `peers` holds the
    /// other subsystems the power-fail handler may act on.  Returns whether
    /// an outage was ridden out from inside the poll, and what was held
    /// back for the polled subsystem.
    fn poll_with_yield<B: Board>(
        &mut self,
        ctx: &mut SystemContext,
        board: &mut B,
        peers: Peers<'_>,
        poll: impl FnOnce(&mut dyn YieldPoint),
    ) -> (bool, Deferred) {
        let mut yield_point = PassYield {
            power: &mut self.power,
            ctx,
            board,
            peers,
            outage: false,
        };
        let handle: &mut dyn YieldPoint = &mut yield_point;
        poll(handle);
        (yield_point.outage, yield_point.peers.deferred())
    }

    // ── Reset ────────────────────────────────────────────────

    fn starve_for_reset<B: Board>(
        ctx: &mut SystemContext,
        board: &mut B,
        subs: &mut Subsystems<'_>,
    ) -> PassOutcome {
        warn!("Reset requested, waiting for configuration writes");
        ctx.log_event(EventKind::ResetRequested, 0);
        while subs.config.write_in_progress() {
            subs.config.poll(&mut Starving);
        }
        board.await_watchdog_reset();
        PassOutcome::ResetPending
    }

    // ── Clock ────────────────────────────────────────────────

    fn poll_clock<B: Board>(
        ctx: &mut SystemContext,
        board: &mut B,
        subs: &mut Subsystems<'_>,
    ) {
        ctx.clock.poll_tick_source(&*board);

        let mut midnight = false;
        let irrigation = &mut *subs.irrigation;
        let new_minute = ctx.clock.detect_new_minute(|| {
            midnight = true;
            irrigation.rollover_daily_totals();
        });

        if midnight {
            ctx.log_event(EventKind::MidnightRollover, 0);
            info!(
                "Daily rollover at {}, up {}",
                ctx.clock.format_debug_timestamp(),
                ctx.clock.format_uptime()
            );
        }
        if new_minute && ctx.status.auto_enabled {
            Self::check_schedules(ctx, subs);
        }
    }

    /// Match each program's slot for today against the current minute.
    ///
    /// A pulse-mode slave only probes the master and returns after the
    /// first program; the remaining programs are not looked at on that
    /// pass.
    fn check_schedules(ctx: &mut SystemContext, subs: &mut Subsystems<'_>) {
        let minute = ctx.clock.minute_of_day();

        for program in 0..PROGRAM_COUNT {
            let slot = ctx.clock.schedule_slot_today(program, &ctx.config.schedule);

            if ctx.config.pulse_mode && !ctx.config.is_master {
                let lead = ctx.config.pulse_lead_minutes;
                if slot.is_some_and(|slot| minute == probe_minute(slot, lead)) {
                    subs.radio.probe_master(program);
                    ctx.log_event(EventKind::MasterProbe, program as u16);
                    debug!("Probing master for program {}", program);
                }
                return;
            }

            let Some(slot) = slot else {
                continue;
            };

            if ctx.clock.matches_schedule_slot(program, &ctx.config.schedule) {
                if ctx.schedule.stop_pending[program] || ctx.status.remote_start_suppressed {
                    debug!("Slot for program {} held off", program);
                    continue;
                }
                match try_queue_auto_start(subs.irrigation, program) {
                    Ok(()) => {
                        ctx.log_event(EventKind::AutoStartQueued, program as u16);
                        let counters = ctx.clock.counters_mut();
                        counters.auto_starts = counters.auto_starts.saturating_add(1);
                        info!("Program {} queued for auto start", program);
                    }
                    Err(e) => {
                        ctx.log_event(EventKind::QueueFull, program as u16);
                        let counters = ctx.clock.counters_mut();
                        counters.missed_starts = counters.missed_starts.saturating_add(1);
                        warn!("{}", e);
                    }
                }
            } else if minute > slot {
                ctx.schedule.stop_pending[program] = false;
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Yield points
// ═══════════════════════════════════════════════════════════════

/// The yield point handed to subsystem polls during a pass.
struct PassYield<'a, 'p, B: Board> {
    power: &'a mut PowerFailHandler,
    ctx: &'a mut SystemContext,
    board: &'a mut B,
    peers: Peers<'p>,
    outage: bool,
}

impl<B: Board> YieldPoint for PassYield<'_, '_, B> {
    fn yield_now(&mut self) {
        self.board.tame();
        self.outage |= self
            .power
            .check(&mut *self.ctx, &mut *self.board, &mut self.peers);
    }
}

/// Handed to config polls while draining writes before a reset; the
/// watchdog is meant to lapse.
struct Starving;

impl YieldPoint for Starving {
    fn yield_now(&mut self) {}
}

/// Minute of day at which a slave probes the master ahead of `slot`.
fn probe_minute(slot: u16, lead: u16) -> u16 {
    let day = u32::from(crate::clock::calendar::MINUTES_PER_DAY);
    ((u32::from(slot) + day - u32::from(lead) % day) % day) as u16
}

/// The irrigation queue holds one program.
fn try_queue_auto_start(
    irrigation: &mut dyn IrrigationPort,
    program: usize,
) -> Result<(), ScheduleError> {
    if irrigation.is_program_pending_or_running() {
        return Err(ScheduleError::QueueFull {
            program: program as u8,
        });
    }
    irrigation.queue_auto_start(program);
    Ok(())
}

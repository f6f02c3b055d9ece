//! Scheduler passes against the mock rig: poll order, power-check
//! interposition, reset handling and schedule-slot matching.

use crate::mock_hw::Rig;

use irrigation_core::clock::calendar::IrrigationDay;
use irrigation_core::config::SystemConfig;
use irrigation_core::event_log::EventKind;
use irrigation_core::registers::ErrorFlag;
use irrigation_core::{PassOutcome, Scheduler, SystemContext};

fn kinds(ctx: &SystemContext) -> Vec<EventKind> {
    ctx.log.iter_oldest_first().filter_map(|r| r.kind()).collect()
}

fn logged(ctx: &SystemContext, kind: EventKind) -> Vec<u16> {
    ctx.log
        .iter_oldest_first()
        .filter(|r| r.kind() == Some(kind))
        .map(|r| r.data)
        .collect()
}

/// Program 0 starts at 06:00 every day.
fn daily_six_am() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.schedule.set_daily(0, Some(6 * 60)).unwrap();
    config
}

/// Rig and context with the clock at Monday 2024-03-04 05:59:58 and the
/// set-induced minute boundary already absorbed by one pass.
fn rig_before_slot(config: SystemConfig) -> (Rig, SystemContext, Scheduler) {
    let mut rig = Rig::new();
    let mut ctx = rig.context(config);
    ctx.set_clock(2024, 3, 4, 5, 59, 58, &mut rig.board).unwrap();
    let mut sched = Scheduler::new();
    rig.pass(&mut sched, &mut ctx);
    rig.take_trace();
    (rig, ctx, sched)
}

// ── Pass structure ────────────────────────────────────────────

#[test]
fn pass_polls_in_fixed_order_with_power_checks_between() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();

    assert_eq!(rig.pass(&mut sched, &mut ctx), PassOutcome::Completed);

    assert_eq!(
        rig.take_trace(),
        vec![
            "tame",
            "primary:ok",
            "primary:ok",
            "moisture",
            "primary:ok",
            "irrigation",
            "primary:ok",
            "ui",
            "primary:ok",
            "radio",
            "primary:ok",
            "config",
        ]
    );
    assert_eq!(sched.passes(), 1);
}

#[test]
fn rail_loss_mid_pass_is_handled_before_the_next_poll() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    // Lost at the check that follows the moisture poll.
    rig.board.script_primary(&[true, true, false]);

    rig.pass(&mut sched, &mut ctx);

    let trace = rig.take_trace();
    let pos = |call: &str| trace.iter().position(|c| *c == call).unwrap();
    assert!(pos("moisture") < pos("shutdown"));
    assert!(pos("shutdown") < pos("restart"));
    assert!(pos("restart") < pos("irrigation"));
    assert_eq!(trace.last(), Some(&"config"));
    assert_eq!(sched.power().outages(), 1);
}

#[test]
fn outage_does_not_count_as_overrun() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    rig.board.script_primary(&[false]);

    rig.pass(&mut sched, &mut ctx);

    assert_eq!(sched.overruns(), 0);
}

#[test]
fn slow_pass_is_counted_as_overrun() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    rig.board.millis_per_read = 100;

    rig.pass(&mut sched, &mut ctx);

    assert_eq!(sched.overruns(), 1);
}

#[test]
fn pass_timing_survives_millisecond_wraparound() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    rig.board.set_millis(u32::MAX - 5);
    rig.board.millis_per_read = 4;

    rig.pass(&mut sched, &mut ctx);

    assert_eq!(sched.overruns(), 0);
}

#[test]
fn bounded_run_stops_after_max_passes() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();

    assert_eq!(rig.run(&mut sched, &mut ctx, Some(5)), PassOutcome::Completed);
    assert_eq!(sched.passes(), 5);
    assert_eq!(rig.irrigation.polls, 5);
}

// ── Yield from inside a poll ───────────────────────────────────

#[test]
fn long_poll_rides_out_outage_before_returning() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    rig.moisture.yields_per_poll = 2;
    // Pass start and post-clock checks are OK; the rail is gone by the
    // first yield inside the moisture poll.
    rig.board.script_primary(&[true, true, false]);

    rig.pass(&mut sched, &mut ctx);

    let trace = rig.take_trace();
    let pos = |call: &str| trace.iter().position(|c| *c == call).unwrap();
    assert!(pos("moisture") < pos("shutdown"));
    assert!(pos("wait") < pos("restart"));
    assert!(pos("radio:reinit") < pos("moisture:done"));
    // The resample waits until the moisture poll has returned.
    assert!(pos("moisture:done") < pos("moisture:resample"));
    assert!(pos("moisture:resample") < pos("irrigation"));

    assert_eq!(rig.moisture.resamples, 1);
    assert_eq!(rig.radio.reinits, 1);
    assert_eq!(sched.power().outages(), 1);
    assert_eq!(sched.overruns(), 0);
    assert!(!ctx.status.paused);
}

#[test]
fn each_yield_tames_then_checks_power() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    rig.moisture.yields_per_poll = 2;

    rig.pass(&mut sched, &mut ctx);

    let trace = rig.take_trace();
    let start = trace.iter().position(|c| *c == "moisture").unwrap();
    assert_eq!(
        &trace[start..start + 6],
        &["moisture", "tame", "primary:ok", "tame", "primary:ok", "moisture:done"]
    );
    assert_eq!(rig.board.tames, 3);
}

#[test]
fn midnight_on_battery_during_irrigation_poll_rolls_totals_afterwards() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    ctx.set_clock(2024, 3, 4, 23, 59, 50, &mut rig.board).unwrap();
    let mut sched = Scheduler::new();
    rig.pass(&mut sched, &mut ctx);
    rig.take_trace();

    rig.irrigation.yields_per_poll = 1;
    // Three OK checks, then lost at the yield and for ten seconds after.
    rig.board.script_primary(&[true, true, true, false]);
    rig.board.script_primary(&[false; 10]);

    rig.pass(&mut sched, &mut ctx);

    let trace = rig.take_trace();
    let pos = |call: &str| trace.iter().position(|c| *c == call).unwrap();
    assert!(pos("irrigation") < pos("shutdown"));
    assert!(pos("restart") < pos("irrigation:rollover"));
    assert_eq!(rig.irrigation.rollovers, 1);
    // Pause and resume both fell inside the poll and cancel out.
    assert_eq!((rig.irrigation.pauses, rig.irrigation.resumes), (0, 0));
    assert!(!ctx.status.paused);
    let c = ctx.clock.calendar();
    assert_eq!((c.day(), c.hour(), c.minute()), (5, 0, 0));
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_request_lets_config_finish_then_starves_watchdog() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    let mut sched = Scheduler::new();
    ctx.status.reset_requested = true;
    rig.store.writes_left = 2;

    assert_eq!(rig.run(&mut sched, &mut ctx, None), PassOutcome::ResetPending);

    assert_eq!(rig.take_trace(), vec!["config", "config", "await_reset"]);
    assert_eq!(rig.board.tames, 0);
    assert_eq!(rig.board.primary_reads, 0);
    assert_eq!(kinds(&ctx).last(), Some(&EventKind::ResetRequested));
    assert_eq!(sched.passes(), 0);
}

// ── Schedule matching ─────────────────────────────────────────

#[test]
fn matching_slot_queues_program_once() {
    let (mut rig, mut ctx, mut sched) = rig_before_slot(daily_six_am());
    assert!(rig.irrigation.queued.is_empty());

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);
    rig.irrigation.busy = false;
    rig.pass(&mut sched, &mut ctx);

    assert_eq!(rig.irrigation.queued, vec![0]);
    assert_eq!(logged(&ctx, EventKind::AutoStartQueued), vec![0]);
    assert_eq!(ctx.clock.counters().auto_starts, 1);
}

#[test]
fn busy_queue_misses_the_slot() {
    let (mut rig, mut ctx, mut sched) = rig_before_slot(daily_six_am());
    rig.irrigation.busy = true;

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert!(rig.irrigation.queued.is_empty());
    assert_eq!(logged(&ctx, EventKind::QueueFull), vec![0]);
    assert_eq!(ctx.clock.counters().missed_starts, 1);

    // Not retried later in the day.
    rig.irrigation.busy = false;
    rig.board.advance_secs(60);
    rig.pass(&mut sched, &mut ctx);
    assert!(rig.irrigation.queued.is_empty());
}

#[test]
fn pending_stop_holds_off_slot_until_it_has_passed() {
    let (mut rig, mut ctx, mut sched) = rig_before_slot(daily_six_am());
    ctx.schedule.request_stop(0);

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);
    assert!(rig.irrigation.queued.is_empty());
    assert!(ctx.schedule.stop_pending[0]);

    rig.board.advance_secs(60);
    rig.pass(&mut sched, &mut ctx);
    assert!(!ctx.schedule.stop_pending[0]);
}

#[test]
fn remote_start_suppresses_scheduled_start() {
    let (mut rig, mut ctx, mut sched) = rig_before_slot(daily_six_am());
    ctx.status.remote_start_suppressed = true;

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert!(rig.irrigation.queued.is_empty());
    assert!(logged(&ctx, EventKind::QueueFull).is_empty());
}

#[test]
fn auto_mode_off_skips_matching() {
    let (mut rig, mut ctx, mut sched) = rig_before_slot(daily_six_am());
    ctx.status.auto_enabled = false;

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert!(rig.irrigation.queued.is_empty());
}

#[test]
fn slots_are_looked_up_by_monday_first_day() {
    let mut config = SystemConfig::default();
    config
        .schedule
        .set_slot(IrrigationDay::Sunday, 2, Some(6 * 60))
        .unwrap();

    // Monday: no slot.
    let (mut rig, mut ctx, mut sched) = rig_before_slot(config.clone());
    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);
    assert!(rig.irrigation.queued.is_empty());

    // Sunday 2024-03-10.
    let mut rig = Rig::new();
    let mut ctx = rig.context(config);
    ctx.set_clock(2024, 3, 10, 5, 59, 58, &mut rig.board).unwrap();
    let mut sched = Scheduler::new();
    rig.pass(&mut sched, &mut ctx);
    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);
    assert_eq!(rig.irrigation.queued, vec![2]);
}

#[test]
fn several_programs_at_one_minute_queue_only_the_first() {
    let mut config = daily_six_am();
    config.schedule.set_daily(1, Some(6 * 60)).unwrap();
    let (mut rig, mut ctx, mut sched) = rig_before_slot(config);

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert_eq!(rig.irrigation.queued, vec![0]);
    assert_eq!(logged(&ctx, EventKind::QueueFull), vec![1]);
}

// ── Pulse mode ────────────────────────────────────────────────

fn pulse_slave(config: &mut SystemConfig) {
    config.pulse_mode = true;
    config.is_master = false;
    config.pulse_lead_minutes = 2;
}

#[test]
fn pulse_slave_probes_master_ahead_of_slot() {
    let mut config = SystemConfig::default();
    config.schedule.set_daily(0, Some(6 * 60 + 2)).unwrap();
    pulse_slave(&mut config);
    let (mut rig, mut ctx, mut sched) = rig_before_slot(config);

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert_eq!(rig.radio.probes, vec![0]);
    assert_eq!(logged(&ctx, EventKind::MasterProbe), vec![0]);

    // The slot itself starts nothing on a slave.
    rig.board.advance_secs(120);
    rig.pass(&mut sched, &mut ctx);
    assert!(rig.irrigation.queued.is_empty());
}

// Observed behaviour: a pulse slave stops after the first program, so a
// later program's probe is never sent.
#[test]
fn pulse_slave_only_evaluates_first_program() {
    let mut config = SystemConfig::default();
    config.schedule.set_daily(1, Some(6 * 60 + 2)).unwrap();
    pulse_slave(&mut config);
    let (mut rig, mut ctx, mut sched) = rig_before_slot(config);

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert!(rig.radio.probes.is_empty());
    assert!(logged(&ctx, EventKind::MasterProbe).is_empty());
}

#[test]
fn deserialized_slot_past_end_of_day_is_rejected_before_any_pass() {
    let config: SystemConfig = serde_json::from_str(
        r#"{
            "time_format": "TwelveHour",
            "pulse_mode": true,
            "is_master": false,
            "pulse_lead_minutes": 2,
            "pass_budget_ms": 50,
            "schedule": { "slots": [
                [65000, null, null, null], [65000, null, null, null],
                [65000, null, null, null], [65000, null, null, null],
                [65000, null, null, null], [65000, null, null, null],
                [65000, null, null, null]
            ] }
        }"#,
    )
    .unwrap();
    assert!(config.validate().is_err());
    let (mut rig, mut ctx, mut sched) = rig_before_slot(config);

    assert!(ctx.registers.has_error(ErrorFlag::ScheduleInvalid));
    assert!(!ctx.config.pulse_mode);

    for _ in 0..3 {
        rig.board.advance_secs(60);
        rig.pass(&mut sched, &mut ctx);
    }
    assert!(rig.radio.probes.is_empty());
    assert!(rig.irrigation.queued.is_empty());
}

#[test]
fn pulse_master_starts_programs_normally() {
    let mut config = daily_six_am();
    config.pulse_mode = true;
    config.is_master = true;
    let (mut rig, mut ctx, mut sched) = rig_before_slot(config);

    rig.board.advance_secs(2);
    rig.pass(&mut sched, &mut ctx);

    assert_eq!(rig.irrigation.queued, vec![0]);
    assert!(rig.radio.probes.is_empty());
}

// ── Midnight ──────────────────────────────────────────────────

#[test]
fn midnight_rolls_totals_over_exactly_once() {
    let mut rig = Rig::new();
    let mut ctx = rig.context(SystemConfig::default());
    ctx.set_clock(2024, 3, 4, 23, 59, 59, &mut rig.board).unwrap();
    let mut sched = Scheduler::new();
    rig.pass(&mut sched, &mut ctx);
    rig.irrigation.totals.today_minutes = 75;

    rig.board.advance_secs(1);
    for _ in 0..5 {
        rig.pass(&mut sched, &mut ctx);
    }

    assert_eq!(rig.irrigation.rollovers, 1);
    assert_eq!(rig.irrigation.totals.yesterday_minutes, 75);
    assert_eq!(logged(&ctx, EventKind::MidnightRollover).len(), 1);
    assert_eq!(ctx.clock.calendar().day(), 5);
}

#[test]
fn midnight_zeroes_period_counters() {
    let mut config = SystemConfig::default();
    config.schedule.set_daily(0, Some(23 * 60 + 59)).unwrap();
    let mut rig = Rig::new();
    let mut ctx = rig.context(config);
    ctx.set_clock(2024, 3, 4, 23, 58, 59, &mut rig.board).unwrap();
    let mut sched = Scheduler::new();
    rig.pass(&mut sched, &mut ctx);

    rig.board.advance_secs(1);
    rig.pass(&mut sched, &mut ctx);
    assert_eq!(ctx.clock.counters().auto_starts, 1);

    rig.board.advance_secs(60);
    rig.pass(&mut sched, &mut ctx);
    assert_eq!(ctx.clock.counters().auto_starts, 0);
}

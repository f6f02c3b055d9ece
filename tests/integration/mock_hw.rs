//! Mock board and subsystems for integration tests.
//!
//! Every mock appends to one shared [`Trace`] so tests can assert on the
//! exact interleaving of power checks, watchdog tames and subsystem polls
//! without touching real GPIO.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use irrigation_core::app::ports::{
    ConfigStorePort, IndicatorPort, IrrigationPort, MoisturePort, PowerControl, RadioPort,
    RailSensors, Subsystems, SubsystemPoll, TickSource, WatchdogPort, YieldPoint,
};
use irrigation_core::config::SystemConfig;
use irrigation_core::power::{Peers, PowerFailHandler};
use irrigation_core::status::WateringTotals;
use irrigation_core::{PassOutcome, Scheduler, SystemContext};

// ── Shared call trace ─────────────────────────────────────────

pub type Trace = Rc<RefCell<Vec<&'static str>>>;

fn record(trace: &Trace, call: &'static str) {
    trace.borrow_mut().push(call);
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    trace: Trace,
    pub seconds: u32,
    millis: Cell<u32>,
    /// Added to the millisecond counter on every read.
    pub millis_per_read: u32,
    /// Primary readings consumed one per read; `primary_default` after.
    pub primary_script: VecDeque<bool>,
    pub primary_default: bool,
    pub primary_reads: u32,
    pub secondary_ok: bool,
    pub tames: u32,
    pub error_led: bool,
    pub fault_led: bool,
    pub indicator_writes: u32,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            seconds: 0,
            millis: Cell::new(0),
            millis_per_read: 0,
            primary_script: VecDeque::new(),
            primary_default: true,
            primary_reads: 0,
            secondary_ok: true,
            tames: 0,
            error_led: false,
            fault_led: false,
            indicator_writes: 0,
        }
    }

    /// Move the tick source forward by whole seconds.
    pub fn advance_secs(&mut self, secs: u32) {
        self.seconds = self.seconds.wrapping_add(secs);
        self.millis
            .set(self.millis.get().wrapping_add(secs.wrapping_mul(1000)));
    }

    pub fn set_millis(&mut self, ms: u32) {
        self.millis.set(ms);
    }

    pub fn script_primary(&mut self, readings: &[bool]) {
        self.primary_script.extend(readings.iter().copied());
    }
}

impl TickSource for MockBoard {
    fn current_seconds(&self) -> u32 {
        self.seconds
    }

    fn current_millis(&self) -> u32 {
        let now = self.millis.get().wrapping_add(self.millis_per_read);
        self.millis.set(now);
        now
    }
}

impl RailSensors for MockBoard {
    fn primary_rail_ok(&mut self) -> bool {
        self.primary_reads += 1;
        let ok = self
            .primary_script
            .pop_front()
            .unwrap_or(self.primary_default);
        record(&self.trace, if ok { "primary:ok" } else { "primary:lost" });
        ok
    }

    fn secondary_rail_ok(&mut self) -> bool {
        self.secondary_ok
    }
}

impl WatchdogPort for MockBoard {
    fn tame(&mut self) {
        self.tames += 1;
        record(&self.trace, "tame");
    }
}

impl PowerControl for MockBoard {
    fn shutdown_peripherals(&mut self) {
        record(&self.trace, "shutdown");
    }

    /// Each wait lasts exactly one tick.
    fn enter_low_power_wait(&mut self) {
        record(&self.trace, "wait");
        self.advance_secs(1);
    }

    fn restart_peripherals(&mut self) {
        record(&self.trace, "restart");
    }

    fn await_watchdog_reset(&mut self) {
        record(&self.trace, "await_reset");
    }
}

impl IndicatorPort for MockBoard {
    fn set_error_indicator(&mut self, on: bool) {
        self.error_led = on;
        self.indicator_writes += 1;
    }

    fn set_fault_indicator(&mut self, on: bool) {
        self.fault_led = on;
        self.indicator_writes += 1;
    }
}

// ── Subsystems ────────────────────────────────────────────────

pub struct MockMoisture {
    trace: Trace,
    pub resamples: u32,
    /// Yields this poll makes before returning, simulating a long sample.
    pub yields_per_poll: u32,
}

impl SubsystemPoll for MockMoisture {
    fn poll(&mut self, yield_point: &mut dyn YieldPoint) {
        record(&self.trace, "moisture");
        if self.yields_per_poll > 0 {
            for _ in 0..self.yields_per_poll {
                yield_point.yield_now();
            }
            record(&self.trace, "moisture:done");
        }
    }
}

impl MoisturePort for MockMoisture {
    fn force_resample(&mut self) {
        self.resamples += 1;
        record(&self.trace, "moisture:resample");
    }
}

pub struct MockIrrigation {
    trace: Trace,
    pub watering: bool,
    pub busy: bool,
    pub queued: Vec<usize>,
    pub polls: u32,
    pub pauses: u32,
    pub resumes: u32,
    pub rollovers: u32,
    pub totals: WateringTotals,
    pub yields_per_poll: u32,
}

impl SubsystemPoll for MockIrrigation {
    fn poll(&mut self, yield_point: &mut dyn YieldPoint) {
        self.polls += 1;
        record(&self.trace, "irrigation");
        for _ in 0..self.yields_per_poll {
            yield_point.yield_now();
        }
    }
}

impl IrrigationPort for MockIrrigation {
    fn pause(&mut self) {
        self.pauses += 1;
        record(&self.trace, "irrigation:pause");
    }

    fn resume(&mut self) {
        self.resumes += 1;
        record(&self.trace, "irrigation:resume");
    }

    fn is_watering(&self) -> bool {
        self.watering
    }

    fn is_program_pending_or_running(&self) -> bool {
        self.busy
    }

    fn queue_auto_start(&mut self, program: usize) {
        self.queued.push(program);
        self.busy = true;
    }

    fn rollover_daily_totals(&mut self) {
        self.rollovers += 1;
        self.totals.yesterday_minutes = self.totals.today_minutes;
        self.totals.today_minutes = 0;
        record(&self.trace, "irrigation:rollover");
    }

    fn watering_totals(&self) -> WateringTotals {
        self.totals
    }
}

pub struct MockUi {
    trace: Trace,
}

impl SubsystemPoll for MockUi {
    fn poll(&mut self, _yield_point: &mut dyn YieldPoint) {
        record(&self.trace, "ui");
    }
}

pub struct MockRadio {
    trace: Trace,
    pub probes: Vec<usize>,
    pub reinits: u32,
}

impl SubsystemPoll for MockRadio {
    fn poll(&mut self, _yield_point: &mut dyn YieldPoint) {
        record(&self.trace, "radio");
    }
}

impl RadioPort for MockRadio {
    fn probe_master(&mut self, program: usize) {
        self.probes.push(program);
    }

    fn reinitialize(&mut self) {
        self.reinits += 1;
        record(&self.trace, "radio:reinit");
    }
}

pub struct MockConfigStore {
    trace: Trace,
    /// Polls left before the in-flight write completes.
    pub writes_left: u32,
}

impl SubsystemPoll for MockConfigStore {
    fn poll(&mut self, _yield_point: &mut dyn YieldPoint) {
        self.writes_left = self.writes_left.saturating_sub(1);
        record(&self.trace, "config");
    }
}

impl ConfigStorePort for MockConfigStore {
    fn write_in_progress(&self) -> bool {
        self.writes_left > 0
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Board plus all five subsystems, sharing one trace.
pub struct Rig {
    pub trace: Trace,
    pub board: MockBoard,
    pub moisture: MockMoisture,
    pub irrigation: MockIrrigation,
    pub ui: MockUi,
    pub radio: MockRadio,
    pub store: MockConfigStore,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        let trace: Trace = Rc::default();
        Self {
            board: MockBoard::new(trace.clone()),
            moisture: MockMoisture {
                trace: trace.clone(),
                resamples: 0,
                yields_per_poll: 0,
            },
            irrigation: MockIrrigation {
                trace: trace.clone(),
                watering: false,
                busy: false,
                queued: Vec::new(),
                polls: 0,
                pauses: 0,
                resumes: 0,
                rollovers: 0,
                totals: WateringTotals::default(),
                yields_per_poll: 0,
            },
            ui: MockUi {
                trace: trace.clone(),
            },
            radio: MockRadio {
                trace: trace.clone(),
                probes: Vec::new(),
                reinits: 0,
            },
            store: MockConfigStore {
                trace: trace.clone(),
                writes_left: 0,
            },
            trace,
        }
    }

    pub fn context(&mut self, config: SystemConfig) -> SystemContext {
        SystemContext::new(config, &mut self.board)
    }

    pub fn pass(&mut self, sched: &mut Scheduler, ctx: &mut SystemContext) -> PassOutcome {
        let mut subs = Subsystems {
            moisture: &mut self.moisture,
            irrigation: &mut self.irrigation,
            ui: &mut self.ui,
            radio: &mut self.radio,
            config: &mut self.store,
        };
        sched.run_pass(ctx, &mut self.board, &mut subs)
    }

    pub fn run(
        &mut self,
        sched: &mut Scheduler,
        ctx: &mut SystemContext,
        max_passes: Option<u64>,
    ) -> PassOutcome {
        let mut subs = Subsystems {
            moisture: &mut self.moisture,
            irrigation: &mut self.irrigation,
            ui: &mut self.ui,
            radio: &mut self.radio,
            config: &mut self.store,
        };
        sched.run(ctx, &mut self.board, &mut subs, max_passes)
    }

    pub fn power_check(&mut self, handler: &mut PowerFailHandler, ctx: &mut SystemContext) -> bool {
        let mut subs = Subsystems {
            moisture: &mut self.moisture,
            irrigation: &mut self.irrigation,
            ui: &mut self.ui,
            radio: &mut self.radio,
            config: &mut self.store,
        };
        handler.check(ctx, &mut self.board, &mut Peers::all(&mut subs))
    }

    pub fn hold_until_restored(&mut self, ctx: &mut SystemContext) {
        let mut peers = Peers::none().with_irrigation(&mut self.irrigation);
        PowerFailHandler::hold_until_restored(ctx, &mut self.board, &mut peers);
    }

    pub fn take_trace(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.trace.borrow_mut())
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

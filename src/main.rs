//! Irrigation controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RailMonitor   IndicatorLeds   SleepControl   UptimeTicks      │
//! │  (RailSensors) (IndicatorPort) (PowerControl) (TickSource)     │
//! │  Watchdog      DetachedSubsystem × 5                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Scheduler · PowerFailHandler · ClockEngine            │    │
//! │  │  SystemContext (event log, registers, status, config)  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

mod pins;

use anyhow::{Context, Result};
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver};
use log::{info, warn};

use irrigation_core::adapters::board::BoardAdapter;
use irrigation_core::adapters::hardware::{IndicatorLeds, RailMonitor};
use irrigation_core::adapters::subsystems::DetachedSubsystem;
use irrigation_core::app::ports::Subsystems;
use irrigation_core::config::SystemConfig;
use irrigation_core::drivers::sleep::SleepControl;
use irrigation_core::{PassOutcome, Scheduler, SystemContext};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Irrigation core v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Pins ───────────────────────────────────────────────
    let primary = PinDriver::input(unsafe { AnyInputPin::new(pins::PRIMARY_PGOOD_GPIO) })
        .context("primary power-good pin")?;
    let secondary = PinDriver::input(unsafe { AnyInputPin::new(pins::SECONDARY_PGOOD_GPIO) })
        .context("secondary power-good pin")?;
    let error_led = PinDriver::output(unsafe { AnyOutputPin::new(pins::ERROR_LED_GPIO) })
        .context("error LED pin")?;
    let fault_led = PinDriver::output(unsafe { AnyOutputPin::new(pins::FAULT_LED_GPIO) })
        .context("fault LED pin")?;
    let periph_en =
        PinDriver::output(unsafe { AnyOutputPin::new(pins::PERIPHERAL_ENABLE_GPIO) })
            .context("peripheral enable pin")?;

    let mut board = BoardAdapter::new(
        RailMonitor::new(primary, secondary),
        IndicatorLeds::new(error_led, fault_led),
        SleepControl::new(periph_en),
    );

    // ── 3. Configuration ──────────────────────────────────────
    // The configuration store is not attached yet; run on defaults.
    // `SystemContext::new` validates whatever it is given.
    let config = SystemConfig::default();

    // ── 4. Core state ─────────────────────────────────────────
    let mut ctx = SystemContext::new(config, &mut board);

    let mut moisture = DetachedSubsystem::new("moisture");
    let mut irrigation = DetachedSubsystem::new("irrigation");
    let mut ui = DetachedSubsystem::new("ui");
    let mut radio = DetachedSubsystem::new("radio");
    let mut store = DetachedSubsystem::new("config");
    let mut subs = Subsystems {
        moisture: &mut moisture,
        irrigation: &mut irrigation,
        ui: &mut ui,
        radio: &mut radio,
        config: &mut store,
    };

    // ── 5. Main loop ──────────────────────────────────────────
    let mut scheduler = Scheduler::new();
    match scheduler.run(&mut ctx, &mut board, &mut subs, None) {
        PassOutcome::ResetPending => warn!("Scheduler stopped for reset"),
        PassOutcome::Completed => info!("Scheduler finished"),
    }
    Ok(())
}

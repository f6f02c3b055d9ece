//! Irrigation controller supervisory core.
//!
//! Exposes the pure-logic modules for integration testing and for the
//! firmware binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(feature = "espidf")]` within each module and has a host
//! simulation counterpart.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event_log;
pub mod power;
pub mod registers;
pub mod scheduler;
pub mod status;

pub mod adapters;
pub mod drivers;

pub use app::context::SystemContext;
pub use error::{Error, Result};
pub use scheduler::{PassOutcome, Scheduler};

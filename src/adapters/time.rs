//! Uptime tick source.
//!
//! Implements [`TickSource`] for the supervisory clock.
//!
//! - **`feature = "espidf"`**: reads `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **host**: uses `std::time::Instant` for simulation and tests.
//!
//! Both counters truncate to `u32`: seconds never wrap in practice, the
//! millisecond counter wraps after ~49.7 days and consumers subtract with
//! `wrapping_sub`.

use crate::app::ports::TickSource;

/// Tick source backed by the system uptime timer.
pub struct UptimeTicks {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for UptimeTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeTicks {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(feature = "espidf")]
    fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the adapter was created.
    #[cfg(not(feature = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl TickSource for UptimeTicks {
    fn current_seconds(&self) -> u32 {
        (self.uptime_us() / 1_000_000) as u32
    }

    fn current_millis(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }
}

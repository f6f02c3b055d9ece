//! Application core: the shared context and the port traits.
//!
//! Everything the supervisory core touches outside itself (board
//! peripherals, irrigation, moisture, UI, radio, configuration) is reached
//! through the **port traits** in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod context;
pub mod ports;

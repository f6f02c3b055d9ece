//! GPIO pin assignments for the irrigation controller main board.
//!
//! Single source of truth: the firmware entry point builds every pin
//! driver from these numbers.

// ---------------------------------------------------------------------------
// Supply supervision
// ---------------------------------------------------------------------------

/// Digital input: primary (mains) rail power-good, HIGH = present.
pub const PRIMARY_PGOOD_GPIO: i32 = 4;
/// Digital input: secondary (valve supply) rail power-good, HIGH = present.
pub const SECONDARY_PGOOD_GPIO: i32 = 5;

/// Digital output: load switch feeding radio, sensors and display.
/// HIGH = peripherals powered.
pub const PERIPHERAL_ENABLE_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Digital output: aggregate software-error LED (active HIGH).
pub const ERROR_LED_GPIO: i32 = 15;
/// Digital output: aggregate hardware-fault LED (active HIGH).
pub const FAULT_LED_GPIO: i32 = 16;

//! Timestamped diagnostic text.
//!
//! Every debug message is prefixed with the current wall-clock time as
//! `YYYY-MM-DD HH:MM:SS ` and its payload is cut at
//! [`DEBUG_PAYLOAD_MAX`] characters.  Lines are built on the stack and
//! emitted through `log::debug!` by the [`debug_line!`](crate::debug_line)
//! macro.

use core::fmt::{self, Write};

use crate::clock::calendar::Calendar;
use crate::clock::format;

/// Payload characters kept after the timestamp prefix.
pub const DEBUG_PAYLOAD_MAX: usize = 100;

/// Prefix (19) + space + worst-case 4-byte UTF-8 payload.
pub type DebugLine = heapless::String<{ 20 + DEBUG_PAYLOAD_MAX * 4 }>;

/// Writer that keeps the first `DEBUG_PAYLOAD_MAX` characters and silently
/// drops the rest.
struct Truncating<'a> {
    out: &'a mut DebugLine,
    chars: usize,
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.chars >= DEBUG_PAYLOAD_MAX {
                break;
            }
            if self.out.push(c).is_err() {
                break;
            }
            self.chars += 1;
        }
        Ok(())
    }
}

/// Render `args` behind a `YYYY-MM-DD HH:MM:SS ` prefix.
pub fn timestamped(cal: &Calendar, args: fmt::Arguments<'_>) -> DebugLine {
    let mut line = DebugLine::new();
    let _ = line.push_str(&format::debug_timestamp(cal));
    let _ = line.push(' ');
    let mut w = Truncating {
        out: &mut line,
        chars: 0,
    };
    let _ = w.write_fmt(args);
    line
}

/// Emit a timestamped diagnostic line through `log::debug!`.
///
/// ```ignore
/// debug_line!(ctx.clock, "outage lasted {} s", secs);
/// ```
#[macro_export]
macro_rules! debug_line {
    ($clock:expr, $($arg:tt)*) => {
        log::debug!(
            "{}",
            $crate::diagnostics::timestamped($clock.calendar(), format_args!($($arg)*))
        )
    };
}

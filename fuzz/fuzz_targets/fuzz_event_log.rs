//! Fuzz target: `EventLog` ring buffer
//!
//! Each 8-byte chunk of input becomes one append.  Verifies:
//! - Appends never panic, whatever the record content
//! - `len` never exceeds capacity and `cursor` stays in range
//! - The newest record always decodes back to what was written
//!
//! cargo fuzz run fuzz_event_log

#![no_main]

use irrigation_core::event_log::{EventKind, EventLog};
use libfuzzer_sys::fuzz_target;

const KINDS: [EventKind; 4] = [
    EventKind::PowerFail,
    EventKind::ClockSet,
    EventKind::AutoStartQueued,
    EventKind::QueueFull,
];

fuzz_target!(|data: &[u8]| {
    let mut log = EventLog::<8>::new();

    for chunk in data.chunks_exact(8) {
        let ts = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let kind = KINDS[chunk[4] as usize % KINDS.len()];
        let payload = u16::from_be_bytes([chunk[6], chunk[7]]);

        log.append(ts, kind, payload);

        assert!(log.len() <= log.capacity());
        assert!(log.cursor() < log.capacity());
        let latest = log.latest().expect("non-empty after append");
        assert_eq!(latest.timestamp_ms, ts);
        assert_eq!(latest.kind(), Some(kind));
        assert_eq!(latest.data, payload);
    }

    assert_eq!(log.as_bytes().len(), 8 * log.capacity());
});

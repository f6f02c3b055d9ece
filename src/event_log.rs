//! Fixed-capacity ring-buffered event log.
//!
//! Every component appends timestamped `(kind, data)` records for
//! post-hoc diagnostics.  Appends never fail: once the ring is full the
//! cursor wraps and the oldest record is overwritten.
//!
//! Record layout (8 bytes, network byte order):
//!
//! ```text
//!  0        4          5       6        8
//!  ┌────────┬──────────┬───────┬────────┐
//!  │ ts ms  │subsystem │ code  │  data  │
//!  │ u32 BE │   u8     │  u8   │ u16 BE │
//!  └────────┴──────────┴───────┴────────┘
//! ```

/// Bytes per record.
pub const RECORD_LEN: usize = 8;

/// Default ring capacity used by [`SystemContext`](crate::app::context::SystemContext).
pub const EVENT_LOG_CAPACITY: usize = 64;

/// Subsystem-scoped record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EventKind {
    // ── System ────────────────────────────────────────────
    Boot = 0x0001,
    ResetRequested = 0x0002,

    // ── Power ─────────────────────────────────────────────
    PowerFail = 0x0101,
    LowPowerEnter = 0x0102,
    /// Outage duration (seconds) fits in 16 bits.
    PowerRestored = 0x0103,
    /// Upper 16 bits of a long outage duration.
    PowerRestoredHigh = 0x0104,
    /// Lower 16 bits of a long outage duration.
    PowerRestoredLow = 0x0105,
    SecondaryRailFail = 0x0106,
    SecondaryRailRestored = 0x0107,

    // ── Clock ─────────────────────────────────────────────
    ClockSet = 0x0201,
    MidnightRollover = 0x0202,

    // ── Scheduler ─────────────────────────────────────────
    AutoStartQueued = 0x0301,
    QueueFull = 0x0302,
    MasterProbe = 0x0303,
}

impl EventKind {
    pub const fn subsystem(self) -> u8 {
        ((self as u16) >> 8) as u8
    }

    pub const fn code(self) -> u8 {
        self as u16 as u8
    }

    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0x0001 => Self::Boot,
            0x0002 => Self::ResetRequested,
            0x0101 => Self::PowerFail,
            0x0102 => Self::LowPowerEnter,
            0x0103 => Self::PowerRestored,
            0x0104 => Self::PowerRestoredHigh,
            0x0105 => Self::PowerRestoredLow,
            0x0106 => Self::SecondaryRailFail,
            0x0107 => Self::SecondaryRailRestored,
            0x0201 => Self::ClockSet,
            0x0202 => Self::MidnightRollover,
            0x0301 => Self::AutoStartQueued,
            0x0302 => Self::QueueFull,
            0x0303 => Self::MasterProbe,
            _ => return None,
        })
    }
}

/// A decoded record, for diagnostic tooling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub timestamp_ms: u32,
    /// Raw `subsystem << 8 | code`.
    pub kind: u16,
    pub data: u16,
}

impl EventRecord {
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_raw(self.kind)
    }
}

/// Ring of `N` fixed-size records.
pub struct EventLog<const N: usize> {
    buf: [[u8; RECORD_LEN]; N],
    /// Next slot to write.
    cursor: usize,
    /// The ring has filled at least once.
    wrapped: bool,
}

impl<const N: usize> Default for EventLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventLog<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "event log needs at least one slot");
        Self {
            buf: [[0; RECORD_LEN]; N],
            cursor: 0,
            wrapped: false,
        }
    }

    /// Append a record.  Overwrites the oldest record once full.
    pub fn append(&mut self, timestamp_ms: u32, kind: EventKind, data: u16) {
        let slot = &mut self.buf[self.cursor];
        slot[0..4].copy_from_slice(&timestamp_ms.to_be_bytes());
        slot[4] = kind.subsystem();
        slot[5] = kind.code();
        slot[6..8].copy_from_slice(&data.to_be_bytes());

        self.cursor += 1;
        if self.cursor >= N {
            self.cursor = 0;
            self.wrapped = true;
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Records currently held.
    pub fn len(&self) -> usize {
        if self.wrapped { N } else { self.cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw ring contents in slot order, for external diagnostic tooling.
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_flattened()
    }

    /// Decode the record in physical `slot`.
    pub fn record(&self, slot: usize) -> Option<EventRecord> {
        if slot >= self.len() {
            return None;
        }
        let raw = &self.buf[slot];
        Some(EventRecord {
            timestamp_ms: u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]),
            kind: u16::from_be_bytes([raw[4], raw[5]]),
            data: u16::from_be_bytes([raw[6], raw[7]]),
        })
    }

    /// Most recently appended record.
    pub fn latest(&self) -> Option<EventRecord> {
        if self.is_empty() {
            return None;
        }
        self.record((self.cursor + N - 1) % N)
    }

    /// Records from oldest to newest.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = EventRecord> + '_ {
        let start = if self.wrapped { self.cursor } else { 0 };
        (0..self.len()).filter_map(move |i| self.record((start + i) % N))
    }
}

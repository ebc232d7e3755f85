//! Anchoring relative record times to wall-clock time.
//!
//! Combat records carry a relative millisecond clock. The log start
//! record supplies the server and local Unix time (in seconds, truncated
//! to 32 bits) at which that clock read its own `time` value. From then
//! on every record time maps to
//!
//! ```text
//! absolute = anchor + time ms - log_start_time ms
//! ```
//!
//! for both the server and the local clock. Before the log start record,
//! the anchors are the Unix epoch and the offset is zero.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Converts a 32-bit Unix timestamp in seconds to a UTC time.
#[must_use]
pub fn unix_seconds(seconds: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(i64::from(seconds), 0).unwrap_or_default()
}

/// Server and local wall-clock time of a single instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    /// Time on the game server's clock.
    pub server: DateTime<Utc>,
    /// Time on the recording machine's clock.
    pub local: DateTime<Utc>,
}

/// The running time anchor of a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeSync {
    anchor: Timestamp,
    offset_ms: i64,
    anchored: bool,
}

impl TimeSync {
    /// Anchors the clock from a log start record.
    ///
    /// `server` and `local` are the record's `value` and `buff_dmg`
    /// fields; `time` is its relative timestamp.
    pub fn anchor(&mut self, server: i32, local: i32, time: u64) {
        self.anchor = Timestamp {
            server: unix_seconds(server as u32),
            local: unix_seconds(local as u32),
        };
        self.offset_ms = -i64::try_from(time).unwrap_or(i64::MAX);
        self.anchored = true;
    }

    /// Returns the server/local time of the log start.
    #[must_use]
    pub fn anchor_time(&self) -> Timestamp {
        self.anchor
    }

    /// Returns whether a log start record has been seen.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Returns the offset applied to relative times, in milliseconds.
    #[must_use]
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    /// Maps a relative record time to server and local wall-clock time.
    ///
    /// Times too far from the anchor to be represented saturate at the anchor.
    #[must_use]
    pub fn at(&self, time: u64) -> Timestamp {
        let delta = i64::try_from(time)
            .ok()
            .and_then(|time| time.checked_add(self.offset_ms))
            .and_then(TimeDelta::try_milliseconds);

        let shift = |base: DateTime<Utc>| {
            delta
                .and_then(|delta| base.checked_add_signed(delta))
                .unwrap_or(base)
        };

        Timestamp {
            server: shift(self.anchor.server),
            local: shift(self.anchor.local),
        }
    }
}

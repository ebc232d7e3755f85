//! Format constants and revision detection for EVTC files.
//!
//! An EVTC file is laid out as:
//!
//! | Section | Size |
//! |---------|------|
//! | Header | 16 bytes |
//! | Agent count | 4 bytes (u32 LE) |
//! | Agent records | count × 96 bytes |
//! | Skill count | 4 bytes (u32 LE) |
//! | Skill records | count × 68 bytes |
//! | Combat records | 64 bytes each, until end of input |
//!
//! The header's revision byte decides which of the two combat record
//! layouts follows. Both layouts are 64 bytes wide.
//!
//! # Example
//!
//! ```
//! use evtc::format::Revision;
//!
//! assert_eq!(Revision::from_byte(0), Some(Revision::Legacy));
//! assert_eq!(Revision::from_byte(1), Some(Revision::Current));
//! assert_eq!(Revision::from_byte(2), None);
//! ```

use serde::Serialize;

/// The signature at the start of every EVTC file.
pub const EVTC_MAGIC: &[u8; 4] = b"EVTC";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Size of one agent record in bytes.
pub const AGENT_RECORD_SIZE: usize = 96;

/// Size of one skill record in bytes.
pub const SKILL_RECORD_SIZE: usize = 68;

/// Size of one combat record in bytes (both revisions).
pub const COMBAT_RECORD_SIZE: usize = 64;

/// Size of the null-padded name field in agent and skill records.
pub const NAME_FIELD_SIZE: usize = 64;

/// The combat record layout revision declared in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Revision {
    /// Revision 0: 16-bit skill id and overstack value, no destination
    /// master instance id.
    Legacy,

    /// Revision 1: the canonical layout.
    Current,
}

impl Revision {
    /// Maps the header's revision byte to a layout.
    ///
    /// Returns `None` for values other than 0 and 1.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Revision::Legacy),
            1 => Some(Revision::Current),
            _ => None,
        }
    }

    /// Returns the revision byte as stored in the header.
    #[must_use]
    pub const fn as_byte(&self) -> u8 {
        match self {
            Revision::Legacy => 0,
            Revision::Current => 1,
        }
    }
}

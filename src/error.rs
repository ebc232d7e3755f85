//! Error types for the EVTC parser.
//!
//! This module defines the error hierarchy for every failure that can
//! occur while decoding a combat log: malformed headers, truncated
//! fixed-size blocks, and record discriminants outside the known
//! enumerations.

use std::fmt;

use thiserror::Error;

use crate::records::CombatRecord;

/// Identifies which discriminant field of a combat record was not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum EventField {
    /// The `is_statechange` byte.
    StateChange,
    /// The `is_activation` byte.
    Activation,
    /// The `is_buffremove` byte.
    BuffRemove,
    /// The `result` byte of a direct damage record.
    Result,
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventField::StateChange => write!(f, "state change"),
            EventField::Activation => write!(f, "activation"),
            EventField::BuffRemove => write!(f, "buff remove"),
            EventField::Result => write!(f, "result"),
        }
    }
}

/// The main error type for EVTC parsing operations.
///
/// Every error aborts the parse unless it is [recoverable](ParserError::is_recoverable)
/// and the caller opted into skipping such records through
/// [`ParseOptions`](crate::ParseOptions).
///
/// # Example
///
/// ```
/// use evtc::error::{ParserError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(ParserError::truncated(16, 3))
/// }
///
/// assert!(example_operation().is_err());
/// ```
#[derive(Error, Debug)]
pub enum ParserError {
    /// An I/O error occurred while reading from the byte source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header signature is not `EVTC`.
    #[error("Invalid magic bytes: expected \"EVTC\", found {found}")]
    BadMagic {
        /// The bytes found where the signature was expected (hex string).
        found: String,
    },

    /// The input ended inside a fixed-size block.
    #[error("Unexpected end of data: expected {expected} bytes, but only {available} available")]
    Truncated {
        /// The number of bytes the block required.
        expected: usize,
        /// The number of bytes that were actually available.
        available: usize,
    },

    /// The header declares a combat record revision this parser cannot read.
    #[error("Unsupported combat record revision {0}")]
    UnsupportedRevision(u8),

    /// A language state change carried an id outside the known languages.
    #[error("Unknown language code {code}")]
    UnknownLanguageCode {
        /// The raw language id.
        code: u64,
        /// The record carrying the id.
        record: Box<CombatRecord>,
    },

    /// A sub-dispatch discriminant is outside its known enumeration.
    #[error("Unrecognized {field} kind {value}")]
    UnrecognizedEventKind {
        /// The field that carried the unknown value.
        field: EventField,
        /// The unknown value.
        value: u8,
        /// The offending record.
        record: Box<CombatRecord>,
    },
}

impl ParserError {
    /// Creates a `BadMagic` error from the bytes found in the header.
    #[must_use]
    pub fn bad_magic(found: &[u8]) -> Self {
        ParserError::BadMagic {
            found: bytes_to_hex(found),
        }
    }

    /// Creates a `Truncated` error with the given sizes.
    ///
    /// # Arguments
    ///
    /// * `expected` - The number of bytes that were needed
    /// * `available` - The number of bytes actually available
    #[must_use]
    pub fn truncated(expected: usize, available: usize) -> Self {
        ParserError::Truncated {
            expected,
            available,
        }
    }

    /// Creates an `UnrecognizedEventKind` error for the given record.
    #[must_use]
    pub fn unrecognized(field: EventField, value: u8, record: &CombatRecord) -> Self {
        ParserError::UnrecognizedEventKind {
            field,
            value,
            record: Box::new(*record),
        }
    }

    /// Returns whether the error concerns a single record and leaves the
    /// rest of the stream decodable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ParserError::UnknownLanguageCode { .. } | ParserError::UnrecognizedEventKind { .. }
        )
    }

    /// Returns the record that caused a recoverable error, if any.
    #[must_use]
    pub fn record(&self) -> Option<&CombatRecord> {
        match self {
            ParserError::UnknownLanguageCode { record, .. }
            | ParserError::UnrecognizedEventKind { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// Converts a byte slice to a space-separated hexadecimal string.
fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A specialized Result type for EVTC parsing operations.
pub type Result<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CombatFlags;

    #[test]
    fn test_parser_error_display() {
        let err = ParserError::bad_magic(b"EVTX");
        assert!(err.to_string().contains("Invalid magic bytes"));
        assert!(err.to_string().contains("45 56 54 58"));

        let err = ParserError::truncated(96, 40);
        assert!(err.to_string().contains("expected 96 bytes"));
        assert!(err.to_string().contains("40 available"));

        let err = ParserError::UnsupportedRevision(7);
        assert_eq!(err.to_string(), "Unsupported combat record revision 7");
    }

    #[test]
    fn test_unrecognized_carries_record() {
        let record = CombatRecord {
            time: 42,
            flags: CombatFlags {
                is_statechange: 200,
                ..CombatFlags::default()
            },
            ..CombatRecord::default()
        };
        let err = ParserError::unrecognized(EventField::StateChange, 200, &record);

        assert!(err.is_recoverable());
        assert_eq!(err.record().map(|r| r.time), Some(42));
        assert_eq!(err.to_string(), "Unrecognized state change kind 200");
    }

    #[test]
    fn test_fatal_errors_not_recoverable() {
        assert!(!ParserError::truncated(1, 0).is_recoverable());
        assert!(!ParserError::bad_magic(b"ABCD").is_recoverable());
        assert!(ParserError::truncated(1, 0).record().is_none());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParserError>();
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "test error");
        let parser_err: ParserError = io_err.into();
        assert!(matches!(parser_err, ParserError::Io(_)));
    }
}

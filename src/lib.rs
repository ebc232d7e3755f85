//! # EVTC Parser
//!
//! A decoder for arcdps EVTC combat logs (Guild Wars 2).
//!
//! An EVTC file is a fixed 16-byte header, an agent table, a skill table
//! and a stream of 64-byte combat records. This library decodes all of it
//! into a [`Chain`]: the participants with their pet/master relationships
//! resolved, and one typed [`Event`] per record, anchored to server and
//! local wall-clock time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use evtc::events::EventKind;
//! use evtc::error::Result;
//!
//! fn summarize(path: &str) -> Result<()> {
//!     let file = std::fs::File::open(path)?;
//!     let chain = evtc::parse_reader(std::io::BufReader::new(file))?;
//!
//!     println!("arcdps {} boss {}", chain.arcdps_build, chain.boss_name);
//!     for event in &chain.events {
//!         if let EventKind::DirectDamage(hit) = &event.kind {
//!             let source = event.source.and_then(|a| chain.agent(a));
//!             println!("{:?} hit for {}", source.map(|a| &a.name), hit.damage);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`error`] - Error types and result alias for parser operations
//! - [`binary`] - Low-level little-endian reading utilities
//! - [`format`] - Section sizes and record revisions
//! - [`header`] - The 16-byte file header
//! - [`records`] - Raw agent, skill and combat records
//! - [`agents`] - Agent classification and pet/master resolution
//! - [`time`] - Relative to wall-clock time mapping
//! - [`events`] - Record classification into typed events
//! - [`chain`] - The decoded log
//! - [`options`] - Parse configuration
//!
//! ## Format Reference
//!
//! | Section | Layout |
//! |---------|--------|
//! | Header | `"EVTC"`, 8-byte build date, revision u8, boss species u16, 1 pad byte |
//! | Agents | u32 count, then 96 bytes each |
//! | Skills | u32 count, then 68 bytes each (u32 id, 64-byte name) |
//! | Records | 64 bytes each until end of input |
//!
//! All multi-byte integers are stored in little-endian byte order.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::io::{ErrorKind, Read};

pub mod agents;
pub mod binary;
pub mod chain;
pub mod error;
pub mod events;
pub mod format;
pub mod header;
pub mod options;
pub mod records;
pub mod time;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at the crate root
pub use agents::{Agent, AgentKind, AgentTable, EliteSpecId, ProfessionId};
pub use chain::{Chain, Language};
pub use error::{EventField, ParserError, Result};
pub use events::{CombatContext, Event, EventKind, HitResult};
pub use format::Revision;
pub use header::Header;
pub use options::{ParseOptions, UnknownKindPolicy};
pub use records::{CombatRecord, RawAgent, RawLog, SkillTable};
pub use time::Timestamp;

use format::HEADER_SIZE;

/// Decodes a complete EVTC log with default options.
///
/// # Errors
///
/// Any [`ParserError`] except `Io`; see [`parse_with`].
pub fn parse(data: &[u8]) -> Result<Chain> {
    parse_with(data, &ParseOptions::default())
}

/// Decodes a complete EVTC log.
///
/// # Errors
///
/// - `ParserError::BadMagic`, `ParserError::UnsupportedRevision` or
///   `ParserError::Truncated` from the raw layout
/// - `ParserError::UnrecognizedEventKind` and
///   `ParserError::UnknownLanguageCode` unless `options` skips unknown kinds
pub fn parse_with(data: &[u8], options: &ParseOptions) -> Result<Chain> {
    let raw = RawLog::decode(data)?;
    Chain::from_raw(raw, options)
}

/// Reads and decodes an EVTC log from a byte source.
///
/// The header is read and checked first, so a source that is not an
/// EVTC log is not read past its first 16 bytes.
///
/// # Errors
///
/// As [`parse`], plus `ParserError::Io` for read failures.
pub fn parse_reader(reader: impl Read) -> Result<Chain> {
    parse_reader_with(reader, &ParseOptions::default())
}

/// Reads and decodes an EVTC log from a byte source with the given options.
///
/// # Errors
///
/// As [`parse_with`], plus `ParserError::Io` for read failures.
pub fn parse_reader_with(mut reader: impl Read, options: &ParseOptions) -> Result<Chain> {
    let mut data = vec![0u8; HEADER_SIZE];
    let filled = read_up_to(&mut reader, &mut data)?;
    data.truncate(filled);
    Header::parse(&data)?;

    reader.read_to_end(&mut data)?;
    parse_with(&data, options)
}

/// Fills `buf` as far as the reader allows, returning the byte count.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

//! Raw record decoding for EVTC files.
//!
//! This module reads the fixed-width sections of an EVTC file without
//! assigning any meaning to them:
//!
//! - **Agent table**: u32 count followed by 96-byte [`RawAgent`] records
//! - **Skill table**: u32 count followed by 68-byte skill records ([`SkillTable`])
//! - **Combat records**: 64-byte records until end of input ([`CombatRecord`])
//!
//! # Example
//!
//! ```ignore
//! use evtc::records::RawLog;
//!
//! let data = std::fs::read("20190611-203641.evtc")?;
//! let log = RawLog::decode(&data)?;
//!
//! println!("arcdps {}", log.header.build_date);
//! println!("{} agents, {} skills, {} records",
//!          log.agents.len(), log.skills.len(), log.records.len());
//! ```

pub mod agent;
pub mod combat;
pub mod skill;

pub use agent::{NameParts, RawAgent};
pub use combat::{CombatFlags, CombatRecord, CombatRecordIterator, LegacyCombatRecord};
pub use skill::{SkillTable, SKILL_BANDAGE, SKILL_DODGE, SKILL_RESURRECT};

use tracing::debug;

use crate::binary::read_u32_le;
use crate::error::{ParserError, Result};
use crate::format::{AGENT_RECORD_SIZE, HEADER_SIZE};
use crate::header::Header;

/// Every section of an EVTC file, decoded but not yet interpreted.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// File header.
    pub header: Header,

    /// Agent table in file order.
    pub agents: Vec<RawAgent>,

    /// Skill names, seeded and overlaid with the on-disk table.
    pub skills: SkillTable,

    /// Combat records, normalized to the canonical shape.
    pub records: Vec<CombatRecord>,
}

impl RawLog {
    /// Decodes a complete EVTC file.
    ///
    /// # Errors
    ///
    /// - `ParserError::BadMagic` if the signature is not `EVTC`
    /// - `ParserError::UnsupportedRevision` for an unknown record revision
    /// - `ParserError::Truncated` if any fixed-size block is cut short
    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = Header::parse(data)?;
        let mut offset = HEADER_SIZE;

        let (agents, consumed) = parse_agents(&data[offset..])?;
        offset += consumed;

        let skill_count = read_u32_le(data, offset)?;
        offset += 4;
        let (skills, consumed) = SkillTable::parse(&data[offset..], skill_count)?;
        offset += consumed;

        let records = CombatRecordIterator::new(&data[offset..], header.revision)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            build = %header.build_date,
            revision = header.revision.as_byte(),
            agents = agents.len(),
            skills = skills.len(),
            records = records.len(),
            "decoded raw log"
        );

        Ok(RawLog {
            header,
            agents,
            skills,
            records,
        })
    }
}

/// Parses the agent count and agent records from the start of `data`.
///
/// Returns the agents and the number of bytes consumed, including the count.
///
/// # Errors
///
/// Returns `ParserError::Truncated` if the count or any declared record is missing.
pub fn parse_agents(data: &[u8]) -> Result<(Vec<RawAgent>, usize)> {
    let count = read_u32_le(data, 0)? as usize;
    let len = count
        .checked_mul(AGENT_RECORD_SIZE)
        .and_then(|len| len.checked_add(4))
        .ok_or_else(|| ParserError::truncated(usize::MAX, data.len()))?;
    if data.len() < len {
        return Err(ParserError::truncated(len, data.len()));
    }

    let agents = data[4..len]
        .chunks_exact(AGENT_RECORD_SIZE)
        .map(RawAgent::parse)
        .collect::<Result<Vec<_>>>()?;

    Ok((agents, len))
}

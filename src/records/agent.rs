//! Agent table record parsing.
//!
//! # Format
//!
//! | Offset | Size | Type | Field |
//! |--------|------|------|-------|
//! | 0 | 8 | u64 LE | Address (unique per log) |
//! | 8 | 4 | u32 LE | Profession, or species/volatile id in the low 16 bits |
//! | 12 | 4 | u32 LE | Elite spec, or `0xFFFFFFFF` for non-players |
//! | 16 | 2 | u16 LE | Toughness |
//! | 18 | 2 | u16 LE | Concentration |
//! | 20 | 2 | u16 LE | Healing |
//! | 22 | 2 | u16 LE | Hitbox width |
//! | 24 | 2 | u16 LE | Condition |
//! | 26 | 2 | u16 LE | Hitbox height |
//! | 28 | 64 | bytes | Name blob |
//! | 92 | 4 | bytes | Padding |
//!
//! The name blob holds up to three null-terminated strings: character
//! name, account name, and subgroup number as text.

use serde::Serialize;

use crate::binary::{null_terminated, read_array, read_u16_le, read_u32_le, read_u64_le};
use crate::error::{ParserError, Result};
use crate::format::{AGENT_RECORD_SIZE, NAME_FIELD_SIZE};

/// An agent record exactly as stored in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAgent {
    /// Process-unique address.
    pub address: u64,

    /// Profession code (players) or packed species/volatile id.
    pub profession: u32,

    /// Elite spec code, `1` for "HoT elite", `0xFFFFFFFF` for non-players.
    pub elite: u32,

    /// Toughness stat.
    pub toughness: u16,

    /// Concentration stat.
    pub concentration: u16,

    /// Healing stat.
    pub healing: u16,

    /// Hitbox width.
    pub hitbox_width: u16,

    /// Condition damage stat.
    pub condition: u16,

    /// Hitbox height.
    pub hitbox_height: u16,

    /// Raw name blob.
    #[serde(skip)]
    pub name: [u8; NAME_FIELD_SIZE],
}

impl RawAgent {
    /// Size of an agent record in bytes.
    pub const SIZE: usize = AGENT_RECORD_SIZE;

    /// Parses one agent record from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::Truncated` if fewer than 96 bytes remain.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(ParserError::truncated(Self::SIZE, data.len()));
        }

        Ok(RawAgent {
            address: read_u64_le(data, 0)?,
            profession: read_u32_le(data, 8)?,
            elite: read_u32_le(data, 12)?,
            toughness: read_u16_le(data, 16)?,
            concentration: read_u16_le(data, 18)?,
            healing: read_u16_le(data, 20)?,
            hitbox_width: read_u16_le(data, 22)?,
            condition: read_u16_le(data, 24)?,
            hitbox_height: read_u16_le(data, 26)?,
            name: read_array(data, 28)?,
        })
    }

    /// Splits the name blob into character name, account name and subgroup.
    ///
    /// Missing parts are empty and an unparsable subgroup is 0; this never fails.
    #[must_use]
    pub fn split_name(&self) -> NameParts {
        NameParts::from_blob(&self.name)
    }
}

/// The three strings packed into an agent's name blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameParts {
    /// Character (or NPC/gadget) name.
    pub character: String,

    /// Account name, empty for non-players.
    pub account: String,

    /// Squad subgroup, 0 when absent or not a number.
    pub subgroup: u32,
}

impl NameParts {
    /// Splits a name blob on null bytes into at most three parts.
    #[must_use]
    pub fn from_blob(blob: &[u8]) -> Self {
        let mut parts = blob.splitn(4, |&b| b == 0);
        let character = parts.next().map(null_terminated).unwrap_or_default();
        let account = parts.next().map(null_terminated).unwrap_or_default();
        let subgroup = parts
            .next()
            .map(null_terminated)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        NameParts {
            character,
            account,
            subgroup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(text: &[u8]) -> [u8; NAME_FIELD_SIZE] {
        let mut name = [0u8; NAME_FIELD_SIZE];
        name[..text.len()].copy_from_slice(text);
        name
    }

    fn agent_bytes(address: u64, prof: u32, elite: u32, name: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(RawAgent::SIZE);
        data.extend_from_slice(&address.to_le_bytes());
        data.extend_from_slice(&prof.to_le_bytes());
        data.extend_from_slice(&elite.to_le_bytes());
        for stat in [10u16, 5, 0, 48, 7, 240] {
            data.extend_from_slice(&stat.to_le_bytes());
        }
        data.extend_from_slice(&blob(name));
        data.extend_from_slice(&[0u8; 4]);
        data
    }

    #[test]
    fn test_raw_agent_parse() {
        let data = agent_bytes(0xDEAD_BEEF, 4, 55, b"Ranger Name\x00:acct.1234\x003\x00");
        let agent = RawAgent::parse(&data).unwrap();

        assert_eq!(agent.address, 0xDEAD_BEEF);
        assert_eq!(agent.profession, 4);
        assert_eq!(agent.elite, 55);
        assert_eq!(agent.toughness, 10);
        assert_eq!(agent.concentration, 5);
        assert_eq!(agent.healing, 0);
        assert_eq!(agent.hitbox_width, 48);
        assert_eq!(agent.condition, 7);
        assert_eq!(agent.hitbox_height, 240);

        let parts = agent.split_name();
        assert_eq!(parts.character, "Ranger Name");
        assert_eq!(parts.account, ":acct.1234");
        assert_eq!(parts.subgroup, 3);
    }

    #[test]
    fn test_raw_agent_truncated() {
        let data = agent_bytes(1, 1, 1, b"x");
        assert!(matches!(
            RawAgent::parse(&data[..95]),
            Err(ParserError::Truncated {
                expected: 96,
                available: 95
            })
        ));
    }

    #[test]
    fn test_name_split_all_zero() {
        let parts = NameParts::from_blob(&[0u8; NAME_FIELD_SIZE]);
        assert_eq!(parts, NameParts::default());
    }

    #[test]
    fn test_name_split_name_only() {
        let parts = NameParts::from_blob(&blob(b"Vale Guardian"));
        assert_eq!(parts.character, "Vale Guardian");
        assert_eq!(parts.account, "");
        assert_eq!(parts.subgroup, 0);
    }

    #[test]
    fn test_name_split_bad_subgroup() {
        let parts = NameParts::from_blob(&blob(b"A\x00:b.1\x00xx\x00"));
        assert_eq!(parts.account, ":b.1");
        assert_eq!(parts.subgroup, 0);
    }

    #[test]
    fn test_name_split_padded_subgroup() {
        let parts = NameParts::from_blob(&blob(b"A\x00:b.1\x00 3\x00"));
        assert_eq!(parts.subgroup, 0);

        let parts = NameParts::from_blob(&blob(b"A\x00:b.1\x003 \x00"));
        assert_eq!(parts.subgroup, 0);
    }

    #[test]
    fn test_name_split_full_blob_without_nulls() {
        let parts = NameParts::from_blob(&[b'a'; NAME_FIELD_SIZE]);
        assert_eq!(parts.character.len(), NAME_FIELD_SIZE);
        assert_eq!(parts.account, "");
    }
}

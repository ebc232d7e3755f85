//! Skill table parsing.
//!
//! Each skill record is a u32 LE id followed by a 64-byte null-padded name.
//! A handful of ids that arcdps emits but never writes to the table are
//! seeded before the on-disk entries are applied.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::binary::{read_fixed_string, read_u32_le};
use crate::error::{ParserError, Result};
use crate::format::{NAME_FIELD_SIZE, SKILL_RECORD_SIZE};

/// Skill id for resurrecting an ally.
pub const SKILL_RESURRECT: u32 = 1066;

/// Skill id for the personal-healing bandage.
pub const SKILL_BANDAGE: u32 = 1175;

/// Skill id for a dodge roll.
pub const SKILL_DODGE: u32 = 65001;

/// Mapping from skill id to display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillTable {
    names: HashMap<u32, Arc<str>>,
}

impl Default for SkillTable {
    fn default() -> Self {
        let names = [
            (SKILL_RESURRECT, "Resurrect"),
            (SKILL_BANDAGE, "Bandage"),
            (SKILL_DODGE, "Dodge"),
        ]
        .into_iter()
        .map(|(id, name)| (id, Arc::from(name)))
        .collect();

        SkillTable { names }
    }
}

impl SkillTable {
    /// Parses `count` skill records from the start of `data`.
    ///
    /// Returns the table and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::Truncated` if the declared records do not fit.
    pub fn parse(data: &[u8], count: u32) -> Result<(Self, usize)> {
        let len = (count as usize)
            .checked_mul(SKILL_RECORD_SIZE)
            .ok_or_else(|| ParserError::truncated(usize::MAX, data.len()))?;
        if data.len() < len {
            return Err(ParserError::truncated(len, data.len()));
        }

        let mut table = SkillTable::default();
        for record in data[..len].chunks_exact(SKILL_RECORD_SIZE) {
            let id = read_u32_le(record, 0)?;
            let name = read_fixed_string(record, 4, NAME_FIELD_SIZE)?;
            table.insert(id, name);
        }

        Ok((table, len))
    }

    /// Inserts or replaces a skill name.
    pub fn insert(&mut self, id: u32, name: impl Into<Arc<str>>) {
        self.names.insert(id, name.into());
    }

    /// Returns the name of a skill, if known.
    #[must_use]
    pub fn name(&self, id: u32) -> Option<&Arc<str>> {
        self.names.get(&id)
    }

    /// Returns the number of known skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill_bytes(id: u32, name: &str) -> Vec<u8> {
        let mut data = id.to_le_bytes().to_vec();
        let mut field = [0u8; NAME_FIELD_SIZE];
        field[..name.len()].copy_from_slice(name.as_bytes());
        data.extend_from_slice(&field);
        data
    }

    #[test]
    fn test_default_seeds() {
        let table = SkillTable::default();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(SKILL_RESURRECT).map(|s| &**s), Some("Resurrect"));
        assert_eq!(table.name(SKILL_BANDAGE).map(|s| &**s), Some("Bandage"));
        assert_eq!(table.name(SKILL_DODGE).map(|s| &**s), Some("Dodge"));
    }

    #[test]
    fn test_parse_overlays_seed() {
        let mut data = skill_bytes(SKILL_DODGE, "Evade Roll");
        data.extend(skill_bytes(5492, "Fire Attunement"));

        let (table, consumed) = SkillTable::parse(&data, 2).unwrap();

        assert_eq!(consumed, 2 * SKILL_RECORD_SIZE);
        assert_eq!(table.len(), 4);
        assert_eq!(table.name(SKILL_DODGE).map(|s| &**s), Some("Evade Roll"));
        assert_eq!(table.name(5492).map(|s| &**s), Some("Fire Attunement"));
        assert!(table.name(1).is_none());
    }

    #[test]
    fn test_parse_truncated() {
        let data = skill_bytes(1, "x");
        assert!(matches!(
            SkillTable::parse(&data, 2),
            Err(ParserError::Truncated {
                expected: 136,
                available: 68
            })
        ));
    }
}

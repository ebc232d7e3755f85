//! Combat record parsing for both layout revisions.
//!
//! Both revisions are 64 bytes wide. Revision 0 records are converted to
//! the canonical [`CombatRecord`] immediately after decoding so that the
//! rest of the crate only ever sees one shape.
//!
//! # Revision 0 layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 8 | time |
//! | 8 | 8 | src_agent |
//! | 16 | 8 | dst_agent |
//! | 24 | 4 | value (i32) |
//! | 28 | 4 | buff_dmg (i32) |
//! | 32 | 2 | overstack_value |
//! | 34 | 2 | skill_id |
//! | 36 | 2 | src_instid |
//! | 38 | 2 | dst_instid |
//! | 40 | 2 | src_master_instid |
//! | 42 | 9 | reserved |
//! | 51 | 12 | flags (iff .. is_offcycle) |
//! | 63 | 1 | reserved |
//!
//! # Revision 1 layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 8 | time |
//! | 8 | 8 | src_agent |
//! | 16 | 8 | dst_agent |
//! | 24 | 4 | value (i32) |
//! | 28 | 4 | buff_dmg (i32) |
//! | 32 | 4 | overstack_value |
//! | 36 | 4 | skill_id |
//! | 40 | 2 | src_instid |
//! | 42 | 2 | dst_instid |
//! | 44 | 2 | src_master_instid |
//! | 46 | 2 | dst_master_instid |
//! | 48 | 12 | flags (iff .. is_offcycle) |
//! | 60 | 4 | pad (buff stack id for some kinds) |
//!
//! The twelve flag bytes appear in this order in both revisions: `iff`,
//! `buff`, `result`, `is_activation`, `is_buffremove`, `is_ninety`,
//! `is_fifty`, `is_moving`, `is_statechange`, `is_flanking`,
//! `is_shields`, `is_offcycle`.

use serde::Serialize;

use crate::binary::{read_array, read_i32_le, read_u16_le, read_u32_le, read_u64_le};
use crate::error::{ParserError, Result};
use crate::format::{Revision, COMBAT_RECORD_SIZE};

/// The twelve single-byte classification fields shared by both revisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CombatFlags {
    /// Relation of source to destination (0 friend, 1 foe).
    pub iff: u8,
    /// Nonzero for buff application, removal, or damage.
    pub buff: u8,
    /// Hit result code.
    pub result: u8,
    /// Skill activation kind.
    pub is_activation: u8,
    /// Buff removal kind.
    pub is_buffremove: u8,
    /// Source health was over 90%.
    pub is_ninety: u8,
    /// Target health was under 50%.
    pub is_fifty: u8,
    /// Source was moving.
    pub is_moving: u8,
    /// State change kind.
    pub is_statechange: u8,
    /// Target was not facing the source.
    pub is_flanking: u8,
    /// Damage went to barrier, or buff stack is active.
    pub is_shields: u8,
    /// Buff damage happened off the tick cycle.
    pub is_offcycle: u8,
}

impl CombatFlags {
    fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let [
            iff,
            buff,
            result,
            is_activation,
            is_buffremove,
            is_ninety,
            is_fifty,
            is_moving,
            is_statechange,
            is_flanking,
            is_shields,
            is_offcycle,
        ] = read_array::<12>(data, offset)?;

        Ok(CombatFlags {
            iff,
            buff,
            result,
            is_activation,
            is_buffremove,
            is_ninety,
            is_fifty,
            is_moving,
            is_statechange,
            is_flanking,
            is_shields,
            is_offcycle,
        })
    }
}

/// A revision 0 combat record, before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyCombatRecord {
    /// Relative time in milliseconds.
    pub time: u64,
    /// Source agent address.
    pub src_agent: u64,
    /// Destination agent address.
    pub dst_agent: u64,
    /// Event-specific value.
    pub value: i32,
    /// Estimated buff damage.
    pub buff_dmg: i32,
    /// Overwritten stack duration.
    pub overstack_value: u16,
    /// Skill id.
    pub skill_id: u16,
    /// Source instance id.
    pub src_instid: u16,
    /// Destination instance id.
    pub dst_instid: u16,
    /// Source master instance id.
    pub src_master_instid: u16,
    /// Classification bytes.
    pub flags: CombatFlags,
}

impl LegacyCombatRecord {
    /// Parses a revision 0 record from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::Truncated` if fewer than 64 bytes remain.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < COMBAT_RECORD_SIZE {
            return Err(ParserError::truncated(COMBAT_RECORD_SIZE, data.len()));
        }

        Ok(LegacyCombatRecord {
            time: read_u64_le(data, 0)?,
            src_agent: read_u64_le(data, 8)?,
            dst_agent: read_u64_le(data, 16)?,
            value: read_i32_le(data, 24)?,
            buff_dmg: read_i32_le(data, 28)?,
            overstack_value: read_u16_le(data, 32)?,
            skill_id: read_u16_le(data, 34)?,
            src_instid: read_u16_le(data, 36)?,
            dst_instid: read_u16_le(data, 38)?,
            src_master_instid: read_u16_le(data, 40)?,
            flags: CombatFlags::parse(data, 51)?,
        })
    }
}

/// A combat record in the canonical (revision 1) shape.
///
/// `value`, `buff_dmg`, `overstack_value`, the agent fields and `pad` are
/// reinterpreted per record kind by the event classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CombatRecord {
    /// Relative time in milliseconds.
    pub time: u64,
    /// Source agent address.
    pub src_agent: u64,
    /// Destination agent address.
    pub dst_agent: u64,
    /// Event-specific value.
    pub value: i32,
    /// Estimated buff damage, zero on application.
    pub buff_dmg: i32,
    /// Overwritten stack duration, or barrier damage.
    pub overstack_value: u32,
    /// Skill id.
    pub skill_id: u32,
    /// Source instance id (reused over a log's lifetime).
    pub src_instid: u16,
    /// Destination instance id.
    pub dst_instid: u16,
    /// Instance id of the source's master, nonzero for pets and minions.
    pub src_master_instid: u16,
    /// Instance id of the destination's master.
    pub dst_master_instid: u16,
    /// Classification bytes.
    #[serde(flatten)]
    pub flags: CombatFlags,
    /// Trailing padding, used as a buff stack id by some kinds.
    pub pad: u32,
}

impl CombatRecord {
    /// Parses a revision 1 record from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::Truncated` if fewer than 64 bytes remain.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < COMBAT_RECORD_SIZE {
            return Err(ParserError::truncated(COMBAT_RECORD_SIZE, data.len()));
        }

        Ok(CombatRecord {
            time: read_u64_le(data, 0)?,
            src_agent: read_u64_le(data, 8)?,
            dst_agent: read_u64_le(data, 16)?,
            value: read_i32_le(data, 24)?,
            buff_dmg: read_i32_le(data, 28)?,
            overstack_value: read_u32_le(data, 32)?,
            skill_id: read_u32_le(data, 36)?,
            src_instid: read_u16_le(data, 40)?,
            dst_instid: read_u16_le(data, 42)?,
            src_master_instid: read_u16_le(data, 44)?,
            dst_master_instid: read_u16_le(data, 46)?,
            flags: CombatFlags::parse(data, 48)?,
            pad: read_u32_le(data, 60)?,
        })
    }

    /// Parses one record in the given revision's layout and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns `ParserError::Truncated` if fewer than 64 bytes remain.
    pub fn parse_revision(data: &[u8], revision: Revision) -> Result<Self> {
        match revision {
            Revision::Legacy => LegacyCombatRecord::parse(data).map(CombatRecord::from),
            Revision::Current => CombatRecord::parse(data),
        }
    }
}

impl From<LegacyCombatRecord> for CombatRecord {
    fn from(old: LegacyCombatRecord) -> Self {
        CombatRecord {
            time: old.time,
            src_agent: old.src_agent,
            dst_agent: old.dst_agent,
            value: old.value,
            buff_dmg: old.buff_dmg,
            overstack_value: u32::from(old.overstack_value),
            skill_id: u32::from(old.skill_id),
            src_instid: old.src_instid,
            dst_instid: old.dst_instid,
            src_master_instid: old.src_master_instid,
            dst_master_instid: 0,
            flags: old.flags,
            pad: 0,
        }
    }
}

/// Iterator over the combat records that follow the skill table.
///
/// Yields normalized records until the input is exhausted. Ending exactly
/// on a record boundary is the only clean termination; a partial trailing
/// record yields one `Truncated` error and then ends the iteration.
///
/// # Example
///
/// ```
/// use evtc::format::Revision;
/// use evtc::records::CombatRecordIterator;
///
/// let data = [0u8; 128];
/// let records: Vec<_> = CombatRecordIterator::new(&data, Revision::Current)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 2);
/// ```
pub struct CombatRecordIterator<'a> {
    data: &'a [u8],
    offset: usize,
    revision: Revision,
    finished: bool,
}

impl<'a> CombatRecordIterator<'a> {
    /// Creates an iterator over `data`, which must start at the first record.
    #[must_use]
    pub fn new(data: &'a [u8], revision: Revision) -> Self {
        Self {
            data,
            offset: 0,
            revision,
            finished: false,
        }
    }

    /// Returns the number of complete records left to read.
    #[must_use]
    pub fn remaining_records(&self) -> usize {
        self.data.len().saturating_sub(self.offset) / COMBAT_RECORD_SIZE
    }
}

impl Iterator for CombatRecordIterator<'_> {
    type Item = Result<CombatRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.offset >= self.data.len() {
            return None;
        }

        let result = CombatRecord::parse_revision(&self.data[self.offset..], self.revision);
        match result {
            Ok(_) => self.offset += COMBAT_RECORD_SIZE,
            Err(_) => self.finished = true,
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let records = self.remaining_records();
        let partial = usize::from(self.data.len().saturating_sub(self.offset) % COMBAT_RECORD_SIZE != 0);
        (records, Some(records + partial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_bytes() -> Vec<u8> {
        let mut data = Vec::with_capacity(COMBAT_RECORD_SIZE);
        data.extend_from_slice(&1234u64.to_le_bytes());
        data.extend_from_slice(&0xAAu64.to_le_bytes());
        data.extend_from_slice(&0xBBu64.to_le_bytes());
        data.extend_from_slice(&(-50i32).to_le_bytes());
        data.extend_from_slice(&77i32.to_le_bytes());
        data.extend_from_slice(&0xFFFEu16.to_le_bytes());
        data.extend_from_slice(&0xF00Du16.to_le_bytes());
        data.extend_from_slice(&11u16.to_le_bytes());
        data.extend_from_slice(&12u16.to_le_bytes());
        data.extend_from_slice(&13u16.to_le_bytes());
        data.extend_from_slice(&[0xEE; 9]);
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        data.push(0xEE);
        data
    }

    #[test]
    fn test_legacy_normalization_is_lossless() {
        let data = legacy_bytes();
        let old = LegacyCombatRecord::parse(&data).unwrap();
        let record = CombatRecord::from(old);

        assert_eq!(record.time, 1234);
        assert_eq!(record.src_agent, 0xAA);
        assert_eq!(record.dst_agent, 0xBB);
        assert_eq!(record.value, -50);
        assert_eq!(record.buff_dmg, 77);
        assert_eq!(record.overstack_value, 0xFFFE);
        assert_eq!(record.skill_id, 0xF00D);
        assert_eq!(record.src_instid, 11);
        assert_eq!(record.dst_instid, 12);
        assert_eq!(record.src_master_instid, 13);
        assert_eq!(record.flags.iff, 1);
        assert_eq!(record.flags.buff, 2);
        assert_eq!(record.flags.result, 3);
        assert_eq!(record.flags.is_activation, 4);
        assert_eq!(record.flags.is_buffremove, 5);
        assert_eq!(record.flags.is_ninety, 6);
        assert_eq!(record.flags.is_fifty, 7);
        assert_eq!(record.flags.is_moving, 8);
        assert_eq!(record.flags.is_statechange, 9);
        assert_eq!(record.flags.is_flanking, 10);
        assert_eq!(record.flags.is_shields, 11);
        assert_eq!(record.flags.is_offcycle, 12);

        // Fields absent from revision 0 are zero.
        assert_eq!(record.dst_master_instid, 0);
        assert_eq!(record.pad, 0);
    }

    #[test]
    fn test_current_record_parse() {
        let mut data = Vec::with_capacity(COMBAT_RECORD_SIZE);
        data.extend_from_slice(&99u64.to_le_bytes());
        data.extend_from_slice(&1u64.to_le_bytes());
        data.extend_from_slice(&2u64.to_le_bytes());
        data.extend_from_slice(&500i32.to_le_bytes());
        data.extend_from_slice(&0i32.to_le_bytes());
        data.extend_from_slice(&70_000u32.to_le_bytes());
        data.extend_from_slice(&80_000u32.to_le_bytes());
        for inst in [3u16, 4, 5, 6] {
            data.extend_from_slice(&inst.to_le_bytes());
        }
        data.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        data.extend_from_slice(&42u32.to_le_bytes());

        let record = CombatRecord::parse(&data).unwrap();
        assert_eq!(record.time, 99);
        assert_eq!(record.overstack_value, 70_000);
        assert_eq!(record.skill_id, 80_000);
        assert_eq!(record.src_instid, 3);
        assert_eq!(record.dst_master_instid, 6);
        assert_eq!(record.flags.buff, 1);
        assert_eq!(record.flags.is_shields, 1);
        assert_eq!(record.pad, 42);
    }

    #[test]
    fn test_parse_revision_dispatch() {
        let data = legacy_bytes();
        let legacy = CombatRecord::parse_revision(&data, Revision::Legacy).unwrap();
        let current = CombatRecord::parse_revision(&data, Revision::Current).unwrap();

        assert_eq!(legacy.skill_id, 0xF00D);
        // Same bytes read as revision 1 give the packed u32.
        assert_eq!(current.overstack_value, 0xF00D_FFFE);
    }

    #[test]
    fn test_iterator_clean_end() {
        let mut data = legacy_bytes();
        data.extend(legacy_bytes());

        let iter = CombatRecordIterator::new(&data, Revision::Legacy);
        assert_eq!(iter.size_hint(), (2, Some(2)));
        let records: Vec<_> = iter.collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_iterator_empty() {
        let mut iter = CombatRecordIterator::new(&[], Revision::Current);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_iterator_partial_trailing_record() {
        let mut data = legacy_bytes();
        data.extend_from_slice(&[0u8; 10]);

        let mut iter = CombatRecordIterator::new(&data, Revision::Legacy);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(
            iter.next(),
            Some(Err(ParserError::Truncated {
                expected: 64,
                available: 10
            }))
        ));
        assert!(iter.next().is_none());
    }
}

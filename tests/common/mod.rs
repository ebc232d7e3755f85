//! Synthetic EVTC log builder shared by the integration tests.

#![allow(dead_code)]

use evtc::records::{CombatFlags, CombatRecord};

/// Elite value marking NPCs and gadgets.
pub const NON_PLAYER: u32 = 0xFFFF_FFFF;

/// Writes an EVTC file section by section.
pub struct LogBuilder {
    revision: u8,
    boss_species: u16,
    agents: Vec<u8>,
    agent_count: u32,
    skills: Vec<u8>,
    skill_count: u32,
    records: Vec<u8>,
}

impl LogBuilder {
    /// Starts a log using the given combat record revision.
    pub fn new(revision: u8) -> Self {
        Self {
            revision,
            boss_species: 0,
            agents: Vec::new(),
            agent_count: 0,
            skills: Vec::new(),
            skill_count: 0,
            records: Vec::new(),
        }
    }

    pub fn boss(mut self, species: u16) -> Self {
        self.boss_species = species;
        self
    }

    /// Appends a 96-byte agent record. `name` is the raw name blob.
    pub fn agent(mut self, address: u64, profession: u32, elite: u32, name: &[u8]) -> Self {
        let mut record = [0u8; 96];
        record[0..8].copy_from_slice(&address.to_le_bytes());
        record[8..12].copy_from_slice(&profession.to_le_bytes());
        record[12..16].copy_from_slice(&elite.to_le_bytes());
        record[16..18].copy_from_slice(&10u16.to_le_bytes());
        record[22..24].copy_from_slice(&48u16.to_le_bytes());
        record[26..28].copy_from_slice(&240u16.to_le_bytes());
        record[28..28 + name.len()].copy_from_slice(name);
        self.agents.extend_from_slice(&record);
        self.agent_count += 1;
        self
    }

    /// Appends a 68-byte skill record.
    pub fn skill(mut self, id: u32, name: &str) -> Self {
        let mut record = [0u8; 68];
        record[0..4].copy_from_slice(&id.to_le_bytes());
        record[4..4 + name.len()].copy_from_slice(name.as_bytes());
        self.skills.extend_from_slice(&record);
        self.skill_count += 1;
        self
    }

    /// Appends a combat record in this log's revision layout.
    pub fn record(mut self, record: &CombatRecord) -> Self {
        let bytes = if self.revision == 0 {
            encode_legacy(record)
        } else {
            encode_current(record)
        };
        self.records.extend_from_slice(&bytes);
        self
    }

    /// Returns the complete file.
    pub fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"EVTC20190611");
        data.push(self.revision);
        data.extend_from_slice(&self.boss_species.to_le_bytes());
        data.push(0);
        data.extend_from_slice(&self.agent_count.to_le_bytes());
        data.extend_from_slice(&self.agents);
        data.extend_from_slice(&self.skill_count.to_le_bytes());
        data.extend_from_slice(&self.skills);
        data.extend_from_slice(&self.records);
        data
    }
}

fn flag_bytes(flags: &CombatFlags) -> [u8; 12] {
    [
        flags.iff,
        flags.buff,
        flags.result,
        flags.is_activation,
        flags.is_buffremove,
        flags.is_ninety,
        flags.is_fifty,
        flags.is_moving,
        flags.is_statechange,
        flags.is_flanking,
        flags.is_shields,
        flags.is_offcycle,
    ]
}

/// Encodes a record in the revision 1 layout.
pub fn encode_current(r: &CombatRecord) -> [u8; 64] {
    let mut b = [0u8; 64];
    b[0..8].copy_from_slice(&r.time.to_le_bytes());
    b[8..16].copy_from_slice(&r.src_agent.to_le_bytes());
    b[16..24].copy_from_slice(&r.dst_agent.to_le_bytes());
    b[24..28].copy_from_slice(&r.value.to_le_bytes());
    b[28..32].copy_from_slice(&r.buff_dmg.to_le_bytes());
    b[32..36].copy_from_slice(&r.overstack_value.to_le_bytes());
    b[36..40].copy_from_slice(&r.skill_id.to_le_bytes());
    b[40..42].copy_from_slice(&r.src_instid.to_le_bytes());
    b[42..44].copy_from_slice(&r.dst_instid.to_le_bytes());
    b[44..46].copy_from_slice(&r.src_master_instid.to_le_bytes());
    b[46..48].copy_from_slice(&r.dst_master_instid.to_le_bytes());
    b[48..60].copy_from_slice(&flag_bytes(&r.flags));
    b[60..64].copy_from_slice(&r.pad.to_le_bytes());
    b
}

/// Encodes a record in the revision 0 layout. Fields that do not exist
/// there are dropped; u32 fields are truncated to u16.
pub fn encode_legacy(r: &CombatRecord) -> [u8; 64] {
    let mut b = [0u8; 64];
    b[0..8].copy_from_slice(&r.time.to_le_bytes());
    b[8..16].copy_from_slice(&r.src_agent.to_le_bytes());
    b[16..24].copy_from_slice(&r.dst_agent.to_le_bytes());
    b[24..28].copy_from_slice(&r.value.to_le_bytes());
    b[28..32].copy_from_slice(&r.buff_dmg.to_le_bytes());
    b[32..34].copy_from_slice(&(r.overstack_value as u16).to_le_bytes());
    b[34..36].copy_from_slice(&(r.skill_id as u16).to_le_bytes());
    b[36..38].copy_from_slice(&r.src_instid.to_le_bytes());
    b[38..40].copy_from_slice(&r.dst_instid.to_le_bytes());
    b[40..42].copy_from_slice(&r.src_master_instid.to_le_bytes());
    b[51..63].copy_from_slice(&flag_bytes(&r.flags));
    b
}

/// A non-state-change record from `src` to `dst`.
pub fn hit(time: u64, src: u64, dst: u64) -> CombatRecord {
    CombatRecord {
        time,
        src_agent: src,
        dst_agent: dst,
        ..CombatRecord::default()
    }
}

/// A state-change record with the given code.
pub fn state_change(code: u8, time: u64, src: u64) -> CombatRecord {
    CombatRecord {
        time,
        src_agent: src,
        flags: CombatFlags {
            is_statechange: code,
            ..CombatFlags::default()
        },
        ..CombatRecord::default()
    }
}

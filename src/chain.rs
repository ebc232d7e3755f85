//! The decoded log.
//!
//! A [`Chain`] is the end product of a parse: the resolved agent table,
//! the skill table, the ordered event list and the log-wide metadata
//! that some state-change records carry instead of an event.
//!
//! Agents are looked up by address through the chain. Events and agents
//! never hold references to each other.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::agents::{resolve, Agent, AgentKind, AgentTable};
use crate::error::Result;
use crate::events::{classify, Event};
use crate::options::ParseOptions;
use crate::records::{RawLog, SkillTable};
use crate::time::{TimeSync, Timestamp};

/// Client text language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Language {
    /// English.
    English,
    /// Korean.
    Korean,
    /// French.
    French,
    /// German.
    German,
    /// Spanish.
    Spanish,
    /// Chinese.
    Chinese,
}

impl Language {
    /// Maps the id stored in a language record.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => Language::English,
            1 => Language::Korean,
            2 => Language::French,
            3 => Language::German,
            4 => Language::Spanish,
            5 => Language::Chinese,
            _ => return None,
        })
    }

    /// Returns the BCP 47 tag of the language.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Chinese => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A fully decoded combat log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Chain {
    /// arcdps build date from the header.
    pub arcdps_build: String,

    /// Boss species id from the header.
    pub boss_species: u16,

    /// Name of the first NPC whose species matches the boss, or empty.
    pub boss_name: String,

    /// Address of the recording player.
    pub point_of_view: Option<u64>,

    /// Client text language.
    pub language: Option<Language>,

    /// Game build id.
    pub build_id: u64,

    /// World (shard) id.
    pub world_id: u16,

    /// Map id.
    pub map_id: u16,

    /// Decoded events in record order.
    pub events: Vec<Event>,

    pub(crate) agents: AgentTable,

    #[serde(skip)]
    pub(crate) skills: SkillTable,

    #[serde(skip)]
    pub(crate) time: TimeSync,
}

impl Chain {
    /// Resolves agents and classifies every record of a raw log.
    ///
    /// # Errors
    ///
    /// Returns the first classification error, unless it is recoverable
    /// and `options` asks for unknown kinds to be skipped.
    pub fn from_raw(raw: RawLog, options: &ParseOptions) -> Result<Self> {
        let RawLog {
            header,
            agents,
            skills,
            records,
        } = raw;

        let agents = resolve(agents, &records);
        let boss_name = agents
            .iter()
            .find(|agent| agent.species_id() == Some(header.boss_species))
            .map(|agent| agent.name.clone())
            .unwrap_or_default();

        let mut chain = Chain {
            arcdps_build: header.build_date,
            boss_species: header.boss_species,
            boss_name,
            events: Vec::with_capacity(records.len()),
            agents,
            skills,
            ..Chain::default()
        };

        let mut skipped = 0usize;
        for record in &records {
            match classify(&mut chain, record) {
                Ok(Some(event)) => chain.events.push(event),
                Ok(None) => {}
                Err(err) if err.is_recoverable() && options.skips_unknown() => {
                    warn!(time = record.time, error = %err, "skipping record");
                    skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            records = records.len(),
            events = chain.events.len(),
            skipped,
            "classified records"
        );

        Ok(chain)
    }

    /// Returns the resolved agent table.
    #[must_use]
    pub fn agents(&self) -> &AgentTable {
        &self.agents
    }

    /// Looks up an agent by address.
    #[must_use]
    pub fn agent(&self, address: u64) -> Option<&Agent> {
        self.agents.get(address)
    }

    /// Returns the master of the given agent, if it has one.
    #[must_use]
    pub fn master_of(&self, address: u64) -> Option<&Agent> {
        self.agents.master_of(address)
    }

    /// Iterates player agents in table order.
    pub fn players(&self) -> impl Iterator<Item = &Agent> {
        self.agents
            .iter()
            .filter(|agent| matches!(agent.kind, AgentKind::Player { .. }))
    }

    /// Returns the first agent matching the boss species.
    #[must_use]
    pub fn boss(&self) -> Option<&Agent> {
        self.agents
            .iter()
            .find(|agent| agent.species_id() == Some(self.boss_species))
    }

    /// Returns the recording player's agent.
    #[must_use]
    pub fn recorder(&self) -> Option<&Agent> {
        self.point_of_view.and_then(|address| self.agent(address))
    }

    /// Returns the skill table.
    #[must_use]
    pub fn skills(&self) -> &SkillTable {
        &self.skills
    }

    /// Returns the server/local time of the log start, if one was recorded.
    #[must_use]
    pub fn log_start(&self) -> Option<Timestamp> {
        self.time.is_anchored().then(|| self.time.anchor_time())
    }

    /// Maps a relative record time to wall-clock time using the log anchor.
    #[must_use]
    pub fn timestamp(&self, time: u64) -> Timestamp {
        self.time.at(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::NON_PLAYER_ELITE;
    use crate::error::{EventField, ParserError};
    use crate::events::EventKind;
    use crate::format::{Revision, NAME_FIELD_SIZE};
    use crate::header::Header;
    use crate::records::{CombatFlags, CombatRecord, RawAgent};

    fn raw_agent(address: u64, profession: u32, elite: u32, name: &str) -> RawAgent {
        let mut blob = [0u8; NAME_FIELD_SIZE];
        blob[..name.len()].copy_from_slice(name.as_bytes());
        RawAgent {
            address,
            profession,
            elite,
            toughness: 0,
            concentration: 0,
            healing: 0,
            hitbox_width: 0,
            condition: 0,
            hitbox_height: 0,
            name: blob,
        }
    }

    fn raw_log(records: Vec<CombatRecord>) -> RawLog {
        RawLog {
            header: Header {
                build_date: "20190611".to_string(),
                revision: Revision::Current,
                boss_species: 0x3C6A,
            },
            agents: vec![
                raw_agent(1, 1, 62, "Player"),
                raw_agent(2, 0x0000_0005, NON_PLAYER_ELITE, "Add"),
                raw_agent(3, 0x0000_3C6A, NON_PLAYER_ELITE, "Boss"),
            ],
            skills: SkillTable::default(),
            records,
        }
    }

    fn state_change(code: u8, src_agent: u64) -> CombatRecord {
        CombatRecord {
            src_agent,
            flags: CombatFlags {
                is_statechange: code,
                ..CombatFlags::default()
            },
            ..CombatRecord::default()
        }
    }

    #[test]
    fn test_chain_metadata() {
        let records = vec![
            state_change(13, 1),
            state_change(14, 0),
            state_change(25, 1149),
            state_change(2, 1),
        ];
        let chain = Chain::from_raw(raw_log(records), &ParseOptions::default()).unwrap();

        assert_eq!(chain.arcdps_build, "20190611");
        assert_eq!(chain.boss_name, "Boss");
        assert_eq!(chain.boss().map(Agent::address), Some(3));
        assert_eq!(chain.recorder().map(|a| a.name.as_str()), Some("Player"));
        assert_eq!(chain.language, Some(Language::English));
        assert_eq!(chain.map_id, 1149);
        assert_eq!(chain.build_id, 0);
        assert_eq!(chain.players().count(), 1);
        assert!(chain.log_start().is_none());

        assert_eq!(chain.events.len(), 1);
        assert_eq!(chain.events[0].kind, EventKind::ExitCombat);
    }

    #[test]
    fn test_unknown_kind_aborts_by_default() {
        let records = vec![state_change(2, 1), state_change(200, 1)];
        let err = Chain::from_raw(raw_log(records), &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ParserError::UnrecognizedEventKind {
                field: EventField::StateChange,
                value: 200,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_kind_skipped() {
        let records = vec![
            state_change(200, 1),
            state_change(14, 42),
            state_change(2, 1),
        ];
        let options = ParseOptions::new().skip_unknown(true);
        let chain = Chain::from_raw(raw_log(records), &options).unwrap();

        assert_eq!(chain.events.len(), 1);
        assert_eq!(chain.language, None);
    }

    #[test]
    fn test_boss_name_ignores_players() {
        let mut log = raw_log(Vec::new());
        log.header.boss_species = 62;
        let chain = Chain::from_raw(log, &ParseOptions::default()).unwrap();
        assert_eq!(chain.boss_name, "");
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::from_code(5), Some(Language::Chinese));
        assert_eq!(Language::from_code(6), None);
        assert_eq!(Language::Korean.to_string(), "ko");
    }

    #[test]
    fn test_chain_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Chain>();
    }
}

//! Resolved participants of a combat log.
//!
//! Raw agent records are turned into [`Agent`]s by splitting the name
//! blob, classifying the agent from its sentinel fields, and replaying the
//! combat record stream (see [`resolve`]) to find each agent's instance
//! id, aware window and master.
//!
//! # Classification
//!
//! | `elite` | `profession >> 16` | Kind |
//! |---------|--------------------|------|
//! | `0xFFFFFFFF` | `0xFFFF` | Gadget, volatile id = low 16 bits |
//! | `0xFFFFFFFF` | other | NPC, species id = low 16 bits |
//! | other | any | Player |
//!
//! Agents are only ever referred to by address. Instance ids are reused
//! by the game over the lifetime of a log and are never used as a key.

mod profession;
mod resolver;

pub use profession::{CachedNames, EliteSpecId, NameResolver, NoNames, ProfessionId};
pub use resolver::resolve;

use std::collections::HashMap;

use serde::Serialize;

use crate::records::RawAgent;

/// Elite spec sentinel marking a non-player agent.
pub const NON_PLAYER_ELITE: u32 = 0xFFFF_FFFF;

/// Elite spec value meaning "the profession's Heart of Thorns elite".
pub const HOT_ELITE_MARKER: u32 = 1;

/// What kind of participant an agent is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AgentKind {
    /// A player character.
    Player {
        /// Profession.
        profession: ProfessionId,
        /// Elite specialization, with the HoT marker already expanded.
        elite_spec: EliteSpecId,
    },

    /// A non-player character, identified by species.
    Npc {
        /// Species id.
        species_id: u16,
    },

    /// A gadget (destructible object, structure, ...).
    Gadget {
        /// Volatile id, only stable within one log.
        volatile_id: u16,
    },
}

impl AgentKind {
    /// Classifies an agent from its profession and elite spec fields.
    #[must_use]
    pub fn classify(profession: u32, elite: u32) -> Self {
        let low = (profession & 0xFFFF) as u16;
        if elite == NON_PLAYER_ELITE {
            if profession >> 16 == 0xFFFF {
                AgentKind::Gadget { volatile_id: low }
            } else {
                AgentKind::Npc { species_id: low }
            }
        } else {
            let profession = ProfessionId(profession);
            let elite_spec = if elite == HOT_ELITE_MARKER {
                profession.hot_elite().unwrap_or(EliteSpecId::NONE)
            } else {
                EliteSpecId(elite)
            };
            AgentKind::Player {
                profession,
                elite_spec,
            }
        }
    }
}

/// Player-only details of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerInfo {
    /// Account name.
    pub account: String,
    /// Squad subgroup.
    pub subgroup: u32,
    /// Profession.
    pub profession: ProfessionId,
    /// Elite specialization.
    pub elite_spec: EliteSpecId,
    /// Toughness rating (0-10).
    pub toughness: u8,
    /// Concentration rating (0-10).
    pub concentration: u8,
    /// Healing rating (0-10).
    pub healing: u8,
    /// Condition damage rating (0-10).
    pub condition: u8,
}

/// A participant of the log with all synthesized fields filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    /// The agent record as stored in the file.
    #[serde(flatten)]
    pub raw: RawAgent,

    /// Player, NPC or gadget.
    pub kind: AgentKind,

    /// Character name.
    pub name: String,

    /// Account name, empty for non-players.
    pub account: String,

    /// Squad subgroup, 0 if not in a squad.
    pub subgroup: u32,

    /// Time of the first non-state-change record sourced from this agent.
    pub first_aware: u64,

    /// Time of the last such record, `u64::MAX` if never seen.
    pub last_aware: u64,

    /// Instance id from the first record sourced from this agent.
    pub instance_id: Option<u16>,

    /// Address of the agent's master, for pets and minions.
    pub master: Option<u64>,
}

impl Agent {
    /// Builds an unresolved agent from its raw record.
    #[must_use]
    pub fn from_raw(raw: RawAgent) -> Self {
        let names = raw.split_name();
        Agent {
            kind: AgentKind::classify(raw.profession, raw.elite),
            name: names.character,
            account: names.account,
            subgroup: names.subgroup,
            first_aware: 0,
            last_aware: u64::MAX,
            instance_id: None,
            master: None,
            raw,
        }
    }

    /// Returns the agent's address.
    #[must_use]
    pub fn address(&self) -> u64 {
        self.raw.address
    }

    /// Returns the hitbox width and height.
    #[must_use]
    pub fn hitbox(&self) -> (u16, u16) {
        (self.raw.hitbox_width, self.raw.hitbox_height)
    }

    /// Returns player details, or `None` for NPCs and gadgets.
    #[must_use]
    pub fn player(&self) -> Option<PlayerInfo> {
        let AgentKind::Player {
            profession,
            elite_spec,
        } = self.kind
        else {
            return None;
        };

        Some(PlayerInfo {
            account: self.account.clone(),
            subgroup: self.subgroup,
            profession,
            elite_spec,
            toughness: self.raw.toughness as u8,
            concentration: self.raw.concentration as u8,
            healing: self.raw.healing as u8,
            condition: self.raw.condition as u8,
        })
    }

    /// Returns the species id if this agent is an NPC.
    #[must_use]
    pub fn species_id(&self) -> Option<u16> {
        match self.kind {
            AgentKind::Npc { species_id } => Some(species_id),
            _ => None,
        }
    }

    /// Returns whether this agent is a gadget.
    #[must_use]
    pub fn is_gadget(&self) -> bool {
        matches!(self.kind, AgentKind::Gadget { .. })
    }

    /// Returns whether `time` falls strictly inside the agent's aware window.
    #[must_use]
    pub fn is_aware_at(&self, time: u64) -> bool {
        self.first_aware < time && time < self.last_aware
    }
}

/// Address-keyed agent table that keeps file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentTable {
    agents: Vec<Agent>,
    #[serde(skip)]
    by_address: HashMap<u64, usize>,
}

impl AgentTable {
    /// Builds a table from raw agent records, without resolution.
    ///
    /// If an address repeats, lookups find the later record.
    #[must_use]
    pub fn from_raw(raw: impl IntoIterator<Item = RawAgent>) -> Self {
        let agents: Vec<Agent> = raw.into_iter().map(Agent::from_raw).collect();
        let by_address = agents
            .iter()
            .enumerate()
            .map(|(index, agent)| (agent.address(), index))
            .collect();

        AgentTable { agents, by_address }
    }

    /// Looks up an agent by address.
    #[must_use]
    pub fn get(&self, address: u64) -> Option<&Agent> {
        self.index_of(address).map(|index| &self.agents[index])
    }

    /// Returns `Some(address)` if the address belongs to a known agent.
    #[must_use]
    pub fn reference(&self, address: u64) -> Option<u64> {
        self.by_address.contains_key(&address).then_some(address)
    }

    /// Returns the table position of an address.
    #[must_use]
    pub fn index_of(&self, address: u64) -> Option<usize> {
        self.by_address.get(&address).copied()
    }

    /// Returns the master of the given agent, if resolved.
    #[must_use]
    pub fn master_of(&self, address: u64) -> Option<&Agent> {
        self.get(address)?.master.and_then(|master| self.get(master))
    }

    /// Iterates agents in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Returns the number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NAME_FIELD_SIZE;

    pub(crate) fn raw_agent(address: u64, profession: u32, elite: u32, name: &[u8]) -> RawAgent {
        let mut blob = [0u8; NAME_FIELD_SIZE];
        blob[..name.len()].copy_from_slice(name);
        RawAgent {
            address,
            profession,
            elite,
            toughness: 10,
            concentration: 0,
            healing: 5,
            hitbox_width: 48,
            condition: 10,
            hitbox_height: 240,
            name: blob,
        }
    }

    #[test]
    fn test_classification_exhaustive() {
        let elites = [0u32, 1, 5, 62, 0xFFFF_FFFE, NON_PLAYER_ELITE];
        let professions = [0u32, 4, 0x0000_FFFF, 0x0001_3C6A, 0xFFFE_0001, 0xFFFF_0001, 0xFFFF_FFFF];

        for elite in elites {
            for profession in professions {
                let kind = AgentKind::classify(profession, elite);
                let is_player = matches!(kind, AgentKind::Player { .. });
                let is_npc = matches!(kind, AgentKind::Npc { .. });
                let is_gadget = matches!(kind, AgentKind::Gadget { .. });

                assert_eq!(
                    u8::from(is_player) + u8::from(is_npc) + u8::from(is_gadget),
                    1
                );
                assert_eq!(is_player, elite != NON_PLAYER_ELITE);
                assert_eq!(is_gadget, elite == NON_PLAYER_ELITE && profession >> 16 == 0xFFFF);
            }
        }
    }

    #[test]
    fn test_classify_values() {
        assert_eq!(
            AgentKind::classify(0xFFFF_0123, NON_PLAYER_ELITE),
            AgentKind::Gadget { volatile_id: 0x0123 }
        );
        assert_eq!(
            AgentKind::classify(0x0001_3C6A, NON_PLAYER_ELITE),
            AgentKind::Npc { species_id: 0x3C6A }
        );
        assert_eq!(
            AgentKind::classify(1, 62),
            AgentKind::Player {
                profession: ProfessionId::GUARDIAN,
                elite_spec: EliteSpecId::FIREBRAND
            }
        );
    }

    #[test]
    fn test_classify_hot_marker() {
        assert_eq!(
            AgentKind::classify(4, HOT_ELITE_MARKER),
            AgentKind::Player {
                profession: ProfessionId::RANGER,
                elite_spec: EliteSpecId::DRUID
            }
        );
        assert_eq!(
            AgentKind::classify(2, 0),
            AgentKind::Player {
                profession: ProfessionId::WARRIOR,
                elite_spec: EliteSpecId::NONE
            }
        );
        // No HoT elite is known for this profession.
        assert_eq!(
            AgentKind::classify(12, HOT_ELITE_MARKER),
            AgentKind::Player {
                profession: ProfessionId(12),
                elite_spec: EliteSpecId::NONE
            }
        );
    }

    #[test]
    fn test_agent_from_raw() {
        let agent = Agent::from_raw(raw_agent(7, 6, 56, b"Caster\x00:me.1234\x002\x00"));

        assert_eq!(agent.address(), 7);
        assert_eq!(agent.name, "Caster");
        assert_eq!(agent.hitbox(), (48, 240));
        assert_eq!(agent.last_aware, u64::MAX);
        assert_eq!(agent.instance_id, None);
        assert_eq!(agent.master, None);

        let player = agent.player().unwrap();
        assert_eq!(player.account, ":me.1234");
        assert_eq!(player.subgroup, 2);
        assert_eq!(player.elite_spec, EliteSpecId::WEAVER);
        assert_eq!(player.toughness, 10);
        assert!(agent.species_id().is_none());
        assert!(!agent.is_gadget());
    }

    #[test]
    fn test_table_lookup() {
        let table = AgentTable::from_raw([
            raw_agent(100, 1, 0, b"A"),
            raw_agent(200, 0x0000_0010, NON_PLAYER_ELITE, b"B"),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(200).map(|a| a.name.as_str()), Some("B"));
        assert_eq!(table.get(200).and_then(Agent::species_id), Some(0x10));
        assert_eq!(table.index_of(100), Some(0));
        assert_eq!(table.reference(100), Some(100));
        assert_eq!(table.reference(300), None);
        assert!(table.master_of(100).is_none());
    }
}

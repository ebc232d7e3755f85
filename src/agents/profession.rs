//! Professions, elite specializations and their display names.
//!
//! The decode path only ever stores numeric ids. Names are looked up on
//! demand: built-in names first, then an optional [`NameResolver`]
//! supplied by the caller, then the number itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

/// The id of a Guild Wars 2 profession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProfessionId(pub u32);

impl ProfessionId {
    /// Guardian.
    pub const GUARDIAN: Self = Self(1);
    /// Warrior.
    pub const WARRIOR: Self = Self(2);
    /// Engineer.
    pub const ENGINEER: Self = Self(3);
    /// Ranger.
    pub const RANGER: Self = Self(4);
    /// Thief.
    pub const THIEF: Self = Self(5);
    /// Elementalist.
    pub const ELEMENTALIST: Self = Self(6);
    /// Mesmer.
    pub const MESMER: Self = Self(7);
    /// Necromancer.
    pub const NECROMANCER: Self = Self(8);
    /// Revenant.
    pub const REVENANT: Self = Self(9);

    /// Returns the profession's name, if it is one of the nine known ones.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("Guardian"),
            2 => Some("Warrior"),
            3 => Some("Engineer"),
            4 => Some("Ranger"),
            5 => Some("Thief"),
            6 => Some("Elementalist"),
            7 => Some("Mesmer"),
            8 => Some("Necromancer"),
            9 => Some("Revenant"),
            _ => None,
        }
    }

    /// Returns the Heart of Thorns elite specialization of this profession.
    #[must_use]
    pub const fn hot_elite(self) -> Option<EliteSpecId> {
        match self.0 {
            1 => Some(EliteSpecId::DRAGONHUNTER),
            2 => Some(EliteSpecId::BERSERKER),
            3 => Some(EliteSpecId::SCRAPPER),
            4 => Some(EliteSpecId::DRUID),
            5 => Some(EliteSpecId::DAREDEVIL),
            6 => Some(EliteSpecId::TEMPEST),
            7 => Some(EliteSpecId::CHRONOMANCER),
            8 => Some(EliteSpecId::REAPER),
            9 => Some(EliteSpecId::HERALD),
            _ => None,
        }
    }
}

impl fmt::Display for ProfessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// The id of a Guild Wars 2 elite specialization. Zero means "core".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EliteSpecId(pub u32);

impl EliteSpecId {
    /// No elite specialization.
    pub const NONE: Self = Self(0);
    /// Druid (Ranger, HoT).
    pub const DRUID: Self = Self(5);
    /// Daredevil (Thief, HoT).
    pub const DAREDEVIL: Self = Self(7);
    /// Berserker (Warrior, HoT).
    pub const BERSERKER: Self = Self(18);
    /// Dragonhunter (Guardian, HoT).
    pub const DRAGONHUNTER: Self = Self(27);
    /// Reaper (Necromancer, HoT).
    pub const REAPER: Self = Self(34);
    /// Chronomancer (Mesmer, HoT).
    pub const CHRONOMANCER: Self = Self(40);
    /// Scrapper (Engineer, HoT).
    pub const SCRAPPER: Self = Self(43);
    /// Tempest (Elementalist, HoT).
    pub const TEMPEST: Self = Self(48);
    /// Herald (Revenant, HoT).
    pub const HERALD: Self = Self(52);
    /// Soulbeast (Ranger, PoF).
    pub const SOULBEAST: Self = Self(55);
    /// Weaver (Elementalist, PoF).
    pub const WEAVER: Self = Self(56);
    /// Holosmith (Engineer, PoF).
    pub const HOLOSMITH: Self = Self(57);
    /// Deadeye (Thief, PoF).
    pub const DEADEYE: Self = Self(58);
    /// Mirage (Mesmer, PoF).
    pub const MIRAGE: Self = Self(59);
    /// Scourge (Necromancer, PoF).
    pub const SCOURGE: Self = Self(60);
    /// Spellbreaker (Warrior, PoF).
    pub const SPELLBREAKER: Self = Self(61);
    /// Firebrand (Guardian, PoF).
    pub const FIREBRAND: Self = Self(62);
    /// Renegade (Revenant, PoF).
    pub const RENEGADE: Self = Self(63);

    /// Returns the built-in name of this elite spec, if known.
    #[must_use]
    pub const fn builtin_name(self) -> Option<&'static str> {
        match self.0 {
            5 => Some("Druid"),
            7 => Some("Daredevil"),
            18 => Some("Berserker"),
            27 => Some("Dragonhunter"),
            34 => Some("Reaper"),
            40 => Some("Chronomancer"),
            43 => Some("Scrapper"),
            48 => Some("Tempest"),
            52 => Some("Herald"),
            55 => Some("Soulbeast"),
            56 => Some("Weaver"),
            57 => Some("Holosmith"),
            58 => Some("Deadeye"),
            59 => Some("Mirage"),
            60 => Some("Scourge"),
            61 => Some("Spellbreaker"),
            62 => Some("Firebrand"),
            63 => Some("Renegade"),
            _ => None,
        }
    }

    /// Returns a display name: empty for core, built-in name, resolver
    /// name, or the numeric id, in that order.
    #[must_use]
    pub fn display_name(self, resolver: &dyn NameResolver) -> String {
        if self == Self::NONE {
            return String::new();
        }
        if let Some(name) = self.builtin_name() {
            return name.to_string();
        }
        resolver
            .elite_spec_name(self)
            .unwrap_or_else(|| self.0.to_string())
    }
}

impl fmt::Display for EliteSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name(&NoNames))
    }
}

/// A source of elite specialization names beyond the built-in table.
pub trait NameResolver {
    /// Returns the name for `id`, or `None` to fall back to the number.
    fn elite_spec_name(&self, id: EliteSpecId) -> Option<String>;
}

/// A resolver that knows no names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNames;

impl NameResolver for NoNames {
    fn elite_spec_name(&self, _id: EliteSpecId) -> Option<String> {
        None
    }
}

/// A thread-safe resolver that runs its loader once, on first lookup.
///
/// The loader typically queries a remote API; if it fails it should
/// return an empty map, after which every lookup falls back to the id.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use evtc::agents::{CachedNames, EliteSpecId};
///
/// let names = CachedNames::new(|| HashMap::from([(64, "Harbinger".to_string())]));
/// assert_eq!(EliteSpecId(64).display_name(&names), "Harbinger");
/// assert_eq!(EliteSpecId(99).display_name(&names), "99");
/// ```
pub struct CachedNames<F> {
    loader: F,
    names: OnceLock<HashMap<u32, String>>,
}

impl<F> CachedNames<F>
where
    F: Fn() -> HashMap<u32, String>,
{
    /// Creates a cache around `loader`. Nothing is loaded until the first lookup.
    pub fn new(loader: F) -> Self {
        Self {
            loader,
            names: OnceLock::new(),
        }
    }
}

impl<F> NameResolver for CachedNames<F>
where
    F: Fn() -> HashMap<u32, String>,
{
    fn elite_spec_name(&self, id: EliteSpecId) -> Option<String> {
        self.names.get_or_init(&self.loader).get(&id.0).cloned()
    }
}

impl<F> fmt::Debug for CachedNames<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedNames")
            .field("loaded", &self.names.get().map(HashMap::len))
            .finish()
    }
}

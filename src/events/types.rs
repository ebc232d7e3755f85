//! Core event types.
//!
//! An [`Event`] carries the fields every event shares (relative time,
//! wall-clock time, source agent) and an [`EventKind`] with the data
//! specific to that kind. Skill-related kinds additionally embed a
//! [`CombatContext`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::time::Timestamp;

/// A decoded event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Relative time of the source record in milliseconds.
    pub time: u64,

    /// Server and local wall-clock time.
    pub timestamp: Timestamp,

    /// Address of the agent that caused the event, if it is a known agent.
    pub source: Option<u64>,

    /// Kind-specific data.
    pub kind: EventKind,
}

impl Event {
    /// Returns the combat context for skill-related kinds.
    #[must_use]
    pub fn context(&self) -> Option<&CombatContext> {
        match &self.kind {
            EventKind::SkillActivation(e) => Some(&e.context),
            EventKind::SkillActivated(e) => Some(&e.context),
            EventKind::BuffRemove(e) => Some(&e.context),
            EventKind::BuffApply(e) => Some(&e.context),
            EventKind::BuffDamage(e) => Some(&e.context),
            EventKind::DirectDamage(e) => Some(&e.context),
            _ => None,
        }
    }

    /// Returns the agent directly affected by the event, if any.
    #[must_use]
    pub fn target(&self) -> Option<u64> {
        self.context().and_then(|c| c.target)
    }

    /// Returns the skill id and name for kinds that refer to a skill.
    #[must_use]
    pub fn skill(&self) -> Option<(u32, &str)> {
        match &self.kind {
            EventKind::InitialBuff(e) => Some((e.skill_id, &*e.skill_name)),
            _ => self.context().map(|c| (c.skill_id, &*c.skill_name)),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[@{}ms] {}", self.time, self.kind.type_name())?;
        if let Some(source) = self.source {
            write!(f, " src={source:#x}")?;
        }
        if let Some((id, name)) = self.skill() {
            write!(f, " skill={id}")?;
            if !name.is_empty() {
                write!(f, " ({name})")?;
            }
        }
        Ok(())
    }
}

/// Enumeration of every event kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EventKind {
    /// The source entered combat.
    EnterCombat {
        /// Squad subgroup of the source.
        subgroup: u64,
    },

    /// The source left combat.
    ExitCombat,

    /// The source changed between alive, downed and defeated.
    StateChange {
        /// The new state.
        state: LifeState,
    },

    /// The source entered or left game tracking range.
    Tracking {
        /// `true` on spawn, `false` on despawn.
        spawned: bool,
    },

    /// The source reached a health marker.
    HealthUpdate {
        /// Health percentage × 100 (99.5% is 9950).
        percent: u16,
    },

    /// Logging started. Times of later events are anchored here.
    LogStart,

    /// Logging ended.
    LogEnd {
        /// Server and local time reported by the end record itself.
        real: Timestamp,
    },

    /// The source swapped weapon sets.
    WeaponSwap {
        /// New set (0/1 underwater, 4/5 land).
        set: u64,
    },

    /// The source's maximum health changed.
    MaxHealthUpdate {
        /// New maximum health.
        max_health: u64,
    },

    /// The source picked up a reward chest.
    Reward {
        /// Reward id.
        reward_id: u64,
        /// Reward type.
        reward_type: i32,
    },

    /// A buff present on the source when logging started.
    InitialBuff(InitialBuff),

    /// The source moved.
    Position(Vector3),

    /// The source's velocity changed.
    Velocity(Vector3),

    /// The source turned.
    Facing {
        /// X component of the facing direction.
        x: f32,
        /// Y component of the facing direction.
        y: f32,
    },

    /// The source changed team.
    TeamChange {
        /// New team id.
        team_id: u64,
    },

    /// The source is an attack target (weak point) of a gadget.
    AttackTarget {
        /// The gadget the attack target belongs to.
        parent: Option<u64>,
        /// Whether the attack target can currently be hit.
        targetable: bool,
    },

    /// The source became targetable or untargetable.
    Targetable {
        /// New targetable state.
        targetable: bool,
    },

    /// A buff stack on the source became the active one.
    StackActive {
        /// Stack id.
        stack: u32,
    },

    /// A buff stack on the source was reset (and marked inactive).
    StackReset {
        /// Duration the stack was reset to.
        duration: Duration,
        /// Stack id.
        stack: u32,
    },

    /// The source's guild.
    Guild {
        /// Guild id in API form.
        guild: Uuid,
    },

    /// The source started casting a skill.
    SkillActivation(SkillActivation),

    /// The source stopped casting a skill.
    SkillActivated(SkillActivated),

    /// The source lost one or more buff stacks.
    BuffRemove(BuffRemove),

    /// A buff was applied to the target.
    BuffApply(BuffApply),

    /// A buff dealt damage to the target.
    BuffDamage(BuffDamage),

    /// A direct hit on the target.
    DirectDamage(DirectDamage),
}

impl EventKind {
    /// Returns a short name for this kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::EnterCombat { .. } => "EnterCombat",
            EventKind::ExitCombat => "ExitCombat",
            EventKind::StateChange { .. } => "StateChange",
            EventKind::Tracking { .. } => "Tracking",
            EventKind::HealthUpdate { .. } => "HealthUpdate",
            EventKind::LogStart => "LogStart",
            EventKind::LogEnd { .. } => "LogEnd",
            EventKind::WeaponSwap { .. } => "WeaponSwap",
            EventKind::MaxHealthUpdate { .. } => "MaxHealthUpdate",
            EventKind::Reward { .. } => "Reward",
            EventKind::InitialBuff(_) => "InitialBuff",
            EventKind::Position(_) => "Position",
            EventKind::Velocity(_) => "Velocity",
            EventKind::Facing { .. } => "Facing",
            EventKind::TeamChange { .. } => "TeamChange",
            EventKind::AttackTarget { .. } => "AttackTarget",
            EventKind::Targetable { .. } => "Targetable",
            EventKind::StackActive { .. } => "StackActive",
            EventKind::StackReset { .. } => "StackReset",
            EventKind::Guild { .. } => "Guild",
            EventKind::SkillActivation(_) => "SkillActivation",
            EventKind::SkillActivated(_) => "SkillActivated",
            EventKind::BuffRemove(_) => "BuffRemove",
            EventKind::BuffApply(_) => "BuffApply",
            EventKind::BuffDamage(_) => "BuffDamage",
            EventKind::DirectDamage(_) => "DirectDamage",
        }
    }
}

/// Alive/downed/defeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifeState {
    /// Alive (or revived).
    Alive,
    /// Downed.
    Downed,
    /// Dead.
    Defeated,
}

/// A position or velocity in game coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector3 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

/// Relation between source and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Iff {
    /// Allies.
    Friend,
    /// Enemies.
    Foe,
    /// Any other value.
    Unknown(u8),
}

impl Iff {
    /// Maps the raw `iff` byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Iff::Friend,
            1 => Iff::Foe,
            n => Iff::Unknown(n),
        }
    }
}

/// Fields shared by every skill-related event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatContext {
    /// Address of the affected agent, if it is a known agent.
    pub target: Option<u64>,
    /// Skill id.
    pub skill_id: u32,
    /// Skill name, empty if the skill table has no entry.
    pub skill_name: Arc<str>,
    /// Source/target relation.
    pub iff: Iff,
    /// Source health was above 90%.
    pub ninety: bool,
    /// Target health was below 50%.
    pub fifty: bool,
    /// Source was moving.
    pub moving: bool,
    /// Source was behind or beside the target.
    pub flanking: bool,
}

impl CombatContext {
    /// Returns whether source and target are allies.
    #[must_use]
    pub fn is_friend(&self) -> bool {
        self.iff == Iff::Friend
    }

    /// Returns whether source and target are enemies.
    #[must_use]
    pub fn is_foe(&self) -> bool {
        self.iff == Iff::Foe
    }
}

/// Start of a skill cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillActivation {
    /// Shared skill fields.
    pub context: CombatContext,
    /// Expected cast duration.
    pub expected_duration: Duration,
    /// Whether the cast was sped up by quickness.
    pub quickness: bool,
}

/// How a skill cast ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivationEnd {
    /// Stopped after reaching the tooltip time.
    Completed,
    /// Stopped before reaching the tooltip time.
    Cancelled,
    /// Animation ran to its full length.
    Reset,
}

/// End of a skill cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillActivated {
    /// Shared skill fields.
    pub context: CombatContext,
    /// Time spent casting.
    pub duration: Duration,
    /// How the cast ended.
    pub end: ActivationEnd,
}

impl SkillActivated {
    /// Returns whether the skill went off.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end != ActivationEnd::Cancelled
    }
}

/// How many stacks a removal took and who reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuffRemoval {
    /// Last or all stacks removed, sent by the server.
    All,
    /// A single stack removed, sent by the server.
    Single,
    /// A single stack removed by arcdps itself (out of combat or all
    /// stacks). Counts for volume, not for strips or cleanses.
    Manual,
}

/// Removal of buff stacks from the event's source.
///
/// The raw record names the affected agent as its destination; here the
/// agent losing the buff is the source and the remover is the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuffRemove {
    /// Shared skill fields; `target` is the agent that caused the removal.
    pub context: CombatContext,
    /// Total duration removed.
    pub duration: Duration,
    /// Longest stack duration removed.
    pub intensity: Duration,
    /// Number of stacks removed.
    pub stacks: u8,
    /// Stack id.
    pub stack: u32,
    /// Removal kind.
    pub removal: BuffRemoval,
}

impl BuffRemove {
    /// Returns whether arcdps synthesized this removal.
    #[must_use]
    pub fn is_synthesized(&self) -> bool {
        self.removal == BuffRemoval::Manual
    }
}

/// What an application did to an existing stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Overstack {
    /// Duration lost to the stack cap.
    Wasted(Duration),
    /// New duration of an extended stack.
    NewDuration(Duration),
}

/// A buff application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuffApply {
    /// Shared skill fields.
    pub context: CombatContext,
    /// Applied duration.
    pub duration: Duration,
    /// Stack id.
    pub stack: u32,
    /// Whether the stack is the active one.
    pub active: bool,
    /// Overstack or extension.
    pub overstack: Overstack,
}

/// A buff present when logging started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitialBuff {
    /// Skill id of the buff.
    pub skill_id: u32,
    /// Skill name, empty if unknown.
    pub skill_name: Arc<str>,
    /// Remaining duration.
    pub duration: Duration,
    /// Stack id.
    pub stack: u32,
    /// Whether the stack is the active one.
    pub active: bool,
}

/// Damage dealt by a buff (conditions, mostly).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuffDamage {
    /// Shared skill fields.
    pub context: CombatContext,
    /// Damage dealt.
    pub damage: i32,
    /// Whether the damage came from a periodic tick rather than on application.
    pub tick: bool,
    /// Whether the damage landed.
    pub success: bool,
}

/// Outcome of a direct hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitResult {
    /// Good hit.
    Normal,
    /// Critical hit.
    Critical,
    /// Glancing hit.
    Glancing,
    /// Blocked.
    Blocked,
    /// Evaded.
    Evaded,
    /// The hit interrupted something.
    Interrupt,
    /// Absorbed or invulnerable.
    Absorbed,
    /// Missed (blinded).
    Blind,
    /// The hit killed the target.
    KillingBlow,
    /// The hit downed the target.
    Downed,
}

impl HitResult {
    /// Maps the raw `result` byte, or `None` if it is unknown.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => HitResult::Normal,
            1 => HitResult::Critical,
            2 => HitResult::Glancing,
            3 => HitResult::Blocked,
            4 => HitResult::Evaded,
            5 => HitResult::Interrupt,
            6 => HitResult::Absorbed,
            7 => HitResult::Blind,
            8 => HitResult::KillingBlow,
            9 => HitResult::Downed,
            _ => return None,
        })
    }

    /// Returns whether the hit connected.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(
            self,
            HitResult::Normal | HitResult::Critical | HitResult::Glancing | HitResult::Interrupt
        )
    }
}

/// A direct hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectDamage {
    /// Shared skill fields.
    pub context: CombatContext,
    /// Damage dealt to health.
    pub damage: i32,
    /// Damage absorbed by barrier.
    pub barrier: u32,
    /// Whether the target was already downed.
    pub target_downed: bool,
    /// Hit outcome.
    pub result: HitResult,
}

impl DirectDamage {
    /// Returns whether the hit connected.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

//! Record dispatch.
//!
//! Every canonical record maps to exactly one event, to a chain metadata
//! update, or to an error. Discriminant flags are checked in a fixed
//! order and the first nonzero one wins:
//!
//! | Check | Result |
//! |-------|--------|
//! | `is_statechange != 0` | see [`state_change`](super::state_change) |
//! | `is_activation != 0` | `SkillActivation` / `SkillActivated` |
//! | `is_buffremove != 0` | `BuffRemove` |
//! | `buff_dmg != 0` | `BuffDamage` |
//! | `buff != 0` | `BuffApply` |
//! | otherwise | `DirectDamage` |

use std::sync::Arc;
use std::time::Duration;

use super::state_change;
use super::types::{
    ActivationEnd, BuffApply, BuffDamage, BuffRemoval, BuffRemove, CombatContext,
    DirectDamage, Event, EventKind, HitResult, Iff, Overstack, SkillActivated, SkillActivation,
};
use crate::chain::Chain;
use crate::error::{EventField, ParserError, Result};
use crate::records::CombatRecord;

/// Classifies one record against the chain built so far.
///
/// Returns `Ok(None)` for records that only update chain metadata.
///
/// # Errors
///
/// Returns `ParserError::UnrecognizedEventKind` when a sub-dispatch
/// discriminant is unknown, and `ParserError::UnknownLanguageCode` for a
/// language record with an unknown id.
pub fn classify(chain: &mut Chain, record: &CombatRecord) -> Result<Option<Event>> {
    let flags = &record.flags;

    if flags.is_statechange != 0 {
        return state_change::classify(chain, record);
    }

    let event = if flags.is_activation != 0 {
        activation(chain, record)?
    } else if flags.is_buffremove != 0 {
        buff_remove(chain, record)?
    } else if record.buff_dmg != 0 {
        buff_damage(chain, record)
    } else if flags.buff != 0 {
        buff_apply(chain, record)
    } else {
        direct_damage(chain, record)?
    };

    Ok(Some(event))
}

/// Builds an event sourced from `source`, timed from the record.
pub(super) fn event(chain: &Chain, record: &CombatRecord, source: u64, kind: EventKind) -> Event {
    Event {
        time: record.time,
        timestamp: chain.time.at(record.time),
        source: chain.agents.reference(source),
        kind,
    }
}

/// Returns the skill name, empty if the table has none.
pub(super) fn skill_name(chain: &Chain, skill_id: u32) -> Arc<str> {
    chain
        .skills
        .name(skill_id)
        .cloned()
        .unwrap_or_else(|| Arc::from(""))
}

/// Builds the shared skill fields with the given target address.
fn context(chain: &Chain, record: &CombatRecord, target: u64) -> CombatContext {
    let flags = &record.flags;
    CombatContext {
        target: chain.agents.reference(target),
        skill_id: record.skill_id,
        skill_name: skill_name(chain, record.skill_id),
        iff: Iff::from_byte(flags.iff),
        ninety: flags.is_ninety != 0,
        fifty: flags.is_fifty != 0,
        moving: flags.is_moving != 0,
        flanking: flags.is_flanking != 0,
    }
}

/// Milliseconds from a signed field; negative values clamp to zero.
pub(super) fn millis(value: i32) -> Duration {
    Duration::from_millis(u64::try_from(value).unwrap_or(0))
}

/// Milliseconds from a field the game writes as unsigned.
pub(super) fn unsigned_millis(value: i32) -> Duration {
    Duration::from_millis(u64::from(value as u32))
}

fn activation(chain: &Chain, record: &CombatRecord) -> Result<Event> {
    let context = context(chain, record, record.dst_agent);
    let duration = unsigned_millis(record.value);

    let kind = match record.flags.is_activation {
        code @ (1 | 2) => EventKind::SkillActivation(SkillActivation {
            context,
            expected_duration: duration,
            quickness: code == 2,
        }),
        code @ 3..=5 => EventKind::SkillActivated(SkillActivated {
            context,
            duration,
            end: match code {
                3 => ActivationEnd::Completed,
                4 => ActivationEnd::Cancelled,
                _ => ActivationEnd::Reset,
            },
        }),
        code => return Err(ParserError::unrecognized(EventField::Activation, code, record)),
    };

    Ok(event(chain, record, record.src_agent, kind))
}

fn buff_remove(chain: &Chain, record: &CombatRecord) -> Result<Event> {
    let removal = match record.flags.is_buffremove {
        1 => BuffRemoval::All,
        2 => BuffRemoval::Single,
        3 => BuffRemoval::Manual,
        code => return Err(ParserError::unrecognized(EventField::BuffRemove, code, record)),
    };

    // The raw destination is the agent losing the buff.
    let kind = EventKind::BuffRemove(BuffRemove {
        context: context(chain, record, record.src_agent),
        duration: millis(record.value),
        intensity: millis(record.buff_dmg),
        stacks: record.flags.result,
        stack: record.pad,
        removal,
    });

    Ok(event(chain, record, record.dst_agent, kind))
}

fn buff_damage(chain: &Chain, record: &CombatRecord) -> Event {
    let kind = EventKind::BuffDamage(BuffDamage {
        context: context(chain, record, record.dst_agent),
        damage: record.buff_dmg,
        tick: record.flags.is_offcycle == 0,
        success: record.flags.result == 0,
    });

    event(chain, record, record.src_agent, kind)
}

pub(super) fn buff_apply_fields(record: &CombatRecord) -> (Duration, u32, bool) {
    (millis(record.value), record.pad, record.flags.is_shields != 0)
}

fn buff_apply(chain: &Chain, record: &CombatRecord) -> Event {
    let (duration, stack, active) = buff_apply_fields(record);
    let overstack = Duration::from_millis(u64::from(record.overstack_value));

    let kind = EventKind::BuffApply(BuffApply {
        context: context(chain, record, record.dst_agent),
        duration,
        stack,
        active,
        overstack: if record.flags.is_offcycle == 0 {
            Overstack::Wasted(overstack)
        } else {
            Overstack::NewDuration(overstack)
        },
    });

    event(chain, record, record.src_agent, kind)
}

fn direct_damage(chain: &Chain, record: &CombatRecord) -> Result<Event> {
    let result = HitResult::from_code(record.flags.result).ok_or_else(|| {
        ParserError::unrecognized(EventField::Result, record.flags.result, record)
    })?;

    let kind = EventKind::DirectDamage(DirectDamage {
        context: context(chain, record, record.dst_agent),
        damage: record.value,
        barrier: record.overstack_value,
        target_downed: record.flags.is_offcycle != 0,
        result,
    });

    Ok(event(chain, record, record.src_agent, kind))
}

//! State-change records.
//!
//! A nonzero `is_statechange` byte selects one of the codes below. Most
//! produce an event about the source agent. Codes 13, 14, 15, 16 and 25
//! only update chain metadata and produce no event.
//!
//! | Code | Meaning | Payload |
//! |------|---------|---------|
//! | 1 | enter combat | `dst_agent` = subgroup |
//! | 2 | exit combat | |
//! | 3/4/5 | alive / defeated / downed | |
//! | 6/7 | spawn / despawn | |
//! | 8 | health marker | `dst_agent` = percent × 100 |
//! | 9 | log start | `value` = server time, `buff_dmg` = local time |
//! | 10 | log end | same as log start |
//! | 11 | weapon swap | `dst_agent` = set |
//! | 12 | max health | `dst_agent` |
//! | 13 | point of view | `src_agent` |
//! | 14 | language | `src_agent` |
//! | 15 | game build | `src_agent` |
//! | 16 | shard | `src_agent` |
//! | 17 | reward | `dst_agent` = id, `value` = type |
//! | 18 | initial buff | as a buff application |
//! | 19/20 | position / velocity | `dst_agent` = x, y (f32), `value` = z |
//! | 21 | facing | `dst_agent` = x, y (f32) |
//! | 22 | team change | `dst_agent` |
//! | 23 | attack target | `dst_agent` = parent gadget, `value` = targetable |
//! | 24 | targetable | `dst_agent` |
//! | 25 | map id | `src_agent` |
//! | 27 | stack active | `dst_agent` = stack id |
//! | 28 | stack reset | `value` = duration, `pad` = stack id |
//! | 29 | guild | `dst_agent`, `value`, `buff_dmg` = client-form GUID |

use tracing::trace;
use uuid::Uuid;

use super::classifier::{buff_apply_fields, event, skill_name, unsigned_millis};
use super::types::{Event, EventKind, InitialBuff, LifeState, Vector3};
use crate::chain::{Chain, Language};
use crate::error::{EventField, ParserError, Result};
use crate::records::CombatRecord;
use crate::time::{unix_seconds, Timestamp};

/// Classifies a record with a nonzero `is_statechange` byte.
pub(super) fn classify(chain: &mut Chain, record: &CombatRecord) -> Result<Option<Event>> {
    let kind = match record.flags.is_statechange {
        1 => EventKind::EnterCombat {
            subgroup: record.dst_agent,
        },
        2 => EventKind::ExitCombat,
        3 => EventKind::StateChange {
            state: LifeState::Alive,
        },
        4 => EventKind::StateChange {
            state: LifeState::Defeated,
        },
        5 => EventKind::StateChange {
            state: LifeState::Downed,
        },
        6 => EventKind::Tracking { spawned: true },
        7 => EventKind::Tracking { spawned: false },
        8 => EventKind::HealthUpdate {
            percent: record.dst_agent as u16,
        },
        9 => {
            chain.time.anchor(record.value, record.buff_dmg, record.time);
            trace!(time = record.time, "log start");
            return Ok(Some(unsourced(chain, record, EventKind::LogStart)));
        }
        10 => {
            let real = Timestamp {
                server: unix_seconds(record.value as u32),
                local: unix_seconds(record.buff_dmg as u32),
            };
            return Ok(Some(unsourced(chain, record, EventKind::LogEnd { real })));
        }
        11 => EventKind::WeaponSwap {
            set: record.dst_agent,
        },
        12 => EventKind::MaxHealthUpdate {
            max_health: record.dst_agent,
        },
        13 => {
            chain.point_of_view = chain.agents.reference(record.src_agent);
            trace!(agent = record.src_agent, "point of view");
            return Ok(None);
        }
        14 => {
            let language = Language::from_code(record.src_agent).ok_or_else(|| {
                ParserError::UnknownLanguageCode {
                    code: record.src_agent,
                    record: Box::new(*record),
                }
            })?;
            chain.language = Some(language);
            trace!(?language, "language");
            return Ok(None);
        }
        15 => {
            chain.build_id = record.src_agent;
            trace!(build = record.src_agent, "game build");
            return Ok(None);
        }
        16 => {
            chain.world_id = record.src_agent as u16;
            trace!(world = chain.world_id, "shard");
            return Ok(None);
        }
        17 => EventKind::Reward {
            reward_id: record.dst_agent,
            reward_type: record.value,
        },
        18 => {
            let (duration, stack, active) = buff_apply_fields(record);
            EventKind::InitialBuff(InitialBuff {
                skill_id: record.skill_id,
                skill_name: skill_name(chain, record.skill_id),
                duration,
                stack,
                active,
            })
        }
        19 => EventKind::Position(vector(record)),
        20 => EventKind::Velocity(vector(record)),
        21 => {
            let Vector3 { x, y, .. } = vector(record);
            EventKind::Facing { x, y }
        }
        22 => EventKind::TeamChange {
            team_id: record.dst_agent,
        },
        23 => EventKind::AttackTarget {
            parent: chain.agents.reference(record.dst_agent),
            targetable: record.value != 0,
        },
        24 => EventKind::Targetable {
            targetable: record.dst_agent != 0,
        },
        25 => {
            chain.map_id = record.src_agent as u16;
            trace!(map = chain.map_id, "map id");
            return Ok(None);
        }
        27 => EventKind::StackActive {
            stack: record.dst_agent as u32,
        },
        28 => EventKind::StackReset {
            duration: unsigned_millis(record.value),
            stack: record.pad,
        },
        29 => EventKind::Guild {
            guild: guild_uuid(record.dst_agent, record.value, record.buff_dmg),
        },
        code => return Err(ParserError::unrecognized(EventField::StateChange, code, record)),
    };

    Ok(Some(event(chain, record, record.src_agent, kind)))
}

/// An event with no source agent (log start and end).
fn unsourced(chain: &Chain, record: &CombatRecord, kind: EventKind) -> Event {
    Event {
        source: None,
        ..event(chain, record, 0, kind)
    }
}

/// Unpacks three f32 values from `dst_agent` (x, y) and `value` (z).
fn vector(record: &CombatRecord) -> Vector3 {
    Vector3 {
        x: f32::from_bits(record.dst_agent as u32),
        y: f32::from_bits((record.dst_agent >> 32) as u32),
        z: f32::from_bits(record.value as u32),
    }
}

/// Rebuilds a guild id in API form from its client-form record fields.
///
/// The 16 bytes are `dst_agent`, `value` and `buff_dmg` in little-endian
/// order. The first three groups are then byte-swapped, which turns the
/// client's mixed-endian GUID layout into the canonical one.
#[must_use]
pub fn guild_uuid(dst_agent: u64, value: i32, buff_dmg: i32) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&dst_agent.to_le_bytes());
    bytes[8..12].copy_from_slice(&value.to_le_bytes());
    bytes[12..].copy_from_slice(&buff_dmg.to_le_bytes());

    bytes.swap(0, 3);
    bytes.swap(1, 2);
    bytes.swap(4, 5);
    bytes.swap(6, 7);

    Uuid::from_bytes(bytes)
}

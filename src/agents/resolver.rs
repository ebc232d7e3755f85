//! Instance id, aware window and master resolution.
//!
//! Resolution replays the full record stream twice:
//!
//! 1. Every non-state-change record sourced from a known agent widens
//!    that agent's aware window. The first such record also fixes the
//!    agent's instance id.
//! 2. Every record with a nonzero `src_master_instid` looks up the agents
//!    that ever held that instance id and picks, in agent-table order,
//!    the first one whose aware window strictly contains the record time.
//!    That agent becomes the record source's master.

use std::collections::HashMap;

use tracing::debug;

use super::{Agent, AgentTable};
use crate::records::{CombatRecord, RawAgent};

/// Builds the resolved agent table for one log.
///
/// # Example
///
/// ```ignore
/// let log = RawLog::decode(&data)?;
/// let agents = evtc::agents::resolve(log.agents, &log.records);
/// for agent in agents.iter() {
///     println!("{} master={:?}", agent.name, agent.master);
/// }
/// ```
#[must_use]
pub fn resolve(raw: Vec<RawAgent>, records: &[CombatRecord]) -> AgentTable {
    let mut table = AgentTable::from_raw(raw);
    let by_instance = assign_instances(&mut table, records);
    let masters = assign_masters(&mut table, records, &by_instance);

    debug!(
        agents = table.len(),
        instances = by_instance.len(),
        masters,
        "resolved agents"
    );

    table
}

/// First pass: instance ids and aware windows.
///
/// Returns, per instance id, the table indices of every agent that held
/// it, sorted by table position.
fn assign_instances(table: &mut AgentTable, records: &[CombatRecord]) -> HashMap<u16, Vec<usize>> {
    let mut by_instance: HashMap<u16, Vec<usize>> = HashMap::new();

    for record in records.iter().filter(|r| r.flags.is_statechange == 0) {
        let Some(index) = table.index_of(record.src_agent) else {
            continue;
        };
        let agent = &mut table.agents_mut()[index];

        if agent.instance_id.is_none() {
            agent.instance_id = Some(record.src_instid);
            agent.first_aware = record.time;
            by_instance.entry(record.src_instid).or_default().push(index);
        }
        agent.last_aware = record.time;
    }

    for indices in by_instance.values_mut() {
        indices.sort_unstable();
    }

    by_instance
}

/// Second pass: masters. Returns the number of records that matched.
fn assign_masters(
    table: &mut AgentTable,
    records: &[CombatRecord],
    by_instance: &HashMap<u16, Vec<usize>>,
) -> usize {
    let mut matched = 0;

    for record in records.iter().filter(|r| r.src_master_instid != 0) {
        let Some(pet) = table.index_of(record.src_agent) else {
            continue;
        };
        let Some(candidates) = by_instance.get(&record.src_master_instid) else {
            continue;
        };

        let owner = {
            let agents: &[Agent] = table.agents_mut();
            candidates
                .iter()
                .map(|&index| &agents[index])
                .find(|candidate| candidate.is_aware_at(record.time))
                .map(Agent::address)
        };

        if let Some(owner) = owner {
            table.agents_mut()[pet].master = Some(owner);
            matched += 1;
        }
    }

    matched
}

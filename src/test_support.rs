//! Shared fixtures for unit tests.

use crate::agents::AgentTable;
use crate::chain::Chain;
use crate::format::NAME_FIELD_SIZE;
use crate::records::RawAgent;

/// A chain whose agent table holds one player per address.
pub(crate) fn chain_with_agents(addresses: &[u64]) -> Chain {
    let raw = addresses.iter().map(|&address| RawAgent {
        address,
        profession: 1,
        elite: 0,
        toughness: 0,
        concentration: 0,
        healing: 0,
        hitbox_width: 0,
        condition: 0,
        hitbox_height: 0,
        name: [0u8; NAME_FIELD_SIZE],
    });

    Chain {
        agents: AgentTable::from_raw(raw),
        ..Chain::default()
    }
}

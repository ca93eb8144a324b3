// Copyright 2026 The Chain Registry Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Genesis Sanity Checker (C7, spec §4.7).
//!
//! Run once, on the initial document, before the first block is
//! applied. Everything here is synchronous and side-effect free: a
//! failing check returns an error describing exactly which invariant
//! broke, the same way the original's `SanityCheck` methods report a
//! specific field (`genesis_test.go`).

use std::collections::{BTreeMap, BTreeSet};

use crate::entity::Entity;
use crate::epoch::{Epoch, EPOCH_INVALID};
use crate::error::Error;
use crate::node::Node;
use crate::runtime::{GovernanceModel, Runtime, RuntimeKind};

/// Governance parameters carried in the genesis document (spec §4.7
/// "Governance"). Proposal bodies beyond what sanity-checking needs
/// (text, votes already cast) are out of scope for this crate.
#[derive(Clone, Debug)]
pub struct GovernanceParameters {
    pub quorum: u8,
    pub threshold: u8,
    pub voting_period: Epoch,
    pub upgrade_min_epoch_diff: Epoch,
    pub upgrade_cancel_min_epoch_diff: Epoch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalState {
    Active,
    Closed,
}

#[derive(Clone, Debug)]
pub struct PendingUpgrade {
    pub target_epoch: Epoch,
}

#[derive(Clone, Debug)]
pub struct Proposal {
    pub state: ProposalState,
    pub created_at: Epoch,
    pub closes_at: Epoch,
    pub submitter_is_reserved: bool,
    pub upgrade: Option<PendingUpgrade>,
}

/// Staking genesis parameters the sanity checker needs (spec §4.7
/// "Staking"). The full escrow/delegation ledger is an external
/// collaborator; this is the minimal projection of it this crate
/// checks against.
#[derive(Clone, Debug)]
pub struct StakingGenesis {
    pub token_symbol: String,
    pub token_value_exponent: u8,
    pub total_supply: u128,
    pub common_pool: u128,
    pub last_block_fees: u128,
    pub governance_deposits: u128,
    pub account_balances: BTreeMap<crate::crypto::PublicKey, u128>,
    pub delegations_reference_accounts: bool,
}

#[derive(Clone, Debug)]
pub struct ConsensusGenesisParameters {
    pub timeout_commit: u64,
    pub skip_timeout_commit: bool,
}

pub struct GenesisDocument {
    pub height: u64,
    pub chain_id: String,
    pub halt_epoch: Epoch,
    pub beacon_base_epoch: Epoch,
    pub consensus: ConsensusGenesisParameters,
    pub entities: Vec<Entity>,
    pub nodes: Vec<Node>,
    pub runtimes: Vec<Runtime>,
    pub blacklist: BTreeSet<crate::crypto::PublicKey>,
    pub governance: GovernanceParameters,
    pub proposals: Vec<Proposal>,
    pub staking: StakingGenesis,
}

pub fn sanity_check(doc: &GenesisDocument) -> Result<(), Error> {
    check_chain_params(doc)?;
    check_entities(doc)?;
    check_nodes(doc)?;
    check_runtimes(doc)?;
    check_staking(doc)?;
    check_governance(doc)?;
    Ok(())
}

fn check_chain_params(doc: &GenesisDocument) -> Result<(), Error> {
    if doc.height < 1 {
        return Err(Error::InvalidGenesis);
    }
    if doc.chain_id.trim().is_empty() {
        return Err(Error::InvalidGenesis);
    }
    if doc.halt_epoch < doc.beacon_base_epoch {
        return Err(Error::InvalidGenesis);
    }
    if doc.consensus.timeout_commit == 0 && !doc.consensus.skip_timeout_commit {
        return Err(Error::InvalidGenesis);
    }
    if doc.beacon_base_epoch == EPOCH_INVALID {
        return Err(Error::InvalidGenesis);
    }
    Ok(())
}

fn check_entities(doc: &GenesisDocument) -> Result<(), Error> {
    for entity in &doc.entities {
        crate::verify::entity::verify(entity, &doc.blacklist).map_err(|_| Error::InvalidGenesis)?;
        if !entity.allow_entity_signed_nodes {
            let node_ids: BTreeSet<_> = doc
                .nodes
                .iter()
                .filter(|n| n.entity_id == entity.id)
                .map(|n| n.id)
                .collect();
            if !node_ids.is_subset(&entity.nodes.iter().copied().collect()) {
                return Err(Error::InvalidGenesis);
            }
        }
    }
    Ok(())
}

fn check_nodes(doc: &GenesisDocument) -> Result<(), Error> {
    let entities: BTreeMap<_, _> = doc.entities.iter().map(|e| (e.id, e)).collect();
    let runtimes: BTreeMap<_, _> = doc.runtimes.iter().map(|r| (r.id, r)).collect();

    for node in &doc.nodes {
        if !entities.contains_key(&node.entity_id) {
            return Err(Error::InvalidGenesis);
        }
        if node.roles.has_reserved_bits() {
            return Err(Error::InvalidGenesis);
        }
        if node.roles.is_empty() {
            return Err(Error::InvalidGenesis);
        }
        if doc.blacklist.contains(&node.tls_pubkey) || doc.blacklist.contains(&node.consensus_pubkey) {
            return Err(Error::InvalidGenesis);
        }
        for membership in &node.runtimes {
            let runtime = runtimes.get(&membership.id).ok_or(Error::InvalidGenesis)?;
            let category_ok = match runtime.kind {
                RuntimeKind::KeyManager => node.has_roles(crate::node::RolesMask::KEY_MANAGER),
                RuntimeKind::Compute => node.has_roles(
                    crate::node::RolesMask::COMPUTE_WORKER
                        | crate::node::RolesMask::BACKUP_WORKER
                        | crate::node::RolesMask::STORAGE_WORKER
                        | crate::node::RolesMask::STORAGE_RPC,
                ),
            };
            if !category_ok {
                return Err(Error::InvalidGenesis);
            }
        }
    }
    Ok(())
}

fn check_runtimes(doc: &GenesisDocument) -> Result<(), Error> {
    let mut seen = BTreeSet::new();
    let runtimes: BTreeMap<_, _> = doc.runtimes.iter().map(|r| (r.id, r)).collect();
    for runtime in &doc.runtimes {
        if !seen.insert(runtime.id) {
            return Err(Error::InvalidGenesis);
        }
        if runtime.governance_model == GovernanceModel::Runtime && runtime.kind != RuntimeKind::Compute {
            return Err(Error::InvalidGenesis);
        }
        if runtime.kind == RuntimeKind::Compute {
            if let Some(km) = &runtime.key_manager {
                let key_manager = runtimes.get(km).ok_or(Error::InvalidGenesis)?;
                if key_manager.kind != RuntimeKind::KeyManager {
                    return Err(Error::InvalidGenesis);
                }
            }
        }
    }
    Ok(())
}

fn check_staking(doc: &GenesisDocument) -> Result<(), Error> {
    let staking = &doc.staking;
    let symbol_ok = !staking.token_symbol.is_empty()
        && staking.token_symbol.len() <= 8
        && staking.token_symbol.chars().all(|c| c.is_ascii_uppercase());
    if !symbol_ok {
        return Err(Error::InvalidGenesis);
    }
    if staking.token_value_exponent > 20 {
        return Err(Error::InvalidGenesis);
    }
    let accounts_sum: u128 = staking.account_balances.values().sum();
    let required = staking.common_pool + staking.last_block_fees + accounts_sum + staking.governance_deposits;
    if staking.total_supply < required {
        return Err(Error::InvalidGenesis);
    }
    Ok(())
}

fn check_governance(doc: &GenesisDocument) -> Result<(), Error> {
    let gov = &doc.governance;
    if !(67..=100).contains(&gov.quorum) || !(67..=100).contains(&gov.threshold) {
        return Err(Error::InvalidGenesis);
    }
    if (gov.quorum as u32) * (gov.threshold as u32) < 90 * 90 {
        return Err(Error::InvalidGenesis);
    }
    if gov.upgrade_min_epoch_diff < gov.voting_period || gov.upgrade_cancel_min_epoch_diff < gov.voting_period {
        return Err(Error::InvalidGenesis);
    }

    let mut pending_targets = Vec::new();
    for proposal in &doc.proposals {
        match proposal.state {
            ProposalState::Active => {
                if proposal.created_at > doc.beacon_base_epoch {
                    return Err(Error::InvalidGenesis);
                }
                if proposal.closes_at <= doc.beacon_base_epoch {
                    return Err(Error::InvalidGenesis);
                }
                if proposal.submitter_is_reserved {
                    return Err(Error::InvalidGenesis);
                }
                if let Some(upgrade) = &proposal.upgrade {
                    pending_targets.push(upgrade.target_epoch);
                }
            }
            ProposalState::Closed => {
                if proposal.closes_at > doc.beacon_base_epoch {
                    return Err(Error::InvalidGenesis);
                }
            }
        }
    }

    pending_targets.sort_unstable();
    for pair in pending_targets.windows(2) {
        if pair[1].saturating_sub(pair[0]) < gov.upgrade_min_epoch_diff {
            return Err(Error::InvalidGenesis);
        }
    }

    Ok(())
}

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

//! Committee Election (C5, spec §4.5).
//!
//! A pure, deterministic function of its inputs: the same beacon
//! output, node set, and runtime descriptor produce the same committee
//! on every replica. No store access here — callers (the scheduler
//! application) assemble the inputs from the store and hand them in.

use std::collections::{BTreeMap, BTreeSet};

use crate::crypto::{hash, Hash, PublicKey};
use crate::epoch::Epoch;
use crate::node::{Node, RolesMask};
use crate::runtime::{CommitteeKind, CommitteeRole, Runtime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum RoleTag {
    Worker,
    BackupWorker,
}

impl RoleTag {
    fn committee_role(self) -> CommitteeRole {
        match self {
            RoleTag::Worker => CommitteeRole::Worker,
            RoleTag::BackupWorker => CommitteeRole::BackupWorker,
        }
    }

    fn wire_byte(self) -> u8 {
        match self {
            RoleTag::Worker => 0,
            RoleTag::BackupWorker => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitteeMember {
    pub node_id: PublicKey,
    pub role: CommitteeRole,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committee {
    pub kind: CommitteeKind,
    pub runtime_id: Hash,
    pub epoch: Epoch,
    pub members: Vec<CommitteeMember>,
}

/// `true` if `node` carries the role required to be eligible for
/// committee kind `kind` (spec §4.5 step 1). Executor backup workers
/// are drawn from the same role-carrying pool as workers — the
/// distinction is which slot they're assigned to, not a separate role
/// for anything but executor committees.
fn role_mask_for(kind: CommitteeKind) -> u32 {
    match kind {
        CommitteeKind::ComputeExecutor => RolesMask::COMPUTE_WORKER | RolesMask::BACKUP_WORKER,
        CommitteeKind::Storage => RolesMask::STORAGE_WORKER,
        CommitteeKind::KeyManager => RolesMask::KEY_MANAGER,
    }
}

/// The target worker-committee size for `kind`: executor and storage
/// runtimes carry explicit group sizes; key-manager committees have no
/// dedicated sizing field in the descriptor, so the worker
/// constraint's `min_pool_size` doubles as the target (a key-manager
/// committee is exactly as large as the minimum pool it requires).
fn worker_group_size(kind: CommitteeKind, runtime: &Runtime, key_manager_size: u16) -> u16 {
    match kind {
        CommitteeKind::ComputeExecutor => runtime.executor.group_size,
        CommitteeKind::Storage => runtime.storage.group_size,
        CommitteeKind::KeyManager => key_manager_size,
    }
}

fn draw_key(beacon: &[u8], node_id: &PublicKey, role: RoleTag, runtime_id: &Hash) -> Hash {
    let mut buf = Vec::with_capacity(beacon.len() + 32 + 1 + 32);
    buf.extend_from_slice(beacon);
    buf.extend_from_slice(node_id.as_bytes());
    buf.push(role.wire_byte());
    buf.extend_from_slice(&runtime_id.0);
    hash(&buf)
}

/// Runs the election for one (committee kind, role) pair inside a
/// runtime, against the given node set. Returns `None` if the pool
/// can't satisfy `min_pool_size` or the required group size isn't
/// filled (spec §4.5 steps 2/5: "election fails, committee remains
/// absent").
fn elect_role(
    kind: CommitteeKind,
    role: RoleTag,
    runtime: &Runtime,
    nodes: &[Node],
    validator_entities: &BTreeSet<PublicKey>,
    beacon: &[u8],
    epoch: Epoch,
    group_size: u16,
    max_nodes_per_entity: Option<u16>,
    validator_set_required: bool,
) -> Option<Vec<CommitteeMember>> {
    if group_size == 0 {
        return Some(Vec::new());
    }

    let required_mask = role_mask_for(kind);
    let eligible: Vec<&Node> = nodes
        .iter()
        .filter(|n| !n.is_expired(epoch))
        .filter(|n| n.roles.has(required_mask))
        .filter(|n| n.runtime(&runtime.id).is_some())
        .filter(|n| !validator_set_required || validator_entities.contains(&n.entity_id))
        .collect();

    if eligible.len() < runtime
        .constraint(kind, role.committee_role())
        .map(|c| c.min_pool_size as usize)
        .unwrap_or(0)
    {
        return None;
    }

    let mut draws: Vec<(Hash, &Node)> = eligible
        .into_iter()
        .map(|n| (draw_key(beacon, &n.id, role, &runtime.id), n))
        .collect();
    draws.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

    let mut per_entity_count: BTreeMap<PublicKey, u16> = BTreeMap::new();
    let mut members = Vec::new();
    for (_, node) in draws {
        if members.len() as u16 >= group_size {
            break;
        }
        if let Some(cap) = max_nodes_per_entity {
            let count = per_entity_count.entry(node.entity_id).or_insert(0);
            if *count >= cap {
                continue;
            }
            *count += 1;
        }
        members.push(CommitteeMember {
            node_id: node.id,
            role: role.committee_role(),
        });
    }

    if (members.len() as u16) < group_size {
        return None;
    }
    Some(members)
}

/// Elects committee `kind` for `runtime` at `epoch`. `nodes` should
/// already be restricted to those eligible for election — i.e. with
/// `status.is_eligible(epoch)` true (spec §4.5 step 6: nodes whose
/// `election_eligible_after > epoch` are excluded beforehand by the
/// caller, which holds per-node status this module doesn't see).
pub fn elect(
    kind: CommitteeKind,
    runtime: &Runtime,
    nodes: &[Node],
    validator_entities: &BTreeSet<PublicKey>,
    beacon: &[u8],
    epoch: Epoch,
) -> Option<Committee> {
    let worker_constraint = runtime.constraint(kind, CommitteeRole::Worker)?;
    let group_size = worker_group_size(kind, runtime, worker_constraint.min_pool_size);
    let backup_size = runtime.executor.group_backup_size;

    let mut members = elect_role(
        kind,
        RoleTag::Worker,
        runtime,
        nodes,
        validator_entities,
        beacon,
        epoch,
        group_size,
        worker_constraint.max_nodes_per_entity,
        worker_constraint.validator_set_required,
    )?;

    if kind == CommitteeKind::ComputeExecutor && backup_size > 0 {
        if let Some(backup_constraint) = runtime.constraint(kind, CommitteeRole::BackupWorker) {
            let already_selected: BTreeSet<PublicKey> = members.iter().map(|m| m.node_id).collect();
            let remaining: Vec<Node> = nodes
                .iter()
                .filter(|n| !already_selected.contains(&n.id))
                .cloned()
                .collect();
            let backups = elect_role(
                kind,
                RoleTag::BackupWorker,
                runtime,
                &remaining,
                validator_entities,
                beacon,
                epoch,
                backup_size,
                backup_constraint.max_nodes_per_entity,
                backup_constraint.validator_set_required,
            )?;
            members.extend(backups);
        }
    }

    Some(Committee {
        kind,
        runtime_id: runtime.id,
        epoch,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{RuntimeMembership, LATEST_NODE_DESCRIPTOR_VERSION};
    use crate::runtime::{
        AdmissionPolicy, ExecutorParams, GovernanceModel, RuntimeKind, SchedulingConstraint,
        StorageParams, TxnSchedulerParams, LATEST_RUNTIME_DESCRIPTOR_VERSION,
    };

    fn node(id: u8, roles: u32, runtime_id: Hash) -> Node {
        Node {
            version: LATEST_NODE_DESCRIPTOR_VERSION,
            id: PublicKey([id; 32]),
            entity_id: PublicKey([id; 32]),
            expiration: 1000,
            roles: RolesMask(roles),
            runtimes: vec![RuntimeMembership {
                id: runtime_id,
                capability: None,
            }],
            tls_pubkey: PublicKey([id; 32]),
            p2p_pubkey: PublicKey([id; 32]),
            consensus_pubkey: PublicKey([id; 32]),
            addresses: vec![],
        }
    }

    fn runtime_with_group(group_size: u16, backup_size: u16, min_pool_size: u16) -> Runtime {
        let mut constraints = BTreeMap::new();
        constraints.insert(
            (CommitteeKind::ComputeExecutor, CommitteeRole::Worker),
            SchedulingConstraint {
                min_pool_size,
                max_nodes_per_entity: None,
                validator_set_required: false,
            },
        );
        constraints.insert(
            (CommitteeKind::ComputeExecutor, CommitteeRole::BackupWorker),
            SchedulingConstraint {
                min_pool_size: 0,
                max_nodes_per_entity: None,
                validator_set_required: false,
            },
        );
        Runtime {
            version: LATEST_RUNTIME_DESCRIPTOR_VERSION,
            id: Hash([42; 32]),
            kind: RuntimeKind::Compute,
            entity_id: PublicKey([1; 32]),
            key_manager: None,
            executor: ExecutorParams {
                group_size,
                group_backup_size: backup_size,
                round_timeout: 1,
                max_messages: 1,
            },
            txn_scheduler: TxnSchedulerParams::default(),
            storage: StorageParams::default(),
            admission_policy: AdmissionPolicy::AnyNode,
            constraints,
            staking: Default::default(),
            governance_model: GovernanceModel::Entity,
            tee: None,
            genesis_state_root: Hash::default(),
        }
    }

    #[test]
    fn election_is_deterministic_across_runs() {
        let runtime = runtime_with_group(2, 0, 1);
        let nodes: Vec<Node> = (1..=5)
            .map(|i| node(i, RolesMask::COMPUTE_WORKER, runtime.id))
            .collect();
        let beacon = b"epoch-beacon";
        let validators = BTreeSet::new();

        let first = elect(CommitteeKind::ComputeExecutor, &runtime, &nodes, &validators, beacon, 10).unwrap();
        let second = elect(CommitteeKind::ComputeExecutor, &runtime, &nodes, &validators, beacon, 10).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.members.len(), 2);
    }

    #[test]
    fn election_fails_below_min_pool_size() {
        let runtime = runtime_with_group(3, 0, 5);
        let nodes: Vec<Node> = (1..=2)
            .map(|i| node(i, RolesMask::COMPUTE_WORKER, runtime.id))
            .collect();
        let validators = BTreeSet::new();
        assert!(elect(CommitteeKind::ComputeExecutor, &runtime, &nodes, &validators, b"b", 1).is_none());
    }

    #[test]
    fn backup_workers_are_drawn_from_remaining_pool() {
        let runtime = runtime_with_group(2, 2, 1);
        let nodes: Vec<Node> = (1..=6)
            .map(|i| node(i, RolesMask::COMPUTE_WORKER, runtime.id))
            .collect();
        let validators = BTreeSet::new();
        let committee = elect(CommitteeKind::ComputeExecutor, &runtime, &nodes, &validators, b"b", 1).unwrap();
        let workers: Vec<_> = committee
            .members
            .iter()
            .filter(|m| m.role == CommitteeRole::Worker)
            .collect();
        let backups: Vec<_> = committee
            .members
            .iter()
            .filter(|m| m.role == CommitteeRole::BackupWorker)
            .collect();
        assert_eq!(workers.len(), 2);
        assert_eq!(backups.len(), 2);
        let worker_ids: BTreeSet<_> = workers.iter().map(|m| m.node_id).collect();
        for backup in &backups {
            assert!(!worker_ids.contains(&backup.node_id));
        }
    }
}

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

//! Runtime descriptors (spec §3).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, PublicKey};
use crate::node::TeeHardware;

/// Current descriptor version accepted by [`crate::verify::runtime`].
pub const LATEST_RUNTIME_DESCRIPTOR_VERSION: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeKind {
    Compute,
    KeyManager,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceModel {
    /// Governed by the controlling entity's own signature.
    Entity,
    /// Governed by a signature derived from the runtime's own address
    /// (a runtime-emitted message, see [`crate::messages`]).
    Runtime,
    /// Governed by the consensus layer itself. Only legal to register
    /// during genesis (spec §4.3).
    Consensus,
}

/// One committee kind the scheduler elects members for (spec §4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommitteeKind {
    ComputeExecutor,
    Storage,
    KeyManager,
}

/// A role within a committee (worker vs. backup worker — only the
/// executor committee has a backup sub-role, per spec §4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommitteeRole {
    Worker,
    BackupWorker,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorParams {
    pub group_size: u16,
    pub group_backup_size: u16,
    pub round_timeout: u64,
    pub max_messages: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnSchedulerParams {
    pub batch_flush_timeout: u64,
    pub max_batch_size: u64,
    pub max_batch_size_bytes: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageParams {
    pub group_size: u16,
    pub min_write_replication: u16,
    pub max_apply_write_log_entries: u64,
    pub max_apply_ops: u64,
}

/// Per-role node cap inside an entity's whitelist entry.
pub type RoleCaps = BTreeMap<u32, u16>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityWhitelistConfig {
    pub max_nodes: RoleCaps,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionPolicy {
    AnyNode,
    EntityWhitelist {
        entities: BTreeMap<PublicKey, EntityWhitelistConfig>,
    },
}

/// Per-(committee kind, role) scheduling constraint (spec §4.5).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConstraint {
    pub min_pool_size: u16,
    pub max_nodes_per_entity: Option<u16>,
    pub validator_set_required: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingThresholds {
    pub thresholds: Vec<u64>,
    pub slashing: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeeConstraint {
    pub hardware: TeeHardware,
    /// Accepted enclave identities; empty means "any identity of the
    /// given hardware kind accepted".
    pub enclave_ids: Vec<Hash>,
}

/// A sharded execution environment, compute or key-manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    pub version: u16,
    pub id: Hash,
    pub kind: RuntimeKind,
    pub entity_id: PublicKey,
    pub key_manager: Option<Hash>,
    pub executor: ExecutorParams,
    pub txn_scheduler: TxnSchedulerParams,
    pub storage: StorageParams,
    pub admission_policy: AdmissionPolicy,
    pub constraints: BTreeMap<(CommitteeKind, CommitteeRole), SchedulingConstraint>,
    pub staking: StakingThresholds,
    pub governance_model: GovernanceModel,
    pub tee: Option<TeeConstraint>,
    pub genesis_state_root: Hash,
}

impl Runtime {
    pub fn constraint(&self, kind: CommitteeKind, role: CommitteeRole) -> Option<&SchedulingConstraint> {
        self.constraints.get(&(kind, role))
    }
}

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

//! Consensus parameters: the registry application's singleton
//! configuration (spec §3, "Consensus Parameters").

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::runtime::GovernanceModel;

/// One gas-metered registry operation (spec §6, "Gas costs are
/// published through consensus parameters").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GasOp {
    RegisterEntity,
    DeregisterEntity,
    RegisterNode,
    UnfreezeNode,
    RegisterRuntime,
    RuntimeEpochMaintenance,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GasCosts {
    pub register_entity: u64,
    pub deregister_entity: u64,
    pub register_node: u64,
    pub unfreeze_node: u64,
    pub register_runtime: u64,
    pub runtime_epoch_maintenance: u64,
}

impl GasCosts {
    pub fn base_cost(&self, op: GasOp) -> u64 {
        match op {
            GasOp::RegisterEntity => self.register_entity,
            GasOp::DeregisterEntity => self.deregister_entity,
            GasOp::RegisterNode => self.register_node,
            GasOp::UnfreezeNode => self.unfreeze_node,
            GasOp::RegisterRuntime => self.register_runtime,
            GasOp::RuntimeEpochMaintenance => self.runtime_epoch_maintenance,
        }
    }
}

impl Default for GasCosts {
    fn default() -> Self {
        Self {
            register_entity: 1000,
            deregister_entity: 1000,
            register_node: 1000,
            unfreeze_node: 1000,
            register_runtime: 1000,
            runtime_epoch_maintenance: 100,
        }
    }
}

/// Per-kind (entity/node/runtime registration) rate-limiting policy.
/// Out of scope to enforce the actual rate here (it depends on
/// wall-clock-free block counting maintained by the consensus driver);
/// the registry only carries the configured policy so handlers can be
/// extended to consult it without a config-format break.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrationRatePolicy {
    pub max_registrations_per_epoch: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusParameters {
    pub gas_costs: GasCosts,
    /// Skip stake-sufficiency checks entirely. A debug flag, but a
    /// first-class member of consensus parameters (not a process
    /// global) so that replays of an archived chain stay deterministic
    /// (spec §9).
    pub debug_bypass_stake: bool,
    pub debug_allow_unroutable_addresses: bool,
    pub debug_allow_entity_signed_node_registration: bool,
    pub disable_runtime_registration: bool,
    pub disable_key_manager_runtime_registration: bool,
    pub enabled_governance_models: BTreeSet<GovernanceModelTag>,
    pub entity_registration_rate: RegistrationRatePolicy,
    pub node_registration_rate: RegistrationRatePolicy,
    pub runtime_registration_rate: RegistrationRatePolicy,
}

/// `GovernanceModel` doesn't implement `Ord`/`Hash` on its own (it's
/// matched structurally elsewhere); this is the small serializable tag
/// used purely as a set element in consensus parameters and genesis
/// documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GovernanceModelTag {
    Entity,
    Runtime,
    Consensus,
}

impl From<GovernanceModel> for GovernanceModelTag {
    fn from(m: GovernanceModel) -> Self {
        match m {
            GovernanceModel::Entity => GovernanceModelTag::Entity,
            GovernanceModel::Runtime => GovernanceModelTag::Runtime,
            GovernanceModel::Consensus => GovernanceModelTag::Consensus,
        }
    }
}

impl ConsensusParameters {
    pub fn governance_model_enabled(&self, model: GovernanceModel) -> bool {
        self.enabled_governance_models
            .contains(&GovernanceModelTag::from(model))
    }
}

impl Default for ConsensusParameters {
    fn default() -> Self {
        Self {
            gas_costs: GasCosts::default(),
            debug_bypass_stake: false,
            debug_allow_unroutable_addresses: false,
            debug_allow_entity_signed_node_registration: true,
            disable_runtime_registration: false,
            disable_key_manager_runtime_registration: false,
            enabled_governance_models: [
                GovernanceModelTag::Entity,
                GovernanceModelTag::Runtime,
                GovernanceModelTag::Consensus,
            ]
            .into_iter()
            .collect(),
            entity_registration_rate: RegistrationRatePolicy::default(),
            node_registration_rate: RegistrationRatePolicy::default(),
            runtime_registration_rate: RegistrationRatePolicy::default(),
        }
    }
}

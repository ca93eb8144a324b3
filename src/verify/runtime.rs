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

//! Runtime descriptor verification (spec §4.3 "Runtime" / "Runtime update").

use crate::error::Error;
use crate::runtime::{AdmissionPolicy, GovernanceModel, Runtime, RuntimeKind, LATEST_RUNTIME_DESCRIPTOR_VERSION};

/// Verifies a freshly-submitted runtime descriptor. `is_init_chain`
/// is the only context in which `GovernanceModel::Consensus` is legal
/// (spec §4.3: "Consensus governance model only permitted during
/// genesis").
pub fn verify(runtime: &Runtime, is_init_chain: bool, key_manager_exists: impl Fn(&crate::crypto::Hash) -> bool) -> Result<(), Error> {
    if runtime.version != LATEST_RUNTIME_DESCRIPTOR_VERSION {
        return Err(Error::InvalidArgument);
    }
    if runtime.governance_model == GovernanceModel::Consensus && !is_init_chain {
        return Err(Error::Forbidden);
    }
    if runtime.kind == RuntimeKind::Compute {
        if let Some(km) = &runtime.key_manager {
            if !key_manager_exists(km) {
                return Err(Error::NoSuchRuntime);
            }
        }
        verify_compute(runtime)?;
    }
    verify_admission_policy(&runtime.admission_policy)?;
    Ok(())
}

/// Non-empty executor/storage groups, storage/scheduler limits sane
/// (spec §4.3: "additional compute-specific verification").
fn verify_compute(runtime: &Runtime) -> Result<(), Error> {
    if runtime.executor.group_size == 0 {
        return Err(Error::InvalidArgument);
    }
    if runtime.storage.group_size == 0 || runtime.storage.min_write_replication == 0 {
        return Err(Error::InvalidArgument);
    }
    if runtime.storage.min_write_replication > runtime.storage.group_size {
        return Err(Error::InvalidArgument);
    }
    if runtime.txn_scheduler.max_batch_size == 0 || runtime.txn_scheduler.max_batch_size_bytes == 0 {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

fn verify_admission_policy(policy: &AdmissionPolicy) -> Result<(), Error> {
    if let AdmissionPolicy::EntityWhitelist { entities } = policy {
        for config in entities.values() {
            if config.max_nodes.values().any(|&cap| cap == 0) {
                return Err(Error::InvalidArgument);
            }
        }
    }
    Ok(())
}

/// Verifies `new` is a legal update of `prev` (spec §4.3 "Runtime
/// update"): id, kind, and key-manager are immutable. The governance
/// model *may* change, but only under the previous descriptor's
/// authority — that check belongs to the caller, which has the signer
/// context this pure function doesn't (spec.md: governance model is
/// "immutable unless the caller is the current governance authority").
pub fn verify_update(prev: &Runtime, new: &Runtime) -> Result<(), Error> {
    if prev.id != new.id {
        return Err(Error::InvalidArgument);
    }
    if prev.kind != new.kind {
        return Err(Error::InvalidArgument);
    }
    if prev.key_manager != new.key_manager {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Hash, PublicKey};
    use crate::runtime::*;

    fn sample() -> Runtime {
        Runtime {
            version: LATEST_RUNTIME_DESCRIPTOR_VERSION,
            id: Hash([1; 32]),
            kind: RuntimeKind::Compute,
            entity_id: PublicKey([2; 32]),
            key_manager: None,
            executor: ExecutorParams {
                group_size: 3,
                group_backup_size: 1,
                round_timeout: 10,
                max_messages: 32,
            },
            txn_scheduler: TxnSchedulerParams {
                batch_flush_timeout: 1,
                max_batch_size: 10,
                max_batch_size_bytes: 1024,
            },
            storage: StorageParams {
                group_size: 3,
                min_write_replication: 2,
                max_apply_write_log_entries: 100,
                max_apply_ops: 100,
            },
            admission_policy: AdmissionPolicy::AnyNode,
            constraints: Default::default(),
            staking: Default::default(),
            governance_model: GovernanceModel::Entity,
            tee: None,
            genesis_state_root: Hash::default(),
        }
    }

    #[test]
    fn consensus_governance_rejected_outside_init_chain() {
        let mut runtime = sample();
        runtime.governance_model = GovernanceModel::Consensus;
        assert_eq!(verify(&runtime, false, |_| true), Err(Error::Forbidden));
        assert_eq!(verify(&runtime, true, |_| true), Ok(()));
    }

    #[test]
    fn compute_runtime_rejects_zero_storage_replication() {
        let mut runtime = sample();
        runtime.storage.min_write_replication = 0;
        assert_eq!(verify(&runtime, false, |_| true), Err(Error::InvalidArgument));
    }

    #[test]
    fn update_allows_governance_model_change() {
        let prev = sample();
        let mut new = prev.clone();
        new.governance_model = GovernanceModel::Runtime;
        assert_eq!(verify_update(&prev, &new), Ok(()));
    }

    #[test]
    fn update_rejects_key_manager_change() {
        let prev = sample();
        let mut new = prev.clone();
        new.key_manager = Some(Hash([9; 32]));
        assert_eq!(verify_update(&prev, &new), Err(Error::InvalidArgument));
    }
}

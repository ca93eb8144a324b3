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

//! `register-runtime` (spec §4.4).

use crate::config::GasOp;
use crate::crypto::runtime_address;
use crate::error::{Error, ExecutionResult};
use crate::events::{AppMessage, Event};
use crate::runtime::{GovernanceModel, Runtime, RuntimeKind};
use crate::stake::ClaimId;
use crate::verify;

use super::TxEnv;

pub fn handle(env: &mut TxEnv, runtime: Runtime) -> ExecutionResult {
    if env.params.disable_runtime_registration {
        log::error!("register-runtime: runtime registration is disabled");
        return Err(Error::Forbidden.into());
    }
    if runtime.kind == RuntimeKind::KeyManager && env.params.disable_key_manager_runtime_registration {
        log::error!("register-runtime: key manager runtime registration is disabled");
        return Err(Error::Forbidden.into());
    }

    let schema = env.schema();
    if let Err(err) = verify::runtime::verify(&runtime, env.init_chain, |id| {
        schema.runtime(id).is_ok() || schema.suspended_runtime(id).is_ok()
    }) {
        log::error!("register-runtime: descriptor verification failed for {}: {}", runtime.id, err);
        return Err(err.into());
    }

    let existing = schema
        .runtime(&runtime.id)
        .map(|r| (r, false))
        .or_else(|_| schema.suspended_runtime(&runtime.id).map(|r| (r, true)))
        .ok();

    if let Some((prev, _)) = &existing {
        if let Err(err) = verify::runtime::verify_update(prev, &runtime) {
            log::error!("register-runtime: update rejected for {}: {}", runtime.id, err);
            return Err(err.into());
        }
    }

    if env.check_only {
        return Ok(());
    }

    env.gas
        .charge(env.params.gas_costs.base_cost(GasOp::RegisterRuntime));

    let governing_model = existing
        .as_ref()
        .map(|(prev, _)| prev.governance_model)
        .unwrap_or(runtime.governance_model);
    let required_signer = match governing_model {
        GovernanceModel::Entity => runtime.entity_id,
        GovernanceModel::Runtime => runtime_address(&runtime.id),
        GovernanceModel::Consensus => {
            if !env.init_chain {
                log::error!(
                    "register-runtime: consensus-governed runtime {} cannot register outside genesis",
                    runtime.id
                );
                return Err(Error::Forbidden.into());
            }
            env.signer
        }
    };
    env.authorize(&required_signer)?;

    if !env.params.debug_bypass_stake && !matches!(runtime.governance_model, GovernanceModel::Consensus) {
        let stake_account = match runtime.governance_model {
            GovernanceModel::Entity => runtime.entity_id,
            GovernanceModel::Runtime => runtime_address(&runtime.id),
            GovernanceModel::Consensus => unreachable!("excluded above"),
        };
        let mut cache = crate::stake::StakeAccumulatorCache::new(&schema);
        cache.add_claim(
            env.ledger,
            &stake_account,
            ClaimId::RegisterRuntime(runtime.id),
            runtime.staking.thresholds.clone(),
        )?;
        cache.commit();
    }

    let is_new = existing.is_none();
    let was_suspended = existing.as_ref().map(|(_, susp)| *susp).unwrap_or(false);

    if is_new {
        env.app_bus.publish(AppMessage::NewRuntimeRegistered {
            runtime_id: runtime.id,
        });
    }
    env.app_bus.publish(AppMessage::RuntimeUpdated {
        runtime_id: runtime.id,
    });

    schema.set_runtime(&runtime, was_suspended);

    log::debug!("register-runtime: registered {}", runtime.id);
    if !was_suspended {
        env.events.emit(Event::RuntimeRegistered {
            runtime_id: runtime.id,
        });
    }

    Ok(())
}

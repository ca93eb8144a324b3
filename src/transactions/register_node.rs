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

//! `register-node` (spec §4.4 step "register-node", the most involved
//! handler: whitelist caps, a transactional checkpoint, and a chain of
//! resume-runtime side effects).

use crate::config::GasOp;
use crate::crypto::Hash;
use crate::epoch::EPOCH_INVALID;
use crate::error::{Error, ExecutionResult};
use crate::events::{AppMessage, Event};
use crate::gas::{additional_epochs, runtime_maintenance_cost};
use crate::node::{MultiSignedNode, NodeStatus};
use crate::runtime::{AdmissionPolicy, Runtime};
use crate::stake::ClaimId;
use crate::verify;

use super::TxEnv;

pub fn handle(env: &mut TxEnv, signed: MultiSignedNode) -> ExecutionResult {
    let schema = env.schema();
    let entity = schema.entity(&signed.node.entity_id).map_err(|err| {
        log::error!(
            "register-node: failed to look up entity {} for node {}",
            signed.node.entity_id,
            signed.node.id
        );
        err
    })?;

    let registration_epoch = env.registration_epoch();
    struct Lookup<'a>(&'a crate::schema::Schema<&'a crate::store::Fork<'a>>);
    impl verify::node::RuntimeLookup for Lookup<'_> {
        fn runtime(&self, id: &Hash) -> Option<Runtime> {
            self.0.runtime(id).or_else(|_| self.0.suspended_runtime(id)).ok()
        }
    }
    if let Err(err) = verify::node::verify(
        &signed,
        registration_epoch,
        env.init_chain,
        &Lookup(&schema),
        env.params.debug_allow_unroutable_addresses,
    ) {
        log::error!(
            "register-node: descriptor verification failed for {}: {}",
            signed.node.id,
            err
        );
        return Err(err.into());
    }

    let is_entity_signed = signed.is_signed_by(&entity.id) && signed.node.id != entity.id;

    if env.check_only {
        return Ok(());
    }

    let costs = &env.params.gas_costs;
    if is_entity_signed {
        env.gas.charge(costs.base_cost(GasOp::RegisterNode));
    }

    let required_signer = if is_entity_signed {
        if !entity.allow_entity_signed_nodes || !env.params.debug_allow_entity_signed_node_registration {
            log::error!(
                "register-node: entity {} does not allow entity-signed node registration",
                entity.id
            );
            return Err(Error::Forbidden.into());
        }
        entity.id
    } else {
        signed.node.id
    };
    env.authorize(&required_signer)?;

    let existing = schema.node(&signed.node.id).ok();

    // Per-runtime whitelist admission and per-role sibling caps (spec
    // §4.4 step e).
    for membership in &signed.node.runtimes {
        let runtime = schema
            .runtime(&membership.id)
            .or_else(|_| schema.suspended_runtime(&membership.id))?;
        if let AdmissionPolicy::EntityWhitelist { entities } = &runtime.admission_policy {
            let config = entities.get(&entity.id).ok_or_else(|| {
                log::error!(
                    "register-node: entity {} not in runtime {}'s whitelist",
                    entity.id,
                    membership.id
                );
                Error::Forbidden
            })?;
            if config.max_nodes.is_empty() {
                continue;
            }
            for role in signed.node.roles.iter_set() {
                let cap = *config.max_nodes.get(&role).ok_or(Error::Forbidden)?;
                if cap == 0 {
                    return Err(Error::Forbidden.into());
                }
                let siblings = schema
                    .get_entity_nodes(&entity.id)
                    .filter(|n| n.id != signed.node.id)
                    .filter(|n| !n.is_expired(registration_epoch))
                    .filter(|n| n.has_roles(role))
                    .filter(|n| n.runtime(&membership.id).is_some())
                    .count() as u16;
                if siblings + 1 > cap {
                    log::error!(
                        "register-node: too many nodes with role {:#x} already registered for runtime {}",
                        role,
                        membership.id
                    );
                    return Err(Error::Forbidden.into());
                }
            }
        }
    }

    if !env.init_chain && signed.node.is_expired(registration_epoch) {
        log::error!("register-node: node {} descriptor already expired", signed.node.id);
        return Err(Error::NodeExpired.into());
    }

    let paid: Vec<Hash> = verify::paid_runtimes(
        &signed.node,
        schema.all_runtimes().collect::<Vec<_>>().iter(),
        schema.all_suspended_runtimes().collect::<Vec<_>>().iter(),
    );
    let new_epochs = additional_epochs(
        registration_epoch,
        existing.as_ref().map(|n| n.expiration),
        signed.node.expiration,
    );
    env.gas.charge(runtime_maintenance_cost(costs, paid.len() as u64, new_epochs));

    {
        let checkpoint = env.fork.checkpoint();

        if !env.params.debug_bypass_stake {
            let mut cache = crate::stake::StakeAccumulatorCache::new(&schema);
            let thresholds = node_claim_thresholds(&schema, &paid);
            cache.add_claim(
                env.ledger,
                &entity.id,
                ClaimId::RegisterNode(signed.node.id),
                thresholds,
            )?;
            cache.commit();
        }

        if let Some(prev) = &existing {
            verify::node::verify_update(prev, &signed.node)?;
        }

        schema.set_node(existing.as_ref(), &signed.node, &signed.blob);

        let mut status = if existing.is_some() {
            let mut s = schema.node_status(&signed.node.id).unwrap_or_default();
            s.expiration_processed = false;
            s
        } else {
            NodeStatus::new()
        };
        status.election_eligible_after = EPOCH_INVALID;
        schema.set_node_status(&signed.node.id, &status);

        for runtime_id in &paid {
            let runtime = schema.runtime(runtime_id).or_else(|_| schema.suspended_runtime(runtime_id))?;
            if schema.runtime_is_suspended(runtime_id)
                && account_meets_stake(&schema, env.ledger, &runtime)
            {
                schema.resume_runtime(runtime_id)?;
                env.app_bus.publish(AppMessage::RuntimeResumed {
                    runtime_id: *runtime_id,
                });
                env.events.emit(Event::RuntimeRegistered {
                    runtime_id: *runtime_id,
                });
            }
        }

        checkpoint.commit();
    }

    log::debug!("register-node: registered {}", signed.node.id);
    env.events.emit(Event::NodeRegistered { node_id: signed.node.id });

    Ok(())
}

fn node_claim_thresholds(
    schema: &crate::schema::Schema<&crate::store::Fork<'_>>,
    paid_runtimes: &[Hash],
) -> Vec<u64> {
    let mut thresholds = Vec::with_capacity(paid_runtimes.len());
    for id in paid_runtimes {
        if let Ok(runtime) = schema.runtime(id).or_else(|_| schema.suspended_runtime(id)) {
            thresholds.push(runtime.staking.thresholds.first().copied().unwrap_or(0));
        }
    }
    thresholds
}

/// Whether `runtime`'s controlling account already has enough escrowed
/// stake to cover every live claim against it — checked before
/// resuming a suspended runtime (spec §4.4 step h).
fn account_meets_stake(
    schema: &crate::schema::Schema<&crate::store::Fork<'_>>,
    ledger: &dyn crate::stake::StakeLedger,
    runtime: &Runtime,
) -> bool {
    let mut cache = crate::stake::StakeAccumulatorCache::new(schema);
    cache.check_claims(ledger, &runtime.entity_id)
}

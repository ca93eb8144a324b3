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

//! `deregister-entity` (spec §4.4).

use crate::config::GasOp;
use crate::crypto::PublicKey;
use crate::error::{Error, ExecutionResult};
use crate::events::Event;
use crate::stake::ClaimId;

use super::TxEnv;

pub fn handle(env: &mut TxEnv, entity_id: PublicKey) -> ExecutionResult {
    if env.check_only {
        return Ok(());
    }

    env.gas
        .charge(env.params.gas_costs.base_cost(GasOp::DeregisterEntity));

    env.authorize(&entity_id)?;

    let schema = env.schema();
    if schema.has_entity_nodes(&entity_id) {
        log::error!("deregister-entity: entity {} still has nodes", entity_id);
        return Err(Error::EntityHasNodes.into());
    }
    if schema.has_entity_runtimes(&entity_id) {
        log::error!("deregister-entity: entity {} still has runtimes", entity_id);
        return Err(Error::EntityHasRuntimes.into());
    }

    let entity = schema.remove_entity(&entity_id)?;

    if !env.params.debug_bypass_stake {
        let mut cache = crate::stake::StakeAccumulatorCache::new(&schema);
        // A missing claim here means the entity was registered without
        // one ever being added, which can't happen along any code path
        // that reaches this point — deterministic crash rather than a
        // silently accepted state divergence (spec §9).
        cache.remove_claim_or_panic(&entity_id, &ClaimId::RegisterEntity);
        cache.commit();
    }

    log::debug!("deregister-entity: deregistered {}", entity.id);
    env.events.emit(Event::EntityDeregistered {
        entity_id: entity.id,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, LATEST_ENTITY_DESCRIPTOR_VERSION};
    use crate::entity::SignedEntity;
    use crate::events::{AppMessageLog, EventLog};
    use crate::gas::MeteredGas;
    use crate::stake::{ClaimId, StakeAccumulatorCache, StakeLedger};
    use crate::store::MemoryDb;
    use std::collections::BTreeSet;

    struct InfiniteLedger;
    impl StakeLedger for InfiniteLedger {
        fn escrow_balance(&self, _account: &PublicKey) -> u64 {
            u64::MAX
        }
    }

    fn env<'a>(
        fork: &'a crate::store::Fork<'a>,
        gas: &'a mut MeteredGas,
        events: &'a mut EventLog,
        app_bus: &'a mut AppMessageLog,
        ledger: &'a InfiniteLedger,
        blacklist: &'a BTreeSet<PublicKey>,
        signer: PublicKey,
    ) -> TxEnv<'a> {
        TxEnv {
            fork,
            gas,
            events,
            app_bus,
            ledger,
            blacklist,
            params: Default::default(),
            epoch: 0,
            height: 0,
            check_only: false,
            init_chain: false,
            signer,
        }
    }

    #[test]
    fn refuses_deregistration_while_entity_has_nodes() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let entity_id = PublicKey([1; 32]);
        let entity = Entity {
            version: LATEST_ENTITY_DESCRIPTOR_VERSION,
            id: entity_id,
            nodes: vec![],
            allow_entity_signed_nodes: true,
        };
        let schema = crate::schema::Schema::new(&fork);
        schema.set_entity(
            &entity,
            &SignedEntity {
                entity: entity.clone(),
                signature: crate::crypto::Signature([0; 64]),
                blob: vec![],
            },
        );
        let node = crate::node::Node {
            version: crate::node::LATEST_NODE_DESCRIPTOR_VERSION,
            id: PublicKey([2; 32]),
            entity_id,
            expiration: 10,
            roles: crate::node::RolesMask(crate::node::RolesMask::COMPUTE_WORKER),
            runtimes: vec![],
            tls_pubkey: PublicKey([3; 32]),
            p2p_pubkey: PublicKey([4; 32]),
            consensus_pubkey: PublicKey([5; 32]),
            addresses: vec![],
        };
        schema.set_node(None, &node, &[]);

        let mut gas = MeteredGas::default();
        let mut events = EventLog::default();
        let mut app_bus = AppMessageLog::default();
        let ledger = InfiniteLedger;
        let blacklist = BTreeSet::new();
        let mut e = env(&fork, &mut gas, &mut events, &mut app_bus, &ledger, &blacklist, entity_id);
        let err = handle(&mut e, entity_id).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::EntityHasNodes));
    }

    #[test]
    fn deregisters_clean_entity_and_removes_claim() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let entity_id = PublicKey([1; 32]);
        let entity = Entity {
            version: LATEST_ENTITY_DESCRIPTOR_VERSION,
            id: entity_id,
            nodes: vec![],
            allow_entity_signed_nodes: true,
        };
        let schema = crate::schema::Schema::new(&fork);
        schema.set_entity(
            &entity,
            &SignedEntity {
                entity: entity.clone(),
                signature: crate::crypto::Signature([0; 64]),
                blob: vec![],
            },
        );
        let ledger = InfiniteLedger;
        {
            let mut cache = StakeAccumulatorCache::new(&fork);
            cache
                .add_claim(&ledger, &entity_id, ClaimId::RegisterEntity, vec![0])
                .unwrap();
            cache.commit();
        }

        let mut gas = MeteredGas::default();
        let mut events = EventLog::default();
        let mut app_bus = AppMessageLog::default();
        let blacklist = BTreeSet::new();
        let mut e = env(&fork, &mut gas, &mut events, &mut app_bus, &ledger, &blacklist, entity_id);
        handle(&mut e, entity_id).unwrap();
        assert_eq!(
            events.0,
            vec![Event::EntityDeregistered { entity_id }]
        );
        assert!(crate::schema::Schema::new(&fork).entity(&entity_id).is_err());
    }
}

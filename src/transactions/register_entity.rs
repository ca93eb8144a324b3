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

//! `register-entity` (spec §4.4).

use crate::config::GasOp;
use crate::entity::SignedEntity;
use crate::error::{Error, ExecutionResult};
use crate::events::Event;
use crate::stake::ClaimId;
use crate::verify;

use super::TxEnv;

pub fn handle(env: &mut TxEnv, signed: SignedEntity) -> ExecutionResult {
    if let Err(err) = verify::entity::verify(&signed.entity, env.blacklist) {
        log::error!("register-entity: descriptor verification failed: {}", err);
        return Err(err.into());
    }

    if env.check_only {
        return Ok(());
    }

    let costs = &env.params.gas_costs;
    env.gas.charge(costs.base_cost(GasOp::RegisterEntity));
    env.gas.charge(
        costs.base_cost(GasOp::RegisterNode) * signed.entity.nodes.len() as u64,
    );

    env.authorize(&signed.entity.id)?;

    if !env.params.debug_bypass_stake {
        let schema = env.schema();
        let mut cache = crate::stake::StakeAccumulatorCache::new(&schema);
        cache
            .add_claim(
                env.ledger,
                &signed.entity.id,
                ClaimId::RegisterEntity,
                staking_thresholds_entity(),
            )
            .map_err(|err| {
                log::error!("register-entity: insufficient stake for {}", signed.entity.id);
                err
            })?;
        cache.commit();
    }

    let schema = env.schema();
    schema.set_entity(&signed.entity, &signed);

    log::debug!("register-entity: registered {}", signed.entity.id);
    env.events.emit(Event::EntityRegistered {
        entity_id: signed.entity.id,
    });

    Ok(())
}

/// Per-entity staking threshold table lookup. The staking module's
/// real global threshold schedule is an external collaborator (see
/// crate root docs); callers of this crate in a full node would thread
/// it through `TxEnv` instead of this constant once that module exists.
fn staking_thresholds_entity() -> Vec<u64> {
    vec![0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PublicKey;
    use crate::entity::{Entity, LATEST_ENTITY_DESCRIPTOR_VERSION};
    use crate::events::{AppMessageLog, EventLog};
    use crate::gas::MeteredGas;
    use crate::stake::StakeLedger;
    use crate::store::MemoryDb;
    use std::collections::BTreeSet;

    struct InfiniteLedger;
    impl StakeLedger for InfiniteLedger {
        fn escrow_balance(&self, _account: &PublicKey) -> u64 {
            u64::MAX
        }
    }

    #[test]
    fn registers_entity_and_emits_event() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let mut gas = MeteredGas::default();
        let mut events = EventLog::default();
        let mut app_bus = AppMessageLog::default();
        let blacklist = BTreeSet::new();
        let ledger = InfiniteLedger;
        let entity = Entity {
            version: LATEST_ENTITY_DESCRIPTOR_VERSION,
            id: PublicKey([1; 32]),
            nodes: vec![],
            allow_entity_signed_nodes: true,
        };
        let signed = SignedEntity {
            entity: entity.clone(),
            signature: crate::crypto::Signature([0; 64]),
            blob: vec![],
        };
        let mut env = TxEnv {
            fork: &fork,
            gas: &mut gas,
            events: &mut events,
            app_bus: &mut app_bus,
            ledger: &ledger,
            blacklist: &blacklist,
            params: Default::default(),
            epoch: 0,
            height: 0,
            check_only: false,
            init_chain: true,
            signer: entity.id,
        };
        handle(&mut env, signed).unwrap();
        assert_eq!(events.0, vec![Event::EntityRegistered { entity_id: entity.id }]);
        assert_eq!(env.schema().entity(&entity.id).unwrap(), entity);
    }
}

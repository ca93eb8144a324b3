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

//! `unfreeze-node` (spec §4.4).

use crate::config::GasOp;
use crate::crypto::PublicKey;
use crate::error::{Error, ExecutionResult};
use crate::events::Event;

use super::TxEnv;

pub fn handle(env: &mut TxEnv, node_id: PublicKey) -> ExecutionResult {
    if env.check_only {
        return Ok(());
    }

    env.gas
        .charge(env.params.gas_costs.base_cost(GasOp::UnfreezeNode));

    let schema = env.schema();
    let node = schema.node(&node_id)?;
    let mut status = schema.node_status(&node_id)?;

    if !env.init_chain && env.signer != node.entity_id {
        log::error!(
            "unfreeze-node: node {} is not owned by signer {}",
            node_id,
            env.signer
        );
        return Err(Error::BadEntityForNode.into());
    }

    if status.freeze_end_time > env.epoch {
        log::error!(
            "unfreeze-node: node {} still frozen until epoch {}",
            node_id,
            status.freeze_end_time
        );
        return Err(Error::NodeCannotBeUnfrozen.into());
    }

    status.unfreeze();
    schema.set_node_status(&node_id, &status);

    log::debug!("unfreeze-node: unfroze {}", node_id);
    env.events.emit(Event::NodeUnfrozen { node_id });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AppMessageLog, EventLog};
    use crate::gas::MeteredGas;
    use crate::node::{Node, NodeStatus, RolesMask, LATEST_NODE_DESCRIPTOR_VERSION};
    use crate::stake::StakeLedger;
    use crate::store::MemoryDb;
    use std::collections::BTreeSet;

    struct ZeroLedger;
    impl StakeLedger for ZeroLedger {
        fn escrow_balance(&self, _account: &PublicKey) -> u64 {
            0
        }
    }

    #[test]
    fn refuses_to_unfreeze_before_freeze_end() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let entity_id = PublicKey([9; 32]);
        let node_id = PublicKey([1; 32]);
        let node = Node {
            version: LATEST_NODE_DESCRIPTOR_VERSION,
            id: node_id,
            entity_id,
            expiration: 100,
            roles: RolesMask(RolesMask::COMPUTE_WORKER),
            runtimes: vec![],
            tls_pubkey: PublicKey([2; 32]),
            p2p_pubkey: PublicKey([3; 32]),
            consensus_pubkey: PublicKey([4; 32]),
            addresses: vec![],
        };
        let schema = crate::schema::Schema::new(&fork);
        schema.set_node(None, &node, &[]);
        let mut status = NodeStatus::new();
        status.freeze_end_time = 50;
        schema.set_node_status(&node_id, &status);

        let mut gas = MeteredGas::default();
        let mut events = EventLog::default();
        let mut app_bus = AppMessageLog::default();
        let ledger = ZeroLedger;
        let blacklist = BTreeSet::new();
        let mut env = TxEnv {
            fork: &fork,
            gas: &mut gas,
            events: &mut events,
            app_bus: &mut app_bus,
            ledger: &ledger,
            blacklist: &blacklist,
            params: Default::default(),
            epoch: 10,
            height: 0,
            check_only: false,
            init_chain: false,
            signer: entity_id,
        };
        let err = handle(&mut env, node_id).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NodeCannotBeUnfrozen));
    }
}

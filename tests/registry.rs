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

//! Integration tests exercising the registry transaction handlers
//! end-to-end against an in-memory store, the way the teacher's
//! `testkit`-based suites drove whole services rather than isolated
//! units.

use std::collections::BTreeSet;

use ed25519_dalek::{Keypair, Signer};
use pretty_assertions::assert_eq;
use rand_core::OsRng;

use chain_registry::config::ConsensusParameters;
use chain_registry::crypto::{PublicKey, Signature};
use chain_registry::entity::{Entity, SignedEntity, LATEST_ENTITY_DESCRIPTOR_VERSION};
use chain_registry::error::Error;
use chain_registry::events::{AppMessageLog, EventLog};
use chain_registry::gas::MeteredGas;
use chain_registry::node::{
    MultiSignedNode, Node, RolesMask, RuntimeMembership, LATEST_NODE_DESCRIPTOR_VERSION,
};
use chain_registry::runtime::{
    AdmissionPolicy, CommitteeKind, CommitteeRole, EntityWhitelistConfig, ExecutorParams,
    GovernanceModel, Runtime, RuntimeKind, SchedulingConstraint, StakingThresholds,
    StorageParams, TxnSchedulerParams, LATEST_RUNTIME_DESCRIPTOR_VERSION,
};
use chain_registry::schema::Schema;
use chain_registry::stake::StakeLedger;
use chain_registry::store::MemoryDb;
use chain_registry::transactions::{register_entity, register_node, register_runtime, TxEnv};

struct InfiniteLedger;
impl StakeLedger for InfiniteLedger {
    fn escrow_balance(&self, _account: &PublicKey) -> u64 {
        u64::MAX
    }
}

/// The four keypairs a node descriptor is signed under, plus a helper
/// to produce a fully self-signed [`MultiSignedNode`] the way a real
/// node operator's CLI would assemble one.
struct NodeKeys {
    id: Keypair,
    tls: Keypair,
    p2p: Keypair,
    consensus: Keypair,
}

impl NodeKeys {
    fn generate() -> Self {
        Self {
            id: Keypair::generate(&mut OsRng),
            tls: Keypair::generate(&mut OsRng),
            p2p: Keypair::generate(&mut OsRng),
            consensus: Keypair::generate(&mut OsRng),
        }
    }

    fn id_key(&self) -> PublicKey {
        PublicKey(self.id.public.to_bytes())
    }

    fn tls_key(&self) -> PublicKey {
        PublicKey(self.tls.public.to_bytes())
    }

    fn p2p_key(&self) -> PublicKey {
        PublicKey(self.p2p.public.to_bytes())
    }

    fn consensus_key(&self) -> PublicKey {
        PublicKey(self.consensus.public.to_bytes())
    }

    fn sign_all(&self, blob: &[u8]) -> (Vec<PublicKey>, Vec<Signature>) {
        let keys = [&self.id, &self.tls, &self.p2p, &self.consensus];
        let signed_by = vec![self.id_key(), self.tls_key(), self.p2p_key(), self.consensus_key()];
        let signatures = keys
            .iter()
            .map(|kp| Signature(kp.sign(blob).to_bytes()))
            .collect();
        (signed_by, signatures)
    }
}

fn signed_node(node: Node, keys: &NodeKeys) -> MultiSignedNode {
    let blob = b"node-descriptor".to_vec();
    let (signed_by, signatures) = keys.sign_all(&blob);
    MultiSignedNode {
        node,
        signed_by,
        signatures,
        blob,
    }
}

fn sample_entity(id: u8) -> Entity {
    Entity {
        version: LATEST_ENTITY_DESCRIPTOR_VERSION,
        id: PublicKey([id; 32]),
        nodes: vec![],
        allow_entity_signed_nodes: true,
    }
}

fn node_descriptor(keys: &NodeKeys, entity_id: PublicKey, runtime_id: chain_registry::crypto::Hash) -> Node {
    Node {
        version: LATEST_NODE_DESCRIPTOR_VERSION,
        id: keys.id_key(),
        entity_id,
        expiration: 1000,
        roles: RolesMask(RolesMask::COMPUTE_WORKER),
        runtimes: vec![RuntimeMembership {
            id: runtime_id,
            capability: None,
        }],
        tls_pubkey: keys.tls_key(),
        p2p_pubkey: keys.p2p_key(),
        consensus_pubkey: keys.consensus_key(),
        addresses: vec![],
    }
}

fn compute_runtime(entity_id: PublicKey) -> Runtime {
    Runtime {
        version: LATEST_RUNTIME_DESCRIPTOR_VERSION,
        id: chain_registry::crypto::Hash([42; 32]),
        kind: RuntimeKind::Compute,
        entity_id,
        key_manager: None,
        executor: ExecutorParams {
            group_size: 1,
            group_backup_size: 0,
            round_timeout: 1,
            max_messages: 1,
        },
        txn_scheduler: TxnSchedulerParams {
            batch_flush_timeout: 1,
            max_batch_size: 1,
            max_batch_size_bytes: 1,
        },
        storage: StorageParams {
            group_size: 1,
            min_write_replication: 1,
            max_apply_write_log_entries: 1,
            max_apply_ops: 1,
        },
        admission_policy: AdmissionPolicy::AnyNode,
        constraints: {
            let mut m = std::collections::BTreeMap::new();
            m.insert(
                (CommitteeKind::ComputeExecutor, CommitteeRole::Worker),
                SchedulingConstraint {
                    min_pool_size: 1,
                    max_nodes_per_entity: None,
                    validator_set_required: false,
                },
            );
            m
        },
        staking: StakingThresholds::default(),
        governance_model: GovernanceModel::Entity,
        tee: None,
        genesis_state_root: chain_registry::crypto::Hash::default(),
    }
}

struct Harness {
    db: MemoryDb,
    gas: MeteredGas,
    events: EventLog,
    app_bus: AppMessageLog,
    blacklist: BTreeSet<PublicKey>,
    ledger: InfiniteLedger,
}

impl Harness {
    fn new() -> Self {
        Self {
            db: MemoryDb::new(),
            gas: MeteredGas::default(),
            events: EventLog::default(),
            app_bus: AppMessageLog::default(),
            blacklist: BTreeSet::new(),
            ledger: InfiniteLedger,
        }
    }
}

fn env<'a>(
    fork: &'a chain_registry::store::Fork<'a>,
    h: &'a mut Harness,
    signer: PublicKey,
    init_chain: bool,
) -> TxEnv<'a> {
    TxEnv {
        fork,
        gas: &mut h.gas,
        events: &mut h.events,
        app_bus: &mut h.app_bus,
        ledger: &h.ledger,
        blacklist: &h.blacklist,
        params: ConsensusParameters::default(),
        epoch: 1,
        height: 1,
        check_only: false,
        init_chain,
        signer,
    }
}

#[test]
fn register_entity_then_deregister_clean_entity() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut h = Harness::new();
    let fork = h.db.fork();
    let entity = sample_entity(1);

    {
        let mut e = env(&fork, &mut h, entity.id, true);
        let signed = SignedEntity {
            entity: entity.clone(),
            signature: Signature([0; 64]),
            blob: vec![],
        };
        register_entity::handle(&mut e, signed).unwrap();
    }

    assert!(Schema::new(&fork).entity(&entity.id).is_ok());

    {
        let mut e = env(&fork, &mut h, entity.id, false);
        chain_registry::transactions::deregister_entity::handle(&mut e, entity.id).unwrap();
    }

    assert!(Schema::new(&fork).entity(&entity.id).is_err());
}

#[test]
fn entity_cannot_deregister_while_owning_a_node() {
    let mut h = Harness::new();
    let fork = h.db.fork();
    let entity = sample_entity(2);
    let runtime = compute_runtime(entity.id);

    {
        let mut e = env(&fork, &mut h, entity.id, true);
        let signed = SignedEntity {
            entity: entity.clone(),
            signature: Signature([0; 64]),
            blob: vec![],
        };
        register_entity::handle(&mut e, signed).unwrap();
        register_runtime::handle(&mut e, runtime.clone()).unwrap();
    }

    let keys = NodeKeys::generate();
    let node = node_descriptor(&keys, entity.id, runtime.id);
    {
        let mut e = env(&fork, &mut h, node.id, true);
        register_node::handle(&mut e, signed_node(node.clone(), &keys)).unwrap();
    }

    let mut e = env(&fork, &mut h, entity.id, false);
    let err = chain_registry::transactions::deregister_entity::handle(&mut e, entity.id).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::EntityHasNodes));
}

#[test]
fn whitelist_cap_rejects_once_quota_is_full() {
    let mut h = Harness::new();
    let fork = h.db.fork();
    let entity = sample_entity(4);

    let mut runtime = compute_runtime(entity.id);
    let mut whitelist_entities = std::collections::BTreeMap::new();
    let mut max_nodes = std::collections::BTreeMap::new();
    max_nodes.insert(RolesMask::COMPUTE_WORKER, 1u16);
    whitelist_entities.insert(entity.id, EntityWhitelistConfig { max_nodes });
    runtime.admission_policy = AdmissionPolicy::EntityWhitelist {
        entities: whitelist_entities,
    };

    {
        let mut e = env(&fork, &mut h, entity.id, true);
        let signed = SignedEntity {
            entity: entity.clone(),
            signature: Signature([0; 64]),
            blob: vec![],
        };
        register_entity::handle(&mut e, signed).unwrap();
        register_runtime::handle(&mut e, runtime.clone()).unwrap();
    }

    let first_keys = NodeKeys::generate();
    let first = node_descriptor(&first_keys, entity.id, runtime.id);
    {
        let mut e = env(&fork, &mut h, first.id, true);
        register_node::handle(&mut e, signed_node(first.clone(), &first_keys)).unwrap();
    }

    let second_keys = NodeKeys::generate();
    let second = node_descriptor(&second_keys, entity.id, runtime.id);
    let mut e = env(&fork, &mut h, second.id, true);
    let err = register_node::handle(&mut e, signed_node(second, &second_keys)).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Forbidden));
}

#[test]
fn register_node_for_suspended_runtime_resumes_it_once_staked() {
    let mut h = Harness::new();
    let fork = h.db.fork();
    let entity = sample_entity(7);
    let runtime = compute_runtime(entity.id);

    {
        let mut e = env(&fork, &mut h, entity.id, true);
        let signed = SignedEntity {
            entity: entity.clone(),
            signature: Signature([0; 64]),
            blob: vec![],
        };
        register_entity::handle(&mut e, signed).unwrap();
        register_runtime::handle(&mut e, runtime.clone()).unwrap();
    }

    Schema::new(&fork).suspend_runtime(&runtime.id).unwrap();
    assert!(Schema::new(&fork).runtime_is_suspended(&runtime.id));

    let keys = NodeKeys::generate();
    let node = node_descriptor(&keys, entity.id, runtime.id);
    let mut e = env(&fork, &mut h, node.id, true);
    register_node::handle(&mut e, signed_node(node, &keys)).unwrap();

    assert!(Schema::new(&fork).runtime_is_active(&runtime.id));
}

#[test]
fn governance_transition_requires_old_authority_then_locks_out_entity() {
    let mut h = Harness::new();
    let fork = h.db.fork();
    let entity = sample_entity(8);
    let runtime = compute_runtime(entity.id);
    assert_eq!(runtime.governance_model, GovernanceModel::Entity);

    {
        let mut e = env(&fork, &mut h, entity.id, true);
        let signed = SignedEntity {
            entity: entity.clone(),
            signature: Signature([0; 64]),
            blob: vec![],
        };
        register_entity::handle(&mut e, signed).unwrap();
        register_runtime::handle(&mut e, runtime.clone()).unwrap();
    }

    let mut runtime_governed = runtime.clone();
    runtime_governed.governance_model = GovernanceModel::Runtime;
    {
        // Entity still governs the *existing* descriptor, so its
        // signature authorizes the transition.
        let mut e = env(&fork, &mut h, entity.id, false);
        register_runtime::handle(&mut e, runtime_governed.clone()).unwrap();
    }
    assert_eq!(
        Schema::new(&fork).runtime(&runtime.id).unwrap().governance_model,
        GovernanceModel::Runtime
    );

    // A further update signed by the entity is now rejected: the
    // runtime governs itself.
    let mut e = env(&fork, &mut h, entity.id, false);
    let err = register_runtime::handle(&mut e, runtime_governed).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::IncorrectTxSigner));
}

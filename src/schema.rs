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

//! Typed reads/writes over the replicated store (C2, spec §4.2).
//!
//! Mirrors exonum's `Schema<T>` split: methods available on any
//! [`Access`] read the current state; methods gated on [`AccessMut`]
//! mutate it. Every mutation here goes through the `Fork`'s journal
//! (see [`crate::store`]), so it participates in checkpoint rollback
//! automatically — callers don't need to do anything extra.

use crate::config::ConsensusParameters;
use crate::crypto::{Hash, PublicKey};
use crate::entity::{Entity, SignedEntity};
use crate::error::Error;
use crate::node::{Node, NodeStatus};
use crate::runtime::Runtime;
use crate::store::{Access, AccessMut};

const TABLE_ENTITIES: &str = "registry.entities";
const TABLE_NODES: &str = "registry.nodes";
const TABLE_NODE_STATUSES: &str = "registry.node_statuses";
const TABLE_RUNTIMES: &str = "registry.runtimes";
const TABLE_SUSPENDED_RUNTIMES: &str = "registry.suspended_runtimes";
const TABLE_PARAMS: &str = "registry.params";
const PARAMS_KEY: &[u8] = b"params";

fn encode<T: serde::Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("registry values are always serializable")
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).expect("stored registry values are always well-formed")
}

pub struct Schema<T> {
    view: T,
}

impl<T: Access> Schema<T> {
    pub fn new(view: T) -> Self {
        Self { view }
    }

    pub fn entity(&self, id: &PublicKey) -> Result<Entity, Error> {
        self.view
            .get_raw(TABLE_ENTITIES, id.as_bytes())
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchEntity)
    }

    pub fn has_entity_nodes(&self, id: &PublicKey) -> bool {
        self.get_entity_nodes(id).next().is_some()
    }

    pub fn has_entity_runtimes(&self, id: &PublicKey) -> bool {
        self.all_runtimes().any(|r| &r.entity_id == id)
            || self.all_suspended_runtimes().any(|r| &r.entity_id == id)
    }

    /// Nodes owned by `id`. Linear scan over all nodes — acceptable
    /// here since the registry's node set is small relative to a
    /// validator's working set, same trade-off the original Go
    /// implementation makes (`state.GetEntityNodes`).
    pub fn get_entity_nodes(&self, id: &PublicKey) -> impl Iterator<Item = Node> + '_ {
        let id = *id;
        self.all_nodes().filter(move |n| n.entity_id == id)
    }

    pub fn all_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.view
            .keys_raw(TABLE_NODES)
            .into_iter()
            .map(move |k| decode(&self.view.get_raw(TABLE_NODES, &k).unwrap()))
    }

    pub fn node(&self, id: &PublicKey) -> Result<Node, Error> {
        self.view
            .get_raw(TABLE_NODES, id.as_bytes())
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchNode)
    }

    pub fn node_status(&self, id: &PublicKey) -> Result<NodeStatus, Error> {
        self.view
            .get_raw(TABLE_NODE_STATUSES, id.as_bytes())
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchNode)
    }

    pub fn all_runtimes(&self) -> impl Iterator<Item = Runtime> + '_ {
        self.view
            .keys_raw(TABLE_RUNTIMES)
            .into_iter()
            .map(move |k| decode(&self.view.get_raw(TABLE_RUNTIMES, &k).unwrap()))
    }

    pub fn all_suspended_runtimes(&self) -> impl Iterator<Item = Runtime> + '_ {
        self.view
            .keys_raw(TABLE_SUSPENDED_RUNTIMES)
            .into_iter()
            .map(move |k| decode(&self.view.get_raw(TABLE_SUSPENDED_RUNTIMES, &k).unwrap()))
    }

    pub fn runtime(&self, id: &Hash) -> Result<Runtime, Error> {
        self.view
            .get_raw(TABLE_RUNTIMES, &id.0)
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchRuntime)
    }

    pub fn suspended_runtime(&self, id: &Hash) -> Result<Runtime, Error> {
        self.view
            .get_raw(TABLE_SUSPENDED_RUNTIMES, &id.0)
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchRuntime)
    }

    /// `true` once both `registry.runtimes` and `registry.suspended_runtimes`
    /// have been consulted — enforces invariant 6 (spec §3) is easy to
    /// check for tests.
    pub fn runtime_is_active(&self, id: &Hash) -> bool {
        self.runtime(id).is_ok()
    }

    pub fn runtime_is_suspended(&self, id: &Hash) -> bool {
        self.suspended_runtime(id).is_ok()
    }

    pub fn consensus_parameters(&self) -> ConsensusParameters {
        self.view
            .get_raw(TABLE_PARAMS, PARAMS_KEY)
            .map(|b| decode(&b))
            .unwrap_or_default()
    }
}

impl<T: AccessMut> Schema<T> {
    pub fn set_consensus_parameters(&self, params: &ConsensusParameters) {
        self.view
            .put_raw(TABLE_PARAMS, PARAMS_KEY.to_vec(), encode(params));
    }

    pub fn set_entity(&self, entity: &Entity, signed: &SignedEntity) {
        self.view.put_raw(
            TABLE_ENTITIES,
            entity.id.as_bytes().to_vec(),
            encode(entity),
        );
        // The signed blob is kept so a replica can reconstruct the
        // exact bytes that were verified, for audit/replay purposes —
        // same idea as exonum's `core.transactions` table.
        self.view.put_raw(
            "registry.entity_blobs",
            entity.id.as_bytes().to_vec(),
            encode(&signed.blob),
        );
    }

    pub fn remove_entity(&self, id: &PublicKey) -> Result<Entity, Error> {
        let entity: Entity = self
            .view
            .get_raw(TABLE_ENTITIES, id.as_bytes())
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchEntity)?;
        self.view.remove_raw(TABLE_ENTITIES, id.as_bytes());
        self.view.remove_raw("registry.entity_blobs", id.as_bytes());
        Ok(entity)
    }

    /// Creates or updates a node. `prev` being `Some` signals an
    /// update (spec §4.2); the caller has already run update
    /// verification against it.
    pub fn set_node(&self, _prev: Option<&Node>, new: &Node, blob: &[u8]) {
        self.view
            .put_raw(TABLE_NODES, new.id.as_bytes().to_vec(), encode(new));
        self.view.put_raw(
            "registry.node_blobs",
            new.id.as_bytes().to_vec(),
            encode(&blob.to_vec()),
        );
    }

    pub fn set_node_status(&self, id: &PublicKey, status: &NodeStatus) {
        self.view
            .put_raw(TABLE_NODE_STATUSES, id.as_bytes().to_vec(), encode(status));
    }

    /// Writes `runtime`, moving it between the active and suspended
    /// tables so that invariant 6 (active ∩ suspended = ∅) holds
    /// immediately after this call returns.
    pub fn set_runtime(&self, runtime: &Runtime, suspended: bool) {
        let id = runtime.id.0;
        if suspended {
            self.view.remove_raw(TABLE_RUNTIMES, &id);
            self.view
                .put_raw(TABLE_SUSPENDED_RUNTIMES, id.to_vec(), encode(runtime));
        } else {
            self.view.remove_raw(TABLE_SUSPENDED_RUNTIMES, &id);
            self.view.put_raw(TABLE_RUNTIMES, id.to_vec(), encode(runtime));
        }
    }

    pub fn resume_runtime(&self, id: &Hash) -> Result<Runtime, Error> {
        let runtime: Runtime = self
            .view
            .get_raw(TABLE_SUSPENDED_RUNTIMES, &id.0)
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchRuntime)?;
        self.view.remove_raw(TABLE_SUSPENDED_RUNTIMES, &id.0);
        self.view
            .put_raw(TABLE_RUNTIMES, id.0.to_vec(), encode(&runtime));
        Ok(runtime)
    }

    pub fn suspend_runtime(&self, id: &Hash) -> Result<Runtime, Error> {
        let runtime: Runtime = self
            .view
            .get_raw(TABLE_RUNTIMES, &id.0)
            .map(|b| decode(&b))
            .ok_or(Error::NoSuchRuntime)?;
        self.view.remove_raw(TABLE_RUNTIMES, &id.0);
        self.view
            .put_raw(TABLE_SUSPENDED_RUNTIMES, id.0.to_vec(), encode(&runtime));
        Ok(runtime)
    }
}

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

//! Entity descriptors (C3/C4 data model, spec §3).

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, Signature};

/// Current descriptor version accepted by [`crate::verify::entity`].
pub const LATEST_ENTITY_DESCRIPTOR_VERSION: u16 = 2;

/// A stake-holding principal, identified by its public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Descriptor format version.
    pub version: u16,
    /// The entity's identifying public key.
    pub id: PublicKey,
    /// Node public keys owned by this entity. Only consulted when
    /// `allow_entity_signed_nodes` is `false` (invariant 1, spec §3).
    pub nodes: Vec<PublicKey>,
    /// Whether the entity's own signature can stand in for a node's
    /// signature during `register-node`.
    pub allow_entity_signed_nodes: bool,
}

impl Entity {
    pub fn owns_node(&self, node_id: &PublicKey) -> bool {
        self.nodes.contains(node_id)
    }
}

/// An `Entity` descriptor together with the signature(s) that
/// authenticated it, as handed to `register-entity`. In the replica,
/// the signature set is already verified by the transaction envelope
/// layer (out of scope); the registry only needs the unwrapped
/// descriptor plus the raw bytes used to reconstruct it for replay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedEntity {
    pub entity: Entity,
    pub signature: Signature,
    /// Canonical encoding of `entity`, stored alongside it so the
    /// signature can be re-checked against exactly the bytes that were
    /// originally signed.
    pub blob: Vec<u8>,
}

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

//! Node descriptors and status (spec §3).

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, PublicKey, Signature};
use crate::epoch::{Epoch, EPOCH_INVALID};

/// Current descriptor version accepted by [`crate::verify::node`].
pub const LATEST_NODE_DESCRIPTOR_VERSION: u16 = 2;

/// Role bitmask. Only the bits named here are defined; any other bit
/// set is a reserved bit and must be rejected (spec §9 "role
/// enumeration" note) so that a future role addition cannot silently
/// activate an old binary's whitelist/eligibility checks on bits it
/// doesn't understand.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RolesMask(pub u32);

impl RolesMask {
    pub const COMPUTE_WORKER: u32 = 1 << 0;
    pub const KEY_MANAGER: u32 = 1 << 1;
    pub const STORAGE_WORKER: u32 = 1 << 2;
    pub const STORAGE_RPC: u32 = 1 << 3;
    pub const VALIDATOR: u32 = 1 << 4;
    pub const BACKUP_WORKER: u32 = 1 << 5;

    const ALL_DEFINED: u32 = Self::COMPUTE_WORKER
        | Self::KEY_MANAGER
        | Self::STORAGE_WORKER
        | Self::STORAGE_RPC
        | Self::VALIDATOR
        | Self::BACKUP_WORKER;

    /// All individually-addressable role bits, in a stable order —
    /// used when iterating "for each role the node carries" (e.g. the
    /// whitelist cap check in `register-node`).
    pub const DEFINED_ROLES: [u32; 6] = [
        Self::COMPUTE_WORKER,
        Self::KEY_MANAGER,
        Self::STORAGE_WORKER,
        Self::STORAGE_RPC,
        Self::VALIDATOR,
        Self::BACKUP_WORKER,
    ];

    pub fn has(self, role: u32) -> bool {
        self.0 & role != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if any bit outside of [`Self::ALL_DEFINED`] is set.
    pub fn has_reserved_bits(self) -> bool {
        self.0 & !Self::ALL_DEFINED != 0
    }

    pub fn iter_set(self) -> impl Iterator<Item = u32> {
        Self::DEFINED_ROLES
            .into_iter()
            .filter(move |&role| self.has(role))
    }
}

/// TEE capability declared by a node for a specific runtime membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeeCapability {
    pub hardware: TeeHardware,
    /// Opaque attestation payload; verifying it is out of scope here
    /// (see crate root docs) — the registry only checks that a
    /// capability is present when the runtime requires one, and that
    /// its hardware kind matches.
    pub attestation: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeeHardware {
    #[default]
    Invalid,
    IntelSgx,
}

/// A node's membership in one runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMembership {
    pub id: Hash,
    pub capability: Option<TeeCapability>,
}

/// A machine registered under an entity to serve one or more roles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub version: u16,
    pub id: PublicKey,
    pub entity_id: PublicKey,
    /// Epoch at which the node becomes expired; expired means
    /// `current_epoch >= expiration` (inclusive, per spec §3).
    pub expiration: Epoch,
    pub roles: RolesMask,
    pub runtimes: Vec<RuntimeMembership>,
    pub tls_pubkey: PublicKey,
    pub p2p_pubkey: PublicKey,
    pub consensus_pubkey: PublicKey,
    pub addresses: Vec<String>,
}

impl Node {
    pub fn is_expired(&self, epoch: Epoch) -> bool {
        epoch >= self.expiration
    }

    pub fn has_roles(&self, mask: u32) -> bool {
        self.roles.has(mask)
    }

    pub fn runtime(&self, id: &Hash) -> Option<&RuntimeMembership> {
        self.runtimes.iter().find(|m| &m.id == id)
    }
}

/// A `Node` descriptor together with the set of signatures that
/// authenticated it (node key, and optionally the owning entity's key
/// for entity-signed registration). See spec §4.4 step (c).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiSignedNode {
    pub node: Node,
    pub signed_by: Vec<PublicKey>,
    pub signatures: Vec<Signature>,
    /// Canonical encoding of `node`, re-signed and re-verified against
    /// each entry in `signed_by`/`signatures`.
    pub blob: Vec<u8>,
}

impl MultiSignedNode {
    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.signed_by.contains(key)
    }
}

/// Per-node mutable runtime status, separate from the immutable
/// descriptor so that freezing/eligibility bookkeeping doesn't require
/// rewriting (and re-verifying) the whole node descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// Epoch at which a freeze imposed on this node ends; zero/absent
    /// means "not frozen".
    pub freeze_end_time: Epoch,
    /// Epoch after which this node becomes eligible for election to a
    /// non-validator committee. Set to [`EPOCH_INVALID`] whenever the
    /// node is (re)registered, per spec §4.4 step (h) — this delays a
    /// newly (re)registered node by exactly one epoch (spec §4.5
    /// step 6).
    pub election_eligible_after: Epoch,
    pub expiration_processed: bool,
}

impl NodeStatus {
    pub fn new() -> Self {
        Self {
            freeze_end_time: 0,
            election_eligible_after: EPOCH_INVALID,
            expiration_processed: false,
        }
    }

    pub fn unfreeze(&mut self) {
        self.freeze_end_time = 0;
    }

    pub fn is_eligible(&self, epoch: Epoch) -> bool {
        self.election_eligible_after <= epoch
    }
}

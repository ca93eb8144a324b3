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

//! Descriptor Verifiers (C3, spec §4.3).
//!
//! Pure functions: no store access, no gas, no signer checks — those
//! belong to the transaction handlers in [`crate::transactions`] that
//! call into this module. Kept pure so they're trivially unit-testable
//! and so the same checks can run during check-only (mempool)
//! validation without touching the store.

pub mod entity;
pub mod node;
pub mod runtime;

use std::collections::BTreeSet;

use crate::crypto::Hash;
use crate::node::Node as NodeDescriptor;
use crate::runtime::Runtime;

/// Runtimes a node registration must pay per-epoch maintenance gas
/// for — the node's runtime memberships intersected with the runtimes
/// that currently exist (active or suspended). A membership naming a
/// runtime that doesn't exist yet is rejected earlier, during node
/// verification, so this never needs to report an error itself.
pub fn paid_runtimes<'a>(
    node: &'a NodeDescriptor,
    active: impl Iterator<Item = &'a Runtime>,
    suspended: impl Iterator<Item = &'a Runtime>,
) -> Vec<Hash> {
    let known: BTreeSet<Hash> = active.chain(suspended).map(|r| r.id).collect();
    node.runtimes
        .iter()
        .map(|m| m.id)
        .filter(|id| known.contains(id))
        .collect()
}

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

//! Deterministic registry application: entity, node, and runtime
//! registration, committee election, stake accounting, and genesis
//! validation for a replicated consensus node.
//!
//! This crate is one application within a larger consensus node (the
//! way `exonum`'s service crates sit inside a running blockchain): it
//! owns the registry's part of the replicated key-value store and the
//! business logic that mutates it in response to transactions. Several
//! things a full node needs are external collaborators this crate only
//! consumes through narrow interfaces, never implements:
//!
//! - Signature and hashing *primitives* ([`crypto`] only wraps them).
//! - The Merkleized store itself — proofs, on-disk snapshots, network
//!   sync ([`store`] models just enough of it to journal and roll back
//!   writes within a block).
//! - The beacon application (supplies the per-epoch randomness
//!   [`election`] draws committees from) and the staking ledger
//!   ([`stake::StakeLedger`] is the narrow view this crate needs of
//!   it).
//! - Wire-level transaction envelopes and their signature verification
//!   — handlers in [`transactions`] receive already-verified payloads.

pub mod config;
pub mod crypto;
pub mod election;
pub mod entity;
pub mod epoch;
pub mod error;
pub mod events;
pub mod gas;
pub mod genesis;
pub mod messages;
pub mod node;
pub mod runtime;
pub mod schema;
pub mod stake;
pub mod store;
pub mod transactions;
pub mod verify;

pub use error::Error;

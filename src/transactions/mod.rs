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

//! Transaction Handlers (C4, spec §4.4).
//!
//! Each handler is a free function rather than a `Transaction` trait
//! impl — unlike the teacher's `cryptocurrency-advanced` service, this
//! crate has no wire-level transaction envelope of its own (out of
//! scope, see crate root docs): callers already have a decoded,
//! signature-verified payload and only need the registry's business
//! logic applied to it. [`TxEnv`] bundles the handful of collaborators
//! every handler shares, mirroring what a real `TransactionContext`
//! would hand a service.

pub mod deregister_entity;
pub mod register_entity;
pub mod register_node;
pub mod register_runtime;
pub mod unfreeze_node;

use std::collections::BTreeSet;

use crate::config::ConsensusParameters;
use crate::crypto::PublicKey;
use crate::epoch::{Epoch, Height};
use crate::events::{AppMessageBus, EventSink};
use crate::gas::GasAccountant;
use crate::stake::StakeLedger;
use crate::store::Fork;

/// The shared environment a transaction handler runs in.
pub struct TxEnv<'a> {
    pub fork: &'a Fork<'a>,
    pub gas: &'a mut dyn GasAccountant,
    pub events: &'a mut dyn EventSink,
    pub app_bus: &'a mut dyn AppMessageBus,
    pub ledger: &'a dyn StakeLedger,
    pub blacklist: &'a BTreeSet<PublicKey>,
    pub params: ConsensusParameters,
    pub epoch: Epoch,
    pub height: Height,
    /// Mempool pre-admission: run validation, charge nothing, write
    /// nothing (spec §4.4 step 1).
    pub check_only: bool,
    /// Genesis processing: signer checks are skipped (spec §4.4 step 4).
    pub init_chain: bool,
    /// The transaction's verified signer, or the entity/runtime
    /// address asserted by the envelope layer. Ignored entirely when
    /// `init_chain` is set.
    pub signer: PublicKey,
}

impl<'a> TxEnv<'a> {
    /// The epoch node registrations verify against — one ahead of the
    /// current height's epoch (spec §4.4 step b).
    pub fn registration_epoch(&self) -> Epoch {
        self.epoch.saturating_add(1)
    }

    pub fn schema(&self) -> crate::schema::Schema<&'a Fork<'a>> {
        crate::schema::Schema::new(self.fork)
    }

    pub fn authorize(&self, required_signer: &PublicKey) -> Result<(), crate::error::Error> {
        if self.init_chain {
            return Ok(());
        }
        if &self.signer != required_signer {
            return Err(crate::error::Error::IncorrectTxSigner);
        }
        Ok(())
    }
}

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

//! Gas accounting (spec §4.4 step 3, §9).
//!
//! A transaction handler charges gas through a [`GasAccountant`]. Two
//! implementations exist: [`MeteredGas`], used during normal delivery
//! and check-only validation, and [`NoopGas`], substituted in while
//! processing runtime messages during delivery (spec §4.6) where gas
//! was already accounted for by the runtime round that emitted them.

use crate::config::GasCosts;
use crate::epoch::Epoch;

/// Accepts gas charges, or rejects the operation outright (out of gas).
/// The actual budget/block-gas-limit bookkeeping lives in the
/// consensus driver; this trait is the seam the registry core charges
/// through.
pub trait GasAccountant {
    fn charge(&mut self, amount: u64);
}

/// Accumulates charges in memory for inspection — the real consensus
/// driver's accountant is an external collaborator (see crate root
/// docs); this is the concrete stand-in used by tests and by any
/// caller that just wants a running total.
#[derive(Debug, Default)]
pub struct MeteredGas {
    pub spent: u64,
}

impl GasAccountant for MeteredGas {
    fn charge(&mut self, amount: u64) {
        self.spent += amount;
    }
}

/// Discards every charge. Used while replaying runtime messages during
/// delivery: gas for the whole batch was already charged against the
/// runtime round, so individual message handlers must not charge again
/// (spec §4.6, "Delivery ... a no-op gas accountant replaces the
/// caller's").
#[derive(Debug, Default)]
pub struct NoopGas;

impl GasAccountant for NoopGas {
    fn charge(&mut self, _amount: u64) {}
}

/// `max(0, new.expiration − epoch) − max(0, existing.expiration − epoch)`,
/// i.e. the number of additional epochs of maintenance a node
/// registration needs to pay for, crediting epochs already paid by an
/// earlier registration (spec §4.4 step 3).
pub fn additional_epochs(epoch: Epoch, existing_expiration: Option<Epoch>, new_expiration: Epoch) -> u64 {
    let new_remaining = new_expiration.saturating_sub(epoch);
    let existing_remaining = existing_expiration
        .map(|exp| exp.saturating_sub(epoch))
        .unwrap_or(0);
    new_remaining.saturating_sub(existing_remaining)
}

/// `GasOpRuntimeEpochMaintenance × paid_runtimes × additional_epochs`.
pub fn runtime_maintenance_cost(costs: &GasCosts, paid_runtimes: u64, additional_epochs: u64) -> u64 {
    costs.runtime_epoch_maintenance * paid_runtimes * additional_epochs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additional_epochs_credits_already_paid_span() {
        // Existing node paid through epoch 110, currently at epoch 100.
        // Refreshing to epoch 115 only owes 5 fresh epochs.
        assert_eq!(additional_epochs(100, Some(110), 115), 5);
    }

    #[test]
    fn additional_epochs_on_new_node_owes_full_span() {
        assert_eq!(additional_epochs(100, None, 110), 10);
    }

    #[test]
    fn additional_epochs_never_negative() {
        // Shrinking expiration owes nothing extra.
        assert_eq!(additional_epochs(100, Some(150), 110), 0);
    }
}

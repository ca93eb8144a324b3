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

//! Stake Accumulator (C1, spec §4.1).
//!
//! Tracks per-account claims and verifies their sum against an
//! account's escrow balance. The escrow ledger itself (staking
//! module) is an external collaborator, same as the Merkleized store —
//! this module is handed a [`StakeLedger`] to query and nothing more.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, PublicKey};
use crate::error::Error;

/// A structured claim identifier (spec §4.1).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimId {
    RegisterEntity,
    RegisterNode(PublicKey),
    RegisterRuntime(Hash),
}

/// Queries the escrow balance an account has committed to stake.
/// Implemented by the staking application in a full node; out of
/// scope here (see crate root docs).
pub trait StakeLedger {
    fn escrow_balance(&self, account: &PublicKey) -> u64;
}

const TABLE_CLAIMS: &str = "registry.stake_claims";

fn claims_key(account: &PublicKey) -> Vec<u8> {
    account.as_bytes().to_vec()
}

/// Per-account claim bookkeeping, batched in memory and flushed on
/// [`StakeAccumulatorCache::commit`]. Rollback, when the cache is
/// simply dropped without committing, is implicit — nothing was
/// written to the store yet.
pub struct StakeAccumulatorCache<'a, T> {
    view: &'a T,
    /// Accounts touched in this transaction, loaded lazily and held
    /// until `commit`.
    dirty: BTreeMap<PublicKey, BTreeMap<ClaimId, Vec<u64>>>,
}

impl<'a, T: crate::store::Access> StakeAccumulatorCache<'a, T> {
    pub fn new(view: &'a T) -> Self {
        Self {
            view,
            dirty: BTreeMap::new(),
        }
    }

    fn load(&mut self, account: &PublicKey) -> &mut BTreeMap<ClaimId, Vec<u64>> {
        self.dirty.entry(*account).or_insert_with(|| {
            self.view
                .get_raw(TABLE_CLAIMS, &claims_key(account))
                .map(|bytes| {
                    serde_json::from_slice(&bytes).expect("stake claims are always well-formed")
                })
                .unwrap_or_default()
        })
    }

    fn claim_sum(claims: &BTreeMap<ClaimId, Vec<u64>>) -> u64 {
        claims.values().flatten().sum()
    }

    /// Associates `thresholds` with `claim_id` against `account`.
    /// Fails with [`Error::InsufficientStake`] if the account's total
    /// committed thresholds, claim included, exceed its escrow balance.
    pub fn add_claim(
        &mut self,
        ledger: &dyn StakeLedger,
        account: &PublicKey,
        claim_id: ClaimId,
        thresholds: Vec<u64>,
    ) -> Result<(), Error> {
        let balance = ledger.escrow_balance(account);
        let claims = self.load(account);
        let mut candidate = claims.clone();
        candidate.insert(claim_id.clone(), thresholds.clone());
        if Self::claim_sum(&candidate) > balance {
            return Err(Error::InsufficientStake);
        }
        claims.insert(claim_id, thresholds);
        Ok(())
    }

    /// Removes a claim. Absence is not an error in the general case —
    /// callers that rely on the claim having been added earlier in the
    /// same transaction (deregistration) must use
    /// [`Self::remove_claim_or_panic`] instead.
    pub fn remove_claim(&mut self, account: &PublicKey, claim_id: &ClaimId) {
        self.load(account).remove(claim_id);
    }

    /// As [`Self::remove_claim`], but a missing claim is a fatal
    /// invariant break: the claim should always have been added by the
    /// matching registration. Preserves the original implementation's
    /// panic semantics (spec §9) rather than surfacing a recoverable
    /// error, so that a replica which hits this halts deterministically
    /// instead of silently diverging.
    pub fn remove_claim_or_panic(&mut self, account: &PublicKey, claim_id: &ClaimId) {
        let claims = self.load(account);
        if claims.remove(claim_id).is_none() {
            panic!(
                "stake accumulator invariant violated: missing claim {:?} for account {}",
                claim_id, account
            );
        }
    }

    /// Recomputes the claim sum for `account` without mutating
    /// anything, reporting whether it still fits the escrow balance.
    pub fn check_claims(&mut self, ledger: &dyn StakeLedger, account: &PublicKey) -> bool {
        let balance = ledger.escrow_balance(account);
        let sum = Self::claim_sum(self.load(account));
        sum <= balance
    }

    /// Flushes every touched account back to the store.
    pub fn commit(self)
    where
        T: crate::store::AccessMut,
    {
        for (account, claims) in self.dirty {
            let bytes = serde_json::to_vec(&claims).expect("stake claims are always serializable");
            self.view.put_raw(TABLE_CLAIMS, claims_key(&account), bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDb;

    struct FixedLedger(u64);
    impl StakeLedger for FixedLedger {
        fn escrow_balance(&self, _account: &PublicKey) -> u64 {
            self.0
        }
    }

    #[test]
    fn add_claim_rejects_when_balance_insufficient() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let mut cache = StakeAccumulatorCache::new(&fork);
        let ledger = FixedLedger(100);
        let account = PublicKey([7; 32]);

        assert!(cache
            .add_claim(&ledger, &account, ClaimId::RegisterEntity, vec![50])
            .is_ok());
        let err = cache
            .add_claim(
                &ledger,
                &account,
                ClaimId::RegisterNode(PublicKey([9; 32])),
                vec![60],
            )
            .unwrap_err();
        assert_eq!(err, Error::InsufficientStake);
    }

    #[test]
    fn remove_claim_or_panic_panics_on_missing_claim() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let mut cache = StakeAccumulatorCache::new(&fork);
        let account = PublicKey([7; 32]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.remove_claim_or_panic(&account, &ClaimId::RegisterEntity);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn commit_persists_claims_across_cache_instances() {
        let db = MemoryDb::new();
        let fork = db.fork();
        let ledger = FixedLedger(1000);
        let account = PublicKey([3; 32]);
        {
            let mut cache = StakeAccumulatorCache::new(&fork);
            cache
                .add_claim(&ledger, &account, ClaimId::RegisterEntity, vec![10])
                .unwrap();
            cache.commit();
        }
        let mut cache = StakeAccumulatorCache::new(&fork);
        assert!(cache.check_claims(&ledger, &account));
    }
}

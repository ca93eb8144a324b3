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

//! Entity descriptor verification (spec §4.3 "Entity").

use std::collections::BTreeSet;

use crate::crypto::PublicKey;
use crate::entity::{Entity, LATEST_ENTITY_DESCRIPTOR_VERSION};
use crate::error::Error;

/// Checks a freshly-submitted entity descriptor: the key is not
/// blacklisted, the descriptor version is current, and the node list
/// carries no duplicates.
pub fn verify(entity: &Entity, blacklist: &BTreeSet<PublicKey>) -> Result<(), Error> {
    if blacklist.contains(&entity.id) {
        return Err(Error::Forbidden);
    }
    if entity.version != LATEST_ENTITY_DESCRIPTOR_VERSION {
        return Err(Error::InvalidArgument);
    }
    let unique: BTreeSet<&PublicKey> = entity.nodes.iter().collect();
    if unique.len() != entity.nodes.len() {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entity {
        Entity {
            version: LATEST_ENTITY_DESCRIPTOR_VERSION,
            id: PublicKey([1; 32]),
            nodes: vec![PublicKey([2; 32]), PublicKey([3; 32])],
            allow_entity_signed_nodes: false,
        }
    }

    #[test]
    fn rejects_blacklisted_key() {
        let entity = sample();
        let mut blacklist = BTreeSet::new();
        blacklist.insert(entity.id);
        assert_eq!(verify(&entity, &blacklist), Err(Error::Forbidden));
    }

    #[test]
    fn rejects_duplicate_node_list() {
        let mut entity = sample();
        entity.nodes.push(entity.nodes[0]);
        assert_eq!(verify(&entity, &BTreeSet::new()), Err(Error::InvalidArgument));
    }

    #[test]
    fn accepts_well_formed_entity() {
        let entity = sample();
        assert_eq!(verify(&entity, &BTreeSet::new()), Ok(()));
    }
}

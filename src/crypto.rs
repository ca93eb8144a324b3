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

//! Cryptography related types and functions.
//!
//! Signature and hashing *primitives* are an external collaborator of the
//! registry core (see the crate's top-level docs): this module only
//! defines the opaque types the rest of the crate passes around, plus
//! the small set of free functions the registry logic itself needs
//! (hashing for draw keys, signature verification for descriptors).

use std::convert::TryInto;
use std::fmt;

use ed25519_dalek::Verifier;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of bytes in a [`PublicKey`].
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// Number of bytes in a [`Hash`].
pub const HASH_LENGTH: usize = 32;
/// Number of bytes in a [`Signature`].
pub const SIGNATURE_LENGTH: usize = 64;

/// An ed25519 public key, doubling as the identifier of entities, nodes,
/// and the accounts their stake claims are booked against.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(PublicKey)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A detached ed25519 signature.
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..4]))
    }
}

/// A SHA-256 digest, used for deterministic draw keys and content hashes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Hash(pub [u8; HASH_LENGTH]);

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Computes the SHA-256 hash of a byte slice.
pub fn hash(data: &[u8]) -> Hash {
    let digest = Sha256::digest(data);
    let mut out = [0u8; HASH_LENGTH];
    out.copy_from_slice(&digest);
    Hash(out)
}

/// Verifies a detached signature over `data` under `public_key`.
///
/// Returns `false` on a malformed key/signature rather than erroring —
/// callers treat an unverifiable descriptor the same as an incorrectly
/// signed one.
pub fn verify(sig: &Signature, data: &[u8], public_key: &PublicKey) -> bool {
    let key = match ed25519_dalek::PublicKey::from_bytes(&public_key.0) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = match ed25519_dalek::Signature::from_bytes(&sig.0) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    key.verify(data, &signature).is_ok()
}

/// Derives the synthetic account address a runtime's own messages are
/// attributed to — used both to authorize runtime-governed descriptor
/// updates and to re-target the caller when routing runtime messages
/// (spec §4.4, §4.6).
pub fn runtime_address(id: &Hash) -> PublicKey {
    let mut buf = Vec::with_capacity(b"runtime-address".len() + HASH_LENGTH);
    buf.extend_from_slice(b"runtime-address");
    buf.extend_from_slice(&id.0);
    PublicKey(hash(&buf).0)
}

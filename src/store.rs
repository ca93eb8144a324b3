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

//! Typed access to the replicated key-value store.
//!
//! The actual Merkleized store (proofs, checkpoints to disk, snapshots
//! shared across consensus rounds) is an external collaborator — see
//! the crate root docs. What lives here is the same split exonum's
//! `blockchain::schema` module uses: a read-only [`Access`] a component
//! can build a `Schema` over, and a read-write [`Fork`] a transaction
//! handler commits through. [`MemoryDb`] is the in-memory test double
//! (cf. exonum's `TemporaryDB`) production code swaps for the real
//! store behind the same trait.

use std::cell::RefCell;
use std::collections::BTreeMap;

/// Read-only access to a table keyed by raw bytes.
pub trait Access {
    fn get_raw(&self, table: &str, key: &[u8]) -> Option<Vec<u8>>;

    fn contains_raw(&self, table: &str, key: &[u8]) -> bool {
        self.get_raw(table, key).is_some()
    }

    /// All keys currently present in `table`, in ascending byte order.
    fn keys_raw(&self, table: &str) -> Vec<Vec<u8>>;
}

/// Read-write access. Every write is journaled so an enclosing
/// [`Checkpoint`] can roll it back.
pub trait AccessMut: Access {
    fn put_raw(&self, table: &str, key: Vec<u8>, value: Vec<u8>);
    fn remove_raw(&self, table: &str, key: &[u8]);
}

impl<A: Access + ?Sized> Access for &A {
    fn get_raw(&self, table: &str, key: &[u8]) -> Option<Vec<u8>> {
        (**self).get_raw(table, key)
    }

    fn keys_raw(&self, table: &str) -> Vec<Vec<u8>> {
        (**self).keys_raw(table)
    }
}

impl<A: AccessMut + ?Sized> AccessMut for &A {
    fn put_raw(&self, table: &str, key: Vec<u8>, value: Vec<u8>) {
        (**self).put_raw(table, key, value)
    }

    fn remove_raw(&self, table: &str, key: &[u8]) {
        (**self).remove_raw(table, key)
    }
}

/// An in-memory backing store. Single-threaded by design — the core
/// never needs concurrent access (see the concurrency model in the
/// crate docs): each block, and each transaction within it, runs to
/// completion before the next one starts.
#[derive(Debug, Default)]
pub struct MemoryDb {
    tables: RefCell<BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DbSnapshot<'_> {
        DbSnapshot { db: self }
    }

    pub fn fork(&self) -> Fork<'_> {
        Fork {
            db: self,
            journal: RefCell::new(vec![Vec::new()]),
        }
    }
}

/// A read-only view of a [`MemoryDb`] at the current moment.
pub struct DbSnapshot<'a> {
    db: &'a MemoryDb,
}

impl Access for DbSnapshot<'_> {
    fn get_raw(&self, table: &str, key: &[u8]) -> Option<Vec<u8>> {
        self.db.tables.borrow().get(table)?.get(key).cloned()
    }

    fn keys_raw(&self, table: &str) -> Vec<Vec<u8>> {
        self.db
            .tables
            .borrow()
            .get(table)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }
}

enum JournalOp {
    Write {
        table: String,
        key: Vec<u8>,
        prev: Option<Vec<u8>>,
    },
}

/// A writable view of a [`MemoryDb`], with a stack of nested rollback
/// checkpoints (see [`Checkpoint`]). Writes made directly through the
/// fork (outside of any checkpoint) are journaled into the bottom
/// frame of the stack and are only undone if the whole fork is
/// discarded — which this crate never does, since a transaction that
/// reaches its own top-level `Fork` has already passed verification.
pub struct Fork<'a> {
    db: &'a MemoryDb,
    journal: RefCell<Vec<Vec<JournalOp>>>,
}

impl Access for Fork<'_> {
    fn get_raw(&self, table: &str, key: &[u8]) -> Option<Vec<u8>> {
        self.db.tables.borrow().get(table)?.get(key).cloned()
    }

    fn keys_raw(&self, table: &str) -> Vec<Vec<u8>> {
        self.db
            .tables
            .borrow()
            .get(table)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl AccessMut for Fork<'_> {
    fn put_raw(&self, table: &str, key: Vec<u8>, value: Vec<u8>) {
        let prev = self
            .db
            .tables
            .borrow_mut()
            .entry(table.to_owned())
            .or_default()
            .insert(key.clone(), value);
        self.journal
            .borrow_mut()
            .last_mut()
            .expect("fork always has at least one journal frame")
            .push(JournalOp::Write {
                table: table.to_owned(),
                key,
                prev,
            });
    }

    fn remove_raw(&self, table: &str, key: &[u8]) {
        let prev = self
            .db
            .tables
            .borrow_mut()
            .get_mut(table)
            .and_then(|t| t.remove(key));
        self.journal
            .borrow_mut()
            .last_mut()
            .expect("fork always has at least one journal frame")
            .push(JournalOp::Write {
                table: table.to_owned(),
                key: key.to_owned(),
                prev,
            });
    }
}

impl<'a> Fork<'a> {
    /// Opens a new rollback scope. Mirrors the design note: "a scoped
    /// acquisition of a rollback journal with guaranteed release on
    /// all exit paths". Drop without `commit()` replays the journal in
    /// reverse and restores the prior values.
    pub fn checkpoint<'f>(&'f self) -> Checkpoint<'f, 'a> {
        self.journal.borrow_mut().push(Vec::new());
        Checkpoint {
            fork: self,
            committed: false,
        }
    }
}

/// RAII rollback scope over a [`Fork`]. See [`Fork::checkpoint`].
pub struct Checkpoint<'f, 'a> {
    fork: &'f Fork<'a>,
    committed: bool,
}

impl<'f, 'a> Checkpoint<'f, 'a> {
    /// Finalizes the changes made under this checkpoint by folding
    /// them into the parent frame (so an outer checkpoint can still
    /// roll them back, but this one no longer will).
    pub fn commit(mut self) {
        self.committed = true;
        let mut journal = self.fork.journal.borrow_mut();
        let frame = journal.pop().expect("checkpoint frame must be present");
        if let Some(parent) = journal.last_mut() {
            parent.extend(frame);
        }
    }
}

impl Drop for Checkpoint<'_, '_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let frame = {
            let mut journal = self.fork.journal.borrow_mut();
            journal.pop().expect("checkpoint frame must be present")
        };
        let mut tables = self.fork.db.tables.borrow_mut();
        for op in frame.into_iter().rev() {
            match op {
                JournalOp::Write { table, key, prev } => match prev {
                    Some(value) => {
                        tables.entry(table).or_default().insert(key, value);
                    }
                    None => {
                        if let Some(t) = tables.get_mut(&table) {
                            t.remove(&key);
                        }
                    }
                },
            }
        }
    }
}

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

//! Structured errors for the registry core.
//!
//! Every variant carries a stable numeric code within the `"registry"`
//! module tag, mirroring the `#[derive(Fail)]` / `ExecutionError`
//! pattern the example service backends use (see
//! `examples/cryptocurrency-advanced/backend/src/transactions.rs` in
//! the teacher repo) — except ported to `thiserror`, which is the
//! derive macro the newer components in this family (`exonum-node`)
//! already depend on.

use thiserror::Error;

/// Module tag attached to every emitted error and message event.
pub const MODULE_NAME: &str = "registry";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument = 1,
    #[error("forbidden")]
    Forbidden = 2,
    #[error("incorrect transaction signer")]
    IncorrectTxSigner = 3,
    #[error("no such entity")]
    NoSuchEntity = 4,
    #[error("no such node")]
    NoSuchNode = 5,
    #[error("no such runtime")]
    NoSuchRuntime = 6,
    #[error("entity has nodes")]
    EntityHasNodes = 7,
    #[error("entity has runtimes")]
    EntityHasRuntimes = 8,
    #[error("node is expired")]
    NodeExpired = 9,
    #[error("node cannot be unfrozen yet")]
    NodeCannotBeUnfrozen = 10,
    #[error("bad entity for node")]
    BadEntityForNode = 11,
    #[error("insufficient stake")]
    InsufficientStake = 12,
    #[error("invalid genesis")]
    InvalidGenesis = 13,
    #[error("no subscribers")]
    NoSubscribers = 14,
}

impl Error {
    /// The numeric code carried verbatim into message events.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// The `(module, code)` pair a message event records for an outcome,
/// with `code == 0` reserved for success (see [`crate::messages`]).
pub type ErrorCode = (&'static str, u16);

/// Returns the `(module, code)` pair for any error, with `Error`
/// itself reporting its own module/code and everything else falling
/// back to a generic `("unknown", 0xffff)` pair — this is what lets
/// the runtime message router record an outcome for errors raised by
/// other applications without needing to know their error types.
pub fn error_code(err: &anyhow::Error) -> ErrorCode {
    if let Some(e) = err.downcast_ref::<Error>() {
        return (MODULE_NAME, e.code());
    }
    ("unknown", 0xffff)
}

/// A transaction-level execution result. Handlers return this instead
/// of a bare `Result<(), Error>` so that errors raised by collaborating
/// applications (which this crate does not define) can still flow
/// through uniformly.
pub type ExecutionResult = Result<(), anyhow::Error>;

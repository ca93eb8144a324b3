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

//! Height and epoch primitives.
//!
//! Both are externally driven (consensus supplies the height, the
//! beacon application supplies the epoch); this crate only needs the
//! small amount of arithmetic the registry logic performs on them.

/// A block height. Heights start at zero, as in the teacher's own
/// `Height` helper (`exonum/src/helpers/types.rs`).
pub type Height = u64;

/// An epoch number. `EpochInvalid` is the sentinel value meaning "not
/// yet assigned" / "never eligible", matching the original's
/// `beacon.EpochInvalid`.
pub type Epoch = u64;

pub const EPOCH_INVALID: Epoch = u64::MAX;

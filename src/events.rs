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

//! Events emitted by transaction handlers (spec §4.4, §4.6).
//!
//! The consensus driver's real event bus (tags, indexing, subscriber
//! delivery for light clients) is an external collaborator; handlers
//! here only need somewhere to record "this happened", which is what
//! [`EventSink`] is for.

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash, PublicKey};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    EntityRegistered { entity_id: PublicKey },
    EntityDeregistered { entity_id: PublicKey },
    NodeRegistered { node_id: PublicKey },
    NodeUnfrozen { node_id: PublicKey },
    RuntimeRegistered { runtime_id: Hash },
    /// One outcome per processed runtime message (spec §4.6): the
    /// message's index in its batch, the module that (attempted to)
    /// handle it, and an error code of zero on success.
    Message {
        index: u32,
        module: &'static str,
        code: u16,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Messages the registry publishes for other applications (roothash,
/// key-manager) to react to — distinct from the [`crate::messages`]
/// router, which carries messages in the opposite direction (a runtime
/// publishing to the registry and other apps). Spec §4.4 steps h/i.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMessage {
    NewRuntimeRegistered { runtime_id: Hash },
    RuntimeUpdated { runtime_id: Hash },
    RuntimeResumed { runtime_id: Hash },
}

pub trait AppMessageBus {
    fn publish(&mut self, message: AppMessage);
}

#[derive(Debug, Default)]
pub struct AppMessageLog(pub Vec<AppMessage>);

impl AppMessageBus for AppMessageLog {
    fn publish(&mut self, message: AppMessage) {
        self.0.push(message);
    }
}

/// Collects events in order — the concrete sink used by tests and by
/// any caller that just wants the list back.
#[derive(Debug, Default)]
pub struct EventLog(pub Vec<Event>);

impl EventSink for EventLog {
    fn emit(&mut self, event: Event) {
        self.0.push(event);
    }
}

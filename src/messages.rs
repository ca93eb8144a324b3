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

//! Runtime Message Router (C6, spec §4.6).
//!
//! Routes messages a runtime emitted during a round to whichever
//! applications subscribe to their tag. Delivery and simulation share
//! this same routing logic; they differ only in which
//! [`crate::gas::GasAccountant`] and store view the caller passes in
//! (a no-op accountant and the live fork for delivery, a real
//! accountant and a rolled-back checkpoint for simulation).

use crate::crypto::{runtime_address, Hash, PublicKey};
use crate::error::{error_code, Error};
use crate::events::Event;

/// The tag a runtime message carries. Real payloads (stake transfers,
/// registry updates the runtime wants applied on its behalf) are out
/// of scope here — this crate only needs enough of the message to
/// route it and to know which index it occupied in the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Staking,
    Registry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeMessage {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

/// One application willing to receive messages of a given kind.
pub trait MessageSubscriber {
    fn kind(&self) -> MessageKind;
    fn module_name(&self) -> &'static str;
    fn handle(&mut self, caller: &PublicKey, payload: &[u8]) -> Result<(), anyhow::Error>;
}

/// Routes `messages`, emitted by `runtime_id`, to `subscribers` in
/// index order, re-targeting the caller address once for the whole
/// batch (spec §9 supplemental detail: re-targeting happens once per
/// batch, not per message). Every message produces exactly one
/// [`Event::Message`], success or failure, in input order.
pub fn route(
    runtime_id: &Hash,
    messages: &[RuntimeMessage],
    subscribers: &mut [Box<dyn MessageSubscriber>],
    events: &mut dyn crate::events::EventSink,
) {
    let caller = runtime_address(runtime_id);
    for (index, message) in messages.iter().enumerate() {
        let subscriber = subscribers.iter_mut().find(|s| s.kind() == message.kind);
        let (module, code) = match subscriber {
            None => (crate::error::MODULE_NAME, Error::NoSubscribers.code()),
            Some(sub) => match sub.handle(&caller, &message.payload) {
                Ok(()) => (sub.module_name(), 0),
                Err(err) => error_code(&err),
            },
        };
        events.emit(Event::Message {
            index: index as u32,
            module,
            code,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    struct Echo;
    impl MessageSubscriber for Echo {
        fn kind(&self) -> MessageKind {
            MessageKind::Staking
        }
        fn module_name(&self) -> &'static str {
            "staking"
        }
        fn handle(&mut self, _caller: &PublicKey, payload: &[u8]) -> Result<(), anyhow::Error> {
            if payload == b"fail" {
                return Err(Error::InvalidArgument.into());
            }
            Ok(())
        }
    }

    #[test]
    fn unsubscribed_kind_reports_no_subscribers() {
        let mut subscribers: Vec<Box<dyn MessageSubscriber>> = vec![Box::new(Echo)];
        let mut events = EventLog::default();
        let messages = vec![RuntimeMessage {
            kind: MessageKind::Registry,
            payload: vec![],
        }];
        route(&Hash([1; 32]), &messages, &mut subscribers, &mut events);
        assert_eq!(
            events.0,
            vec![Event::Message {
                index: 0,
                module: crate::error::MODULE_NAME,
                code: Error::NoSubscribers.code(),
            }]
        );
    }

    #[test]
    fn every_message_produces_exactly_one_event_in_order() {
        let mut subscribers: Vec<Box<dyn MessageSubscriber>> = vec![Box::new(Echo)];
        let mut events = EventLog::default();
        let messages = vec![
            RuntimeMessage {
                kind: MessageKind::Staking,
                payload: b"ok".to_vec(),
            },
            RuntimeMessage {
                kind: MessageKind::Staking,
                payload: b"fail".to_vec(),
            },
        ];
        route(&Hash([1; 32]), &messages, &mut subscribers, &mut events);
        assert_eq!(events.0.len(), 2);
        assert_eq!(
            events.0[0],
            Event::Message { index: 0, module: "staking", code: 0 }
        );
        assert_eq!(
            events.0[1],
            Event::Message {
                index: 1,
                module: "registry",
                code: Error::InvalidArgument.code(),
            }
        );
    }
}

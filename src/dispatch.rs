//! # Subscription Dispatcher
//!
//! Every settable property is subscribed once, on its `set` topic, while the
//! device starts. Incoming messages are routed back by parsing the topic,
//! decoding the payload with the property's codec, and handing the decoded value
//! to the property's handler.
//!
//! # Update Pattern
//!
//! Handlers never touch the device or the transport. They queue changes on an
//! [`UpdateOutbox`], and the device applies those changes after the handler
//! returns, through the same path as its public mutators and under the same
//! lock. A payload that fails to decode never reaches the handler.

use alloc::string::String;
use alloc::vec::Vec;

use crate::codec::{DecodeError, Value};
use crate::meta::Meta;
use crate::model::Device;
use crate::state::State;
use crate::topic::Topics;
use crate::transport::HomieTransport;

/// A change queued by a set handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Value { property: String, value: Value },
    Meta { property: String, meta: Meta },
    State(State),
}

/// Collects the changes a set handler wants to make.
///
/// # Example
///
/// ```ignore
/// PropertyDescription::boolean("power").on_set(|value, updates| {
///     relay.set(value.as_bool() == Some(true));
///     updates.set_value("power", value.clone());
/// })
/// ```
#[derive(Debug, Default)]
pub struct UpdateOutbox {
    updates: Vec<Update>,
}

impl UpdateOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a value change, usually echoing the accepted command.
    ///
    /// A bare property id refers to the handler's own node when that node has
    /// it; `node/property` reaches any property.
    pub fn set_value(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        self.updates.push(Update::Value {
            property: property.into(),
            value: value.into(),
        });
    }

    /// Queues a metadata replacement. Ids no longer present are cleared on the
    /// broker.
    pub fn set_meta(&mut self, property: impl Into<String>, meta: impl Into<Meta>) {
        self.updates.push(Update::Meta {
            property: property.into(),
            meta: meta.into(),
        });
    }

    /// Queues a `$state` change.
    pub fn set_state(&mut self, state: State) {
        self.updates.push(Update::State(state));
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Removes and returns the queued changes in the order they were queued.
    pub fn drain(&mut self) -> impl Iterator<Item = Update> + '_ {
        self.updates.drain(..)
    }
}

/// What happened to an incoming message.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The topic is not the `set` topic of a settable property of this device.
    Ignored,
    /// The payload did not decode; the handler was not invoked.
    Rejected { property: String, error: DecodeError },
    /// The handler was invoked with `value`.
    Delivered { property: String, value: Value },
}

/// The `set` topics a device is subscribed to.
#[derive(Debug, Default)]
pub(crate) struct Dispatcher {
    subscriptions: Vec<String>,
}

impl Dispatcher {
    /// Collects the `set` topic of every settable property, in declaration order.
    pub(crate) fn new(device: &Device, topics: &Topics) -> Self {
        let subscriptions = device
            .properties()
            .filter(|(_, property)| property.settable())
            .map(|(node, property)| topics.set(node.id(), property.id()))
            .collect();
        Self { subscriptions }
    }

    pub(crate) async fn subscribe<T: HomieTransport>(
        &self,
        transport: &mut T,
    ) -> Result<(), T::Error> {
        for topic in &self.subscriptions {
            debug!("subscribing to {}", topic.as_str());
            transport.subscribe(topic).await?;
        }
        Ok(())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.subscriptions.iter().map(String::as_str)
    }

    /// Routes one incoming message to its property's handler.
    ///
    /// Changes the handler queues are left in `updates` for the caller to apply.
    pub(crate) fn dispatch(
        &self,
        device: &mut Device,
        topics: &Topics,
        topic: &str,
        payload: &[u8],
        updates: &mut UpdateOutbox,
    ) -> Dispatch {
        let Some((node, property)) = topics.parse_set(topic) else {
            return Dispatch::Ignored;
        };
        let Some(slot) = device.slot_of(node, property) else {
            debug!("set for unknown property {}/{}", node, property);
            return Dispatch::Ignored;
        };

        let target = device.property_mut(slot);
        if !target.settable() {
            debug!("set for read-only property {}/{}", node, property);
            return Dispatch::Ignored;
        }

        let decoded = core::str::from_utf8(payload)
            .map_err(|_| DecodeError::InvalidUtf8)
            .and_then(|text| target.kind().decode(text));
        let value = match decoded {
            Ok(value) => value,
            Err(error) => {
                warn!("rejected set on {}/{}: {}", node, property, error);
                return Dispatch::Rejected {
                    property: property.into(),
                    error,
                };
            }
        };

        if let Some(handler) = target.handler_mut() {
            handler(&value, updates);
        }
        Dispatch::Delivered {
            property: property.into(),
            value,
        }
    }
}

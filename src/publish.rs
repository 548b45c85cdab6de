//! # Publication Engine
//!
//! Turns the device model into MQTT publishes.
//!
//! The engine never talks to the transport itself. Every function here writes
//! to a [`PublishOutbox`], and the device flushes a [`BufferedOutbox`] to the
//! transport afterwards. This keeps topic and payload construction synchronous
//! and testable without a broker.
//!
//! Every attribute publish is retained. Value publishes follow the property's
//! `retained` flag.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::codec::encode_bool;
use crate::meta::Meta;
use crate::model::{Device, Node, Property};
use crate::state::State;
use crate::topic::{HOMIE_VERSION, Topics, attr};
use crate::transport::HomieTransport;

/// Sink for publish requests.
pub trait PublishOutbox {
    /// Queue a publish of `payload` on `topic`.
    fn publish(&mut self, topic: String, payload: String, retain: bool);
}

/// A publish request with owned topic and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPublishRequest {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// An outbox that buffers requests until they are flushed to a transport.
#[derive(Debug, Default)]
pub struct BufferedOutbox {
    requests: Vec<OwnedPublishRequest>,
}

impl BufferedOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Buffered requests in publish order.
    pub fn requests(&self) -> &[OwnedPublishRequest] {
        &self.requests
    }

    /// Publishes every buffered request in order.
    ///
    /// Stops at the first transport error. The buffer is empty afterwards
    /// either way; requests after the failing one are discarded.
    pub async fn flush<T: HomieTransport>(&mut self, transport: &mut T) -> Result<usize, T::Error> {
        let mut published = 0;
        for request in self.requests.drain(..) {
            trace!("publish {} = {}", request.topic.as_str(), request.payload.as_str());
            transport
                .publish(&request.topic, request.payload.as_bytes(), request.retain)
                .await?;
            published += 1;
        }
        Ok(published)
    }
}

impl PublishOutbox for BufferedOutbox {
    fn publish(&mut self, topic: String, payload: String, retain: bool) {
        self.requests.push(OwnedPublishRequest {
            topic,
            payload,
            retain,
        });
    }
}

/// `$state`.
pub fn state(topics: &Topics, state: State, out: &mut impl PublishOutbox) {
    out.publish(topics.device(attr::STATE), state.to_string(), true);
}

/// The full announcement: device attributes, then every node with its
/// properties.
///
/// `$state` is not part of it. The device publishes `init` before and
/// `ready` after.
pub fn announce(topics: &Topics, device: &Device, out: &mut impl PublishOutbox) {
    out.publish(topics.device(attr::HOMIE), HOMIE_VERSION.into(), true);
    out.publish(topics.device(attr::NAME), device.name().into(), true);
    out.publish(topics.device(attr::EXTENSIONS), String::new(), true);
    out.publish(topics.device(attr::NODES), device.encode_nodes(), true);

    for node in device.nodes() {
        self::node(topics, node, out);
    }
}

/// A node's attributes followed by all of its properties.
pub fn node(topics: &Topics, node: &Node, out: &mut impl PublishOutbox) {
    let id = node.id();
    out.publish(topics.node(id, attr::NAME), node.name().into(), true);
    out.publish(topics.node(id, attr::TYPE), node.node_type().into(), true);
    out.publish(topics.node(id, attr::PROPERTIES), node.encode_properties(), true);

    for property in node.properties() {
        self::property(topics, node, property, out);
    }
}

/// A property's attributes. `$unit` and `$format` only when present, metadata
/// only when non-empty.
pub fn property(topics: &Topics, node: &Node, property: &Property, out: &mut impl PublishOutbox) {
    let (n, p) = (node.id(), property.id());
    out.publish(topics.property(n, p, attr::NAME), property.name().into(), true);
    out.publish(
        topics.property(n, p, attr::DATATYPE),
        property.datatype().as_str().into(),
        true,
    );
    out.publish(
        topics.property(n, p, attr::SETTABLE),
        encode_bool(property.settable()).into(),
        true,
    );
    out.publish(
        topics.property(n, p, attr::RETAINED),
        encode_bool(property.retained()).into(),
        true,
    );
    if let Some(unit) = property.unit() {
        out.publish(topics.property(n, p, attr::UNIT), unit.into(), true);
    }
    if let Some(format) = property.kind().format() {
        out.publish(topics.property(n, p, attr::FORMAT), format, true);
    }
    if !property.meta().is_empty() {
        meta(topics, node, property, out);
    }
}

/// The complete metadata topic set of a property: the id list, then `$key`
/// and `$value` of every entry with an id. Entries sharing an id are published
/// in order, so the last one is retained.
pub fn meta(topics: &Topics, node: &Node, property: &Property, out: &mut impl PublishOutbox) {
    let (n, p) = (node.id(), property.id());
    let meta = property.meta();
    out.publish(topics.meta_ids(n, p), meta.encode_ids(), true);
    for entry in meta.entries().filter(|e| !e.id().is_empty()) {
        out.publish(topics.meta_key(n, p, entry.id()), entry.key().into(), true);
        out.publish(topics.meta_value(n, p, entry.id()), entry.value().into(), true);
    }
}

/// Republishes a property's metadata after a change and clears the retained
/// `$key`/`$value` of every id present in `previous` but gone now.
pub fn meta_update(
    topics: &Topics,
    node: &Node,
    property: &Property,
    previous: &Meta,
    out: &mut impl PublishOutbox,
) {
    meta(topics, node, property, out);

    let (n, p) = (node.id(), property.id());
    let current = property.meta().ids();
    for stale in previous.ids().into_iter().filter(|id| !current.contains(id)) {
        out.publish(topics.meta_key(n, p, stale), String::new(), true);
        out.publish(topics.meta_value(n, p, stale), String::new(), true);
    }
}

/// The current value of a property, if it has one.
pub fn value(topics: &Topics, node: &Node, property: &Property, out: &mut impl PublishOutbox) {
    if let Some(value) = property.value() {
        out.publish(
            topics.value(node.id(), property.id()),
            value.encode(),
            property.retained(),
        );
    }
}

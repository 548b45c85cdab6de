//! # Topic Schema
//!
//! Builds the Homie 4 topics of one device and parses its `set` topics.
//!
//! ```text
//! {prefix}/{device}/$homie | $name | $state | $nodes | $extensions
//! {prefix}/{device}/{node}/$name | $type | $properties
//! {prefix}/{device}/{node}/{property}                  value
//! {prefix}/{device}/{node}/{property}/set              command
//! {prefix}/{device}/{node}/{property}/$name | $datatype | $settable | $retained | $unit | $format
//! {prefix}/{device}/{node}/{property}/$meta/...        metadata
//! ```

use alloc::string::String;
use heapless::Vec;

/// Attribute names defined by the convention.
pub mod attr {
    pub const HOMIE: &str = "$homie";
    pub const NAME: &str = "$name";
    pub const STATE: &str = "$state";
    pub const NODES: &str = "$nodes";
    pub const EXTENSIONS: &str = "$extensions";

    pub const TYPE: &str = "$type";
    pub const PROPERTIES: &str = "$properties";

    pub const DATATYPE: &str = "$datatype";
    pub const SETTABLE: &str = "$settable";
    pub const RETAINED: &str = "$retained";
    pub const UNIT: &str = "$unit";
    pub const FORMAT: &str = "$format";
    pub const SET: &str = "set";

    pub const META: &str = "$meta";
    pub const META_IDS: &str = "$mainkey-ids";
    pub const META_KEY: &str = "$key";
    pub const META_VALUE: &str = "$value";
}

/// The Homie convention version published on `$homie`.
pub const HOMIE_VERSION: &str = "4.0.0";

/// Default root topic.
pub const DEFAULT_PREFIX: &str = "homie";

/// Topic builder for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// `{prefix}/{device}`
    base: String,
}

impl Topics {
    /// Topics of `device_id` under the root `prefix`.
    pub fn new(prefix: &str, device_id: &str) -> Self {
        Self {
            base: join(prefix, &[device_id]),
        }
    }

    /// `{prefix}/{device}`
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{prefix}/{device}/{attribute}`
    pub fn device(&self, attribute: &str) -> String {
        join(&self.base, &[attribute])
    }

    /// `{prefix}/{device}/{node}/{attribute}`
    pub fn node(&self, node: &str, attribute: &str) -> String {
        join(&self.base, &[node, attribute])
    }

    /// `{prefix}/{device}/{node}/{property}`, the value topic.
    pub fn value(&self, node: &str, property: &str) -> String {
        join(&self.base, &[node, property])
    }

    /// `{prefix}/{device}/{node}/{property}/{attribute}`
    pub fn property(&self, node: &str, property: &str, attribute: &str) -> String {
        join(&self.base, &[node, property, attribute])
    }

    /// `{prefix}/{device}/{node}/{property}/set`
    pub fn set(&self, node: &str, property: &str) -> String {
        self.property(node, property, attr::SET)
    }

    /// `.../{property}/$meta/$mainkey-ids`
    pub fn meta_ids(&self, node: &str, property: &str) -> String {
        join(&self.base, &[node, property, attr::META, attr::META_IDS])
    }

    /// `.../{property}/$meta/{id}/$key`
    pub fn meta_key(&self, node: &str, property: &str, id: &str) -> String {
        join(&self.base, &[node, property, attr::META, id, attr::META_KEY])
    }

    /// `.../{property}/$meta/{id}/$value`
    pub fn meta_value(&self, node: &str, property: &str, id: &str) -> String {
        join(&self.base, &[node, property, attr::META, id, attr::META_VALUE])
    }

    /// Splits `{prefix}/{device}/{node}/{property}/set` into `(node, property)`.
    ///
    /// Returns `None` for any other topic, including topics of other devices.
    pub fn parse_set<'t>(&self, topic: &'t str) -> Option<(&'t str, &'t str)> {
        let rest = topic.strip_prefix(self.base.as_str())?.strip_prefix('/')?;

        let mut segments: Vec<&str, 3> = Vec::new();
        for segment in rest.split('/') {
            segments.push(segment).ok()?;
        }
        match segments.as_slice() {
            [node, property, attr::SET] if !node.is_empty() && !property.is_empty() => {
                Some((*node, *property))
            }
            _ => None,
        }
    }
}

fn join(head: &str, segments: &[&str]) -> String {
    let len = head.len() + segments.iter().map(|s| s.len() + 1).sum::<usize>();
    let mut topic = String::with_capacity(len);
    topic.push_str(head);
    for segment in segments {
        topic.push('/');
        topic.push_str(segment);
    }
    topic
}

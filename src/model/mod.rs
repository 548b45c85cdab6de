//! # Device Model
//!
//! The validated, in-memory form of a device description. A [`Device`] owns its
//! nodes, each [`Node`] owns its properties, and the device keeps a flat
//! property-id index for lookups by id alone.
//!
//! Property ids only need to be unique within their node. When two nodes share
//! an id the flat index points at the one declared last; a `node/property`
//! path always reaches the exact property.
//!
//! The model never publishes. Mutations return the location of the changed
//! property so the caller can hand it to the publication engine.

mod node;
mod property;

pub use node::Node;
pub use property::Property;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::codec::Value;
use crate::description::DeviceDescription;
use crate::error::{ConstructionError, PropertyError};
use crate::id;
use crate::meta::Meta;
use crate::state::State;

/// Position of a property inside the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub node: usize,
    pub property: usize,
}

/// A validated Homie device.
#[derive(Debug)]
pub struct Device {
    id: String,
    name: String,
    nodes: Vec<Node>,
    state: State,
    index: BTreeMap<String, Slot>,
}

impl Device {
    /// Validates `description` and builds the device in one pass.
    ///
    /// Fails on invalid ids, duplicate node ids, property ids used twice in
    /// one node, and malformed property constraints, initial values or
    /// metadata. No partially built device is ever returned.
    pub fn build(description: DeviceDescription) -> Result<Self, ConstructionError> {
        let DeviceDescription {
            id,
            name,
            nodes: descriptions,
        } = description;

        if !id::is_valid(&id) {
            return Err(ConstructionError::InvalidId(id));
        }

        let mut nodes: Vec<Node> = Vec::with_capacity(descriptions.len());
        let mut index = BTreeMap::new();
        for description in descriptions {
            let node = Node::build(description)?;
            if nodes.iter().any(|n| n.id() == node.id()) {
                return Err(ConstructionError::DuplicateNode(node.id().into()));
            }
            for (property, p) in node.properties().iter().enumerate() {
                let slot = Slot {
                    node: nodes.len(),
                    property,
                };
                if index.insert(String::from(p.id()), slot).is_some() {
                    debug!("property {} is shared, indexed under {}", p.id(), node.id());
                }
            }
            nodes.push(node);
        }

        Ok(Self {
            name: name.unwrap_or_else(|| id::default_name(&id)),
            id,
            nodes,
            state: State::Init,
            index,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// The `$nodes` payload: node ids in declaration order.
    pub fn encode_nodes(&self) -> String {
        let ids: Vec<&str> = self.nodes.iter().map(Node::id).collect();
        ids.join(",")
    }

    /// Looks up a property by id, or by `node/property` path.
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.locate(id).map(|(_, property)| property)
    }

    /// Looks up a property by id, or by `node/property` path, and returns it
    /// with its node.
    pub fn locate(&self, id: &str) -> Option<(&Node, &Property)> {
        self.find(id).map(|slot| self.at(slot))
    }

    /// Looks up a property by node id and property id.
    pub fn property_in(&self, node: &str, id: &str) -> Option<&Property> {
        self.node(node)?.property(id)
    }

    /// All properties, node by node, in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&Node, &Property)> {
        self.nodes
            .iter()
            .flat_map(|node| node.properties().iter().map(move |p| (node, p)))
    }

    /// The current value of a property; `None` until first set.
    pub fn value(&self, id: &str) -> Result<Option<&Value>, PropertyError> {
        Ok(self.require(id)?.value())
    }

    /// The metadata of a property as last set.
    pub fn meta(&self, id: &str) -> Result<&Meta, PropertyError> {
        Ok(self.require(id)?.meta())
    }

    pub(crate) fn at(&self, slot: Slot) -> (&Node, &Property) {
        let node = &self.nodes[slot.node];
        (node, &node.properties()[slot.property])
    }

    pub(crate) fn slot_of(&self, node: &str, id: &str) -> Option<Slot> {
        let index = self.nodes.iter().position(|n| n.id() == node)?;
        let property = self.nodes[index]
            .properties()
            .iter()
            .position(|p| p.id() == id)?;
        Some(Slot {
            node: index,
            property,
        })
    }

    /// Resolves an id or `node/property` path. A bare id that exists on the
    /// `scope` node resolves to that node's property.
    pub(crate) fn resolve(&self, scope: Option<&str>, id: &str) -> Result<Slot, PropertyError> {
        scope
            .and_then(|node| self.slot_of(node, id))
            .or_else(|| self.find(id))
            .ok_or_else(|| PropertyError::Unknown(id.into()))
    }

    pub(crate) fn property_mut(&mut self, slot: Slot) -> &mut Property {
        &mut self.nodes[slot.node].properties_mut()[slot.property]
    }

    pub(crate) fn set_value(&mut self, id: &str, value: Value) -> Result<Slot, PropertyError> {
        let slot = self.slot(id)?;
        self.set_value_at(slot, id, value)
    }

    pub(crate) fn set_value_at(
        &mut self,
        slot: Slot,
        id: &str,
        value: Value,
    ) -> Result<Slot, PropertyError> {
        self.property_mut(slot)
            .set_value(value)
            .map_err(|error| PropertyError::InvalidValue {
                property: id.into(),
                error,
            })?;
        Ok(slot)
    }

    /// Replaces a property's metadata and returns the previous mapping.
    pub(crate) fn set_meta(&mut self, id: &str, meta: Meta) -> Result<(Slot, Meta), PropertyError> {
        let slot = self.slot(id)?;
        Ok((slot, self.set_meta_at(slot, meta)))
    }

    pub(crate) fn set_meta_at(&mut self, slot: Slot, meta: Meta) -> Meta {
        self.property_mut(slot).set_meta(meta)
    }

    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// A `node/property` path goes through the node; a bare id through the
    /// flat index.
    fn find(&self, id: &str) -> Option<Slot> {
        match id.split_once('/') {
            Some((node, property)) => self.slot_of(node, property),
            None => self.index.get(id).copied(),
        }
    }

    fn slot(&self, id: &str) -> Result<Slot, PropertyError> {
        self.resolve(None, id)
    }

    fn require(&self, id: &str) -> Result<&Property, PropertyError> {
        self.slot(id).map(|slot| self.at(slot).1)
    }
}

use alloc::string::String;
use alloc::vec::Vec;

use super::property::Property;
use crate::description::NodeDescription;
use crate::error::ConstructionError;
use crate::id;

/// A validated node, owned by one device.
#[derive(Debug)]
pub struct Node {
    id: String,
    name: String,
    node_type: String,
    properties: Vec<Property>,
}

impl Node {
    pub(crate) fn build(description: NodeDescription) -> Result<Self, ConstructionError> {
        let NodeDescription {
            id,
            name,
            node_type,
            properties: descriptions,
        } = description;

        if !id::is_valid(&id) {
            return Err(ConstructionError::InvalidId(id));
        }

        let mut properties: Vec<Property> = Vec::with_capacity(descriptions.len());
        for description in descriptions {
            let property = Property::build(description)?;
            if properties.iter().any(|p| p.id() == property.id()) {
                return Err(ConstructionError::DuplicateProperty {
                    node: id,
                    property: property.id().into(),
                });
            }
            properties.push(property);
        }

        Ok(Self {
            name: name.unwrap_or_else(|| id::default_name(&id)),
            node_type: node_type.unwrap_or_else(|| id.clone()),
            id,
            properties,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `$type` tag.
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id() == id)
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }

    /// The `$properties` payload: property ids in declaration order.
    pub fn encode_properties(&self) -> String {
        let ids: Vec<&str> = self.properties.iter().map(Property::id).collect();
        ids.join(",")
    }
}

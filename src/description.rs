//! Declarative device descriptions.
//!
//! A description is plain data plus set handlers. It is turned into a validated
//! [`Device`](crate::model::Device) exactly once, when the device starts.
//!
//! ```ignore
//! let description = DeviceDescription::new("thermostat")
//!     .node(
//!         NodeDescription::new("heating")
//!             .property(PropertyDescription::float("target").unit("°C").min(5).max(30).on_set(
//!                 |value, updates| updates.set_value("target", value.clone()),
//!             ))
//!             .property(PropertyDescription::enumeration("mode", ["off", "eco", "comfort"])),
//!     );
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::codec::{Bound, Datatype, Value};
use crate::dispatch::UpdateOutbox;
use crate::meta::Meta;

/// Handler invoked with the decoded payload of a property's `set` topic.
///
/// The handler does not change the device directly. It queues changes on the
/// [`UpdateOutbox`], which the device applies right after the handler returns,
/// still holding the device lock.
pub type SetHandler = Box<dyn FnMut(&Value, &mut UpdateOutbox) + Send>;

/// Description of a device: id, optional display name and nodes.
pub struct DeviceDescription {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) nodes: Vec<NodeDescription>,
}

impl DeviceDescription {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            nodes: Vec::new(),
        }
    }

    /// Display name. Defaults to the id, capitalized, with hyphens as spaces.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a node. Nodes are announced in the order they are added.
    pub fn node(mut self, node: NodeDescription) -> Self {
        self.nodes.push(node);
        self
    }
}

/// Description of a node.
pub struct NodeDescription {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) node_type: Option<String>,
    pub(crate) properties: Vec<PropertyDescription>,
}

impl NodeDescription {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            node_type: None,
            properties: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The `$type` tag. Defaults to the node id.
    pub fn node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Appends a property. Properties are announced in the order they are added.
    pub fn property(mut self, property: PropertyDescription) -> Self {
        self.properties.push(property);
        self
    }
}

/// Description of a property.
///
/// The datatype is chosen by the constructor and cannot be changed. Only
/// properties given a handler with [`on_set`](Self::on_set) are settable.
pub struct PropertyDescription {
    pub(crate) id: String,
    pub(crate) datatype: Datatype,
    pub(crate) name: Option<String>,
    pub(crate) unit: Option<String>,
    pub(crate) retained: bool,
    pub(crate) meta: Meta,
    pub(crate) min: Option<Bound>,
    pub(crate) max: Option<Bound>,
    pub(crate) format: Option<String>,
    pub(crate) values: Vec<String>,
    pub(crate) initial_value: Option<Value>,
    pub(crate) handler: Option<SetHandler>,
}

impl PropertyDescription {
    fn new(id: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            id: id.into(),
            datatype,
            name: None,
            unit: None,
            retained: true,
            meta: Meta::new(),
            min: None,
            max: None,
            format: None,
            values: Vec::new(),
            initial_value: None,
            handler: None,
        }
    }

    pub fn integer(id: impl Into<String>) -> Self {
        Self::new(id, Datatype::Integer)
    }

    pub fn float(id: impl Into<String>) -> Self {
        Self::new(id, Datatype::Float)
    }

    pub fn boolean(id: impl Into<String>) -> Self {
        Self::new(id, Datatype::Boolean)
    }

    pub fn string(id: impl Into<String>) -> Self {
        Self::new(id, Datatype::String)
    }

    /// An enum property accepting exactly `values`, published as `$format` in
    /// the given order.
    pub fn enumeration<I, S>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut property = Self::new(id, Datatype::Enum);
        property.values = values.into_iter().map(Into::into).collect();
        property
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Whether value publishes are retained. Defaults to `true`.
    pub fn retained(mut self, retained: bool) -> Self {
        self.retained = retained;
        self
    }

    pub fn meta(mut self, meta: impl Into<Meta>) -> Self {
        self.meta = meta.into();
        self
    }

    /// Lower bound of an integer or float property.
    ///
    /// A range is only published, and only enforced, when both `min` and `max`
    /// are given. A lone bound is ignored.
    pub fn min(mut self, min: impl Into<Bound>) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Upper bound of an integer or float property. See [`min`](Self::min).
    pub fn max(mut self, max: impl Into<Bound>) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Free-form `$format` of a string property.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Value published once the device is announced, right before `ready`.
    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Makes the property settable and installs the handler for its `set` topic.
    pub fn on_set<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Value, &mut UpdateOutbox) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }
}

use alloc::string::String;
use core::fmt;

use crate::codec::{Bound, Datatype, DecodeError, NumericRange, PropertyKind, Value};
use crate::description::{PropertyDescription, SetHandler};
use crate::error::ConstructionError;
use crate::id;
use crate::meta::Meta;

/// A validated property, owned by one node.
pub struct Property {
    id: String,
    name: String,
    kind: PropertyKind,
    unit: Option<String>,
    retained: bool,
    meta: Meta,
    initial_value: Option<Value>,
    value: Option<Value>,
    handler: Option<SetHandler>,
}

impl Property {
    pub(crate) fn build(description: PropertyDescription) -> Result<Self, ConstructionError> {
        let PropertyDescription {
            id,
            datatype,
            name,
            unit,
            retained,
            meta,
            min,
            max,
            format,
            values,
            initial_value,
            handler,
        } = description;

        if !id::is_valid(&id) {
            return Err(ConstructionError::InvalidId(id));
        }

        let unsupported = || ConstructionError::UnsupportedConstraint {
            property: id.clone(),
        };
        let has_bounds = min.is_some() || max.is_some();
        let kind = match datatype {
            Datatype::Integer | Datatype::Float if format.is_some() || !values.is_empty() => {
                return Err(unsupported());
            }
            Datatype::Integer => PropertyKind::Integer {
                range: integer_range(&id, min, max)?,
            },
            Datatype::Float => PropertyKind::Float {
                range: float_range(&id, min, max)?,
            },
            _ if has_bounds => return Err(unsupported()),
            Datatype::Boolean if format.is_some() || !values.is_empty() => {
                return Err(unsupported());
            }
            Datatype::Boolean => PropertyKind::Boolean,
            Datatype::String if !values.is_empty() => return Err(unsupported()),
            Datatype::String => PropertyKind::String { format },
            Datatype::Enum if format.is_some() => return Err(unsupported()),
            Datatype::Enum => {
                let valid = !values.is_empty()
                    && values.iter().enumerate().all(|(i, v)| {
                        !v.is_empty() && !v.contains(',') && !values[..i].contains(v)
                    });
                if !valid {
                    return Err(ConstructionError::InvalidEnumValues { property: id });
                }
                PropertyKind::Enum { values }
            }
        };

        let initial_value = match initial_value {
            Some(value) => match kind.coerce(value) {
                Ok(value) => Some(value),
                Err(error) => {
                    return Err(ConstructionError::InvalidInitialValue { property: id, error });
                }
            },
            None => None,
        };

        meta.report_unpublishable(&id);

        Ok(Self {
            name: name.unwrap_or_else(|| id::default_name(&id)),
            id,
            kind,
            unit,
            retained,
            meta,
            initial_value,
            value: None,
            handler,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn datatype(&self) -> Datatype {
        self.kind.datatype()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Whether value publishes are retained.
    pub fn retained(&self) -> bool {
        self.retained
    }

    /// Whether the property has a set handler.
    pub fn settable(&self) -> bool {
        self.handler.is_some()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The current value; `None` until the first set.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn initial_value(&self) -> Option<&Value> {
        self.initial_value.as_ref()
    }

    /// Checks `value` against the property and stores it.
    pub(crate) fn set_value(&mut self, value: Value) -> Result<&Value, DecodeError> {
        let value = self.kind.coerce(value)?;
        Ok(self.value.insert(value))
    }

    /// Replaces the metadata, returning the previous mapping.
    pub(crate) fn set_meta(&mut self, meta: Meta) -> Meta {
        meta.report_unpublishable(&self.id);
        core::mem::replace(&mut self.meta, meta)
    }

    pub(crate) fn handler_mut(&mut self) -> Option<&mut SetHandler> {
        self.handler.as_mut()
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("unit", &self.unit)
            .field("retained", &self.retained)
            .field("settable", &self.settable())
            .field("meta", &self.meta)
            .field("value", &self.value)
            .finish()
    }
}

fn integer_range(
    property: &str,
    min: Option<Bound>,
    max: Option<Bound>,
) -> Result<Option<NumericRange<i64>>, ConstructionError> {
    let invalid = || ConstructionError::InvalidBound {
        property: property.into(),
    };
    let as_integer = |bound: Option<Bound>| match bound {
        None => Ok(None),
        Some(Bound::Integer(v)) => Ok(Some(v)),
        Some(Bound::Float(_)) => Err(invalid()),
    };
    combine(property, as_integer(min)?, as_integer(max)?, |min, max| min > max)
        .ok_or_else(invalid)
}

/// Float bounds keep their form; integer bounds stay integers in `$format`.
fn float_range(
    property: &str,
    min: Option<Bound>,
    max: Option<Bound>,
) -> Result<Option<NumericRange<Bound>>, ConstructionError> {
    let invalid = || ConstructionError::InvalidBound {
        property: property.into(),
    };
    let finite = |bound: Option<Bound>| match bound {
        Some(Bound::Float(v)) if !v.is_finite() => Err(invalid()),
        bound => Ok(bound),
    };
    combine(property, finite(min)?, finite(max)?, |min, max| {
        min.as_f64() > max.as_f64()
    })
    .ok_or_else(invalid)
}

/// Pairs up two bounds. The outer `None` means `min > max`.
fn combine<T: Copy>(
    property: &str,
    min: Option<T>,
    max: Option<T>,
    inverted: impl Fn(T, T) -> bool,
) -> Option<Option<NumericRange<T>>> {
    match (min, max) {
        (Some(min), Some(max)) if inverted(min, max) => None,
        (Some(min), Some(max)) => Some(Some(NumericRange { min, max })),
        (None, None) => Some(None),
        _ => {
            warn!("property '{}' has only one bound; no range is published", property);
            Some(None)
        }
    }
}

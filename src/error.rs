//! # Error Types
//!
//! Construction errors abort device creation, connect and transport errors
//! surface from the operation that triggered them, and decode errors stay with
//! the dispatcher (see [`crate::dispatch`]).

use alloc::string::String;
use core::fmt;

use crate::codec::DecodeError;

/// The primary error enum of a Homie device.
///
/// It is generic over the transport error type `E`, so transport failures reach
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomieError<E> {
    /// The device description was rejected; no device was created.
    Construction(ConstructionError),
    /// The transport could not reach the broker.
    Connect(ConnectError<E>),
    /// A mutator referred to an unknown property or supplied an invalid value.
    Property(PropertyError),
    /// A publish or subscribe failed. Nothing is retried.
    Transport(E),
}

impl<E> From<ConstructionError> for HomieError<E> {
    fn from(err: ConstructionError) -> Self {
        HomieError::Construction(err)
    }
}

impl<E> From<PropertyError> for HomieError<E> {
    fn from(err: PropertyError) -> Self {
        HomieError::Property(err)
    }
}

impl<E> From<ConnectError<E>> for HomieError<E> {
    fn from(err: ConnectError<E>) -> Self {
        HomieError::Connect(err)
    }
}

impl<E: fmt::Debug> fmt::Display for HomieError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomieError::Construction(err) => write!(f, "invalid device description: {err}"),
            HomieError::Connect(err) => fmt::Display::fmt(err, f),
            HomieError::Property(err) => fmt::Display::fmt(err, f),
            HomieError::Transport(err) => write!(f, "transport error: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for HomieError<E> {}

/// Why a device description could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConstructionError {
    /// An id does not match `[a-z0-9][a-z0-9-]*`.
    InvalidId(String),
    /// Two nodes share an id.
    DuplicateNode(String),
    /// A property id is used twice within one node.
    DuplicateProperty { node: String, property: String },
    /// A numeric bound is not finite, does not fit the datatype, or `min > max`.
    InvalidBound { property: String },
    /// A bound, format or value list was given for a datatype that has none.
    UnsupportedConstraint { property: String },
    /// An enum value list is empty, has duplicates, or a value contains `,`.
    InvalidEnumValues { property: String },
    /// The initial value does not fit the property.
    InvalidInitialValue { property: String, error: DecodeError },
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionError::InvalidId(id) => write!(f, "'{id}' is not a valid Homie id"),
            ConstructionError::DuplicateNode(node) => write!(f, "duplicate node '{node}'"),
            ConstructionError::DuplicateProperty { node, property } => {
                write!(f, "duplicate property '{property}' in node '{node}'")
            }
            ConstructionError::InvalidBound { property } => {
                write!(f, "invalid numeric bound on property '{property}'")
            }
            ConstructionError::UnsupportedConstraint { property } => {
                write!(f, "property '{property}' does not support the given format")
            }
            ConstructionError::InvalidEnumValues { property } => {
                write!(f, "invalid enum values on property '{property}'")
            }
            ConstructionError::InvalidInitialValue { property, error } => {
                write!(f, "invalid initial value for property '{property}': {error}")
            }
        }
    }
}

impl core::error::Error for ConstructionError {}

/// Why the transport did not connect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectError<E> {
    /// The connect step did not finish within the configured timeout.
    Timeout,
    /// The transport reported a failure.
    Transport(E),
}

impl<E: fmt::Debug> fmt::Display for ConnectError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::Timeout => f.write_str("timed out connecting to broker"),
            ConnectError::Transport(err) => write!(f, "could not connect to broker: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for ConnectError<E> {}

/// A rejected mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyError {
    /// No property with this id (or `node/id` path) is registered on the device.
    Unknown(String),
    /// The value does not fit the property; nothing was changed.
    InvalidValue { property: String, error: DecodeError },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::Unknown(id) => write!(f, "unknown property '{id}'"),
            PropertyError::InvalidValue { property, error } => {
                write!(f, "invalid value for property '{property}': {error}")
            }
        }
    }
}

impl core::error::Error for PropertyError {}

//! # Attribute Codec
//!
//! Per-datatype encoding and decoding of property values, plus the `$format`
//! strings that describe a property's constraint.
//!
//! A property's datatype and its constraint travel together in [`PropertyKind`],
//! a closed set of variants. Every codec function matches over it, so adding a
//! datatype is a compile error everywhere it is not handled.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// The wire datatype of a property, published on `$datatype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Datatype {
    Integer,
    Float,
    Boolean,
    String,
    Enum,
}

impl Datatype {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Datatype::Integer => "integer",
            Datatype::Float => "float",
            Datatype::Boolean => "boolean",
            Datatype::String => "string",
            Datatype::Enum => "enum",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value.
///
/// Enum values are kept apart from plain strings so a value read back from a
/// device always reports the datatype of the property it came from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Enum(String),
}

impl Value {
    pub fn datatype(&self) -> Datatype {
        match self {
            Value::Integer(_) => Datatype::Integer,
            Value::Float(_) => Datatype::Float,
            Value::Boolean(_) => Datatype::Boolean,
            Value::String(_) => Datatype::String,
            Value::Enum(_) => Datatype::Enum,
        }
    }

    /// Returns the value of an integer. Floats are not narrowed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the value of a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text of a string or enum value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    /// Encodes the value as a Homie payload.
    pub fn encode(&self) -> String {
        match self {
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => encode_float(*v),
            Value::Boolean(v) => String::from(encode_bool(*v)),
            Value::String(v) | Value::Enum(v) => v.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Boolean payload literal.
pub const fn encode_bool(v: bool) -> &'static str {
    if v { "true" } else { "false" }
}

/// Encodes a float with a `.` separator. Integral values keep a trailing `.0`
/// so the payload is never mistaken for an integer.
pub fn encode_float(v: f64) -> String {
    let mut encoded = format!("{v}");
    if v.is_finite() && !encoded.contains('.') {
        encoded.push_str(".0");
    }
    encoded
}

/// A numeric `min`/`max` bound as supplied by the caller.
///
/// Float properties keep the bound's own form, so `$format` shows integer
/// bounds as integers and float bounds the way float values are encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bound {
    Integer(i64),
    Float(f64),
}

impl Bound {
    pub fn as_f64(&self) -> f64 {
        match self {
            Bound::Integer(v) => *v as f64,
            Bound::Float(v) => *v,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(v) => write!(f, "{v}"),
            Bound::Float(v) => f.write_str(&encode_float(*v)),
        }
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Bound::Integer(v)
    }
}

impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Bound::Integer(v.into())
    }
}

impl From<u32> for Bound {
    fn from(v: u32) -> Self {
        Bound::Integer(v.into())
    }
}

impl From<f64> for Bound {
    fn from(v: f64) -> Self {
        Bound::Float(v)
    }
}

impl From<f32> for Bound {
    fn from(v: f32) -> Self {
        Bound::Float(v.into())
    }
}

/// An inclusive numeric range, published as `{min}:{max}`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NumericRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> NumericRange<T> {
    pub fn contains(&self, v: T) -> bool {
        self.min <= v && v <= self.max
    }
}

/// Datatype plus datatype-specific constraint of a property.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyKind {
    Integer { range: Option<NumericRange<i64>> },
    Float { range: Option<NumericRange<Bound>> },
    Boolean,
    /// A string property with an optional free-form `$format`.
    String { format: Option<String> },
    /// An enum property; `values` is never empty.
    Enum { values: Vec<String> },
}

impl PropertyKind {
    pub fn datatype(&self) -> Datatype {
        match self {
            PropertyKind::Integer { .. } => Datatype::Integer,
            PropertyKind::Float { .. } => Datatype::Float,
            PropertyKind::Boolean => Datatype::Boolean,
            PropertyKind::String { .. } => Datatype::String,
            PropertyKind::Enum { .. } => Datatype::Enum,
        }
    }

    /// The `$format` payload, or `None` when the attribute is not published.
    pub fn format(&self) -> Option<String> {
        match self {
            PropertyKind::Integer { range } => range.map(|r| format!("{}:{}", r.min, r.max)),
            PropertyKind::Float { range } => range.map(|r| format!("{}:{}", r.min, r.max)),
            PropertyKind::Boolean => None,
            PropertyKind::String { format } => format.clone(),
            PropertyKind::Enum { values } => Some(values.join(",")),
        }
    }

    /// Decodes an incoming `set` payload.
    pub fn decode(&self, payload: &str) -> Result<Value, DecodeError> {
        match self {
            PropertyKind::Integer { range } => {
                let v = payload
                    .parse::<i64>()
                    .map_err(|_| DecodeError::Malformed(Datatype::Integer))?;
                check_range(range.as_ref(), v)?;
                Ok(Value::Integer(v))
            }
            PropertyKind::Float { range } => {
                let v = payload
                    .parse::<f64>()
                    .map_err(|_| DecodeError::Malformed(Datatype::Float))?;
                check_float(range.as_ref(), v)?;
                Ok(Value::Float(v))
            }
            PropertyKind::Boolean => match payload {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(DecodeError::Malformed(Datatype::Boolean)),
            },
            PropertyKind::String { .. } => Ok(Value::String(payload.into())),
            PropertyKind::Enum { values } => {
                if values.iter().any(|v| v == payload) {
                    Ok(Value::Enum(payload.into()))
                } else {
                    Err(DecodeError::NotInEnum)
                }
            }
        }
    }

    /// Checks a locally supplied value against the property and converts it to
    /// the property's datatype.
    ///
    /// Integers are accepted for float properties and strings for enum
    /// properties; every other mismatch is rejected.
    pub fn coerce(&self, value: Value) -> Result<Value, DecodeError> {
        match (self, value) {
            (PropertyKind::Integer { range }, Value::Integer(v)) => {
                check_range(range.as_ref(), v)?;
                Ok(Value::Integer(v))
            }
            (PropertyKind::Float { range }, Value::Float(v)) => {
                check_float(range.as_ref(), v)?;
                Ok(Value::Float(v))
            }
            (PropertyKind::Float { range }, Value::Integer(v)) => {
                let v = v as f64;
                check_float(range.as_ref(), v)?;
                Ok(Value::Float(v))
            }
            (PropertyKind::Boolean, Value::Boolean(v)) => Ok(Value::Boolean(v)),
            (PropertyKind::String { .. }, Value::String(v)) => Ok(Value::String(v)),
            (PropertyKind::Enum { values }, Value::Enum(v) | Value::String(v)) => {
                if values.contains(&v) {
                    Ok(Value::Enum(v))
                } else {
                    Err(DecodeError::NotInEnum)
                }
            }
            (kind, value) => Err(DecodeError::TypeMismatch {
                expected: kind.datatype(),
                found: value.datatype(),
            }),
        }
    }
}

fn check_range<T: PartialOrd + Copy>(
    range: Option<&NumericRange<T>>,
    v: T,
) -> Result<(), DecodeError> {
    match range {
        Some(range) if !range.contains(v) => Err(DecodeError::OutOfRange),
        _ => Ok(()),
    }
}

fn check_float(range: Option<&NumericRange<Bound>>, v: f64) -> Result<(), DecodeError> {
    if !v.is_finite() {
        return Err(DecodeError::NotFinite);
    }
    let range = range.map(|r| NumericRange {
        min: r.min.as_f64(),
        max: r.max.as_f64(),
    });
    check_range(range.as_ref(), v)
}

/// Why a payload or value was not accepted for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The payload is not valid UTF-8.
    InvalidUtf8,
    /// The payload does not parse as the given datatype.
    Malformed(Datatype),
    /// The value is not one of the enum's declared values.
    NotInEnum,
    /// The value lies outside the property's `min:max` range.
    OutOfRange,
    /// A float value is NaN or infinite.
    NotFinite,
    /// The value's datatype does not match the property's.
    TypeMismatch { expected: Datatype, found: Datatype },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidUtf8 => f.write_str("payload is not valid UTF-8"),
            DecodeError::Malformed(datatype) => write!(f, "payload is not a valid {datatype}"),
            DecodeError::NotInEnum => f.write_str("value is not a declared enum value"),
            DecodeError::OutOfRange => f.write_str("value is out of range"),
            DecodeError::NotFinite => f.write_str("value is not a finite number"),
            DecodeError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected} value, found {found}")
            }
        }
    }
}

impl core::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn enum_kind() -> PropertyKind {
        PropertyKind::Enum {
            values: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn encodes_values() {
        assert_eq!(Value::Integer(5).encode(), "5");
        assert_eq!(Value::Integer(-12).encode(), "-12");
        assert_eq!(Value::Float(6.0).encode(), "6.0");
        assert_eq!(Value::Float(21.5).encode(), "21.5");
        assert_eq!(Value::Float(-0.25).encode(), "-0.25");
        assert_eq!(Value::Boolean(true).encode(), "true");
        assert_eq!(Value::Boolean(false).encode(), "false");
        assert_eq!(Value::String("a b".into()).encode(), "a b");
        assert_eq!(Value::Enum("a".into()).encode(), "a");
    }

    #[test]
    fn numeric_format_requires_both_bounds() {
        let kind = PropertyKind::Integer {
            range: Some(NumericRange { min: 0, max: 100 }),
        };
        assert_eq!(kind.format().as_deref(), Some("0:100"));
        assert_eq!(PropertyKind::Integer { range: None }.format(), None);

        let float = |min: Bound, max: Bound| PropertyKind::Float {
            range: Some(NumericRange { min, max }),
        };
        assert_eq!(
            float(Bound::Float(0.0), Bound::Float(100.0)).format().as_deref(),
            Some("0.0:100.0")
        );
        assert_eq!(
            float(Bound::Integer(0), Bound::Integer(100)).format().as_deref(),
            Some("0:100")
        );
        assert_eq!(
            float(Bound::Float(0.5), Bound::Float(1.5)).format().as_deref(),
            Some("0.5:1.5")
        );
        assert_eq!(
            float(Bound::Integer(-5), Bound::Float(2.0)).format().as_deref(),
            Some("-5:2.0")
        );
    }

    #[test]
    fn float_range_compares_mixed_bounds() {
        let kind = PropertyKind::Float {
            range: Some(NumericRange {
                min: Bound::Integer(0),
                max: Bound::Float(0.5),
            }),
        };
        assert_eq!(kind.decode("0.25"), Ok(Value::Float(0.25)));
        assert_eq!(kind.decode("0.75"), Err(DecodeError::OutOfRange));
        assert_eq!(kind.coerce(Value::Integer(1)), Err(DecodeError::OutOfRange));
    }

    #[test]
    fn accessors_match_the_variant() {
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Float(7.0).as_i64(), None);
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Enum("a".into()).as_str(), Some("a"));
        assert_eq!(Value::Integer(1).as_str(), None);
    }

    #[test]
    fn enum_format_joins_values_in_order() {
        assert_eq!(enum_kind().format().as_deref(), Some("a,b,c"));
    }

    #[test]
    fn string_format_is_free_form() {
        let kind = PropertyKind::String {
            format: Some("test".into()),
        };
        assert_eq!(kind.format().as_deref(), Some("test"));
        assert_eq!(PropertyKind::String { format: None }.format(), None);
        assert_eq!(PropertyKind::Boolean.format(), None);
    }

    #[test]
    fn boolean_decode_is_exact() {
        assert_eq!(PropertyKind::Boolean.decode("true"), Ok(Value::Boolean(true)));
        assert_eq!(PropertyKind::Boolean.decode("false"), Ok(Value::Boolean(false)));
        for payload in ["True", "FALSE", "1", "", " true"] {
            assert_eq!(
                PropertyKind::Boolean.decode(payload),
                Err(DecodeError::Malformed(Datatype::Boolean))
            );
        }
    }

    #[test]
    fn numeric_decode_rejects_garbage_and_out_of_range() {
        let kind = PropertyKind::Integer {
            range: Some(NumericRange { min: 0, max: 10 }),
        };
        assert_eq!(kind.decode("7"), Ok(Value::Integer(7)));
        assert_eq!(kind.decode("7.5"), Err(DecodeError::Malformed(Datatype::Integer)));
        assert_eq!(kind.decode("11"), Err(DecodeError::OutOfRange));

        let kind = PropertyKind::Float { range: None };
        assert_eq!(kind.decode("7"), Ok(Value::Float(7.0)));
        assert_eq!(kind.decode("abc"), Err(DecodeError::Malformed(Datatype::Float)));
        assert_eq!(kind.decode("NaN"), Err(DecodeError::NotFinite));
    }

    #[test]
    fn enum_decode_accepts_declared_values_only() {
        assert_eq!(enum_kind().decode("b"), Ok(Value::Enum("b".into())));
        assert_eq!(enum_kind().decode("d"), Err(DecodeError::NotInEnum));
        assert_eq!(enum_kind().decode("a,b"), Err(DecodeError::NotInEnum));
    }

    #[test]
    fn coerce_widens_and_rejects_mismatches() {
        let float = PropertyKind::Float { range: None };
        assert_eq!(float.coerce(Value::Integer(6)), Ok(Value::Float(6.0)));
        assert_eq!(enum_kind().coerce("a".into()), Ok(Value::Enum("a".into())));
        assert_eq!(
            PropertyKind::Boolean.coerce(Value::Integer(1)),
            Err(DecodeError::TypeMismatch {
                expected: Datatype::Boolean,
                found: Datatype::Integer,
            })
        );
        assert_eq!(
            PropertyKind::Integer { range: None }.coerce(Value::Float(1.0)),
            Err(DecodeError::TypeMismatch {
                expected: Datatype::Integer,
                found: Datatype::Float,
            })
        );
    }
}

//! Value representations for log records.
//!
//! A `LogValue` is the type-agnostic payload of one field; `TypedValue`
//! pairs it with the `LogType` it was declared with, which is what the
//! database-specific codecs consume.

use crate::types::LogType;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address prefix with a width, e.g. `10.0.0.0/8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    prefix: IpAddr,
    width: u8,
}

/// Error returned when a subnet cannot be constructed or parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubnetError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid prefix width '{0}'")]
    InvalidWidth(String),

    #[error("prefix width {width} exceeds {max} for {prefix}")]
    WidthOutOfRange { prefix: IpAddr, width: u8, max: u8 },
}

impl Subnet {
    /// Create a subnet; the width must fit the address family.
    pub fn new(prefix: IpAddr, width: u8) -> Result<Self, SubnetError> {
        let max = Self::max_width(&prefix);
        if width > max {
            return Err(SubnetError::WidthOutOfRange { prefix, width, max });
        }
        Ok(Self { prefix, width })
    }

    /// A subnet covering exactly one address.
    pub fn host(addr: IpAddr) -> Self {
        Self {
            prefix: addr,
            width: Self::max_width(&addr),
        }
    }

    pub fn prefix(&self) -> IpAddr {
        self.prefix
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    fn max_width(addr: &IpAddr) -> u8 {
        match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.width)
    }
}

impl FromStr for Subnet {
    type Err = SubnetError;

    /// Parses `address/width`; a bare address is a host subnet, which is how
    /// PostgreSQL prints an `inet` value with a full-width mask.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((addr, width)) => {
                let prefix: IpAddr = addr
                    .parse()
                    .map_err(|_| SubnetError::InvalidAddress(addr.to_string()))?;
                if width.is_empty() || !width.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(SubnetError::InvalidWidth(width.to_string()));
                }
                let width: u8 = width
                    .parse()
                    .map_err(|_| SubnetError::InvalidWidth(width.to_string()))?;
                Self::new(prefix, width)
            }
            None => s
                .parse()
                .map(Self::host)
                .map_err(|_| SubnetError::InvalidAddress(s.to_string())),
        }
    }
}

/// Payload of a log field.
///
/// `Null` is an absent value and carries nothing. `Elements` is the payload
/// of both sets and vectors; the children share the collection's element
/// type, which lives on the enclosing `TypedValue`.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer (`int`)
    Int(i64),
    /// Unsigned counter (`count`)
    Count(u64),
    /// Floating point (`double`, `time`, `interval`)
    Double(f64),
    /// Port number
    Port(u16),
    /// IP address
    Addr(IpAddr),
    /// Subnet
    Subnet(Subnet),
    /// Text (`string`, `enum`, `file`, `func`)
    String(String),
    /// Children of a set or vector, in arrival order
    Elements(Vec<LogValue>),
}

impl LogValue {
    /// Check if this value is absent.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short payload name, used in diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Count(_) => "count",
            Self::Double(_) => "double",
            Self::Port(_) => "port",
            Self::Addr(_) => "addr",
            Self::Subnet(_) => "subnet",
            Self::String(_) => "string",
            Self::Elements(_) => "elements",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_elements(&self) -> Option<&[LogValue]> {
        match self {
            Self::Elements(elements) => Some(elements),
            _ => None,
        }
    }
}

/// A field value together with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    /// Declared field type
    pub log_type: LogType,

    /// Payload, `LogValue::Null` when absent
    pub value: LogValue,
}

impl TypedValue {
    pub fn new(log_type: LogType, value: LogValue) -> Self {
        Self { log_type, value }
    }

    /// An absent value of the given type.
    pub fn null(log_type: LogType) -> Self {
        Self::new(log_type, LogValue::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::new(LogType::Bool, LogValue::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::new(LogType::Int, LogValue::Int(value))
    }

    pub fn count(value: u64) -> Self {
        Self::new(LogType::Count, LogValue::Count(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(LogType::Double, LogValue::Double(value))
    }

    pub fn time(seconds: f64) -> Self {
        Self::new(LogType::Time, LogValue::Double(seconds))
    }

    pub fn interval(seconds: f64) -> Self {
        Self::new(LogType::Interval, LogValue::Double(seconds))
    }

    pub fn port(value: u16) -> Self {
        Self::new(LogType::Port, LogValue::Port(value))
    }

    pub fn addr(value: IpAddr) -> Self {
        Self::new(LogType::Addr, LogValue::Addr(value))
    }

    pub fn subnet(value: Subnet) -> Self {
        Self::new(LogType::Subnet, LogValue::Subnet(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(LogType::String, LogValue::String(value.into()))
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::new(LogType::Enum, LogValue::String(name.into()))
    }

    /// A set whose children all have `element_type`.
    pub fn set(element_type: LogType, elements: Vec<LogValue>) -> Self {
        Self::new(LogType::set(element_type), LogValue::Elements(elements))
    }

    /// A vector whose children all have `element_type`.
    pub fn vector(element_type: LogType, elements: Vec<LogValue>) -> Self {
        Self::new(LogType::vector(element_type), LogValue::Elements(elements))
    }

    pub fn is_present(&self) -> bool {
        !self.value.is_null()
    }

    /// Children of a collection as typed values, `None` for scalars and
    /// absent values.
    pub fn children(&self) -> Option<Vec<TypedValue>> {
        let element_type = self.log_type.element_type()?;
        let elements = self.value.as_elements()?;
        Some(
            elements
                .iter()
                .map(|value| TypedValue::new(element_type.clone(), value.clone()))
                .collect(),
        )
    }
}

/// One record of a stream: a typed value per field, in field order.
pub type LogRow = Vec<TypedValue>;

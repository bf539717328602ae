//! Field types of a log stream.
//!
//! `LogType` is the type universe of a log record field. Collections carry
//! their element type, so `vector[set[addr]]` is representable and every
//! consumer recurses over the same tree.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Type of a single log field.
///
/// # YAML Format
///
/// Types can be written in their textual form:
/// ```yaml
/// type: count
/// type: set[addr]
/// type: vector[vector[int]]
/// ```
///
/// Collections can also use the object form:
/// ```yaml
/// type:
///   type: vector
///   element_type: string
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogType {
    /// Boolean
    Bool,
    /// Signed 64-bit integer
    Int,
    /// Unsigned 64-bit counter
    Count,
    /// 64-bit floating point
    Double,
    /// Absolute time, seconds since the epoch
    Time,
    /// Time span in seconds
    Interval,
    /// Transport-layer port number
    Port,
    /// IPv4 or IPv6 address
    Addr,
    /// Address prefix with a width
    Subnet,
    /// Enumeration constant, carried by name
    Enum,
    /// Character string
    String,
    /// File handle, carried by name
    File,
    /// Function reference, carried by name
    Func,
    /// Unordered collection
    Set(Box<LogType>),
    /// Ordered collection
    Vector(Box<LogType>),

    // Kinds that can appear in a stream definition but have no column mapping.
    /// Nested record
    Record,
    /// Regular expression pattern
    Pattern,
    /// Keyed table (non-set)
    Table,
    /// Dynamically typed value
    Any,
    /// Opaque handle
    Opaque,
}

impl LogType {
    /// Create a set type with the given element type.
    pub fn set(element: LogType) -> Self {
        Self::Set(Box::new(element))
    }

    /// Create a vector type with the given element type.
    pub fn vector(element: LogType) -> Self {
        Self::Vector(Box::new(element))
    }

    /// Element type of a collection, `None` for scalars.
    pub fn element_type(&self) -> Option<&LogType> {
        match self {
            Self::Set(element) | Self::Vector(element) => Some(element),
            _ => None,
        }
    }

    /// Whether values of this type are numbers (or booleans) in text form.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int
                | Self::Count
                | Self::Port
                | Self::Time
                | Self::Interval
                | Self::Double
        )
    }

    /// Collection nesting depth: 0 for scalars, 1 for `set[addr]`, ...
    pub fn depth(&self) -> usize {
        match self.element_type() {
            Some(element) => 1 + element.depth(),
            None => 0,
        }
    }

    fn simple_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Count => "count",
            Self::Double => "double",
            Self::Time => "time",
            Self::Interval => "interval",
            Self::Port => "port",
            Self::Addr => "addr",
            Self::Subnet => "subnet",
            Self::Enum => "enum",
            Self::String => "string",
            Self::File => "file",
            Self::Func => "func",
            Self::Record => "record",
            Self::Pattern => "pattern",
            Self::Table => "table",
            Self::Any => "any",
            Self::Opaque => "opaque",
            Self::Set(_) | Self::Vector(_) => return None,
        })
    }

    fn from_simple_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "int" => Self::Int,
            "count" => Self::Count,
            "double" => Self::Double,
            "time" => Self::Time,
            "interval" => Self::Interval,
            "port" => Self::Port,
            "addr" => Self::Addr,
            "subnet" => Self::Subnet,
            "enum" => Self::Enum,
            "string" => Self::String,
            "file" => Self::File,
            "func" => Self::Func,
            "record" => Self::Record,
            "pattern" => Self::Pattern,
            "table" => Self::Table,
            "any" => Self::Any,
            "opaque" => Self::Opaque,
            _ => return None,
        })
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(element) => write!(f, "set[{element}]"),
            Self::Vector(element) => write!(f, "vector[{element}]"),
            other => f.write_str(other.simple_name().unwrap_or("unknown")),
        }
    }
}

/// Error returned when a type name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log type '{input}': {reason}")]
pub struct ParseTypeError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for LogType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let error = |reason| ParseTypeError {
            input: s.to_string(),
            reason,
        };

        if let Some(simple) = Self::from_simple_name(trimmed) {
            return Ok(simple);
        }

        let (container, rest) = trimmed
            .split_once('[')
            .ok_or_else(|| error("unknown type name"))?;
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| error("missing closing ']'"))?;
        if inner.trim().is_empty() {
            return Err(error("missing element type"));
        }

        let element: LogType = inner.parse().map_err(|_| error("invalid element type"))?;
        match container.trim() {
            "set" => Ok(Self::set(element)),
            "vector" => Ok(Self::vector(element)),
            _ => Err(error("only set[...] and vector[...] take an element type")),
        }
    }
}

impl Serialize for LogType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct LogTypeVisitor;

        impl<'de> Visitor<'de> for LogTypeVisitor {
            type Value = LogType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a type name such as \"set[addr]\" or a map with a type key")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                value.parse().map_err(E::custom)
            }

            // {"type": "vector", "element_type": "string"}
            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut type_name: Option<String> = None;
                let mut fields: HashMap<String, serde_yaml::Value> = HashMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == "type" {
                        type_name = Some(map.next_value()?);
                    } else {
                        fields.insert(key, map.next_value()?);
                    }
                }

                let type_name = type_name.ok_or_else(|| M::Error::missing_field("type"))?;
                match type_name.as_str() {
                    "set" | "vector" => {
                        let element = fields
                            .remove("element_type")
                            .ok_or_else(|| M::Error::missing_field("element_type"))?;
                        let element: LogType = serde_yaml::from_value(element).map_err(|e| {
                            M::Error::custom(format!("invalid field 'element_type': {e}"))
                        })?;
                        if type_name == "set" {
                            Ok(LogType::set(element))
                        } else {
                            Ok(LogType::vector(element))
                        }
                    }
                    other => other.parse().map_err(M::Error::custom),
                }
            }
        }

        deserializer.deserialize_any(LogTypeVisitor)
    }
}

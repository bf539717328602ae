//! Forward conversion: TypedValue → PostgreSQL parameter text
//!
//! Every value is sent as a text-format parameter, so encoding means
//! producing exactly the literal PostgreSQL's input functions accept for the
//! column type chosen by [`crate::ddl::map_type`]. Collections become array
//! literals, recursively.

use crate::ddl::ensure_mappable;
use crate::error::{CodecError, CodecResult};
use crate::escape::{escape_element, escaped_len};
use log_core::{LogType, LogValue, TypedValue};

/// One encoded statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedParam {
    /// `false` for absent values; the transport sends a protocol NULL.
    pub present: bool,
    /// Literal text, empty when absent
    pub text: String,
    /// Length of `text` in bytes, 0 when absent
    pub byte_len: usize,
}

impl EncodedParam {
    /// The encoding of an absent value.
    pub fn null() -> Self {
        Self::default()
    }

    /// Literal text, `None` for absent values.
    pub fn as_text(&self) -> Option<&str> {
        self.present.then_some(self.text.as_str())
    }
}

/// Whether a present element of this type must be quoted inside an array
/// literal.
///
/// Numbers and booleans render without any of the array delimiters and go
/// bare. Everything else, including nested collections, is quoted and
/// escaped since its text may contain `,`, `{`, `}`, `"` or `\`.
///
/// A nested collection therefore travels as a quoted inner literal
/// (`{"{1,2}"}`). This crate decodes that form, but a PostgreSQL
/// multidimensional column such as `bigint[][]` rejects it.
pub fn needs_quoting(element_type: &LogType) -> bool {
    !element_type.is_numeric()
}

/// Encode a typed value into parameter text.
pub fn encode(value: &TypedValue) -> CodecResult<EncodedParam> {
    encode_value(&value.log_type, &value.value)
}

/// Encode a payload declared with `log_type`.
pub fn encode_value(log_type: &LogType, value: &LogValue) -> CodecResult<EncodedParam> {
    ensure_mappable(log_type)?;
    if value.is_null() {
        return Ok(EncodedParam::null());
    }

    let mut text = String::new();
    let byte_len = write_value(log_type, value, &mut text)?;
    debug_assert_eq!(byte_len, text.len());
    Ok(EncodedParam {
        present: true,
        text,
        byte_len,
    })
}

/// Append the text of a present value to `out`, returning the number of
/// bytes written.
fn write_value(log_type: &LogType, value: &LogValue, out: &mut String) -> CodecResult<usize> {
    match (log_type, value) {
        (LogType::Set(element_type) | LogType::Vector(element_type), LogValue::Elements(elements)) => {
            write_array(element_type, elements, out)
        }
        _ => {
            let start = out.len();
            write_scalar(log_type, value, out)?;
            Ok(out.len() - start)
        }
    }
}

fn write_array(element_type: &LogType, elements: &[LogValue], out: &mut String) -> CodecResult<usize> {
    let quoted = needs_quoting(element_type);

    out.push('{');
    let mut len = 1;
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
            len += 1;
        }

        if element.is_null() {
            out.push_str("NULL");
            len += 4;
        } else if quoted {
            let mut raw = String::new();
            write_value(element_type, element, &mut raw)?;
            out.push('"');
            out.push_str(&escape_element(&raw));
            out.push('"');
            len += escaped_len(&raw) + 2;
        } else {
            len += write_value(element_type, element, out)?;
        }
    }
    out.push('}');
    Ok(len + 1)
}

fn write_scalar(log_type: &LogType, value: &LogValue, out: &mut String) -> CodecResult<()> {
    let text = match (log_type, value) {
        (LogType::Bool, LogValue::Bool(true)) => "T".to_string(),
        (LogType::Bool, LogValue::Bool(false)) => "F".to_string(),
        (LogType::Int, LogValue::Int(i)) => i.to_string(),
        (LogType::Count, LogValue::Count(c)) => c.to_string(),
        (LogType::Port, LogValue::Port(p)) => p.to_string(),
        (LogType::Double | LogType::Time | LogType::Interval, LogValue::Double(f)) => {
            format_double(*f)
        }
        (LogType::Addr, LogValue::Addr(addr)) => addr.to_string(),
        (LogType::Subnet, LogValue::Subnet(subnet)) => subnet.to_string(),
        (LogType::Enum | LogType::String | LogType::File | LogType::Func, LogValue::String(s)) => {
            out.push_str(s);
            return Ok(());
        }
        (expected, found) => {
            return Err(CodecError::TypeMismatch {
                expected: expected.clone(),
                found: found.variant_name(),
            })
        }
    };
    out.push_str(&text);
    Ok(())
}

/// Shortest text that parses back to the same `f64`, switching to exponent
/// form for very large and very small magnitudes, with PostgreSQL's
/// spelling of the non-finite values.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{value:?}")
    }
}

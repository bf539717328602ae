//! Reverse conversion: PostgreSQL result text → TypedValue
//!
//! Result cells arrive as text. Scalars are parsed strictly according to the
//! declared field type; collections are split by [`crate::array`] and each
//! element is decoded against the element type. Nothing is ever coerced to a
//! default: text that does not parse is `CodecError::Malformed`.

use crate::array::{split_elements, ArrayElement, MAX_NESTING_DEPTH};
use crate::ddl::ensure_mappable;
use crate::error::{CodecError, CodecResult};
use log_core::{LogType, LogValue, Subnet, TypedValue};
use std::net::IpAddr;

/// Decode the text of a non-null cell into a value of `log_type`.
pub fn decode(text: &str, log_type: &LogType) -> CodecResult<TypedValue> {
    ensure_mappable(log_type)?;
    if log_type.depth() > MAX_NESTING_DEPTH {
        return Err(CodecError::malformed(
            log_type,
            text,
            format!("collections nested deeper than {MAX_NESTING_DEPTH} levels"),
        ));
    }
    let value = decode_value(text, log_type)?;
    Ok(TypedValue::new(log_type.clone(), value))
}

/// Decode an optional cell; `None` is a NULL cell and yields an absent value.
pub fn decode_cell(cell: Option<&str>, log_type: &LogType) -> CodecResult<TypedValue> {
    match cell {
        Some(text) => decode(text, log_type),
        None => {
            ensure_mappable(log_type)?;
            Ok(TypedValue::null(log_type.clone()))
        }
    }
}

fn decode_value(text: &str, log_type: &LogType) -> CodecResult<LogValue> {
    let Some(element_type) = log_type.element_type() else {
        return decode_scalar(text, log_type);
    };

    let elements = split_elements(text).map_err(|e| CodecError::malformed(log_type, text, e))?;
    let values = elements
        .into_iter()
        .map(|element| match element {
            ArrayElement::Null => Ok(LogValue::Null),
            ArrayElement::Text(element) => decode_value(&element, element_type),
        })
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(LogValue::Elements(values))
}

/// Decode a scalar.
///
/// Booleans accept PostgreSQL's `t`/`f` as well as the `T`/`F` this crate
/// sends, so encoder output decodes too.
pub fn decode_scalar(text: &str, log_type: &LogType) -> CodecResult<LogValue> {
    let malformed = |reason: String| CodecError::malformed(log_type, text, reason);

    let value = match log_type {
        LogType::Bool => match text {
            "t" | "T" => LogValue::Bool(true),
            "f" | "F" => LogValue::Bool(false),
            _ => return Err(malformed("invalid value for boolean".to_string())),
        },
        LogType::Int => LogValue::Int(text.parse().map_err(|e| malformed(format!("{e}")))?),
        LogType::Count => LogValue::Count(text.parse().map_err(|e| malformed(format!("{e}")))?),
        LogType::Port => LogValue::Port(text.parse().map_err(|e| malformed(format!("{e}")))?),
        LogType::Double | LogType::Time | LogType::Interval => {
            let value = parse_double(text).ok_or_else(|| malformed("invalid float literal".to_string()))?;
            LogValue::Double(value)
        }
        LogType::Addr => {
            LogValue::Addr(text.parse::<IpAddr>().map_err(|e| malformed(format!("{e}")))?)
        }
        LogType::Subnet => {
            LogValue::Subnet(text.parse::<Subnet>().map_err(|e| malformed(format!("{e}")))?)
        }
        LogType::Enum | LogType::String | LogType::File | LogType::Func => {
            LogValue::String(text.to_string())
        }
        LogType::Set(_) | LogType::Vector(_) => {
            return Err(malformed("collection where a scalar was expected".to_string()))
        }
        LogType::Record | LogType::Pattern | LogType::Table | LogType::Any | LogType::Opaque => {
            return Err(CodecError::UnsupportedKind(log_type.clone()))
        }
    };
    Ok(value)
}

/// Parse a float.
///
/// Finite values are decimal or exponent notation with an optional sign.
/// The only non-finite spellings are PostgreSQL's `NaN`, `Infinity` and
/// `-Infinity`; `inf`, `nan` and the like are rejected, as is surrounding
/// whitespace.
fn parse_double(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ if text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-')) =>
        {
            text.parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::encode;

    fn strings(items: &[Option<&str>]) -> Vec<LogValue> {
        items
            .iter()
            .map(|item| match item {
                Some(s) => LogValue::String(s.to_string()),
                None => LogValue::Null,
            })
            .collect()
    }

    fn assert_malformed(text: &str, log_type: LogType) {
        match decode(text, &log_type) {
            Err(CodecError::Malformed { .. }) => {}
            other => panic!("expected Malformed for {text:?} as {log_type}, got {other:?}"),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode("t", &LogType::Bool).unwrap(), TypedValue::bool(true));
        assert_eq!(decode("f", &LogType::Bool).unwrap(), TypedValue::bool(false));
        assert_eq!(decode("-7", &LogType::Int).unwrap(), TypedValue::int(-7));
        assert_eq!(decode("7", &LogType::Count).unwrap(), TypedValue::count(7));
        assert_eq!(decode("8080", &LogType::Port).unwrap(), TypedValue::port(8080));
        assert_eq!(decode("1.5", &LogType::Time).unwrap(), TypedValue::time(1.5));
        assert_eq!(
            decode("Infinity", &LogType::Interval).unwrap(),
            TypedValue::interval(f64::INFINITY)
        );
        assert_eq!(
            decode("::1", &LogType::Addr).unwrap(),
            TypedValue::addr("::1".parse().unwrap())
        );
        assert_eq!(
            decode("10.1.0.0/16", &LogType::Subnet).unwrap(),
            TypedValue::subnet("10.1.0.0/16".parse().unwrap())
        );
        assert_eq!(decode("", &LogType::String).unwrap(), TypedValue::string(""));
    }

    #[test]
    fn test_nan() {
        let tv = decode("NaN", &LogType::Double).unwrap();
        assert!(matches!(tv.value, LogValue::Double(f) if f.is_nan()));
    }

    #[test]
    fn test_only_postgres_non_finite_spellings() {
        for text in ["inf", "-inf", "infinity", "nan", "NAN", "+Infinity"] {
            assert_malformed(text, LogType::Double);
        }
        assert_eq!(decode("+1.5", &LogType::Double).unwrap(), TypedValue::double(1.5));
        assert_eq!(decode("1e300", &LogType::Double).unwrap(), TypedValue::double(1e300));
        assert_eq!(decode("5e-324", &LogType::Time).unwrap(), TypedValue::time(5e-324));
    }

    #[test]
    fn test_subnet_width_must_be_digits() {
        assert_malformed("10.0.0.0/+8", LogType::Subnet);
        assert_malformed("10.0.0.0/", LogType::Subnet);
        assert_malformed("10.0.0.0/ 8", LogType::Subnet);
    }

    #[test]
    fn test_inet_host_decodes_as_full_width_subnet() {
        let tv = decode("192.168.1.1", &LogType::Subnet).unwrap();
        assert_eq!(tv.value, LogValue::Subnet("192.168.1.1/32".parse().unwrap()));
    }

    #[test]
    fn test_strict_numeric_parsing() {
        assert_malformed("", LogType::Int);
        assert_malformed("12abc", LogType::Int);
        assert_malformed("-1", LogType::Count);
        assert_malformed("9223372036854775808", LogType::Int);
        assert_malformed("65536", LogType::Port);
        assert_malformed(" 1.0", LogType::Double);
        assert_malformed("one", LogType::Time);
        assert_malformed("true", LogType::Bool);
        assert_malformed("10.0.0.256", LogType::Addr);
        assert_malformed("10.0.0.0/40", LogType::Subnet);
    }

    #[test]
    fn test_null_cell() {
        assert_eq!(
            decode_cell(None, &LogType::vector(LogType::Addr)).unwrap(),
            TypedValue::null(LogType::vector(LogType::Addr))
        );
        assert_eq!(decode_cell(Some("3"), &LogType::Count).unwrap(), TypedValue::count(3));
    }

    #[test]
    fn test_array_literal() {
        let tv = decode(r#"{"x",NULL,"y"}"#, &LogType::vector(LogType::String)).unwrap();
        assert_eq!(
            tv,
            TypedValue::vector(LogType::String, strings(&[Some("x"), None, Some("y")]))
        );
    }

    #[test]
    fn test_postgres_output_forms() {
        // how the server prints bigint[] and inet[] columns
        let tv = decode("{1,NULL,3}", &LogType::set(LogType::Count)).unwrap();
        assert_eq!(
            tv.value,
            LogValue::Elements(vec![LogValue::Count(1), LogValue::Null, LogValue::Count(3)])
        );

        let tv = decode("{10.0.0.1,::1}", &LogType::set(LogType::Addr)).unwrap();
        assert_eq!(tv.value.as_elements().unwrap().len(), 2);

        let tv = decode("{t,f}", &LogType::vector(LogType::Bool)).unwrap();
        assert_eq!(
            tv.value,
            LogValue::Elements(vec![LogValue::Bool(true), LogValue::Bool(false)])
        );
    }

    #[test]
    fn test_null_sentinel_isolation() {
        let tv = TypedValue::vector(LogType::String, strings(&[Some("NULL")]));
        let param = encode(&tv).unwrap();
        assert_eq!(param.text, r#"{"NULL"}"#);
        assert_eq!(decode(&param.text, &tv.log_type).unwrap(), tv);

        let absent = decode("{NULL}", &tv.log_type).unwrap();
        assert_eq!(absent.value, LogValue::Elements(vec![LogValue::Null]));
    }

    #[test]
    fn test_escaping_round_trip() {
        let original = r#"he said "hi"\now"#;
        let tv = TypedValue::vector(LogType::String, strings(&[Some(original)]));
        let decoded = decode(&encode(&tv).unwrap().text, &tv.log_type).unwrap();
        assert_eq!(decoded.value.as_elements().unwrap()[0].as_str(), Some(original));
    }

    #[test]
    fn test_flat_fallback() {
        let tv = decode("a,b,c", &LogType::vector(LogType::String)).unwrap();
        assert_eq!(
            tv,
            TypedValue::vector(LogType::String, strings(&[Some("a"), Some("b"), Some("c")]))
        );

        // no unescaping and no NULL sentinel in the flat form
        let tv = decode(r#"NULL,x\"y"#, &LogType::set(LogType::String)).unwrap();
        assert_eq!(
            tv.value,
            LogValue::Elements(strings(&[Some("NULL"), Some(r#"x\"y"#)]))
        );

        let tv = decode("1,2", &LogType::vector(LogType::Count)).unwrap();
        assert_eq!(
            tv.value,
            LogValue::Elements(vec![LogValue::Count(1), LogValue::Count(2)])
        );
    }

    #[test]
    fn test_malformed_literals() {
        for log_type in [
            LogType::vector(LogType::String),
            LogType::set(LogType::Count),
            LogType::vector(LogType::vector(LogType::Addr)),
        ] {
            assert_malformed(r#"{"unterminated"#, log_type.clone());
            assert_malformed(r#"{"unterminated}"#, log_type);
        }
        assert_malformed("{1,,2}", LogType::vector(LogType::Int));
    }

    #[test]
    fn test_malformed_element_fails_whole_value() {
        assert_malformed("{1,x,3}", LogType::vector(LogType::Int));
        assert_malformed("1,x,3", LogType::vector(LogType::Int));
    }

    #[test]
    fn test_nested_collections() {
        let log_type = LogType::vector(LogType::vector(LogType::Int));
        let tv = decode(r#"{"{1,2}",NULL,"{}"}"#, &log_type).unwrap();
        assert_eq!(
            tv.value,
            LogValue::Elements(vec![
                LogValue::Elements(vec![LogValue::Int(1), LogValue::Int(2)]),
                LogValue::Null,
                LogValue::Elements(vec![]),
            ])
        );
    }

    #[test]
    fn test_nesting_limit() {
        let mut log_type = LogType::Int;
        for _ in 0..=MAX_NESTING_DEPTH {
            log_type = LogType::vector(log_type);
        }
        assert_malformed("{}", log_type.clone());
        if let LogType::Vector(inner) = log_type {
            assert!(decode("{}", &inner).is_ok());
        }
    }

    #[test]
    fn test_unsupported_kind() {
        assert_eq!(
            decode("x", &LogType::Pattern),
            Err(CodecError::UnsupportedKind(LogType::Pattern))
        );
        assert_eq!(
            decode_cell(None, &LogType::set(LogType::Record)),
            Err(CodecError::UnsupportedKind(LogType::Record))
        );
    }
}

//! Identifier quoting.
//!
//! Table and column names are never spliced into statements raw; they go
//! through an `IdentifierQuoter`, which may refuse an identifier.

use crate::error::CodecError;

/// Turns a raw identifier into a store-safe quoted identifier.
pub trait IdentifierQuoter: Send + Sync {
    fn quote_identifier(&self, identifier: &str) -> Result<String, CodecError>;
}

/// PostgreSQL double-quote identifier quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSQLQuoter;

impl IdentifierQuoter for PostgreSQLQuoter {
    fn quote_identifier(&self, identifier: &str) -> Result<String, CodecError> {
        let failure = |reason: &str| CodecError::EscapeFailure {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        };

        if identifier.is_empty() {
            return Err(failure("zero-length delimited identifier"));
        }
        if identifier.contains('\0') {
            return Err(failure("identifier contains a NUL character"));
        }
        Ok(postgres_protocol::escape::escape_identifier(identifier))
    }
}

/// Find the result column an escaped identifier refers to.
///
/// A quoted identifier matches its unquoted text exactly; an unquoted one
/// is folded to lower case first, the way the server resolves names.
pub fn column_ordinal<S: AsRef<str>>(columns: &[S], escaped: &str) -> Option<usize> {
    let wanted = match escaped
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => escaped.to_lowercase(),
    };
    columns.iter().position(|c| c.as_ref() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_identifiers() {
        let quoter = PostgreSQLQuoter;
        assert_eq!(quoter.quote_identifier("conn").unwrap(), "\"conn\"");
        assert_eq!(
            quoter.quote_identifier("id.orig_h").unwrap(),
            "\"id.orig_h\""
        );
        assert_eq!(
            quoter.quote_identifier("we\"ird").unwrap(),
            "\"we\"\"ird\""
        );
    }

    #[test]
    fn test_rejects_unquotable_identifiers() {
        let quoter = PostgreSQLQuoter;
        assert!(matches!(
            quoter.quote_identifier(""),
            Err(CodecError::EscapeFailure { .. })
        ));
        assert!(matches!(
            quoter.quote_identifier("a\0b"),
            Err(CodecError::EscapeFailure { .. })
        ));
    }

    #[test]
    fn test_column_ordinal() {
        let columns = ["id", "ts", "Mixed", "we\"ird"];
        assert_eq!(column_ordinal(&columns, "\"ts\""), Some(1));
        assert_eq!(column_ordinal(&columns, "\"Mixed\""), Some(2));
        assert_eq!(column_ordinal(&columns, "\"mixed\""), None);
        assert_eq!(column_ordinal(&columns, "TS"), Some(1));
        assert_eq!(column_ordinal(&columns, "\"we\"\"ird\""), Some(3));
        assert_eq!(column_ordinal(&columns, "\"missing\""), None);
    }
}

//! Text-format statement parameters.

use bytes::BytesMut;
use postgresql_log_types::EncodedParam;
use std::error::Error;
use tokio_postgres::types::{to_sql_checked, Format, IsNull, ToSql, Type};

/// Sends an encoded value in PostgreSQL text format.
///
/// The server runs the column type's input function on the text, so any
/// column type is accepted here and a bad literal is reported by the server.
#[derive(Debug, Clone, Copy)]
pub struct TextParam<'a>(pub &'a EncodedParam);

impl ToSql for TextParam<'_> {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.0.as_text() {
            Some(text) => {
                out.extend_from_slice(text.as_bytes());
                Ok(IsNull::No)
            }
            None => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

/// Wrap a row of encoded values for `Client::execute`.
pub fn text_params(params: &[EncodedParam]) -> Vec<TextParam<'_>> {
    params.iter().map(TextParam).collect()
}

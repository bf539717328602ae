//! Array literal tokenizer.
//!
//! A collection value arrives in one of two textual forms, chosen by its
//! first character:
//!
//! - `{...}`: a PostgreSQL array literal. Elements are separated by `,`,
//!   are either quoted (`"a\"b"`) or bare (`abc`), and a bare `NULL` is an
//!   absent element.
//! - anything else: a flat comma-separated list, written by producers that
//!   could not send a native array. No quoting, no escapes, no `NULL`.
//!
//! The form is decided before tokenizing; a literal that fails to tokenize
//! is an error, never a flat list.

use crate::escape::unescape_element;
use std::borrow::Cow;
use thiserror::Error;

/// Maximum collection nesting accepted when decoding.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Textual form of a collection value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayRepresentation {
    /// `{...}` array literal
    Literal,
    /// Flat comma-separated list
    Flat,
}

impl ArrayRepresentation {
    pub fn detect(text: &str) -> Self {
        if text.starts_with('{') {
            Self::Literal
        } else {
            Self::Flat
        }
    }
}

/// One element of a collection value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElement<'a> {
    /// Bare `NULL` inside an array literal
    Null,
    /// Element text, already unescaped
    Text(Cow<'a, str>),
}

/// Tokenizer failures; offsets are byte positions in the full text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayError {
    #[error("array literal is missing its closing '}}'")]
    UnbalancedBraces,

    #[error("unterminated quoted element starting at byte {0}")]
    UnterminatedQuote(usize),

    #[error("empty element at byte {0}")]
    EmptyElement(usize),

    #[error("unexpected '{ch}' at byte {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("expected ',' after quoted element at byte {0}")]
    MissingSeparator(usize),
}

/// Split a collection value into its elements.
pub fn split_elements(text: &str) -> Result<Vec<ArrayElement<'_>>, ArrayError> {
    match ArrayRepresentation::detect(text) {
        ArrayRepresentation::Literal => split_literal(text),
        ArrayRepresentation::Flat => Ok(split_flat(text)),
    }
}

fn split_flat(text: &str) -> Vec<ArrayElement<'_>> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',')
        .map(|element| ArrayElement::Text(Cow::Borrowed(element)))
        .collect()
}

fn split_literal(text: &str) -> Result<Vec<ArrayElement<'_>>, ArrayError> {
    let inner = text
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or(ArrayError::UnbalancedBraces)?;

    let mut elements = Vec::new();
    if inner.is_empty() {
        return Ok(elements);
    }

    let bytes = inner.as_bytes();
    let mut pos = 0;
    loop {
        let (element, end) = if bytes.get(pos) == Some(&b'"') {
            quoted_element(inner, pos)?
        } else {
            bare_element(inner, pos)?
        };
        elements.push(element);

        match bytes.get(end) {
            None => break,
            Some(b',') => pos = end + 1,
            Some(_) => return Err(ArrayError::MissingSeparator(end + 1)),
        }
    }
    Ok(elements)
}

/// Quoted element starting at `start`; returns the element and the index
/// just past its closing quote. `\` and `"` are ASCII, so scanning bytes
/// never splits a multi-byte character.
fn quoted_element(inner: &str, start: usize) -> Result<(ArrayElement<'_>, usize), ArrayError> {
    let bytes = inner.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => {
                let raw = &inner[start + 1..i];
                return Ok((ArrayElement::Text(unescape_element(raw)), i + 1));
            }
            _ => i += 1,
        }
    }
    Err(ArrayError::UnterminatedQuote(start + 1))
}

/// Bare element starting at `start`; returns the element and the index of
/// the terminating `,` (or the end of input).
fn bare_element(inner: &str, start: usize) -> Result<(ArrayElement<'_>, usize), ArrayError> {
    let end = inner[start..]
        .find(',')
        .map_or(inner.len(), |offset| start + offset);
    let element = &inner[start..end];

    if element.is_empty() {
        return Err(ArrayError::EmptyElement(start + 1));
    }
    if let Some((offset, ch)) = element
        .char_indices()
        .find(|(_, c)| matches!(c, '{' | '}' | '"' | '\\'))
    {
        return Err(ArrayError::UnexpectedChar {
            ch,
            offset: start + offset + 1,
        });
    }

    if element == "NULL" {
        Ok((ArrayElement::Null, end))
    } else {
        Ok((ArrayElement::Text(Cow::Borrowed(element)), end))
    }
}

//! Stream definitions.
//!
//! A stream is a named sequence of records sharing one list of field
//! descriptors. The list is built once when the stream is set up and is
//! shared, unchanged, for the stream's lifetime.

use crate::types::LogType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The stream declares no fields
    #[error("Stream '{0}' declares no fields")]
    NoFields(String),

    /// Two fields share a name
    #[error("Field '{field}' is declared twice in stream '{stream}'")]
    DuplicateField { stream: String, field: String },
}

/// Static metadata for one field of a stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field (and column) name
    pub name: String,

    /// Field type; collections carry their element type
    #[serde(rename = "type")]
    pub field_type: LogType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: LogType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Element type of a collection field.
    pub fn element_type(&self) -> Option<&LogType> {
        self.field_type.element_type()
    }
}

/// Stream definition loaded from YAML.
///
/// ```yaml
/// path: conn
/// fields:
///   - name: ts
///     type: time
///   - name: tags
///     type: vector[string]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSchema {
    /// Stream path; also the table name
    pub path: String,

    /// Field descriptors in record order
    pub fields: Vec<FieldDescriptor>,
}

impl StreamSchema {
    pub fn new(path: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    /// Load a schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a schema from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let schema: StreamSchema = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Reject empty streams and duplicated field names.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::NoFields(self.path.clone()));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    stream: self.path.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// The shared, immutable descriptor list handed to stream drivers.
    pub fn shared_fields(&self) -> Arc<[FieldDescriptor]> {
        Arc::from(self.fields.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONN_YAML: &str = r#"
path: conn
fields:
  - name: ts
    type: time
  - name: id.orig_h
    type: addr
  - name: tags
    type:
      type: set
      element_type: string
  - name: history
    type: vector[vector[count]]
"#;

    #[test]
    fn test_parse_schema() {
        let schema = StreamSchema::from_yaml(CONN_YAML).unwrap();
        assert_eq!(schema.path, "conn");
        assert_eq!(
            schema.field_names(),
            vec!["ts", "id.orig_h", "tags", "history"]
        );
        assert_eq!(schema.fields[2].element_type(), Some(&LogType::String));
        assert_eq!(
            schema.fields[3].field_type,
            LogType::vector(LogType::vector(LogType::Count))
        );
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let yaml = "path: x\nfields:\n  - {name: a, type: int}\n  - {name: a, type: count}\n";
        assert!(matches!(
            StreamSchema::from_yaml(yaml),
            Err(SchemaError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_stream() {
        assert!(matches!(
            StreamSchema::from_yaml("path: x\nfields: []\n"),
            Err(SchemaError::NoFields(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let yaml = "path: x\nfields:\n  - {name: a, type: integer}\n";
        assert!(matches!(
            StreamSchema::from_yaml(yaml),
            Err(SchemaError::YamlError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONN_YAML.as_bytes()).unwrap();
        let schema = StreamSchema::from_file(file.path()).unwrap();
        assert_eq!(schema.shared_fields().len(), 4);
    }
}

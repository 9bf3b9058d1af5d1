//! # Resource Parsing
//!
//! Converts raw text in a recognized serialization into a typed in-memory
//! document. The parser is a narrow, swappable capability: the rest of the
//! engine only sees its success/failure contract.
//!
//! Recognized serializations are JSON (`.json`) and YAML (`.yaml`/`.yml`).
//! YAML documents are converted to JSON values after parsing so the
//! conformance engine checks one representation.

use std::path::Path;

use serde_json::Value;

use conforma_core::ParseError;

/// A parsed clinical resource: the document body plus the identifiers the
/// engine and reports work with. The body is opaque JSON; no field of it
/// is ever logged.
#[derive(Debug, Clone)]
pub struct ParsedResource {
    /// Resource name (file stem in directory mode, caller-supplied otherwise).
    pub name: String,
    /// Declared resource type from the document's `resourceType` field,
    /// or `"Unknown"` when the document carries none.
    pub resource_type: String,
    /// The parsed document body.
    pub body: Value,
}

impl ParsedResource {
    /// Wrap an already-parsed JSON value, extracting the resource type.
    pub fn from_value(name: impl Into<String>, body: Value) -> Self {
        let resource_type = declared_resource_type(&body);
        Self {
            name: name.into(),
            resource_type,
            body,
        }
    }
}

/// Extract the `resourceType` field, falling back to `"Unknown"`.
fn declared_resource_type(body: &Value) -> String {
    body.as_object()
        .and_then(|o| o.get("resourceType"))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
        .to_string()
}

/// Text → typed document capability.
pub trait ResourceParser: Send + Sync {
    /// Parse raw text into a [`ParsedResource`]. `name` selects the
    /// serialization when it carries a recognized extension; otherwise
    /// JSON is assumed.
    fn parse(&self, name: &str, text: &str) -> Result<ParsedResource, ParseError>;

    /// Whether this parser recognizes the file's serialization.
    fn recognizes(&self, path: &Path) -> bool;
}

/// Default parser for clinical resources: JSON and YAML serializations.
#[derive(Debug, Clone, Default)]
pub struct ClinicalResourceParser;

impl ClinicalResourceParser {
    /// Create the default parser.
    pub fn new() -> Self {
        Self
    }
}

/// Extensions this parser accepts, lowercase.
const RECOGNIZED_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

impl ResourceParser for ClinicalResourceParser {
    fn parse(&self, name: &str, text: &str) -> Result<ParsedResource, ParseError> {
        let lowered = name.to_ascii_lowercase();
        let body: Value = if lowered.ends_with(".yaml") || lowered.ends_with(".yml") {
            serde_yaml::from_str(text)
                .map_err(|e| ParseError::new(name, format!("invalid YAML: {e}")))?
        } else {
            serde_json::from_str(text)
                .map_err(|e| ParseError::new(name, format!("invalid JSON: {e}")))?
        };

        // Strip the extension so reports key on the bare resource name.
        let stem = name
            .rsplit_once('.')
            .map_or(name, |(stem, ext)| {
                if RECOGNIZED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                    stem
                } else {
                    name
                }
            });

        Ok(ParsedResource::from_value(stem, body))
    }

    fn recognizes(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| RECOGNIZED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
    }
}

//! # Conformance Engine
//!
//! Given a typed document and a set of profile identifiers, a
//! [`ConformanceEngine`] returns *native findings* in its own severity
//! vocabulary. The validator translates those through an explicit mapping
//! table into the stack's four [`Severity`] levels, so swapping engines
//! never changes the meaning of a report.
//!
//! The default engine is backed by the `jsonschema` crate (Draft 2020-12):
//! a profile identifier is the filename of a `*.schema.json` file loaded
//! from a profile directory at construction time. `$ref` resolution is
//! local-only — unresolved URIs fall back to a permissive schema rather
//! than triggering network requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;

use conforma_core::issue::codes;
use conforma_core::{EngineError, Severity};

use crate::parser::ParsedResource;

/// Native severity vocabulary of a conformance engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineSeverity {
    /// Advisory remark.
    Note,
    /// Questionable but acceptable content.
    Caution,
    /// A constraint violation.
    Violation,
    /// The engine could not meaningfully check the document.
    Abort,
}

/// Explicit severity-mapping table from engine vocabulary to the stack's
/// four levels. Exhaustive by construction: adding an engine severity
/// forces a mapping decision here.
pub fn map_severity(native: EngineSeverity) -> Severity {
    match native {
        EngineSeverity::Note => Severity::Information,
        EngineSeverity::Caution => Severity::Warning,
        EngineSeverity::Violation => Severity::Error,
        EngineSeverity::Abort => Severity::Fatal,
    }
}

/// One native finding from a conformance engine.
#[derive(Debug, Clone)]
pub struct EngineFinding {
    /// Native severity; mapped via [`map_severity`].
    pub severity: EngineSeverity,
    /// Stable machine code.
    pub code: String,
    /// Diagnostic text.
    pub message: String,
    /// Path to the violating element (JSON Pointer), empty when
    /// document-level.
    pub path: String,
}

impl EngineFinding {
    fn new(
        severity: EngineSeverity,
        code: &str,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Typed document + profile identifiers → native findings.
///
/// Implementations must be cheap to call concurrently; the batch
/// orchestrator shares one engine across all workers.
pub trait ConformanceEngine: Send + Sync {
    /// Check one document against the given profiles.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] only when the engine itself fails; findings
    /// about the document are data, not errors.
    fn check(
        &self,
        resource: &ParsedResource,
        profiles: &[String],
    ) -> Result<Vec<EngineFinding>, EngineError>;
}

/// Resolves `$ref` URIs against the loaded profile set; anything unknown
/// resolves to a permissive schema so validation never reaches the network.
struct LocalProfileRetriever {
    schemas_by_key: HashMap<String, Value>,
}

impl Retrieve for LocalProfileRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.schemas_by_key.get(uri_str) {
            return Ok(value.clone());
        }
        // Fall back to the bare filename for relative references.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_key.get(filename) {
            return Ok(value.clone());
        }
        Ok(serde_json::json!({}))
    }
}

/// JSON Schema (Draft 2020-12) backed conformance engine.
///
/// Profiles are `*.schema.json` files loaded and compiled once at
/// construction; compiled validators are shared across threads.
pub struct SchemaConformanceEngine {
    /// Root directory the profiles were loaded from.
    profile_dir: PathBuf,
    /// Compiled validators keyed by profile filename.
    validators: HashMap<String, Validator>,
}

impl SchemaConformanceEngine {
    /// Engine with no profiles loaded: only the base structural check
    /// runs, and every requested profile reports `UNKNOWN_PROFILE`.
    pub fn empty() -> Self {
        Self {
            profile_dir: PathBuf::new(),
            validators: HashMap::new(),
        }
    }

    /// Load and compile every `*.schema.json` file in `profile_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] naming the offending schema file if one
    /// cannot be read, parsed, or compiled.
    pub fn from_dir(profile_dir: impl AsRef<Path>) -> Result<Self, EngineError> {
        let profile_dir = profile_dir.as_ref().to_path_buf();

        let entries = std::fs::read_dir(&profile_dir).map_err(|e| {
            EngineError::new(
                profile_dir.display().to_string(),
                format!("cannot read profile directory: {e}"),
            )
        })?;

        let mut raw = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                EngineError::new(profile_dir.display().to_string(), e.to_string())
            })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".schema.json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|e| EngineError::new(name, e.to_string()))?;
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| EngineError::new(name, format!("invalid JSON: {e}")))?;
            raw.insert(name.to_string(), value);
        }

        // Every profile is registered under its filename and its own $id
        // so cross-profile $refs resolve locally.
        let mut schemas_by_key = raw.clone();
        for value in raw.values() {
            if let Some(id) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_key.insert(id.to_string(), value.clone());
            }
        }

        let mut validators = HashMap::new();
        for (name, value) in &raw {
            let validator = jsonschema::options()
                .with_draft(jsonschema::Draft::Draft202012)
                .with_retriever(LocalProfileRetriever {
                    schemas_by_key: schemas_by_key.clone(),
                })
                .build(value)
                .map_err(|e| {
                    EngineError::new(name.clone(), format!("schema does not compile: {e}"))
                })?;
            validators.insert(name.clone(), validator);
        }

        tracing::debug!(
            profile_dir = %profile_dir.display(),
            profiles = validators.len(),
            "loaded conformance profiles"
        );

        Ok(Self {
            profile_dir,
            validators,
        })
    }

    /// Directory the profiles were loaded from.
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// Names of all loaded profiles, sorted.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl ConformanceEngine for SchemaConformanceEngine {
    fn check(
        &self,
        resource: &ParsedResource,
        profiles: &[String],
    ) -> Result<Vec<EngineFinding>, EngineError> {
        let mut findings = Vec::new();

        // Base structural check: a clinical resource is a JSON object that
        // declares its type.
        let declares_type = resource
            .body
            .as_object()
            .is_some_and(|o| o.get("resourceType").is_some_and(Value::is_string));
        if !declares_type {
            findings.push(EngineFinding::new(
                EngineSeverity::Violation,
                codes::STRUCTURE_ERROR,
                "document is not an object with a string resourceType",
                "/resourceType",
            ));
        }

        for profile in profiles {
            let Some(validator) = self.validators.get(profile) else {
                findings.push(EngineFinding::new(
                    EngineSeverity::Abort,
                    codes::UNKNOWN_PROFILE,
                    format!("profile '{profile}' is not loaded"),
                    "",
                ));
                continue;
            };

            for error in validator.iter_errors(&resource.body) {
                // Soft keywords degrade to a caution rather than a violation.
                let severity = if error.schema_path.to_string().ends_with("/format") {
                    EngineSeverity::Caution
                } else {
                    EngineSeverity::Violation
                };
                findings.push(EngineFinding::new(
                    severity,
                    codes::SCHEMA_VIOLATION,
                    error.to_string(),
                    error.instance_path.to_string(),
                ));
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PATIENT_SCHEMA: &str = r#"{
        "$id": "https://profiles.conforma.dev/patient.schema.json",
        "type": "object",
        "required": ["resourceType", "id"],
        "properties": {
            "resourceType": {"const": "Patient"},
            "id": {"type": "string"},
            "birthDate": {"type": "string", "format": "date"}
        }
    }"#;

    fn engine_with_patient_profile() -> (tempfile::TempDir, SchemaConformanceEngine) {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("patient.schema.json")).unwrap();
        f.write_all(PATIENT_SCHEMA.as_bytes()).unwrap();
        let engine = SchemaConformanceEngine::from_dir(dir.path()).unwrap();
        (dir, engine)
    }

    fn resource(json: &str) -> ParsedResource {
        ParsedResource::from_value("r", serde_json::from_str(json).unwrap())
    }

    #[test]
    fn severity_mapping_table_is_order_preserving() {
        assert_eq!(map_severity(EngineSeverity::Note), Severity::Information);
        assert_eq!(map_severity(EngineSeverity::Caution), Severity::Warning);
        assert_eq!(map_severity(EngineSeverity::Violation), Severity::Error);
        assert_eq!(map_severity(EngineSeverity::Abort), Severity::Fatal);
    }

    #[test]
    fn conformant_document_yields_no_findings() {
        let (_dir, engine) = engine_with_patient_profile();
        let r = resource(r#"{"resourceType": "Patient", "id": "p1"}"#);
        let findings = engine
            .check(&r, &["patient.schema.json".to_string()])
            .unwrap();
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn missing_required_field_is_a_violation() {
        let (_dir, engine) = engine_with_patient_profile();
        let r = resource(r#"{"resourceType": "Patient"}"#);
        let findings = engine
            .check(&r, &["patient.schema.json".to_string()])
            .unwrap();
        assert!(findings
            .iter()
            .any(|f| f.severity == EngineSeverity::Violation
                && f.code == codes::SCHEMA_VIOLATION));
    }

    #[test]
    fn document_without_resource_type_gets_structure_error() {
        let (_dir, engine) = engine_with_patient_profile();
        let r = resource(r#"{"id": "p1"}"#);
        let findings = engine.check(&r, &[]).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, codes::STRUCTURE_ERROR);
        assert_eq!(findings[0].severity, EngineSeverity::Violation);
    }

    #[test]
    fn unknown_profile_is_an_abort_finding_not_an_error() {
        let (_dir, engine) = engine_with_patient_profile();
        let r = resource(r#"{"resourceType": "Patient", "id": "p1"}"#);
        let findings = engine
            .check(&r, &["nonexistent.schema.json".to_string()])
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, EngineSeverity::Abort);
        assert_eq!(findings[0].code, codes::UNKNOWN_PROFILE);
    }

    #[test]
    fn profile_names_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.schema.json", "a.schema.json"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let engine = SchemaConformanceEngine::from_dir(dir.path()).unwrap();
        assert_eq!(engine.profile_names(), ["a.schema.json", "b.schema.json"]);
    }
}

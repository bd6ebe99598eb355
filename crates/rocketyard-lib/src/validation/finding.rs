use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::options::ValidationOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of finding codes shared by every validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RequiredFieldMissing,
    InvalidType,
    InvalidValue,
    ConstraintViolation,
    ReferenceError,
    CircularReference,
    UnusualValue,
    RecommendedFieldMissing,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::RequiredFieldMissing => "required-field-missing",
            ErrorCode::InvalidType => "invalid-type",
            ErrorCode::InvalidValue => "invalid-value",
            ErrorCode::ConstraintViolation => "constraint-violation",
            ErrorCode::ReferenceError => "reference-error",
            ErrorCode::CircularReference => "circular-reference",
            ErrorCode::UnusualValue => "unusual-value",
            ErrorCode::RecommendedFieldMissing => "recommended-field-missing",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub message: String,
    /// Dotted/bracketed locator of the offending field; empty for the entity itself.
    pub path: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Finding {
    pub fn new(
        severity: Severity,
        code: ErrorCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            code,
            severity,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn error(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, path, message)
    }

    pub fn warning(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, path, message)
    }

    pub fn info(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, path, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Re-root the finding under an element of a collection: `mass` becomes
    /// `[3].mass`, an entity-level finding becomes `[3]`.
    pub(crate) fn under_index(mut self, index: usize) -> Self {
        self.path = if self.path.is_empty() {
            format!("[{index}]")
        } else if self.path.starts_with('[') {
            format!("[{index}]{}", self.path)
        } else {
            format!("[{index}].{}", self.path)
        };
        self
    }
}

/// Append-only collector handed to the individual validators.
#[derive(Debug, Default)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.items.push(finding);
    }

    pub fn error(&mut self, code: ErrorCode, path: impl Into<String>, message: impl Into<String>) {
        self.push(Finding::error(code, path, message));
    }

    pub fn warning(
        &mut self,
        code: ErrorCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Finding::warning(code, path, message));
    }

    pub fn info(&mut self, code: ErrorCode, path: impl Into<String>, message: impl Into<String>) {
        self.push(Finding::info(code, path, message));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Finding> {
        self.items
    }
}

impl Extend<Finding> for Findings {
    fn extend<T: IntoIterator<Item = Finding>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

/// Outcome of validating one entity or one collection.
///
/// `valid` is false exactly when at least one error-severity finding was
/// produced, even if `maxErrors` truncated the reported list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub infos: Vec<Finding>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Split raw findings by severity and apply the reporting options.
    ///
    /// When errors exceed `max_errors` the list is truncated and a single
    /// warning naming the suppressed count is appended. That warning is kept
    /// even when `include_warnings` is off so truncation is never silent.
    pub fn assemble(findings: Vec<Finding>, options: &ValidationOptions) -> Self {
        let mut result = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => result.errors.push(finding),
                Severity::Warning => result.warnings.push(finding),
                Severity::Info => result.infos.push(finding),
            }
        }
        result.valid = result.errors.is_empty();

        if !options.include_warnings {
            result.warnings.clear();
        }
        if !options.include_info {
            result.infos.clear();
        }

        if result.errors.len() > options.max_errors {
            let suppressed = result.errors.len() - options.max_errors;
            result.errors.truncate(options.max_errors);
            result.warnings.push(
                Finding::warning(
                    ErrorCode::UnusualValue,
                    "",
                    format!("{suppressed} more errors suppressed"),
                )
                .with_details(json!({ "suppressed": suppressed })),
            );
        }

        result
    }

    /// Every reported finding, errors first.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.infos.iter())
    }

    /// Reported findings carrying `code`.
    pub fn with_code(&self, code: ErrorCode) -> Vec<&Finding> {
        self.findings().filter(|f| f.code == code).collect()
    }

    /// First reported finding at exactly `path`.
    pub fn at_path(&self, path: &str) -> Option<&Finding> {
        self.findings().find(|f| f.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_prefix_handles_root_and_nested_paths() {
        let root = Finding::error(ErrorCode::InvalidType, "", "x").under_index(2);
        assert_eq!(root.path, "[2]");
        let nested = Finding::error(ErrorCode::InvalidType, "mass.dry", "x").under_index(2);
        assert_eq!(nested.path, "[2].mass.dry");
        let indexed = Finding::error(ErrorCode::InvalidType, "[0].id", "x").under_index(1);
        assert_eq!(indexed.path, "[1][0].id");
    }

    #[test]
    fn truncation_appends_single_suppression_warning() {
        let findings = (0..5)
            .map(|i| Finding::error(ErrorCode::InvalidValue, format!("f{i}"), "bad"))
            .collect();
        let options = ValidationOptions {
            max_errors: 2,
            include_warnings: false,
            ..ValidationOptions::default()
        };
        let result = ValidationResult::assemble(findings, &options);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].details,
            Some(json!({ "suppressed": 3 }))
        );
    }

    #[test]
    fn warnings_alone_keep_result_valid() {
        let findings = vec![Finding::warning(ErrorCode::UnusualValue, "density", "zero")];
        let result = ValidationResult::assemble(findings, &ValidationOptions::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn codes_serialize_in_kebab_case() {
        let encoded = serde_json::to_string(&ErrorCode::RequiredFieldMissing).expect("encode");
        assert_eq!(encoded, "\"required-field-missing\"");
    }
}

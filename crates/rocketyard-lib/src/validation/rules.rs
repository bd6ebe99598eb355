//! Custom validation rules registered at runtime.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::warn;

use super::finding::{ErrorCode, Finding, Severity};
use super::options::ValidationOptions;
use super::schema::EntityType;

/// What a custom rule reports about one entity. A passing outcome produces
/// no finding; a failing one becomes a single finding whose unset parts fall
/// back to an entity-level constraint-violation error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleOutcome {
    pub valid: bool,
    pub message: Option<String>,
    pub path: Option<String>,
    pub code: Option<ErrorCode>,
    pub severity: Option<Severity>,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Information a rule receives alongside the entity.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub entity_type: EntityType,
    pub options: &'a ValidationOptions,
}

pub trait ValidationRule: Send + Sync {
    fn evaluate(&self, entity: &Value, context: &RuleContext<'_>) -> anyhow::Result<RuleOutcome>;
}

impl<F> ValidationRule for F
where
    F: Fn(&Value, &RuleContext<'_>) -> anyhow::Result<RuleOutcome> + Send + Sync,
{
    fn evaluate(&self, entity: &Value, context: &RuleContext<'_>) -> anyhow::Result<RuleOutcome> {
        self(entity, context)
    }
}

/// Run `rule` behind a failure boundary. Errors and panics are logged and
/// yield no finding.
pub(crate) fn run_rule(
    name: &str,
    rule: &dyn ValidationRule,
    entity: &Value,
    context: &RuleContext<'_>,
) -> Option<Finding> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(entity, context)));

    match outcome {
        Ok(Ok(outcome)) if outcome.valid => None,
        Ok(Ok(outcome)) => Some(Finding::new(
            outcome.severity.unwrap_or(Severity::Error),
            outcome.code.unwrap_or(ErrorCode::ConstraintViolation),
            outcome.path.unwrap_or_default(),
            outcome
                .message
                .unwrap_or_else(|| format!("Custom rule '{name}' failed")),
        )),
        Ok(Err(err)) => {
            warn!(rule = name, entity_type = %context.entity_type, error = %err, "custom rule failed");
            None
        }
        Err(_) => {
            warn!(rule = name, entity_type = %context.entity_type, "custom rule panicked");
            None
        }
    }
}

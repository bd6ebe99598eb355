use serde::{Deserialize, Serialize};

/// Per-call validation switches. Deserializes from camelCase JSON; omitted
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Reuse findings for entities already validated under the same `type:id`.
    pub enable_cache: bool,
    /// Exposed to custom rules through their context; built-in checks ignore it.
    pub strict_mode: bool,
    /// Merge schema defaults into missing fields before validating.
    pub auto_fix: bool,
    pub max_errors: usize,
    pub include_warnings: bool,
    pub include_info: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            enable_cache: true,
            strict_mode: false,
            auto_fix: false,
            max_errors: 100,
            include_warnings: true,
            include_info: true,
        }
    }
}

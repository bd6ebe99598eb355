use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the rocketyard library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Malformed catalog *content* is never reported through this type; it is the
/// subject of validation and surfaces as findings. These variants cover the
/// failures around that content: files that cannot be read or decoded,
/// duplicate identifiers, and invalid configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog file could not be located at the resolved path.
    #[error("catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    /// Raised when the catalog document does not have the expected top-level shape.
    #[error("unsupported catalog layout: {message}")]
    UnsupportedCatalog { message: String },

    /// Raised when a record could not be decoded into its typed form.
    #[error("invalid {kind} record '{id}': {message}")]
    InvalidRecord {
        kind: &'static str,
        id: String,
        message: String,
    },

    /// Raised when two catalog records of the same kind share an identifier.
    #[error("duplicate {kind} id encountered: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// Raised when a part id could not be resolved in the catalog.
    #[error("unknown part: {id}{}", did_you_mean(.suggestions))]
    UnknownPart { id: String, suggestions: Vec<String> },

    /// Raised when configuration values are out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Hint appended to an "unknown ..." message: `. Did you mean 'a', 'b' or 'c'?`,
/// or nothing when there is no close match.
pub(crate) fn did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(". Did you mean '{only}'?"),
        [head @ .., last] => {
            let quoted: Vec<String> = head.iter().map(|s| format!("'{s}'")).collect();
            format!(". Did you mean {} or '{last}'?", quoted.join(", "))
        }
    }
}

/// Rank `candidates` by similarity to `needle` and return the closest few.
pub(crate) fn suggest<'a, I>(needle: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = needle.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|candidate| {
            (
                strsim::jaro_winkler(&needle, &candidate.to_lowercase()),
                candidate,
            )
        })
        .filter(|(score, _)| *score >= 0.85)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_part_lists_suggestions() {
        let err = Error::UnknownPart {
            id: "fuelTank".to_string(),
            suggestions: vec!["fuelTankSmall".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown part: fuelTank. Did you mean 'fuelTankSmall'?"
        );
    }

    #[test]
    fn suggest_prefers_close_matches() {
        let names = ["LiquidFuel", "Oxidizer", "MonoPropellant"];
        let suggestions = suggest("LiquidFuell", names.iter().copied());
        assert_eq!(suggestions.first().map(String::as_str), Some("LiquidFuel"));
        assert!(suggest("Xenon", names.iter().copied()).is_empty());
    }

    #[test]
    fn hint_lists_alternatives_with_or() {
        assert_eq!(did_you_mean(&[]), "");
        let pair = ["lv-t30".to_string(), "lv-t45".to_string()];
        assert_eq!(did_you_mean(&pair), ". Did you mean 'lv-t30' or 'lv-t45'?");
        let three = ["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(did_you_mean(&three), ". Did you mean 'a', 'b' or 'c'?");
    }
}

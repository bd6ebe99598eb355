//! Validate command handler: schema and relation checks over a catalog file.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use rocketyard_lib::validation::Finding;
use rocketyard_lib::{AppConfig, CatalogReport, DataValidator, RawCatalog};

/// Handle the validate subcommand. Returns whether the catalog is valid.
pub fn handle_validate(catalog_path: &Path, config: &AppConfig, json: bool) -> Result<bool> {
    let raw = RawCatalog::from_path(catalog_path)
        .with_context(|| format!("failed to load catalog from {}", catalog_path.display()))?;

    let validator = DataValidator::new();
    let report = raw.validate(&validator, &config.validation);
    info!(
        valid = report.valid,
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validated catalog"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report.valid)
}

fn print_report(report: &CatalogReport) {
    for (label, result) in report.sections() {
        println!(
            "{:<16} {:>4} errors {:>4} warnings {:>4} info",
            label,
            result.errors.len(),
            result.warnings.len(),
            result.infos.len()
        );
        for finding in result.findings() {
            print_finding(finding);
        }
    }

    if report.valid {
        println!("Catalog is valid.");
    } else {
        println!("Catalog is invalid: {} errors.", report.error_count());
    }
}

fn print_finding(finding: &Finding) {
    let path = if finding.path.is_empty() { "<root>" } else { finding.path.as_str() };
    println!(
        "  {:<8} {:<32} {:<26} {}",
        finding.severity.as_str(),
        path,
        finding.code.as_str(),
        finding.message
    );
}

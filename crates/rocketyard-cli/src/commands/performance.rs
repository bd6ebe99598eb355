//! Performance command handler: build a rocket and report its figures.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use rocketyard_lib::{AppConfig, Catalog, PerformanceReport, RocketAssembler, StructureReport};

use crate::rocket_file::RocketFile;

/// Handle the performance subcommand.
pub fn handle_performance(
    catalog_path: &Path,
    rocket_path: &Path,
    config: &AppConfig,
    payload: f64,
    altitude: f64,
) -> Result<()> {
    let catalog = Catalog::from_path(catalog_path)
        .with_context(|| format!("failed to load catalog from {}", catalog_path.display()))?;
    let rocket = RocketFile::from_path(rocket_path)?.assemble(Arc::new(catalog))?;

    print_rocket(&rocket);
    let structure = rocket.validate_structure(&config.structure);
    print_structure(&structure);

    let report = rocket.performance(&config.physics, payload, altitude);
    print_performance(&report, altitude);
    Ok(())
}

fn print_rocket(rocket: &RocketAssembler) {
    println!(
        "Rocket: {} parts, {} connections",
        rocket.instance_count(),
        rocket.connections().len()
    );
    println!("{:<16} {:>14.0}", "Cost", rocket.total_cost());
    println!("{:<16} {:>14.0} kg", "Empty mass", rocket.total_dry_mass());
}

fn print_structure(report: &StructureReport) {
    if report.issues.is_empty() {
        println!("Structure: ok");
    } else {
        println!(
            "Structure: {} ({} issues)",
            if report.valid { "ok" } else { "invalid" },
            report.issues.len()
        );
        for issue in &report.issues {
            println!(
                "  {:<8} {:<22} {}",
                issue.severity.as_str(),
                issue.code.as_str(),
                issue.message
            );
        }
    }
}

fn print_performance(report: &PerformanceReport, altitude: f64) {
    println!("Performance at {altitude:.0} m:");
    println!("{:<16} {:>14.1} m/s", "Delta-v", report.delta_v);
    println!("{:<16} {:>14.2}", "TWR", report.twr);
    println!("{:<16} {:>14.1} s", "Burn time", report.burn_time);
    println!("{:<16} {:>14.4} m/s/kg", "Efficiency", report.efficiency);
    println!("{:<16} {:>14.0} m", "Max height", report.estimated_max_height);
    println!("{:<16} {:>14.0} kg", "Total mass", report.total_mass);
    println!("{:<16} {:>14.0} kg", "Dry mass", report.dry_mass);
    println!("{:<16} {:>14.0} kg", "Fuel mass", report.fuel_mass);
}

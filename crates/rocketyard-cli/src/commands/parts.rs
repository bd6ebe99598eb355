//! Parts command handler for listing catalog parts.

use std::path::Path;

use anyhow::{Context, Result};

use rocketyard_lib::Catalog;

/// Handle the parts subcommand.
pub fn handle_list_parts(catalog_path: &Path) -> Result<()> {
    let catalog = Catalog::from_path(catalog_path)
        .with_context(|| format!("failed to load catalog from {}", catalog_path.display()))?;
    print_parts(&catalog);
    Ok(())
}

/// Print the catalog parts to stdout in a formatted table, sorted by id.
fn print_parts(catalog: &Catalog) {
    let parts = catalog.parts_sorted();
    if parts.is_empty() {
        println!("No parts available in catalog.");
        return;
    }

    println!("Available parts ({}):", parts.len());
    println!(
        "{:<20} {:<12} {:>12} {:>12} {:>8}",
        "Id", "Category", "Dry (kg)", "Wet (kg)", "Cost"
    );
    for part in parts {
        println!(
            "{:<20} {:<12} {:>12.0} {:>12.0} {:>8.0}",
            part.id,
            part.category.as_str(),
            part.mass.dry,
            part.mass.wet,
            part.cost
        );
    }
}

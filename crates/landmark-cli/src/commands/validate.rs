//! The `landmark validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use landmark_core::catalog::{load_catalog, validate_catalog, LandmarkCatalog};

pub fn execute(catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = match &catalog_path {
        Some(path) => load_catalog(path)
            .with_context(|| format!("invalid catalog: {}", path.display()))?,
        None => LandmarkCatalog::reference()?,
    };

    let label = catalog_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "reference".to_string());
    println!("Catalog: {label} ({} landmarks)", catalog.len());

    for landmark in catalog.landmarks() {
        let options = catalog.classification_for(landmark);
        println!("  {landmark}: {} / {}", options.expected, options.other);
    }

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .landmark
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}

//! The `landmark questions` command.

use std::path::PathBuf;

use anyhow::Result;

use landmark_core::bank::QuestionBankLoader;
use landmark_remote::config::load_config_from;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let config = load_config_from(config_path.as_deref())?;
    let catalog = config.load_catalog()?;
    let source = config.question_source()?;

    eprintln!("Fetching questions from {}", config.questions_url);
    let bank = QuestionBankLoader::new(source).load().await;

    if bank.is_empty() {
        println!("No remote questions available. Catalog defaults are in use.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Area", "Questions", "In catalog"]);
    for (area, count) in bank.area_counts() {
        table.add_row(vec![
            Cell::new(area),
            Cell::new(count),
            Cell::new(if catalog.contains(area) { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    println!("{} question(s) across {} area(s).", bank.len(), bank.area_counts().len());

    let missing: Vec<_> = catalog
        .landmarks()
        .iter()
        .filter(|l| bank.questions_for(l).is_empty())
        .map(|l| l.as_str())
        .collect();
    if !missing.is_empty() {
        println!("Using catalog defaults for: {}", missing.join(", "));
    }

    Ok(())
}

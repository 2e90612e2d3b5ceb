//! Compile command - fold reviewed annotations into data dictionaries.

use std::path::PathBuf;

use bagel::{AnnotationTable, DictionaryCompiler};
use colored::Colorize;

pub fn run(
    annotations: PathBuf,
    dictionaries: PathBuf,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    if !annotations.exists() {
        return Err(format!("File not found: {}", annotations.display()).into());
    }

    let table = AnnotationTable::load(&annotations)?;
    println!(
        "{} {} ({} rows)",
        "Compiling".cyan().bold(),
        annotations.display().to_string().white(),
        table.len()
    );

    let report = DictionaryCompiler::new().compile_table(&table, &dictionaries, &output)?;

    println!();
    println!(
        "Wrote {} data dictionaries to {}",
        report.written.len().to_string().white().bold(),
        output.display().to_string().white()
    );
    if !report.invalid.is_empty() {
        println!(
            "{} {}",
            "Not schema-valid:".yellow().bold(),
            report.invalid.join(", ")
        );
    }
    for (dataset, reason) in &report.skipped {
        println!("{} {} {}", "Skipped".red().bold(), dataset.red(), reason);
    }
    if report.invalid.is_empty() && report.skipped.is_empty() {
        println!("{}", "All dictionaries valid.".green());
    }

    Ok(())
}

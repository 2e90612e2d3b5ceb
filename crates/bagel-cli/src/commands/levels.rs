//! Levels command - list columns and levels across a corpus.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use bagel::{Bagel, BagelConfig};
use colored::Colorize;

/// File name of the JSON run report.
const REPORT_FILE: &str = "bulk_annotation_report.json";

pub fn run(
    index: PathBuf,
    corpus: PathBuf,
    output: PathBuf,
    dry_run: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !index.exists() {
        return Err(format!("Index not found: {}", index.display()).into());
    }
    if !corpus.is_dir() {
        return Err(format!("Corpus root is not a directory: {}", corpus.display()).into());
    }

    println!(
        "{} {}",
        "Scanning corpus".cyan().bold(),
        corpus.display().to_string().white()
    );
    if let Some(n) = dry_run {
        println!("{}", format!("Dry run: first {} datasets only", n).yellow());
    }

    let config = BagelConfig {
        dry_run_limit: dry_run,
        ..BagelConfig::default()
    };
    let run = Bagel::with_config(config).run_index(&index, &corpus)?;
    let written = run.write(&output)?;

    let report_path = output.join(REPORT_FILE);
    let writer = BufWriter::new(File::create(&report_path)?);
    serde_json::to_writer_pretty(writer, &run.report)?;

    let report = &run.report;
    println!();
    println!("{}", "Datasets:".yellow().bold());
    println!("  Seen:      {}", report.datasets_seen.to_string().white());
    println!("  Processed: {}", report.processed.to_string().green());
    println!("  Excluded:  {}", report.excluded.len().to_string().blue());
    println!("  Skipped:   {}", report.skipped.len().to_string().red());
    for skipped in &report.skipped {
        println!("    {} {}", skipped.name.red(), skipped.reason);
    }
    println!();
    println!(
        "Emitted {} rows ({} columns)",
        report.rows_emitted.to_string().white().bold(),
        run.table.header_rows().count().to_string().white()
    );
    println!();
    super::print_observations(&report.observations);

    println!();
    for path in written.iter().chain(std::iter::once(&report_path)) {
        println!(
            "{} {}",
            "Saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}

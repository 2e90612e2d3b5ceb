//! Example: Describe a single participants table.
//!
//! Usage:
//!   cargo run --example describe -- <participants.tsv> [participants.json]
//!
//! Example:
//!   cargo run --example describe -- ds000001/participants.tsv ds000001/participants.json

use std::env;
use std::path::Path;

use bagel::input::Parser;
use bagel::validation::SanityChecker;
use bagel::{DataDictionary, DatasetRowBuilder};

fn main() -> bagel::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example describe -- <participants.tsv> [participants.json]");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let (table, source) = Parser::new().parse_file(path)?;
    let dictionary = match args.get(2) {
        Some(json) => DataDictionary::load_optional(json)?,
        None => DataDictionary::new(),
    };

    let dataset = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Participants table: {}", source.file);
    println!("  Rows: {}  Columns: {}", source.row_count, source.column_count);
    println!("{}", separator);
    println!();

    let rows = DatasetRowBuilder::new().build(&dataset, &table, &dictionary);
    for header in rows.header_rows() {
        println!(
            "  {:24} {:16} levels={:<4} term={}",
            header.column, header.column_type, header.nb_levels, header.controlled_term
        );
        for level in rows
            .level_rows()
            .filter(|r| r.column == header.column)
        {
            println!("      {:20} {}", level.value, level.description);
        }
    }
    println!();

    let observations = SanityChecker::new().check(&rows);
    println!("## Observations ({} total)", observations.len());
    for obs in &observations {
        println!("  [{}] {}", obs.severity.label(), obs.description);
    }

    Ok(())
}

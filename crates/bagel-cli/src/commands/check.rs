//! Check command - re-run invariant checks on a levels table.

use std::path::PathBuf;

use bagel::validation::SanityChecker;
use bagel::LevelsTable;
use colored::Colorize;

pub fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let table = LevelsTable::read_tsv(&file)?;
    println!(
        "{} {} ({} rows)",
        "Checking".cyan().bold(),
        file.display().to_string().white(),
        table.len()
    );
    println!();

    let observations = SanityChecker::new().check(&table);
    super::print_observations(&observations);

    Ok(())
}

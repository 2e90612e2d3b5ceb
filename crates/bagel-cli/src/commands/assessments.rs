//! Assessments command - convert the assessment catalogue for annotation.

use std::path::PathBuf;

use bagel::assessments::AssessmentCatalogue;
use colored::Colorize;

pub fn run(file: PathBuf, output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let catalogue = AssessmentCatalogue::load(&file)?;
    catalogue.write_tsv(&output)?;

    println!(
        "Converted {} assessments",
        catalogue.assessments.len().to_string().white().bold()
    );
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output.display().to_string().white()
    );

    Ok(())
}

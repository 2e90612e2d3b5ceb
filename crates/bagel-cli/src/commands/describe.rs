//! Add-description command - fill in missing Description fields.

use std::path::PathBuf;

use bagel::annotation::add_description_file;
use colored::Colorize;
use tracing::warn;

pub fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let changed = add_description_file(&file)?;
    warn!(path = %file.display(), "Have written: {}", changed);

    if changed {
        println!(
            "{} {}",
            "Added descriptions to".green().bold(),
            file.display().to_string().white()
        );
    } else {
        println!("{}", "Every entry already has a description.".green());
    }

    Ok(())
}

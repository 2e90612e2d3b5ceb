//! Dataset-name command - print the name of a BIDS dataset.

use std::path::PathBuf;

use bagel::input::dataset_name;

pub fn run(dataset: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    if !dataset.is_dir() {
        return Err(format!("Not a directory: {}", dataset.display()).into());
    }

    match dataset_name(&dataset) {
        Some(name) => println!("{}", name),
        None => println!("None"),
    }

    Ok(())
}

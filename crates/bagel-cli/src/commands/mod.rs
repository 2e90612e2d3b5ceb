//! CLI command implementations.

pub mod assessments;
pub mod check;
pub mod compile;
pub mod dataset_name;
pub mod describe;
pub mod levels;

use colored::Colorize;
use bagel::{Observation, Severity};

/// Print observations grouped under a heading, errors first.
pub(crate) fn print_observations(observations: &[Observation]) {
    if observations.is_empty() {
        println!("{}", "No invariant violations found.".green());
        return;
    }

    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.dataset.cmp(&b.dataset)));

    println!("{}", "Observations:".yellow().bold());
    for obs in sorted {
        let severity = match obs.severity {
            Severity::Error => obs.severity.label().red().bold(),
            Severity::Warning => obs.severity.label().yellow().bold(),
            Severity::Info => obs.severity.label().blue().bold(),
        };
        println!(
            "  {:8} {:12} {}",
            severity,
            obs.dataset.white(),
            obs.description
        );
    }
}

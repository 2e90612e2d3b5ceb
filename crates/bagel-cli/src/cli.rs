//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;

/// Bagel: bulk annotation of BIDS participants tables
#[derive(Parser)]
#[command(name = "bagel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the columns and levels of every participants.tsv in a corpus
    Levels {
        /// Corpus index (name, has_mri, has_participant_tsv, has_participant_json)
        #[arg(value_name = "INDEX")]
        index: PathBuf,

        /// Directory holding one sub-directory per dataset
        #[arg(value_name = "CORPUS_ROOT")]
        corpus: PathBuf,

        /// Output directory for the annotation tables
        #[arg(short, long, default_value = "outputs")]
        output: PathBuf,

        /// Only process the first N datasets of the index
        #[arg(long, value_name = "N")]
        dry_run: Option<usize>,
    },

    /// Re-run the invariant checks on a levels table
    Check {
        /// Path to bulk_annotation_levels.tsv
        #[arg(value_name = "LEVELS_TSV")]
        file: PathBuf,
    },

    /// Compile reviewed annotations into data dictionaries
    Compile {
        /// Annotated levels table
        #[arg(value_name = "ANNOTATIONS_TSV")]
        annotations: PathBuf,

        /// Directory holding one sub-directory per dataset with its participants.json
        #[arg(value_name = "DICTIONARIES_ROOT")]
        dictionaries: PathBuf,

        /// Output directory for <dataset>.json files
        #[arg(short, long, default_value = "outputs/data_dictionaries")]
        output: PathBuf,
    },

    /// Add a stand-in Description to every entry of a data dictionary lacking one
    AddDescription {
        /// Data dictionary JSON, rewritten in place
        #[arg(value_name = "JSON")]
        file: PathBuf,
    },

    /// Print the Name from a dataset's dataset_description.json
    DatasetName {
        /// Dataset root directory
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,
    },

    /// Convert an assessment catalogue into a table for the annotation tool
    Assessments {
        /// Catalogue JSON with an "nb:Assessment" list
        #[arg(value_name = "JSON")]
        file: PathBuf,

        /// Output TSV path
        #[arg(short, long, default_value = "outputs/assessments.tsv")]
        output: PathBuf,
    },
}

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean farm harvest CSV files and estimate tons never harvested by cause",
    long_about = None
)]
pub struct Cli {
    /// Directory (relative to --root) holding the input CSV files
    #[arg(short = 's', long = "subdirectory", alias = "subdir")]
    pub subdirectory: PathBuf,
    /// Concatenate every production file from this run into one combined file
    #[arg(short = 'm', long = "merge")]
    pub merge: bool,
    /// YAML file overriding the default pipeline configuration
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Cause-rate table (defaults to causes/farm_not_harvested_causes.csv)
    #[arg(long = "causes")]
    pub causes: Option<PathBuf>,
    /// Working directory containing raw/, cleaned/ and production/
    #[arg(long = "root", default_value = ".")]
    pub root: PathBuf,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Keep a leading unnamed column instead of treating it as a row index
    #[arg(long = "no-index-column")]
    pub no_index_column: bool,
}

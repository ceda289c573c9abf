//! Per-file cleaning and loss derivation.
//!
//! One [`CleaningPipeline`] processes input files strictly one after another:
//!
//! 1. read the dataset and check its declared schema (a mismatch skips the file)
//! 2. lowercase strings, drop rows missing required values
//! 3. assign `uid` hashes and drop duplicates, then persist the cleaned data
//! 4. derive loss fields, load the cause table (a mismatch ends the run),
//!    allocate by cause and persist the production data

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::{
    causes::{allocate_by_cause, load_cause_rates},
    config::PipelineConfig,
    dataset::Dataset,
    derive::derive_loss_fields,
    error::Result,
    filter::filter_required,
    identity::{assign_identity, dedupe},
    store::{DatasetSink, DatasetSource, OutputHint, OutputStage},
    transform::string_ops::normalize_strings,
    validate::validate_schema,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningStats {
    pub rows_read: usize,
    pub rows_missing_required: usize,
    pub duplicates_removed: usize,
    pub rows_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Processed {
        stats: CleaningStats,
        cleaned: PathBuf,
        production: PathBuf,
    },
    /// The file's schema did not match; nothing was written for it.
    Skipped,
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: std::result::Result<FileOutcome, String>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn production_outputs(&self) -> Vec<PathBuf> {
        self.reports
            .iter()
            .filter_map(|report| match &report.outcome {
                Ok(FileOutcome::Processed { production, .. }) => Some(production.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn processed(&self) -> usize {
        self.production_outputs().len()
    }

    pub fn skipped(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, Ok(FileOutcome::Skipped)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_err()).count()
    }
}

pub struct CleaningPipeline<S, W> {
    config: PipelineConfig,
    source: S,
    sink: W,
}

impl<S, W> CleaningPipeline<S, W>
where
    S: DatasetSource,
    W: DatasetSink,
{
    pub fn new(config: PipelineConfig, source: S, sink: W) -> Self {
        Self {
            config,
            source,
            sink,
        }
    }

    /// Reads, validates and cleans one dataset. `None` means the schema did
    /// not match and the file should be skipped.
    pub fn clean(&self, path: &Path) -> Result<Option<(Dataset, CleaningStats)>> {
        let label = file_label(path);
        let raw = self.source.read(path, &self.config.farm_reader)?;
        let rows_read = raw.len();
        let Some(valid) = validate_schema(raw, &self.config.expected_schema, &label) else {
            return Ok(None);
        };
        let normalized = normalize_strings(valid);
        let filtered = filter_required(normalized, &self.config.required_columns)?;
        let rows_missing_required = rows_read - filtered.len();
        let hashed = assign_identity(filtered, &self.config.key_columns)?;
        let before_dedupe = hashed.len();
        let cleaned = dedupe(hashed)?;
        let stats = CleaningStats {
            rows_read,
            rows_missing_required,
            duplicates_removed: before_dedupe - cleaned.len(),
            rows_written: cleaned.len(),
        };
        Ok(Some((cleaned, stats)))
    }

    pub fn process_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let label = file_label(path);
        let Some((cleaned, stats)) = self.clean(path)? else {
            warn!("Skipping {label}: schema mismatch");
            return Ok(FileOutcome::Skipped);
        };

        let cleaned_path = self.sink.write(
            &cleaned,
            OutputHint {
                source_name: &label,
                stage: OutputStage::Cleaned,
            },
        )?;
        info!("Data cleaning for {label} complete!");

        info!("Calculating \"tons never harvested\" for {label}");
        let derived = derive_loss_fields(cleaned)?;
        let rates = load_cause_rates(
            &self.source,
            &self.config.causes_path,
            &self.config.cause_reader,
        )?;
        info!("Calculating \"tons never harvested\" by cause for {label}");
        let production = allocate_by_cause(derived, &rates)?;
        let production_path = self.sink.write(
            &production,
            OutputHint {
                source_name: &label,
                stage: OutputStage::Production,
            },
        )?;
        info!("Data processing for {label} complete!");

        Ok(FileOutcome::Processed {
            stats,
            cleaned: cleaned_path,
            production: production_path,
        })
    }

    /// Processes `inputs` in order. Per-file failures are recorded and the run
    /// moves on; a fatal error (bad cause table, bad configuration) stops the
    /// run and is returned.
    pub fn run(&mut self, inputs: &[PathBuf]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for input in inputs {
            info!("Starting validation process for {}", input.display());
            match self.process_file(input) {
                Ok(outcome) => summary.reports.push(FileReport {
                    input: input.clone(),
                    outcome: Ok(outcome),
                }),
                Err(err) if err.is_fatal() => {
                    error!("Aborting run while processing {}: {err}", input.display());
                    return Err(err);
                }
                Err(err) => {
                    error!("Failed to process {}: {err}", input.display());
                    summary.reports.push(FileReport {
                        input: input.clone(),
                        outcome: Err(err.to_string()),
                    });
                }
            }
        }
        Ok(summary)
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

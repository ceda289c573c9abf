//! Cause-rate table loading and per-cause apportioning of unharvested tons.
//!
//! Rates are independent attributions taken from separate studies. They are
//! applied as plain multipliers and are not expected to sum to one.

use std::path::Path;

use log::{error, info};

use crate::{
    data::Value,
    dataset::Dataset,
    derive::TONS_NEVER_HARVESTED,
    error::{PipelineError, Result},
    schema::{ColumnType, Schema},
    store::{DatasetSource, ReaderOptions},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CauseRate {
    pub cause: String,
    pub rate: f64,
}

impl CauseRate {
    pub fn new(cause: impl Into<String>, rate: f64) -> Self {
        Self {
            cause: cause.into(),
            rate,
        }
    }
}

/// Reads the cause table and checks it against `cause: string, rate: float`.
/// Any mismatch is fatal for the run.
pub fn load_cause_rates<S: DatasetSource + ?Sized>(
    source: &S,
    path: &Path,
    options: &ReaderOptions,
) -> Result<Vec<CauseRate>> {
    let table = source.read(path, options)?;
    let expected = Schema::cause_rates();
    let actual = table.schema();
    if !expected.matches(&actual) {
        error!("Please update causes file data schema to match expected input: {expected}");
        return Err(PipelineError::CauseSchemaMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    cause_rates_from_table(&table)
}

fn cause_rates_from_table(table: &Dataset) -> Result<Vec<CauseRate>> {
    let cause_idx = table.require_column("cause")?;
    let rate_idx = table.require_column("rate")?;
    let mut rates = Vec::with_capacity(table.len());
    for (line, row) in table.rows().iter().enumerate() {
        let cause = row[cause_idx].as_ref().and_then(Value::as_str);
        let rate = row[rate_idx].as_ref().and_then(Value::as_f64);
        match (cause, rate) {
            (Some(cause), Some(rate)) if rate.is_finite() && rate > 0.0 => {
                rates.push(CauseRate::new(cause, rate));
            }
            _ => {
                return Err(PipelineError::Config(format!(
                    "cause table row {} must name a cause with a positive rate",
                    line + 1
                )));
            }
        }
    }
    Ok(rates)
}

/// Appends one float column per cause, in table order:
/// `tons_never_harvested * rate`.
pub fn allocate_by_cause(mut dataset: Dataset, rates: &[CauseRate]) -> Result<Dataset> {
    info!("Calculating \"tons never harvested\" by cause.");
    let tons_idx = dataset.require_column(TONS_NEVER_HARVESTED)?;
    let existing = dataset.headers();
    for (idx, rate) in rates.iter().enumerate() {
        if existing.contains(&rate.cause) || rates[..idx].iter().any(|r| r.cause == rate.cause) {
            return Err(PipelineError::Config(format!(
                "cause '{}' collides with an existing column",
                rate.cause
            )));
        }
    }
    for rate in rates {
        let values = dataset
            .rows()
            .iter()
            .map(|row| {
                row[tons_idx]
                    .as_ref()
                    .and_then(Value::as_f64)
                    .map(|tons| Value::Float(tons * rate.rate))
            })
            .collect();
        dataset.push_column(&rate.cause, ColumnType::Float, values);
    }
    Ok(dataset)
}

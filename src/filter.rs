use log::{debug, info};

use crate::{dataset::Dataset, error::Result};

/// Drops every row with a missing value in any of `required` columns.
/// Nullness of other columns is ignored.
pub fn filter_required(mut dataset: Dataset, required: &[String]) -> Result<Dataset> {
    info!("Dropping rows with nan/null in required cols.");
    let indices = required
        .iter()
        .map(|name| dataset.require_column(name))
        .collect::<Result<Vec<_>>>()?;
    let before = dataset.len();
    dataset.retain_rows(|row| indices.iter().all(|&idx| row[idx].is_some()));
    debug!(
        "Removed {} row(s) missing required values",
        before - dataset.len()
    );
    Ok(dataset)
}

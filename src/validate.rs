use log::{debug, info};

use crate::{dataset::Dataset, schema::Schema};

/// Returns the dataset untouched when its declared schema exactly matches
/// `expected`, or `None` (after logging both schemas) when it does not.
pub fn validate_schema(dataset: Dataset, expected: &Schema, label: &str) -> Option<Dataset> {
    let actual = dataset.schema();
    if !expected.matches(&actual) {
        info!("{label} failed validation with schema {expected}. File schema {actual}");
        for difference in expected.diff(&actual) {
            debug!("{label}: {difference}");
        }
        return None;
    }
    info!("{label} passed validation with schema {expected}");
    Some(dataset)
}

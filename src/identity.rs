//! Content-addressed row identity and keep-first deduplication.
//!
//! The identity of a row is the SHA-512 digest (uppercase hex) of its key
//! columns' text forms joined with `_`. The digest is sensitive to
//! representation: an integer `2016` and a float `2016.0` hash differently.

use itertools::Itertools;
use log::{debug, info};
use sha2::{Digest, Sha512};

use crate::{
    data::{Value, key_repr},
    dataset::Dataset,
    error::Result,
    schema::{ColumnType, UID_COLUMN},
};

pub const KEY_SEPARATOR: &str = "_";

pub fn identity_key<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    values.into_iter().map(key_repr).join(KEY_SEPARATOR)
}

pub fn identity_digest(key: &str) -> String {
    hex::encode_upper(Sha512::digest(key.as_bytes()))
}

/// Appends a `uid` column derived from `key_columns`, in the given order.
pub fn assign_identity(mut dataset: Dataset, key_columns: &[String]) -> Result<Dataset> {
    let indices = key_columns
        .iter()
        .map(|name| dataset.require_column(name))
        .collect::<Result<Vec<_>>>()?;
    let uids = dataset
        .rows()
        .iter()
        .map(|row| {
            let key = identity_key(indices.iter().map(|&idx| row[idx].as_ref()));
            Some(Value::String(identity_digest(&key)))
        })
        .collect::<Vec<_>>();
    dataset.push_column(UID_COLUMN, ColumnType::String, uids);
    info!("uid hashes created for rows in dataset.");
    Ok(dataset)
}

/// Keeps the first row seen for each `uid`; survivors keep their order.
pub fn dedupe(dataset: Dataset) -> Result<Dataset> {
    info!("Checking for and removing duplicates rows.");
    let uid_idx = dataset.require_column(UID_COLUMN)?;
    let before = dataset.len();
    let (columns, rows) = dataset.into_parts();
    let rows = rows
        .into_iter()
        .unique_by(|row| key_repr(row[uid_idx].as_ref()))
        .collect::<Vec<_>>();
    debug!("Removed {} duplicate row(s)", before - rows.len());
    Ok(Dataset::new(columns, rows))
}

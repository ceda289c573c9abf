//! Run configuration.
//!
//! [`PipelineConfig::default`] carries the fixed farm-data layout: expected
//! schema, required columns, identity key and the cause-table location. A YAML
//! file may override any of it; paths are resolved against the run root.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result},
    schema::Schema,
    store::ReaderOptions,
};

pub const DEFAULT_CAUSES_PATH: &str = "causes/farm_not_harvested_causes.csv";
pub const RAW_DIR: &str = "raw";
pub const CLEANED_DIR: &str = "cleaned";
pub const PRODUCTION_DIR: &str = "production";

pub const REQUIRED_COLUMNS: &[&str] = &[
    "year",
    "state",
    "commodity_name",
    "acres_planted",
    "acres_harvested",
    "tons_harvested",
    "us_dollars_harvested",
    "percent_maturity",
];

/// Concatenated, in this order, to build a row's identity.
pub const KEY_COLUMNS: &[&str] = &["year", "state", "commodity_name"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub expected_schema: Schema,
    pub required_columns: Vec<String>,
    pub key_columns: Vec<String>,
    pub causes_path: PathBuf,
    pub raw_dir: PathBuf,
    pub cleaned_dir: PathBuf,
    pub production_dir: PathBuf,
    pub farm_reader: ReaderOptions,
    pub cause_reader: ReaderOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            expected_schema: Schema::farm_data(),
            required_columns: REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            key_columns: KEY_COLUMNS.iter().map(|s| s.to_string()).collect(),
            causes_path: PathBuf::from(DEFAULT_CAUSES_PATH),
            raw_dir: PathBuf::from(RAW_DIR),
            cleaned_dir: PathBuf::from(CLEANED_DIR),
            production_dir: PathBuf::from(PRODUCTION_DIR),
            farm_reader: ReaderOptions::default(),
            cause_reader: ReaderOptions::without_index(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PipelineError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|err| PipelineError::Config(format!("Parsing {path:?}: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Required and key columns must be part of the expected schema.
    pub fn validate(&self) -> Result<()> {
        if self.key_columns.is_empty() {
            return Err(PipelineError::Config(
                "at least one key column is required".to_string(),
            ));
        }
        for column in self.required_columns.iter().chain(&self.key_columns) {
            if self.expected_schema.column_index(column).is_none() {
                return Err(PipelineError::Config(format!(
                    "column '{column}' is not part of the expected schema"
                )));
            }
        }
        Ok(())
    }

    /// Rebases every relative path onto `root`.
    pub fn resolved(mut self, root: &Path) -> Self {
        for path in [
            &mut self.causes_path,
            &mut self.raw_dir,
            &mut self.cleaned_dir,
            &mut self.production_dir,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.expected_schema.columns.len(), 10);
        assert!(!config.required_columns.contains(&"refed_food_department".to_string()));
        assert!(!config.cause_reader.skip_unnamed_index);
    }

    #[test]
    fn yaml_overrides_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.yml");
        fs::write(
            &path,
            "causes_path: rates/causes.csv\nkey_columns: [year, state]\n",
        )
        .unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.causes_path, PathBuf::from("rates/causes.csv"));
        assert_eq!(config.key_columns, vec!["year", "state"]);
        assert_eq!(config.required_columns.len(), 8);
    }

    #[test]
    fn unknown_key_column_is_rejected() {
        let config = PipelineConfig {
            key_columns: vec!["county".into()],
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn resolved_rebases_relative_paths_only() {
        let config = PipelineConfig {
            cleaned_dir: PathBuf::from("/abs/cleaned"),
            ..PipelineConfig::default()
        }
        .resolved(Path::new("/work"));
        assert_eq!(config.raw_dir, PathBuf::from("/work/raw"));
        assert_eq!(config.cleaned_dir, PathBuf::from("/abs/cleaned"));
        assert_eq!(
            config.causes_path,
            PathBuf::from("/work/causes/farm_not_harvested_causes.csv")
        );
    }
}

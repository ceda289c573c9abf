//! Dataset sources and sinks used by the pipeline.
//!
//! [`CsvSource`] declares a type tag for every column while loading, by
//! scanning all of the column's cells once; the rest of the crate only ever
//! looks at those declared tags. [`CsvSink`] owns output naming: files land in
//! the stage's directory as `<timestamp>_<stem>_<version>.csv`.

use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    data::{output_repr, parse_typed_value},
    dataset::{Dataset, Row},
    error::{PipelineError, Result},
    io_utils,
    schema::{ColumnMeta, TypeCandidate},
};

pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Drop a leading column whose header is blank (a serialized row index).
    pub skip_unnamed_index: bool,
    pub delimiter: char,
    /// `encoding_rs` label; UTF-8 when unset.
    pub encoding: Option<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            skip_unnamed_index: true,
            delimiter: ',',
            encoding: None,
        }
    }
}

impl ReaderOptions {
    pub fn without_index() -> Self {
        Self {
            skip_unnamed_index: false,
            ..Self::default()
        }
    }

    fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PipelineError::Config(format!(
                "Delimiter '{}' must be ASCII",
                self.delimiter
            )))
        }
    }
}

pub trait DatasetSource {
    fn read(&self, path: &Path, options: &ReaderOptions) -> Result<Dataset>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStage {
    Cleaned,
    Production,
    Combined,
}

impl OutputStage {
    pub fn version(&self) -> &'static str {
        match self {
            OutputStage::Cleaned | OutputStage::Production => "v1",
            OutputStage::Combined => "v2",
        }
    }
}

/// Where a dataset came from and which stage produced it. The sink decides the
/// physical destination.
#[derive(Debug, Clone, Copy)]
pub struct OutputHint<'a> {
    pub source_name: &'a str,
    pub stage: OutputStage,
}

pub trait DatasetSink {
    fn write(&mut self, dataset: &Dataset, hint: OutputHint<'_>) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSource;

impl DatasetSource for CsvSource {
    fn read(&self, path: &Path, options: &ReaderOptions) -> Result<Dataset> {
        let encoding = io_utils::resolve_encoding(options.encoding.as_deref())?;
        let mut reader = io_utils::open_csv_reader_from_path(path, options.delimiter_byte()?)?;
        let csv_err = |source: csv::Error| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let parse_err = |row: usize, column: &str, message: String| PipelineError::Parse {
            path: path.to_path_buf(),
            row,
            column: column.to_string(),
            message,
        };

        let header_record = reader.byte_headers().map_err(csv_err)?.clone();
        let mut headers =
            io_utils::decode_record(&header_record, encoding).map_err(|m| parse_err(1, "", m))?;
        let skip = usize::from(
            options.skip_unnamed_index && headers.first().is_some_and(|h| h.trim().is_empty()),
        );
        headers.drain(..skip);

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        let mut candidates = vec![TypeCandidate::new(); headers.len()];
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record.map_err(csv_err)?;
            let mut decoded = io_utils::decode_record(&record, encoding)
                .map_err(|m| parse_err(idx + 2, "", m))?;
            decoded.drain(..skip.min(decoded.len()));
            for (candidate, field) in candidates.iter_mut().zip(&decoded) {
                candidate.observe(field);
            }
            raw_rows.push(decoded);
        }

        let columns = headers
            .iter()
            .zip(&candidates)
            .map(|(name, candidate)| ColumnMeta::new(name.clone(), candidate.decide()))
            .collect::<Vec<_>>();

        let rows = raw_rows
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                columns
                    .iter()
                    .zip(raw)
                    .map(|(column, field)| {
                        parse_typed_value(field, column.data_type)
                            .map_err(|m| parse_err(idx + 2, &column.name, m))
                    })
                    .collect::<Result<Row>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Reading data from {file_name}.");
        debug!("{file_name}: {} row(s), {} column(s)", rows.len(), columns.len());
        Ok(Dataset::new(columns, rows))
    }
}

#[derive(Debug, Clone)]
pub struct CsvSink {
    cleaned_dir: PathBuf,
    production_dir: PathBuf,
}

impl CsvSink {
    pub fn new(cleaned_dir: impl Into<PathBuf>, production_dir: impl Into<PathBuf>) -> Self {
        Self {
            cleaned_dir: cleaned_dir.into(),
            production_dir: production_dir.into(),
        }
    }

    /// Next free path for `hint`: `<timestamp>_<stem>_<version>.csv`, with a
    /// counter before the version when that name is already taken.
    pub fn destination(&self, hint: OutputHint<'_>) -> PathBuf {
        let dir = match hint.stage {
            OutputStage::Cleaned => &self.cleaned_dir,
            OutputStage::Production | OutputStage::Combined => &self.production_dir,
        };
        let stem = Path::new(hint.source_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "dataset".to_string());
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let version = hint.stage.version();
        let mut candidate = dir.join(format!("{timestamp}_{stem}_{version}.csv"));
        let mut counter = 2usize;
        while candidate.exists() {
            candidate = dir.join(format!("{timestamp}_{stem}_{counter}_{version}.csv"));
            counter += 1;
        }
        candidate
    }
}

impl DatasetSink for CsvSink {
    fn write(&mut self, dataset: &Dataset, hint: OutputHint<'_>) -> Result<PathBuf> {
        let destination = self.destination(hint);
        write_csv(dataset, &destination)?;
        info!("Wrote {} row(s) to {:?}", dataset.len(), destination);
        Ok(destination)
    }
}

pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let csv_err = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = io_utils::open_csv_writer(path, io_utils::DEFAULT_CSV_DELIMITER)?;
    writer.write_record(dataset.headers()).map_err(csv_err)?;
    for row in dataset.rows() {
        writer
            .write_record(row.iter().map(|cell| output_repr(cell.as_ref())))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Value, schema::ColumnType};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn csv_source_declares_types_and_skips_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("farm.csv");
        fs::write(
            &path,
            ",year,state,acres\n0,2016,Alabama,8900.0\n1,2017,,12\n",
        )
        .unwrap();
        let dataset = CsvSource.read(&path, &ReaderOptions::default()).unwrap();
        assert_eq!(dataset.headers(), vec!["year", "state", "acres"]);
        let types = dataset
            .columns()
            .iter()
            .map(|c| c.data_type)
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![ColumnType::Integer, ColumnType::String, ColumnType::Float]
        );
        assert_eq!(dataset.value(1, "state"), None);
        assert_eq!(dataset.value(1, "acres"), Some(&Value::Float(12.0)));
    }

    #[test]
    fn csv_source_keeps_named_first_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("causes.csv");
        fs::write(&path, "cause,rate\nother,0.39724\n").unwrap();
        let dataset = CsvSource.read(&path, &ReaderOptions::default()).unwrap();
        assert_eq!(dataset.headers(), vec!["cause", "rate"]);
    }

    #[test]
    fn csv_source_reports_missing_file() {
        let err = CsvSource
            .read(Path::new("some/place/file.txt"), &ReaderOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound { .. }));
    }

    #[test]
    fn sink_names_files_by_stage() {
        let sink = CsvSink::new("cleaned", "production");
        let cleaned = sink.destination(OutputHint {
            source_name: "farm.data.csv",
            stage: OutputStage::Cleaned,
        });
        assert!(cleaned.starts_with("cleaned"));
        let name = cleaned.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_farm.data_v1.csv"), "{name}");

        let combined = sink.destination(OutputHint {
            source_name: "combined.csv",
            stage: OutputStage::Combined,
        });
        assert!(combined.starts_with("production"));
        assert!(combined.to_string_lossy().ends_with("_combined_v2.csv"));
    }

    #[test]
    fn sink_never_overwrites_earlier_outputs() {
        let dir = tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("cleaned"), dir.path().join("production"));
        fs::create_dir_all(dir.path().join("production")).unwrap();
        let dataset = |state: &str| {
            Dataset::new(
                vec![ColumnMeta::new("state", ColumnType::String)],
                vec![vec![Some(Value::String(state.into()))]],
            )
        };
        let hint = |source_name| OutputHint {
            source_name,
            stage: OutputStage::Production,
        };

        let first = sink.write(&dataset("alabama"), hint("farm.2016.csv")).unwrap();
        let second = sink.write(&dataset("texas"), hint("farm.2017.csv")).unwrap();
        let third = sink.write(&dataset("georgia"), hint("farm.2017.csv")).unwrap();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert!(first.to_string_lossy().ends_with("_farm.2016_v1.csv"));

        assert!(fs::read_to_string(&first).unwrap().contains("alabama"));
        assert!(fs::read_to_string(&second).unwrap().contains("texas"));
        assert!(fs::read_to_string(&third).unwrap().contains("georgia"));
    }

    #[test]
    fn written_csv_keeps_non_finite_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let dataset = Dataset::new(
            vec![
                ColumnMeta::new("x", ColumnType::Float),
                ColumnMeta::new("y", ColumnType::Float),
            ],
            vec![vec![Some(Value::Float(f64::INFINITY)), None]],
        );
        write_csv(&dataset, &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "\"x\",\"y\"\n\"inf\",\"\"\n");
    }
}

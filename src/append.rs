use std::path::Path;

use log::info;

use crate::{
    error::{PipelineError, Result},
    io_utils,
};

/// Concatenates CSV files into `destination`. The output header is the union
/// of all input headers in first-seen order; cells a file lacks stay empty.
/// Returns the number of data rows written.
pub fn concat_files<P: AsRef<Path>>(inputs: &[P], destination: &Path) -> Result<usize> {
    let delimiter = io_utils::DEFAULT_CSV_DELIMITER;
    let csv_err = |path: &Path, source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut headers: Vec<String> = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
        for header in reader.headers().map_err(|e| csv_err(input, e))? {
            if !headers.iter().any(|h| h == header) {
                headers.push(header.to_string());
            }
        }
    }

    let mut writer = io_utils::open_csv_writer(destination, delimiter)?;
    writer
        .write_record(&headers)
        .map_err(|e| csv_err(destination, e))?;

    let mut total_rows = 0usize;
    for input in inputs {
        let input = input.as_ref();
        let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
        let file_headers = reader.headers().map_err(|e| csv_err(input, e))?.clone();
        let positions = headers
            .iter()
            .map(|h| file_headers.iter().position(|f| f == h))
            .collect::<Vec<_>>();
        for record in reader.records() {
            let record = record.map_err(|e| csv_err(input, e))?;
            let row = positions
                .iter()
                .map(|pos| pos.and_then(|idx| record.get(idx)).unwrap_or(""));
            writer
                .write_record(row)
                .map_err(|e| csv_err(destination, e))?;
            total_rows += 1;
        }
        info!("✓ Appended {:?}", input);
    }
    writer.flush().map_err(|source| PipelineError::Io {
        path: destination.to_path_buf(),
        source,
    })?;
    info!("Wrote {total_rows} data row(s) to {:?}", destination);
    Ok(total_rows)
}

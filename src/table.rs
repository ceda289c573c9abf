use std::fmt::Write as _;

use crate::pipeline::{FileOutcome, RunSummary};

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", sanitize_cell(value), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn sanitize_cell(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

/// One line per input file: status, row counts and the production output.
pub fn render_summary(summary: &RunSummary) -> String {
    let headers = ["file", "status", "rows", "dropped", "duplicates", "output"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = summary
        .reports
        .iter()
        .map(|report| {
            let file = report
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match &report.outcome {
                Ok(FileOutcome::Processed {
                    stats, production, ..
                }) => vec![
                    file,
                    "processed".to_string(),
                    stats.rows_written.to_string(),
                    stats.rows_missing_required.to_string(),
                    stats.duplicates_removed.to_string(),
                    production.display().to_string(),
                ],
                Ok(FileOutcome::Skipped) => vec![
                    file,
                    "skipped".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ],
                Err(message) => vec![
                    file,
                    "failed".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    message.clone(),
                ],
            }
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

use std::borrow::Cow;

use log::info;

use crate::{data::Value, dataset::Dataset};

/// Returns a lowercase representation, reusing the original string if already lowercase.
pub fn lowercase(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| !ch.is_uppercase()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_lowercase())
    }
}

/// Lowercases every string cell in every column. Numbers and missing cells
/// are left as they are.
pub fn normalize_strings(mut dataset: Dataset) -> Dataset {
    info!("Converting strings to lower.");
    for row in dataset.rows_mut() {
        for cell in row.iter_mut() {
            if let Some(Value::String(text)) = cell {
                let lowered = match lowercase(text) {
                    Cow::Owned(lowered) => Some(lowered),
                    Cow::Borrowed(_) => None,
                };
                if let Some(lowered) = lowered {
                    *text = lowered;
                }
            }
        }
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnMeta, ColumnType};

    #[test]
    fn lowercase_borrows_when_unchanged() {
        assert!(matches!(lowercase("pecans"), Cow::Borrowed(_)));
        assert_eq!(lowercase("PECANS").as_ref(), "pecans");
        assert_eq!(lowercase("ÉCLAIR").as_ref(), "éclair");
    }

    #[test]
    fn normalize_touches_only_strings() {
        let dataset = Dataset::new(
            vec![
                ColumnMeta::new("year", ColumnType::Integer),
                ColumnMeta::new("commodity_name", ColumnType::String),
                ColumnMeta::new("acres_planted", ColumnType::Float),
            ],
            vec![vec![
                Some(Value::Integer(2016)),
                Some(Value::String("PECANS".into())),
                Some(Value::Float(8900.0)),
            ]],
        );
        let normalized = normalize_strings(dataset);
        assert_eq!(
            normalized.rows()[0],
            vec![
                Some(Value::Integer(2016)),
                Some(Value::String("pecans".into())),
                Some(Value::Float(8900.0)),
            ]
        );
    }
}

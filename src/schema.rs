//! Column type tags, declared schemas and the fixed farm/cause layouts.
//!
//! A [`Schema`] is an ordered list of [`ColumnMeta`] but compares
//! order-independently: two schemas match when they name the same set of
//! columns and agree on every column's [`ColumnType`].

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::data::is_null_token;

pub const UID_COLUMN: &str = "uid";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::String => "string",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Schema {
    pub columns: Vec<ColumnMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDifference {
    Missing {
        column: String,
        expected: ColumnType,
    },
    Unexpected {
        column: String,
        actual: ColumnType,
    },
    TypeChanged {
        column: String,
        expected: ColumnType,
        actual: ColumnType,
    },
}

impl fmt::Display for SchemaDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDifference::Missing { column, expected } => {
                write!(f, "missing column '{column}' ({expected})")
            }
            SchemaDifference::Unexpected { column, actual } => {
                write!(f, "unexpected column '{column}' ({actual})")
            }
            SchemaDifference::TypeChanged {
                column,
                expected,
                actual,
            } => write!(f, "column '{column}' is {actual}, expected {expected}"),
        }
    }
}

impl Schema {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self { columns }
    }

    pub fn from_pairs(pairs: &[(&str, ColumnType)]) -> Self {
        Self {
            columns: pairs
                .iter()
                .map(|(name, ty)| ColumnMeta::new(*name, *ty))
                .collect(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    fn as_map(&self) -> BTreeMap<&str, ColumnType> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type))
            .collect()
    }

    /// Exact, order-independent equality of column sets and type tags.
    pub fn matches(&self, other: &Schema) -> bool {
        self.columns.len() == other.columns.len() && self.as_map() == other.as_map()
    }

    /// Lists how `actual` deviates from `self`, in expected-column order
    /// followed by any unexpected columns.
    pub fn diff(&self, actual: &Schema) -> Vec<SchemaDifference> {
        let expected = self.as_map();
        let found = actual.as_map();
        let mut differences = Vec::new();
        for column in &self.columns {
            match found.get(column.name.as_str()) {
                None => differences.push(SchemaDifference::Missing {
                    column: column.name.clone(),
                    expected: column.data_type,
                }),
                Some(ty) if *ty != column.data_type => {
                    differences.push(SchemaDifference::TypeChanged {
                        column: column.name.clone(),
                        expected: column.data_type,
                        actual: *ty,
                    })
                }
                Some(_) => {}
            }
        }
        for column in &actual.columns {
            if !expected.contains_key(column.name.as_str()) {
                differences.push(SchemaDifference::Unexpected {
                    column: column.name.clone(),
                    actual: column.data_type,
                });
            }
        }
        differences
    }

    pub fn farm_data() -> Self {
        Self::from_pairs(&[
            ("year", ColumnType::Integer),
            ("state", ColumnType::String),
            ("commodity_name", ColumnType::String),
            ("refed_food_department", ColumnType::String),
            ("refed_food_category", ColumnType::String),
            ("acres_planted", ColumnType::Float),
            ("acres_harvested", ColumnType::Float),
            ("us_dollars_harvested", ColumnType::Float),
            ("tons_harvested", ColumnType::Float),
            ("percent_maturity", ColumnType::Float),
        ])
    }

    pub fn cause_rates() -> Self {
        Self::from_pairs(&[("cause", ColumnType::String), ("rate", ColumnType::Float)])
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, column) in self.columns.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", column.name, column.data_type)?;
        }
        f.write_str("}")
    }
}

/// Tracks which type tags are still possible for a column while scanning
/// its raw cells.
#[derive(Debug, Clone)]
pub struct TypeCandidate {
    possible_integer: bool,
    possible_float: bool,
    seen_value: bool,
}

impl Default for TypeCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCandidate {
    pub fn new() -> Self {
        Self {
            possible_integer: true,
            possible_float: true,
            seen_value: false,
        }
    }

    pub fn observe(&mut self, raw: &str) {
        if is_null_token(raw) {
            return;
        }
        self.seen_value = true;
        if self.possible_integer && raw.parse::<i64>().is_err() {
            self.possible_integer = false;
        }
        if self.possible_float && raw.parse::<f64>().is_err() {
            self.possible_float = false;
        }
    }

    pub fn decide(&self) -> ColumnType {
        if !self.seen_value {
            ColumnType::String
        } else if self.possible_integer {
            ColumnType::Integer
        } else if self.possible_float {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

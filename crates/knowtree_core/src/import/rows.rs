//! Raw tabular rows and field mapping.
//!
//! # Responsibility
//! - Represent loosely-typed rows as decoded by CSV/spreadsheet readers.
//! - Render cells to text and validate the caller's column mapping.
//!
//! # Invariants
//! - Cell rendering never fails; unsupported shapes degrade to text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One decoded tabular row: column header -> loosely typed cell.
pub type RawRow = Map<String, Value>;

/// Result type for fallible import edges.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors raised before reconciliation starts.
///
/// Reconciliation itself never fails; these cover decoding and mapping
/// validation at the ingestion boundary.
#[derive(Debug)]
pub enum ImportError {
    /// Row payload is not valid JSON.
    InvalidJson(serde_json::Error),
    /// Row payload is valid JSON but not an array.
    NotAnArray,
    /// Row entry at 1-based position `row` is not an object.
    RowNotAnObject { row: usize },
    /// Mapping has a blank `title` column.
    MissingTitleMapping,
    /// Mapping names a column absent from the row headers.
    UnknownColumn {
        field: &'static str,
        column: String,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid row payload: {err}"),
            Self::NotAnArray => write!(f, "row payload must be a JSON array"),
            Self::RowNotAnObject { row } => write!(f, "row {row} is not an object"),
            Self::MissingTitleMapping => write!(f, "title column must be mapped"),
            Self::UnknownColumn { field, column } => {
                write!(f, "field `{field}` is mapped to unknown column `{column}`")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// Logical field -> source column name.
///
/// Only `title` is required; unmapped optional fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl FieldMap {
    /// Mapping with only the title column set.
    pub fn titled(column: impl Into<String>) -> Self {
        Self {
            title: column.into(),
            ..Self::default()
        }
    }

    /// Checks that every mapped column exists in `columns`.
    ///
    /// # Errors
    /// - `MissingTitleMapping` when `title` is blank.
    /// - `UnknownColumn` for the first mapped column not present.
    pub fn validate<'a, I>(&self, columns: I) -> ImportResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.title.trim().is_empty() {
            return Err(ImportError::MissingTitleMapping);
        }
        let known: BTreeSet<&str> = columns.into_iter().collect();
        for (field, column) in self.mapped_columns() {
            if !known.contains(column) {
                return Err(ImportError::UnknownColumn {
                    field,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    fn mapped_columns(&self) -> Vec<(&'static str, &str)> {
        let optional = [
            ("type", &self.kind),
            ("parent", &self.parent),
            ("content", &self.content),
            ("tags", &self.tags),
            ("link", &self.link),
        ];
        std::iter::once(("title", self.title.as_str()))
            .chain(
                optional
                    .into_iter()
                    .filter_map(|(field, column)| column.as_deref().map(|c| (field, c))),
            )
            .collect()
    }
}

/// Decodes a JSON array of objects into rows.
///
/// # Errors
/// - `InvalidJson` / `NotAnArray` / `RowNotAnObject` for malformed payloads.
pub fn rows_from_json(text: &str) -> ImportResult<Vec<RawRow>> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(ImportError::NotAnArray);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(ImportError::RowNotAnObject { row: index + 1 }),
        })
        .collect()
}

/// Column headers of the first row, in row key order.
pub fn header_columns(rows: &[RawRow]) -> Vec<&str> {
    rows.first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Renders the mapped cell as trimmed text; empty when unmapped or absent.
pub(crate) fn cell_text(row: &RawRow, column: Option<&str>) -> String {
    column
        .and_then(|column| row.get(column))
        .map(render_cell)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_cell)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

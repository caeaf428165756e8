use crate::foundation::error::{ReelError, ReelResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// Column type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// `f64` measurements. Missing values are stored as NaN.
    Numeric,
    /// Free-form labels.
    Categorical,
    /// Timestamps as epoch milliseconds.
    Temporal,
}

/// Typed column storage.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    /// Numeric values.
    Numeric(Vec<f64>),
    /// Category labels.
    Categorical(Vec<String>),
    /// Epoch-millisecond timestamps.
    Temporal(Vec<i64>),
}

impl ColumnData {
    /// Type tag of the stored values.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
            Self::Temporal(_) => ColumnKind::Temporal,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
            Self::Temporal(v) => v.len(),
        }
    }

    /// Return `true` when the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Numeric column shorthand.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    /// Categorical column shorthand.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            ColumnData::Categorical(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Temporal column shorthand (epoch milliseconds).
    pub fn temporal(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, ColumnData::Temporal(values))
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type.
    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    /// Borrow the typed values.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Numeric values, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Category labels, if this is a categorical column.
    pub fn as_categorical(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Categorical(v) => Some(v),
            _ => None,
        }
    }

    /// Timestamps, if this is a temporal column.
    pub fn as_temporal(&self) -> Option<&[i64]> {
        match &self.data {
            ColumnData::Temporal(v) => Some(v),
            _ => None,
        }
    }
}

/// Immutable, ordered table handed to the pipeline by the ingestion layer.
///
/// Cheap to clone (`Arc` inside); the pipeline never mutates it.
#[derive(Clone, Debug)]
pub struct DatasetView {
    inner: Arc<DatasetInner>,
}

#[derive(Debug)]
struct DatasetInner {
    columns: Vec<Column>,
    rows: usize,
}

impl DatasetView {
    /// Build a dataset, checking unique non-empty names and equal column lengths.
    pub fn new(columns: Vec<Column>) -> ReelResult<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        for (i, col) in columns.iter().enumerate() {
            if col.name.trim().is_empty() {
                return Err(ReelError::invalid_configuration(format!(
                    "dataset column {i} has an empty name"
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(ReelError::invalid_configuration(format!(
                    "dataset column '{}' is defined more than once",
                    col.name
                )));
            }
            if col.data.len() != rows {
                return Err(ReelError::invalid_configuration(format!(
                    "dataset column '{}' has {} rows, expected {rows}",
                    col.name,
                    col.data.len()
                )));
            }
        }
        Ok(Self {
            inner: Arc::new(DatasetInner { columns, rows }),
        })
    }

    /// Parse the JSON boundary form from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let def: DatasetDef = serde_json::from_reader(r).map_err(|e| {
            ReelError::invalid_configuration(format!("parse dataset JSON: {e}"))
        })?;
        def.into_view()
    }

    /// Parse the JSON boundary form from a file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::invalid_configuration(format!(
                "open dataset JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Number of rows shared by every column.
    pub fn row_count(&self) -> usize {
        self.inner.rows
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.inner.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.inner.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.inner.columns.iter().position(|c| c.name == name)
    }

    /// Column at a known position.
    pub fn column_at(&self, idx: usize) -> &Column {
        &self.inner.columns[idx]
    }
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetDef {
    columns: Vec<ColumnDef>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnDef {
    name: String,
    kind: ColumnKind,
    values: Vec<serde_json::Value>,
}

impl DatasetDef {
    fn into_view(self) -> ReelResult<DatasetView> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for def in self.columns {
            let data = match def.kind {
                ColumnKind::Numeric => ColumnData::Numeric(
                    def.values
                        .iter()
                        .enumerate()
                        .map(|(row, v)| match v {
                            serde_json::Value::Null => Ok(f64::NAN),
                            other => other.as_f64().ok_or_else(|| {
                                value_error(&def.name, row, "a number or null", other)
                            }),
                        })
                        .collect::<ReelResult<Vec<_>>>()?,
                ),
                ColumnKind::Categorical => ColumnData::Categorical(
                    def.values
                        .iter()
                        .enumerate()
                        .map(|(row, v)| match v {
                            serde_json::Value::String(s) => Ok(s.clone()),
                            other => Err(value_error(&def.name, row, "a string", other)),
                        })
                        .collect::<ReelResult<Vec<_>>>()?,
                ),
                ColumnKind::Temporal => ColumnData::Temporal(
                    def.values
                        .iter()
                        .enumerate()
                        .map(|(row, v)| {
                            v.as_i64().ok_or_else(|| {
                                value_error(&def.name, row, "integer epoch milliseconds", v)
                            })
                        })
                        .collect::<ReelResult<Vec<_>>>()?,
                ),
            };
            columns.push(Column::new(def.name, data));
        }
        DatasetView::new(columns)
    }
}

fn value_error(column: &str, row: usize, expected: &str, got: &serde_json::Value) -> ReelError {
    ReelError::invalid_configuration(format!(
        "dataset column '{column}' row {row}: expected {expected}, got {got}"
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/data/dataset.rs"]
mod tests;

//! Domain models for the ingestion pipeline.
//!
//! - [`LogicalTable`] - the five named datasets the report consumes
//! - [`RawGrid`] - untyped 2-D text grid as read from a source
//! - [`Region`] - rectangular span of a combined grid bound to one table
//! - [`CoercionKind`] / [`CellValue`] - declared column type and typed cell
//! - [`NormalizedTable`] / [`TableSet`] - the pipeline output

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Logical Tables
// =============================================================================

/// One of the five semantically named datasets, regardless of which
/// physical source shape it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogicalTable {
    #[serde(rename = "NER for ECCE")]
    NerForEcce,
    #[serde(rename = "Enrollment by School Type")]
    EnrollmentBySchoolType,
    #[serde(rename = "Detailed Enrollment")]
    DetailedEnrollment,
    #[serde(rename = "Teachers Distribution")]
    TeachersDistribution,
    #[serde(rename = "Age Distribution")]
    AgeDistribution,
}

impl LogicalTable {
    /// All logical tables, in report order.
    pub const ALL: [LogicalTable; 5] = [
        LogicalTable::NerForEcce,
        LogicalTable::EnrollmentBySchoolType,
        LogicalTable::DetailedEnrollment,
        LogicalTable::TeachersDistribution,
        LogicalTable::AgeDistribution,
    ];

    /// Name the presentation layer indexes by.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalTable::NerForEcce => "NER for ECCE",
            LogicalTable::EnrollmentBySchoolType => "Enrollment by School Type",
            LogicalTable::DetailedEnrollment => "Detailed Enrollment",
            LogicalTable::TeachersDistribution => "Teachers Distribution",
            LogicalTable::AgeDistribution => "Age Distribution",
        }
    }

    /// Look a table up by its logical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// File name used for this table in a split data directory.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            LogicalTable::NerForEcce => "ner_for_ecce.csv",
            LogicalTable::EnrollmentBySchoolType => "enrollment_by_school_type.csv",
            LogicalTable::DetailedEnrollment => "detailed_enrollment.csv",
            LogicalTable::TeachersDistribution => "teachers_distribution.csv",
            LogicalTable::AgeDistribution => "age_distribution.csv",
        }
    }
}

impl fmt::Display for LogicalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Raw Grid
// =============================================================================

/// Ordered 2-D grid of raw text cells.
///
/// Rows may be ragged; any cell past the end of a row reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
}

/// A grid sliced out of a larger one by [`crate::transform::extract`].
pub type RawSubTable = RawGrid;

impl RawGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string slices (mostly handy in tests).
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell text, empty when the row is shorter than `col`.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Regions
// =============================================================================

/// Rectangular, end-inclusive, 0-based span of a combined grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub table: LogicalTable,
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Region {
    pub fn new(
        table: LogicalTable,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> Self {
        Self {
            table,
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    /// Start does not lie after end on either axis.
    pub fn is_well_formed(&self) -> bool {
        self.row_start <= self.row_end && self.col_start <= self.col_end
    }

    /// Rows spanned; 0 for an inverted region.
    pub fn row_count(&self) -> usize {
        span(self.row_start, self.row_end)
    }

    /// Columns spanned; 0 for an inverted region.
    pub fn col_count(&self) -> usize {
        span(self.col_start, self.col_end)
    }

    /// Whether the two regions share at least one cell.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

impl fmt::Display for Region {
    /// Spreadsheet notation, e.g. `A1:J11`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letters(self.col_start),
            self.row_start.saturating_add(1),
            column_letters(self.col_end),
            self.row_end.saturating_add(1)
        )
    }
}

fn span(start: usize, end: usize) -> usize {
    end.checked_sub(start).map_or(0, |d| d.saturating_add(1))
}

/// 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

// =============================================================================
// Cells
// =============================================================================

/// Declared semantic type of a column, governing how raw text is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    /// Category label, kept as trimmed text.
    Text,
    /// Percentage; `%` marker divides by 100.
    Percentage,
    /// Whole count (integer unless the value has a fraction).
    Count,
    /// Fraction, usually in [0, 1].
    Ratio,
    /// Unbounded float.
    PlainNumeric,
}

impl CoercionKind {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, CoercionKind::Text)
    }
}

/// A typed cell. `Missing` is distinct from zero.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Numeric view of the cell; text and missing yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Label form used for grouping and discriminating rows.
    pub fn label(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Missing => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Int(i) => Value::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Missing => Value::Null,
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Missing => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Normalized Tables
// =============================================================================

/// A named column with one declared kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: CoercionKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: CoercionKind, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }
}

/// Output unit of the pipeline: ordered, uniquely named, typed columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTable {
    pub table: LogicalTable,
    pub columns: Vec<Column>,
    /// Non-empty cells that failed coercion and became `Missing`.
    pub coercion_failures: usize,
    row_count: usize,
}

/// Unstacker output: a normalized table with group and category columns appended.
pub type LongFormTable = NormalizedTable;

impl NormalizedTable {
    pub fn new(table: LogicalTable, columns: Vec<Column>, row_count: usize) -> Self {
        Self {
            table,
            columns,
            coercion_failures: 0,
            row_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell at (`row`, column `name`).
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// Append a column; its length must match the table's row count.
    pub fn push_column(&mut self, column: Column) {
        debug_assert_eq!(column.values.len(), self.row_count);
        self.columns.push(column);
    }

    /// Total `Missing` cells across numeric columns.
    pub fn missing_numeric_cells(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.values.iter().filter(|v| v.is_missing()).count())
            .sum()
    }

    /// One JSON object per row, keyed by column name, `Missing` as `null`.
    pub fn to_records(&self) -> Vec<Value> {
        (0..self.row_count)
            .map(|row| {
                let mut obj = Map::new();
                for col in &self.columns {
                    obj.insert(col.name.clone(), col.values[row].to_json());
                }
                Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// Table Set
// =============================================================================

/// The report's working set: every logical table, normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    tables: BTreeMap<LogicalTable, NormalizedTable>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: NormalizedTable) {
        self.tables.insert(table.table, table);
    }

    /// Look a table up by its logical name, as the presentation layer does.
    pub fn get(&self, name: &str) -> Option<&NormalizedTable> {
        LogicalTable::from_name(name).and_then(|t| self.tables.get(&t))
    }

    pub fn table(&self, table: LogicalTable) -> Option<&NormalizedTable> {
        self.tables.get(&table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// `{ "<logical name>": [ {row}, ... ], ... }`
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (table, data) in &self.tables {
            obj.insert(table.name().to_string(), Value::Array(data.to_records()));
        }
        Value::Object(obj)
    }
}

//! Group summaries and column statistics over normalized tables.
//!
//! These are the preparations the dashboard runs before charting: province
//! enrollment totals from the long-form Detailed Enrollment table, teacher
//! totals per province, and `describe`-style statistics for one column.
//!
//! Missing cells are skipped by every aggregate. Rows whose group key is
//! missing are dropped. Groups come out sorted by key.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{CellValue, Column, NormalizedTable};
use crate::transform::policy::grade_columns;

/// Totals summarized per province from the long-form enrollment table.
pub const ENROLLMENT_TOTALS: [&str; 4] =
    ["PreSchool_Total", "Primary_Total", "Secondary_Total", "Total"];

// =============================================================================
// Group sums
// =============================================================================

/// One group: its key values and one sum per value column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub keys: Vec<String>,
    pub sums: Vec<CellValue>,
}

/// Result of a group-by sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<GroupRow>,
}

impl GroupSummary {
    /// Rename a key column in the output.
    pub fn rename_key(mut self, from: &str, to: &str) -> Self {
        for key in self.key_columns.iter_mut().filter(|k| k.as_str() == from) {
            *key = to.to_string();
        }
        self
    }

    /// Sum of `column` for the group whose keys equal `keys`.
    pub fn get(&self, keys: &[&str], column: &str) -> Option<&CellValue> {
        let idx = self.value_columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.keys.iter().map(String::as_str).eq(keys.iter().copied()))
            .map(|r| &r.sums[idx])
    }

    /// One JSON object per group, key columns first.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (name, key) in self.key_columns.iter().zip(&row.keys) {
                    obj.insert(name.clone(), Value::String(key.clone()));
                }
                for (name, sum) in self.value_columns.iter().zip(&row.sums) {
                    obj.insert(name.clone(), sum.to_json());
                }
                Value::Object(obj)
            })
            .collect()
    }
}

/// Running sum that stays integral until a float shows up.
#[derive(Debug, Clone, Copy)]
enum Sum {
    Int(i64),
    Float(f64),
}

impl Sum {
    fn add(self, value: &CellValue) -> Self {
        match (self, value) {
            (Sum::Int(a), CellValue::Int(b)) => match a.checked_add(*b) {
                Some(s) => Sum::Int(s),
                None => Sum::Float(a as f64 + *b as f64),
            },
            (Sum::Int(a), CellValue::Float(b)) => Sum::Float(a as f64 + b),
            (Sum::Float(a), v) => Sum::Float(a + v.as_f64().unwrap_or(0.0)),
            (s, _) => s,
        }
    }

    fn into_value(self) -> CellValue {
        match self {
            Sum::Int(v) => CellValue::Int(v),
            Sum::Float(v) => CellValue::Float(v),
        }
    }
}

fn column<'a>(table: &'a NormalizedTable, name: &str) -> AnalysisResult<&'a Column> {
    table.column(name).ok_or_else(|| AnalysisError::MissingColumn {
        table: table.table,
        column: name.to_string(),
    })
}

fn numeric_column<'a>(table: &'a NormalizedTable, name: &str) -> AnalysisResult<&'a Column> {
    let col = column(table, name)?;
    if !col.kind.is_numeric() {
        return Err(AnalysisError::NotNumeric {
            table: table.table,
            column: name.to_string(),
        });
    }
    Ok(col)
}

/// Sum `values` grouped by `keys` over every row.
pub fn group_sum(
    table: &NormalizedTable,
    keys: &[&str],
    values: &[&str],
) -> AnalysisResult<GroupSummary> {
    group_sum_where(table, keys, values, |_| true)
}

/// Sum `values` grouped by `keys` over the rows `include` accepts.
pub fn group_sum_where<F>(
    table: &NormalizedTable,
    keys: &[&str],
    values: &[&str],
    include: F,
) -> AnalysisResult<GroupSummary>
where
    F: Fn(usize) -> bool,
{
    let key_cols = keys
        .iter()
        .map(|k| column(table, k))
        .collect::<AnalysisResult<Vec<_>>>()?;
    let value_cols = values
        .iter()
        .map(|v| numeric_column(table, v))
        .collect::<AnalysisResult<Vec<_>>>()?;

    let mut groups: BTreeMap<Vec<String>, Vec<Sum>> = BTreeMap::new();
    for row in (0..table.row_count()).filter(|r| include(*r)) {
        let key: Option<Vec<String>> = key_cols.iter().map(|c| c.values[row].label()).collect();
        let Some(key) = key else { continue };

        let sums = groups
            .entry(key)
            .or_insert_with(|| vec![Sum::Int(0); value_cols.len()]);
        for (sum, col) in sums.iter_mut().zip(&value_cols) {
            *sum = sum.add(&col.values[row]);
        }
    }

    Ok(GroupSummary {
        key_columns: keys.iter().map(|k| k.to_string()).collect(),
        value_columns: values.iter().map(|v| v.to_string()).collect(),
        rows: groups
            .into_iter()
            .map(|(keys, sums)| GroupRow {
                keys,
                sums: sums.into_iter().map(Sum::into_value).collect(),
            })
            .collect(),
    })
}

/// Rows whose `column` holds one of `labels`.
fn rows_labelled<'a>(
    table: &'a NormalizedTable,
    column_name: &str,
    labels: &'a [&'a str],
) -> AnalysisResult<impl Fn(usize) -> bool + 'a> {
    let col = column(table, column_name)?;
    Ok(move |row: usize| {
        col.values[row]
            .as_str()
            .map_or(false, |v| labels.contains(&v))
    })
}

/// Province totals from the aggregate rows of the long-form enrollment table.
pub fn enrollment_summary(detailed: &NormalizedTable) -> AnalysisResult<GroupSummary> {
    let overall = rows_labelled(detailed, "Gender", &["Overall"])?;
    Ok(
        group_sum_where(detailed, &["Province_Name"], &ENROLLMENT_TOTALS, overall)?
            .rename_key("Province_Name", "Province"),
    )
}

/// Province totals split by gender, from the F/M breakdown rows.
pub fn gender_enrollment_summary(detailed: &NormalizedTable) -> AnalysisResult<GroupSummary> {
    let gendered = rows_labelled(detailed, "Gender", &["F", "M"])?;
    Ok(
        group_sum_where(detailed, &["Province_Name", "Gender"], &ENROLLMENT_TOTALS, gendered)?
            .rename_key("Province_Name", "Province"),
    )
}

/// Grade 1 to 14 enrollment per province, from the aggregate rows.
pub fn enrollment_by_grade(detailed: &NormalizedTable) -> AnalysisResult<GroupSummary> {
    let grades = grade_columns();
    let grades: Vec<&str> = grades.iter().map(String::as_str).collect();
    let overall = rows_labelled(detailed, "Gender", &["Overall"])?;
    Ok(
        group_sum_where(detailed, &["Province_Name"], &grades, overall)?
            .rename_key("Province_Name", "Province"),
    )
}

/// Teachers per province, summing the gender rows.
pub fn teacher_totals(teachers: &NormalizedTable) -> AnalysisResult<GroupSummary> {
    group_sum(teachers, &["Province"], &["Total"])
}

// =============================================================================
// Column statistics
// =============================================================================

/// Statistics of a numeric column. Undefined values (mean of nothing,
/// spread of a single value) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Statistics of a text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Text(TextSummary),
}

/// Summary statistics of one column, by its declared kind.
///
/// Numeric: count, mean, sample standard deviation, min, quartiles with
/// linear interpolation, max. Text: count, distinct values, most frequent
/// value (first seen wins a tie) and its frequency.
pub fn describe(table: &NormalizedTable, name: &str) -> AnalysisResult<ColumnSummary> {
    let col = column(table, name)?;
    if col.kind.is_numeric() {
        let values: Vec<f64> = col.values.iter().filter_map(CellValue::as_f64).collect();
        Ok(ColumnSummary::Numeric(describe_numeric(values)))
    } else {
        let labels: Vec<String> = col.values.iter().filter_map(CellValue::label).collect();
        Ok(ColumnSummary::Text(describe_text(&labels)))
    }
}

fn describe_numeric(mut values: Vec<f64>) -> NumericSummary {
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let n = count as f64;

    let mean = (count > 0).then(|| values.iter().sum::<f64>() / n);
    let std = match mean {
        Some(m) if count > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1.0)).sqrt())
        }
        _ => None,
    };

    NumericSummary {
        count,
        mean,
        std,
        min: values.first().copied(),
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

/// Linear interpolation between the closest ranks of sorted `values`.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

fn describe_text(labels: &[String]) -> TextSummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for label in labels {
        let n = counts.entry(label.as_str()).or_insert(0);
        if *n == 0 {
            order.push(label.as_str());
        }
        *n += 1;
    }

    // max_by_key keeps the last maximum, so scan in reverse to favour the first seen
    let top = order.iter().rev().max_by_key(|l| counts[*l]).copied();

    TextSummary {
        count: labels.len(),
        unique: order.len(),
        top: top.map(str::to_string),
        freq: top.map_or(0, |t| counts[t]),
    }
}

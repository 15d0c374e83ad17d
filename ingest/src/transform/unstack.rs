//! Convert a stacked province/gender table into long form.
//!
//! The Detailed Enrollment sheet lists a province total row followed by its
//! gender breakdown rows, with the gender code in the province column:
//!
//! ```text
//! Stacked input                     Long form output
//! ┌───────────────────────┐         ┌──────────────────────────────────────┐
//! │ Province: Shefa │ 880 │         │ Shefa │ 880 │ Province_Name: Shefa │ Overall │
//! │ Province: F     │ 450 │   →     │ F     │ 450 │ Province_Name: Shefa │ F       │
//! │ Province: M     │ 430 │         │ M     │ 430 │ Province_Name: Shefa │ M       │
//! └───────────────────────┘         └──────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{UnstackError, UnstackResult};
use crate::models::{CellValue, CoercionKind, Column, LongFormTable, NormalizedTable};

/// How to tell aggregate rows from breakdown rows, and what to call the
/// added columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstackSpec {
    /// Column whose value is either a group name or a breakdown label
    pub discriminator: String,
    /// Discriminator values that mark breakdown rows
    pub sentinels: Vec<String>,
    /// Name of the forward-filled group key column
    pub group_column: String,
    /// Name of the category label column
    pub category_column: String,
    /// Category label of aggregate rows
    pub overall_label: String,
}

impl Default for UnstackSpec {
    fn default() -> Self {
        Self {
            discriminator: "Province".to_string(),
            sentinels: vec!["F".to_string(), "M".to_string(), "Grand Total".to_string()],
            group_column: "Province_Name".to_string(),
            category_column: "Gender".to_string(),
            overall_label: "Overall".to_string(),
        }
    }
}

impl UnstackSpec {
    fn is_breakdown(&self, value: &str) -> bool {
        self.sentinels.iter().any(|s| s == value)
    }
}

/// Append the group key and category columns to `table`.
///
/// Rows are scanned top to bottom. A discriminator outside the sentinel set
/// starts a new group and is labelled with `overall_label`; a sentinel value
/// keeps the current group and becomes the row's category. A missing
/// discriminator keeps the current group, labelled as overall. Any row left
/// without a group fails the whole table. Row order is preserved.
pub fn unstack(mut table: NormalizedTable, spec: &UnstackSpec) -> UnstackResult<LongFormTable> {
    let discriminator = table
        .column(&spec.discriminator)
        .ok_or_else(|| UnstackError::MissingColumn(spec.discriminator.clone()))?;

    let mut groups = Vec::with_capacity(table.row_count());
    let mut categories = Vec::with_capacity(table.row_count());
    let mut current: Option<String> = None;

    for (row, cell) in discriminator.values.iter().enumerate() {
        let category = match cell.label() {
            Some(value) if spec.is_breakdown(&value) => value,
            Some(value) => {
                current = Some(value);
                spec.overall_label.clone()
            }
            None => spec.overall_label.clone(),
        };

        let group = current.clone().ok_or_else(|| UnstackError::OrphanRow {
            row,
            value: cell.label().unwrap_or_default(),
        })?;

        groups.push(CellValue::Text(group));
        categories.push(CellValue::Text(category));
    }

    table.push_column(Column::new(spec.group_column.clone(), CoercionKind::Text, groups));
    table.push_column(Column::new(
        spec.category_column.clone(),
        CoercionKind::Text,
        categories,
    ));
    Ok(table)
}

//! Header and type normalization of an extracted sub-table.
//!
//! ```text
//! raw sub-table          policy                     normalized table
//! ┌──────────────┐       header_rows = 1            ┌──────────────────┐
//! │ Prov │ F │ M │  ──▶  names = [Province, ...] ──▶ │ Province: text   │
//! │ Shefa│ 1 │ 2 │       kinds = [text, count..]    │ F: count, ...    │
//! └──────────────┘                                  └──────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::{NormalizationError, NormalizationResult};
use crate::logs::{log_debug, log_warning};
use crate::models::{CoercionKind, Column, NormalizedTable, RawSubTable};
use crate::transform::coerce::{coerce, is_coercion_failure};
use crate::transform::policy::{NamingMode, TablePolicy};

/// Normalize a raw sub-table according to its table's policy.
///
/// - The first `policy.header_rows` rows are dropped; the rest map 1:1 to
///   output rows. Zero data rows is a valid, empty table.
/// - Canonical names are truncated to the sub-table's width, never padded.
///   Source columns past the named slots get an empty-string name.
/// - Later duplicates of a name (empty placeholders included) are dropped.
/// - Cells that fail coercion become `Missing` and are counted.
pub fn normalize(raw: &RawSubTable, policy: &TablePolicy) -> NormalizationResult<NormalizedTable> {
    let rows = raw.row_count();
    if policy.header_rows > rows {
        return Err(NormalizationError::HeaderRowsExceedTable {
            table: policy.table,
            header_rows: policy.header_rows,
            rows,
        });
    }

    let width = raw.width();
    if width == 0 {
        return Err(NormalizationError::NoColumns(policy.table));
    }
    if width < policy.columns.len() {
        log_debug(format!(
            "{}: source has {} of {} canonical columns, truncating",
            policy.table,
            width,
            policy.columns.len()
        ));
    }

    let names = assign_names(raw, policy, width);
    let kept = first_occurrences(&names);
    if kept.len() < width {
        log_debug(format!(
            "{}: dropped {} duplicate or unnamed column(s)",
            policy.table,
            width - kept.len()
        ));
    }

    let mut failures = 0;
    let mut columns = Vec::with_capacity(kept.len());
    for &col in &kept {
        let kind = policy
            .columns
            .get(col)
            .map(|c| c.kind)
            .unwrap_or(CoercionKind::Text);

        let mut values = Vec::with_capacity(rows - policy.header_rows);
        for row in policy.header_rows..rows {
            let cell = raw.cell(row, col);
            let value = coerce(cell, kind);
            if is_coercion_failure(cell, &value) {
                failures += 1;
            }
            values.push(value);
        }

        columns.push(Column::new(names[col].clone(), kind, values));
    }

    if failures > 0 {
        log_warning(format!(
            "{}: {} cell(s) could not be parsed and are treated as missing",
            policy.table, failures
        ));
    }

    let mut table = NormalizedTable::new(policy.table, columns, rows - policy.header_rows);
    table.coercion_failures = failures;
    Ok(table)
}

/// One name per source column.
fn assign_names(raw: &RawSubTable, policy: &TablePolicy, width: usize) -> Vec<String> {
    let header_row = match policy.naming {
        NamingMode::Inferred if policy.header_rows > 0 => Some(policy.header_rows - 1),
        _ => None,
    };

    (0..width)
        .map(|col| match header_row {
            Some(row) => raw.cell(row, col).trim().to_string(),
            None => policy
                .columns
                .get(col)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Indexes of the first occurrence of every name, in order.
fn first_occurrences(names: &[String]) -> Vec<usize> {
    let mut seen = HashSet::new();
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| seen.insert(name.as_str()))
        .map(|(i, _)| i)
        .collect()
}

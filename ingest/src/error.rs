//! Error types for the ingestion pipeline.
//!
//! One enum per stage, converted upwards with `From` so `?` works across
//! stage boundaries:
//!
//! - [`SourceError`] - reading and decoding a delimited source file
//! - [`ExtractionError`] - region bounds and region map problems
//! - [`NormalizationError`] - header policy does not fit the data
//! - [`UnstackError`] - stacked table cannot be put in long form
//! - [`ConfigError`] - configuration file and environment problems
//! - [`AnalysisError`] - summaries over loaded tables
//! - [`LoadError`] - top-level, names the logical table that failed
//!
//! Per-cell coercion failures are not errors: a cell that does not parse
//! becomes [`CellValue::Missing`](crate::models::CellValue::Missing).

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{LogicalTable, Region};

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading a delimited source file into a raw grid.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source file does not exist.
    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Malformed delimited text.
    #[error("Invalid delimited text at record {record}: {message}")]
    Csv { record: usize, message: String },

    /// File has no rows at all.
    #[error("Source is empty")]
    Empty,
}

// =============================================================================
// Extraction Errors
// =============================================================================

/// Errors while slicing regions out of a combined grid.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Region extends past the grid.
    #[error("Region {region} for '{table}' lies outside the {rows}x{cols} grid")]
    OutOfBounds {
        table: LogicalTable,
        region: Region,
        rows: usize,
        cols: usize,
    },

    /// Region start lies after its end.
    #[error("Region {region} for '{table}' has an inverted range")]
    InvalidRegion { table: LogicalTable, region: Region },

    /// Two regions share at least one cell.
    #[error("Region for '{first}' overlaps region for '{second}'")]
    Overlap {
        first: LogicalTable,
        second: LogicalTable,
    },

    /// Region map has no entry for a logical table.
    #[error("No region configured for '{0}'")]
    MissingRegion(LogicalTable),

    /// Region map lists a logical table twice.
    #[error("More than one region configured for '{0}'")]
    DuplicateRegion(LogicalTable),
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors while assigning headers and types to a sub-table.
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// More header rows declared than the sub-table holds.
    #[error("'{table}' declares {header_rows} header row(s) but only has {rows} row(s)")]
    HeaderRowsExceedTable {
        table: LogicalTable,
        header_rows: usize,
        rows: usize,
    },

    /// Sub-table has no columns at all.
    #[error("'{0}' has no columns")]
    NoColumns(LogicalTable),
}

// =============================================================================
// Unstack Errors
// =============================================================================

/// Errors while converting a stacked table into long form.
#[derive(Debug, Error)]
pub enum UnstackError {
    /// Discriminator column is not part of the table.
    #[error("Discriminator column '{0}' not found")]
    MissingColumn(String),

    /// Breakdown row appears before any aggregate row.
    #[error("Row {row} ('{value}') has no preceding aggregate row to group under")]
    OrphanRow { row: usize, value: String },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while building an [`IngestConfig`](crate::config::IngestConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid JSON for the expected shape.
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown logical table name.
    #[error("Unknown logical table: {0}")]
    UnknownTable(String),

    /// Split source configuration lacks a file for a logical table.
    #[error("No source file configured for '{0}'")]
    MissingSource(LogicalTable),

    /// Two split source keys name the same logical table.
    #[error("More than one source file configured for '{0}'")]
    DuplicateSource(LogicalTable),

    /// Two header row overrides name the same logical table.
    #[error("More than one header_rows override for '{0}'")]
    DuplicateHeaderRows(LogicalTable),

    /// Nothing in the environment says where the data is.
    #[error("No source configured (set EDUSTATS_CONFIG, EDUSTATS_SOURCE or EDUSTATS_DATA_DIR)")]
    NoSource,
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Errors from group summaries and column statistics.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Requested column does not exist.
    #[error("Column '{column}' not found in '{table}'")]
    MissingColumn { table: LogicalTable, column: String },

    /// Requested column holds text where numbers are required.
    #[error("Column '{column}' in '{table}' is not numeric")]
    NotNumeric { table: LogicalTable, column: String },

    /// Requested logical table is not loaded.
    #[error("Unknown table: {0}")]
    UnknownTable(String),
}

// =============================================================================
// Load Errors (top-level)
// =============================================================================

/// The pipeline stage a single logical table failed in.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("source: {0}")]
    Source(#[from] SourceError),

    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("normalization: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("unstack: {0}")]
    Unstack(#[from] UnstackError),
}

/// Top-level error of [`crate::transform::pipeline::load`].
///
/// A load either yields all five logical tables or fails with one of these.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The combined source could not be read.
    #[error("Combined source error: {0}")]
    Source(#[from] SourceError),

    /// The region map itself is invalid.
    #[error("Region map error: {0}")]
    Regions(#[from] ExtractionError),

    /// One logical table failed.
    #[error("Failed to load '{table}' during {stage}")]
    Table {
        table: LogicalTable,
        #[source]
        stage: StageError,
    },
}

impl LoadError {
    /// Wrap a stage error with the logical table it belongs to.
    pub fn table(table: LogicalTable, stage: impl Into<StageError>) -> Self {
        LoadError::Table {
            table,
            stage: stage.into(),
        }
    }

    /// Logical table that failed, when the failure is table-specific.
    pub fn failed_table(&self) -> Option<LogicalTable> {
        match self {
            LoadError::Table { table, .. } => Some(*table),
            _ => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source reading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for region extraction.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Result type for normalization.
pub type NormalizationResult<T> = Result<T, NormalizationError>;

/// Result type for unstacking.
pub type UnstackResult<T> = Result<T, UnstackError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for analysis.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for a full load.
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_error_names_table_and_stage() {
        let err = LoadError::table(
            LogicalTable::TeachersDistribution,
            NormalizationError::HeaderRowsExceedTable {
                table: LogicalTable::TeachersDistribution,
                header_rows: 2,
                rows: 1,
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("Teachers Distribution"));
        assert!(msg.contains("normalization"));
        assert_eq!(err.failed_table(), Some(LogicalTable::TeachersDistribution));
    }

    #[test]
    fn test_error_conversion_chain() {
        let source_err = SourceError::Empty;
        let load_err: LoadError = source_err.into();
        assert!(load_err.to_string().contains("empty"));
        assert_eq!(load_err.failed_table(), None);

        let stage: StageError = UnstackError::MissingColumn("Province".into()).into();
        assert!(stage.to_string().contains("Province"));
    }

    #[test]
    fn test_out_of_bounds_format() {
        let err = ExtractionError::OutOfBounds {
            table: LogicalTable::NerForEcce,
            region: Region::new(LogicalTable::NerForEcce, 0, 10, 0, 9),
            rows: 9,
            cols: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("A1:J11"));
        assert!(msg.contains("9x10"));
    }
}

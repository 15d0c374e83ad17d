//! # Edustats - education statistics ingestion
//!
//! Edustats reads the spreadsheet exports behind the provincial education
//! report (enrollment, teachers, age distribution, net enrollment rates) and
//! turns them into typed, named tables for the presentation layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV source │────▶│   Parser    │────▶│  Extractor  │────▶│ Normalizer  │────▶│  TableSet   │
//! │ (1 or 5 f.) │     │  (auto-enc) │     │  (regions)  │     │ (+unstack)  │     │ (by name)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use edustats::{load, IngestConfig};
//!
//! fn main() {
//!     let tables = load(&IngestConfig::combined("data/education.csv")).unwrap();
//!     let detailed = tables.get("Detailed Enrollment").unwrap();
//!     println!("{} rows", detailed.row_count());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Grids, regions, cell values, normalized tables
//! - [`parser`] - Delimited text reading with auto-detection
//! - [`transform`] - Coercion, extraction, normalization, unstacking, load
//! - [`config`] - Ingestion configuration
//! - [`analysis`] - Group summaries and column statistics
//! - [`logs`] - Pipeline log helpers

// Core modules
pub mod error;
pub mod models;

// Configuration and logging
pub mod config;
pub mod logs;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Analysis
pub mod analysis;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError, ConfigError, ExtractionError, LoadError, NormalizationError, SourceError,
    StageError, UnstackError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CellValue, CoercionKind, Column, LogicalTable, LongFormTable, NormalizedTable, RawGrid,
    RawSubTable, Region, TableSet,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{IngestConfig, SourceConfig};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_grid, read_source,
    ParsedSource,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    canonical_columns, coerce, default_regions, extract, load, normalize, unstack,
    validate_regions, ColumnSpec, NamingMode, SourceShape, TablePolicy, UnstackSpec,
};

// =============================================================================
// Re-exports - Analysis
// =============================================================================

pub use analysis::{
    describe, enrollment_by_grade, enrollment_summary, gender_enrollment_summary, group_sum,
    teacher_totals, ColumnSummary, GroupSummary,
};

//! High-level load API: source(s) in, named table mapping out.
//!
//! # Example
//!
//! ```rust,ignore
//! use edustats::{load, IngestConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tables = load(&IngestConfig::combined("data/education.csv"))?;
//!     let ner = tables.get("NER for ECCE").unwrap();
//!     println!("{} provinces", ner.row_count());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use crate::config::{IngestConfig, SourceConfig};
use crate::error::{ExtractionError, LoadError, LoadResult};
use crate::logs::{log_error, log_info, log_success};
use crate::models::{LogicalTable, NormalizedTable, RawSubTable, Region, TableSet};
use crate::parser::{read_source, ParsedSource};
use crate::transform::extract::{extract, validate_regions};
use crate::transform::normalize::normalize;
use crate::transform::unstack::unstack;

/// Load all five logical tables.
///
/// The shape comes from `config`, never from the data. Any table failing at
/// any stage fails the whole load; there are no partial results.
pub fn load(config: &IngestConfig) -> LoadResult<TableSet> {
    config.validate()?;

    let result = match &config.source {
        SourceConfig::Combined { path, regions } => load_combined(config, path, regions),
        SourceConfig::Split { .. } => load_split(config),
    };
    let tables = result.map_err(|e| {
        log_error(e.to_string());
        e
    })?;

    log_success(format!("Loaded {} tables", tables.len()));
    Ok(tables)
}

fn load_combined(config: &IngestConfig, path: &Path, regions: &[Region]) -> LoadResult<TableSet> {
    validate_regions(regions)?;

    log_info(format!("Reading combined source: {}", path.display()));
    let source = read_source(path, config.delimiter)?;
    describe_source(&source);

    let mut tables = TableSet::new();
    for table in LogicalTable::ALL {
        let region = regions
            .iter()
            .find(|r| r.table == table)
            .ok_or(ExtractionError::MissingRegion(table))?;

        let raw = extract(&source.grid, region).map_err(|e| LoadError::table(table, e))?;
        log_info(format!("{}: region {}", table, region));
        tables.insert(build_table(config, table, &raw)?);
    }
    Ok(tables)
}

fn load_split(config: &IngestConfig) -> LoadResult<TableSet> {
    let mut tables = TableSet::new();
    for (table, path) in config.split_paths()? {
        log_info(format!("Reading {}: {}", table, path.display()));
        let source =
            read_source(&path, config.delimiter).map_err(|e| LoadError::table(table, e))?;
        describe_source(&source);
        tables.insert(build_table(config, table, &source.grid)?);
    }
    Ok(tables)
}

/// Normalize, then unstack when the table's policy asks for it.
fn build_table(
    config: &IngestConfig,
    table: LogicalTable,
    raw: &RawSubTable,
) -> LoadResult<NormalizedTable> {
    let policy = config.policy(table);
    let normalized = normalize(raw, &policy).map_err(|e| LoadError::table(table, e))?;

    let result = match policy.unstack() {
        Some(spec) => unstack(normalized, &spec).map_err(|e| LoadError::table(table, e))?,
        None => normalized,
    };

    log_success(format!(
        "{}: {} rows × {} columns",
        table,
        result.row_count(),
        result.column_count()
    ));
    Ok(result)
}

fn describe_source(source: &ParsedSource) {
    log_info(format!(
        "   encoding {}, delimiter '{}', {} rows",
        source.encoding,
        format_delimiter(source.delimiter),
        source.grid.row_count()
    ));
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NormalizationError, SourceError, StageError, UnstackError};
    use crate::models::CellValue;
    use crate::testutil;
    use std::fs;
    use tempfile::TempDir;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_combined_load_yields_every_table() {
        let dir = TempDir::new().unwrap();
        let path = testutil::write_combined(dir.path());
        let tables = load(&IngestConfig::combined(path)).unwrap();

        assert_eq!(tables.len(), 5);
        for table in LogicalTable::ALL {
            assert!(tables.get(table.name()).is_some(), "{} missing", table);
        }

        let ner = tables.get("NER for ECCE").unwrap();
        assert_eq!(ner.row_count(), 9);
        assert_eq!(ner.column_count(), 10);
        assert_eq!(ner.column_names().last(), Some(&"Male_2020"));
        assert!(ner.column("Total_2020").is_none());

        let teachers = tables.get("Teachers Distribution").unwrap();
        assert_eq!(teachers.column_count(), 7);
        assert!(teachers.column("Total").is_none());

        let schools = tables.get("Enrollment by School Type").unwrap();
        assert_eq!(schools.value(1, "Primary"), Some(&CellValue::Int(2010)));
        assert_eq!(schools.coercion_failures, 1);

        assert_eq!(tables.get("Age Distribution").unwrap().row_count(), 33);
    }

    #[test]
    fn test_detailed_enrollment_is_long_form() {
        let dir = TempDir::new().unwrap();
        let path = testutil::write_combined(dir.path());
        let tables = load(&IngestConfig::combined(path)).unwrap();
        let detailed = tables.get("Detailed Enrollment").unwrap();

        assert_eq!(detailed.row_count(), 17);
        assert_eq!(detailed.column_count(), 21);

        let shefa = (0..detailed.row_count())
            .find(|&r| detailed.value(r, "Province") == Some(&text("Shefa")))
            .unwrap();
        assert_eq!(detailed.value(shefa, "Province_Name"), Some(&text("Shefa")));
        assert_eq!(detailed.value(shefa, "Gender"), Some(&text("Overall")));
        assert_eq!(detailed.value(shefa, "Total"), Some(&CellValue::Int(880)));
        assert_eq!(detailed.value(shefa + 1, "Province_Name"), Some(&text("Shefa")));
        assert_eq!(detailed.value(shefa + 1, "Gender"), Some(&text("F")));
        assert_eq!(detailed.value(shefa + 1, "Total"), Some(&CellValue::Int(230)));

        assert_eq!(detailed.value(16, "Gender"), Some(&text("Grand Total")));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = IngestConfig::combined(testutil::write_combined(dir.path()));

        assert_eq!(load(&config).unwrap(), load(&config).unwrap());
    }

    #[test]
    fn test_combined_and_split_agree() {
        let dir = TempDir::new().unwrap();
        let combined = load(&IngestConfig::combined(testutil::write_combined(dir.path()))).unwrap();
        testutil::write_split(dir.path());
        let split = load(&IngestConfig::split_dir(dir.path())).unwrap();

        for table in LogicalTable::ALL {
            assert_eq!(
                combined.table(table).unwrap().column_names(),
                split.table(table).unwrap().column_names(),
                "{}",
                table
            );
        }
        assert_eq!(combined, split);
    }

    #[test]
    fn test_short_grid_fails_on_first_region() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.csv");
        let rows: Vec<String> = (0..9).map(|_| "a,b,c,d,e,f,g,h,i,j".to_string()).collect();
        fs::write(&path, rows.join("\n")).unwrap();

        let err = load(&IngestConfig::combined(path)).unwrap_err();
        assert_eq!(err.failed_table(), Some(LogicalTable::NerForEcce));
        assert!(matches!(
            err,
            LoadError::Table {
                stage: StageError::Extraction(ExtractionError::OutOfBounds { .. }),
                ..
            }
        ));
    }

    #[test]
    fn test_unbounded_region_is_out_of_bounds() {
        let dir = TempDir::new().unwrap();
        let mut regions = crate::transform::extract::default_regions();
        regions[4].row_end = usize::MAX;
        let config = IngestConfig::combined(testutil::write_combined(dir.path())).with_regions(regions);

        let err = load(&config).unwrap_err();
        assert!(err.to_string().contains("Age Distribution"));
        assert!(matches!(
            err,
            LoadError::Table {
                table: LogicalTable::AgeDistribution,
                stage: StageError::Extraction(ExtractionError::OutOfBounds { .. }),
            }
        ));
    }

    #[test]
    fn test_missing_split_file_names_table() {
        let dir = TempDir::new().unwrap();
        testutil::write_split(dir.path());
        fs::remove_file(dir.path().join("teachers_distribution.csv")).unwrap();

        let err = load(&IngestConfig::split_dir(dir.path())).unwrap_err();
        assert_eq!(err.failed_table(), Some(LogicalTable::TeachersDistribution));
        assert!(matches!(
            err,
            LoadError::Table {
                stage: StageError::Source(SourceError::NotFound(_)),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_combined_file() {
        let err = load(&IngestConfig::combined("/nonexistent/education.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Source(SourceError::NotFound(_))));
        assert_eq!(err.failed_table(), None);
    }

    #[test]
    fn test_header_override_too_large() {
        let dir = TempDir::new().unwrap();
        let config = IngestConfig::combined(testutil::write_combined(dir.path()))
            .with_header_rows(LogicalTable::EnrollmentBySchoolType, 12);

        let err = load(&config).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Table {
                table: LogicalTable::EnrollmentBySchoolType,
                stage: StageError::Normalization(NormalizationError::HeaderRowsExceedTable { .. }),
            }
        ));
    }

    #[test]
    fn test_orphan_breakdown_row_fails_load() {
        let dir = TempDir::new().unwrap();
        testutil::write_split(dir.path());
        fs::write(
            dir.path().join("detailed_enrollment.csv"),
            "Province,Pre-School\nF,10\nShefa,20\n",
        )
        .unwrap();

        let err = load(&IngestConfig::split_dir(dir.path())).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Table {
                table: LogicalTable::DetailedEnrollment,
                stage: StageError::Unstack(UnstackError::OrphanRow { row: 0, .. }),
            }
        ));
    }

    #[test]
    fn test_overlapping_regions_rejected_before_reading() {
        let mut regions = crate::transform::extract::default_regions();
        regions[4].row_start = 49;
        let config = IngestConfig::combined("/nonexistent/education.csv").with_regions(regions);

        assert!(matches!(
            load(&config),
            Err(LoadError::Regions(ExtractionError::Overlap { .. }))
        ));
    }

    #[test]
    fn test_semicolon_split_files() {
        let dir = TempDir::new().unwrap();
        testutil::write_split(dir.path());
        fs::write(
            dir.path().join("enrollment_by_school_type.csv"),
            "School Type;ECCE;Primary;Secondary;Total\nGovernment;\"1,234\";5;6;1245\n",
        )
        .unwrap();

        let tables = load(&IngestConfig::split_dir(dir.path())).unwrap();
        let schools = tables.get("Enrollment by School Type").unwrap();
        assert_eq!(schools.value(0, "ECCE"), Some(&CellValue::Int(1234)));
        assert_eq!(schools.value(0, "Total"), Some(&CellValue::Int(1245)));
    }
}

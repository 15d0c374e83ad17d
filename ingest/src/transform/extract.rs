//! Region extraction from a combined grid.

use crate::error::{ExtractionError, ExtractionResult};
use crate::models::{LogicalTable, RawGrid, RawSubTable, Region};

/// Slice `region` out of `grid` into a fresh, 0-based sub-table.
///
/// Ranges are end-inclusive. The result always has exactly
/// `region.row_count()` rows of `region.col_count()` cells; short physical
/// rows contribute empty cells. A region that does not fit the grid is an
/// error, never clamped.
pub fn extract(grid: &RawGrid, region: &Region) -> ExtractionResult<RawSubTable> {
    if !region.is_well_formed() {
        return Err(ExtractionError::InvalidRegion {
            table: region.table,
            region: *region,
        });
    }

    let rows = grid.row_count();
    let cols = grid.width();
    if region.row_end >= rows || region.col_end >= cols {
        return Err(ExtractionError::OutOfBounds {
            table: region.table,
            region: *region,
            rows,
            cols,
        });
    }

    let sliced = (region.row_start..=region.row_end)
        .map(|r| {
            (region.col_start..=region.col_end)
                .map(|c| grid.cell(r, c).to_string())
                .collect()
        })
        .collect();

    Ok(RawGrid::new(sliced))
}

/// Check a region map: every logical table exactly once, well-formed,
/// no two regions sharing a cell.
///
/// Grid bounds are checked per region by [`extract`], once the grid is known.
pub fn validate_regions(regions: &[Region]) -> ExtractionResult<()> {
    for table in LogicalTable::ALL {
        match regions.iter().filter(|r| r.table == table).count() {
            0 => return Err(ExtractionError::MissingRegion(table)),
            1 => {}
            _ => return Err(ExtractionError::DuplicateRegion(table)),
        }
    }

    for region in regions {
        if !region.is_well_formed() {
            return Err(ExtractionError::InvalidRegion {
                table: region.table,
                region: *region,
            });
        }
    }

    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            if a.overlaps(b) {
                return Err(ExtractionError::Overlap {
                    first: a.table,
                    second: b.table,
                });
            }
        }
    }

    Ok(())
}

/// Region map of the published combined sheet.
///
/// | Table | Range | Canonical columns left out |
/// |---|---|---|
/// | NER for ECCE | rows 0-10, cols 0-9 | `Total_2020` |
/// | Enrollment by School Type | rows 11-19, cols 0-3 | |
/// | Detailed Enrollment | rows 20-37, cols 0-18 | |
/// | Teachers Distribution | rows 38-49, cols 0-6 | `Total` |
/// | Age Distribution | rows 50-84, cols 0-19 | |
///
/// Widen a region in the config (`col_end`) to read a column it leaves out.
pub fn default_regions() -> Vec<Region> {
    vec![
        Region::new(LogicalTable::NerForEcce, 0, 10, 0, 9),
        Region::new(LogicalTable::EnrollmentBySchoolType, 11, 19, 0, 3),
        Region::new(LogicalTable::DetailedEnrollment, 20, 37, 0, 18),
        Region::new(LogicalTable::TeachersDistribution, 38, 49, 0, 6),
        Region::new(LogicalTable::AgeDistribution, 50, 84, 0, 19),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> RawGrid {
        RawGrid::new(
            (0..rows)
                .map(|r| (0..cols).map(|c| format!("{}-{}", r, c)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_extract_resets_positions() {
        let g = grid(6, 5);
        let region = Region::new(LogicalTable::EnrollmentBySchoolType, 2, 4, 1, 3);
        let sub = extract(&g, &region).unwrap();

        assert_eq!(sub.row_count(), 3);
        assert_eq!(sub.width(), 3);
        assert_eq!(sub.cell(0, 0), "2-1");
        assert_eq!(sub.cell(2, 2), "4-3");
    }

    #[test]
    fn test_extract_pads_short_rows() {
        let g = RawGrid::from_rows(vec![vec!["a", "b", "c"], vec!["d"]]);
        let region = Region::new(LogicalTable::NerForEcce, 0, 1, 0, 2);
        let sub = extract(&g, &region).unwrap();

        assert_eq!(sub.rows()[1], vec!["d", "", ""]);
    }

    #[test]
    fn test_region_past_last_row_fails() {
        let g = grid(9, 10);
        let region = Region::new(LogicalTable::NerForEcce, 0, 10, 0, 9);
        let err = extract(&g, &region).unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::OutOfBounds { rows: 9, cols: 10, .. }
        ));
        assert!(err.to_string().contains("NER for ECCE"));
    }

    #[test]
    fn test_region_past_last_column_fails() {
        let g = grid(20, 3);
        let region = Region::new(LogicalTable::EnrollmentBySchoolType, 11, 19, 0, 3);
        assert!(matches!(
            extract(&g, &region),
            Err(ExtractionError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_inverted_region_fails() {
        let g = grid(20, 20);
        let region = Region::new(LogicalTable::AgeDistribution, 5, 4, 0, 1);
        assert!(matches!(
            extract(&g, &region),
            Err(ExtractionError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_default_regions_are_valid() {
        validate_regions(&default_regions()).unwrap();
    }

    #[test]
    fn test_overlapping_regions_rejected() {
        let mut regions = default_regions();
        regions[1].row_start = 10;
        assert!(matches!(
            validate_regions(&regions),
            Err(ExtractionError::Overlap {
                first: LogicalTable::NerForEcce,
                second: LogicalTable::EnrollmentBySchoolType
            })
        ));
    }

    #[test]
    fn test_missing_and_duplicate_regions_rejected() {
        let mut regions = default_regions();
        regions.pop();
        assert!(matches!(
            validate_regions(&regions),
            Err(ExtractionError::MissingRegion(LogicalTable::AgeDistribution))
        ));

        let mut regions = default_regions();
        regions.push(Region::new(LogicalTable::NerForEcce, 90, 95, 0, 3));
        assert!(matches!(
            validate_regions(&regions),
            Err(ExtractionError::DuplicateRegion(LogicalTable::NerForEcce))
        ));
    }
}

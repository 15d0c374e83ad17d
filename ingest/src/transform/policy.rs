//! Static normalization policy per logical table.
//!
//! Each table declares, once, how many header rows to skip, its canonical
//! column names and the coercion kind of every column. Nothing is inferred
//! by peeking at cell contents.

use serde::{Deserialize, Serialize};

use crate::models::{CoercionKind, LogicalTable};
use crate::transform::unstack::UnstackSpec;

/// Provinces in the order the Age Distribution sheet lists them.
pub const PROVINCES: [&str; 6] = ["Torba", "Sanma", "Penama", "Malampa", "Shefa", "Tafea"];

/// Years covered by the NER for ECCE table.
pub const NER_YEARS: [u16; 3] = [2018, 2019, 2020];

/// Physical layout the tables are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceShape {
    /// One sheet, tables at fixed regions, some with a title row.
    #[default]
    Combined,
    /// One file per table, each with a single header row.
    Split,
}

/// Where column names come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// Names from the policy, whatever the header row says.
    #[default]
    Canonical,
    /// Names read from the last header row of the source.
    Inferred,
}

/// Name and kind of one canonical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: CoercionKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: CoercionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Complete normalization policy for one logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePolicy {
    pub table: LogicalTable,
    pub header_rows: usize,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub naming: NamingMode,
}

impl TablePolicy {
    /// Default policy of `table` when read from a source of `shape`.
    pub fn for_table(table: LogicalTable, shape: SourceShape) -> Self {
        Self {
            table,
            header_rows: default_header_rows(table, shape),
            columns: canonical_columns(table),
            naming: NamingMode::Canonical,
        }
    }

    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows;
        self
    }

    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    pub fn canonical_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Long-form conversion applied after normalization, if any.
    pub fn unstack(&self) -> Option<UnstackSpec> {
        match self.table {
            LogicalTable::DetailedEnrollment => Some(UnstackSpec::default()),
            _ => None,
        }
    }
}

/// Header rows above the data.
///
/// In the combined sheet, NER for ECCE and Age Distribution carry a two-row
/// header (year or province above the gender labels); the other tables have
/// one. Split files always have exactly one header row.
pub fn default_header_rows(table: LogicalTable, shape: SourceShape) -> usize {
    match (shape, table) {
        (SourceShape::Split, _) => 1,
        (SourceShape::Combined, LogicalTable::NerForEcce)
        | (SourceShape::Combined, LogicalTable::AgeDistribution) => 2,
        (SourceShape::Combined, _) => 1,
    }
}

/// Canonical column sequence of `table`, the contract with the report.
pub fn canonical_columns(table: LogicalTable) -> Vec<ColumnSpec> {
    use CoercionKind::{Count, Percentage, Text};

    match table {
        LogicalTable::NerForEcce => {
            let mut cols = vec![
                ColumnSpec::new("Province", Text),
                ColumnSpec::new("School_Type", Text),
            ];
            for year in NER_YEARS {
                for gender in ["Female", "Male", "Total"] {
                    cols.push(ColumnSpec::new(format!("{}_{}", gender, year), Percentage));
                }
            }
            cols
        }
        LogicalTable::EnrollmentBySchoolType => vec![
            ColumnSpec::new("School_Type", Text),
            ColumnSpec::new("ECCE", Count),
            ColumnSpec::new("Primary", Count),
            ColumnSpec::new("Secondary", Count),
            ColumnSpec::new("Total", Count),
        ],
        LogicalTable::DetailedEnrollment => {
            let mut cols = vec![
                ColumnSpec::new("Province", Text),
                ColumnSpec::new("PreSchool_Total", Count),
            ];
            cols.extend(grade_columns().into_iter().map(|g| ColumnSpec::new(g, Count)));
            for name in ["Primary_Total", "Secondary_Total", "Total"] {
                cols.push(ColumnSpec::new(name, Count));
            }
            cols
        }
        LogicalTable::TeachersDistribution => {
            let mut cols = vec![
                ColumnSpec::new("Province", Text),
                ColumnSpec::new("Gender", Text),
            ];
            for name in ["ECE", "PS", "PSET", "SC", "SS", "Total"] {
                cols.push(ColumnSpec::new(name, Count));
            }
            cols
        }
        LogicalTable::AgeDistribution => {
            let mut cols = vec![ColumnSpec::new("Year_Age", Text)];
            for province in PROVINCES {
                for gender in ["Female", "Male", "Total"] {
                    cols.push(ColumnSpec::new(format!("{}_{}", province, gender), Count));
                }
            }
            cols.push(ColumnSpec::new("Vanuatu_Total", Count));
            cols
        }
    }
}

/// `Grade_1` through `Grade_14`.
pub fn grade_columns() -> Vec<String> {
    (1..=14).map(|g| format!("Grade_{}", g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_widths() {
        assert_eq!(canonical_columns(LogicalTable::NerForEcce).len(), 11);
        assert_eq!(canonical_columns(LogicalTable::EnrollmentBySchoolType).len(), 5);
        assert_eq!(canonical_columns(LogicalTable::DetailedEnrollment).len(), 19);
        assert_eq!(canonical_columns(LogicalTable::TeachersDistribution).len(), 8);
        assert_eq!(canonical_columns(LogicalTable::AgeDistribution).len(), 20);
    }

    #[test]
    fn test_ner_columns_are_percentages() {
        let cols = canonical_columns(LogicalTable::NerForEcce);
        assert_eq!(cols[2].name, "Female_2018");
        assert_eq!(cols[10].name, "Total_2020");
        assert!(cols[2..].iter().all(|c| c.kind == CoercionKind::Percentage));
        assert!(cols[..2].iter().all(|c| c.kind == CoercionKind::Text));
    }

    #[test]
    fn test_detailed_enrollment_layout() {
        let names: Vec<String> = canonical_columns(LogicalTable::DetailedEnrollment)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names[0], "Province");
        assert_eq!(names[1], "PreSchool_Total");
        assert_eq!(names[2], "Grade_1");
        assert_eq!(names[15], "Grade_14");
        assert_eq!(&names[16..], ["Primary_Total", "Secondary_Total", "Total"]);
    }

    #[test]
    fn test_age_distribution_layout() {
        let cols = canonical_columns(LogicalTable::AgeDistribution);
        assert_eq!(cols[1].name, "Torba_Female");
        assert_eq!(cols[18].name, "Tafea_Total");
        assert_eq!(cols[19].name, "Vanuatu_Total");
    }

    #[test]
    fn test_header_rows_by_shape() {
        assert_eq!(default_header_rows(LogicalTable::NerForEcce, SourceShape::Combined), 2);
        assert_eq!(
            default_header_rows(LogicalTable::TeachersDistribution, SourceShape::Combined),
            1
        );
        for table in LogicalTable::ALL {
            assert_eq!(default_header_rows(table, SourceShape::Split), 1);
        }
    }

    #[test]
    fn test_only_detailed_enrollment_unstacks() {
        for table in LogicalTable::ALL {
            let policy = TablePolicy::for_table(table, SourceShape::Split);
            assert_eq!(
                policy.unstack().is_some(),
                table == LogicalTable::DetailedEnrollment
            );
        }
    }
}

//! Sample report data shared by the crate's tests.
//!
//! The same five tables can be written as one combined sheet laid out on the
//! default region map, or as five split files with a single header row each.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::LogicalTable;
use crate::transform::policy::PROVINCES;

pub struct Section {
    pub table: LogicalTable,
    /// Header rows as they appear in the combined sheet
    pub headers: Vec<Vec<String>>,
    pub data: Vec<Vec<String>>,
}

fn row<S: ToString>(cells: impl IntoIterator<Item = S>) -> Vec<String> {
    cells.into_iter().map(|c| c.to_string()).collect()
}

/// Sections in sheet order, each exactly as wide as its default region.
pub fn sections() -> Vec<Section> {
    vec![ner(), school_type(), detailed(), teachers(), age()]
}

fn ner() -> Section {
    let data = (0..9)
        .map(|i| {
            let mut cells = row([
                PROVINCES[i % 6],
                if i % 2 == 0 { "Government" } else { "Private" },
            ]);
            cells.extend((0..8).map(|c| format!("{}.{}%", 40 + i + c, c)));
            cells
        })
        .collect();

    Section {
        table: LogicalTable::NerForEcce,
        headers: vec![
            row(["Table 1: NER for ECCE", "", "2018", "", "", "2019", "", "", "2020", ""]),
            row(["Province", "School Type", "F", "M", "T", "F", "M", "T", "F", "M"]),
        ],
        data,
    }
}

fn school_type() -> Section {
    let data = (0..8)
        .map(|i| {
            let primary = if i == 7 {
                "N/A".to_string()
            } else {
                format!("{},{:03}", i + 1, i * 10)
            };
            row([format!("Type {}", i), format!("{}", 100 + i), primary, format!("{}", 50 + i)])
        })
        .collect();

    Section {
        table: LogicalTable::EnrollmentBySchoolType,
        headers: vec![row(["School Type", "ECCE", "Primary", "Secondary"])],
        data,
    }
}

/// Stacked province/F/M rows; Shefa reads `450 430 880` / `120 110 230`.
fn detailed() -> Section {
    let mut data = Vec::new();
    for (p, province) in PROVINCES.iter().enumerate() {
        for label in [*province, "F", "M"] {
            if data.len() == 16 {
                break;
            }
            let mut cells = row([label]);
            cells.extend((0..18).map(|c| format!("{}", (p + 1) * 10 + c)));
            data.push(cells);
        }
    }
    let mut grand = row(["Grand Total"]);
    grand.extend((0..18).map(|c| format!("{}", 1000 + c)));
    data.push(grand);

    // Shefa aggregate and its F row, PreSchool/Primary/Total columns
    let shefa = PROVINCES.iter().position(|p| *p == "Shefa").unwrap_or(4) * 3;
    data[shefa][1] = "450".into();
    data[shefa][16] = "430".into();
    data[shefa][18] = "880".into();
    data[shefa + 1][1] = "120".into();
    data[shefa + 1][16] = "110".into();
    data[shefa + 1][18] = "230".into();

    let mut header = row(["Province", "Pre-School"]);
    header.extend((1..=14).map(|g| format!("Year {}", g)));
    header.extend(row(["Primary", "Secondary", "Total"]));

    Section {
        table: LogicalTable::DetailedEnrollment,
        headers: vec![header],
        data,
    }
}

fn teachers() -> Section {
    let data = (0..11)
        .map(|i| {
            let mut cells = row([PROVINCES[i / 2], if i % 2 == 0 { "F" } else { "M" }]);
            cells.extend((0..5).map(|c| format!("{}", i * 5 + c)));
            cells
        })
        .collect();

    Section {
        table: LogicalTable::TeachersDistribution,
        headers: vec![row(["Province", "Gender", "ECE", "PS", "PSET", "SC", "SS"])],
        data,
    }
}

fn age() -> Section {
    let data = (0..33)
        .map(|i| {
            let mut cells = row([format!("Age {}", 3 + i)]);
            cells.extend((0..19).map(|c| format!("{}", i + c)));
            cells
        })
        .collect();

    let mut provinces = row(["Table 5: Age Distribution"]);
    let mut genders = row(["Year / Age"]);
    for province in PROVINCES {
        provinces.extend(row([province, "", ""]));
        genders.extend(row(["F", "M", "T"]));
    }
    provinces.push("Vanuatu".into());
    genders.push("Total".into());

    Section {
        table: LogicalTable::AgeDistribution,
        headers: vec![provinces, genders],
        data,
    }
}

fn to_csv(rows: &[Vec<String>]) -> String {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for r in rows {
        writer.write_record(r).expect("write record");
    }
    String::from_utf8(writer.into_inner().expect("flush csv")).expect("utf-8 csv")
}

/// Combined sheet text, 85 rows.
pub fn combined_csv() -> String {
    let rows: Vec<Vec<String>> = sections()
        .into_iter()
        .flat_map(|s| s.headers.into_iter().chain(s.data))
        .collect();
    to_csv(&rows)
}

/// Write the combined sheet into `dir`.
pub fn write_combined(dir: &Path) -> PathBuf {
    let path = dir.join("education.csv");
    fs::write(&path, combined_csv()).expect("write combined sheet");
    path
}

/// Write one file per table into `dir`, under the default file names.
pub fn write_split(dir: &Path) {
    for section in sections() {
        let mut rows = vec![section.headers.last().cloned().unwrap_or_default()];
        rows.extend(section.data);
        fs::write(dir.join(section.table.default_file_name()), to_csv(&rows))
            .expect("write split file");
    }
}

//! Edustats CLI - load and inspect the education report tables
//!
//! # Commands
//!
//! ```bash
//! edustats load --combined data/education.csv -o tables.json
//! edustats load --split-dir data/                # one file per table
//! edustats inspect                               # source from EDUSTATS_* env
//! edustats describe "NER for ECCE" Total_2020
//! edustats summary enrollment
//! edustats regions                               # default region map
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use edustats::logs::init_tracing;
use edustats::{
    analysis, default_regions, describe, load, IngestConfig, LogicalTable, NamingMode,
    NormalizedTable, TableSet,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "edustats")]
#[command(about = "Load and normalize education statistics exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every table and write them as JSON
    Load {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show each table's shape, columns and missing cells
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Summary statistics for one column
    Describe {
        /// Logical table name, e.g. "NER for ECCE"
        table: String,

        /// Column name, e.g. Total_2020
        column: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Group summaries used by the report
    Summary {
        kind: SummaryKind,

        #[command(flatten)]
        source: SourceArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default region map of the combined sheet
    Regions,
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryKind {
    /// Province totals (aggregate rows)
    Enrollment,
    /// Province totals by gender
    Gender,
    /// Grade 1-14 enrollment by province
    Grades,
    /// Teachers by province
    Teachers,
}

#[derive(Clone, Copy, ValueEnum)]
enum Naming {
    Canonical,
    Inferred,
}

/// Where to read from. Falls back to EDUSTATS_CONFIG, EDUSTATS_SOURCE and
/// EDUSTATS_DATA_DIR when no source flag is given.
#[derive(Args)]
struct SourceArgs {
    /// JSON config file
    #[arg(long, conflicts_with_all = ["combined", "split_dir"])]
    config: Option<PathBuf>,

    /// Combined sheet, read with the default region map
    #[arg(long, conflicts_with = "split_dir")]
    combined: Option<PathBuf>,

    /// Directory with one file per table
    #[arg(long)]
    split_dir: Option<PathBuf>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Column naming mode
    #[arg(long, value_enum)]
    naming: Option<Naming>,
}

impl SourceArgs {
    fn to_config(&self) -> Result<IngestConfig, Box<dyn std::error::Error>> {
        let mut config = if let Some(path) = &self.config {
            IngestConfig::from_file(path)?
        } else if let Some(path) = &self.combined {
            IngestConfig::combined(path)
        } else if let Some(dir) = &self.split_dir {
            IngestConfig::split_dir(dir)
        } else {
            IngestConfig::from_env()?
        };

        if self.delimiter.is_some() {
            config = config.with_delimiter(self.delimiter);
        }
        if let Some(naming) = self.naming {
            config = config.with_naming(match naming {
                Naming::Canonical => NamingMode::Canonical,
                Naming::Inferred => NamingMode::Inferred,
            });
        }
        Ok(config)
    }

    fn load(&self) -> Result<TableSet, Box<dyn std::error::Error>> {
        let config = self.to_config()?;
        eprintln!("📄 Loading {:?} source", config.shape());
        Ok(load(&config)?)
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    init_tracing("edustats=info");

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Load { source, output } => cmd_load(&source, output.as_deref()),
        Commands::Inspect { source } => cmd_inspect(&source),
        Commands::Describe {
            table,
            column,
            source,
        } => cmd_describe(&source, &table, &column),
        Commands::Summary {
            kind,
            source,
            output,
        } => cmd_summary(&source, kind, output.as_deref()),
        Commands::Regions => cmd_regions(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_load(source: &SourceArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let tables = source.load()?;
    eprintln!("✅ Loaded {} tables", tables.len());

    let json = serde_json::to_string_pretty(&tables.to_json())?;
    write_output(&json, output)
}

fn cmd_inspect(source: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tables = source.load()?;

    for table in tables.iter() {
        print_table(table);
    }
    Ok(())
}

fn print_table(table: &NormalizedTable) {
    println!("📋 {}", table.table);
    println!("   Shape: {} rows × {} columns", table.row_count(), table.column_count());
    println!("   Columns: {}", table.column_names().join(", "));
    println!("   Missing numeric cells: {}", table.missing_numeric_cells());
    if table.coercion_failures > 0 {
        println!("   ⚠️  Unparseable cells: {}", table.coercion_failures);
    }
    println!();
}

fn cmd_describe(
    source: &SourceArgs,
    table: &str,
    column: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let tables = source.load()?;
    let data = tables
        .get(table)
        .ok_or_else(|| edustats::AnalysisError::UnknownTable(table.to_string()))?;

    eprintln!("📊 {} / {}", data.table, column);
    let summary = describe(data, column)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_summary(
    source: &SourceArgs,
    kind: SummaryKind,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tables = source.load()?;
    let table_for = |t: LogicalTable| {
        tables
            .table(t)
            .ok_or_else(|| edustats::AnalysisError::UnknownTable(t.name().to_string()))
    };

    let summary = match kind {
        SummaryKind::Enrollment => {
            analysis::enrollment_summary(table_for(LogicalTable::DetailedEnrollment)?)?
        }
        SummaryKind::Gender => {
            analysis::gender_enrollment_summary(table_for(LogicalTable::DetailedEnrollment)?)?
        }
        SummaryKind::Grades => {
            analysis::enrollment_by_grade(table_for(LogicalTable::DetailedEnrollment)?)?
        }
        SummaryKind::Teachers => {
            analysis::teacher_totals(table_for(LogicalTable::TeachersDistribution)?)?
        }
    };

    eprintln!("📦 {} groups", summary.rows.len());
    let json = serde_json::to_string_pretty(&summary.to_records())?;
    write_output(&json, output)
}

fn cmd_regions() -> Result<(), Box<dyn std::error::Error>> {
    let regions = default_regions();
    for region in &regions {
        eprintln!("   {:<28} {}", region.table.name(), region);
    }
    println!("{}", serde_json::to_string_pretty(&regions)?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

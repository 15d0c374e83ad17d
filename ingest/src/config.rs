//! Ingestion configuration.
//!
//! Built explicitly (constructors), from a JSON file, or from the
//! environment by the binary. The library never reads the environment on its
//! own: [`load`](crate::transform::pipeline::load) takes the config as an
//! argument.
//!
//! ```json
//! {
//!   "source": { "shape": "combined", "path": "data/education.csv" },
//!   "delimiter": ",",
//!   "naming": "canonical",
//!   "header_rows": { "Age Distribution": 2 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{LogicalTable, Region};
use crate::transform::extract::default_regions;
use crate::transform::policy::{NamingMode, SourceShape, TablePolicy};

/// Config file path.
pub const ENV_CONFIG: &str = "EDUSTATS_CONFIG";
/// Combined source file path.
pub const ENV_SOURCE: &str = "EDUSTATS_SOURCE";
/// Directory holding one file per logical table.
pub const ENV_DATA_DIR: &str = "EDUSTATS_DATA_DIR";

/// Where the tables come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SourceConfig {
    /// One grid, tables located by region.
    Combined {
        path: PathBuf,
        #[serde(default = "default_regions")]
        regions: Vec<Region>,
    },
    /// One file per logical table, keyed by logical name.
    Split { paths: BTreeMap<String, PathBuf> },
}

/// Everything [`load`](crate::transform::pipeline::load) needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub source: SourceConfig,

    /// Field delimiter; detected from the first line when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,

    #[serde(default)]
    pub naming: NamingMode,

    /// Header skip-count overrides keyed by logical name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub header_rows: BTreeMap<String, usize>,
}

impl IngestConfig {
    fn with_source(source: SourceConfig) -> Self {
        Self {
            source,
            delimiter: None,
            naming: NamingMode::default(),
            header_rows: BTreeMap::new(),
        }
    }

    /// Combined sheet at `path` with the default region map.
    pub fn combined(path: impl Into<PathBuf>) -> Self {
        Self::with_source(SourceConfig::Combined {
            path: path.into(),
            regions: default_regions(),
        })
    }

    /// One explicit file per logical table.
    pub fn split<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = (LogicalTable, P)>,
        P: Into<PathBuf>,
    {
        let paths = paths
            .into_iter()
            .map(|(table, path)| (table.name().to_string(), path.into()))
            .collect();
        Self::with_source(SourceConfig::Split { paths })
    }

    /// Split files under `dir`, using each table's default file name.
    pub fn split_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::split(
            LogicalTable::ALL
                .iter()
                .map(|t| (*t, dir.join(t.default_file_name()))),
        )
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        if let SourceConfig::Combined {
            regions: ref mut current,
            ..
        } = self.source
        {
            *current = regions;
        }
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_naming(mut self, naming: NamingMode) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_header_rows(mut self, table: LogicalTable, header_rows: usize) -> Self {
        self.header_rows
            .insert(table.name().to_string(), header_rows);
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file. Relative source paths are taken relative
    /// to the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&content)?;
        Ok(match path.parent() {
            Some(base) => config.relative_to(base),
            None => config,
        })
    }

    /// Build from variables, looked up through `var`.
    ///
    /// Precedence: `EDUSTATS_CONFIG`, then `EDUSTATS_SOURCE`, then
    /// `EDUSTATS_DATA_DIR`.
    pub fn from_vars<F>(var: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = set(ENV_CONFIG) {
            return Self::from_file(path);
        }
        if let Some(path) = set(ENV_SOURCE) {
            return Ok(Self::combined(path));
        }
        if let Some(dir) = set(ENV_DATA_DIR) {
            return Ok(Self::split_dir(dir));
        }
        Err(ConfigError::NoSource)
    }

    /// Build from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn shape(&self) -> SourceShape {
        match self.source {
            SourceConfig::Combined { .. } => SourceShape::Combined,
            SourceConfig::Split { .. } => SourceShape::Split,
        }
    }

    /// Every logical name is known and, for split sources, every table has
    /// a file.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut overridden = BTreeSet::new();
        for name in self.header_rows.keys() {
            let table = resolve_table(name)?;
            if !overridden.insert(table) {
                return Err(ConfigError::DuplicateHeaderRows(table));
            }
        }

        if let SourceConfig::Split { .. } = self.source {
            self.split_paths()?;
        }
        Ok(())
    }

    /// Split files in logical table order.
    pub fn split_paths(&self) -> ConfigResult<Vec<(LogicalTable, PathBuf)>> {
        let paths = match &self.source {
            SourceConfig::Split { paths } => paths,
            SourceConfig::Combined { .. } => return Ok(Vec::new()),
        };

        let mut resolved = BTreeMap::new();
        for (name, path) in paths {
            let table = resolve_table(name)?;
            if resolved.insert(table, path.clone()).is_some() {
                return Err(ConfigError::DuplicateSource(table));
            }
        }

        LogicalTable::ALL
            .iter()
            .map(|table| {
                resolved
                    .remove(table)
                    .map(|path| (*table, path))
                    .ok_or(ConfigError::MissingSource(*table))
            })
            .collect()
    }

    /// Normalization policy of `table` under this config.
    pub fn policy(&self, table: LogicalTable) -> TablePolicy {
        let mut policy = TablePolicy::for_table(table, self.shape()).with_naming(self.naming);
        let header_override = self
            .header_rows
            .iter()
            .find(|(name, _)| LogicalTable::from_name(name) == Some(table));
        if let Some((_, rows)) = header_override {
            policy = policy.with_header_rows(*rows);
        }
        policy
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        match &mut self.source {
            SourceConfig::Combined { path, .. } => rebase(path),
            SourceConfig::Split { paths } => paths.values_mut().for_each(rebase),
        }
        self
    }
}

fn resolve_table(name: &str) -> ConfigResult<LogicalTable> {
    LogicalTable::from_name(name).ok_or_else(|| ConfigError::UnknownTable(name.to_string()))
}

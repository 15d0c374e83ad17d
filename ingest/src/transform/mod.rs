//! Transformation stages.
//!
//! - [`coerce`]: one raw cell to a typed value
//! - [`extract`]: regions out of a combined grid
//! - [`policy`]: per-table header counts, names and kinds
//! - [`normalize`]: raw sub-table to typed, named columns
//! - [`unstack`]: stacked province/gender rows to long form
//! - [`pipeline`]: the whole load

pub mod coerce;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod unstack;

pub use coerce::{coerce, is_coercion_failure};
pub use extract::{default_regions, extract, validate_regions};
pub use normalize::normalize;
pub use pipeline::load;
pub use policy::{canonical_columns, ColumnSpec, NamingMode, SourceShape, TablePolicy};
pub use unstack::{unstack, UnstackSpec};

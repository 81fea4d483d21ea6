//! `xlcompare-recon`: two-source reconciliation engine.
//!
//! Pure engine crate: receives fully materialized tables and named values,
//! returns classified differences. No file IO, no rendering.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod key;
pub mod matcher;
pub mod metric;
pub mod model;
pub mod number;

pub use classify::{classify, Classification};
pub use config::{PercentageBase, ReconConfig};
pub use engine::reconcile_tables;
pub use error::ReconError;
pub use key::{normalize_key, normalize_name, CanonicalKey};
pub use metric::reconcile_metrics;
pub use model::{
    CellResult, CellValue, Measure, MetricRecord, MetricReport, MissingSide, NamedValues,
    ReconciliationResult, ResultRow, RowOrigin, Side, Table,
};
pub use number::parse_number;

//! Dependency update check: which requirements downstream cannot satisfy, and
//! which upstream versions would fix them

pub mod collect;
pub mod report;

pub use collect::{LookupMemo, MissingDeps, check, collect_missing, recommend_updates};
pub use report::ReportFormatter;

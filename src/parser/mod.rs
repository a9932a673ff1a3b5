//! Parser layer
//! - macros.rs: `%global` definitions and `%{label}` substitution
//! - spec.rs: line-oriented RPM spec parser
//! - types.rs: Parsed spec metadata (SpecMetadata, PackageFiles)

pub mod macros;
pub mod spec;
pub mod types;

pub use macros::{Macro, MacroTable};
pub use spec::SpecParser;
pub use types::{PackageFiles, SpecMetadata};

//! Version layer: ordering, requirements, targets and reconciliation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Targets   │────▶│   Checker   │────▶│   Update    │
//! │ (fetch per  │     │ (reconcile) │     │ (decide)    │
//! │   source)   │     └─────────────┘     └─────────────┘
//! └─────────────┘            ▲
//!        │                   │
//!        ▼                   │
//! ┌─────────────┐     ┌─────────────┐
//! │    Cache    │     │    Tree     │
//! │ (artifacts) │     │ (dep walk)  │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`ordering`]: segment-wise version ordering and the `unknown` sentinel
//! - [`requirement`]: requirement parsing and matching, including `~>`
//! - [`nvr`]: `name-version-release` build identifiers
//! - [`target`]: the `Target`, `ComponentSource` and `ArtifactSource` traits
//! - [`targets`]: concrete targets (gem, koji, fedora, git, yum, bodhi, errata, upstream)
//! - [`checker`]: concurrent fan-out and version collapsing
//! - [`tree`]: dependency traversal
//! - [`update`]: the update decision
//! - [`cache`]: SQLite-indexed artifact cache
//! - [`error`]: error types for targets and the cache

pub mod cache;
pub mod checker;
pub mod error;
pub mod nvr;
pub mod ordering;
pub mod requirement;
pub mod target;
pub mod targets;
pub mod tree;
pub mod update;

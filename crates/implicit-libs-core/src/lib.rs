//! # implicit-libs-core
//!
//! Convention-based project inference for TypeScript monorepos.
//!
//! A folder holding a marker file (`index.ts` by default) under
//! `<root>/<platform>/<scope>/<name>-<type>` is a library. This crate turns
//! such paths into project descriptors and keeps import aliases in sync.
//! It includes:
//!
//! - [`classify`] for deriving platform, scope, type and name from a path
//! - [`InferenceEngine`] for inferring descriptors from a batch of candidates
//! - [`TargetSynthesizer`] for building lint and test targets
//! - [`sync_tsconfig_paths`] for writing one alias per library
//!
//! ## Example
//!
//! ```ignore
//! use implicit_libs_core::{Config, InferenceEngine};
//!
//! let engine = InferenceEngine::builder()
//!     .root(".")
//!     .config(Config::default())
//!     .build()?;
//!
//! let report = engine.infer_workspace().await?;
//! for (dir, project) in report.projects() {
//!     println!("{} -> {}", dir, project.name);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alias;
mod ancestry;
mod classifier;
mod config;
mod discovery;
mod engine;
mod probe;
mod targets;
mod types;

/// Path helpers shared across modules.
pub mod utils;

pub use alias::{
    sync_paths, sync_tsconfig_paths, AliasSettings, GraphError, GraphFile, GraphNode, NodeKind,
    ProjectGraph, StaticGraph, SyncError, SyncSummary,
};
pub use ancestry::AncestryGuard;
pub use classifier::{classify, ClassifyError};
pub use config::{
    Config, ConfigError, EngineConfig, LintConfig, PathsConfig, ScanConfig, TestConfig,
};
pub use discovery::{discover_markers, DiscoveryError};
pub use engine::{InferenceEngine, InferenceEngineBuilder, InferenceError};
pub use probe::{exists, glob_under, has_file_matching, ProbeError};
pub use targets::{ancestor_config_paths, TargetSynthesizer, OUTPUT_FILE, WORKSPACE_ROOT};
pub use types::{
    InferenceReport, InferenceWarning, InferredNodes, ProjectDescriptor, ProjectIdentity,
    ProjectKind, ProjectTag, ProjectType, TargetDescriptor, TargetInput, TargetMetadata,
    TargetOptions, UnknownProjectType,
};

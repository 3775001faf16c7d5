//! Utility functions shared by discovery, inference and alias sync.

pub mod paths;

#[doc(inline)]
pub use paths::{normalize, parent_dir, to_slash};

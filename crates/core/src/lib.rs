//! goto-build - resolve a source file to the Bazel target that owns it
//!
//! This crate provides functionality to:
//! - Walk up from a source file to the nearest BUILD file
//! - Parse BUILD files into target declarations with tree-sitter-starlark
//! - Match the source file against each target's `srcs`/`hdrs`, expanding globs
//! - Drive the resolver as a subprocess the way an editor does
pub mod bazel;
pub mod client;
pub mod config;
pub mod error;
pub mod resolver;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use client::{Lookup, ResolverClient};
pub use config::ResolverConfig;
pub use resolver::BuildResolver;

//! Resolver configuration

mod settings;
pub mod validation;

pub use settings::{
    DEFAULT_BUILD_FILE_NAMES, DEFAULT_SOURCE_ATTRIBUTES, DEFAULT_WORKSPACE_MARKERS, ResolverConfig,
};
pub use validation::validate;

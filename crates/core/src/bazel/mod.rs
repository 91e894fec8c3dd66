//! Bazel BUILD file support using proper Starlark parsing

pub mod build_file;
pub mod glob_expansion;
pub mod rule_extractor;
pub mod starlark_parser;
pub mod target_finder;

pub use build_file::{Ascent, BuildFile, BuildFileLocator};
pub use glob_expansion::GlobExpander;
pub use rule_extractor::{
    AttributeValue, GlobPattern, InputPattern, RuleExtractor, SourceLocation, TargetDeclaration,
};
pub use starlark_parser::{StarlarkAst, StarlarkParser};
pub use target_finder::TargetFinder;

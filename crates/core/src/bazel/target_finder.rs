//! Find the targets in a BUILD file that claim a source file

use std::path::Path;

use super::build_file::BuildFile;
use super::glob_expansion::GlobExpander;
use super::rule_extractor::{InputPattern, TargetDeclaration};
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::utils::{normalize_relative, relative_to};

/// Matches a source file against the input sets of declared targets
pub struct TargetFinder<'a> {
    config: &'a ResolverConfig,
}

impl<'a> TargetFinder<'a> {
    pub fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }

    /// The first target in file order whose inputs contain `source`
    pub fn find_owner<'b>(
        &self,
        build_file: &'b BuildFile,
        source: &Path,
    ) -> Result<Option<&'b TargetDeclaration>> {
        let Some(relative) = relative_to(source, &build_file.package_dir) else {
            tracing::debug!(
                "{:?} is not under the package directory {:?}",
                source,
                build_file.package_dir
            );
            return Ok(None);
        };

        for target in &build_file.targets {
            if self.target_includes_file(target, &build_file.package_dir, &relative)? {
                tracing::debug!("{} `{}` owns {:?}", target.rule_type, target.name, relative);
                return Ok(Some(target));
            }
        }

        tracing::debug!("No target in {:?} claims {:?}", build_file.path, relative);
        Ok(None)
    }

    /// Every target whose inputs contain `source`, in file order
    pub fn find_owners<'b>(
        &self,
        build_file: &'b BuildFile,
        source: &Path,
    ) -> Result<Vec<&'b TargetDeclaration>> {
        let Some(relative) = relative_to(source, &build_file.package_dir) else {
            return Ok(Vec::new());
        };

        let mut owners = Vec::new();
        for target in &build_file.targets {
            if self.target_includes_file(target, &build_file.package_dir, &relative)? {
                owners.push(target);
            }
        }
        Ok(owners)
    }

    /// Check if a target's input set contains the package-relative `relative`
    fn target_includes_file(
        &self,
        target: &TargetDeclaration,
        package_dir: &Path,
        relative: &Path,
    ) -> Result<bool> {
        tracing::trace!("checking if target {} includes file {:?}", target.name, relative);
        let expander = GlobExpander::new(package_dir, self.config);

        for input in target.inputs(&self.config.source_attributes) {
            match input {
                InputPattern::File(file) => {
                    if normalize_relative(Path::new(&file)) == relative {
                        tracing::trace!("  direct match {}", file);
                        return Ok(true);
                    }
                }
                InputPattern::Glob(glob) => {
                    // Skip the directory walk when the pattern cannot match anyway
                    if !GlobExpander::could_match(&glob, relative)? {
                        continue;
                    }
                    if expander.expand(&glob)?.contains(relative) {
                        tracing::trace!("  matched glob {:?}", glob.patterns);
                        return Ok(true);
                    }
                }
                // Outputs of other targets never name a source file directly
                InputPattern::Label(_) => {}
            }
        }

        Ok(false)
    }
}

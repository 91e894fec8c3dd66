//! Locate and load the BUILD file that governs a source file

use std::fs;
use std::path::{Path, PathBuf};

use super::rule_extractor::{RuleExtractor, TargetDeclaration};
use super::starlark_parser::StarlarkParser;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};

/// A BUILD file found by ascending from a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ascent {
    pub build_file: PathBuf,
    /// Parent directories climbed above the source file's own directory
    pub steps: usize,
}

/// Walks up the directory tree looking for the nearest BUILD file
pub struct BuildFileLocator<'a> {
    config: &'a ResolverConfig,
}

impl<'a> BuildFileLocator<'a> {
    pub fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }

    /// Find the BUILD file for an absolute, normalized source path
    ///
    /// Returns `None` when the workspace boundary or the filesystem root is
    /// reached first, or when the source lies outside an explicit workspace root.
    pub fn locate(&self, source: &Path) -> Option<Ascent> {
        let mut current_dir = source.parent()?;
        if let Some(root) = &self.config.workspace_root {
            if !current_dir.starts_with(root) {
                tracing::debug!("{:?} is outside workspace root {:?}", source, root);
                return None;
            }
        }
        let mut steps = 0;

        tracing::debug!(
            "locate: starting from {:?}, workspace_root={:?}",
            current_dir,
            self.config.workspace_root
        );

        loop {
            if let Some(build_file) = self.build_file_in(current_dir) {
                tracing::debug!("Found {:?} after {} steps", build_file, steps);
                return Some(Ascent { build_file, steps });
            }

            if self.is_workspace_boundary(current_dir) {
                tracing::debug!("Reached workspace boundary {:?} without a BUILD file", current_dir);
                return None;
            }

            let Some(parent) = current_dir.parent() else {
                tracing::debug!("Reached filesystem root without a BUILD file");
                return None;
            };
            current_dir = parent;
            steps += 1;
            tracing::trace!("Moving up to {:?}", current_dir);
        }
    }

    /// First configured build file name present in `dir` as a regular file
    fn build_file_in(&self, dir: &Path) -> Option<PathBuf> {
        self.config
            .build_file_names
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    fn is_workspace_boundary(&self, dir: &Path) -> bool {
        match &self.config.workspace_root {
            Some(root) => dir == root,
            None => self
                .config
                .workspace_markers
                .iter()
                .any(|marker| dir.join(marker).exists()),
        }
    }
}

/// A parsed BUILD file
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub path: PathBuf,
    /// The package directory that source paths are resolved against
    pub package_dir: PathBuf,
    pub targets: Vec<TargetDeclaration>,
}

impl BuildFile {
    /// Read and parse the BUILD file at `path`
    pub fn load(path: &Path, parser: &mut StarlarkParser) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        Self::parse(path, &content, parser)
    }

    /// Parse already-read BUILD file content
    pub fn parse(path: &Path, content: &str, parser: &mut StarlarkParser) -> Result<Self> {
        let ast = parser.parse_build_file(path, content)?;
        let targets = RuleExtractor::extract_rules(&ast);
        tracing::debug!("Extracted {} targets from {:?}", targets.len(), path);

        let package_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            package_dir,
            targets,
        })
    }
}

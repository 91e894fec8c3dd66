//! Expand `glob()` patterns against the package directory

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::rule_extractor::GlobPattern;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::utils::relative_to;

/// `*` and `?` stay inside one path component; `**` crosses directories
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expands globs relative to one package directory
pub struct GlobExpander<'a> {
    package_dir: &'a Path,
    config: &'a ResolverConfig,
}

impl<'a> GlobExpander<'a> {
    pub fn new(package_dir: &'a Path, config: &'a ResolverConfig) -> Self {
        Self {
            package_dir,
            config,
        }
    }

    /// Files matched by `glob`, relative to the package directory
    ///
    /// Only regular files are produced. Files inside a nested package and
    /// files matched by an `exclude` pattern are dropped.
    pub fn expand(&self, glob: &GlobPattern) -> Result<BTreeSet<PathBuf>> {
        let excludes = compile_all(&glob.exclude)?;
        let escaped_root = Pattern::escape(&self.package_dir.to_string_lossy());
        let mut subpackages = HashMap::new();
        let mut files = BTreeSet::new();

        for include in &glob.patterns {
            let include = match_files_below(include);
            compile(&include)?;
            if !is_package_relative(&include) {
                tracing::debug!("Skipping glob pattern outside the package: {}", include);
                continue;
            }

            let full_pattern = format!("{escaped_root}/{include}");
            let paths = glob::glob_with(&full_pattern, MATCH_OPTIONS).map_err(|e| {
                Error::PatternError {
                    pattern: include.to_string(),
                    message: e.msg.to_string(),
                }
            })?;

            for entry in paths {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    Error::read(path, e.into_error())
                })?;
                if !path.is_file() {
                    continue;
                }
                let Some(relative) = relative_to(&path, self.package_dir) else {
                    continue;
                };
                if excludes.iter().any(|p| p.matches_path_with(&relative, MATCH_OPTIONS)) {
                    continue;
                }
                if self.in_subpackage(&relative, &mut subpackages) {
                    tracing::trace!("{:?} belongs to a nested package", relative);
                    continue;
                }
                files.insert(relative);
            }
        }

        tracing::trace!("glob {:?} expanded to {} files", glob.patterns, files.len());
        Ok(files)
    }

    /// Cheap check that `relative` could be produced by `glob`, without I/O
    pub fn could_match(glob: &GlobPattern, relative: &Path) -> Result<bool> {
        for include in &glob.patterns {
            if compile(include)?.matches_path_with(relative, MATCH_OPTIONS) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether any directory between the package root and the file has its own build file
    fn in_subpackage(&self, relative: &Path, seen: &mut HashMap<PathBuf, bool>) -> bool {
        let mut dir = relative.parent();
        while let Some(current) = dir {
            if current.as_os_str().is_empty() {
                break;
            }
            let is_package = *seen
                .entry(current.to_path_buf())
                .or_insert_with(|| self.config.has_build_file(&self.package_dir.join(current)));
            if is_package {
                return true;
            }
            dir = current.parent();
        }
        false
    }
}

/// A trailing `**` only yields directories; extend it to the files below them
fn match_files_below(pattern: &str) -> Cow<'_, str> {
    if pattern == "**" || pattern.ends_with("/**") {
        Cow::Owned(format!("{pattern}/*"))
    } else {
        Cow::Borrowed(pattern)
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(&match_files_below(pattern)).map_err(|e| Error::PatternError {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })
}

fn compile_all(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns.iter().map(|p| compile(p)).collect()
}

fn is_package_relative(pattern: &str) -> bool {
    !pattern.is_empty()
        && !Path::new(pattern).is_absolute()
        && !pattern.split('/').any(|segment| segment == "..")
}

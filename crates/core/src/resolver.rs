//! Resolver that coordinates ascent, parsing and target matching

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    bazel::{BuildFile, BuildFileLocator, StarlarkParser, TargetDeclaration, TargetFinder},
    config::{self, ResolverConfig},
    error::Result,
    types::{BuildLocation, NotFoundReason, Resolution},
    utils::normalize,
};

/// Resolves a source file to the declaration of the target that owns it
///
/// Every call to [`BuildResolver::resolve`] reads the file system afresh;
/// nothing is cached between calls.
pub struct BuildResolver {
    parser: StarlarkParser,
    config: ResolverConfig,
    cwd: PathBuf,
}

impl BuildResolver {
    pub fn new() -> Result<Self> {
        Self::with_config(ResolverConfig::default())
    }

    /// Relative paths are taken relative to the process working directory
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        Self::with_config_in(config, env::current_dir()?)
    }

    /// Relative paths, including the workspace root, are taken relative to `cwd`
    pub fn with_config_in(mut config: ResolverConfig, cwd: impl Into<PathBuf>) -> Result<Self> {
        let cwd = cwd.into();
        config.workspace_root = config.workspace_root.map(|root| normalize(&root, &cwd));
        config::validate(&config)?;

        Ok(Self {
            parser: StarlarkParser::new()?,
            config,
            cwd,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Find the BUILD file location for the first target that owns `source`
    pub fn resolve(&mut self, source: &Path) -> Result<Resolution> {
        let source = normalize(source, &self.cwd);
        debug!("resolve: source={:?}", source);

        let Some(build_file) = self.load_build_file_for(&source)? else {
            return Ok(Resolution::NotFound(NotFoundReason::NoBuildFile));
        };

        let finder = TargetFinder::new(&self.config);
        match finder.find_owner(&build_file, &source)? {
            Some(target) => Ok(Resolution::Found(location_of(&build_file, target))),
            None => Ok(Resolution::NotFound(NotFoundReason::NoOwningTarget)),
        }
    }

    /// Locations of every target that owns `source`, in file order
    pub fn resolve_all(&mut self, source: &Path) -> Result<Vec<BuildLocation>> {
        let source = normalize(source, &self.cwd);
        debug!("resolve_all: source={:?}", source);

        let Some(build_file) = self.load_build_file_for(&source)? else {
            return Ok(Vec::new());
        };

        let finder = TargetFinder::new(&self.config);
        Ok(finder
            .find_owners(&build_file, &source)?
            .into_iter()
            .map(|target| location_of(&build_file, target))
            .collect())
    }

    fn load_build_file_for(&mut self, source: &Path) -> Result<Option<BuildFile>> {
        let Some(ascent) = BuildFileLocator::new(&self.config).locate(source) else {
            debug!("No BUILD file governs {:?}", source);
            return Ok(None);
        };
        debug!("Using BUILD file: {:?}", ascent.build_file);

        BuildFile::load(&ascent.build_file, &mut self.parser).map(Some)
    }
}

fn location_of(build_file: &BuildFile, target: &TargetDeclaration) -> BuildLocation {
    BuildLocation {
        build_file: build_file.path.clone(),
        line: target.line(),
        target: Some(target.name.clone()),
        rule: Some(target.rule_type.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_relative_source_against_cwd() {
        let temp_dir = TempDir::new().unwrap();
        let pkg = temp_dir.path().join("pkg");
        fs::create_dir(&pkg).unwrap();
        fs::write(temp_dir.path().join("MODULE.bazel"), "").unwrap();
        fs::write(
            pkg.join("BUILD.bazel"),
            "\n\ngo_library(name = \"x\", srcs = [\"main.go\"])\n",
        )
        .unwrap();

        let mut resolver =
            BuildResolver::with_config_in(ResolverConfig::default(), &pkg).unwrap();
        let resolution = resolver.resolve(Path::new("main.go")).unwrap();

        let location = resolution.location().unwrap();
        assert_eq!(location.build_file, pkg.join("BUILD.bazel"));
        assert_eq!(location.line, 3);
        assert_eq!(location.target.as_deref(), Some("x"));
        assert_eq!(location.rule.as_deref(), Some("go_library"));
    }

    #[test]
    fn test_not_found_reasons() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("WORKSPACE"), "").unwrap();
        fs::create_dir_all(root.join("orphan")).unwrap();
        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::write(root.join("pkg/BUILD"), "filegroup(name = \"fg\", srcs = [\"a.txt\"])\n").unwrap();

        let mut resolver = BuildResolver::with_config_in(ResolverConfig::default(), root).unwrap();
        assert_eq!(
            resolver.resolve(&root.join("orphan/a.txt")).unwrap(),
            Resolution::NotFound(NotFoundReason::NoBuildFile)
        );
        assert_eq!(
            resolver.resolve(&root.join("pkg/b.txt")).unwrap(),
            Resolution::NotFound(NotFoundReason::NoOwningTarget)
        );
        assert!(resolver.resolve_all(&root.join("orphan/a.txt")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("MODULE.bazel"), "").unwrap();
        fs::write(root.join("BUILD"), "go_library(\n    name = \"x\"\n    srcs = [\"a.go\"],\n)\n").unwrap();

        let mut resolver = BuildResolver::with_config_in(ResolverConfig::default(), root).unwrap();
        let err = resolver.resolve(&root.join("a.go")).unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }), "{err}");
    }

    #[test]
    fn test_relative_workspace_root_is_normalized() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();

        let config = ResolverConfig::default().with_workspace_root("./a/../a");
        let resolver = BuildResolver::with_config_in(config, root).unwrap();
        assert_eq!(resolver.config().workspace_root.as_deref(), Some(root.join("a").as_path()));
    }
}

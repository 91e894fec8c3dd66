use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Build file names checked in every directory, in priority order
pub const DEFAULT_BUILD_FILE_NAMES: &[&str] = &["BUILD.bazel", "BUILD"];

/// Files whose presence marks the top of a Bazel workspace
pub const DEFAULT_WORKSPACE_MARKERS: &[&str] =
    &["MODULE.bazel", "WORKSPACE", "WORKSPACE.bazel", "REPO.bazel"];

/// Rule attributes that list the input files of a target
pub const DEFAULT_SOURCE_ATTRIBUTES: &[&str] = &["srcs", "hdrs"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolverConfig {
    pub build_file_names: Vec<String>,
    pub workspace_markers: Vec<String>,
    pub source_attributes: Vec<String>,

    /// Explicit ascent boundary; overrides marker detection when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            build_file_names: to_owned(DEFAULT_BUILD_FILE_NAMES),
            workspace_markers: to_owned(DEFAULT_WORKSPACE_MARKERS),
            source_attributes: to_owned(DEFAULT_SOURCE_ATTRIBUTES),
            workspace_root: None,
        }
    }
}

impl ResolverConfig {
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn with_build_file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_file_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether `dir` holds a build file of its own
    pub fn has_build_file(&self, dir: &Path) -> bool {
        self.build_file_names.iter().any(|n| dir.join(n).is_file())
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.build_file_names, vec!["BUILD.bazel", "BUILD"]);
        assert_eq!(config.source_attributes, vec!["srcs", "hdrs"]);
        assert!(config.workspace_markers.contains(&"MODULE.bazel".to_string()));
        assert!(config.workspace_root.is_none());
    }

    #[test]
    fn test_serialization_skips_unset_root() {
        let json = serde_json::to_value(ResolverConfig::default()).unwrap();
        assert!(json.get("workspace_root").is_none());
        assert_eq!(json["build_file_names"][0], "BUILD.bazel");

        let config: ResolverConfig = serde_json::from_value(serde_json::json!({
            "build_file_names": ["BUCK"],
            "workspace_markers": [".buckconfig"],
            "source_attributes": ["srcs"],
        }))
        .unwrap();
        assert_eq!(config.build_file_names, vec!["BUCK"]);
        assert!(config.workspace_root.is_none());
    }

    #[test]
    fn test_has_build_file_ignores_directories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("BUILD")).unwrap();

        let config = ResolverConfig::default();
        assert!(!config.has_build_file(temp_dir.path()));

        std::fs::write(temp_dir.path().join("BUILD.bazel"), "").unwrap();
        assert!(config.has_build_file(temp_dir.path()));
    }
}

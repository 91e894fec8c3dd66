use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;

/// A place in a BUILD file the editor should jump to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLocation {
    pub build_file: PathBuf,
    /// 1-based line of the target declaration
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl BuildLocation {
    pub fn new(build_file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            build_file: build_file.into(),
            line,
            target: None,
            rule: None,
        }
    }
}

/// Renders the `path:line` form printed by the resolver
impl fmt::Display for BuildLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.build_file.display(), self.line)
    }
}

/// Parses `path:line`, splitting on the first colon only
impl FromStr for BuildLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| Error::MalformedOutput {
            output: s.to_string(),
            reason: reason.to_string(),
        };

        let (path, line) = s.split_once(':').ok_or_else(|| malformed("missing `:`"))?;
        if path.is_empty() {
            return Err(malformed("empty path"));
        }
        let line: usize = line
            .trim()
            .parse()
            .map_err(|_| malformed("line is not a positive integer"))?;
        if line == 0 {
            return Err(malformed("line is not a positive integer"));
        }

        Ok(Self::new(path, line))
    }
}

/// Why a resolution produced no location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// No BUILD file between the source file and the workspace boundary
    NoBuildFile,
    /// A BUILD file was found but none of its targets lists the source file
    NoOwningTarget,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::NoBuildFile => write!(f, "no BUILD file found"),
            NotFoundReason::NoOwningTarget => write!(f, "no target owns this file"),
        }
    }
}

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(BuildLocation),
    NotFound(NotFoundReason),
}

impl Resolution {
    pub fn location(&self) -> Option<&BuildLocation> {
        match self {
            Resolution::Found(location) => Some(location),
            Resolution::NotFound(_) => None,
        }
    }
}

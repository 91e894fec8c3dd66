use anyhow::Result;
use clap::Parser;
use goto_build_core::ResolverConfig;
use std::io::Write;
use std::path::PathBuf;

use crate::commands::resolve_command;
use crate::display::OutputFormat;

/// Print the BUILD file and line of the target that owns a source file
#[derive(Parser, Debug)]
#[command(name = "goto_build")]
#[command(version, about, long_about = None)]
#[command(after_help = "OUTPUT:\n    <build-file>:<line> on success, nothing when no target owns the file\n\nENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging (written to stderr)")]
pub struct GotoBuild {
    /// Source file to find the owning BUILD target for
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: PathBuf,

    /// Stop the upward search at this directory instead of at MODULE.bazel/WORKSPACE
    #[arg(long = "workspace-root", value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// BUILD file name to look for, in priority order (repeatable)
    #[arg(long = "build-file-name", value_name = "NAME")]
    pub build_file_names: Vec<String>,

    /// Rule attribute listing source files (repeatable, default: srcs, hdrs)
    #[arg(long = "attr", value_name = "NAME")]
    pub attributes: Vec<String>,

    /// Print every owning target, one per line
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Print matches as JSON
    #[arg(long = "json")]
    pub json: bool,
}

impl GotoBuild {
    /// Resolver configuration with the defaults overridden by flags
    pub fn config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();
        if let Some(root) = &self.workspace_root {
            config = config.with_workspace_root(root);
        }
        if !self.build_file_names.is_empty() {
            config = config.with_build_file_names(self.build_file_names.iter().cloned());
        }
        if !self.attributes.is_empty() {
            config = config.with_source_attributes(self.attributes.iter().cloned());
        }
        config
    }

    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }

    /// Execute the command, writing the result to `out`
    pub fn execute(&self, out: &mut impl Write) -> Result<()> {
        resolve_command(self, out)
    }
}

//! Starlark parser using tree-sitter-starlark

use crate::error::{Error, Result};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Longest excerpt of offending source quoted in a parse error
const MAX_EXCERPT: usize = 40;

/// Parser for Starlark/BUILD files
pub struct StarlarkParser {
    parser: Parser,
}

impl StarlarkParser {
    /// Create a new Starlark parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_starlark::LANGUAGE;
        parser
            .set_language(&language.into())
            .map_err(|e| Error::TreeSitterError(format!("Failed to set Starlark language: {e}")))?;

        Ok(Self { parser })
    }

    /// Parse BUILD file content into an AST
    ///
    /// `path` only labels the error; the content is never re-read.
    pub fn parse_build_file(&mut self, path: &Path, content: &str) -> Result<StarlarkAst> {
        let tree = self.parser.parse(content, None).ok_or_else(|| {
            Error::TreeSitterError(format!("parser gave up on {}", path.display()))
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, message) = match first_syntax_error(root) {
                Some(node) => (node.start_position().row + 1, describe(&node, content)),
                None => (root.start_position().row + 1, "invalid syntax".to_string()),
            };
            tracing::debug!("syntax error in {:?} at line {}: {}", path, line, message);
            return Err(Error::ParseError {
                path: path.to_path_buf(),
                line,
                message,
            });
        }

        Ok(StarlarkAst {
            tree,
            source: content.to_string(),
        })
    }
}

/// Depth-first search for the earliest ERROR or MISSING node
fn first_syntax_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_error() || child.is_missing() {
            if let Some(found) = first_syntax_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn describe(node: &Node<'_>, source: &str) -> String {
    if node.is_missing() {
        return format!("missing `{}`", node.kind());
    }

    let text = node.utf8_text(source.as_bytes()).unwrap_or("");
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return "unexpected syntax".to_string();
    }
    let excerpt: String = first_line.chars().take(MAX_EXCERPT).collect();
    if excerpt.len() < first_line.len() {
        format!("unexpected `{excerpt}...`")
    } else {
        format!("unexpected `{excerpt}`")
    }
}

/// Parsed Starlark AST
pub struct StarlarkAst {
    pub tree: Tree,
    pub source: String,
}

impl StarlarkAst {
    /// Get the root node of the AST
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Get a slice of the source code for a node
    pub fn node_text<'a>(&'a self, node: &Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

//! Extract target declarations from Starlark AST

use std::collections::HashMap;
use tree_sitter::Node;

use super::starlark_parser::StarlarkAst;

/// A target declared in a BUILD file, e.g. `go_library(name = "lib", ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDeclaration {
    /// The called rule or macro (`go_library`, `native.cc_binary`, ...)
    pub rule_type: String,
    pub name: String,
    pub attributes: HashMap<String, AttributeValue>,
    /// Where the callee expression starts
    pub location: SourceLocation,
}

impl TargetDeclaration {
    /// 1-based line of the declaration's opening token
    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Flatten the listed attributes into input references, in attribute order
    pub fn inputs<S: AsRef<str>>(&self, attribute_names: &[S]) -> Vec<InputPattern> {
        let mut inputs = Vec::new();
        for name in attribute_names {
            if let Some(value) = self.attributes.get(name.as_ref()) {
                value.collect_inputs(&mut inputs);
            }
        }
        inputs
    }
}

/// Attribute values in rule calls
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    /// Reference to another target: `:gen`, `//pkg:lib`, `@repo//pkg:lib`
    Label(String),
    List(Vec<AttributeValue>),
    Glob(GlobPattern),
    /// Every branch of a `select({...})`
    Select(Vec<AttributeValue>),
    /// Operands of `a + b + ...`
    Concat(Vec<AttributeValue>),
    Dict(Vec<(AttributeValue, AttributeValue)>),
    Boolean(bool),
    Integer(i64),
    None,
    /// Any expression this extractor does not model, as source text
    Expr(String),
}

impl AttributeValue {
    fn collect_inputs(&self, out: &mut Vec<InputPattern>) {
        match self {
            AttributeValue::String(path) => out.push(InputPattern::File(path.clone())),
            AttributeValue::Label(label) => out.push(InputPattern::Label(label.clone())),
            AttributeValue::Glob(glob) => out.push(InputPattern::Glob(glob.clone())),
            AttributeValue::List(items)
            | AttributeValue::Select(items)
            | AttributeValue::Concat(items) => {
                for item in items {
                    item.collect_inputs(out);
                }
            }
            AttributeValue::Dict(_)
            | AttributeValue::Boolean(_)
            | AttributeValue::Integer(_)
            | AttributeValue::None
            | AttributeValue::Expr(_) => {}
        }
    }

    /// Classify a string literal as a label or a plain string
    fn from_literal(value: String) -> Self {
        if is_label(&value) {
            AttributeValue::Label(value)
        } else {
            AttributeValue::String(value)
        }
    }

    /// The literal text carried by `String` and `Label`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) | AttributeValue::Label(s) => Some(s),
            _ => None,
        }
    }
}

/// An input reference taken from a source attribute
#[derive(Debug, Clone, PartialEq)]
pub enum InputPattern {
    File(String),
    Glob(GlobPattern),
    Label(String),
}

/// Glob pattern (e.g., glob(["*.go"], exclude = ["*_test.go"]))
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobPattern {
    pub patterns: Vec<String>,
    pub exclude: Vec<String>,
}

/// Source location in the BUILD file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
}

fn is_label(value: &str) -> bool {
    value.starts_with(':') || value.starts_with("//") || value.starts_with('@')
}

/// Extracts target declarations from Starlark AST
pub struct RuleExtractor;

impl RuleExtractor {
    /// Extract all target declarations from the AST, in source order
    pub fn extract_rules(ast: &StarlarkAst) -> Vec<TargetDeclaration> {
        let mut rules = Vec::new();
        Self::visit_node(ast.root(), ast, &mut rules);
        rules
    }

    /// Walk the tree looking for calls that declare a target
    fn visit_node(node: Node<'_>, ast: &StarlarkAst, rules: &mut Vec<TargetDeclaration>) {
        if node.kind() == "call" {
            if let Some(rule) = Self::extract_rule_call(&node, ast) {
                tracing::trace!("{} `{}` at line {}", rule.rule_type, rule.name, rule.line());
                rules.push(rule);
                // glob()/select() inside a declaration are not targets
                return;
            }
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            Self::visit_node(child, ast, rules);
        }
    }

    /// Extract a declaration from a call node; `None` when it has no `name`
    fn extract_rule_call(node: &Node, ast: &StarlarkAst) -> Option<TargetDeclaration> {
        let function_node = node.child_by_field_name("function")?;
        let args_node = node.child_by_field_name("arguments")?;

        let mut attributes = HashMap::new();
        let mut name_text = None;
        let mut cursor = args_node.walk();
        for child in args_node.named_children(&mut cursor) {
            if child.kind() != "keyword_argument" {
                continue;
            }
            let (Some(name_node), Some(value_node)) = (
                child.child_by_field_name("name"),
                child.child_by_field_name("value"),
            ) else {
                continue;
            };
            let key = ast.node_text(&name_node).to_string();
            if key == "name" {
                name_text = Some(ast.node_text(&value_node));
            }
            attributes.insert(key, Self::extract_value(&value_node, ast));
        }

        // Non-literal names keep their source text
        let name = match attributes.get("name")? {
            AttributeValue::String(name) | AttributeValue::Label(name) => name.clone(),
            _ => name_text?.to_string(),
        };

        let start = function_node.start_position();
        Some(TargetDeclaration {
            rule_type: ast.node_text(&function_node).to_string(),
            name,
            attributes,
            location: SourceLocation {
                line: start.row + 1,
                column: start.column,
            },
        })
    }

    /// Extract a value from an expression node
    fn extract_value(node: &Node, ast: &StarlarkAst) -> AttributeValue {
        match node.kind() {
            "string" => AttributeValue::from_literal(unquote(ast.node_text(node))),

            // "a" "b" is a single literal
            "concatenated_string" => {
                let mut value = String::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "string" {
                        value.push_str(&unquote(ast.node_text(&child)));
                    }
                }
                AttributeValue::from_literal(value)
            }

            "list" | "tuple" => AttributeValue::List(Self::extract_items(node, ast)),

            "dictionary" => {
                let mut entries = Vec::new();
                let mut cursor = node.walk();
                for pair in node.named_children(&mut cursor) {
                    if pair.kind() != "pair" {
                        continue;
                    }
                    if let (Some(key), Some(value)) = (
                        pair.child_by_field_name("key"),
                        pair.child_by_field_name("value"),
                    ) {
                        entries.push((
                            Self::extract_value(&key, ast),
                            Self::extract_value(&value, ast),
                        ));
                    }
                }
                AttributeValue::Dict(entries)
            }

            "call" => {
                let function = node
                    .child_by_field_name("function")
                    .map(|f| ast.node_text(&f))
                    .unwrap_or("");
                match function {
                    "glob" | "native.glob" => AttributeValue::Glob(Self::extract_glob_pattern(node, ast)),
                    "select" | "native.select" => Self::extract_select(node, ast),
                    _ => AttributeValue::Expr(ast.node_text(node).to_string()),
                }
            }

            "binary_expression" => {
                let is_plus = node
                    .child_by_field_name("operator")
                    .is_some_and(|op| ast.node_text(&op) == "+");
                let (Some(left), Some(right), true) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                    is_plus,
                ) else {
                    return AttributeValue::Expr(ast.node_text(node).to_string());
                };

                let mut operands = Vec::new();
                for side in [left, right] {
                    match Self::extract_value(&side, ast) {
                        AttributeValue::Concat(nested) => operands.extend(nested),
                        value => operands.push(value),
                    }
                }
                AttributeValue::Concat(operands)
            }

            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .find(|child| child.kind() != "comment");
                match inner {
                    Some(inner) => Self::extract_value(&inner, ast),
                    None => AttributeValue::Expr(ast.node_text(node).to_string()),
                }
            }

            "true" => AttributeValue::Boolean(true),
            "false" => AttributeValue::Boolean(false),
            "none" => AttributeValue::None,

            "integer" => {
                let text = ast.node_text(node);
                text.parse()
                    .map(AttributeValue::Integer)
                    .unwrap_or_else(|_| AttributeValue::Expr(text.to_string()))
            }

            _ => AttributeValue::Expr(ast.node_text(node).to_string()),
        }
    }

    /// Values of a list or tuple, skipping interleaved comments
    fn extract_items(node: &Node, ast: &StarlarkAst) -> Vec<AttributeValue> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .map(|child| Self::extract_value(&child, ast))
            .collect()
    }

    /// Extract `glob(include, exclude)` in positional or keyword form
    fn extract_glob_pattern(node: &Node, ast: &StarlarkAst) -> GlobPattern {
        let mut glob = GlobPattern::default();
        let Some(args_node) = node.child_by_field_name("arguments") else {
            return glob;
        };

        let mut positional = 0;
        let mut cursor = args_node.walk();
        for child in args_node.named_children(&mut cursor) {
            let (slot, value_node) = match child.kind() {
                "comment" => continue,
                "keyword_argument" => {
                    let Some(value) = child.child_by_field_name("value") else {
                        continue;
                    };
                    let key = child
                        .child_by_field_name("name")
                        .map(|n| ast.node_text(&n))
                        .unwrap_or("");
                    match key {
                        "include" => (0, value),
                        "exclude" => (1, value),
                        // exclude_directories, allow_empty
                        _ => continue,
                    }
                }
                _ => {
                    positional += 1;
                    (positional - 1, child)
                }
            };

            let strings = Self::string_items(&Self::extract_value(&value_node, ast));
            match slot {
                0 => glob.patterns.extend(strings),
                1 => glob.exclude.extend(strings),
                _ => {}
            }
        }

        glob
    }

    /// `select({cond: value, ...})` contributes every branch value
    fn extract_select(node: &Node, ast: &StarlarkAst) -> AttributeValue {
        let branches = node
            .child_by_field_name("arguments")
            .and_then(|args| {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .find(|child| child.kind() == "dictionary")
            })
            .map(|dict| Self::extract_value(&dict, ast));

        match branches {
            Some(AttributeValue::Dict(entries)) => {
                AttributeValue::Select(entries.into_iter().map(|(_, value)| value).collect())
            }
            _ => AttributeValue::Expr(ast.node_text(node).to_string()),
        }
    }

    fn string_items(value: &AttributeValue) -> Vec<String> {
        match value {
            AttributeValue::String(s) | AttributeValue::Label(s) => vec![s.clone()],
            AttributeValue::List(items) | AttributeValue::Concat(items) => {
                items.iter().flat_map(Self::string_items).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Decode a Starlark string literal, including its quotes and prefix
pub fn unquote(literal: &str) -> String {
    let body_start = literal.find(['"', '\'']).unwrap_or(0);
    let (prefix, quoted) = literal.split_at(body_start);
    let raw = prefix.contains(['r', 'R']);

    let body = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            quoted
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(quoted);

    if raw {
        body.to_string()
    } else {
        decode_escapes(body)
    }
}

fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('v') => out.push('\u{0B}'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // line continuation
            Some('\n') => {}
            Some('x') => push_code_point(&mut out, &mut chars, 2, 16, "\\x"),
            Some('u') => push_code_point(&mut out, &mut chars, 4, 16, "\\u"),
            Some('U') => push_code_point(&mut out, &mut chars, 8, 16, "\\U"),
            Some(d @ '0'..='7') => {
                let mut digits = d.to_string();
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&next @ '0'..='7') => {
                            digits.push(next);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Decode exactly `width` digits after an escape; keep the text if invalid
fn push_code_point(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    width: usize,
    radix: u32,
    escape: &str,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(&c) if c.is_digit(radix) => {
                digits.push(c);
                chars.next();
            }
            _ => break,
        }
    }

    let decoded = if digits.len() == width {
        u32::from_str_radix(&digits, radix).ok().and_then(char::from_u32)
    } else {
        None
    };
    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push_str(escape);
            out.push_str(&digits);
        }
    }
}

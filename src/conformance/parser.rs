//! Tree-sitter based parser for test artifact sources
//!
//! Artifacts are Python test definitions (pytest + metadata annotations).
//! Parsing never raises past this boundary: a syntax error comes back as a
//! structured `ParseFailure` so downstream checks can degrade to text-only
//! evaluation.

use serde::Serialize;
use std::cell::RefCell;
use tree_sitter::{Node, Parser};

// Tree-sitter parsers are expensive to create but can be reused across
// artifacts. Each rayon worker thread gets its own pre-configured parser.
thread_local! {
    static PYTHON_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        // Ignore error here - will be caught at parse time if language fails
        let _ = p.set_language(&tree_sitter_python::LANGUAGE.into());
        p
    });
}

/// Structured parse failure. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub line: usize,
    pub message: String,
}

/// A test-container (class) definition
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub line: usize,
    pub docstring: Option<String>,
    pub methods: Vec<MethodDef>,
}

/// A function or method definition with its scoped step labels
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub line: usize,
    pub docstring: Option<String>,
    /// Literal argument of each `with ...step("...")` block, in order
    pub steps: Vec<String>,
}

impl MethodDef {
    pub fn is_test(&self) -> bool {
        self.name.starts_with("test_")
    }
}

/// Structured view of a parsed artifact
#[derive(Debug, Clone, Default)]
pub struct ParsedArtifact {
    /// Top-level module names imported anywhere in the artifact
    pub imports: Vec<String>,
    pub classes: Vec<ClassDef>,
    /// Module-level function definitions (outside any class)
    pub functions: Vec<MethodDef>,
}

impl ParsedArtifact {
    /// All test methods: class members first, then module-level functions
    pub fn test_methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.classes
            .iter()
            .flat_map(|c| c.methods.iter())
            .chain(self.functions.iter())
            .filter(|m| m.is_test())
    }

    pub fn has_test_class(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn has_test_methods(&self) -> bool {
        self.classes
            .iter()
            .flat_map(|c| c.methods.iter())
            .any(|m| m.is_test())
    }
}

/// Parse an artifact's source text into its structured view.
///
/// Returns the first syntax error instead of a partial tree; text-based
/// checks still run against the raw source in that case.
pub fn parse(source: &str) -> Result<ParsedArtifact, ParseFailure> {
    let tree = PYTHON_PARSER.with(|p| p.borrow_mut().parse(source, None));
    let tree = match tree {
        Some(t) => t,
        None => {
            return Err(ParseFailure {
                line: 1,
                message: "parser produced no syntax tree".to_string(),
            })
        }
    };

    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(&root));
    }

    let mut artifact = ParsedArtifact {
        imports: extract_imports(&root, source),
        ..Default::default()
    };

    for i in 0..root.named_child_count() {
        let Some(child) = root.named_child(i) else {
            continue;
        };
        let Some(def) = definition_node(&child) else {
            continue;
        };
        match def.kind() {
            "class_definition" => {
                if let Some(class) = extract_class(&def, source) {
                    artifact.classes.push(class);
                }
            }
            "function_definition" => {
                if let Some(method) = extract_method(&def, source) {
                    artifact.functions.push(method);
                }
            }
            _ => {}
        }
    }

    Ok(artifact)
}

/// Locate the first error or missing node for the failure report
fn first_error(root: &Node) -> ParseFailure {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() {
            return ParseFailure {
                line: node.start_position().row + 1,
                message: "invalid syntax".to_string(),
            };
        }
        if node.is_missing() {
            return ParseFailure {
                line: node.start_position().row + 1,
                message: format!("missing {}", node.kind()),
            };
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return ParseFailure {
                    line: root.start_position().row + 1,
                    message: "invalid syntax".to_string(),
                };
            }
        }
    }
}

/// Unwrap a `decorated_definition` to the definition it wraps
fn definition_node<'a>(node: &Node<'a>) -> Option<Node<'a>> {
    match node.kind() {
        "decorated_definition" => node.child_by_field_name("definition"),
        "class_definition" | "function_definition" => Some(*node),
        _ => None,
    }
}

/// Collect top-level imported module names from anywhere in the tree
fn extract_imports(root: &Node, source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();

        match node.kind() {
            "import_statement" => {
                for i in 0..node.named_child_count() {
                    let Some(child) = node.named_child(i) else {
                        continue;
                    };
                    let name_node = match child.kind() {
                        "dotted_name" => Some(child),
                        "aliased_import" => child.child_by_field_name("name"),
                        _ => None,
                    };
                    if let Some(name) = name_node {
                        push_module(&mut imports, &node_text(&name, source));
                    }
                }
            }
            "import_from_statement" => {
                if let Some(module) = node.child_by_field_name("module_name") {
                    // Relative imports have no top-level module name
                    if module.kind() == "dotted_name" {
                        push_module(&mut imports, &node_text(&module, source));
                    }
                }
            }
            _ => {}
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return imports;
            }
        }
    }
}

fn push_module(imports: &mut Vec<String>, dotted: &str) {
    let top = dotted.split('.').next().unwrap_or(dotted).trim().to_string();
    if !top.is_empty() && !imports.contains(&top) {
        imports.push(top);
    }
}

fn extract_class(node: &Node, source: &str) -> Option<ClassDef> {
    let name = node_text(&node.child_by_field_name("name")?, source);
    let body = node.child_by_field_name("body");
    let docstring = body.as_ref().and_then(|b| block_docstring(b, source));

    let mut methods = Vec::new();
    if let Some(body) = body {
        for i in 0..body.named_child_count() {
            let Some(child) = body.named_child(i) else {
                continue;
            };
            if let Some(def) = definition_node(&child) {
                if def.kind() == "function_definition" {
                    if let Some(method) = extract_method(&def, source) {
                        methods.push(method);
                    }
                }
            }
        }
    }

    Some(ClassDef {
        name,
        line: node.start_position().row + 1,
        docstring,
        methods,
    })
}

fn extract_method(node: &Node, source: &str) -> Option<MethodDef> {
    let name = node_text(&node.child_by_field_name("name")?, source);
    let body = node.child_by_field_name("body");
    let docstring = body.as_ref().and_then(|b| block_docstring(b, source));

    let mut steps = Vec::new();
    if let Some(body) = body {
        collect_steps(&body, source, &mut steps);
    }

    Some(MethodDef {
        name,
        line: node.start_position().row + 1,
        docstring,
        steps,
    })
}

/// Docstring = a string expression as the first statement of a block
fn block_docstring(block: &Node, source: &str) -> Option<String> {
    let first = block.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() == "string" {
        Some(string_literal_text(&expr, source))
    } else {
        None
    }
}

/// Recursively gather step labels from `with` blocks
fn collect_steps(node: &Node, source: &str, steps: &mut Vec<String>) {
    for i in 0..node.named_child_count() {
        let Some(child) = node.named_child(i) else {
            continue;
        };
        if child.kind() == "with_statement" {
            for j in 0..child.named_child_count() {
                let Some(clause) = child.named_child(j) else {
                    continue;
                };
                if clause.kind() == "with_clause" {
                    collect_clause_steps(&clause, source, steps);
                }
            }
        }
        collect_steps(&child, source, steps);
    }
}

fn collect_clause_steps(clause: &Node, source: &str, steps: &mut Vec<String>) {
    for i in 0..clause.named_child_count() {
        let Some(item) = clause.named_child(i) else {
            continue;
        };
        if item.kind() != "with_item" {
            continue;
        }
        let Some(mut value) = item.child_by_field_name("value") else {
            continue;
        };
        // `with step("x") as s:` wraps the call in an as_pattern
        if value.kind() == "as_pattern" {
            match value.named_child(0) {
                Some(inner) => value = inner,
                None => continue,
            }
        }
        if value.kind() != "call" {
            continue;
        }
        let Some(args) = value.child_by_field_name("arguments") else {
            continue;
        };
        for k in 0..args.named_child_count() {
            if let Some(arg) = args.named_child(k) {
                if arg.kind() == "string" {
                    steps.push(string_literal_text(&arg, source));
                    break;
                }
            }
        }
    }
}

/// Literal content of a string node, without quotes or prefixes
fn string_literal_text(node: &Node, source: &str) -> String {
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            if child.kind() == "string_content" {
                return node_text(&child, source);
            }
        }
    }
    // Fallback for grammars without an explicit content node
    node_text(node, source)
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

fn node_text(node: &Node, source: &str) -> String {
    source[node.start_byte()..node.end_byte()].to_string()
}

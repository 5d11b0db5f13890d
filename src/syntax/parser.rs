//! Tree-sitter backed syntax provider
//!
//! Parsers are expensive to create but reusable, so each thread keeps its
//! own pre-configured set in thread-local storage. Parsing runs on the
//! blocking pool; awaiting it is the analysis pass's only suspension point.

use std::cell::RefCell;

use async_trait::async_trait;
use tree_sitter::{Node, Parser, Tree};

use super::{BufferSnapshot, Declaration, Language, SyntaxProvider};
use crate::error::FrictionError;
use crate::region::{DeclarationKind, Span};

thread_local! {
    static RUST_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        // Ignore error here - will be caught at parse time if language fails
        let _ = p.set_language(&tree_sitter_rust::LANGUAGE.into());
        p
    });

    static JS_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        let _ = p.set_language(&tree_sitter_javascript::LANGUAGE.into());
        p
    });

    static TS_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        let _ = p.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into());
        p
    });

    static PYTHON_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        let _ = p.set_language(&tree_sitter_python::LANGUAGE.into());
        p
    });

    static GO_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        let _ = p.set_language(&tree_sitter_go::LANGUAGE.into());
        p
    });
}

fn parse_with_pooled_parser(content: &str, language: Language) -> Result<Tree, FrictionError> {
    let parse_result = match language {
        Language::Rust => RUST_PARSER.with(|p| p.borrow_mut().parse(content, None)),
        Language::JavaScript => JS_PARSER.with(|p| p.borrow_mut().parse(content, None)),
        Language::TypeScript => TS_PARSER.with(|p| p.borrow_mut().parse(content, None)),
        Language::Python => PYTHON_PARSER.with(|p| p.borrow_mut().parse(content, None)),
        Language::Go => GO_PARSER.with(|p| p.borrow_mut().parse(content, None)),
        Language::Unknown => {
            return Err(FrictionError::analysis("no parser for unknown language"))
        }
    };

    parse_result.ok_or_else(|| FrictionError::analysis("failed to parse snapshot"))
}

/// The built-in `SyntaxProvider`: parses the snapshot and extracts
/// method/constructor declarations with their body spans.
pub struct TreeSitterProvider;

#[async_trait]
impl SyntaxProvider for TreeSitterProvider {
    async fn declarations(
        &self,
        snapshot: &BufferSnapshot,
    ) -> Result<Vec<Declaration>, FrictionError> {
        // Plain-text buffers have no methods to measure.
        if snapshot.language == Language::Unknown {
            return Ok(Vec::new());
        }

        let text = snapshot.text.clone();
        let language = snapshot.language;
        tokio::task::spawn_blocking(move || {
            let tree = parse_with_pooled_parser(&text, language)?;
            Ok(extract_declarations(&tree.root_node(), &text, language))
        })
        .await
        .map_err(|e| FrictionError::analysis(format!("parse task failed: {e}")))?
    }
}

/// Walk the whole tree and collect method/constructor declarations.
fn extract_declarations(root: &Node, content: &str, language: Language) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if let Some(decl) = match_declaration(&node, content, language) {
            declarations.push(decl);
        }

        if cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return declarations;
            }
        }
    }
}

/// Map a node to a declaration of interest, or `None`. Kinds are a closed
/// set: anything that is not a constructor form is a method.
fn match_declaration(node: &Node, content: &str, language: Language) -> Option<Declaration> {
    let kind = match (language, node.kind()) {
        (Language::Rust, "function_item") => DeclarationKind::Method,
        (Language::JavaScript | Language::TypeScript, "function_declaration") => {
            DeclarationKind::Method
        }
        (Language::JavaScript | Language::TypeScript, "method_definition") => {
            if field_text(node, "name", content) == Some("constructor") {
                DeclarationKind::Constructor
            } else {
                DeclarationKind::Method
            }
        }
        (Language::Python, "function_definition") => {
            if field_text(node, "name", content) == Some("__init__") {
                DeclarationKind::Constructor
            } else {
                DeclarationKind::Method
            }
        }
        (Language::Go, "function_declaration" | "method_declaration") => DeclarationKind::Method,
        _ => return None,
    };

    let span = Span::new(node.start_byte(), node.end_byte());
    let body = node
        .child_by_field_name("body")
        .map(|b| Span::new(b.start_byte(), b.end_byte()));
    let child_offsets = node
        .child_by_field_name("body")
        .map(|b| {
            let mut walk = b.walk();
            b.named_children(&mut walk)
                .map(|c| c.start_byte())
                .collect()
        })
        .unwrap_or_default();

    Some(Declaration {
        kind,
        span,
        body,
        child_offsets,
    })
}

fn field_text<'a>(node: &Node, field: &str, content: &'a str) -> Option<&'a str> {
    let child = node.child_by_field_name(field)?;
    content.get(child.start_byte()..child.end_byte())
}

//! Syntax scanning for method and constructor bodies
//!
//! Uses tree-sitter for multi-language AST parsing. The scanner itself does
//! not parse: it asks a `SyntaxProvider` for declaration nodes and turns the
//! ones that have bodies into `MethodRegion`s. The result is recomputed per
//! call; nothing is cached here.

pub mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FrictionError;
use crate::region::{trimmed_line_count, DeclarationKind, MethodRegion, Span};

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "py" | "pyi" => Language::Python,
            "go" => Language::Go,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Unknown)
    }
}

/// An immutable view of the buffer at one point in time. Cheap to clone so
/// it can move into the blocking parse task.
#[derive(Debug, Clone)]
pub struct BufferSnapshot {
    pub text: Arc<str>,
    pub language: Language,
}

impl BufferSnapshot {
    pub fn new(text: impl Into<Arc<str>>, language: Language) -> Self {
        BufferSnapshot {
            text: text.into(),
            language,
        }
    }
}

/// A declaration node reported by the provider. `body` is `None` for
/// bodiless members (signatures, abstract or expression-bodied forms).
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub span: Span,
    pub body: Option<Span>,
    /// Start offsets of the body's immediate children.
    pub child_offsets: Vec<usize>,
}

/// External source of declaration nodes. Acquiring the tree is the single
/// suspension point of an analysis pass.
#[async_trait]
pub trait SyntaxProvider: Send + Sync {
    async fn declarations(
        &self,
        snapshot: &BufferSnapshot,
    ) -> Result<Vec<Declaration>, FrictionError>;
}

/// Ask the provider for declarations and keep the ones with bodies, with the
/// body line count taken on the body text minus blank edges.
pub async fn scan(
    provider: &dyn SyntaxProvider,
    snapshot: &BufferSnapshot,
) -> Result<Vec<MethodRegion>, FrictionError> {
    let declarations = provider.declarations(snapshot).await?;

    let mut regions = Vec::with_capacity(declarations.len());
    for decl in declarations {
        let Some(body) = decl.body else {
            // A member without a body never yields an occurrence.
            continue;
        };
        let body_text = snapshot
            .text
            .get(body.start..body.end)
            .ok_or_else(|| FrictionError::analysis("provider returned an out-of-range body span"))?;
        regions.push(MethodRegion {
            kind: decl.kind,
            span: decl.span,
            body,
            line_count: trimmed_line_count(body_text),
            child_offsets: decl.child_offsets,
        });
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        declarations: Vec<Declaration>,
    }

    #[async_trait]
    impl SyntaxProvider for FakeProvider {
        async fn declarations(
            &self,
            _snapshot: &BufferSnapshot,
        ) -> Result<Vec<Declaration>, FrictionError> {
            Ok(self.declarations.clone())
        }
    }

    #[tokio::test]
    async fn test_bodiless_declarations_yield_no_region() {
        // Expression-bodied / abstract members have no body span at all
        let provider = FakeProvider {
            declarations: vec![Declaration {
                kind: DeclarationKind::Method,
                span: Span::new(0, 10),
                body: None,
                child_offsets: Vec::new(),
            }],
        };
        let snapshot = BufferSnapshot::new("fn a() -> u8", Language::Rust);
        let regions = scan(&provider, &snapshot).await.unwrap();
        assert!(regions.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_body_is_an_analysis_error() {
        let provider = FakeProvider {
            declarations: vec![Declaration {
                kind: DeclarationKind::Method,
                span: Span::new(0, 500),
                body: Some(Span::new(10, 500)),
                child_offsets: Vec::new(),
            }],
        };
        let snapshot = BufferSnapshot::new("short", Language::Rust);
        let err = scan(&provider, &snapshot).await.unwrap_err();
        assert!(matches!(err, FrictionError::Analysis(_)));
    }

    #[tokio::test]
    async fn test_line_count_ignores_blank_edges() {
        let text = "fn f() {\n\n    a();\n    b();\n\n}";
        let body_start = text.find('{').unwrap();
        let provider = FakeProvider {
            declarations: vec![Declaration {
                kind: DeclarationKind::Method,
                span: Span::new(0, text.len()),
                body: Some(Span::new(body_start, text.len())),
                child_offsets: Vec::new(),
            }],
        };
        let snapshot = BufferSnapshot::new(text, Language::Rust);
        let regions = scan(&provider, &snapshot).await.unwrap();
        assert_eq!(regions.len(), 1);
        // "{", blank, a();, b();, blank, "}" -> blanks are interior, edges kept
        assert_eq!(regions[0].line_count, 6);
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("TSX"), Language::TypeScript);
        assert_eq!(Language::from_extension("txt"), Language::Unknown);
    }
}

//! The asynchronous analysis pass
//!
//! Layout-changed events trigger one pass: scan the snapshot, resolve
//! tiers, publish the rebuilt occurrence set, repaint overlays. The only
//! await is the syntax tree acquisition inside `scan`. If the provider
//! fails, the pass is abandoned right here: the previous snapshot and the
//! existing overlays are left untouched and the system waits for the next
//! layout event. No retry, no backoff.
//!
//! Nothing enforces mutual exclusion between passes. Two overlapping
//! passes each publish a complete snapshot; the last one to complete wins.

use std::sync::Arc;

use crate::error::FrictionError;
use crate::occurrences::{OccurrenceCache, OccurrenceSet};
use crate::region::TierList;
use crate::syntax::{self, BufferSnapshot, SyntaxProvider};

/// Run one pass. `repaint` is called with the freshly published set and is
/// skipped entirely when the scan fails.
pub async fn run_analysis_pass<F>(
    provider: &dyn SyntaxProvider,
    snapshot: &BufferSnapshot,
    tiers: &TierList,
    cache: &OccurrenceCache,
    repaint: F,
) -> Result<usize, FrictionError>
where
    F: FnOnce(&OccurrenceSet),
{
    let regions = syntax::scan(provider, snapshot).await?;

    let set = Arc::new(OccurrenceSet::build(regions, tiers));
    cache.publish(Arc::clone(&set));
    repaint(&set);
    Ok(set.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{DeclarationKind, FrictionMode, LimitTier, Span};
    use crate::syntax::{Declaration, Language};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        result: Result<Vec<Declaration>, &'static str>,
    }

    #[async_trait]
    impl SyntaxProvider for ScriptedProvider {
        async fn declarations(
            &self,
            _snapshot: &BufferSnapshot,
        ) -> Result<Vec<Declaration>, FrictionError> {
            match &self.result {
                Ok(decls) => Ok(decls.clone()),
                Err(msg) => Err(FrictionError::analysis(*msg)),
            }
        }
    }

    fn tiers() -> TierList {
        TierList::new(vec![LimitTier {
            line_threshold: 2,
            color: [0, 0, 0],
            mode: FrictionMode::Silent,
        }])
    }

    fn snapshot() -> BufferSnapshot {
        BufferSnapshot::new("fn f() {\n    a();\n    b();\n}\n", Language::Rust)
    }

    fn method_declaration() -> Declaration {
        Declaration {
            kind: DeclarationKind::Method,
            span: Span::new(0, 28),
            body: Some(Span::new(7, 28)),
            child_offsets: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_successful_pass_publishes_and_repaints() {
        let provider = ScriptedProvider {
            result: Ok(vec![method_declaration()]),
        };
        let cache = OccurrenceCache::new();
        let repaints = AtomicUsize::new(0);

        let count = run_analysis_pass(&provider, &snapshot(), &tiers(), &cache, |set| {
            repaints.fetch_add(set.len(), Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(cache.load().len(), 1);
        assert_eq!(repaints.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_pass_leaves_cache_and_overlays_untouched() {
        // Publish a known-good snapshot first
        let cache = OccurrenceCache::new();
        let good = ScriptedProvider {
            result: Ok(vec![method_declaration()]),
        };
        run_analysis_pass(&good, &snapshot(), &tiers(), &cache, |_| {})
            .await
            .unwrap();

        let bad = ScriptedProvider {
            result: Err("provider exploded"),
        };
        let repaints = AtomicUsize::new(0);
        let err = run_analysis_pass(&bad, &snapshot(), &tiers(), &cache, |_| {
            repaints.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap_err();

        assert!(matches!(err, FrictionError::Analysis(_)));
        // Prior snapshot survives the abandoned pass
        assert_eq!(cache.load().len(), 1);
        assert_eq!(repaints.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_last_completed_pass_wins() {
        let cache = OccurrenceCache::new();
        let one = ScriptedProvider {
            result: Ok(vec![method_declaration()]),
        };
        let none = ScriptedProvider {
            result: Ok(Vec::new()),
        };

        run_analysis_pass(&one, &snapshot(), &tiers(), &cache, |_| {})
            .await
            .unwrap();
        run_analysis_pass(&none, &snapshot(), &tiers(), &cache, |_| {})
            .await
            .unwrap();

        assert!(cache.load().is_empty());
    }
}

//! Background task handling for the demo editor
//!
//! Channel sends use `let _ =`: if the receiver is dropped the app is
//! shutting down and nobody is listening for the result anyway.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use futures::FutureExt;

use crate::app::messages::BackgroundMessage;
use crate::app::view::EditorView;
use crate::occurrences::OccurrenceCache;
use crate::overlay::VisualAnnotator;
use crate::pass;
use crate::region::TierList;
use crate::syntax::{BufferSnapshot, SyntaxProvider};
use crate::ui::App;

/// Drain pass results into the app state.
pub fn drain_messages(app: &mut App, rx: &mpsc::Receiver<BackgroundMessage>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            BackgroundMessage::PassComplete { occurrences } => {
                app.occurrence_count = occurrences;
                app.last_pass_error = None;
            }
            BackgroundMessage::PassFailed(e) => {
                // Invisible to the user apart from the status line; prior
                // occurrences and overlays are untouched.
                app.last_pass_error = Some(e);
            }
            BackgroundMessage::Error(e) => {
                app.show_toast(&e);
            }
        }
    }
}

/// Spawn one analysis pass over the given snapshot. Layout-changed events
/// funnel here; nothing cancels an in-flight pass, so overlapping passes
/// race and the last completion wins.
pub fn spawn_analysis(
    tx: &mpsc::Sender<BackgroundMessage>,
    provider: Arc<dyn SyntaxProvider>,
    snapshot: BufferSnapshot,
    tiers: Arc<TierList>,
    cache: Arc<OccurrenceCache>,
    annotator: Arc<VisualAnnotator>,
    view: Arc<Mutex<EditorView>>,
) {
    let tx_pass = tx.clone();
    spawn_background(tx.clone(), "analysis_pass", async move {
        let text = snapshot.text.clone();
        let result = pass::run_analysis_pass(
            provider.as_ref(),
            &snapshot,
            &tiers,
            &cache,
            |set| {
                if let Ok(mut view) = view.lock() {
                    let EditorView { layout, overlays } = &mut *view;
                    layout.relayout(text);
                    annotator.repaint(set, layout, overlays);
                }
            },
        )
        .await;

        match result {
            Ok(occurrences) => {
                let _ = tx_pass.send(BackgroundMessage::PassComplete { occurrences });
            }
            Err(e) => {
                let _ = tx_pass.send(BackgroundMessage::PassFailed(e.to_string()));
            }
        }
    });
}

pub fn spawn_background<F>(tx: mpsc::Sender<BackgroundMessage>, task_name: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            let detail = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            let _ = tx.send(BackgroundMessage::Error(format!(
                "Background task '{}' crashed unexpectedly: {}",
                task_name, detail
            )));
        }
    });
}

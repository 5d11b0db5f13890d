//! Viewport geometry and overlay storage for the demo editor
//!
//! `ViewportLayout` is the demo's coordinate/geometry service: positions
//! scrolled out of view report as unavailable, which makes the annotator
//! skip those occurrences for the pass. `OverlayStore` holds the rendered
//! overlays between repaints.
//!
//! The background repaint closure locks the containing `EditorView`; the
//! UI thread updates scroll and size before every draw.

use std::sync::Arc;

use unicode_width::UnicodeWidthStr;

use crate::overlay::{Bounds, CoordinateService, OverlaySurface, OverlayVisual, Point};
use crate::region::Span;

pub struct EditorView {
    pub layout: ViewportLayout,
    pub overlays: OverlayStore,
}

impl EditorView {
    pub fn new() -> Self {
        EditorView {
            layout: ViewportLayout::new(),
            overlays: OverlayStore::default(),
        }
    }
}

impl Default for EditorView {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ViewportLayout {
    text: Arc<str>,
    line_starts: Vec<usize>,
    pub scroll_top: usize,
    pub scroll_left: usize,
    pub rows: usize,
    pub cols: usize,
}

impl ViewportLayout {
    pub fn new() -> Self {
        ViewportLayout {
            text: Arc::from(""),
            line_starts: vec![0],
            scroll_top: 0,
            scroll_left: 0,
            rows: 0,
            cols: 0,
        }
    }

    /// Re-anchor the layout on the snapshot an analysis pass just scanned.
    pub fn relayout(&mut self, text: Arc<str>) {
        self.line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                self.line_starts.push(i + 1);
            }
        }
        self.text = text;
    }

    pub fn set_viewport(&mut self, scroll_top: usize, scroll_left: usize, rows: usize, cols: usize) {
        self.scroll_top = scroll_top;
        self.scroll_left = scroll_left;
        self.rows = rows;
        self.cols = cols;
    }

    pub fn line_of(&self, position: usize) -> usize {
        match self.line_starts.binary_search(&position) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }

    fn line_range(&self, line: usize) -> (usize, usize) {
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .map(|s| s.saturating_sub(1))
            .unwrap_or(self.text.len());
        (start, end)
    }

    fn line_visible(&self, line: usize) -> bool {
        line >= self.scroll_top && line < self.scroll_top + self.rows
    }
}

impl Default for ViewportLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateService for ViewportLayout {
    fn screen_x_of(&self, position: usize) -> Option<Point> {
        if position > self.text.len() || !self.text.is_char_boundary(position) {
            return None;
        }
        let line = self.line_of(position);
        if !self.line_visible(line) {
            return None;
        }
        let (start, _) = self.line_range(line);
        let col = self.text[start..position].width();
        if col < self.scroll_left {
            // Scrolled out past the left edge
            return None;
        }
        // Document-space; the annotator applies the scroll offset.
        Some(Point {
            x: col as f64,
            y: line as f64,
        })
    }

    fn marker_geometry(&self, span: Span) -> Option<Bounds> {
        if span.start > self.text.len() {
            return None;
        }
        let first = self.line_of(span.start);
        // The span end is exclusive; a body ending right at a line start
        // must not drag the following row in.
        let last = self.line_of(span.end.min(self.text.len()).saturating_sub(1));

        let visible_first = first.max(self.scroll_top);
        let visible_last = last.min(self.scroll_top + self.rows.saturating_sub(1));
        if visible_first > visible_last {
            return None;
        }

        // Measured width: the widest visible line of the span
        let width = (visible_first..=visible_last)
            .map(|line| {
                let (start, end) = self.line_range(line);
                self.text[start..end].width()
            })
            .max()
            .unwrap_or(0);

        Some(Bounds {
            left: 0.0,
            top: (visible_first - self.scroll_top) as f64,
            width: width.saturating_sub(self.scroll_left).max(1) as f64,
            height: (visible_last - visible_first + 1) as f64,
        })
    }

    fn horizontal_scroll_offset(&self) -> f64 {
        self.scroll_left as f64
    }
}

#[derive(Default)]
pub struct OverlayStore {
    overlays: Vec<(Span, OverlayVisual)>,
}

impl OverlayStore {
    pub fn iter(&self) -> impl Iterator<Item = &(Span, OverlayVisual)> {
        self.overlays.iter()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl OverlaySurface for OverlayStore {
    fn remove_overlays_intersecting(&mut self, span: Span) {
        self.overlays.retain(|(s, _)| !s.intersects(span));
    }

    fn add_overlay(&mut self, span: Span, visual: OverlayVisual) {
        self.overlays.push((span, visual));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(text: &str, scroll_top: usize, rows: usize) -> ViewportLayout {
        let mut layout = ViewportLayout::new();
        layout.relayout(Arc::from(text));
        layout.set_viewport(scroll_top, 0, rows, 80);
        layout
    }

    #[test]
    fn test_screen_x_of_visible_position() {
        let layout = layout("alpha\nbeta\ngamma\n", 0, 10);
        let p = layout.screen_x_of(8).unwrap(); // "ta" in "beta"
        assert_eq!(p.x, 2.0);
        assert_eq!(p.y, 1.0);
    }

    #[test]
    fn test_scrolled_out_position_is_unavailable() {
        let layout = layout("alpha\nbeta\ngamma\n", 2, 10);
        assert!(layout.screen_x_of(0).is_none());
        assert!(layout.screen_x_of(12).is_some()); // gamma line
    }

    #[test]
    fn test_screen_x_stays_document_space_when_scrolled() {
        let mut layout = layout("alphabet\n", 0, 10);
        layout.set_viewport(0, 3, 10, 80);
        // Columns left of the scroll edge are unavailable; visible ones keep
        // their document column
        assert!(layout.screen_x_of(1).is_none());
        let p = layout.screen_x_of(5).unwrap();
        assert_eq!(p.x, 5.0);
    }

    #[test]
    fn test_span_ending_at_line_start_stays_on_prior_row() {
        let layout = layout("aa\nbb\ncc\n", 0, 10);
        // Covers "aa" and its newline; the end byte is line 1's start
        let bounds = layout.marker_geometry(Span::new(0, 3)).unwrap();
        assert_eq!(bounds.top, 0.0);
        assert_eq!(bounds.height, 1.0);
    }

    #[test]
    fn test_marker_geometry_clips_to_viewport() {
        let layout = layout("a\nbb\nccc\ndddd\neeeee\n", 1, 2);
        // Span covering all five lines; only rows 1..=2 are visible
        let bounds = layout.marker_geometry(Span::new(0, 19)).unwrap();
        assert_eq!(bounds.top, 0.0);
        assert_eq!(bounds.height, 2.0);
        // Widest visible line is "ccc"
        assert_eq!(bounds.width, 3.0);
    }

    #[test]
    fn test_fully_hidden_span_has_no_geometry() {
        let layout = layout("a\nbb\nccc\ndddd\neeeee\n", 4, 2);
        assert!(layout.marker_geometry(Span::new(0, 1)).is_none());
    }

    #[test]
    fn test_overlay_store_replaces_intersecting() {
        let mut store = OverlayStore::default();
        let visual = OverlayVisual {
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
            fill: [0, 0, 0],
        };
        store.add_overlay(Span::new(0, 10), visual.clone());
        store.remove_overlays_intersecting(Span::new(5, 15));
        store.add_overlay(Span::new(5, 15), visual);
        assert_eq!(store.len(), 1);
    }
}

//! Overlay painting for qualifying method bodies
//!
//! The annotator turns the current occurrence set into overlay rectangles.
//! Screen positions come from an external coordinate/geometry service; a
//! region that is scrolled out of view simply gets no overlay this pass.
//! Every repaint is a full repaint: overlays anchored to a span are removed
//! before the new one is added, so repainting is idempotent.

use serde::{Deserialize, Serialize};

use crate::occurrences::OccurrenceSet;
use crate::region::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Screen-coordinate lookups. `None` means the position or span is outside
/// the viewport; that is expected, not an error.
pub trait CoordinateService {
    /// Document-space column of a byte position. The annotator converts to
    /// viewport space by subtracting `horizontal_scroll_offset`.
    fn screen_x_of(&self, position: usize) -> Option<Point>;
    /// Viewport-space bounds of the rows a span covers.
    fn marker_geometry(&self, span: Span) -> Option<Bounds>;
    fn horizontal_scroll_offset(&self) -> f64;
}

pub trait OverlaySurface {
    fn remove_overlays_intersecting(&mut self, span: Span);
    fn add_overlay(&mut self, span: Span, visual: OverlayVisual);
}

/// How the rectangle's left edge is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStrategy {
    /// Anchor on the region's first character, falling back to its last.
    #[default]
    FirstCharacter,
    /// Minimum x over the region start and the body's immediate children,
    /// adjusted by the horizontal scroll offset. More robust against reflow.
    ChildMinimum,
}

/// Shared border styling for every overlay.
pub const OVERLAY_BORDER_RGB: [u8; 3] = [70, 70, 70];
pub const OVERLAY_BORDER_THICKNESS: f64 = 1.0;

/// One rendered overlay. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayVisual {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub fill: [u8; 3],
}

pub struct VisualAnnotator {
    strategy: AnchorStrategy,
}

impl VisualAnnotator {
    pub fn new(strategy: AnchorStrategy) -> Self {
        VisualAnnotator { strategy }
    }

    /// Repaint every occurrence. Occurrences whose geometry is unavailable
    /// are skipped silently for this pass.
    pub fn repaint(
        &self,
        occurrences: &OccurrenceSet,
        geometry: &dyn CoordinateService,
        surface: &mut dyn OverlaySurface,
    ) {
        for occurrence in occurrences.iter() {
            let span = occurrence.region.span;

            let Some(left) = self.left_edge(occurrence, geometry) else {
                continue;
            };
            let Some(bounds) = geometry.marker_geometry(span) else {
                continue;
            };

            let visual = OverlayVisual {
                left,
                top: bounds.top,
                width: bounds.width,
                height: bounds.height,
                fill: occurrence.tier.color,
            };

            surface.remove_overlays_intersecting(span);
            surface.add_overlay(span, visual);
        }
    }

    fn left_edge(
        &self,
        occurrence: &crate::occurrences::Occurrence,
        geometry: &dyn CoordinateService,
    ) -> Option<f64> {
        let span = occurrence.region.span;
        match self.strategy {
            AnchorStrategy::FirstCharacter => geometry
                .screen_x_of(span.start)
                .or_else(|| geometry.screen_x_of(span.end.saturating_sub(1)))
                .map(|p| p.x - geometry.horizontal_scroll_offset()),
            AnchorStrategy::ChildMinimum => {
                let candidates = std::iter::once(span.start)
                    .chain(occurrence.region.child_offsets.iter().copied());
                let min = candidates
                    .filter_map(|pos| geometry.screen_x_of(pos))
                    .map(|p| p.x)
                    .fold(None::<f64>, |acc, x| {
                        Some(match acc {
                            Some(a) => a.min(x),
                            None => x,
                        })
                    })?;
                Some(min - geometry.horizontal_scroll_offset())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrences::OccurrenceSet;
    use crate::region::{DeclarationKind, FrictionMode, LimitTier, MethodRegion, TierList};
    use std::collections::HashMap;

    struct FakeGeometry {
        /// Position -> x. Positions absent from the map are "out of view".
        xs: HashMap<usize, f64>,
        bounds: Option<Bounds>,
        scroll: f64,
    }

    impl CoordinateService for FakeGeometry {
        fn screen_x_of(&self, position: usize) -> Option<Point> {
            self.xs.get(&position).map(|&x| Point { x, y: 0.0 })
        }

        fn marker_geometry(&self, _span: Span) -> Option<Bounds> {
            self.bounds
        }

        fn horizontal_scroll_offset(&self) -> f64 {
            self.scroll
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        overlays: Vec<(Span, OverlayVisual)>,
    }

    impl OverlaySurface for FakeSurface {
        fn remove_overlays_intersecting(&mut self, span: Span) {
            self.overlays.retain(|(s, _)| !s.intersects(span));
        }

        fn add_overlay(&mut self, span: Span, visual: OverlayVisual) {
            self.overlays.push((span, visual));
        }
    }

    fn one_occurrence(child_offsets: Vec<usize>) -> OccurrenceSet {
        let tiers = TierList::new(vec![LimitTier {
            line_threshold: 5,
            color: [200, 40, 40],
            mode: FrictionMode::Silent,
        }]);
        let region = MethodRegion {
            kind: DeclarationKind::Method,
            span: Span::new(10, 90),
            body: Span::new(20, 90),
            line_count: 8,
            child_offsets,
        };
        OccurrenceSet::build(vec![region], &tiers)
    }

    fn bounds() -> Option<Bounds> {
        Some(Bounds {
            left: 0.0,
            top: 5.0,
            width: 42.0,
            height: 12.0,
        })
    }

    #[test]
    fn test_repaint_twice_does_not_duplicate() {
        let set = one_occurrence(Vec::new());
        let geometry = FakeGeometry {
            xs: HashMap::from([(10, 4.0)]),
            bounds: bounds(),
            scroll: 0.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::FirstCharacter);

        annotator.repaint(&set, &geometry, &mut surface);
        assert_eq!(surface.overlays.len(), 1);
        annotator.repaint(&set, &geometry, &mut surface);
        assert_eq!(surface.overlays.len(), 1);
    }

    #[test]
    fn test_first_character_falls_back_to_last() {
        let set = one_occurrence(Vec::new());
        // Start is scrolled out, last character (end - 1 = 89) is visible
        let geometry = FakeGeometry {
            xs: HashMap::from([(89, 7.5)]),
            bounds: bounds(),
            scroll: 0.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::FirstCharacter);

        annotator.repaint(&set, &geometry, &mut surface);
        assert_eq!(surface.overlays.len(), 1);
        assert_eq!(surface.overlays[0].1.left, 7.5);
    }

    #[test]
    fn test_first_character_left_is_scroll_adjusted() {
        let set = one_occurrence(Vec::new());
        // Document column 6 with the viewport scrolled right by 2
        let geometry = FakeGeometry {
            xs: HashMap::from([(10, 6.0)]),
            bounds: bounds(),
            scroll: 2.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::FirstCharacter);

        annotator.repaint(&set, &geometry, &mut surface);
        assert_eq!(surface.overlays.len(), 1);
        assert_eq!(surface.overlays[0].1.left, 4.0);
    }

    #[test]
    fn test_no_anchor_skips_the_occurrence() {
        let set = one_occurrence(Vec::new());
        let geometry = FakeGeometry {
            xs: HashMap::new(),
            bounds: bounds(),
            scroll: 0.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::FirstCharacter);

        annotator.repaint(&set, &geometry, &mut surface);
        assert!(surface.overlays.is_empty());
    }

    #[test]
    fn test_unavailable_geometry_skips_the_occurrence() {
        let set = one_occurrence(Vec::new());
        let geometry = FakeGeometry {
            xs: HashMap::from([(10, 4.0)]),
            bounds: None,
            scroll: 0.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::FirstCharacter);

        annotator.repaint(&set, &geometry, &mut surface);
        assert!(surface.overlays.is_empty());
    }

    #[test]
    fn test_child_minimum_takes_min_adjusted_by_scroll() {
        let set = one_occurrence(vec![30, 50]);
        let geometry = FakeGeometry {
            xs: HashMap::from([(10, 12.0), (30, 6.0), (50, 9.0)]),
            bounds: bounds(),
            scroll: 2.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::ChildMinimum);

        annotator.repaint(&set, &geometry, &mut surface);
        assert_eq!(surface.overlays.len(), 1);
        assert_eq!(surface.overlays[0].1.left, 4.0);
    }

    #[test]
    fn test_width_comes_from_measured_geometry() {
        let set = one_occurrence(Vec::new());
        let geometry = FakeGeometry {
            xs: HashMap::from([(10, 4.0)]),
            bounds: bounds(),
            scroll: 0.0,
        };
        let mut surface = FakeSurface::default();
        let annotator = VisualAnnotator::new(AnchorStrategy::FirstCharacter);

        annotator.repaint(&set, &geometry, &mut surface);
        assert_eq!(surface.overlays[0].1.width, 42.0);
        assert_eq!(surface.overlays[0].1.height, 12.0);
    }
}

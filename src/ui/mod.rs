//! Demo editor UI: application state and rendering
//!
//! The text area renders the buffer with tier overlays as background
//! tints; the status line shows the live cadence and the result of the
//! most recent analysis pass.

pub mod theme;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span as UiSpan};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::buffer::TextBuffer;
use crate::app::view::EditorView;
use crate::engine::{FrictionEngine, FrictionOutcome};
use crate::occurrences::OccurrenceCache;
use crate::overlay::{VisualAnnotator, OVERLAY_BORDER_RGB, OVERLAY_BORDER_THICKNESS};
use crate::region::TierList;
use crate::syntax::SyntaxProvider;
use theme::Theme;

const TOAST_LIFETIME: Duration = Duration::from_millis(2500);

pub struct App {
    pub buffer: TextBuffer,
    pub engine: FrictionEngine,
    pub provider: Arc<dyn SyntaxProvider>,
    pub tiers: Arc<TierList>,
    pub cache: Arc<OccurrenceCache>,
    pub annotator: Arc<VisualAnnotator>,
    pub view: Arc<Mutex<EditorView>>,
    pub occurrence_count: usize,
    pub last_pass_error: Option<String>,
    pub last_outcome: Option<FrictionOutcome>,
    /// Set when text or layout changed and a new pass should be scheduled.
    pub needs_analysis: bool,
    toast: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        buffer: TextBuffer,
        engine: FrictionEngine,
        provider: Arc<dyn SyntaxProvider>,
        tiers: Arc<TierList>,
        annotator: VisualAnnotator,
    ) -> Self {
        App {
            buffer,
            engine,
            provider,
            tiers,
            cache: Arc::new(OccurrenceCache::new()),
            annotator: Arc::new(annotator),
            view: Arc::new(Mutex::new(EditorView::new())),
            occurrence_count: 0,
            last_pass_error: None,
            last_outcome: None,
            needs_analysis: true,
            toast: None,
        }
    }

    pub fn show_toast(&mut self, message: &str) {
        self.toast = Some((message.to_string(), Instant::now()));
    }

    fn active_toast(&self) -> Option<&str> {
        match &self.toast {
            Some((msg, at)) if at.elapsed() < TOAST_LIFETIME => Some(msg),
            _ => None,
        }
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_title(frame, chunks[0], app);
    render_text(frame, chunks[1], app);
    render_status(frame, chunks[2], app);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let name = app
        .buffer
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "[scratch]".to_string());
    let dirty = if app.buffer.is_dirty() { " *" } else { "" };
    let title = format!(" molasses · {}{}  ({:?})", name, dirty, app.buffer.language());
    frame.render_widget(Line::styled(title, Theme::title()), area);
}

fn render_text(frame: &mut Frame, area: Rect, app: &mut App) {
    let rows = area.height as usize;
    let cols = area.width as usize;
    let (caret_line, _) = app.buffer.caret_line_col();

    // Keep the caret on screen; a scroll change is a layout change and
    // re-triggers analysis so overlays follow.
    let (scroll_top, scroll_left) = {
        let Ok(mut view) = app.view.lock() else {
            return;
        };
        let layout = &mut view.layout;
        if caret_line < layout.scroll_top {
            layout.scroll_top = caret_line;
            app.needs_analysis = true;
        } else if rows > 0 && caret_line >= layout.scroll_top + rows {
            layout.scroll_top = caret_line + 1 - rows;
            app.needs_analysis = true;
        }
        if layout.rows != rows || layout.cols != cols {
            app.needs_analysis = true;
        }
        layout.rows = rows;
        layout.cols = cols;
        (layout.scroll_top, layout.scroll_left)
    };

    let text = app.buffer.text().to_string();
    let line_starts = app.buffer.line_starts();
    let mut lines: Vec<Line> = Vec::with_capacity(rows);

    for row in 0..rows {
        let line_idx = scroll_top + row;
        if line_idx >= line_starts.len() {
            lines.push(Line::default());
            continue;
        }
        let start = line_starts[line_idx];
        let end = line_starts
            .get(line_idx + 1)
            .map(|s| s.saturating_sub(1))
            .unwrap_or(text.len());
        let visible: String = text[start..end].chars().skip(scroll_left).collect();

        let tint = overlay_tint(app, start, end);
        match tint {
            Some((fill, tint_from)) => {
                let split = visible
                    .char_indices()
                    .nth(tint_from)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let (plain, tinted) = visible.split_at(split);
                // The overlay's left edge gets the shared border accent.
                let edge = tinted
                    .char_indices()
                    .nth(OVERLAY_BORDER_THICKNESS as usize)
                    .map(|(i, _)| i)
                    .unwrap_or(tinted.len());
                let (accent, rest) = tinted.split_at(edge);
                let [br, bg_, bb] = OVERLAY_BORDER_RGB;
                lines.push(Line::from(vec![
                    UiSpan::styled(plain.to_string(), Theme::text()),
                    UiSpan::styled(
                        accent.to_string(),
                        Style::default()
                            .fg(Color::Rgb(br, bg_, bb))
                            .bg(Theme::tier_fill(fill)),
                    ),
                    UiSpan::styled(
                        rest.to_string(),
                        Style::default()
                            .fg(Theme::GREY_100)
                            .bg(Theme::tier_fill(fill)),
                    ),
                ]));
            }
            None => lines.push(Line::styled(visible, Theme::text())),
        }
    }

    frame.render_widget(Paragraph::new(lines), area);

    // Caret
    let (line, _) = app.buffer.caret_line_col();
    if line >= scroll_top && line < scroll_top + rows {
        let start = line_starts[line];
        let col = text[start..app.buffer.caret()].width();
        if col >= scroll_left {
            let x = area.x + (col - scroll_left).min(cols.saturating_sub(1)) as u16;
            let y = area.y + (line - scroll_top) as u16;
            frame.set_cursor_position((x, y));
        }
    }
}

/// Fill color and viewport tint-start column for a row whose byte range
/// intersects an overlay, if any.
fn overlay_tint(app: &App, row_start: usize, row_end: usize) -> Option<([u8; 3], usize)> {
    let view = app.view.lock().ok()?;
    let row_span = crate::region::Span::new(row_start, row_end);
    let tint = view
        .overlays
        .iter()
        .find(|(span, _)| span.intersects(row_span))
        .map(|(_, visual)| (visual.fill, visual.left.max(0.0) as usize));
    tint
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(toast) = app.active_toast() {
        Line::styled(format!(" {}", toast), Theme::warning())
    } else {
        let outcome = match &app.last_outcome {
            Some(FrictionOutcome::Injected { text, .. }) => format!("injected {:?}", text),
            Some(FrictionOutcome::CadenceReset) => "cadence reset".to_string(),
            Some(FrictionOutcome::Observed) => "watched".to_string(),
            Some(FrictionOutcome::Ignored) | None => "idle".to_string(),
        };
        let pass = match &app.last_pass_error {
            Some(_) => "analysis: stale",
            None => "analysis: ok",
        };
        Line::styled(
            format!(
                " {} region(s) over limit · cadence {} · {} · {} · ^S save  ^Q quit",
                app.occurrence_count,
                app.engine.consecutive_keystrokes(),
                outcome,
                pass,
            ),
            Theme::status(),
        )
    };
    frame.render_widget(line, area);
}

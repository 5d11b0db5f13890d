//! Demo editor runtime
//!
//! One loop owns both host event streams: crossterm key events are the
//! text-changed path (the engine runs synchronously on every committed
//! edit, against whatever occurrence snapshot is current), and resize /
//! scroll / text changes mark the layout dirty, which schedules an
//! asynchronous analysis pass. Edit-application failures abort the editor;
//! a partially applied friction edit is not something to recover from.

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::app::input::{self, InputOutcome};
use crate::app::{background, messages::BackgroundMessage};
use crate::engine::FrictionOutcome;
use crate::ui::{self, App};

pub async fn run_editor(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let result = event_loop(&mut terminal, &mut app, &tx, &rx).await;

    // Restore terminal before surfacing any error
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tx: &mpsc::Sender<BackgroundMessage>,
    rx: &mpsc::Receiver<BackgroundMessage>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.needs_analysis {
            app.needs_analysis = false;
            background::spawn_analysis(
                tx,
                app.provider.clone(),
                app.buffer.snapshot(),
                app.tiers.clone(),
                app.cache.clone(),
                app.annotator.clone(),
                app.view.clone(),
            );
        }

        background::drain_messages(app, rx);

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match input::handle_key(app, key) {
                    InputOutcome::Quit => return Ok(()),
                    InputOutcome::Edited => {
                        process_edits(app)?;
                        app.needs_analysis = true;
                    }
                    InputOutcome::Moved | InputOutcome::Continue => {}
                }
            }
            Event::Resize(_, _) => {
                app.needs_analysis = true;
            }
            _ => {}
        }
    }
}

/// Feed every committed edit through the engine, in commit order. The
/// engine's own insertions come back around this same loop tagged
/// synthetic and are ignored by it.
fn process_edits(app: &mut App) -> Result<()> {
    let occurrences = app.cache.load();
    while let Some(edit) = app.buffer.take_edit() {
        let outcome = app
            .engine
            .handle_edit(&edit, &occurrences, &mut app.buffer)
            .context("applying friction edit")?;
        if outcome != FrictionOutcome::Ignored {
            app.last_outcome = Some(outcome);
        }
    }
    Ok(())
}

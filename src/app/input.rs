//! Key handling for the demo editor

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ui::App;

pub enum InputOutcome {
    Continue,
    /// The buffer changed; committed edits are waiting for the engine.
    Edited,
    /// The caret moved without a text change.
    Moved,
    Quit,
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> InputOutcome {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('q') if ctrl => InputOutcome::Quit,
        KeyCode::Char('s') if ctrl => {
            match app.buffer.save() {
                Ok(()) => app.show_toast("saved"),
                Err(e) => app.show_toast(&format!("save failed: {}", e)),
            }
            InputOutcome::Continue
        }
        KeyCode::Char(c) if !ctrl => {
            app.buffer.insert_char(c);
            InputOutcome::Edited
        }
        KeyCode::Enter => {
            app.buffer.insert_newline();
            InputOutcome::Edited
        }
        KeyCode::Backspace => {
            app.buffer.delete_backward();
            InputOutcome::Edited
        }
        KeyCode::Left => {
            app.buffer.move_caret_left();
            InputOutcome::Moved
        }
        KeyCode::Right => {
            app.buffer.move_caret_right();
            InputOutcome::Moved
        }
        KeyCode::Up => {
            app.buffer.move_caret_vertical(false);
            InputOutcome::Moved
        }
        KeyCode::Down => {
            app.buffer.move_caret_vertical(true);
            InputOutcome::Moved
        }
        _ => InputOutcome::Continue,
    }
}

//! Demo text buffer: edit stream source and edit sink
//!
//! Every mutation - user keystroke or synthetic friction insertion - is
//! recorded as a `BufferEdit` in commit order and drained by the runtime,
//! which feeds each one through the engine. Synthetic insertions therefore
//! travel the same stream as typing and are filtered purely by their
//! origin tag.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::engine::{BufferEdit, EditOrigin, EditSession, EditSink};
use crate::error::FrictionError;
use crate::syntax::{BufferSnapshot, Language};

pub struct TextBuffer {
    text: String,
    caret: usize,
    path: Option<PathBuf>,
    language: Language,
    dirty: bool,
    /// The exclusive edit-access gate. Held only for the scope of one
    /// synthetic edit session.
    gate_held: bool,
    committed: VecDeque<BufferEdit>,
}

impl TextBuffer {
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(TextBuffer {
            language: Language::from_path(path),
            text,
            caret: 0,
            path: Some(path.to_path_buf()),
            dirty: false,
            gate_held: false,
            committed: VecDeque::new(),
        })
    }

    pub fn from_text(text: impl Into<String>, language: Language) -> Self {
        TextBuffer {
            text: text.into(),
            caret: 0,
            path: None,
            language,
            dirty: false,
            gate_held: false,
            committed: VecDeque::new(),
        }
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot::new(self.text.as_str(), self.language)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .context("buffer has no backing file")?;
        fs::write(&path, &self.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }

    /// Next committed edit, in commit order.
    pub fn take_edit(&mut self) -> Option<BufferEdit> {
        self.committed.pop_front()
    }

    pub fn insert_char(&mut self, c: char) {
        let start = self.caret;
        self.text.insert(start, c);
        self.caret = start + c.len_utf8();
        self.dirty = true;
        self.committed
            .push_back(BufferEdit::user(start, c.to_string()));
    }

    pub fn insert_newline(&mut self) {
        let start = self.caret;
        self.text.insert(start, '\n');
        self.caret = start + 1;
        self.dirty = true;
        self.committed.push_back(BufferEdit::user(start, "\n"));
    }

    pub fn delete_backward(&mut self) {
        if self.caret == 0 {
            return;
        }
        let mut start = self.caret - 1;
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        self.text.replace_range(start..self.caret, "");
        self.caret = start;
        self.dirty = true;
        // Deletions carry no inserted text; the engine ignores them.
        self.committed.push_back(BufferEdit::user(start, ""));
    }

    /// Byte offsets where each line starts.
    pub fn line_starts(&self) -> Vec<usize> {
        line_starts_of(&self.text)
    }

    pub fn caret_line_col(&self) -> (usize, usize) {
        let starts = self.line_starts();
        let line = match starts.binary_search(&self.caret) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = self.text[starts[line]..self.caret].chars().count();
        (line, col)
    }

    pub fn move_caret_left(&mut self) {
        if self.caret == 0 {
            return;
        }
        let mut pos = self.caret - 1;
        while !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        self.caret = pos;
    }

    pub fn move_caret_right(&mut self) {
        if self.caret >= self.text.len() {
            return;
        }
        let mut pos = self.caret + 1;
        while pos < self.text.len() && !self.text.is_char_boundary(pos) {
            pos += 1;
        }
        self.caret = pos;
    }

    pub fn move_caret_vertical(&mut self, down: bool) {
        let starts = self.line_starts();
        let (line, col) = self.caret_line_col();
        let target = if down {
            if line + 1 >= starts.len() {
                return;
            }
            line + 1
        } else {
            if line == 0 {
                return;
            }
            line - 1
        };

        let line_start = starts[target];
        let line_end = starts
            .get(target + 1)
            .map(|s| s - 1)
            .unwrap_or(self.text.len());
        let line_text = &self.text[line_start..line_end];
        let byte_col: usize = line_text
            .chars()
            .take(col)
            .map(|c| c.len_utf8())
            .sum();
        self.caret = line_start + byte_col;
    }
}

fn line_starts_of(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

struct BufferSession<'a> {
    buffer: &'a mut TextBuffer,
    origin: EditOrigin,
    staged: Vec<(usize, String)>,
}

impl EditSession for BufferSession<'_> {
    fn insert(&mut self, position: usize, text: &str) -> bool {
        if position > self.buffer.text.len() || !self.buffer.text.is_char_boundary(position) {
            return false;
        }
        self.staged.push((position, text.to_string()));
        true
    }

    fn apply(mut self: Box<Self>) -> Result<(), FrictionError> {
        for (position, text) in std::mem::take(&mut self.staged) {
            self.buffer.text.insert_str(position, &text);
            // An insertion landing exactly at the caret goes after it, so
            // the user's next keystroke stays where they expect.
            if position < self.buffer.caret {
                self.buffer.caret += text.len();
            }
            self.buffer.dirty = true;
            self.buffer.committed.push_back(BufferEdit {
                origin: self.origin,
                start: position,
                inserted: text,
            });
        }
        Ok(())
    }
}

impl Drop for BufferSession<'_> {
    fn drop(&mut self) {
        // Released on every exit path, applied or not.
        self.buffer.gate_held = false;
    }
}

impl EditSink for TextBuffer {
    fn begin_edit(
        &mut self,
        origin: EditOrigin,
    ) -> Result<Box<dyn EditSession + '_>, FrictionError> {
        if self.gate_held {
            return Err(FrictionError::edit("exclusive edit access already held"));
        }
        self.gate_held = true;
        Ok(Box::new(BufferSession {
            buffer: self,
            origin,
            staged: Vec::new(),
        }))
    }
}

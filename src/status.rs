//! Single-line terminal status reporting.
//!
//! Progress is rendered as one overwritable line: each update returns
//! the cursor to column zero, clears the line, and writes the new
//! message. Display failures are ignored; cosmetics never fail a run.

use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::cursor::{Hide, Show};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;

/// Overwritable one-line progress display.
pub struct StatusLine<W: Write> {
    out: Mutex<W>,
}

impl StatusLine<io::Stdout> {
    /// Creates a status line writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StatusLine<W> {
    /// Creates a status line over an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn with_out(&self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = f(&mut out);
        let _ = out.flush();
    }

    /// Overwrites the current line with `message`, without a newline.
    pub fn set(&self, message: &str) {
        self.with_out(|out| {
            out.queue(Print("\r"))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(message))?;
            Ok(())
        });
    }

    /// Overwrites the current line with `message` and ends it.
    pub fn finish(&self, message: &str) {
        self.with_out(|out| {
            out.queue(Print("\r"))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(message))?;
            out.queue(Print("\n"))?;
            Ok(())
        });
    }

    /// Clears the current line.
    pub fn clear(&self) {
        self.with_out(|out| {
            out.queue(Print("\r"))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            Ok(())
        });
    }

    /// Hides the terminal cursor.
    pub fn hide_cursor(&self) {
        self.with_out(|out| {
            out.queue(Hide)?;
            Ok(())
        });
    }

    /// Shows the terminal cursor.
    pub fn show_cursor(&self) {
        self.with_out(|out| {
            out.queue(Show)?;
            Ok(())
        });
    }

    /// Hides the cursor for the lifetime of the returned guard.
    pub fn cursor_hidden(&self) -> CursorGuard<'_, W> {
        self.hide_cursor();
        CursorGuard { status: self }
    }
}

/// Restores cursor visibility when dropped, on every exit path.
pub struct CursorGuard<'a, W: Write> {
    status: &'a StatusLine<W>,
}

impl<W: Write> Drop for CursorGuard<'_, W> {
    fn drop(&mut self) {
        self.status.show_cursor();
    }
}

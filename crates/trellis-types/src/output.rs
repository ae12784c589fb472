//! Output-sink capability.
//!
//! All text produced during command execution goes through an [`Output`]
//! implementation. The sink carries two pieces of state: a lock so a caller
//! can group several writes into one atomically-rendered unit, and an
//! indentation counter manipulated through scoped guards.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::fmt::Write as _;

/// Indent level a fresh sink starts at.
pub const DEFAULT_INDENT: u32 = 2;

/// A text sink for command output.
///
/// `print`/`println` take a pre-formatted [`fmt::Arguments`]; call sites use
/// `format_args!`. The `indent` flag prefixes the write with the current
/// indentation.
pub trait Output {
    /// Acquire the sink for a group of writes. May be called reentrantly.
    fn lock(&self);
    /// Release one level of the lock.
    fn unlock(&self);

    /// Write without a trailing newline.
    fn print(&self, indent: bool, args: fmt::Arguments<'_>);
    /// Write a full line.
    fn println(&self, indent: bool, args: fmt::Arguments<'_>);

    /// Emit the current indentation.
    fn indent(&self);
    /// Emit an end of line.
    fn eol(&self);

    fn indent_level(&self) -> u32;
    fn set_indent_level(&self, level: u32);
}

/// RAII lock over a sink: locks on construction, unlocks on drop.
pub struct OutputGuard<'a> {
    out: &'a dyn Output,
}

impl<'a> OutputGuard<'a> {
    pub fn new(out: &'a dyn Output) -> Self {
        out.lock();
        Self { out }
    }
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        self.out.unlock();
    }
}

/// Scoped indentation: bumps the sink's indent level on construction and
/// restores the prior level on drop, on every exit path.
pub struct IndentGuard<'a> {
    out: &'a dyn Output,
    restore: u32,
}

impl<'a> IndentGuard<'a> {
    pub fn new(out: &'a dyn Output, push: u32) -> Self {
        let restore = out.indent_level();
        out.set_indent_level(restore + push);
        Self { out, restore }
    }

    /// Push further without opening another scope.
    pub fn add(&self, push: u32) {
        self.out.set_indent_level(self.out.indent_level() + push);
    }
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.out.set_indent_level(self.restore);
    }
}

/// In-memory sink. Used by tests and by hosts that render captured text
/// themselves.
pub struct BufferOutput {
    buf: RefCell<String>,
    level: Cell<u32>,
    locked: Cell<u32>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self {
            buf: RefCell::new(String::new()),
            level: Cell::new(DEFAULT_INDENT),
            locked: Cell::new(0),
        }
    }

    /// Everything written so far.
    pub fn text(&self) -> String {
        self.buf.borrow().clone()
    }

    /// Captured text as owned lines.
    pub fn lines(&self) -> Vec<String> {
        self.buf.borrow().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    /// Current lock depth (0 = unlocked).
    pub fn lock_depth(&self) -> u32 {
        self.locked.get()
    }
}

impl Default for BufferOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for BufferOutput {
    fn lock(&self) {
        self.locked.set(self.locked.get() + 1);
    }

    fn unlock(&self) {
        self.locked.set(self.locked.get().saturating_sub(1));
    }

    fn print(&self, indent: bool, args: fmt::Arguments<'_>) {
        if indent {
            self.indent();
        }
        let _ = self.buf.borrow_mut().write_fmt(args);
    }

    fn println(&self, indent: bool, args: fmt::Arguments<'_>) {
        self.print(indent, args);
        self.eol();
    }

    fn indent(&self) {
        let mut buf = self.buf.borrow_mut();
        for _ in 0..self.level.get() {
            buf.push(' ');
        }
    }

    fn eol(&self) {
        self.buf.borrow_mut().push('\n');
    }

    fn indent_level(&self) -> u32 {
        self.level.get()
    }

    fn set_indent_level(&self, level: u32) {
        self.level.set(level);
    }
}

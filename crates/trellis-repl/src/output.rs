//! Stdout-backed output sink.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, StdoutLock, Write};

use trellis_types::output::{DEFAULT_INDENT, Output};

/// [`Output`] implementation that writes to stdout.
///
/// `lock` takes the process-wide stdout lock and holds it until the
/// matching `unlock`, so a group of writes renders as one unit even when
/// other threads print. Lock calls nest via a depth counter.
pub struct StdioOutput {
    held: RefCell<Option<StdoutLock<'static>>>,
    depth: Cell<u32>,
    level: Cell<u32>,
}

impl StdioOutput {
    pub fn new() -> Self {
        Self {
            held: RefCell::new(None),
            depth: Cell::new(0),
            level: Cell::new(DEFAULT_INDENT),
        }
    }

    fn write(&self, indent: bool, args: fmt::Arguments<'_>, newline: bool) {
        let pad = if indent { self.level.get() as usize } else { 0 };
        let mut held = self.held.borrow_mut();
        match held.as_mut() {
            Some(lock) => emit(lock, pad, args, newline),
            None => emit(&mut io::stdout().lock(), pad, args, newline),
        }
    }
}

fn emit(w: &mut StdoutLock<'_>, pad: usize, args: fmt::Arguments<'_>, newline: bool) {
    let _ = write!(w, "{:width$}", "", width = pad);
    let _ = w.write_fmt(args);
    if newline {
        let _ = w.write_all(b"\n");
        let _ = w.flush();
    }
}

impl Default for StdioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for StdioOutput {
    fn lock(&self) {
        if self.depth.get() == 0 {
            *self.held.borrow_mut() = Some(io::stdout().lock());
        }
        self.depth.set(self.depth.get() + 1);
    }

    fn unlock(&self) {
        let depth = self.depth.get();
        if depth <= 1 {
            if let Some(mut lock) = self.held.borrow_mut().take() {
                let _ = lock.flush();
            }
            self.depth.set(0);
        } else {
            self.depth.set(depth - 1);
        }
    }

    fn print(&self, indent: bool, args: fmt::Arguments<'_>) {
        self.write(indent, args, false);
    }

    fn println(&self, indent: bool, args: fmt::Arguments<'_>) {
        self.write(indent, args, true);
    }

    fn indent(&self) {
        self.write(true, format_args!(""), false);
    }

    fn eol(&self) {
        self.write(false, format_args!(""), true);
    }

    fn indent_level(&self) -> u32 {
        self.level.get()
    }

    fn set_indent_level(&self, level: u32) {
        self.level.set(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_depth_nests() {
        let out = StdioOutput::new();
        out.lock();
        out.lock();
        assert_eq!(out.depth.get(), 2);
        out.unlock();
        assert_eq!(out.depth.get(), 1);
        out.unlock();
        assert_eq!(out.depth.get(), 0);
        assert!(out.held.borrow().is_none());
    }

    #[test]
    fn indent_level_round_trips() {
        let out = StdioOutput::new();
        assert_eq!(out.indent_level(), DEFAULT_INDENT);
        out.set_indent_level(6);
        assert_eq!(out.indent_level(), 6);
    }
}

//! Foundation types for trellis.
//!
//! This crate contains the pieces shared by the interpreter core and its
//! front-ends: the error type and the output-sink capability that all
//! command text is written through.

pub mod error;
pub mod output;

pub use error::{Result, TrellisError};
pub use output::{BufferOutput, IndentGuard, Output, OutputGuard};

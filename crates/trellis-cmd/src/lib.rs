//! Hierarchical command interpreter core.
//!
//! The interpreter resolves a line of free-form user text to a handler in a
//! tree of named commands. Commands implement the [`Command`] trait and are
//! registered on a [`Dispatcher`], which tokenizes each statement, resolves
//! it by prefix through the tree (with ambiguity detection and "did you
//! mean" suggestions), and dispatches `on_execute` or `on_usage`.

pub mod command;
pub mod dispatch;
pub mod locale;
pub mod strmatch;
pub mod token;
pub mod tree;

/// The capability implemented by concrete commands.
pub use command::Command;
/// Top-level orchestrator: statement split, history, aliases, resolution.
pub use dispatch::Dispatcher;
/// A single word of a statement with typed access.
pub use token::Token;
/// The structured views over a tokenized statement.
pub use token::TokenStream;
/// Turn a raw statement into a [`TokenStream`].
pub use token::tokenize;
/// Stable handle to a node in the command tree.
pub use tree::NodeId;
/// Read-only view of a resolved node, passed to handlers.
pub use tree::NodeRef;

//! The command capability.

use trellis_types::output::Output;

use crate::token::TokenStream;
use crate::tree::NodeRef;

/// A single executable command in the tree.
///
/// `U` is the opaque user-data baton attached to each node at registration.
/// Both methods default to the tree's generic behaviors: listing children
/// and offering fuzzy suggestions on execute, printing the command path and
/// usage text on usage. A node registered without a handler gets the same
/// defaults, so only leaves with real work need an implementation.
pub trait Command<U> {
    /// Execute with the tokens remaining after resolution.
    ///
    /// Returns `false` to signal dispatch failure; any diagnostic must
    /// already have been written to `out`.
    fn on_execute(&self, node: NodeRef<'_, U>, tokens: &mut TokenStream, out: &dyn Output) -> bool {
        node.default_execute(tokens, out)
    }

    /// Print usage text. Triggered by a trailing `?` token.
    fn on_usage(&self, node: NodeRef<'_, U>, out: &dyn Output) -> bool {
        node.default_usage(out)
    }
}

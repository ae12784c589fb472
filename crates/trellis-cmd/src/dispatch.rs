//! Top-level dispatcher.
//!
//! Owns the command tree plus the mutable interpreter state: alias table,
//! identifier table, and input history. Execution takes `&self`; the state
//! that commands may change while running (aliases, identifiers, history)
//! lives behind `RefCell` so a handler can reach back into its dispatcher.
//!
//! Resolution is a depth-first descent through the tree, one token consumed
//! per level, terminating on exact or unique match exhaustion, on
//! ambiguity, or on token exhaustion, whichever comes first. There is no
//! backtracking.

use std::cell::RefCell;
use std::collections::HashMap;

use trellis_types::error::{Result, TrellisError};
use trellis_types::output::{IndentGuard, Output};

use crate::command::Command;
use crate::locale;
use crate::strmatch;
use crate::token::{TokenStream, tokenize};
use crate::tree::{CommandTree, NodeId, NodeRef};

/// Statements within one expression are separated by this.
pub const STATEMENT_DELIMITER: char = ';';

/// Top-level orchestrator: statement split, history, alias resolution, tree
/// walk, and handler invocation.
pub struct Dispatcher<U> {
    tree: CommandTree<U>,
    aliases: RefCell<HashMap<String, NodeId>>,
    idents: RefCell<HashMap<String, u64>>,
    history: RefCell<Vec<String>>,
    user: U,
}

impl<U> Dispatcher<U> {
    /// Create a dispatcher with an empty tree. `user` is the default baton
    /// handed to root commands registered without an explicit one.
    pub fn new(user: U) -> Self {
        Self {
            tree: CommandTree::new(),
            aliases: RefCell::new(HashMap::new()),
            idents: RefCell::new(HashMap::new()),
            history: RefCell::new(Vec::new()),
            user,
        }
    }

    pub(crate) fn tree(&self) -> &CommandTree<U> {
        &self.tree
    }

    /// View a live node.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, U>> {
        self.tree.contains(id).then_some(NodeRef {
            dispatcher: self,
            id,
        })
    }

    /// Exact-name lookup among the children of `parent` (the root list when
    /// `None`).
    pub fn find(&self, parent: Option<NodeId>, name: &str) -> Option<NodeId> {
        self.tree
            .children_of(parent)
            .iter()
            .copied()
            .find(|&child| self.tree.name_of(child) == name)
    }

    pub fn set_usage(&mut self, id: NodeId, usage: &str) -> Result<()> {
        self.tree.set_usage(id, usage)
    }

    pub fn set_description(&mut self, id: NodeId, desc: &str) -> Result<()> {
        self.tree.set_description(id, desc)
    }

    /// Remove a node and its subtree. Every alias targeting a removed node
    /// is dropped with it. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> usize {
        let removed = self.tree.remove(id);
        if !removed.is_empty() {
            self.aliases
                .borrow_mut()
                .retain(|_, target| !removed.contains(target));
            log::debug!("removed {} node(s)", removed.len());
        }
        removed.len()
    }

    // -- Alias table --

    /// Bind `name` directly to a node, bypassing tree traversal on lookup.
    pub fn alias_add(&self, id: NodeId, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(TrellisError::Alias("empty alias name".into()));
        }
        if !self.tree.contains(id) {
            return Err(TrellisError::Alias(format!(
                "alias '{name}' targets a removed node"
            )));
        }
        self.aliases.borrow_mut().insert(name.to_string(), id);
        Ok(())
    }

    pub fn alias_remove(&self, name: &str) -> bool {
        self.aliases.borrow_mut().remove(name).is_some()
    }

    /// Remove every alias pointing at `id`. Returns how many were dropped.
    pub fn alias_remove_target(&self, id: NodeId) -> usize {
        let mut aliases = self.aliases.borrow_mut();
        let before = aliases.len();
        aliases.retain(|_, target| *target != id);
        before - aliases.len()
    }

    /// Look up an alias by name, validating that its target is still live.
    pub fn alias_find(&self, name: &str) -> Option<NodeId> {
        let mut aliases = self.aliases.borrow_mut();
        match aliases.get(name).copied() {
            Some(id) if self.tree.contains(id) => Some(id),
            Some(_) => {
                // teardown purges aliases eagerly, so a stale entry here
                // means a handle was removed behind our back
                log::warn!("dropping stale alias '{name}'");
                aliases.remove(name);
                None
            },
            None => None,
        }
    }

    /// All aliases, sorted by name.
    pub fn aliases(&self) -> Vec<(String, NodeId)> {
        let mut entries: Vec<(String, NodeId)> = self
            .aliases
            .borrow()
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    // -- Identifier table --

    pub fn ident_set(&self, name: &str, value: u64) {
        self.idents.borrow_mut().insert(name.to_string(), value);
    }

    pub fn ident_get(&self, name: &str) -> Option<u64> {
        self.idents.borrow().get(name).copied()
    }

    pub fn idents(&self) -> HashMap<String, u64> {
        self.idents.borrow().clone()
    }

    // -- History --

    /// Every statement submitted for execution, including failed ones.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// The most recent non-blank statement.
    pub fn last_cmd(&self) -> Option<String> {
        self.history
            .borrow()
            .iter()
            .rev()
            .find(|s| !s.trim().is_empty())
            .cloned()
    }

    // -- Execution --

    /// Execute a whole expression: statements split on `;`, executed in
    /// order, aborting at the first failure.
    pub fn execute(&self, expr: &str, out: &dyn Output) -> bool {
        if expr.trim().is_empty() {
            // a wholly blank expression still reaches repeat-last
            return self.execute_one(expr.trim(), out);
        }
        for statement in expr.split(STATEMENT_DELIMITER) {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            if !self.execute_one(statement, out) {
                locale::command_failed(out, statement);
                return false;
            }
        }
        true
    }

    /// Execute a single statement.
    pub fn execute_one(&self, statement: &str, out: &dyn Output) -> bool {
        let previous = self.last_cmd();
        self.history.borrow_mut().push(statement.to_string());
        log::debug!("execute {statement:?}");
        let mut tokens = {
            let idents = self.idents.borrow();
            tokenize(statement, &idents)
        };
        if tokens.is_empty() {
            // only truly blank input repeats the last command; a non-blank
            // statement that tokenizes to nothing (flag-only input) fails
            // outright, so the repeat can recurse at most one level
            if !statement.trim().is_empty() {
                return false;
            }
            return match previous {
                Some(previous) => {
                    locale::last_command(out, &previous);
                    self.execute_one(&previous, out)
                },
                None => false,
            };
        }
        let Some(id) = self.resolve(&mut tokens, out) else {
            locale::invalid_command(out);
            return false;
        };
        let node = NodeRef {
            dispatcher: self,
            id,
        };
        // a trailing bare `?` requests usage text instead of execution
        let wants_usage = tokens.raw().back().is_some_and(|t| t.as_str() == "?");
        if wants_usage {
            match self.tree.handler_of(id) {
                Some(handler) => handler.on_usage(node, out),
                None => node.default_usage(out),
            }
        } else {
            match self.tree.handler_of(id) {
                Some(handler) => handler.on_execute(node, &mut tokens, out),
                None => node.default_execute(&mut tokens, out),
            }
        }
    }

    /// Walk the tree (or the alias table) to a target node, consuming the
    /// tokens that selected it. `None` means no target: either nothing
    /// matched at all, or an ambiguity was reported.
    fn resolve(&self, tokens: &mut TokenStream, out: &dyn Output) -> Option<NodeId> {
        let alias_target = tokens
            .front()
            .and_then(|front| self.alias_find(front.as_str()));
        if let Some(id) = alias_target {
            // aliases are looked up verbatim and skip the walk entirely
            tokens.pop();
            return Some(id);
        }
        let mut target = None;
        let mut level: Option<NodeId> = None;
        while let Some(front) = tokens.front().map(|t| t.as_str().to_string()) {
            let matches = self.find_matches(level, &front);
            match matches.len() {
                0 => break,
                1 => {
                    target = Some(matches[0]);
                    level = target;
                    tokens.pop();
                },
                _ => {
                    locale::possible_completions(out);
                    let _indent = IndentGuard::new(out, 2);
                    for id in matches {
                        out.println(true, format_args!("{}", self.tree.name_of(id)));
                    }
                    return None;
                },
            }
        }
        target
    }

    /// All children of `parent` tied at the best prefix score for `word`.
    fn find_matches(&self, parent: Option<NodeId>, word: &str) -> Vec<NodeId> {
        let mut best = 0;
        let mut matches = Vec::new();
        for &child in self.tree.children_of(parent) {
            let score = strmatch::prefix_score(self.tree.name_of(child), word);
            if score > best {
                best = score;
                matches.clear();
                matches.push(child);
            } else if score == best && score > 0 {
                matches.push(child);
            }
        }
        matches
    }
}

impl<U: Clone> Dispatcher<U> {
    /// Register a command under `parent` (the root list when `None`),
    /// inheriting the parent's baton, or the dispatcher default at root.
    pub fn add_command<C>(&mut self, parent: Option<NodeId>, name: &str, handler: C) -> Result<NodeId>
    where
        C: Command<U> + 'static,
    {
        let user = self.inherited_user(parent);
        self.tree.insert(parent, name, Some(Box::new(handler)), user)
    }

    /// Register a command with an explicit baton.
    pub fn add_command_with<C>(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        handler: C,
        user: U,
    ) -> Result<NodeId>
    where
        C: Command<U> + 'static,
    {
        self.tree.insert(parent, name, Some(Box::new(handler)), user)
    }

    /// Register a grouping node with no handler of its own; it lists its
    /// children on execute and fails if left childless.
    pub fn add_group(&mut self, parent: Option<NodeId>, name: &str) -> Result<NodeId> {
        let user = self.inherited_user(parent);
        self.tree.insert(parent, name, None, user)
    }

    fn inherited_user(&self, parent: Option<NodeId>) -> U {
        parent
            .and_then(|p| self.tree.user_of(p))
            .unwrap_or(&self.user)
            .clone()
    }
}

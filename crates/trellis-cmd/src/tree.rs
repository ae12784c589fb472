//! Command tree arena.
//!
//! Nodes live in an arena addressed by stable [`NodeId`] handles: each node
//! stores its parent's handle (non-owning) and an ordered list of owned
//! child handles, which avoids back-reference ownership cycles. Removed
//! slots stay empty so a stale handle is detectable rather than dangling.
//!
//! The baton type `U` is opaque user data handed to each node at
//! registration and exposed to its handler; handlers needing shared mutable
//! state typically use `Rc<RefCell<_>>` here.

use trellis_types::error::{Result, TrellisError};
use trellis_types::output::{IndentGuard, Output};

use crate::command::Command;
use crate::dispatch::Dispatcher;
use crate::locale;
use crate::strmatch;
use crate::token::TokenStream;

/// Stable handle to a node in a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

pub(crate) struct Node<U> {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handler: Option<Box<dyn Command<U>>>,
    usage: Option<String>,
    desc: Option<String>,
    user: U,
}

/// Hierarchical registry of command nodes.
pub struct CommandTree<U> {
    slots: Vec<Option<Node<U>>>,
    roots: Vec<NodeId>,
}

impl<U> CommandTree<U> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.0).is_some_and(Option::is_some)
    }

    fn node(&self, id: NodeId) -> Option<&Node<U>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<U>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Attach a node under `parent` (the root list when `None`).
    ///
    /// Fails on an empty name, a stale parent handle, or a sibling with the
    /// same name.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        handler: Option<Box<dyn Command<U>>>,
        user: U,
    ) -> Result<NodeId> {
        if name.is_empty() {
            return Err(TrellisError::Registration("empty command name".into()));
        }
        if let Some(parent) = parent
            && !self.contains(parent)
        {
            return Err(TrellisError::Registration(format!(
                "parent of '{name}' is not in the tree"
            )));
        }
        if self
            .children_of(parent)
            .iter()
            .any(|&child| self.name_of(child) == name)
        {
            return Err(TrellisError::Registration(format!(
                "duplicate command name '{name}'"
            )));
        }
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Node {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            handler,
            usage: None,
            desc: None,
            user,
        }));
        match parent {
            Some(parent) => {
                if let Some(node) = self.node_mut(parent) {
                    node.children.push(id);
                }
            },
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Ordered children of `parent`, or the root list when `None`.
    pub fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(parent) => match self.node(parent) {
                Some(node) => &node.children,
                None => &[],
            },
            None => &self.roots,
        }
    }

    pub fn name_of(&self, id: NodeId) -> &str {
        self.node(id).map_or("", |n| n.name.as_str())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn usage_of(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.usage.as_deref())
    }

    pub fn description_of(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.desc.as_deref())
    }

    pub fn user_of(&self, id: NodeId) -> Option<&U> {
        self.node(id).map(|n| &n.user)
    }

    pub(crate) fn handler_of(&self, id: NodeId) -> Option<&dyn Command<U>> {
        self.node(id).and_then(|n| n.handler.as_deref())
    }

    pub fn set_usage(&mut self, id: NodeId, usage: &str) -> Result<()> {
        match self.node_mut(id) {
            Some(node) => {
                node.usage = Some(usage.to_string());
                Ok(())
            },
            None => Err(TrellisError::Registration("stale node handle".into())),
        }
    }

    pub fn set_description(&mut self, id: NodeId, desc: &str) -> Result<()> {
        match self.node_mut(id) {
            Some(node) => {
                node.desc = Some(desc.to_string());
                Ok(())
            },
            None => Err(TrellisError::Registration("stale node handle".into())),
        }
    }

    /// Names of all ancestors joined by spaces, root to leaf.
    pub fn command_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(id) = cursor {
            names.push(self.name_of(id));
            cursor = self.parent_of(id);
        }
        names.reverse();
        names.join(" ")
    }

    /// Detach and free `id` and its whole subtree, returning every freed
    /// handle so the caller can purge references to them.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        match self.parent_of(id) {
            Some(parent) => {
                if let Some(node) = self.node_mut(parent) {
                    node.children.retain(|&child| child != id);
                }
            },
            None => self.roots.retain(|&root| root != id),
        }
        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.slots.get_mut(id.0).and_then(|slot| slot.take()) {
                pending.extend(node.children);
                removed.push(id);
            }
        }
        removed
    }
}

impl<U> Default for CommandTree<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a resolved node, handed to command handlers.
///
/// Exposes the node's registry data and the default execute/usage
/// behaviors, plus the owning dispatcher for alias registration and
/// recursive execution.
pub struct NodeRef<'a, U> {
    pub(crate) dispatcher: &'a Dispatcher<U>,
    pub(crate) id: NodeId,
}

impl<U> Clone for NodeRef<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for NodeRef<'_, U> {}

impl<'a, U> NodeRef<'a, U> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn dispatcher(&self) -> &'a Dispatcher<U> {
        self.dispatcher
    }

    fn tree(&self) -> &'a CommandTree<U> {
        self.dispatcher.tree()
    }

    pub fn name(&self) -> &'a str {
        self.tree().name_of(self.id)
    }

    pub fn usage_text(&self) -> Option<&'a str> {
        self.tree().usage_of(self.id)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.tree().description_of(self.id)
    }

    /// The opaque user data attached at registration.
    pub fn user(&self) -> &'a U {
        // a NodeRef is only constructed for live nodes
        self.tree().user_of(self.id).unwrap_or_else(|| {
            unreachable!("NodeRef over removed node");
        })
    }

    pub fn parent(&self) -> Option<NodeRef<'a, U>> {
        self.tree().parent_of(self.id).map(|id| NodeRef {
            dispatcher: self.dispatcher,
            id,
        })
    }

    pub fn children(&self) -> Vec<NodeRef<'a, U>> {
        self.tree()
            .children_of(Some(self.id))
            .iter()
            .map(|&id| NodeRef {
                dispatcher: self.dispatcher,
                id,
            })
            .collect()
    }

    /// Full command path, space separated, root to this node.
    pub fn command_path(&self) -> String {
        self.tree().command_path(self.id)
    }

    /// Register an alias for this node with the owning dispatcher.
    pub fn alias_add(&self, name: &str) -> Result<()> {
        self.dispatcher.alias_add(self.id, name)
    }

    /// Default execution behavior for nodes without custom logic.
    ///
    /// A childless node fails outright: it needed a real handler. A node
    /// with children prints its children, or "no subcommand" plus fuzzy
    /// suggestions when an unmatched token is present; the diagnostic print
    /// is not itself a dispatch failure.
    pub fn default_execute(&self, tokens: &mut TokenStream, out: &dyn Output) -> bool {
        let children = self.children();
        if children.is_empty() {
            return false;
        }
        if let Some(front) = tokens.front() {
            locale::no_subcommand(out, front.as_str());
            let near: Vec<&'a str> = children
                .iter()
                .filter(|child| {
                    strmatch::edit_distance(child.name(), front.as_str()) < strmatch::FUZZINESS
                })
                .map(|child| child.name())
                .collect();
            if !near.is_empty() {
                locale::did_you_mean(out);
                let _indent = IndentGuard::new(out, 2);
                for name in near {
                    out.println(true, format_args!("{name}"));
                }
            }
        } else {
            self.print_children(out);
        }
        true
    }

    /// Default usage behavior: command path, usage and description when
    /// present, then the child list.
    pub fn default_usage(&self, out: &dyn Output) -> bool {
        let _indent = IndentGuard::new(out, 2);
        let path = self.command_path();
        locale::usage(out, &path, self.usage_text(), self.description());
        if !self.children().is_empty() {
            locale::subcommands(out);
            self.print_children(out);
        }
        true
    }

    /// Print the names of this node's children, one per line, indented.
    pub fn print_children(&self, out: &dyn Output) {
        let _indent = IndentGuard::new(out, 2);
        for child in self.children() {
            out.println(true, format_args!("{}", child.name()));
        }
    }
}

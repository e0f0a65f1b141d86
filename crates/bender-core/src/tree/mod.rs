//! Arena-backed node tree
//!
//! Nodes are owned by a [`Tree`] and addressed by [`NodeId`]. A node owns its
//! children; the parent link is a plain id, so a removed subtree can never be
//! reached through a dangling back-reference: stale ids are reported as
//! [`BenderError::InvalidTreeOperation`].
//!
//! ## Invariants
//!
//! - the tree is acyclic
//! - a node is a child of at most one parent
//! - non-empty names are unique among the children of one parent

mod element;
mod outline;

pub use element::{
    Attribute, ComponentRef, DomElement, Element, Instance, QName, Text, View,
};
pub use outline::outline;

use crate::error::{BenderError, BenderResult};
use std::fmt;

/// Index of a node inside its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tree node: name, links and element payload
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    element: Element,
}

impl Node {
    /// Name, unique among siblings
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parent id; `None` for roots and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Element payload
    pub fn element(&self) -> &Element {
        &self.element
    }
}

/// Owning arena of nodes with an optional designated root
#[derive(Debug, Clone, Default)]
pub struct Tree {
    slots: Vec<Option<Node>>,
    root: Option<NodeId>,
}

impl Tree {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree with a single root node
    pub fn with_root(element: Element) -> Self {
        let mut tree = Self::new();
        let root = tree.create(element);
        tree.root = Some(root);
        tree
    }

    /// Designated root
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Designate a root; it must be a live, detached node
    pub fn set_root(&mut self, id: NodeId) -> BenderResult<()> {
        if self.node(id)?.parent.is_some() {
            return Err(BenderError::invalid_tree(
                self.describe(id),
                "a root cannot have a parent",
            ));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Number of live nodes (attached or not)
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no node is alive
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a detached, unnamed node
    pub fn create(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(Node {
            name: None,
            parent: None,
            children: Vec::new(),
            element,
        }));
        id
    }

    /// Create a detached node with a name
    pub fn create_named(&mut self, name: impl Into<String>, element: Element) -> NodeId {
        let id = self.create(element);
        if let Some(node) = self.slots[id.index()].as_mut() {
            node.name = Some(name.into()).filter(|n: &String| !n.is_empty());
        }
        id
    }

    /// Look up a live node
    pub fn node(&self, id: NodeId) -> BenderResult<&Node> {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| BenderError::invalid_tree(id.to_string(), "no such node"))
    }

    fn node_mut(&mut self, id: NodeId) -> BenderResult<&mut Node> {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| BenderError::invalid_tree(id.to_string(), "no such node"))
    }

    /// Whether `id` names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Element payload of a node
    pub fn element(&self, id: NodeId) -> BenderResult<&Element> {
        Ok(&self.node(id)?.element)
    }

    /// Mutable element payload of a node
    pub fn element_mut(&mut self, id: NodeId) -> BenderResult<&mut Element> {
        Ok(&mut self.node_mut(id)?.element)
    }

    /// Name of a node
    pub fn name(&self, id: NodeId) -> BenderResult<Option<&str>> {
        Ok(self.node(id)?.name())
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> BenderResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Children of a node
    pub fn children(&self, id: NodeId) -> BenderResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Name if any, id otherwise
    pub fn describe(&self, id: NodeId) -> String {
        match self.node(id) {
            Ok(Node { name: Some(name), .. }) => format!("`{name}`"),
            _ => id.to_string(),
        }
    }

    /// Rename a node; the new name must not collide with a sibling
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) -> BenderResult<()> {
        let name = name.filter(|n| !n.is_empty());
        if let (Some(parent), Some(name)) = (self.node(id)?.parent, name.as_deref()) {
            self.check_sibling_name(parent, id, name)?;
        }
        self.node_mut(id)?.name = name;
        Ok(())
    }

    fn check_sibling_name(&self, parent: NodeId, child: NodeId, name: &str) -> BenderResult<()> {
        let taken = self.node(parent)?.children.iter().any(|&sibling| {
            sibling != child && self.node(sibling).ok().and_then(Node::name) == Some(name)
        });
        if taken {
            return Err(BenderError::invalid_tree(
                self.describe(parent),
                format!("a child named `{name}` already exists"),
            ));
        }
        Ok(())
    }

    /// True if `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).ok().and_then(|node| node.parent);
        }
        false
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> BenderResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if parent == child {
            return Err(BenderError::invalid_tree(
                self.describe(child),
                "cannot insert a node into itself",
            ));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(BenderError::invalid_tree(
                self.describe(child),
                format!(
                    "cannot insert a node under its own descendant {}",
                    self.describe(parent)
                ),
            ));
        }
        if self.root == Some(child) {
            return Err(BenderError::invalid_tree(
                self.describe(child),
                "cannot insert the root of a tree",
            ));
        }
        if !parent_node.element.accepts_children() {
            return Err(BenderError::invalid_tree(
                self.describe(parent),
                format!("{} nodes cannot have children", parent_node.element.kind_name()),
            ));
        }
        if let Some(name) = child_node.name() {
            self.check_sibling_name(parent, child, name)?;
        }
        Ok(())
    }

    /// Append `child` to the children of `parent`, detaching it first if it
    /// is attached elsewhere. Returns the child.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId) -> BenderResult<NodeId> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(child)
    }

    /// Insert `child` before `reference`, which must be a child of `parent`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> BenderResult<NodeId> {
        if child == reference {
            return Err(BenderError::invalid_tree(
                self.describe(child),
                "cannot insert a node before itself",
            ));
        }
        if self.node(reference)?.parent != Some(parent) {
            return Err(BenderError::invalid_tree(
                self.describe(reference),
                format!("reference node is not a child of {}", self.describe(parent)),
            ));
        }
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&sibling| sibling == reference)
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(child)
    }

    /// Remove `child` from the children of `parent`; the subtree stays alive
    /// as a detached node. Returns the child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> BenderResult<NodeId> {
        if self.node(child)?.parent != Some(parent) {
            return Err(BenderError::invalid_tree(
                self.describe(child),
                format!("not a child of {}", self.describe(parent)),
            ));
        }
        self.detach(child)
    }

    /// Detach a node from its parent, if any. Returns the node.
    pub fn detach(&mut self, id: NodeId) -> BenderResult<NodeId> {
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != id);
            self.node_mut(id)?.parent = None;
        }
        Ok(id)
    }

    /// Detach and destroy a subtree; its ids become stale
    pub fn remove_subtree(&mut self, id: NodeId) -> BenderResult<()> {
        self.detach(id)?;
        for doomed in self.descendants(id)? {
            self.slots[doomed.index()] = None;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(())
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> BenderResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut cursor = self.node(id)?.parent;
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.node(current)?.parent;
        }
        Ok(out)
    }

    /// The node and all its descendants in pre-order
    pub fn descendants(&self, id: NodeId) -> BenderResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current)?.children.iter().rev().copied());
        }
        Ok(out)
    }

    /// First node named `name` in pre-order below (and including) `scope`
    pub fn find_named(&self, scope: NodeId, name: &str) -> BenderResult<Option<NodeId>> {
        Ok(self
            .descendants(scope)?
            .into_iter()
            .find(|&id| self.node(id).ok().and_then(Node::name) == Some(name)))
    }

    /// Nearest enclosing View of a node (the node itself if it is a View)
    pub fn view_of(&self, id: NodeId) -> BenderResult<Option<NodeId>> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            if matches!(node.element, Element::View(_)) {
                return Ok(Some(current));
            }
            cursor = node.parent;
        }
        Ok(None)
    }

    /// Value of an Attribute node: the concatenated text of its Text children
    pub fn attribute_value(&self, id: NodeId) -> BenderResult<String> {
        let node = self.node(id)?;
        if !matches!(node.element, Element::Attribute(_)) {
            return Err(BenderError::invalid_tree(
                self.describe(id),
                format!("expected an attribute, found {}", node.element.kind_name()),
            ));
        }
        let mut value = String::new();
        for &child in &node.children {
            if let Element::Text(text) = &self.node(child)?.element {
                value.push_str(&text.text);
            }
        }
        Ok(value)
    }

    /// Replace the value of an Attribute node with a single Text child
    pub fn set_attribute_value(&mut self, id: NodeId, value: &str) -> BenderResult<()> {
        self.attribute_value(id)?;
        let texts: Vec<NodeId> = self
            .node(id)?
            .children
            .iter()
            .copied()
            .filter(|&child| matches!(self.element(child), Ok(Element::Text(_))))
            .collect();
        match texts.split_first() {
            Some((&first, rest)) => {
                for &extra in rest {
                    self.remove_subtree(extra)?;
                }
                if let Element::Text(text) = self.element_mut(first)? {
                    text.text = value.to_string();
                }
            }
            None => {
                let text = self.create(Element::text(value));
                self.insert_child(id, text)?;
            }
        }
        Ok(())
    }

    /// Deep-copy the subtree rooted at `id` into `dest` with fresh ids.
    /// The copy is detached; names and elements are preserved.
    pub fn clone_subtree(&self, id: NodeId, dest: &mut Tree) -> BenderResult<NodeId> {
        let source = self.node(id)?;
        let copy = dest.create(source.element.clone());
        dest.node_mut(copy)?.name = source.name.clone();
        for &child in &source.children {
            let child_copy = self.clone_subtree(child, dest)?;
            dest.node_mut(child_copy)?.parent = Some(copy);
            dest.node_mut(copy)?.children.push(child_copy);
        }
        Ok(copy)
    }

    /// Deep copy of the subtree at `id` as a new tree rooted at the copy
    pub fn extract(&self, id: NodeId) -> BenderResult<Tree> {
        let mut tree = Tree::new();
        let root = self.clone_subtree(id, &mut tree)?;
        tree.root = Some(root);
        Ok(tree)
    }
}

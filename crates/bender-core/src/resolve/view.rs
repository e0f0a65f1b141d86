//! View derivation
//!
//! The root-most fragment in the chain is cloned as the base view. Every later
//! fragment, and finally the site's content, is applied on top of it:
//!
//! - a named node in the fragment overrides the first node with that name in
//!   the inherited view
//! - everything else replaces each `Content` placeholder, or is appended to
//!   the root view when there is none
//!
//! Placeholders still present at the end fall back to their own children.
//! Fragments are only read; every node that lands in the view is a fresh copy.

use crate::component::ComponentDef;
use crate::error::{BenderError, BenderResult};
use crate::tree::{ComponentRef, Element, NodeId, Tree, View};
use tracing::debug;

/// Build the owned view of a component from its chain (self first) and the
/// content injected by the instantiating site
pub(super) fn build(chain: &[&ComponentDef], content: Option<&Tree>) -> BenderResult<Tree> {
    let mut view: Option<Tree> = None;
    for def in chain.iter().rev() {
        let Some(fragment) = def.view() else {
            continue;
        };
        match view.as_mut() {
            None => view = Some(base(fragment)?),
            Some(view) => {
                debug!(component = def.name(), "deriving view");
                derive(view, fragment)?;
            }
        }
    }

    let mut view = match view {
        Some(view) => view,
        None => synthesized(),
    };
    if let Some(content) = content {
        derive(&mut view, content)?;
    }
    finalize(&mut view)?;

    let root = root_of(&view)?;
    if let Element::View(root_view) = view.element_mut(root)? {
        root_view.component = Some(ComponentRef::Owner);
    }
    Ok(view)
}

pub(super) fn root_of(tree: &Tree) -> BenderResult<NodeId> {
    tree.root()
        .ok_or_else(|| BenderError::invalid_tree("view", "tree has no root"))
}

fn synthesized() -> Tree {
    Tree::with_root(Element::View(View {
        component: None,
        is_default: true,
    }))
}

/// Fresh copy of a fragment, wrapped in a synthesized View unless it already
/// is one
fn base(fragment: &Tree) -> BenderResult<Tree> {
    let Some(root) = fragment.root() else {
        return Ok(synthesized());
    };
    if matches!(fragment.element(root)?, Element::View(_)) {
        return fragment.extract(root);
    }
    let mut view = synthesized();
    let view_root = root_of(&view)?;
    let copy = fragment.clone_subtree(root, &mut view)?;
    view.insert_child(view_root, copy)?;
    Ok(view)
}

/// The nodes a fragment contributes: the children of a View root, or the root
/// itself
fn declared(fragment: &Tree, root: NodeId) -> BenderResult<Vec<NodeId>> {
    Ok(match fragment.element(root)? {
        Element::View(_) => fragment.children(root)?.to_vec(),
        _ => vec![root],
    })
}

fn derive(view: &mut Tree, fragment: &Tree) -> BenderResult<()> {
    let Some(fragment_root) = fragment.root() else {
        return Ok(());
    };
    let view_root = root_of(view)?;

    let mut leftovers = Vec::new();
    for id in declared(fragment, fragment_root)? {
        let target = match fragment.name(id)? {
            Some(name) => view.find_named(view_root, name)?,
            None => None,
        };
        match target {
            Some(target) => override_node(view, target, fragment, id)?,
            None => leftovers.push(id),
        }
    }
    if leftovers.is_empty() {
        return Ok(());
    }

    let placeholders = content_nodes(view, view_root)?;
    if placeholders.is_empty() {
        for &id in &leftovers {
            let copy = fragment.clone_subtree(id, view)?;
            view.insert_child(view_root, copy)?;
        }
        return Ok(());
    }
    for placeholder in placeholders {
        if !view.contains(placeholder) {
            continue;
        }
        let parent = parent_of(view, placeholder)?;
        for &id in &leftovers {
            let copy = fragment.clone_subtree(id, view)?;
            if let Some(name) = view.name(copy)?.map(str::to_string) {
                if has_child_named(view, parent, &name)? {
                    debug!(node = %name, "placeholder copy would repeat a sibling name, leaving it unnamed");
                    view.set_name(copy, None)?;
                }
            }
            view.insert_before(parent, copy, placeholder)?;
        }
        view.remove_subtree(placeholder)?;
    }
    Ok(())
}

fn has_child_named(view: &Tree, parent: NodeId, name: &str) -> BenderResult<bool> {
    for &child in view.children(parent)? {
        if view.name(child)? == Some(name) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Replace every remaining placeholder by its fallback children
fn finalize(view: &mut Tree) -> BenderResult<()> {
    let view_root = root_of(view)?;
    for placeholder in content_nodes(view, view_root)? {
        if !view.contains(placeholder) {
            continue;
        }
        let parent = parent_of(view, placeholder)?;
        for child in view.children(placeholder)?.to_vec() {
            view.insert_before(parent, child, placeholder)?;
        }
        view.remove_subtree(placeholder)?;
    }
    Ok(())
}

fn content_nodes(view: &Tree, root: NodeId) -> BenderResult<Vec<NodeId>> {
    Ok(view
        .descendants(root)?
        .into_iter()
        .filter(|&id| matches!(view.element(id), Ok(Element::Content)))
        .collect())
}

fn parent_of(view: &Tree, id: NodeId) -> BenderResult<NodeId> {
    view.parent(id)?
        .ok_or_else(|| BenderError::invalid_tree(view.describe(id), "content cannot be a root"))
}

fn override_node(
    view: &mut Tree,
    target: NodeId,
    fragment: &Tree,
    declared: NodeId,
) -> BenderResult<()> {
    let has_children = !fragment.children(declared)?.is_empty();
    let merged = match (fragment.element(declared)?, view.element_mut(target)?) {
        (Element::Text(new), Element::Text(old)) => {
            old.text = new.text.clone();
            Ok(false)
        }
        (Element::Dom(new), Element::Dom(old)) => {
            old.name = new.name.clone();
            old.attributes
                .extend(new.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(has_children)
        }
        (Element::Attribute(new), Element::Attribute(old)) => {
            old.name = new.name.clone();
            Ok(true)
        }
        (Element::Instance(new), Element::Instance(old)) => {
            old.component = new.component.clone();
            old.properties
                .extend(new.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(has_children)
        }
        (new, old) => Err((new.kind_name(), old.kind_name())),
    };
    let replace_children = merged.map_err(|(new, old)| {
        BenderError::invalid_tree(
            view.describe(target),
            format!("cannot override {old} with {new}"),
        )
    })?;
    if replace_children {
        for child in view.children(target)?.to_vec() {
            view.remove_subtree(child)?;
        }
        for &child in fragment.children(declared)? {
            let copy = fragment.clone_subtree(child, view)?;
            view.insert_child(target, copy)?;
        }
    }
    Ok(())
}

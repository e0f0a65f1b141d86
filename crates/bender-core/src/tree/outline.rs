//! Indented text rendering of a tree, one node per line

use super::{ComponentRef, Element, NodeId, Tree};
use std::fmt::Write;

/// Render the tree below its root (empty string for a rootless tree)
///
/// Attribute nodes show their value inline; their text children are not
/// listed separately.
pub fn outline(tree: &Tree) -> String {
    let mut out = String::new();
    if let Some(root) = tree.root() {
        write_node(tree, root, 0, &mut out);
    }
    out
}

fn write_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let Ok(node) = tree.node(id) else {
        return;
    };
    let _ = write!(out, "{:indent$}{}", "", node.element().kind_name(), indent = depth * 2);
    if let Some(name) = node.name() {
        let _ = write!(out, ":{name}");
    }
    match node.element() {
        Element::View(view) => {
            if view.is_default {
                out.push_str(" default");
            }
            match view.component {
                Some(ComponentRef::Owner) => out.push_str(" owner"),
                Some(ComponentRef::Child(index)) => {
                    let _ = write!(out, " child[{index}]");
                }
                None => {}
            }
        }
        Element::Content => {}
        Element::Dom(dom) => {
            let _ = write!(out, " {}", dom.name);
            for (name, value) in &dom.attributes {
                let _ = write!(out, " {name}={value:?}");
            }
        }
        Element::Attribute(attribute) => {
            let value = tree.attribute_value(id).unwrap_or_default();
            let _ = write!(out, " {}={value:?}", attribute.name);
        }
        Element::Text(text) => {
            let _ = write!(out, " {:?}", text.text);
        }
        Element::Instance(instance) => {
            let _ = write!(out, " {}", instance.component);
            for (name, value) in &instance.properties {
                let _ = write!(out, " {name}={value}");
            }
        }
    }
    out.push('\n');
    if matches!(node.element(), Element::Attribute(_)) {
        return;
    }
    for &child in node.children() {
        write_node(tree, child, depth + 1, out);
    }
}

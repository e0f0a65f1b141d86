//! Serialized component libraries
//!
//! A library document lists components with their raw view trees. It is the
//! hand-off point from whatever produces markup to the core: JSON and TOML
//! are accepted, and [`LibraryDocument::into_library`] builds the trees
//! through the regular tree operations so every structural rule applies.
//!
//! ```json
//! {"components": [{
//!     "name": "Greeting",
//!     "properties": {"name": "world"},
//!     "view": {"kind": "view", "children": [
//!         {"kind": "text", "name": "line", "text": "Hello {name}"}
//!     ]}
//! }]}
//! ```

use crate::component::{ComponentDef, ComponentLibrary};
use crate::error::{BenderError, BenderResult};
use crate::tree::{
    Attribute, ComponentRef, DomElement, Element, Instance, NodeId, QName, Text, Tree, View,
};
use crate::value::Value;
use crate::watch::WatchDef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Watches are stored exactly as declared
pub type RawWatch = WatchDef;

fn is_false(value: &bool) -> bool {
    !*value
}

/// One node of a raw view tree, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawNode {
    /// Native view root
    View {
        /// Node name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Synthesized by the resolver (export only; ignored on import)
        #[serde(default, skip_serializing_if = "is_false")]
        default: bool,
        /// Index of the nested component this view stands for (export only;
        /// ignored on import)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        child: Option<usize>,
        /// Child nodes
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RawNode>,
    },
    /// Content placeholder; children are the fallback
    Content {
        /// Node name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Fallback nodes
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RawNode>,
    },
    /// Markup element
    Element {
        /// Node name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Tag in Clark notation
        tag: QName,
        /// Attribute values
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        attributes: IndexMap<QName, String>,
        /// Child nodes
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RawNode>,
    },
    /// Addressable attribute whose value is its text children
    Attribute {
        /// Node name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Attribute name in Clark notation
        attribute: QName,
        /// Child nodes
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RawNode>,
    },
    /// Text leaf
    Text {
        /// Node name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Content
        #[serde(default)]
        text: String,
    },
    /// Nested component instantiation
    Instance {
        /// Node name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Component to instantiate
        component: String,
        /// Property overrides
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        properties: IndexMap<String, Value>,
        /// Injected content
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RawNode>,
    },
}

impl RawNode {
    /// Build a tree rooted at this node
    pub fn into_tree(self) -> BenderResult<Tree> {
        let mut tree = Tree::new();
        let root = self.build(&mut tree)?;
        tree.set_root(root)?;
        Ok(tree)
    }

    fn build(self, tree: &mut Tree) -> BenderResult<NodeId> {
        let (name, element, children) = match self {
            // `default` and `child` are set by the resolver; markup cannot claim them
            RawNode::View { name, children, .. } => (name, Element::View(View::default()), children),
            RawNode::Content { name, children } => (name, Element::Content, children),
            RawNode::Element {
                name,
                tag,
                attributes,
                children,
            } => (
                name,
                Element::Dom(DomElement {
                    name: tag,
                    attributes,
                }),
                children,
            ),
            RawNode::Attribute {
                name,
                attribute,
                children,
            } => (
                name,
                Element::Attribute(Attribute { name: attribute }),
                children,
            ),
            RawNode::Text { name, text } => (name, Element::Text(Text { text }), Vec::new()),
            RawNode::Instance {
                name,
                component,
                properties,
                children,
            } => (
                name,
                Element::Instance(Instance {
                    component,
                    properties,
                }),
                children,
            ),
        };
        let id = match name {
            Some(name) => tree.create_named(name, element),
            None => tree.create(element),
        };
        for child in children {
            let child = child.build(tree)?;
            tree.insert_child(id, child)?;
        }
        Ok(id)
    }

    /// Raw form of the subtree at `id`
    pub fn from_tree(tree: &Tree, id: NodeId) -> BenderResult<Self> {
        let node = tree.node(id)?;
        let name = node.name().map(str::to_string);
        let children = node
            .children()
            .iter()
            .map(|&child| RawNode::from_tree(tree, child))
            .collect::<BenderResult<Vec<_>>>()?;
        Ok(match node.element() {
            Element::View(view) => RawNode::View {
                name,
                default: view.is_default,
                child: match view.component {
                    Some(ComponentRef::Child(index)) => Some(index),
                    _ => None,
                },
                children,
            },
            Element::Content => RawNode::Content { name, children },
            Element::Dom(dom) => RawNode::Element {
                name,
                tag: dom.name.clone(),
                attributes: dom.attributes.clone(),
                children,
            },
            Element::Attribute(attribute) => RawNode::Attribute {
                name,
                attribute: attribute.name.clone(),
                children,
            },
            Element::Text(text) => RawNode::Text {
                name,
                text: text.text.clone(),
            },
            Element::Instance(instance) => RawNode::Instance {
                name,
                component: instance.component.clone(),
                properties: instance.properties.clone(),
                children,
            },
        })
    }
}

impl Tree {
    /// Raw form of the whole tree; `None` when there is no root
    pub fn to_raw(&self) -> BenderResult<Option<RawNode>> {
        self.root()
            .map(|root| RawNode::from_tree(self, root))
            .transpose()
    }
}

/// A component as written in a library document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComponent {
    /// Registry name
    pub name: String,
    /// Component to inherit from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype: Option<String>,
    /// Declared properties with defaults
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,
    /// View fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<RawNode>,
    /// Declared watches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watches: Vec<RawWatch>,
}

impl RawComponent {
    /// Convert into a definition, building the view tree
    pub fn into_def(self) -> BenderResult<ComponentDef> {
        let mut def = ComponentDef::new(&self.name);
        if let Some(prototype) = self.prototype {
            def = def.with_prototype(prototype);
        }
        for (name, value) in self.properties {
            def = def.with_property(name, value);
        }
        if let Some(view) = self.view {
            let tree = view.into_tree().map_err(|err| {
                BenderError::Document(format!("component `{}`: {err}", self.name))
            })?;
            def = def.with_view(tree);
        }
        for watch in self.watches {
            def = def.with_watch(watch);
        }
        Ok(def)
    }
}

/// Top level of a library document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LibraryDocument {
    /// Components in registration order
    #[serde(default)]
    pub components: Vec<RawComponent>,
}

impl LibraryDocument {
    /// Parse a JSON document
    pub fn from_json_str(input: &str) -> BenderResult<Self> {
        serde_json::from_str(input).map_err(|e| BenderError::Document(format!("invalid JSON: {e}")))
    }

    /// Parse a TOML document
    pub fn from_toml_str(input: &str) -> BenderResult<Self> {
        toml::from_str(input).map_err(|e| BenderError::Document(format!("invalid TOML: {e}")))
    }

    /// Build every view tree and register the components
    pub fn into_library(self) -> BenderResult<ComponentLibrary> {
        let mut builder = ComponentLibrary::builder();
        for component in self.components {
            builder = builder.register(component.into_def()?);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Registry;
    use crate::tree::outline;

    const CARD: &str = r#"{
        "components": [{
            "name": "Card",
            "properties": {"title": "Untitled", "count": 0},
            "view": {"kind": "view", "children": [
                {"kind": "element", "name": "header", "tag": "h1",
                 "attributes": {"class": "card-title", "{urn:aria}label": "{title}"},
                 "children": [{"kind": "text", "name": "title", "text": "{title}"}]},
                {"kind": "content", "children": [{"kind": "text", "text": "nothing here"}]}
            ]},
            "watches": [{"name": "badge", "value": {"property": "count"}, "target": "@title"}]
        }]
    }"#;

    #[test]
    fn parses_json_into_a_library() {
        let library = LibraryDocument::from_json_str(CARD)
            .unwrap()
            .into_library()
            .unwrap();
        let card = library.get("Card").unwrap();
        assert_eq!(card.properties()["count"], Value::Number(0.0));
        assert_eq!(card.watches()[0].name.as_deref(), Some("badge"));
        assert_eq!(
            outline(card.view().unwrap()),
            "view\n  element:header h1 class=\"card-title\" {urn:aria}label=\"{title}\"\n    text:title \"{title}\"\n  content\n    text \"nothing here\"\n"
        );
    }

    #[test]
    fn parses_toml() {
        let doc = LibraryDocument::from_toml_str(
            r#"
            [[components]]
            name = "Base"
            properties = { x = 1 }

            [[components]]
            name = "Leaf"
            prototype = "Base"

            [components.view]
            kind = "text"
            name = "label"
            text = "x = {x}"
            "#,
        )
        .unwrap();
        assert_eq!(doc.components.len(), 2);
        assert_eq!(doc.components[1].prototype.as_deref(), Some("Base"));
        assert!(matches!(doc.components[1].view, Some(RawNode::Text { .. })));
    }

    #[test]
    fn duplicate_sibling_names_fail_with_context() {
        let err = LibraryDocument::from_json_str(
            r#"{"components": [{"name": "Dup", "view": {"kind": "view", "children": [
                {"kind": "text", "name": "a", "text": "1"},
                {"kind": "text", "name": "a", "text": "2"}
            ]}}]}"#,
        )
        .unwrap()
        .into_library()
        .unwrap_err();
        assert!(matches!(err, BenderError::Document(ref msg) if msg.contains("`Dup`")));
    }

    #[test]
    fn malformed_input_is_a_document_error() {
        assert!(matches!(
            LibraryDocument::from_json_str("{"),
            Err(BenderError::Document(_))
        ));
        assert!(matches!(
            LibraryDocument::from_json_str(r#"{"components": [{"name": "X", "view": {"kind": "nope"}}]}"#),
            Err(BenderError::Document(_))
        ));
    }

    #[test]
    fn resolver_owned_view_fields_are_not_imported() {
        let raw: RawNode = serde_json::from_str(
            r#"{"kind": "view", "default": true, "child": 3, "children": [
                {"kind": "view", "name": "inner", "child": 0}
            ]}"#,
        )
        .unwrap();
        let tree = raw.into_tree().unwrap();
        let root = tree.root().unwrap();
        let inner = tree.children(root).unwrap()[0];
        for id in [root, inner] {
            assert_eq!(tree.element(id).unwrap(), &Element::View(View::default()));
        }
    }

    #[test]
    fn export_matches_the_input_tree() {
        let raw: RawNode = serde_json::from_str(
            r#"{"kind": "view", "children": [
                {"kind": "attribute", "name": "href", "attribute": "href",
                 "children": [{"kind": "text", "text": "/home"}]},
                {"kind": "instance", "component": "Icon", "properties": {"size": 2}}
            ]}"#,
        )
        .unwrap();
        let tree = raw.clone().into_tree().unwrap();
        assert_eq!(tree.to_raw().unwrap(), Some(raw));
    }
}

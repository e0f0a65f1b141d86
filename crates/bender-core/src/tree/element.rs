//! Element variants carried by tree nodes

use crate::error::BenderError;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace-qualified name of a DOM element or attribute
///
/// Renders in Clark notation: `{namespace}local`, or just `local` when there
/// is no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace_uri: Option<String>,
    local_name: String,
}

impl QName {
    /// A name without namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: None,
            local_name: local_name.into(),
        }
    }

    /// A namespaced name; an empty namespace counts as none
    pub fn new(namespace_uri: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.map(Into::into).filter(|ns| !ns.is_empty()),
            local_name: local_name.into(),
        }
    }

    /// Namespace URI, if any
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace_uri.as_deref()
    }

    /// Local part
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace_uri {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

impl FromStr for QName {
    type Err = BenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| BenderError::invalid_expression(s, reason);
        let (namespace, local) = match s.strip_prefix('{') {
            Some(rest) => {
                let (ns, local) = rest
                    .split_once('}')
                    .ok_or_else(|| invalid("unterminated namespace"))?;
                (Some(ns), local)
            }
            None => (None, s),
        };
        if local.is_empty() {
            return Err(invalid("empty local name"));
        }
        if local.contains(['{', '}', '@']) || local.chars().any(char::is_whitespace) {
            return Err(invalid("illegal character in local name"));
        }
        Ok(Self::new(namespace, local))
    }
}

impl TryFrom<String> for QName {
    type Error = BenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QName> for String {
    fn from(name: QName) -> Self {
        name.to_string()
    }
}

/// Tree-relative handle from a View to the component it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRef {
    /// The component that owns the tree this view lives in
    Owner,
    /// The i-th nested component instance of the owning component
    Child(usize),
}

/// A node bound to a native view and its component
#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    /// Owning component, set during resolution
    pub component: Option<ComponentRef>,
    /// True when the resolver synthesized this view
    pub is_default: bool,
}

/// A generic namespaced markup element
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Tag identity
    pub name: QName,
    /// Attribute values in declaration order
    pub attributes: IndexMap<QName, String>,
}

impl DomElement {
    /// Element without attributes
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }
}

/// One markup attribute as an addressable binding target; its value is the
/// concatenated text of its `Text` children
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute identity
    pub name: QName,
}

/// Leaf text content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    /// Literal content
    pub text: String,
}

/// A site inside a view that instantiates another component
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Registry name of the instantiated component
    pub component: String,
    /// Overrides applied on top of the component's inherited properties
    pub properties: IndexMap<String, Value>,
}

/// The closed set of element kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Native view root
    View(View),
    /// Placeholder for injected children
    Content,
    /// Generic markup element
    Dom(DomElement),
    /// Markup attribute
    Attribute(Attribute),
    /// Text leaf
    Text(Text),
    /// Nested component instantiation (replaced during resolution)
    Instance(Instance),
}

impl Element {
    /// Kind name used in diagnostics and outlines
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::View(_) => "view",
            Element::Content => "content",
            Element::Dom(_) => "element",
            Element::Attribute(_) => "attribute",
            Element::Text(_) => "text",
            Element::Instance(_) => "instance",
        }
    }

    /// Text leaves are the only elements that cannot have children
    pub fn accepts_children(&self) -> bool {
        !matches!(self, Element::Text(_))
    }

    /// Shorthand for a text element
    pub fn text(text: impl Into<String>) -> Self {
        Element::Text(Text { text: text.into() })
    }

    /// Shorthand for an explicitly declared view
    pub fn view() -> Self {
        Element::View(View::default())
    }

    /// Shorthand for a DOM element without namespace
    pub fn dom(local_name: impl Into<String>) -> Self {
        Element::Dom(DomElement::new(QName::local(local_name)))
    }

    /// Shorthand for an attribute element without namespace
    pub fn attribute(local_name: impl Into<String>) -> Self {
        Element::Attribute(Attribute {
            name: QName::local(local_name),
        })
    }

    /// Shorthand for an instantiation site without overrides
    pub fn instance(component: impl Into<String>) -> Self {
        Element::Instance(Instance {
            component: component.into(),
            properties: IndexMap::new(),
        })
    }
}

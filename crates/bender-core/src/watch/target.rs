//! Watch target addressing
//!
//! | path          | target                                            |
//! |---------------|---------------------------------------------------|
//! | `@prop`       | property `prop` of the owning component           |
//! | `node`        | text of the named Text node, or value of the named Attribute node |
//! | `node@attr`   | attribute `attr` of the named DOM element          |
//! | `node@{ns}attr` | namespaced attribute of the named DOM element   |

use super::expr::is_identifier;
use crate::error::BenderError;
use crate::tree::{NodeId, QName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a watch writes its value, as declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetPath {
    /// A component property
    Property(String),
    /// A named Text or Attribute node
    Node(String),
    /// An attribute of a named DOM element
    DomAttribute {
        /// Element name
        node: String,
        /// Attribute name
        attribute: QName,
    },
}

impl TargetPath {
    /// The property this path writes, if it targets one
    pub fn property(&self) -> Option<&str> {
        match self {
            TargetPath::Property(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPath::Property(name) => write!(f, "@{name}"),
            TargetPath::Node(node) => f.write_str(node),
            TargetPath::DomAttribute { node, attribute } => write!(f, "{node}@{attribute}"),
        }
    }
}

impl FromStr for TargetPath {
    type Err = BenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(property) = s.strip_prefix('@') {
            if !is_identifier(property) {
                return Err(BenderError::invalid_expression(s, "expected `@property`"));
            }
            return Ok(TargetPath::Property(property.to_string()));
        }
        match s.split_once('@') {
            Some((node, attribute)) => {
                if node.is_empty() {
                    return Err(BenderError::invalid_expression(s, "missing node name"));
                }
                Ok(TargetPath::DomAttribute {
                    node: node.to_string(),
                    attribute: attribute.parse()?,
                })
            }
            None if s.is_empty() => Err(BenderError::invalid_expression(s, "empty target")),
            None => Ok(TargetPath::Node(s.to_string())),
        }
    }
}

impl TryFrom<String> for TargetPath {
    type Error = BenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TargetPath> for String {
    fn from(path: TargetPath) -> Self {
        path.to_string()
    }
}

/// A target path resolved against a component's view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoundTarget {
    /// A component property
    Property(String),
    /// A Text node's content
    Text(NodeId),
    /// An Attribute node's value
    Attribute(NodeId),
    /// An attribute of a DOM element
    DomAttribute {
        /// Element node
        node: NodeId,
        /// Attribute name
        attribute: QName,
    },
}

impl BoundTarget {
    /// The property this target writes, if any
    pub fn property(&self) -> Option<&str> {
        match self {
            BoundTarget::Property(name) => Some(name),
            _ => None,
        }
    }
}

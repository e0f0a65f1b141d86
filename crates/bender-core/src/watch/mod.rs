//! Live property bindings
//!
//! A watch computes one value from a set of properties and writes it to a
//! target: another property, a Text node, an Attribute node, or an attribute
//! of a DOM element inside the component's own view.
//!
//! Watches are checked as a graph before anything runs (see [`graph`]) and
//! are then driven by [`propagate`], which re-evaluates only the watches whose
//! dependencies changed and commits all writes at once.

pub mod expr;
pub mod graph;
pub mod propagate;
pub mod target;

pub use expr::{Expr, Segment, Template};
pub use graph::BindingPlan;
pub use propagate::{TargetWrite, UpdateReport, WriteOutcome};
pub use target::{BoundTarget, TargetPath};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A watch as declared on a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchDef {
    /// Optional label used in diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expression producing the value
    pub value: Expr,
    /// Where the value goes
    pub target: TargetPath,
}

impl WatchDef {
    /// Unnamed watch
    pub fn new(value: Expr, target: TargetPath) -> Self {
        Self {
            name: None,
            value,
            target,
        }
    }

    /// Builder-style label
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Where a bound watch came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOrigin {
    /// Declared by the named component (the owner or one of its prototypes)
    Declared(String),
    /// Synthesized from a `{property}` placeholder in text or an attribute value
    Template,
}

/// A watch bound to a resolved component
#[derive(Debug, Clone, PartialEq)]
pub struct Watch {
    pub(crate) name: Option<String>,
    pub(crate) expr: Expr,
    pub(crate) dependencies: IndexSet<String>,
    pub(crate) path: TargetPath,
    pub(crate) target: BoundTarget,
    pub(crate) origin: WatchOrigin,
}

impl Watch {
    /// Declared label, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Properties the expression reads
    pub fn dependencies(&self) -> &IndexSet<String> {
        &self.dependencies
    }

    /// Target path as declared
    pub fn path(&self) -> &TargetPath {
        &self.path
    }

    /// Target bound to the component's view
    pub fn target(&self) -> &BoundTarget {
        &self.target
    }

    /// Declaring component or template origin
    pub fn origin(&self) -> &WatchOrigin {
        &self.origin
    }

    /// Label for diagnostics: the name, or `watch#<index>`
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("watch#{index}"),
        }
    }
}

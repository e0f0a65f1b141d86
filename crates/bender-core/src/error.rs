//! Error types shared by the tree, resolver and watch engine

use thiserror::Error;

/// Error type for every core operation
///
/// Each variant names the offending node or component so failures can be
/// traced back to the markup that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenderError {
    /// Structural violation: cycle, self insertion, stale node id,
    /// duplicate sibling name, or an incompatible view override
    #[error("Invalid tree operation on {node}: {reason}")]
    InvalidTreeOperation {
        /// Node (name or id) the operation targeted
        node: String,
        /// What went wrong
        reason: String,
    },

    /// A prototype or instance name is not in the registry
    #[error("Unknown component `{name}` referenced by `{referenced_by}`")]
    UnknownComponent {
        /// Name that failed to resolve
        name: String,
        /// Component holding the reference
        referenced_by: String,
    },

    /// Following prototypes revisits a component
    #[error("Cyclic prototype chain for `{component}`: {chain}")]
    CyclicPrototype {
        /// Component being resolved
        component: String,
        /// The chain as walked, e.g. `A -> B -> A`
        chain: String,
    },

    /// The watch dependency graph of a component has a cycle
    #[error("Cyclic binding in `{component}`: {cycle}")]
    CyclicBinding {
        /// Component whose watches were rejected
        component: String,
        /// The cycle, e.g. `x -> watch#0 -> y -> watch#1 -> x`
        cycle: String,
    },

    /// The prototype chain is longer than the configured limit
    #[error("Prototype chain of `{component}` exceeds {max} components")]
    PrototypeTooDeep {
        /// Component being resolved
        component: String,
        /// Configured limit
        max: usize,
    },

    /// A component instantiates itself through its own view
    #[error("Recursive instantiation of `{component}`: {chain}")]
    RecursiveInstantiation {
        /// Component instantiated again
        component: String,
        /// Instantiation stack
        chain: String,
    },

    /// An instantiation site overrides a property nobody declares
    #[error("Component `{component}` does not declare property `{property}`")]
    UndeclaredProperty {
        /// Component being instantiated
        component: String,
        /// Offending key
        property: String,
    },

    /// A watch or a property write names an undeclared property
    #[error("Unknown property `{property}` in `{component}`")]
    UnknownProperty {
        /// Component owning the property map
        component: String,
        /// Offending key
        property: String,
    },

    /// A watch target does not resolve inside the component's own view
    #[error("Watch target `{target}` of `{component}` does not resolve: {reason}")]
    UnresolvedTarget {
        /// Component owning the watch
        component: String,
        /// Target path as written
        target: String,
        /// Why the lookup failed
        reason: String,
    },

    /// Malformed template or target path
    #[error("Invalid expression `{source_text}`: {reason}")]
    InvalidExpression {
        /// Text that failed to parse
        source_text: String,
        /// Parser diagnostic
        reason: String,
    },

    /// An expression was applied to values of the wrong type
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// A raw-tree document could not be decoded
    #[error("Document error: {0}")]
    Document(String),
}

/// Specialized Result type for core operations
pub type BenderResult<T> = Result<T, BenderError>;

impl BenderError {
    /// Create a structural error for a node
    pub fn invalid_tree(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTreeOperation {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// Create an expression parse error
    pub fn invalid_expression(source_text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            source_text: source_text.into(),
            reason: reason.into(),
        }
    }

    /// Create an evaluation error
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Errors that concern watches and leave the view usable with static values
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Self::CyclicBinding { .. }
                | Self::UnresolvedTarget { .. }
                | Self::UnknownProperty { .. }
                | Self::Evaluation(_)
        )
    }

    /// Errors about the shape of trees or prototype chains
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidTreeOperation { .. }
                | Self::CyclicPrototype { .. }
                | Self::PrototypeTooDeep { .. }
                | Self::RecursiveInstantiation { .. }
        )
    }
}

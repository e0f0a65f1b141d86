//! Component definitions and resolved components
//!
//! A [`ComponentDef`] is what a library declares: a name, an optional
//! prototype, default properties, an optional view fragment and watches.
//! A [`Component`] is what the resolver produces from it: the effective
//! properties, an owned view tree, bound watches and nested components.

mod registry;

pub use registry::{ComponentLibrary, ComponentLibraryBuilder, Registry};

use crate::error::{BenderError, BenderResult};
use crate::tree::{ComponentRef, Tree};
use crate::value::Value;
use crate::watch::propagate::BindingState;
use crate::watch::{BindingPlan, TargetWrite, UpdateReport, Watch, WatchDef};
use indexmap::IndexMap;

/// A component as declared in a library
#[derive(Debug, Clone)]
pub struct ComponentDef {
    name: String,
    prototype: Option<String>,
    properties: IndexMap<String, Value>,
    view: Option<Tree>,
    watches: Vec<WatchDef>,
}

impl ComponentDef {
    /// Definition with no prototype, properties, view or watches
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prototype: None,
            properties: IndexMap::new(),
            view: None,
            watches: Vec::new(),
        }
    }

    /// Set the prototype to inherit from
    pub fn with_prototype(mut self, prototype: impl Into<String>) -> Self {
        self.prototype = Some(prototype.into());
        self
    }

    /// Declare a property with its default value
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Set the view fragment
    pub fn with_view(mut self, view: Tree) -> Self {
        self.view = Some(view);
        self
    }

    /// Append a watch
    pub fn with_watch(mut self, watch: WatchDef) -> Self {
        self.watches.push(watch);
        self
    }

    /// Registry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prototype name, if any
    pub fn prototype(&self) -> Option<&str> {
        self.prototype.as_deref()
    }

    /// Declared properties and their defaults
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Declared view fragment
    pub fn view(&self) -> Option<&Tree> {
        self.view.as_ref()
    }

    /// Declared watches
    pub fn watches(&self) -> &[WatchDef] {
        &self.watches
    }
}

/// A resolved component instance
///
/// `set_property` is the only way to change properties once resolved; it
/// re-runs the watches that depend on the written property.
#[derive(Debug, Clone)]
pub struct Component {
    pub(crate) name: String,
    pub(crate) chain: Vec<String>,
    pub(crate) properties: IndexMap<String, Value>,
    pub(crate) view: Tree,
    pub(crate) watches: Vec<Watch>,
    pub(crate) children: Vec<Component>,
    pub(crate) bindings: Result<BindingPlan, BenderError>,
}

impl Component {
    /// Registry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct prototype, if any
    pub fn prototype(&self) -> Option<&str> {
        self.chain.get(1).map(String::as_str)
    }

    /// Prototype chain starting with this component
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// True if `name` is this component or one of its prototypes
    pub fn conforms_to(&self, name: &str) -> bool {
        self.chain.iter().any(|link| link == name)
    }

    /// Effective properties
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Value of one property
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Resolved view; its root is a View bound to this component
    pub fn view(&self) -> &Tree {
        &self.view
    }

    /// Bound watches in declaration order
    pub fn watches(&self) -> &[Watch] {
        &self.watches
    }

    /// Nested component instances, indexed by [`ComponentRef::Child`]
    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// Nested instance `index`
    pub fn child(&self, index: usize) -> Option<&Component> {
        self.children.get(index)
    }

    /// Mutable nested instance `index`, e.g. to write its properties
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Component> {
        self.children.get_mut(index)
    }

    /// Component a View's back-reference points at
    pub fn component_at(&self, reference: ComponentRef) -> Option<&Component> {
        match reference {
            ComponentRef::Owner => Some(self),
            ComponentRef::Child(index) => self.child(index),
        }
    }

    /// Binding plan, or the error that blocked watch activation
    pub fn bindings(&self) -> Result<&BindingPlan, &BenderError> {
        self.bindings.as_ref()
    }

    /// Error that blocked watch activation, if any
    pub fn binding_error(&self) -> Option<&BenderError> {
        self.bindings.as_ref().err()
    }

    /// Write a property and propagate it through dependent watches
    ///
    /// Fails with the stored binding error if the watches were rejected, and
    /// with [`BenderError::UnknownProperty`] for undeclared names. On any
    /// failure neither the properties nor the view change.
    pub fn set_property(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> BenderResult<UpdateReport> {
        let plan = self.bindings.as_ref().map_err(Clone::clone)?;
        BindingState {
            component: &self.name,
            watches: &self.watches,
            plan,
            properties: &mut self.properties,
            view: &mut self.view,
        }
        .set_property(name, value.into())
    }

    /// Run every watch once in plan order
    pub fn activate(&mut self) -> BenderResult<Vec<TargetWrite>> {
        let plan = self.bindings.as_ref().map_err(Clone::clone)?;
        BindingState {
            component: &self.name,
            watches: &self.watches,
            plan,
            properties: &mut self.properties,
            view: &mut self.view,
        }
        .activate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;

    fn bare(bindings: Result<BindingPlan, BenderError>) -> Component {
        let mut properties = IndexMap::new();
        properties.insert("x".to_string(), Value::from(1i64));
        Component {
            name: "Leaf".to_string(),
            chain: vec!["Leaf".to_string(), "Base".to_string()],
            properties,
            view: Tree::with_root(Element::view()),
            watches: Vec::new(),
            children: Vec::new(),
            bindings,
        }
    }

    #[test]
    fn chain_accessors() {
        let component = bare(Ok(BindingPlan::default()));
        assert_eq!(component.prototype(), Some("Base"));
        assert!(component.conforms_to("Base"));
        assert!(!component.conforms_to("Other"));
        assert!(std::ptr::eq(
            component.component_at(ComponentRef::Owner).unwrap(),
            &component
        ));
        assert!(component.component_at(ComponentRef::Child(0)).is_none());
    }

    #[test]
    fn stored_binding_error_blocks_writes() {
        let error = BenderError::CyclicBinding {
            component: "Leaf".to_string(),
            cycle: "x -> watch#0 -> x".to_string(),
        };
        let mut component = bare(Err(error.clone()));
        assert_eq!(component.binding_error(), Some(&error));
        assert_eq!(component.set_property("x", 2i64).unwrap_err(), error);
        assert_eq!(component.property("x"), Some(&Value::from(1i64)));
    }

    #[test]
    fn writes_without_watches_still_update_properties() {
        let mut component = bare(Ok(BindingPlan::default()));
        let report = component.set_property("x", 3i64).unwrap();
        assert!(report.outcome.is_changed());
        assert_eq!(component.property("x"), Some(&Value::from(3i64)));
    }

    #[test]
    fn def_builder() {
        let def = ComponentDef::new("Button")
            .with_prototype("Base")
            .with_property("label", "OK");
        assert_eq!(def.name(), "Button");
        assert_eq!(def.prototype(), Some("Base"));
        assert_eq!(def.properties()["label"], Value::from("OK"));
        assert!(def.view().is_none());
    }
}

//! Component resolution
//!
//! Turns a registered [`ComponentDef`](crate::component::ComponentDef) and an
//! instantiation [`Site`] into a resolved [`Component`]:
//!
//! 1. walk the prototype chain
//! 2. merge properties (root-most first, site last)
//! 3. derive the view and inject the site's content
//! 4. resolve nested `Instance` nodes into child components
//! 5. bind watches and plan them; binding errors are kept on the component
//!    and leave its view static
//! 6. run every watch once
//!
//! Failures in steps 1 to 4 abort the component (and any component that
//! instantiates it); nothing partial is returned.

mod bindings;
mod chain;
mod properties;
mod view;

use crate::component::{Component, Registry};
use crate::error::{BenderError, BenderResult};
use crate::tree::{ComponentRef, Element, Tree, View};
use crate::value::Value;
use crate::watch::BindingPlan;
use bender_config::ResolverConfig;
use indexmap::IndexMap;
use tracing::{debug, instrument, warn};

/// Name used as the referrer of top-level resolutions in diagnostics
const ROOT_REFERRER: &str = "<root>";

/// How a component is being instantiated
#[derive(Debug, Clone, Default)]
pub struct Site {
    /// Property overrides
    pub properties: IndexMap<String, Value>,
    /// Children injected into the component's `Content` placeholders
    pub content: Option<Tree>,
}

impl Site {
    /// Site without overrides or content
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property override
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Builder-style injected content
    pub fn with_content(mut self, content: Tree) -> Self {
        self.content = Some(content);
        self
    }
}

/// Resolves components from a registry
pub struct Resolver<'r, R: Registry> {
    registry: &'r R,
    config: ResolverConfig,
}

impl<'r, R: Registry> Resolver<'r, R> {
    /// Resolver with explicit settings
    pub fn new(registry: &'r R, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    /// Settings in use
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `name` for an instantiation site
    #[instrument(skip(self, site))]
    pub fn resolve(&self, name: &str, site: &Site) -> BenderResult<Component> {
        self.instantiate(name, ROOT_REFERRER, site, &mut Vec::new())
    }

    /// Resolve every registered component with an empty site; failures are
    /// reported per component and never affect the others
    pub fn resolve_all(&self) -> Vec<(String, BenderResult<Component>)> {
        let site = Site::default();
        self.registry
            .iter()
            .map(|def| (def.name().to_string(), self.resolve(def.name(), &site)))
            .collect()
    }

    fn instantiate(
        &self,
        name: &str,
        referenced_by: &str,
        site: &Site,
        stack: &mut Vec<String>,
    ) -> BenderResult<Component> {
        if stack.iter().any(|entry| entry == name) {
            let mut links = stack.clone();
            links.push(name.to_string());
            return Err(BenderError::RecursiveInstantiation {
                component: name.to_string(),
                chain: links.join(" -> "),
            });
        }

        let chain = chain::walk(
            self.registry,
            name,
            referenced_by,
            self.config.max_prototype_depth,
        )?;
        debug!(component = name, depth = chain.len(), "prototype chain resolved");

        let properties =
            properties::merge(&chain, &site.properties, self.config.strict_site_properties)?;
        let mut tree = view::build(&chain, site.content.as_ref())?;

        stack.push(name.to_string());
        let children = self.instantiate_children(name, &mut tree, stack);
        stack.pop();
        let children = children?;

        let bound = bindings::bind(&chain, &properties, &tree, self.config.bind_templates);
        let (watches, bindings) = match bound {
            Ok(watches) => {
                let plan = BindingPlan::build(name, &watches);
                (watches, plan)
            }
            Err(err) => (Vec::new(), Err(err)),
        };

        let mut component = Component {
            name: name.to_string(),
            chain: chain.iter().map(|def| def.name().to_string()).collect(),
            properties,
            view: tree,
            watches,
            children,
            bindings,
        };

        if component.bindings.is_ok() && self.config.activate_watches {
            if let Err(err) = component.activate() {
                component.bindings = Err(err);
            }
        }
        if let Some(err) = component.binding_error() {
            warn!(component = name, error = %err, "watches disabled, view keeps its static values");
        }
        Ok(component)
    }

    /// Replace each `Instance` node by a placeholder View and resolve the
    /// instantiated component with the node's overrides and children
    fn instantiate_children(
        &self,
        owner: &str,
        tree: &mut Tree,
        stack: &mut Vec<String>,
    ) -> BenderResult<Vec<Component>> {
        let root = view::root_of(tree)?;
        let mut children = Vec::new();
        for id in tree.descendants(root)? {
            if !tree.contains(id) {
                continue;
            }
            let Element::Instance(instance) = tree.element(id)? else {
                continue;
            };
            let instance = instance.clone();

            let nested = tree.children(id)?.to_vec();
            let content = if nested.is_empty() {
                None
            } else {
                let mut content = Tree::with_root(Element::view());
                let content_root = view::root_of(&content)?;
                for &child in &nested {
                    let copy = tree.clone_subtree(child, &mut content)?;
                    content.insert_child(content_root, copy)?;
                }
                Some(content)
            };
            let site = Site {
                properties: instance.properties,
                content,
            };

            debug!(owner, component = %instance.component, index = children.len(), "instantiating nested component");
            let child = self.instantiate(&instance.component, owner, &site, stack)?;

            for node in nested {
                tree.remove_subtree(node)?;
            }
            *tree.element_mut(id)? = Element::View(View {
                component: Some(ComponentRef::Child(children.len())),
                is_default: false,
            });
            children.push(child);
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentDef, ComponentLibrary};
    use crate::tree::outline;
    use crate::watch::{Expr, TargetPath, WatchDef};

    fn view_with(build: impl FnOnce(&mut Tree, crate::tree::NodeId)) -> Tree {
        let mut tree = Tree::with_root(Element::view());
        let root = tree.root().unwrap();
        build(&mut tree, root);
        tree
    }

    fn resolver(library: &ComponentLibrary) -> Resolver<'_, ComponentLibrary> {
        Resolver::new(library, ResolverConfig::default())
    }

    #[test]
    fn nested_instance_becomes_a_child_view() {
        let label = ComponentDef::new("Label")
            .with_property("text", "")
            .with_view(view_with(|tree, root| {
                let text = tree.create_named("value", Element::text("{text}"));
                tree.insert_child(root, text).unwrap();
            }));
        let form = ComponentDef::new("Form").with_view(view_with(|tree, root| {
            let mut instance = crate::tree::Instance {
                component: "Label".to_string(),
                properties: IndexMap::new(),
            };
            instance
                .properties
                .insert("text".to_string(), Value::from("Name"));
            let id = tree.create_named("name", Element::Instance(instance));
            tree.insert_child(root, id).unwrap();
        }));
        let library = ComponentLibrary::builder().register(label).register(form).build();

        let form = resolver(&library).resolve("Form", &Site::new()).unwrap();
        assert_eq!(outline(form.view()), "view owner\n  view:name child[0]\n");
        let label = form.child(0).unwrap();
        assert_eq!(label.property("text"), Some(&Value::from("Name")));
        assert_eq!(outline(label.view()), "view owner\n  text:value \"Name\"\n");
    }

    #[test]
    fn instance_children_fill_the_nested_content() {
        let frame = ComponentDef::new("Frame").with_view(view_with(|tree, root| {
            let border = tree.create_named("border", Element::dom("div"));
            tree.insert_child(root, border).unwrap();
            let slot = tree.create(Element::Content);
            tree.insert_child(border, slot).unwrap();
        }));
        let page = ComponentDef::new("Page").with_view(view_with(|tree, root| {
            let frame = tree.create(Element::instance("Frame"));
            tree.insert_child(root, frame).unwrap();
            let text = tree.create(Element::text("inside"));
            tree.insert_child(frame, text).unwrap();
        }));
        let library = ComponentLibrary::builder().register(frame).register(page).build();

        let page = resolver(&library).resolve("Page", &Site::new()).unwrap();
        assert_eq!(outline(page.view()), "view owner\n  view child[0]\n");
        assert_eq!(
            outline(page.child(0).unwrap().view()),
            "view owner\n  element:border div\n    text \"inside\"\n"
        );
    }

    #[test]
    fn self_instantiation_is_rejected() {
        let looping = ComponentDef::new("Loop").with_view(view_with(|tree, root| {
            let me = tree.create(Element::instance("Loop"));
            tree.insert_child(root, me).unwrap();
        }));
        let library = ComponentLibrary::builder().register(looping).build();
        let err = resolver(&library).resolve("Loop", &Site::new()).unwrap_err();
        assert_eq!(
            err,
            BenderError::RecursiveInstantiation {
                component: "Loop".to_string(),
                chain: "Loop -> Loop".to_string(),
            }
        );
    }

    #[test]
    fn unknown_instance_names_its_owner() {
        let page = ComponentDef::new("Page").with_view(view_with(|tree, root| {
            let ghost = tree.create(Element::instance("Ghost"));
            tree.insert_child(root, ghost).unwrap();
        }));
        let library = ComponentLibrary::builder().register(page).build();
        let err = resolver(&library).resolve("Page", &Site::new()).unwrap_err();
        assert_eq!(
            err,
            BenderError::UnknownComponent {
                name: "Ghost".to_string(),
                referenced_by: "Page".to_string(),
            }
        );
    }

    #[test]
    fn binding_errors_are_kept_on_the_component() {
        let broken = ComponentDef::new("Broken")
            .with_property("x", 1i64)
            .with_watch(WatchDef::new(Expr::property("x"), TargetPath::Node("missing".into())));
        let library = ComponentLibrary::builder().register(broken).build();
        let mut component = resolver(&library).resolve("Broken", &Site::new()).unwrap();
        assert!(matches!(
            component.binding_error(),
            Some(BenderError::UnresolvedTarget { .. })
        ));
        assert!(component.watches().is_empty());
        assert!(component.set_property("x", 2i64).unwrap_err().is_binding());
    }

    #[test]
    fn activation_failure_blocks_the_bindings() {
        let def = ComponentDef::new("Total")
            .with_property("a", "not a number")
            .with_property("total", 0i64)
            .with_watch(WatchDef::new(
                Expr::Sum(vec![Expr::property("a")]),
                TargetPath::Property("total".into()),
            ));
        let library = ComponentLibrary::builder().register(def).build();
        let component = resolver(&library).resolve("Total", &Site::new()).unwrap();
        assert!(matches!(
            component.binding_error(),
            Some(BenderError::Evaluation(_))
        ));
        assert_eq!(component.property("total"), Some(&Value::from(0i64)));
    }

    #[test]
    fn resolve_all_isolates_failures() {
        let library = ComponentLibrary::builder()
            .register(ComponentDef::new("Good"))
            .register(ComponentDef::new("Bad").with_prototype("Missing"))
            .build();
        let results = resolver(&library).resolve_all();
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(BenderError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn watches_stay_inert_when_activation_is_off() {
        let def = ComponentDef::new("Hello")
            .with_property("name", "Ada")
            .with_view(view_with(|tree, root| {
                let text = tree.create_named("greeting", Element::text("Hi {name}"));
                tree.insert_child(root, text).unwrap();
            }));
        let library = ComponentLibrary::builder().register(def).build();
        let config = ResolverConfig {
            activate_watches: false,
            ..ResolverConfig::default()
        };
        let mut component = Resolver::new(&library, config)
            .resolve("Hello", &Site::new())
            .unwrap();
        assert_eq!(outline(component.view()), "view owner\n  text:greeting \"Hi {name}\"\n");

        component.set_property("name", "Bob").unwrap();
        assert_eq!(outline(component.view()), "view owner\n  text:greeting \"Hi Bob\"\n");
    }
}

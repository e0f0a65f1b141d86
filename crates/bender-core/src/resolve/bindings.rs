//! Watch binding
//!
//! Declared watches are bound first, inherited ones before the component's
//! own. Text nodes and element attribute values that contain `{property}`
//! placeholders then become template watches, unless a declared watch
//! already writes the same target.

use crate::component::ComponentDef;
use crate::error::{BenderError, BenderResult};
use crate::tree::{Element, NodeId, QName, Tree};
use crate::value::Value;
use crate::watch::{BoundTarget, Expr, TargetPath, Template, Watch, WatchOrigin};
use indexmap::IndexMap;
use tracing::debug;

use super::view::root_of;

/// Bind every watch of a component against its resolved view
pub(super) fn bind(
    chain: &[&ComponentDef],
    properties: &IndexMap<String, Value>,
    view: &Tree,
    bind_templates: bool,
) -> BenderResult<Vec<Watch>> {
    let component = chain.first().map(|def| def.name()).unwrap_or_default();
    let binder = Binder {
        component,
        properties,
        view,
    };

    let mut watches = Vec::new();
    for def in chain.iter().rev() {
        for declared in def.watches() {
            let target = binder.target(&declared.target)?;
            watches.push(binder.watch(
                declared.name.clone(),
                declared.value.clone(),
                declared.target.clone(),
                target,
                WatchOrigin::Declared(def.name().to_string()),
            )?);
        }
    }
    if bind_templates {
        binder.templates(&mut watches)?;
    }
    Ok(watches)
}

struct Binder<'a> {
    component: &'a str,
    properties: &'a IndexMap<String, Value>,
    view: &'a Tree,
}

impl Binder<'_> {
    fn watch(
        &self,
        name: Option<String>,
        expr: Expr,
        path: TargetPath,
        target: BoundTarget,
        origin: WatchOrigin,
    ) -> BenderResult<Watch> {
        let dependencies = expr.dependencies();
        if let Some(unknown) = dependencies
            .iter()
            .find(|dep| !self.properties.contains_key(dep.as_str()))
        {
            return Err(BenderError::UnknownProperty {
                component: self.component.to_string(),
                property: unknown.clone(),
            });
        }
        Ok(Watch {
            name,
            expr,
            dependencies,
            path,
            target,
            origin,
        })
    }

    fn unresolved(&self, path: &TargetPath, reason: impl Into<String>) -> BenderError {
        BenderError::UnresolvedTarget {
            component: self.component.to_string(),
            target: path.to_string(),
            reason: reason.into(),
        }
    }

    fn target(&self, path: &TargetPath) -> BenderResult<BoundTarget> {
        let root = root_of(self.view)?;
        let named = |node: &str| -> BenderResult<NodeId> {
            self.view
                .find_named(root, node)?
                .ok_or_else(|| self.unresolved(path, format!("no node named `{node}` in the view")))
        };
        match path {
            TargetPath::Property(name) => {
                if self.properties.contains_key(name) {
                    Ok(BoundTarget::Property(name.clone()))
                } else {
                    Err(self.unresolved(path, "property is not declared"))
                }
            }
            TargetPath::Node(node) => {
                let id = named(node)?;
                match self.view.element(id)? {
                    Element::Text(_) => Ok(BoundTarget::Text(id)),
                    Element::Attribute(_) => Ok(BoundTarget::Attribute(id)),
                    other => Err(self.unresolved(
                        path,
                        format!("`{node}` is {}, expected text or attribute", other.kind_name()),
                    )),
                }
            }
            TargetPath::DomAttribute { node, attribute } => {
                let id = named(node)?;
                match self.view.element(id)? {
                    Element::Dom(_) => Ok(BoundTarget::DomAttribute {
                        node: id,
                        attribute: attribute.clone(),
                    }),
                    other => Err(self.unresolved(
                        path,
                        format!("`{node}` is {}, expected element", other.kind_name()),
                    )),
                }
            }
        }
    }

    /// A usable template: parses, has a placeholder, reads declared properties only
    fn template(&self, text: &str) -> Option<Template> {
        if !text.contains('{') {
            return None;
        }
        match Template::parse(text) {
            Ok(template) if template.is_dynamic() => {
                let unknown = template
                    .properties()
                    .find(|name| !self.properties.contains_key(*name))
                    .map(str::to_string);
                match unknown {
                    Some(unknown) => {
                        debug!(component = self.component, text, property = %unknown, "template reads an undeclared property, keeping it literal");
                        None
                    }
                    None => Some(template),
                }
            }
            Ok(_) => None,
            Err(err) => {
                debug!(component = self.component, text, error = %err, "not a template, keeping it literal");
                None
            }
        }
    }

    fn templates(&self, watches: &mut Vec<Watch>) -> BenderResult<()> {
        let root = root_of(self.view)?;
        let mut found = Vec::new();
        for id in self.view.descendants(root)? {
            let label = match self.view.name(id)? {
                Some(name) => name.to_string(),
                None => id.to_string(),
            };
            match self.view.element(id)? {
                Element::Text(text) => {
                    if let Some(template) = self.template(&text.text) {
                        found.push((template, TargetPath::Node(label), BoundTarget::Text(id)));
                    }
                }
                Element::Dom(dom) => {
                    for (attribute, value) in &dom.attributes {
                        if let Some(template) = self.template(value) {
                            found.push((
                                template,
                                dom_path(&label, attribute),
                                BoundTarget::DomAttribute {
                                    node: id,
                                    attribute: attribute.clone(),
                                },
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
        for (template, path, target) in found {
            if watches.iter().any(|watch| watch.target == target) {
                continue;
            }
            let watch = self.watch(None, Expr::Template(template), path, target, WatchOrigin::Template)?;
            watches.push(watch);
        }
        Ok(())
    }
}

fn dom_path(node: &str, attribute: &QName) -> TargetPath {
    TargetPath::DomAttribute {
        node: node.to_string(),
        attribute: attribute.clone(),
    }
}

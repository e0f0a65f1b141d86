//! Change propagation
//!
//! A property write re-runs only the watches downstream of that property.
//! Watches run against a staged copy of the properties and collect their node
//! writes in a pending overlay; the view and the property map are updated only
//! when every watch succeeded.

use super::{BindingPlan, BoundTarget, TargetPath, Watch};
use crate::error::{BenderError, BenderResult};
use crate::tree::{Element, Tree};
use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;
use tracing::trace;

/// Result of writing one value somewhere
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The stored value changed; `previous` is what was there before
    /// (`Null` for an attribute that did not exist)
    Changed {
        /// Value before the write
        previous: Value,
    },
    /// The value written equals the stored one
    Unchanged,
}

impl WriteOutcome {
    /// True for [`WriteOutcome::Changed`]
    pub fn is_changed(&self) -> bool {
        matches!(self, WriteOutcome::Changed { .. })
    }
}

/// One watch output applied to its target
#[derive(Debug, Clone, PartialEq)]
pub struct TargetWrite {
    /// Index of the watch in the component's watch list
    pub watch: usize,
    /// Target as declared
    pub target: TargetPath,
    /// Value the watch produced
    pub value: Value,
    /// Whether the target changed
    pub outcome: WriteOutcome,
}

/// What a single property write did
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    /// Property written by the caller
    pub property: String,
    /// Outcome for that property
    pub outcome: WriteOutcome,
    /// Watches that were evaluated, in evaluation order
    pub evaluated: Vec<usize>,
    /// Every target write, in evaluation order
    pub writes: Vec<TargetWrite>,
}

impl UpdateReport {
    /// Targets whose value actually changed
    pub fn changed(&self) -> impl Iterator<Item = &TargetWrite> {
        self.writes.iter().filter(|write| write.outcome.is_changed())
    }
}

/// Mutable state a watch run works on
pub(crate) struct BindingState<'a> {
    pub component: &'a str,
    pub watches: &'a [Watch],
    pub plan: &'a BindingPlan,
    pub properties: &'a mut IndexMap<String, Value>,
    pub view: &'a mut Tree,
}

/// Property values and node texts written so far in one run; the view is only
/// read until commit
struct Stage<'v> {
    view: &'v Tree,
    properties: IndexMap<String, Value>,
    nodes: IndexMap<BoundTarget, String>,
    writes: Vec<TargetWrite>,
}

struct Staged {
    properties: IndexMap<String, Value>,
    nodes: IndexMap<BoundTarget, String>,
    writes: Vec<TargetWrite>,
}

impl<'v> Stage<'v> {
    fn new(view: &'v Tree, properties: IndexMap<String, Value>) -> Self {
        Self {
            view,
            properties,
            nodes: IndexMap::new(),
            writes: Vec::new(),
        }
    }

    fn run(&mut self, index: usize, watch: &Watch) -> BenderResult<bool> {
        let value = watch.expr.evaluate(&self.properties)?;
        let outcome = match &watch.target {
            BoundTarget::Property(name) => {
                let previous = self.properties.get(name).cloned().unwrap_or_default();
                if previous == value {
                    WriteOutcome::Unchanged
                } else {
                    self.properties.insert(name.clone(), value.clone());
                    WriteOutcome::Changed { previous }
                }
            }
            target => self.write_node(target, value.to_string())?,
        };
        trace!(watch = %watch.label(index), target = %watch.path, %value, changed = outcome.is_changed(), "watch write");
        let property_changed = watch.target.property().is_some() && outcome.is_changed();
        self.writes.push(TargetWrite {
            watch: index,
            target: watch.path.clone(),
            value,
            outcome,
        });
        Ok(property_changed)
    }

    fn write_node(&mut self, target: &BoundTarget, text: String) -> BenderResult<WriteOutcome> {
        let previous = match self.nodes.get(target) {
            Some(pending) => Some(pending.clone()),
            None => read_node(self.view, target)?,
        };
        if previous.as_deref() == Some(text.as_str()) {
            return Ok(WriteOutcome::Unchanged);
        }
        self.nodes.insert(target.clone(), text);
        Ok(WriteOutcome::Changed {
            previous: previous.map(Value::String).unwrap_or_default(),
        })
    }

    fn finish(self) -> Staged {
        Staged {
            properties: self.properties,
            nodes: self.nodes,
            writes: self.writes,
        }
    }
}

impl BindingState<'_> {
    /// Apply staged node texts, then swap in the staged properties
    ///
    /// Every node target was read (and its kind checked) while staging, so
    /// applying cannot fail halfway on a kind mismatch.
    fn commit(self, staged: Staged) -> BenderResult<Vec<TargetWrite>> {
        for (target, text) in &staged.nodes {
            apply_node(self.view, target, text)?;
        }
        *self.properties = staged.properties;
        Ok(staged.writes)
    }

    /// Run every watch once in plan order
    pub fn activate(self) -> BenderResult<Vec<TargetWrite>> {
        let mut stage = Stage::new(&*self.view, self.properties.clone());
        for &index in self.plan.order() {
            stage.run(index, &self.watches[index])?;
        }
        let staged = stage.finish();
        self.commit(staged)
    }

    /// Write `property` and re-run the watches that depend on it
    pub fn set_property(self, property: &str, value: Value) -> BenderResult<UpdateReport> {
        let Some(current) = self.properties.get(property) else {
            return Err(BenderError::UnknownProperty {
                component: self.component.to_string(),
                property: property.to_string(),
            });
        };
        if *current == value {
            return Ok(UpdateReport {
                property: property.to_string(),
                outcome: WriteOutcome::Unchanged,
                evaluated: Vec::new(),
                writes: Vec::new(),
            });
        }

        let mut stage = Stage::new(&*self.view, self.properties.clone());
        let previous = stage
            .properties
            .insert(property.to_string(), value)
            .unwrap_or_default();

        let mut dirty: IndexSet<&str> = IndexSet::new();
        dirty.insert(property);
        let mut evaluated = Vec::new();
        for index in self.candidates(property) {
            let watch = &self.watches[index];
            if !watch.dependencies.iter().any(|dep| dirty.contains(dep.as_str())) {
                continue;
            }
            evaluated.push(index);
            if stage.run(index, watch)? {
                if let Some(written) = watch.target.property() {
                    dirty.insert(written);
                }
            }
        }
        let staged = stage.finish();

        let component = self.component;
        let writes = self.commit(staged)?;
        trace!(component, property, evaluated = evaluated.len(), "property updated");
        Ok(UpdateReport {
            property: property.to_string(),
            outcome: WriteOutcome::Changed { previous },
            evaluated,
            writes,
        })
    }

    /// Watches reachable from `property`, keyed by plan position
    fn candidates(&self, property: &str) -> impl Iterator<Item = usize> {
        let mut found: BTreeMap<usize, usize> = BTreeMap::new();
        let mut pending: Vec<&str> = vec![property];
        let mut seen: IndexSet<&str> = IndexSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            for &index in self.plan.readers(current) {
                let slot = self.plan.position(index).unwrap_or(index);
                if found.insert(slot, index).is_none() {
                    if let Some(written) = self.watches[index].target.property() {
                        pending.push(written);
                    }
                }
            }
        }
        found.into_values()
    }
}

fn apply_node(view: &mut Tree, target: &BoundTarget, text: &str) -> BenderResult<()> {
    match target {
        BoundTarget::Text(id) => {
            if let Element::Text(node) = view.element_mut(*id)? {
                node.text = text.to_string();
            }
        }
        BoundTarget::Attribute(id) => view.set_attribute_value(*id, text)?,
        BoundTarget::DomAttribute { node, attribute } => {
            if let Element::Dom(dom) = view.element_mut(*node)? {
                dom.attributes.insert(attribute.clone(), text.to_string());
            }
        }
        BoundTarget::Property(_) => {}
    }
    Ok(())
}

/// Current string at a node target; `None` for a missing DOM attribute
fn read_node(view: &Tree, target: &BoundTarget) -> BenderResult<Option<String>> {
    let mismatch = |id, expected: &str, found: &Element| {
        BenderError::invalid_tree(
            view.describe(id),
            format!("expected {expected}, found {}", found.kind_name()),
        )
    };
    match target {
        BoundTarget::Text(id) => match view.element(*id)? {
            Element::Text(node) => Ok(Some(node.text.clone())),
            other => Err(mismatch(*id, "text", other)),
        },
        BoundTarget::Attribute(id) => view.attribute_value(*id).map(Some),
        BoundTarget::DomAttribute { node, attribute } => match view.element(*node)? {
            Element::Dom(dom) => Ok(dom.attributes.get(attribute).cloned()),
            other => Err(mismatch(*node, "element", other)),
        },
        BoundTarget::Property(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::QName;
    use crate::watch::{Expr, WatchOrigin};

    struct Fixture {
        watches: Vec<Watch>,
        plan: BindingPlan,
        properties: IndexMap<String, Value>,
        view: Tree,
    }

    impl Fixture {
        fn state(&mut self) -> BindingState<'_> {
            BindingState {
                component: "Test",
                watches: &self.watches,
                plan: &self.plan,
                properties: &mut self.properties,
                view: &mut self.view,
            }
        }
    }

    fn bound(expr: Expr, path: TargetPath, target: BoundTarget) -> Watch {
        Watch {
            name: None,
            dependencies: expr.dependencies(),
            expr,
            path,
            target,
            origin: WatchOrigin::Declared("Test".to_string()),
        }
    }

    fn property_watch(expr: Expr, writes: &str) -> Watch {
        bound(
            expr,
            TargetPath::Property(writes.to_string()),
            BoundTarget::Property(writes.to_string()),
        )
    }

    /// `label` text shows `{x}`, `box@title` shows `y`, `doubled` = x + x
    fn fixture() -> Fixture {
        let mut view = Tree::with_root(Element::view());
        let root = view.root().unwrap();
        let label = view.create_named("label", Element::text(""));
        let boxed = view.create_named("box", Element::dom("div"));
        view.insert_child(root, label).unwrap();
        view.insert_child(root, boxed).unwrap();

        let watches = vec![
            bound(
                Expr::template("x is {x}").unwrap(),
                TargetPath::Node("label".to_string()),
                BoundTarget::Text(label),
            ),
            bound(
                Expr::property("y"),
                "box@title".parse().unwrap(),
                BoundTarget::DomAttribute {
                    node: boxed,
                    attribute: QName::local("title"),
                },
            ),
            property_watch(Expr::Sum(vec![Expr::property("x"), Expr::property("x")]), "doubled"),
        ];
        let plan = BindingPlan::build("Test", &watches).unwrap();
        let properties = [("x", 1i64), ("y", 2), ("doubled", 0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect();
        Fixture {
            watches,
            plan,
            properties,
            view,
        }
    }

    fn text_of(tree: &Tree, name: &str) -> String {
        let id = tree.find_named(tree.root().unwrap(), name).unwrap().unwrap();
        match tree.element(id).unwrap() {
            Element::Text(text) => text.text.clone(),
            other => panic!("not text: {other:?}"),
        }
    }

    #[test]
    fn activation_runs_everything_once() {
        let mut fx = fixture();
        let writes = fx.state().activate().unwrap();
        assert_eq!(writes.len(), 3);
        assert_eq!(text_of(&fx.view, "label"), "x is 1");
        assert_eq!(fx.properties["doubled"], Value::Number(2.0));
        let boxed = fx.view.find_named(fx.view.root().unwrap(), "box").unwrap().unwrap();
        match fx.view.element(boxed).unwrap() {
            Element::Dom(dom) => assert_eq!(dom.attributes[&QName::local("title")], "2"),
            other => panic!("not an element: {other:?}"),
        }
        // title did not exist before
        assert_eq!(
            writes[1].outcome,
            WriteOutcome::Changed {
                previous: Value::Null
            }
        );
    }

    #[test]
    fn only_dependent_watches_run() {
        let mut fx = fixture();
        fx.state().activate().unwrap();
        let report = fx.state().set_property("x", Value::from(5i64)).unwrap();
        assert_eq!(report.evaluated, vec![0, 2]);
        assert_eq!(
            report.outcome,
            WriteOutcome::Changed {
                previous: Value::from(1i64)
            }
        );
        assert_eq!(text_of(&fx.view, "label"), "x is 5");
        assert_eq!(fx.properties["doubled"], Value::Number(10.0));
    }

    #[test]
    fn equal_write_is_unchanged_and_runs_nothing() {
        let mut fx = fixture();
        let report = fx.state().set_property("y", Value::from(2i64)).unwrap();
        assert_eq!(report.outcome, WriteOutcome::Unchanged);
        assert!(report.evaluated.is_empty());
        assert!(report.writes.is_empty());
    }

    #[test]
    fn undeclared_property_is_rejected() {
        let mut fx = fixture();
        let err = fx.state().set_property("nope", Value::Null).unwrap_err();
        assert!(matches!(err, BenderError::UnknownProperty { .. }));
    }

    #[test]
    fn chained_watches_stop_when_an_intermediate_value_is_unchanged() {
        let watches = vec![
            property_watch(
                Expr::Equals(Box::new(Expr::property("n")), Box::new(Expr::literal(0i64))),
                "empty",
            ),
            property_watch(Expr::Not(Box::new(Expr::property("empty"))), "full"),
        ];
        let plan = BindingPlan::build("Test", &watches).unwrap();
        let properties = [
            ("n", Value::from(1i64)),
            ("empty", Value::Bool(false)),
            ("full", Value::Bool(true)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let mut fx = Fixture {
            watches,
            plan,
            properties,
            view: Tree::with_root(Element::view()),
        };

        let report = fx.state().set_property("n", Value::from(2i64)).unwrap();
        assert_eq!(report.evaluated, vec![0]);
        assert_eq!(report.writes[0].outcome, WriteOutcome::Unchanged);

        let report = fx.state().set_property("n", Value::from(0i64)).unwrap();
        assert_eq!(report.evaluated, vec![0, 1]);
        assert_eq!(fx.properties["full"], Value::Bool(false));
    }

    #[test]
    fn repeated_nan_write_is_unchanged() {
        let mut fx = fixture();
        fx.state().activate().unwrap();
        let first = fx.state().set_property("y", Value::Number(f64::NAN)).unwrap();
        assert!(first.outcome.is_changed());
        assert_eq!(first.evaluated, vec![1]);

        let second = fx.state().set_property("y", Value::Number(f64::NAN)).unwrap();
        assert_eq!(second.outcome, WriteOutcome::Unchanged);
        assert!(second.evaluated.is_empty());
    }

    #[test]
    fn later_writes_to_one_node_see_the_pending_value() {
        let mut view = Tree::with_root(Element::view());
        let root = view.root().unwrap();
        let label = view.create_named("label", Element::text("start"));
        view.insert_child(root, label).unwrap();
        let path = TargetPath::Node("label".to_string());
        let watches = vec![
            bound(Expr::template("a={a}").unwrap(), path.clone(), BoundTarget::Text(label)),
            bound(Expr::template("b={a}").unwrap(), path, BoundTarget::Text(label)),
        ];
        let plan = BindingPlan::build("Test", &watches).unwrap();
        let mut fx = Fixture {
            watches,
            plan,
            properties: [("a".to_string(), Value::from(1i64))].into_iter().collect(),
            view,
        };

        let writes = fx.state().activate().unwrap();
        assert_eq!(
            writes[1].outcome,
            WriteOutcome::Changed {
                previous: Value::from("a=1")
            }
        );
        assert_eq!(text_of(&fx.view, "label"), "b=1");
    }

    #[test]
    fn failed_evaluation_leaves_state_untouched() {
        let mut fx = fixture();
        fx.state().activate().unwrap();
        let before = fx.properties.clone();
        let err = fx.state().set_property("x", Value::from("oops")).unwrap_err();
        assert!(matches!(err, BenderError::Evaluation(_)));
        assert_eq!(fx.properties, before);
        assert_eq!(text_of(&fx.view, "label"), "x is 1");
    }
}

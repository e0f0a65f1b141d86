//! Property merge: root-most prototype first, site overrides last

use crate::component::ComponentDef;
use crate::error::{BenderError, BenderResult};
use crate::value::Value;
use indexmap::IndexMap;
use tracing::warn;

pub(super) fn merge(
    chain: &[&ComponentDef],
    overrides: &IndexMap<String, Value>,
    strict: bool,
) -> BenderResult<IndexMap<String, Value>> {
    let component = chain.first().map(|def| def.name()).unwrap_or_default();
    let mut properties = IndexMap::new();
    for def in chain.iter().rev() {
        for (name, value) in def.properties() {
            properties.insert(name.clone(), value.clone());
        }
    }
    for (name, value) in overrides {
        if !properties.contains_key(name) {
            if strict {
                return Err(BenderError::UndeclaredProperty {
                    component: component.to_string(),
                    property: name.clone(),
                });
            }
            warn!(component, property = %name, "accepting undeclared site property");
        }
        properties.insert(name.clone(), value.clone());
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn site(pairs: &[(&str, i64)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn descendant_then_site_wins() {
        let parent = ComponentDef::new("P").with_property("x", 1i64);
        let child = ComponentDef::new("C")
            .with_prototype("P")
            .with_property("x", 2i64)
            .with_property("y", 3i64);
        let merged = merge(&[&child, &parent], &site(&[("y", 4)]), true).unwrap();
        assert_eq!(merged, site(&[("x", 2), ("y", 4)]));
    }

    #[test]
    fn inherited_keys_come_first() {
        let parent = ComponentDef::new("P").with_property("a", 1i64);
        let child = ComponentDef::new("C").with_property("b", 2i64).with_property("a", 3i64);
        let merged = merge(&[&child, &parent], &IndexMap::new(), true).unwrap();
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn strict_rejects_undeclared_site_keys() {
        let def = ComponentDef::new("C").with_property("x", 1i64);
        let err = merge(&[&def], &site(&[("z", 9)]), true).unwrap_err();
        assert_eq!(
            err,
            BenderError::UndeclaredProperty {
                component: "C".to_string(),
                property: "z".to_string(),
            }
        );
    }

    #[test]
    #[traced_test]
    fn lenient_accepts_and_warns() {
        let def = ComponentDef::new("C").with_property("x", 1i64);
        let merged = merge(&[&def], &site(&[("z", 9)]), false).unwrap();
        assert_eq!(merged["z"], Value::from(9i64));
        assert!(logs_contain("accepting undeclared site property"));
    }
}

//! Prototype chain walk

use crate::component::{ComponentDef, Registry};
use crate::error::{BenderError, BenderResult};
use indexmap::IndexSet;

/// Definitions from `name` up to its root-most prototype, `name` first
pub(super) fn walk<'r, R: Registry>(
    registry: &'r R,
    name: &str,
    referenced_by: &str,
    max_depth: usize,
) -> BenderResult<Vec<&'r ComponentDef>> {
    let mut chain = Vec::new();
    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut current = name;
    let mut referrer = referenced_by;
    loop {
        if visited.contains(current) {
            let mut links: Vec<&str> = visited.iter().copied().collect();
            links.push(current);
            return Err(BenderError::CyclicPrototype {
                component: name.to_string(),
                chain: links.join(" -> "),
            });
        }
        if chain.len() == max_depth {
            return Err(BenderError::PrototypeTooDeep {
                component: name.to_string(),
                max: max_depth,
            });
        }
        let def = registry
            .get(current)
            .ok_or_else(|| BenderError::UnknownComponent {
                name: current.to_string(),
                referenced_by: referrer.to_string(),
            })?;
        visited.insert(def.name());
        chain.push(def);
        match def.prototype() {
            Some(prototype) => {
                referrer = def.name();
                current = prototype;
            }
            None => return Ok(chain),
        }
    }
}

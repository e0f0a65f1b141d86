//! Binding dependency graph
//!
//! Properties and watches form a bipartite graph: a watch reads its
//! dependencies and writes at most one property. The graph is checked for
//! cycles before any watch runs and then flattened into a [`BindingPlan`].

use super::Watch;
use crate::error::{BenderError, BenderResult};
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Evaluation order and reverse dependency index of a component's watches
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingPlan {
    order: Vec<usize>,
    position: Vec<usize>,
    readers: IndexMap<String, Vec<usize>>,
}

impl BindingPlan {
    /// Build the plan, rejecting dependency cycles
    pub fn build(component: &str, watches: &[Watch]) -> BenderResult<Self> {
        let mut readers: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (index, watch) in watches.iter().enumerate() {
            for dependency in &watch.dependencies {
                readers.entry(dependency.clone()).or_default().push(index);
            }
        }

        let graph = Graph {
            watches,
            readers: &readers,
        };
        if let Some(cycle) = graph.find_cycle() {
            return Err(BenderError::CyclicBinding {
                component: component.to_string(),
                cycle: graph.describe_cycle(&cycle),
            });
        }

        let order = graph.topological_order();
        let mut position = vec![0; watches.len()];
        for (slot, &watch) in order.iter().enumerate() {
            position[watch] = slot;
        }
        Ok(Self {
            order,
            position,
            readers,
        })
    }

    /// Watch indices in evaluation order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Slot of a watch in [`order`](Self::order)
    pub fn position(&self, watch: usize) -> Option<usize> {
        self.position.get(watch).copied()
    }

    /// Watches reading `property`, in declaration order
    pub fn readers(&self, property: &str) -> &[usize] {
        self.readers.get(property).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Graph<'a> {
    watches: &'a [Watch],
    readers: &'a IndexMap<String, Vec<usize>>,
}

impl Graph<'_> {
    fn successors(&self, watch: usize) -> &[usize] {
        self.watches[watch]
            .target
            .property()
            .and_then(|property| self.readers.get(property))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Watches along the first cycle found, in edge order
    fn find_cycle(&self) -> Option<Vec<usize>> {
        let mut marks = vec![Mark::Unvisited; self.watches.len()];
        let mut path = Vec::new();
        for start in 0..self.watches.len() {
            if marks[start] == Mark::Unvisited {
                if let Some(cycle) = self.visit(start, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit(&self, watch: usize, marks: &mut [Mark], path: &mut Vec<usize>) -> Option<Vec<usize>> {
        marks[watch] = Mark::InProgress;
        path.push(watch);
        for &next in self.successors(watch) {
            match marks[next] {
                Mark::InProgress => {
                    let start = path.iter().position(|&w| w == next)?;
                    return Some(path[start..].to_vec());
                }
                Mark::Unvisited => {
                    if let Some(cycle) = self.visit(next, marks, path) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }
        path.pop();
        marks[watch] = Mark::Done;
        None
    }

    /// `y -> watch#0 -> x -> watch#1 -> y`
    fn describe_cycle(&self, cycle: &[usize]) -> String {
        let written = |watch: usize| {
            self.watches[watch]
                .target
                .property()
                .unwrap_or_default()
                .to_string()
        };
        let mut parts = Vec::with_capacity(cycle.len() * 2 + 1);
        if let Some(&last) = cycle.last() {
            parts.push(written(last));
        }
        for &watch in cycle {
            parts.push(self.watches[watch].label(watch));
            parts.push(written(watch));
        }
        parts.join(" -> ")
    }

    /// Kahn's algorithm; among ready watches the earliest declared goes first
    fn topological_order(&self) -> Vec<usize> {
        let mut incoming = vec![0usize; self.watches.len()];
        for watch in 0..self.watches.len() {
            for &next in self.successors(watch) {
                incoming[next] += 1;
            }
        }
        let mut ready: BinaryHeap<Reverse<usize>> = incoming
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count == 0)
            .map(|(watch, _)| Reverse(watch))
            .collect();
        let mut order = Vec::with_capacity(self.watches.len());
        while let Some(Reverse(watch)) = ready.pop() {
            order.push(watch);
            for &next in self.successors(watch) {
                incoming[next] -= 1;
                if incoming[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        order
    }
}

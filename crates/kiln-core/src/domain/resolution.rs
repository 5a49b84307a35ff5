//! Dependency ordering for generation units.
//!
//! Depth-first traversal with memoization. Every node carries an explicit
//! [`Mark`]; reaching a node that is still `InProgress` means the walk has
//! come back around to one of its own ancestors, which is a cycle. The walk
//! therefore terminates on every input, cyclic or not.
//!
//! Roots are visited in registration order and dependencies in declaration
//! order, so the result is a deterministic function of the input.

use std::collections::HashMap;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Dependency graph keyed by unit name.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    order: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its declared dependencies.
    ///
    /// Re-adding a name replaces its edges but keeps its original position.
    pub fn add(&mut self, name: impl Into<String>, dependencies: &[String]) {
        let name = name.into();
        if !self.edges.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.edges.insert(name, dependencies.to_vec());
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Compute an order in which every node appears after all of its
    /// dependencies.
    ///
    /// # Errors
    /// - `UnknownDependency`: a node names a dependency that was never added.
    /// - `CyclicDependency`: the graph has a cycle; the error carries the
    ///   cycle path with the repeated node at both ends.
    pub fn topological_order(&self) -> Result<Vec<String>, DomainError> {
        let mut marks: HashMap<&str, Mark> = self
            .order
            .iter()
            .map(|name| (name.as_str(), Mark::Unvisited))
            .collect();
        let mut stack: Vec<&str> = Vec::new();
        let mut out = Vec::with_capacity(self.order.len());

        for name in &self.order {
            self.visit(name, &mut marks, &mut stack, &mut out)?;
        }

        Ok(out)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
        out: &mut Vec<String>,
    ) -> Result<(), DomainError> {
        match marks.get(name).copied().unwrap_or(Mark::Unvisited) {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|n| (*n).to_string()).collect();
                cycle.push(name.to_string());
                return Err(DomainError::CyclicDependency { cycle });
            }
            Mark::Unvisited => {}
        }

        marks.insert(name, Mark::InProgress);
        stack.push(name);

        let dependencies = self.edges.get(name).map(Vec::as_slice).unwrap_or(&[]);
        for dependency in dependencies {
            if !self.edges.contains_key(dependency) {
                return Err(DomainError::UnknownDependency {
                    unit: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
            self.visit(dependency, marks, stack, out)?;
        }

        stack.pop();
        marks.insert(name, Mark::Done);
        out.push(name.to_string());
        Ok(())
    }
}

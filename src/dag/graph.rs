// src/dag/graph.rs

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::ConfigurationError;
use crate::tasks::{TaskAction, TaskDef};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Clone)]
struct TaskNode {
    /// Direct dependencies: tasks that must succeed before this one can run.
    deps: Vec<String>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<String>,
    action: Option<Arc<dyn TaskAction>>,
}

/// Validated task graph keyed by task name.
///
/// Construction rejects unknown prerequisites and cycles (a task listing
/// itself counts as a cycle), so every instance is a DAG.
#[derive(Clone)]
pub struct TaskGraph {
    nodes: HashMap<String, TaskNode>,
    /// Registration order, used for listing.
    order: Vec<String>,
}

impl fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in &self.order {
            map.entry(name, &self.dependencies_of(name));
        }
        map.finish()
    }
}

impl TaskGraph {
    pub fn new(defs: Vec<TaskDef>) -> Result<Self, ConfigurationError> {
        let mut nodes: HashMap<String, TaskNode> = HashMap::new();
        let mut order = Vec::with_capacity(defs.len());

        for def in defs {
            if nodes.contains_key(&def.name) {
                return Err(ConfigurationError::Invalid(format!(
                    "task '{}' registered twice",
                    def.name
                )));
            }
            order.push(def.name.clone());
            nodes.insert(
                def.name,
                TaskNode {
                    deps: def.deps,
                    dependents: Vec::new(),
                    action: def.action,
                },
            );
        }

        for name in &order {
            for dep in &nodes[name].deps {
                if dep == name {
                    return Err(ConfigurationError::DependencyCycle(name.clone()));
                }
                if !nodes.contains_key(dep) {
                    return Err(ConfigurationError::UnknownDependency {
                        task: name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        validate_acyclic(&nodes, &order)?;

        // Populate dependents based on deps.
        for name in &order {
            let deps = nodes[name].deps.clone();
            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        Ok(Self { nodes, order })
    }

    /// All task names in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate prerequisites of a task.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// The task's build action; `None` for aggregates and unknown names.
    pub fn action_of(&self, name: &str) -> Option<Arc<dyn TaskAction>> {
        self.nodes.get(name).and_then(|n| n.action.clone())
    }

    /// `target` and all of its transitive prerequisites.
    pub fn closure(&self, target: &str) -> Result<HashSet<String>, ConfigurationError> {
        Ok(self.resolve(target)?.into_iter().collect())
    }

    /// Topological order of `target`'s closure: every task appears after all
    /// of its prerequisites, `target` last. Prerequisites are visited in
    /// declaration order, so the result is deterministic.
    pub fn resolve(&self, target: &str) -> Result<Vec<String>, ConfigurationError> {
        if !self.contains(target) {
            return Err(ConfigurationError::UnknownTask(target.to_string()));
        }

        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.visit(target, &mut visited, &mut out);
        Ok(out)
    }

    fn visit(&self, name: &str, visited: &mut HashSet<String>, out: &mut Vec<String>) {
        if !visited.insert(name.to_string()) {
            return;
        }
        for dep in self.dependencies_of(name) {
            self.visit(dep, visited, out);
        }
        out.push(name.to_string());
    }
}

fn validate_acyclic(
    nodes: &HashMap<String, TaskNode>,
    order: &[String],
) -> Result<(), ConfigurationError> {
    // Edge direction: dep -> task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in order {
        graph.add_node(name.as_str());
    }
    for name in order {
        for dep in &nodes[name].deps {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(ConfigurationError::DependencyCycle(
            cycle.node_id().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{self, standard_tasks};

    fn agg(name: &str, deps: &[&str]) -> TaskDef {
        TaskDef::aggregate(name, deps)
    }

    #[test]
    fn styles_resolves_after_vendor_copy() {
        let graph = TaskGraph::new(standard_tasks()).unwrap();
        assert_eq!(
            graph.resolve(tasks::STYLES).unwrap(),
            vec![tasks::LESSIFY_VENDOR, tasks::STYLES]
        );
    }

    #[test]
    fn default_resolves_every_task_once() {
        let graph = TaskGraph::new(standard_tasks()).unwrap();
        let order = graph.resolve(tasks::DEFAULT).unwrap();
        assert_eq!(
            order,
            vec![
                tasks::SCRIPTS,
                tasks::LESSIFY_VENDOR,
                tasks::STYLES,
                tasks::FONTS,
                tasks::DEFAULT
            ]
        );
        assert!(graph.action_of(tasks::DEFAULT).is_none());
        assert!(graph.action_of(tasks::FONTS).is_some());
    }

    #[test]
    fn unknown_target_is_rejected() {
        let graph = TaskGraph::new(standard_tasks()).unwrap();
        assert_eq!(
            graph.resolve("deploy").unwrap_err(),
            ConfigurationError::UnknownTask("deploy".into())
        );
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let err = TaskGraph::new(vec![agg("a", &["missing"])]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownDependency {
                task: "a".into(),
                dependency: "missing".into()
            }
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let err = TaskGraph::new(vec![agg("a", &["a"])]).unwrap_err();
        assert_eq!(err, ConfigurationError::DependencyCycle("a".into()));
    }

    #[test]
    fn three_node_cycle_is_rejected() {
        let err = TaskGraph::new(vec![
            agg("a", &["c"]),
            agg("b", &["a"]),
            agg("c", &["b"]),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DependencyCycle(_)));
    }

    #[test]
    fn dependents_are_tracked() {
        let graph = TaskGraph::new(standard_tasks()).unwrap();
        assert_eq!(graph.dependents_of(tasks::LESSIFY_VENDOR), [tasks::STYLES]);
        assert_eq!(graph.dependents_of(tasks::SCRIPTS), [tasks::DEFAULT]);
    }
}

//! Step graph construction and reachability using BFS.
//!
//! Nodes are the factory root, each step, and each constructed target.
//! Edges follow method returns:
//!
//! ```text
//!   Root ──WithA──▶ Step(0) ──WithB──▶ Step(1) ──CreateTarget──▶ Target(ctor#0)
//! ```
//!
//! The factory uses [`StepGraph::live_steps`] to drop steps that no
//! surviving method leads to; the CLI renders the graph as DOT.

use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeSet, VecDeque};

use crate::model::{FluentFactoryCompilationUnit, FluentMethod, FluentReturn, StepId};
use crate::symbols::ConstructorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphNode {
    Root,
    Step(StepId),
    Target(ConstructorId),
}

#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    graph: DiGraphMap<GraphNode, ()>,
}

impl StepGraph {
    /// Build from root methods and a step lookup.
    ///
    /// `step_methods` returns the methods of a step and, for existing-type
    /// steps, the constructor produced on arrival.
    pub fn build<'a, F>(root_methods: &'a [FluentMethod], step_methods: F) -> Self
    where
        F: Fn(StepId) -> Option<(&'a [FluentMethod], Option<ConstructorId>)>,
    {
        let mut g = DiGraphMap::new();
        g.add_node(GraphNode::Root);

        let mut queue: VecDeque<(GraphNode, &'a [FluentMethod])> = VecDeque::new();
        let mut seen: BTreeSet<StepId> = BTreeSet::new();
        queue.push_back((GraphNode::Root, root_methods));

        while let Some((from, methods)) = queue.pop_front() {
            for method in methods {
                match method.fluent_return() {
                    FluentReturn::Target(t) => {
                        g.add_edge(from, GraphNode::Target(t.constructor), ());
                    }
                    FluentReturn::Step { step } => {
                        let to = GraphNode::Step(step);
                        g.add_edge(from, to, ());
                        if !seen.insert(step) {
                            continue;
                        }
                        if let Some((next, arrival)) = step_methods(step) {
                            if let Some(ctor) = arrival {
                                g.add_edge(to, GraphNode::Target(ctor), ());
                            }
                            queue.push_back((to, next));
                        }
                    }
                }
            }
        }

        Self { graph: g }
    }

    /// Graph of a finished unit.
    pub fn from_unit(unit: &FluentFactoryCompilationUnit) -> Self {
        Self::build(&unit.methods, |id| {
            unit.step(id)
                .map(|s| (s.methods(), s.arrival_constructor()))
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// BFS from the root.
    pub fn reachable(&self) -> BTreeSet<GraphNode> {
        self.reachable_from(GraphNode::Root)
    }

    /// BFS from `start`; `start` itself is included.
    pub fn reachable_from(&self, start: GraphNode) -> BTreeSet<GraphNode> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            for n in self.graph.neighbors(node) {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        visited
    }

    /// Steps some method path from the root leads to.
    pub fn live_steps(&self) -> BTreeSet<StepId> {
        self.reachable()
            .into_iter()
            .filter_map(|n| match n {
                GraphNode::Step(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Constructors some method path from the root terminates in.
    pub fn reachable_constructors(&self) -> BTreeSet<ConstructorId> {
        self.constructors_from(GraphNode::Root)
    }

    /// Constructors some method path from `start` terminates in.
    pub fn constructors_from(&self, start: GraphNode) -> BTreeSet<ConstructorId> {
        self.reachable_from(start)
            .into_iter()
            .filter_map(|n| match n {
                GraphNode::Target(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Constructors reachable by calling `method`. Steps the graph was not
    /// built over reach nothing.
    pub fn method_reach(&self, method: &FluentMethod) -> BTreeSet<ConstructorId> {
        match method.fluent_return() {
            FluentReturn::Target(t) => BTreeSet::from([t.constructor]),
            FluentReturn::Step { step } => {
                let node = GraphNode::Step(step);
                if self.graph.contains_node(node) {
                    self.constructors_from(node)
                } else {
                    BTreeSet::new()
                }
            }
        }
    }

    /// Graphviz DOT rendering of a unit's step chain.
    ///
    /// - the root is lightblue
    /// - steps are lightyellow
    /// - constructed targets are lightgreen
    #[cfg(feature = "dot")]
    pub fn to_dot(&self, unit: &FluentFactoryCompilationUnit) -> String {
        let mut dot = String::with_capacity(self.node_count() * 80 + self.edge_count() * 40 + 150);
        if let Err(e) = self.write_dot(&mut dot, unit) {
            tracing::error!(error = %e, "failed to render DOT graph");
            return "digraph fluentgen {\n}\n".to_string();
        }
        dot
    }

    #[cfg(feature = "dot")]
    fn write_dot(&self, dot: &mut String, unit: &FluentFactoryCompilationUnit) -> std::fmt::Result {
        use std::fmt::Write;

        writeln!(dot, "digraph fluentgen {{")?;
        writeln!(dot, "  rankdir=LR;")?;
        writeln!(dot, "  node [shape=box, style=filled, fontname=\"JetBrains Mono\"];")?;
        writeln!(dot)?;

        for node in self.graph.nodes() {
            let color = match node {
                GraphNode::Root => "lightblue",
                GraphNode::Step(_) => "lightyellow",
                GraphNode::Target(_) => "lightgreen",
            };
            writeln!(dot, "  \"{}\" [fillcolor={}];", dot_label(node, unit), color)?;
        }

        writeln!(dot)?;

        for (from, to, _) in self.graph.all_edges() {
            writeln!(
                dot,
                "  \"{}\" -> \"{}\";",
                dot_label(from, unit),
                dot_label(to, unit)
            )?;
        }

        writeln!(dot, "}}")?;
        Ok(())
    }
}

#[cfg(feature = "dot")]
fn dot_label(node: GraphNode, unit: &FluentFactoryCompilationUnit) -> String {
    let text = match node {
        GraphNode::Root => unit.root.to_string(),
        GraphNode::Step(id) => unit
            .step(id)
            .map(|s| s.name())
            .unwrap_or_else(|| id.to_string()),
        GraphNode::Target(c) => unit
            .constructor(c)
            .map(|s| s.display.clone())
            .unwrap_or_else(|| c.to_string()),
    };
    text.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CreationMethod, MethodParameter, RegularMethod, SourceParameter, TargetTypeReturn,
    };
    use crate::symbols::{Location, TypeRef};

    fn to_step(step: usize) -> FluentMethod {
        FluentMethod::Regular(RegularMethod {
            name: format!("With{}", step),
            source_parameter: SourceParameter {
                constructor: ConstructorId(0),
                index: 0,
                name: "p".to_string(),
                ty: TypeRef::simple("i32"),
            },
            method_parameters: vec![MethodParameter {
                name: "p".to_string(),
                ty: TypeRef::simple("i32"),
                documentation: None,
            }],
            type_parameters: Vec::new(),
            ret: FluentReturn::Step { step: StepId(step) },
            documentation: None,
            priority: 0,
            location: Location::default(),
        })
    }

    fn create(ctor: usize) -> FluentMethod {
        FluentMethod::Creation(CreationMethod {
            name: "CreateTarget".to_string(),
            target: TargetTypeReturn {
                target: TypeRef::simple("Target"),
                constructor: ConstructorId(ctor),
                candidate_constructors: vec![ConstructorId(ctor)],
            },
            type_parameters: Vec::new(),
            documentation: None,
            location: Location::default(),
        })
    }

    #[test]
    fn test_live_steps_skip_orphans() {
        let root = vec![to_step(0)];
        let steps: Vec<Vec<FluentMethod>> = vec![vec![create(0)], vec![create(1)]];
        let graph = StepGraph::build(&root, |id| steps.get(id.0).map(|m| (m.as_slice(), None)));

        assert_eq!(graph.live_steps(), [StepId(0)].into_iter().collect());
        assert_eq!(graph.reachable_constructors(), [ConstructorId(0)].into_iter().collect());
    }

    #[test]
    fn test_arrival_constructor_counts_as_reached() {
        let root = vec![to_step(0)];
        let steps: Vec<Vec<FluentMethod>> = vec![vec![]];
        let graph = StepGraph::build(&root, |id| {
            steps.get(id.0).map(|m| (m.as_slice(), Some(ConstructorId(5))))
        });
        assert!(graph.reachable_constructors().contains(&ConstructorId(5)));
    }

    #[test]
    fn test_method_reach_follows_the_returned_step() {
        let root = vec![to_step(0), to_step(1)];
        let steps: Vec<Vec<FluentMethod>> = vec![vec![to_step(1)], vec![create(3)]];
        let graph = StepGraph::build(&root, |id| steps.get(id.0).map(|m| (m.as_slice(), None)));

        assert_eq!(graph.method_reach(&to_step(0)), BTreeSet::from([ConstructorId(3)]));
        assert_eq!(graph.method_reach(&create(7)), BTreeSet::from([ConstructorId(7)]));
        assert!(graph.method_reach(&to_step(9)).is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let graph = StepGraph::build(&[], |_| None);
        assert_eq!(graph.node_count(), 1);
        assert!(graph.live_steps().is_empty());
    }
}

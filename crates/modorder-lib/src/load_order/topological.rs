//! Topological ordering that tolerates cycles.
//! 
//! The graph is collapsed into its strongly connected components, which always form a DAG,
//! and the components are ordered with Kahn's algorithm. Whenever several components are ready
//! the one holding the lowest node index goes first, so the result only depends on the graph.
//! Members of a component are emitted by node index. For an acyclic graph every component is a single node.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
	pub order: Vec<NodeIndex>,
	/// Components of more than one node, each sorted by node index.
	pub cycles: Vec<Vec<NodeIndex>>,
}

pub fn topological_order<N, E>(graph: &DiGraph<N, E>) -> TopologicalOrder {
	let mut components = petgraph::algo::tarjan_scc(graph);
	for c in components.iter_mut() {
		c.sort();
	}

	let mut component_of = vec![0usize; graph.node_count()];
	for (ci, c) in components.iter().enumerate() {
		for n in c {
			component_of[n.index()] = ci;
		}
	}

	/* Edges inside a component, self edges included, don't constrain anything */
	let mut in_degree = vec![0usize; components.len()];
	for e in graph.edge_references() {
		let (src, dst) = (component_of[e.source().index()], component_of[e.target().index()]);
		if src != dst {
			in_degree[dst] += 1;
		}
	}

	let mut ready = BinaryHeap::<Reverse<(NodeIndex, usize)>>::new();
	for (ci, c) in components.iter().enumerate() {
		if in_degree[ci] == 0 {
			ready.push(Reverse((c[0], ci)));
		}
	}

	let mut order = Vec::<NodeIndex>::with_capacity(graph.node_count());
	while let Some(Reverse((_, ci))) = ready.pop() {
		for &n in &components[ci] {
			order.push(n);
			for e in graph.edges_directed(n, Outgoing) {
				let dst = component_of[e.target().index()];
				if dst == ci {
					continue;
				}
				in_degree[dst] -= 1;
				if in_degree[dst] == 0 {
					ready.push(Reverse((components[dst][0], dst)));
				}
			}
		}
	}

	let mut cycles = components.into_iter().filter(|c| c.len() > 1).collect::<Vec<_>>();
	cycles.sort();

	TopologicalOrder { order, cycles }
}

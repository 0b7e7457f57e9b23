//! The graph of ordering constraints between mods.

use std::collections::HashMap;

use petgraph::prelude::*;

use crate::package::*;

/// Why an edge exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
	/// The mod declaring the rule.
	pub owner: NodeIndex,
	pub rule_type: RuleType,
}

/// An edge `a -> b` means `a` has to load before `b`.
/// 
/// Node indices follow the order of the mods the graph was created from.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
	pub graph: DiGraph<ModId, EdgeData>,
	indices: HashMap<ModId, NodeIndex>,
}

impl DependencyGraph {
	/// Creates a node for every mod, whether or not it ends up with any edges.
	pub fn new(mods: &[Mod]) -> crate::Result<Self> {
		let mut graph = DiGraph::<ModId, EdgeData>::with_capacity(mods.len(), 0);
		let mut indices = HashMap::<ModId, NodeIndex>::with_capacity(mods.len());

		for m in mods {
			if indices.contains_key(&m.id) {
				return Err(crate::Error::DuplicateModId(m.id.clone()));
			}
			let i = graph.add_node(m.id.clone());
			indices.insert(m.id.clone(), i);
		}

		Ok(Self { graph, indices })
	}

	pub fn node_index(&self, id: &ModId) -> Option<NodeIndex> {
		self.indices.get(id).copied()
	}

	pub fn node_id(&self, i: NodeIndex) -> &ModId {
		&self.graph[i]
	}

	/// Resolves `rule` against `mods` and adds the edge it describes.
	/// 
	/// Returns `Ok(None)` when the rule has no effect on ordering, either because of its type or because
	/// the referenced mod isn't installed.
	pub fn add_rule(&mut self, owner: NodeIndex, rule: &Rule, mods: &[Mod]) -> Result<Option<EdgeIndex>, ReferenceError> {
		if !matches!(rule.rule_type, RuleType::Before | RuleType::After) {
			return Ok(None);
		}

		let target = match crate::resolver::try_resolve(&rule.reference, mods)? {
			Some(target) => target,
			None => {
				log::trace!("`{}` references {} which isn't installed", self.graph[owner], rule.reference);
				return Ok(None);
			},
		};
		/* Resolved mods always come from the slice the graph was built from */
		let target = match self.node_index(&target.id) {
			Some(i) => i,
			None => return Ok(None),
		};

		let (first, second) = match rule.rule_type {
			RuleType::Before => (owner, target),
			_ => (target, owner),
		};
		Ok(Some(self.add_ordering(first, second, EdgeData { owner, rule_type: rule.rule_type })))
	}

	/// Adds `first -> second` unless the edge already exists.
	pub fn add_ordering(&mut self, first: NodeIndex, second: NodeIndex, data: EdgeData) -> EdgeIndex {
		match self.graph.find_edge(first, second) {
			Some(e) => e,
			None => {
				log::trace!("`{}` loads before `{}`", self.graph[first], self.graph[second]);
				self.graph.add_edge(first, second, data)
			},
		}
	}

	/// Edges whose endpoints are both in `nodes`, self edges excluded.
	pub fn edges_within(&self, nodes: &[NodeIndex]) -> Vec<(ModId, ModId)> {
		self.graph.edge_references()
			.filter(|e| e.source() != e.target())
			.filter(|e| nodes.contains(&e.source()) && nodes.contains(&e.target()))
			.map(|e| (self.graph[e.source()].clone(), self.graph[e.target()].clone()))
			.collect()
	}
}

//! Sorting mods into a load order.
//! 
//! # Process
//! 1. A graph node is created for every mod up front, duplicate ids are the only fatal error.
//! 1. Rules for every mod are looked up concurrently, bounded by [`SortOptions::concurrency_limit()`].
//! A failed lookup is reported and the mod is treated as having no rules.
//! 1. Once every lookup has settled, rules are resolved and added as edges, in input order.
//! 1. The graph is ordered topologically. Mods forming a cycle are reported and kept in input order relative to each other.
//! 
//! # Timeouts
//! With [`SortOptions::lookup_timeout()`] set, lookups still outstanding at the deadline are aborted and reported
//! as [`LookupError::TimedOut`], the sort continues with the rules received so far.
//! Dropping the future returned by [`SortBuilder::sort()`] aborts every lookup in flight.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::package::*;
use crate::diagnostics::{DiagnosticSink, LogSink, SortWarning};
use crate::lookup::{RuleProvider, LookupError};
use crate::SortOptions;

mod dependency_graph;
pub use dependency_graph::DependencyGraph;
pub use dependency_graph::EdgeData;

mod topological;
pub use topological::topological_order;
pub use topological::TopologicalOrder;

/// The result of a sort.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOutcome {
	/// Every input mod exactly once, earliest to load first.
	pub order: Vec<ModId>,
	/// Everything that went wrong along the way, also sent to the diagnostic sink.
	pub warnings: Vec<SortWarning>,
}

impl SortOutcome {
	/// Some rules could not be honoured or fetched.
	pub fn is_degraded(&self) -> bool {
		!self.warnings.is_empty()
	}

	pub fn position(&self, id: &ModId) -> Option<usize> {
		self.order.iter().position(|o| o == id)
	}
}

/// Configures and runs a sort.
pub struct SortBuilder<P> {
	provider: Arc<P>,
	options: SortOptions,
	sink: Arc<dyn DiagnosticSink>,
}

impl<P: RuleProvider> SortBuilder<P> {
	pub fn new(provider: P) -> Self {
		Self::from_shared(Arc::new(provider))
	}

	/// Uses a provider that is also held elsewhere.
	pub fn from_shared(provider: Arc<P>) -> Self {
		Self {
			provider,
			options: Default::default(),
			sink: Arc::new(LogSink),
		}
	}

	pub fn options(mut self, options: SortOptions) -> Self {
		self.options = options;
		self
	}

	/// Where warnings are reported as they are found, defaults to [`LogSink`].
	pub fn diagnostics(self, sink: impl DiagnosticSink + 'static) -> Self {
		self.shared_diagnostics(Arc::new(sink))
	}

	pub fn shared_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
		self.sink = sink;
		self
	}

	/// Computes a load order for `mods`.
	/// 
	/// Only fails if the graph can't be built at all, see [`crate::Error::DuplicateModId`].
	/// Must be called from within a tokio runtime.
	pub async fn sort(&self, mods: &[Mod]) -> crate::Result<SortOutcome> {
		log::info!("Sorting {} mods", mods.len());
		let mut graph = DependencyGraph::new(mods)?;
		let lookups = fetch_rules(&self.provider, mods, &self.options).await;

		let mut warnings = Vec::<SortWarning>::new();
		let mut warn = |warning: SortWarning| {
			self.sink.report(&warning.to_diagnostic());
			warnings.push(warning);
		};

		for (i, (m, lookup)) in mods.iter().zip(lookups).enumerate() {
			let rules = match lookup {
				Ok(rules) => rules,
				Err(error) => {
					warn(SortWarning::LookupFailed { mod_id: m.id.clone(), error });
					continue;
				},
			};

			let owner = petgraph::graph::NodeIndex::new(i);
			for rule in &rules {
				if let Err(error) = graph.add_rule(owner, rule, mods) {
					warn(SortWarning::MalformedReference { mod_id: m.id.clone(), error });
				}
			}
		}

		let sorted = topological_order(&graph.graph);
		for cycle in &sorted.cycles {
			warn(SortWarning::CycleDetected {
				mods: cycle.iter().map(|&n| graph.node_id(n).clone()).collect(),
				edges: graph.edges_within(cycle),
			});
		}

		let order = sorted.order.into_iter().map(|n| graph.node_id(n).clone()).collect::<Vec<_>>();
		log::debug!("Sorted {} mods with {} constraints", order.len(), graph.graph.edge_count());

		Ok(SortOutcome { order, warnings })
	}
}

/// Sorts `mods` with default options, reporting to the `log` facade.
pub async fn sort_mods<P: RuleProvider>(mods: &[Mod], provider: P) -> crate::Result<SortOutcome> {
	SortBuilder::new(provider).sort(mods).await
}

type RuleLookup = Result<Vec<Rule>, LookupError>;

/// Looks up the rules of every mod, returned in the same order as `mods`.
async fn fetch_rules<P: RuleProvider>(provider: &Arc<P>, mods: &[Mod], options: &SortOptions) -> Vec<RuleLookup> {
	fn spawn_lookup<P: RuleProvider>(tasks: &mut JoinSet<RuleLookup>, running: &mut HashMap<tokio::task::Id, usize>, provider: &Arc<P>, index: usize, m: Mod) {
		let provider = Arc::clone(provider);
		let handle = tasks.spawn(async move { provider.lookup_rules(&m).await });
		running.insert(handle.id(), index);
	}

	let mut results: Vec<Option<RuleLookup>> = mods.iter().map(|_| None).collect();
	let mut pending = mods.iter().cloned().enumerate();
	let mut tasks = JoinSet::<RuleLookup>::new();
	let mut running = HashMap::<tokio::task::Id, usize>::new();
	let deadline = options.lookup_timeout().map(|t| tokio::time::Instant::now() + t);

	for (index, m) in pending.by_ref().take(options.concurrency_limit()) {
		spawn_lookup(&mut tasks, &mut running, provider, index, m);
	}

	loop {
		let joined = match deadline {
			Some(deadline) => tokio::time::timeout_at(deadline, tasks.join_next_with_id()).await,
			None => Ok(tasks.join_next_with_id().await),
		};
		let joined = match joined {
			Ok(joined) => joined,
			Err(_) => {
				log::warn!("Rule lookups timed out with {} still running", tasks.len());
				tasks.abort_all();
				break;
			},
		};

		let (id, result) = match joined {
			Some(Ok((id, rules))) => (id, rules),
			Some(Err(e)) => {
				log::error!("Rule lookup task failed: {}", e);
				(e.id(), Err(LookupError::Aborted))
			},
			None => break,
		};
		if let Some(index) = running.remove(&id) {
			results[index] = Some(result);
		}

		if let Some((index, m)) = pending.next() {
			spawn_lookup(&mut tasks, &mut running, provider, index, m);
		}
	}

	/* Anything without a result was still running or never started when the deadline hit */
	results.into_iter()
		.map(|r| r.unwrap_or(Err(LookupError::TimedOut)))
		.collect()
}

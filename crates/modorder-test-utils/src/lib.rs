//! Various helper functions for testing
//! 
//! functions in this module should use results and not use any panics to avoid confusion in callers.
//! The exception is [`ScriptedProvider`] which panics when asked to.

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use modorder::{Mod, ModAttributes, ModId, Rule, RuleProvider, LookupError};

#[derive(Debug, thiserror::Error)]
pub enum TestUtilsError {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
}

/// A mod installed from `package_id` at `version`, installed under a path equal to its id.
pub fn package_mod(id: &str, package_id: &str, version: &str) -> Mod {
	Mod::new(id, id, ModAttributes {
		package_id: Some(package_id.to_string()),
		logical_file_name: Some(id.to_string()),
		version: Some(version.to_string()),
		..Default::default()
	})
}

/// A mod that can only be identified by its hash.
pub fn hashed_mod(id: &str, file_hash: &str) -> Mod {
	Mod::new(id, id, ModAttributes { file_hash: Some(file_hash.to_string()), ..Default::default() })
}

/// Mods with no attributes besides their id.
pub fn plain_mods(ids: &[&str]) -> Vec<Mod> {
	ids.iter().map(|id| Mod::new(*id, *id, ModAttributes::default())).collect()
}

/// Writes `contents` to a temporary file that is deleted when dropped.
pub fn temp_archive(contents: &[u8]) -> Result<tempfile::NamedTempFile, TestUtilsError> {
	let mut file = tempfile::Builder::new().suffix(".zip").tempfile()?;
	file.write_all(contents)?;
	file.flush()?;
	Ok(file)
}

pub fn ids(order: &[ModId]) -> Vec<&str> {
	order.iter().map(ModId::as_str).collect()
}

#[derive(Debug, Clone, Default)]
struct Script {
	rules: Vec<Rule>,
	delay: Duration,
	failure: Option<String>,
	panics: bool,
}

/// A rule provider whose per-mod behaviour is scripted: rules, latency, failures and panics.
/// 
/// Also records how many lookups were running at the same time.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
	scripts: HashMap<ModId, Script>,
	in_flight: Arc<AtomicUsize>,
	peak: Arc<AtomicUsize>,
	calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn rule(mut self, id: &str, rule: Rule) -> Self {
		self.scripts.entry(id.into()).or_default().rules.push(rule);
		self
	}

	pub fn delay(mut self, id: &str, delay: Duration) -> Self {
		self.scripts.entry(id.into()).or_default().delay = delay;
		self
	}

	/// Applies `delay` to every id in `ids`.
	pub fn delays(mut self, ids: &[&str], delay: Duration) -> Self {
		for id in ids {
			self = self.delay(id, delay);
		}
		self
	}

	pub fn fail(mut self, id: &str, reason: &str) -> Self {
		self.scripts.entry(id.into()).or_default().failure = Some(reason.to_string());
		self
	}

	pub fn panic_on(mut self, id: &str) -> Self {
		self.scripts.entry(id.into()).or_default().panics = true;
		self
	}

	/// Highest number of lookups observed running at once.
	pub fn peak_concurrency(&self) -> usize {
		self.peak.load(Ordering::SeqCst)
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl RuleProvider for ScriptedProvider {
	fn lookup_rules(&self, m: &Mod) -> impl Future<Output = Result<Vec<Rule>, LookupError>> + Send {
		let script = self.scripts.get(&m.id).cloned().unwrap_or_default();
		let in_flight = Arc::clone(&self.in_flight);
		let peak = Arc::clone(&self.peak);
		self.calls.fetch_add(1, Ordering::SeqCst);

		async move {
			let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
			peak.fetch_max(running, Ordering::SeqCst);
			tokio::time::sleep(script.delay).await;
			in_flight.fetch_sub(1, Ordering::SeqCst);

			if script.panics {
				panic!("scripted lookup panic");
			}
			match script.failure {
				Some(reason) => Err(LookupError::Unavailable(reason)),
				None => Ok(script.rules),
			}
		}
	}
}

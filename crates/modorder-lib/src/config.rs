use std::time::Duration;

use serde::{Serialize, Deserialize};

/// Tuning for a single sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOptions {
	concurrency_limit: usize,
	lookup_timeout: Option<Duration>,
}

impl Default for SortOptions {
	fn default() -> Self {
		Self {
			concurrency_limit: 8,
			lookup_timeout: None,
		}
	}
}

impl SortOptions {
	/// Reads options from JSON, missing fields take their default value.
	pub fn from_json(json: &str) -> crate::Result<Self> {
		let options: Self = serde_json::from_str(json)?;
		Ok(options)
	}

	/// Maximum number of rule lookups in flight at once. Never less than 1.
	pub fn concurrency_limit(&self) -> usize {
		self.concurrency_limit.max(1)
	}
	pub fn set_concurrency_limit(&mut self, concurrency_limit: usize) {
		self.concurrency_limit = concurrency_limit;
	}

	/// How long to wait for rule lookups before sorting with whatever has arrived.
	/// 
	/// `None` waits for every lookup to settle.
	pub fn lookup_timeout(&self) -> Option<Duration> {
		self.lookup_timeout
	}
	pub fn set_lookup_timeout(&mut self, lookup_timeout: Option<Duration>) {
		self.lookup_timeout = lookup_timeout;
	}
}

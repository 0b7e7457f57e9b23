//! Non-fatal problems found while sorting and where they get reported.

use std::sync::Mutex;

use serde::{Serialize, Deserialize};

use crate::{ModId, LookupError};
use crate::package::ReferenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
	Info,
	Warning,
	Error,
}

impl From<Severity> for log::Level {
	fn from(value: Severity) -> Self {
		match value {
			Severity::Info => log::Level::Info,
			Severity::Warning => log::Level::Warn,
			Severity::Error => log::Level::Error,
		}
	}
}

/// A single report handed to a [`DiagnosticSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub severity: Severity,
	pub message: String,
	/// Structured detail, such as the mods involved.
	pub context: serde_json::Value,
}

/// Receives diagnostics as they are found.
pub trait DiagnosticSink: Send + Sync {
	fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
	fn report(&self, diagnostic: &Diagnostic) {
		let level: log::Level = diagnostic.severity.into();
		log::log!(level, "{} {}", diagnostic.message, diagnostic.context);
	}
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
	diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
	pub fn take(&self) -> Vec<Diagnostic> {
		std::mem::take(&mut *self.diagnostics.lock().unwrap_or_else(|e| e.into_inner()))
	}
}

impl DiagnosticSink for CollectingSink {
	fn report(&self, diagnostic: &Diagnostic) {
		self.diagnostics.lock().unwrap_or_else(|e| e.into_inner()).push(diagnostic.clone());
	}
}

/// Something went wrong for part of the input, the sort still completed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SortWarning {
	/// Rules for the mod couldn't be fetched, it was sorted as if it had none.
	#[error("failed to look up rules for `{mod_id}`: {error}")]
	LookupFailed { mod_id: ModId, error: LookupError },
	/// A rule of the mod has a malformed reference and was skipped.
	#[error("skipped rule of `{mod_id}`: {error}")]
	MalformedReference { mod_id: ModId, error: ReferenceError },
	/// These mods require each other to be loaded first.
	/// They were placed in input order with respect to each other.
	#[error("mods {} form a cycle", format_ids(.mods))]
	CycleDetected { mods: Vec<ModId>, edges: Vec<(ModId, ModId)> },
}

fn format_ids(ids: &[ModId]) -> String {
	ids.iter().map(|id| format!("`{}`", id)).collect::<Vec<_>>().join(", ")
}

impl SortWarning {
	pub fn severity(&self) -> Severity {
		match self {
			SortWarning::LookupFailed { .. } => Severity::Error,
			SortWarning::MalformedReference { .. } | SortWarning::CycleDetected { .. } => Severity::Warning,
		}
	}

	pub fn to_diagnostic(&self) -> Diagnostic {
		let context = match self {
			SortWarning::LookupFailed { mod_id, error } => serde_json::json!({ "mod": mod_id, "msg": error.to_string() }),
			SortWarning::MalformedReference { mod_id, error } => serde_json::json!({ "mod": mod_id, "msg": error.to_string() }),
			SortWarning::CycleDetected { mods, edges } => serde_json::json!({ "mods": mods, "edges": edges }),
		};
		Diagnostic { severity: self.severity(), message: self.to_string(), context }
	}
}

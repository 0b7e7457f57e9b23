//! Version range matching.
//! 
//! Ranges are written the way mod authors write them for node-style tooling
//! (`1.2.3`, `>=1.0 <2.0`, `1.x || 2.x`, `1.0 - 1.4`) and evaluated with the `semver` crate,
//! which only understands comma separated comparators and treats a bare version as a caret requirement.

use semver::{Version, VersionReq};
use serde::{Serialize, Deserialize};

use super::ReferenceError;

/// An uncompiled version range as found in a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionMatch(String);

impl VersionMatch {
	pub fn new(range: impl Into<String>) -> Self {
		Self(range.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn compile(&self) -> Result<VersionRange, ReferenceError> {
		let alternatives = self.0.split("||")
			.map(translate_alternative)
			.map(|req| VersionReq::parse(&req))
			.collect::<Result<Vec<_>, _>>()
			.map_err(|e| ReferenceError::InvalidVersionRange { range: self.0.clone(), reason: e.to_string() })?;
		Ok(VersionRange { alternatives })
	}
}

impl std::fmt::Display for VersionMatch {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// A compiled [`VersionMatch`], satisfied when any of its alternatives is.
#[derive(Debug, Clone)]
pub struct VersionRange {
	alternatives: Vec<VersionReq>,
}

impl VersionRange {
	/// `false` when `version` can't be understood as a version at all.
	pub fn satisfied_by(&self, version: &str) -> bool {
		match coerce_version(version) {
			Some(version) => self.alternatives.iter().any(|req| req.matches(&version)),
			None => {
				log::debug!("Version `{}` can't be parsed, treating as unsatisfied", version);
				false
			},
		}
	}
}

/// Reads a loosely written version.
/// 
/// A leading `v` or `=` is ignored, missing components are zero and anything past the third numeric component is dropped.
pub fn coerce_version(version: &str) -> Option<Version> {
	let version = version.trim().trim_start_matches('=').trim_start_matches(['v', 'V']);
	if let Ok(v) = Version::parse(version) {
		return Some(v);
	}

	let (core, tail) = match version.find(['-', '+']) {
		Some(i) => version.split_at(i),
		None => (version, ""),
	};

	let mut numbers = [0u64; 3];
	let mut components = core.split('.');
	for n in numbers.iter_mut() {
		match components.next() {
			Some(c) => *n = c.parse().ok()?,
			None => break,
		}
	}
	/* Dropped components still have to be numbers */
	if components.any(|c| c.parse::<u64>().is_err()) {
		return None;
	}

	let [major, minor, patch] = numbers;
	Version::parse(&format!("{}.{}.{}{}", major, minor, patch, tail))
		.or_else(|_| Version::parse(&format!("{}.{}.{}", major, minor, patch)))
		.ok()
}

/// Converts a single `||` separated alternative into `semver` syntax.
fn translate_alternative(alternative: &str) -> String {
	let alternative = alternative.trim();
	if alternative.is_empty() {
		return "*".to_string();
	}

	if let Some((low, high)) = alternative.split_once(" - ") {
		let bounds = [hyphen_bound(">=", low), hyphen_bound("<=", high)].into_iter().flatten().collect::<Vec<_>>();
		return if bounds.is_empty() { "*".to_string() } else { bounds.join(", ") };
	}

	/* Operators may be separated from their version by whitespace, `>= 1.2` */
	let mut comparators = Vec::<String>::new();
	let mut pending_op = String::new();
	for token in alternative.split_whitespace() {
		if token.chars().all(is_operator_char) {
			pending_op.push_str(token);
			continue;
		}
		let token = format!("{}{}", std::mem::take(&mut pending_op), token);
		comparators.push(translate_comparator(&token));
	}
	if !pending_op.is_empty() {
		/* Left for semver to reject */
		comparators.push(pending_op);
	}

	comparators.join(", ")
}

fn translate_comparator(comparator: &str) -> String {
	let split = comparator.find(|c| !is_operator_char(c)).unwrap_or(comparator.len());
	let (op, version) = comparator.split_at(split);
	let version = strip_prefix(version);

	if op.is_empty() {
		if is_wildcard(version) {
			version.to_string()
		} else {
			/* A bare version is an exact match, not semver's implicit caret */
			format!("={}", version)
		}
	} else {
		format!("{}{}", op, version)
	}
}

/// One end of a hyphen range. Wildcard components are cut off, an end that is entirely wildcard has no bound.
fn hyphen_bound(op: &str, endpoint: &str) -> Option<String> {
	let components = strip_prefix(endpoint.trim()).split('.')
		.take_while(|c| !matches!(*c, "*" | "x" | "X"))
		.collect::<Vec<_>>();
	if components.is_empty() {
		None
	} else {
		Some(format!("{}{}", op, components.join(".")))
	}
}

fn strip_prefix(version: &str) -> &str {
	version.trim_start_matches(['v', 'V'])
}

fn is_operator_char(c: char) -> bool {
	matches!(c, '<' | '>' | '=' | '~' | '^')
}

fn is_wildcard(version: &str) -> bool {
	version.split('.').any(|c| matches!(c, "*" | "x" | "X"))
}

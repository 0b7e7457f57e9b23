//! Finds the installed mod a [`Reference`] points at.
//! 
//! Candidates are scanned in the order given and the first one passing every check is used.
//! There is no scoring, when several mods would qualify the earliest wins.

use crate::package::*;

/// Returns the first candidate matching `reference`.
/// 
/// A malformed reference is logged and matches nothing, use [`try_resolve()`] to receive the error instead.
pub fn resolve<'m>(reference: &Reference, candidates: &'m [Mod]) -> Option<&'m Mod> {
	match try_resolve(reference, candidates) {
		Ok(found) => found,
		Err(e) => {
			log::warn!("Reference {} can't be resolved: {}", reference, e);
			None
		},
	}
}

/// Returns the first candidate matching `reference`, or an error if the reference itself is malformed.
/// 
/// `Ok(None)` is the common case of the referenced mod not being installed.
pub fn try_resolve<'m>(reference: &Reference, candidates: &'m [Mod]) -> Result<Option<&'m Mod>, ReferenceError> {
	let matcher = ReferenceMatcher::new(reference)?;
	Ok(candidates.iter().find(|m| matcher.matches(m)))
}

/// A reference with its expression and version range compiled, ready to test against many mods.
#[derive(Debug)]
pub struct ReferenceMatcher<'r> {
	reference: &'r Reference,
	expression: Option<regex::Regex>,
	version_range: Option<VersionRange>,
}

impl<'r> ReferenceMatcher<'r> {
	pub fn new(reference: &'r Reference) -> Result<Self, ReferenceError> {
		let (expression, version_range) = match reference {
			/* Nothing else is consulted for hash references so nothing else has to be valid */
			Reference::ByHash(_) => (None, None),
			Reference::ByIdentity(identity) => {
				let expression = identity.file_expression.as_ref()
					.map(|e| regex::Regex::new(e).map_err(|err| ReferenceError::InvalidExpression { expression: e.clone(), reason: err.to_string() }))
					.transpose()?;
				let version_range = identity.version_match.as_ref()
					.map(VersionMatch::compile)
					.transpose()?;
				(expression, version_range)
			},
		};

		Ok(Self { reference, expression, version_range })
	}

	pub fn matches(&self, candidate: &Mod) -> bool {
		let attributes = &candidate.attributes;
		let identity = match self.reference {
			Reference::ByHash(hash) => return attributes.file_hash.as_ref() == Some(hash),
			Reference::ByIdentity(identity) => identity,
		};

		if attributes.package_id.as_ref() != Some(&identity.package_id) {
			return false;
		}

		if let Some(name) = &identity.logical_file_name {
			if attributes.logical_file_name.as_ref() != Some(name) {
				return false;
			}
		}

		if let Some(expression) = &self.expression {
			if !expression.is_match(&candidate.installation_path) {
				return false;
			}
		}

		if let Some(range) = &self.version_range {
			/* A mod without a version can't be inside any range */
			match &attributes.version {
				Some(version) => if !range.satisfied_by(version) { return false },
				None => return false,
			}
		}

		true
	}
}

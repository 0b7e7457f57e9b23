use serde::{Serialize, Deserialize};

use super::VersionMatch;

/// A reference can't be evaluated because some of its data is malformed.
/// 
/// A malformed reference matches nothing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
	#[error("invalid file expression `{expression}`: {reason}")]
	InvalidExpression { expression: String, reason: String },
	#[error("invalid version range `{range}`: {reason}")]
	InvalidVersionRange { range: String, reason: String },
}

/// Points at a mod without holding it, resolved against the installed mods with [`crate::resolve()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReference", into = "RawReference")]
pub enum Reference {
	/// Matches the mod whose archive has exactly this hash. Nothing else is considered.
	ByHash(String),
	ByIdentity(IdentityReference),
}

/// A reference by package, optionally narrowed down to a file and version range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityReference {
	pub package_id: String,
	pub logical_file_name: Option<String>,
	/// Regular expression searched for in the installation path.
	pub file_expression: Option<String>,
	pub version_match: Option<VersionMatch>,
}

impl Reference {
	pub fn by_hash(file_hash: impl Into<String>) -> Self {
		Reference::ByHash(file_hash.into())
	}

	pub fn by_package(package_id: impl Into<String>) -> Self {
		Reference::ByIdentity(IdentityReference { package_id: package_id.into(), ..Default::default() })
	}

	/// Narrows an identity reference to a logical file name. Has no effect on hash references.
	pub fn with_logical_file_name(mut self, name: impl Into<String>) -> Self {
		if let Reference::ByIdentity(identity) = &mut self {
			identity.logical_file_name = Some(name.into());
		}
		self
	}

	/// Narrows an identity reference to an installation path expression. Has no effect on hash references.
	pub fn with_file_expression(mut self, expression: impl Into<String>) -> Self {
		if let Reference::ByIdentity(identity) = &mut self {
			identity.file_expression = Some(expression.into());
		}
		self
	}

	/// Narrows an identity reference to a version range. Has no effect on hash references.
	pub fn with_version_match(mut self, range: impl Into<String>) -> Self {
		if let Reference::ByIdentity(identity) = &mut self {
			identity.version_match = Some(VersionMatch::new(range));
		}
		self
	}
}

impl std::fmt::Display for Reference {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Reference::ByHash(hash) => write!(f, "hash:{}", hash),
			Reference::ByIdentity(identity) => {
				write!(f, "package:{}", identity.package_id)?;
				if let Some(name) = &identity.logical_file_name { write!(f, " file:{}", name)?; }
				if let Some(expression) = &identity.file_expression { write!(f, " path:/{}/", expression)?; }
				if let Some(range) = &identity.version_match { write!(f, " version:{}", range)?; }
				Ok(())
			},
		}
	}
}

/// The flat form references take in lookup data.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReference {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	file_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	package_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	logical_file_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	file_expression: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	version_match: Option<String>,
}

impl TryFrom<RawReference> for Reference {
	type Error = String;
	fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
		/* The hash is authoritative, any other fields are dropped */
		if let Some(hash) = raw.file_hash {
			return Ok(Reference::ByHash(hash));
		}
		let package_id = raw.package_id.ok_or_else(|| "reference has neither a fileHash nor a packageId".to_string())?;
		Ok(Reference::ByIdentity(IdentityReference {
			package_id,
			logical_file_name: raw.logical_file_name,
			file_expression: raw.file_expression,
			version_match: raw.version_match.map(VersionMatch::new),
		}))
	}
}

impl From<Reference> for RawReference {
	fn from(value: Reference) -> Self {
		match value {
			Reference::ByHash(hash) => RawReference { file_hash: Some(hash), ..Default::default() },
			Reference::ByIdentity(identity) => RawReference {
				file_hash: None,
				package_id: Some(identity.package_id),
				logical_file_name: identity.logical_file_name,
				file_expression: identity.file_expression,
				version_match: identity.version_match.map(|v| v.as_str().to_owned()),
			},
		}
	}
}

/// The kind of relationship a rule describes.
/// 
/// Only `Before` and `After` affect the load order, the others are accepted so lookup data carrying them still parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
	/// The owning mod loads before the referenced mod.
	Before,
	/// The owning mod loads after the referenced mod.
	After,
	Requires,
	Recommends,
	Conflicts,
	Provides,
}

/// A single relationship declared by a mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
	#[serde(rename = "type")]
	pub rule_type: RuleType,
	pub reference: Reference,
}

impl Rule {
	pub fn before(reference: Reference) -> Self {
		Self { rule_type: RuleType::Before, reference }
	}

	pub fn after(reference: Reference) -> Self {
		Self { rule_type: RuleType::After, reference }
	}
}

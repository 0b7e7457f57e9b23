//! Types describing installed mods and the rules attached to them.
//! 
//! The module is named `package` as `mod` is a rust keyword, the types keep the name "mod".

use serde::{Serialize, Deserialize};

mod reference;
pub use reference::Reference;
pub use reference::IdentityReference;
pub use reference::ReferenceError;
pub use reference::Rule;
pub use reference::RuleType;

mod version_match;
pub use version_match::VersionMatch;
pub use version_match::VersionRange;
pub use version_match::coerce_version;

/// Unique identifier of a mod within one sort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModId(String);

impl ModId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for ModId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ModId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

impl From<String> for ModId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl AsRef<str> for ModId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// The attributes of a mod that references can match against.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModAttributes {
	/// Digest of the mod archive.
	pub file_hash: Option<String>,
	pub file_size: Option<u64>,
	/// Identity of the package the mod was installed from, shared between files of the same package.
	pub package_id: Option<String>,
	pub logical_file_name: Option<String>,
	pub version: Option<String>,
}

impl ModAttributes {
	/// Reads the hash and size of the archive at `path`.
	/// 
	/// All other fields are left empty.
	pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let path = path.as_ref();
		let file_size = std::fs::metadata(path)?.len();
		let file_hash = sha256::try_digest(path)?;
		log::trace!("Hashed {} ({} bytes): {}", path.display(), file_size, file_hash);
		Ok(Self {
			file_hash: Some(file_hash),
			file_size: Some(file_size),
			..Default::default()
		})
	}
}

/// A single installed mod.
/// 
/// Mods are never modified by the sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mod {
	pub id: ModId,
	/// Where the mod is installed, file expressions in references are matched against this.
	pub installation_path: String,
	#[serde(default)]
	pub attributes: ModAttributes,
}

impl Mod {
	pub fn new(id: impl Into<ModId>, installation_path: impl Into<String>, attributes: ModAttributes) -> Self {
		Self {
			id: id.into(),
			installation_path: installation_path.into(),
			attributes,
		}
	}
}

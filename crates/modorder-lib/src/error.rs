//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Errors that stop an operation outright.
/// 
/// Problems with a single mod or rule are never reported through this type during a sort,
/// they become [`crate::SortWarning`]s instead.
#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	/// Two input mods share an id so the graph can't be built.
	#[error("duplicate mod id `{0}`")]
	DuplicateModId(crate::ModId),
}

//! Where mods' rules come from.
//! 
//! A sort asks a [`RuleProvider`] for the rules of every mod. Hosts backed by a metadata database
//! can implement [`ModMetaSource`] instead and wrap it in a [`MetaRuleProvider`].

use std::collections::HashMap;
use std::future::Future;

use serde::{Serialize, Deserialize};

use crate::package::*;

/// Rules for a single mod couldn't be fetched.
/// 
/// Never fatal to a sort, the mod is treated as having no rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
	#[error("lookup unavailable: {0}")]
	Unavailable(String),
	#[error("lookup timed out")]
	TimedOut,
	/// The lookup stopped without producing a result, such as a panicking provider.
	#[error("lookup aborted")]
	Aborted,
}

/// Supplies the rules declared by a mod.
/// 
/// Lookups for different mods run concurrently, an implementation must not depend on the order they are issued or complete in.
pub trait RuleProvider: Send + Sync + 'static {
	fn lookup_rules(&self, m: &Mod) -> impl Future<Output = Result<Vec<Rule>, LookupError>> + Send;
}

/// What a metadata service is queried by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupQuery {
	pub file_hash: Option<String>,
	pub file_size: Option<u64>,
	pub package_id: Option<String>,
}

impl From<&Mod> for LookupQuery {
	fn from(value: &Mod) -> Self {
		Self {
			file_hash: value.attributes.file_hash.clone(),
			file_size: value.attributes.file_size,
			package_id: value.attributes.package_id.clone(),
		}
	}
}

/// A single entry returned by a metadata service, best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
	#[serde(default)]
	pub key: String,
	pub value: ModMeta,
}

/// The part of a mod's metadata relevant to ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModMeta {
	pub file_name: Option<String>,
	pub file_version: Option<String>,
	pub rules: Option<Vec<Rule>>,
}

/// A metadata database that can be searched for mods.
pub trait ModMetaSource: Send + Sync + 'static {
	fn lookup_mod_meta(&self, query: &LookupQuery) -> impl Future<Output = Result<Vec<LookupResult>, LookupError>> + Send;
}

/// Uses the rules of the best metadata match for each mod.
#[derive(Debug, Clone)]
pub struct MetaRuleProvider<S> {
	source: S,
}

impl<S: ModMetaSource> MetaRuleProvider<S> {
	pub fn new(source: S) -> Self {
		Self { source }
	}

	pub fn source(&self) -> &S {
		&self.source
	}
}

impl<S: ModMetaSource> RuleProvider for MetaRuleProvider<S> {
	fn lookup_rules(&self, m: &Mod) -> impl Future<Output = Result<Vec<Rule>, LookupError>> + Send {
		let query = LookupQuery::from(m);
		async move {
			let results = self.source.lookup_mod_meta(&query).await?;
			/* Only the best match is considered, later results are usually other versions */
			Ok(results.into_iter().next().and_then(|r| r.value.rules).unwrap_or_default())
		}
	}
}

/// Rules held in memory, keyed by mod id.
/// 
/// Mods without an entry have no rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticRules {
	rules: HashMap<ModId, Vec<Rule>>,
}

impl StaticRules {
	/// Reads rules from a JSON object mapping mod ids to rule lists.
	pub fn from_json(json: &str) -> crate::Result<Self> {
		let rules: Self = serde_json::from_str(json)?;
		Ok(rules)
	}

	pub fn add_rule(&mut self, mod_id: impl Into<ModId>, rule: Rule) -> &mut Self {
		self.rules.entry(mod_id.into()).or_default().push(rule);
		self
	}

	pub fn with_rule(mut self, mod_id: impl Into<ModId>, rule: Rule) -> Self {
		self.add_rule(mod_id, rule);
		self
	}

	pub fn rules_for(&self, mod_id: &ModId) -> &[Rule] {
		self.rules.get(mod_id).map(Vec::as_slice).unwrap_or_default()
	}
}

impl RuleProvider for StaticRules {
	fn lookup_rules(&self, m: &Mod) -> impl Future<Output = Result<Vec<Rule>, LookupError>> + Send {
		std::future::ready(Ok(self.rules_for(&m.id).to_vec()))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	struct FixedSource(Result<Vec<LookupResult>, LookupError>);

	impl ModMetaSource for FixedSource {
		fn lookup_mod_meta(&self, _query: &LookupQuery) -> impl Future<Output = Result<Vec<LookupResult>, LookupError>> + Send {
			std::future::ready(self.0.clone())
		}
	}

	fn some_mod() -> Mod {
		Mod::new("a", "a", ModAttributes { file_hash: Some("ff".into()), file_size: Some(10), package_id: Some("1".into()), ..Default::default() })
	}

	#[test]
	fn query_uses_hash_size_and_package() {
		let query = LookupQuery::from(&some_mod());
		assert_eq!(query, LookupQuery { file_hash: Some("ff".into()), file_size: Some(10), package_id: Some("1".into()) });
	}

	#[tokio::test]
	async fn meta_provider_uses_first_result() {
		let results: Vec<LookupResult> = serde_json::from_str(r#"[
			{ "key": "k1", "value": { "rules": [ { "type": "before", "reference": { "packageId": "2" } } ] } },
			{ "key": "k2", "value": { "rules": [ { "type": "after", "reference": { "packageId": "3" } } ] } }
		]"#).unwrap();
		let provider = MetaRuleProvider::new(FixedSource(Ok(results)));
		let rules = provider.lookup_rules(&some_mod()).await.unwrap();
		assert_eq!(rules, vec![Rule::before(Reference::by_package("2"))]);
	}

	#[tokio::test]
	async fn meta_provider_without_results_has_no_rules() {
		let provider = MetaRuleProvider::new(FixedSource(Ok(vec![LookupResult::default()])));
		assert!(provider.lookup_rules(&some_mod()).await.unwrap().is_empty());
		let provider = MetaRuleProvider::new(FixedSource(Ok(vec![])));
		assert!(provider.lookup_rules(&some_mod()).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn meta_provider_passes_failures_through() {
		let provider = MetaRuleProvider::new(FixedSource(Err(LookupError::Unavailable("offline".into()))));
		assert_eq!(provider.lookup_rules(&some_mod()).await, Err(LookupError::Unavailable("offline".into())));
	}

	#[tokio::test]
	async fn static_rules_from_json() {
		let rules = StaticRules::from_json(r#"{ "a": [ { "type": "after", "reference": { "fileHash": "00" } } ] }"#).unwrap();
		assert_eq!(rules.lookup_rules(&some_mod()).await.unwrap(), vec![Rule::after(Reference::by_hash("00"))]);
		let other = Mod::new("b", "b", ModAttributes::default());
		assert!(rules.lookup_rules(&other).await.unwrap().is_empty());
	}
}

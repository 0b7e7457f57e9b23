use modorder::*;
use modorder_test_utils::*;

fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_complete(order: &[ModId], mods: &[Mod]) {
	assert_eq!(order.len(), mods.len(), "order {:?} doesn't cover every mod", order);
	for m in mods {
		assert_eq!(order.iter().filter(|id| **id == m.id).count(), 1, "`{}` should appear exactly once", m.id);
	}
}

#[tokio::test]
async fn mods_without_rules_keep_input_order() {
	init_logging();
	let mods = plain_mods(&["x", "y", "z"]);

	let first = sort_mods(&mods, StaticRules::default()).await.expect("sort failed");
	let second = sort_mods(&mods, StaticRules::default()).await.expect("sort failed");

	assert_complete(&first.order, &mods);
	assert_eq!(ids(&first.order), vec!["x", "y", "z"]);
	assert_eq!(first, second);
	assert!(!first.is_degraded());
}

#[tokio::test]
async fn before_rule_orders_owner_first() {
	init_logging();
	let mods = vec![package_mod("b", "200", "1.0.0"), package_mod("a", "100", "1.0.0")];
	let rules = StaticRules::default().with_rule("a", Rule::before(Reference::by_package("200")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["a", "b"]);
}

#[tokio::test]
async fn after_rule_orders_reference_first() {
	init_logging();
	let mods = vec![package_mod("a", "100", "1.0.0"), package_mod("b", "200", "1.0.0")];
	let rules = StaticRules::default().with_rule("a", Rule::after(Reference::by_package("200")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["b", "a"]);
}

#[tokio::test]
async fn hash_reference_selects_by_hash_alone() {
	init_logging();
	/* Same package, different archives. The rule names the second archive by hash */
	let mut first = package_mod("first", "100", "1.0.0");
	first.attributes.file_hash = Some("aaaa".into());
	let mut second = package_mod("second", "100", "1.0.0");
	second.attributes.file_hash = Some("bbbb".into());
	let owner = package_mod("owner", "300", "1.0.0");
	let mods = vec![first, second, owner];

	let rules = StaticRules::default().with_rule("owner", Rule::before(Reference::by_hash("bbbb")));
	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	let pos = |id: &str| outcome.position(&id.into()).expect("mod missing from order");
	assert!(pos("owner") < pos("second"));
	assert_eq!(ids(&outcome.order), vec!["first", "owner", "second"]);
}

#[tokio::test]
async fn unsatisfied_version_range_adds_no_edge() {
	init_logging();
	let mods = vec![package_mod("lib", "100", "1.4.0"), package_mod("user", "200", "1.0.0")];
	let rules = StaticRules::default()
		.with_rule("lib", Rule::after(Reference::by_package("200").with_version_match(">=2.0.0")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["lib", "user"]);
	assert!(!outcome.is_degraded());
}

#[tokio::test]
async fn reference_to_missing_mod_is_skipped_silently() {
	init_logging();
	let mods = plain_mods(&["a", "b"]);
	let rules = StaticRules::default().with_rule("b", Rule::before(Reference::by_package("not-installed")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["a", "b"]);
	assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn two_mod_cycle_is_reported_and_completes() {
	init_logging();
	let mods = vec![package_mod("a", "1", "1.0.0"), package_mod("b", "2", "1.0.0")];
	let rules = StaticRules::default()
		.with_rule("a", Rule::before(Reference::by_package("2")))
		.with_rule("b", Rule::before(Reference::by_package("1")));

	let sink = std::sync::Arc::new(diagnostics::CollectingSink::default());
	let outcome = SortBuilder::new(rules)
		.shared_diagnostics(sink.clone())
		.sort(&mods)
		.await
		.expect("sort failed");

	assert_complete(&outcome.order, &mods);
	assert_eq!(ids(&outcome.order), vec!["a", "b"]);
	match outcome.warnings.as_slice() {
		[SortWarning::CycleDetected { mods, edges }] => {
			assert_eq!(ids(mods), vec!["a", "b"]);
			assert_eq!(edges.len(), 2);
		},
		other => panic!("expected a single cycle warning, got {:?}", other),
	}

	let reported = sink.take();
	assert_eq!(reported.len(), 1);
	assert_eq!(reported[0].severity, diagnostics::Severity::Warning);
}

#[tokio::test]
async fn cycle_does_not_disturb_the_rest() {
	init_logging();
	/* first <-> second, last before the cycle, tail after it */
	let mods = vec![
		package_mod("tail", "0", "1.0.0"),
		package_mod("first", "1", "1.0.0"),
		package_mod("second", "2", "1.0.0"),
		package_mod("last", "3", "1.0.0"),
	];
	let rules = StaticRules::default()
		.with_rule("first", Rule::after(Reference::by_package("2")))
		.with_rule("second", Rule::after(Reference::by_package("1")))
		.with_rule("last", Rule::before(Reference::by_package("1")))
		.with_rule("tail", Rule::after(Reference::by_package("2")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["last", "first", "second", "tail"]);
	assert_eq!(outcome.warnings.len(), 1);
}

#[tokio::test]
async fn self_reference_is_not_a_cycle() {
	init_logging();
	let mods = vec![package_mod("a", "1", "1.0.0"), package_mod("b", "2", "1.0.0")];
	let rules = StaticRules::default().with_rule("a", Rule::after(Reference::by_package("1")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["a", "b"]);
	assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn duplicate_ids_fail_the_sort() {
	init_logging();
	let mods = plain_mods(&["a", "b", "a"]);
	let result = sort_mods(&mods, StaticRules::default()).await;
	assert!(matches!(result, Err(Error::DuplicateModId(id)) if id.as_str() == "a"));
}

#[tokio::test]
async fn malformed_reference_is_reported_and_skipped() {
	init_logging();
	let mods = vec![package_mod("a", "1", "1.0.0"), package_mod("b", "2", "1.0.0")];
	let rules = StaticRules::default()
		.with_rule("b", Rule::before(Reference::by_package("1").with_file_expression("(")))
		.with_rule("b", Rule::before(Reference::by_package("1").with_version_match("1.0.0")));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	/* The second, valid rule still applies */
	assert_eq!(ids(&outcome.order), vec!["b", "a"]);
	assert!(matches!(
		outcome.warnings.as_slice(),
		[SortWarning::MalformedReference { mod_id, error: package::ReferenceError::InvalidExpression { .. } }] if mod_id.as_str() == "b"
	));
}

#[tokio::test]
async fn empty_input_sorts_to_empty_order() {
	let outcome = sort_mods(&[], StaticRules::default()).await.expect("sort failed");
	assert!(outcome.order.is_empty());
}

#[tokio::test]
async fn rules_from_metadata_source() {
	init_logging();

	struct JsonSource(serde_json::Value);

	impl ModMetaSource for JsonSource {
		fn lookup_mod_meta(&self, query: &lookup::LookupQuery) -> impl std::future::Future<Output = std::result::Result<Vec<lookup::LookupResult>, LookupError>> + Send {
			let key = query.package_id.clone().unwrap_or_default();
			let results = match self.0.get(&key) {
				Some(v) => serde_json::from_value(v.clone()).map_err(|e| LookupError::Unavailable(e.to_string())),
				None => Ok(Vec::new()),
			};
			std::future::ready(results)
		}
	}

	let source = JsonSource(serde_json::json!({
		"100": [
			{ "key": "100-main", "value": { "fileName": "patch.7z", "rules": [
				{ "type": "after", "reference": { "packageId": "200", "versionMatch": "^2.0.0" } }
			] } }
		]
	}));
	let mods = vec![package_mod("patch", "100", "1.0.0"), package_mod("base", "200", "2.3.1")];

	let outcome = sort_mods(&mods, MetaRuleProvider::new(source)).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["base", "patch"]);
}

#[tokio::test]
async fn mods_hashed_from_disk_resolve_by_hash() {
	init_logging();
	let archive = temp_archive(b"mod archive contents").expect("failed to write archive");
	let attributes = ModAttributes::from_file(archive.path()).expect("failed to hash archive");
	let hash = attributes.file_hash.clone().expect("hash missing");

	let mods = vec![Mod::new("hashed", "hashed", attributes), package_mod("owner", "1", "1.0.0")];
	let rules = StaticRules::default().with_rule("owner", Rule::before(Reference::by_hash(hash)));

	let outcome = sort_mods(&mods, rules).await.expect("sort failed");

	assert_eq!(ids(&outcome.order), vec!["owner", "hashed"]);
}

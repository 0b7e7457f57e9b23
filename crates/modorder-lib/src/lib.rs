//! Computes a load order for a set of installed mods from their "load before" / "load after" rules.
//! 
//! # Usage
//! 1. Describe the installed mods as [`Mod`]s.
//! 1. Provide their rules through a [`RuleProvider`], either directly or by wrapping a [`ModMetaSource`] in a [`MetaRuleProvider`].
//! 1. [`SortBuilder::sort()`] (or the shorthand [`sort_mods()`]) to get a [`SortOutcome`].
//! 1. Show any [`SortWarning`]s to the user, the order itself is always usable.

pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::SortOptions;

pub mod package;
pub use package::Mod;
pub use package::ModId;
pub use package::ModAttributes;
pub use package::Reference;
pub use package::Rule;
pub use package::RuleType;
pub use package::VersionMatch;

pub mod diagnostics;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::SortWarning;

pub mod lookup;
pub use lookup::RuleProvider;
pub use lookup::ModMetaSource;
pub use lookup::MetaRuleProvider;
pub use lookup::StaticRules;
pub use lookup::LookupError;

pub mod resolver;
pub use resolver::resolve;

pub mod load_order;
pub use load_order::SortBuilder;
pub use load_order::SortOutcome;
pub use load_order::sort_mods;

// SPDX-License-Identifier: MIT

//! Form dependency rules
//!
//! Declares that a controlled element is enabled only while its dependants
//! satisfy a set of rules:
//! - rules of one `Dependants` configuration are combined with AND
//! - configurations chained with `Depend::or` are combined with OR
//! - the expression is re-evaluated whenever a dependant fires a watched event

pub mod config;
pub mod controller;
pub mod inspector;
pub mod options;
pub mod registry;
pub mod rules;

pub use config::{Dependant, Dependants, InlineRule, RuleSpec};
pub use controller::{Depend, DependBuilder, Subscription};
pub use inspector::{Predicate, RuleBinding, RuleGroup, RuleSet};
pub use options::{configure, defaults, reset_defaults, Effect, Options, OptionsOverride};
pub use registry::RuleRegistry;
pub use rules::{FnRule, Rule, RuleContext};

use crate::dom::{Host, Selection};
use crate::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Make the element matched by `selector` depend on `dependants`, using the
/// global rules and default options
pub fn attach<'h>(
    host: &'h dyn Host,
    selector: &str,
    dependants: &Dependants,
    overrides: &OptionsOverride,
) -> Result<Depend<'h>> {
    Depend::attach(host, selector, dependants, overrides)
}

/// The process-wide rule registry
pub fn registry() -> &'static RuleRegistry {
    registry::global()
}

/// Register a global rule; an existing rule with the same name is replaced
pub fn register_rule<F>(name: impl Into<String>, f: F)
where
    F: Fn(&Selection, &Value) -> Result<bool> + Send + Sync + 'static,
{
    registry::global().register_fn(name, f);
}

/// Register several global rules
pub fn register_rules<I, S>(rules: I)
where
    I: IntoIterator<Item = (S, Arc<dyn Rule>)>,
    S: Into<String>,
{
    registry::global().register_many(rules);
}

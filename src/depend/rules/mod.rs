// SPDX-License-Identifier: MIT

//! Dependency rules (predicates)
//!
//! A rule compares the current value of a dependant selection with a
//! configured parameter. Rules live in a `RuleRegistry` under a name;
//! `builtin` provides the stock set.

pub mod builtin;

use super::registry::RuleRegistry;
use crate::dom::{FieldValue, Selection};
use crate::error::Result;
use serde_json::Value;

/// What a rule sees when it is evaluated
pub struct RuleContext<'a> {
    /// The dependant elements the rule reads
    pub target: &'a Selection,
    /// Registry the rule was resolved from, for rules defined by other rules
    pub registry: &'a RuleRegistry,
}

impl<'a> RuleContext<'a> {
    pub fn new(target: &'a Selection, registry: &'a RuleRegistry) -> Self {
        Self { target, registry }
    }

    /// Current value of the target
    pub fn value(&self) -> FieldValue {
        self.target.value()
    }

    /// Evaluate another registered rule against the same target
    pub fn invoke(&self, name: &str, param: &Value) -> Result<bool> {
        self.registry.invoke(name, self.target, param)
    }
}

/// A named predicate over a dependant selection and a parameter
pub trait Rule: Send + Sync {
    /// Validate the parameter shape once, when the rule is bound
    fn check_param(&self, _registry: &RuleRegistry, _param: &Value) -> Result<()> {
        Ok(())
    }

    /// Evaluate the rule
    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool>;
}

type RuleFnBox = Box<dyn Fn(&Selection, &Value) -> Result<bool> + Send + Sync>;

/// A rule backed by a plain function, for `register_rule`
pub struct FnRule {
    f: RuleFnBox,
}

impl FnRule {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Selection, &Value) -> Result<bool> + Send + Sync + 'static,
    {
        Self { f: Box::new(f) }
    }
}

impl Rule for FnRule {
    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool> {
        (self.f)(ctx.target, param)
    }
}

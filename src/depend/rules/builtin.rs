// SPDX-License-Identifier: MIT

//! Built-in rules: equal, notEqual, in, notIn, contain, notContain, checked

use super::{Rule, RuleContext};
use crate::depend::registry::RuleRegistry;
use crate::dom::FieldValue;
use crate::error::{DependError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Names and implementations of every built-in rule
pub fn all() -> Vec<(&'static str, Arc<dyn Rule>)> {
    let rules: [(&'static str, Arc<dyn Rule>); 7] = [
        ("equal", Arc::new(Equal)),
        ("notEqual", Arc::new(Negate { base: "equal" })),
        ("in", Arc::new(In)),
        ("notIn", Arc::new(Negate { base: "in" })),
        ("contain", Arc::new(Contain)),
        ("notContain", Arc::new(Negate { base: "contain" })),
        ("checked", Arc::new(Checked)),
    ];
    rules.into()
}

/// Value and parameter have the same shape and the same contents.
/// Lists compare as sorted sets of strings, scalars strictly.
pub struct Equal;

impl Rule for Equal {
    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool> {
        Ok(match (ctx.value(), param) {
            (FieldValue::List(mut values), Value::Array(params)) => {
                let mut params: Vec<String> = params.iter().map(stringify).collect();
                values.sort();
                params.sort();
                values == params
            }
            (FieldValue::Scalar(value), param) => param.as_str() == Some(value.as_str()),
            _ => false,
        })
    }
}

/// The value (or any item of a list value) is one of the parameter's items
pub struct In;

impl In {
    fn items(param: &Value) -> Result<&[Value]> {
        param
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| DependError::invalid_param("in", "parameter must be a list"))
    }
}

impl Rule for In {
    fn check_param(&self, _registry: &RuleRegistry, param: &Value) -> Result<()> {
        Self::items(param).map(|_| ())
    }

    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool> {
        let items = Self::items(param)?;
        Ok(match ctx.value() {
            FieldValue::Scalar(value) => contains(items, &value),
            FieldValue::List(values) => values.iter().any(|v| contains(items, v)),
            FieldValue::Missing => false,
        })
    }
}

/// A list value holds every item of a list parameter, or the scalar parameter
pub struct Contain;

impl Contain {
    fn check_shape(param: &Value) -> Result<()> {
        match param {
            Value::Null | Value::Object(_) => Err(DependError::invalid_param(
                "contain",
                "parameter must be a value or a list of values",
            )),
            _ => Ok(()),
        }
    }
}

impl Rule for Contain {
    fn check_param(&self, _registry: &RuleRegistry, param: &Value) -> Result<()> {
        Self::check_shape(param)
    }

    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool> {
        Self::check_shape(param)?;
        let values = match ctx.value() {
            FieldValue::List(values) => values,
            _ => {
                return Err(DependError::invalid_param(
                    "contain",
                    format!(
                        "<{}> does not hold a list value (e.g. a checkbox group)",
                        ctx.target
                    ),
                ))
            }
        };

        Ok(match param {
            Value::Array(items) => items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| values.iter().any(|v| v == s))),
            other => other
                .as_str()
                .is_some_and(|s| values.iter().any(|v| v == s)),
        })
    }
}

/// The checked state of the target equals the boolean parameter. A target
/// without a checked state (select, text, button, nothing) fails either way.
pub struct Checked;

impl Checked {
    fn expected(param: &Value) -> Result<bool> {
        param
            .as_bool()
            .ok_or_else(|| DependError::invalid_param("checked", "parameter must be true or false"))
    }
}

impl Rule for Checked {
    fn check_param(&self, _registry: &RuleRegistry, param: &Value) -> Result<()> {
        Self::expected(param).map(|_| ())
    }

    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool> {
        let expected = Self::expected(param)?;
        Ok(ctx.target.checked() == Some(expected))
    }
}

/// Negation of another rule, looked up by name at evaluation time so that
/// overriding the base rule also changes its negation.
pub struct Negate {
    pub base: &'static str,
}

impl Rule for Negate {
    fn check_param(&self, registry: &RuleRegistry, param: &Value) -> Result<()> {
        let base = registry
            .get(self.base)
            .ok_or_else(|| DependError::invalid_rule(self.base))?;
        base.check_param(registry, param)
    }

    fn test(&self, ctx: &RuleContext<'_>, param: &Value) -> Result<bool> {
        Ok(!ctx.invoke(self.base, param)?)
    }
}

fn contains(items: &[Value], value: &str) -> bool {
    items.iter().any(|item| item.as_str() == Some(value))
}

/// String form of a parameter item, used when comparing list contents
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// SPDX-License-Identifier: MIT

use super::rules::{builtin, FnRule, Rule, RuleContext};
use crate::dom::Selection;
use crate::error::{DependError, Result};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL: Lazy<RuleRegistry> = Lazy::new(RuleRegistry::with_builtins);

/// The process-wide registry used by `attach` and `register_rule`
pub fn global() -> &'static RuleRegistry {
    &GLOBAL
}

/// Name → rule mapping. Clones share the same table.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: Arc<RwLock<HashMap<String, Arc<dyn Rule>>>>,
}

impl RuleRegistry {
    /// A registry with no rules at all
    pub fn empty() -> Self {
        Self {
            rules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A registry seeded with the built-in rules
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register_many(builtin::all());
        registry
    }

    /// Independent copy of the current table
    pub fn snapshot(&self) -> Self {
        let rules = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            rules: Arc::new(RwLock::new(rules)),
        }
    }

    /// Register a rule, replacing any rule (built-in included) with that name
    pub fn register(&self, name: impl Into<String>, rule: Arc<dyn Rule>) {
        let name = name.into();
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        if rules.insert(name.clone(), rule).is_some() {
            log::debug!("Rule '{}' overridden", name);
        }
    }

    /// Register a rule from a plain function
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&Selection, &Value) -> Result<bool> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnRule::new(f)));
    }

    /// Register several rules; later entries win on duplicate names
    pub fn register_many<I, S>(&self, rules: I)
    where
        I: IntoIterator<Item = (S, Arc<dyn Rule>)>,
        S: Into<String>,
    {
        for (name, rule) in rules {
            self.register(name, rule);
        }
    }

    /// Builder form of `register`
    pub fn with_rule(self, name: impl Into<String>, rule: Arc<dyn Rule>) -> Self {
        self.register(name, rule);
        self
    }

    /// Builder form of `register_many`
    pub fn with_rules<I, S>(self, rules: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn Rule>)>,
        S: Into<String>,
    {
        self.register_many(rules);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Rule>> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Evaluate the rule registered under `name`
    pub fn invoke(&self, name: &str, target: &Selection, param: &Value) -> Result<bool> {
        // The lock is released before the rule runs; rules may call back in.
        let rule = self.get(name).ok_or_else(|| DependError::invalid_rule(name))?;
        rule.test(&RuleContext::new(target, self), param)
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{ElementDef, MemoryForm};
    use crate::dom::{ElementKind, Host};
    use serde_json::json;

    fn form() -> MemoryForm {
        MemoryForm::from_defs(vec![ElementDef::new("age", ElementKind::Text).value("42")]).unwrap()
    }

    #[test]
    fn test_builtins_registered() {
        let registry = RuleRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["checked", "contain", "equal", "in", "notContain", "notEqual", "notIn"]
        );
        assert!(RuleRegistry::empty().names().is_empty());
    }

    #[test]
    fn test_register_and_invoke_custom_rule() {
        let form = form();
        let registry = RuleRegistry::with_builtins();
        registry.register_fn("longerThan", |target, param| {
            let min = param.as_u64().unwrap_or(0) as usize;
            Ok(target.value().as_str().map(str::len).unwrap_or(0) > min)
        });

        assert!(registry.has("longerThan"));
        let target = form.select("#age");
        assert!(registry.invoke("longerThan", &target, &json!(1)).unwrap());
        assert!(!registry.invoke("longerThan", &target, &json!(2)).unwrap());
    }

    #[test]
    fn test_invoke_unknown_rule() {
        let form = form();
        let registry = RuleRegistry::with_builtins();
        let err = registry
            .invoke("bogus", &form.select("#age"), &json!(null))
            .unwrap_err();
        assert!(matches!(err, DependError::InvalidRule { ref name } if name == "bogus"));
    }

    #[test]
    fn test_register_overwrites_builtin() {
        let form = form();
        let registry = RuleRegistry::with_builtins();
        let target = form.select("#age");
        assert!(!registry.invoke("equal", &target, &json!("x")).unwrap());

        registry.register_fn("equal", |_, _| Ok(true));
        assert!(registry.invoke("equal", &target, &json!("x")).unwrap());
    }

    #[test]
    fn test_register_many_later_wins() {
        let form = form();
        let always =
            |result: bool| -> Arc<dyn Rule> { Arc::new(FnRule::new(move |_, _| Ok(result))) };
        let registry =
            RuleRegistry::empty().with_rules(vec![("flag", always(false)), ("flag", always(true))]);
        assert!(registry
            .invoke("flag", &form.select("#age"), &json!(null))
            .unwrap());
    }

    #[test]
    fn test_registry_is_clone() {
        let registry = RuleRegistry::empty();
        let cloned = registry.clone();
        cloned.register_fn("shared", |_, _| Ok(true));
        assert!(registry.has("shared"));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let registry = RuleRegistry::with_builtins();
        let snapshot = registry.snapshot();
        snapshot.register_fn("local", |_, _| Ok(true));
        assert!(snapshot.has("local"));
        assert!(!registry.has("local"));
        assert!(snapshot.has("equal"));
    }
}

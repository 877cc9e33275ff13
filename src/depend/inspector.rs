// SPDX-License-Identifier: MIT

//! Rule bindings and their AND / OR composition
//!
//! - `RuleBinding` - one rule bound to a dependant selection and a parameter
//! - `RuleSet` - bindings combined with AND (one dependants configuration)
//! - `RuleGroup` - rule sets combined with OR (the chain built by `.or()`)

use super::config::InlineRule;
use super::registry::RuleRegistry;
use super::rules::{Rule, RuleContext};
use crate::dom::Selection;
use crate::error::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The predicate a binding runs
#[derive(Clone)]
pub enum Predicate {
    /// Rule resolved from a registry at bind time
    Named { name: String, rule: Arc<dyn Rule> },
    /// User-supplied closure; it receives only the target selection
    Inline { label: String, predicate: InlineRule },
}

impl Predicate {
    pub fn label(&self) -> &str {
        match self {
            Predicate::Named { name, .. } => name,
            Predicate::Inline { label, .. } => label,
        }
    }
}

/// One predicate bound to a dependant and a parameter
#[derive(Clone)]
pub struct RuleBinding {
    predicate: Predicate,
    target: Selection,
    param: Value,
    registry: RuleRegistry,
}

impl RuleBinding {
    pub fn named(
        name: impl Into<String>,
        rule: Arc<dyn Rule>,
        target: Selection,
        param: Value,
        registry: RuleRegistry,
    ) -> Self {
        Self {
            predicate: Predicate::Named {
                name: name.into(),
                rule,
            },
            target,
            param,
            registry,
        }
    }

    pub fn inline(label: impl Into<String>, predicate: InlineRule, target: Selection) -> Self {
        Self {
            predicate: Predicate::Inline {
                label: label.into(),
                predicate,
            },
            target,
            param: Value::Null,
            registry: RuleRegistry::empty(),
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn target(&self) -> &Selection {
        &self.target
    }

    pub fn param(&self) -> &Value {
        &self.param
    }

    /// Run the predicate against the current state of the target
    pub fn exec(&self) -> Result<bool> {
        match &self.predicate {
            Predicate::Named { rule, .. } => {
                let ctx = RuleContext::new(&self.target, &self.registry);
                rule.test(&ctx, &self.param)
            }
            Predicate::Inline { predicate, .. } => Ok(predicate(&self.target)),
        }
    }
}

impl fmt::Debug for RuleBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBinding")
            .field("rule", &self.predicate.label())
            .field("target", &self.target.selector())
            .field("param", &self.param)
            .finish()
    }
}

/// Bindings combined with AND. Empty passes.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    bindings: Vec<RuleBinding>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, binding: RuleBinding) {
        self.bindings.push(binding);
    }

    pub fn bindings(&self) -> &[RuleBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// True when every binding passes; stops at the first failure
    pub fn check(&self) -> Result<bool> {
        for binding in &self.bindings {
            if !binding.exec()? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Rule sets combined with OR. Empty fails.
#[derive(Debug, Clone, Default)]
pub struct RuleGroup {
    sets: Vec<RuleSet>,
}

impl RuleGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, set: RuleSet) {
        self.sets.push(set);
    }

    pub fn sets(&self) -> &[RuleSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// True when any rule set passes; stops at the first success
    pub fn check(&self) -> Result<bool> {
        for set in &self.sets {
            if set.check()? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{ElementDef, MemoryForm};
    use crate::dom::{ElementKind, Host};
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn form() -> MemoryForm {
        MemoryForm::from_defs(vec![ElementDef::new("x", ElementKind::Text).value("1")]).unwrap()
    }

    fn constant(form: &MemoryForm, result: bool) -> RuleBinding {
        RuleBinding::inline("constant", Rc::new(move |_: &Selection| result), form.select("#x"))
    }

    fn counting(form: &MemoryForm, result: bool, calls: Rc<Cell<usize>>) -> RuleBinding {
        RuleBinding::inline(
            "counting",
            Rc::new(move |_: &Selection| {
                calls.set(calls.get() + 1);
                result
            }),
            form.select("#x"),
        )
    }

    fn set_of(bindings: Vec<RuleBinding>) -> RuleSet {
        let mut set = RuleSet::new();
        for b in bindings {
            set.add(b);
        }
        set
    }

    #[test]
    fn test_named_binding_uses_param() {
        let form = form();
        let registry = RuleRegistry::with_builtins();
        let rule = registry.get("equal").unwrap();
        let pass = RuleBinding::named(
            "equal",
            rule.clone(),
            form.select("#x"),
            json!("1"),
            registry.clone(),
        );
        let fail = RuleBinding::named("equal", rule, form.select("#x"), json!("2"), registry);
        assert!(pass.exec().unwrap());
        assert!(!fail.exec().unwrap());
        assert_eq!(pass.predicate().label(), "equal");
        assert_eq!(pass.param(), &json!("1"));
        assert_eq!(pass.target().ids(), vec!["x"]);
    }

    #[test]
    fn test_empty_set_passes() {
        assert!(RuleSet::new().check().unwrap());
    }

    #[test]
    fn test_set_is_and() {
        let form = form();
        assert!(set_of(vec![constant(&form, true), constant(&form, true)])
            .check()
            .unwrap());
        assert!(!set_of(vec![constant(&form, true), constant(&form, false)])
            .check()
            .unwrap());
        assert!(!set_of(vec![constant(&form, false), constant(&form, true)])
            .check()
            .unwrap());
    }

    #[test]
    fn test_set_short_circuits() {
        let form = form();
        let calls = Rc::new(Cell::new(0));
        let set = set_of(vec![
            constant(&form, false),
            counting(&form, true, calls.clone()),
        ]);
        assert!(!set.check().unwrap());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_empty_group_fails() {
        assert!(!RuleGroup::new().check().unwrap());
    }

    #[test]
    fn test_group_is_or() {
        let form = form();
        let mut group = RuleGroup::new();
        group.add(set_of(vec![constant(&form, false)]));
        assert!(!group.check().unwrap());
        group.add(set_of(vec![constant(&form, true), constant(&form, true)]));
        assert!(group.check().unwrap());
        assert_eq!(group.len(), 2);
        assert_eq!(group.sets()[1].bindings().len(), 2);
        assert!(group.sets()[1]
            .bindings()
            .iter()
            .all(|b| b.predicate().label() == "constant"));
    }

    #[test]
    fn test_group_short_circuits() {
        let form = form();
        let calls = Rc::new(Cell::new(0));
        let mut group = RuleGroup::new();
        group.add(set_of(vec![constant(&form, true)]));
        group.add(set_of(vec![counting(&form, false, calls.clone())]));
        assert!(group.check().unwrap());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_errors_propagate() {
        let form = form();
        let registry = RuleRegistry::with_builtins();
        let rule = registry.get("in").unwrap();
        let bad = RuleBinding::named("in", rule, form.select("#x"), json!("1"), registry);
        let mut group = RuleGroup::new();
        group.add(set_of(vec![bad]));
        assert!(group.check().is_err());
    }
}

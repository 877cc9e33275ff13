// SPDX-License-Identifier: MIT

//! Dependency controller
//!
//! Ties a controlled element to its dependants: builds the rule expression,
//! subscribes to the dependants' events and applies the pass / not-pass
//! effect every time one of them fires.

use super::config::{Dependants, RuleSpec};
use super::inspector::{RuleBinding, RuleGroup, RuleSet};
use super::options::{self, Options, OptionsOverride};
use super::registry::{self, RuleRegistry};
use crate::dom::{Event, Host, Selection};
use crate::error::{DependError, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A watched (dependant, event) pair
#[derive(Debug, Clone)]
pub struct Subscription {
    pub target: Selection,
    pub event: String,
}

/// State shared between the controller handle and its listeners
struct Shared {
    element: Selection,
    options: Options,
    registry: RuleRegistry,
    group: RefCell<RuleGroup>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl Shared {
    fn evaluate(&self) -> Result<bool> {
        self.group.borrow().check()
    }

    /// Listener body: evaluate and apply the matching effect
    fn dispatch(&self, dependant: &str, event: &Event) -> Result<()> {
        let result = self.evaluate()?;
        if self.options.debug {
            log::info!("{}", trace(&self.element, dependant, event, result));
        }

        if result {
            (self.options.on_pass)(&self.element);
        } else {
            (self.options.on_not_pass)(&self.element);
        }
        Ok(())
    }
}

/// Debug line for one evaluation
fn trace(element: &Selection, dependant: &str, event: &Event, result: bool) -> String {
    format!(
        "Element <{}>; dependant <{}> ({}); event: {}; result: {}",
        element, dependant, event.target, event.name, result
    )
}

/// Handle to an armed dependency controller
pub struct Depend<'h> {
    host: &'h dyn Host,
    shared: Rc<Shared>,
}

impl<'h> Depend<'h> {
    /// Builder for controllers with their own registry or base options
    pub fn builder() -> DependBuilder {
        DependBuilder::new()
    }

    /// Attach to the element matched by `selector` using the global registry
    /// and defaults
    pub fn attach(
        host: &'h dyn Host,
        selector: &str,
        dependants: &Dependants,
        overrides: &OptionsOverride,
    ) -> Result<Self> {
        Self::builder()
            .options(overrides.clone())
            .attach(host, selector, dependants)
    }

    fn create(
        host: &'h dyn Host,
        element: Selection,
        options: Options,
        registry: RuleRegistry,
        dependants: &Dependants,
    ) -> Result<Self> {
        (options.on_init)(&element);

        let depend = Self {
            host,
            shared: Rc::new(Shared {
                element,
                options,
                registry,
                group: RefCell::new(RuleGroup::new()),
                subscriptions: RefCell::new(Vec::new()),
            }),
        };
        depend.bind(dependants)?;
        Ok(depend)
    }

    /// Add another rule set, combined with the existing ones by OR
    pub fn or(&self, dependants: &Dependants) -> Result<&Self> {
        self.bind(dependants)?;
        Ok(self)
    }

    /// Fire every watched event once, in subscription order
    pub fn exec(&self) -> Result<()> {
        let subscriptions = self.shared.subscriptions.borrow().clone();
        for sub in &subscriptions {
            self.host.trigger(&sub.target, &sub.event)?;
        }
        Ok(())
    }

    /// Evaluate the whole expression against the current values, without
    /// applying any effect
    pub fn evaluate(&self) -> Result<bool> {
        self.shared.evaluate()
    }

    /// The controlled element
    pub fn element(&self) -> &Selection {
        &self.shared.element
    }

    /// Effective options
    pub fn options(&self) -> &Options {
        &self.shared.options
    }

    /// Watched (dependant, event) pairs, in the order they were added
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.shared.subscriptions.borrow().clone()
    }

    /// Number of OR-combined rule sets
    pub fn rule_sets(&self) -> usize {
        self.shared.group.borrow().len()
    }

    /// Resolve and validate every dependant, then subscribe. Nothing is
    /// subscribed or added unless the whole configuration is valid.
    fn bind(&self, dependants: &Dependants) -> Result<()> {
        let mut set = RuleSet::new();
        let mut watches: Vec<(Selection, Vec<String>)> = Vec::new();

        for (selector, dependant) in dependants.iter() {
            let target = self.host.select(selector);
            if target.is_empty() {
                return Err(DependError::not_found(selector));
            }

            for spec in &dependant.rules {
                set.add(self.binding(spec, &target)?);
            }

            let events = dependant
                .events
                .clone()
                .unwrap_or_else(|| self.shared.options.events.clone());
            watches.push((target, events));
        }

        for (target, events) in watches {
            for event in events {
                let shared = Rc::clone(&self.shared);
                let selector = target.selector().to_string();
                self.host.listen(
                    &target,
                    &event,
                    Rc::new(move |fired: &Event| shared.dispatch(&selector, fired)),
                );
                log::debug!("<{}> watches <{}> on '{}'", self.shared.element, target, event);
                self.shared
                    .subscriptions
                    .borrow_mut()
                    .push(Subscription { target: target.clone(), event });
            }
        }

        self.shared.group.borrow_mut().add(set);
        Ok(())
    }

    fn binding(&self, spec: &RuleSpec, target: &Selection) -> Result<RuleBinding> {
        match spec {
            RuleSpec::Named { name, param } => {
                let registry = &self.shared.registry;
                let rule = registry
                    .get(name)
                    .ok_or_else(|| DependError::invalid_rule(name.as_str()))?;
                rule.check_param(registry, param)?;
                Ok(RuleBinding::named(
                    name.as_str(),
                    rule,
                    target.clone(),
                    param.clone(),
                    registry.clone(),
                ))
            }
            RuleSpec::Inline { label, predicate } => Ok(RuleBinding::inline(
                label.as_str(),
                predicate.clone(),
                target.clone(),
            )),
        }
    }
}

impl fmt::Debug for Depend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Depend")
            .field("element", &self.shared.element)
            .field("options", &self.shared.options)
            .field("group", &*self.shared.group.borrow())
            .field("subscriptions", &*self.shared.subscriptions.borrow())
            .finish()
    }
}

/// Configures a controller before attaching it
#[derive(Debug, Default)]
pub struct DependBuilder {
    registry: Option<RuleRegistry>,
    defaults: Option<Options>,
    overrides: OptionsOverride,
}

impl DependBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve rules from this registry instead of the global one
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Base options instead of the global defaults
    pub fn defaults(mut self, defaults: Options) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Per-controller overrides, layered on the base options
    pub fn options(mut self, overrides: OptionsOverride) -> Self {
        self.overrides = overrides;
        self
    }

    /// Attach to the element matched by `selector`
    pub fn attach<'h>(
        self,
        host: &'h dyn Host,
        selector: &str,
        dependants: &Dependants,
    ) -> Result<Depend<'h>> {
        let element = host.select(selector);
        if element.is_empty() {
            return Err(DependError::not_found(selector));
        }
        self.attach_to(host, element, dependants)
    }

    /// Attach to an already resolved element
    pub fn attach_to<'h>(
        self,
        host: &'h dyn Host,
        element: Selection,
        dependants: &Dependants,
    ) -> Result<Depend<'h>> {
        let base = self.defaults.unwrap_or_else(options::defaults);
        let options = base.merged(&self.overrides);
        let registry = self.registry.unwrap_or_else(|| registry::global().clone());
        Depend::create(host, element, options, registry, dependants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depend::config::Dependant;
    use crate::dom::memory::{ElementDef, MemoryForm};
    use crate::dom::ElementKind;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn form() -> MemoryForm {
        MemoryForm::from_defs(vec![
            ElementDef::new("submit", ElementKind::Button),
            ElementDef::new("yes", ElementKind::Radio)
                .name("agree")
                .value("yes"),
            ElementDef::new("no", ElementKind::Radio)
                .name("agree")
                .value("no"),
            ElementDef::new("email", ElementKind::Text).value(""),
        ])
        .unwrap()
    }

    fn builder() -> DependBuilder {
        Depend::builder()
            .registry(RuleRegistry::with_builtins())
            .defaults(Options::default())
    }

    fn agree() -> Dependants {
        Dependants::new().on("[name=agree]", Dependant::new().rule("equal", "yes"))
    }

    #[test]
    fn test_attach_disables_and_arms() {
        let form = form();
        let depend = builder().attach(&form, "#submit", &agree()).unwrap();

        assert!(!form.is_enabled("submit").unwrap());
        assert_eq!(depend.rule_sets(), 1);
        assert_eq!(depend.subscriptions().len(), 1);
        // one listener per radio of the group
        assert_eq!(form.listener_count(), 2);

        form.choose("yes").unwrap();
        form.fire("#yes", "change").unwrap();
        assert!(form.is_enabled("submit").unwrap());

        form.choose("no").unwrap();
        form.fire("#no", "change").unwrap();
        assert!(!form.is_enabled("submit").unwrap());
    }

    #[test]
    fn test_unwatched_event_does_nothing() {
        let form = form();
        let _depend = builder().attach(&form, "#submit", &agree()).unwrap();
        form.choose("yes").unwrap();
        form.fire("#yes", "click").unwrap();
        assert!(!form.is_enabled("submit").unwrap());
    }

    #[test]
    fn test_missing_controlled_element() {
        let form = form();
        let err = builder().attach(&form, "#nope", &agree()).unwrap_err();
        assert!(matches!(err, DependError::SelectorNotFound { .. }));
    }

    #[test]
    fn test_missing_dependant_attaches_nothing() {
        let form = form();
        let dependants = Dependants::new()
            .on("#email", Dependant::new().rule("notEqual", ""))
            .on("#ghost", Dependant::new().rule("equal", "x"));
        let err = builder().attach(&form, "#submit", &dependants).unwrap_err();
        assert!(
            matches!(err, DependError::SelectorNotFound { ref selector } if selector == "#ghost")
        );
        assert_eq!(form.listener_count(), 0);
    }

    #[test]
    fn test_invalid_rule_name() {
        let form = form();
        let dependants = Dependants::new().on("#email", Dependant::new().rule("bogus", "x"));
        let err = builder().attach(&form, "#submit", &dependants).unwrap_err();
        assert!(matches!(err, DependError::InvalidRule { ref name } if name == "bogus"));
        assert_eq!(form.listener_count(), 0);
    }

    #[test]
    fn test_invalid_param_fails_at_bind() {
        let form = form();
        let dependants = Dependants::new().on("#yes", Dependant::new().rule("checked", "true"));
        let err = builder().attach(&form, "#submit", &dependants).unwrap_err();
        assert!(matches!(err, DependError::InvalidParam { .. }));
    }

    #[test]
    fn test_init_runs_once() {
        let form = form();
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = inits.clone();
        let depend = builder()
            .options(OptionsOverride::new().on_init(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .attach(&form, "#submit", &agree())
            .unwrap();
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        // on_init replaced: the button stays enabled
        assert!(form.is_enabled("submit").unwrap());

        depend
            .or(&Dependants::new().on("#email", Dependant::new().rule("equal", "x")))
            .unwrap();
        assert_eq!(depend.rule_sets(), 2);
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inline_rule_sees_later_groups() {
        let form = form();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let depend = builder().attach(&form, "#submit", &agree()).unwrap();
        depend
            .or(&Dependants::new().on(
                "#email",
                Dependant::new().custom("count", move |_| {
                    counter.set(counter.get() + 1);
                    true
                }),
            ))
            .unwrap();

        // a radio event evaluates the group added later by `or`
        form.fire("#no", "change").unwrap();
        assert_eq!(calls.get(), 1);
        assert!(form.is_enabled("submit").unwrap());

        // the first set passes, so the inline rule is skipped
        form.choose("yes").unwrap();
        form.fire("#yes", "change").unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_or_combines_sets() {
        let form = form();
        let depend = builder().attach(&form, "#submit", &agree()).unwrap();
        depend
            .or(&Dependants::new().on("#email", Dependant::new().rule("equal", "a@b.c")))
            .unwrap();

        form.set_value("email", "a@b.c").unwrap();
        form.fire("#email", "change").unwrap();
        assert!(form.is_enabled("submit").unwrap());

        form.set_value("email", "").unwrap();
        form.choose("yes").unwrap();
        form.fire("#yes", "change").unwrap();
        assert!(form.is_enabled("submit").unwrap());

        form.choose("no").unwrap();
        form.fire("#email", "change").unwrap();
        assert!(!form.is_enabled("submit").unwrap());
    }

    #[test]
    fn test_failed_or_keeps_previous_state() {
        let form = form();
        let depend = builder().attach(&form, "#submit", &agree()).unwrap();
        let listeners = form.listener_count();
        let result = depend.or(&Dependants::new().on("#email", Dependant::new().rule("in", "x")));
        assert!(result.is_err());
        assert_eq!(depend.rule_sets(), 1);
        assert_eq!(form.listener_count(), listeners);
        assert_eq!(depend.subscriptions().len(), 1);
    }

    #[test]
    fn test_dependant_events_override() {
        let form = form();
        let dependants = Dependants::new().on(
            "#email",
            Dependant::new().rule("notEqual", "").events(["keyup", "blur"]),
        );
        let depend = builder().attach(&form, "#submit", &dependants).unwrap();
        let events: Vec<String> = depend.subscriptions().into_iter().map(|s| s.event).collect();
        assert_eq!(events, vec!["keyup", "blur"]);

        form.set_value("email", "x").unwrap();
        form.fire("#email", "change").unwrap();
        assert!(!form.is_enabled("submit").unwrap());
        form.fire("#email", "blur").unwrap();
        assert!(form.is_enabled("submit").unwrap());
    }

    #[test]
    fn test_exec_replays_subscriptions() {
        let form = form();
        let depend = builder().attach(&form, "#submit", &agree()).unwrap();
        form.choose("yes").unwrap();
        depend.exec().unwrap();
        assert!(form.is_enabled("submit").unwrap());
        assert!(depend.evaluate().unwrap());
    }

    #[test]
    fn test_debug_trace_names_every_part() {
        let form = form();
        let event = Event {
            name: "change".to_string(),
            target: "yes".to_string(),
        };
        let line = trace(&form.select("#submit"), "[name=agree]", &event, true);
        assert_eq!(
            line,
            "Element <#submit>; dependant <[name=agree]> (yes); event: change; result: true"
        );
        assert!(trace(&form.select("#submit"), "#x", &event, false).ends_with("result: false"));
    }

    #[test]
    fn test_evaluate_has_no_effect() {
        let form = form();
        let depend = builder().attach(&form, "#submit", &agree()).unwrap();
        form.choose("yes").unwrap();
        assert!(depend.evaluate().unwrap());
        assert!(!form.is_enabled("submit").unwrap());
    }
}

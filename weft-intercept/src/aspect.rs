// WEFT - weft-intercept
// Module: Aspects
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Aspects group advices under a default selector.
//!
//! Applying an aspect weaves its advices in registration order. Since
//! weaving puts the newest advice at the head of each list, advices of the
//! same kind run in reverse registration order: with `[a1, a2, a3]` the
//! befores run `a3, a2, a1` and `a3` is the outermost around advice.

use weft_error::{Error, Result};

use crate::{
    advice::{Advice, Behavior},
    context::ExecutionContext,
    object::Object,
    selector::Selector,
    values::Value,
    weaver::{Proceed, Weaver},
};

/// An ordered group of advices plus the selector they default to
#[derive(Debug, Clone, Default)]
pub struct Aspect {
    advices:  Vec<Advice>,
    selector: Selector,
}

impl Aspect {
    /// Create an aspect selecting every member reachable on the target's
    /// member template
    pub fn new(advices: impl IntoIterator<Item = Advice>) -> Self {
        Self {
            advices:  advices.into_iter().collect(),
            selector: Selector::default(),
        }
    }

    /// Replace the default selector
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the default selector in place
    pub fn set_selector(&mut self, selector: Selector) -> &mut Self {
        self.selector = selector;
        self
    }

    /// The default selector
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The advices, in registration order
    #[must_use]
    pub fn advices(&self) -> &[Advice] {
        &self.advices
    }

    /// Weave every advice onto every target.
    ///
    /// Each advice uses its own selector when it has one, the aspect's
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Fails when a selector cannot be resolved against a target, e.g. a
    /// template scope on an object without a member template. Advices
    /// woven before the failure stay in place.
    pub fn apply<'a>(&self, targets: impl IntoIterator<Item = &'a Object>) -> Result<()> {
        for target in targets {
            for advice in &self.advices {
                let selector = advice.selector().unwrap_or(&self.selector);
                inject(target, selector, advice.behavior())?;
            }
        }
        Ok(())
    }

    /// Weave onto a single target, returning the aspect for chaining
    ///
    /// # Errors
    ///
    /// See [`Aspect::apply`].
    pub fn apply_to(&self, target: &Object) -> Result<&Self> {
        self.apply([target])?;
        Ok(self)
    }
}

impl FromIterator<Advice> for Aspect {
    fn from_iter<I: IntoIterator<Item = Advice>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Weave one behavior onto the members `selector` picks on `target`
///
/// Data members are skipped silently.
///
/// # Errors
///
/// Returns `NO_MEMBER_TEMPLATE` if a template scope is used on an object
/// without a member template.
pub fn inject(target: &Object, selector: &Selector, behavior: &Behavior) -> Result<()> {
    let weaver = Weaver::global();
    for candidate in selector.resolve(target)? {
        weaver.weave(&candidate, behavior);
    }
    Ok(())
}

/// Chainable shorthand for weaving single behaviors onto one target
///
/// ```
/// use weft_intercept::prelude::*;
///
/// let counter = Object::new();
/// counter.define_method("next", |_, _| Ok(Value::from(1)));
///
/// Injector::new(&counter, Selector::own_members())
///     .before(|_, _| Ok(()))?
///     .after_returning(|_, value| Ok(Value::from(value.try_as_i64()? + 1)))?;
///
/// assert_eq!(counter.invoke("next", &[])?, Value::from(2));
/// # Ok::<(), weft_intercept::prelude::Error>(())
/// ```
#[derive(Debug)]
pub struct Injector<'a> {
    target:   &'a Object,
    selector: Selector,
}

impl<'a> Injector<'a> {
    /// Weave onto the members `selector` picks on `target`
    #[must_use]
    pub fn new(target: &'a Object, selector: Selector) -> Self {
        Self { target, selector }
    }

    /// The target behaviors are woven onto
    #[must_use]
    pub fn target(&self) -> &Object {
        self.target
    }

    /// Weave an advice, honouring its own selector if it has one
    ///
    /// # Errors
    ///
    /// See [`inject`].
    pub fn advice(&self, advice: &Advice) -> Result<&Self> {
        let selector = advice.selector().unwrap_or(&self.selector);
        inject(self.target, selector, advice.behavior())?;
        Ok(self)
    }

    /// Weave a before advice
    ///
    /// # Errors
    ///
    /// See [`inject`].
    pub fn before<F>(&self, f: F) -> Result<&Self>
    where
        F: Fn(&mut ExecutionContext, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        self.advice(&Advice::before(f))
    }

    /// Weave an after advice
    ///
    /// # Errors
    ///
    /// See [`inject`].
    pub fn after<F>(&self, f: F) -> Result<&Self>
    where
        F: Fn(&mut ExecutionContext, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        self.advice(&Advice::after(f))
    }

    /// Weave an around advice
    ///
    /// # Errors
    ///
    /// See [`inject`].
    pub fn around<F>(&self, f: F) -> Result<&Self>
    where
        F: Fn(&mut ExecutionContext, Proceed<'_>, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    {
        self.advice(&Advice::around(f))
    }

    /// Weave an after-returning advice
    ///
    /// # Errors
    ///
    /// See [`inject`].
    pub fn after_returning<F>(&self, f: F) -> Result<&Self>
    where
        F: Fn(&mut ExecutionContext, Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.advice(&Advice::after_returning(f))
    }

    /// Weave an after-throwing advice
    ///
    /// # Errors
    ///
    /// See [`inject`].
    pub fn after_throwing<F>(&self, f: F) -> Result<&Self>
    where
        F: Fn(&mut ExecutionContext, &mut Error) -> Result<()> + Send + Sync + 'static,
    {
        self.advice(&Advice::after_throwing(f))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex, PoisonError};

    use pretty_assertions::assert_eq;
    use weft_error::codes;

    use super::*;
    use crate::{object::Template, values::Value};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Advice) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&log);
        let make = move |tag: &str| {
            let log = Arc::clone(&shared);
            let tag = tag.to_owned();
            Advice::before(move |_, _| {
                log.lock().unwrap_or_else(PoisonError::into_inner).push(tag.clone());
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn test_advice_selector_overrides_aspect_selector() {
        let template = Template::new("Target");
        template.define_method("method1", |_, _| Ok(Value::from("v")));
        template.define_method("method2", |_, _| Ok(Value::from("w")));
        let class = Object::class(&template);
        class.define_method("create", |_, _| Ok(Value::Null));

        let (log, make) = recorder();
        let own_selector = Selector::template_members().matching("method1");
        let aspect = Aspect::new([
            make("statics"),
            make("method1").with_selector(own_selector.unwrap_or_default()),
        ])
        .with_selector(Selector::own_members());
        assert!(aspect.apply([&class]).is_ok());

        let instance = template.instantiate();
        assert_eq!(instance.invoke("method1", &[]), Ok(Value::from("v")));
        assert_eq!(instance.invoke("method2", &[]), Ok(Value::from("w")));
        assert_eq!(class.invoke("create", &[]), Ok(Value::Null));
        assert_eq!(*log.lock().unwrap_or_else(PoisonError::into_inner), vec!["method1", "statics"]);
    }

    #[test]
    fn test_apply_to_chains_over_targets() {
        let first = Object::new();
        first.define_method("run", |_, _| Ok(Value::Undefined));
        let second = Object::new();
        second.define_method("run", |_, _| Ok(Value::Undefined));

        let (log, make) = recorder();
        let aspect: Aspect = [make("a")].into_iter().collect();
        let aspect = aspect.with_selector(Selector::own_members());
        assert!(aspect.apply_to(&first).and_then(|a| a.apply_to(&second)).is_ok());

        assert!(first.invoke("run", &[]).is_ok());
        assert!(second.invoke("run", &[]).is_ok());
        assert_eq!(log.lock().unwrap_or_else(PoisonError::into_inner).len(), 2);
    }

    #[test]
    fn test_template_scope_without_template_fails() {
        let plain = Object::new();
        let (_, make) = recorder();
        let result = Aspect::new([make("a")]).apply([&plain]).map_err(|e| e.code());
        assert_eq!(result, Err(codes::NO_MEMBER_TEMPLATE));
    }

    #[test]
    fn test_injector_chains_join_points() {
        let target = Object::new();
        target.define_method("half", |_, args| {
            let value = args.first().map_or(Ok(0), Value::try_as_i64)?;
            Ok(Value::from(value / 2))
        });

        let (log, make) = recorder();
        let injector = Injector::new(&target, Selector::member("half"));
        let chained = injector
            .advice(&make("first"))
            .and_then(|i| i.advice(&make("second")))
            .and_then(|i| {
                i.around(|ctx, next, args| {
                    let doubled = args
                        .iter()
                        .map(|v| v.try_as_i64().map(|n| Value::from(n * 2)))
                        .collect::<Result<Vec<_>>>()?;
                    next.proceed(ctx, &doubled)
                })
            })
            .and_then(|i| i.after_returning(|_, value| Ok(Value::from(value.try_as_i64()? + 1))));
        assert!(chained.is_ok());
        assert!(injector.target() == &target);

        assert_eq!(target.invoke("half", &[Value::from(10)]), Ok(Value::from(11)));
        assert_eq!(*log.lock().unwrap_or_else(PoisonError::into_inner), vec!["second", "first"]);

        let wrong = target.invoke("half", &[Value::from("ten")]).map_err(|e| e.code());
        assert_eq!(wrong, Err(codes::TYPE_MISMATCH));
    }

    #[test]
    fn test_injector_after_throwing_and_failure() {
        let target = Object::new();
        target.define_method("fail", |_, _| Err(weft_error::kinds::thrown("boom")));
        let injector = Injector::new(&target, Selector::own_members());
        let woven = injector
            .after(|_, _| Ok(()))
            .and_then(|i| i.after_throwing(|_, error| {
                error.set_message("wrapped");
                Ok(())
            }));
        assert!(woven.is_ok());

        let message = target.invoke("fail", &[]).map_err(|e| e.message().to_owned());
        assert_eq!(message, Err("wrapped".to_owned()));

        let missing = Injector::new(&target, Selector::template_members())
            .before(|_, _| Ok(()))
            .map(|_| ())
            .map_err(|e| e.code());
        assert_eq!(missing, Err(codes::NO_MEMBER_TEMPLATE));
    }

    #[test]
    fn test_set_selector() {
        let mut aspect = Aspect::default();
        aspect.set_selector(Selector::own_members());
        assert_eq!(aspect.selector(), &Selector::own_members());
        assert!(aspect.advices().is_empty());
    }
}

// WEFT - weft-intercept
// Module: Weaving Engine
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Weaving engine and per-call dispatcher.
//!
//! The first advice woven onto a member replaces the member's slot with a
//! dispatcher and records the member in the process-wide [`Weaver`], keyed
//! by the identity of the table it lives in and its name. The record owns
//! the five join-point lists; the original callable becomes the innermost
//! link of the around list. Later advices for the same member only extend
//! the lists.
//!
//! Every list is ordered newest first.

use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock},
};

use weft_error::Result;

use crate::{
    advice::{AfterReturningFn, AfterThrowingFn, AroundFn, Behavior, PhaseFn},
    context::ExecutionContext,
    joinpoint::JoinPoint,
    object::{MemberTable, Method, Object, TableId},
    selector::Candidate,
    values::Value,
};

/// One link of the around chain
#[derive(Clone)]
enum AroundLink {
    /// The callable the member held before it was woven
    Target(Method),
    Advice(Arc<AroundFn>),
}

/// Handle an around advice uses to run the rest of the chain
///
/// The handle borrows the links that are still to run for the current call.
/// It can be invoked more than once; every invocation runs the remaining
/// chain again.
#[derive(Clone, Copy)]
pub struct Proceed<'a> {
    rest: &'a [AroundLink],
}

impl Proceed<'_> {
    /// Run the next link of the chain with `args`
    ///
    /// # Errors
    ///
    /// Returns whatever the next around advice or the member raises.
    pub fn proceed(&self, ctx: &mut ExecutionContext, args: &[Value]) -> Result<Value> {
        run_chain(self.rest, ctx, args)
    }

    /// Number of links still to run, the member itself included
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

impl fmt::Debug for Proceed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proceed").field("remaining", &self.remaining()).finish()
    }
}

fn run_chain(chain: &[AroundLink], ctx: &mut ExecutionContext, args: &[Value]) -> Result<Value> {
    match chain.split_first() {
        Some((AroundLink::Target(method), _)) => {
            let target = ctx.target().clone();
            method.call(&target, args)
        }
        Some((AroundLink::Advice(advice), rest)) => advice(ctx, Proceed { rest }, args),
        None => Ok(Value::Undefined),
    }
}

#[derive(Clone, Default)]
struct JoinPointLists {
    before:          Vec<Arc<PhaseFn>>,
    after:           Vec<Arc<PhaseFn>>,
    around:          Vec<AroundLink>,
    after_returning: Vec<Arc<AfterReturningFn>>,
    after_throwing:  Vec<Arc<AfterThrowingFn>>,
}

/// The wrapper record of a woven member
struct WovenMember {
    #[cfg_attr(not(feature = "log"), allow(dead_code))]
    type_name: String,
    name:      String,
    lists:     RwLock<JoinPointLists>,
}

impl WovenMember {
    fn new(type_name: &str, name: &str, original: Method) -> Self {
        Self {
            type_name: type_name.to_owned(),
            name:      name.to_owned(),
            lists:     RwLock::new(JoinPointLists {
                around: vec![AroundLink::Target(original)],
                ..JoinPointLists::default()
            }),
        }
    }

    fn register(&self, behavior: &Behavior) {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        match behavior {
            Behavior::Before(f) => lists.before.insert(0, Arc::clone(f)),
            Behavior::After(f) => lists.after.insert(0, Arc::clone(f)),
            Behavior::Around(f) => lists.around.insert(0, AroundLink::Advice(Arc::clone(f))),
            Behavior::AfterReturning(f) => lists.after_returning.insert(0, Arc::clone(f)),
            Behavior::AfterThrowing(f) => lists.after_throwing.insert(0, Arc::clone(f)),
        }
    }

    fn count(&self, join_point: JoinPoint) -> usize {
        let lists = self.lists.read().unwrap_or_else(PoisonError::into_inner);
        match join_point {
            JoinPoint::Before => lists.before.len(),
            JoinPoint::After => lists.after.len(),
            JoinPoint::Around => lists.around.len().saturating_sub(1),
            JoinPoint::AfterReturning => lists.after_returning.len(),
            JoinPoint::AfterThrowing => lists.after_throwing.len(),
        }
    }

    fn snapshot(&self) -> JoinPointLists {
        self.lists.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn stopped(&self, phase: JoinPoint) -> Value {
        #[cfg(feature = "log")]
        log::trace!(
            target: "weft::weaver",
            "{}::{} stopped during {}",
            self.type_name,
            self.name,
            phase
        );
        #[cfg(not(feature = "log"))]
        let _ = phase;
        Value::Undefined
    }

    fn dispatch(&self, this: &Object, args: &[Value]) -> Result<Value> {
        let lists = self.snapshot();
        let mut ctx = ExecutionContext::new(this, &self.name, args);

        for advice in &lists.before {
            if ctx.is_stopped() {
                break;
            }
            advice(&mut ctx, args)?;
        }
        if ctx.is_stopped() {
            return Ok(self.stopped(JoinPoint::Before));
        }

        let result = match run_chain(&lists.around, &mut ctx, args) {
            Ok(value) => value,
            Err(mut error) => {
                for advice in &lists.after_throwing {
                    if ctx.is_stopped() {
                        break;
                    }
                    advice(&mut ctx, &mut error)?;
                }
                return Err(error);
            }
        };

        for advice in &lists.after {
            if ctx.is_stopped() {
                break;
            }
            advice(&mut ctx, args)?;
        }
        if ctx.is_stopped() {
            return Ok(self.stopped(JoinPoint::After));
        }

        let mut value = result;
        for advice in &lists.after_returning {
            value = advice(&mut ctx, value)?;
            if ctx.is_stopped() {
                return Ok(self.stopped(JoinPoint::AfterReturning));
            }
        }
        Ok(value)
    }
}

type Records = HashMap<TableId, HashMap<String, Arc<WovenMember>>>;

/// Registry of woven members
///
/// There is one weaver per process. It holds the wrapper record of every
/// woven member, keyed by table identity and member name. Records go away
/// when the member is redefined or its table is dropped.
///
/// # Ownership
///
/// A record owns its advices, and the dispatcher installed in the table
/// owns the record. An advice that holds a strong [`Object`] handle to the
/// target it is woven onto therefore forms a cycle: the target is never
/// dropped and its records are never released. Capture
/// [`Object::downgrade`] in such advices instead.
pub struct Weaver {
    records: Mutex<Records>,
}

impl Weaver {
    /// The process-wide weaver
    pub fn global() -> &'static Weaver {
        static WEAVER: OnceLock<Weaver> = OnceLock::new();
        WEAVER.get_or_init(|| Weaver {
            records: Mutex::new(HashMap::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, table: TableId, name: &str) -> Option<Arc<WovenMember>> {
        self.lock().get(&table).and_then(|members| members.get(name)).cloned()
    }

    /// Register `behavior` on the member picked by `candidate`, installing
    /// the dispatcher first if the member is not woven yet.
    pub(crate) fn weave(&self, candidate: &Candidate, behavior: &Behavior) {
        let table = candidate.host.table();
        let (member, fresh) = {
            let mut records = self.lock();
            match records.entry(table.id()).or_default().entry(candidate.name.clone()) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    let member = Arc::new(WovenMember::new(
                        candidate.host.type_name(),
                        &candidate.name,
                        candidate.method.clone(),
                    ));
                    entry.insert(Arc::clone(&member));
                    (member, true)
                }
            }
        };

        if fresh {
            let dispatched = Arc::clone(&member);
            table.install(
                &candidate.name,
                Method::new(move |this, args| dispatched.dispatch(this, args)),
                candidate.enumerable,
            );
            #[cfg(feature = "log")]
            log::debug!(
                target: "weft::weaver",
                "wrapped {}::{} in table {}",
                member.type_name,
                member.name,
                table.id()
            );
        }

        member.register(behavior);
        #[cfg(feature = "log")]
        log::debug!(
            target: "weft::weaver",
            "registered {} advice on {}::{}",
            behavior.join_point(),
            member.type_name,
            member.name
        );
    }

    /// Whether `name` in `table` has been woven
    #[must_use]
    pub fn is_woven(&self, table: &MemberTable, name: &str) -> bool {
        self.record(table.id(), name).is_some()
    }

    /// Number of advices registered on `name` in `table` for `join_point`.
    ///
    /// The original member is not counted as an around advice. Members
    /// that are not woven report zero.
    #[must_use]
    pub fn woven_count(&self, table: &MemberTable, name: &str, join_point: JoinPoint) -> usize {
        self.record(table.id(), name)
            .map_or(0, |member| member.count(join_point))
    }

    /// Names of the woven members of `table`, sorted
    #[must_use]
    pub fn woven_names(&self, table: &MemberTable) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .get(&table.id())
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Drop the record of one member.
    ///
    /// The record is released after the lock, since releasing it may drop
    /// objects whose tables report back here.
    pub(crate) fn forget(&self, table: TableId, name: &str) {
        let removed = {
            let mut records = self.lock();
            let removed = records.get_mut(&table).and_then(|members| members.remove(name));
            if records.get(&table).is_some_and(HashMap::is_empty) {
                records.remove(&table);
            }
            removed
        };
        drop(removed);
    }

    /// Drop every record of a table
    pub(crate) fn forget_table(&self, table: TableId) {
        let removed = self.lock().remove(&table);
        drop(removed);
    }
}

impl fmt::Debug for Weaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.lock();
        f.debug_struct("Weaver")
            .field("tables", &records.len())
            .field("members", &records.values().map(HashMap::len).sum::<usize>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use weft_error::kinds;

    use super::*;
    use crate::{advice::Advice, selector::Selector};

    fn candidate(target: &Object, name: &str) -> Candidate {
        let mut candidates = Selector::member(name).resolve(target).unwrap_or_default();
        assert_eq!(candidates.len(), 1);
        candidates.remove(0)
    }

    fn target() -> Object {
        let target = Object::new();
        target.define_method("double", |_, args| {
            Ok(Value::from(args.first().and_then(Value::as_i64).unwrap_or_default() * 2))
        });
        target
    }

    #[test]
    fn test_first_weave_installs_dispatcher_once() {
        let target = target();
        let weaver = Weaver::global();
        let before = Advice::before(|_, _| Ok(()));

        weaver.weave(&candidate(&target, "double"), before.behavior());
        let first = target.get("double").and_then(|slot| slot.as_method().cloned());
        weaver.weave(&candidate(&target, "double"), before.behavior());
        let second = target.get("double").and_then(|slot| slot.as_method().cloned());

        assert!(first.zip(second).is_some_and(|(a, b)| a.ptr_eq(&b)));
        assert!(weaver.is_woven(target.members(), "double"));
        assert_eq!(weaver.woven_count(target.members(), "double", JoinPoint::Before), 2);
        assert_eq!(weaver.woven_count(target.members(), "double", JoinPoint::Around), 0);
        assert_eq!(weaver.woven_names(target.members()), vec!["double"]);
        assert_eq!(target.invoke("double", &[Value::from(4)]), Ok(Value::from(8)));
    }

    #[test]
    fn test_redefining_member_discards_record() {
        let target = target();
        let weaver = Weaver::global();
        let around = Advice::around(|ctx, next, args| {
            let value = next.proceed(ctx, args)?;
            Ok(Value::from(value.as_i64().unwrap_or_default() + 1))
        });
        weaver.weave(&candidate(&target, "double"), around.behavior());
        assert_eq!(target.invoke("double", &[Value::from(1)]), Ok(Value::from(3)));

        target.define_method("double", |_, _| Ok(Value::Null));
        assert!(!weaver.is_woven(target.members(), "double"));
        assert_eq!(target.invoke("double", &[]), Ok(Value::Null));
    }

    #[test]
    fn test_dropping_table_discards_records() {
        let weaver = Weaver::global();
        let target = target();
        let id = target.members().id();
        let after = Advice::after(|_, _| Ok(()));
        weaver.weave(&candidate(&target, "double"), after.behavior());
        assert!(weaver.record(id, "double").is_some());

        drop(target);
        assert!(weaver.record(id, "double").is_none());
    }

    #[test]
    fn test_after_throwing_runs_newest_first_and_rethrows() {
        let target = Object::new();
        target.define_method("fail", |_, _| Err(kinds::thrown("boom")));
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            let advice = Advice::after_throwing(move |_, error| {
                seen.lock().unwrap_or_else(PoisonError::into_inner).push(tag);
                error.message_mut().push('_');
                error.message_mut().push_str(tag);
                Ok(())
            });
            Weaver::global().weave(&candidate(&target, "fail"), advice.behavior());
        }

        let error = target.invoke("fail", &[]).map_err(|e| e.message().to_owned());
        assert_eq!(error, Err("boom_second_first".to_owned()));
        assert_eq!(*seen.lock().unwrap_or_else(PoisonError::into_inner), vec!["second", "first"]);
    }

    #[test]
    fn test_advice_with_weak_target_lets_records_go() {
        let weaver = Weaver::global();
        let target = target();
        let id = target.members().id();
        let handle = target.downgrade();
        let peek = Advice::before(move |_, _| {
            assert!(handle.upgrade().is_some());
            Ok(())
        });
        weaver.weave(&candidate(&target, "double"), peek.behavior());
        assert_eq!(target.invoke("double", &[Value::from(2)]), Ok(Value::from(4)));

        drop(target);
        assert!(weaver.record(id, "double").is_none());
    }

    #[test]
    fn test_inherited_shadow_stays_selectable() {
        let base = crate::object::Template::new("Base");
        base.define_method("greet", |_, _| Ok(Value::from("hi")));
        let derived = base.derive("Derived");
        let class = Object::class(&derived);
        let weaver = Weaver::global();

        for _ in 0..2 {
            let candidates = Selector::template_members().resolve(&class).unwrap_or_default();
            assert_eq!(candidates.len(), 1);
            for candidate in &candidates {
                weaver.weave(candidate, Advice::after(|_, _| Ok(())).behavior());
            }
        }

        assert_eq!(derived.members().enumerable_names(), vec!["greet"]);
        assert_eq!(weaver.woven_count(derived.members(), "greet", JoinPoint::After), 2);
        assert!(!weaver.is_woven(base.members(), "greet"));
    }

    #[test]
    fn test_proceed_without_links_yields_undefined() {
        let target = Object::new();
        let mut ctx = ExecutionContext::new(&target, "none", &[]);
        let proceed = Proceed { rest: &[] };
        assert_eq!(proceed.remaining(), 0);
        assert_eq!(proceed.proceed(&mut ctx, &[]), Ok(Value::Undefined));
    }
}

// WEFT - weft-intercept
// Module: Advices
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Advices: one behavior bound to one join point.
//!
//! Each join point has its own callable signature, captured by the
//! [`Behavior`] variants:
//!
//! | join point        | signature                                                  |
//! |-------------------|------------------------------------------------------------|
//! | `before`, `after` | `(&mut ExecutionContext, &[Value]) -> Result<()>`          |
//! | `around`          | `(&mut ExecutionContext, Proceed, &[Value]) -> Result<Value>` |
//! | `after_returning` | `(&mut ExecutionContext, Value) -> Result<Value>`          |
//! | `after_throwing`  | `(&mut ExecutionContext, &mut Error) -> Result<()>`        |

use std::{fmt, sync::Arc};

use weft_error::{Error, Result};

use crate::{
    context::ExecutionContext, joinpoint::JoinPoint, selector::Selector, values::Value,
    weaver::Proceed,
};

/// Behavior run before or after the around chain
pub type PhaseFn = dyn Fn(&mut ExecutionContext, &[Value]) -> Result<()> + Send + Sync;
/// Behavior wrapping the rest of the around chain
pub type AroundFn =
    dyn Fn(&mut ExecutionContext, Proceed<'_>, &[Value]) -> Result<Value> + Send + Sync;
/// Behavior transforming the return value
pub type AfterReturningFn = dyn Fn(&mut ExecutionContext, Value) -> Result<Value> + Send + Sync;
/// Behavior observing a raised error
pub type AfterThrowingFn = dyn Fn(&mut ExecutionContext, &mut Error) -> Result<()> + Send + Sync;

/// A callable bound to its join point
#[derive(Clone)]
pub enum Behavior {
    /// Runs before the around chain
    Before(Arc<PhaseFn>),
    /// Runs after the around chain returned
    After(Arc<PhaseFn>),
    /// Wraps the rest of the around chain
    Around(Arc<AroundFn>),
    /// Folds over the return value
    AfterReturning(Arc<AfterReturningFn>),
    /// Observes an error raised by the around chain
    AfterThrowing(Arc<AfterThrowingFn>),
}

impl Behavior {
    /// The join point this behavior attaches to
    #[must_use]
    pub fn join_point(&self) -> JoinPoint {
        match self {
            Self::Before(_) => JoinPoint::Before,
            Self::After(_) => JoinPoint::After,
            Self::Around(_) => JoinPoint::Around,
            Self::AfterReturning(_) => JoinPoint::AfterReturning,
            Self::AfterThrowing(_) => JoinPoint::AfterThrowing,
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Behavior::{:?}(..)", self.join_point())
    }
}

/// A behavior plus an optional selector of its own
///
/// When an advice carries a selector it fully replaces the selector of the
/// aspect it is applied with.
#[derive(Debug, Clone)]
pub struct Advice {
    behavior: Behavior,
    selector: Option<Selector>,
}

impl Advice {
    /// Create an advice from a behavior
    #[must_use]
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            selector: None,
        }
    }

    /// Advice run before the member
    pub fn before<F>(f: F) -> Self
    where
        F: Fn(&mut ExecutionContext, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(Behavior::Before(Arc::new(f)))
    }

    /// Advice run after the member returned normally.
    ///
    /// It receives the original call arguments, not the return value.
    pub fn after<F>(f: F) -> Self
    where
        F: Fn(&mut ExecutionContext, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(Behavior::After(Arc::new(f)))
    }

    /// Advice wrapping the member.
    ///
    /// Calling [`Proceed::proceed`] runs the next advice in the chain, or
    /// the member itself at the end of it. Not calling it skips both.
    pub fn around<F>(f: F) -> Self
    where
        F: Fn(&mut ExecutionContext, Proceed<'_>, &[Value]) -> Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Behavior::Around(Arc::new(f)))
    }

    /// Advice transforming the value returned by the member
    pub fn after_returning<F>(f: F) -> Self
    where
        F: Fn(&mut ExecutionContext, Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::new(Behavior::AfterReturning(Arc::new(f)))
    }

    /// Advice observing an error raised by the member or an around advice.
    ///
    /// The error may be modified in place; it is raised again afterwards.
    /// Returning an error raises that error instead.
    pub fn after_throwing<F>(f: F) -> Self
    where
        F: Fn(&mut ExecutionContext, &mut Error) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(Behavior::AfterThrowing(Arc::new(f)))
    }

    /// Give this advice its own selector
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// The join point of the behavior
    #[must_use]
    pub fn join_point(&self) -> JoinPoint {
        self.behavior.join_point()
    }

    /// The behavior
    #[must_use]
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// The advice's own selector, if any
    #[must_use]
    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_bind_join_points() {
        let advices = [
            Advice::before(|_, _| Ok(())),
            Advice::after(|_, _| Ok(())),
            Advice::around(|ctx, next, args| next.proceed(ctx, args)),
            Advice::after_returning(|_, value| Ok(value)),
            Advice::after_throwing(|_, _| Ok(())),
        ];
        let join_points: Vec<_> = advices.iter().map(Advice::join_point).collect();
        assert_eq!(join_points, JoinPoint::ALL);
    }

    #[test]
    fn test_own_selector() {
        let advice = Advice::before(|_, _| Ok(()));
        assert!(advice.selector().is_none());

        let advice = advice.with_selector(Selector::member("run"));
        assert_eq!(advice.selector(), Some(&Selector::member("run")));
    }
}

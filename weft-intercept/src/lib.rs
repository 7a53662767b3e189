// WEFT - weft-intercept
// Module: Method Interception and Aspect Weaving
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! # Method Interception for WEFT
//!
//! This crate attaches ordered behaviors ("advices") to the callable members
//! of objects and member templates without touching the members' own code.
//!
//! ## Overview
//!
//! Members live in explicit dispatch tables ([`MemberTable`]). Weaving an
//! advice onto a member replaces its slot with a dispatcher that runs five
//! phases on every call:
//!
//! - `before` advices, most recently registered first
//! - the `around` chain, outermost advice first, the original member last
//! - `after_throwing` advices when the chain raised an error
//! - `after` advices
//! - `after_returning` advices, folded over the return value
//!
//! Any advice can call [`ExecutionContext::stop`] to cut the rest of the
//! current call short.
//!
//! ## Weaving an aspect
//!
//! ```rust
//! # use weft_intercept::prelude::*;
//! let calculator = Template::new("Calculator");
//! calculator.define_method("sum", |_this, args| {
//!     Ok(Value::from(args.iter().filter_map(Value::as_i64).sum::<i64>()))
//! });
//! let class = Object::class(&calculator);
//!
//! Aspect::new([Advice::around(|ctx, next, args| {
//!     let result = next.proceed(ctx, args)?;
//!     Ok(Value::from(result.try_as_i64()? * 2))
//! })])
//! .apply([&class])?;
//!
//! let instance = calculator.instantiate();
//! let result = instance.invoke("sum", &[1.into(), 2.into(), 3.into()])?;
//! assert_eq!(result, Value::I64(12));
//! # Ok::<(), weft_error::Error>(())
//! ```
//!
//! See the `strategies` module for ready-made logging, statistics and
//! firewall aspects.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::missing_panics_doc)]

pub mod advice;
pub mod aspect;
pub mod context;
pub mod introduce;
pub mod joinpoint;
pub mod object;
pub mod prelude;
pub mod selector;
pub mod strategies;
pub mod values;
pub mod weaver;

pub use advice::{Advice, Behavior};
pub use aspect::{inject, Aspect, Injector};
pub use context::ExecutionContext;
pub use introduce::{introduce, PropertyBag};
pub use joinpoint::JoinPoint;
pub use object::{Method, MemberTable, Object, Slot, TableId, Template, WeakObject};
pub use selector::{NamePattern, Scope, ScopeKind, Selector};
pub use values::Value;
pub use weaver::{Proceed, Weaver};

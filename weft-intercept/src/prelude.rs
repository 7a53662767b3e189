//! Prelude module for weft-intercept
//!
//! Re-exports the types needed to define targets, build aspects and weave
//! them, so callers can start with a single glob import.

pub use std::sync::Arc;

pub use weft_error::{codes, kinds, Error, ErrorCategory, Result};

pub use crate::{
    advice::{Advice, Behavior},
    aspect::{inject, Aspect, Injector},
    context::ExecutionContext,
    introduce::{introduce, PropertyBag},
    joinpoint::JoinPoint,
    object::{Method, MemberTable, Object, Slot, TableId, Template, WeakObject},
    selector::{NamePattern, Scope, ScopeKind, Selector},
    strategies::{
        FirewallConfig, FirewallRule, FirewallStrategy, DenyAction, FunctionStats, LogSink,
        LoggingConfig, LoggingStrategy, StatisticsConfig, StatisticsStrategy,
    },
    values::Value,
    weaver::{Proceed, Weaver},
};

#[cfg(feature = "log")]
pub use crate::strategies::LogCrateSink;

// WEFT - weft-intercept
// Module: Execution Context
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Per-call state shared by every advice of one intercepted call.

use std::collections::HashMap;

use crate::{object::Object, values::Value};

/// Context for one call of a woven member
///
/// A fresh context is built for every call and handed to each advice in
/// turn. It is never reused across calls.
#[derive(Debug)]
pub struct ExecutionContext {
    /// The receiver of the call
    target:  Object,
    /// The member being called
    member:  String,
    /// Positional arguments as passed by the caller
    args:    Vec<Value>,
    stopped: bool,
    /// Scratch data advices of the same call can share
    data:    HashMap<String, Value>,
}

impl ExecutionContext {
    /// Create a new execution context
    ///
    /// # Arguments
    ///
    /// * `target` - The receiver of the call
    /// * `member` - The name of the called member
    /// * `args` - The positional arguments of the call
    #[must_use]
    pub fn new(target: &Object, member: &str, args: &[Value]) -> Self {
        Self {
            target:  target.clone(),
            member:  member.to_owned(),
            args:    args.to_vec(),
            stopped: false,
            data:    HashMap::new(),
        }
    }

    /// The receiver of the call
    #[must_use]
    pub fn target(&self) -> &Object {
        &self.target
    }

    /// Type name of the receiver
    #[must_use]
    pub fn target_type(&self) -> &str {
        self.target.type_name()
    }

    /// Name of the called member
    #[must_use]
    pub fn member_name(&self) -> &str {
        &self.member
    }

    /// Arguments the caller passed
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Cut the rest of this call short.
    ///
    /// Remaining advices of the current phase are skipped and the call
    /// returns [`Value::Undefined`], except on the error path where the
    /// error is still raised.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Whether an advice has stopped this call
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Store a value for later advices of this call
    pub fn add_data(&mut self, key: &str, value: Value) -> Option<Value> {
        self.data.insert(key.to_owned(), value)
    }

    /// Read a value stored by an earlier advice of this call
    #[must_use]
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

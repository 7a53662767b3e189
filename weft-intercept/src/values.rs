// WEFT - weft-intercept
// Module: Call Values
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Dynamic values passed to and returned from intercepted members.

use std::fmt;

use weft_error::{kinds, Result};

use crate::object::Object;

/// A value flowing through an intercepted call.
///
/// `Undefined` is what a call yields when an advice stops it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value
    #[default]
    Undefined,
    /// Explicit absence of a value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    I64(i64),
    /// Floating point number
    F64(f64),
    /// String
    Str(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Reference to an object
    Object(Object),
}

impl Value {
    /// Returns `true` for [`Value::Undefined`].
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Integer payload, if any
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            Self::I64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Boolean payload, if any
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if any
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// List payload, if any
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Object payload, if any
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, as used in type mismatch messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I64(_) => "integer",
            Self::F64(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &str) -> weft_error::Error {
        kinds::type_mismatch(format!("expected {expected}, found {}", self.kind_name()))
    }

    /// Integer payload
    ///
    /// # Errors
    ///
    /// Returns `TYPE_MISMATCH` for any other variant.
    pub fn try_as_i64(&self) -> Result<i64> {
        self.as_i64().ok_or_else(|| self.mismatch("integer"))
    }

    /// Numeric payload widened to `f64`
    ///
    /// # Errors
    ///
    /// Returns `TYPE_MISMATCH` for non-numeric variants.
    pub fn try_as_f64(&self) -> Result<f64> {
        self.as_f64().ok_or_else(|| self.mismatch("number"))
    }

    /// Boolean payload
    ///
    /// # Errors
    ///
    /// Returns `TYPE_MISMATCH` for any other variant.
    pub fn try_as_bool(&self) -> Result<bool> {
        self.as_bool().ok_or_else(|| self.mismatch("bool"))
    }

    /// String payload
    ///
    /// # Errors
    ///
    /// Returns `TYPE_MISMATCH` for any other variant.
    pub fn try_as_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.mismatch("string"))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(obj) => write!(f, "[object {}]", obj.type_name()),
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I64(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

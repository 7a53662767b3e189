// WEFT - weft-error
// Module: WEFT Error Types
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

use alloc::{borrow::Cow, string::String};
use core::fmt;

use crate::codes;

/// `Error` categories for WEFT operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Parameter errors (invalid arguments, missing parameters, etc.)
    Parameter  = 1,
    /// Validation errors (unknown registry names, bad patterns)
    Validation = 2,
    /// Type errors (non-callable members, unexpected values)
    Type       = 3,
    /// Runtime errors (missing members, raised errors)
    Runtime    = 4,
    /// Security errors (access control)
    Security   = 5,
    /// Unknown errors
    Unknown    = 9,
}

/// WEFT `Error` type
///
/// Errors raised by members or advices travel through the dispatcher as this
/// type. The message is owned so after-throwing advices can rewrite it before
/// the error is re-raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code:     u16,
    message:      Cow<'static, str>,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub fn new(category: ErrorCategory, code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Get the error category
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Get the error message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Mutable access to the message, converting a static message to an
    /// owned one on first use.
    pub fn message_mut(&mut self) -> &mut String {
        self.message.to_mut()
    }

    /// Replace the message
    pub fn set_message(&mut self, message: impl Into<Cow<'static, str>>) {
        self.message = message.into();
    }

    /// Check if this error was raised by a member or an advice
    #[must_use]
    pub fn is_thrown(&self) -> bool {
        self.code == codes::THROWN
    }

    /// Check if this is a parameter error
    #[must_use]
    pub fn is_parameter_error(&self) -> bool {
        self.category == ErrorCategory::Parameter
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        self.category == ErrorCategory::Validation
    }

    /// Check if this is a type error
    #[must_use]
    pub fn is_type_error(&self) -> bool {
        self.category == ErrorCategory::Type
    }

    /// Check if this is a runtime error
    #[must_use]
    pub fn is_runtime_error(&self) -> bool {
        self.category == ErrorCategory::Runtime
    }

    /// Check if this is a security error
    #[must_use]
    pub fn is_security_error(&self) -> bool {
        self.category == ErrorCategory::Security
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04X}] {}", self.category, self.code, self.message)
    }
}

impl core::error::Error for Error {}

// WEFT - weft-error
// Module: WEFT Error Kinds
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Constructors for the errors raised across WEFT.

use alloc::borrow::Cow;

use crate::{codes, Error, ErrorCategory};

/// Invalid argument passed to a weaving operation
#[must_use]
pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Parameter, codes::INVALID_ARGUMENT, message)
}

/// Single member scope requested without a member name
#[must_use]
pub fn missing_member_name() -> Error {
    Error::new(
        ErrorCategory::Parameter,
        codes::MISSING_MEMBER_NAME,
        "single member scope requires a member name",
    )
}

/// Scope name not present in the registry
#[must_use]
pub fn unknown_scope(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Validation, codes::UNKNOWN_SCOPE, message)
}

/// Join-point name not present in the registry
#[must_use]
pub fn unknown_join_point(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Validation, codes::UNKNOWN_JOIN_POINT, message)
}

/// Member name pattern failed to compile
#[must_use]
pub fn invalid_name_pattern(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Validation, codes::INVALID_NAME_PATTERN, message)
}

/// Template scope used on a target without a member template
#[must_use]
pub fn no_member_template(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Type, codes::NO_MEMBER_TEMPLATE, message)
}

/// Member is a data field
#[must_use]
pub fn not_callable(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Type, codes::NOT_CALLABLE, message)
}

/// Value of an unexpected type
#[must_use]
pub fn type_mismatch(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Type, codes::TYPE_MISMATCH, message)
}

/// Member missing from the target and its templates
#[must_use]
pub fn member_not_found(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Runtime, codes::MEMBER_NOT_FOUND, message)
}

/// Error raised by user code: a member body or an advice
#[must_use]
pub fn thrown(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Runtime, codes::THROWN, message)
}

/// Call rejected by an access policy
#[must_use]
pub fn access_denied(message: impl Into<Cow<'static, str>>) -> Error {
    Error::new(ErrorCategory::Security, codes::ACCESS_DENIED, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_constructors() {
        assert_eq!(missing_member_name().code(), codes::MISSING_MEMBER_NAME);
        assert!(missing_member_name().is_parameter_error());
        assert!(unknown_scope("x").is_validation_error());
        assert!(no_member_template("x").is_type_error());
        assert!(thrown("x").is_thrown());
        assert!(access_denied("x").is_security_error());
        assert_eq!(member_not_found("m").category(), ErrorCategory::Runtime);
    }
}

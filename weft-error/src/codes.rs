// WEFT - weft-error
// Module: WEFT Error Codes
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for WEFT

// Weaving error codes (1000-1099)
/// Invalid argument passed to a weaving operation
pub const INVALID_ARGUMENT: u16 = 1000;
/// Scope name not present in the scope registry
pub const UNKNOWN_SCOPE: u16 = 1001;
/// Join-point name not present in the join-point registry
pub const UNKNOWN_JOIN_POINT: u16 = 1002;
/// Member name pattern failed to compile
pub const INVALID_NAME_PATTERN: u16 = 1003;
/// Template scope used on a target that provides no member template
pub const NO_MEMBER_TEMPLATE: u16 = 1004;
/// Single member scope used without a member name
pub const MISSING_MEMBER_NAME: u16 = 1005;

// Invocation error codes (2000-2099)
/// Member is not defined on the target or its templates
pub const MEMBER_NOT_FOUND: u16 = 2000;
/// Member exists but holds data, not a method
pub const NOT_CALLABLE: u16 = 2001;
/// Error raised by a member or an advice
pub const THROWN: u16 = 2002;
/// Argument or return value has an unexpected type
pub const TYPE_MISMATCH: u16 = 2003;

// Security error codes (3000-3099)
/// Call rejected by an access policy
pub const ACCESS_DENIED: u16 = 3000;

// WEFT - weft-intercept
// Module: Join Points
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The phases of a call at which advices can be attached.

use std::{fmt, str::FromStr};

use weft_error::{kinds, Error};

/// A phase of an intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JoinPoint {
    /// Before the around chain runs
    Before,
    /// After the around chain returned normally
    After,
    /// Wrapping the member itself
    Around,
    /// Transforming the return value
    AfterReturning,
    /// Observing an error raised by the around chain
    AfterThrowing,
}

impl JoinPoint {
    /// Every join point, in registry order
    pub const ALL: [JoinPoint; 5] = [
        Self::Before,
        Self::After,
        Self::Around,
        Self::AfterReturning,
        Self::AfterThrowing,
    ];

    /// Registry name of the join point
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Around => "around",
            Self::AfterReturning => "after_returning",
            Self::AfterThrowing => "after_throwing",
        }
    }
}

impl fmt::Display for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JoinPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|join_point| join_point.name() == s)
            .ok_or_else(|| kinds::unknown_join_point(format!("unknown join point `{s}`")))
    }
}

// WEFT - weft-error
// Module: WEFT Error Handling
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WEFT Error handling library
//!
//! This library provides the error type shared by every WEFT crate. Errors
//! carry a category, a numeric code and a message.
//!
//! # Error Categories
//!
//! ## Weaving Errors (1000-1099)
//! - Invalid arguments and selector misuse
//! - Unknown scope or join-point names
//! - Invalid member name patterns
//! - Targets without a member template
//!
//! ## Invocation Errors (2000-2099)
//! - Missing members
//! - Non-callable members
//! - Errors raised by members and advices
//!
//! ## Security Errors (3000-3099)
//! - Calls rejected by an access policy
//!
//! # Usage
//!
//! ```
//! use weft_error::{codes, kinds, Error, ErrorCategory};
//!
//! let error = Error::new(
//!     ErrorCategory::Parameter,
//!     codes::MISSING_MEMBER_NAME,
//!     "single member scope needs a member name",
//! );
//! assert_eq!(error.code(), codes::MISSING_MEMBER_NAME);
//!
//! let thrown = kinds::thrown("account is overdrawn");
//! assert!(thrown.is_thrown());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

/// Error codes for weft
pub mod codes;
/// Error and error handling types
pub mod errors;
/// Error kind constructors
pub mod kinds;

pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for WEFT operations.
pub type Result<T> = core::result::Result<T, Error>;

//! Built-in strategies for intercepting member calls
//!
//! This module provides ready-made aspects for common cross-cutting
//! concerns. Each strategy is configured through a plain config struct and
//! turned into an [`Aspect`](crate::Aspect) with `to_aspect`.

mod firewall;
mod logging;
mod stats;

pub use firewall::{DenyAction, FirewallConfig, FirewallRule, FirewallStrategy};
#[cfg(feature = "log")]
pub use logging::LogCrateSink;
pub use logging::{LogSink, LoggingConfig, LoggingStrategy};
pub use stats::{FunctionStats, StatisticsConfig, StatisticsStrategy};

/// Key under which strategies report a member, `Type::member`
pub(crate) fn member_key(type_name: &str, member: &str) -> String {
    format!("{type_name}::{member}")
}

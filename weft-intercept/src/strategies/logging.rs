//! Logging strategy for intercepted member calls
//!
//! This strategy writes one entry when a woven member is called and one
//! when it returns. It can be configured to log arguments, results and
//! timing.

use std::{fmt::Write as _, sync::Arc, time::Instant};

use crate::{advice::Advice, aspect::Aspect, selector::Selector, values::Value};

/// A trait for receiving log entries
pub trait LogSink: Send + Sync {
    /// Write a log entry
    fn write_log(&self, entry: &str);
}

// Helper implementation for using a closure as a LogSink
impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn write_log(&self, entry: &str) {
        self(entry);
    }
}

/// A log sink that forwards entries to the `log` crate at debug level
#[cfg(feature = "log")]
#[derive(Debug, Clone, Copy)]
pub struct LogCrateSink {
    target: &'static str,
}

#[cfg(feature = "log")]
impl LogCrateSink {
    /// Create a sink logging under `target`
    #[must_use]
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }
}

#[cfg(feature = "log")]
impl Default for LogCrateSink {
    fn default() -> Self {
        Self::new("weft::calls")
    }
}

#[cfg(feature = "log")]
impl LogSink for LogCrateSink {
    fn write_log(&self, entry: &str) {
        log::debug!(target: self.target, "{entry}");
    }
}

/// Configuration for the logging strategy
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct LoggingConfig {
    /// Whether to log arguments
    pub log_args:    bool,
    /// Whether to log results
    pub log_results: bool,
    /// Whether to log timing information
    pub log_timing:  bool,
    /// Maximum number of arguments to log (0 for unlimited)
    pub max_args:    usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_args:    true,
            log_results: true,
            log_timing:  true,
            max_args:    10,
        }
    }
}

/// A strategy that logs member calls
pub struct LoggingStrategy<S: LogSink> {
    /// Log sink to write logs to
    sink:     Arc<S>,
    /// Configuration
    config:   LoggingConfig,
    /// Members to log
    selector: Selector,
}

impl<S: LogSink + 'static> LoggingStrategy<S> {
    /// Create a new logging strategy with default configuration
    pub fn new(sink: Arc<S>) -> Self {
        Self {
            sink,
            config: LoggingConfig::default(),
            selector: Selector::default(),
        }
    }

    /// Configure the logging strategy
    #[must_use]
    pub fn with_config(mut self, config: LoggingConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose the members to log
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    fn format_arguments(config: &LoggingConfig, args: &[Value]) -> String {
        let limit = if config.max_args > 0 {
            config.max_args.min(args.len())
        } else {
            args.len()
        };

        let mut out = String::new();
        for (i, arg) in args.iter().take(limit).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{arg}");
        }
        if limit < args.len() {
            let _ = write!(out, ", ... ({} more)", args.len() - limit);
        }
        out
    }

    /// Build an aspect with one around advice that logs every call
    #[must_use]
    pub fn to_aspect(&self) -> Aspect {
        let sink = Arc::clone(&self.sink);
        let config = self.config.clone();

        let advice = Advice::around(move |ctx, next, args| {
            let mut entry = format!("CALL: {}::{}", ctx.target_type(), ctx.member_name());
            if config.log_args && !args.is_empty() {
                let _ = write!(entry, " args: [{}]", Self::format_arguments(&config, args));
            }
            sink.write_log(&entry);

            let start = config.log_timing.then(Instant::now);
            let result = next.proceed(ctx, args);

            let mut entry = format!("RETURN: {}::{}", ctx.target_type(), ctx.member_name());
            if let Some(start) = start {
                let _ = write!(entry, " elapsed: {:?}", start.elapsed());
            }
            if config.log_results {
                match &result {
                    Ok(value) => {
                        let _ = write!(entry, " result: {value}");
                    }
                    Err(e) => {
                        let _ = write!(entry, " error: {e}");
                    }
                }
            }
            sink.write_log(&entry);

            result
        });

        Aspect::new([advice]).with_selector(self.selector.clone())
    }
}

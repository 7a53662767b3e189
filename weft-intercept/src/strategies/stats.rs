//! Statistics strategy for intercepted member calls
//!
//! This strategy collects metrics on calls of woven members: call counts,
//! error counts and timings, keyed by `Type::member`.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::Instant,
};

use super::member_key;
use crate::{advice::Advice, aspect::Aspect, selector::Selector};

/// Statistics collected for a member
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionStats {
    /// Number of times the member was called
    pub call_count:    u64,
    /// Number of successful calls
    pub success_count: u64,
    /// Number of failed calls
    pub error_count:   u64,
    /// Total execution time in milliseconds
    pub total_time_ms: f64,
    /// Minimum execution time in milliseconds
    pub min_time_ms:   Option<f64>,
    /// Maximum execution time in milliseconds
    pub max_time_ms:   Option<f64>,
    /// Average execution time in milliseconds
    pub avg_time_ms:   f64,
}

/// Configuration for the statistics strategy
#[derive(Debug, Clone)]
pub struct StatisticsConfig {
    /// Whether to track timings
    pub track_timing:  bool,
    /// Whether to track errors
    pub track_errors:  bool,
    /// Maximum number of members to track (0 for unlimited)
    pub max_functions: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            track_timing:  true,
            track_errors:  true,
            max_functions: 1000,
        }
    }
}

struct StatsTable {
    config: StatisticsConfig,
    stats:  RwLock<HashMap<String, FunctionStats>>,
}

impl StatsTable {
    #[allow(clippy::cast_precision_loss)]
    fn record(&self, key: String, is_success: bool, elapsed_ms: Option<f64>) {
        let mut stats_map = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        // At the limit, new members are not tracked
        if self.config.max_functions > 0
            && stats_map.len() >= self.config.max_functions
            && !stats_map.contains_key(&key)
        {
            return;
        }

        let stats = stats_map.entry(key).or_default();
        stats.call_count += 1;
        if is_success {
            stats.success_count += 1;
        } else if self.config.track_errors {
            stats.error_count += 1;
        }

        if let Some(elapsed) = elapsed_ms {
            stats.total_time_ms += elapsed;
            stats.min_time_ms = Some(stats.min_time_ms.map_or(elapsed, |min| min.min(elapsed)));
            stats.max_time_ms = Some(stats.max_time_ms.map_or(elapsed, |max| max.max(elapsed)));
            stats.avg_time_ms = stats.total_time_ms / stats.call_count as f64;
        }
    }
}

/// A strategy that collects statistics on member calls
///
/// Clones share the collected statistics, so the strategy can be queried
/// after its aspect has been applied.
#[derive(Clone)]
pub struct StatisticsStrategy {
    table:    Arc<StatsTable>,
    selector: Selector,
}

impl Default for StatisticsStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsStrategy {
    /// Create a new statistics strategy with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StatisticsConfig::default())
    }

    /// Create a new statistics strategy with custom configuration
    #[must_use]
    pub fn with_config(config: StatisticsConfig) -> Self {
        Self {
            table:    Arc::new(StatsTable {
                config,
                stats: RwLock::new(HashMap::new()),
            }),
            selector: Selector::default(),
        }
    }

    /// Choose the members to track
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Build an aspect with one around advice recording every call
    #[must_use]
    pub fn to_aspect(&self) -> Aspect {
        let table = Arc::clone(&self.table);
        let advice = Advice::around(move |ctx, next, args| {
            let start = table.config.track_timing.then(Instant::now);
            let result = next.proceed(ctx, args);
            let elapsed_ms = start.map(|start| start.elapsed().as_secs_f64() * 1000.0);
            table.record(
                member_key(ctx.target_type(), ctx.member_name()),
                result.is_ok(),
                elapsed_ms,
            );
            result
        });
        Aspect::new([advice]).with_selector(self.selector.clone())
    }

    /// Get statistics for all members
    #[must_use]
    pub fn get_all_stats(&self) -> HashMap<String, FunctionStats> {
        self.table.stats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Get statistics for a specific member
    #[must_use]
    pub fn get_function_stats(&self, type_name: &str, member: &str) -> Option<FunctionStats> {
        let key = member_key(type_name, member);
        self.table.stats.read().unwrap_or_else(PoisonError::into_inner).get(&key).cloned()
    }

    /// Reset all statistics
    pub fn reset(&self) {
        self.table.stats.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use weft_error::kinds;

    use super::*;
    use crate::{object::Object, values::Value};

    fn target() -> Object {
        let target = Object::named("Worker");
        target.define_method("work", |_, args| {
            thread::sleep(Duration::from_millis(5));
            if args.first().and_then(Value::as_bool) == Some(false) {
                return Err(kinds::thrown("work failed"));
            }
            Ok(Value::from(123))
        });
        target.define_method("rest", |_, _| Ok(Value::Undefined));
        target
    }

    #[test]
    fn test_statistics_strategy() {
        let strategy = StatisticsStrategy::new().with_selector(Selector::own_members());
        let target = target();
        assert!(strategy.to_aspect().apply([&target]).is_ok());

        assert_eq!(target.invoke("work", &[Value::from(true)]), Ok(Value::from(123)));
        assert!(target.invoke("work", &[Value::from(false)]).is_err());

        let stats = strategy.get_all_stats();
        assert!(stats.contains_key("Worker::work"));

        let func_stats = strategy.get_function_stats("Worker", "work").unwrap_or_default();
        assert_eq!(func_stats.call_count, 2);
        assert_eq!(func_stats.success_count, 1);
        assert_eq!(func_stats.error_count, 1);
        assert!(func_stats.total_time_ms > 0.0);
        assert!(func_stats.min_time_ms.is_some_and(|min| min > 0.0));
        assert!(func_stats.max_time_ms.is_some_and(|max| max > 0.0));
        assert!(func_stats.avg_time_ms > 0.0);
    }

    #[test]
    fn test_statistics_config() {
        let config = StatisticsConfig {
            track_timing:  false,
            track_errors:  false,
            max_functions: 1,
        };
        let strategy = StatisticsStrategy::with_config(config).with_selector(Selector::own_members());
        let target = target();
        assert!(strategy.to_aspect().apply([&target]).is_ok());

        let _ = target.invoke("rest", &[]);
        let _ = target.invoke("work", &[Value::from(false)]);

        // Only the first member fits under the limit
        let stats = strategy.get_all_stats();
        assert_eq!(stats.len(), 1);
        let func_stats = strategy.get_function_stats("Worker", "rest").unwrap_or_default();
        assert_eq!(func_stats.call_count, 1);
        assert_eq!(func_stats.error_count, 0);
        assert!(func_stats.min_time_ms.is_none());
        assert!(func_stats.total_time_ms.abs() < f64::EPSILON);
    }

    #[test]
    fn test_statistics_reset() {
        let strategy = StatisticsStrategy::new().with_selector(Selector::member("rest"));
        let target = target();
        assert!(strategy.to_aspect().apply([&target]).is_ok());
        let _ = target.invoke("rest", &[]);

        assert_eq!(strategy.get_all_stats().len(), 1);
        strategy.reset();
        assert_eq!(strategy.get_all_stats().len(), 0);
    }
}

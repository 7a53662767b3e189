//! Firewall strategy for intercepted member calls
//!
//! This strategy enforces access rules on calls of woven members. A call is
//! either let through or denied, based on the receiver's type name and the
//! member name.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use weft_error::kinds;

use super::member_key;
use crate::{advice::Advice, aspect::Aspect, selector::Selector};

/// A rule to enforce on member calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirewallRule {
    /// Allow a specific member (type, member)
    AllowMember(String, String),
    /// Allow all members of a type
    AllowType(String),
    /// Deny a specific member (type, member)
    DenyMember(String, String),
    /// Deny all members of a type
    DenyType(String),
}

/// What happens to a denied call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DenyAction {
    /// Fail the call with `ACCESS_DENIED`
    #[default]
    Reject,
    /// Stop the call; it returns `undefined` without running the member
    Stop,
}

/// Configuration for the firewall strategy
#[derive(Debug, Clone, Default)]
pub struct FirewallConfig {
    /// Default policy (true = allow by default, false = deny by default)
    pub default_allow: bool,
    /// Rules to enforce, applied in order; the last matching rule wins
    pub rules:         Vec<FirewallRule>,
    /// How denied calls are handled
    pub deny_action:   DenyAction,
}

struct Policy {
    config:    FirewallConfig,
    /// Decisions already taken, keyed by `Type::member`
    decisions: RwLock<HashMap<String, bool>>,
}

impl Policy {
    fn is_allowed(&self, type_name: &str, member: &str) -> bool {
        let key = member_key(type_name, member);

        // Check cache first
        if let Some(allowed) =
            self.decisions.read().unwrap_or_else(PoisonError::into_inner).get(&key)
        {
            return *allowed;
        }

        let allowed = self.apply_rules(type_name, member);
        self.decisions.write().unwrap_or_else(PoisonError::into_inner).insert(key, allowed);
        allowed
    }

    fn apply_rules(&self, type_name: &str, member: &str) -> bool {
        self.config.rules.iter().fold(self.config.default_allow, |allowed, rule| match rule {
            FirewallRule::AllowMember(t, m) if t == type_name && m == member => true,
            FirewallRule::AllowType(t) if t == type_name => true,
            FirewallRule::DenyMember(t, m) if t == type_name && m == member => false,
            FirewallRule::DenyType(t) if t == type_name => false,
            _ => allowed,
        })
    }
}

/// A strategy that enforces access rules on member calls
#[derive(Clone)]
pub struct FirewallStrategy {
    policy:   Arc<Policy>,
    selector: Selector,
}

impl FirewallStrategy {
    /// Create a new firewall strategy with the given configuration
    #[must_use]
    pub fn new(config: FirewallConfig) -> Self {
        Self {
            policy:   Arc::new(Policy {
                config,
                decisions: RwLock::new(HashMap::new()),
            }),
            selector: Selector::default(),
        }
    }

    /// Choose the members to guard
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Whether a call of `member` on a receiver of type `type_name` passes
    #[must_use]
    pub fn is_allowed(&self, type_name: &str, member: &str) -> bool {
        self.policy.is_allowed(type_name, member)
    }

    /// Build an aspect with one before advice guarding every call
    #[must_use]
    pub fn to_aspect(&self) -> Aspect {
        let policy = Arc::clone(&self.policy);
        let advice = Advice::before(move |ctx, _args| {
            if policy.is_allowed(ctx.target_type(), ctx.member_name()) {
                return Ok(());
            }
            #[cfg(feature = "log")]
            log::debug!(
                target: "weft::firewall",
                "denied call to {}::{}",
                ctx.target_type(),
                ctx.member_name()
            );
            match policy.config.deny_action {
                DenyAction::Reject => Err(kinds::access_denied(format!(
                    "call to {} not allowed by firewall policy",
                    member_key(ctx.target_type(), ctx.member_name())
                ))),
                DenyAction::Stop => {
                    ctx.stop();
                    Ok(())
                }
            }
        });
        Aspect::new([advice]).with_selector(self.selector.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use weft_error::codes;

    use super::*;
    use crate::{object::Object, values::Value};

    fn vault(calls: &Arc<AtomicUsize>) -> Object {
        let vault = Object::named("Vault");
        for name in ["open", "peek"] {
            let calls = Arc::clone(calls);
            vault.define_method(name, move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from("contents"))
            });
        }
        vault
    }

    #[test]
    fn test_rules_apply_in_order() {
        let strategy = FirewallStrategy::new(FirewallConfig {
            default_allow: false,
            rules:         vec![
                FirewallRule::AllowType("Vault".to_owned()),
                FirewallRule::DenyMember("Vault".to_owned(), "open".to_owned()),
            ],
            deny_action:   DenyAction::Reject,
        });
        assert!(strategy.is_allowed("Vault", "peek"));
        assert!(!strategy.is_allowed("Vault", "open"));
        assert!(!strategy.is_allowed("Safe", "peek"));
    }

    #[test]
    fn test_reject_fails_the_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let vault = vault(&calls);
        let strategy = FirewallStrategy::new(FirewallConfig {
            default_allow: true,
            rules:         vec![FirewallRule::DenyMember("Vault".to_owned(), "open".to_owned())],
            deny_action:   DenyAction::Reject,
        })
        .with_selector(Selector::own_members());
        assert!(strategy.to_aspect().apply([&vault]).is_ok());

        let denied = vault.invoke("open", &[]).map_err(|e| e.code());
        assert_eq!(denied, Err(codes::ACCESS_DENIED));
        assert_eq!(vault.invoke("peek", &[]), Ok(Value::from("contents")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_returns_undefined() {
        let calls = Arc::new(AtomicUsize::new(0));
        let vault = vault(&calls);
        let strategy = FirewallStrategy::new(FirewallConfig {
            deny_action: DenyAction::Stop,
            ..FirewallConfig::default()
        })
        .with_selector(Selector::member("open"));
        assert!(strategy.to_aspect().apply([&vault]).is_ok());

        assert_eq!(vault.invoke("open", &[]), Ok(Value::Undefined));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

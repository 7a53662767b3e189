// WEFT - weft-intercept
// Module: Member Introduction
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Copying members onto a target or its member template.
//!
//! Introduction does not intercept anything: it defines plain members, and
//! a member it overwrites loses any advices woven onto it.

use std::collections::{btree_map, BTreeMap};

use weft_error::{kinds, Result};

use crate::{
    object::{Method, Object, Slot},
    selector::ScopeKind,
    values::Value,
};

/// Named members to introduce
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    entries: BTreeMap<String, Slot>,
}

impl PropertyBag {
    /// Create an empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, replacing one of the same name
    pub fn insert(&mut self, name: impl Into<String>, slot: impl Into<Slot>) -> Option<Slot> {
        self.entries.insert(name.into(), slot.into())
    }

    /// Add a data member
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Add a method
    #[must_use]
    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(name, Method::new(f));
        self
    }

    /// Number of members in the bag
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the members in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Slot> {
        self.entries.iter()
    }
}

impl<N: Into<String>, S: Into<Slot>> FromIterator<(N, S)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, slot)| (name.into(), slot.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PropertyBag {
    type Item = (&'a String, &'a Slot);
    type IntoIter = btree_map::Iter<'a, String, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Define every member of `bag` on `target` or on its member template.
///
/// [`ScopeKind::OwnMembers`] writes to the target itself; both template
/// scopes write to the target's member template.
///
/// # Errors
///
/// Returns `INVALID_ARGUMENT` for [`ScopeKind::SingleMember`] and
/// `NO_MEMBER_TEMPLATE` for a template scope on an object without one.
pub fn introduce(target: &Object, scope: ScopeKind, bag: &PropertyBag) -> Result<()> {
    let table = match scope {
        ScopeKind::OwnMembers => target.members(),
        ScopeKind::AllTemplateMembers | ScopeKind::OwnTemplateMembers => target
            .member_template()
            .map(|template| template.members())
            .ok_or_else(|| {
                kinds::no_member_template(format!(
                    "{} does not provide a member template",
                    target.type_name()
                ))
            })?,
        ScopeKind::SingleMember => {
            return Err(kinds::invalid_argument(
                "members cannot be introduced with a single member scope",
            ));
        }
    };
    for (name, slot) in bag {
        table.define(name.clone(), slot.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use weft_error::codes;

    use super::*;
    use crate::object::Template;

    fn bag() -> PropertyBag {
        PropertyBag::new()
            .with_value("version", 2)
            .with_method("describe", |this, _| Ok(Value::from(this.type_name())))
    }

    #[test]
    fn test_own_members_go_on_target() {
        let target = Object::named("Widget");
        assert!(introduce(&target, ScopeKind::OwnMembers, &bag()).is_ok());
        assert_eq!(target.invoke("describe", &[]), Ok(Value::from("Widget")));
        assert!(matches!(target.get("version"), Some(Slot::Data(Value::I64(2)))));
    }

    #[test]
    fn test_template_scope_goes_on_member_template() {
        let template = Template::new("Widget");
        let class = Object::class(&template);
        assert!(introduce(&class, ScopeKind::AllTemplateMembers, &bag()).is_ok());

        assert!(class.members().is_empty());
        let instance = template.instantiate();
        assert_eq!(instance.invoke("describe", &[]), Ok(Value::from("Widget")));
    }

    #[test]
    fn test_rejected_scopes() {
        let plain = Object::new();
        let single = introduce(&plain, ScopeKind::SingleMember, &bag()).map_err(|e| e.code());
        assert_eq!(single, Err(codes::INVALID_ARGUMENT));
        let template =
            introduce(&plain, ScopeKind::OwnTemplateMembers, &bag()).map_err(|e| e.code());
        assert_eq!(template, Err(codes::NO_MEMBER_TEMPLATE));
    }

    #[test]
    fn test_bag_from_iterator() {
        let bag: PropertyBag = [("a", Value::from(1)), ("b", Value::from(2))].into_iter().collect();
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(), ["a", "b"]);
    }
}

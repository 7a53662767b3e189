// WEFT - weft-intercept
// Module: Member Selection
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Selectors decide which members of a target get woven.
//!
//! A [`Selector`] combines a [`Scope`], which names the table the candidates
//! come from, with an optional [`NamePattern`] that filters them by name.
//! Only callable members survive resolution; data fields are left alone
//! whatever the scope says.

use std::{fmt, str::FromStr};

use regex::Regex;
use weft_error::{kinds, Error, Result};

use crate::object::{MemberTable, Method, Object, Slot, Template};

/// Scope identifiers as found in the scope registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScopeKind {
    /// One named member of the target
    SingleMember,
    /// The target's own enumerable members
    OwnMembers,
    /// Every enumerable member reachable on the target's member template
    AllTemplateMembers,
    /// Members declared directly on the target's member template
    OwnTemplateMembers,
}

impl ScopeKind {
    /// Every scope, in registry order
    pub const ALL: [ScopeKind; 4] = [
        Self::SingleMember,
        Self::OwnMembers,
        Self::AllTemplateMembers,
        Self::OwnTemplateMembers,
    ];

    /// Registry name of the scope
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SingleMember => "member",
            Self::OwnMembers => "own_members",
            Self::AllTemplateMembers => "template_members",
            Self::OwnTemplateMembers => "own_template_members",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScopeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| kinds::unknown_scope(format!("unknown scope `{s}`")))
    }
}

/// Where selector candidates come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The named member, wherever it resolves from
    SingleMember(String),
    /// The target's own enumerable members
    OwnMembers,
    /// Every enumerable member reachable on the target's member template,
    /// inherited ones included
    #[default]
    AllTemplateMembers,
    /// Members declared directly on the target's member template
    OwnTemplateMembers,
}

impl Scope {
    /// Registry identifier of this scope
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::SingleMember(_) => ScopeKind::SingleMember,
            Self::OwnMembers => ScopeKind::OwnMembers,
            Self::AllTemplateMembers => ScopeKind::AllTemplateMembers,
            Self::OwnTemplateMembers => ScopeKind::OwnTemplateMembers,
        }
    }
}

/// A regular expression filtering member names.
///
/// Matching is unanchored: `"a+bc"` matches both `abc` and `xaabcx`.
#[derive(Debug, Clone)]
pub struct NamePattern(Regex);

impl NamePattern {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns `INVALID_NAME_PATTERN` if `pattern` is not a valid regular
    /// expression.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| kinds::invalid_name_pattern(format!("invalid name pattern: {e}")))
    }

    /// Whether `name` contains a match
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.0.is_match(name)
    }

    /// The source text of the pattern
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl FromStr for NamePattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// The table a woven member is installed in
#[derive(Debug, Clone)]
pub(crate) enum Host {
    Object(Object),
    Template(Template),
}

impl Host {
    pub(crate) fn table(&self) -> &MemberTable {
        match self {
            Self::Object(object) => object.members(),
            Self::Template(template) => template.members(),
        }
    }

    pub(crate) fn type_name(&self) -> &str {
        match self {
            Self::Object(object) => object.type_name(),
            Self::Template(template) => template.name(),
        }
    }

    /// Enumerability a dispatcher gets when it has to be added to this
    /// host's table to shadow `name`.
    ///
    /// On an object the shadow is an own member like any assigned one. On a
    /// template it follows the inherited declaration, so later selections
    /// see the member exactly as before.
    pub(crate) fn shadow_enumerable(&self, name: &str) -> bool {
        match self {
            Self::Object(_) => true,
            Self::Template(template) => template.is_enumerable(name),
        }
    }
}

/// A member picked by a selector, with the callable it currently resolves to
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) host:       Host,
    pub(crate) name:       String,
    pub(crate) method:     Method,
    /// Enumerability of the dispatcher if the host does not declare `name`
    pub(crate) enumerable: bool,
}

/// Which members of a target to weave
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    scope:   Scope,
    pattern: Option<NamePattern>,
}

impl Selector {
    /// Create a selector for `scope` without a name filter
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            pattern: None,
        }
    }

    /// Select one named member
    #[must_use]
    pub fn member(name: impl Into<String>) -> Self {
        Self::new(Scope::SingleMember(name.into()))
    }

    /// Select the target's own members
    #[must_use]
    pub fn own_members() -> Self {
        Self::new(Scope::OwnMembers)
    }

    /// Select every member reachable on the target's member template
    #[must_use]
    pub fn template_members() -> Self {
        Self::new(Scope::AllTemplateMembers)
    }

    /// Select the members declared on the target's member template
    #[must_use]
    pub fn own_template_members() -> Self {
        Self::new(Scope::OwnTemplateMembers)
    }

    /// Build a selector from a registry identifier.
    ///
    /// `member_name` is only consulted for [`ScopeKind::SingleMember`].
    ///
    /// # Errors
    ///
    /// Returns `MISSING_MEMBER_NAME` when a single member scope is requested
    /// without a name.
    pub fn from_kind(kind: ScopeKind, member_name: Option<&str>) -> Result<Self> {
        let scope = match kind {
            ScopeKind::SingleMember => {
                Scope::SingleMember(member_name.ok_or_else(kinds::missing_member_name)?.to_owned())
            }
            ScopeKind::OwnMembers => Scope::OwnMembers,
            ScopeKind::AllTemplateMembers => Scope::AllTemplateMembers,
            ScopeKind::OwnTemplateMembers => Scope::OwnTemplateMembers,
        };
        Ok(Self::new(scope))
    }

    /// Restrict the selection to names matching `pattern`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_NAME_PATTERN` if `pattern` does not compile.
    pub fn matching(self, pattern: &str) -> Result<Self> {
        Ok(self.with_pattern(NamePattern::new(pattern)?))
    }

    /// Restrict the selection with an already compiled pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: NamePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// The scope of this selector
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The name filter, if any
    #[must_use]
    pub fn pattern(&self) -> Option<&NamePattern> {
        self.pattern.as_ref()
    }

    fn member_template(target: &Object) -> Result<&Template> {
        target.member_template().ok_or_else(|| {
            kinds::no_member_template(format!(
                "{} does not provide a member template",
                target.type_name()
            ))
        })
    }

    /// Resolve the selector against `target`.
    ///
    /// Inherited members are reported against the table the selection was
    /// made on, so weaving them shadows the inherited declaration instead of
    /// touching the ancestor.
    pub(crate) fn resolve(&self, target: &Object) -> Result<Vec<Candidate>> {
        let (host, members): (Host, Vec<(String, Option<Slot>)>) = match &self.scope {
            Scope::SingleMember(name) => {
                (Host::Object(target.clone()), vec![(name.clone(), target.get(name))])
            }
            Scope::OwnMembers => {
                let table = target.members();
                let members = table
                    .enumerable_names()
                    .into_iter()
                    .map(|name| {
                        let slot = table.get(&name);
                        (name, slot)
                    })
                    .collect();
                (Host::Object(target.clone()), members)
            }
            Scope::AllTemplateMembers => {
                let template = Self::member_template(target)?;
                let members = template
                    .resolvable_names()
                    .into_iter()
                    .map(|name| {
                        let slot = template.lookup(&name);
                        (name, slot)
                    })
                    .collect();
                (Host::Template(template.clone()), members)
            }
            Scope::OwnTemplateMembers => {
                let template = Self::member_template(target)?;
                let table = template.members();
                let members = table
                    .names()
                    .into_iter()
                    .map(|name| {
                        let slot = table.get(&name);
                        (name, slot)
                    })
                    .collect();
                (Host::Template(template.clone()), members)
            }
        };

        let candidates = members
            .into_iter()
            .filter(|(name, _)| self.pattern.as_ref().is_none_or(|pattern| pattern.is_match(name)))
            .filter_map(|(name, slot)| match slot {
                Some(Slot::Method(method)) => Some(Candidate {
                    enumerable: host.shadow_enumerable(&name),
                    host: host.clone(),
                    name,
                    method,
                }),
                Some(Slot::Data(_)) => {
                    #[cfg(feature = "log")]
                    log::trace!(
                        target: "weft::selector",
                        "skipping data member {}::{}",
                        host.type_name(),
                        name
                    );
                    None
                }
                None => None,
            })
            .collect();
        Ok(candidates)
    }
}

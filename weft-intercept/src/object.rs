// WEFT - weft-intercept
// Module: Targets and Member Tables
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Targets of interception and their dispatch tables.
//!
//! Every [`Object`] and [`Template`] owns a [`MemberTable`] that maps member
//! names to [`Slot`]s. Lookups on an object fall back to its prototype
//! template and from there through the parent chain, which is what gives
//! instances access to the members declared on their type.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
    },
};

use weft_error::{kinds, Result};

use crate::{values::Value, weaver::Weaver};

/// Signature of a callable member. The receiver is passed explicitly.
pub type MethodFn = dyn Fn(&Object, &[Value]) -> Result<Value> + Send + Sync;

/// A cloneable, shareable callable member
#[derive(Clone)]
pub struct Method(Arc<MethodFn>);

impl Method {
    /// Create a method from a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Call the method with an explicit receiver
    ///
    /// # Errors
    ///
    /// Returns whatever error the method body raises.
    pub fn call(&self, this: &Object, args: &[Value]) -> Result<Value> {
        (self.0)(this, args)
    }

    /// Whether both handles refer to the same callable
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}

/// The value stored under a member name
#[derive(Debug, Clone)]
pub enum Slot {
    /// A plain data field; never intercepted
    Data(Value),
    /// A callable member
    Method(Method),
}

impl Slot {
    /// The method in this slot, if it is callable
    #[must_use]
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Self::Method(method) => Some(method),
            Self::Data(_) => None,
        }
    }

    /// Whether this slot holds a method
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}

impl From<Method> for Slot {
    fn from(method: Method) -> Self {
        Self::Method(method)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Self::Data(value)
    }
}

/// Process-unique identity of a [`MemberTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId(u64);

impl TableId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Property {
    slot:       Slot,
    enumerable: bool,
}

/// An explicit dispatch table of named members
///
/// Names are kept in lexicographic order. Members are either enumerable
/// (defined with [`MemberTable::define`]) or hidden (defined with
/// [`MemberTable::define_hidden`]); only enumerable members are picked up by
/// the own-members and template-members scopes.
pub struct MemberTable {
    id:      TableId,
    entries: RwLock<BTreeMap<String, Property>>,
}

impl MemberTable {
    /// Create an empty table with a fresh identity
    #[must_use]
    pub fn new() -> Self {
        Self {
            id:      TableId::next(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Identity of this table
    #[must_use]
    pub fn id(&self) -> TableId {
        self.id
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Property>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Property>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, name: String, slot: Slot, enumerable: bool) -> Option<Slot> {
        Weaver::global().forget(self.id, &name);
        let previous = self.write().insert(name, Property { slot, enumerable });
        previous.map(|property| property.slot)
    }

    /// Define an enumerable member, returning the slot it replaced.
    ///
    /// A member that was woven becomes plain again: its previous advices
    /// are discarded along with the previous slot.
    pub fn define(&self, name: impl Into<String>, slot: impl Into<Slot>) -> Option<Slot> {
        self.insert(name.into(), slot.into(), true)
    }

    /// Define a member that is skipped when members are enumerated
    pub fn define_hidden(&self, name: impl Into<String>, slot: impl Into<Slot>) -> Option<Slot> {
        self.insert(name.into(), slot.into(), false)
    }

    /// Remove a member
    pub fn remove(&self, name: &str) -> Option<Slot> {
        Weaver::global().forget(self.id, name);
        let previous = self.write().remove(name);
        previous.map(|property| property.slot)
    }

    /// Look up a member declared in this table
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Slot> {
        self.read().get(name).map(|property| property.slot.clone())
    }

    /// Whether this table declares `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Whether `name` is declared here and enumerable
    #[must_use]
    pub fn is_enumerable(&self, name: &str) -> bool {
        self.read().get(name).is_some_and(|property| property.enumerable)
    }

    /// Names of all declared members, enumerable or not
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Names of the enumerable members
    #[must_use]
    pub fn enumerable_names(&self) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, property)| property.enumerable)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of declared members
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the table declares no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Put a dispatcher in place of `name`.
    ///
    /// Unlike [`MemberTable::define`] this keeps the wrapper record alive.
    /// An existing member keeps its enumerability; a member installed to
    /// shadow an inherited one gets `enumerable`.
    pub(crate) fn install(&self, name: &str, method: Method, enumerable: bool) {
        let mut entries = self.write();
        let previous = match entries.get_mut(name) {
            Some(property) => Some(std::mem::replace(&mut property.slot, Slot::Method(method))),
            None => {
                entries.insert(name.to_owned(), Property {
                    slot: Slot::Method(method),
                    enumerable,
                });
                None
            }
        };
        drop(entries);
        drop(previous);
    }
}

impl Default for MemberTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemberTable {
    fn drop(&mut self) {
        Weaver::global().forget_table(self.id);
    }
}

impl fmt::Debug for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberTable")
            .field("id", &self.id)
            .field("names", &self.names())
            .finish()
    }
}

struct TemplateInner {
    name:    String,
    members: MemberTable,
    parent:  Option<Template>,
}

/// A member template: the members shared by every instance of a type
#[derive(Clone)]
pub struct Template(Arc<TemplateInner>);

impl Template {
    /// Create a root template
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(TemplateInner {
            name:    name.into(),
            members: MemberTable::new(),
            parent:  None,
        }))
    }

    /// Create a child template inheriting from this one
    #[must_use]
    pub fn derive(&self, name: impl Into<String>) -> Self {
        Self(Arc::new(TemplateInner {
            name:    name.into(),
            members: MemberTable::new(),
            parent:  Some(self.clone()),
        }))
    }

    /// Type name of the template
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Members declared directly on this template
    #[must_use]
    pub fn members(&self) -> &MemberTable {
        &self.0.members
    }

    /// The template this one inherits from
    #[must_use]
    pub fn parent(&self) -> Option<&Template> {
        self.0.parent.as_ref()
    }

    /// Declare an enumerable member on this template
    pub fn define(&self, name: impl Into<String>, slot: impl Into<Slot>) -> Option<Slot> {
        self.members().define(name, slot)
    }

    /// Declare an enumerable method on this template
    pub fn define_method<F>(&self, name: impl Into<String>, f: F) -> Option<Slot>
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.members().define(name, Method::new(f))
    }

    /// Iterate this template and its ancestors, nearest first
    pub fn ancestry(&self) -> impl Iterator<Item = &Template> {
        std::iter::successors(Some(self), |template| template.parent())
    }

    /// Resolve a member through the parent chain
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Slot> {
        self.ancestry().find_map(|template| template.members().get(name))
    }

    /// Whether the nearest declaration of `name` is enumerable
    #[must_use]
    pub fn is_enumerable(&self, name: &str) -> bool {
        self.ancestry()
            .map(Template::members)
            .find(|table| table.contains(name))
            .is_some_and(|table| table.is_enumerable(name))
    }

    /// Names of all enumerable members resolvable on this template,
    /// including inherited ones.
    ///
    /// A name is reported once, at its nearest declaration. A hidden
    /// declaration hides the name even if an ancestor declares it
    /// enumerable.
    #[must_use]
    pub fn resolvable_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for template in self.ancestry() {
            let table = template.members();
            for name in table.names() {
                if seen.insert(name.clone()) && table.is_enumerable(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Create an instance whose lookups fall back to this template
    #[must_use]
    pub fn instantiate(&self) -> Object {
        Object(Arc::new(ObjectInner {
            type_name: self.name().to_owned(),
            members:   MemberTable::new(),
            prototype: Some(self.clone()),
            template:  None,
        }))
    }

    /// Whether both handles refer to the same template
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Template {}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name())
            .field("members", self.members())
            .field("parent", &self.parent().map(Template::name))
            .finish()
    }
}

struct ObjectInner {
    type_name: String,
    members:   MemberTable,
    prototype: Option<Template>,
    template:  Option<Template>,
}

/// A target of interception
///
/// Cloning an `Object` clones the handle; equality is identity.
#[derive(Clone)]
pub struct Object(Arc<ObjectInner>);

impl Object {
    /// Create a plain object of type `Object`
    #[must_use]
    pub fn new() -> Self {
        Self::named("Object")
    }

    /// Create a plain object with the given type name
    #[must_use]
    pub fn named(type_name: impl Into<String>) -> Self {
        Self(Arc::new(ObjectInner {
            type_name: type_name.into(),
            members:   MemberTable::new(),
            prototype: None,
            template:  None,
        }))
    }

    /// Create the type object for `template`.
    ///
    /// The result provides `template` as its member template, so template
    /// scopes resolve against it. Its own table holds static members.
    #[must_use]
    pub fn class(template: &Template) -> Self {
        Self(Arc::new(ObjectInner {
            type_name: template.name().to_owned(),
            members:   MemberTable::new(),
            prototype: None,
            template:  Some(template.clone()),
        }))
    }

    /// Create an instance of the type this object provides
    ///
    /// # Errors
    ///
    /// Returns `NO_MEMBER_TEMPLATE` if this object is not a type object.
    pub fn instantiate(&self) -> Result<Object> {
        self.member_template().map(Template::instantiate).ok_or_else(|| {
            kinds::no_member_template(format!(
                "{} does not provide a member template",
                self.type_name()
            ))
        })
    }

    /// Type name of the object
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    /// The object's own members
    #[must_use]
    pub fn members(&self) -> &MemberTable {
        &self.0.members
    }

    /// The template lookups fall back to
    #[must_use]
    pub fn prototype(&self) -> Option<&Template> {
        self.0.prototype.as_ref()
    }

    /// The member template this object provides, if it is a type object
    #[must_use]
    pub fn member_template(&self) -> Option<&Template> {
        self.0.template.as_ref()
    }

    /// Define an enumerable own member
    pub fn define(&self, name: impl Into<String>, slot: impl Into<Slot>) -> Option<Slot> {
        self.members().define(name, slot)
    }

    /// Define an enumerable own method
    pub fn define_method<F>(&self, name: impl Into<String>, f: F) -> Option<Slot>
    where
        F: Fn(&Object, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.members().define(name, Method::new(f))
    }

    /// Look up a member, own members first, then the prototype chain
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Slot> {
        self.members()
            .get(name)
            .or_else(|| self.prototype().and_then(|template| template.lookup(name)))
    }

    /// Call a member with this object as receiver
    ///
    /// # Errors
    ///
    /// Returns `MEMBER_NOT_FOUND` if no member is resolvable under `name`,
    /// `NOT_CALLABLE` if it is a data field, or whatever the member raises.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.get(name) {
            Some(Slot::Method(method)) => method.call(self, args),
            Some(Slot::Data(_)) => Err(kinds::not_callable(format!(
                "{}::{name} is not callable",
                self.type_name()
            ))),
            None => Err(kinds::member_not_found(format!(
                "{}::{name} is not defined",
                self.type_name()
            ))),
        }
    }

    /// Whether both handles refer to the same object
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A handle that does not keep the object alive.
    ///
    /// Advices that need to reach their own target should capture this
    /// instead of an [`Object`]: the advice is owned by the target's
    /// dispatcher, so a strong handle would keep the target alive forever.
    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject(Arc::downgrade(&self.0))
    }
}

/// Non-owning handle to an [`Object`]
#[derive(Clone)]
pub struct WeakObject(Weak<ObjectInner>);

impl WeakObject {
    /// The object, if it is still alive
    #[must_use]
    pub fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakObject(..)")
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type_name", &self.type_name())
            .field("members", self.members())
            .field("prototype", &self.prototype().map(Template::name))
            .finish_non_exhaustive()
    }
}

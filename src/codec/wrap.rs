//! Object wrapper: moving instances in and out of host wrappers.
//!
//! Values handed across the boundary are in one of three ownership modes:
//!
//! - [`Ownership::Owned`]: an [`Obj`] the receiver must release (drop).
//! - [`Ownership::Borrowed`]: a `&Obj` lent by a host wrapper; no count
//!   change, valid while the host value is.
//! - [`Ownership::ScopeBound`]: a `&Obj` owned by the current
//!   [`CallScope`], released when the scope ends.

use std::borrow::Cow;

use crate::error::{BindError, Result};
use crate::host::{HostObject, HostValue};
use crate::logging::trace;
use crate::object::{Builtin, Obj, TypeDescriptor};
use crate::scope::CallScope;

use super::Marshal;

/// Who is responsible for releasing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
    ScopeBound,
}

/// Canonical text borrowed from a host string or from caller storage,
/// presented to managed code as a `ZombieCharBuf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextView<'a> {
    text: &'a str,
}

impl<'a> TextView<'a> {
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn class_name(&self) -> &'static str {
        Builtin::ZombieCharBuf.name()
    }
}

/// An instance obtained by unwrapping a host argument.
#[derive(Debug, Clone)]
pub enum ObjArg<'a> {
    /// The instance inside a host wrapper.
    Borrowed(&'a Obj),
    /// A transient instance converted from a host container.
    Scoped(&'a Obj),
    /// A zero-allocation text view.
    Text(TextView<'a>),
}

impl<'a> ObjArg<'a> {
    pub fn ownership(&self) -> Ownership {
        match self {
            Self::Borrowed(_) | Self::Text(_) => Ownership::Borrowed,
            Self::Scoped(_) => Ownership::ScopeBound,
        }
    }

    /// The instance, unless this is a text view.
    pub fn as_obj(&self) -> Option<&'a Obj> {
        match *self {
            Self::Borrowed(obj) | Self::Scoped(obj) => Some(obj),
            Self::Text(_) => None,
        }
    }

    /// The text of a text view or of a text instance.
    pub fn text(&self) -> Option<Cow<'a, str>> {
        match *self {
            Self::Text(view) => Some(Cow::Borrowed(view.as_str())),
            Self::Borrowed(obj) | Self::Scoped(obj) => obj.text().map(Cow::Owned),
        }
    }

    pub fn class_name(&self) -> &'a str {
        match *self {
            Self::Borrowed(obj) | Self::Scoped(obj) => obj.class_name(),
            Self::Text(view) => view.class_name(),
        }
    }

    /// An owned handle: the same instance with one added count, or a new
    /// text instance for a view.
    pub fn to_owned_obj(&self) -> Obj {
        match *self {
            Self::Borrowed(obj) | Self::Scoped(obj) => Obj::clone(obj),
            Self::Text(view) => Obj::charbuf(view.as_str()),
        }
    }
}

impl Marshal<'_> {
    /// Wrap `obj` for the host, adding one count for the wrapper.
    pub fn wrap_existing(&self, obj: &Obj) -> HostValue {
        HostValue::Object(HostObject::new(obj.clone()))
    }

    /// Unwrap `value` as an instance of `expected`, or `None`.
    ///
    /// - A wrapped instance that is-a `expected` is lent as is.
    /// - With `storage`, and `expected` exactly `Obj`, `CharBuf`,
    ///   `ViewCharBuf` or `ZombieCharBuf`, the value's text becomes a
    ///   [`TextView`] borrowing the host string when it is already canonical
    ///   and `storage` otherwise.
    /// - An array reference for `VArray` or a hash reference for `Hash` is
    ///   converted deeply and parked in `scope`.
    pub fn maybe_to_obj<'a>(
        &self,
        value: &'a HostValue,
        expected: &TypeDescriptor,
        storage: Option<&'a mut String>,
        scope: &'a CallScope,
    ) -> Option<ObjArg<'a>> {
        if !value.is_defined() {
            return None;
        }

        if let HostValue::Object(wrapper) = value {
            if wrapper.obj().is_a(expected) {
                return Some(ObjArg::Borrowed(wrapper.obj()));
            }
        }

        if let Some(storage) = storage {
            if self.is_text_target(expected) {
                return Some(ObjArg::Text(text_view(value, storage)));
            }
        }

        let converted = match value {
            HostValue::Array(array) if *expected == *self.builtin(Builtin::VArray) => {
                self.array_to_managed(array)
            }
            HostValue::Hash(hash) if *expected == *self.builtin(Builtin::Hash) => {
                self.hash_to_managed(hash)
            }
            _ => return None,
        };
        Some(ObjArg::Scoped(scope.mortalize(converted)))
    }

    /// As [`Self::maybe_to_obj`], failing with `Not a <expected>`.
    pub fn to_obj<'a>(
        &self,
        value: &'a HostValue,
        expected: &TypeDescriptor,
        storage: Option<&'a mut String>,
        scope: &'a CallScope,
    ) -> Result<ObjArg<'a>> {
        self.maybe_to_obj(value, expected, storage, scope)
            .ok_or_else(|| BindError::not_a(expected.name()))
    }

    /// Allocate a blank instance.
    ///
    /// `either` is a wrapped instance, whose exact type is used, or a class
    /// name. An unregistered class name is registered on first use by
    /// following the host class hierarchy.
    pub fn new_blank_obj(&self, either: &HostValue) -> Result<Obj> {
        let descriptor = match either {
            HostValue::Object(wrapper) => wrapper.obj().descriptor().clone(),
            other => {
                let name = other.to_text();
                self.registry
                    .lookup_or_create(&name, |class| self.runtime.parent_class(class))?
            }
        };
        trace!(class = descriptor.name(), size = descriptor.alloc_size(), "allocating blank instance");
        Ok(Obj::make(descriptor))
    }

    fn is_text_target(&self, expected: &TypeDescriptor) -> bool {
        [
            Builtin::ZombieCharBuf,
            Builtin::ViewCharBuf,
            Builtin::CharBuf,
            Builtin::Obj,
        ]
        .into_iter()
        .any(|builtin| *expected == *self.builtin(builtin))
    }
}

fn text_view<'a>(value: &'a HostValue, storage: &'a mut String) -> TextView<'a> {
    match value {
        HostValue::Str(s) if s.is_utf8() || s.is_ascii() => {
            if let Ok(text) = std::str::from_utf8(s.as_bytes()) {
                return TextView { text };
            }
        }
        _ => {}
    }
    storage.clear();
    storage.push_str(&value.to_text());
    let storage: &'a String = storage;
    TextView { text: storage }
}

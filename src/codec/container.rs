//! Container codec: host arrays and hashes to managed arrays and maps, and
//! back, recursing through the general conversion paths for every element.
//!
//! Conversion is not cycle-safe: a container that contains itself recurses
//! until the stack is exhausted.

use std::borrow::Cow;

use crate::error::{BindError, Result};
use crate::host::{HostArray, HostHash, HostStr, HostValue};
use crate::logging::trace;
use crate::object::{Builtin, Obj, ObjBody, ObjHash};

use super::Marshal;

impl Marshal<'_> {
    /// General host → managed conversion.
    ///
    /// `Undef` has no managed form. Array and hash references convert
    /// deeply; a wrapped instance is returned with one added count; anything
    /// else (numbers included) is stringified into a text instance.
    pub fn host_to_managed(&self, value: &HostValue) -> Option<Obj> {
        match value {
            HostValue::Undef => None,
            HostValue::Array(array) => Some(self.array_to_managed(array)),
            HostValue::Hash(hash) => Some(self.hash_to_managed(hash)),
            HostValue::Object(wrapper) => Some(wrapper.obj().clone()),
            other => Some(self.host_to_managed_text(other)),
        }
    }

    /// Convert a host hash into a new map instance sized to its pair count.
    ///
    /// Every key becomes canonical text; `Undef` values become null values.
    pub fn hash_to_managed(&self, hash: &HostHash) -> Obj {
        let entries = hash.entries();
        trace!(pairs = entries.len(), "converting host hash");
        let mut retval = ObjHash::with_capacity(entries.len());
        for (key, value) in entries.iter() {
            let value = self.host_to_managed(value);
            retval.store(Obj::charbuf(&canonical_key(key)), value);
        }
        Obj::hash(retval)
    }

    /// Convert a host array into a new array instance.
    ///
    /// The length is the highest populated index + 1. Holes and `Undef`
    /// elements become null entries at their index.
    pub fn array_to_managed(&self, array: &HostArray) -> Obj {
        let size = array.populated_len();
        trace!(len = size, "converting host array");
        let slots = array.slots();
        let mut items: Vec<Option<Obj>> = slots
            .iter()
            .take(size)
            .map(|slot| slot.as_ref().and_then(|value| self.host_to_managed(value)))
            .collect();
        // A null last element must still count toward the length.
        items.resize(size, None);
        Obj::varray(items)
    }

    /// Convert an array instance into a host array reference.
    ///
    /// Null entries are left as holes rather than stored as `Undef`.
    pub fn array_to_host(&self, obj: &Obj) -> Result<HostValue> {
        let body = obj.body();
        let ObjBody::Array(items) = &*body else {
            return Err(BindError::not_a(Builtin::VArray.name()));
        };
        let array = HostArray::new();
        array.fill(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(item) = item else {
                continue;
            };
            array.store(index, self.to_host(Some(item))?);
        }
        Ok(HostValue::Array(array))
    }

    /// Convert a map instance into a host hash reference.
    ///
    /// Every key must be a text instance; any other key class is a
    /// [`BindError::TypeMismatch`].
    pub fn hash_to_host(&self, obj: &Obj) -> Result<HostValue> {
        let body = obj.body();
        let ObjBody::Hash(hash) = &*body else {
            return Err(BindError::not_a(Builtin::Hash.name()));
        };
        let charbuf = self.builtin(Builtin::CharBuf);
        let retval = HostHash::new();
        for (key, value) in hash.iter() {
            let value = self.to_host(value)?;
            let text = match key.text() {
                Some(text) if key.is_a(&charbuf) => text,
                _ => return Err(BindError::bad_hash_key(key.class_name())),
            };
            retval.store(HostStr::text(&text), value);
        }
        Ok(HostValue::Hash(retval))
    }
}

/// A host hash key as canonical text.
///
/// Flagged keys and pure 7-bit keys are used as they are; any other key is
/// re-encoded through the host's text coercion.
fn canonical_key(key: &HostStr) -> Cow<'_, str> {
    if !key.is_utf8() && !key.is_ascii() {
        trace!(len = key.len(), "re-encoding non-ASCII octet key");
    }
    key.to_utf8()
}

//! Minimal model of the scripting host's native values.
//!
//! The host is an external collaborator; this module carries only what the
//! conversion layer needs from it: tagged scalar values, shared array and
//! hash containers, wrapped object handles, the host's coercion rules
//! ([`coerce`]) and interpreter-level state ([`HostRuntime`]).
//!
//! # Module Organization
//!
//! - [`coerce`]: numeric / text / truth coercion of host values
//! - [`runtime`]: native integer width, class hierarchy, parameter schemas

pub mod coerce;
pub mod runtime;

pub use runtime::{HostRuntime, IntWidth};

use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::object::Obj;

/// A value in the host's native representation.
///
/// `Array`, `Hash` and `Object` are references: cloning the value shares the
/// referent, exactly like copying a host reference.
#[derive(Debug, Clone, Default)]
pub enum HostValue {
    /// The undefined value. Distinct from every scalar.
    #[default]
    Undef,
    /// A native integer.
    Int(i64),
    /// A native floating-point number.
    Num(f64),
    /// A string scalar (text or octets).
    Str(HostStr),
    /// A reference to an array.
    Array(HostArray),
    /// A reference to a hash.
    Hash(HostHash),
    /// A host wrapper around a managed instance.
    Object(HostObject),
}

impl HostValue {
    /// A canonical-text string scalar.
    pub fn text(s: &str) -> Self {
        Self::Str(HostStr::text(s))
    }

    /// An octet string scalar without the text flag.
    pub fn bytes(b: &[u8]) -> Self {
        Self::Str(HostStr::bytes(b))
    }

    /// Whether the value is defined.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Undef)
    }

    pub fn as_str(&self) -> Option<&HostStr> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&HostArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HostHash> {
        match self {
            Self::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undef, Self::Undef) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Num(a), Self::Num(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<HostArray> for HostValue {
    fn from(a: HostArray) -> Self {
        Self::Array(a)
    }
}

impl From<HostHash> for HostValue {
    fn from(h: HostHash) -> Self {
        Self::Hash(h)
    }
}

/// A host string: octets plus the canonical-text (UTF-8) flag.
///
/// An unflagged string's text meaning is one character per octet (Latin-1).
/// Equality and hashing compare the text meaning, so `"abc"` with and
/// without the flag are the same string.
#[derive(Debug, Clone)]
pub struct HostStr {
    bytes: Vec<u8>,
    utf8: bool,
}

impl HostStr {
    /// A flagged string holding canonical text.
    pub fn text(s: &str) -> Self {
        Self {
            bytes: s.as_bytes().to_vec(),
            utf8: true,
        }
    }

    /// An unflagged octet string.
    pub fn bytes(b: &[u8]) -> Self {
        Self {
            bytes: b.to_vec(),
            utf8: false,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the canonical-text flag is set.
    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    /// Whether every octet is in the 7-bit range.
    pub fn is_ascii(&self) -> bool {
        self.bytes.is_ascii()
    }

    /// The string as canonical text.
    ///
    /// Flagged and pure 7-bit strings are borrowed; other octet strings are
    /// upgraded one character per octet.
    pub fn to_utf8(&self) -> Cow<'_, str> {
        // 7-bit octets are valid UTF-8 as they stand.
        if self.utf8 || self.is_ascii() {
            String::from_utf8_lossy(&self.bytes)
        } else {
            Cow::Owned(self.bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

impl PartialEq for HostStr {
    fn eq(&self, other: &Self) -> bool {
        if self.utf8 == other.utf8 {
            self.bytes == other.bytes
        } else {
            self.to_utf8() == other.to_utf8()
        }
    }
}

impl Eq for HostStr {}

impl Hash for HostStr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_utf8().hash(state);
    }
}

impl From<&str> for HostStr {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

/// A shared reference to a host array. Slots may be holes.
#[derive(Debug, Clone, Default)]
pub struct HostArray(Rc<RefCell<Vec<Option<HostValue>>>>);

impl HostArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// An array with every value populated.
    pub fn from_values(values: impl IntoIterator<Item = HostValue>) -> Self {
        Self(Rc::new(RefCell::new(values.into_iter().map(Some).collect())))
    }

    /// An array whose holes are given as `None`.
    pub fn from_slots(slots: impl IntoIterator<Item = Option<HostValue>>) -> Self {
        Self(Rc::new(RefCell::new(slots.into_iter().collect())))
    }

    pub fn push(&self, value: HostValue) {
        self.0.borrow_mut().push(Some(value));
    }

    /// Store at `index`, extending the array with holes as needed.
    pub fn store(&self, index: usize, value: HostValue) {
        let mut slots = self.0.borrow_mut();
        if index >= slots.len() {
            slots.resize(index + 1, None);
        }
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(value);
        }
    }

    /// Extend (with holes) or truncate to exactly `len` slots.
    pub fn fill(&self, len: usize) {
        self.0.borrow_mut().resize(len, None);
    }

    /// A copy of the value at `index`, or `None` for a hole.
    pub fn fetch(&self, index: usize) -> Option<HostValue> {
        self.0.borrow().get(index).cloned().flatten()
    }

    /// Whether `index` is inside the array and not populated.
    pub fn is_hole(&self, index: usize) -> bool {
        matches!(self.0.borrow().get(index), Some(None))
    }

    /// Number of slots, holes included.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Highest populated index + 1. Trailing holes do not count.
    pub fn populated_len(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1)
    }

    /// Borrow the slots for iteration.
    pub fn slots(&self) -> Ref<'_, Vec<Option<HostValue>>> {
        self.0.borrow()
    }

    /// Whether both handles refer to the same array.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for HostArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

/// A shared reference to a host hash.
#[derive(Debug, Clone, Default)]
pub struct HostHash(Rc<RefCell<HashMap<HostStr, HostValue>>>);

impl HostHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K: Into<HostStr>>(pairs: impl IntoIterator<Item = (K, HostValue)>) -> Self {
        let map = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self(Rc::new(RefCell::new(map)))
    }

    /// Store a pair; a later store under an equal key replaces the value.
    pub fn store(&self, key: impl Into<HostStr>, value: HostValue) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    pub fn fetch(&self, key: &str) -> Option<HostValue> {
        self.0.borrow().get(&HostStr::text(key)).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(&HostStr::text(key))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Borrow the entries for iteration. Order is unspecified.
    pub fn entries(&self) -> Ref<'_, HashMap<HostStr, HostValue>> {
        self.0.borrow()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for HostHash {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

/// A host-side wrapper object holding one reference to a managed instance.
///
/// The wrapper's class is the instance's type name.
#[derive(Debug, Clone)]
pub struct HostObject {
    obj: Obj,
}

impl HostObject {
    /// Wrap `obj`, taking over the count unit it carries.
    pub fn new(obj: Obj) -> Self {
        Self { obj }
    }

    pub fn class_name(&self) -> &str {
        self.obj.class_name()
    }

    /// The wrapped instance, borrowed.
    pub fn obj(&self) -> &Obj {
        &self.obj
    }

    pub fn into_obj(self) -> Obj {
        self.obj
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.obj.ptr_eq(&other.obj)
    }
}

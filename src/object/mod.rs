//! Minimal model of the reference-counted object system.
//!
//! An [`Obj`] is a counted handle: cloning it is an increment, dropping it
//! is a release. Each instance carries its runtime [`TypeDescriptor`] and a
//! typed body. Descriptors live in the process-wide [`TypeRegistry`].
//!
//! # Module Organization
//!
//! - [`registry`]: type descriptors, built-in types, the type registry

pub mod registry;

pub use registry::{Builtin, ObjKind, TypeDescriptor, TypeRegistry};

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use registry::OBJ_HEADER_SIZE;

/// The state of an instance.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjBody {
    /// Zero-initialized instance fields.
    Fields(Vec<u8>),
    Text(String),
    Bytes(Vec<u8>),
    /// Array entries; `None` is a null entry.
    Array(Vec<Option<Obj>>),
    Hash(ObjHash),
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl ObjBody {
    fn blank(descriptor: &TypeDescriptor) -> Self {
        match descriptor.kind() {
            ObjKind::Fields => {
                Self::Fields(vec![0; descriptor.alloc_size().saturating_sub(OBJ_HEADER_SIZE)])
            }
            ObjKind::Text => Self::Text(String::new()),
            ObjKind::Bytes => Self::Bytes(Vec::new()),
            ObjKind::Array => Self::Array(Vec::new()),
            ObjKind::Hash => Self::Hash(ObjHash::default()),
            ObjKind::Float => Self::Float(0.0),
            ObjKind::Int => Self::Int(0),
            ObjKind::Bool => Self::Bool(false),
        }
    }
}

struct ObjCell {
    descriptor: Arc<TypeDescriptor>,
    body: RefCell<ObjBody>,
}

/// A counted handle to a managed instance.
#[derive(Clone)]
pub struct Obj(Rc<ObjCell>);

thread_local! {
    static TRUE: Obj = Obj::builtin(Builtin::BoolNum, ObjBody::Bool(true));
    static FALSE: Obj = Obj::builtin(Builtin::BoolNum, ObjBody::Bool(false));
}

impl Obj {
    /// Allocate a blank, zero-initialized instance of `descriptor`.
    pub fn make(descriptor: Arc<TypeDescriptor>) -> Self {
        let body = ObjBody::blank(&descriptor);
        Self::with_body(descriptor, body)
    }

    /// An instance of `descriptor` with the given body.
    pub fn with_body(descriptor: Arc<TypeDescriptor>, body: ObjBody) -> Self {
        Self(Rc::new(ObjCell {
            descriptor,
            body: RefCell::new(body),
        }))
    }

    fn builtin(builtin: Builtin, body: ObjBody) -> Self {
        Self::with_body(TypeRegistry::global().builtin(builtin), body)
    }

    pub fn charbuf(text: &str) -> Self {
        Self::builtin(Builtin::CharBuf, ObjBody::Text(text.to_string()))
    }

    pub fn bytebuf(bytes: &[u8]) -> Self {
        Self::builtin(Builtin::ByteBuf, ObjBody::Bytes(bytes.to_vec()))
    }

    pub fn varray(items: Vec<Option<Obj>>) -> Self {
        Self::builtin(Builtin::VArray, ObjBody::Array(items))
    }

    pub fn hash(hash: ObjHash) -> Self {
        Self::builtin(Builtin::Hash, ObjBody::Hash(hash))
    }

    pub fn float32(value: f32) -> Self {
        Self::builtin(Builtin::Float32, ObjBody::Float(f64::from(value)))
    }

    pub fn float64(value: f64) -> Self {
        Self::builtin(Builtin::Float64, ObjBody::Float(value))
    }

    pub fn integer32(value: i32) -> Self {
        Self::builtin(Builtin::Integer32, ObjBody::Int(i64::from(value)))
    }

    pub fn integer64(value: i64) -> Self {
        Self::builtin(Builtin::Integer64, ObjBody::Int(value))
    }

    /// The shared `TRUE` or `FALSE` singleton.
    pub fn boolean(value: bool) -> Self {
        if value {
            TRUE.with(Obj::clone)
        } else {
            FALSE.with(Obj::clone)
        }
    }

    pub fn is_true_singleton(&self) -> bool {
        TRUE.with(|t| self.ptr_eq(t))
    }

    pub fn is_false_singleton(&self) -> bool {
        FALSE.with(|f| self.ptr_eq(f))
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.0.descriptor
    }

    pub fn class_name(&self) -> &str {
        self.0.descriptor.name()
    }

    pub fn is_a(&self, ancestor: &TypeDescriptor) -> bool {
        self.0.descriptor.is_a(ancestor)
    }

    /// Current reference count.
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn body(&self) -> Ref<'_, ObjBody> {
        self.0.body.borrow()
    }

    pub fn body_mut(&self) -> RefMut<'_, ObjBody> {
        self.0.body.borrow_mut()
    }

    /// A copy of the text of a text-kind instance.
    pub fn text(&self) -> Option<String> {
        match &*self.body() {
            ObjBody::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Numeric value as `f64`, for number kinds.
    pub fn to_f64(&self) -> Option<f64> {
        match *self.body() {
            ObjBody::Float(f) => Some(f),
            ObjBody::Int(i) => Some(i as f64),
            ObjBody::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Numeric value as `i64`, for number kinds.
    pub fn to_i64(&self) -> Option<i64> {
        match *self.body() {
            ObjBody::Float(f) => Some(f as i64),
            ObjBody::Int(i) => Some(i),
            ObjBody::Bool(b) => Some(i64::from(b)),
            _ => None,
        }
    }
}

impl PartialEq for Obj {
    /// Identity, or equal bodies.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.body() == *other.body()
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obj")
            .field("class", &self.class_name())
            .field("body", &*self.body())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum HashKey {
    Text(String),
    Identity(usize),
}

impl HashKey {
    fn of(key: &Obj) -> Self {
        match &*key.body() {
            ObjBody::Text(s) => Self::Text(s.clone()),
            _ => Self::Identity(key.addr()),
        }
    }
}

/// Map storage for map-kind instances.
///
/// Keys are instances. Text keys compare by content; any other key compares
/// by identity. A value may be null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjHash {
    entries: HashMap<HashKey, (Obj, Option<Obj>)>,
}

impl ObjHash {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Store `value` under `key`, returning the value it replaced.
    pub fn store(&mut self, key: Obj, value: Option<Obj>) -> Option<Obj> {
        self.entries
            .insert(HashKey::of(&key), (key, value))
            .and_then(|(_, old)| old)
    }

    /// Store under a text key.
    pub fn store_str(&mut self, key: &str, value: Option<Obj>) -> Option<Obj> {
        self.store(Obj::charbuf(key), value)
    }

    /// The value under a text key; `None` when missing or null.
    pub fn fetch(&self, key: &str) -> Option<&Obj> {
        self.entries
            .get(&HashKey::Text(key.to_string()))
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&HashKey::Text(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Iterate key/value pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Obj, Option<&Obj>)> {
        self.entries.values().map(|(key, value)| (key, value.as_ref()))
    }
}

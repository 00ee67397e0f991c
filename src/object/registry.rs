//! Type descriptors and the process-wide type registry.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::error::{BindError, Result};
use crate::logging::info;

/// Bytes every instance spends on its header (type pointer and count).
pub const OBJ_HEADER_SIZE: usize = 16;

/// How an instance of a type stores its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    /// Plain instance with zero-initialized fields.
    Fields,
    Text,
    Bytes,
    Array,
    Hash,
    Float,
    Int,
    Bool,
}

impl ObjKind {
    fn alloc_size(self) -> usize {
        let body = match self {
            Self::Fields => 0,
            Self::Text | Self::Bytes | Self::Array => 24,
            Self::Hash => 48,
            Self::Float | Self::Int => 8,
            Self::Bool => 1,
        };
        OBJ_HEADER_SIZE + body
    }
}

/// Runtime metadata for one managed type.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: String,
    parent: Option<Arc<TypeDescriptor>>,
    kind: ObjKind,
    alloc_size: usize,
}

impl TypeDescriptor {
    fn root(name: &str, kind: ObjKind) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            kind,
            alloc_size: kind.alloc_size(),
        }
    }

    /// A subclass of `parent`. Instances share the parent's storage kind.
    fn subclass(name: &str, parent: &Arc<TypeDescriptor>, kind: Option<ObjKind>) -> Self {
        let kind = kind.unwrap_or(parent.kind);
        Self {
            name: name.to_string(),
            parent: Some(Arc::clone(parent)),
            kind,
            alloc_size: parent.alloc_size.max(kind.alloc_size()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<TypeDescriptor>> {
        self.parent.as_ref()
    }

    pub fn kind(&self) -> ObjKind {
        self.kind
    }

    /// Size in bytes of a blank instance, header included.
    pub fn alloc_size(&self) -> usize {
        self.alloc_size
    }

    /// Whether this type is `ancestor` or descends from it.
    pub fn is_a(&self, ancestor: &TypeDescriptor) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.name == ancestor.name {
                return true;
            }
            current = ty.parent.as_deref();
        }
        false
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

/// Types the registry knows from startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Obj,
    CharBuf,
    ViewCharBuf,
    ZombieCharBuf,
    ByteBuf,
    VArray,
    Hash,
    Num,
    FloatNum,
    Float32,
    Float64,
    IntNum,
    Integer32,
    Integer64,
    BoolNum,
}

impl Builtin {
    pub const ALL: [Builtin; 15] = [
        Self::Obj,
        Self::CharBuf,
        Self::ViewCharBuf,
        Self::ZombieCharBuf,
        Self::ByteBuf,
        Self::VArray,
        Self::Hash,
        Self::Num,
        Self::FloatNum,
        Self::Float32,
        Self::Float64,
        Self::IntNum,
        Self::Integer32,
        Self::Integer64,
        Self::BoolNum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Obj => "Obj",
            Self::CharBuf => "CharBuf",
            Self::ViewCharBuf => "ViewCharBuf",
            Self::ZombieCharBuf => "ZombieCharBuf",
            Self::ByteBuf => "ByteBuf",
            Self::VArray => "VArray",
            Self::Hash => "Hash",
            Self::Num => "Num",
            Self::FloatNum => "FloatNum",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::IntNum => "IntNum",
            Self::Integer32 => "Integer32",
            Self::Integer64 => "Integer64",
            Self::BoolNum => "BoolNum",
        }
    }

    /// Parent and storage kind. Parents always precede children in [`Self::ALL`].
    fn lineage(self) -> (Option<Builtin>, ObjKind) {
        match self {
            Self::Obj => (None, ObjKind::Fields),
            Self::CharBuf => (Some(Self::Obj), ObjKind::Text),
            Self::ViewCharBuf => (Some(Self::CharBuf), ObjKind::Text),
            Self::ZombieCharBuf => (Some(Self::ViewCharBuf), ObjKind::Text),
            Self::ByteBuf => (Some(Self::Obj), ObjKind::Bytes),
            Self::VArray => (Some(Self::Obj), ObjKind::Array),
            Self::Hash => (Some(Self::Obj), ObjKind::Hash),
            Self::Num => (Some(Self::Obj), ObjKind::Fields),
            Self::FloatNum => (Some(Self::Num), ObjKind::Float),
            Self::Float32 => (Some(Self::FloatNum), ObjKind::Float),
            Self::Float64 => (Some(Self::FloatNum), ObjKind::Float),
            Self::IntNum => (Some(Self::Num), ObjKind::Int),
            Self::Integer32 => (Some(Self::IntNum), ObjKind::Int),
            Self::Integer64 => (Some(Self::IntNum), ObjKind::Int),
            Self::BoolNum => (Some(Self::IntNum), ObjKind::Bool),
        }
    }
}

static GLOBAL: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::with_builtins);

/// Name-keyed registry of type descriptors.
///
/// The registry only grows: descriptors are never removed, so an
/// `Arc<TypeDescriptor>` handed out stays the canonical descriptor for its
/// name for the life of the process. Lookups and registration go through a
/// read/write lock.
#[derive(Debug)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
    builtins: Vec<Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// A fresh registry holding only the built-in types.
    pub fn with_builtins() -> Self {
        let mut types: HashMap<String, Arc<TypeDescriptor>> = HashMap::new();
        let mut builtins = Vec::with_capacity(Builtin::ALL.len());
        for builtin in Builtin::ALL {
            let (parent, kind) = builtin.lineage();
            let descriptor = match parent.and_then(|p| types.get(p.name())) {
                Some(parent) => TypeDescriptor::subclass(builtin.name(), parent, Some(kind)),
                None => TypeDescriptor::root(builtin.name(), kind),
            };
            let descriptor = Arc::new(descriptor);
            types.insert(builtin.name().to_string(), Arc::clone(&descriptor));
            builtins.push(descriptor);
        }
        Self {
            types: RwLock::new(types),
            builtins,
        }
    }

    /// The descriptor of a built-in type.
    pub fn builtin(&self, builtin: Builtin) -> Arc<TypeDescriptor> {
        let position = Builtin::ALL.iter().position(|b| *b == builtin);
        match position.and_then(|i| self.builtins.get(i)) {
            Some(descriptor) => Arc::clone(descriptor),
            // Every builtin is registered at construction.
            None => Arc::new(TypeDescriptor::root(builtin.name(), builtin.lineage().1)),
        }
    }

    pub fn find(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(name).cloned()
    }

    /// The descriptor for `name`, creating it as a subclass of `parent` if it
    /// does not exist yet. An existing descriptor is returned unchanged.
    pub fn singleton(&self, name: &str, parent: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        if let Some(existing) = self.find(name) {
            return existing;
        }
        let mut types = self.types.write();
        let descriptor = types.entry(name.to_string()).or_insert_with(|| {
            info!(class = name, parent = parent.name(), "registering type");
            Arc::new(TypeDescriptor::subclass(name, parent, None))
        });
        Arc::clone(descriptor)
    }

    /// Resolve `name`, lazily creating descriptors for it and any of its
    /// unregistered ancestors by asking `parent_of` for each class's parent.
    pub fn lookup_or_create(
        &self,
        name: &str,
        parent_of: impl Fn(&str) -> Option<String>,
    ) -> Result<Arc<TypeDescriptor>> {
        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        let mut current = name.to_string();

        let base = loop {
            if let Some(found) = self.find(&current) {
                break found;
            }
            if !seen.insert(current.clone()) {
                return Err(BindError::UnknownClass {
                    name: name.to_string(),
                });
            }
            let parent = parent_of(&current).ok_or_else(|| BindError::UnknownClass {
                name: name.to_string(),
            })?;
            pending.push(std::mem::replace(&mut current, parent));
        };

        Ok(pending
            .iter()
            .rev()
            .fold(base, |parent, class| self.singleton(class, &parent)))
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_hierarchy() {
        let registry = TypeRegistry::with_builtins();
        let zombie = registry.builtin(Builtin::ZombieCharBuf);
        let charbuf = registry.builtin(Builtin::CharBuf);
        let obj = registry.builtin(Builtin::Obj);
        assert!(zombie.is_a(&charbuf));
        assert!(zombie.is_a(&obj));
        assert!(!charbuf.is_a(&zombie));
        assert!(registry.builtin(Builtin::BoolNum).is_a(&registry.builtin(Builtin::IntNum)));
        assert_eq!(registry.len(), Builtin::ALL.len());
    }

    #[test]
    fn test_singleton_is_stable() {
        let registry = TypeRegistry::with_builtins();
        let hash = registry.builtin(Builtin::Hash);
        let first = registry.singleton("App::Index", &hash);
        let second = registry.singleton("App::Index", &registry.builtin(Builtin::Obj));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.kind(), ObjKind::Hash);
        assert!(first.is_a(&hash));
    }

    #[test]
    fn test_lookup_or_create_follows_parents() {
        let registry = TypeRegistry::with_builtins();
        let isa = |class: &str| match class {
            "App::Special" => Some("App::Doc".to_string()),
            "App::Doc" => Some("Hash".to_string()),
            _ => None,
        };
        let special = registry.lookup_or_create("App::Special", isa).unwrap();
        assert_eq!(special.parent().map(|p| p.name()), Some("App::Doc"));
        assert!(special.is_a(&registry.builtin(Builtin::Hash)));
        assert!(registry.find("App::Doc").is_some());
    }

    #[test]
    fn test_lookup_or_create_unknown_and_cyclic() {
        let registry = TypeRegistry::with_builtins();
        let err = registry.lookup_or_create("Nope", |_| None).unwrap_err();
        assert_eq!(err, BindError::UnknownClass { name: "Nope".to_string() });

        let cyclic = |class: &str| match class {
            "A" => Some("B".to_string()),
            _ => Some("A".to_string()),
        };
        assert!(registry.lookup_or_create("A", cyclic).is_err());
    }
}

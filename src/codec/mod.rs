//! Conversion between host values and managed instances.
//!
//! [`Marshal`] carries the context every conversion needs (the host runtime
//! and the type registry); its methods are split by concern:
//!
//! - [`scalar`]: text, bytes, numbers and booleans
//! - [`container`]: arrays and maps, recursively
//! - [`wrap`]: wrapping and unwrapping instances, blank allocation
//! - [`dispatch`]: the outward dispatcher (`Obj` → host value)

pub mod container;
pub mod dispatch;
pub mod scalar;
pub mod wrap;

pub use dispatch::Outward;
pub use scalar::{Scalar, ScalarKind};
pub use wrap::{ObjArg, Ownership, TextView};

use crate::host::{HostRuntime, IntWidth};
use crate::object::{Builtin, TypeDescriptor, TypeRegistry};
use std::sync::Arc;

/// Conversion context for one host runtime.
///
/// # Example
///
/// ```ignore
/// use hostbind::prelude::*;
///
/// let runtime = HostRuntime::new(IntWidth::W64);
/// let marshal = Marshal::new(&runtime);
///
/// let obj = marshal.host_to_managed(&HostValue::text("hello"));
/// let back = marshal.to_host(obj.as_ref())?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Marshal<'r> {
    pub(crate) runtime: &'r HostRuntime,
    pub(crate) registry: &'static TypeRegistry,
}

impl<'r> Marshal<'r> {
    pub fn new(runtime: &'r HostRuntime) -> Self {
        Self {
            runtime,
            registry: TypeRegistry::global(),
        }
    }

    pub fn runtime(&self) -> &'r HostRuntime {
        self.runtime
    }

    pub fn registry(&self) -> &'static TypeRegistry {
        self.registry
    }

    pub(crate) fn int_width(&self) -> IntWidth {
        self.runtime.int_width()
    }

    pub(crate) fn builtin(&self, builtin: Builtin) -> Arc<TypeDescriptor> {
        self.registry.builtin(builtin)
    }
}

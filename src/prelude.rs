//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use hostbind::prelude::*;
//!
//! let runtime = HostRuntime::new(IntWidth::W64);
//! let marshal = Marshal::new(&runtime);
//! let obj = marshal.host_to_managed(&HostValue::text("hello"));
//! ```

// Error handling
pub use crate::error::{last_error, set_error, take_error, BindError, ErrorReport, Result};

// Host side
pub use crate::host::{HostArray, HostHash, HostObject, HostRuntime, HostStr, HostValue, IntWidth};

// Object side
pub use crate::object::{Builtin, Obj, ObjBody, ObjHash, TypeDescriptor, TypeRegistry};

// Conversion and binding
pub use crate::codec::{Marshal, ObjArg, Outward, Ownership, Scalar, ScalarKind, TextView};
pub use crate::params::{SlotKind, SlotSpec, SlotTarget};
pub use crate::scope::CallScope;

pub use crate::config::Config;

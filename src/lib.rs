//! Marshalling between a scripting host and a reference-counted object
//! system.
//!
//! Host values (integers, numbers, strings, array and hash references,
//! wrapped objects) are converted into managed instances and back, host
//! wrappers are unwrapped into borrowed or call-scoped instances, and
//! hash-style named arguments are bound into typed slots.
//!
//! # Quick Start
//!
//! ```ignore
//! use hostbind::prelude::*;
//!
//! let runtime = HostRuntime::new(IntWidth::W64);
//! runtime.register_schema("Doc::new_PARAMS", ["name", "count"]);
//! let marshal = Marshal::new(&runtime);
//!
//! let scope = CallScope::new();
//! let args = [HostValue::text("count"), HostValue::Int(3)];
//! let mut count = 0u32;
//! marshal.bind_params(
//!     &scope,
//!     &args,
//!     0,
//!     "Doc::new_PARAMS",
//!     vec![SlotSpec::new("count", SlotTarget::U32(&mut count)).required()],
//! )?;
//! ```
//!
//! # Modules
//!
//! - [`host`] - The host's value model, coercions and interpreter state
//! - [`object`] - Counted instances, type descriptors and the type registry
//! - [`codec`] - Scalar and container conversion, wrapping, outward dispatch
//! - [`params`] - Named-argument binding
//! - [`scope`] - Deferred release for per-call instances
//! - [`config`] - TOML configuration of a host runtime
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)

mod logging;

pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod object;
pub mod params;
pub mod prelude;
pub mod scope;

pub use codec::{Marshal, ObjArg, Outward, Ownership, Scalar, ScalarKind, TextView};
pub use config::{Config, ConfigError};
pub use error::{BindError, ErrorReport, Result};
pub use host::{HostArray, HostHash, HostObject, HostRuntime, HostStr, HostValue, IntWidth};
pub use object::{Builtin, Obj, ObjBody, ObjHash, TypeDescriptor, TypeRegistry};
pub use params::{ParamSchema, SlotKind, SlotSpec, SlotTarget};
pub use scope::CallScope;

//! Interpreter-level host state the conversion layer depends on.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use super::{HostStr, HostValue};
use crate::config::Config;
use crate::logging::{debug, info};
use crate::params::{ParamSchema, SchemaRegistry};

/// Width of the host's native integer.
///
/// On a 32-bit host, integers outside the 32-bit range exist only as
/// floating-point numbers, so 64-bit extraction goes through an `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "u32")]
pub enum IntWidth {
    W32,
    #[default]
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }
}

impl TryFrom<u32> for IntWidth {
    type Error = String;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(Self::W32),
            64 => Ok(Self::W64),
            other => Err(format!("unsupported native integer width: {}", other)),
        }
    }
}

/// The host interpreter as seen by the binding layer.
///
/// Holds the native integer width, the host class hierarchy (used to create
/// type descriptors lazily for subclasses declared on the host side) and the
/// package-global parameter schemas consulted by the binder.
///
/// Registration takes `&self`; the maps only grow.
#[derive(Debug, Default)]
pub struct HostRuntime {
    int_width: IntWidth,
    isa: RwLock<HashMap<String, String>>,
    schemas: SchemaRegistry,
}

impl HostRuntime {
    pub fn new(int_width: IntWidth) -> Self {
        Self {
            int_width,
            ..Self::default()
        }
    }

    /// Build a runtime from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let runtime = Self::new(config.host.int_width);
        for class in &config.classes {
            runtime.declare_class(&class.name, &class.parent);
        }
        for schema in &config.schemas {
            runtime.register_schema(&schema.name, schema.params.iter().map(String::as_str));
        }
        info!(
            int_width = runtime.int_width.bits(),
            classes = config.classes.len(),
            schemas = config.schemas.len(),
            "host runtime configured"
        );
        runtime
    }

    pub fn int_width(&self) -> IntWidth {
        self.int_width
    }

    /// Declare that host class `name` inherits from `parent`.
    pub fn declare_class(&self, name: &str, parent: &str) {
        debug!(class = name, parent = parent, "declaring host class");
        self.isa.write().insert(name.to_string(), parent.to_string());
    }

    /// The declared parent of host class `name`.
    pub fn parent_class(&self, name: &str) -> Option<String> {
        self.isa.read().get(name).cloned()
    }

    /// Register (or replace) the parameter schema `name`.
    pub fn register_schema<'p>(&self, name: &str, params: impl IntoIterator<Item = &'p str>) {
        self.schemas.register(name, params);
    }

    pub fn schema(&self, name: &str) -> Option<Arc<ParamSchema>> {
        self.schemas.get(name)
    }

    /// A native integer, or a number when `i` does not fit the native width.
    pub fn new_int(&self, i: i64) -> HostValue {
        match self.int_width {
            IntWidth::W64 => HostValue::Int(i),
            IntWidth::W32 => match i32::try_from(i) {
                Ok(_) => HostValue::Int(i),
                Err(_) => HostValue::Num(i as f64),
            },
        }
    }

    pub fn new_num(&self, n: f64) -> HostValue {
        HostValue::Num(n)
    }

    pub fn new_text(&self, s: &str) -> HostValue {
        HostValue::Str(HostStr::text(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_int_narrow_host() {
        let rt = HostRuntime::new(IntWidth::W32);
        assert_eq!(rt.new_int(7), HostValue::Int(7));
        assert_eq!(rt.new_int(1 << 40), HostValue::Num((1u64 << 40) as f64));
        assert_eq!(rt.new_int(i64::from(i32::MIN)), HostValue::Int(i64::from(i32::MIN)));
    }

    #[test]
    fn test_new_values_wide_host() {
        let rt = HostRuntime::new(IntWidth::W64);
        assert_eq!(rt.new_int(1 << 40), HostValue::Int(1 << 40));
        assert_eq!(rt.new_num(0.5), HostValue::Num(0.5));
        let text = rt.new_text("héllo");
        assert!(text.as_str().is_some_and(|s| s.is_utf8()));
    }

    #[test]
    fn test_class_hierarchy() {
        let rt = HostRuntime::default();
        rt.declare_class("App::Doc", "Obj");
        assert_eq!(rt.parent_class("App::Doc").as_deref(), Some("Obj"));
        assert_eq!(rt.parent_class("App::Other"), None);
    }

    #[test]
    fn test_int_width_from_bits() {
        assert_eq!(IntWidth::try_from(32), Ok(IntWidth::W32));
        assert!(IntWidth::try_from(16).is_err());
    }
}

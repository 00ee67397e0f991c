//! The outward dispatcher: managed instance → host value.
//!
//! A type may satisfy more than one branch (a subclass of a text type that
//! also carries numbers, the boolean singletons that are integers), so the
//! branch is chosen from one ordered table, first match wins.

use crate::error::Result;
use crate::host::{HostValue, IntWidth};
use crate::logging::{trace, warn};
use crate::object::{Builtin, Obj, TypeRegistry};

use super::Marshal;

/// The branches of the outward dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outward {
    Text,
    Bytes,
    Array,
    Hash,
    Float,
    True,
    False,
    /// Native integer.
    Integer,
    /// 64-bit integer on a 32-bit host, through a float.
    WideInteger,
    /// Anything else: hand the host its wrapper.
    Wrapper,
}

impl Outward {
    /// Branches in the order they are tried. [`Outward::Wrapper`] is the
    /// fallback and is not listed.
    pub const PRECEDENCE: [Outward; 9] = [
        Self::Text,
        Self::Bytes,
        Self::Array,
        Self::Hash,
        Self::Float,
        Self::True,
        Self::False,
        Self::Integer,
        Self::WideInteger,
    ];

    fn matches(self, obj: &Obj, registry: &TypeRegistry, width: IntWidth) -> bool {
        let is_a = |builtin| obj.is_a(&registry.builtin(builtin));
        match self {
            Self::Text => is_a(Builtin::CharBuf),
            Self::Bytes => is_a(Builtin::ByteBuf),
            Self::Array => is_a(Builtin::VArray),
            Self::Hash => is_a(Builtin::Hash),
            Self::Float => is_a(Builtin::FloatNum),
            Self::True => obj.is_true_singleton(),
            Self::False => obj.is_false_singleton(),
            Self::Integer => match width {
                IntWidth::W64 => is_a(Builtin::IntNum),
                IntWidth::W32 => is_a(Builtin::Integer32),
            },
            Self::WideInteger => width == IntWidth::W32 && is_a(Builtin::Integer64),
            Self::Wrapper => true,
        }
    }

    /// The first branch `obj` satisfies.
    pub fn classify(obj: &Obj, registry: &TypeRegistry, width: IntWidth) -> Outward {
        Self::PRECEDENCE
            .into_iter()
            .find(|branch| branch.matches(obj, registry, width))
            .unwrap_or(Self::Wrapper)
    }
}

impl Marshal<'_> {
    /// Convert a managed instance for return to the host.
    ///
    /// Absent becomes `Undef`. The result owns whatever it references; the
    /// caller's `obj` is not consumed.
    pub fn to_host(&self, obj: Option<&Obj>) -> Result<HostValue> {
        let Some(obj) = obj else {
            return Ok(HostValue::Undef);
        };
        let width = self.int_width();
        let branch = Outward::classify(obj, self.registry, width);
        trace!(class = obj.class_name(), branch = ?branch, "converting to host");

        let value = match branch {
            Outward::Text => self.charbuf_to_host(Some(obj))?,
            Outward::Bytes => self.bytebuf_to_host(Some(obj))?,
            Outward::Array => self.array_to_host(obj)?,
            Outward::Hash => self.hash_to_host(obj)?,
            Outward::Float => self.runtime.new_num(obj.to_f64().unwrap_or_default()),
            Outward::True => HostValue::Int(1),
            Outward::False => HostValue::Int(0),
            // On a 32-bit host only `Integer32` reaches this branch.
            Outward::Integer => self.runtime.new_int(obj.to_i64().unwrap_or_default()),
            Outward::WideInteger => {
                warn!(class = obj.class_name(), "returning 64-bit integer as float");
                self.runtime.new_num(obj.to_i64().unwrap_or_default() as f64)
            }
            Outward::Wrapper => self.wrap_existing(obj),
        };
        Ok(value)
    }
}

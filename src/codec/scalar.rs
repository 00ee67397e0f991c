//! Scalar codec: text, octets, numbers and booleans.

use crate::error::{BindError, Result};
use crate::host::{HostValue, IntWidth};
use crate::logging::warn;
use crate::object::{Builtin, Obj, ObjBody};

use super::Marshal;

/// Target kinds for scalar extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    F32,
    F64,
}

/// An extracted scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    F32(f32),
    F64(f64),
}

impl Marshal<'_> {
    /// A host string flagged as canonical text.
    pub fn text_to_host(&self, text: &str) -> HostValue {
        self.runtime.new_text(text)
    }

    /// A host string of opaque octets, no text flag.
    pub fn bytes_to_host(&self, bytes: &[u8]) -> HostValue {
        HostValue::bytes(bytes)
    }

    /// A text instance as a host string; absent becomes `Undef`.
    pub fn charbuf_to_host(&self, obj: Option<&Obj>) -> Result<HostValue> {
        let Some(obj) = obj else {
            return Ok(HostValue::Undef);
        };
        match &*obj.body() {
            ObjBody::Text(text) => Ok(self.text_to_host(text)),
            _ => Err(BindError::not_a(Builtin::CharBuf.name())),
        }
    }

    /// A byte-buffer instance as a host string; absent becomes `Undef`.
    pub fn bytebuf_to_host(&self, obj: Option<&Obj>) -> Result<HostValue> {
        let Some(obj) = obj else {
            return Ok(HostValue::Undef);
        };
        match &*obj.body() {
            ObjBody::Bytes(bytes) => Ok(self.bytes_to_host(bytes)),
            _ => Err(BindError::not_a(Builtin::ByteBuf.name())),
        }
    }

    /// The host value's string form as a new text instance.
    ///
    /// Octet strings are re-encoded to canonical text; `value` is not
    /// modified.
    pub fn host_to_managed_text(&self, value: &HostValue) -> Obj {
        Obj::charbuf(&value.to_text())
    }

    /// Extract a scalar of `kind` using the host's coercion rules.
    ///
    /// Returns `None` for `Undef`. Narrow integer kinds truncate the native
    /// integer like a C cast. On a 32-bit host the 64-bit kinds are read
    /// through the floating-point value: integers beyond 2^53 lose
    /// precision.
    pub fn extract(&self, value: &HostValue, kind: ScalarKind) -> Option<Scalar> {
        if !value.is_defined() {
            return None;
        }
        let width = self.int_width();
        let scalar = match kind {
            ScalarKind::I8 => Scalar::I8(value.iv(width) as i8),
            ScalarKind::I16 => Scalar::I16(value.iv(width) as i16),
            ScalarKind::I32 => Scalar::I32(value.iv(width) as i32),
            ScalarKind::I64 => Scalar::I64(match width {
                IntWidth::W64 => value.iv(width),
                IntWidth::W32 => {
                    warn!(kind = "i64", "extracting through floating point on 32-bit host");
                    value.nv() as i64
                }
            }),
            ScalarKind::U8 => Scalar::U8(value.uv(width) as u8),
            ScalarKind::U16 => Scalar::U16(value.uv(width) as u16),
            ScalarKind::U32 => Scalar::U32(value.uv(width) as u32),
            ScalarKind::U64 => Scalar::U64(match width {
                IntWidth::W64 => value.uv(width),
                IntWidth::W32 => {
                    warn!(kind = "u64", "extracting through floating point on 32-bit host");
                    value.nv() as u64
                }
            }),
            ScalarKind::Bool => Scalar::Bool(value.truthy()),
            ScalarKind::F32 => Scalar::F32(value.nv() as f32),
            ScalarKind::F64 => Scalar::F64(value.nv()),
        };
        Some(scalar)
    }
}

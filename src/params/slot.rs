//! Slot specs: where and how one named parameter is extracted.

use std::sync::Arc;

use crate::codec::{ObjArg, Scalar, ScalarKind};
use crate::host::HostValue;
use crate::object::TypeDescriptor;

/// Extraction kinds, with the integer codes used by generated glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SlotKind {
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    U8 = 5,
    U16 = 6,
    U32 = 7,
    U64 = 8,
    Bool = 9,
    F32 = 10,
    F64 = 11,
    /// A managed instance (see [`crate::codec::ObjArg`]).
    Obj = 12,
    /// The raw host value, borrowed.
    Value = 13,
}

impl SlotKind {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// The scalar extraction this kind performs, if it is a scalar kind.
    pub fn scalar(self) -> Option<ScalarKind> {
        let scalar = match self {
            Self::I8 => ScalarKind::I8,
            Self::I16 => ScalarKind::I16,
            Self::I32 => ScalarKind::I32,
            Self::I64 => ScalarKind::I64,
            Self::U8 => ScalarKind::U8,
            Self::U16 => ScalarKind::U16,
            Self::U32 => ScalarKind::U32,
            Self::U64 => ScalarKind::U64,
            Self::Bool => ScalarKind::Bool,
            Self::F32 => ScalarKind::F32,
            Self::F64 => ScalarKind::F64,
            Self::Obj | Self::Value => return None,
        };
        Some(scalar)
    }
}

impl TryFrom<i32> for SlotKind {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            1 => Self::I8,
            2 => Self::I16,
            3 => Self::I32,
            4 => Self::I64,
            5 => Self::U8,
            6 => Self::U16,
            7 => Self::U32,
            8 => Self::U64,
            9 => Self::Bool,
            10 => Self::F32,
            11 => Self::F64,
            12 => Self::Obj,
            13 => Self::Value,
            other => return Err(other),
        })
    }
}

/// The caller-owned location a parameter is written to.
#[derive(Debug)]
pub enum SlotTarget<'t, 'a> {
    I8(&'t mut i8),
    I16(&'t mut i16),
    I32(&'t mut i32),
    I64(&'t mut i64),
    U8(&'t mut u8),
    U16(&'t mut u16),
    U32(&'t mut u32),
    U64(&'t mut u64),
    Bool(&'t mut bool),
    F32(&'t mut f32),
    F64(&'t mut f64),
    Obj(&'t mut Option<ObjArg<'a>>),
    Value(&'t mut Option<&'a HostValue>),
}

impl<'t, 'a> SlotTarget<'t, 'a> {
    pub fn kind(&self) -> SlotKind {
        match self {
            Self::I8(_) => SlotKind::I8,
            Self::I16(_) => SlotKind::I16,
            Self::I32(_) => SlotKind::I32,
            Self::I64(_) => SlotKind::I64,
            Self::U8(_) => SlotKind::U8,
            Self::U16(_) => SlotKind::U16,
            Self::U32(_) => SlotKind::U32,
            Self::U64(_) => SlotKind::U64,
            Self::Bool(_) => SlotKind::Bool,
            Self::F32(_) => SlotKind::F32,
            Self::F64(_) => SlotKind::F64,
            Self::Obj(_) => SlotKind::Obj,
            Self::Value(_) => SlotKind::Value,
        }
    }

    /// Write an extracted value. Kinds were matched during extraction, so a
    /// mismatched pair is left unwritten.
    pub(crate) fn assign(self, value: Extracted<'a>) {
        match (self, value) {
            (Self::I8(t), Extracted::Scalar(Scalar::I8(v))) => *t = v,
            (Self::I16(t), Extracted::Scalar(Scalar::I16(v))) => *t = v,
            (Self::I32(t), Extracted::Scalar(Scalar::I32(v))) => *t = v,
            (Self::I64(t), Extracted::Scalar(Scalar::I64(v))) => *t = v,
            (Self::U8(t), Extracted::Scalar(Scalar::U8(v))) => *t = v,
            (Self::U16(t), Extracted::Scalar(Scalar::U16(v))) => *t = v,
            (Self::U32(t), Extracted::Scalar(Scalar::U32(v))) => *t = v,
            (Self::U64(t), Extracted::Scalar(Scalar::U64(v))) => *t = v,
            (Self::Bool(t), Extracted::Scalar(Scalar::Bool(v))) => *t = v,
            (Self::F32(t), Extracted::Scalar(Scalar::F32(v))) => *t = v,
            (Self::F64(t), Extracted::Scalar(Scalar::F64(v))) => *t = v,
            (Self::Obj(t), Extracted::Obj(v)) => *t = Some(v),
            (Self::Value(t), Extracted::Value(v)) => *t = Some(v),
            _ => {}
        }
    }
}

/// A value extracted for a slot, waiting to be written.
#[derive(Debug)]
pub(crate) enum Extracted<'a> {
    Scalar(Scalar),
    Obj(ObjArg<'a>),
    Value(&'a HostValue),
}

/// One declared parameter: target, label, requiredness, kind, optional type
/// and optional backing storage for text views.
///
/// # Example
///
/// ```ignore
/// let mut count = 0u32;
/// let mut doc = None;
/// let slots = vec![
///     SlotSpec::new("count", SlotTarget::U32(&mut count)).required(),
///     SlotSpec::new("doc", SlotTarget::Obj(&mut doc)).with_type(hash_type),
/// ];
/// ```
#[derive(Debug)]
pub struct SlotSpec<'t, 'a> {
    pub(crate) target: SlotTarget<'t, 'a>,
    pub(crate) label: &'t str,
    pub(crate) required: bool,
    pub(crate) kind_code: i32,
    pub(crate) descriptor: Option<Arc<TypeDescriptor>>,
    pub(crate) storage: Option<&'a mut String>,
}

impl<'t, 'a> SlotSpec<'t, 'a> {
    /// An optional parameter whose kind follows its target.
    pub fn new(label: &'t str, target: SlotTarget<'t, 'a>) -> Self {
        Self {
            kind_code: target.kind().code(),
            target,
            label,
            required: false,
            descriptor: None,
            storage: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the kind code, as glue generated from a declaration does.
    pub fn with_kind_code(mut self, code: i32) -> Self {
        self.kind_code = code;
        self
    }

    /// The type an `Obj` slot must hold. Defaults to `Obj`.
    pub fn with_type(mut self, descriptor: Arc<TypeDescriptor>) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// Backing storage for a text view built from a plain host string.
    pub fn with_storage(mut self, storage: &'a mut String) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn label(&self) -> &'t str {
        self.label
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_roundtrip() {
        for code in 1..=13 {
            let kind = SlotKind::try_from(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(SlotKind::try_from(0), Err(0));
        assert_eq!(SlotKind::try_from(42), Err(42));
    }

    #[test]
    fn test_spec_kind_follows_target() {
        let mut flag = false;
        let spec = SlotSpec::new("flag", SlotTarget::Bool(&mut flag)).required();
        assert_eq!(spec.kind_code, SlotKind::Bool.code());
        assert!(spec.is_required());
        assert_eq!(spec.label(), "flag");
    }
}

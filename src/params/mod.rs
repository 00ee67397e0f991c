//! Parameter binder: hash-style named arguments into typed slots.
//!
//! A host call passes `key => value` pairs after some fixed positional
//! arguments. The binder checks every key against a registered
//! [`ParamSchema`], then fills each [`SlotSpec`] from the last pair whose key
//! equals its label. Binding is all-or-nothing: targets are only written
//! once every slot has been extracted.

pub mod schema;
pub mod slot;

pub use schema::{ParamSchema, SchemaRegistry};
pub use slot::{SlotKind, SlotSpec, SlotTarget};

use crate::codec::Marshal;
use crate::error::{self, BindError, Result};
use crate::host::HostValue;
use crate::logging::{debug, error};
use crate::object::Builtin;
use crate::scope::CallScope;

use slot::Extracted;

impl Marshal<'_> {
    /// Bind the pairs in `args[start..]` to `slots`.
    ///
    /// Checks run in this order, and the first failure is returned:
    ///
    /// 1. the pair region has an even number of elements
    /// 2. `schema_name` is registered
    /// 3. every key is allowed by the schema
    /// 4. per slot, in order: its kind code is recognized and matches its
    ///    target, its value extracts, and a required slot has a defined value
    ///
    /// Undefined values leave their slot untouched. On error no target is
    /// written; transient instances already parked in `scope` are released
    /// with it.
    pub fn bind_params<'a>(
        &self,
        scope: &'a CallScope,
        args: &'a [HostValue],
        start: usize,
        schema_name: &str,
        slots: Vec<SlotSpec<'_, 'a>>,
    ) -> Result<()> {
        let pairs = args.get(start..).unwrap_or_default();
        debug!(
            schema = schema_name,
            args = pairs.len(),
            slots = slots.len(),
            "binding params"
        );

        if pairs.len() % 2 != 0 {
            return Err(BindError::OddArgumentCount { count: pairs.len() });
        }

        let schema = self
            .runtime
            .schema(schema_name)
            .ok_or_else(|| BindError::UnknownSchema {
                name: schema_name.to_string(),
            })?;

        for key in pairs.iter().step_by(2) {
            let name = key.to_text();
            if !schema.allows(&name) {
                return Err(BindError::InvalidParameterName {
                    name: name.into_owned(),
                });
            }
        }

        let mut staged = Vec::with_capacity(slots.len());
        for mut slot in slots {
            let value = self.extract_slot(&mut slot, pairs, scope)?;
            staged.push((slot.target, value));
        }

        for (target, value) in staged {
            if let Some(value) = value {
                target.assign(value);
            }
        }
        Ok(())
    }

    /// As [`Self::bind_params`], reporting failure through the last-error
    /// slot (see [`crate::error::last_error`]) and returning `false`.
    ///
    /// The stored report has two frames: the binder, then the caller.
    #[track_caller]
    pub fn allot_params<'a>(
        &self,
        scope: &'a CallScope,
        args: &'a [HostValue],
        start: usize,
        schema_name: &str,
        slots: Vec<SlotSpec<'_, 'a>>,
    ) -> bool {
        match self.bind_params(scope, args, start, schema_name, slots) {
            Ok(()) => true,
            Err(err) => {
                if err.is_user_error() {
                    debug!(schema = schema_name, error = %err, "rejected params");
                } else {
                    error!(schema = schema_name, error = %err, "param binding misconfigured");
                }
                report(err);
                error::add_frame();
                false
            }
        }
    }

    fn extract_slot<'a>(
        &self,
        slot: &mut SlotSpec<'_, 'a>,
        pairs: &'a [HostValue],
        scope: &'a CallScope,
    ) -> Result<Option<Extracted<'a>>> {
        let kind = SlotKind::try_from(slot.kind_code)
            .ok()
            .filter(|kind| *kind == slot.target.kind())
            .ok_or_else(|| BindError::UnrecognizedSlotKind {
                code: slot.kind_code,
                label: slot.label.to_string(),
            })?;

        // Scan from the end so a repeated label resolves to its last value.
        let found = pairs.chunks_exact(2).rev().find_map(|pair| match pair {
            [key, value] if key.to_text() == slot.label => Some(value),
            _ => None,
        });

        let extracted = match found {
            Some(value) if value.is_defined() => Some(self.extract_value(kind, slot, value, scope)?),
            _ => None,
        };

        if slot.required && extracted.is_none() {
            return Err(BindError::MissingRequiredParameter {
                label: slot.label.to_string(),
            });
        }
        Ok(extracted)
    }

    fn extract_value<'a>(
        &self,
        kind: SlotKind,
        slot: &mut SlotSpec<'_, 'a>,
        value: &'a HostValue,
        scope: &'a CallScope,
    ) -> Result<Extracted<'a>> {
        if let Some(scalar) = kind.scalar() {
            return self
                .extract(value, scalar)
                .map(Extracted::Scalar)
                .ok_or_else(|| BindError::MissingRequiredParameter {
                    label: slot.label.to_string(),
                });
        }
        match kind {
            SlotKind::Obj => {
                let expected = slot
                    .descriptor
                    .clone()
                    .unwrap_or_else(|| self.builtin(Builtin::Obj));
                self.maybe_to_obj(value, &expected, slot.storage.take(), scope)
                    .map(Extracted::Obj)
                    .ok_or_else(|| BindError::invalid_value(slot.label, expected.name()))
            }
            _ => Ok(Extracted::Value(value)),
        }
    }
}

// Records the binder itself as the first frame.
fn report(err: BindError) {
    error::set_error(err);
}

//! Error types and the host-facing last-error channel.
//!
//! Every conversion and binding routine returns [`Result`]. Glue code that
//! must follow the host's "boolean failure + last error" convention stores
//! the error with [`set_error`] and the host reads it back with
//! [`last_error`] / [`take_error`].

use std::cell::RefCell;
use std::panic::Location;

use thiserror::Error;

/// Errors raised while crossing the host / object-system boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A required slot had no matching key, or its value was undefined.
    #[error("Missing required parameter: '{label}'")]
    MissingRequiredParameter { label: String },

    /// A supplied key is not part of the declared schema.
    #[error("Invalid parameter: '{name}'")]
    InvalidParameterName { name: String },

    /// The argument list did not form key/value pairs.
    #[error("Expecting hash-style params, got odd number of args")]
    OddArgumentCount { count: usize },

    /// A value could not be coerced or unwrapped into the expected type.
    #[error("{message}")]
    TypeMismatch { expected: String, message: String },

    /// A slot requested an extraction kind the codec does not implement.
    #[error("Unrecognized type: {code} for param '{label}'")]
    UnrecognizedSlotKind { code: i32, label: String },

    /// The named parameter schema is not registered.
    #[error("Can't find hash named {name}")]
    UnknownSchema { name: String },

    /// A class name could not be resolved to a type descriptor.
    #[error("Class '{name}' doesn't descend from any registered class")]
    UnknownClass { name: String },
}

/// A [`Result`] type alias using [`BindError`].
pub type Result<T> = std::result::Result<T, BindError>;

impl BindError {
    /// `Not a <class>`, raised when an unwrap fails.
    pub fn not_a(class: &str) -> Self {
        Self::TypeMismatch {
            expected: class.to_string(),
            message: format!("Not a {}", class),
        }
    }

    /// `Invalid value for '<label>' - not a <class>`, raised by the binder.
    pub fn invalid_value(label: &str, class: &str) -> Self {
        Self::TypeMismatch {
            expected: class.to_string(),
            message: format!("Invalid value for '{}' - not a {}", label, class),
        }
    }

    /// Raised when a map key is not text and cannot become a host hash key.
    pub fn bad_hash_key(class: &str) -> Self {
        Self::TypeMismatch {
            expected: "CharBuf".to_string(),
            message: format!("Can't convert a key of class {} to a host hash key", class),
        }
    }

    /// Returns `true` for errors caused by the caller's arguments rather than
    /// by a misconfigured binding.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredParameter { .. }
                | Self::InvalidParameterName { .. }
                | Self::OddArgumentCount { .. }
                | Self::TypeMismatch { .. }
        )
    }
}

/// An error stored in the last-error slot together with the frames that
/// propagated it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub error: BindError,
    pub frames: Vec<&'static Location<'static>>,
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        for frame in &self.frames {
            write!(f, "\n\tat {}:{}", frame.file(), frame.line())?;
        }
        Ok(())
    }
}

// One slot per host interpreter thread.
thread_local! {
    static LAST_ERROR: RefCell<Option<ErrorReport>> = const { RefCell::new(None) };
}

/// Replace the last error, recording the caller as the first frame.
#[track_caller]
pub fn set_error(error: BindError) {
    let report = ErrorReport {
        error,
        frames: vec![Location::caller()],
    };
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(report));
}

/// Append the caller to the frames of the current error, if any.
#[track_caller]
pub fn add_frame() {
    let frame = Location::caller();
    LAST_ERROR.with(|slot| {
        if let Some(report) = slot.borrow_mut().as_mut() {
            report.frames.push(frame);
        }
    });
}

/// A copy of the last error, leaving the slot untouched.
pub fn last_error() -> Option<ErrorReport> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Take the last error, clearing the slot.
pub fn take_error() -> Option<ErrorReport> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BindError::InvalidParameterName {
            name: "colour".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid parameter: 'colour'");
        assert_eq!(
            BindError::invalid_value("doc", "Hash").to_string(),
            "Invalid value for 'doc' - not a Hash"
        );
        assert_eq!(
            BindError::UnrecognizedSlotKind {
                code: 99,
                label: "x".to_string()
            }
            .to_string(),
            "Unrecognized type: 99 for param 'x'"
        );
    }

    #[test]
    fn test_error_channel() {
        take_error();
        assert!(last_error().is_none());

        set_error(BindError::not_a("VArray"));
        add_frame();
        let report = last_error().unwrap();
        assert_eq!(report.error.to_string(), "Not a VArray");
        assert_eq!(report.frames.len(), 2);
        assert!(report.to_string().contains("error.rs"));

        assert!(take_error().is_some());
        assert!(last_error().is_none());
    }

    #[test]
    fn test_add_frame_without_error_is_noop() {
        take_error();
        add_frame();
        assert!(last_error().is_none());
    }
}

use crate::native::{ControllerId, ViewId};

/// Failure reported by a [`crate::NativeHost`] operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteropError {
    MissingView { id: ViewId },
    MissingController { id: ControllerId },
    ControllerHasNoView { id: ControllerId },
    AlreadyAttached { id: ControllerId },
}

impl std::fmt::Display for InteropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteropError::MissingView { id } => write!(f, "native view {id} missing"),
            InteropError::MissingController { id } => {
                write!(f, "native controller {id} missing")
            }
            InteropError::ControllerHasNoView { id } => {
                write!(f, "native controller {id} has no view")
            }
            InteropError::AlreadyAttached { id } => {
                write!(f, "native controller {id} already has a parent")
            }
        }
    }
}

impl std::error::Error for InteropError {}

#![forbid(unsafe_code)]

//! navdrop public facade crate.
//!
//! Re-exports the types a host needs to wire a navigation dropdown into its
//! own event loop and animation engine, plus a prelude for day-to-day use.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use navdrop_core::Duration;
pub use navdrop_core::animation::{
    AnimatedProperty, AnimationCommand, AnimationEngine, AnimationTarget, Easing, RecordingEngine,
    Transition,
};
pub use navdrop_core::event::{InputMode, InteractionSignal};
pub use navdrop_core::geometry::{Rect, ViewportSize};

// --- Runtime re-exports ----------------------------------------------------

pub use navdrop_runtime::{
    ConfigError, DimensionConfig, DropdownConfig, InteractionConfig, ManualScheduler, Observable,
    Scheduler, Subscription, TaskHandle, TransitionConfig, Viewport,
};

// --- Widget re-exports -----------------------------------------------------

pub use navdrop_widgets::dropdown::{
    ArbiterAction, ContentRenderer, DimensionObserver, DropdownError, DropdownOption,
    DropdownProvider, DropdownRoot, ElementBinding, Measurable, OptionId, OptionPatch,
    OptionRecord, OptionRegistry, PanelFrame, PanelPhase, PanelTargets, RegistryError, Selection,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for navdrop hosts.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
    /// Registry misuse.
    Registry(RegistryError),
    /// Dropdown assembly misuse.
    Dropdown(DropdownError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Registry(err) => write!(f, "registry: {err}"),
            Self::Dropdown(err) => write!(f, "dropdown: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::Dropdown(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

impl From<DropdownError> for Error {
    fn from(err: DropdownError) -> Self {
        Self::Dropdown(err)
    }
}

/// Standard result type for navdrop APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnimatedProperty, AnimationEngine, AnimationTarget, DropdownConfig, DropdownOption,
        DropdownProvider, DropdownRoot, Error, InteractionSignal, ManualScheduler, Measurable,
        Rect, Result, Scheduler, Transition, Viewport,
    };

    pub use crate::{core, runtime, widgets};
}

pub use navdrop_core as core;
pub use navdrop_runtime as runtime;
pub use navdrop_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_convert_and_chain() {
        let err: Error = DropdownError::RootAlreadyMounted.into();
        assert_eq!(err.to_string(), "dropdown: dropdown root is already mounted");
        assert!(std::error::Error::source(&err).is_some());

        let err: Error = RegistryError::DuplicateId(OptionId::from_raw(3)).into();
        assert_eq!(err.to_string(), "registry: option#3 is already registered");

        let err: Error = ConfigError::Validation(vec!["transition.duration_ms must be > 0".into()]).into();
        assert!(matches!(err, Error::Config(_)));
    }
}

#![forbid(unsafe_code)]

//! Headless components for navdrop.
//!
//! Nothing here draws. Components track geometry and selection, decide what
//! every animated property should reach, and hand those decisions to an
//! [`AnimationEngine`](navdrop_core::animation::AnimationEngine) owned by the
//! host.

pub mod dropdown;

pub use dropdown::{
    ArbiterAction, ContentRenderer, DimensionObserver, DropdownError, DropdownOption,
    DropdownProvider, DropdownRoot, ElementBinding, InteractionArbiter, Measurable, OptionId,
    OptionPatch, OptionRecord, OptionRegistry, PanelFrame, PanelPhase, PanelTargets,
    RegistryError, RegistrySubscription, Selection, TransitionController,
};

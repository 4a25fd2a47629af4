#![forbid(unsafe_code)]

//! Navigation dropdown.
//!
//! A row of triggers shares one floating panel. The panel slides between
//! triggers, resizes to the hovered option's content, and fades in and out
//! with a slight tilt. An indicator arrow tracks the active trigger.
//!
//! # Parts
//!
//! - [`DropdownProvider`] owns the [`OptionRegistry`] for one dropdown.
//! - [`DropdownOption`] is one trigger: it measures itself through a
//!   [`DimensionObserver`] and routes input through an
//!   [`InteractionArbiter`].
//! - [`DropdownRoot`] mounts option content and owns the
//!   [`TransitionController`] that talks to the animation engine.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use navdrop_core::animation::RecordingEngine;
//! use navdrop_core::event::InteractionSignal;
//! use navdrop_core::geometry::Rect;
//! use navdrop_runtime::{DropdownConfig, ManualScheduler, Viewport};
//! use navdrop_widgets::dropdown::{DropdownProvider, Measurable};
//!
//! struct Fixed(Rect);
//! impl Measurable for Fixed {
//!     fn measure(&self) -> Rect {
//!         self.0
//!     }
//! }
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let provider = DropdownProvider::new(scheduler.clone(), Viewport::default(), DropdownConfig::default());
//! let products = provider.option(
//!     "Products",
//!     || Rc::new(Fixed(Rect::from_size(80.0, 40.0))) as Rc<dyn Measurable>,
//!     0.0,
//! );
//! products.attach(Rc::new(Fixed(Rect::new(40.0, 0.0, 20.0, 24.0))));
//! let root = provider.root(Rc::new(RecordingEngine::new())).unwrap();
//!
//! scheduler.run_frame();
//! products.handle(InteractionSignal::HoverStart);
//! assert_eq!(root.frame().targets.x, 10.0);
//! ```

pub mod arbiter;
pub mod dimensions;
pub mod option;
pub mod provider;
pub mod registry;
pub mod root;
pub mod transition;

pub use arbiter::{ArbiterAction, InteractionArbiter};
pub use dimensions::{DimensionObserver, ElementBinding, Measurable};
pub use option::DropdownOption;
pub use provider::{DropdownError, DropdownProvider};
pub use registry::{
    ContentRenderer, OptionId, OptionPatch, OptionRecord, OptionRegistry, RegistryError,
    RegistrySubscription, Selection,
};
pub use root::DropdownRoot;
pub use transition::{PanelFrame, PanelPhase, PanelTargets, TransitionController, transition_for};

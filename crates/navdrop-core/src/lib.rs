#![forbid(unsafe_code)]

//! Core: geometry, input signals, and the animation vocabulary.
//!
//! # Role in navdrop
//! `navdrop-core` holds the value types every other crate speaks: measured
//! rectangles, the raw interaction signals an option receives, and the
//! property/transition types handed to an external animation engine.
//!
//! # How it fits in the system
//! The runtime (`navdrop-runtime`) adds reactivity and scheduling on top of
//! these types; the dropdown components (`navdrop-widgets`) consume both.
//! Nothing here allocates shared state or talks to a host environment.

pub mod animation;
pub mod event;
pub mod geometry;

pub use web_time::Duration;

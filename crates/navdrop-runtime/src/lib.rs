#![forbid(unsafe_code)]

//! navdrop runtime
//!
//! The single-threaded plumbing dropdown components are built on.
//!
//! # Key Components
//!
//! - [`Observable`] / [`Subscription`] - shared values with change notification
//! - [`Scheduler`] - next-frame callbacks and one-shot timers, cancelled by
//!   dropping their [`TaskHandle`]
//! - [`ManualScheduler`] - deterministic scheduler with a virtual clock
//! - [`Viewport`] - viewport size and resize events
//! - [`DropdownConfig`] - timing and interaction parameters
//!
//! # Role in navdrop
//! Everything here runs on one thread and never blocks: suspension is always
//! "call me back later", and every pending callback is owned by an RAII
//! handle so tearing a component down releases it.

pub mod config;
pub mod reactive;
pub mod scheduler;
pub mod viewport;

pub use config::{
    ConfigError, DimensionConfig, DropdownConfig, InteractionConfig, TransitionConfig,
};
pub use reactive::{Observable, Subscription};
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle, TaskSlot, TaskState, task_pair};
pub use viewport::Viewport;

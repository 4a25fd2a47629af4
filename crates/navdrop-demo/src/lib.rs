#![forbid(unsafe_code)]

//! Headless replay of scripted dropdown interactions.
//!
//! Builds a three-item nav bar on a [`ManualScheduler`](navdrop::ManualScheduler),
//! replays a built-in script, and prints every animation command the
//! dropdown issued.

pub mod cli;
pub mod error;
pub mod logging;
pub mod script;

pub use cli::{Cli, run, run_from_env};
pub use error::{DemoError, Result};

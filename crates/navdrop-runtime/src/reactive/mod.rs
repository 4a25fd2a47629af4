//! Reactive primitives: shared values that notify subscribers on change.

pub mod observable;

pub use observable::{Observable, Subscription};

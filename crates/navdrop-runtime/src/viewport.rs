#![forbid(unsafe_code)]

//! Host viewport: current size and the resize event source.
//!
//! Every call to [`Viewport::resize`] is one resize event, even when the
//! reported size did not change; hosts forward their native resize events
//! one-to-one. Listeners are RAII [`Subscription`]s.

use navdrop_core::geometry::ViewportSize;

use crate::reactive::{Observable, Subscription};

/// Shared handle to the host viewport.
///
/// Cloning yields another handle to the same viewport.
#[derive(Clone, Debug)]
pub struct Viewport {
    size: Observable<ViewportSize>,
    /// Resize event counter; bumps once per event.
    resizes: Observable<u64>,
}

impl Viewport {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size: Observable::new(size),
            resizes: Observable::new(0),
        }
    }

    /// Current size.
    pub fn size(&self) -> ViewportSize {
        self.size.get()
    }

    /// Current height; drives the touch-mode heuristic.
    pub fn height(&self) -> f64 {
        self.size.with(|s| s.height)
    }

    /// Record a resize event.
    pub fn resize(&self, size: ViewportSize) {
        self.size.set(size);
        self.resizes.update(|n| *n = n.wrapping_add(1));
    }

    /// Listen for resize events. The listener is removed when the returned
    /// guard is dropped.
    pub fn on_resize(&self, listener: impl Fn(ViewportSize) + 'static) -> Subscription {
        let size = self.size.clone();
        self.resizes.subscribe(move |_| listener(size.get()))
    }

    /// Resize listeners currently attached.
    pub fn resize_listener_count(&self) -> usize {
        self.resizes.live_subscriber_count()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportSize::new(1280.0, 800.0))
    }
}

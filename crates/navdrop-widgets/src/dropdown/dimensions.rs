#![forbid(unsafe_code)]

//! Post-layout measurement of an attached element.
//!
//! A [`DimensionObserver`] owns the geometry of at most one element. When an
//! element is attached it is measured on the next frame, never
//! synchronously, so the host's layout has settled. In responsive mode each
//! viewport resize event schedules exactly one more measurement.
//!
//! # Invariants
//!
//! - Before the first measurement [`DimensionObserver::dimensions`] is `None`.
//! - One measurement per scheduled frame; one scheduled frame per attach and
//!   per resize event (responsive mode only).
//! - Detaching, re-attaching, or dropping the observer cancels every pending
//!   measurement and removes the resize listener.
//!
//! # Failure Modes
//!
//! - Detaching keeps the last measured geometry; it is not reset to `None`.
//! - Measurement callbacks hold only a weak reference, so a frame that fires
//!   after the observer is gone does nothing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use navdrop_core::geometry::Rect;
use navdrop_runtime::reactive::{Observable, Subscription};
use navdrop_runtime::scheduler::{Scheduler, TaskHandle};
use navdrop_runtime::viewport::Viewport;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Anything whose viewport-relative rectangle can be queried after layout.
pub trait Measurable {
    fn measure(&self) -> Rect;
}

/// Tracks the geometry of one attached element.
pub struct DimensionObserver {
    inner: Rc<ObserverInner>,
}

struct ObserverInner {
    responsive: bool,
    scheduler: Rc<dyn Scheduler>,
    viewport: Viewport,
    dimensions: Observable<Option<Rect>>,
    attachment: RefCell<Option<Attachment>>,
    measurements: Cell<u64>,
}

struct Attachment {
    element: Rc<dyn Measurable>,
    _resize: Option<Subscription>,
    pending: Vec<TaskHandle>,
}

impl DimensionObserver {
    pub fn new(scheduler: Rc<dyn Scheduler>, viewport: Viewport, responsive: bool) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                responsive,
                scheduler,
                viewport,
                dimensions: Observable::new(None),
                attachment: RefCell::new(None),
                measurements: Cell::new(0),
            }),
        }
    }

    /// Attach `element`, replacing any previous one, and measure it on the
    /// next frame.
    pub fn attach(&self, element: Rc<dyn Measurable>) {
        ObserverInner::attach(&self.inner, element);
    }

    /// Stop observing. Pending measurements are cancelled.
    pub fn detach(&self) {
        self.inner.attachment.borrow_mut().take();
    }

    /// Binding handed to whatever mounts the element.
    pub fn binding(&self) -> ElementBinding {
        ElementBinding {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Latest measured rectangle.
    pub fn dimensions(&self) -> Option<Rect> {
        self.inner.dimensions.get()
    }

    /// Called with every new rectangle. Re-measuring to the same rectangle
    /// does not notify.
    pub fn subscribe(&self, listener: impl Fn(Option<Rect>) + 'static) -> Subscription {
        self.inner.dimensions.subscribe(move |rect| listener(*rect))
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attachment.borrow().is_some()
    }

    pub fn is_responsive(&self) -> bool {
        self.inner.responsive
    }

    /// Measurements taken so far, including ones that found no change.
    pub fn measurement_count(&self) -> u64 {
        self.inner.measurements.get()
    }

    /// Measurements scheduled but not yet taken.
    pub fn pending_measurements(&self) -> usize {
        self.inner
            .attachment
            .borrow()
            .as_ref()
            .map_or(0, |a| a.pending.iter().filter(|h| h.is_pending()).count())
    }
}

impl fmt::Debug for DimensionObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimensionObserver")
            .field("responsive", &self.inner.responsive)
            .field("attached", &self.is_attached())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

impl ObserverInner {
    fn attach(this: &Rc<Self>, element: Rc<dyn Measurable>) {
        let resize = this.responsive.then(|| {
            let weak = Rc::downgrade(this);
            this.viewport.on_resize(move |_| {
                if let Some(inner) = weak.upgrade() {
                    Self::schedule_measure(&inner);
                }
            })
        });
        // Replacing drops the previous attachment's listener and frames.
        *this.attachment.borrow_mut() = Some(Attachment {
            element,
            _resize: resize,
            pending: Vec::new(),
        });
        Self::schedule_measure(this);
    }

    fn schedule_measure(this: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(this);
        let handle = this.scheduler.request_frame(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.measure_now();
            }
        }));
        if let Some(attachment) = this.attachment.borrow_mut().as_mut() {
            attachment.pending.retain(TaskHandle::is_pending);
            attachment.pending.push(handle);
        }
    }

    fn measure_now(&self) {
        let element = match self.attachment.borrow().as_ref() {
            Some(attachment) => Rc::clone(&attachment.element),
            None => return,
        };
        let rect = element.measure();
        self.measurements.set(self.measurements.get() + 1);
        #[cfg(feature = "tracing")]
        trace!(
            x = rect.x,
            y = rect.y,
            w = rect.width,
            h = rect.height,
            "element measured"
        );
        self.dimensions.set(Some(rect));
    }
}

/// Weak handle used to attach and detach the observed element.
///
/// Binding after the observer is gone does nothing.
#[derive(Clone)]
pub struct ElementBinding {
    inner: Weak<ObserverInner>,
}

impl ElementBinding {
    /// `Some` attaches (replacing any current element), `None` detaches.
    pub fn bind(&self, element: Option<Rc<dyn Measurable>>) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        match element {
            Some(element) => ObserverInner::attach(&inner, element),
            None => {
                inner.attachment.borrow_mut().take();
            }
        }
    }

    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for ElementBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBinding")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navdrop_core::geometry::ViewportSize;
    use navdrop_runtime::scheduler::ManualScheduler;

    /// Element whose rectangle the test moves around.
    struct Probe {
        rect: Cell<Rect>,
        queries: Cell<u32>,
    }

    impl Probe {
        fn new(rect: Rect) -> Rc<Self> {
            Rc::new(Self {
                rect: Cell::new(rect),
                queries: Cell::new(0),
            })
        }
    }

    impl Measurable for Probe {
        fn measure(&self) -> Rect {
            self.queries.set(self.queries.get() + 1);
            self.rect.get()
        }
    }

    fn setup(responsive: bool) -> (Rc<ManualScheduler>, Viewport, DimensionObserver) {
        let scheduler = Rc::new(ManualScheduler::new());
        let viewport = Viewport::default();
        let observer = DimensionObserver::new(scheduler.clone(), viewport.clone(), responsive);
        (scheduler, viewport, observer)
    }

    #[test]
    fn unset_until_first_frame() {
        let (scheduler, _viewport, observer) = setup(true);
        assert_eq!(observer.dimensions(), None);

        let probe = Probe::new(Rect::new(10.0, 0.0, 40.0, 20.0));
        observer.attach(probe.clone());
        assert_eq!(observer.dimensions(), None);
        assert_eq!(probe.queries.get(), 0);

        scheduler.run_frame();
        assert_eq!(observer.dimensions(), Some(Rect::new(10.0, 0.0, 40.0, 20.0)));
        assert_eq!(probe.queries.get(), 1);
    }

    #[test]
    fn one_measurement_per_resize() {
        let (scheduler, viewport, observer) = setup(true);
        let probe = Probe::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        observer.attach(probe.clone());
        scheduler.run_frame();

        for _ in 0..3 {
            viewport.resize(ViewportSize::new(900.0, 700.0));
        }
        assert_eq!(observer.pending_measurements(), 3);
        scheduler.run_frame();
        assert_eq!(observer.measurement_count(), 4);
        assert_eq!(probe.queries.get(), 4);
    }

    #[test]
    fn non_responsive_ignores_resize() {
        let (scheduler, viewport, observer) = setup(false);
        observer.attach(Probe::new(Rect::default()));
        scheduler.run_frame();
        viewport.resize(ViewportSize::new(900.0, 700.0));
        assert_eq!(viewport.resize_listener_count(), 0);
        assert_eq!(scheduler.pending_frames(), 0);
        assert_eq!(observer.measurement_count(), 1);
    }

    #[test]
    fn resize_picks_up_new_geometry() {
        let (scheduler, viewport, observer) = setup(true);
        let probe = Probe::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        observer.attach(probe.clone());
        scheduler.run_frame();

        probe.rect.set(Rect::new(50.0, 0.0, 10.0, 10.0));
        viewport.resize(ViewportSize::new(640.0, 480.0));
        scheduler.run_frame();
        assert_eq!(observer.dimensions().map(|r| r.x), Some(50.0));
    }

    #[test]
    fn detach_cancels_pending_and_unsubscribes() {
        let (scheduler, viewport, observer) = setup(true);
        let probe = Probe::new(Rect::default());
        observer.binding().bind(Some(probe.clone()));
        assert_eq!(viewport.resize_listener_count(), 1);

        observer.binding().bind(None);
        assert!(!observer.is_attached());
        assert_eq!(viewport.resize_listener_count(), 0);
        scheduler.run_frame();
        assert_eq!(probe.queries.get(), 0);
    }

    #[test]
    fn dropping_observer_releases_everything() {
        let (scheduler, viewport, observer) = setup(true);
        let probe = Probe::new(Rect::default());
        let binding = observer.binding();
        observer.attach(probe.clone());
        drop(observer);

        assert!(!binding.is_live());
        assert_eq!(viewport.resize_listener_count(), 0);
        scheduler.run_frame();
        assert_eq!(probe.queries.get(), 0);
        binding.bind(Some(probe));
    }

    #[test]
    fn reattach_replaces_element() {
        let (scheduler, viewport, observer) = setup(true);
        let first = Probe::new(Rect::new(1.0, 0.0, 1.0, 1.0));
        let second = Probe::new(Rect::new(2.0, 0.0, 1.0, 1.0));
        observer.attach(first.clone());
        observer.attach(second.clone());
        assert_eq!(viewport.resize_listener_count(), 1);

        scheduler.run_frame();
        assert_eq!(first.queries.get(), 0);
        assert_eq!(observer.dimensions().map(|r| r.x), Some(2.0));
    }
}

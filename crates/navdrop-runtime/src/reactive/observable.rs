#![forbid(unsafe_code)]

//! Shared values that tell their listeners when they change.
//!
//! Dropdown state travels through these: the registry revision and
//! selection, each trigger's measured rectangle, the viewport resize epoch,
//! and the published panel frame. A write that leaves the value equal to the
//! old one is silent, which is what keeps no-op registry patches and
//! repeated measurements of an unchanged layout from cascading.
//!
//! # Invariants
//!
//! 1. The revision counter moves by one per value-changing write and never
//!    otherwise.
//! 2. Listeners run in the order they subscribed.
//! 3. Listeners run with no borrow held. A listener may read this value,
//!    write it, or subscribe new listeners; nested writes notify
//!    immediately (depth-first) and end the outer round, so the last value
//!    every listener hears is the current one.
//! 4. A listener whose [`Subscription`] was dropped is never called again,
//!    even if the drop happens during the current notification.
//!
//! # Failure Modes
//!
//! - **Forgotten guards**: a `Subscription` kept alive in a long-lived owner
//!   keeps its listener firing. Entries for dropped guards are swept on the
//!   next change.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace_span;

type Listener<T> = dyn Fn(&T);

struct Shared<T> {
    current: T,
    revision: u64,
    listeners: Vec<Weak<Listener<T>>>,
}

/// Reference-counted handle to a value with change notification.
///
/// Clones share the value, the revision, and the listener list.
pub struct Observable<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                current: initial,
                revision: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Borrow the current value for the duration of `read`.
    ///
    /// `read` must not write to this observable.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.shared.borrow().current)
    }

    /// Replace the value. Listeners hear about it only if it differs.
    pub fn set(&self, next: T) {
        let changed = {
            let mut shared = self.shared.borrow_mut();
            let changed = shared.current != next;
            if changed {
                shared.current = next;
                shared.revision += 1;
            }
            changed
        };
        if changed {
            self.broadcast();
        }
    }

    /// Edit the value in place and report whether the edit changed it.
    pub fn update(&self, edit: impl FnOnce(&mut T)) -> bool {
        let mut draft = self.get();
        edit(&mut draft);
        let changed = self.with(|current| *current != draft);
        if changed {
            self.set(draft);
        }
        changed
    }

    /// Register `listener` for future changes. It is not called with the
    /// current value.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let listener: Rc<Listener<T>> = Rc::new(listener);
        self.shared
            .borrow_mut()
            .listeners
            .push(Rc::downgrade(&listener));
        Subscription {
            _listener: Box::new(listener),
        }
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.borrow().revision
    }

    /// Listeners whose guard is still held.
    #[must_use]
    pub fn live_subscriber_count(&self) -> usize {
        self.shared
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    fn broadcast(&self) {
        let (listeners, value, revision) = {
            let mut shared = self.shared.borrow_mut();
            shared.listeners.retain(|l| l.strong_count() > 0);
            if shared.listeners.is_empty() {
                return;
            }
            (
                shared.listeners.clone(),
                shared.current.clone(),
                shared.revision,
            )
        };

        let _span = trace_span!(
            "navdrop.propagate",
            version = revision,
            subscribers = listeners.len() as u64
        )
        .entered();

        // Upgrade lazily so a guard dropped by an earlier listener in this
        // round silences the later one.
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener(&value);
            // A nested write already broadcast a newer value to everyone;
            // continuing would hand the remaining listeners a stale one.
            if self.shared.borrow().revision != revision {
                break;
            }
        }
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Observable")
            .field("current", &shared.current)
            .field("revision", &shared.revision)
            .field("listeners", &shared.listeners.len())
            .finish()
    }
}

/// Keeps a listener registered. Drop it to unsubscribe.
#[must_use = "the listener is removed as soon as the Subscription is dropped"]
pub struct Subscription {
    _listener: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

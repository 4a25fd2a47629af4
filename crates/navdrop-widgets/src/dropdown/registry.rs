#![forbid(unsafe_code)]

//! Shared store of dropdown options and the current selection.
//!
//! Every option trigger registers one [`OptionRecord`] here once its anchor
//! has been measured. The registry also owns the selection: the option the
//! panel should currently show (`target`) and the last option that was ever
//! shown (`cached`), which keeps the panel's geometry stable while it fades
//! out.
//!
//! # Invariants
//!
//! - Ids are unique within a registry; a second `register` for an id fails.
//! - `anchor_center_x` always equals `anchor.x + anchor.width / 2`.
//! - Whenever `target` is set to an id, `cached` becomes that id too.
//!   Clearing `target` never touches `cached`.
//! - Every successful mutation notifies subscribers exactly once; writes
//!   that change nothing notify nobody.
//!
//! # Failure Modes
//!
//! - Updating or deleting an unknown id is a silent no-op (returns `false`).
//! - `cached` may name an id that has since been deleted. Readers must treat
//!   a missing record as "no geometry", see [`OptionRegistry::cached_option`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use navdrop_core::geometry::Rect;
use navdrop_runtime::reactive::{Observable, Subscription};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use super::dimensions::Measurable;

// ============================================================================
// Identity
// ============================================================================

static NEXT_OPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a dropdown option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(u64);

impl OptionId {
    /// Allocate a fresh id. Never returns the same value twice.
    pub fn next() -> Self {
        Self(NEXT_OPTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw value. Callers mixing raw and allocated ids are
    /// responsible for keeping them apart.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option#{}", self.0)
    }
}

// ============================================================================
// Content
// ============================================================================

/// Produces the panel content for one option.
///
/// The root calls `render` at most once per option and keeps the returned
/// element mounted until the option is deleted. The element is measured
/// right after rendering.
pub trait ContentRenderer {
    fn render(&self) -> Rc<dyn Measurable>;
}

impl<F> ContentRenderer for F
where
    F: Fn() -> Rc<dyn Measurable>,
{
    fn render(&self) -> Rc<dyn Measurable> {
        self()
    }
}

// ============================================================================
// Records
// ============================================================================

/// Everything the registry knows about one option.
#[derive(Clone)]
pub struct OptionRecord {
    pub id: OptionId,
    /// Trigger geometry, relative to the viewport.
    pub anchor: Rect,
    /// Horizontal center of `anchor`.
    pub anchor_center_x: f64,
    /// Rendered content size; `None` until the root has measured it.
    pub content: Option<Rect>,
    pub renderer: Rc<dyn ContentRenderer>,
    /// Height of the decorative background strip behind the content.
    pub background_height: f64,
}

impl OptionRecord {
    pub fn new(
        id: OptionId,
        anchor: Rect,
        renderer: Rc<dyn ContentRenderer>,
        background_height: f64,
    ) -> Self {
        Self {
            id,
            anchor,
            anchor_center_x: anchor.center_x(),
            content: None,
            renderer,
            background_height,
        }
    }

    /// Apply `patch`, returning whether anything changed.
    fn apply(&mut self, patch: OptionPatch) -> bool {
        let mut changed = false;
        if let Some(anchor) = patch.anchor
            && anchor != self.anchor
        {
            self.anchor = anchor;
            self.anchor_center_x = anchor.center_x();
            changed = true;
        }
        if let Some(content) = patch.content
            && self.content != Some(content)
        {
            self.content = Some(content);
            changed = true;
        }
        if let Some(height) = patch.background_height
            && height != self.background_height
        {
            self.background_height = height;
            changed = true;
        }
        changed
    }
}

impl fmt::Debug for OptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRecord")
            .field("id", &self.id)
            .field("anchor", &self.anchor)
            .field("anchor_center_x", &self.anchor_center_x)
            .field("content", &self.content)
            .field("background_height", &self.background_height)
            .finish_non_exhaustive()
    }
}

/// Partial update for an [`OptionRecord`]. Unset fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionPatch {
    pub anchor: Option<Rect>,
    pub content: Option<Rect>,
    pub background_height: Option<f64>,
}

impl OptionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the anchor; the center is recomputed.
    #[must_use]
    pub fn anchor(mut self, anchor: Rect) -> Self {
        self.anchor = Some(anchor);
        self
    }

    #[must_use]
    pub fn content(mut self, content: Rect) -> Self {
        self.content = Some(content);
        self
    }

    #[must_use]
    pub fn background_height(mut self, height: f64) -> Self {
        self.background_height = Some(height);
        self
    }
}

/// The option the panel points at, and the last one it pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub target: Option<OptionId>,
    pub cached: Option<OptionId>,
}

impl Selection {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from mutating an [`OptionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A record with this id is already registered.
    DuplicateId(OptionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "{id} is already registered"),
        }
    }
}

impl std::error::Error for RegistryError {}

// ============================================================================
// Registry
// ============================================================================

/// Shared option store. Cloning yields another handle to the same store.
#[derive(Clone, Default)]
pub struct OptionRegistry {
    inner: Rc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    options: RefCell<Vec<OptionRecord>>,
    /// Bumped once per change to `options`.
    revision: Observable<u64>,
    selection: Observable<Selection>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Fails if its id is already present.
    pub fn register(&self, record: OptionRecord) -> Result<(), RegistryError> {
        let id = record.id;
        {
            let mut options = self.inner.options.borrow_mut();
            if options.iter().any(|o| o.id == id) {
                #[cfg(feature = "tracing")]
                warn!(option = %id, "duplicate option registration rejected");
                return Err(RegistryError::DuplicateId(id));
            }
            options.push(record);
        }
        #[cfg(feature = "tracing")]
        debug!(option = %id, "option registered");
        self.bump();
        Ok(())
    }

    /// Patch the record for `id`. Returns `false` if there is no such record
    /// or the patch changed nothing.
    pub fn update_props(&self, id: OptionId, patch: OptionPatch) -> bool {
        let changed = {
            let mut options = self.inner.options.borrow_mut();
            match options.iter_mut().find(|o| o.id == id) {
                Some(record) => record.apply(patch),
                None => false,
            }
        };
        if changed {
            self.bump();
        }
        changed
    }

    /// Snapshot of the record for `id`.
    pub fn get_by_id(&self, id: OptionId) -> Option<OptionRecord> {
        self.inner
            .options
            .borrow()
            .iter()
            .find(|o| o.id == id)
            .cloned()
    }

    pub fn contains(&self, id: OptionId) -> bool {
        self.inner.options.borrow().iter().any(|o| o.id == id)
    }

    /// Remove the record for `id`. The selection is left untouched.
    pub fn delete_by_id(&self, id: OptionId) -> bool {
        let removed = {
            let mut options = self.inner.options.borrow_mut();
            let before = options.len();
            options.retain(|o| o.id != id);
            options.len() != before
        };
        if removed {
            #[cfg(feature = "tracing")]
            debug!(option = %id, "option deleted");
            self.bump();
        }
        removed
    }

    /// Point the panel at `target`, or close it with `None`.
    pub fn set_target_id(&self, target: Option<OptionId>) {
        let changed = self.inner.selection.update(|s| {
            s.target = target;
            if target.is_some() {
                s.cached = target;
            }
        });
        if changed {
            #[cfg(feature = "tracing")]
            debug!(selected = ?target.map(OptionId::get), "dropdown target changed");
        }
    }

    pub fn target_id(&self) -> Option<OptionId> {
        self.inner.selection.with(|s| s.target)
    }

    pub fn cached_id(&self) -> Option<OptionId> {
        self.inner.selection.with(|s| s.cached)
    }

    pub fn selection(&self) -> Selection {
        self.inner.selection.get()
    }

    /// Record of the cached option, if it is still registered.
    pub fn cached_option(&self) -> Option<OptionRecord> {
        self.cached_id().and_then(|id| self.get_by_id(id))
    }

    /// Snapshot of every record in registration order.
    pub fn options(&self) -> Vec<OptionRecord> {
        self.inner.options.borrow().clone()
    }

    pub fn ids(&self) -> Vec<OptionId> {
        self.inner.options.borrow().iter().map(|o| o.id).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.options.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.options.borrow().is_empty()
    }

    /// Number of record mutations so far.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Call `listener` after every change to the records or the selection.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> RegistrySubscription {
        let listener: Rc<dyn Fn()> = Rc::new(listener);
        let on_options = Rc::clone(&listener);
        RegistrySubscription {
            _options: self.inner.revision.subscribe(move |_| on_options()),
            _selection: self.inner.selection.subscribe(move |_| listener()),
        }
    }

    /// Live registry subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.revision.live_subscriber_count()
    }

    fn bump(&self) {
        self.inner.revision.update(|r| *r = r.wrapping_add(1));
    }
}

impl fmt::Debug for OptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRegistry")
            .field("options", &self.inner.options.borrow().len())
            .field("selection", &self.selection())
            .finish()
    }
}

/// RAII guard for [`OptionRegistry::subscribe`].
#[must_use = "dropping a RegistrySubscription unsubscribes immediately"]
pub struct RegistrySubscription {
    _options: Subscription,
    _selection: Subscription,
}

impl fmt::Debug for RegistrySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrySubscription").finish_non_exhaustive()
    }
}

#![forbid(unsafe_code)]

//! The panel host.
//!
//! A root mounts the content of every option that has ever been shown and
//! keeps it mounted, so switching back to an option never re-renders it.
//! Each content element is measured right after it is rendered and the size
//! is written back into the registry, which is what the panel animates to.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use navdrop_core::animation::AnimationEngine;
use navdrop_runtime::config::TransitionConfig;
use navdrop_runtime::reactive::Subscription;
use navdrop_runtime::scheduler::Scheduler;

#[cfg(feature = "tracing")]
use tracing::debug;

use super::dimensions::Measurable;
use super::registry::{OptionId, OptionPatch, OptionRegistry, RegistrySubscription};
use super::transition::{PanelFrame, TransitionController};

/// Mounted panel. At most one per provider is alive at a time.
pub struct DropdownRoot {
    inner: Rc<RootInner>,
    controller: TransitionController,
    _content: RegistrySubscription,
}

struct RootInner {
    registry: OptionRegistry,
    mounted: RefCell<Vec<MountedContent>>,
    /// Provider-owned "a root is alive" flag, reset on drop.
    slot: Rc<Cell<bool>>,
}

struct MountedContent {
    id: OptionId,
    /// Held so the rendered content stays alive while its option exists.
    _element: Rc<dyn Measurable>,
}

impl DropdownRoot {
    pub(crate) fn new(
        registry: OptionRegistry,
        scheduler: Rc<dyn Scheduler>,
        engine: Rc<dyn AnimationEngine>,
        config: TransitionConfig,
        slot: Rc<Cell<bool>>,
    ) -> Self {
        slot.set(true);
        let inner = Rc::new(RootInner {
            registry: registry.clone(),
            mounted: RefCell::new(Vec::new()),
            slot,
        });
        let weak: Weak<RootInner> = Rc::downgrade(&inner);
        let content = registry.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                inner.reconcile();
            }
        });
        let controller = TransitionController::new(registry, scheduler, engine, config);
        inner.reconcile();
        Self {
            inner,
            controller,
            _content: content,
        }
    }

    /// Report whether the pointer is over the panel container.
    pub fn set_panel_hovered(&self, hovered: bool) {
        self.controller.set_panel_hovered(hovered);
    }

    pub fn frame(&self) -> PanelFrame {
        self.controller.frame()
    }

    /// Called whenever the published frame changes.
    pub fn subscribe(&self, listener: impl Fn(&PanelFrame) + 'static) -> Subscription {
        self.controller.subscribe(listener)
    }

    /// Options whose content is mounted, in mount order.
    pub fn mounted_content_ids(&self) -> Vec<OptionId> {
        self.inner.mounted.borrow().iter().map(|m| m.id).collect()
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }
}

impl Drop for DropdownRoot {
    fn drop(&mut self) {
        self.inner.slot.set(false);
    }
}

impl fmt::Debug for DropdownRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownRoot")
            .field("mounted", &self.mounted_content_ids())
            .field("frame", &self.frame())
            .finish_non_exhaustive()
    }
}

impl RootInner {
    fn reconcile(&self) {
        {
            let mut mounted = self.mounted.borrow_mut();
            #[cfg(feature = "tracing")]
            let before = mounted.len();
            mounted.retain(|m| self.registry.contains(m.id));
            #[cfg(feature = "tracing")]
            {
                let released = before - mounted.len();
                if released > 0 {
                    debug!(released, "released content of deleted options");
                }
            }
        }

        let Some(record) = self.registry.cached_option() else {
            return;
        };
        if self.mounted.borrow().iter().any(|m| m.id == record.id) {
            return;
        }

        let element = record.renderer.render();
        let size = element.measure();
        self.mounted.borrow_mut().push(MountedContent {
            id: record.id,
            _element: element,
        });
        #[cfg(feature = "tracing")]
        debug!(
            option = %record.id,
            w = size.width,
            h = size.height,
            "content mounted"
        );
        // Re-enters reconcile through the registry subscription; the option
        // is already marked mounted by then.
        self.registry
            .update_props(record.id, OptionPatch::new().content(size));
    }
}

#![forbid(unsafe_code)]

//! One navigation trigger.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use navdrop_core::event::{InputMode, InteractionSignal};
use navdrop_core::geometry::Rect;
use navdrop_runtime::reactive::Subscription;

#[cfg(feature = "tracing")]
use tracing::debug;

use super::arbiter::{ArbiterAction, InteractionArbiter};
use super::dimensions::{DimensionObserver, ElementBinding, Measurable};
use super::registry::{ContentRenderer, OptionId, OptionPatch, OptionRecord, OptionRegistry};

/// A trigger in the navigation bar and the panel content it reveals.
///
/// Created by [`DropdownProvider::option`](super::DropdownProvider::option).
/// The option registers itself once its trigger has been measured and keeps
/// the anchor geometry current on later measurements. Dropping it removes
/// the record and, if it was targeted, closes the panel.
pub struct DropdownOption {
    id: OptionId,
    name: String,
    registry: OptionRegistry,
    observer: DimensionObserver,
    arbiter: InteractionArbiter,
    _anchor: Subscription,
}

impl DropdownOption {
    pub(crate) fn new(
        name: String,
        registry: OptionRegistry,
        observer: DimensionObserver,
        arbiter: InteractionArbiter,
        renderer: Rc<dyn ContentRenderer>,
        background_height: f64,
    ) -> Self {
        let id = arbiter.option();
        let registered = Cell::new(false);
        let store = registry.clone();
        let anchor = observer.subscribe(move |rect| {
            let Some(rect) = rect else {
                return;
            };
            if registered.get() {
                store.update_props(id, OptionPatch::new().anchor(rect));
            } else {
                let record =
                    OptionRecord::new(id, rect, Rc::clone(&renderer), background_height);
                // Ids are allocated per option, so this only fails if the
                // host registered the same raw id by hand.
                if store.register(record).is_ok() {
                    registered.set(true);
                }
            }
        });
        Self {
            id,
            name,
            registry,
            observer,
            arbiter,
            _anchor: anchor,
        }
    }

    pub fn id(&self) -> OptionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binding for the trigger element.
    pub fn binding(&self) -> ElementBinding {
        self.observer.binding()
    }

    /// Shorthand for `binding().bind(Some(element))`.
    pub fn attach(&self, element: Rc<dyn Measurable>) {
        self.observer.attach(element);
    }

    /// Feed a raw trigger signal through the arbiter.
    pub fn handle(&self, signal: InteractionSignal) -> ArbiterAction {
        self.arbiter.handle(signal)
    }

    pub fn input_mode(&self) -> InputMode {
        self.arbiter.input_mode()
    }

    /// Last measured trigger geometry.
    pub fn anchor(&self) -> Option<Rect> {
        self.observer.dimensions()
    }

    pub fn is_registered(&self) -> bool {
        self.registry.contains(self.id)
    }

    pub fn is_targeted(&self) -> bool {
        self.registry.target_id() == Some(self.id)
    }

    /// The trigger's dimension observer.
    pub fn observer(&self) -> &DimensionObserver {
        &self.observer
    }
}

impl Drop for DropdownOption {
    fn drop(&mut self) {
        if self.registry.target_id() == Some(self.id) {
            self.registry.set_target_id(None);
        }
        self.registry.delete_by_id(self.id);
        #[cfg(feature = "tracing")]
        debug!(option = %self.id, name = %self.name, "option unmounted");
    }
}

impl fmt::Debug for DropdownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownOption")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("anchor", &self.anchor())
            .finish_non_exhaustive()
    }
}

#![forbid(unsafe_code)]

//! Dropdown context: one registry shared by every option and the root.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use navdrop_core::animation::AnimationEngine;
use navdrop_runtime::config::DropdownConfig;
use navdrop_runtime::scheduler::Scheduler;
use navdrop_runtime::viewport::Viewport;

use super::arbiter::InteractionArbiter;
use super::dimensions::DimensionObserver;
use super::option::DropdownOption;
use super::registry::{ContentRenderer, OptionId, OptionRegistry};
use super::root::DropdownRoot;

/// Errors from assembling a dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownError {
    /// A root for this provider is already alive.
    RootAlreadyMounted,
}

impl fmt::Display for DropdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootAlreadyMounted => f.write_str("dropdown root is already mounted"),
        }
    }
}

impl std::error::Error for DropdownError {}

/// Owns the registry and hands out options and the root.
///
/// # Example
///
/// ```ignore
/// let provider = DropdownProvider::new(scheduler, viewport, DropdownConfig::default());
/// let products = provider.option("Products", products_panel, 0.0);
/// products.attach(trigger_element);
/// let root = provider.root(engine)?;
/// ```
pub struct DropdownProvider {
    registry: OptionRegistry,
    scheduler: Rc<dyn Scheduler>,
    viewport: Viewport,
    config: DropdownConfig,
    root_mounted: Rc<Cell<bool>>,
}

impl DropdownProvider {
    pub fn new(scheduler: Rc<dyn Scheduler>, viewport: Viewport, config: DropdownConfig) -> Self {
        Self {
            registry: OptionRegistry::new(),
            scheduler,
            viewport,
            config,
            root_mounted: Rc::new(Cell::new(false)),
        }
    }

    /// Create an option trigger. It registers once its anchor is measured.
    pub fn option(
        &self,
        name: impl Into<String>,
        content: impl ContentRenderer + 'static,
        background_height: f64,
    ) -> DropdownOption {
        let id = OptionId::next();
        let observer = DimensionObserver::new(
            Rc::clone(&self.scheduler),
            self.viewport.clone(),
            self.config.dimensions.responsive,
        );
        let arbiter = InteractionArbiter::new(
            id,
            self.registry.clone(),
            self.viewport.clone(),
            &self.config.interaction,
        );
        DropdownOption::new(
            name.into(),
            self.registry.clone(),
            observer,
            arbiter,
            Rc::new(content),
            background_height,
        )
    }

    /// Mount the panel. Fails while another root from this provider lives.
    pub fn root(&self, engine: Rc<dyn AnimationEngine>) -> Result<DropdownRoot, DropdownError> {
        if self.root_mounted.get() {
            return Err(DropdownError::RootAlreadyMounted);
        }
        Ok(DropdownRoot::new(
            self.registry.clone(),
            Rc::clone(&self.scheduler),
            engine,
            self.config.transition.clone(),
            Rc::clone(&self.root_mounted),
        ))
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &DropdownConfig {
        &self.config
    }

    pub fn is_root_mounted(&self) -> bool {
        self.root_mounted.get()
    }
}

impl fmt::Debug for DropdownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownProvider")
            .field("registry", &self.registry)
            .field("viewport", &self.viewport)
            .field("root_mounted", &self.root_mounted.get())
            .finish_non_exhaustive()
    }
}

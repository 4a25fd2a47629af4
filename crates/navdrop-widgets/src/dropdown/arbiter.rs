#![forbid(unsafe_code)]

//! Turns raw trigger signals into selection changes.
//!
//! Short viewports are treated as touch-only: browsers there synthesize
//! hover events around taps, which would open and immediately close the
//! panel. In touch mode hover signals are ignored and a press toggles.
//!
//! | Signal         | Hover mode       | Touch mode      |
//! |----------------|------------------|-----------------|
//! | `PrimaryPress` | toggle           | toggle          |
//! | `HoverStart`   | select           | ignored         |
//! | `HoverEnd`     | deselect         | ignored         |
//! | `Focus`        | select           | select          |
//! | `Blur`         | deselect         | deselect        |
//! | `TouchStart`   | ignored          | ignored         |
//!
//! The mode is sampled from the viewport on every signal, so rotating a
//! device switches behavior without re-creating anything.

use navdrop_core::event::{InputMode, InteractionSignal};
use navdrop_runtime::config::InteractionConfig;
use navdrop_runtime::viewport::Viewport;

#[cfg(feature = "tracing")]
use tracing::trace;

use super::registry::{OptionId, OptionRegistry};

/// What a signal did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterAction {
    /// The option became the target.
    Select(OptionId),
    /// The target was cleared.
    Deselect,
    /// Nothing changed.
    Ignored,
}

/// Per-option signal arbiter.
#[derive(Debug, Clone)]
pub struct InteractionArbiter {
    option: OptionId,
    registry: OptionRegistry,
    viewport: Viewport,
    touch_max_height: f64,
}

impl InteractionArbiter {
    pub fn new(
        option: OptionId,
        registry: OptionRegistry,
        viewport: Viewport,
        config: &InteractionConfig,
    ) -> Self {
        Self {
            option,
            registry,
            viewport,
            touch_max_height: config.touch_mode_max_viewport_height,
        }
    }

    pub fn option(&self) -> OptionId {
        self.option
    }

    /// Input mode for the viewport as it is right now.
    pub fn input_mode(&self) -> InputMode {
        InputMode::from_viewport_height(self.viewport.height(), self.touch_max_height)
    }

    /// Decide what `signal` should do without applying it.
    pub fn decide(&self, signal: InteractionSignal) -> ArbiterAction {
        let touch = self.input_mode().is_touch();
        match signal {
            InteractionSignal::PrimaryPress => {
                if self.registry.target_id() == Some(self.option) {
                    ArbiterAction::Deselect
                } else {
                    ArbiterAction::Select(self.option)
                }
            }
            InteractionSignal::HoverStart if !touch => ArbiterAction::Select(self.option),
            InteractionSignal::HoverEnd if !touch => ArbiterAction::Deselect,
            InteractionSignal::HoverStart | InteractionSignal::HoverEnd => ArbiterAction::Ignored,
            InteractionSignal::Focus => ArbiterAction::Select(self.option),
            InteractionSignal::Blur => ArbiterAction::Deselect,
            InteractionSignal::TouchStart => ArbiterAction::Ignored,
        }
    }

    /// Decide and apply `signal`.
    pub fn handle(&self, signal: InteractionSignal) -> ArbiterAction {
        let action = self.decide(signal);
        #[cfg(feature = "tracing")]
        trace!(
            option = %self.option,
            signal = signal.name(),
            mode = ?self.input_mode(),
            action = ?action,
            "interaction signal"
        );
        match action {
            ArbiterAction::Select(id) => self.registry.set_target_id(Some(id)),
            ArbiterAction::Deselect => self.registry.set_target_id(None),
            ArbiterAction::Ignored => {}
        }
        action
    }
}

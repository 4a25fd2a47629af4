#![forbid(unsafe_code)]

//! Panel, background, and indicator transition policy.
//!
//! The controller watches the registry and the panel hover flag, derives
//! the target value of every [`AnimatedProperty`], and forwards changed
//! targets to the host's [`AnimationEngine`].
//!
//! State machine:
//!
//! ```text
//!            target set / panel hovered
//!   Idle ───────────────────────────────▶ Active (+ FirstInteraction while armed)
//!    ▲                                      │
//!    └──────────────────────────────────────┘
//!         target none and panel not hovered
//! ```
//!
//! `FirstInteraction` makes position and size snap instead of sliding in
//! from wherever the panel was last closed. It is cleared
//! `first_interaction_window` after opening and re-armed
//! `duration * exit_reset_factor` after closing.
//!
//! # Invariants
//!
//! - At most one clear timer and one re-arm timer exist; each phase change
//!   cancels the timer belonging to the opposite phase.
//! - Only properties whose target changed are dispatched. The first sync
//!   dispatches every property.
//! - Missing geometry derives zeros, never an error.
//!
//! # Failure Modes
//!
//! - If the cached option was deleted the panel collapses to zero geometry
//!   and the indicator hides.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use navdrop_core::animation::{AnimatedProperty, AnimationEngine, AnimationTarget, Transition};
use navdrop_runtime::config::TransitionConfig;
use navdrop_runtime::reactive::{Observable, Subscription};
use navdrop_runtime::scheduler::{Scheduler, TaskHandle};
use web_time::Duration;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use super::registry::{OptionRecord, OptionRegistry, RegistrySubscription};

// ============================================================================
// Derived values
// ============================================================================

/// Whether the panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPhase {
    /// Nothing targeted and the panel is not hovered.
    #[default]
    Idle,
    /// An option is targeted or the panel is hovered.
    Active,
}

impl PanelPhase {
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Target value of every animated property.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelTargets {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub rotate_x: f64,
    pub interactive: bool,
    pub background_height: f64,
    pub indicator_x: f64,
    pub indicator_opacity: f64,
}

impl PanelTargets {
    /// Derive targets from the cached record and the current phase.
    pub fn derive(cached: Option<&OptionRecord>, phase: PanelPhase, config: &TransitionConfig) -> Self {
        let panel = cached
            .and_then(|r| r.content.map(|c| c.centered_on_x(r.anchor_center_x)))
            .unwrap_or_default();
        let (x, width, height) = (panel.x, panel.width, panel.height);
        let indicator_x = cached.map_or(0.0, |r| r.anchor_center_x);
        let active = phase.is_active();
        Self {
            x,
            width,
            height,
            opacity: if active { 1.0 } else { 0.0 },
            rotate_x: if active { 0.0 } else { config.idle_tilt_deg },
            interactive: active,
            background_height: cached.map_or(0.0, |r| r.background_height),
            indicator_x,
            indicator_opacity: if indicator_x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    pub fn target(&self, property: AnimatedProperty) -> AnimationTarget {
        match property {
            AnimatedProperty::PanelOpacity => AnimationTarget::Number(self.opacity),
            AnimatedProperty::PanelRotateX => AnimationTarget::Number(self.rotate_x),
            AnimatedProperty::PanelPointerEvents => AnimationTarget::Flag(self.interactive),
            AnimatedProperty::PanelX => AnimationTarget::Number(self.x),
            AnimatedProperty::PanelWidth => AnimationTarget::Number(self.width),
            AnimatedProperty::PanelHeight => AnimationTarget::Number(self.height),
            AnimatedProperty::BackgroundHeight => AnimationTarget::Number(self.background_height),
            AnimatedProperty::IndicatorX => AnimationTarget::Number(self.indicator_x),
            AnimatedProperty::IndicatorOpacity => AnimationTarget::Number(self.indicator_opacity),
        }
    }
}

/// Transition used when `property` changes.
pub fn transition_for(
    property: AnimatedProperty,
    first_interaction: bool,
    config: &TransitionConfig,
) -> Transition {
    let snap_or = |duration: Duration| {
        if first_interaction {
            Transition::eased(Duration::ZERO)
        } else {
            Transition::eased(duration)
        }
    };
    match property {
        AnimatedProperty::PanelOpacity | AnimatedProperty::PanelRotateX => {
            Transition::eased(config.duration()).delayed(config.fade_delay())
        }
        AnimatedProperty::PanelPointerEvents => {
            Transition::INSTANT.delayed(config.pointer_events_delay())
        }
        AnimatedProperty::PanelX | AnimatedProperty::IndicatorX => snap_or(config.duration()),
        AnimatedProperty::PanelWidth | AnimatedProperty::PanelHeight => {
            snap_or(config.size_duration())
        }
        AnimatedProperty::BackgroundHeight | AnimatedProperty::IndicatorOpacity => {
            Transition::eased(config.duration())
        }
    }
}

/// Snapshot of what the panel is doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelFrame {
    pub targets: PanelTargets,
    pub phase: PanelPhase,
    pub first_interaction: bool,
}

// ============================================================================
// Controller
// ============================================================================

/// Drives the panel's animated properties from registry state.
///
/// Dropping the controller unsubscribes from the registry and cancels its
/// timers.
pub struct TransitionController {
    inner: Rc<ControllerInner>,
    _registry: RegistrySubscription,
}

struct ControllerInner {
    registry: OptionRegistry,
    scheduler: Rc<dyn Scheduler>,
    engine: Rc<dyn AnimationEngine>,
    config: TransitionConfig,
    state: RefCell<ControllerState>,
    frame: Observable<PanelFrame>,
}

struct ControllerState {
    hovering: bool,
    phase: PanelPhase,
    armed: bool,
    clear_timer: Option<TaskHandle>,
    reset_timer: Option<TaskHandle>,
    dispatched: HashMap<AnimatedProperty, AnimationTarget>,
}

impl TransitionController {
    /// Create the controller and dispatch the initial (idle) targets.
    pub fn new(
        registry: OptionRegistry,
        scheduler: Rc<dyn Scheduler>,
        engine: Rc<dyn AnimationEngine>,
        config: TransitionConfig,
    ) -> Self {
        let inner = Rc::new(ControllerInner {
            registry: registry.clone(),
            scheduler,
            engine,
            config,
            state: RefCell::new(ControllerState {
                hovering: false,
                phase: PanelPhase::Idle,
                armed: true,
                clear_timer: None,
                reset_timer: None,
                dispatched: HashMap::new(),
            }),
            frame: Observable::new(PanelFrame::default()),
        });
        let weak = Rc::downgrade(&inner);
        let subscription = registry.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                ControllerInner::sync(&inner);
            }
        });
        ControllerInner::sync(&inner);
        Self {
            inner,
            _registry: subscription,
        }
    }

    /// Report whether the pointer is over the panel container.
    pub fn set_panel_hovered(&self, hovered: bool) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            std::mem::replace(&mut state.hovering, hovered) != hovered
        };
        if changed {
            ControllerInner::sync(&self.inner);
        }
    }

    pub fn is_panel_hovered(&self) -> bool {
        self.inner.state.borrow().hovering
    }

    /// Current targets, phase, and first-interaction flag.
    pub fn frame(&self) -> PanelFrame {
        self.inner.frame.get()
    }

    /// Called whenever the published frame changes.
    pub fn subscribe(&self, listener: impl Fn(&PanelFrame) + 'static) -> Subscription {
        self.inner.frame.subscribe(listener)
    }

    pub fn phase(&self) -> PanelPhase {
        self.inner.state.borrow().phase
    }

    pub fn is_first_interaction(&self) -> bool {
        self.inner.state.borrow().first_interaction()
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.inner.config
    }

    /// Whether a clear or re-arm timer is outstanding.
    pub fn has_pending_timers(&self) -> bool {
        let state = self.inner.state.borrow();
        state.clear_timer.as_ref().is_some_and(TaskHandle::is_pending)
            || state.reset_timer.as_ref().is_some_and(TaskHandle::is_pending)
    }
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("frame", &self.frame())
            .field("hovering", &self.is_panel_hovered())
            .finish_non_exhaustive()
    }
}

impl ControllerState {
    fn first_interaction(&self) -> bool {
        self.phase.is_active() && self.armed
    }
}

impl ControllerInner {
    fn sync(this: &Rc<Self>) {
        let active = this.registry.target_id().is_some() || this.state.borrow().hovering;
        let phase = if active {
            PanelPhase::Active
        } else {
            PanelPhase::Idle
        };
        if phase != this.state.borrow().phase {
            Self::enter(this, phase);
        }
        this.dispatch();
    }

    fn enter(this: &Rc<Self>, phase: PanelPhase) {
        let mut state = this.state.borrow_mut();
        state.phase = phase;
        match phase {
            PanelPhase::Active => {
                state.reset_timer = None;
                if state.armed {
                    let weak = Rc::downgrade(this);
                    state.clear_timer = Some(this.scheduler.set_timeout(
                        this.config.first_interaction_window(),
                        Box::new(move || Self::on_clear(&weak)),
                    ));
                }
            }
            PanelPhase::Idle => {
                state.clear_timer = None;
                let weak = Rc::downgrade(this);
                state.reset_timer = Some(this.scheduler.set_timeout(
                    this.config.exit_reset_delay(),
                    Box::new(move || Self::on_reset(&weak)),
                ));
            }
        }
        #[cfg(feature = "tracing")]
        debug!(
            phase = ?phase,
            first_interaction = state.first_interaction(),
            "dropdown phase changed"
        );
    }

    fn on_clear(weak: &Weak<Self>) {
        let Some(this) = weak.upgrade() else {
            return;
        };
        {
            let mut state = this.state.borrow_mut();
            state.clear_timer = None;
            if !state.phase.is_active() {
                return;
            }
            state.armed = false;
        }
        #[cfg(feature = "tracing")]
        trace!("first interaction window elapsed");
        this.dispatch();
    }

    fn on_reset(weak: &Weak<Self>) {
        let Some(this) = weak.upgrade() else {
            return;
        };
        {
            let mut state = this.state.borrow_mut();
            state.reset_timer = None;
            state.armed = true;
        }
        #[cfg(feature = "tracing")]
        trace!("first interaction re-armed");
        this.dispatch();
    }

    fn dispatch(&self) {
        let cached = self.registry.cached_option();
        let (frame, commands) = {
            let mut state = self.state.borrow_mut();
            let first_interaction = state.first_interaction();
            let targets = PanelTargets::derive(cached.as_ref(), state.phase, &self.config);
            let mut commands = Vec::new();
            for property in AnimatedProperty::ALL {
                let target = targets.target(property);
                if state.dispatched.get(&property) != Some(&target) {
                    state.dispatched.insert(property, target);
                    commands.push((
                        property,
                        target,
                        transition_for(property, first_interaction, &self.config),
                    ));
                }
            }
            let frame = PanelFrame {
                targets,
                phase: state.phase,
                first_interaction,
            };
            (frame, commands)
        };

        #[cfg(feature = "tracing")]
        trace!(count = commands.len(), "dispatching panel animations");
        for (property, target, transition) in commands {
            self.engine.animate(property, target, transition);
        }
        self.frame.set(frame);
    }
}

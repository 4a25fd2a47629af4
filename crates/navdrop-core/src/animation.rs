#![forbid(unsafe_code)]

//! Animation vocabulary shared with an external animation engine.
//!
//! navdrop never interpolates values itself. It decides *what* each animated
//! property should reach and *how* to get there (duration, delay, easing),
//! and hands that to an [`AnimationEngine`] supplied by the host.
//!
//! # Invariants
//!
//! - A zero-duration [`Transition`] means "apply immediately" (snap).
//! - [`Easing`] is a tag; the engine owns the curve it names.
//!
//! # Example
//!
//! ```ignore
//! use navdrop_core::animation::{AnimatedProperty, AnimationTarget, Transition};
//!
//! engine.animate(
//!     AnimatedProperty::PanelX,
//!     AnimationTarget::Number(10.0),
//!     Transition::eased(Duration::from_millis(220)),
//! );
//! ```

use std::cell::RefCell;
use std::fmt;

use web_time::Duration;

// ============================================================================
// Easing
// ============================================================================

/// Easing curve the engine should use for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    /// Constant rate. Only meaningful for snaps, where it is never sampled.
    Linear,
    /// Decelerating (cubic ease-out).
    #[default]
    EaseOut,
}

// ============================================================================
// Transition
// ============================================================================

/// Timing policy for one property change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl Transition {
    /// Apply immediately, no delay.
    pub const INSTANT: Transition = Transition {
        duration: Duration::ZERO,
        delay: Duration::ZERO,
        easing: Easing::Linear,
    };

    /// Ease-out over `duration`, no delay.
    pub const fn eased(duration: Duration) -> Self {
        Self {
            duration,
            delay: Duration::ZERO,
            easing: Easing::EaseOut,
        }
    }

    /// Same transition, started after `delay`.
    #[must_use]
    pub const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Whether the change is applied without interpolation.
    #[inline]
    pub fn is_instant(&self) -> bool {
        self.duration.is_zero()
    }
}

// ============================================================================
// Properties and targets
// ============================================================================

/// Every visual property the dropdown animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimatedProperty {
    /// Panel opacity (0 closed, 1 open).
    PanelOpacity,
    /// Panel tilt around the X axis, in degrees.
    PanelRotateX,
    /// Whether the panel receives pointer events.
    PanelPointerEvents,
    /// Horizontal offset of the panel container.
    PanelX,
    PanelWidth,
    PanelHeight,
    /// Height of the background layer behind the content.
    BackgroundHeight,
    /// Horizontal position of the indicator arrow.
    IndicatorX,
    IndicatorOpacity,
}

impl AnimatedProperty {
    /// All properties in dispatch order.
    pub const ALL: [AnimatedProperty; 9] = [
        Self::PanelOpacity,
        Self::PanelRotateX,
        Self::PanelPointerEvents,
        Self::PanelX,
        Self::PanelWidth,
        Self::PanelHeight,
        Self::BackgroundHeight,
        Self::IndicatorX,
        Self::IndicatorOpacity,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::PanelOpacity => "panel.opacity",
            Self::PanelRotateX => "panel.rotate_x",
            Self::PanelPointerEvents => "panel.pointer_events",
            Self::PanelX => "panel.x",
            Self::PanelWidth => "panel.width",
            Self::PanelHeight => "panel.height",
            Self::BackgroundHeight => "background.height",
            Self::IndicatorX => "indicator.x",
            Self::IndicatorOpacity => "indicator.opacity",
        }
    }
}

impl fmt::Display for AnimatedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value an animated property should reach.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationTarget {
    Number(f64),
    /// Boolean gates such as pointer-events.
    Flag(bool),
}

impl AnimationTarget {
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Number(n) => Some(n),
            Self::Flag(_) => None,
        }
    }
}

impl fmt::Display for AnimationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

// ============================================================================
// Engine seam
// ============================================================================

/// The host's animation engine.
///
/// Implementations interpolate `property` from its current visual value to
/// `target` following `transition`. A new call for a property supersedes any
/// animation already running for it.
pub trait AnimationEngine {
    fn animate(&self, property: AnimatedProperty, target: AnimationTarget, transition: Transition);
}

/// One recorded [`AnimationEngine::animate`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationCommand {
    pub property: AnimatedProperty,
    pub target: AnimationTarget,
    pub transition: Transition,
}

impl fmt::Display for AnimationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}ms",
            self.property,
            self.target,
            self.transition.duration.as_millis()
        )?;
        if !self.transition.delay.is_zero() {
            write!(f, ", delay {}ms", self.transition.delay.as_millis())?;
        }
        f.write_str(")")
    }
}

/// Engine that only records what it was asked to do.
///
/// Used by headless hosts, the demo, and tests.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    commands: RefCell<Vec<AnimationCommand>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn commands(&self) -> Vec<AnimationCommand> {
        self.commands.borrow().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<AnimationCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    /// Most recent command for `property`, if any.
    pub fn last_for(&self, property: AnimatedProperty) -> Option<AnimationCommand> {
        self.commands
            .borrow()
            .iter()
            .rev()
            .find(|c| c.property == property)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

impl AnimationEngine for RecordingEngine {
    fn animate(&self, property: AnimatedProperty, target: AnimationTarget, transition: Transition) {
        self.commands.borrow_mut().push(AnimationCommand {
            property,
            target,
            transition,
        });
    }
}

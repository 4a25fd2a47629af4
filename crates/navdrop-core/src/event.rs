#![forbid(unsafe_code)]

//! Raw interaction signals delivered to a dropdown option.
//!
//! These are the host's pointer, focus, and touch events reduced to the
//! handful of cases the option arbiter distinguishes. Coordinates are not
//! carried: every signal is already targeted at one option's trigger.

/// A raw input signal on an option trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InteractionSignal {
    /// Primary button pressed down (mouse down, pen down, tap start).
    PrimaryPress,
    /// Pointer entered the trigger.
    HoverStart,
    /// Pointer left the trigger.
    HoverEnd,
    /// Trigger received keyboard focus.
    Focus,
    /// Trigger lost keyboard focus.
    Blur,
    /// A touch began on the trigger.
    TouchStart,
}

impl InteractionSignal {
    /// Whether this signal only exists on devices with a hovering pointer.
    #[inline]
    pub const fn is_hover(self) -> bool {
        matches!(self, Self::HoverStart | Self::HoverEnd)
    }

    /// Short stable name, used in logs and demo transcripts.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PrimaryPress => "press",
            Self::HoverStart => "hover-start",
            Self::HoverEnd => "hover-end",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::TouchStart => "touch-start",
        }
    }
}

/// Pointer capability the arbiter assumes for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputMode {
    /// A pointer that can hover without pressing.
    #[default]
    Hover,
    /// Touch only: hover signals are synthetic and must be ignored.
    Touch,
}

impl InputMode {
    /// Classify a viewport: heights at or below `touch_max_height` are touch.
    #[inline]
    pub fn from_viewport_height(height: f64, touch_max_height: f64) -> Self {
        if height <= touch_max_height {
            Self::Touch
        } else {
            Self::Hover
        }
    }

    #[inline]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::Touch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [InteractionSignal; 6] = [
        InteractionSignal::PrimaryPress,
        InteractionSignal::HoverStart,
        InteractionSignal::HoverEnd,
        InteractionSignal::Focus,
        InteractionSignal::Blur,
        InteractionSignal::TouchStart,
    ];

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn only_hover_signals_are_hover() {
        let hover: Vec<_> = ALL.iter().filter(|s| s.is_hover()).collect();
        assert_eq!(
            hover,
            vec![&InteractionSignal::HoverStart, &InteractionSignal::HoverEnd]
        );
    }

    #[test]
    fn touch_threshold_is_inclusive() {
        assert_eq!(InputMode::from_viewport_height(600.0, 600.0), InputMode::Touch);
        assert_eq!(InputMode::from_viewport_height(599.0, 600.0), InputMode::Touch);
        assert_eq!(InputMode::from_viewport_height(601.0, 600.0), InputMode::Hover);
    }
}

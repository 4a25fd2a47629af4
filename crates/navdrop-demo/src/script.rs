//! Built-in interaction scripts and the headless page they run against.

use std::rc::Rc;

use navdrop::{
    AnimationCommand, Duration, DropdownConfig, DropdownOption, DropdownProvider, DropdownRoot,
    InteractionSignal, ManualScheduler, Measurable, PanelFrame, Rect, RecordingEngine, Viewport,
    ViewportSize,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

/// One scripted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Deliver `signal` to the trigger at `option` (index into the nav bar).
    Signal { option: usize, signal: InteractionSignal },
    /// Move the virtual clock forward.
    Wait(Duration),
    /// Run one animation frame.
    Frame,
    /// Pointer enters or leaves the panel.
    PanelHover(bool),
    /// Viewport resize event.
    Resize { width: f64, height: f64 },
}

impl Step {
    fn describe(&self, bar: &[NavItem]) -> String {
        match *self {
            Self::Signal { option, signal } => {
                let name = bar.get(option).map_or("?", |item| item.name);
                format!("{} {name}", signal.name())
            }
            Self::Wait(d) => format!("wait {}ms", d.as_millis()),
            Self::Frame => "frame".to_string(),
            Self::PanelHover(true) => "panel hover-start".to_string(),
            Self::PanelHover(false) => "panel hover-end".to_string(),
            Self::Resize { width, height } => format!("resize {width}x{height}"),
        }
    }
}

/// A trigger in the demo nav bar.
#[derive(Debug, Clone, Copy)]
pub struct NavItem {
    pub name: &'static str,
    pub anchor: Rect,
    pub content: Rect,
    pub background_height: f64,
}

/// The nav bar every script runs against.
pub fn nav_bar() -> Vec<NavItem> {
    vec![
        NavItem {
            name: "Products",
            anchor: Rect::new(320.0, 16.0, 96.0, 32.0),
            content: Rect::from_size(480.0, 260.0),
            background_height: 72.0,
        },
        NavItem {
            name: "Solutions",
            anchor: Rect::new(432.0, 16.0, 104.0, 32.0),
            content: Rect::from_size(360.0, 200.0),
            background_height: 0.0,
        },
        NavItem {
            name: "Company",
            anchor: Rect::new(552.0, 16.0, 96.0, 32.0),
            content: Rect::from_size(240.0, 180.0),
            background_height: 48.0,
        },
    ]
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Sweep the pointer across the bar, into the panel, and away.
pub fn hover_tour() -> Vec<Step> {
    use InteractionSignal::{HoverEnd, HoverStart};
    vec![
        Step::Frame,
        Step::Signal { option: 0, signal: HoverStart },
        Step::Wait(ms(10)),
        Step::Wait(ms(10)),
        Step::Signal { option: 0, signal: HoverEnd },
        Step::Signal { option: 1, signal: HoverStart },
        Step::Wait(ms(120)),
        Step::Signal { option: 1, signal: HoverEnd },
        Step::Signal { option: 2, signal: HoverStart },
        Step::Wait(ms(120)),
        Step::PanelHover(true),
        Step::Signal { option: 2, signal: HoverEnd },
        Step::Wait(ms(300)),
        Step::PanelHover(false),
        Step::Wait(ms(250)),
        Step::Signal { option: 1, signal: HoverStart },
        Step::Wait(ms(20)),
        Step::Signal { option: 1, signal: HoverEnd },
        Step::Wait(ms(250)),
    ]
}

/// Tap-driven session on a short viewport.
pub fn touch() -> Vec<Step> {
    use InteractionSignal::{HoverEnd, HoverStart, PrimaryPress, TouchStart};
    vec![
        Step::Frame,
        Step::Signal { option: 0, signal: TouchStart },
        Step::Signal { option: 0, signal: HoverStart },
        Step::Signal { option: 0, signal: PrimaryPress },
        Step::Signal { option: 0, signal: HoverEnd },
        Step::Wait(ms(200)),
        Step::Signal { option: 2, signal: PrimaryPress },
        Step::Wait(ms(200)),
        Step::Resize { width: 560.0, height: 420.0 },
        Step::Frame,
        Step::Signal { option: 2, signal: PrimaryPress },
        Step::Wait(ms(250)),
    ]
}

// ============================================================================
// Transcript
// ============================================================================

/// Everything one step caused.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub at_ms: u64,
    pub step: String,
    pub commands: Vec<AnimationCommand>,
    pub panel: PanelSummary,
}

/// Serializable slice of a [`PanelFrame`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PanelSummary {
    pub active: bool,
    pub first_interaction: bool,
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub indicator_x: f64,
}

impl From<PanelFrame> for PanelSummary {
    fn from(frame: PanelFrame) -> Self {
        Self {
            active: frame.phase.is_active(),
            first_interaction: frame.first_interaction,
            x: frame.targets.x,
            width: frame.targets.width,
            height: frame.targets.height,
            indicator_x: frame.targets.indicator_x,
        }
    }
}

// ============================================================================
// Page
// ============================================================================

struct Block(Rect);

impl Measurable for Block {
    fn measure(&self) -> Rect {
        self.0
    }
}

/// Trigger element whose layout follows the viewport width.
struct Trigger {
    anchor: Rect,
    viewport: Viewport,
    design_width: f64,
}

impl Measurable for Trigger {
    fn measure(&self) -> Rect {
        let scale = self.viewport.size().width / self.design_width;
        Rect::new(
            self.anchor.x * scale,
            self.anchor.y,
            self.anchor.width * scale,
            self.anchor.height,
        )
    }
}

/// A headless page: scheduler, nav bar, and mounted panel.
pub struct Page {
    scheduler: Rc<ManualScheduler>,
    viewport: Viewport,
    engine: Rc<RecordingEngine>,
    bar: Vec<NavItem>,
    options: Vec<DropdownOption>,
    root: DropdownRoot,
    _provider: DropdownProvider,
}

impl Page {
    pub fn new(viewport_size: ViewportSize, config: DropdownConfig) -> Result<Self> {
        let scheduler = Rc::new(ManualScheduler::new());
        let viewport = Viewport::new(viewport_size);
        let engine = Rc::new(RecordingEngine::new());
        let provider = DropdownProvider::new(scheduler.clone(), viewport.clone(), config);
        let bar = nav_bar();

        let options = bar
            .iter()
            .map(|item| {
                let content = item.content;
                let option = provider.option(
                    item.name,
                    move || Rc::new(Block(content)) as Rc<dyn Measurable>,
                    item.background_height,
                );
                option.attach(Rc::new(Trigger {
                    anchor: item.anchor,
                    viewport: viewport.clone(),
                    design_width: viewport_size.width,
                }));
                option
            })
            .collect();
        let root = provider.root(engine.clone())?;

        Ok(Self {
            scheduler,
            viewport,
            engine,
            bar,
            options,
            root,
            _provider: provider,
        })
    }

    /// Apply one step and collect what it produced.
    pub fn apply(&self, step: Step) -> TranscriptEntry {
        match step {
            Step::Signal { option, signal } => match self.options.get(option) {
                Some(target) => {
                    let action = target.handle(signal);
                    debug!(option = target.name(), signal = signal.name(), ?action, "signal");
                }
                None => debug!(option, "signal for unknown option skipped"),
            },
            Step::Wait(d) => {
                self.scheduler.advance(d);
            }
            Step::Frame => {
                self.scheduler.run_frame();
            }
            Step::PanelHover(hovered) => self.root.set_panel_hovered(hovered),
            Step::Resize { width, height } => {
                self.viewport.resize(ViewportSize::new(width, height));
            }
        }
        TranscriptEntry {
            at_ms: self.scheduler.now().as_millis() as u64,
            step: step.describe(&self.bar),
            commands: self.engine.take(),
            panel: self.root.frame().into(),
        }
    }

    /// Commands issued before any step ran (initial idle sync).
    pub fn take_initial(&self) -> Vec<AnimationCommand> {
        self.engine.take()
    }
}

/// Run `steps` on a fresh page.
pub fn run(
    steps: &[Step],
    viewport: ViewportSize,
    config: DropdownConfig,
) -> Result<(Vec<AnimationCommand>, Vec<TranscriptEntry>)> {
    let page = Page::new(viewport, config)?;
    let initial = page.take_initial();
    let transcript: Vec<TranscriptEntry> = steps.iter().map(|step| page.apply(*step)).collect();
    info!(
        steps = transcript.len(),
        commands = transcript.iter().map(|e| e.commands.len()).sum::<usize>(),
        "script finished"
    );
    Ok((initial, transcript))
}

#[cfg(test)]
mod tests {
    use super::*;
    use navdrop::AnimatedProperty;

    fn desktop() -> ViewportSize {
        ViewportSize::new(1280.0, 800.0)
    }

    #[test]
    fn initial_sync_covers_every_property() {
        let (initial, _) = run(&[], desktop(), DropdownConfig::default()).unwrap();
        assert_eq!(initial.len(), AnimatedProperty::ALL.len());
    }

    #[test]
    fn hover_tour_opens_with_a_snap_then_slides() {
        let (_, transcript) = run(&hover_tour(), desktop(), DropdownConfig::default()).unwrap();

        let open = &transcript[1];
        assert!(open.panel.active);
        assert!(open.panel.first_interaction);
        // Products: center 368, content 480 wide.
        assert_eq!(open.panel.x, 128.0);
        let snap = open
            .commands
            .iter()
            .find(|c| c.property == AnimatedProperty::PanelX)
            .unwrap();
        assert!(snap.transition.is_instant());

        let to_solutions = &transcript[5];
        assert!(!to_solutions.panel.first_interaction);
        let slide = to_solutions
            .commands
            .iter()
            .find(|c| c.property == AnimatedProperty::PanelX)
            .unwrap();
        assert_eq!(slide.transition.duration, Duration::from_millis(220));

        let panel_hold = &transcript[11];
        assert!(panel_hold.panel.active, "hovering the panel keeps it open");

        let last = transcript.last().unwrap();
        assert!(!last.panel.active);
    }

    #[test]
    fn touch_script_ignores_hover() {
        let (_, transcript) = run(&touch(), ViewportSize::new(390.0, 560.0), DropdownConfig::default()).unwrap();
        assert!(!transcript[2].panel.active, "hover-start ignored on touch");
        assert!(transcript[3].panel.active, "press opens");
        assert!(transcript[4].panel.active, "hover-end ignored on touch");
        assert!(!transcript.last().unwrap().panel.active);
    }

    #[test]
    fn step_descriptions_name_the_trigger() {
        let bar = nav_bar();
        let step = Step::Signal {
            option: 2,
            signal: InteractionSignal::PrimaryPress,
        };
        assert_eq!(step.describe(&bar), "press Company");
        assert_eq!(Step::Wait(ms(15)).describe(&bar), "wait 15ms");
    }
}

#![forbid(unsafe_code)]

//! End-to-end dropdown scenarios driven by `ManualScheduler`.
//!
//! 1. Two-option walk: open, close, geometry retained while fading out
//! 2. First-interaction timing across quick open/close cycles
//! 3. Responsive re-measurement: one per resize event, none when disabled
//! 4. Unmount: dropping options and observers leaves no pending work
//! 5. Touch viewport: hover is ignored, press toggles
//!
//! Run:
//!   cargo test -p navdrop-widgets --test dropdown_scenarios

use std::cell::Cell;
use std::rc::Rc;

use navdrop_core::Duration;
use navdrop_core::animation::{AnimatedProperty, AnimationTarget, RecordingEngine};
use navdrop_core::event::InteractionSignal;
use navdrop_core::geometry::{Rect, ViewportSize};
use navdrop_runtime::{DropdownConfig, ManualScheduler, TransitionConfig, Viewport};
use navdrop_widgets::dropdown::{
    ArbiterAction, DropdownOption, DropdownProvider, Measurable, OptionId, OptionPatch,
    OptionRecord, OptionRegistry, PanelPhase, TransitionController,
};

// ============================================================================
// Helpers
// ============================================================================

/// Element with a settable rectangle that counts how often it is measured.
struct Element {
    rect: Cell<Rect>,
    measured: Cell<u32>,
}

impl Element {
    fn new(rect: Rect) -> Rc<Self> {
        Rc::new(Self {
            rect: Cell::new(rect),
            measured: Cell::new(0),
        })
    }
}

impl Measurable for Element {
    fn measure(&self) -> Rect {
        self.measured.set(self.measured.get() + 1);
        self.rect.get()
    }
}

fn content(width: f64, height: f64) -> impl Fn() -> Rc<dyn Measurable> {
    move || Element::new(Rect::from_size(width, height)) as Rc<dyn Measurable>
}

struct Page {
    scheduler: Rc<ManualScheduler>,
    viewport: Viewport,
    provider: DropdownProvider,
}

fn page(height: f64, config: DropdownConfig) -> Page {
    let scheduler = Rc::new(ManualScheduler::new());
    let viewport = Viewport::new(ViewportSize::new(1280.0, height));
    let provider = DropdownProvider::new(scheduler.clone(), viewport.clone(), config);
    Page {
        scheduler,
        viewport,
        provider,
    }
}

fn trigger(page: &Page, name: &str, x: f64, content_size: (f64, f64)) -> (DropdownOption, Rc<Element>) {
    let option = page
        .provider
        .option(name, content(content_size.0, content_size.1), 16.0);
    let element = Element::new(Rect::new(x, 0.0, 60.0, 24.0));
    option.attach(element.clone());
    (option, element)
}

fn number(engine: &RecordingEngine, property: AnimatedProperty) -> Option<f64> {
    engine.last_for(property).and_then(|c| c.target.as_number())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn two_option_walk_keeps_geometry_while_closing() {
    let registry = OptionRegistry::new();
    let scheduler = Rc::new(ManualScheduler::new());
    let engine = Rc::new(RecordingEngine::new());
    let controller = TransitionController::new(
        registry.clone(),
        scheduler.clone(),
        engine.clone(),
        TransitionConfig::default(),
    );

    let a = OptionId::from_raw(1);
    let b = OptionId::from_raw(2);
    registry
        .register(OptionRecord::new(a, Rect::new(30.0, 0.0, 40.0, 20.0), Rc::new(content(80.0, 40.0)), 0.0))
        .unwrap();
    registry
        .register(OptionRecord::new(b, Rect::new(130.0, 0.0, 40.0, 20.0), Rc::new(content(120.0, 60.0)), 0.0))
        .unwrap();
    registry.update_props(a, OptionPatch::new().content(Rect::from_size(80.0, 40.0)));

    registry.set_target_id(Some(a));
    let frame = controller.frame();
    assert_eq!(frame.phase, PanelPhase::Active);
    assert_eq!(frame.targets.x, 10.0);
    assert_eq!(frame.targets.width, 80.0);
    assert_eq!(frame.targets.height, 40.0);
    assert_eq!(frame.targets.indicator_x, 50.0);
    assert_eq!(frame.targets.opacity, 1.0);
    assert_eq!(number(&engine, AnimatedProperty::PanelX), Some(10.0));
    assert_eq!(number(&engine, AnimatedProperty::PanelOpacity), Some(1.0));

    registry.set_target_id(None);
    let frame = controller.frame();
    assert_eq!(registry.cached_id(), Some(a));
    assert_eq!(frame.phase, PanelPhase::Idle);
    assert_eq!(frame.targets.opacity, 0.0);
    assert_eq!(frame.targets.rotate_x, -15.0);
    assert!(!frame.targets.interactive);
    assert_eq!(frame.targets.x, 10.0);
    assert_eq!(frame.targets.width, 80.0);
    assert_eq!(number(&engine, AnimatedProperty::PanelOpacity), Some(0.0));
    assert_eq!(
        engine.last_for(AnimatedProperty::PanelPointerEvents).map(|c| c.target),
        Some(AnimationTarget::Flag(false))
    );
}

#[test]
fn first_interaction_window_and_rearm() {
    let page = page(900.0, DropdownConfig::default());
    let engine = Rc::new(RecordingEngine::new());
    let (a, _) = trigger(&page, "Products", 0.0, (80.0, 40.0));
    let (b, _) = trigger(&page, "Company", 200.0, (100.0, 50.0));
    let root = page.provider.root(engine.clone()).unwrap();
    page.scheduler.run_frame();

    a.handle(InteractionSignal::HoverStart);
    assert!(root.frame().first_interaction);
    assert!(engine.last_for(AnimatedProperty::PanelX).unwrap().transition.is_instant());

    page.scheduler.advance(ms(14));
    assert!(root.frame().first_interaction);
    page.scheduler.advance(ms(1));
    assert!(!root.frame().first_interaction);

    a.handle(InteractionSignal::HoverEnd);
    b.handle(InteractionSignal::HoverStart);
    let slide = engine.last_for(AnimatedProperty::PanelX).unwrap();
    assert_eq!(slide.transition.duration, ms(220));
    assert_eq!(slide.target, AnimationTarget::Number(180.0));

    // Quick close/open: the stale clear must not fire into the next opening.
    b.handle(InteractionSignal::HoverEnd);
    page.scheduler.advance(ms(200));
    a.handle(InteractionSignal::HoverStart);
    assert!(root.frame().first_interaction);
    a.handle(InteractionSignal::HoverEnd);
    page.scheduler.advance(ms(5));
    a.handle(InteractionSignal::HoverStart);
    assert!(root.frame().first_interaction);
    page.scheduler.advance(ms(15));
    assert!(!root.frame().first_interaction);
}

#[test]
fn responsive_remeasures_once_per_resize() {
    let page = page(900.0, DropdownConfig::default());
    let (option, element) = trigger(&page, "Products", 0.0, (80.0, 40.0));
    page.scheduler.run_frame();
    assert_eq!(element.measured.get(), 1);

    element.rect.set(Rect::new(300.0, 0.0, 60.0, 24.0));
    for width in [1000.0, 1100.0, 1100.0] {
        page.viewport.resize(ViewportSize::new(width, 900.0));
    }
    page.scheduler.run_frame();
    assert_eq!(element.measured.get(), 4);
    assert_eq!(
        page.provider.registry().get_by_id(option.id()).unwrap().anchor_center_x,
        330.0
    );
}

#[test]
fn non_responsive_measures_once() {
    let mut config = DropdownConfig::default();
    config.dimensions.responsive = false;
    let page = page(900.0, config);
    let (_option, element) = trigger(&page, "Products", 0.0, (80.0, 40.0));
    page.scheduler.run_frame();

    page.viewport.resize(ViewportSize::new(800.0, 900.0));
    page.viewport.resize(ViewportSize::new(700.0, 900.0));
    page.scheduler.run_frame();
    assert_eq!(element.measured.get(), 1);
    assert_eq!(page.viewport.resize_listener_count(), 0);
}

#[test]
fn unmount_leaves_nothing_behind() {
    let page = page(900.0, DropdownConfig::default());
    let engine = Rc::new(RecordingEngine::new());
    let root = page.provider.root(engine).unwrap();
    let (a, element) = trigger(&page, "Products", 0.0, (80.0, 40.0));
    let (b, _) = trigger(&page, "Company", 200.0, (100.0, 50.0));
    page.scheduler.run_frame();
    b.handle(InteractionSignal::Focus);
    assert_eq!(page.provider.registry().len(), 2);

    // Resize queues a frame for each option, then both go away.
    page.viewport.resize(ViewportSize::new(1000.0, 900.0));
    assert_eq!(page.scheduler.pending_frames(), 2);
    drop(a);
    drop(b);

    assert_eq!(page.scheduler.pending_frames(), 0);
    assert_eq!(page.viewport.resize_listener_count(), 0);
    assert!(page.provider.registry().is_empty());
    assert_eq!(page.provider.registry().target_id(), None);
    assert!(root.mounted_content_ids().is_empty());
    assert_eq!(root.frame().targets.indicator_opacity, 0.0);

    page.scheduler.run_frame();
    assert_eq!(element.measured.get(), 1);
}

#[test]
fn touch_viewport_ignores_hover() {
    let page = page(600.0, DropdownConfig::default());
    let root = page.provider.root(Rc::new(RecordingEngine::new())).unwrap();
    let (option, _) = trigger(&page, "Products", 0.0, (80.0, 40.0));
    page.scheduler.run_frame();

    assert_eq!(option.handle(InteractionSignal::HoverStart), ArbiterAction::Ignored);
    assert_eq!(root.frame().phase, PanelPhase::Idle);

    assert_eq!(
        option.handle(InteractionSignal::PrimaryPress),
        ArbiterAction::Select(option.id())
    );
    assert_eq!(option.handle(InteractionSignal::HoverEnd), ArbiterAction::Ignored);
    assert_eq!(root.frame().phase, PanelPhase::Active);

    assert_eq!(option.handle(InteractionSignal::PrimaryPress), ArbiterAction::Deselect);
    assert_eq!(root.frame().phase, PanelPhase::Idle);
}

#[test]
fn panel_hover_bridges_trigger_gap() {
    let page = page(900.0, DropdownConfig::default());
    let root = page.provider.root(Rc::new(RecordingEngine::new())).unwrap();
    let (option, _) = trigger(&page, "Products", 0.0, (80.0, 40.0));
    page.scheduler.run_frame();

    option.handle(InteractionSignal::HoverStart);
    root.set_panel_hovered(true);
    option.handle(InteractionSignal::HoverEnd);
    assert_eq!(root.frame().phase, PanelPhase::Active);
    assert_eq!(root.frame().targets.width, 80.0);

    root.set_panel_hovered(false);
    assert_eq!(root.frame().phase, PanelPhase::Idle);
}

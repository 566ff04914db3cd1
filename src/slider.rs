use std::cell::RefCell;
use std::rc::Weak;

use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::{self, Bounds};

/// Extra grab tolerance around the handle when a drag starts.
pub const HIT_SLOP: f32 = 10.0;

// ============================================================================
// STYLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SliderColor {
    pub const BLACK: SliderColor = SliderColor::rgb(0, 0, 0);
    pub const WHITE: SliderColor = SliderColor::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderStyle {
    pub track_width: f32,
    /// Diameter of the handle.
    pub handle_size: f32,
    pub handle_color: SliderColor,
    pub track_color: SliderColor,
    pub label_color: SliderColor,
}

impl Default for SliderStyle {
    fn default() -> Self {
        Self {
            track_width: 1.0,
            handle_size: 50.0,
            handle_color: SliderColor::BLACK,
            track_color: SliderColor::BLACK,
            label_color: SliderColor::WHITE,
        }
    }
}

// ============================================================================
// LISTENER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanPhase {
    Began,
    Changed,
    Ended,
}

/// Receives the slider's interaction events. Implemented by the host screen.
pub trait SliderListener {
    fn tapped(&mut self, angle: f32);
    fn panned(&mut self, angle: f32, phase: PanPhase);
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    /// Always within `[0, 360)`.
    pub value_degrees: f32,
    pub diameter: f32,
    pub handle_radius: f32,
    pub is_dragging: bool,
}

/// Circular slider holding an angle in degrees.
///
/// The slider knows nothing about any drawing API. A host feeds it bounds and
/// pointer gestures, then paints whatever [`crate::render::render`] returns.
pub struct AngleSlider {
    state: SliderState,
    style: SliderStyle,
    bounds: Bounds,
    needs_redraw: bool,
    listener: Option<Weak<RefCell<dyn SliderListener>>>,
}

impl AngleSlider {
    pub fn new(style: SliderStyle, initial_value_degrees: f32) -> Self {
        let handle_radius = style.handle_size.max(0.0) / 2.0;
        Self {
            state: SliderState {
                value_degrees: geometry::normalize_degrees(initial_value_degrees),
                diameter: 0.0,
                handle_radius,
                is_dragging: false,
            },
            style,
            bounds: Bounds::default(),
            needs_redraw: true,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Weak<RefCell<dyn SliderListener>>) {
        self.listener = Some(listener);
    }

    pub fn state(&self) -> &SliderState {
        &self.state
    }

    pub fn style(&self) -> &SliderStyle {
        &self.style
    }

    pub fn value(&self) -> f32 {
        self.state.value_degrees
    }

    pub fn set_value(&mut self, degrees: f32) {
        self.state.value_degrees = geometry::normalize_degrees(degrees);
        self.needs_redraw = true;
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// Returns whether a redraw was requested since the last call, and clears the request.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn layout(&mut self, bounds: Bounds) {
        if bounds != self.bounds {
            self.bounds = bounds;
            self.state.diameter = geometry::track_diameter(&bounds);
            self.needs_redraw = true;
        }
    }

    pub fn center(&self) -> Point2<f32> {
        self.bounds.center()
    }

    pub fn handle_position(&self) -> Point2<f32> {
        geometry::point_on_circle(self.center(), self.state.diameter / 2.0, self.state.value_degrees)
    }

    pub fn handle_rect(&self) -> Bounds {
        let size = self.style.handle_size.max(0.0);
        Bounds::from_center_size(self.handle_position(), size, size)
    }

    /// Angle under `point`, or 0 while the slider has no usable track.
    pub fn angle_at(&self, point: Point2<f32>) -> f32 {
        if self.state.diameter <= 0.0 {
            return 0.0;
        }
        geometry::angle_from_point(point, self.center())
    }

    fn within_grab_radius(&self, point: Point2<f32>) -> bool {
        nalgebra::distance(&point, &self.handle_position()) <= self.state.handle_radius + HIT_SLOP
    }

    // ========================================================================
    // GESTURES
    // ========================================================================

    pub fn on_drag_begin(&mut self, point: Point2<f32>) {
        self.state.is_dragging = self.within_grab_radius(point);
        if self.state.is_dragging {
            debug!("Handle grabbed at {:.0}°", self.state.value_degrees);
            self.notify(|listener, angle| listener.panned(angle, PanPhase::Began));
        }
    }

    pub fn on_drag_move(&mut self, point: Point2<f32>) {
        if !self.state.is_dragging {
            return;
        }
        self.set_value(self.angle_at(point));
        self.notify(|listener, angle| listener.panned(angle, PanPhase::Changed));
    }

    pub fn on_drag_end(&mut self) {
        if !self.state.is_dragging {
            return;
        }
        self.state.is_dragging = false;
        debug!("Handle released at {:.0}°", self.state.value_degrees);
        self.notify(|listener, angle| listener.panned(angle, PanPhase::Ended));
    }

    /// A cancelled drag settles at the current value, same as a release.
    pub fn on_drag_cancel(&mut self) {
        self.on_drag_end();
    }

    pub fn on_tap(&mut self, point: Point2<f32>) {
        if self.handle_rect().contains(point) {
            self.notify(|listener, angle| listener.tapped(angle));
        } else {
            debug!("Tap at ({:.1}, {:.1}) missed the handle", point.x, point.y);
        }
    }

    fn notify(&self, event: impl FnOnce(&mut dyn SliderListener, f32)) {
        let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match listener.try_borrow_mut() {
            Ok(mut listener) => event(&mut *listener, self.state.value_degrees),
            Err(_) => warn!("Slider listener is busy, dropping event"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        Tapped(f32),
        Panned(f32, PanPhase),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl SliderListener for Recorder {
        fn tapped(&mut self, angle: f32) {
            self.events.push(Event::Tapped(angle));
        }

        fn panned(&mut self, angle: f32, phase: PanPhase) {
            self.events.push(Event::Panned(angle, phase));
        }
    }

    /// Center (100, 100), track diameter 200, handle size 50.
    fn laid_out_slider() -> (AngleSlider, Rc<RefCell<Recorder>>) {
        let mut slider = AngleSlider::new(SliderStyle::default(), 0.0);
        slider.layout(Bounds::from_center_size(Point2::new(100.0, 100.0), 300.0, 300.0));

        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let listener: Rc<RefCell<dyn SliderListener>> = recorder.clone();
        slider.set_listener(Rc::downgrade(&listener));
        (slider, recorder)
    }

    fn assert_point_near(actual: Point2<f32>, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < 1e-3 && (actual.y - y).abs() < 1e-3,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_default_value_and_initial_normalization() {
        let slider = AngleSlider::new(SliderStyle::default(), 0.0);
        assert_eq!(slider.value(), 0.0);
        assert!(!slider.is_dragging());

        let slider = AngleSlider::new(SliderStyle::default(), -30.0);
        assert!((slider.value() - 330.0).abs() < 1e-4);
    }

    #[test]
    fn test_set_value_normalizes_and_marks_dirty() {
        let (mut slider, _) = laid_out_slider();
        slider.take_needs_redraw();

        slider.set_value(-30.0);
        assert!((slider.value() - 330.0).abs() < 1e-4);
        assert!(slider.take_needs_redraw());
        assert!(!slider.take_needs_redraw());

        slider.set_value(1080.0);
        assert_eq!(slider.value(), 0.0);
    }

    #[test]
    fn test_layout_derives_diameter() {
        let (slider, _) = laid_out_slider();
        assert_eq!(slider.state().diameter, 200.0);
        assert_eq!(slider.state().handle_radius, 25.0);
        assert_point_near(slider.center(), 100.0, 100.0);
    }

    #[test]
    fn test_quarter_turn_puts_handle_above_center_and_tap_reports_it() {
        let (mut slider, recorder) = laid_out_slider();
        slider.set_value(90.0);
        assert_point_near(slider.handle_position(), 100.0, 0.0);

        slider.on_tap(Point2::new(100.0, 0.0));
        assert_eq!(recorder.borrow().events, vec![Event::Tapped(90.0)]);
    }

    #[test]
    fn test_tap_uses_exact_handle_box() {
        let (mut slider, recorder) = laid_out_slider();
        // handle centered at (200, 100)
        slider.on_tap(Point2::new(225.0, 125.0));
        assert_eq!(recorder.borrow().events.len(), 1);

        // inside the drag slop, outside the box
        slider.on_tap(Point2::new(226.0, 100.0));
        slider.on_tap(Point2::new(100.0, 100.0));
        assert_eq!(recorder.borrow().events.len(), 1);
    }

    #[test]
    fn test_drag_outside_hit_radius_is_ignored() {
        let (mut slider, recorder) = laid_out_slider();
        slider.on_drag_begin(Point2::new(100.0, 100.0));
        assert!(!slider.is_dragging());

        slider.on_drag_move(Point2::new(100.0, 0.0));
        slider.on_drag_end();

        assert_eq!(slider.value(), 0.0);
        assert!(recorder.borrow().events.is_empty());
    }

    #[test]
    fn test_drag_inside_hit_radius_reports_phases() {
        let (mut slider, recorder) = laid_out_slider();
        // handle radius 25 plus slop 10
        slider.on_drag_begin(Point2::new(234.0, 100.0));
        assert!(slider.is_dragging());

        slider.on_drag_move(Point2::new(100.0, 0.0));
        slider.on_drag_move(Point2::new(0.0, 100.0));
        slider.on_drag_end();
        assert!(!slider.is_dragging());

        slider.on_drag_move(Point2::new(100.0, 200.0));
        slider.on_drag_end();

        let events = recorder.borrow().events.clone();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Event::Panned(0.0, PanPhase::Began));
        match (events[1], events[2], events[3]) {
            (
                Event::Panned(first, PanPhase::Changed),
                Event::Panned(second, PanPhase::Changed),
                Event::Panned(last, PanPhase::Ended),
            ) => {
                assert!((first - 90.0).abs() < 1e-3);
                assert!((second - 180.0).abs() < 1e-3);
                assert_eq!(last, second);
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert!((slider.value() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_drag_just_outside_slop_misses() {
        let (mut slider, recorder) = laid_out_slider();
        slider.on_drag_begin(Point2::new(236.0, 100.0));
        assert!(!slider.is_dragging());
        assert!(recorder.borrow().events.is_empty());
    }

    #[test]
    fn test_drag_cancel_settles_like_release() {
        let (mut slider, recorder) = laid_out_slider();
        slider.on_drag_begin(Point2::new(200.0, 100.0));
        slider.on_drag_move(Point2::new(100.0, 200.0));
        slider.on_drag_cancel();

        assert!(!slider.is_dragging());
        let events = recorder.borrow().events.clone();
        let ended: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::Panned(_, PanPhase::Ended)))
            .collect();
        assert_eq!(ended.len(), 1);
        assert!((slider.value() - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_gestures_without_listener() {
        let mut slider = AngleSlider::new(SliderStyle::default(), 0.0);
        slider.layout(Bounds::from_center_size(Point2::new(100.0, 100.0), 300.0, 300.0));

        slider.on_drag_begin(Point2::new(200.0, 100.0));
        slider.on_drag_move(Point2::new(100.0, 0.0));
        slider.on_drag_end();
        slider.on_tap(slider.handle_position());

        assert!((slider.value() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_dropped_listener_is_ignored() {
        let (mut slider, recorder) = laid_out_slider();
        drop(recorder);
        slider.on_tap(Point2::new(200.0, 100.0));
        assert!(!slider.is_dragging());
    }

    #[test]
    fn test_busy_listener_drops_event() {
        let (mut slider, recorder) = laid_out_slider();
        {
            let _guard = recorder.borrow_mut();
            slider.on_tap(Point2::new(200.0, 100.0));
        }
        assert!(recorder.borrow().events.is_empty());
    }

    #[test]
    fn test_queries_before_layout_are_degenerate() {
        let slider = AngleSlider::new(SliderStyle::default(), 123.0);
        assert_eq!(slider.state().diameter, 0.0);
        assert_point_near(slider.handle_position(), 0.0, 0.0);
        assert_eq!(slider.angle_at(Point2::new(40.0, -10.0)), 0.0);
    }

    #[test]
    fn test_larger_handle_widens_tap_box() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let listener: Rc<RefCell<dyn SliderListener>> = recorder.clone();
        let mut slider = AngleSlider::new(
            SliderStyle {
                handle_size: 100.0,
                ..SliderStyle::default()
            },
            0.0,
        );
        slider.set_listener(Rc::downgrade(&listener));
        slider.layout(Bounds::from_center_size(Point2::new(100.0, 100.0), 300.0, 300.0));
        assert_eq!(slider.state().handle_radius, 50.0);

        slider.on_tap(Point2::new(245.0, 100.0));
        assert_eq!(recorder.borrow().events, vec![Event::Tapped(0.0)]);
    }
}

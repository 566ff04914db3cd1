use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::photo_library::index_for_angle;
use crate::slider::{PanPhase, SliderListener};

/// Host-side reaction to the slider: picks which photo the screen shows.
///
/// A tap on the handle jumps to a random angle. The browser cannot reach the
/// slider from inside a notification, so the jump is parked as a pending value
/// for the app to apply with `set_value` once the gesture has been handled.
pub struct PhotoBrowser {
    photo_count: usize,
    selected: Option<usize>,
    highlighted: Option<usize>,
    selection_changed: bool,
    pending_value: Option<f32>,
    rng: StdRng,
}

impl PhotoBrowser {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            photo_count: 0,
            selected: None,
            highlighted: None,
            selection_changed: false,
            pending_value: None,
            rng,
        }
    }

    pub fn set_photo_count(&mut self, count: usize) {
        self.photo_count = count;
        if self.selected.map_or(false, |index| index >= count) {
            self.select(None);
        }
        if self.highlighted.map_or(false, |index| index >= count) {
            self.highlighted = None;
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Photo under the handle while a drag is in progress.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn select(&mut self, index: Option<usize>) {
        let index = index.filter(|&index| index < self.photo_count);
        if index != self.selected {
            self.selected = index;
            self.selection_changed = true;
        }
    }

    pub fn select_angle(&mut self, angle: f32) {
        self.select(index_for_angle(angle, self.photo_count));
    }

    pub fn take_selection_change(&mut self) -> Option<Option<usize>> {
        if std::mem::take(&mut self.selection_changed) {
            Some(self.selected)
        } else {
            None
        }
    }

    pub fn take_pending_value(&mut self) -> Option<f32> {
        self.pending_value.take()
    }
}

impl Default for PhotoBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl SliderListener for PhotoBrowser {
    fn tapped(&mut self, angle: f32) {
        let jump = self.rng.gen_range(0..360) as f32;
        info!("Handle tapped at {:.0}°, jumping to {:.0}°", angle, jump);
        self.pending_value = Some(jump);
        self.highlighted = None;
        self.select_angle(jump);
    }

    fn panned(&mut self, angle: f32, phase: PanPhase) {
        match phase {
            PanPhase::Began => debug!("Pan began at {:.0}°", angle),
            PanPhase::Changed => self.highlighted = index_for_angle(angle, self.photo_count),
            PanPhase::Ended => {
                self.highlighted = None;
                self.select_angle(angle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser_with_photos(count: usize) -> PhotoBrowser {
        let mut browser = PhotoBrowser::with_rng(StdRng::seed_from_u64(7));
        browser.set_photo_count(count);
        browser
    }

    #[test]
    fn test_tap_jumps_to_random_whole_angle() {
        let mut browser = browser_with_photos(10);
        browser.tapped(12.0);

        let jump = browser.take_pending_value().expect("tap should park a jump");
        assert!((0.0..360.0).contains(&jump));
        assert_eq!(jump.fract(), 0.0);
        assert_eq!(browser.selected(), index_for_angle(jump, 10));
        assert_eq!(browser.take_pending_value(), None);
    }

    #[test]
    fn test_pan_change_only_highlights() {
        let mut browser = browser_with_photos(10);
        browser.panned(0.0, PanPhase::Began);
        browser.panned(100.0, PanPhase::Changed);

        assert_eq!(browser.highlighted(), Some(2));
        assert_eq!(browser.selected(), None);
        assert_eq!(browser.take_selection_change(), None);
    }

    #[test]
    fn test_pan_end_selects() {
        let mut browser = browser_with_photos(10);
        browser.panned(100.0, PanPhase::Changed);
        browser.panned(200.0, PanPhase::Ended);

        assert_eq!(browser.highlighted(), None);
        assert_eq!(browser.selected(), Some(5));
        assert_eq!(browser.take_selection_change(), Some(Some(5)));
        assert_eq!(browser.take_selection_change(), None);

        // settling in the same bucket is not a new selection
        browser.panned(210.0, PanPhase::Ended);
        assert_eq!(browser.take_selection_change(), None);
    }

    #[test]
    fn test_empty_library_has_no_selection() {
        let mut browser = browser_with_photos(0);
        browser.tapped(0.0);
        assert!(browser.take_pending_value().is_some());
        assert_eq!(browser.selected(), None);

        browser.panned(90.0, PanPhase::Ended);
        assert_eq!(browser.selected(), None);
        assert_eq!(browser.take_selection_change(), None);
    }

    #[test]
    fn test_shrinking_library_drops_stale_selection() {
        let mut browser = browser_with_photos(10);
        browser.select(Some(8));
        browser.take_selection_change();

        browser.set_photo_count(4);
        assert_eq!(browser.selected(), None);
        assert_eq!(browser.take_selection_change(), Some(None));

        browser.select(Some(6));
        assert_eq!(browser.selected(), None);
    }
}

//! Angle and circle math for the circular slider.
//!
//! Angles are in degrees. 0° points along the positive x-axis and angles grow
//! counter-clockwise as seen on screen. Screen y grows downward, so every
//! conversion flips the sign of the y component.

use nalgebra::{Point2, Vector2};

/// Space kept free on each side of the track inside the widget bounds.
pub const TRACK_PADDING: f32 = 50.0;

pub const FULL_TURN: f32 = 360.0;

/// Axis-aligned rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point2<f32>,
    pub max: Point2<f32>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Point2::origin(),
            max: Point2::origin(),
        }
    }
}

impl Bounds {
    pub fn from_min_size(min: Point2<f32>, width: f32, height: f32) -> Self {
        Self {
            min,
            max: min + Vector2::new(width.max(0.0), height.max(0.0)),
        }
    }

    pub fn from_center_size(center: Point2<f32>, width: f32, height: f32) -> Self {
        let half = Vector2::new(width.max(0.0), height.max(0.0)) / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edges count as inside.
    pub fn contains(&self, point: Point2<f32>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Wraps any angle into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }

    let wrapped = degrees.rem_euclid(FULL_TURN);
    // rem_euclid of a tiny negative number rounds up to exactly 360
    if wrapped >= FULL_TURN {
        0.0
    } else {
        // turns -0.0 into 0.0
        wrapped + 0.0
    }
}

/// Angle of `point` as seen from `center`.
///
/// Uses the two-argument arctangent so points straight above or below the
/// center (`dx == 0`) need no special casing. A point on the center itself
/// yields 0.
pub fn angle_from_point(point: Point2<f32>, center: Point2<f32>) -> f32 {
    let offset = point - center;
    if offset.x == 0.0 && offset.y == 0.0 {
        return 0.0;
    }
    normalize_degrees((-offset.y).atan2(offset.x).to_degrees())
}

/// Offset from the circle center to the point at `degrees` on a circle of `radius`.
pub fn offset_on_circle(radius: f32, degrees: f32) -> Vector2<f32> {
    let radians = degrees.to_radians();
    Vector2::new(radius * radians.cos(), -radius * radians.sin())
}

pub fn point_on_circle(center: Point2<f32>, radius: f32, degrees: f32) -> Point2<f32> {
    center + offset_on_circle(radius, degrees)
}

/// Usable track diameter for a widget of the given bounds.
pub fn track_diameter(bounds: &Bounds) -> f32 {
    (bounds.width().min(bounds.height()) - 2.0 * TRACK_PADDING).max(0.0)
}

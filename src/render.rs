//! Toolkit-neutral drawing of the slider.

use nalgebra::Point2;

use crate::slider::{AngleSlider, SliderColor};

/// Label font size relative to the handle radius.
pub const LABEL_SCALE: f32 = 0.75;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDescriptor {
    pub text: String,
    pub center: Point2<f32>,
    pub font_size: f32,
    pub color: SliderColor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    StrokeCircle {
        center: Point2<f32>,
        radius: f32,
        width: f32,
        color: SliderColor,
    },
    FillCircle {
        center: Point2<f32>,
        radius: f32,
        color: SliderColor,
    },
    Label(LabelDescriptor),
}

/// Track, then handle, then the value label on top of the handle.
pub fn render(slider: &AngleSlider) -> Vec<DrawCommand> {
    let state = slider.state();
    let style = slider.style();
    let handle_center = slider.handle_position();

    vec![
        DrawCommand::StrokeCircle {
            center: slider.center(),
            radius: state.diameter / 2.0,
            width: style.track_width,
            color: style.track_color,
        },
        DrawCommand::FillCircle {
            center: handle_center,
            radius: state.handle_radius,
            color: style.handle_color,
        },
        DrawCommand::Label(LabelDescriptor {
            text: format!("{:.0}", state.value_degrees),
            center: handle_center,
            font_size: state.handle_radius * LABEL_SCALE,
            color: style.label_color,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::slider::SliderStyle;

    fn styled_slider() -> AngleSlider {
        let style = SliderStyle {
            handle_color: SliderColor::rgb(200, 40, 40),
            track_color: SliderColor::rgb(90, 90, 90),
            label_color: SliderColor::WHITE,
            track_width: 4.0,
            handle_size: 60.0,
        };
        let mut slider = AngleSlider::new(style, 0.0);
        slider.layout(Bounds::from_center_size(Point2::new(150.0, 150.0), 300.0, 300.0));
        slider
    }

    #[test]
    fn test_render_order_and_geometry() {
        let mut slider = styled_slider();
        slider.set_value(180.0);
        let commands = render(&slider);
        assert_eq!(commands.len(), 3);

        match &commands[0] {
            DrawCommand::StrokeCircle { center, radius, width, color } => {
                assert_eq!(*center, Point2::new(150.0, 150.0));
                assert_eq!(*radius, 100.0);
                assert_eq!(*width, 4.0);
                assert_eq!(*color, SliderColor::rgb(90, 90, 90));
            }
            other => panic!("expected track first, got {other:?}"),
        }

        match &commands[1] {
            DrawCommand::FillCircle { center, radius, color } => {
                assert!((center.x - 50.0).abs() < 1e-3);
                assert!((center.y - 150.0).abs() < 1e-3);
                assert_eq!(*radius, 30.0);
                assert_eq!(*color, SliderColor::rgb(200, 40, 40));
            }
            other => panic!("expected handle second, got {other:?}"),
        }
    }

    #[test]
    fn test_label_shows_rounded_value() {
        let mut slider = styled_slider();
        slider.set_value(359.6);
        let commands = render(&slider);

        let DrawCommand::Label(label) = &commands[2] else {
            panic!("expected label last");
        };
        assert_eq!(label.text, "360");
        assert_eq!(label.center, slider.handle_position());
        assert_eq!(label.font_size, 30.0 * LABEL_SCALE);
        assert_eq!(label.color, SliderColor::WHITE);

        slider.set_value(42.4);
        let DrawCommand::Label(label) = &render(&slider)[2] else {
            panic!("expected label last");
        };
        assert_eq!(label.text, "42");
    }

    #[test]
    fn test_render_before_layout() {
        let slider = AngleSlider::new(SliderStyle::default(), 45.0);
        let commands = render(&slider);
        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            DrawCommand::StrokeCircle { radius, .. } if radius == 0.0
        ));
        assert!(matches!(
            commands[1],
            DrawCommand::FillCircle { center, .. } if center == Point2::new(0.0, 0.0)
        ));
    }
}

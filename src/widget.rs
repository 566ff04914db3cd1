use eframe::egui;
use nalgebra::Point2;

use crate::geometry::Bounds;
use crate::render::{render, DrawCommand};
use crate::slider::{AngleSlider, SliderColor};

/// Lays the slider out in `rect`, feeds it this frame's pointer gestures and paints it.
pub fn show(ui: &mut egui::Ui, slider: &mut AngleSlider, rect: egui::Rect) -> egui::Response {
    slider.layout(to_bounds(rect));

    let id = ui.id().with("angle_slider");
    let pan_id = id.with("pan");
    let response = ui.interact(rect, id, egui::Sense::click_and_drag());

    // egui reports a drag from the moment of the press. It only becomes a pan once it can no longer be a tap.
    if response.dragged() && ui.input(|i| i.pointer.is_decidedly_dragging()) {
        let pan_started = ui.data(|d| d.get_temp::<bool>(pan_id)).unwrap_or(false);
        if !pan_started {
            ui.data_mut(|d| d.insert_temp(pan_id, true));
            // Hit-test where the finger landed, not where it is once the drag threshold is crossed
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(pos) = origin {
                slider.on_drag_begin(to_point(pos));
            }
        }

        if slider.is_dragging() {
            if let Some(pos) = response.interact_pointer_pos() {
                slider.on_drag_move(to_point(pos));
            }
        }
    } else if !response.dragged() {
        ui.data_mut(|d| d.remove::<bool>(pan_id));
    }

    if response.drag_released() {
        slider.on_drag_end();
    } else if slider.is_dragging() && !response.dragged() {
        slider.on_drag_cancel();
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            slider.on_tap(to_point(pos));
        }
    }

    if slider.take_needs_redraw() {
        ui.ctx().request_repaint();
    }

    if ui.is_rect_visible(rect) {
        paint(ui.painter(), &render(slider));
    }

    response
}

pub fn paint(painter: &egui::Painter, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::StrokeCircle { center, radius, width, color } => {
                painter.circle_stroke(to_pos(*center), *radius, egui::Stroke::new(*width, to_color32(*color)));
            }
            DrawCommand::FillCircle { center, radius, color } => {
                painter.circle_filled(to_pos(*center), *radius, to_color32(*color));
            }
            DrawCommand::Label(label) => {
                painter.text(
                    to_pos(label.center),
                    egui::Align2::CENTER_CENTER,
                    &label.text,
                    egui::FontId::proportional(label.font_size.max(1.0)),
                    to_color32(label.color),
                );
            }
        }
    }
}

pub fn to_bounds(rect: egui::Rect) -> Bounds {
    Bounds::from_min_size(to_point(rect.min), rect.width(), rect.height())
}

pub fn to_point(pos: egui::Pos2) -> Point2<f32> {
    Point2::new(pos.x, pos.y)
}

pub fn to_pos(point: Point2<f32>) -> egui::Pos2 {
    egui::pos2(point.x, point.y)
}

pub fn to_color32(color: SliderColor) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

use eframe::egui::{self, Context, TextureOptions};
use image::RgbImage;

use crate::ui::GalleryApp;

/// `None` for images with no pixels, which egui cannot upload.
pub fn to_color_image(image: &RgbImage) -> Option<egui::ColorImage> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    let size = [image.width() as usize, image.height() as usize];
    let pixels = image.as_flat_samples();
    Some(egui::ColorImage::from_rgb(size, pixels.as_slice()))
}

impl GalleryApp {
    pub fn update_preview_texture(&mut self, ctx: &Context, image: &RgbImage) {
        let Some(color_image) = to_color_image(image) else {
            return;
        };

        // Reuse the texture slot while consecutive previews share a size
        match &mut self.preview_texture {
            Some(texture) if texture.size() == color_image.size => {
                texture.set(color_image, TextureOptions::LINEAR);
            }
            _ => {
                self.preview_texture = Some(ctx.load_texture("photo_preview", color_image, TextureOptions::LINEAR));
            }
        }
    }

    pub fn insert_thumbnail_texture(&mut self, ctx: &Context, index: usize, image: &RgbImage) {
        if let Some(color_image) = to_color_image(image) {
            let texture = ctx.load_texture(format!("thumbnail_{index}"), color_image, TextureOptions::LINEAR);
            self.thumbnails.insert(index, texture);
        }
    }
}

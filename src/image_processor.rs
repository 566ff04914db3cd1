use anyhow::{Context, Result};
use image::{imageops, ImageBuffer, Rgb, RgbImage};
use log::debug;
use std::path::{Path, PathBuf};

use crate::photo_library::LibraryError;

pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "webp"];

pub struct ImageProcessor {
    max_dimensions: (u32, u32),
}

impl ImageProcessor {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_dimensions: (max_width.max(1), max_height.max(1)),
        }
    }

    pub fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SUPPORTED_FORMATS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Decodes a photo and shrinks it to the processor's maximum dimensions.
    pub fn load_image(&self, path: &Path) -> Result<RgbImage, LibraryError> {
        if !path.exists() {
            return Err(LibraryError::NotFound(path.to_path_buf()));
        }
        if !Self::is_supported(path) {
            return Err(LibraryError::UnsupportedFormat(path.to_path_buf()));
        }

        let img = image::open(path).map_err(|source| LibraryError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let mut rgb_img = img.to_rgb8();
        let (max_width, max_height) = self.max_dimensions;
        if rgb_img.width() > max_width || rgb_img.height() > max_height {
            debug!(
                "Shrinking {} from {}x{} to fit {}x{}",
                path.display(),
                rgb_img.width(),
                rgb_img.height(),
                max_width,
                max_height
            );
            rgb_img = self.resize_to_fit(&rgb_img, max_width, max_height);
        }

        Ok(rgb_img)
    }

    /// Scales down keeping the aspect ratio. Never upscales.
    pub fn resize_to_fit(&self, image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }

        let scale = (max_width as f32 / width as f32).min(max_height as f32 / height as f32);
        if scale >= 1.0 {
            return image.clone();
        }

        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);
        imageops::resize(image, new_width, new_height, imageops::FilterType::Lanczos3)
    }

    /// Square thumbnail filling `size`, center-cropped like an aspect-fill cell.
    pub fn create_thumbnail(&self, image: &RgbImage, size: u32) -> RgbImage {
        let (width, height) = image.dimensions();
        let size = size.max(1);
        if width == 0 || height == 0 {
            return RgbImage::new(size, size);
        }

        let scale = (size as f32 / width as f32).max(size as f32 / height as f32);
        let scaled_width = ((width as f32 * scale).ceil() as u32).max(size);
        let scaled_height = ((height as f32 * scale).ceil() as u32).max(size);
        let scaled = imageops::thumbnail(image, scaled_width, scaled_height);

        let x = (scaled_width - size) / 2;
        let y = (scaled_height - size) / 2;
        imageops::crop_imm(&scaled, x, y, size, size).to_image()
    }

    /// Writes `count` generated photos, one hue band per slider bucket.
    pub fn create_sample_images(&self, output_dir: &Path, count: usize) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create sample directory: {}", output_dir.display()))?;

        let mut created_files = Vec::with_capacity(count);
        for index in 0..count {
            let hue = index as f32 * 360.0 / count.max(1) as f32;
            let path = output_dir.join(format!("sample_{:02}.png", index));
            self.create_hue_sample(640, 480, hue)
                .save(&path)
                .with_context(|| format!("Failed to save sample image: {}", path.display()))?;
            created_files.push(path);
        }

        debug!("Created {} sample images in {}", created_files.len(), output_dir.display());
        Ok(created_files)
    }

    fn create_hue_sample(&self, width: u32, height: u32, hue: f32) -> RgbImage {
        let center_x = width as f32 / 2.0;
        let center_y = height as f32 / 2.0;
        let ring = height as f32 / 3.0;

        ImageBuffer::from_fn(width, height, |x, y| {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let distance = (dx * dx + dy * dy).sqrt();

            // a lighter disc in the middle so neighbouring samples are easy to tell apart
            if distance < ring {
                hue_to_rgb(hue, 0.35, 1.0)
            } else {
                let shade = 0.45 + 0.5 * (1.0 - y as f32 / height as f32);
                hue_to_rgb(hue + 30.0 * x as f32 / width as f32, 0.8, shade)
            }
        })
    }
}

/// HSV to RGB with hue in degrees, saturation and value in `[0, 1]`.
pub fn hue_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb<u8> {
    let h = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb([
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    ])
}

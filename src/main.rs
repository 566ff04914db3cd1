use anyhow::Result;
use eframe::egui;
use log::info;

mod browser;
mod config;
mod geometry;
mod image_processor;
mod photo_library;
mod render;
mod slider;
mod texture;
mod ui;
mod widget;

use crate::config::Config;
use crate::ui::GalleryApp;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Starting circular slider photo browser");

    let config = Config::load()?;
    config.validate()?;
    info!(
        "Configuration loaded: {}x{} display, library at {}",
        config.display.width,
        config.display.height,
        config.library.dir.display()
    );

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([config.display.width as f32, config.display.height as f32])
        .with_min_inner_size([320.0, 480.0]);
    if config.display.fullscreen {
        viewport = viewport.with_decorations(false).with_fullscreen(true);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    // Image decoding runs on this runtime's blocking pool while eframe owns the main thread
    let runtime = tokio::runtime::Handle::current();

    info!("Launching GUI application...");
    eframe::run_native(
        "Circular Slider",
        options,
        Box::new(move |cc| {
            setup_touch_style(&cc.egui_ctx);
            Box::new(GalleryApp::new(config, runtime))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))?;

    info!("Application shut down gracefully");
    Ok(())
}

fn setup_touch_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    // Larger targets for fingers
    style.spacing.button_padding = egui::vec2(14.0, 10.0);
    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.interact_size.y = 36.0;

    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::new(17.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::new(15.0, egui::FontFamily::Proportional),
    );

    ctx.set_style(style);
}

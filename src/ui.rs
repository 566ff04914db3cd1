use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use eframe::egui;
use log::{info, warn};
use tokio::runtime::Handle;

use crate::browser::PhotoBrowser;
use crate::config::Config;
use crate::photo_library::{angle_for_index, LibraryEvent, LibraryLoader, PhotoEntry, ScanRequest};
use crate::slider::{AngleSlider, SliderListener};
use crate::widget;

// ============================================================================
// CONSTANTS FOR UI STYLING
// ============================================================================
const UI_PADDING: f32 = 12.0;
const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(28, 28, 32);
const SELECTED_OUTLINE: egui::Color32 = egui::Color32::WHITE;
const HIGHLIGHT_OUTLINE: egui::Color32 = egui::Color32::from_rgb(220, 60, 80);

// ============================================================================
// MAIN APP STRUCT
// ============================================================================

pub struct GalleryApp {
    pub config: Config,

    // Slider and the listener it reports to
    pub slider: AngleSlider,
    pub browser: Rc<RefCell<PhotoBrowser>>,

    // Photo library
    pub loader: LibraryLoader,
    pub photos: Vec<PhotoEntry>,
    pub thumbnails: HashMap<usize, egui::TextureHandle>,
    pub broken_thumbnails: HashSet<usize>,
    pub preview_texture: Option<egui::TextureHandle>,
    pub preview_index: Option<usize>,

    // Status
    pub status_message: String,
    pub is_scanning: bool,
    pub waiting_for_preview: bool,
}

impl GalleryApp {
    pub fn new(config: Config, runtime: Handle) -> Self {
        let mut slider = AngleSlider::new(config.slider.style.clone(), config.slider.initial_value_degrees);

        let browser = Rc::new(RefCell::new(PhotoBrowser::new()));
        let listener: Rc<RefCell<dyn SliderListener>> = browser.clone();
        slider.set_listener(Rc::downgrade(&listener));

        let loader = LibraryLoader::new(
            runtime,
            config.library.max_image_width,
            config.library.max_image_height,
        );

        let mut app = Self {
            config,
            slider,
            browser,
            loader,
            photos: Vec::new(),
            thumbnails: HashMap::new(),
            broken_thumbnails: HashSet::new(),
            preview_texture: None,
            preview_index: None,
            status_message: String::new(),
            is_scanning: false,
            waiting_for_preview: false,
        };
        app.rescan();
        app
    }

    pub fn rescan(&mut self) {
        info!("Scanning photo library {}", self.config.library.dir.display());
        self.is_scanning = true;
        self.status_message = "Loading photos...".to_string();
        self.loader.request_scan(ScanRequest {
            dir: self.config.library.dir.clone(),
            max_items: self.config.library.max_items,
            seed_samples: self.config.library.seed_samples,
        });
    }

    fn open_folder(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.config.library.dir)
            .pick_folder()
        else {
            return;
        };

        self.config.library.dir = dir;
        if let Err(e) = self.config.save() {
            warn!("Could not remember photo folder: {:#}", e);
        }
        self.rescan();
    }

    fn is_loading(&self) -> bool {
        self.is_scanning
            || self.waiting_for_preview
            || self.thumbnails.len() + self.broken_thumbnails.len() < self.photos.len()
    }

    pub fn process_library_events(&mut self, ctx: &egui::Context) {
        for event in self.loader.poll() {
            match event {
                LibraryEvent::Scanned(entries) => {
                    info!("Photo library holds {} photos", entries.len());
                    self.is_scanning = false;
                    self.status_message = if entries.is_empty() {
                        format!("No photos in {}", self.config.library.dir.display())
                    } else {
                        String::new()
                    };
                    self.loader.request_thumbnails(&entries, self.config.library.thumbnail_size);
                    self.replace_photos(entries);

                    let selected = {
                        let mut browser = self.browser.borrow_mut();
                        browser.select_angle(self.slider.value());
                        // the preview is requested below even when the index did not change
                        browser.take_selection_change();
                        browser.selected()
                    };
                    self.show_photo(ctx, selected);
                }
                LibraryEvent::Thumbnail { index, image } => {
                    if index < self.photos.len() {
                        self.insert_thumbnail_texture(ctx, index, &image);
                    }
                }
                LibraryEvent::ThumbnailFailed { index, message } => {
                    warn!("No thumbnail for photo {}: {}", index, message);
                    self.broken_thumbnails.insert(index);
                }
                LibraryEvent::Preview { index, image } => {
                    // a newer selection may have replaced the one this preview was loaded for
                    if self.browser.borrow().selected() == Some(index) {
                        self.update_preview_texture(ctx, &image);
                        self.preview_index = Some(index);
                        self.waiting_for_preview = false;
                        self.status_message.clear();
                    }
                }
                LibraryEvent::PreviewFailed { index, message } => {
                    warn!("Could not show photo {}: {}", index, message);
                    if self.browser.borrow().selected() == Some(index) {
                        self.preview_texture = None;
                        self.preview_index = None;
                        self.waiting_for_preview = false;
                        self.status_message = message;
                    }
                }
                LibraryEvent::Failed(message) => {
                    warn!("Photo library: {}", message);
                    self.status_message = message;
                    self.is_scanning = false;
                    self.replace_photos(Vec::new());
                    self.show_photo(ctx, None);
                }
            }
        }
    }

    fn replace_photos(&mut self, entries: Vec<PhotoEntry>) {
        self.thumbnails.clear();
        self.broken_thumbnails.clear();
        self.preview_texture = None;
        self.preview_index = None;
        self.photos = entries;
        self.browser.borrow_mut().set_photo_count(self.photos.len());
    }

    /// Applies what the browser decided while handling slider events.
    pub fn apply_browser_changes(&mut self, ctx: &egui::Context) {
        let (pending_value, selection_change) = {
            let mut browser = self.browser.borrow_mut();
            (browser.take_pending_value(), browser.take_selection_change())
        };

        if let Some(value) = pending_value {
            self.slider.set_value(value);
            ctx.request_repaint();
        }

        if let Some(selection) = selection_change {
            self.show_photo(ctx, selection);
        }
    }

    fn show_photo(&mut self, ctx: &egui::Context, index: Option<usize>) {
        let Some((index, entry)) = index.and_then(|index| Some((index, self.photos.get(index)?))) else {
            self.preview_texture = None;
            self.preview_index = None;
            self.waiting_for_preview = false;
            return;
        };

        let screen = ctx.screen_rect();
        self.loader.request_preview(
            index,
            entry.path.clone(),
            screen.width().max(1.0) as u32,
            screen.height().max(1.0) as u32,
        );
        self.waiting_for_preview = true;
    }

    fn caption(&self) -> Option<String> {
        let entry = self.preview_index.and_then(|index| self.photos.get(index))?;
        Some(format!(
            "{}  ·  {}",
            entry.file_name(),
            entry.modified.format("%Y-%m-%d %H:%M")
        ))
    }
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.process_library_events(ctx);

        self.render_toolbar(ctx);
        self.render_thumbnail_strip(ctx);
        self.render_viewport(ctx);

        self.apply_browser_changes(ctx);

        // Results from the loader arrive without any input event to wake us up
        if self.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

// ============================================================================
// PANELS
// ============================================================================

impl GalleryApp {
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open folder").clicked() {
                    self.open_folder();
                }
                if ui.add_enabled(!self.is_scanning, egui::Button::new("Reload")).clicked() {
                    self.rescan();
                }

                ui.separator();
                if self.is_loading() {
                    ui.spinner();
                }
                if !self.status_message.is_empty() {
                    ui.label(&self.status_message);
                } else if let Some(caption) = self.caption() {
                    ui.label(caption);
                }
            });
        });
    }

    fn render_thumbnail_strip(&mut self, ctx: &egui::Context) {
        let size = self.config.library.thumbnail_size as f32;
        let (selected, highlighted) = {
            let browser = self.browser.borrow();
            (browser.selected(), browser.highlighted())
        };

        let mut clicked = None;
        egui::TopBottomPanel::bottom("thumbnails")
            .exact_height(size + UI_PADDING * 2.0)
            .show(ctx, |ui| {
                egui::ScrollArea::horizontal().show(ui, |ui| {
                    ui.horizontal_centered(|ui| {
                        for index in 0..self.photos.len() {
                            let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
                            let painter = ui.painter();

                            if let Some(texture) = self.thumbnails.get(&index) {
                                painter.image(
                                    texture.id(),
                                    rect,
                                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                                    egui::Color32::WHITE,
                                );
                            } else {
                                painter.rect_filled(rect, 4.0, egui::Color32::from_gray(60));
                            }

                            if selected == Some(index) {
                                painter.rect_stroke(rect, 4.0, egui::Stroke::new(3.0, SELECTED_OUTLINE));
                            } else if highlighted == Some(index) {
                                painter.rect_stroke(rect, 4.0, egui::Stroke::new(2.0, HIGHLIGHT_OUTLINE));
                            }

                            if response.clicked() {
                                clicked = Some(index);
                            }
                        }
                    });
                });
            });

        if let Some(index) = clicked {
            self.slider.set_value(angle_for_index(index, self.photos.len()));
            self.browser.borrow_mut().select(Some(index));
        }
    }

    fn render_viewport(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| {
                let full_rect = ui.max_rect();

                if let Some(texture) = &self.preview_texture {
                    let cover = cover_rect(texture.size_vec2(), full_rect);
                    ui.painter_at(full_rect).image(
                        texture.id(),
                        cover,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                    // Dim the photo so the track stays readable
                    ui.painter().rect_filled(full_rect, 0.0, egui::Color32::from_black_alpha(90));
                }

                let slider_rect = slider_rect(full_rect, self.config.slider.extent);
                widget::show(ui, &mut self.slider, slider_rect);
            });
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Scales `image_size` to fill `container` completely, centered. Overflow gets clipped by the caller.
fn cover_rect(image_size: egui::Vec2, container: egui::Rect) -> egui::Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return container;
    }
    let scale = (container.width() / image_size.x).max(container.height() / image_size.y);
    egui::Rect::from_center_size(container.center(), image_size * scale)
}

/// Square of side `extent` centered in `container`, shrunk when the container is smaller.
fn slider_rect(container: egui::Rect, extent: f32) -> egui::Rect {
    let side = extent.min(container.width()).min(container.height()).max(0.0);
    egui::Rect::from_center_size(container.center(), egui::vec2(side, side))
}

use chrono::{DateTime, Local};
use image::RgbImage;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::geometry::FULL_TURN;
use crate::image_processor::ImageProcessor;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("photo library not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoEntry {
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

impl PhotoEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Photos in `dir`, newest first, at most `max_items` of them.
pub fn scan(dir: &Path, max_items: usize) -> Result<Vec<PhotoEntry>, LibraryError> {
    if !dir.is_dir() {
        return Err(LibraryError::NotFound(dir.to_path_buf()));
    }

    let io_error = |source: std::io::Error| LibraryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        if !path.is_file() || !ImageProcessor::is_supported(&path) {
            continue;
        }

        let modified = match entry.metadata().and_then(|metadata| metadata.modified()) {
            Ok(time) => time,
            Err(e) => {
                warn!("No modification time for {}: {}", path.display(), e);
                SystemTime::UNIX_EPOCH
            }
        };

        entries.push(PhotoEntry {
            path,
            modified: DateTime::<Local>::from(modified),
        });
    }

    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    entries.truncate(max_items);

    debug!("Found {} photos in {}", entries.len(), dir.display());
    Ok(entries)
}

/// Photo index for a slider angle: `floor(angle / 360 * count)`.
pub fn index_for_angle(angle: f32, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let angle = crate::geometry::normalize_degrees(angle);
    let index = (angle * count as f32 / FULL_TURN).floor() as usize;
    Some(index.min(count - 1))
}

/// Angle in the middle of the slice of the dial that maps to `index`.
pub fn angle_for_index(index: usize, count: usize) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let bucket = FULL_TURN / count as f32;
    (index.min(count - 1) as f32 + 0.5) * bucket
}

// ============================================================================
// BACKGROUND LOADING
// ============================================================================

#[derive(Debug)]
pub enum LibraryEvent {
    Scanned(Vec<PhotoEntry>),
    Thumbnail { index: usize, image: RgbImage },
    ThumbnailFailed { index: usize, message: String },
    Preview { index: usize, image: RgbImage },
    PreviewFailed { index: usize, message: String },
    /// The scan itself failed.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub dir: PathBuf,
    pub max_items: usize,
    pub seed_samples: bool,
}

/// Runs photo decoding on tokio's blocking pool and hands results back to the UI thread.
///
/// Every request is tagged with the scan it belongs to. Results of requests
/// made before the latest `request_scan` are dropped by `poll`.
pub struct LibraryLoader {
    runtime: Handle,
    sender: mpsc::UnboundedSender<(u64, LibraryEvent)>,
    receiver: mpsc::UnboundedReceiver<(u64, LibraryEvent)>,
    max_dimensions: (u32, u32),
    generation: u64,
}

impl LibraryLoader {
    pub fn new(runtime: Handle, max_width: u32, max_height: u32) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            runtime,
            sender,
            receiver,
            max_dimensions: (max_width, max_height),
            generation: 0,
        }
    }

    pub fn request_scan(&mut self, request: ScanRequest) {
        self.generation += 1;
        let generation = self.generation;
        let sender = self.sender.clone();
        self.runtime.spawn_blocking(move || {
            let event = match scan_or_seed(&request) {
                Ok(entries) => LibraryEvent::Scanned(entries),
                Err(e) => LibraryEvent::Failed(format!("{:#}", e)),
            };
            let _ = sender.send((generation, event));
        });
    }

    pub fn request_thumbnails(&self, entries: &[PhotoEntry], size: u32) {
        let sender = self.sender.clone();
        let paths: Vec<PathBuf> = entries.iter().map(|entry| entry.path.clone()).collect();
        let (max_width, max_height) = self.max_dimensions;
        let generation = self.generation;

        self.runtime.spawn_blocking(move || {
            let processor = ImageProcessor::new(max_width, max_height);
            for (index, path) in paths.iter().enumerate() {
                let event = match processor.load_image(path) {
                    Ok(image) => LibraryEvent::Thumbnail {
                        index,
                        image: processor.create_thumbnail(&image, size),
                    },
                    Err(e) => LibraryEvent::ThumbnailFailed {
                        index,
                        message: e.to_string(),
                    },
                };
                // receiver gone means the app is shutting down
                if sender.send((generation, event)).is_err() {
                    break;
                }
            }
        });
    }

    pub fn request_preview(&self, index: usize, path: PathBuf, width: u32, height: u32) {
        let sender = self.sender.clone();
        let (max_width, max_height) = self.max_dimensions;
        let generation = self.generation;

        self.runtime.spawn_blocking(move || {
            let processor = ImageProcessor::new(max_width, max_height);
            let event = match processor.load_image(&path) {
                Ok(image) => LibraryEvent::Preview {
                    index,
                    image: processor.resize_to_fit(&image, width, height),
                },
                Err(e) => LibraryEvent::PreviewFailed {
                    index,
                    message: e.to_string(),
                },
            };
            let _ = sender.send((generation, event));
        });
    }

    /// Everything that finished since the last call for the current scan. Never blocks.
    pub fn poll(&mut self) -> Vec<LibraryEvent> {
        let mut events = Vec::new();
        while let Ok((generation, event)) = self.receiver.try_recv() {
            if generation == self.generation {
                events.push(event);
            } else {
                debug!("Dropping result of an earlier scan");
            }
        }
        events
    }
}

fn scan_or_seed(request: &ScanRequest) -> anyhow::Result<Vec<PhotoEntry>> {
    if request.seed_samples {
        let is_empty = !request.dir.is_dir() || scan(&request.dir, 1)?.is_empty();
        if is_empty {
            info!("Photo library {} is empty, generating samples", request.dir.display());
            ImageProcessor::new(640, 480).create_sample_images(&request.dir, request.max_items)?;
        }
    }
    Ok(scan(&request.dir, request.max_items)?)
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::slider::{SliderColor, SliderStyle};

pub const DEFAULT_CONFIG_FILE: &str = "circular_slider.toml";

/// Environment variable naming the preset used when no config file exists yet.
pub const PRESET_ENV_VAR: &str = "CIRCULAR_SLIDER_PRESET";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub display: DisplayConfig,
    pub slider: SliderConfig,
    pub library: LibraryConfig,
    pub paths: PathConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub initial_value_degrees: f32,
    /// Side of the square the slider is laid out in, track padding included.
    pub extent: f32,
    pub style: SliderStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub dir: PathBuf,
    pub max_items: usize,
    pub thumbnail_size: u32,
    pub max_image_width: u32,
    pub max_image_height: u32,
    /// Fill an empty library with generated photos.
    pub seed_samples: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig {
                width: 1024,
                height: 768,
                fullscreen: false,
            },
            slider: SliderConfig {
                initial_value_degrees: 0.0,
                extent: 360.0,
                style: SliderStyle {
                    track_width: 3.0,
                    handle_size: 50.0,
                    handle_color: SliderColor::rgb(220, 60, 80),
                    track_color: SliderColor::rgb(235, 235, 240),
                    label_color: SliderColor::WHITE,
                },
            },
            library: LibraryConfig {
                dir: PathBuf::from("photos"),
                max_items: 10,
                thumbnail_size: 96,
                max_image_width: 1920,
                max_image_height: 1080,
                seed_samples: true,
            },
            paths: PathConfig {
                config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let preset = std::env::var(PRESET_ENV_VAR).ok();
            log::info!(
                "Config file not found, creating {} configuration",
                preset.as_deref().unwrap_or("default")
            );
            let default_config = Self::from_preset(preset.as_deref())?;
            default_config.save()?;
            Ok(default_config)
        }
    }

    pub fn from_preset(name: Option<&str>) -> Result<Self> {
        match name {
            None | Some("default") => Ok(Self::default()),
            Some("phone") => Self::phone_portrait(),
            Some("desktop") => Self::development_desktop(),
            Some(other) => Err(anyhow::anyhow!(
                "Unknown preset '{}', expected default, phone or desktop",
                other
            )),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&contents).with_context(|| "Failed to parse configuration file")?;

        log::info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_file(&self.paths.config_file)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(anyhow::anyhow!("Invalid display dimensions"));
        }

        let style = &self.slider.style;
        if !style.handle_size.is_finite() || style.handle_size <= 0.0 {
            return Err(anyhow::anyhow!("Invalid handle size: {}", style.handle_size));
        }
        if !style.track_width.is_finite() || style.track_width < 0.0 {
            return Err(anyhow::anyhow!("Invalid track width: {}", style.track_width));
        }
        if !self.slider.initial_value_degrees.is_finite() {
            return Err(anyhow::anyhow!("Initial slider value must be a finite angle"));
        }
        if !self.slider.extent.is_finite() || self.slider.extent <= 2.0 * crate::geometry::TRACK_PADDING {
            return Err(anyhow::anyhow!(
                "Slider extent {} leaves no room for the track",
                self.slider.extent
            ));
        }

        if self.library.max_items == 0 {
            return Err(anyhow::anyhow!("Library must show at least one photo"));
        }
        if self.library.thumbnail_size == 0 {
            return Err(anyhow::anyhow!("Invalid thumbnail size"));
        }
        if self.library.max_image_width == 0 || self.library.max_image_height == 0 {
            return Err(anyhow::anyhow!("Invalid maximum image dimensions"));
        }

        Ok(())
    }
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn display_size(mut self, width: u32, height: u32) -> Self {
        self.config.display.width = width;
        self.config.display.height = height;
        self
    }

    pub fn fullscreen(mut self, enabled: bool) -> Self {
        self.config.display.fullscreen = enabled;
        self
    }

    pub fn slider_extent(mut self, extent: f32) -> Self {
        self.config.slider.extent = extent;
        self
    }

    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.config.library.thumbnail_size = size;
        self
    }

    pub fn seed_samples(mut self, enabled: bool) -> Self {
        self.config.library.seed_samples = enabled;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// Device presets
impl Config {
    pub fn phone_portrait() -> Result<Self> {
        ConfigBuilder::new()
            .display_size(390, 844)
            .fullscreen(true)
            .slider_extent(340.0)
            .thumbnail_size(64)
            .build()
    }

    pub fn development_desktop() -> Result<Self> {
        ConfigBuilder::new()
            .display_size(1280, 800)
            .fullscreen(false)
            .slider_extent(420.0)
            .seed_samples(true)
            .build()
    }
}

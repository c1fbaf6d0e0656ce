use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::FontSize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub width: f64,
    pub height: f64,
    /// Pixel size of a 1em glyph.
    pub base_font_px: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 984.0,
            height: 554.0,
            base_font_px: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_top_display_ms")]
    pub top_display_ms: u64,
    #[serde(default = "default_top_resume_ms")]
    pub top_resume_ms: u64,
    /// Height of one top lane and of one move band.
    #[serde(default = "default_row_height")]
    pub row_height: f64,
    /// Extra pixels added to every travel distance.
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Seconds of travel per pixel.
    #[serde(default = "default_transition_rate")]
    pub transition_rate: f64,
    #[serde(default = "default_true")]
    pub bullet_screen_enabled: bool,
    #[serde(default)]
    pub autoplay: bool,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_top_display_ms() -> u64 {
    3000
}

fn default_top_resume_ms() -> u64 {
    1000
}

fn default_row_height() -> f64 {
    37.0
}

fn default_spacing() -> f64 {
    10.0
}

fn default_transition_rate() -> f64 {
    5.0 / 984.0
}

fn default_true() -> bool {
    true
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            poll_interval_ms: default_poll_interval_ms(),
            top_display_ms: default_top_display_ms(),
            top_resume_ms: default_top_resume_ms(),
            row_height: default_row_height(),
            spacing: default_spacing(),
            transition_rate: default_transition_rate(),
            bullet_screen_enabled: true,
            autoplay: false,
        }
    }
}

impl OverlayConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file at {}: {}", config_path.display(), e))?;

            match serde_json::from_str::<Self>(&content) {
                Ok(config) => {
                    log::info!("Loaded existing config from {}", config_path.display());
                    Ok(config)
                }
                Err(e) => {
                    log::warn!("Config file exists but has issues ({}), rewriting it with defaults", e);
                    let new_config = Self::default();
                    new_config.save_to(config_path)
                        .map_err(|save_err| anyhow::anyhow!("Failed to save new config: {}", save_err))?;
                    Ok(new_config)
                }
            }
        } else {
            log::info!("No config file found, creating default config");
            let config = Self::default();
            config.save_to(config_path)
                .map_err(|e| anyhow::anyhow!("Failed to save default config: {}", e))?;
            log::info!("Created new config file at {}", config_path.display());
            Ok(config)
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("danmaku-overlay")
            .join("config.json")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn top_display(&self) -> Duration {
        Duration::from_millis(self.top_display_ms)
    }

    pub fn top_resume(&self) -> Duration {
        Duration::from_millis(self.top_resume_ms)
    }

    pub fn font_px(&self, font_size: FontSize) -> f64 {
        self.surface.base_font_px * font_size.em()
    }

    /// Wall-clock time needed to travel `distance` pixels.
    pub fn travel_duration(&self, distance: f64) -> Duration {
        Duration::from_secs_f64((distance * self.transition_rate).max(0.0))
    }

    pub fn band_count(&self) -> usize {
        if self.row_height <= 0.0 {
            return 1;
        }
        ((self.surface.height / self.row_height).floor() as usize).max(1)
    }
}

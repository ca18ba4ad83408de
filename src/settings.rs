//! Host preferences
//!
//! Persisted separately from scores through the same key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_MS;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// When to show on-screen touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TouchControls {
    /// Show on touch-capable devices only
    #[default]
    Auto,
    Always,
    Never,
}

impl TouchControls {
    /// Resolve against what the device reports
    pub fn visible(&self, touch_device: bool) -> bool {
        match self {
            TouchControls::Auto => touch_device,
            TouchControls::Always => true,
            TouchControls::Never => false,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub touch_controls: TouchControls,
    /// Longest wall-clock gap simulated in one host callback (ms)
    pub max_frame_ms: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            touch_controls: TouchControls::Auto,
            max_frame_ms: MAX_FRAME_MS,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "poppies_settings";

    /// Frame cap with nonsense values replaced by the default
    pub fn frame_cap_ms(&self) -> f64 {
        if self.max_frame_ms.is_finite() && self.max_frame_ms > 0.0 {
            self.max_frame_ms
        } else {
            MAX_FRAME_MS
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

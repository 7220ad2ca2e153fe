//! Game settings and preferences
//!
//! Persisted in LocalStorage so menu choices survive a reload.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SEGMENT_COUNT;
use crate::sim::ObstacleToggles;

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Obstacle kinds eligible for course generation
    pub toggles: ObstacleToggles,
    /// Show the keyboard-control helper overlay
    pub show_helpers: bool,
    /// Number of intermediate course segments
    pub segment_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            toggles: ObstacleToggles::default(),
            show_helpers: false,
            segment_count: DEFAULT_SEGMENT_COUNT,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "marble_run_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    if settings.toggles.enabled_count() > 0 && settings.segment_count > 0 {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

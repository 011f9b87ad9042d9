//! Player preferences
//!
//! Only volume and mute are persisted, each under its own LocalStorage key
//! as a JSON scalar.

use serde::{Deserialize, Serialize};

/// Volume/mute preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Silence all audio
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            muted: false,
        }
    }
}

impl Settings {
    /// LocalStorage key for the volume
    pub const VOLUME_KEY: &'static str = "playroom.volume";
    /// LocalStorage key for the mute flag
    pub const MUTED_KEY: &'static str = "playroom.muted";

    /// Parse the stored values. Missing or unusable values keep their default.
    pub fn from_stored(volume: Option<&str>, muted: Option<&str>) -> Self {
        let mut settings = Self::default();
        if let Some(raw) = volume {
            match serde_json::from_str::<f32>(raw) {
                Ok(v) if v.is_finite() => settings.volume = v.clamp(0.0, 1.0),
                _ => log::warn!("Ignoring stored volume {:?}", raw),
            }
        }
        if let Some(raw) = muted {
            match serde_json::from_str::<bool>(raw) {
                Ok(m) => settings.muted = m,
                Err(_) => log::warn!("Ignoring stored mute flag {:?}", raw),
            }
        }
        settings
    }

    /// Values to store under [`Self::VOLUME_KEY`] and [`Self::MUTED_KEY`]
    pub fn to_stored(&self) -> (String, String) {
        (
            serde_json::to_string(&self.volume.clamp(0.0, 1.0)).unwrap_or_default(),
            serde_json::to_string(&self.muted).unwrap_or_default(),
        )
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::info!("Using default settings");
            return Self::default();
        };

        let volume = storage.get_item(Self::VOLUME_KEY).ok().flatten();
        let muted = storage.get_item(Self::MUTED_KEY).ok().flatten();
        log::info!("Loaded settings from LocalStorage");
        Self::from_stored(volume.as_deref(), muted.as_deref())
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let (volume, muted) = self.to_stored();
            let _ = storage.set_item(Self::VOLUME_KEY, &volume);
            let _ = storage.set_item(Self::MUTED_KEY, &muted);
            log::info!("Settings saved");
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

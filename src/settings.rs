use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and session arguments passed to the game process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: String,
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
}

impl PlayerProfile {
    /// Offline-mode profile: random UUID, placeholder token.
    pub fn offline(username: &str) -> Self {
        let username = username.trim();
        Self {
            username: if username.is_empty() { "Player" } else { username }.to_string(),
            uuid: Uuid::new_v4().to_string(),
            access_token: "0".into(),
            user_type: "offline".into(),
        }
    }
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self::offline("Player")
    }
}

/// Per-launch runtime configuration, persisted as `settings.json` under the
/// data root. A missing or unreadable file falls back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pub max_heap_mb: u32,
    pub java_path: PathBuf,
    pub fullscreen: bool,
    pub player: PlayerProfile,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_heap_mb: 2048,
            java_path: PathBuf::from("java"),
            fullscreen: false,
            player: PlayerProfile::default(),
        }
    }
}

impl RuntimeSettings {
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

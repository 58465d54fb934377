//! On-disk artifact tree.
//!
//! ```text
//! <root>/
//!   versions/<id>/<id>.jar     — primary artifact
//!   versions/<id>/<id>.json    — persisted descriptor
//!   versions/<id>/natives/     — extracted/native libraries for one version
//!   libraries/<maven-path>     — shared dependency artifacts
//!   assets/{indexes,objects}/  — content-addressed asset store
//!   logs/
//! ```

use std::path::{Path, PathBuf};

use crate::error::{LauncherError, LauncherResult};

const APP_DIR_NAME: &str = "ignition";

/// Path arithmetic for the launcher data directory. Cheap to clone; owns no
/// open handles.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn version_jar(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.jar"))
    }

    pub fn version_json(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.json"))
    }

    pub fn natives_dir(&self, id: &str) -> PathBuf {
        self.version_dir(id).join("natives")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    pub fn library_path(&self, relative: &str) -> PathBuf {
        self.libraries_dir().join(relative)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Create the directory skeleton. Idempotent.
    pub async fn ensure_tree(&self) -> LauncherResult<()> {
        for dir in [
            self.versions_dir(),
            self.libraries_dir(),
            self.assets_dir(),
            self.logs_dir(),
        ] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| LauncherError::Io {
                    path: dir.clone(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// A version counts as installed when both its jar and its persisted
    /// descriptor are present.
    pub fn is_version_installed(&self, id: &str) -> bool {
        self.version_jar(id).exists() && self.version_json(id).exists()
    }

    /// Installed version ids, reverse lexicographic so newer releases tend
    /// to sort first.
    pub fn installed_versions(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.versions_dir()) else {
            return Vec::new();
        };

        let mut ids: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|id| self.is_version_installed(id))
            .collect();
        ids.sort_by(|a, b| b.cmp(a));
        ids
    }
}

/// Default data root, e.g. `~/.local/share/ignition` on Linux.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_shapes() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.version_jar("1.20.4"), PathBuf::from("/data/versions/1.20.4/1.20.4.jar"));
        assert_eq!(layout.version_json("1.20.4"), PathBuf::from("/data/versions/1.20.4/1.20.4.json"));
        assert_eq!(
            layout.library_path("org/lwjgl/lwjgl/3.3.2/lwjgl-3.3.2.jar"),
            PathBuf::from("/data/libraries/org/lwjgl/lwjgl/3.3.2/lwjgl-3.3.2.jar")
        );
        assert_eq!(layout.natives_dir("1.20.4"), PathBuf::from("/data/versions/1.20.4/natives"));
    }

    #[tokio::test]
    async fn ensure_tree_and_installed_listing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        layout.ensure_tree().await.unwrap();
        assert!(layout.libraries_dir().is_dir());
        assert!(layout.assets_dir().is_dir());

        assert!(layout.installed_versions().is_empty());

        // jar alone is not "installed"
        tokio::fs::create_dir_all(layout.version_dir("1.20.4")).await.unwrap();
        tokio::fs::write(layout.version_jar("1.20.4"), b"jar").await.unwrap();
        assert!(!layout.is_version_installed("1.20.4"));

        tokio::fs::write(layout.version_json("1.20.4"), b"{}").await.unwrap();
        assert!(layout.is_version_installed("1.20.4"));
        assert_eq!(layout.installed_versions(), vec!["1.20.4".to_string()]);
    }
}

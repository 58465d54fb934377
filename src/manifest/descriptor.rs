use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{LauncherError, LauncherResult};
use crate::rules::{self, Platform, Rule};

/// A fully parsed per-version descriptor. Owned by the manifest client's
/// cache and shared read-only; treated as immutable once fetched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub id: String,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub downloads: Option<DescriptorDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub major_version: u32,
}

#[derive(Debug, Deserialize)]
pub struct DescriptorDownloads {
    pub client: Option<DownloadSpec>,
    #[serde(default)]
    pub server: Option<DownloadSpec>,
}

/// One downloadable artifact. The checksum is the authoritative identity
/// for cache validity, never the URL or a timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSpec {
    pub url: String,
    pub sha1: String,
    pub size: u64,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    /// Platform name → classifier key (may contain `${arch}`).
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<DownloadSpec>,
    #[serde(default)]
    pub classifiers: Option<HashMap<String, DownloadSpec>>,
}

impl LibraryEntry {
    /// Whether this library applies on `platform` (see [`rules::evaluate`]).
    pub fn applies_on(&self, platform: Platform) -> bool {
        match &self.rules {
            None => true,
            Some(rules) => rules::evaluate(rules, platform),
        }
    }

    /// Native artifact for `platform`, if this entry carries one.
    pub fn native_artifact_for(&self, platform: Platform) -> Option<&DownloadSpec> {
        let classifier_key = self.natives.as_ref()?.get(platform.wire_name())?;
        let arch = if cfg!(target_arch = "x86") { "32" } else { "64" };
        let classifier = classifier_key.replace("${arch}", arch);
        self.downloads.as_ref()?.classifiers.as_ref()?.get(&classifier)
    }
}

impl VersionDescriptor {
    /// The primary executable artifact. Required for every launchable version.
    pub fn primary(&self) -> LauncherResult<&DownloadSpec> {
        self.downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .ok_or(LauncherError::MissingDescriptorField {
                version: self.id.clone(),
                field: "downloads.client",
            })
    }

    /// Fail fast on malformed or incomplete descriptors before any download.
    pub fn validate(&self) -> LauncherResult<()> {
        if self.main_class.as_deref().unwrap_or("").trim().is_empty() {
            return Err(LauncherError::MissingDescriptorField {
                version: self.id.clone(),
                field: "mainClass",
            });
        }
        self.primary()?;
        Ok(())
    }

    pub fn required_java_major(&self) -> u32 {
        self.java_version.as_ref().map(|j| j.major_version).unwrap_or(17)
    }
}

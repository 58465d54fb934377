//! Dependency search path construction.
//!
//! The primary jar comes first, then every applicable library in descriptor
//! declaration order. The platform separator is applied once at the end.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::{LauncherError, LauncherResult};
use crate::layout::DataLayout;
use crate::manifest::VersionDescriptor;
use crate::rules::Platform;

/// Lossy-but-stable path rendering for process arguments.
pub fn safe_path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Build the search path string for `descriptor` on `platform`.
///
/// Every entry is existence-checked even when acquisition reported
/// success: a file missing underneath us (external cache eviction, manual
/// deletion) must fail here, not inside the spawned process.
pub fn build_classpath(
    descriptor: &VersionDescriptor,
    layout: &DataLayout,
    platform: Platform,
) -> LauncherResult<String> {
    let mut entries: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    let jar = layout.version_jar(&descriptor.id);
    if !jar.exists() {
        return Err(LauncherError::UnresolvedLibrary(format!(
            "{} (client jar)",
            descriptor.id
        )));
    }
    entries.push(safe_path_str(&jar));

    for library in &descriptor.libraries {
        if !library.applies_on(platform) {
            debug!("excluded from search path (platform rule): {}", library.name);
            continue;
        }

        let Some(artifact) = library.downloads.as_ref().and_then(|d| d.artifact.as_ref()) else {
            // Natives-only entries contribute to java.library.path, not here.
            continue;
        };
        let Some(relative) = artifact.path.as_deref() else {
            continue;
        };

        let full = layout.library_path(relative);
        if !full.exists() {
            return Err(LauncherError::UnresolvedLibrary(library.name.clone()));
        }
        // Same artifact referenced by several entries appears once.
        if seen.insert(full.clone()) {
            entries.push(safe_path_str(&full));
        }
    }

    Ok(entries.join(platform.classpath_separator()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn descriptor_with_libs(libs: serde_json::Value) -> VersionDescriptor {
        serde_json::from_value(serde_json::json!({
            "id": "1.20.4",
            "mainClass": "net.minecraft.client.main.Main",
            "downloads": {
                "client": {"url": "https://example.com/c.jar", "sha1": "ab", "size": 1}
            },
            "libraries": libs
        }))
        .unwrap()
    }

    fn lib(name: &str, path: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "downloads": {
                "artifact": {"url": "https://example.com/x.jar", "sha1": "cd", "size": 1, "path": path}
            }
        })
    }

    async fn materialize(layout: &DataLayout, descriptor: &VersionDescriptor) {
        let jar = layout.version_jar(&descriptor.id);
        tokio::fs::create_dir_all(jar.parent().unwrap()).await.unwrap();
        tokio::fs::write(&jar, b"jar").await.unwrap();
        for library in &descriptor.libraries {
            if let Some(path) = library
                .downloads
                .as_ref()
                .and_then(|d| d.artifact.as_ref())
                .and_then(|a| a.path.as_deref())
            {
                let full = layout.library_path(path);
                tokio::fs::create_dir_all(full.parent().unwrap()).await.unwrap();
                tokio::fs::write(&full, b"lib").await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn order_follows_declaration_with_primary_first() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let descriptor = descriptor_with_libs(serde_json::json!([
            lib("b:b:1", "b/b-1.jar"),
            lib("a:a:1", "a/a-1.jar"),
        ]));
        materialize(&layout, &descriptor).await;

        let platform = Platform::current();
        let classpath = build_classpath(&descriptor, &layout, platform).unwrap();
        let parts: Vec<&str> = classpath.split(platform.classpath_separator()).collect();

        assert_eq!(parts.len(), 3);
        assert!(parts[0].ends_with("1.20.4.jar"));
        assert!(parts[1].ends_with("b-1.jar"));
        assert!(parts[2].ends_with("a-1.jar"));
    }

    #[tokio::test]
    async fn duplicate_paths_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let descriptor = descriptor_with_libs(serde_json::json!([
            lib("a:a:1", "a/a-1.jar"),
            lib("a-again:a:1", "a/a-1.jar"),
        ]));
        materialize(&layout, &descriptor).await;

        let platform = Platform::current();
        let classpath = build_classpath(&descriptor, &layout, platform).unwrap();
        assert_eq!(classpath.split(platform.classpath_separator()).count(), 2);
    }

    #[tokio::test]
    async fn platform_excluded_library_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let other = match Platform::current() {
            Platform::Windows => "linux",
            _ => "windows",
        };
        let mut excluded = lib("only-elsewhere:x:1", "x/x-1.jar");
        excluded["rules"] = serde_json::json!([{"action": "allow", "os": {"name": other}}]);
        let descriptor = descriptor_with_libs(serde_json::json!([
            lib("a:a:1", "a/a-1.jar"),
            excluded,
        ]));
        materialize(&layout, &descriptor).await;

        let classpath = build_classpath(&descriptor, &layout, Platform::current()).unwrap();
        assert!(!classpath.contains("x-1.jar"));
        assert!(classpath.contains("a-1.jar"));
    }

    #[tokio::test]
    async fn missing_library_file_is_an_error_even_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let descriptor = descriptor_with_libs(serde_json::json!([lib("a:a:1", "a/a-1.jar")]));

        // Only the jar exists, the library file does not.
        let jar = layout.version_jar(&descriptor.id);
        tokio::fs::create_dir_all(jar.parent().unwrap()).await.unwrap();
        tokio::fs::write(&jar, b"jar").await.unwrap();

        let err = build_classpath(&descriptor, &layout, Platform::current()).unwrap_err();
        assert!(matches!(err, LauncherError::UnresolvedLibrary(name) if name == "a:a:1"));
    }

    #[test]
    fn missing_client_jar_is_an_error() {
        let layout = DataLayout::new(PathBuf::from("/nonexistent-root"));
        let descriptor = descriptor_with_libs(serde_json::json!([]));
        assert!(matches!(
            build_classpath(&descriptor, &layout, Platform::current()),
            Err(LauncherError::UnresolvedLibrary(_))
        ));
    }
}

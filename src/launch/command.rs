//! Launch invocation assembly.
//!
//! Builds the full argument list for the game process from a resolved
//! descriptor and the runtime settings. A [`LaunchSpec`] is ephemeral,
//! derived fresh per launch and never persisted.

use std::path::PathBuf;

use crate::error::{LauncherError, LauncherResult};
use crate::layout::DataLayout;
use crate::manifest::VersionDescriptor;
use crate::rules::Platform;
use crate::settings::RuntimeSettings;

use super::classpath::{build_classpath, safe_path_str};

/// Everything needed to spawn the game process.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub java_path: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

/// JVM tuning defaults applied to every launch.
const TUNING_FLAGS: [&str; 6] = [
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+UseG1GC",
    "-XX:G1NewSizePercent=20",
    "-XX:G1ReservePercent=20",
    "-XX:MaxGCPauseMillis=50",
    "-XX:G1HeapRegionSize=32M",
];

/// Build the launch invocation for `descriptor`.
///
/// Argument order is a contract consumed by the game and by tooling that
/// parses launcher command lines:
/// memory bound, tuning flags, native library path, `-cp` + search path,
/// main class, then identity/session arguments.
pub fn build_launch_spec(
    descriptor: &VersionDescriptor,
    layout: &DataLayout,
    settings: &RuntimeSettings,
) -> LauncherResult<LaunchSpec> {
    let main_class = descriptor
        .main_class
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| LauncherError::MissingMainClass(descriptor.id.clone()))?;

    let platform = Platform::current();
    let classpath = build_classpath(descriptor, layout, platform)?;

    let natives_dir = layout.natives_dir(&descriptor.id);
    let assets_dir = layout.assets_dir();

    let mut args: Vec<String> = Vec::new();
    args.push(format!("-Xmx{}M", settings.max_heap_mb));
    args.extend(TUNING_FLAGS.iter().map(|f| f.to_string()));
    args.push(format!("-Djava.library.path={}", safe_path_str(&natives_dir)));
    args.push("-cp".into());
    args.push(classpath);
    args.push(main_class.to_string());

    let player = &settings.player;
    args.push("--username".into());
    args.push(player.username.clone());
    args.push("--version".into());
    args.push(descriptor.id.clone());
    args.push("--gameDir".into());
    args.push(safe_path_str(layout.root()));
    args.push("--assetsDir".into());
    args.push(safe_path_str(&assets_dir));
    args.push("--uuid".into());
    args.push(player.uuid.clone());
    args.push("--accessToken".into());
    args.push(player.access_token.clone());
    args.push("--userType".into());
    args.push(player.user_type.clone());

    if settings.fullscreen {
        args.push("--fullscreen".into());
    }

    Ok(LaunchSpec {
        java_path: settings.java_path.clone(),
        args,
        working_dir: layout.root().to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlayerProfile;

    fn installed_descriptor(dir: &std::path::Path) -> (VersionDescriptor, DataLayout) {
        let descriptor: VersionDescriptor = serde_json::from_value(serde_json::json!({
            "id": "1.20.4",
            "mainClass": "net.minecraft.client.main.Main",
            "downloads": {
                "client": {"url": "https://example.com/c.jar", "sha1": "ab", "size": 1}
            },
            "libraries": []
        }))
        .unwrap();

        let layout = DataLayout::new(dir);
        let jar = layout.version_jar("1.20.4");
        std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
        std::fs::write(&jar, b"jar").unwrap();
        (descriptor, layout)
    }

    fn test_settings() -> RuntimeSettings {
        RuntimeSettings {
            max_heap_mb: 4096,
            java_path: PathBuf::from("/usr/bin/java"),
            fullscreen: false,
            player: PlayerProfile {
                username: "Alex".into(),
                uuid: "11111111-2222-3333-4444-555555555555".into(),
                access_token: "token".into(),
                user_type: "offline".into(),
            },
        }
    }

    #[test]
    fn argument_order_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let (descriptor, layout) = installed_descriptor(dir.path());
        let spec = build_launch_spec(&descriptor, &layout, &test_settings()).unwrap();

        assert_eq!(spec.java_path, PathBuf::from("/usr/bin/java"));
        assert_eq!(spec.working_dir, layout.root());

        let args = &spec.args;
        assert_eq!(args[0], "-Xmx4096M");
        assert_eq!(args[1], "-XX:+UnlockExperimentalVMOptions");
        assert_eq!(args[6], "-XX:G1HeapRegionSize=32M");
        assert!(args[7].starts_with("-Djava.library.path="));
        assert_eq!(args[8], "-cp");
        assert!(args[9].ends_with("1.20.4.jar"));
        assert_eq!(args[10], "net.minecraft.client.main.Main");

        let game_dir = safe_path_str(layout.root());
        let assets_dir = safe_path_str(&layout.assets_dir());
        let tail: Vec<&str> = args[11..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "--username",
                "Alex",
                "--version",
                "1.20.4",
                "--gameDir",
                game_dir.as_str(),
                "--assetsDir",
                assets_dir.as_str(),
                "--uuid",
                "11111111-2222-3333-4444-555555555555",
                "--accessToken",
                "token",
                "--userType",
                "offline",
            ]
        );
    }

    #[test]
    fn fullscreen_flag_is_last_and_optional() {
        let dir = tempfile::tempdir().unwrap();
        let (descriptor, layout) = installed_descriptor(dir.path());

        let mut settings = test_settings();
        let without = build_launch_spec(&descriptor, &layout, &settings).unwrap();
        assert!(!without.args.contains(&"--fullscreen".to_string()));

        settings.fullscreen = true;
        let with = build_launch_spec(&descriptor, &layout, &settings).unwrap();
        assert_eq!(with.args.last().map(String::as_str), Some("--fullscreen"));
    }

    #[test]
    fn missing_main_class_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (mut descriptor, layout) = installed_descriptor(dir.path());
        descriptor.main_class = Some("   ".into());

        assert!(matches!(
            build_launch_spec(&descriptor, &layout, &test_settings()),
            Err(LauncherError::MissingMainClass(id)) if id == "1.20.4"
        ));
    }
}

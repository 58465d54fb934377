// ─── ignition ───
// Artifact acquisition and launch pipeline for a Minecraft-compatible
// launcher backend.
//
// Architecture:
//   manifest/  — version index + per-version descriptors, cache-backed
//   rules      — platform-conditional inclusion (pure evaluation)
//   fetcher    — single-artifact download, SHA-1 verified, atomic rename
//   assets     — asset index resolution and download planning
//   acquire/   — deduplicated, concurrent acquisition orchestration
//   launch/    — search path + argument assembly, process supervision
//   cache      — content cache collaborator (memory + disk tiers)
//   layout     — on-disk artifact tree
//   settings   — runtime settings + player profile persistence

pub mod acquire;
pub mod assets;
pub mod cache;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod launch;
pub mod layout;
pub mod manifest;
pub mod rules;
pub mod settings;

pub use acquire::{AcquisitionHandle, AcquisitionProgress, AcquisitionService, AcquisitionState};
pub use error::{LauncherError, LauncherResult};
pub use fetcher::{ArtifactFetcher, DownloadRequest, FetchOutcome};
pub use launch::{build_launch_spec, launch, LaunchSpec, ProcessHandle};
pub use layout::DataLayout;
pub use manifest::{ManifestClient, VersionDescriptor, VersionIndex};
pub use rules::Platform;
pub use settings::{PlayerProfile, RuntimeSettings};

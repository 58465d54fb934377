//! Remote version manifest: index of published versions plus per-version
//! descriptors, fetched through the content cache collaborator.

mod client;
mod descriptor;
mod index;

pub use client::ManifestClient;
pub use descriptor::{
    AssetIndexRef, DescriptorDownloads, DownloadSpec, JavaVersionInfo, LibraryDownloads,
    LibraryEntry, VersionDescriptor,
};
pub use index::{LatestPointers, VersionIndex, VersionKind, VersionRef};

// src/core/gallery/snapshot.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

use super::types::{Gallery, IdentityRecord};
use super::GalleryError;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct GallerySnapshot {
    version: u32,
    dimension: usize,
    built_at: DateTime<Utc>,
    identities: Vec<IdentityRecord>,
}

/// Reads a persisted gallery. A missing file is `Ok(None)`.
pub async fn read_snapshot(path: &Path) -> Result<Option<Gallery>, GalleryError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let snapshot: GallerySnapshot = serde_json::from_slice(&raw)
        .map_err(|e| GalleryError::Build(format!("malformed snapshot {:?}: {}", path, e)))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(GalleryError::Build(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    if snapshot.identities.is_empty() {
        return Err(GalleryError::Build("snapshot contains no identities".into()));
    }

    if let Some(record) = snapshot
        .identities
        .iter()
        .find(|r| r.feature_vector.len() != snapshot.dimension)
    {
        return Err(GalleryError::Dimension {
            identity_id: record.identity_id.clone(),
            expected: snapshot.dimension,
            actual: record.feature_vector.len(),
        });
    }

    Gallery::from_records(snapshot.identities, snapshot.built_at).map(Some)
}

/// Persists `gallery` by writing a sibling temp file and renaming it over `path`.
pub async fn write_snapshot(path: &Path, gallery: &Gallery) -> Result<(), GalleryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let snapshot = GallerySnapshot {
        version: SNAPSHOT_VERSION,
        dimension: gallery.dimension(),
        built_at: gallery.built_at(),
        identities: gallery.records().to_vec(),
    };
    let serialized = serde_json::to_vec_pretty(&snapshot)
        .map_err(|e| GalleryError::Build(format!("failed to serialize snapshot: {}", e)))?;

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, serialized).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

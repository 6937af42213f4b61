// src/core/recognition/enrollment.rs
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::gallery::GalleryError;

/// Where an enrolled identity's features come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// A precomputed feature vector.
    Vector(Vec<f32>),
    /// A reference photo that still has to be analysed.
    Image(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub identity_id: String,
    pub name: String,
    pub reference: Reference,
}

#[async_trait]
pub trait EnrollmentSource: Send + Sync {
    async fn enrollments(&self) -> Result<Vec<Enrollment>, GalleryError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestId {
    Text(String),
    Number(i64),
}

impl ManifestId {
    fn into_string(self) -> String {
        match self {
            ManifestId::Text(id) => id,
            ManifestId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    identity_id: ManifestId,
    name: String,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

/// Reads enrollments from a JSON manifest:
/// `[{ "identity_id": 1, "name": "...", "photo": "ana.jpg" }, ...]`.
///
/// A `vector` takes precedence over a `photo`. Photo paths are relative to
/// `photos_dir`. Entries with neither are skipped.
pub struct ManifestEnrollmentSource {
    manifest_path: PathBuf,
    photos_dir: PathBuf,
}

impl ManifestEnrollmentSource {
    pub fn new(manifest_path: impl Into<PathBuf>, photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            photos_dir: photos_dir.into(),
        }
    }
}

#[async_trait]
impl EnrollmentSource for ManifestEnrollmentSource {
    async fn enrollments(&self) -> Result<Vec<Enrollment>, GalleryError> {
        let raw = tokio::fs::read(&self.manifest_path).await.map_err(|e| {
            GalleryError::Enrollment(format!("cannot read manifest {:?}: {}", self.manifest_path, e))
        })?;
        let entries: Vec<ManifestEntry> = serde_json::from_slice(&raw).map_err(|e| {
            GalleryError::Enrollment(format!("malformed manifest {:?}: {}", self.manifest_path, e))
        })?;

        let mut enrollments = Vec::with_capacity(entries.len());
        for entry in entries {
            let identity_id = entry.identity_id.into_string();
            let reference = match (entry.vector, entry.photo) {
                (Some(vector), _) => Reference::Vector(vector),
                (None, Some(photo)) => Reference::Image(self.photos_dir.join(photo)),
                (None, None) => {
                    warn!("Enrollment {} has neither photo nor vector, skipping", identity_id);
                    continue;
                }
            };
            enrollments.push(Enrollment {
                identity_id,
                name: entry.name,
                reference,
            });
        }

        info!("Read {} enrollments from {:?}", enrollments.len(), self.manifest_path);
        Ok(enrollments)
    }
}

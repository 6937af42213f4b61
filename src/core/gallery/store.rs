use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::snapshot::{read_snapshot, write_snapshot};
use super::types::{Gallery, IdentityRecord};
use super::GalleryError;

/// Holds the current gallery snapshot and swaps in rebuilt ones.
///
/// The lock only guards the `Arc` pointer: readers clone it and match against
/// their own snapshot, so a rebuild in progress never blocks them and they
/// never see a half-built gallery.
pub struct GalleryStore {
    current: RwLock<Arc<Gallery>>,
    snapshot_path: PathBuf,
    rebuild_lock: Mutex<()>,
}

impl GalleryStore {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Gallery::empty())),
            snapshot_path: snapshot_path.into(),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Loads the persisted snapshot and makes it current. Returns `None` when
    /// no snapshot exists yet.
    pub async fn load(&self) -> Result<Option<Arc<Gallery>>, GalleryError> {
        match read_snapshot(&self.snapshot_path).await? {
            Some(gallery) => {
                let gallery = Arc::new(gallery);
                *self.current.write() = gallery.clone();
                info!(
                    "Loaded gallery snapshot: {} identities ({} dimensions)",
                    gallery.len(),
                    gallery.dimension()
                );
                Ok(Some(gallery))
            }
            None => {
                warn!("Gallery snapshot not found: {:?}", self.snapshot_path);
                Ok(None)
            }
        }
    }

    /// Builds a new gallery from `source_identities`, persists it and swaps it
    /// in. Unusable entries are skipped; if none remain the rebuild is
    /// rejected and the current gallery stays active.
    pub async fn rebuild(&self, source_identities: Vec<IdentityRecord>) -> Result<Arc<Gallery>, GalleryError> {
        let _guard = self.rebuild_lock.lock().await;

        let offered = source_identities.len();
        let usable = select_usable(source_identities);
        if usable.is_empty() {
            warn!("Gallery rebuild rejected: none of {} identities were usable", offered);
            return Err(GalleryError::Build(format!(
                "no usable feature vectors among {} identities",
                offered
            )));
        }

        let gallery = Gallery::from_records(usable, Utc::now())?;
        write_snapshot(&self.snapshot_path, &gallery).await?;

        let gallery = Arc::new(gallery);
        *self.current.write() = gallery.clone();

        info!("Gallery rebuilt: {} of {} identities", gallery.len(), offered);
        Ok(gallery)
    }

    pub fn current(&self) -> Arc<Gallery> {
        self.current.read().clone()
    }
}

// Keeps the first usable record per id whose dimension is the one most
// records share. Ties go to the dimension seen first.
fn select_usable(source: Vec<IdentityRecord>) -> Vec<IdentityRecord> {
    let Some(dimension) = majority_dimension(&source) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut usable = Vec::with_capacity(source.len());

    for record in source {
        if !record.has_usable_vector() {
            warn!("Skipping {}: empty or non-finite feature vector", record.identity_id);
            continue;
        }

        let len = record.feature_vector.len();
        if len != dimension {
            error!(
                "Skipping {}: {} dimensions, gallery uses {}",
                record.identity_id, len, dimension
            );
            continue;
        }

        if !seen.insert(record.identity_id.clone()) {
            warn!("Skipping duplicate identity {}", record.identity_id);
            continue;
        }
        usable.push(record);
    }

    usable
}

fn majority_dimension(source: &[IdentityRecord]) -> Option<usize> {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for record in source.iter().filter(|r| r.has_usable_vector()) {
        let len = record.feature_vector.len();
        match counts.iter_mut().find(|(dimension, _)| *dimension == len) {
            Some((_, count)) => *count += 1,
            None => counts.push((len, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(usize, usize)>, (dimension, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((dimension, count)),
        })
        .map(|(dimension, _)| dimension)
}

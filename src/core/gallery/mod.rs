// src/core/gallery/mod.rs
mod snapshot;
mod store;
mod types;

use thiserror::Error;

pub use snapshot::SNAPSHOT_VERSION;
pub use store::GalleryStore;
pub use types::{Gallery, IdentityRecord};

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Gallery build rejected: {0}")]
    Build(String),

    #[error("Dimension mismatch for identity {identity_id}: expected {expected}, got {actual}")]
    Dimension {
        identity_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Enrollment source error: {0}")]
    Enrollment(String),

    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
}

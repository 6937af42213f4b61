// src/core/gallery/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::GalleryError;

/// A known identity and its reference feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub identity_id: String,
    pub display_name: String,
    pub feature_vector: Vec<f32>,
}

impl IdentityRecord {
    pub fn new(identity_id: impl Into<String>, display_name: impl Into<String>, feature_vector: Vec<f32>) -> Self {
        Self {
            identity_id: identity_id.into(),
            display_name: display_name.into(),
            feature_vector,
        }
    }

    pub(crate) fn has_usable_vector(&self) -> bool {
        !self.feature_vector.is_empty() && self.feature_vector.iter().all(|v| v.is_finite())
    }
}

/// Immutable snapshot of the known identities.
///
/// Iteration order is the order in which records were accepted; the matcher
/// relies on it to break distance ties.
#[derive(Debug, Clone)]
pub struct Gallery {
    records: Vec<IdentityRecord>,
    dimension: usize,
    built_at: DateTime<Utc>,
}

impl Gallery {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            dimension: 0,
            built_at: Utc::now(),
        }
    }

    /// Validates and wraps `records`. Rejects duplicate ids, unusable vectors
    /// and inconsistent dimensions.
    pub fn from_records(records: Vec<IdentityRecord>, built_at: DateTime<Utc>) -> Result<Self, GalleryError> {
        let dimension = records.first().map(|r| r.feature_vector.len()).unwrap_or(0);
        let mut seen = HashSet::with_capacity(records.len());

        for record in &records {
            if !record.has_usable_vector() {
                return Err(GalleryError::Build(format!(
                    "identity {} has an empty or non-finite feature vector",
                    record.identity_id
                )));
            }
            if record.feature_vector.len() != dimension {
                return Err(GalleryError::Dimension {
                    identity_id: record.identity_id.clone(),
                    expected: dimension,
                    actual: record.feature_vector.len(),
                });
            }
            if !seen.insert(record.identity_id.as_str()) {
                return Err(GalleryError::Build(format!(
                    "duplicate identity id {}",
                    record.identity_id
                )));
            }
        }

        Ok(Self {
            records,
            dimension,
            built_at,
        })
    }

    pub fn records(&self) -> &[IdentityRecord] {
        &self.records
    }

    pub fn get(&self, identity_id: &str) -> Option<&IdentityRecord> {
        self.records.iter().find(|r| r.identity_id == identity_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vector length shared by every record; 0 for an empty gallery.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

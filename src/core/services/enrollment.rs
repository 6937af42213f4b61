// src/core/services/enrollment.rs
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::core::gallery::{Gallery, GalleryError, GalleryStore, IdentityRecord};
use crate::core::recognition::{Enrollment, EnrollmentSource, FaceAnalyzer, FrameDecoder, Reference};

const CONCURRENT_EXTRACTIONS: usize = 4;

/// Rebuilds the gallery from an enrollment source, analysing reference photos
/// where no precomputed vector is available.
pub struct EnrollmentService {
    source: Arc<dyn EnrollmentSource>,
    analyzer: Arc<dyn FaceAnalyzer>,
    decoder: FrameDecoder,
    gallery: Arc<GalleryStore>,
}

impl EnrollmentService {
    pub fn new(
        source: Arc<dyn EnrollmentSource>,
        analyzer: Arc<dyn FaceAnalyzer>,
        decoder: FrameDecoder,
        gallery: Arc<GalleryStore>,
    ) -> Self {
        Self {
            source,
            analyzer,
            decoder,
            gallery,
        }
    }

    pub async fn rebuild_gallery(&self) -> Result<Arc<Gallery>, GalleryError> {
        let enrollments = self.source.enrollments().await?;
        let offered = enrollments.len();
        info!("Building gallery from {} enrollments", offered);

        // `buffered` keeps manifest order, which becomes gallery order.
        let records: Vec<IdentityRecord> = stream::iter(enrollments)
            .map(|enrollment| self.resolve(enrollment))
            .buffered(CONCURRENT_EXTRACTIONS)
            .filter_map(|record| async move { record })
            .collect()
            .await;

        if records.len() < offered {
            warn!("{} of {} enrollments had no usable face", offered - records.len(), offered);
        }
        self.gallery.rebuild(records).await
    }

    async fn resolve(&self, enrollment: Enrollment) -> Option<IdentityRecord> {
        let Enrollment {
            identity_id,
            name,
            reference,
        } = enrollment;

        let vector = match reference {
            Reference::Vector(vector) => vector,
            Reference::Image(path) => {
                let bytes = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Photo for {} not readable at {:?}: {}", identity_id, path, e);
                        return None;
                    }
                };
                let frame = match self.decoder.decode_bytes(bytes).await {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Photo for {} could not be decoded: {}", identity_id, e);
                        return None;
                    }
                };
                match self.analyzer.extract(&frame).await {
                    Ok(faces) => match faces.into_iter().next() {
                        Some(vector) => vector,
                        None => {
                            warn!("No face detected in photo for {}", identity_id);
                            return None;
                        }
                    },
                    Err(e) => {
                        warn!("Face analysis failed for {}: {}", identity_id, e);
                        return None;
                    }
                }
            }
        };

        Some(IdentityRecord::new(identity_id, name, vector))
    }
}

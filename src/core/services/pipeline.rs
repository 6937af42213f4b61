// src/core/services/pipeline.rs
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::attendance::{AttendanceLedger, LedgerError, RegistrationOutcome};
use crate::core::gallery::GalleryStore;
use crate::core::matching::{MatchError, MatchResult, Matcher};
use crate::core::recognition::{AnalyzerError, DecodeError, FaceAnalyzer, FrameDecoder};
use crate::network::{DeviceRegistry, DispatchError, FeedbackDispatcher, SignalKind};
use crate::utils::config::Config;
use crate::utils::metrics::Metrics;

#[derive(Debug, Clone)]
pub struct FrameSubmission {
    /// Base64 encoded JPEG or PNG.
    pub image: String,
    pub device_id: String,
    pub source: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    NoFaceDetected,
    UnknownFace {
        faces_found: usize,
    },
    Recognized {
        identity_id: String,
        name: String,
        confidence: f32,
        /// True only when this frame created the day's attendance record.
        registered: bool,
        outcome: RegistrationOutcome,
    },
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] DecodeError),

    #[error("{0}")]
    Dimension(#[from] MatchError),

    #[error("Failed to record attendance: {0}")]
    Persistence(#[from] LedgerError),

    #[error("Face recognition unavailable: {0}")]
    Recognition(#[from] AnalyzerError),
}

/// Durations of the feedback signals sent back to devices.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackDurations {
    pub positive: Duration,
    pub negative: Duration,
}

impl FeedbackDurations {
    pub fn from_config(config: &Config) -> Self {
        Self {
            positive: config.get_positive_duration(),
            negative: config.get_negative_duration(),
        }
    }
}

/// Turns a submitted frame into an attendance decision and a device signal.
pub struct FramePipeline {
    decoder: FrameDecoder,
    analyzer: Arc<dyn FaceAnalyzer>,
    analyzer_timeout: Duration,
    matcher: Matcher,
    gallery: Arc<GalleryStore>,
    ledger: Arc<AttendanceLedger>,
    registry: Arc<DeviceRegistry>,
    dispatcher: Arc<FeedbackDispatcher>,
    metrics: Arc<Metrics>,
    durations: FeedbackDurations,
}

impl FramePipeline {
    pub fn new(
        config: &Config,
        analyzer: Arc<dyn FaceAnalyzer>,
        gallery: Arc<GalleryStore>,
        ledger: Arc<AttendanceLedger>,
        registry: Arc<DeviceRegistry>,
        dispatcher: Arc<FeedbackDispatcher>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            decoder: FrameDecoder::new(
                config.recognition.max_frame_bytes,
                config.recognition.resize_width,
                config.get_decode_timeout(),
            ),
            analyzer,
            analyzer_timeout: config.get_analyzer_timeout(),
            matcher: Matcher::new(config.recognition.tolerance),
            gallery,
            ledger,
            registry,
            dispatcher,
            metrics,
            durations: FeedbackDurations::from_config(config),
        }
    }

    pub async fn handle_frame(
        &self,
        submission: FrameSubmission,
        now: DateTime<Utc>,
    ) -> Result<FrameOutcome, FrameError> {
        let started = Instant::now();
        let span = info_span!("frame", id = %Uuid::new_v4(), device = %submission.device_id);

        let result = self.process(submission, now).instrument(span).await;
        self.metrics.record_frame(started.elapsed(), result.as_ref().ok());
        result
    }

    async fn process(&self, submission: FrameSubmission, now: DateTime<Utc>) -> Result<FrameOutcome, FrameError> {
        let FrameSubmission {
            image,
            device_id,
            source,
        } = submission;

        // Observe before anything can fail so feedback can reach the device.
        if let Some(address) = source {
            self.registry.observe(&device_id, address, now);
        }

        let frame = self.decoder.decode_base64(&image).await.map_err(|e| {
            warn!("Rejected frame: {}", e);
            FrameError::InvalidImage(e)
        })?;

        let vectors = match tokio::time::timeout(self.analyzer_timeout, self.analyzer.extract(&frame)).await {
            Ok(Ok(vectors)) => vectors,
            Ok(Err(e)) => {
                error!("Face analysis failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                error!("Face analysis timed out after {:?}", self.analyzer_timeout);
                return Err(AnalyzerError::Timeout(self.analyzer_timeout).into());
            }
        };

        if vectors.is_empty() {
            debug!("No face detected");
            return Ok(FrameOutcome::NoFaceDetected);
        }

        let gallery = self.gallery.current();
        let mut best = None;
        // First matched face wins; later faces are not evaluated.
        for vector in &vectors {
            match self.matcher.best_match(vector, &gallery) {
                Ok(MatchResult::Matched {
                    identity_id,
                    display_name,
                    confidence,
                    ..
                }) => {
                    best = Some((identity_id, display_name, confidence));
                    break;
                }
                Ok(MatchResult::Unmatched) => continue,
                Err(e) => {
                    error!("Cannot match frame from {}: {}", device_id, e);
                    return Err(e.into());
                }
            }
        }

        let Some((identity_id, name, confidence)) = best else {
            info!("Unknown face ({} detected)", vectors.len());
            self.dispatch(device_id, SignalKind::Negative, self.durations.negative);
            return Ok(FrameOutcome::UnknownFace {
                faces_found: vectors.len(),
            });
        };

        let outcome = self.ledger.register(&identity_id, &device_id, now).await?;
        match outcome {
            RegistrationOutcome::NewRegistration | RegistrationOutcome::AlreadyPresentUpdated => {
                self.dispatch(device_id, SignalKind::Positive, self.durations.positive);
            }
            RegistrationOutcome::AlreadyPresentCooldownActive => {}
        }

        info!("Recognized {} ({:.2}): {:?}", name, confidence, outcome);
        Ok(FrameOutcome::Recognized {
            identity_id,
            name,
            confidence,
            registered: outcome.is_new(),
            outcome,
        })
    }

    // Fire and forget; the frame response never waits on the device.
    fn dispatch(&self, device_id: String, signal: SignalKind, duration: Duration) {
        let dispatcher = self.dispatcher.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(
            async move {
                match dispatcher.send_signal(&device_id, signal, duration).await {
                    Ok(ack) => {
                        debug!("Device {} acknowledged {} ({})", ack.device_id, signal, ack.status);
                        metrics.record_feedback(true);
                    }
                    Err(DispatchError::UnknownDevice(id)) => {
                        debug!("No address for device {}, feedback skipped", id);
                        metrics.record_feedback(false);
                    }
                    Err(e) => {
                        warn!("Feedback {} to {} failed: {}", signal, device_id, e);
                        metrics.record_feedback(false);
                    }
                }
            }
            .in_current_span(),
        );
    }
}

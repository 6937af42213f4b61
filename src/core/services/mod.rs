// src/core/services/mod.rs
pub mod enrollment;
pub mod health;
pub mod pipeline;

pub use enrollment::EnrollmentService;
pub use health::{HealthReport, HealthService};
pub use pipeline::{FeedbackDurations, FrameError, FrameOutcome, FramePipeline, FrameSubmission};

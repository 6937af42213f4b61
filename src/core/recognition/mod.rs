// src/core/recognition/mod.rs
pub mod analyzer;
pub mod decode;
pub mod enrollment;

pub use analyzer::{AnalyzerError, FaceAnalyzer, HttpFaceAnalyzer};
pub use decode::{DecodeError, DecodedFrame, FrameDecoder};
pub use enrollment::{Enrollment, EnrollmentSource, ManifestEnrollmentSource, Reference};

// tests/common/mod.rs
#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use attendance_node::{
    core::{
        attendance::{AttendanceRecord, AttendanceStore},
        gallery::{GalleryError, IdentityRecord},
        recognition::{AnalyzerError, DecodedFrame, Enrollment, EnrollmentSource, FaceAnalyzer},
    },
    network::{DispatchError, FeedbackCommand, FeedbackTransport},
    storage::{KvStore, RocksAttendanceStore, StorageError},
    utils::config::Config,
    Application, Collaborators,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use image::{ImageFormat, RgbImage};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Returns whatever faces it is told to, in order.
#[derive(Default)]
pub struct FakeAnalyzer {
    faces: Mutex<Vec<Vec<f32>>>,
    fail: Mutex<bool>,
}

impl FakeAnalyzer {
    pub fn set_faces(&self, faces: Vec<Vec<f32>>) {
        *self.faces.lock() = faces;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl FaceAnalyzer for FakeAnalyzer {
    async fn extract(&self, _frame: &DecodedFrame) -> Result<Vec<Vec<f32>>, AnalyzerError> {
        if *self.fail.lock() {
            return Err(AnalyzerError::Unreachable("analyzer offline".into()));
        }
        Ok(self.faces.lock().clone())
    }
}

/// Forwards every command it is asked to send to a channel.
pub struct RecordingTransport {
    sent: mpsc::UnboundedSender<(SocketAddr, FeedbackCommand)>,
    response: Mutex<Result<u16, DispatchError>>,
}

impl RecordingTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(SocketAddr, FeedbackCommand)>) {
        let (sent, received) = mpsc::unbounded_channel();
        (
            Self {
                sent,
                response: Mutex::new(Ok(200)),
            },
            received,
        )
    }

    pub fn respond_with(&self, response: Result<u16, DispatchError>) {
        *self.response.lock() = response;
    }
}

#[async_trait]
impl FeedbackTransport for RecordingTransport {
    async fn send(&self, address: SocketAddr, command: &FeedbackCommand) -> Result<u16, DispatchError> {
        let _ = self.sent.send((address, command.clone()));
        self.response.lock().clone()
    }
}

/// Store whose every call fails.
pub struct BrokenStore;

#[async_trait]
impl AttendanceStore for BrokenStore {
    async fn fetch(&self, _identity_id: &str, _date: NaiveDate) -> Result<Option<AttendanceRecord>, StorageError> {
        Err(StorageError::DatabaseError("disk unavailable".into()))
    }

    async fn commit(&self, _record: &AttendanceRecord) -> Result<(), StorageError> {
        Err(StorageError::DatabaseError("disk unavailable".into()))
    }

    async fn list(&self, _date: NaiveDate) -> Result<Vec<AttendanceRecord>, StorageError> {
        Err(StorageError::DatabaseError("disk unavailable".into()))
    }
}

pub struct StaticEnrollment(pub Vec<Enrollment>);

#[async_trait]
impl EnrollmentSource for StaticEnrollment {
    async fn enrollments(&self) -> Result<Vec<Enrollment>, GalleryError> {
        Ok(self.0.clone())
    }
}

pub fn frame_payload() -> String {
    let image = RgbImage::from_pixel(16, 16, image::Rgb([128, 100, 90]));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    STANDARD.encode(buf.into_inner())
}

/// Ana sits 0.1 from the origin, Luis far away from it.
pub fn classroom() -> Vec<IdentityRecord> {
    vec![
        IdentityRecord::new("1", "Ana Torres", vec![0.1, 0.0, 0.0]),
        IdentityRecord::new("2", "Luis Vega", vec![0.0, 0.9, 0.9]),
    ]
}

pub struct TestContext {
    pub app: Application,
    pub analyzer: Arc<FakeAnalyzer>,
    pub transport: Arc<RecordingTransport>,
    pub feedback: mpsc::UnboundedReceiver<(SocketAddr, FeedbackCommand)>,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::build(None, Vec::new()).await
    }

    pub async fn with_store(store: Arc<dyn AttendanceStore>) -> Self {
        Self::build(Some(store), Vec::new()).await
    }

    pub async fn with_enrollments(enrollments: Vec<Enrollment>) -> Self {
        Self::build(None, enrollments).await
    }

    async fn build(store: Option<Arc<dyn AttendanceStore>>, enrollments: Vec<Enrollment>) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = test_config(&temp_dir);

        let store = match store {
            Some(store) => store,
            None => Arc::new(RocksAttendanceStore::new(
                KvStore::open(&config.attendance.storage_path).unwrap(),
            )),
        };
        let analyzer = Arc::new(FakeAnalyzer::default());
        let (transport, feedback) = RecordingTransport::new();
        let transport = Arc::new(transport);

        let app = Application::with_collaborators(
            config,
            Collaborators {
                analyzer: analyzer.clone(),
                attendance_store: store,
                transport: transport.clone(),
                enrollment_source: Arc::new(StaticEnrollment(enrollments)),
            },
        )
        .unwrap();

        app.services().gallery.rebuild(classroom()).await.unwrap();

        Self {
            app,
            analyzer,
            transport,
            feedback,
            temp_dir,
        }
    }

    /// Next feedback command sent, if one arrives within a second.
    pub async fn next_feedback(&mut self) -> Option<(SocketAddr, FeedbackCommand)> {
        tokio::time::timeout(Duration::from_secs(1), self.feedback.recv())
            .await
            .ok()
            .flatten()
    }

    /// Asserts that no feedback command goes out within a short window.
    pub async fn assert_no_feedback(&mut self) {
        let sent = tokio::time::timeout(Duration::from_millis(200), self.feedback.recv()).await;
        assert!(sent.is_err(), "unexpected feedback: {:?}", sent);
    }
}

pub fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.gallery.snapshot_path = temp_dir.path().join("gallery.json");
    config.gallery.enrollment_manifest = temp_dir.path().join("enrollment.json");
    config.gallery.photos_dir = temp_dir.path().join("photos");
    config.attendance.storage_path = temp_dir.path().join("attendance");
    config.server.host = "127.0.0.1".into();
    config.logging.metrics_interval_secs = 0;
    config
}

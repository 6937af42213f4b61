pub mod api;
pub mod core;
pub mod network;
pub mod storage;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{dev::ServerHandle, App, HttpServer};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    api::ApiServices,
    core::{
        attendance::{AttendanceLedger, AttendanceStore},
        gallery::GalleryStore,
        recognition::{EnrollmentSource, FaceAnalyzer, FrameDecoder, HttpFaceAnalyzer, ManifestEnrollmentSource},
        services::{EnrollmentService, FramePipeline, HealthService},
    },
    network::{DeviceRegistry, FeedbackDispatcher, FeedbackTransport, HttpFeedbackTransport},
    storage::{KvStore, RocksAttendanceStore},
    utils::{
        config::Config,
        error::{NodeError, Result},
        metrics::Metrics,
        monitoring::Monitor,
    },
};

/// External collaborators the node is wired with.
pub struct Collaborators {
    pub analyzer: Arc<dyn FaceAnalyzer>,
    pub attendance_store: Arc<dyn AttendanceStore>,
    pub transport: Arc<dyn FeedbackTransport>,
    pub enrollment_source: Arc<dyn EnrollmentSource>,
}

impl Collaborators {
    /// Production collaborators: RocksDB, HTTP analyzer and HTTP device transport.
    pub fn from_config(config: &Config) -> Result<Self> {
        info!("Opening attendance store at {:?}", config.attendance.storage_path);
        let kv = KvStore::open(&config.attendance.storage_path)?;

        let analyzer = HttpFaceAnalyzer::new(config.recognition.analyzer_url.clone(), config.get_analyzer_timeout())
            .map_err(|e| NodeError::Init(format!("Failed to build analyzer client: {}", e)))?;
        let transport = HttpFeedbackTransport::new(config.get_feedback_timeout())
            .map_err(|e| NodeError::Init(format!("Failed to build feedback client: {}", e)))?;

        Ok(Self {
            analyzer: Arc::new(analyzer),
            attendance_store: Arc::new(RocksAttendanceStore::new(kv)),
            transport: Arc::new(transport),
            enrollment_source: Arc::new(ManifestEnrollmentSource::new(
                config.gallery.enrollment_manifest.clone(),
                config.gallery.photos_dir.clone(),
            )),
        })
    }
}

pub struct Application {
    config: Arc<Config>,
    services: ApiServices,
    server: Mutex<Option<ServerHandle>>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Application {
    pub async fn new(config: Config) -> Result<Self> {
        let collaborators = Collaborators::from_config(&config)?;
        Self::with_collaborators(config, collaborators)
    }

    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        info!("Initializing services...");
        let metrics = Arc::new(Metrics::new());
        let gallery = Arc::new(GalleryStore::new(config.gallery.snapshot_path.clone()));
        let ledger = Arc::new(AttendanceLedger::new(
            collaborators.attendance_store,
            config.get_cooldown(),
            config.get_utc_offset()?,
            config.get_storage_timeout(),
        ));
        let registry = Arc::new(DeviceRegistry::new());
        let dispatcher = Arc::new(FeedbackDispatcher::new(
            registry.clone(),
            collaborators.transport,
            config.feedback.device_port,
            config.get_feedback_timeout(),
        ));

        let pipeline = Arc::new(FramePipeline::new(
            &config,
            collaborators.analyzer.clone(),
            gallery.clone(),
            ledger.clone(),
            registry.clone(),
            dispatcher,
            metrics.clone(),
        ));
        let enrollment = Arc::new(EnrollmentService::new(
            collaborators.enrollment_source,
            collaborators.analyzer,
            FrameDecoder::new(
                config.recognition.max_frame_bytes,
                config.recognition.resize_width,
                config.get_decode_timeout(),
            ),
            gallery.clone(),
        ));
        let health = Arc::new(HealthService::new(gallery.clone(), metrics.clone()));

        Ok(Self {
            config,
            services: ApiServices {
                pipeline,
                gallery,
                ledger,
                registry,
                enrollment,
                health,
                metrics,
            },
            server: Mutex::new(None),
            monitor: Mutex::new(None),
        })
    }

    pub fn services(&self) -> &ApiServices {
        &self.services
    }

    /// Loads the gallery, starts the metrics monitor and the HTTP server.
    /// Returns the addresses the server is bound to.
    pub async fn start(&self) -> Result<Vec<SocketAddr>> {
        self.prepare_gallery().await?;

        if let Some(interval) = self.config.get_metrics_interval() {
            let monitor = Monitor::new(self.services.metrics.clone(), interval);
            *self.monitor.lock() = Some(monitor.start());
        }

        info!("Starting API server...");
        self.start_api_server()
    }

    async fn prepare_gallery(&self) -> Result<()> {
        let gallery = &self.services.gallery;
        match gallery.load().await {
            Ok(Some(_)) => return Ok(()),
            Ok(None) => {}
            Err(e) => {
                error!("Gallery snapshot unusable: {}", e);
                if !self.config.gallery.rebuild_on_empty {
                    return Err(e.into());
                }
            }
        }

        if !self.config.gallery.rebuild_on_empty {
            warn!("Starting with an empty gallery; every face will be unknown");
            return Ok(());
        }

        info!("Building gallery from {:?}", self.config.gallery.enrollment_manifest);
        if let Err(e) = self.services.enrollment.rebuild_gallery().await {
            // The node still serves; /gallery/rebuild can retry later.
            warn!("Initial gallery build failed: {}", e);
        }
        Ok(())
    }

    fn start_api_server(&self) -> Result<Vec<SocketAddr>> {
        let services = self.services.clone();
        let cors_origins = self.config.server.cors_origins.clone();
        let max_request_bytes = self.config.server.max_request_bytes;

        let server = HttpServer::new(move || {
            App::new()
                .wrap(build_cors(&cors_origins))
                .configure(|cfg| api::configure(cfg, &services, max_request_bytes))
        })
        .bind((self.config.server.host.as_str(), self.config.server.port))
        .map_err(|e| NodeError::Init(format!("Failed to bind API server: {}", e)))?;

        let addrs = server.addrs();
        let server = server.run();
        *self.server.lock() = Some(server.handle());
        tokio::spawn(server);

        info!("API server listening on {:?}", addrs);
        Ok(addrs)
    }

    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down application...");

        if let Some(monitor) = self.monitor.lock().take() {
            monitor.abort();
        }

        let server = self.server.lock().take();
        if let Some(server) = server {
            info!("Stopping API server...");
            server.stop(true).await;
        }

        info!("Application shutdown complete");
        Ok(())
    }
}

fn build_cors(origins: &[String]) -> Cors {
    if origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
}

//! # Scanner Engine
//!
//! Owns the camera stream and the decode loop for one scanning session.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │           start()                    backend selected                  │
//! │   Idle ───────────► Starting ───────────────────────► Running(backend) │
//! │    ▲                   │                                     │          │
//! │    │                   │ camera acquisition failed           │ stop()   │
//! │    │                   ▼                                     ▼          │
//! │    │                 Error ── start() retries          Stopping         │
//! │    │                                                         │          │
//! │    └─────────────────────────────────────────────────────────┘          │
//! │                                                                         │
//! │  Running(ManualOnly): fallback decoder failed to load; camera stays on │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Resources
//! Every session holds one stream, one running flag, and at most one of a
//! frame-loop task or a stream probe. `stop()` takes the session out of the
//! engine before releasing anything, so each resource is released once no
//! matter how often `stop()` is called. Dropping a running engine releases
//! the same resources without waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use shelf_core::{Debouncer, DEBOUNCE_WINDOW_MS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::camera::{CameraSource, MediaStream};
use crate::error::{CameraError, ScanResult};
use crate::probe::{
    negotiate_formats, Backend, DecodeCallback, DecoderRuntime, FrameProbe, ProbeSignal,
    StreamProbe,
};

/// One display refresh at ~60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

// =============================================================================
// Events
// =============================================================================

/// Events emitted while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A code passed the debouncer.
    Detected(String),
    /// Operator-facing status line.
    Status(String),
    /// The stream-bound decoder reached the end of its feed.
    FeedEnded,
}

/// Receiver of scan events.
pub trait DetectionSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}

/// Forwards events into a channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ScanEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ScanEvent>) -> Self {
        Self { tx }
    }
}

impl DetectionSink for ChannelSink {
    fn emit(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }
}

/// Source of "now" for the debouncer.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

// =============================================================================
// Settings and State
// =============================================================================

/// Tunables for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Delay between native detector polls.
    pub frame_interval: Duration,
    /// Duplicate suppression window.
    pub debounce_window_ms: i64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            debounce_window_ms: DEBOUNCE_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Starting,
    Running(Backend),
    Stopping,
    /// The last start attempt failed to acquire the camera.
    Error(CameraError),
}

/// Shared by the frame loop, the decode callback and the engine.
struct DetectionGate {
    running: Arc<AtomicBool>,
    debouncer: Arc<Mutex<Debouncer>>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn DetectionSink>,
}

impl DetectionGate {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Debounces and forwards a decoded value.
    fn deliver(&self, code: &str) -> bool {
        let code = code.trim();
        if !self.is_running() || code.is_empty() {
            return false;
        }

        let accepted = self
            .debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accept(code, self.clock.now_ms());

        if accepted {
            debug!(barcode = %code, "Code accepted");
            self.sink.emit(ScanEvent::Detected(code.to_string()));
            self.sink.emit(ScanEvent::Status(format!("Scanned: {}", code)));
        } else {
            trace!(barcode = %code, "Duplicate read suppressed");
        }
        accepted
    }
}

struct Session {
    stream: Arc<dyn MediaStream>,
    running: Arc<AtomicBool>,
    frame_loop: Option<JoinHandle<()>>,
    stream_probe: Option<Box<dyn StreamProbe>>,
}

impl Session {
    fn halt(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.frame_loop.take() {
            task.abort();
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Drives capture and decoding for one device at a time.
pub struct ScannerEngine {
    camera: Arc<dyn CameraSource>,
    runtime: Arc<dyn DecoderRuntime>,
    sink: Arc<dyn DetectionSink>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
    debouncer: Arc<Mutex<Debouncer>>,
    state: EngineState,
    session: Option<Session>,
}

impl ScannerEngine {
    pub fn new(
        camera: Arc<dyn CameraSource>,
        runtime: Arc<dyn DecoderRuntime>,
        sink: Arc<dyn DetectionSink>,
        settings: EngineSettings,
    ) -> Self {
        ScannerEngine {
            camera,
            runtime,
            sink,
            clock: Arc::new(SystemClock),
            debouncer: Arc::new(Mutex::new(Debouncer::new(settings.debounce_window_ms))),
            settings,
            state: EngineState::Idle,
            session: None,
        }
    }

    /// Replaces the clock used for debouncing.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn backend(&self) -> Option<Backend> {
        match self.state {
            EngineState::Running(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Acquires the camera and starts decoding.
    ///
    /// ## Outcomes
    /// - Already running: no-op, returns the current backend
    /// - Camera refused: `Err`, engine in `Error`, nothing left acquired
    /// - Fallback decoder failed: `Ok(Backend::ManualOnly)` with a status
    ///   message, camera stays on
    pub async fn start(&mut self, device_id: Option<&str>) -> ScanResult<Backend> {
        if let (Some(_), EngineState::Running(backend)) = (&self.session, &self.state) {
            debug!(backend = %backend, "Start ignored, already running");
            return Ok(*backend);
        }

        self.state = EngineState::Starting;
        self.status("Starting camera…");
        info!(device = ?device_id, "Starting scanner");

        let stream = match self.camera.open(device_id).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "Camera acquisition failed");
                self.status(format!("Camera error: {}. Check permissions and try again.", e));
                self.state = EngineState::Error(e.clone());
                return Err(e.into());
            }
        };

        self.status("Camera started. Initializing scanner…");

        let running = Arc::new(AtomicBool::new(true));
        let gate = Arc::new(DetectionGate {
            running: running.clone(),
            debouncer: self.debouncer.clone(),
            clock: self.clock.clone(),
            sink: self.sink.clone(),
        });

        let mut session = Session {
            stream: stream.clone(),
            running,
            frame_loop: None,
            stream_probe: None,
        };

        let backend = match self.runtime.native_detector() {
            Some(detector) => {
                self.status("Using native barcode detector.");
                let formats = negotiate_formats(detector.supported_formats().await.as_deref());
                debug!(formats = ?formats, "Native detector formats");
                session.frame_loop = Some(tokio::spawn(run_frame_loop(
                    stream,
                    detector,
                    formats,
                    gate,
                    self.settings.frame_interval,
                )));
                Backend::Native
            }
            None => self.start_fallback(&mut session, stream, gate).await,
        };

        self.session = Some(session);
        self.state = EngineState::Running(backend);
        info!(backend = %backend, "Scanner running");
        Ok(backend)
    }

    async fn start_fallback(
        &self,
        session: &mut Session,
        stream: Arc<dyn MediaStream>,
        gate: Arc<DetectionGate>,
    ) -> Backend {
        self.status("Loading fallback decoder…");

        let mut probe = match self.runtime.load_fallback().await {
            Ok(probe) => probe,
            Err(e) => {
                warn!(error = %e, "Fallback decoder unavailable");
                self.status(format!("{}. Enter codes manually.", e));
                return Backend::ManualOnly;
            }
        };

        let sink = self.sink.clone();
        let callback = DecodeCallback::new(gate.running.clone(), move |signal| match signal {
            ProbeSignal::Decoded(code) => {
                gate.deliver(&code);
            }
            ProbeSignal::FeedEnded => sink.emit(ScanEvent::FeedEnded),
        });

        match probe.start(stream, callback).await {
            Ok(()) => {
                session.stream_probe = Some(probe);
                self.status("Fallback decoder running.");
                Backend::Fallback
            }
            Err(e) => {
                warn!(error = %e, "Fallback decoder failed to start");
                probe.reset().await;
                self.status(format!("{}. Enter codes manually.", e));
                Backend::ManualOnly
            }
        }
    }

    /// Stops decoding and releases the camera.
    ///
    /// Safe to call at any time; calling it while idle does nothing.
    pub async fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            debug!("Stop ignored, scanner not running");
            if matches!(self.state, EngineState::Error(_)) {
                self.state = EngineState::Idle;
            }
            return;
        };

        self.state = EngineState::Stopping;

        session.halt();
        if let Some(mut probe) = session.stream_probe.take() {
            probe.reset().await;
        }
        let tracks = session.stream.stop_tracks();

        self.state = EngineState::Idle;
        info!(stream = %session.stream.id(), tracks, "Scanner stopped");
        self.status("Scanner stopped.");
    }

    fn status(&self, message: impl Into<String>) {
        self.sink.emit(ScanEvent::Status(message.into()));
    }
}

impl Drop for ScannerEngine {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.halt();
            if let Some(mut probe) = session.stream_probe.take() {
                probe.abort();
            }
            session.stream.stop_tracks();
        }
    }
}

/// Polls the native detector once per frame interval until the running flag
/// is cleared.
async fn run_frame_loop(
    stream: Arc<dyn MediaStream>,
    detector: Arc<dyn FrameProbe>,
    formats: Vec<String>,
    gate: Arc<DetectionGate>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if !gate.is_running() {
            break;
        }

        let Some(frame) = stream.capture_frame() else {
            trace!("No frame available");
            continue;
        };

        match detector.detect(&frame, &formats).await {
            Ok(detections) => {
                if let Some(first) = detections.first() {
                    gate.deliver(&first.raw_value);
                }
            }
            Err(e) => trace!(error = %e, "Frame decode failed"),
        }
    }

    debug!("Frame loop ended");
}

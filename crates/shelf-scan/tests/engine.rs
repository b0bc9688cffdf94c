//! Scanner engine behavior against scripted cameras and decoders.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use shelf_scan::camera::LiveFeed;
use shelf_scan::{
    Backend, BackendInitError, CameraError, CameraSource, ChannelSink, Clock, DecodeCallback,
    DecodeError, DecoderRuntime, Detection, EngineSettings, EngineState, Frame, FrameProbe,
    MediaStream, ScanError, ScanEvent, ScannerEngine, StreamProbe, VideoDevice, WedgeCamera,
    WedgeRuntime,
};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

// =============================================================================
// Test Doubles
// =============================================================================

#[derive(Default)]
struct Counters {
    opens: AtomicUsize,
    track_stops: AtomicUsize,
    probe_resets: AtomicUsize,
    probe_aborts: AtomicUsize,
}

struct FakeStream {
    counters: Arc<Counters>,
    live: AtomicBool,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        "fake"
    }

    fn capture_frame(&self) -> Option<Frame> {
        Some(Frame {
            width: 4,
            height: 4,
            data: vec![0; 16],
        })
    }

    fn take_feed(&self) -> Option<LiveFeed> {
        None
    }

    fn stop_tracks(&self) -> usize {
        if self.live.swap(false, Ordering::SeqCst) {
            self.counters.track_stops.fetch_add(1, Ordering::SeqCst);
            1
        } else {
            0
        }
    }
}

struct FakeCamera {
    counters: Arc<Counters>,
    refuse: Option<CameraError>,
}

#[async_trait]
impl CameraSource for FakeCamera {
    async fn enumerate(&self) -> Result<Vec<VideoDevice>, CameraError> {
        Ok(vec![VideoDevice {
            id: "fake".into(),
            label: "Fake".into(),
        }])
    }

    async fn open(&self, _: Option<&str>) -> Result<Arc<dyn MediaStream>, CameraError> {
        if let Some(err) = &self.refuse {
            return Err(err.clone());
        }
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeStream {
            counters: self.counters.clone(),
            live: AtomicBool::new(true),
        }))
    }
}

/// Detector that replays a script, then reports nothing.
struct ScriptedDetector {
    script: Mutex<VecDeque<Result<Vec<&'static str>, DecodeError>>>,
}

impl ScriptedDetector {
    fn new(script: Vec<Result<Vec<&'static str>, DecodeError>>) -> Self {
        ScriptedDetector {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl FrameProbe for ScriptedDetector {
    async fn supported_formats(&self) -> Option<Vec<String>> {
        Some(vec!["ean_13".into(), "qr_code".into()])
    }

    async fn detect(&self, _: &Frame, formats: &[String]) -> Result<Vec<Detection>, DecodeError> {
        assert_eq!(formats, ["qr_code", "ean_13"]);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(codes)) => Ok(codes
                .into_iter()
                .map(|c| Detection {
                    raw_value: c.into(),
                    format: "ean_13".into(),
                })
                .collect()),
            Some(Err(e)) => Err(e),
            None => Ok(vec![]),
        }
    }
}

struct NativeRuntime(Arc<ScriptedDetector>);

#[async_trait]
impl DecoderRuntime for NativeRuntime {
    fn native_detector(&self) -> Option<Arc<dyn FrameProbe>> {
        Some(self.0.clone())
    }

    async fn load_fallback(&self) -> Result<Box<dyn StreamProbe>, BackendInitError> {
        unreachable!("native detector available")
    }
}

struct CountingProbe {
    counters: Arc<Counters>,
    codes: Vec<&'static str>,
}

#[async_trait]
impl StreamProbe for CountingProbe {
    async fn start(
        &mut self,
        _: Arc<dyn MediaStream>,
        callback: DecodeCallback,
    ) -> Result<(), BackendInitError> {
        for code in &self.codes {
            callback.decoded(code);
        }
        Ok(())
    }

    async fn reset(&mut self) {
        self.counters.probe_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn abort(&mut self) {
        self.counters.probe_aborts.fetch_add(1, Ordering::SeqCst);
    }
}

struct FallbackRuntime {
    counters: Arc<Counters>,
    fail_load: bool,
    codes: Vec<&'static str>,
}

#[async_trait]
impl DecoderRuntime for FallbackRuntime {
    fn native_detector(&self) -> Option<Arc<dyn FrameProbe>> {
        None
    }

    async fn load_fallback(&self) -> Result<Box<dyn StreamProbe>, BackendInitError> {
        if self.fail_load {
            return Err(BackendInitError::Unavailable("script blocked".into()));
        }
        Ok(Box::new(CountingProbe {
            counters: self.counters.clone(),
            codes: self.codes.clone(),
        }))
    }
}

struct FixedClock(AtomicI64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn camera(counters: &Arc<Counters>) -> Arc<FakeCamera> {
    Arc::new(FakeCamera {
        counters: counters.clone(),
        refuse: None,
    })
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn detected(events: &[ScanEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::Detected(code) => Some(code.clone()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_stop_before_start_is_noop() {
    let counters = Arc::new(Counters::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        camera(&counters),
        Arc::new(FallbackRuntime {
            counters: counters.clone(),
            fail_load: false,
            codes: vec![],
        }),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    );

    engine.stop().await;
    engine.stop().await;

    assert_eq!(engine.state(), &EngineState::Idle);
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_native_loop_debounces_and_stops_once() {
    let counters = Arc::new(Counters::default());
    let detector = Arc::new(ScriptedDetector::new(vec![
        Ok(vec!["4006381333931", "ignored-second"]),
        Ok(vec!["4006381333931"]),
        Err(DecodeError("blurry".into())),
        Ok(vec!["4006381333931"]),
        Ok(vec!["96385074"]),
    ]));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        camera(&counters),
        Arc::new(NativeRuntime(detector)),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    )
    .with_clock(Arc::new(FixedClock(AtomicI64::new(0))));

    let backend = engine.start(None).await.unwrap();
    assert_eq!(backend, Backend::Native);
    assert_eq!(engine.state(), &EngineState::Running(Backend::Native));

    tokio::time::sleep(Duration::from_millis(200)).await;

    engine.stop().await;
    engine.stop().await;

    assert_eq!(engine.state(), &EngineState::Idle);
    assert_eq!(counters.opens.load(Ordering::SeqCst), 1);
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 1);

    let events = drain(&mut rx);
    assert_eq!(detected(&events), ["4006381333931", "96385074"]);
    assert!(events.contains(&ScanEvent::Status("Scanner stopped.".into())));
}

#[tokio::test]
async fn test_start_while_running_is_noop() {
    let counters = Arc::new(Counters::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        camera(&counters),
        Arc::new(FallbackRuntime {
            counters: counters.clone(),
            fail_load: false,
            codes: vec![],
        }),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    );

    assert_eq!(engine.start(None).await.unwrap(), Backend::Fallback);
    assert_eq!(engine.start(None).await.unwrap(), Backend::Fallback);
    assert_eq!(counters.opens.load(Ordering::SeqCst), 1);

    engine.stop().await;
    assert_eq!(counters.probe_resets.load(Ordering::SeqCst), 1);
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_camera_refusal_enters_error_then_retry_allowed() {
    let counters = Arc::new(Counters::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        Arc::new(FakeCamera {
            counters: counters.clone(),
            refuse: Some(CameraError::PermissionDenied),
        }),
        Arc::new(WedgeRuntime),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    );

    let err = engine.start(None).await.unwrap_err();
    assert_eq!(err, ScanError::Camera(CameraError::PermissionDenied));
    assert_eq!(
        engine.state(),
        &EngineState::Error(CameraError::PermissionDenied)
    );
    assert!(!engine.is_running());

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, ScanEvent::Status(s) if s.starts_with("Camera error"))));

    // Stopping after a failed start releases nothing and returns to idle.
    engine.stop().await;
    assert_eq!(engine.state(), &EngineState::Idle);
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fallback_load_failure_degrades_to_manual() {
    let counters = Arc::new(Counters::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        camera(&counters),
        Arc::new(FallbackRuntime {
            counters: counters.clone(),
            fail_load: true,
            codes: vec![],
        }),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    );

    assert_eq!(engine.start(None).await.unwrap(), Backend::ManualOnly);
    assert_eq!(engine.backend(), Some(Backend::ManualOnly));

    let events = drain(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, ScanEvent::Status(s) if s.contains("Enter codes manually"))
    ));

    // Camera is still held until stop.
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 0);
    engine.stop().await;
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 1);
    assert_eq!(counters.probe_resets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fallback_callbacks_are_debounced() {
    let counters = Arc::new(Counters::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        camera(&counters),
        Arc::new(FallbackRuntime {
            counters: counters.clone(),
            fail_load: false,
            codes: vec!["A", "A", "B", "A"],
        }),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    )
    .with_clock(Arc::new(FixedClock(AtomicI64::new(5_000))));

    engine.start(None).await.unwrap();
    engine.stop().await;

    assert_eq!(detected(&drain(&mut rx)), ["A", "B", "A"]);
}

#[tokio::test]
async fn test_drop_releases_tracks() {
    let counters = Arc::new(Counters::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    {
        let mut engine = ScannerEngine::new(
            camera(&counters),
            Arc::new(FallbackRuntime {
                counters: counters.clone(),
                fail_load: false,
                codes: vec![],
            }),
            Arc::new(ChannelSink::new(tx)),
            EngineSettings::default(),
        );
        engine.start(None).await.unwrap();
    }
    assert_eq!(counters.track_stops.load(Ordering::SeqCst), 1);
    assert_eq!(counters.probe_aborts.load(Ordering::SeqCst), 1);
    assert_eq!(counters.probe_resets.load(Ordering::SeqCst), 0);
}

/// Feed that never produces a line and records when it is dropped.
struct IdleFeed(Arc<AtomicBool>);

impl AsyncRead for IdleFeed {
    fn poll_read(self: Pin<&mut Self>, _: &mut Context<'_>, _: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl Drop for IdleFeed {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_drop_closes_wedge_feed() {
    let closed = Arc::new(AtomicBool::new(false));
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        Arc::new(WedgeCamera::default().with_reader("idle", IdleFeed(closed.clone()))),
        Arc::new(WedgeRuntime),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    );
    assert_eq!(engine.start(None).await.unwrap(), Backend::Fallback);
    drop(engine);

    let released = tokio::time::timeout(Duration::from_secs(1), async {
        while !closed.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(released.is_ok());
}

#[tokio::test]
async fn test_wedge_device_end_to_end() {
    let camera = WedgeCamera::default().with_reader("pipe", &b"96385074\n96385074\n012345678905\n"[..]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut engine = ScannerEngine::new(
        Arc::new(camera),
        Arc::new(WedgeRuntime),
        Arc::new(ChannelSink::new(tx)),
        EngineSettings::default(),
    )
    .with_clock(Arc::new(FixedClock(AtomicI64::new(0))));

    assert_eq!(engine.start(Some("pipe")).await.unwrap(), Backend::Fallback);

    let mut codes = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            ScanEvent::Detected(code) => codes.push(code),
            ScanEvent::FeedEnded => break,
            ScanEvent::Status(_) => {}
        }
    }
    engine.stop().await;

    assert_eq!(codes, ["96385074", "012345678905"]);
}

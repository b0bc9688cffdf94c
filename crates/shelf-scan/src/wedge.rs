//! # Keyboard-Wedge Devices
//!
//! Hand-held scanners in keyboard or serial mode decode on their own and
//! emit one code per line. This module exposes them as capture devices with
//! no native detector, so they run through the same engine as a camera:
//!
//! ```text
//!  WedgeCamera::open("front")  ─► WedgeStream (feed = /dev/ttyACM0 or stdin)
//!  WedgeRuntime::load_fallback ─► LineDecoder
//!  LineDecoder::start          ─► reads lines, calls back per non-empty line
//! ```
//!
//! A device path of `-` means standard input.
//!
//! ## Reads That Never Return
//! A terminal or tty read blocks until the next line and cannot be
//! cancelled. Device feeds are therefore read by a [`BlockingFeed`]: a
//! detached thread per feed, outside the runtime's blocking pool, so
//! stopping a scan or shutting the runtime down never waits for input.

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{ready, Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, ReadBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::camera::{CameraSource, Frame, LiveFeed, MediaStream, VideoDevice};
use crate::error::{BackendInitError, CameraError};
use crate::probe::{DecodeCallback, DecoderRuntime, FrameProbe, StreamProbe};

/// Device path meaning standard input.
pub const STDIN_PATH: &str = "-";

/// Lines buffered between a feed thread and its reader.
const FEED_BACKLOG: usize = 64;

/// A configured line device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WedgeDevice {
    pub id: String,
    pub label: String,
    pub path: String,
}

impl WedgeDevice {
    /// Standard input as a device.
    pub fn stdin() -> Self {
        WedgeDevice {
            id: "stdin".to_string(),
            label: "Standard input".to_string(),
            path: STDIN_PATH.to_string(),
        }
    }
}

// =============================================================================
// Camera Source
// =============================================================================

/// Capture source backed by line devices.
#[derive(Default)]
pub struct WedgeCamera {
    devices: Vec<WedgeDevice>,
    readers: Mutex<HashMap<String, LiveFeed>>,
}

impl WedgeCamera {
    pub fn new(devices: Vec<WedgeDevice>) -> Self {
        WedgeCamera {
            devices,
            readers: Mutex::new(HashMap::new()),
        }
    }

    /// Adds a device fed by an in-memory reader instead of a path.
    pub fn with_reader(
        mut self,
        id: impl Into<String>,
        reader: impl tokio::io::AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        let id = id.into();
        self.devices.push(WedgeDevice {
            id: id.clone(),
            label: String::new(),
            path: String::new(),
        });
        self.readers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Box::new(reader));
        self
    }

    async fn open_feed(&self, device: &WedgeDevice) -> Result<LiveFeed, CameraError> {
        let preset = self
            .readers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&device.id);
        if let Some(reader) = preset {
            return Ok(reader);
        }

        if device.path == STDIN_PATH {
            let feed = BlockingFeed::spawn(&device.id, io::stdin())
                .map_err(|e| CameraError::Other(format!("cannot read standard input: {}", e)))?;
            return Ok(Box::new(feed));
        }
        if device.path.is_empty() {
            // In-memory device whose reader was already taken.
            return Err(CameraError::DeviceBusy);
        }

        let file = tokio::fs::File::open(&device.path)
            .await
            .map_err(|e| CameraError::from_io(&device.path, &e))?
            .into_std()
            .await;
        let feed = BlockingFeed::spawn(&device.id, file)
            .map_err(|e| CameraError::from_io(&device.path, &e))?;
        Ok(Box::new(feed))
    }
}

// =============================================================================
// Blocking Feed
// =============================================================================

/// Line feed pumped from a blocking reader by a dedicated thread.
///
/// Dropping the feed closes its channel; the thread exits after its current
/// read returns, and a process exit does not wait for it.
pub struct BlockingFeed {
    lines: mpsc::Receiver<io::Result<Vec<u8>>>,
    pending: Vec<u8>,
    offset: usize,
}

impl BlockingFeed {
    pub fn spawn<R>(name: &str, reader: R) -> io::Result<Self>
    where
        R: io::Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(FEED_BACKLOG);
        std::thread::Builder::new()
            .name(format!("feed-{}", name))
            .spawn(move || pump_lines(reader, tx))?;

        Ok(BlockingFeed {
            lines: rx,
            pending: Vec::new(),
            offset: 0,
        })
    }
}

fn pump_lines(reader: impl io::Read, tx: mpsc::Sender<io::Result<Vec<u8>>>) {
    let mut reader = io::BufReader::new(reader);
    loop {
        let mut line = Vec::new();
        let chunk = match reader.read_until(b'\n', &mut line) {
            Ok(0) => return,
            Ok(_) => Ok(line),
            Err(e) => Err(e),
        };
        let failed = chunk.is_err();
        if tx.blocking_send(chunk).is_err() || failed {
            return;
        }
    }
}

impl AsyncRead for BlockingFeed {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        while this.offset >= this.pending.len() {
            match ready!(this.lines.poll_recv(cx)) {
                Some(Ok(line)) => {
                    this.pending = line;
                    this.offset = 0;
                }
                Some(Err(e)) => return Poll::Ready(Err(e)),
                // Reader hit end of input.
                None => return Poll::Ready(Ok(())),
            }
        }

        let n = buf.remaining().min(this.pending.len() - this.offset);
        buf.put_slice(&this.pending[this.offset..this.offset + n]);
        this.offset += n;
        Poll::Ready(Ok(()))
    }
}

#[async_trait]
impl CameraSource for WedgeCamera {
    async fn enumerate(&self) -> Result<Vec<VideoDevice>, CameraError> {
        Ok(self
            .devices
            .iter()
            .map(|d| VideoDevice {
                id: d.id.clone(),
                label: d.label.clone(),
            })
            .collect())
    }

    async fn open(&self, device_id: Option<&str>) -> Result<Arc<dyn MediaStream>, CameraError> {
        let device = match device_id {
            Some(id) => self
                .devices
                .iter()
                .find(|d| d.id == id)
                .ok_or_else(|| CameraError::NotFound { device: id.to_string() })?,
            None => self.devices.first().ok_or(CameraError::NoDevice)?,
        };

        let feed = self.open_feed(device).await?;
        info!(device = %device.id, "Line device opened");

        Ok(Arc::new(WedgeStream::new(device.id.clone(), feed)))
    }
}

/// An opened line device. It has a single track: the feed.
pub struct WedgeStream {
    id: String,
    feed: Mutex<Option<LiveFeed>>,
    live: AtomicBool,
}

impl WedgeStream {
    pub fn new(id: impl Into<String>, feed: LiveFeed) -> Self {
        WedgeStream {
            id: id.into(),
            feed: Mutex::new(Some(feed)),
            live: AtomicBool::new(true),
        }
    }
}

impl MediaStream for WedgeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture_frame(&self) -> Option<Frame> {
        None
    }

    fn take_feed(&self) -> Option<LiveFeed> {
        self.feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn stop_tracks(&self) -> usize {
        if self.live.swap(false, Ordering::SeqCst) {
            // Dropping an untaken feed closes the device.
            self.take_feed();
            1
        } else {
            0
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Runtime for line devices: no native detector, the fallback reads lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct WedgeRuntime;

#[async_trait]
impl DecoderRuntime for WedgeRuntime {
    fn native_detector(&self) -> Option<Arc<dyn FrameProbe>> {
        None
    }

    async fn load_fallback(&self) -> Result<Box<dyn StreamProbe>, BackendInitError> {
        Ok(Box::new(LineDecoder::default()))
    }
}

/// Stream-bound decoder that treats each non-empty line as one code.
#[derive(Default)]
pub struct LineDecoder {
    task: Option<JoinHandle<()>>,
}

#[async_trait]
impl StreamProbe for LineDecoder {
    async fn start(
        &mut self,
        stream: Arc<dyn MediaStream>,
        callback: DecodeCallback,
    ) -> Result<(), BackendInitError> {
        let feed = stream.take_feed().ok_or(BackendInitError::NoFeed)?;
        let stream_id = stream.id().to_string();

        self.task = Some(tokio::spawn(async move {
            let mut reader = BufReader::new(feed);
            let mut line = Vec::new();

            while callback.is_running() {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => {
                        debug!(stream = %stream_id, "Feed ended");
                        callback.feed_ended();
                        break;
                    }
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&line);
                        let code = text.trim();
                        if code.is_empty() {
                            trace!("Blank line skipped");
                            continue;
                        }
                        callback.decoded(code);
                    }
                    Err(e) => {
                        warn!(stream = %stream_id, error = %e, "Feed read failed");
                        callback.feed_ended();
                        break;
                    }
                }
            }
        }));

        Ok(())
    }

    async fn reset(&mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

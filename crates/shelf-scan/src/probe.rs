//! # Decode Backends
//!
//! Two interchangeable ways of turning a live stream into codes, chosen once
//! per `start()` from what the runtime offers.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DecoderRuntime::native_detector()                                      │
//! │        │                                                                │
//! │   Some ├──► FrameProbe    engine captures a frame every tick and asks   │
//! │        │                  detect(frame, formats); first result wins     │
//! │        │                                                                │
//! │   None └──► load_fallback() ──► StreamProbe                             │
//! │                   │             bound to the stream, calls back per     │
//! │                   │             decode on its own schedule              │
//! │                   │                                                     │
//! │                   └── Err ──► ManualOnly (camera stays on, no decodes) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::camera::{Frame, MediaStream};
use crate::error::{BackendInitError, DecodeError};

/// Formats requested from a native detector, in preference order.
pub const PREFERRED_FORMATS: [&str; 8] = [
    "qr_code", "ean_13", "ean_8", "upc_a", "upc_e", "code_128", "code_39", "itf",
];

/// Which backend a running engine ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Built-in detector polled once per frame.
    Native,
    /// Stream-bound decoder loaded at start time.
    Fallback,
    /// No decoder could be started; codes are entered by hand.
    ManualOnly,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Native => write!(f, "native detector"),
            Backend::Fallback => write!(f, "fallback decoder"),
            Backend::ManualOnly => write!(f, "manual entry"),
        }
    }
}

/// One detection reported by a [`FrameProbe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub raw_value: String,
    pub format: String,
}

/// Decoder that inspects one captured frame at a time.
#[async_trait]
pub trait FrameProbe: Send + Sync {
    /// Formats this detector can read. `None` if it cannot tell.
    async fn supported_formats(&self) -> Option<Vec<String>>;

    /// Finds codes in `frame`, limited to `formats`.
    async fn detect(&self, frame: &Frame, formats: &[String]) -> Result<Vec<Detection>, DecodeError>;
}

/// Decoder bound to a live stream that reports codes as it finds them.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    /// Binds to `stream` and starts decoding in the background.
    async fn start(
        &mut self,
        stream: Arc<dyn MediaStream>,
        callback: DecodeCallback,
    ) -> Result<(), BackendInitError>;

    /// Stops decoding and releases everything `start` acquired.
    async fn reset(&mut self);

    /// Same release as [`reset`](Self::reset), without waiting. Called when
    /// the engine is dropped while still running.
    fn abort(&mut self);
}

/// What the runtime environment offers for decoding.
#[async_trait]
pub trait DecoderRuntime: Send + Sync {
    /// The built-in detector, if the environment has one.
    fn native_detector(&self) -> Option<Arc<dyn FrameProbe>>;

    /// Loads the fallback decoder.
    async fn load_fallback(&self) -> Result<Box<dyn StreamProbe>, BackendInitError>;
}

/// Intersects [`PREFERRED_FORMATS`] with what a detector supports.
///
/// An unknown supported set keeps every preferred format.
pub fn negotiate_formats(supported: Option<&[String]>) -> Vec<String> {
    PREFERRED_FORMATS
        .iter()
        .filter(|f| supported.map_or(true, |s| s.iter().any(|x| x == *f)))
        .map(|f| f.to_string())
        .collect()
}

// =============================================================================
// Decode Callback
// =============================================================================

/// Signals a stream-bound decoder sends back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSignal {
    Decoded(String),
    /// The feed ended; no more codes will come.
    FeedEnded,
}

/// Callback handed to a [`StreamProbe`].
///
/// Carries the engine's running flag. Decoders check
/// [`is_running`](Self::is_running) before continuing their loop, and the
/// callback itself drops signals once the flag is cleared.
#[derive(Clone)]
pub struct DecodeCallback {
    running: Arc<AtomicBool>,
    on_signal: Arc<dyn Fn(ProbeSignal) + Send + Sync>,
}

impl DecodeCallback {
    pub fn new(
        running: Arc<AtomicBool>,
        on_signal: impl Fn(ProbeSignal) + Send + Sync + 'static,
    ) -> Self {
        DecodeCallback {
            running,
            on_signal: Arc::new(on_signal),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Reports a decoded value. Returns false if the engine has stopped.
    pub fn decoded(&self, code: &str) -> bool {
        if !self.is_running() {
            return false;
        }
        (self.on_signal)(ProbeSignal::Decoded(code.to_string()));
        true
    }

    pub fn feed_ended(&self) {
        if self.is_running() {
            (self.on_signal)(ProbeSignal::FeedEnded);
        }
    }
}

impl fmt::Debug for DecodeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeCallback")
            .field("running", &self.is_running())
            .finish()
    }
}

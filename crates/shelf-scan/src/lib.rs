//! # shelf-scan: Scanner Engine for Shelf Counter
//!
//! Turns a capture device into a stream of debounced codes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CameraSource ──open()──► MediaStream                                  │
//! │                               │                                         │
//! │           ┌───────────────────┴───────────────────┐                     │
//! │           ▼                                       ▼                     │
//! │   FrameProbe (native)                     StreamProbe (fallback)       │
//! │   polled every frame interval             calls back per decode        │
//! │           │                                       │                     │
//! │           └───────────────────┬───────────────────┘                     │
//! │                               ▼                                         │
//! │                 ★ ScannerEngine (THIS CRATE) ★                          │
//! │                 running flag → Debouncer → DetectionSink               │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                ScanEvent::Detected(code) → app → InventoryLedger       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - State machine, frame loop, detection events
//! - [`camera`] - Device and stream abstractions, device list
//! - [`probe`] - Decode backend interfaces
//! - [`wedge`] - Line devices (hand-held scanners, standard input)
//! - [`error`] - Error types

pub mod camera;
pub mod engine;
pub mod error;
pub mod probe;
pub mod wedge;

pub use camera::{watch_devices, CameraSource, DeviceList, Frame, MediaStream, VideoDevice};
pub use engine::{
    ChannelSink, Clock, DetectionSink, EngineSettings, EngineState, ScanEvent, ScannerEngine,
    SystemClock,
};
pub use error::{BackendInitError, CameraError, DecodeError, ScanError, ScanResult};
pub use probe::{Backend, DecodeCallback, DecoderRuntime, Detection, FrameProbe, StreamProbe};
pub use wedge::{BlockingFeed, WedgeCamera, WedgeDevice, WedgeRuntime};

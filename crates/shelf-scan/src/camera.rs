//! # Camera Abstractions
//!
//! What the engine needs from a capture device, and the device list the
//! operator picks from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CameraSource                                                          │
//! │  ├── enumerate()          → [VideoDevice { id, label }]                │
//! │  ├── open(device_id)      → Arc<dyn MediaStream>   (exclusive)         │
//! │  └── subscribe_changes()  → hot-plug notifications (optional)          │
//! │                                                                         │
//! │  MediaStream                                                           │
//! │  ├── capture_frame()      → current frame (native backend)             │
//! │  ├── take_feed()          → raw live feed (stream-bound backend)       │
//! │  └── stop_tracks()        → release the device                         │
//! │                                                                         │
//! │  DeviceList  ◄── refresh() on demand and on every hot-plug event       │
//! │  (owned by the app; the engine only receives the selected id)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CameraError;

/// A raw live feed a stream-bound decoder can read from.
pub type LiveFeed = Box<dyn AsyncRead + Send + Unpin>;

/// One video input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDevice {
    /// Opaque identifier passed back to [`CameraSource::open`].
    pub id: String,
    /// Human-readable name. May be empty before permission is granted.
    pub label: String,
}

/// A single captured image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Pixel data in the capture format of the device.
    pub data: Vec<u8>,
}

/// Provider of capture devices.
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Lists available video input devices.
    async fn enumerate(&self) -> Result<Vec<VideoDevice>, CameraError>;

    /// Acquires exclusive access to a device. `None` picks the default one.
    async fn open(&self, device_id: Option<&str>) -> Result<Arc<dyn MediaStream>, CameraError>;

    /// Notifications fired when devices are plugged or unplugged.
    fn subscribe_changes(&self) -> Option<broadcast::Receiver<()>> {
        None
    }
}

/// An acquired capture stream.
pub trait MediaStream: Send + Sync {
    fn id(&self) -> &str;

    /// Grabs the current frame, if the stream produces images.
    fn capture_frame(&self) -> Option<Frame>;

    /// Hands out the raw feed. Only the first call returns it.
    fn take_feed(&self) -> Option<LiveFeed>;

    /// Stops every track of the stream. Returns how many were still live;
    /// a second call returns 0.
    fn stop_tracks(&self) -> usize;
}

// =============================================================================
// Device List
// =============================================================================

/// The operator-visible list of devices plus the current selection.
pub struct DeviceList {
    source: Arc<dyn CameraSource>,
    devices: Vec<VideoDevice>,
    selected: Option<String>,
}

impl DeviceList {
    pub fn new(source: Arc<dyn CameraSource>) -> Self {
        DeviceList {
            source,
            devices: Vec::new(),
            selected: None,
        }
    }

    /// Re-queries the source.
    ///
    /// Unlabeled devices are shown as `Camera <n>` (1-based). On failure the
    /// previous list is kept. The selection survives when its device is
    /// still present, otherwise it moves to the first device.
    pub async fn refresh(&mut self) -> &[VideoDevice] {
        match self.source.enumerate().await {
            Ok(found) => {
                self.devices = found
                    .into_iter()
                    .enumerate()
                    .map(|(i, device)| VideoDevice {
                        label: if device.label.trim().is_empty() {
                            format!("Camera {}", i + 1)
                        } else {
                            device.label
                        },
                        id: device.id,
                    })
                    .collect();

                let still_present = self
                    .selected
                    .as_ref()
                    .is_some_and(|id| self.devices.iter().any(|d| &d.id == id));
                if !still_present {
                    self.selected = self.devices.first().map(|d| d.id.clone());
                }

                debug!(count = self.devices.len(), "Device list refreshed");
            }
            Err(e) => {
                warn!(error = %e, "Device enumeration failed, keeping previous list");
            }
        }

        &self.devices
    }

    /// Selects a listed device.
    pub fn select(&mut self, device_id: &str) -> Result<(), CameraError> {
        if self.devices.iter().any(|d| d.id == device_id) {
            self.selected = Some(device_id.to_string());
            Ok(())
        } else {
            Err(CameraError::NotFound {
                device: device_id.to_string(),
            })
        }
    }

    /// The identifier to pass to `ScannerEngine::start`.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn devices(&self) -> &[VideoDevice] {
        &self.devices
    }
}

/// Refreshes `list` on every hot-plug notification of its source.
///
/// Returns `None` when the source has no notifications. The task ends when
/// the source drops its sender.
pub fn watch_devices(
    list: Arc<Mutex<DeviceList>>,
    source: &dyn CameraSource,
) -> Option<JoinHandle<()>> {
    let mut changes = source.subscribe_changes()?;

    Some(tokio::spawn(async move {
        info!("Watching for device changes");
        loop {
            match changes.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    list.lock().await.refresh().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("Device watch ended");
    }))
}

// =============================================================================
// Unit Tests
// =============================================================================

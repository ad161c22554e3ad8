pub mod api;
pub mod auto_save;
pub mod busy;
pub mod capture;
pub mod config;
pub mod error;
pub mod gallery;
pub mod http;
pub mod notification;
pub mod panel;
pub mod patients;
pub mod report;
pub mod thresholds;

pub use api::{Backend, DeleteResponse, UploadResponse};
pub use auto_save::{AutoSaveConfig, ThresholdAutoSave};
pub use busy::{BusyControls, Control};
pub use capture::{CaptureOutcome, CapturedFrame};
pub use config::{StationConfig, UrlTemplate};
pub use error::{ErrorKind, Failure, StationError, StationResult};
pub use gallery::{DeleteOutcome, Gallery, GalleryView, LoadTicket, Thumbnail, ThumbnailImage};
pub use http::HttpBackend;
pub use notification::{Notification, NotificationKind, Notifier};
pub use panel::{KeyOutcome, KeyPress, KnobsState, PanelKey, PanelMirror, PanelVisibility};
pub use patients::{PatientRegistration, PatientSummary, PatientTable, TableRow};
pub use thresholds::{Readouts, ThresholdField, Thresholds};

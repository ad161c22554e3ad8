//! Backend contract consumed by the station
//!
//! The backend owns all state (captures, thresholds, patients). The station
//! only issues requests and renders answers, so everything it needs is a
//! single async trait; `HttpBackend` is the production implementation.

use crate::patients::{PatientRegistration, PatientSummary};
use crate::{StationResult, Thresholds};
use serde::{Deserialize, Serialize};

/// Body of a capture deletion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequest<'a> {
    pub filename: &'a str,
    pub cedula: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Present only when the server actually stored the image
    #[serde(default)]
    pub filename: Option<String>,
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Filenames of the patient's captures
    async fn list_captures(&self, cedula: &str) -> StationResult<Vec<String>>;

    /// Raw bytes of one thumbnail; `url` is already templated and cache-busted
    async fn fetch_thumbnail(&self, url: &str) -> StationResult<Vec<u8>>;

    async fn delete_capture(&self, cedula: &str, filename: &str) -> StationResult<DeleteResponse>;

    /// Upload a JPEG as multipart form data
    async fn upload_capture(&self, cedula: &str, jpeg: Vec<u8>) -> StationResult<UploadResponse>;

    /// One JPEG frame from the live feed
    async fn grab_frame(&self) -> StationResult<Vec<u8>>;

    async fn set_predictions(&self, enabled: bool) -> StationResult<()>;

    async fn get_thresholds(&self) -> StationResult<Thresholds>;

    async fn save_thresholds(&self, thresholds: Thresholds) -> StationResult<()>;

    async fn reset_thresholds(&self) -> StationResult<Thresholds>;

    async fn list_patients(&self) -> StationResult<Vec<PatientSummary>>;

    /// Store a new patient's intake data; the answer body is ignored
    async fn register_patient(&self, patient: &PatientRegistration) -> StationResult<()>;

    /// Evidence archive (ZIP) for one patient
    async fn download_report(&self, cedula: &str) -> StationResult<Vec<u8>>;
}

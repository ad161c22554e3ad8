//! In-memory backend shared by the integration tests

use evidence_core::api::{Backend, DeleteResponse, UploadResponse};
use evidence_core::{PatientRegistration, PatientSummary, StationError, StationResult, Thresholds};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCaptures(String),
    FetchThumbnail(String),
    Delete { cedula: String, filename: String },
    Upload { cedula: String, bytes: usize },
    GrabFrame,
    SetPredictions(bool),
    GetThresholds,
    SaveThresholds(Thresholds),
    ResetThresholds,
    ListPatients,
    RegisterPatient(String),
    DownloadReport(String),
}

pub struct MockBackend {
    pub captures: Mutex<Vec<String>>,
    pub delete_response: Mutex<Option<DeleteResponse>>,
    pub upload_response: Mutex<Option<UploadResponse>>,
    pub thresholds: Mutex<Thresholds>,
    pub frame: Vec<u8>,
    /// Thumbnails whose URL contains this fail to load
    pub broken_thumbnail: Option<String>,
    pub calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            captures: Mutex::new(Vec::new()),
            delete_response: Mutex::new(Some(DeleteResponse {
                success: true,
                message: Some("Imagen eliminada".into()),
            })),
            upload_response: Mutex::new(None),
            thresholds: Mutex::new(Thresholds::default()),
            frame: sample_jpeg(32, 24),
            broken_thumbnail: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_captures(self, files: &[&str]) -> Self {
        *self.captures.lock().expect("captures lock") =
            files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn list_captures(&self, cedula: &str) -> StationResult<Vec<String>> {
        self.record(Call::ListCaptures(cedula.to_string()));
        Ok(self.captures.lock().expect("captures lock").clone())
    }

    async fn fetch_thumbnail(&self, url: &str) -> StationResult<Vec<u8>> {
        self.record(Call::FetchThumbnail(url.to_string()));
        match &self.broken_thumbnail {
            Some(marker) if url.contains(marker.as_str()) => Err(StationError::Status {
                code: 404,
                body: None,
            }),
            _ => Ok(url.as_bytes().to_vec()),
        }
    }

    async fn delete_capture(&self, cedula: &str, filename: &str) -> StationResult<DeleteResponse> {
        self.record(Call::Delete {
            cedula: cedula.to_string(),
            filename: filename.to_string(),
        });
        let response = self.delete_response.lock().expect("delete lock").clone();
        match response {
            Some(response) => {
                if response.success {
                    self.captures
                        .lock()
                        .expect("captures lock")
                        .retain(|f| f != filename);
                }
                Ok(response)
            }
            None => Err(StationError::Transport("connection reset".into())),
        }
    }

    async fn upload_capture(&self, cedula: &str, jpeg: Vec<u8>) -> StationResult<UploadResponse> {
        self.record(Call::Upload {
            cedula: cedula.to_string(),
            bytes: jpeg.len(),
        });
        let response = self.upload_response.lock().expect("upload lock").clone();
        response.ok_or_else(|| StationError::Transport("connection refused".into()))
    }

    async fn grab_frame(&self) -> StationResult<Vec<u8>> {
        self.record(Call::GrabFrame);
        Ok(self.frame.clone())
    }

    async fn set_predictions(&self, enabled: bool) -> StationResult<()> {
        self.record(Call::SetPredictions(enabled));
        Ok(())
    }

    async fn get_thresholds(&self) -> StationResult<Thresholds> {
        self.record(Call::GetThresholds);
        Ok(*self.thresholds.lock().expect("thresholds lock"))
    }

    async fn save_thresholds(&self, thresholds: Thresholds) -> StationResult<()> {
        self.record(Call::SaveThresholds(thresholds));
        *self.thresholds.lock().expect("thresholds lock") = thresholds;
        Ok(())
    }

    async fn reset_thresholds(&self) -> StationResult<Thresholds> {
        self.record(Call::ResetThresholds);
        let defaults = Thresholds::default();
        *self.thresholds.lock().expect("thresholds lock") = defaults;
        Ok(defaults)
    }

    async fn list_patients(&self) -> StationResult<Vec<PatientSummary>> {
        self.record(Call::ListPatients);
        Ok(Vec::new())
    }

    async fn register_patient(&self, patient: &PatientRegistration) -> StationResult<()> {
        self.record(Call::RegisterPatient(patient.cedula.clone()));
        Ok(())
    }

    async fn download_report(&self, cedula: &str) -> StationResult<Vec<u8>> {
        self.record(Call::DownloadReport(cedula.to_string()));
        Ok(b"PK\x03\x04".to_vec())
    }
}

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]));
    let mut out = Vec::new();
    JpegEncoder::new(&mut out)
        .encode_image(&img)
        .expect("fixture jpeg should encode");
    out
}

//! HTTP implementation of [`Backend`] on top of ureq
//!
//! ureq is blocking, so every call is moved onto tokio's blocking pool.

use crate::api::{Backend, DeleteRequest, DeleteResponse, UploadResponse};
use crate::config::{StationConfig, UrlTemplate};
use crate::patients::{PatientRegistration, PatientSummary};
use crate::{StationError, StationResult, Thresholds};
use std::io::Read;
use tracing::debug;

pub mod mjpeg;
pub mod multipart;

pub use multipart::MultipartForm;

/// Field names and file name expected by the upload endpoint
pub const UPLOAD_CEDULA_FIELD: &str = "cedula";
pub const UPLOAD_IMAGE_FIELD: &str = "image";
pub const UPLOAD_FILENAME: &str = "captura.jpg";

/// Cap on downloaded thumbnails and reports
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone)]
struct ResolvedEndpoints {
    list_captures: UrlTemplate,
    delete_capture: String,
    capture_upload: String,
    toggle_prediction: String,
    thresholds: String,
    thresholds_reset: String,
    video_feed: String,
    patients: String,
    register_patient: String,
    download: UrlTemplate,
}

#[derive(Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    endpoints: ResolvedEndpoints,
}

impl HttpBackend {
    pub fn new(config: &StationConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.http_timeout())
            .build();
        let e = &config.endpoints;

        Self {
            agent,
            endpoints: ResolvedEndpoints {
                list_captures: config.resolve_template(&e.list_captures),
                delete_capture: config.resolve(&e.delete_capture),
                capture_upload: config.resolve(&e.capture_upload),
                toggle_prediction: config.resolve(&e.toggle_prediction),
                thresholds: config.resolve(&e.thresholds),
                thresholds_reset: config.resolve(&e.thresholds_reset),
                video_feed: config.resolve(&e.video_feed),
                patients: config.resolve(&e.patients),
                register_patient: config.resolve(&e.register_patient),
                download: config.resolve_template(&e.download),
            },
        }
    }
}

/// Run a blocking request on the blocking pool
async fn blocking<T, F>(f: F) -> StationResult<T>
where
    F: FnOnce() -> StationResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StationError::Task(e.to_string()))?
}

fn read_json<T: serde::de::DeserializeOwned>(response: ureq::Response) -> StationResult<T> {
    response
        .into_json::<T>()
        .map_err(|e| StationError::Decode(e.to_string()))
}

fn read_bytes(response: ureq::Response) -> StationResult<Vec<u8>> {
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn list_captures(&self, cedula: &str) -> StationResult<Vec<String>> {
        let agent = self.agent.clone();
        let url = self.endpoints.list_captures.render(cedula, None);
        blocking(move || {
            debug!("GET {}", url);
            read_json(agent.get(&url).call()?)
        })
        .await
    }

    async fn fetch_thumbnail(&self, url: &str) -> StationResult<Vec<u8>> {
        let agent = self.agent.clone();
        let url = url.to_string();
        blocking(move || read_bytes(agent.get(&url).call()?)).await
    }

    async fn delete_capture(&self, cedula: &str, filename: &str) -> StationResult<DeleteResponse> {
        let agent = self.agent.clone();
        let url = self.endpoints.delete_capture.clone();
        let body = serde_json::to_value(DeleteRequest { filename, cedula })?;
        blocking(move || {
            debug!("POST {}", url);
            read_json(agent.post(&url).send_json(body)?)
        })
        .await
    }

    async fn upload_capture(&self, cedula: &str, jpeg: Vec<u8>) -> StationResult<UploadResponse> {
        let agent = self.agent.clone();
        let url = self.endpoints.capture_upload.clone();
        let cedula = cedula.to_string();
        blocking(move || {
            let (content_type, body) = MultipartForm::new()
                .text(UPLOAD_CEDULA_FIELD, &cedula)
                .file(UPLOAD_IMAGE_FIELD, UPLOAD_FILENAME, "image/jpeg", &jpeg)
                .finish();
            debug!("POST {} ({} bytes)", url, body.len());
            let response = agent
                .post(&url)
                .set("Content-Type", &content_type)
                .send_bytes(&body)?;
            read_json(response)
        })
        .await
    }

    async fn grab_frame(&self) -> StationResult<Vec<u8>> {
        let agent = self.agent.clone();
        let url = self.endpoints.video_feed.clone();
        blocking(move || {
            let response = agent.get(&url).call()?;
            // content_type() drops the parameters, the boundary lives in them
            let content_type = response.header("Content-Type").unwrap_or_default();
            match mjpeg::boundary_from_content_type(content_type) {
                Some(boundary) => mjpeg::read_first_part(
                    response.into_reader(),
                    &boundary,
                    mjpeg::MAX_FRAME_BYTES,
                ),
                // A plain image endpoint works as a feed too
                None => read_bytes(response),
            }
        })
        .await
    }

    async fn set_predictions(&self, enabled: bool) -> StationResult<()> {
        let agent = self.agent.clone();
        let url = self.endpoints.toggle_prediction.clone();
        blocking(move || {
            let value = if enabled { "true" } else { "false" };
            agent.post(&url).send_form(&[("enabled", value)])?;
            Ok(())
        })
        .await
    }

    async fn get_thresholds(&self) -> StationResult<Thresholds> {
        let agent = self.agent.clone();
        let url = self.endpoints.thresholds.clone();
        blocking(move || read_json(agent.get(&url).call()?)).await
    }

    async fn save_thresholds(&self, thresholds: Thresholds) -> StationResult<()> {
        let agent = self.agent.clone();
        let url = self.endpoints.thresholds.clone();
        blocking(move || {
            agent.post(&url).send_json(thresholds)?;
            Ok(())
        })
        .await
    }

    async fn reset_thresholds(&self) -> StationResult<Thresholds> {
        let agent = self.agent.clone();
        let url = self.endpoints.thresholds_reset.clone();
        blocking(move || read_json(agent.post(&url).call()?)).await
    }

    async fn list_patients(&self) -> StationResult<Vec<PatientSummary>> {
        let agent = self.agent.clone();
        let url = self.endpoints.patients.clone();
        blocking(move || read_json(agent.get(&url).call()?)).await
    }

    async fn register_patient(&self, patient: &PatientRegistration) -> StationResult<()> {
        let agent = self.agent.clone();
        let url = self.endpoints.register_patient.clone();
        let fields: Vec<(String, String)> = patient
            .form_fields()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        blocking(move || {
            debug!("POST {}", url);
            let form: Vec<(&str, &str)> =
                fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            agent.post(&url).send_form(&form)?;
            Ok(())
        })
        .await
    }

    async fn download_report(&self, cedula: &str) -> StationResult<Vec<u8>> {
        let agent = self.agent.clone();
        let url = self.endpoints.download.render(cedula, None);
        blocking(move || read_bytes(agent.get(&url).call()?)).await
    }
}

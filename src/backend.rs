use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::Appointment;

pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Text recovered from one uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrText {
    #[serde(rename = "OCR")]
    pub ocr: String,
    #[serde(rename = "Latinized")]
    pub latinized: String,
}

#[derive(Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    appointments: Vec<Appointment>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// OCR/latinization and structured extraction service
pub trait Backend: Send + Sync {
    fn ocr_and_latinize<'a>(&'a self, image: Vec<u8>, mime: &'a str) -> BackendFuture<'a, OcrText>;

    fn extract_appointments<'a>(&'a self, text: &'a str) -> BackendFuture<'a, Vec<Appointment>>;
}

/// `Backend` reached over HTTP
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(format!("mobility-desk/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turns a non-2xx reply into `BackendError::Status`, keeping the upstream message
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or(body);
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

impl Backend for HttpBackend {
    fn ocr_and_latinize<'a>(&'a self, image: Vec<u8>, mime: &'a str) -> BackendFuture<'a, OcrText> {
        Box::pin(async move {
            let extension = mime.rsplit('/').next().unwrap_or("png");
            let part = Part::bytes(image)
                .file_name(format!("upload.{}", extension))
                .mime_str(mime)?;
            let form = Form::new().part("file", part);

            let resp = self
                .http_client
                .post(self.url("ocr_and_latinize_image"))
                .multipart(form)
                .send()
                .await?;
            let resp = check_status(resp).await?;
            Ok(resp.json::<OcrText>().await?)
        })
    }

    fn extract_appointments<'a>(&'a self, text: &'a str) -> BackendFuture<'a, Vec<Appointment>> {
        Box::pin(async move {
            let resp = self
                .http_client
                .post(self.url("extract_appointment_data"))
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?;
            let resp = check_status(resp).await?;
            Ok(resp.json::<ExtractionResponse>().await?.appointments)
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn ocr_posts_multipart_and_reads_both_texts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ocr_and_latinize_image"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "OCR": "بدایت محکمه سی",
                "Latinized": "Bidayet Mahkemesi"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri()).unwrap();
        let text = backend
            .ocr_and_latinize(vec![0x89, b'P', b'N', b'G'], "image/png")
            .await
            .unwrap();
        assert_eq!(text.latinized, "Bidayet Mahkemesi");
        assert_eq!(text.ocr, "بدایت محکمه سی");
    }

    #[tokio::test]
    async fn extraction_sends_text_and_defaults_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/extract_appointment_data"))
            .and(body_json(serde_json::json!({ "text": "Tiran kazasi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "appointments": [
                    { "name": "Ali Riza Efendi", "fromCity": "Bingazi", "toCity": "Tiran" }
                ]
            })))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/", server.uri())).unwrap();
        let appointments = backend.extract_appointments("Tiran kazasi").await.unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].to_city, "Tiran");
        assert_eq!(appointments[0].salary, "");
    }

    #[tokio::test]
    async fn upstream_message_is_kept_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/extract_appointment_data"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({ "message": "Invalid JSON" })),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri()).unwrap();
        match backend.extract_appointments("x").await {
            Err(BackendError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid JSON");
            }
            other => panic!("unexpected: {:?}", other.map(|a| a.len())),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
        let result = backend.ocr_and_latinize(vec![1, 2, 3], "image/png").await;
        assert!(matches!(result, Err(BackendError::Request(_))));
    }
}

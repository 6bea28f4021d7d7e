use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{info, warn};

use super::http::{ensure_success, request_error};
use super::{Desktop, LocalDetector, ObjectDetector, ServiceError, ServiceFuture};

const SERVICE: &str = "object_detection";
pub const MIN_DETECTION_CONFIDENCE: f64 = 0.5;

/// Captures one camera frame and asks the remote detector for labels,
/// deferring to the local detector when the remote is absent or fails.
#[derive(Clone)]
pub struct CameraObjectDetector {
    client: reqwest::Client,
    endpoint: Option<String>,
    desktop: Arc<dyn Desktop>,
    local: Option<Arc<dyn LocalDetector>>,
}

impl CameraObjectDetector {
    pub fn new(
        client: reqwest::Client,
        endpoint: Option<String>,
        desktop: Arc<dyn Desktop>,
    ) -> Self {
        Self {
            client,
            endpoint,
            desktop,
            local: None,
        }
    }

    pub fn with_local_fallback(mut self, local: Arc<dyn LocalDetector>) -> Self {
        self.local = Some(local);
        self
    }

    async fn detect_frame(&self) -> Result<Vec<String>, ServiceError> {
        let frame = self.desktop.capture_camera_frame().await?;

        let remote_error = match self.endpoint.as_deref() {
            Some(endpoint) => match self.detect_remote(endpoint, &frame).await {
                Ok(labels) => {
                    info!(service = SERVICE, count = labels.len(), "remote detection finished");
                    return Ok(labels);
                }
                Err(err) => {
                    warn!(service = SERVICE, error = %err, "remote detection failed");
                    Some(err)
                }
            },
            None => None,
        };

        match &self.local {
            Some(local) => {
                info!(service = SERVICE, "running local detection fallback");
                local.detect(&frame).await
            }
            None => Err(remote_error.unwrap_or(ServiceError::NotConfigured(
                "object detection endpoint",
            ))),
        }
    }

    async fn detect_remote(
        &self,
        endpoint: &str,
        frame: &[u8],
    ) -> Result<Vec<String>, ServiceError> {
        let part = Part::bytes(frame.to_vec())
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))?;
        let response = self
            .client
            .post(endpoint)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|err| request_error(SERVICE, err))?;
        let response = ensure_success(SERVICE, response).await?;
        let payload = response
            .json::<Value>()
            .await
            .map_err(|_| ServiceError::InvalidPayload("response_json_parse_failed".to_string()))?;

        parse_detections(&payload)
    }
}

impl ObjectDetector for CameraObjectDetector {
    fn capture_and_detect<'a>(&'a self) -> ServiceFuture<'a, Result<Vec<String>, ServiceError>> {
        Box::pin(self.detect_frame())
    }
}

/// Reads `detections[0]` as a list of `{ name, confidence }` and keeps the
/// names above the confidence threshold.
pub fn parse_detections(payload: &Value) -> Result<Vec<String>, ServiceError> {
    let detections = payload
        .get("detections")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::InvalidPayload("missing_detections".to_string()))?;

    let Some(first) = detections.first() else {
        return Ok(Vec::new());
    };
    let objects = first
        .as_array()
        .ok_or_else(|| ServiceError::InvalidPayload("unexpected_detection_shape".to_string()))?;

    Ok(objects
        .iter()
        .filter(|object| {
            object
                .get("confidence")
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
                > MIN_DETECTION_CONFIDENCE
        })
        .filter_map(|object| object.get("name").and_then(Value::as_str))
        .map(ToString::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_detections;
    use crate::services::ServiceError;

    #[test]
    fn keeps_names_above_confidence_threshold() {
        let labels = parse_detections(&json!({
            "detections": [[
                { "name": "person", "confidence": 0.91 },
                { "name": "cup", "confidence": 0.5 },
                { "name": "laptop", "confidence": 0.77 },
                { "name": "ghost" }
            ]]
        }))
        .expect("payload should parse");

        assert_eq!(labels, vec!["person".to_string(), "laptop".to_string()]);
    }

    #[test]
    fn empty_detection_list_means_nothing_seen() {
        let labels = parse_detections(&json!({ "detections": [] })).expect("payload should parse");
        assert!(labels.is_empty());
    }

    #[test]
    fn unexpected_shapes_are_invalid_payloads() {
        assert!(matches!(
            parse_detections(&json!({ "labels": ["cat"] })),
            Err(ServiceError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_detections(&json!({ "detections": [{ "name": "cat" }] })),
            Err(ServiceError::InvalidPayload(_))
        ));
    }
}

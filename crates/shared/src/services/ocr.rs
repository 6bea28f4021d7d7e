use std::io::Cursor;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info};

use super::http::{ensure_success, request_error};
use super::{Desktop, OcrClicker, ScreenSize, ServiceError, ServiceFuture};

const SERVICE: &str = "ocr";

/// Screenshots the desktop, asks the OCR endpoint where `search_text` is, and
/// clicks there.
#[derive(Clone)]
pub struct RemoteOcrClicker {
    client: reqwest::Client,
    endpoint: Option<String>,
    desktop: Arc<dyn Desktop>,
}

impl RemoteOcrClicker {
    pub fn new(
        client: reqwest::Client,
        endpoint: Option<String>,
        desktop: Arc<dyn Desktop>,
    ) -> Self {
        Self {
            client,
            endpoint,
            desktop,
        }
    }

    async fn click_text(&self, search_text: &str) -> Result<String, ServiceError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(ServiceError::NotConfigured("ocr endpoint"))?;

        let capture = tempfile::Builder::new()
            .prefix("ava-ocr-")
            .suffix(".png")
            .tempfile()?;
        self.desktop.capture_screen(capture.path()).await?;
        let screenshot = tokio::fs::read(capture.path()).await?;
        let image_size = png_dimensions(&screenshot)?;
        debug!(
            service = SERVICE,
            width = image_size.width,
            height = image_size.height,
            "captured screen"
        );

        let image_part = Part::bytes(screenshot)
            .file_name("screen.png")
            .mime_str("image/png")
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))?;
        let form = Form::new()
            .part("image", image_part)
            .text("search_string", search_text.to_string());

        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| request_error(SERVICE, err))?;
        let response = ensure_success(SERVICE, response).await?;
        let payload = response
            .json::<Value>()
            .await
            .map_err(|_| ServiceError::InvalidPayload("response_json_parse_failed".to_string()))?;

        let (x, y) = parse_point(&payload)
            .ok_or_else(|| ServiceError::NotFound(format!("'{search_text}' on screen")))?;
        let screen = self.desktop.screen_size().await?;
        let (x, y) = scale_point(x, y, image_size, screen);

        self.desktop.click(x, y).await?;
        info!(service = SERVICE, x, y, "clicked recognized text");

        Ok(format!("Clicked '{search_text}' at ({x:.0}, {y:.0})"))
    }
}

impl OcrClicker for RemoteOcrClicker {
    fn locate_and_click<'a>(
        &'a self,
        search_text: &'a str,
    ) -> ServiceFuture<'a, Result<String, ServiceError>> {
        Box::pin(self.click_text(search_text))
    }
}

/// Reads `point: [x, y]`; coordinates may be numbers or numeric strings.
pub fn parse_point(payload: &Value) -> Option<(f64, f64)> {
    let point = payload.get("point")?.as_array()?;
    if point.len() < 2 {
        return None;
    }

    let coordinate = |value: &Value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };

    Some((coordinate(&point[0])?, coordinate(&point[1])?))
}

/// Maps a point from screenshot pixels to screen coordinates. HiDPI captures
/// are larger than the logical screen.
pub fn scale_point(x: f64, y: f64, image: ScreenSize, screen: ScreenSize) -> (f64, f64) {
    if image == screen || image.width == 0 || image.height == 0 {
        return (x, y);
    }

    let scale_x = f64::from(screen.width) / f64::from(image.width);
    let scale_y = f64::from(screen.height) / f64::from(image.height);
    (x * scale_x, y * scale_y)
}

fn png_dimensions(bytes: &[u8]) -> Result<ScreenSize, ServiceError> {
    let (width, height) = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| ServiceError::InvalidPayload(format!("screenshot: {err}")))?
        .into_dimensions()
        .map_err(|err| ServiceError::InvalidPayload(format!("screenshot: {err}")))?;

    Ok(ScreenSize { width, height })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{parse_point, scale_point};
    use crate::services::ScreenSize;

    #[test]
    fn parses_numeric_and_string_coordinates() {
        assert_eq!(parse_point(&json!({ "point": [10, 20.5] })), Some((10.0, 20.5)));
        assert_eq!(parse_point(&json!({ "point": ["7", " 8.5 "] })), Some((7.0, 8.5)));
        assert_eq!(parse_point(&json!({ "point": [1] })), None);
        assert_eq!(parse_point(&json!({ "point": null })), None);
        assert_eq!(parse_point(&json!({})), None);
    }

    #[test]
    fn scales_hidpi_capture_down_to_screen() {
        let image = ScreenSize {
            width: 3840,
            height: 2160,
        };
        let screen = ScreenSize {
            width: 1920,
            height: 1080,
        };
        assert_eq!(scale_point(1000.0, 500.0, image, screen), (500.0, 250.0));
    }

    #[test]
    fn leaves_point_alone_when_sizes_match() {
        let size = ScreenSize {
            width: 1920,
            height: 1080,
        };
        assert_eq!(scale_point(12.0, 34.0, size, size), (12.0, 34.0));
    }
}

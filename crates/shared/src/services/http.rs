use std::time::Duration;

use tracing::warn;

use super::ServiceError;

const ERROR_BODY_LOG_MAX_CHARS: usize = 200;

pub fn build_client(timeout_ms: u64) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|err| ServiceError::Unavailable(format!("http client: {err}")))
}

pub(crate) fn request_error(service: &'static str, err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        warn!(service, "request timed out");
        ServiceError::Timeout
    } else {
        warn!(service, error = %err, "request failed");
        ServiceError::Unavailable("request_unavailable".to_string())
    }
}

/// Turns a non-2xx response into `ServiceError::Http`, logging a short body
/// excerpt for diagnostics.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let excerpt = body.chars().take(ERROR_BODY_LOG_MAX_CHARS).collect::<String>();
    warn!(service, status = status.as_u16(), body = %excerpt, "service returned an error status");
    Err(ServiceError::Http {
        status: status.as_u16(),
    })
}

pub(crate) fn join_endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::join_endpoint;

    #[test]
    fn join_endpoint_normalizes_slashes() {
        assert_eq!(
            join_endpoint("https://gen.example/", "/generate"),
            "https://gen.example/generate"
        );
        assert_eq!(
            join_endpoint("https://gen.example", "generate"),
            "https://gen.example/generate"
        );
    }
}

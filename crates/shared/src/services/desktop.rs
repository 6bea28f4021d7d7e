//! X11 desktop glue built on command-line tools: `gnome-screenshot` for the
//! screen, `xdotool` for pointer and keyboard, `fswebcam` for the camera.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::{Desktop, ScreenSize, ServiceError, ServiceFuture};

const SERVICE: &str = "desktop";
const LAUNCHER_SETTLE_DELAY: Duration = Duration::from_millis(500);
const APP_SEARCH_DELAY: Duration = Duration::from_secs(2);
const STDERR_LOG_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct CommandDesktop;

async fn run(program: &str, args: &[&str]) -> Result<Vec<u8>, ServiceError> {
    debug!(service = SERVICE, program, ?args, "running command");
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| ServiceError::Unavailable(format!("failed to run {program}: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr)
            .chars()
            .take(STDERR_LOG_MAX_CHARS)
            .collect::<String>();
        warn!(
            service = SERVICE,
            program,
            status = %output.status,
            stderr = %stderr,
            "command failed"
        );
        return Err(ServiceError::Unavailable(format!(
            "{program} exited with {}",
            output.status
        )));
    }

    Ok(output.stdout)
}

fn path_arg(path: &Path) -> Result<&str, ServiceError> {
    path.to_str()
        .ok_or_else(|| ServiceError::Io(format!("non-utf8 path {}", path.display())))
}

impl CommandDesktop {
    pub fn new() -> Self {
        Self
    }

    async fn capture_screen_to(&self, destination: &Path) -> Result<(), ServiceError> {
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        run("gnome-screenshot", &["-f", path_arg(destination)?]).await?;
        Ok(())
    }

    async fn query_screen_size(&self) -> Result<ScreenSize, ServiceError> {
        let stdout = run("xdotool", &["getdisplaygeometry"]).await?;
        parse_geometry(&String::from_utf8_lossy(&stdout)).ok_or_else(|| {
            ServiceError::InvalidPayload("unexpected xdotool geometry output".to_string())
        })
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), ServiceError> {
        let x = x.round().max(0.0).to_string();
        let y = y.round().max(0.0).to_string();
        run("xdotool", &["mousemove", &x, &y, "click", "1"]).await?;
        Ok(())
    }

    async fn launch(&self, app: &str) -> Result<(), ServiceError> {
        run("xdotool", &["key", "super"]).await?;
        tokio::time::sleep(LAUNCHER_SETTLE_DELAY).await;
        run("xdotool", &["type", "--", app]).await?;
        tokio::time::sleep(APP_SEARCH_DELAY).await;
        run("xdotool", &["key", "Return"]).await?;
        Ok(())
    }

    async fn camera_frame(&self) -> Result<Vec<u8>, ServiceError> {
        let frame = tempfile::Builder::new()
            .prefix("ava-camera-")
            .suffix(".jpg")
            .tempfile()?;
        run(
            "fswebcam",
            &["-q", "--no-banner", "-r", "640x480", path_arg(frame.path())?],
        )
        .await?;

        let bytes = tokio::fs::read(frame.path()).await?;
        if bytes.is_empty() {
            return Err(ServiceError::Unavailable("camera returned no frame".to_string()));
        }
        Ok(bytes)
    }
}

impl Desktop for CommandDesktop {
    fn capture_screen<'a>(
        &'a self,
        destination: &'a Path,
    ) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(self.capture_screen_to(destination))
    }

    fn screen_size<'a>(&'a self) -> ServiceFuture<'a, Result<ScreenSize, ServiceError>> {
        Box::pin(self.query_screen_size())
    }

    fn click<'a>(&'a self, x: f64, y: f64) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(self.click_at(x, y))
    }

    fn launch_app<'a>(&'a self, app: &'a str) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(self.launch(app))
    }

    fn capture_camera_frame<'a>(&'a self) -> ServiceFuture<'a, Result<Vec<u8>, ServiceError>> {
        Box::pin(self.camera_frame())
    }

    fn open_path<'a>(&'a self, path: &'a Path) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            open::that_detached(path).map_err(|err| {
                warn!(service = SERVICE, path = %path.display(), error = %err, "open failed");
                ServiceError::from(err)
            })
        })
    }
}

/// Parses `xdotool getdisplaygeometry` output, e.g. `1920 1080`.
pub fn parse_geometry(raw: &str) -> Option<ScreenSize> {
    let mut parts = raw.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some(ScreenSize { width, height })
}

#[cfg(test)]
mod tests {
    use super::parse_geometry;
    use crate::services::ScreenSize;

    #[test]
    fn parses_display_geometry() {
        assert_eq!(
            parse_geometry("1920 1080\n"),
            Some(ScreenSize {
                width: 1920,
                height: 1080
            })
        );
        assert_eq!(parse_geometry("1920"), None);
        assert_eq!(parse_geometry("wide tall"), None);
    }
}

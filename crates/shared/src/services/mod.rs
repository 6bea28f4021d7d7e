//! Narrow interfaces to everything the router delegates: speech, prompts,
//! remote vision/generation endpoints, mail, lookups, and the desktop.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use thiserror::Error;

pub mod desktop;
pub mod http;
pub mod image_generation;
pub mod mail;
pub mod object_detection;
pub mod ocr;
pub mod slides;
pub mod wikipedia;

pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("request timed out")]
    Timeout,
    #[error("service responded with status {status}")]
    Http { status: u16 },
    #[error("service returned an invalid payload: {0}")]
    InvalidPayload(String),
    #[error("service is unavailable: {0}")]
    Unavailable(String),
    #[error("nothing found for {0}")]
    NotFound(String),
    #[error("{0}")]
    Io(String),
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Blocking "ask the user and wait" channel. Returns an empty string when
/// nothing was captured.
pub trait PromptInput: Send + Sync {
    fn prompt_and_wait<'a>(&'a self) -> ServiceFuture<'a, String>;
}

pub trait SpeechOutput: Send + Sync {
    fn speak<'a>(&'a self, text: &'a str) -> ServiceFuture<'a, ()>;
}

pub trait OcrClicker: Send + Sync {
    fn locate_and_click<'a>(
        &'a self,
        search_text: &'a str,
    ) -> ServiceFuture<'a, Result<String, ServiceError>>;
}

pub trait ImageGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> ServiceFuture<'a, Result<Vec<PathBuf>, ServiceError>>;
}

pub trait ObjectDetector: Send + Sync {
    fn capture_and_detect<'a>(&'a self) -> ServiceFuture<'a, Result<Vec<String>, ServiceError>>;
}

/// Offline detector consulted when the remote endpoint is absent or fails.
pub trait LocalDetector: Send + Sync {
    fn detect<'a>(
        &'a self,
        frame_jpeg: &'a [u8],
    ) -> ServiceFuture<'a, Result<Vec<String>, ServiceError>>;
}

pub trait SlideDeckGenerator: Send + Sync {
    fn generate<'a>(&'a self, topic: &'a str) -> ServiceFuture<'a, Result<PathBuf, ServiceError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub sender: String,
    pub credential: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

pub trait MailSender: Send + Sync {
    /// Returns a user-facing confirmation on success.
    fn send<'a>(
        &'a self,
        mail: &'a OutgoingMail,
    ) -> ServiceFuture<'a, Result<String, ServiceError>>;
}

pub trait SummaryLookup: Send + Sync {
    fn summary<'a>(&'a self, topic: &'a str) -> ServiceFuture<'a, Result<String, ServiceError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// OS integration: screen capture, pointer and keyboard injection, the
/// camera, and handing files to the desktop's default viewer.
pub trait Desktop: Send + Sync {
    fn capture_screen<'a>(
        &'a self,
        destination: &'a Path,
    ) -> ServiceFuture<'a, Result<(), ServiceError>>;
    fn screen_size<'a>(&'a self) -> ServiceFuture<'a, Result<ScreenSize, ServiceError>>;
    fn click<'a>(&'a self, x: f64, y: f64) -> ServiceFuture<'a, Result<(), ServiceError>>;
    /// Presses the launcher key, types `app`, waits, then confirms with Enter.
    fn launch_app<'a>(&'a self, app: &'a str) -> ServiceFuture<'a, Result<(), ServiceError>>;
    fn capture_camera_frame<'a>(&'a self) -> ServiceFuture<'a, Result<Vec<u8>, ServiceError>>;
    fn open_path<'a>(&'a self, path: &'a Path) -> ServiceFuture<'a, Result<(), ServiceError>>;
}

#![allow(dead_code)]

pub mod doubles;

use std::path::Path;
use std::sync::Arc;

use ava_assistant::{Collaborators, Router, RouterSettings};
use shared::config::MailConfig;

use doubles::{
    FixedClock, RecordingDesktop, RecordingDetector, RecordingImages, RecordingLookup,
    RecordingMail, RecordingOcr, RecordingSlides, RecordingSpeech, ScriptedChat, ScriptedPrompt,
};

/// One set of recording collaborators. Replace a field before calling
/// [`Doubles::router`] to change how that collaborator behaves.
pub struct Doubles {
    pub prompt: Arc<ScriptedPrompt>,
    pub speech: Arc<RecordingSpeech>,
    pub desktop: Arc<RecordingDesktop>,
    pub ocr: Arc<RecordingOcr>,
    pub images: Arc<RecordingImages>,
    pub detector: Arc<RecordingDetector>,
    pub slides: Arc<RecordingSlides>,
    pub mail: Arc<RecordingMail>,
    pub lookup: Arc<RecordingLookup>,
    pub chat: Arc<ScriptedChat>,
    pub clock: Arc<FixedClock>,
}

impl Default for Doubles {
    fn default() -> Self {
        Self {
            prompt: Arc::new(ScriptedPrompt::answering(&[])),
            speech: Arc::new(RecordingSpeech::default()),
            desktop: Arc::new(RecordingDesktop::default()),
            ocr: Arc::new(RecordingOcr::default()),
            images: Arc::new(RecordingImages::succeeding()),
            detector: Arc::new(RecordingDetector::seeing(&["person", "cup"])),
            slides: Arc::new(RecordingSlides::default()),
            mail: Arc::new(RecordingMail::succeeding()),
            lookup: Arc::new(RecordingLookup::answering("Rust is a language.")),
            chat: Arc::new(ScriptedChat::replying(&[])),
            clock: Arc::new(FixedClock::afternoon()),
        }
    }
}

impl Doubles {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            prompt: self.prompt.clone(),
            speech: self.speech.clone(),
            desktop: self.desktop.clone(),
            ocr: self.ocr.clone(),
            images: self.images.clone(),
            detector: self.detector.clone(),
            slides: self.slides.clone(),
            mail: self.mail.clone(),
            encyclopedia: self.lookup.clone(),
            chat: self.chat.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn router(&self, dir: &Path) -> Router {
        self.router_with_mail(dir, complete_mail())
    }

    pub fn router_with_mail(&self, dir: &Path, mail: MailConfig) -> Router {
        let settings = RouterSettings {
            mail,
            tasks_path: dir.join("todo.txt"),
            screenshot_dir: dir.join("shots"),
        };
        Router::new(settings, self.collaborators())
    }
}

pub fn complete_mail() -> MailConfig {
    MailConfig {
        app_password: Some("app-password".to_string()),
        sender: Some("ava@example.com".to_string()),
        recipient: Some("friend@example.com".to_string()),
    }
}

//! The command router: resolves an utterance to an intent, runs the matching
//! handler and always produces a non-empty reply.

mod email;
mod lookup;
mod media;
mod system;
mod tasks;

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::FutureExt;
use shared::config::{AssistantConfig, MailConfig};
use shared::intents::{RoutedUtterance, route_utterance};
use shared::llm::{ChatGateway, ChatPurpose, ChatSession, template_for_purpose};
use shared::models::{AssistantReply, Intent};
use shared::services::{
    Desktop, ImageGenerator, MailSender, ObjectDetector, OcrClicker, PromptInput,
    SlideDeckGenerator, SpeechOutput, SummaryLookup,
};
use shared::tasks::TaskStore;
use tracing::{error, info};

pub const GOODBYE: &str = "Goodbye!";
pub const CHAT_FALLBACK: &str = "I didn't quite get that.";
pub const UNEXPECTED_FAILURE: &str = "Sorry, something went wrong while handling that request.";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Everything the router delegates to.
#[derive(Clone)]
pub struct Collaborators {
    pub prompt: Arc<dyn PromptInput>,
    pub speech: Arc<dyn SpeechOutput>,
    pub desktop: Arc<dyn Desktop>,
    pub ocr: Arc<dyn OcrClicker>,
    pub images: Arc<dyn ImageGenerator>,
    pub detector: Arc<dyn ObjectDetector>,
    pub slides: Arc<dyn SlideDeckGenerator>,
    pub mail: Arc<dyn MailSender>,
    pub encyclopedia: Arc<dyn SummaryLookup>,
    pub chat: Arc<dyn ChatGateway>,
    pub clock: Arc<dyn Clock>,
}

/// Router-local settings taken from the process configuration.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub mail: MailConfig,
    pub tasks_path: PathBuf,
    pub screenshot_dir: PathBuf,
}

impl From<&AssistantConfig> for RouterSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            mail: config.mail.clone(),
            tasks_path: config.tasks_path.clone(),
            screenshot_dir: config.screenshot_dir.clone(),
        }
    }
}

pub struct Router {
    collaborators: Collaborators,
    settings: RouterSettings,
    tasks: TaskStore,
    session: ChatSession,
}

impl Router {
    pub fn new(settings: RouterSettings, collaborators: Collaborators) -> Self {
        let template = template_for_purpose(ChatPurpose::Conversation);
        Self {
            tasks: TaskStore::new(settings.tasks_path.clone()),
            session: ChatSession::new(template.system_prompt),
            collaborators,
            settings,
        }
    }

    /// Answers one utterance. Never fails and never returns an empty string.
    pub async fn handle(&mut self, utterance: &str) -> String {
        self.handle_reply(utterance).await.text
    }

    /// Like [`Router::handle`], also reporting which intent answered so the
    /// host can decide whether to stop.
    pub async fn handle_reply(&mut self, utterance: &str) -> AssistantReply {
        let routed = route_utterance(utterance);
        info!(
            intent = %routed.intent,
            argument_chars = routed.argument.chars().count(),
            "routing utterance"
        );

        let text = match AssertUnwindSafe(self.dispatch(&routed))
            .catch_unwind()
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => CHAT_FALLBACK.to_string(),
            Err(_) => {
                error!(intent = %routed.intent, "handler panicked");
                UNEXPECTED_FAILURE.to_string()
            }
        };

        AssistantReply::new(routed.intent, text)
    }

    /// Forgets the conversational history.
    pub fn reset_conversation(&mut self) {
        self.session.reset();
        info!("conversation reset");
    }

    pub fn conversation_turns(&self) -> usize {
        self.session.turns().len()
    }

    async fn dispatch(&mut self, routed: &RoutedUtterance) -> String {
        let argument = routed.argument.as_str();
        let clock = self.collaborators.clock.as_ref();

        match routed.intent {
            Intent::Exit => GOODBYE.to_string(),
            Intent::Time => system::current_time(clock.now()),
            Intent::Date => system::current_date(clock.now()),
            Intent::Screenshot => {
                media::screenshot(
                    self.collaborators.desktop.as_ref(),
                    &self.settings.screenshot_dir,
                    clock.now(),
                )
                .await
            }
            Intent::GenerateImage => media::generate_image(&self.collaborators, argument).await,
            Intent::GeneratePresentation => {
                media::generate_presentation(&self.collaborators, argument).await
            }
            Intent::OcrClick => media::ocr_click(&self.collaborators, argument).await,
            Intent::Detect => media::detect_objects(&self.collaborators).await,
            Intent::TaskAdd => tasks::add(&self.tasks, argument),
            Intent::TaskShow => tasks::show(&self.tasks),
            Intent::TaskDelete => tasks::delete(&self.tasks, argument),
            Intent::SendEmail => email::run(&self.collaborators, &self.settings.mail).await,
            Intent::Wikipedia => {
                lookup::wikipedia(self.collaborators.encyclopedia.as_ref(), argument).await
            }
            Intent::OpenApp => {
                lookup::open_app(self.collaborators.desktop.as_ref(), argument).await
            }
            Intent::Chat => {
                lookup::chat(
                    &mut self.session,
                    self.collaborators.chat.as_ref(),
                    argument,
                )
                .await
            }
        }
    }
}

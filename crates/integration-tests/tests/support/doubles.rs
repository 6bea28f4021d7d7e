use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ava_assistant::Clock;
use chrono::{DateTime, Local, TimeZone};
use shared::llm::{
    ChatGateway, ChatGatewayError, ChatGatewayFuture, ChatGatewayRequest, ChatGatewayResponse,
};
use shared::services::{
    Desktop, ImageGenerator, MailSender, ObjectDetector, OcrClicker, OutgoingMail, PromptInput,
    ScreenSize, ServiceError, ServiceFuture, SlideDeckGenerator, SpeechOutput, SummaryLookup,
};

fn snapshot<T: Clone>(records: &Mutex<Vec<T>>) -> Vec<T> {
    records.lock().expect("records lock").clone()
}

fn record<T>(records: &Mutex<Vec<T>>, value: T) {
    records.lock().expect("records lock").push(value);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PromptInput for ScriptedPrompt {
    fn prompt_and_wait<'a>(&'a self) -> ServiceFuture<'a, String> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .lock()
                .expect("answers lock")
                .pop_front()
                .unwrap_or_default()
        })
    }
}

#[derive(Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        snapshot(&self.spoken)
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak<'a>(&'a self, text: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(async move { record(&self.spoken, text.to_string()) })
    }
}

#[derive(Default)]
pub struct RecordingDesktop {
    captures: Mutex<Vec<PathBuf>>,
    launches: Mutex<Vec<String>>,
    opened: Mutex<Vec<PathBuf>>,
}

impl RecordingDesktop {
    pub fn captures(&self) -> Vec<PathBuf> {
        snapshot(&self.captures)
    }

    pub fn launches(&self) -> Vec<String> {
        snapshot(&self.launches)
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        snapshot(&self.opened)
    }
}

impl Desktop for RecordingDesktop {
    fn capture_screen<'a>(
        &'a self,
        destination: &'a Path,
    ) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            record(&self.captures, destination.to_path_buf());
            Ok(())
        })
    }

    fn screen_size<'a>(&'a self) -> ServiceFuture<'a, Result<ScreenSize, ServiceError>> {
        Box::pin(async {
            Ok(ScreenSize {
                width: 1920,
                height: 1080,
            })
        })
    }

    fn click<'a>(&'a self, _x: f64, _y: f64) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(async { Ok(()) })
    }

    fn launch_app<'a>(&'a self, app: &'a str) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            record(&self.launches, app.to_string());
            Ok(())
        })
    }

    fn capture_camera_frame<'a>(&'a self) -> ServiceFuture<'a, Result<Vec<u8>, ServiceError>> {
        Box::pin(async { Ok(b"frame".to_vec()) })
    }

    fn open_path<'a>(&'a self, path: &'a Path) -> ServiceFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            record(&self.opened, path.to_path_buf());
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct RecordingOcr {
    targets: Mutex<Vec<String>>,
}

impl RecordingOcr {
    pub fn targets(&self) -> Vec<String> {
        snapshot(&self.targets)
    }
}

impl OcrClicker for RecordingOcr {
    fn locate_and_click<'a>(
        &'a self,
        search_text: &'a str,
    ) -> ServiceFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            record(&self.targets, search_text.to_string());
            Ok(format!("Clicked '{search_text}' at (10, 20)"))
        })
    }
}

pub struct RecordingImages {
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
}

impl RecordingImages {
    pub fn succeeding() -> Self {
        Self::behaving(Behavior::Succeed)
    }

    pub fn behaving(behavior: Behavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        snapshot(&self.prompts)
    }
}

impl ImageGenerator for RecordingImages {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> ServiceFuture<'a, Result<Vec<PathBuf>, ServiceError>> {
        Box::pin(async move {
            record(&self.prompts, prompt.to_string());
            match self.behavior {
                Behavior::Succeed => Ok(vec![PathBuf::from("output/img_1.png")]),
                Behavior::Fail => Err(ServiceError::Http { status: 500 }),
                Behavior::Panic => panic!("image backend exploded"),
            }
        })
    }
}

pub struct RecordingDetector {
    behavior: Behavior,
    labels: Vec<String>,
}

impl RecordingDetector {
    pub fn seeing(labels: &[&str]) -> Self {
        Self {
            behavior: Behavior::Succeed,
            labels: labels.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn behaving(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Self::seeing(&[])
        }
    }
}

impl ObjectDetector for RecordingDetector {
    fn capture_and_detect<'a>(&'a self) -> ServiceFuture<'a, Result<Vec<String>, ServiceError>> {
        Box::pin(async move {
            match self.behavior {
                Behavior::Succeed => Ok(self.labels.clone()),
                Behavior::Fail => Err(ServiceError::Unavailable("camera busy".to_string())),
                Behavior::Panic => panic!("camera exploded"),
            }
        })
    }
}

pub struct RecordingSlides {
    behavior: Behavior,
    topics: Mutex<Vec<String>>,
}

impl Default for RecordingSlides {
    fn default() -> Self {
        Self::behaving(Behavior::Succeed)
    }
}

impl RecordingSlides {
    pub fn behaving(behavior: Behavior) -> Self {
        Self {
            behavior,
            topics: Mutex::new(Vec::new()),
        }
    }

    pub fn topics(&self) -> Vec<String> {
        snapshot(&self.topics)
    }
}

impl SlideDeckGenerator for RecordingSlides {
    fn generate<'a>(&'a self, topic: &'a str) -> ServiceFuture<'a, Result<PathBuf, ServiceError>> {
        Box::pin(async move {
            record(&self.topics, topic.to_string());
            match self.behavior {
                Behavior::Succeed => Ok(PathBuf::from(format!("presentations/{topic}.md"))),
                Behavior::Fail => Err(ServiceError::Io("disk full".to_string())),
                Behavior::Panic => panic!("slide backend exploded"),
            }
        })
    }
}

pub struct RecordingMail {
    behavior: Behavior,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMail {
    pub fn succeeding() -> Self {
        Self::behaving(Behavior::Succeed)
    }

    pub fn behaving(behavior: Behavior) -> Self {
        Self {
            behavior,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        snapshot(&self.sent)
    }
}

impl MailSender for RecordingMail {
    fn send<'a>(
        &'a self,
        mail: &'a OutgoingMail,
    ) -> ServiceFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            record(&self.sent, mail.clone());
            match self.behavior {
                Behavior::Succeed => Ok(format!("Email sent to {}", mail.recipient)),
                Behavior::Fail => Err(ServiceError::Unavailable("smtp refused".to_string())),
                Behavior::Panic => panic!("mail backend exploded"),
            }
        })
    }
}

pub struct RecordingLookup {
    answer: Option<String>,
    topics: Mutex<Vec<String>>,
}

impl RecordingLookup {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            topics: Mutex::new(Vec::new()),
        }
    }

    pub fn missing() -> Self {
        Self {
            answer: None,
            topics: Mutex::new(Vec::new()),
        }
    }

    pub fn topics(&self) -> Vec<String> {
        snapshot(&self.topics)
    }
}

impl SummaryLookup for RecordingLookup {
    fn summary<'a>(&'a self, topic: &'a str) -> ServiceFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            record(&self.topics, topic.to_string());
            self.answer
                .clone()
                .ok_or_else(|| ServiceError::NotFound(topic.to_string()))
        })
    }
}

pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
    fail: bool,
    requests: Mutex<Vec<ChatGatewayRequest>>,
}

impl ScriptedChat {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(ToString::to_string).collect()),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying(&[])
        }
    }

    pub fn requests(&self) -> Vec<ChatGatewayRequest> {
        snapshot(&self.requests)
    }
}

impl ChatGateway for ScriptedChat {
    fn generate<'a>(&'a self, request: ChatGatewayRequest) -> ChatGatewayFuture<'a> {
        Box::pin(async move {
            record(&self.requests, request);
            if self.fail {
                return Err(ChatGatewayError::ProviderFailure("status=503".to_string()));
            }

            let text = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or_default();
            Ok(ChatGatewayResponse {
                model: "scripted".to_string(),
                provider_request_id: None,
                text,
                usage: None,
            })
        })
    }
}

pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    /// Saturday 7 March 2026, 15:04:05 local time.
    pub fn afternoon() -> Self {
        Self {
            now: Local
                .with_ymd_and_hms(2026, 3, 7, 15, 4, 5)
                .single()
                .expect("fixed local time should be unambiguous"),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }
}

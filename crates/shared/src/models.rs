use std::fmt;

use serde::{Deserialize, Serialize};

/// The classified purpose of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Exit,
    Time,
    Date,
    Screenshot,
    GenerateImage,
    GeneratePresentation,
    OcrClick,
    Detect,
    TaskAdd,
    TaskShow,
    TaskDelete,
    SendEmail,
    Wikipedia,
    OpenApp,
    Chat,
}

impl Intent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Time => "time",
            Self::Date => "date",
            Self::Screenshot => "screenshot",
            Self::GenerateImage => "generate_image",
            Self::GeneratePresentation => "generate_presentation",
            Self::OcrClick => "ocr_click",
            Self::Detect => "detect",
            Self::TaskAdd => "task_add",
            Self::TaskShow => "task_show",
            Self::TaskDelete => "task_delete",
            Self::SendEmail => "send_email",
            Self::Wikipedia => "wikipedia",
            Self::OpenApp => "open_app",
            Self::Chat => "chat",
        }
    }

    /// Whether the host loop should stop after answering this intent.
    pub const fn ends_session(self) -> bool {
        matches!(self, Self::Exit)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A routed answer: the intent that handled the utterance and the text to
/// show and speak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub intent: Intent,
    pub text: String,
}

impl AssistantReply {
    pub fn new(intent: Intent, text: impl Into<String>) -> Self {
        Self {
            intent,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Intent;

    #[test]
    fn intent_serializes_as_snake_case_label() {
        let encoded = serde_json::to_string(&Intent::GeneratePresentation).expect("serialize");
        assert_eq!(encoded, "\"generate_presentation\"");
        assert_eq!(Intent::GeneratePresentation.as_str(), "generate_presentation");
    }

    #[test]
    fn only_exit_ends_the_session() {
        assert!(Intent::Exit.ends_session());
        assert!(!Intent::Chat.ends_session());
        assert!(!Intent::TaskDelete.ends_session());
    }
}

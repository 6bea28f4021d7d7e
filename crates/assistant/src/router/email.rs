//! Multi-turn email composition. Each step speaks a question, blocks on the
//! prompt collaborator, and cancels on an empty answer; the mail sender only
//! runs once both subject and body were captured.

use shared::config::MailConfig;
use shared::services::OutgoingMail;
use tracing::{info, warn};

use super::Collaborators;

const SUBJECT_QUESTION: &str = "What should be the subject of the email?";
const BODY_QUESTION: &str = "What should I write in the email?";
const NO_SUBJECT: &str = "No subject received. Email cancelled.";
const NO_BODY: &str = "No message received. Email cancelled.";

#[derive(Debug, Clone, PartialEq, Eq)]
struct MailIdentity {
    sender: String,
    credential: String,
    recipient: String,
}

#[derive(Debug)]
enum EmailState {
    AwaitingSubject,
    AwaitingBody { subject: String },
    Sending(OutgoingMail),
    Done(String),
    Cancelled(&'static str),
    Failed(String),
}

impl EmailState {
    const fn label(&self) -> &'static str {
        match self {
            Self::AwaitingSubject => "awaiting_subject",
            Self::AwaitingBody { .. } => "awaiting_body",
            Self::Sending(_) => "sending",
            Self::Done(_) => "done",
            Self::Cancelled(_) => "cancelled",
            Self::Failed(_) => "failed",
        }
    }
}

fn mail_identity(config: &MailConfig) -> Result<MailIdentity, &'static str> {
    let credential = config
        .app_password
        .clone()
        .ok_or("Gmail app password missing in config.")?;
    let sender = config
        .sender
        .clone()
        .ok_or("Mail sender address missing in config.")?;
    let recipient = config
        .recipient
        .clone()
        .ok_or("Mail recipient address missing in config.")?;

    Ok(MailIdentity {
        sender,
        credential,
        recipient,
    })
}

pub(super) async fn run(collaborators: &Collaborators, config: &MailConfig) -> String {
    let speech = collaborators.speech.as_ref();

    let identity = match mail_identity(config) {
        Ok(identity) => identity,
        Err(message) => {
            warn!(reason = message, "email flow not configured");
            speech.speak(message).await;
            return message.to_string();
        }
    };

    let mut state = EmailState::AwaitingSubject;
    loop {
        info!(state = state.label(), "email flow step");
        state = match state {
            EmailState::AwaitingSubject => {
                speech.speak(SUBJECT_QUESTION).await;
                let subject = collaborators.prompt.prompt_and_wait().await;
                let subject = subject.trim();
                if subject.is_empty() {
                    EmailState::Cancelled(NO_SUBJECT)
                } else {
                    speech.speak(&format!("You said, {subject}. Got it.")).await;
                    EmailState::AwaitingBody {
                        subject: subject.to_string(),
                    }
                }
            }
            EmailState::AwaitingBody { subject } => {
                speech.speak(BODY_QUESTION).await;
                let body = collaborators.prompt.prompt_and_wait().await;
                let body = body.trim();
                if body.is_empty() {
                    EmailState::Cancelled(NO_BODY)
                } else {
                    EmailState::Sending(OutgoingMail {
                        sender: identity.sender.clone(),
                        credential: identity.credential.clone(),
                        recipient: identity.recipient.clone(),
                        subject,
                        body: body.to_string(),
                    })
                }
            }
            EmailState::Sending(mail) => {
                speech
                    .speak(&format!(
                        "Composing email to {} with subject {}.",
                        mail.recipient, mail.subject
                    ))
                    .await;
                match collaborators.mail.send(&mail).await {
                    Ok(confirmation) => {
                        speech.speak("Email sent successfully.").await;
                        EmailState::Done(confirmation)
                    }
                    Err(err) => {
                        warn!(error = %err, "email send failed");
                        speech.speak("Failed to send email.").await;
                        EmailState::Failed(format!("Email failed: {err}"))
                    }
                }
            }
            EmailState::Done(text) | EmailState::Failed(text) => return text,
            EmailState::Cancelled(text) => return text.to_string(),
        };
    }
}

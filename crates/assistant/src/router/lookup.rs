use shared::llm::{ChatGateway, ChatSession};
use shared::services::{Desktop, SummaryLookup};
use tracing::{debug, warn};

use super::CHAT_FALLBACK;

const WIKIPEDIA_MISS: &str = "Sorry, I couldn't find that topic on Wikipedia.";

pub(super) async fn wikipedia(lookup: &dyn SummaryLookup, topic: &str) -> String {
    if topic.is_empty() {
        return "What topic should I search on Wikipedia?".to_string();
    }

    match lookup.summary(topic).await {
        Ok(summary) if !summary.trim().is_empty() => summary,
        Ok(_) => WIKIPEDIA_MISS.to_string(),
        Err(err) => {
            warn!(error = %err, "wikipedia lookup failed");
            WIKIPEDIA_MISS.to_string()
        }
    }
}

pub(super) async fn open_app(desktop: &dyn Desktop, app: &str) -> String {
    if app.is_empty() {
        return "Which app should I open?".to_string();
    }

    // Launch is fire-and-forget; failures are only logged.
    if let Err(err) = desktop.launch_app(app).await {
        warn!(app, error = %err, "app launch failed");
    }
    format!("Opening {app}")
}

pub(super) async fn chat(
    session: &mut ChatSession,
    gateway: &dyn ChatGateway,
    prompt: &str,
) -> String {
    if prompt.is_empty() {
        return CHAT_FALLBACK.to_string();
    }

    match session.send(gateway, prompt).await {
        Ok(reply) if !reply.is_empty() => {
            debug!(turns = session.turns().len(), "chat reply received");
            reply
        }
        Ok(_) => CHAT_FALLBACK.to_string(),
        Err(err) => {
            warn!(error = %err, "chat gateway failed");
            CHAT_FALLBACK.to_string()
        }
    }
}

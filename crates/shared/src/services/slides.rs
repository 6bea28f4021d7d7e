//! Slide decks rendered as Markdown (`---` between slides), outlined by the
//! conversational gateway with a built-in outline when the model is
//! unavailable.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use super::{ServiceError, ServiceFuture, SlideDeckGenerator};
use crate::llm::{
    ChatGateway, ChatPurpose, ChatSession, slide_outline_prompt, template_for_purpose,
};

const SERVICE: &str = "slides";
const DECK_SUBTITLE: &str = "A Presentation by Ava Assistant";

static JSON_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").ok());

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SlideOutline {
    #[serde(default)]
    slides: Vec<Slide>,
}

#[derive(Clone)]
pub struct ChatSlideDeckGenerator {
    gateway: Arc<dyn ChatGateway>,
    presentations_dir: PathBuf,
}

impl ChatSlideDeckGenerator {
    pub fn new(gateway: Arc<dyn ChatGateway>, presentations_dir: PathBuf) -> Self {
        Self {
            gateway,
            presentations_dir,
        }
    }

    async fn build_deck(&self, topic: &str) -> Result<PathBuf, ServiceError> {
        let slides = match self.request_outline(topic).await {
            Some(slides) => slides,
            None => {
                warn!(service = SERVICE, "using built-in outline");
                fallback_outline(topic)
            }
        };

        tokio::fs::create_dir_all(&self.presentations_dir).await?;
        let path = self.presentations_dir.join(deck_file_name(topic));
        tokio::fs::write(&path, render_markdown(topic, &slides)).await?;
        info!(
            service = SERVICE,
            path = %path.display(),
            slides = slides.len(),
            "saved slide deck"
        );

        Ok(path)
    }

    async fn request_outline(&self, topic: &str) -> Option<Vec<Slide>> {
        let template = template_for_purpose(ChatPurpose::SlideOutline);
        let mut session = ChatSession::new(template.system_prompt);

        match session
            .send(self.gateway.as_ref(), &slide_outline_prompt(topic))
            .await
        {
            Ok(reply) => parse_outline(&reply),
            Err(err) => {
                warn!(service = SERVICE, error = %err, "outline request failed");
                None
            }
        }
    }
}

impl SlideDeckGenerator for ChatSlideDeckGenerator {
    fn generate<'a>(&'a self, topic: &'a str) -> ServiceFuture<'a, Result<PathBuf, ServiceError>> {
        Box::pin(self.build_deck(topic))
    }
}

/// Accepts the bare JSON outline or the first `{...}` block inside a chattier
/// reply. An outline without slides counts as unparseable.
pub fn parse_outline(reply: &str) -> Option<Vec<Slide>> {
    let parsed = serde_json::from_str::<SlideOutline>(reply.trim()).ok().or_else(|| {
        let block = JSON_BLOCK.as_ref()?.find(reply)?;
        serde_json::from_str::<SlideOutline>(block.as_str()).ok()
    })?;

    let slides = parsed
        .slides
        .into_iter()
        .filter(|slide| !slide.title.trim().is_empty())
        .collect::<Vec<_>>();
    (!slides.is_empty()).then_some(slides)
}

pub fn fallback_outline(topic: &str) -> Vec<Slide> {
    let slide = |title: String, content: [String; 3]| Slide {
        title,
        content: content.into(),
    };

    vec![
        slide(
            format!("Introduction to {topic}"),
            [
                format!("An overview of {topic}."),
                format!("Why {topic} is important in the modern world."),
                "How it connects to everyday life.".to_string(),
            ],
        ),
        slide(
            format!("Background of {topic}"),
            [
                format!("Origin and history of {topic}."),
                "How it evolved over time.".to_string(),
                "Key contributors or discoveries.".to_string(),
            ],
        ),
        slide(
            "Core Concepts".to_string(),
            [
                "Main principles or mechanisms.".to_string(),
                "Scientific or technical foundations.".to_string(),
                "Important terminology.".to_string(),
            ],
        ),
        slide(
            "Applications".to_string(),
            [
                format!("How {topic} is used in daily life."),
                format!("Key industries benefiting from {topic}."),
                "Examples of real-world use cases.".to_string(),
            ],
        ),
        slide(
            "Challenges & Limitations".to_string(),
            [
                format!("Current issues with {topic}."),
                "Research gaps and controversies.".to_string(),
                "Technical and ethical considerations.".to_string(),
            ],
        ),
        slide(
            "Interesting Facts".to_string(),
            [
                format!("Did you know? Fascinating facts about {topic}."),
                format!("Unexpected uses of {topic}."),
                "Surprising statistics or trivia.".to_string(),
            ],
        ),
        slide(
            "Conclusion".to_string(),
            [
                format!("Summary of what we learned about {topic}."),
                "Future outlook and possibilities.".to_string(),
                "Thank you!".to_string(),
            ],
        ),
    ]
}

pub fn render_markdown(topic: &str, slides: &[Slide]) -> String {
    let mut deck = format!("# {}\n\n{DECK_SUBTITLE}\n", title_case(topic));
    for slide in slides {
        deck.push_str("\n---\n\n");
        deck.push_str(&format!("## {}\n\n", slide.title.trim()));
        for bullet in &slide.content {
            deck.push_str(&format!("- {}\n", bullet.trim()));
        }
    }
    deck
}

/// `solar energy` -> `solar_energy.md`; path separators are flattened too.
pub fn deck_file_name(topic: &str) -> String {
    let stem = topic
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect::<String>();
    let stem = if stem.is_empty() {
        "presentation".to_string()
    } else {
        stem
    };
    format!("{stem}.md")
}

fn title_case(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

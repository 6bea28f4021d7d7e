//! Wires the production collaborators from the loaded configuration.

use std::sync::Arc;

use shared::config::AssistantConfig;
use shared::llm::{
    ChatGateway, OpenRouterConfigError, OpenRouterGateway, OpenRouterGatewayConfig,
    UnconfiguredChatGateway,
};
use shared::services::desktop::CommandDesktop;
use shared::services::http::build_client;
use shared::services::image_generation::RemoteImageGenerator;
use shared::services::mail::SmtpMailSender;
use shared::services::object_detection::CameraObjectDetector;
use shared::services::ocr::RemoteOcrClicker;
use shared::services::slides::ChatSlideDeckGenerator;
use shared::services::wikipedia::WikipediaClient;
use shared::services::{Desktop, PromptInput, ServiceError, SpeechOutput};
use thiserror::Error;
use tracing::{info, warn};

use crate::router::{Collaborators, SystemClock};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] ServiceError),
    #[error("failed to configure chat gateway: {0}")]
    ChatGateway(#[from] OpenRouterConfigError),
}

pub fn build_chat_gateway(
    config: &AssistantConfig,
) -> Result<Arc<dyn ChatGateway>, StartupError> {
    match config.chat_api_key.as_deref() {
        Some(api_key) => {
            let gateway_config =
                OpenRouterGatewayConfig::from_env(api_key, config.chat_provider)?;
            info!(
                provider = config.chat_provider.as_str(),
                primary_model = %gateway_config.model_route.primary_model,
                "chat gateway configured"
            );
            Ok(Arc::new(OpenRouterGateway::new(gateway_config)?))
        }
        None => {
            warn!("no chat api key configured; conversational replies are disabled");
            Ok(Arc::new(UnconfiguredChatGateway))
        }
    }
}

pub fn build_collaborators(
    config: &AssistantConfig,
    prompt: Arc<dyn PromptInput>,
    speech: Arc<dyn SpeechOutput>,
) -> Result<Collaborators, StartupError> {
    let client = build_client(config.http_timeout_ms)?;
    let desktop: Arc<dyn Desktop> = Arc::new(CommandDesktop::new());
    let chat = build_chat_gateway(config)?;
    let endpoints = &config.endpoints;

    for (name, endpoint) in [
        ("image detection", &endpoints.image_detection_url),
        ("ocr", &endpoints.ocr_url),
        ("image generation", &endpoints.image_generation_url),
    ] {
        if endpoint.is_none() {
            warn!(service = name, "endpoint not configured");
        }
    }

    Ok(Collaborators {
        prompt,
        speech,
        ocr: Arc::new(RemoteOcrClicker::new(
            client.clone(),
            endpoints.ocr_url.clone(),
            desktop.clone(),
        )),
        images: Arc::new(RemoteImageGenerator::new(
            client.clone(),
            endpoints.image_generation_url.clone(),
            config.output_dir.clone(),
        )),
        detector: Arc::new(CameraObjectDetector::new(
            client.clone(),
            endpoints.image_detection_url.clone(),
            desktop.clone(),
        )),
        slides: Arc::new(ChatSlideDeckGenerator::new(
            chat.clone(),
            config.presentations_dir.clone(),
        )),
        mail: Arc::new(SmtpMailSender::default()),
        encyclopedia: Arc::new(WikipediaClient::new(client)),
        chat,
        desktop,
        clock: Arc::new(SystemClock),
    })
}

use std::path::Path;

use chrono::{DateTime, Local};
use shared::services::Desktop;
use tracing::{info, warn};

use super::Collaborators;

pub(super) async fn screenshot(
    desktop: &dyn Desktop,
    dir: &Path,
    now: DateTime<Local>,
) -> String {
    let path = dir.join(format!("screenshot_{}.png", now.format("%Y%m%d_%H%M%S")));

    match desktop.capture_screen(&path).await {
        Ok(()) => {
            info!(path = %path.display(), "screenshot saved");
            format!("Screenshot saved as {}", path.display())
        }
        Err(err) => {
            warn!(error = %err, "screenshot failed");
            format!("Screenshot failed: {err}")
        }
    }
}

pub(super) async fn generate_image(collaborators: &Collaborators, prompt: &str) -> String {
    if prompt.is_empty() {
        return "Please tell me what image to generate.".to_string();
    }

    let speech = collaborators.speech.as_ref();
    speech.speak(&format!("Generating image for {prompt}")).await;

    match collaborators.images.generate(prompt).await {
        Ok(paths) if !paths.is_empty() => {
            if let Err(err) = collaborators.desktop.open_path(&paths[0]).await {
                warn!(error = %err, "could not open generated image");
            }
            speech.speak("Image generated successfully.").await;
            format!("Image generated successfully for '{prompt}'.")
        }
        Ok(_) => {
            warn!("image generator returned no images");
            speech.speak("Failed to generate image.").await;
            "Failed to generate image.".to_string()
        }
        Err(err) => {
            warn!(error = %err, "image generation failed");
            speech.speak("Failed to generate image.").await;
            "Failed to generate image.".to_string()
        }
    }
}

pub(super) async fn generate_presentation(collaborators: &Collaborators, topic: &str) -> String {
    if topic.is_empty() {
        return "Please tell me the topic for PowerPoint.".to_string();
    }

    let speech = collaborators.speech.as_ref();
    speech.speak(&format!("Creating PowerPoint on {topic}")).await;

    match collaborators.slides.generate(topic).await {
        Ok(path) => {
            speech.speak("Presentation created successfully.").await;
            if let Err(err) = collaborators.desktop.open_path(&path).await {
                warn!(error = %err, "could not open presentation");
            }
            format!("Presentation created successfully on '{topic}'.")
        }
        Err(err) => {
            warn!(error = %err, "presentation generation failed");
            speech.speak("Failed to create presentation.").await;
            "Failed to create presentation.".to_string()
        }
    }
}

pub(super) async fn ocr_click(collaborators: &Collaborators, target: &str) -> String {
    let speech = collaborators.speech.as_ref();
    if target.is_empty() {
        speech.speak("Please specify what to click.").await;
        return "Please specify what to click.".to_string();
    }

    speech.speak("Processing OCR click...").await;
    match collaborators.ocr.locate_and_click(target).await {
        Ok(result) => {
            speech.speak("OCR click completed.").await;
            result
        }
        Err(err) => {
            warn!(error = %err, "ocr click failed");
            speech.speak("OCR failed.").await;
            format!("OCR failed: {err}")
        }
    }
}

pub(super) async fn detect_objects(collaborators: &Collaborators) -> String {
    collaborators
        .speech
        .speak("Opening camera for object detection...")
        .await;

    match collaborators.detector.capture_and_detect().await {
        Ok(labels) if labels.is_empty() => {
            "Object detection completed. No objects detected.".to_string()
        }
        Ok(labels) => format!("Detected: {}", labels.join(", ")),
        Err(err) => {
            warn!(error = %err, "object detection failed");
            format!("Object detection failed: {err}")
        }
    }
}

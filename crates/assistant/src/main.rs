use std::sync::Arc;

use ava_assistant::app::build_collaborators;
use ava_assistant::cli::{CliError, CliOptions, usage};
use ava_assistant::console::{ConsoleSpeaker, StdinPrompt};
use ava_assistant::{Router, RouterSettings};
use shared::config::{AssistantConfig, load_dotenv};
use shared::services::SpeechOutput;
use tokio::signal;
use tracing::{error, info};

const DEFAULT_LOG_FILTER: &str = "ava_assistant=info,shared=info";
const GREETING: &str = "Hello, welcome to your personal assistant Ava. How may I help you today?";
const RESET_COMMAND: &str = ":reset";

#[tokio::main]
async fn main() {
    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            eprintln!("{}", usage());
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{}", usage());
            std::process::exit(2);
        }
    };

    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }
    init_tracing();

    let config = match AssistantConfig::load(options.config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load assistant config");
            std::process::exit(1);
        }
    };

    let prompt = Arc::new(StdinPrompt::new());
    let speech = Arc::new(ConsoleSpeaker);
    let collaborators = match build_collaborators(&config, prompt.clone(), speech.clone()) {
        Ok(collaborators) => collaborators,
        Err(err) => {
            error!(error = %err, "failed to build collaborators");
            std::process::exit(1);
        }
    };
    let mut router = Router::new(RouterSettings::from(&config), collaborators);

    if let Some(utterance) = options.once {
        println!("{}", router.handle(&utterance).await);
        return;
    }

    run_session(&mut router, &prompt, speech.as_ref()).await;
}

async fn run_session(router: &mut Router, prompt: &StdinPrompt, speech: &dyn SpeechOutput) {
    info!("ava session started");
    speech.speak(GREETING).await;

    loop {
        let line = tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            line = prompt.read_line() => line,
        };
        let Some(line) = line else {
            info!("stdin closed");
            break;
        };

        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if utterance == RESET_COMMAND {
            router.reset_conversation();
            speech.speak("Conversation cleared.").await;
            continue;
        }

        let reply = router.handle_reply(utterance).await;
        speech.speak(&reply.text).await;
        if reply.intent.ends_session() {
            break;
        }
    }

    info!("ava session ended");
}

fn init_tracing() {
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let json = std::env::var("AVA_LOG_FORMAT")
        .map(|format| format.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.init();
    }
}

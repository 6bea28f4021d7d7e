//! Terminal stand-ins for the microphone and the voice: utterances are read
//! from stdin and replies are printed.

use shared::services::{PromptInput, ServiceFuture, SpeechOutput};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::warn;

const INPUT_MARKER: &str = "You: ";

pub struct StdinPrompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Reads the next line, or `None` once stdin is closed.
    pub async fn read_line(&self) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        if stdout.write_all(INPUT_MARKER.as_bytes()).await.is_ok() {
            let _ = stdout.flush().await;
        }

        match self.lines.lock().await.next_line().await {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to read from stdin");
                None
            }
        }
    }
}

impl PromptInput for StdinPrompt {
    fn prompt_and_wait<'a>(&'a self) -> ServiceFuture<'a, String> {
        Box::pin(async move { self.read_line().await.unwrap_or_default() })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSpeaker;

impl SpeechOutput for ConsoleSpeaker {
    fn speak<'a>(&'a self, text: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            println!("Ava: {text}");
        })
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    /// Route this single utterance and exit instead of starting the loop.
    pub once: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing value for argument: {0}")]
    MissingValue(String),
    #[error("help requested")]
    HelpRequested,
}

impl CliOptions {
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(CliError::HelpRequested),
                "--config" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    options.config_path = Some(PathBuf::from(value));
                }
                "--once" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    options.once = Some(value);
                }
                unknown => return Err(CliError::UnknownArgument(unknown.to_string())),
            }
        }

        Ok(options)
    }
}

pub fn usage() -> &'static str {
    "Usage: ava [--config <path>] [--once <utterance>]\n\
     \n\
     Without --once, starts an interactive session on stdin.\n\
     Type :reset to clear the conversation, exit or quit to leave.\n\
     \n\
     Options:\n\
     - --config <path>     JSON config file (default: $AVA_CONFIG_PATH or config/config.json)\n\
     - --once <utterance>  Answer one utterance and exit\n\
     - --help              Show this help text"
}

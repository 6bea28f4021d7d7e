pub mod config;
mod config_env;
pub mod intents;
pub mod llm;
pub mod models;
pub mod services;
pub mod tasks;

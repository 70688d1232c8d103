//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod run;
mod transcript;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use run::run_bot;
pub use transcript::run_transcript;

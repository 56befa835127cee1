pub mod admin;
pub mod broadcast;
pub mod chat;
pub mod command;
pub mod poll;
pub mod ui;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub use admin::admin_command_handler;
pub use broadcast::limiter_for;
pub use chat::ai_text_handler;
pub use command::command_handler;

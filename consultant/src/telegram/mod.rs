//! Telegram front-end: adapters, Bot implementation, command parsing, consultant handler, REPL runner.

mod adapters;
mod bot_adapter;
mod command;
mod handler;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use command::{loggable_text, Command};
pub use handler::{ChatState, ConsultantHandler};
pub use runner::{build_teloxide_bot, run_repl};

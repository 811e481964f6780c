//! Command handlers for the skydoc CLI.

mod ask;
mod chat;

pub use ask::AskCommand;
pub use chat::ChatCommand;

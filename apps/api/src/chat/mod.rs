// Text chat: ephemeral per-session history plus the coach prompt.

pub mod handlers;
pub mod session;

use crate::llm_client::prompts::CHAT_PERSONA;

pub fn build_chat_prompt(message: &str) -> String {
    format!("{CHAT_PERSONA}\n\nUser: {message}\n\nResponse:")
}

pub mod chat;
pub mod reply;

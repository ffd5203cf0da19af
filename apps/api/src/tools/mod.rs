// Coaching tools: skill-gap roadmap, learning-plan generator, web lookup.

pub mod coaching;
pub mod handlers;
pub mod web_search;

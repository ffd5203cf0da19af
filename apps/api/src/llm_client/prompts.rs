// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts alongside it;
// this file only holds the pieces they have in common.

/// Persona used by the free-form chat.
pub const CHAT_PERSONA: &str = "You are a career coach. Be concise and actionable.";

/// Persona used by the structured coaching tools.
pub const COACH_PERSONA: &str = "You are an expert career coach.";

/// Trailing cue that asks the model to start answering.
pub const ANSWER_CUE: &str = "Answer:";

//! Structured coaching prompts sent through the text capability.

use crate::llm_client::prompts::{ANSWER_CUE, COACH_PERSONA};
use crate::llm_client::{LlmError, LlmRouter};

pub fn skill_gap_prompt(user_input: &str) -> String {
    format!(
        "{COACH_PERSONA} Identify missing skills and give a short weekly roadmap \
         and two mini-project ideas.\n\nUser input:\n{user_input}\n\n{ANSWER_CUE}"
    )
}

pub fn task_plan_prompt(goal: &str) -> String {
    format!(
        "{COACH_PERSONA} Produce a short weekly learning plan and two mini-project ideas.\
         \n\nGoal: {goal}\n\n{ANSWER_CUE}"
    )
}

/// Missing skills, a weekly roadmap and two project ideas for the user's situation.
pub async fn skill_gap(llm: &LlmRouter, user_input: &str) -> Result<String, LlmError> {
    llm.generate_text(&skill_gap_prompt(user_input)).await
}

/// A weekly learning plan toward `goal`.
pub async fn task_plan(llm: &LlmRouter, goal: &str) -> Result<String, LlmError> {
    llm.generate_text(&task_plan_prompt(goal)).await
}

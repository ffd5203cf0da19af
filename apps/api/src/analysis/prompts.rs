/// Sent with the resume image on the vision attempt.
pub const RESUME_VISION_PROMPT: &str = "\
You are an expert resume analyst. Analyze the resume image and produce concise bullets:
- Key skills
- Projects/experience summary (short)
- Skill gaps for software roles
- Five resume improvement suggestions
Keep answers short and actionable.";

/// Text-only analysis prompt. `{resume_text}` is replaced with OCR or PDF output.
pub const RESUME_TEXT_PROMPT_TEMPLATE: &str = "\
You are an expert resume analyst. Analyze the resume text and give concise bullets for:
- Key skills and strengths
- Projects/experience summary (short)
- Top 3 skill gaps for software roles
- Five resume improvements (ATS-friendly)

Resume text:
{resume_text}

Answer:";

pub fn build_resume_text_prompt(resume_text: &str) -> String {
    RESUME_TEXT_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

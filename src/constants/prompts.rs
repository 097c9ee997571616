pub const MCQ_GENERATION_SYSTEM_PROMPT: &str =
    "You generate exam MCQs ONLY in valid JSON array format. No markdown or explanations.";

pub const GRADING_SYSTEM_PROMPT: &str =
    "You are an expert exam grader. Grade only on a 0-10 scale.";

/// Feedback stored when the grading call itself fails.
pub const GRADING_FAILURE_FEEDBACK: &str = "AI grading failed";

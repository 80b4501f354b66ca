//! System and user prompt builders for the generation and enhancement calls.

/// System instructions for the generation call.
///
/// Kept short: it steers reliably without wasting tokens.
pub const SYSTEM_PROMPT: &str = "\
You are an educational AI assistant for the \"Physical AI & Humanoid Robotics\" textbook.
Answer primarily from the provided textbook context when available; if the context is
limited or empty, you may draw on general knowledge of Physical AI, robotics, ROS 2,
simulation, and VLA systems. Use clear, educational language, cite chapter and section
when the context names them, and structure longer answers with lists.";

/// System instructions for the enhancement pass. Editing only, no new facts.
pub const ENHANCER_SYSTEM: &str = "\
You edit draft answers for a robotics textbook chatbot. Improve clarity, tone, and
structure of the draft you are given. Do not add facts, citations, or new sections;
return only the revised answer text.";

/// Builds the user message for the generation call.
///
/// Mirrors the two shapes the chatbot uses: with a retrieval context block
/// when one exists, and a plain knowledge-based request otherwise.
pub fn build_user_prompt(question: &str, context: &str) -> String {
    if context.trim().is_empty() {
        format!(
            "Question: {question}\n\n\
Instructions:\n\
- Answer based on your knowledge of Physical AI, robotics, ROS 2, simulation, and VLA systems\n\
- Be educational and helpful\n\
- Structure your answer appropriately"
        )
    } else {
        format!(
            "Question: {question}\n\n\
Context from textbook:\n{context}\n\n\
Instructions:\n\
- Answer using the provided context as your primary source\n\
- Cite the chapter/section in your answer\n\
- Be educational and clear\n\
- Structure with lists if appropriate"
        )
    }
}

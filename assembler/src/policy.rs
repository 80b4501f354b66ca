//! Declared per-collaborator fallback policy.
//!
//! The recovery behavior is deliberately asymmetric: a structured-store
//! failure yields one placeholder citation (the UI always has something to
//! show), a vector-index failure yields nothing, a generation failure yields
//! a canned explanatory answer, and an enhancement failure passes the draft
//! through. Keeping the table in one place makes the asymmetry a stated
//! policy instead of four divergent call sites.

use crate::types::SourceCitation;

/// The four external collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collaborator {
    StructuredStore,
    VectorIndex,
    Generation,
    Enhancement,
}

/// What the pipeline substitutes when a collaborator call fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Substitute exactly one deterministic placeholder citation.
    PlaceholderCitation,
    /// Contribute zero citations.
    EmptySources,
    /// Substitute a canned answer naming the unavailable dependency.
    ExplanatoryAnswer,
    /// Use the input unchanged.
    PassThrough,
}

/// The policy table.
pub fn fallback_for(collaborator: Collaborator) -> FallbackPolicy {
    match collaborator {
        Collaborator::StructuredStore => FallbackPolicy::PlaceholderCitation,
        Collaborator::VectorIndex => FallbackPolicy::EmptySources,
        Collaborator::Generation => FallbackPolicy::ExplanatoryAnswer,
        Collaborator::Enhancement => FallbackPolicy::PassThrough,
    }
}

/// Citations substituted for a failed retrieval call, per the table.
///
/// Text-substituting policies contribute no citations.
pub fn recover_sources(
    collaborator: Collaborator,
    chapter_scope: Option<i32>,
) -> Vec<SourceCitation> {
    match fallback_for(collaborator) {
        FallbackPolicy::PlaceholderCitation => vec![placeholder_citation(chapter_scope)],
        FallbackPolicy::EmptySources
        | FallbackPolicy::ExplanatoryAnswer
        | FallbackPolicy::PassThrough => Vec::new(),
    }
}

/// Answer text substituted for a failed text-producing call, per the table.
///
/// Retrieval policies never rewrite answer text; they keep `draft`.
pub fn recover_answer(collaborator: Collaborator, question: &str, draft: &str) -> String {
    match fallback_for(collaborator) {
        FallbackPolicy::ExplanatoryAnswer => unavailable_answer(question),
        FallbackPolicy::PassThrough
        | FallbackPolicy::PlaceholderCitation
        | FallbackPolicy::EmptySources => draft.to_string(),
    }
}

/// The placeholder citation substituted for a failed structured-store call.
///
/// `chapter_id` defaults to the requested chapter scope, or 1.
pub fn placeholder_citation(chapter_scope: Option<i32>) -> SourceCitation {
    SourceCitation {
        chunk_id: "placeholder-0".to_string(),
        chapter_id: chapter_scope.unwrap_or(1),
        section_id: "0".to_string(),
        section_title: "Textbook content unavailable".to_string(),
        preview_text: "The passage index could not be reached; citations will return once it is available.".to_string(),
        relevance_score: 0.5,
    }
}

/// Citation synthesized from user-selected context in context-only mode.
pub fn context_citation(context: &str, chapter_scope: Option<i32>) -> SourceCitation {
    let preview = if context.chars().count() > 100 {
        let cut: String = context.chars().take(100).collect();
        format!("{cut}...")
    } else {
        context.to_string()
    };
    SourceCitation {
        chunk_id: "context-based".to_string(),
        chapter_id: chapter_scope.unwrap_or(0),
        section_id: "context".to_string(),
        section_title: "Selected Text Context".to_string(),
        preview_text: preview,
        relevance_score: 0.99,
    }
}

/// Canned answer substituted when the generation service is down or not
/// configured. Deterministic and never retried.
pub fn unavailable_answer(question: &str) -> String {
    format!(
        "The answer generation service is unavailable right now, so I could not \
compose a full answer to \"{question}\".\n\n\
The textbook covers the following topics you can ask about once the service is back:\n\n\
- Chapter 1: Introduction to Physical AI\n\
- Chapter 2: Basics of Humanoid Robotics\n\
- Chapter 3: ROS 2 Fundamentals\n\
- Chapter 4: Digital Twin Simulation\n\
- Chapter 5: Vision-Language-Action Systems\n\
- Chapter 6: Capstone Project\n\n\
Please try again in a moment."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_declares_the_asymmetry() {
        assert_eq!(
            fallback_for(Collaborator::StructuredStore),
            FallbackPolicy::PlaceholderCitation
        );
        assert_eq!(
            fallback_for(Collaborator::VectorIndex),
            FallbackPolicy::EmptySources
        );
        assert_eq!(
            fallback_for(Collaborator::Generation),
            FallbackPolicy::ExplanatoryAnswer
        );
        assert_eq!(
            fallback_for(Collaborator::Enhancement),
            FallbackPolicy::PassThrough
        );
    }

    #[test]
    fn recovery_routes_through_the_table() {
        let s = recover_sources(Collaborator::StructuredStore, Some(2));
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].chunk_id, "placeholder-0");
        assert_eq!(s[0].chapter_id, 2);
        assert!(recover_sources(Collaborator::VectorIndex, Some(2)).is_empty());

        let a = recover_answer(Collaborator::Generation, "What is a VLA?", "");
        assert!(a.contains("unavailable"));
        assert_eq!(
            recover_answer(Collaborator::Enhancement, "What is a VLA?", "the draft"),
            "the draft"
        );
    }

    #[test]
    fn placeholder_defaults_chapter_to_one() {
        assert_eq!(placeholder_citation(None).chapter_id, 1);
        assert_eq!(placeholder_citation(Some(4)).chapter_id, 4);
    }

    #[test]
    fn context_citation_trims_long_previews() {
        let long = "x".repeat(300);
        let c = context_citation(&long, None);
        assert!(c.preview_text.ends_with("..."));
        assert_eq!(c.preview_text.chars().count(), 103);
        assert_eq!(c.chunk_id, "context-based");
    }

    #[test]
    fn unavailable_answer_names_the_dependency() {
        let a = unavailable_answer("What is Physical AI?");
        assert!(a.contains("unavailable"));
        assert!(a.contains("What is Physical AI?"));
    }
}

//! The assembly pipeline.
//!
//! One linear pass per request: validate, retrieve concurrently, generate
//! once, enhance best-effort, post-format. Collaborator failures never abort
//! the pipeline; each one is replaced at its call site by the substitute the
//! policy table declares.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::collaborators::{AnswerEnhancer, AnswerGenerator, PassageStore, VectorIndex};
use crate::error::{AssembleError, CollaboratorError};
use crate::format;
use crate::policy::{self, Collaborator};
use crate::prompt;
use crate::types::{AnswerResult, MAX_CONTEXT_CHARS, MAX_QUESTION_CHARS, Query, SourceCitation};

/// Tuning knobs for one assembler instance.
#[derive(Clone, Copy, Debug)]
pub struct AssembleOptions {
    /// Citations requested from each retrieval source.
    pub top_k: usize,
    /// Upper bound on each retrieval call. The LLM clients carry their own
    /// HTTP timeouts; the store traits get bounded here.
    pub retrieval_timeout: Duration,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            retrieval_timeout: Duration::from_secs(8),
        }
    }
}

/// Bounds one collaborator call. Expiry is just another collaborator
/// failure; the fallback policy recovers it like any transport error.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, CollaboratorError>>,
) -> Result<T, CollaboratorError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Transport(format!(
            "timed out after {}s",
            limit.as_secs()
        ))),
    }
}

/// Orchestrates the four collaborators into one answer per query.
///
/// Cheap to clone; handlers share one instance behind the application state.
#[derive(Clone)]
pub struct Assembler {
    passages: Arc<dyn PassageStore>,
    vectors: Arc<dyn VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
    enhancer: Arc<dyn AnswerEnhancer>,
    opts: AssembleOptions,
}

impl Assembler {
    pub fn new(
        passages: Arc<dyn PassageStore>,
        vectors: Arc<dyn VectorIndex>,
        generator: Arc<dyn AnswerGenerator>,
        enhancer: Arc<dyn AnswerEnhancer>,
        opts: AssembleOptions,
    ) -> Self {
        Self {
            passages,
            vectors,
            generator,
            enhancer,
            opts,
        }
    }

    /// Runs the full pipeline for one query.
    ///
    /// Returns `Err` only for an empty or blank question. Every other failure
    /// mode degrades the result instead.
    pub async fn assemble(&self, query: &Query) -> Result<AnswerResult, AssembleError> {
        let started = Instant::now();

        let question = query.question.trim();
        if question.is_empty() {
            return Err(AssembleError::InvalidInput(
                "Question is required".to_string(),
            ));
        }
        let question = crate::types::cap_chars(question, MAX_QUESTION_CHARS);
        let context = query
            .context
            .as_deref()
            .map(|c| crate::types::cap_chars(c.trim(), MAX_CONTEXT_CHARS))
            .unwrap_or("");

        let sources = if query.use_context_only {
            if context.is_empty() {
                Vec::new()
            } else {
                vec![policy::context_citation(context, query.chapter_scope)]
            }
        } else {
            self.gather_sources(question, query.chapter_scope).await
        };

        let retrieval_context = if !context.is_empty() {
            context.to_string()
        } else {
            sources
                .iter()
                .map(|s| s.preview_text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };

        let user_prompt = prompt::build_user_prompt(question, &retrieval_context);
        let draft = match self
            .generator
            .generate(prompt::SYSTEM_PROMPT, &user_prompt)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "generation failed, applying fallback");
                policy::recover_answer(Collaborator::Generation, question, "")
            }
        };

        let enhanced = match self.enhancer.enhance(&draft).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "enhancement failed, applying fallback");
                policy::recover_answer(Collaborator::Enhancement, question, &draft)
            }
        };

        let answer = format::polish(&enhanced, question);

        Ok(AnswerResult {
            answer,
            sources,
            timing_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Queries both retrieval sources concurrently and concatenates their
    /// citations, structured store first. Neither failure affects the other.
    async fn gather_sources(
        &self,
        question: &str,
        chapter_id: Option<i32>,
    ) -> Vec<SourceCitation> {
        let limit = self.opts.retrieval_timeout;
        let (structured, vector) = tokio::join!(
            bounded(
                limit,
                self.passages.find_passages(question, chapter_id, self.opts.top_k)
            ),
            bounded(
                limit,
                self.vectors.similar_passages(question, chapter_id, self.opts.top_k)
            ),
        );

        let mut sources = match structured {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "structured store failed, applying fallback");
                policy::recover_sources(Collaborator::StructuredStore, chapter_id)
            }
        };
        match vector {
            Ok(items) => sources.extend(items),
            Err(err) => {
                warn!(error = %err, "vector index failed, applying fallback");
                sources.extend(policy::recover_sources(Collaborator::VectorIndex, chapter_id));
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::CollaboratorError;

    fn citation(chunk_id: &str, chapter: i32) -> SourceCitation {
        SourceCitation {
            chunk_id: chunk_id.to_string(),
            chapter_id: chapter,
            section_id: "1.1".to_string(),
            section_title: "Section".to_string(),
            preview_text: format!("preview of {chunk_id}"),
            relevance_score: 0.8,
        }
    }

    fn fail() -> CollaboratorError {
        CollaboratorError::Transport("connection refused".to_string())
    }

    #[derive(Default)]
    struct MockStore {
        calls: AtomicUsize,
        result: Option<Vec<SourceCitation>>,
    }

    #[async_trait]
    impl PassageStore for MockStore {
        async fn find_passages(
            &self,
            _question: &str,
            _chapter_id: Option<i32>,
            _limit: usize,
        ) -> Result<Vec<SourceCitation>, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().ok_or_else(fail)
        }
    }

    #[derive(Default)]
    struct MockIndex {
        calls: AtomicUsize,
        result: Option<Vec<SourceCitation>>,
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn similar_passages(
            &self,
            _question: &str,
            _chapter_id: Option<i32>,
            _limit: usize,
        ) -> Result<Vec<SourceCitation>, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().ok_or_else(fail)
        }
    }

    #[derive(Default)]
    struct MockGenerator {
        calls: AtomicUsize,
        reply: Option<String>,
        seen_user_prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl AnswerGenerator for MockGenerator {
        async fn generate(&self, _system: &str, user: &str) -> Result<String, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_user_prompt.lock().unwrap() = Some(user.to_string());
            self.reply.clone().ok_or_else(fail)
        }
    }

    #[derive(Default)]
    struct MockEnhancer {
        calls: AtomicUsize,
        reply: Option<String>,
    }

    #[async_trait]
    impl AnswerEnhancer for MockEnhancer {
        async fn enhance(&self, _draft: &str) -> Result<String, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or_else(fail)
        }
    }

    struct Rig {
        store: Arc<MockStore>,
        index: Arc<MockIndex>,
        generator: Arc<MockGenerator>,
        enhancer: Arc<MockEnhancer>,
        assembler: Assembler,
    }

    fn rig(
        store: MockStore,
        index: MockIndex,
        generator: MockGenerator,
        enhancer: MockEnhancer,
    ) -> Rig {
        let store = Arc::new(store);
        let index = Arc::new(index);
        let generator = Arc::new(generator);
        let enhancer = Arc::new(enhancer);
        let assembler = Assembler::new(
            store.clone(),
            index.clone(),
            generator.clone(),
            enhancer.clone(),
            AssembleOptions::default(),
        );
        Rig {
            store,
            index,
            generator,
            enhancer,
            assembler,
        }
    }

    fn happy_generator() -> MockGenerator {
        MockGenerator {
            reply: Some("Physical AI combines robotics and machine learning.".to_string()),
            ..Default::default()
        }
    }

    fn passthrough_enhancer(text: &str) -> MockEnhancer {
        MockEnhancer {
            reply: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn query(question: &str) -> Query {
        Query {
            question: question.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn blank_question_is_rejected_before_any_call() {
        let r = rig(
            MockStore::default(),
            MockIndex::default(),
            MockGenerator::default(),
            MockEnhancer::default(),
        );

        let err = r.assembler.assemble(&query("   ")).await.unwrap_err();
        assert!(matches!(err, AssembleError::InvalidInput(ref m) if m == "Question is required"));
        assert_eq!(r.store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(r.index.calls.load(Ordering::SeqCst), 0);
        assert_eq!(r.generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(r.enhancer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn citations_concatenate_structured_first_without_dedup() {
        let store = MockStore {
            result: Some(vec![citation("a", 1), citation("b", 1)]),
            ..Default::default()
        };
        let index = MockIndex {
            result: Some(vec![citation("b", 1), citation("c", 2)]),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(store, index, happy_generator(), enhancer);

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        let ids: Vec<&str> = out.sources.iter().map(|s| s.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "b", "c"]);
    }

    #[tokio::test]
    async fn structured_failure_yields_one_placeholder() {
        let index = MockIndex {
            result: Some(vec![citation("v", 2)]),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(MockStore::default(), index, happy_generator(), enhancer);

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        let ids: Vec<&str> = out.sources.iter().map(|s| s.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["placeholder-0", "v"]);
        assert_eq!(out.sources[0].chapter_id, 1);
    }

    #[tokio::test]
    async fn placeholder_takes_the_requested_chapter_scope() {
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(
            MockStore::default(),
            MockIndex::default(),
            happy_generator(),
            enhancer,
        );

        let mut q = query("What is Physical AI?");
        q.chapter_scope = Some(4);
        let out = r.assembler.assemble(&q).await.unwrap();
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].chapter_id, 4);
    }

    struct StalledStore;

    #[async_trait]
    impl PassageStore for StalledStore {
        async fn find_passages(
            &self,
            _question: &str,
            _chapter_id: Option<i32>,
            _limit: usize,
        ) -> Result<Vec<SourceCitation>, CollaboratorError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn stalled_structured_store_times_out_to_placeholder() {
        // A store that accepts the call but never answers must not hold the
        // whole request open; expiry degrades like any other failure.
        let index = MockIndex {
            result: Some(vec![citation("v", 2)]),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let assembler = Assembler::new(
            Arc::new(StalledStore),
            Arc::new(index),
            Arc::new(happy_generator()),
            Arc::new(enhancer),
            AssembleOptions {
                top_k: 5,
                retrieval_timeout: Duration::from_millis(20),
            },
        );

        let out = assembler
            .assemble(&query("What is Physical AI?"))
            .await
            .unwrap();
        let ids: Vec<&str> = out.sources.iter().map(|s| s.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["placeholder-0", "v"]);
    }

    #[tokio::test]
    async fn vector_failure_contributes_nothing() {
        let store = MockStore {
            result: Some(vec![citation("a", 1)]),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(store, MockIndex::default(), happy_generator(), enhancer);

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        let ids: Vec<&str> = out.sources.iter().map(|s| s.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn empty_structured_success_stays_empty() {
        // An empty result is not a failure; no placeholder is substituted.
        let store = MockStore {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let index = MockIndex {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(store, index, happy_generator(), enhancer);

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        assert!(out.sources.is_empty());
    }

    #[tokio::test]
    async fn everything_down_still_answers() {
        let r = rig(
            MockStore::default(),
            MockIndex::default(),
            MockGenerator::default(),
            MockEnhancer::default(),
        );

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        assert!(out.answer.contains("unavailable"));
        assert!(out.answer.contains("What is Physical AI?"));
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].chunk_id, "placeholder-0");
    }

    #[tokio::test]
    async fn context_only_mode_skips_retrieval() {
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(
            MockStore::default(),
            MockIndex::default(),
            happy_generator(),
            enhancer,
        );

        let q = Query {
            question: "Summarize this.".to_string(),
            context: Some("ROS 2 nodes communicate over DDS topics.".to_string()),
            use_context_only: true,
            chapter_scope: None,
        };
        let out = r.assembler.assemble(&q).await.unwrap();

        assert_eq!(r.store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(r.index.calls.load(Ordering::SeqCst), 0);
        assert_eq!(out.sources.len(), 1);
        assert_eq!(out.sources[0].chunk_id, "context-based");
        assert_eq!(out.sources[0].section_title, "Selected Text Context");
    }

    #[tokio::test]
    async fn context_only_without_context_yields_no_sources() {
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(
            MockStore::default(),
            MockIndex::default(),
            happy_generator(),
            enhancer,
        );

        let q = Query {
            question: "Summarize this.".to_string(),
            context: None,
            use_context_only: true,
            chapter_scope: None,
        };
        let out = r.assembler.assemble(&q).await.unwrap();
        assert!(out.sources.is_empty());
        assert_eq!(r.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn user_context_wins_over_retrieved_previews() {
        let store = MockStore {
            result: Some(vec![citation("a", 1)]),
            ..Default::default()
        };
        let index = MockIndex {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("Physical AI combines robotics and machine learning.");
        let r = rig(store, index, happy_generator(), enhancer);

        let q = Query {
            question: "What is Physical AI?".to_string(),
            context: Some("user-selected paragraph".to_string()),
            use_context_only: false,
            chapter_scope: None,
        };
        r.assembler.assemble(&q).await.unwrap();

        let prompt = r.generator.seen_user_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("user-selected paragraph"));
        assert!(!prompt.contains("preview of a"));
    }

    #[tokio::test]
    async fn enhancement_failure_passes_the_draft_through() {
        let store = MockStore {
            result: Some(vec![citation("a", 1)]),
            ..Default::default()
        };
        let index = MockIndex {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let r = rig(store, index, happy_generator(), MockEnhancer::default());

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        assert_eq!(
            out.answer,
            "Physical AI combines robotics and machine learning."
        );
        assert_eq!(out.sources.len(), 1);
        assert_eq!(r.enhancer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn enhanced_text_replaces_the_draft() {
        let store = MockStore {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let index = MockIndex {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("A clearer answer about Physical AI.");
        let r = rig(store, index, happy_generator(), enhancer);

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        assert_eq!(out.answer, "A clearer answer about Physical AI.");
    }

    #[tokio::test]
    async fn answer_is_post_formatted() {
        let store = MockStore {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let index = MockIndex {
            result: Some(Vec::new()),
            ..Default::default()
        };
        let generator = MockGenerator {
            reply: Some("* robots gonna move stuff".to_string()),
            ..Default::default()
        };
        let enhancer = passthrough_enhancer("* robots gonna move stuff");
        let r = rig(store, index, generator, enhancer);

        let out = r.assembler.assemble(&query("What is Physical AI?")).await.unwrap();
        assert_eq!(out.answer, "- robots going to move material");
    }
}

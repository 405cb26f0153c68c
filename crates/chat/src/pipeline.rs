//! Query-turn orchestration.
//!
//! One call to [`Pipeline::run_turn`] executes the full cycle:
//! classification, concurrent retrieval, bounded context assembly,
//! streamed synthesis, and citation extraction. Auxiliary failures
//! (classification, individual partition searches, the synthesis
//! stream) degrade locally; only a completely empty retrieval becomes
//! a terminal no-results response, and that response skips synthesis
//! entirely.

use crate::prompt::build_messages;
use crate::session::SessionContext;
use crate::synthesize::synthesize;
use mevzuat_core::AppResult;
use mevzuat_llm::LlmClient;
use mevzuat_retrieval::{
    assemble_context, classify, resolve_targets, retrieve, Citation, ClassificationDecision,
    PartitionRegistry, PassageResult, StatuteTable, VectorSearch,
};
use std::sync::Arc;

/// Terminal response when retrieval finds nothing across all searched
/// partitions.
pub const NO_RESULTS_MESSAGE: &str =
    "Sorunuzla eşleşen bir mevzuat bölümü bulunamadı. Lütfen sorunuzu farklı \
     anahtar kelimelerle yeniden deneyin.";

/// Honest degraded response when the synthesis stream fails mid-turn.
pub const DEGRADED_MESSAGE: &str =
    "Yanıt oluşturulurken bir hata meydana geldi ve cevap tamamlanamadı. Lütfen \
     sorunuzu yeniden deneyin.";

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Model used for answer synthesis
    pub model: String,

    /// Model used by the fallback classifier
    pub classifier_model: String,

    /// Whether the keyword classifier runs before the model classifier
    pub fast_classifier: bool,
}

/// Everything produced by one completed query turn.
#[derive(Debug)]
pub struct TurnOutcome {
    /// Final answer text (possibly the no-results or degraded message)
    pub answer: String,

    /// Statutes referenced by the answer
    pub citations: Vec<Citation>,

    /// How the query was routed
    pub decision: ClassificationDecision,

    /// Passages retrieved for the answer
    pub sources: Vec<PassageResult>,

    /// Display label of the routed partition, when a single one was
    /// resolved
    pub partition_badge: Option<String>,

    /// Whether the answer degraded due to a synthesis failure
    pub degraded: bool,
}

/// The question-answering pipeline for one deployment.
///
/// Holds only read-only, shareable state; session-scoped state is
/// passed into [`run_turn`](Self::run_turn) explicitly.
pub struct Pipeline {
    registry: PartitionRegistry,
    statutes: StatuteTable,
    store: Arc<dyn VectorSearch>,
    llm: Arc<dyn LlmClient>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        registry: PartitionRegistry,
        statutes: StatuteTable,
        store: Arc<dyn VectorSearch>,
        llm: Arc<dyn LlmClient>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            registry,
            statutes,
            store,
            llm,
            options,
        }
    }

    pub fn registry(&self) -> &PartitionRegistry {
        &self.registry
    }

    /// Execute one query turn against the given session.
    ///
    /// Reads the bounded history suffix before the query, then appends
    /// the user turn and exactly one assistant turn once the answer is
    /// final. `on_partial` receives each growing partial answer during
    /// synthesis.
    pub async fn run_turn<F>(
        &self,
        session: &mut SessionContext,
        query: &str,
        on_partial: F,
    ) -> AppResult<TurnOutcome>
    where
        F: FnMut(&str) + Send,
    {
        tracing::info!("Starting query turn");

        let decision = classify(
            query,
            &self.registry,
            self.llm.as_ref(),
            &self.options.classifier_model,
            self.options.fast_classifier,
        )
        .await;

        let targets = resolve_targets(&decision, &self.registry);
        // The badge reflects an actual routing decision; an unresolved
        // fan-out gets none, even when the registry happens to hold a
        // single partition
        let partition_badge = match decision.partition_keys.as_slice() {
            [single] => self.registry.get(single).map(|p| p.display_name.clone()),
            _ => None,
        };

        let retrieval = retrieve(self.store.as_ref(), &self.registry, query, &targets).await?;

        if retrieval.is_empty() {
            tracing::info!(
                failed = retrieval.failures.len(),
                "No passages retrieved, returning terminal no-results response"
            );
            session.push_user(query);
            session.push_assistant(NO_RESULTS_MESSAGE, partition_badge.clone());

            return Ok(TurnOutcome {
                answer: NO_RESULTS_MESSAGE.to_string(),
                citations: Vec::new(),
                decision,
                sources: Vec::new(),
                partition_badge,
                degraded: false,
            });
        }

        let context = assemble_context(&retrieval.passages, &self.registry);
        let messages = build_messages(query, &context, session.history_window(), targets.len() > 1);

        let (answer, degraded) = match synthesize(
            self.llm.as_ref(),
            &self.options.model,
            messages,
            on_partial,
        )
        .await
        {
            Ok(answer) => (answer, false),
            Err(e) => {
                // The turn is still recorded; the session must not
                // lose it or crash
                tracing::error!("Answer synthesis failed: {}", e);
                (DEGRADED_MESSAGE.to_string(), true)
            }
        };

        let citations = if degraded {
            Vec::new()
        } else {
            self.statutes.extract(&answer)
        };

        session.push_user(query);
        session.push_assistant(answer.clone(), partition_badge.clone());

        tracing::info!(
            passages = retrieval.passages.len(),
            citations = citations.len(),
            degraded,
            "Query turn completed"
        );

        Ok(TurnOutcome {
            answer,
            citations,
            decision,
            sources: retrieval.passages,
            partition_badge,
            degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mevzuat_core::{AppError, AppResult};
    use mevzuat_llm::{ChatRequest, ChatResponse, ChatStream, ChatStreamChunk, LlmUsage};
    use mevzuat_retrieval::{Partition, RouteMode, SearchHit, StoreError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn partition(key: &str, display_name: &str, keywords: &[&str]) -> Partition {
        Partition {
            key: key.to_string(),
            display_name: display_name.to_string(),
            collection: format!("{}Doc", key),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            icon: String::new(),
            description: String::new(),
        }
    }

    fn registry() -> PartitionRegistry {
        PartitionRegistry::from_partitions(vec![
            partition("rent_law", "Kira Hukuku", &["kira", "tahliye"]),
            partition("labor_law", "İş Hukuku", &["işçi", "kıdem"]),
        ])
        .unwrap()
    }

    /// Mock store with canned hits per collection and a record of the
    /// collections searched.
    struct MockStore {
        hits: HashMap<String, Vec<SearchHit>>,
        missing: Vec<String>,
        searched: Mutex<Vec<String>>,
    }

    impl MockStore {
        fn empty() -> Self {
            Self {
                hits: HashMap::new(),
                missing: Vec::new(),
                searched: Mutex::new(Vec::new()),
            }
        }

        fn with_hits(mut self, collection: &str, count: usize) -> Self {
            let hits = (0..count)
                .map(|i| SearchHit {
                    content: format!("{} içerik {}", collection, i),
                    source_file: format!("{}.pdf", collection),
                    page_number: (i + 1) as u32,
                    score: 0.9,
                })
                .collect();
            self.hits.insert(collection.to_string(), hits);
            self
        }

        fn with_missing(mut self, collection: &str) -> Self {
            self.missing.push(collection.to_string());
            self
        }
    }

    #[async_trait::async_trait]
    impl VectorSearch for MockStore {
        async fn hybrid_search(
            &self,
            collection: &str,
            _query: &str,
            limit: usize,
            _alpha: f32,
        ) -> Result<Vec<SearchHit>, StoreError> {
            self.searched.lock().unwrap().push(collection.to_string());

            if self.missing.iter().any(|c| c == collection) {
                return Err(StoreError::NotFound(collection.to_string()));
            }

            let hits = self.hits.get(collection).cloned().unwrap_or_default();
            Ok(hits.into_iter().take(limit).collect())
        }
    }

    /// Mock generation client: fixed classification reply, fixed
    /// streamed fragments, call counters for collaborator assertions.
    struct MockLlm {
        classify_reply: String,
        fragments: Vec<&'static str>,
        fail_stream: bool,
        complete_calls: AtomicUsize,
        stream_calls: AtomicUsize,
    }

    impl MockLlm {
        fn new(classify_reply: &str, fragments: Vec<&'static str>) -> Self {
            Self {
                classify_reply: classify_reply.to_string(),
                fragments,
                fail_stream: false,
                complete_calls: AtomicUsize::new(0),
                stream_calls: AtomicUsize::new(0),
            }
        }

        fn failing_stream(mut self) -> Self {
            self.fail_stream = true;
            self
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for MockLlm {
        fn provider_name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: &ChatRequest) -> AppResult<ChatResponse> {
            self.complete_calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChatResponse {
                content: self.classify_reply.clone(),
                model: "mock".to_string(),
                usage: LlmUsage::default(),
            })
        }

        async fn stream(&self, _request: &ChatRequest) -> AppResult<ChatStream> {
            self.stream_calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_stream {
                return Err(AppError::Llm("stream refused".to_string()));
            }

            let mut items: Vec<AppResult<ChatStreamChunk>> = self
                .fragments
                .iter()
                .map(|fragment| {
                    Ok(ChatStreamChunk {
                        content: fragment.to_string(),
                        done: false,
                        usage: None,
                    })
                })
                .collect();
            items.push(Ok(ChatStreamChunk {
                content: String::new(),
                done: true,
                usage: None,
            }));

            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    fn pipeline(store: MockStore, llm: MockLlm) -> (Pipeline, Arc<MockStore>, Arc<MockLlm>) {
        let store = Arc::new(store);
        let llm = Arc::new(llm);
        let pipeline = Pipeline::new(
            registry(),
            StatuteTable::default_table(),
            store.clone(),
            llm.clone(),
            PipelineOptions {
                model: "gpt-4o".to_string(),
                classifier_model: "gpt-4o-mini".to_string(),
                fast_classifier: true,
            },
        );
        (pipeline, store, llm)
    }

    #[tokio::test]
    async fn test_routed_turn_with_citation() {
        // Keyword-routed query feeding a full turn
        let (pipeline, store, llm) = pipeline(
            MockStore::empty().with_hits("rent_lawDoc", 3),
            MockLlm::new("belirsiz", vec!["Kira artışı için ", "**TBK Madde 344** uygulanır."]),
        );

        let mut session = SessionContext::new();
        let mut partials = Vec::new();
        let outcome = pipeline
            .run_turn(&mut session, "kira artış oranı nedir", |partial| {
                partials.push(partial.to_string())
            })
            .await
            .unwrap();

        // Fast classifier resolved the partition; no model routing call
        assert_eq!(outcome.decision.mode, RouteMode::Fast);
        assert_eq!(llm.complete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            store.searched.lock().unwrap().as_slice(),
            &["rent_lawDoc".to_string()]
        );

        assert_eq!(outcome.answer, "Kira artışı için **TBK Madde 344** uygulanır.");
        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].statute_key, "tbk");
        assert_eq!(outcome.partition_badge.as_deref(), Some("Kira Hukuku"));
        assert!(!outcome.degraded);

        // Partials grew monotonically
        assert_eq!(partials.len(), 2);
        assert!(partials[1].starts_with(&partials[0]));

        // Exactly one user and one assistant turn were appended
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[1].content, outcome.answer);
        assert_eq!(
            session.turns()[1].partition_badge.as_deref(),
            Some("Kira Hukuku")
        );
    }

    #[tokio::test]
    async fn test_empty_retrieval_skips_synthesis() {
        let (pipeline, _store, llm) = pipeline(
            MockStore::empty(),
            MockLlm::new("belirsiz", vec!["kullanılmamalı"]),
        );

        let mut session = SessionContext::new();
        let outcome = pipeline
            .run_turn(&mut session, "kira sorusu", |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.answer, NO_RESULTS_MESSAGE);
        assert!(outcome.citations.is_empty());
        assert!(outcome.sources.is_empty());

        // The synthesizer was never called
        assert_eq!(llm.stream_calls.load(Ordering::SeqCst), 0);

        // The turn was still recorded
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[1].content, NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_unresolved_query_fans_out() {
        // No keyword hit and the fallback stays inconclusive
        let (pipeline, store, llm) = pipeline(
            MockStore::empty()
                .with_hits("rent_lawDoc", 5)
                .with_hits("labor_lawDoc", 5),
            MockLlm::new("belirsiz", vec!["Genel cevap."]),
        );

        let mut session = SessionContext::new();
        let outcome = pipeline
            .run_turn(&mut session, "miras paylaşımı nasıl olur", |_| {})
            .await
            .unwrap();

        // Fallback classifier was consulted and stayed inconclusive
        assert_eq!(llm.complete_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.decision.mode, RouteMode::Unresolved);

        // Both partitions searched, limit 2 each, aggregate bounded
        let searched = store.searched.lock().unwrap();
        assert_eq!(searched.len(), 2);
        assert_eq!(outcome.sources.len(), 4);
        assert!(outcome.partition_badge.is_none());
    }

    #[tokio::test]
    async fn test_failed_partition_does_not_fail_turn() {
        // labor_law store is missing, rent_law answers
        let (pipeline, _store, _llm) = pipeline(
            MockStore::empty()
                .with_hits("rent_lawDoc", 2)
                .with_missing("labor_lawDoc"),
            MockLlm::new("belirsiz", vec!["Cevap."]),
        );

        let mut session = SessionContext::new();
        let outcome = pipeline
            .run_turn(&mut session, "miras sorusu", |_| {})
            .await
            .unwrap();

        assert!(outcome
            .sources
            .iter()
            .all(|p| p.partition_key == "rent_law"));
        assert_eq!(outcome.sources.len(), 2);
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn test_stream_failure_degrades_and_records_turn() {
        let (pipeline, _store, _llm) = pipeline(
            MockStore::empty().with_hits("rent_lawDoc", 2),
            MockLlm::new("belirsiz", vec![]).failing_stream(),
        );

        let mut session = SessionContext::new();
        let outcome = pipeline
            .run_turn(&mut session, "kira sorusu", |_| {})
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.answer, DEGRADED_MESSAGE);
        assert!(outcome.citations.is_empty());

        // The session did not lose the turn
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[1].content, DEGRADED_MESSAGE);
    }

    #[tokio::test]
    async fn test_fallback_classifier_routes_single_partition() {
        let (pipeline, store, llm) = pipeline(
            MockStore::empty().with_hits("labor_lawDoc", 4),
            MockLlm::new("labor_law", vec!["Kıdem tazminatı cevabı."]),
        );

        let mut session = SessionContext::new();
        let outcome = pipeline
            // No registered keyword appears in the query
            .run_turn(&mut session, "yıllık izin hakkım ne kadar", |_| {})
            .await
            .unwrap();

        assert_eq!(llm.complete_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.decision.mode, RouteMode::Fallback);
        assert_eq!(outcome.partition_badge.as_deref(), Some("İş Hukuku"));
        assert_eq!(
            store.searched.lock().unwrap().as_slice(),
            &["labor_lawDoc".to_string()]
        );
        // Singleton target set gets the deeper limit
        assert_eq!(outcome.sources.len(), 4);
    }

    #[tokio::test]
    async fn test_unresolved_routing_shows_no_badge() {
        // Even a single-partition registry gets no badge when the
        // classification stayed unresolved
        let store = Arc::new(MockStore::empty().with_hits("rent_lawDoc", 2));
        let llm = Arc::new(MockLlm::new("belirsiz", vec!["Cevap."]));
        let pipeline = Pipeline::new(
            PartitionRegistry::from_partitions(vec![partition(
                "rent_law",
                "Kira Hukuku",
                &["kira"],
            )])
            .unwrap(),
            StatuteTable::default_table(),
            store,
            llm,
            PipelineOptions {
                model: "gpt-4o".to_string(),
                classifier_model: "gpt-4o-mini".to_string(),
                fast_classifier: true,
            },
        );

        let mut session = SessionContext::new();
        let outcome = pipeline
            .run_turn(&mut session, "miras sorusu", |_| {})
            .await
            .unwrap();

        assert_eq!(outcome.decision.mode, RouteMode::Unresolved);
        assert!(outcome.partition_badge.is_none());
        assert!(session.turns()[1].partition_badge.is_none());
    }

    #[tokio::test]
    async fn test_history_window_excludes_current_query() {
        let (pipeline, _store, _llm) = pipeline(
            MockStore::empty().with_hits("rent_lawDoc", 1),
            MockLlm::new("belirsiz", vec!["Cevap."]),
        );

        let mut session = SessionContext::new();
        pipeline
            .run_turn(&mut session, "kira birinci soru", |_| {})
            .await
            .unwrap();
        pipeline
            .run_turn(&mut session, "kira ikinci soru", |_| {})
            .await
            .unwrap();

        // Two full turns recorded
        assert_eq!(session.len(), 4);
        assert_eq!(session.turns()[2].content, "kira ikinci soru");
    }
}

//! Reindex coordinator - rebuilds and publishes a domain's (snapshot, index) pair

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::catalog::{IndexCatalog, PublishedIndex};
use super::embedding_store::EmbeddingStore;
use super::ingestion_service::IngestionService;
use crate::domain::ingestion::{Chunk, ChunkingConfig, ChunkingStrategy};
use crate::domain::vector_index::FlatIndex;
use crate::domain::{DomainError, DomainName, ReindexReport, ReindexState};

type StateMap = Mutex<HashMap<DomainName, ReindexState>>;

/// Marks a run `Failed` unless it is explicitly finished, so a dropped
/// reindex future never leaves its domain stuck in `Running`.
struct RunGuard<'a> {
    states: &'a StateMap,
    domain: DomainName,
    run_id: Uuid,
    finished: bool,
}

impl RunGuard<'_> {
    fn finish(mut self, state: ReindexState) {
        self.finished = true;
        set_state(self.states, &self.domain, state);
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            set_state(
                self.states,
                &self.domain,
                ReindexState::Failed {
                    run_id: self.run_id,
                    error: "reindex was cancelled".to_string(),
                    finished_at: Utc::now(),
                },
            );
        }
    }
}

fn set_state(states: &StateMap, domain: &DomainName, state: ReindexState) {
    match states.lock() {
        Ok(mut states) => {
            states.insert(domain.clone(), state);
        }
        Err(poisoned) => {
            poisoned.into_inner().insert(domain.clone(), state);
        }
    }
}

pub struct ReindexService {
    ingestion: Arc<IngestionService>,
    chunker: Arc<dyn ChunkingStrategy>,
    chunking: ChunkingConfig,
    store: Arc<EmbeddingStore>,
    catalog: Arc<IndexCatalog>,
    states: StateMap,
}

impl std::fmt::Debug for ReindexService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReindexService")
            .field("chunker", &self.chunker.name())
            .field("chunking", &self.chunking)
            .finish()
    }
}

impl ReindexService {
    pub fn new(
        ingestion: Arc<IngestionService>,
        chunker: Arc<dyn ChunkingStrategy>,
        chunking: ChunkingConfig,
        store: Arc<EmbeddingStore>,
        catalog: Arc<IndexCatalog>,
    ) -> Self {
        Self {
            ingestion,
            chunker,
            chunking,
            store,
            catalog,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current lifecycle state of a domain
    pub fn state(&self, domain: &DomainName) -> ReindexState {
        let states = match self.states.lock() {
            Ok(states) => states,
            Err(poisoned) => poisoned.into_inner(),
        };
        states.get(domain).cloned().unwrap_or(ReindexState::Idle)
    }

    fn begin(&self, domain: &DomainName) -> Result<RunGuard<'_>, DomainError> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| DomainError::storage("Reindex state lock poisoned"))?;

        if states.get(domain).is_some_and(ReindexState::is_running) {
            return Err(DomainError::reindex_in_progress(domain.as_str()));
        }

        let run_id = Uuid::new_v4();
        states.insert(
            domain.clone(),
            ReindexState::Running {
                run_id,
                started_at: Utc::now(),
            },
        );

        Ok(RunGuard {
            states: &self.states,
            domain: domain.clone(),
            run_id,
            finished: false,
        })
    }

    /// Rebuild the domain from its stored documents and publish the result.
    ///
    /// On failure the published pair is left untouched.
    #[instrument(skip_all, fields(domain = %domain))]
    pub async fn reindex(&self, domain: &DomainName) -> Result<ReindexReport, DomainError> {
        let guard = self.begin(domain)?;
        let run_id = guard.run_id;
        let started = Instant::now();

        info!(run_id = %run_id, "Reindex started");

        match self.run(domain, run_id, started).await {
            Ok(report) => {
                guard.finish(ReindexState::Published {
                    run_id,
                    version: report.version,
                    finished_at: Utc::now(),
                });
                info!(
                    run_id = %run_id,
                    version = report.version,
                    chunks = report.chunks,
                    documents_skipped = report.documents_skipped,
                    elapsed_ms = report.elapsed_ms,
                    "Reindex published"
                );
                Ok(report)
            }
            Err(e) => {
                guard.finish(ReindexState::Failed {
                    run_id,
                    error: e.to_string(),
                    finished_at: Utc::now(),
                });
                error!(run_id = %run_id, error = %e, "Reindex failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        domain: &DomainName,
        run_id: Uuid,
        started: Instant,
    ) -> Result<ReindexReport, DomainError> {
        let step = |name: &'static str| {
            move |e: DomainError| match e {
                e @ DomainError::Reindex { .. } => e,
                e => DomainError::reindex(domain.as_str(), name, e.to_string()),
            }
        };

        let texts = self
            .ingestion
            .read_domain(domain)
            .await
            .map_err(step("read"))?;

        if texts.documents.is_empty() {
            return Err(DomainError::reindex(
                domain.as_str(),
                "read",
                format!(
                    "no readable documents ({} skipped)",
                    texts.skipped.len()
                ),
            ));
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        for document in &texts.documents {
            let document_chunks = self
                .chunker
                .chunk(domain, &document.name, &document.text, &self.chunking)
                .map_err(step("chunk"))?;
            chunks.extend(document_chunks);
        }

        if chunks.is_empty() {
            return Err(DomainError::reindex(
                domain.as_str(),
                "chunk",
                "documents yielded no chunks",
            ));
        }

        let current = match self.catalog.current_version(domain).await {
            Ok(current) => current.unwrap_or(0),
            Err(e @ DomainError::CorruptSnapshot { .. }) => {
                warn!(error = %e, "Current pointer is unreadable, rebuilding from scratch");
                0
            }
            Err(e) => return Err(step("version")(e)),
        };
        let version = current + 1;

        let chunk_count = chunks.len();
        let snapshot = self
            .store
            .build(domain, version, chunks)
            .await
            .map_err(step("embed"))?;

        let index = FlatIndex::build(version, snapshot.dimensions, &snapshot.vectors)
            .map_err(step("index"))?;

        self.store
            .persist(&snapshot)
            .await
            .map_err(step("persist"))?;

        let published = PublishedIndex::new(snapshot, index).map_err(step("index"))?;
        self.catalog
            .publish(domain, published)
            .await
            .map_err(step("publish"))?;

        Ok(ReindexReport {
            run_id,
            domain: domain.clone(),
            version,
            documents_read: texts.documents.len(),
            documents_skipped: texts.skipped.len(),
            chunks: chunk_count,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Reindex every domain found in document storage, concurrently
    pub async fn reindex_all(
        &self,
    ) -> Result<Vec<(DomainName, Result<ReindexReport, DomainError>)>, DomainError> {
        let domains = self.ingestion.domains().await?;

        let outcomes = join_all(domains.iter().map(|domain| self.reindex(domain))).await;

        Ok(domains.into_iter().zip(outcomes).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::{InMemorySnapshotRepository, MockEmbeddingProvider};
    use crate::domain::ingestion::InMemoryDocumentRepository;
    use crate::domain::vector_index::InMemoryIndexRepository;
    use crate::infrastructure::ingestion::{ReaderRegistry, SentenceChunker};
    use crate::infrastructure::services::RetrievalService;
    use std::time::Duration;

    const CLAIM: &str = "A car accident claim requires a police report.";
    const DEADLINE: &str = "File within 30 days of the incident.";
    const QUERY: &str = "How do I claim after a car accident?";

    fn domain(name: &str) -> DomainName {
        DomainName::new(name).unwrap()
    }

    fn provider() -> MockEmbeddingProvider {
        MockEmbeddingProvider::new(2)
            .with_vector(CLAIM, vec![0.0, 0.0])
            .with_vector(DEADLINE, vec![10.0, 10.0])
            .with_vector(QUERY, vec![0.5, 0.5])
    }

    struct Fixture {
        ingestion: Arc<IngestionService>,
        snapshots: Arc<InMemorySnapshotRepository>,
        indexes: Arc<InMemoryIndexRepository>,
        catalog: Arc<IndexCatalog>,
    }

    impl Fixture {
        fn new() -> Self {
            let snapshots = Arc::new(InMemorySnapshotRepository::new());
            let indexes = Arc::new(InMemoryIndexRepository::new());
            Self {
                ingestion: Arc::new(IngestionService::new(
                    Arc::new(InMemoryDocumentRepository::new()),
                    ReaderRegistry::default(),
                )),
                catalog: Arc::new(IndexCatalog::new(snapshots.clone(), indexes.clone())),
                snapshots,
                indexes,
            }
        }

        fn store(&self, provider: MockEmbeddingProvider) -> Arc<EmbeddingStore> {
            Arc::new(EmbeddingStore::new(
                Arc::new(provider),
                self.snapshots.clone(),
                self.indexes.clone(),
            ))
        }

        fn service(&self, provider: MockEmbeddingProvider) -> ReindexService {
            ReindexService::new(
                self.ingestion.clone(),
                Arc::new(SentenceChunker::new()),
                ChunkingConfig::new(8),
                self.store(provider),
                self.catalog.clone(),
            )
        }

        fn retrieval(&self) -> RetrievalService {
            RetrievalService::new(self.store(provider()), self.catalog.clone())
        }

        async fn ingest(&self, d: &str, name: &str, text: &str) {
            self.ingestion
                .ingest(&domain(d), name, text.as_bytes().to_vec())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_reindex_publishes_and_answers_law_query() {
        let fixture = Fixture::new();
        fixture
            .ingest("law", "claims.txt", &format!("{} {}", CLAIM, DEADLINE))
            .await;
        let service = fixture.service(provider());

        let report = service.reindex(&domain("law")).await.unwrap();

        assert_eq!(report.version, 1);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.documents_read, 1);
        assert_eq!(report.documents_skipped, 0);
        assert!(matches!(
            service.state(&domain("law")),
            ReindexState::Published { version: 1, .. }
        ));

        let result = fixture
            .retrieval()
            .search(QUERY, &domain("law"), 1)
            .await
            .unwrap();
        assert_eq!(result.texts(), vec![CLAIM]);
    }

    #[tokio::test]
    async fn test_reindex_is_rerunnable() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        let service = fixture.service(provider());

        service.reindex(&domain("law")).await.unwrap();
        let second = service.reindex(&domain("law")).await.unwrap();

        assert_eq!(second.version, 2);
        assert_eq!(
            fixture.catalog.current_version(&domain("law")).await.unwrap(),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_unreadable_documents_are_skipped_and_counted() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        fixture.ingest("law", "brief.docx", "not a zip archive").await;

        let report = fixture
            .service(provider())
            .reindex(&domain("law"))
            .await
            .unwrap();

        assert_eq!(report.documents_read, 1);
        assert_eq!(report.documents_skipped, 1);
    }

    #[tokio::test]
    async fn test_empty_domain_fails() {
        let fixture = Fixture::new();
        let service = fixture.service(provider());

        let result = service.reindex(&domain("law")).await;

        match result {
            Err(DomainError::Reindex { domain, step, .. }) => {
                assert_eq!(domain, "law");
                assert_eq!(step, "read");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            service.state(&domain("law")),
            ReindexState::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_whitespace_only_documents_yield_no_chunks() {
        let fixture = Fixture::new();
        fixture.ingest("law", "blank.txt", "   \n\t ").await;

        let result = fixture.service(provider()).reindex(&domain("law")).await;

        assert!(matches!(
            result,
            Err(DomainError::Reindex { ref step, .. }) if step == "chunk"
        ));
    }

    #[tokio::test]
    async fn test_failed_reindex_keeps_previous_pair() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        fixture.service(provider()).reindex(&domain("law")).await.unwrap();

        fixture.ingest("law", "deadlines.txt", DEADLINE).await;
        let failing = fixture.service(provider().with_error("model offline"));
        let result = failing.reindex(&domain("law")).await;

        assert!(matches!(
            result,
            Err(DomainError::Reindex { ref step, .. }) if step == "embed"
        ));
        assert!(matches!(
            failing.state(&domain("law")),
            ReindexState::Failed { .. }
        ));

        let search = fixture
            .retrieval()
            .search(QUERY, &domain("law"), 5)
            .await
            .unwrap();
        assert_eq!(search.snapshot_version, 1);
        assert_eq!(search.texts(), vec![CLAIM]);
    }

    #[tokio::test]
    async fn test_misaligned_embeddings_fail_reindex() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;

        let result = fixture
            .service(provider().with_missing_vector())
            .reindex(&domain("law"))
            .await;

        assert!(matches!(result, Err(DomainError::Reindex { .. })));
        assert_eq!(
            fixture.catalog.current_version(&domain("law")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_concurrent_reindex_of_same_domain_rejected() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        let service = fixture.service(provider().with_delay(Duration::from_millis(100)));
        let law = domain("law");

        let (first, second) = tokio::join!(service.reindex(&law), service.reindex(&law));

        assert!(first.is_ok());
        assert!(matches!(second, Err(DomainError::ReindexInProgress { .. })));
    }

    #[tokio::test]
    async fn test_different_domains_proceed_independently() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        fixture.ingest("medical", "referrals.txt", "Patients need a referral.").await;
        let service = fixture.service(provider().with_delay(Duration::from_millis(50)));
        let (law_domain, medical_domain) = (domain("law"), domain("medical"));

        let (law, medical) = tokio::join!(
            service.reindex(&law_domain),
            service.reindex(&medical_domain)
        );

        assert!(law.is_ok());
        assert!(medical.is_ok());
    }

    #[tokio::test]
    async fn test_queries_see_old_pair_during_rebuild() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        fixture.service(provider()).reindex(&domain("law")).await.unwrap();

        fixture.ingest("law", "deadlines.txt", DEADLINE).await;
        let slow = fixture.service(provider().with_delay(Duration::from_millis(200)));
        let retrieval = fixture.retrieval();
        let law = domain("law");

        let (rebuild, during) = tokio::join!(slow.reindex(&law), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            retrieval.search(QUERY, &law, 5).await
        });

        let during = during.unwrap();
        assert_eq!(during.snapshot_version, 1);
        assert_eq!(during.texts(), vec![CLAIM]);

        assert_eq!(rebuild.unwrap().version, 2);
        let after = retrieval.search(QUERY, &domain("law"), 5).await.unwrap();
        assert_eq!(after.snapshot_version, 2);
        assert_eq!(after.texts(), vec![CLAIM, DEADLINE]);
    }

    #[tokio::test]
    async fn test_cancelled_reindex_is_marked_failed() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        let service = fixture.service(provider().with_delay(Duration::from_secs(5)));

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            service.reindex(&domain("law")),
        )
        .await;

        assert!(result.is_err());
        match service.state(&domain("law")) {
            ReindexState::Failed { error, .. } => assert!(error.contains("cancelled")),
            other => panic!("unexpected state: {other:?}"),
        }
        assert_eq!(
            fixture.catalog.current_version(&domain("law")).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_reindex_all_reports_per_domain() {
        let fixture = Fixture::new();
        fixture.ingest("law", "claims.txt", CLAIM).await;
        fixture.ingest("medical", "blank.txt", " ").await;

        let outcomes = fixture.service(provider()).reindex_all().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, domain("law"));
        assert!(outcomes[0].1.is_ok());
        assert_eq!(outcomes[1].0, domain("medical"));
        assert!(outcomes[1].1.is_err());
    }
}

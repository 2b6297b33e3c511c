//! End-to-end coverage of the rebuild protocol and the vector-index
//! boundary behaviors not already exercised by `vectorindex::flat`'s own
//! unit tests: dense `vector_id` reassignment across a rebuild, and
//! searching an index that holds nothing yet.

use codeloom::domain::ports::{AnnIndex, EmbeddingProvider, PersistentStore};
use codeloom::domain::types::{BindingLevel, Chunk, SourceType};
use codeloom::orchestrator::semantic::{semantic_search, SemanticSearchOptions};
use codeloom::store::Store;
use codeloom::vectorindex::FlatIndex;
use uuid::Uuid;

async fn project_with_chunks(store: &Store, vector_ids: &[Option<i64>]) -> codeloom::domain::types::ProjectId {
    let project_id = store.get_or_create_project("/repo", "repo").await.unwrap();
    let file_id = store
        .upsert_file(project_id, "module.py", "/repo/module.py", 10, chrono::Utc::now(), false, None)
        .await
        .unwrap();

    for (i, vector_id) in vector_ids.iter().enumerate() {
        let chunk = Chunk {
            uuid: Uuid::new_v4(),
            id: 0,
            file_id,
            project_id,
            owner_id: None,
            line: (i + 1) as u32,
            node_type: "string".to_string(),
            source_type: SourceType::FileDocstring,
            ordinal: 0,
            binding_level: BindingLevel::File,
            text: format!("chunk {i}"),
            embedding_model: Some("test-model".to_string()),
            embedding_vector: Some(vec![i as f32 + 1.0, 0.0]),
            vector_id: *vector_id,
            score: None,
        };
        store.add_code_chunk(chunk).await.unwrap();
    }
    project_id
}

/// A rebuild reassigns sparse `vector_id`s (as left behind by deletions)
/// to a dense run before loading the fresh index, and the resulting index
/// holds exactly as many vectors as chunks that had one to begin with.
#[tokio::test]
async fn rebuild_reassigns_sparse_vector_ids_densely_and_loads_every_vector() {
    let store = Store::open_in_memory().await.unwrap();
    let project_id = project_with_chunks(&store, &[Some(3), Some(5), Some(9)]).await;

    let mut index = FlatIndex::create(2, "unused").unwrap();
    let report = codeloom::vectorindex::rebuild(&store, &mut index, None, project_id, None).await.unwrap();

    assert_eq!(report.loaded, 3);
    assert_eq!(report.missing, 0);
    assert_eq!(index.stats().vector_count, 3);
    let mut ids = index.ids();
    ids.sort();
    assert_eq!(ids, vec![0, 1, 2]);
}

/// A chunk with no stored vector and no embedding provider to fall back on
/// is skipped, not an error.
#[tokio::test]
async fn rebuild_counts_vectorless_chunks_as_missing_without_an_embedding_provider() {
    let store = Store::open_in_memory().await.unwrap();
    let project_id = store.get_or_create_project("/repo", "repo").await.unwrap();
    let file_id = store
        .upsert_file(project_id, "module.py", "/repo/module.py", 10, chrono::Utc::now(), false, None)
        .await
        .unwrap();
    let chunk = Chunk {
        uuid: Uuid::new_v4(),
        id: 0,
        file_id,
        project_id,
        owner_id: None,
        line: 1,
        node_type: "string".to_string(),
        source_type: SourceType::FileDocstring,
        ordinal: 0,
        binding_level: BindingLevel::File,
        text: "undocumented".to_string(),
        embedding_model: None,
        embedding_vector: None,
        vector_id: None,
        score: None,
    };
    store.add_code_chunk(chunk).await.unwrap();

    let mut index = FlatIndex::create(2, "unused").unwrap();
    let report = codeloom::vectorindex::rebuild(&store, &mut index, None, project_id, None).await.unwrap();

    assert_eq!(report.loaded, 0);
    assert_eq!(report.missing, 1);
    assert_eq!(index.stats().vector_count, 0);
}

struct StubEmbeddingProvider {
    vector: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn embed(
        &self,
        request: &codeloom::domain::ports::ChunkRequest,
    ) -> codeloom::domain::error::Result<Vec<codeloom::domain::ports::ChunkResponse>> {
        Ok(vec![codeloom::domain::ports::ChunkResponse {
            text: request.text.clone(),
            vector: self.vector.clone(),
            model: "stub-model".to_string(),
            score: None,
        }])
    }

    async fn embed_batch(
        &self,
        requests: &[codeloom::domain::ports::ChunkRequest],
    ) -> codeloom::domain::error::Result<Vec<Vec<codeloom::domain::ports::ChunkResponse>>> {
        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            out.push(self.embed(request).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

/// Searching an index that holds nothing yet returns an empty result, not
/// an error — `semantic_search`'s re-hydration loop simply has zero raw
/// hits to iterate.
#[tokio::test]
async fn semantic_search_against_an_empty_index_returns_empty_not_an_error() {
    let store = Store::open_in_memory().await.unwrap();
    let index = FlatIndex::create(2, "unused").unwrap();
    let embedding = StubEmbeddingProvider { vector: vec![1.0, 0.0] };

    let hits = semantic_search(&store, &index, &embedding, "anything", 5, &SemanticSearchOptions::default()).await.unwrap();
    assert!(hits.is_empty());
}

//! Chunker (C6): extracts prose from a CST, applies level-adaptive
//! grouping, and — when an [`EmbeddingProvider`] is supplied — embeds each
//! group inline.

pub mod extract;
pub mod grouping;

pub use extract::{extract, Owner, ProseItem};
pub use grouping::{group, ChunkGroup, DEFAULT_MIN_CHUNK_LENGTH};

use crate::domain::error::Result;
use crate::domain::ports::{ChunkRequest, EmbeddingProvider};
use crate::domain::types::{BindingLevel, SourceType};
use codeloom_tree_sitter_analysis::Cst;
use tracing::warn;

/// A chunk ready for insertion, before the store has assigned it ids.
#[derive(Debug, Clone)]
pub struct ChunkDraft {
    pub owner: Owner,
    pub line: u32,
    pub node_type: &'static str,
    pub source_type: SourceType,
    pub ordinal: u32,
    pub binding_level: BindingLevel,
    pub text: String,
    pub embedding_model: Option<String>,
    pub embedding_vector: Option<Vec<f32>>,
    pub score: Option<f32>,
}

/// Extract, group, and (if `provider` is given) embed every prose item in
/// `cst`.
///
/// A provider failure for one group is logged and the corresponding
/// drafts are left without a vector — this is the "rare" case
/// [`crate::domain::ports::PersistentStore::get_non_vectorized_chunks`]
/// exists to reconcile when it instead fails *after* the chunk row has a
/// vector but before `vector_id` assignment; a chunk with no vector at all
/// is picked up again the next time its file is revectorized.
pub async fn chunk_file(
    cst: &Cst,
    l_min: usize,
    provider: Option<&dyn EmbeddingProvider>,
) -> Result<Vec<ChunkDraft>> {
    let items = extract(cst);
    let groups = group(items, l_min);
    let mut drafts = Vec::with_capacity(groups.len());

    for group in groups {
        drafts.extend(embed_group(group, provider).await);
    }
    Ok(drafts)
}

async fn embed_group(group: ChunkGroup, provider: Option<&dyn EmbeddingProvider>) -> Vec<ChunkDraft> {
    let Some(provider) = provider else {
        return vec![bare_draft(group, 0)];
    };

    let request = ChunkRequest {
        text: group.text.clone(),
        model: None,
    };
    match provider.embed(&request).await {
        Ok(responses) if !responses.is_empty() => responses
            .into_iter()
            .enumerate()
            .map(|(ordinal, response)| ChunkDraft {
                owner: group.owner.clone(),
                line: group.line,
                node_type: group.node_type,
                source_type: group.source_type,
                ordinal: ordinal as u32,
                binding_level: group.binding_level,
                text: response.text,
                embedding_model: Some(response.model),
                embedding_vector: Some(response.vector),
                score: response.score,
            })
            .collect(),
        Ok(_) => vec![bare_draft(group, 0)],
        Err(err) => {
            warn!(error = %err, "embedding provider failed for chunk group; storing without a vector");
            vec![bare_draft(group, 0)]
        }
    }
}

fn bare_draft(group: ChunkGroup, ordinal: u32) -> ChunkDraft {
    ChunkDraft {
        owner: group.owner,
        line: group.line,
        node_type: group.node_type,
        source_type: group.source_type,
        ordinal,
        binding_level: group.binding_level,
        text: group.text,
        embedding_model: None,
        embedding_vector: None,
        score: None,
    }
}

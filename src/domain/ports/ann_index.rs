use crate::domain::error::Result;

/// Snapshot of an [`AnnIndex`]'s size and location.
#[derive(Debug, Clone)]
pub struct AnnStats {
    /// Number of vectors currently held.
    pub vector_count: usize,
    /// Fixed dimension of every vector in the index.
    pub vector_dim: usize,
    /// Path the index is persisted to.
    pub index_path: String,
}

/// Result of comparing the store's `vector_id` set against the index's id
/// set for a given scope.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Ids present in the store but absent from the index.
    pub missing_in_index: Vec<i64>,
    /// Ids present in the index but with no corresponding store row.
    pub extra_in_index: Vec<i64>,
}

impl SyncReport {
    /// Whether the store and index agree exactly.
    pub fn is_in_sync(&self) -> bool {
        self.missing_in_index.is_empty() && self.extra_in_index.is_empty()
    }
}

/// Approximate-nearest-neighbor index over unit-normalized fixed-dimension
/// vectors, id-mapped to `code_chunks.vector_id`.
///
/// The baseline implementation ([`crate::vectorindex::FlatIndex`]) does
/// exact flat L2 search; this trait exists so it can be swapped for an
/// IVF-style index later without touching any caller.
pub trait AnnIndex: Send + Sync {
    /// Create an empty index of the given dimension.
    fn create(dim: usize, path: &str) -> Result<Self>
    where
        Self: Sized;

    /// Load a previously saved index from disk.
    fn load(path: &str) -> Result<Self>
    where
        Self: Sized;

    /// Persist the index to its backing path.
    fn save(&self) -> Result<()>;

    /// Insert a vector, unit-normalizing it first. `id` must be unique;
    /// re-adding an existing id overwrites it.
    fn add(&mut self, vector: &[f32], id: i64) -> Result<()>;

    /// Return up to `k` nearest ids and their L2 distances, ascending.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>>;

    /// Current size/location snapshot.
    fn stats(&self) -> AnnStats;

    /// Compare `store_ids` (the authoritative set from the persistent
    /// store for some scope) against the ids actually held by the index.
    fn sync_check(&self, store_ids: &[i64]) -> SyncReport {
        use std::collections::HashSet;
        let store_set: HashSet<i64> = store_ids.iter().copied().collect();
        let index_set: HashSet<i64> = self.ids().into_iter().collect();
        SyncReport {
            missing_in_index: store_set.difference(&index_set).copied().collect(),
            extra_in_index: index_set.difference(&store_set).copied().collect(),
        }
    }

    /// All ids currently held, for [`AnnIndex::sync_check`].
    fn ids(&self) -> Vec<i64>;
}

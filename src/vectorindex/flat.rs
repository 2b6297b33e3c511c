//! Flat (exhaustive) L2 nearest-neighbor index over unit-normalized
//! vectors (§4.7).
//!
//! No approximation: `search` scores every stored vector. Good enough for
//! the scale this engine targets (a project's worth of code chunks); an
//! IVF-style index can implement the same [`AnnIndex`] trait later without
//! touching any caller.

use crate::domain::error::{Error, Result};
use crate::domain::ports::{AnnIndex, AnnStats};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct OnDisk {
    dim: usize,
    ids: Vec<i64>,
    vectors: Vec<f32>,
}

/// Disk-backed flat L2 index, id-mapped to `code_chunks.vector_id`.
#[derive(Debug)]
pub struct FlatIndex {
    dim: usize,
    path: String,
    ids: Vec<i64>,
    /// Row-major, `ids.len() * dim` entries; row `i` belongs to `ids[i]`.
    vectors: Vec<f32>,
}

fn unit_normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector.to_vec();
    }
    vector.iter().map(|x| x / norm).collect()
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

impl FlatIndex {
    fn row(&self, slot: usize) -> &[f32] {
        &self.vectors[slot * self.dim..(slot + 1) * self.dim]
    }

    fn slot_of(&self, id: i64) -> Option<usize> {
        self.ids.iter().position(|&existing| existing == id)
    }
}

impl AnnIndex for FlatIndex {
    fn create(dim: usize, path: &str) -> Result<Self> {
        Ok(Self {
            dim,
            path: path.to_string(),
            ids: Vec::new(),
            vectors: Vec::new(),
        })
    }

    fn load(path: &str) -> Result<Self> {
        let bytes = fs::read(path).map_err(Error::from)?;
        let on_disk: OnDisk =
            bincode::deserialize(&bytes).map_err(|e| Error::vector_index(format!("corrupt index file '{path}': {e}")))?;
        if on_disk.vectors.len() != on_disk.ids.len() * on_disk.dim {
            return Err(Error::vector_index(format!("corrupt index file '{path}': vector/id count mismatch")));
        }
        Ok(Self {
            dim: on_disk.dim,
            path: path.to_string(),
            ids: on_disk.ids,
            vectors: on_disk.vectors,
        })
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(Error::from)?;
            }
        }
        let on_disk = OnDisk {
            dim: self.dim,
            ids: self.ids.clone(),
            vectors: self.vectors.clone(),
        };
        let bytes = bincode::serialize(&on_disk).map_err(|e| Error::vector_index(format!("failed to serialize index: {e}")))?;
        fs::write(&self.path, bytes).map_err(Error::from)
    }

    fn add(&mut self, vector: &[f32], id: i64) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::vector_index(format!(
                "vector has dimension {}, index expects {}",
                vector.len(),
                self.dim
            )));
        }
        let normalized = unit_normalize(vector);
        match self.slot_of(id) {
            Some(slot) => {
                self.vectors[slot * self.dim..(slot + 1) * self.dim].copy_from_slice(&normalized);
            }
            None => {
                self.ids.push(id);
                self.vectors.extend_from_slice(&normalized);
            }
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>> {
        if query.len() != self.dim {
            return Err(Error::vector_index(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }
        let query = unit_normalize(query);
        let mut scored: Vec<(i64, f32)> =
            self.ids.iter().enumerate().map(|(slot, &id)| (id, l2_distance(&query, self.row(slot)))).collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        Ok(scored)
    }

    fn stats(&self) -> AnnStats {
        AnnStats {
            vector_count: self.ids.len(),
            vector_dim: self.dim,
            index_path: self.path.clone(),
        }
    }

    fn ids(&self) -> Vec<i64> {
        self.ids.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_search_returns_the_nearest_id_first() {
        let mut index = FlatIndex::create(3, "unused").unwrap();
        index.add(&[1.0, 0.0, 0.0], 1).unwrap();
        index.add(&[0.0, 1.0, 0.0], 2).unwrap();
        index.add(&[0.9, 0.1, 0.0], 3).unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn re_adding_an_existing_id_overwrites_rather_than_duplicates() {
        let mut index = FlatIndex::create(2, "unused").unwrap();
        index.add(&[1.0, 0.0], 7).unwrap();
        index.add(&[0.0, 1.0], 7).unwrap();
        assert_eq!(index.stats().vector_count, 1);
        let hits = index.search(&[0.0, 1.0], 1).unwrap();
        assert_eq!(hits[0].0, 7);
        assert!(hits[0].1 < 0.001);
    }

    #[test]
    fn save_then_load_round_trips_all_vectors_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        let path = path.to_str().unwrap();

        let mut index = FlatIndex::create(2, path).unwrap();
        index.add(&[3.0, 4.0], 42).unwrap();
        index.save().unwrap();

        let reloaded = FlatIndex::load(path).unwrap();
        assert_eq!(reloaded.stats().vector_count, 1);
        assert_eq!(reloaded.ids(), vec![42]);
    }

    #[test]
    fn sync_check_reports_ids_missing_from_and_extra_in_the_index() {
        let mut index = FlatIndex::create(2, "unused").unwrap();
        index.add(&[1.0, 0.0], 1).unwrap();
        index.add(&[0.0, 1.0], 2).unwrap();

        let report = index.sync_check(&[1, 3]);
        assert_eq!(report.missing_in_index, vec![3]);
        assert_eq!(report.extra_in_index, vec![2]);
        assert!(!report.is_in_sync());
    }

    #[test]
    fn mismatched_dimension_on_add_is_rejected() {
        let mut index = FlatIndex::create(3, "unused").unwrap();
        assert!(index.add(&[1.0, 0.0], 1).is_err());
    }
}

//! Exact flat L2 index

use serde::{Deserialize, Serialize};

use crate::domain::embedding::squared_l2_distance;
use crate::domain::DomainError;

/// A search hit: position in the indexed sequence and its squared L2 distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Flat squared-Euclidean index over a contiguous row-major vector buffer.
///
/// Immutable once built and bound to the snapshot version it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    snapshot_version: u64,
    dimensions: usize,
    count: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from ordered vectors, all of `dimensions` length
    pub fn build(
        snapshot_version: u64,
        dimensions: usize,
        vectors: &[Vec<f32>],
    ) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::validation(
                "Index dimensions must be greater than 0",
            ));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimensions);
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimensions {
                return Err(DomainError::validation(format!(
                    "Vector {} has dimension {}, expected {}",
                    position,
                    vector.len(),
                    dimensions
                )));
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            snapshot_version,
            dimensions,
            count: vectors.len(),
            data,
        })
    }

    pub fn snapshot_version(&self) -> u64 {
        self.snapshot_version
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check that the buffer holds exactly `count` rows of `dimensions`
    pub fn is_consistent(&self) -> bool {
        self.dimensions > 0 && self.data.len() == self.count * self.dimensions
    }

    /// The `k` nearest rows to `query`, ascending by distance, ties by lower position.
    ///
    /// `k` is clamped to the index size; `k == 0` yields no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        if query.len() != self.dimensions {
            return Err(DomainError::validation(format!(
                "Query has dimension {}, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let k = k.min(self.count);
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2_distance(row, query),
            })
            .collect();

        let by_distance = |a: &Neighbor, b: &Neighbor| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        };

        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, by_distance);
            neighbors.truncate(k);
        }
        neighbors.sort_by(by_distance);

        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(vectors: &[[f32; 2]]) -> FlatIndex {
        let vectors: Vec<Vec<f32>> = vectors.iter().map(|v| v.to_vec()).collect();
        FlatIndex::build(1, 2, &vectors).unwrap()
    }

    fn positions(hits: &[Neighbor]) -> Vec<usize> {
        hits.iter().map(|h| h.position).collect()
    }

    #[test]
    fn test_nearest_neighbors_ordered_by_distance() {
        let idx = index(&[[10.0, 10.0], [0.0, 0.0], [3.0, 4.0]]);

        let hits = idx.search(&[0.1, 0.1], 3).unwrap();

        assert_eq!(positions(&hits), vec![1, 2, 0]);
        assert!(hits[0].distance < hits[1].distance);
        assert!(hits[1].distance < hits[2].distance);
    }

    #[test]
    fn test_distances_are_squared() {
        let idx = index(&[[3.0, 4.0]]);

        let hits = idx.search(&[0.0, 0.0], 1).unwrap();

        assert_eq!(hits[0].distance, 25.0);
    }

    #[test]
    fn test_ties_broken_by_lower_position() {
        let idx = index(&[[5.0, 5.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]]);

        let hits = idx.search(&[0.0, 0.0], 2).unwrap();

        assert_eq!(positions(&hits), vec![1, 2]);

        let all = idx.search(&[0.0, 0.0], 4).unwrap();
        assert_eq!(positions(&all), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_k_clamped_to_size() {
        let idx = index(&[[0.0, 0.0], [1.0, 1.0]]);

        let hits = idx.search(&[0.0, 0.0], 10).unwrap();

        assert_eq!(positions(&hits), vec![0, 1]);
    }

    #[test]
    fn test_zero_k_returns_nothing() {
        let idx = index(&[[0.0, 0.0]]);
        assert!(idx.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_index() {
        let idx = FlatIndex::build(1, 2, &[]).unwrap();
        assert!(idx.is_empty());
        assert!(idx.search(&[0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_query_dimension() {
        let idx = index(&[[0.0, 0.0]]);
        let result = idx.search(&[0.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_build_rejects_ragged_vectors() {
        let result = FlatIndex::build(1, 2, &[vec![0.0, 0.0], vec![1.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_index_records_snapshot_version() {
        let idx = FlatIndex::build(7, 2, &[vec![0.0, 0.0]]).unwrap();
        assert_eq!(idx.snapshot_version(), 7);
        assert_eq!(idx.len(), 1);
        assert!(idx.is_consistent());
    }
}

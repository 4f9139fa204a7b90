use crate::error::{Error, Result};

/// One query hit: the ingestion index of the matched record and its
/// Euclidean distance from the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f64,
}

/// An exact nearest-neighbor index over a static set of normalized vectors.
///
/// The point set is fixed at construction; a different record subset or
/// feature schema gets its own index. Queries are brute-force L2 scans,
/// which is the right design for the dataset sizes involved (hundreds to
/// low thousands of points); no approximate structure is warranted.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    ids: Vec<usize>,
    points: Vec<Vec<f64>>,
}

impl SearchIndex {
    /// Builds an index from normalized vectors and their record ids.
    ///
    /// # Panics
    ///
    /// If `ids` and `points` differ in length, or the vectors are not all
    /// the same dimension.
    pub fn build(ids: Vec<usize>, points: Vec<Vec<f64>>) -> Self {
        assert_eq!(
            ids.len(),
            points.len(),
            "ids and points must have same length"
        );
        if let Some(first) = points.first() {
            for p in &points {
                assert_eq!(
                    p.len(),
                    first.len(),
                    "all points must have the same dimension"
                );
            }
        }
        Self { ids, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the `k` nearest points to `query`, ascending by Euclidean
    /// distance, ties broken ascending by record id. `k` larger than the
    /// index size is clamped to the index size.
    ///
    /// # Errors
    ///
    /// `EmptyIndex` if the index holds no points.
    pub fn query(&self, query: &[f64], k: usize) -> Result<Vec<Neighbor>> {
        if self.points.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let mut hits: Vec<Neighbor> = self
            .points
            .iter()
            .zip(&self.ids)
            .map(|(p, &id)| Neighbor {
                id,
                distance: euclidean(p, query),
            })
            .collect();
        // Distances are finite over finite inputs; the id tie-break keeps
        // ordering stable under equal distances.
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k.min(hits.len()));
        Ok(hits)
    }
}

/// Plain (not squared) Euclidean distance between two vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn index() -> SearchIndex {
        SearchIndex::build(
            vec![0, 1, 2, 3],
            vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 2.0],
                vec![3.0, 4.0],
            ],
        )
    }

    #[test]
    fn test_query_orders_by_distance() {
        let hits = index().query(&[0.0, 0.0], 4).unwrap();
        let ids: Vec<usize> = hits.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_relative_eq!(hits[3].distance, 5.0);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_k_clamped_to_index_size() {
        let hits = index().query(&[0.0, 0.0], 100).unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_distance_ties_break_by_id() {
        let index = SearchIndex::build(
            vec![5, 2, 9],
            vec![vec![1.0], vec![-1.0], vec![1.0]],
        );
        let hits = index.query(&[0.0], 3).unwrap();
        let ids: Vec<usize> = hits.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_empty_index_fails() {
        let index = SearchIndex::build(vec![], vec![]);
        assert!(matches!(index.query(&[0.0], 1), Err(Error::EmptyIndex)));
    }

    #[test]
    fn test_euclidean_is_not_squared() {
        assert_relative_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }
}

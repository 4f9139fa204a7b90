use crate::dataset::{Dataset, FoodRecord, Nutrient};
use crate::error::{Error, Result};
use crate::knn::{euclidean, SearchIndex};
use crate::normalize::NormalizationModel;

/// Default number of neighbors returned by the search modes.
pub const DEFAULT_K: usize = 5;

/// Calorie ceiling of the built-in low-calorie group search.
pub const LOW_CALORIE_LIMIT: f64 = 150.0;

/// One search result: a dataset record and its Euclidean distance from the
/// query point in the normalized feature space.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub record: &'a FoodRecord,
    pub distance: f64,
}

/// Absolute per-nutrient difference between a neighbor and the query record,
/// in raw (unnormalized) units.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDelta {
    pub nutrient: Nutrient,
    pub query_value: f64,
    pub neighbor_value: f64,
    pub delta: f64,
}

/// One neighbor of an evaluation run, with its raw-unit feature deltas and
/// its exact Euclidean distance in original (unnormalized) feature units.
#[derive(Debug, Clone)]
pub struct NeighborReport<'a> {
    pub record: &'a FoodRecord,
    /// Distance in the normalized search space.
    pub distance: f64,
    /// Distance over the raw feature values, for human-readable reporting.
    pub raw_distance: f64,
    pub deltas: Vec<FeatureDelta>,
}

/// Annotates search results from any query mode with raw-unit per-feature
/// deltas from the query point and the exact raw-space Euclidean distance.
/// `query_raw` must be in the model's schema order and original units.
pub fn annotate_neighbors<'a>(
    model: &NormalizationModel,
    query_raw: &[f64],
    results: &[Scored<'a>],
) -> Vec<NeighborReport<'a>> {
    results
        .iter()
        .map(|scored| {
            let neighbor_raw = model.raw_vector(scored.record);
            let deltas = model
                .schema()
                .iter()
                .zip(query_raw.iter().zip(&neighbor_raw))
                .map(|(&nutrient, (&q, &n))| FeatureDelta {
                    nutrient,
                    query_value: q,
                    neighbor_value: n,
                    delta: (n - q).abs(),
                })
                .collect();
            NeighborReport {
                record: scored.record,
                distance: scored.distance,
                raw_distance: euclidean(query_raw, &neighbor_raw),
                deltas,
            }
        })
        .collect()
}

/// Human-readable evaluation of a by-name search: the normalized-space
/// neighbors annotated with raw-unit deltas, plus an independent ranking by
/// exact Euclidean distance over the raw nutrient values.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    pub query: &'a FoodRecord,
    pub neighbors: Vec<NeighborReport<'a>>,
    pub raw_distances: Vec<Scored<'a>>,
}

/// Similarity search over a cleaned dataset.
///
/// Each query mode fits its own [`NormalizationModel`] and [`SearchIndex`]
/// over the feature schema and record subset it needs. The statistics are
/// deliberately not shared across modes: standardization differs per feature
/// subset and per record subset, and sharing a model would change which
/// neighbors are returned.
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    dataset: &'a Dataset,
}

impl<'a> Recommender<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Finds the `k` foods most similar to the named record over the macro
    /// nutrient schema. The query record never appears in its own results.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has that exact name; `InvalidSchema` /
    /// `EmptyIndex` as in the underlying fit and query steps.
    pub fn search_by_name(&self, name: &str, k: usize) -> Result<Vec<Scored<'a>>> {
        let records = self.dataset.records();
        let query_id = self
            .dataset
            .find_by_name(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let model = NormalizationModel::fit(records, &Nutrient::MACRO)?;
        let index = Self::index_all(&model, records);
        let query = model.transform_record(&records[query_id]);

        // Ask for one extra neighbor so the query record itself can be
        // dropped from the hit list.
        let hits = index.query(&query, k.saturating_add(1))?;
        let results = hits
            .into_iter()
            .filter(|n| n.id != query_id)
            .take(k)
            .map(|n| Scored {
                record: &records[n.id],
                distance: n.distance,
            })
            .collect();
        Ok(results)
    }

    /// Finds the `k` foods whose single nutrient value is closest to
    /// `value`, over a one-dimensional schema fitted to the whole dataset.
    pub fn search_by_nutrient(
        &self,
        nutrient: Nutrient,
        value: f64,
        k: usize,
    ) -> Result<Vec<Scored<'a>>> {
        let records = self.dataset.records();
        let model = NormalizationModel::fit(records, &[nutrient])?;
        let index = Self::index_all(&model, records);
        let query = model.transform_values(&[value]);
        let hits = index.query(&query, k)?;
        Ok(self.resolve(hits))
    }

    /// Finds the `k` foods of a predicate-defined group closest to the
    /// group's own centroid. The model and index are fitted over the
    /// filtered subset only; the centroid is synthetic and never a result.
    ///
    /// # Errors
    ///
    /// `EmptyGroup` when the predicate matches no records.
    pub fn search_by_group<P>(&self, predicate: P, k: usize) -> Result<Vec<Scored<'a>>>
    where
        P: Fn(&FoodRecord) -> bool,
    {
        let records = self.dataset.records();
        let ids: Vec<usize> = (0..records.len())
            .filter(|&id| predicate(&records[id]))
            .collect();
        if ids.is_empty() {
            return Err(Error::EmptyGroup);
        }

        let subset: Vec<FoodRecord> = ids.iter().map(|&id| records[id].clone()).collect();
        let model = NormalizationModel::fit(&subset, &Nutrient::MACRO)?;

        // Centroid of the imputed raw vectors, then normalized like any
        // other query point.
        let dim = Nutrient::MACRO.len();
        let mut centroid = vec![0.0; dim];
        for record in &subset {
            for (acc, x) in centroid.iter_mut().zip(model.raw_vector(record)) {
                *acc += x;
            }
        }
        for acc in &mut centroid {
            *acc /= subset.len() as f64;
        }

        let points = subset.iter().map(|r| model.transform_record(r)).collect();
        let index = SearchIndex::build(ids, points);
        let hits = index.query(&model.transform_values(&centroid), k)?;
        Ok(self.resolve(hits))
    }

    /// The original low-calorie preset: centroid search over all foods with
    /// at most [`LOW_CALORIE_LIMIT`] calories.
    pub fn search_low_calorie(&self, k: usize) -> Result<Vec<Scored<'a>>> {
        self.search_by_group(
            |r| r.calories.is_some_and(|c| c <= LOW_CALORIE_LIMIT),
            k,
        )
    }

    /// Evaluates a by-name search for reporting: each normalized-space
    /// neighbor is annotated with absolute per-nutrient deltas in raw units,
    /// and an independent top-`top_n` ranking by exact Euclidean distance
    /// over the raw macro values (query record excluded) is attached.
    pub fn evaluate(&self, name: &str, top_n: usize) -> Result<Evaluation<'a>> {
        let records = self.dataset.records();
        let query_id = self
            .dataset
            .find_by_name(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let query = &records[query_id];

        let model = NormalizationModel::fit(records, &Nutrient::MACRO)?;
        let query_raw = model.raw_vector(query);

        let results = self.search_by_name(name, top_n)?;
        let neighbors = annotate_neighbors(&model, &query_raw, &results);

        let mut raw_distances: Vec<Scored<'a>> = records
            .iter()
            .enumerate()
            .filter(|&(id, _)| id != query_id)
            .map(|(_, record)| Scored {
                record,
                distance: euclidean(&query_raw, &model.raw_vector(record)),
            })
            .collect();
        raw_distances.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        raw_distances.truncate(top_n);

        Ok(Evaluation {
            query,
            neighbors,
            raw_distances,
        })
    }

    fn index_all(model: &NormalizationModel, records: &[FoodRecord]) -> SearchIndex {
        let points = records.iter().map(|r| model.transform_record(r)).collect();
        SearchIndex::build((0..records.len()).collect(), points)
    }

    fn resolve(&self, hits: Vec<crate::knn::Neighbor>) -> Vec<Scored<'a>> {
        let records = self.dataset.records();
        hits.into_iter()
            .map(|n| Scored {
                record: &records[n.id],
                distance: n.distance,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn food(name: &str, calories: f64, proteins: f64, fat: f64, carbs: f64) -> FoodRecord {
        FoodRecord {
            name: name.to_string(),
            image: format!("{name}.jpg"),
            category: "lauk".to_string(),
            calories: Some(calories),
            proteins: Some(proteins),
            fat: Some(fat),
            carbohydrate: Some(carbs),
            fiber: None,
            sugar: None,
            sodium: None,
        }
    }

    /// Five foods that differ only in calories, so distances collapse to a
    /// single dimension.
    fn calorie_line() -> Dataset {
        Dataset::from_records(vec![
            food("A", 100.0, 0.0, 0.0, 0.0),
            food("B", 150.0, 0.0, 0.0, 0.0),
            food("C", 90.0, 0.0, 0.0, 0.0),
            food("D", 200.0, 0.0, 0.0, 0.0),
            food("E", 80.0, 0.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_by_name_returns_nearest_on_surviving_dimension() {
        let dataset = calorie_line();
        let results = Recommender::new(&dataset).search_by_name("A", 2).unwrap();
        let mut names: Vec<&str> = results.iter().map(|s| s.record.name.as_str()).collect();
        names.sort_unstable();
        // B (50 away) and C (10 away) both precede D and E (>= 100 away).
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_by_name_excludes_self_and_sorts_ascending() {
        let dataset = calorie_line();
        let results = Recommender::new(&dataset).search_by_name("A", 4).unwrap();
        assert!(results.iter().all(|s| s.record.name != "A"));
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_by_name_with_large_k_returns_all_others() {
        let dataset = calorie_line();
        let results = Recommender::new(&dataset).search_by_name("A", 99).unwrap();
        assert_eq!(results.len(), dataset.len() - 1);
    }

    #[test]
    fn test_by_name_miss_is_not_found() {
        let dataset = calorie_line();
        let err = Recommender::new(&dataset)
            .search_by_name("Zucchini", 5)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(name) if name == "Zucchini"));
    }

    #[test]
    fn test_by_nutrient_never_excludes_records() {
        let dataset = calorie_line();
        let results = Recommender::new(&dataset)
            .search_by_nutrient(Nutrient::Calories, 100.0, 3)
            .unwrap();
        // The exact-match record "A" is a legitimate hit at distance 0.
        assert_eq!(results[0].record.name, "A");
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_group_search_fits_over_filtered_subset_only() {
        let dataset = calorie_line();
        let results = Recommender::new(&dataset)
            .search_low_calorie(10)
            .unwrap();
        // Only A (100), B (150), C (90), E (80) are low-calorie.
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|s| s.record.calories.unwrap() <= 150.0));
    }

    #[test]
    fn test_group_search_with_impossible_predicate_fails() {
        let dataset = calorie_line();
        let err = Recommender::new(&dataset)
            .search_by_group(|_| false, 5)
            .unwrap_err();
        assert!(matches!(err, Error::EmptyGroup));
    }

    #[test]
    fn test_evaluate_reports_raw_deltas_and_raw_ranking() {
        let dataset = calorie_line();
        let eval = Recommender::new(&dataset).evaluate("A", 2).unwrap();
        assert_eq!(eval.query.name, "A");
        assert_eq!(eval.neighbors.len(), 2);
        for report in &eval.neighbors {
            let cal_delta = &report.deltas[0];
            assert_eq!(cal_delta.nutrient, Nutrient::Calories);
            assert_eq!(
                cal_delta.delta,
                (report.record.calories.unwrap() - 100.0).abs()
            );
        }
        // Raw-unit ranking: C is 10 kcal away, E is 20 kcal away.
        assert_eq!(eval.raw_distances[0].record.name, "C");
        assert_eq!(eval.raw_distances[0].distance, 10.0);
        assert_eq!(eval.raw_distances[1].record.name, "E");
    }

    #[test]
    fn test_annotate_works_for_nutrient_mode_results() {
        let dataset = calorie_line();
        let recommender = Recommender::new(&dataset);
        let results = recommender
            .search_by_nutrient(Nutrient::Calories, 95.0, 2)
            .unwrap();
        let model =
            NormalizationModel::fit(dataset.records(), &[Nutrient::Calories]).unwrap();
        let reports = annotate_neighbors(&model, &[95.0], &results);
        assert_eq!(reports.len(), 2);
        for report in &reports {
            let expected = (report.record.calories.unwrap() - 95.0).abs();
            assert_eq!(report.raw_distance, expected);
            assert_eq!(report.deltas[0].delta, expected);
        }
    }
}

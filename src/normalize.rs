use crate::dataset::{FoodRecord, Nutrient};
use crate::error::{Error, Result};

/// Impute-then-standardize transform fitted from a reference record set.
///
/// Fitting computes, per schema feature, the mean of the non-missing values
/// (the imputation fill) and then the mean and population standard deviation
/// of the imputed column (the scaling statistics). The model is immutable
/// after fitting; a different schema or record subset gets its own model.
///
/// # Example
///
/// ```
/// use nutrichoice::dataset::{Dataset, Nutrient};
/// use nutrichoice::normalize::NormalizationModel;
///
/// let csv = "name,image,type,calories,proteins,fat,carbohydrate\n\
///            a,,lauk,100,10,5,20\n\
///            b,,lauk,200,20,15,40\n";
/// let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
/// let model = NormalizationModel::fit(dataset.records(), &Nutrient::MACRO).unwrap();
/// let z = model.transform_record(&dataset.records()[0]);
/// assert_eq!(z, vec![-1.0, -1.0, -1.0, -1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct NormalizationModel {
    schema: Vec<Nutrient>,
    impute_means: Vec<f64>,
    means: Vec<f64>,
    stddevs: Vec<f64>,
}

impl NormalizationModel {
    /// Fits imputation and scaling statistics over `records` restricted to
    /// `schema`.
    ///
    /// # Errors
    ///
    /// `InvalidSchema` when a schema feature has no values at all in the
    /// reference records (including the empty-records case): neither an
    /// imputation mean nor scaling statistics exist for it.
    pub fn fit(records: &[FoodRecord], schema: &[Nutrient]) -> Result<Self> {
        let mut impute_means = Vec::with_capacity(schema.len());
        let mut means = Vec::with_capacity(schema.len());
        let mut stddevs = Vec::with_capacity(schema.len());

        for &feature in schema {
            let present: Vec<f64> = records.iter().filter_map(|r| feature.of(r)).collect();
            if present.is_empty() {
                return Err(Error::InvalidSchema(feature.name()));
            }
            let fill = present.iter().sum::<f64>() / present.len() as f64;
            impute_means.push(fill);

            // Scaling statistics are computed over the imputed column, in
            // which every missing value has become `fill`.
            let n = records.len() as f64;
            let imputed = records.iter().map(|r| feature.of(r).unwrap_or(fill));
            let mean = imputed.clone().sum::<f64>() / n;
            let variance = imputed.map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
            means.push(mean);
            stddevs.push(variance.sqrt());
        }

        Ok(Self {
            schema: schema.to_vec(),
            impute_means,
            means,
            stddevs,
        })
    }

    pub fn schema(&self) -> &[Nutrient] {
        &self.schema
    }

    /// Raw feature vector of a record under this model's schema, with
    /// missing components replaced by the fitted imputation means.
    pub fn raw_vector(&self, record: &FoodRecord) -> Vec<f64> {
        self.schema
            .iter()
            .zip(&self.impute_means)
            .map(|(&feature, &fill)| feature.of(record).unwrap_or(fill))
            .collect()
    }

    /// Imputes missing components, then standardizes each feature as
    /// `(x - mean) / stddev`. A constant feature (zero fitted standard
    /// deviation) maps to `0` rather than dividing by zero.
    pub fn transform(&self, raw: &[Option<f64>]) -> Vec<f64> {
        debug_assert_eq!(raw.len(), self.schema.len());
        raw.iter()
            .zip(self.impute_means.iter())
            .zip(self.means.iter().zip(&self.stddevs))
            .map(|((value, &fill), (&mean, &std))| {
                let x = value.unwrap_or(fill);
                if std == 0.0 {
                    0.0
                } else {
                    (x - mean) / std
                }
            })
            .collect()
    }

    /// Standardizes a fully-present raw vector.
    pub fn transform_values(&self, raw: &[f64]) -> Vec<f64> {
        let present: Vec<Option<f64>> = raw.iter().map(|&x| Some(x)).collect();
        self.transform(&present)
    }

    /// Imputes and standardizes a record's feature vector.
    pub fn transform_record(&self, record: &FoodRecord) -> Vec<f64> {
        let raw: Vec<Option<f64>> = self.schema.iter().map(|&f| f.of(record)).collect();
        self.transform(&raw)
    }

    /// Maps a standardized vector back to raw feature units as
    /// `z * stddev + mean`. A constant feature has no inverse; its
    /// component maps back to the fitted mean.
    pub fn inverse_transform(&self, normalized: &[f64]) -> Vec<f64> {
        debug_assert_eq!(normalized.len(), self.schema.len());
        normalized
            .iter()
            .zip(self.means.iter().zip(&self.stddevs))
            .map(|(&z, (&mean, &std))| z * std + mean)
            .collect()
    }
}

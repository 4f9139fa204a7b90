use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::Result;

/// The nutrient fields a feature schema can draw from.
///
/// The first four are the macro nutrients present on every cleaned record;
/// the rest are optional columns that may be missing per record and are
/// filled by mean imputation when used in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Proteins,
    Fat,
    Carbohydrate,
    Fiber,
    Sugar,
    Sodium,
}

impl Nutrient {
    /// The default four-feature schema: the macro nutrients used by the
    /// whole-vector search modes.
    pub const MACRO: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Proteins,
        Nutrient::Fat,
        Nutrient::Carbohydrate,
    ];

    /// Column name of this nutrient in the dataset.
    pub fn name(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Proteins => "proteins",
            Nutrient::Fat => "fat",
            Nutrient::Carbohydrate => "carbohydrate",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::Sodium => "sodium",
        }
    }

    /// Reads this nutrient's value from a record, `None` if missing.
    pub fn of(self, record: &FoodRecord) -> Option<f64> {
        match self {
            Nutrient::Calories => record.calories,
            Nutrient::Proteins => record.proteins,
            Nutrient::Fat => record.fat,
            Nutrient::Carbohydrate => record.carbohydrate,
            Nutrient::Fiber => record.fiber,
            Nutrient::Sugar => record.sugar,
            Nutrient::Sodium => record.sodium,
        }
    }
}

/// The six meal-component categories the assembler draws from.
///
/// Tokens match the dataset's `type` column (Indonesian labels); matching is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodCategory {
    /// `karbo`: carbohydrate source (rice, noodles, bread).
    CarbSource,
    /// `lauk`: protein side dish.
    ProteinSide,
    /// `sayuran masak`: cooked vegetable dish.
    CookedVegetable,
    /// `buah`: fruit.
    Fruit,
    /// `camilan`: snack.
    Snack,
    /// `minuman`: drink.
    Drink,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 6] = [
        FoodCategory::CarbSource,
        FoodCategory::ProteinSide,
        FoodCategory::CookedVegetable,
        FoodCategory::Fruit,
        FoodCategory::Snack,
        FoodCategory::Drink,
    ];

    /// The dataset token for this category.
    pub fn token(self) -> &'static str {
        match self {
            FoodCategory::CarbSource => "karbo",
            FoodCategory::ProteinSide => "lauk",
            FoodCategory::CookedVegetable => "sayuran masak",
            FoodCategory::Fruit => "buah",
            FoodCategory::Snack => "camilan",
            FoodCategory::Drink => "minuman",
        }
    }

    /// Whether a record's category string matches this category.
    pub fn matches(self, record: &FoodRecord) -> bool {
        record.category.trim().eq_ignore_ascii_case(self.token())
    }
}

/// One row of the nutrition dataset.
///
/// Nutrient fields are optional at the record level; the cleaning step in
/// [`Dataset`] guarantees the four macro nutrients are present on every
/// record that survives ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    /// Meal-component category; the CSV column is named `type`.
    #[serde(default, alias = "type")]
    pub category: String,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fat: Option<f64>,
    pub carbohydrate: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub sugar: Option<f64>,
    #[serde(default)]
    pub sodium: Option<f64>,
}

impl FoodRecord {
    fn has_macro_nutrients(&self) -> bool {
        Nutrient::MACRO.iter().all(|n| n.of(self).is_some())
    }

    /// Bitwise dedup key over `(name, macro nutrients)`.
    fn dedup_key(&self) -> (String, [u64; 4]) {
        let mut bits = [0u64; 4];
        for (slot, n) in bits.iter_mut().zip(Nutrient::MACRO) {
            // has_macro_nutrients has already been checked by the caller
            *slot = n.of(self).unwrap_or(f64::NAN).to_bits();
        }
        (self.name.clone(), bits)
    }
}

/// A cleaned, deduplicated, immutable table of food records.
///
/// Each record's position is its ingestion index, the stable ordering key
/// used for distance tie-breaking in neighbor search.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<FoodRecord>,
}

impl Dataset {
    /// Builds a dataset from raw records, applying the cleaning rules:
    /// rows missing `name` or any macro nutrient are dropped, and exact
    /// duplicate `(name, macro-nutrient-values)` rows are removed (first
    /// occurrence wins).
    pub fn from_records(raw: Vec<FoodRecord>) -> Self {
        let total = raw.len();
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(total);
        let mut dropped = 0usize;
        let mut duplicates = 0usize;
        for record in raw {
            if record.name.trim().is_empty() || !record.has_macro_nutrients() {
                dropped += 1;
                continue;
            }
            if !seen.insert(record.dedup_key()) {
                duplicates += 1;
                continue;
            }
            records.push(record);
        }
        debug!(
            "dataset ingested: {} rows kept, {} dropped (missing fields), {} duplicates removed",
            records.len(),
            dropped,
            duplicates
        );
        Self { records }
    }

    /// Reads and cleans a CSV dataset from any reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut raw = Vec::new();
        for row in csv_reader.deserialize() {
            let record: FoodRecord = row?;
            raw.push(record);
        }
        Ok(Self::from_records(raw))
    }

    /// Reads and cleans a CSV dataset from a file path.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        Self::from_csv_reader(file)
    }

    pub fn records(&self) -> &[FoodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at a given ingestion index.
    pub fn get(&self, id: usize) -> Option<&FoodRecord> {
        self.records.get(id)
    }

    /// Ingestion index of the first record whose name matches exactly.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name == name)
    }

    /// All records in one category, in ingestion order.
    pub fn by_category(&self, category: FoodCategory) -> Vec<&FoodRecord> {
        self.records
            .iter()
            .filter(|r| category.matches(r))
            .collect()
    }
}

use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::dataset::{Dataset, FoodCategory, FoodRecord};

/// Daily calorie target and its per-meal sub-targets.
#[derive(Debug, Clone, Copy)]
pub struct MealTargets {
    pub daily: f64,
    pub breakfast: f64,
    pub lunch: f64,
    pub dinner: f64,
}

impl MealTargets {
    /// Splits a daily target 35% / 35% / 30% across breakfast, lunch, and
    /// dinner.
    pub fn from_daily(daily: f64) -> Self {
        Self {
            daily,
            breakfast: 0.35 * daily,
            lunch: 0.35 * daily,
            dinner: 0.30 * daily,
        }
    }

    pub fn new(daily: f64, breakfast: f64, lunch: f64, dinner: f64) -> Self {
        Self {
            daily,
            breakfast,
            lunch,
            dinner,
        }
    }
}

/// Tuning knobs for the combinatorial meal search.
#[derive(Debug, Clone, Copy)]
pub struct AssemblerConfig {
    /// Maximum absolute deviation of each meal's calorie sum from its
    /// sub-target. The same value applies to all three meals.
    pub tol_meal: f64,
    /// Maximum absolute deviation of the day total from the daily target.
    pub tol_total: f64,
    /// Per-category item cap before enumeration; larger subsets are
    /// downsampled deterministically.
    pub category_cap: usize,
    /// Seed of the downsampling RNG. Fixing this makes the candidate set a
    /// pure function of the input subsets.
    pub sample_seed: u64,
    /// Hard cap on combinations inspected across the whole search.
    pub max_enumerations: usize,
    /// Number of top-ranked combinations returned.
    pub top_n: usize,
}

impl AssemblerConfig {
    /// Default configuration for a set of targets:
    /// `tol_total = max(200, daily * 0.10)`,
    /// `tol_meal = max(150, breakfast * 0.15)`, cap 10 items per category,
    /// sampling seed 1, budget 1000, top 3.
    pub fn for_targets(targets: &MealTargets) -> Self {
        Self {
            tol_meal: (targets.breakfast * 0.15).max(150.0),
            tol_total: (targets.daily * 0.10).max(200.0),
            category_cap: 10,
            sample_seed: 1,
            max_enumerations: 1000,
            top_n: 3,
        }
    }

    pub fn with_tolerances(mut self, tol_meal: f64, tol_total: f64) -> Self {
        self.tol_meal = tol_meal;
        self.tol_total = tol_total;
        self
    }

    pub fn with_category_cap(mut self, cap: usize) -> Self {
        self.category_cap = cap;
        self
    }

    pub fn with_sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = seed;
        self
    }

    pub fn with_max_enumerations(mut self, budget: usize) -> Self {
        self.max_enumerations = budget;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// The six category subsets the assembler draws meals from.
#[derive(Debug, Clone, Default)]
pub struct CategorySubsets<'a> {
    pub carbs: Vec<&'a FoodRecord>,
    pub proteins: Vec<&'a FoodRecord>,
    pub vegetables: Vec<&'a FoodRecord>,
    pub fruits: Vec<&'a FoodRecord>,
    pub snacks: Vec<&'a FoodRecord>,
    pub drinks: Vec<&'a FoodRecord>,
}

impl<'a> CategorySubsets<'a> {
    /// Extracts all six category subsets from a dataset, in ingestion order.
    pub fn from_dataset(dataset: &'a Dataset) -> Self {
        Self {
            carbs: dataset.by_category(FoodCategory::CarbSource),
            proteins: dataset.by_category(FoodCategory::ProteinSide),
            vegetables: dataset.by_category(FoodCategory::CookedVegetable),
            fruits: dataset.by_category(FoodCategory::Fruit),
            snacks: dataset.by_category(FoodCategory::Snack),
            drinks: dataset.by_category(FoodCategory::Drink),
        }
    }
}

/// One full-day meal combination: three items per meal, with the derived
/// calorie sums and the absolute deviation from the daily target.
#[derive(Debug, Clone)]
pub struct MealCombination<'a> {
    /// Carb source, protein side, and a fruit or drink.
    pub breakfast: [&'a FoodRecord; 3],
    /// Protein side, cooked vegetable, carb source.
    pub lunch: [&'a FoodRecord; 3],
    /// Fruit, snack, drink.
    pub dinner: [&'a FoodRecord; 3],
    pub breakfast_calories: f64,
    pub lunch_calories: f64,
    pub dinner_calories: f64,
    pub total_calories: f64,
    pub deviation: f64,
}

/// Post-downsampling size and representative items of one category, for
/// empty-result reporting.
#[derive(Debug, Clone)]
pub struct CategoryDiagnostics<'a> {
    pub category: FoodCategory,
    pub count: usize,
    pub samples: Vec<&'a FoodRecord>,
}

/// What the search actually did, returned alongside the ranked plans.
#[derive(Debug, Clone)]
pub struct PlanDiagnostics<'a> {
    /// In-tolerance combinations found, before top-N truncation.
    pub candidates_found: usize,
    /// Combinations inspected against the enumeration budget.
    pub combinations_inspected: usize,
    /// Whether the search stopped on the enumeration budget rather than
    /// exhausting the product space.
    pub budget_exhausted: bool,
    pub categories: Vec<CategoryDiagnostics<'a>>,
}

/// Result of a meal-plan search. An empty `plans` list is a valid outcome;
/// the diagnostics carry what an empty-result report needs.
#[derive(Debug, Clone)]
pub struct MealPlanOutcome<'a> {
    pub plans: Vec<MealCombination<'a>>,
    pub diagnostics: PlanDiagnostics<'a>,
}

fn kcal(record: &FoodRecord) -> f64 {
    record.calories.unwrap_or(0.0)
}

/// Deterministic downsample of a category subset to at most `cap` items.
/// Subsets at or under the cap pass through unchanged.
fn downsample<'a>(
    subset: &[&'a FoodRecord],
    cap: usize,
    rng: &mut ChaCha20Rng,
) -> Vec<&'a FoodRecord> {
    if subset.len() <= cap {
        subset.to_vec()
    } else {
        subset.choose_multiple(rng, cap).copied().collect()
    }
}

/// Searches the bounded product space of category subsets for full-day meal
/// combinations whose calorie sums approximate the targets.
///
/// Candidate breakfasts are (carb, protein, fruit-or-drink) triples within
/// `tol_meal` of the breakfast target; for each, candidate lunches are
/// (protein, vegetable, carb) triples within `tol_meal` of the lunch target;
/// for each pair, dinner (fruit, snack, drink) triples complete the day and
/// are kept when the total's deviation from the daily target is within
/// `tol_total`. A single enumeration counter, incremented per dinner triple
/// and checked at every loop level, stops the whole search the moment the
/// budget is reached, a deliberate approximate-search policy trading
/// completeness for bounded latency. Combinations found before the cutoff
/// remain valid and are ranked normally.
///
/// Categories with fewer items than the cap (or than a meal needs) are used
/// as-is; an empty category simply yields no combinations.
pub fn assemble_meal_plan<'a>(
    subsets: &CategorySubsets<'a>,
    targets: &MealTargets,
    config: &AssemblerConfig,
) -> MealPlanOutcome<'a> {
    // One seeded RNG samples the categories in fixed order, so the whole
    // candidate set is a pure function of (subsets, cap, seed).
    let mut rng = ChaCha20Rng::seed_from_u64(config.sample_seed);
    let carbs = downsample(&subsets.carbs, config.category_cap, &mut rng);
    let proteins = downsample(&subsets.proteins, config.category_cap, &mut rng);
    let vegetables = downsample(&subsets.vegetables, config.category_cap, &mut rng);
    let fruits = downsample(&subsets.fruits, config.category_cap, &mut rng);
    let snacks = downsample(&subsets.snacks, config.category_cap, &mut rng);
    let drinks = downsample(&subsets.drinks, config.category_cap, &mut rng);

    let mut morning_extras = fruits.clone();
    morning_extras.extend(drinks.iter().copied());

    let mut kept: Vec<MealCombination<'a>> = Vec::new();
    let mut inspected = 0usize;
    let mut budget_exhausted = false;

    'search: for &b_carb in &carbs {
        for &b_protein in &proteins {
            for &b_extra in &morning_extras {
                if inspected >= config.max_enumerations {
                    budget_exhausted = true;
                    break 'search;
                }
                let breakfast_calories = kcal(b_carb) + kcal(b_protein) + kcal(b_extra);
                if (breakfast_calories - targets.breakfast).abs() > config.tol_meal {
                    continue;
                }

                for &l_protein in &proteins {
                    for &l_vegetable in &vegetables {
                        for &l_carb in &carbs {
                            if inspected >= config.max_enumerations {
                                budget_exhausted = true;
                                break 'search;
                            }
                            let lunch_calories =
                                kcal(l_protein) + kcal(l_vegetable) + kcal(l_carb);
                            if (lunch_calories - targets.lunch).abs() > config.tol_meal {
                                continue;
                            }

                            for &d_fruit in &fruits {
                                for &d_snack in &snacks {
                                    for &d_drink in &drinks {
                                        inspected += 1;
                                        if inspected >= config.max_enumerations {
                                            budget_exhausted = true;
                                            break 'search;
                                        }
                                        let dinner_calories =
                                            kcal(d_fruit) + kcal(d_snack) + kcal(d_drink);
                                        let total_calories = breakfast_calories
                                            + lunch_calories
                                            + dinner_calories;
                                        let deviation =
                                            (total_calories - targets.daily).abs();
                                        if deviation <= config.tol_total {
                                            kept.push(MealCombination {
                                                breakfast: [b_carb, b_protein, b_extra],
                                                lunch: [l_protein, l_vegetable, l_carb],
                                                dinner: [d_fruit, d_snack, d_drink],
                                                breakfast_calories,
                                                lunch_calories,
                                                dinner_calories,
                                                total_calories,
                                                deviation,
                                            });
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    // Stable sort keeps equal-deviation candidates in discovery order.
    kept.sort_by(|a, b| a.deviation.total_cmp(&b.deviation));
    let candidates_found = kept.len();
    kept.truncate(config.top_n);

    debug!(
        "meal search: {} combinations inspected, {} in tolerance, budget_exhausted={}",
        inspected, candidates_found, budget_exhausted
    );

    let categories = [
        (FoodCategory::CarbSource, &carbs),
        (FoodCategory::ProteinSide, &proteins),
        (FoodCategory::CookedVegetable, &vegetables),
        (FoodCategory::Fruit, &fruits),
        (FoodCategory::Snack, &snacks),
        (FoodCategory::Drink, &drinks),
    ]
    .into_iter()
    .map(|(category, items)| CategoryDiagnostics {
        category,
        count: items.len(),
        samples: items.iter().take(3).copied().collect(),
    })
    .collect();

    MealPlanOutcome {
        plans: kept,
        diagnostics: PlanDiagnostics {
            candidates_found,
            combinations_inspected: inspected,
            budget_exhausted,
            categories,
        },
    }
}

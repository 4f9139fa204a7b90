//! Nutrient-similarity food search and calorie-targeted meal planning.
//!
//! Two algorithmic subsystems over a cleaned nutrition dataset: an exact
//! k-nearest-neighbor search in a standardized nutrient feature space
//! ([`recommend`]), and a budget-bounded combinatorial search for full-day
//! meal combinations approximating a daily calorie target ([`mealplan`]).
//! [`calories`] converts biometrics into the calorie targets the meal
//! search consumes.

pub mod calories;
pub mod dataset;
pub mod error;
pub mod knn;
pub mod mealplan;
pub mod normalize;
pub mod recommend;

pub use calories::{compute_daily_target, ActivityLevel, CalorieTargets, Sex};
pub use dataset::{Dataset, FoodCategory, FoodRecord, Nutrient};
pub use error::{Error, Result};
pub use knn::{Neighbor, SearchIndex};
pub use mealplan::{
    assemble_meal_plan, AssemblerConfig, CategorySubsets, MealCombination, MealPlanOutcome,
    MealTargets,
};
pub use normalize::NormalizationModel;
pub use recommend::{annotate_neighbors, Evaluation, NeighborReport, Recommender, Scored};

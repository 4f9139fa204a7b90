use std::str::FromStr;

use crate::error::{Error, Result};

/// Biological sex token for the BMR formula. Parses the dataset's
/// Indonesian tokens (`pria`, `wanita`), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pria" => Ok(Sex::Male),
            "wanita" => Ok(Sex::Female),
            other => Err(Error::InvalidInput(format!(
                "unrecognized sex '{other}', expected 'pria' or 'wanita'"
            ))),
        }
    }
}

/// Physical activity level. Parses the Indonesian tokens `sedikit`,
/// `ringan`, `sedang`, `tinggi`, `sangat tinggi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    High,
    VeryHigh,
}

impl ActivityLevel {
    /// TDEE multiplier applied to the BMR.
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.725,
            ActivityLevel::VeryHigh => 1.9,
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sedikit" => Ok(ActivityLevel::Sedentary),
            "ringan" => Ok(ActivityLevel::Light),
            "sedang" => Ok(ActivityLevel::Moderate),
            "tinggi" => Ok(ActivityLevel::High),
            "sangat tinggi" => Ok(ActivityLevel::VeryHigh),
            other => Err(Error::InvalidInput(format!(
                "unrecognized activity level '{other}', expected one of: \
                 sedikit, ringan, sedang, tinggi, sangat tinggi"
            ))),
        }
    }
}

/// BMR and daily calorie targets, each rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalorieTargets {
    /// Basal metabolic rate (Harris-Benedict).
    pub bmr: f64,
    /// Daily maintenance calories: BMR times the activity factor.
    pub daily: f64,
    /// Daily target under a 500 kcal deficit.
    pub deficit_500: f64,
    /// Daily target under a 750 kcal deficit.
    pub deficit_750: f64,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Computes the daily calorie targets from biometrics. Pure arithmetic:
/// identical inputs give bit-identical outputs.
///
/// # Example
///
/// ```
/// use nutrichoice::calories::{compute_daily_target, ActivityLevel, Sex};
///
/// let targets = compute_daily_target(Sex::Male, 70.0, 175.0, 30, ActivityLevel::Moderate);
/// assert!(targets.daily > targets.bmr);
/// assert_eq!(targets.deficit_500, targets.daily - 500.0);
/// ```
pub fn compute_daily_target(
    sex: Sex,
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    activity: ActivityLevel,
) -> CalorieTargets {
    let age = f64::from(age);
    let bmr = match sex {
        Sex::Male => 66.5 + (13.75 * weight_kg) + (5.003 * height_cm) - (6.75 * age),
        Sex::Female => 655.1 + (9.563 * weight_kg) + (1.850 * height_cm) - (4.676 * age),
    };
    let daily = bmr * activity.factor();
    CalorieTargets {
        bmr: round2(bmr),
        daily: round2(daily),
        deficit_500: round2(daily - 500.0),
        deficit_750: round2(daily - 750.0),
    }
}

/// Token-parsing front of [`compute_daily_target`], matching the external
/// interface the interactive layer calls.
///
/// # Errors
///
/// `InvalidInput` for an unrecognized sex or activity-level token.
pub fn compute_daily_target_from_tokens(
    sex: &str,
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    activity: &str,
) -> Result<CalorieTargets> {
    let sex = sex.parse::<Sex>()?;
    let activity = activity.parse::<ActivityLevel>()?;
    Ok(compute_daily_target(sex, weight_kg, height_cm, age, activity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_biometrics_are_reproducible() {
        let first = compute_daily_target_from_tokens("pria", 70.0, 175.0, 30, "sedang").unwrap();
        let second = compute_daily_target_from_tokens("pria", 70.0, 175.0, 30, "sedang").unwrap();
        // Pure function: bit-for-bit identical across calls.
        assert_eq!(first.bmr.to_bits(), second.bmr.to_bits());
        assert_eq!(first.daily.to_bits(), second.daily.to_bits());
        assert_eq!(first.deficit_500.to_bits(), second.deficit_500.to_bits());
        assert_eq!(first.deficit_750.to_bits(), second.deficit_750.to_bits());

        // 66.5 + 13.75*70 + 5.003*175 - 6.75*30 = 1702.025
        assert_relative_eq!(first.bmr, 1702.03, max_relative = 1e-5);
        assert_relative_eq!(first.daily, first.bmr * 1.55, max_relative = 1e-4);
    }

    #[test]
    fn test_female_formula_differs() {
        let male = compute_daily_target(Sex::Male, 60.0, 165.0, 25, ActivityLevel::Light);
        let female = compute_daily_target(Sex::Female, 60.0, 165.0, 25, ActivityLevel::Light);
        assert_ne!(male.bmr, female.bmr);
        // 655.1 + 9.563*60 + 1.850*165 - 4.676*25 = 1417.23
        assert_relative_eq!(female.bmr, 1417.23, max_relative = 1e-5);
    }

    #[test]
    fn test_deficits_are_offsets_of_daily() {
        let t = compute_daily_target(Sex::Male, 80.0, 180.0, 40, ActivityLevel::High);
        assert_relative_eq!(t.deficit_500, t.daily - 500.0, max_relative = 1e-9);
        assert_relative_eq!(t.deficit_750, t.daily - 750.0, max_relative = 1e-9);
    }

    #[test]
    fn test_unrecognized_tokens_fail_with_invalid_input() {
        let sex_err = compute_daily_target_from_tokens("male", 70.0, 175.0, 30, "sedang");
        assert!(matches!(sex_err, Err(Error::InvalidInput(_))));

        let activity_err = compute_daily_target_from_tokens("pria", 70.0, 175.0, 30, "extreme");
        assert!(matches!(activity_err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_tokens_are_case_insensitive() {
        assert_eq!("PRIA".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!(
            " Sangat Tinggi ".parse::<ActivityLevel>().unwrap(),
            ActivityLevel::VeryHigh
        );
    }
}

//! Canonical metric vocabulary.
//!
//! Every source is mapped onto this closed set. The declaration order of
//! [`Metric::ALL`] is the output column order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // Core set
    LifeExpectancy,
    PrematureDeath,
    AdultObesity,
    Diabetes,
    Unemployment,
    MedianIncome,
    AdultSmoking,
    PhysicalInactivity,
    Uninsured,
    PrimaryCareRate,
    HsGraduation,
    // Extended set
    PoorHealth,
    PoorPhysicalDays,
    PoorMentalDays,
    ExcessiveDrinking,
    Vaccinated,
    ExerciseAccess,
    PreventableHosp,
    MammogramRate,
    AirPollution,
    HousingProblems,
    ChildPoverty,
    IncomeInequality,
    Income80th,
    Income20th,
    SomeCollege,
}

/// Which slice of the vocabulary is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSet {
    Core,
    #[default]
    Full,
}

impl Metric {
    pub const ALL: [Metric; 26] = [
        Metric::LifeExpectancy,
        Metric::PrematureDeath,
        Metric::AdultObesity,
        Metric::Diabetes,
        Metric::Unemployment,
        Metric::MedianIncome,
        Metric::AdultSmoking,
        Metric::PhysicalInactivity,
        Metric::Uninsured,
        Metric::PrimaryCareRate,
        Metric::HsGraduation,
        Metric::PoorHealth,
        Metric::PoorPhysicalDays,
        Metric::PoorMentalDays,
        Metric::ExcessiveDrinking,
        Metric::Vaccinated,
        Metric::ExerciseAccess,
        Metric::PreventableHosp,
        Metric::MammogramRate,
        Metric::AirPollution,
        Metric::HousingProblems,
        Metric::ChildPoverty,
        Metric::IncomeInequality,
        Metric::Income80th,
        Metric::Income20th,
        Metric::SomeCollege,
    ];

    pub const CORE_LEN: usize = 11;

    /// Metrics in output order for the given set.
    pub fn columns(set: MetricSet) -> &'static [Metric] {
        match set {
            MetricSet::Core => &Self::ALL[..Self::CORE_LEN],
            MetricSet::Full => &Self::ALL,
        }
    }

    pub fn is_core(self) -> bool {
        Self::ALL[..Self::CORE_LEN].contains(&self)
    }

    /// Output column name.
    pub fn key(self) -> &'static str {
        match self {
            Metric::LifeExpectancy => "life_expectancy",
            Metric::PrematureDeath => "premature_death",
            Metric::AdultObesity => "adult_obesity",
            Metric::Diabetes => "diabetes",
            Metric::Unemployment => "unemployment",
            Metric::MedianIncome => "median_income",
            Metric::AdultSmoking => "adult_smoking",
            Metric::PhysicalInactivity => "physical_inactivity",
            Metric::Uninsured => "uninsured",
            Metric::PrimaryCareRate => "primary_care_rate",
            Metric::HsGraduation => "hs_graduation",
            Metric::PoorHealth => "poor_health",
            Metric::PoorPhysicalDays => "poor_physical_days",
            Metric::PoorMentalDays => "poor_mental_days",
            Metric::ExcessiveDrinking => "excessive_drinking",
            Metric::Vaccinated => "vaccinated",
            Metric::ExerciseAccess => "exercise_access",
            Metric::PreventableHosp => "preventable_hosp",
            Metric::MammogramRate => "mammogram_rate",
            Metric::AirPollution => "air_pollution",
            Metric::HousingProblems => "housing_problems",
            Metric::ChildPoverty => "child_poverty",
            Metric::IncomeInequality => "income_inequality",
            Metric::Income80th => "income_80th",
            Metric::Income20th => "income_20th",
            Metric::SomeCollege => "some_college",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::LifeExpectancy => "Life expectancy (years)",
            Metric::PrematureDeath => "Years of potential life lost per 100,000",
            Metric::AdultObesity => "Adult obesity",
            Metric::Diabetes => "Diabetes prevalence",
            Metric::Unemployment => "Unemployment",
            Metric::MedianIncome => "Median household income",
            Metric::AdultSmoking => "Adult smoking",
            Metric::PhysicalInactivity => "Physical inactivity",
            Metric::Uninsured => "Uninsured",
            Metric::PrimaryCareRate => "Primary care physicians rate",
            Metric::HsGraduation => "High school graduation",
            Metric::PoorHealth => "Poor or fair health",
            Metric::PoorPhysicalDays => "Physically unhealthy days",
            Metric::PoorMentalDays => "Mentally unhealthy days",
            Metric::ExcessiveDrinking => "Excessive drinking",
            Metric::Vaccinated => "Flu vaccinations",
            Metric::ExerciseAccess => "Access to exercise opportunities",
            Metric::PreventableHosp => "Preventable hospital stays",
            Metric::MammogramRate => "Mammography screening",
            Metric::AirPollution => "Air pollution (PM2.5)",
            Metric::HousingProblems => "Severe housing problems",
            Metric::ChildPoverty => "Children in poverty",
            Metric::IncomeInequality => "Income inequality",
            Metric::Income80th => "80th percentile income",
            Metric::Income20th => "20th percentile income",
            Metric::SomeCollege => "Some college",
        }
    }

    /// Socioeconomic and clinical-care metrics that only the annual snapshot
    /// carries; these are back-filled across years when enabled.
    pub fn is_snapshot_backfill(self) -> bool {
        matches!(
            self,
            Metric::LifeExpectancy
                | Metric::PrematureDeath
                | Metric::MedianIncome
                | Metric::HsGraduation
                | Metric::Unemployment
                | Metric::PrimaryCareRate
                | Metric::PoorPhysicalDays
                | Metric::PoorMentalDays
                | Metric::Vaccinated
                | Metric::ExerciseAccess
                | Metric::PreventableHosp
                | Metric::MammogramRate
                | Metric::AirPollution
                | Metric::HousingProblems
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Metric::ALL
            .iter()
            .copied()
            .find(|metric| metric.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| ModelError::UnknownMetric(s.to_string()))
    }
}

/// A parsed metric value. Blank input is `Missing`, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MetricValue {
    Value(f64),
    #[default]
    Missing,
}

impl MetricValue {
    pub fn is_present(self) -> bool {
        matches!(self, MetricValue::Value(_))
    }
}

impl fmt::Display for MetricValue {
    /// Shortest round-trip decimal; `Missing` renders as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Value(value) => write!(f, "{value}"),
            MetricValue::Missing => Ok(()),
        }
    }
}

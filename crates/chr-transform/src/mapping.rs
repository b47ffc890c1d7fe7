//! Source label → canonical metric tables.
//!
//! Labels are matched after trimming, otherwise exactly. A label missing
//! from its table is ignored by extraction and counted.

use chr_model::{Metric, SourceId};

/// `measurename` values of the trends file.
pub const TRENDS_MEASURES: &[(&str, Metric)] = &[
    ("Premature death", Metric::PrematureDeath),
    ("Life expectancy", Metric::LifeExpectancy),
    ("Adult obesity", Metric::AdultObesity),
    ("Diabetes prevalence", Metric::Diabetes),
    ("Unemployment", Metric::Unemployment),
    ("Median household income", Metric::MedianIncome),
    ("Adult smoking", Metric::AdultSmoking),
    ("Physical inactivity", Metric::PhysicalInactivity),
    ("Uninsured", Metric::Uninsured),
    ("Primary care physicians", Metric::PrimaryCareRate),
    ("High school completion", Metric::HsGraduation),
    ("Poor or fair health", Metric::PoorHealth),
    ("Poor physical health days", Metric::PoorPhysicalDays),
    ("Poor mental health days", Metric::PoorMentalDays),
    ("Excessive drinking", Metric::ExcessiveDrinking),
    ("Flu vaccinations", Metric::Vaccinated),
    ("Preventable hospital stays", Metric::PreventableHosp),
    ("Mammography screening", Metric::MammogramRate),
    ("Air pollution - particulate matter", Metric::AirPollution),
    ("Children in poverty", Metric::ChildPoverty),
    ("Income inequality", Metric::IncomeInequality),
    ("Some college", Metric::SomeCollege),
];

/// Measure columns of the workbook's "Select Measure Data" sheet.
pub const SELECT_COLUMNS: &[(&str, Metric)] = &[
    ("Years of Potential Life Lost Rate", Metric::PrematureDeath),
    ("% Uninsured", Metric::Uninsured),
    ("Primary Care Physicians Rate", Metric::PrimaryCareRate),
    ("% Fair or Poor Health", Metric::PoorHealth),
    ("Average Number of Physically Unhealthy Days", Metric::PoorPhysicalDays),
    ("Average Number of Mentally Unhealthy Days", Metric::PoorMentalDays),
    ("% Vaccinated", Metric::Vaccinated),
    ("% With Access to Exercise Opportunities", Metric::ExerciseAccess),
    ("Preventable Hospitalization Rate", Metric::PreventableHosp),
    ("% with Annual Mammogram", Metric::MammogramRate),
    ("Average Daily PM2.5", Metric::AirPollution),
    ("% Severe Housing Problems", Metric::HousingProblems),
    ("% Unemployed", Metric::Unemployment),
];

/// Measure columns of the workbook's "Additional Measure Data" sheet.
pub const ADDITIONAL_COLUMNS: &[(&str, Metric)] = &[
    ("Life Expectancy", Metric::LifeExpectancy),
    ("% Adults with Obesity", Metric::AdultObesity),
    ("% Adults with Diabetes", Metric::Diabetes),
    ("% Adults Reporting Currently Smoking", Metric::AdultSmoking),
    ("Median Household Income", Metric::MedianIncome),
    ("High School Graduation Rate", Metric::HsGraduation),
    ("% Physically Inactive", Metric::PhysicalInactivity),
    ("% Excessive Drinking", Metric::ExcessiveDrinking),
    ("% Children in Poverty", Metric::ChildPoverty),
    ("80th Percentile Income", Metric::Income80th),
    ("20th Percentile Income", Metric::Income20th),
    ("% Some College", Metric::SomeCollege),
    ("Unemployment Rate", Metric::Unemployment),
];

/// `Measure` values of the PLACES county releases.
pub const PLACES_MEASURES: &[(&str, Metric)] = &[
    ("Obesity among adults", Metric::AdultObesity),
    ("Current cigarette smoking among adults", Metric::AdultSmoking),
    ("No leisure-time physical activity among adults", Metric::PhysicalInactivity),
    ("Diagnosed diabetes among adults", Metric::Diabetes),
    ("Binge drinking among adults", Metric::ExcessiveDrinking),
    ("Fair or poor self-rated health status among adults", Metric::PoorHealth),
    (
        "Current lack of health insurance among adults aged 18-64 years",
        Metric::Uninsured,
    ),
];

/// The mapping table a source is read with.
pub fn mapping_table(source: SourceId) -> &'static [(&'static str, Metric)] {
    match source {
        SourceId::Places => PLACES_MEASURES,
        SourceId::ChrTrends => TRENDS_MEASURES,
        SourceId::ChrSelect => SELECT_COLUMNS,
        SourceId::ChrAdditional => ADDITIONAL_COLUMNS,
    }
}

/// Looks up a label in a mapping table.
pub fn lookup(table: &[(&str, Metric)], label: &str) -> Option<Metric> {
    let label = label.trim();
    table
        .iter()
        .find(|(source_label, _)| *source_label == label)
        .map(|(_, metric)| *metric)
}

//! Fixed salary bands and the static texts attached to them.

use serde::Serialize;

/// Ordinal salary band derived from the wage estimate (thousands per year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SalaryClass {
    VeryLow = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    VeryHigh = 4,
    Exceptional = 5,
}

/// Inclusive lower bounds, highest first.
pub const THRESHOLDS: [(f64, SalaryClass); 5] = [
    (170.0, SalaryClass::Exceptional),
    (145.0, SalaryClass::VeryHigh),
    (120.0, SalaryClass::High),
    (95.0, SalaryClass::Medium),
    (70.0, SalaryClass::Low),
];

impl SalaryClass {
    pub const ALL: [SalaryClass; 6] = [
        SalaryClass::VeryLow,
        SalaryClass::Low,
        SalaryClass::Medium,
        SalaryClass::High,
        SalaryClass::VeryHigh,
        SalaryClass::Exceptional,
    ];

    /// Buckets an estimate. Anything below every bound (NaN included) is `VeryLow`.
    pub fn from_estimate(estimate: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(bound, _)| estimate >= *bound)
            .map(|(_, class)| *class)
            .unwrap_or(SalaryClass::VeryLow)
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Inclusive lower bound of the band; `None` for the open bottom band.
    pub fn lower_bound(self) -> Option<f64> {
        THRESHOLDS
            .iter()
            .find(|(_, class)| *class == self)
            .map(|(bound, _)| *bound)
    }

    pub fn label(self) -> &'static str {
        match self {
            SalaryClass::VeryLow => "Very low",
            SalaryClass::Low => "Low",
            SalaryClass::Medium => "Medium",
            SalaryClass::High => "High",
            SalaryClass::VeryHigh => "Very high",
            SalaryClass::Exceptional => "Exceptional",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SalaryClass::VeryLow => {
                "The estimated wage is well below the typical range of the surveyed workforce."
            }
            SalaryClass::Low => {
                "The estimated wage is below average; entry-level profiles usually land here."
            }
            SalaryClass::Medium => "The estimated wage sits in the middle of the distribution.",
            SalaryClass::High => "The estimated wage is above average for the surveyed workforce.",
            SalaryClass::VeryHigh => {
                "The estimated wage is well above average, typical of senior or specialised roles."
            }
            SalaryClass::Exceptional => {
                "The estimated wage is in the top band, reached by very few profiles."
            }
        }
    }
}

/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Narrative returned next to the numeric result. Callers treat it as opaque.
pub fn explanatory_text(estimate: f64, class: SalaryClass) -> String {
    format!(
        "Predicted annual wage: {estimate:.2} thousand. This profile falls in salary class {} \
         ({}) out of six bands ranging from Very low (under 70) to Exceptional (170 and above).",
        class.index(),
        class.label()
    )
}

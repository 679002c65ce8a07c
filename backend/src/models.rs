use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Age range observed in the training data.
pub const AGE_RANGE: RangeInclusive<i32> = 18..=80;
/// Survey years observed in the training data.
pub const YEAR_RANGE: RangeInclusive<i32> = 2003..=2009;

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $level:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $level)] $variant,)+
        }

        impl $name {
            pub const FIELD: &'static str = $field;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $level,)+
                }
            }

            /// One-hot column name, e.g. `jobclass=Information`.
            pub fn column(self) -> String {
                format!("{}={}", Self::FIELD, self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        let levels: Vec<_> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} `{}`, expected one of: {}", Self::FIELD, s, levels.join(", "))
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical!(
    /// Highest education level attained.
    Education, "education" {
        LessThanHighSchool => "< HS Grad",
        HighSchool => "HS Grad",
        SomeCollege => "Some College",
        CollegeGrad => "College Grad",
        Advanced => "Advanced Degree",
    }
);

categorical!(JobClass, "jobclass" {
    Industrial => "Industrial",
    Information => "Information",
});

categorical!(
    /// Self-reported health, collapsed to two levels.
    Health, "health" {
        FairOrPoor => "Regular o Mala",
        VeryGoodOrExcellent => "Muy Buena o Excelente",
    }
);

categorical!(HealthIns, "health_ins" {
    Yes => "Yes",
    No => "No",
});

categorical!(MaritalStatus, "maritl" {
    NeverMarried => "Never Married",
    Married => "Married",
    Widowed => "Widowed",
    Divorced => "Divorced",
    Separated => "Separated",
});

categorical!(Race, "race" {
    White => "White",
    Black => "Black",
    Asian => "Asian",
    Other => "Other",
});

/// Which request fields the deployed artifact was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// age, education, jobclass, health, health_ins
    Basic,
    /// basic fields plus maritl, race and year
    Extended,
}

impl FromStr for Schema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Schema::Basic),
            "extended" => Ok(Schema::Extended),
            other => Err(format!("unknown schema `{other}` (expected basic or extended)")),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Basic => f.write_str("basic"),
            Schema::Extended => f.write_str("extended"),
        }
    }
}

/// Applicant record submitted for scoring.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WageQuery {
    pub age: i32,
    pub education: Education,
    pub jobclass: JobClass,
    pub health: Health,
    pub health_ins: HealthIns,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maritl: Option<MaritalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<Race>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl WageQuery {
    /// Checks the record against the deployed schema. Numeric ranges are only
    /// enforced when `strict_ranges` is set.
    pub fn validate(&self, schema: Schema, strict_ranges: bool) -> Result<(), String> {
        if schema == Schema::Extended {
            let missing: Vec<&str> = [
                ("maritl", self.maritl.is_none()),
                ("race", self.race.is_none()),
                ("year", self.year.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect();

            if !missing.is_empty() {
                return Err(format!("missing field(s): {}", missing.join(", ")));
            }
        }

        if strict_ranges {
            if !AGE_RANGE.contains(&self.age) {
                return Err(format!(
                    "age must be between {} and {} (value: {})",
                    AGE_RANGE.start(),
                    AGE_RANGE.end(),
                    self.age
                ));
            }
            if let Some(year) = self.year {
                if !YEAR_RANGE.contains(&year) {
                    return Err(format!(
                        "year must be between {} and {} (value: {})",
                        YEAR_RANGE.start(),
                        YEAR_RANGE.end(),
                        year
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Scored response for one [`WageQuery`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub estimate: f64,
    pub class: u8,
    pub label: String,
    pub description: String,
    pub explanatory_text: String,
    pub echo_of_input: WageQuery,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Greeting {
    pub message: String,
}

impl Greeting {
    pub fn new() -> Self {
        Greeting {
            message: "Wage prediction API is running".to_string(),
        }
    }
}

impl Default for Greeting {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ThresholdInfo {
    /// Inclusive lower bound; `None` for the bottom band.
    pub min_estimate: Option<f64>,
    pub class: u8,
    pub label: &'static str,
}

#[derive(Debug, Serialize, Clone)]
pub struct ModelInfo {
    pub artifact: String,
    pub kind: &'static str,
    pub schema: Schema,
    pub log_target: bool,
    pub features: Vec<String>,
    pub thresholds: Vec<ThresholdInfo>,
    pub loaded_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WageQuery {
        WageQuery {
            age: 30,
            education: Education::CollegeGrad,
            jobclass: JobClass::Information,
            health: Health::VeryGoodOrExcellent,
            health_ins: HealthIns::Yes,
            maritl: Some(MaritalStatus::NeverMarried),
            race: Some(Race::White),
            year: Some(2006),
        }
    }

    #[test]
    fn level_counts_match_training_data() {
        assert_eq!(Education::ALL.len(), 5);
        assert_eq!(JobClass::ALL.len(), 2);
        assert_eq!(Health::ALL.len(), 2);
        assert_eq!(HealthIns::ALL.len(), 2);
        assert_eq!(MaritalStatus::ALL.len(), 5);
        assert_eq!(Race::ALL.len(), 4);
    }

    #[test]
    fn deserializes_example_payload() {
        let raw = r#"{"age":30,"education":"College Grad","jobclass":"Information",
            "health":"Muy Buena o Excelente","health_ins":"Yes","maritl":"Never Married",
            "race":"White","year":2006}"#;
        let query: WageQuery = serde_json::from_str(raw).unwrap();
        assert_eq!(query, sample());
    }

    #[test]
    fn unknown_level_fails_to_deserialize() {
        let raw = r#"{"age":30,"education":"College Grad","jobclass":"Information",
            "health":"Good","health_ins":"Yes"}"#;
        let err = serde_json::from_str::<WageQuery>(raw).unwrap_err();
        assert!(err.to_string().contains("Good"));
    }

    #[test]
    fn basic_payload_omits_optional_fields_on_echo() {
        let mut query = sample();
        query.maritl = None;
        query.race = None;
        query.year = None;

        let value = serde_json::to_value(&query).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        assert_eq!(obj["education"], "College Grad");
    }

    #[test]
    fn extended_schema_requires_all_fields() {
        let mut query = sample();
        query.year = None;
        query.race = None;

        let err = query.validate(Schema::Extended, false).unwrap_err();
        assert_eq!(err, "missing field(s): race, year");
        assert!(query.validate(Schema::Basic, false).is_ok());
    }

    #[test]
    fn ranges_only_enforced_when_strict() {
        let mut query = sample();
        query.age = 95;
        assert!(query.validate(Schema::Extended, false).is_ok());
        assert!(query
            .validate(Schema::Extended, true)
            .unwrap_err()
            .starts_with("age must be between 18 and 80"));

        query.age = 40;
        query.year = Some(2015);
        assert!(query
            .validate(Schema::Extended, true)
            .unwrap_err()
            .starts_with("year must be between 2003 and 2009"));
    }

    #[test]
    fn from_str_lists_levels_on_error() {
        assert_eq!("Asian".parse::<Race>(), Ok(Race::Asian));
        let err = "Martian".parse::<Race>().unwrap_err();
        assert_eq!(err, "unknown race `Martian`, expected one of: White, Black, Asian, Other");
    }

    #[test]
    fn column_names_combine_field_and_level() {
        assert_eq!(Education::LessThanHighSchool.column(), "education=< HS Grad");
        assert_eq!(HealthIns::No.column(), "health_ins=No");
    }

    #[test]
    fn schema_parses_case_insensitively() {
        assert_eq!("Extended".parse::<Schema>(), Ok(Schema::Extended));
        assert_eq!(" basic ".parse::<Schema>(), Ok(Schema::Basic));
        assert!("full".parse::<Schema>().is_err());
    }
}

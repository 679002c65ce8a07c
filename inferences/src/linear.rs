use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::inference::Regressor;
use crate::types::FeatureRow;

/// Linear model exported as JSON: `intercept + sum(coef * column)`.
///
/// ```json
/// { "intercept": 4.3, "coefficients": { "age": 0.004, "education=College Grad": 0.21 } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearRegressor {
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let model: Self = serde_json::from_str(raw)?;
        if !model.intercept.is_finite() {
            bail!("intercept is not finite");
        }
        if let Some((name, _)) = model.coefficients.iter().find(|(_, c)| !c.is_finite()) {
            bail!("coefficient for `{name}` is not finite");
        }
        Ok(model)
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, row: &FeatureRow) -> anyhow::Result<f64> {
        self.coefficients
            .iter()
            .try_fold(self.intercept, |acc, (name, coef)| -> anyhow::Result<f64> {
                let value = row
                    .get(name)
                    .ok_or_else(|| anyhow!("missing column `{name}` in feature row"))?;
                Ok(acc + coef * f64::from(value))
            })
    }

    fn kind(&self) -> &'static str {
        "linear"
    }

    fn columns(&self) -> Vec<String> {
        self.coefficients.keys().cloned().collect()
    }
}

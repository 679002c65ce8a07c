//! Scoring pipeline: validate, assemble, invoke the artifact, classify, describe.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use wage_inference::{load_artifact, Regressor};

use crate::classify::{explanatory_text, round2, SalaryClass, THRESHOLDS};
use crate::config::AppConfig;
use crate::error::PredictError;
use crate::features::FeatureLayout;
use crate::models::{ModelInfo, PredictionResult, Schema, ThresholdInfo, WageQuery};

/// Deployment knobs the service needs once the artifact is loaded.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub schema: Schema,
    pub placeholder_columns: Vec<String>,
    pub log_target: bool,
    pub strict_ranges: bool,
    pub max_batch: usize,
    pub artifact: String,
}

impl ServiceSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            schema: cfg.schema,
            placeholder_columns: cfg.placeholder_columns.clone(),
            log_target: cfg.log_target,
            strict_ranges: cfg.strict_ranges,
            max_batch: cfg.max_batch,
            artifact: cfg.model_path.display().to_string(),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Owns the loaded artifact. Cloning shares the same read-only model.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn Regressor>,
    layout: FeatureLayout,
    settings: ServiceSettings,
    loaded_at: DateTime<Utc>,
}

impl PredictionService {
    pub fn new(model: Arc<dyn Regressor>, settings: ServiceSettings) -> Self {
        let layout = FeatureLayout::new(settings.schema, settings.placeholder_columns.clone());
        Self {
            model,
            layout,
            settings,
            loaded_at: Utc::now(),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let settings = ServiceSettings::from_config(cfg);
        let layout = FeatureLayout::new(settings.schema, settings.placeholder_columns.clone());
        layout.check_placeholders().map_err(anyhow::Error::msg)?;
        let model = load_artifact(Path::new(&cfg.model_path), layout.columns())?;
        Ok(Self::new(model, settings))
    }

    pub fn predict(&self, query: WageQuery) -> Result<PredictionResult, PredictError> {
        if let Err(msg) = query.validate(self.settings.schema, self.settings.strict_ranges) {
            warn!("rejected query: {}", msg);
            return Err(PredictError::Validation(msg));
        }

        let estimate = self.estimate(&query).map_err(|e| {
            error!("model invocation failed: {}", e);
            e
        })?;

        let class = SalaryClass::from_estimate(estimate);
        let rounded = round2(estimate);
        info!(
            "prediction ok: estimate={:.2} class={} ({})",
            rounded,
            class.index(),
            class.label()
        );

        Ok(PredictionResult {
            estimate: rounded,
            class: class.index(),
            label: class.label().to_string(),
            description: class.description().to_string(),
            explanatory_text: explanatory_text(rounded, class),
            echo_of_input: query,
        })
    }

    /// Scores every record in order, stopping at the first failure.
    pub fn predict_batch(
        &self,
        queries: Vec<WageQuery>,
    ) -> Result<Vec<PredictionResult>, PredictError> {
        if queries.is_empty() {
            return Err(PredictError::validation("empty batch"));
        }
        if queries.len() > self.settings.max_batch {
            return Err(PredictError::Validation(format!(
                "batch of {} records exceeds the limit of {}",
                queries.len(),
                self.settings.max_batch
            )));
        }

        queries
            .into_iter()
            .enumerate()
            .map(|(i, q)| {
                self.predict(q).map_err(|e| match e {
                    PredictError::Validation(m) => {
                        PredictError::Validation(format!("record {}: {}", i + 1, m))
                    }
                    PredictError::ModelInvocation(m) => {
                        PredictError::ModelInvocation(format!("record {}: {}", i + 1, m))
                    }
                    other => other,
                })
            })
            .collect()
    }

    pub fn model_info(&self) -> ModelInfo {
        let mut thresholds: Vec<ThresholdInfo> = THRESHOLDS
            .iter()
            .map(|(bound, class)| ThresholdInfo {
                min_estimate: Some(*bound),
                class: class.index(),
                label: class.label(),
            })
            .collect();
        thresholds.push(ThresholdInfo {
            min_estimate: None,
            class: SalaryClass::VeryLow.index(),
            label: SalaryClass::VeryLow.label(),
        });

        ModelInfo {
            artifact: self.settings.artifact.clone(),
            kind: self.model.kind(),
            schema: self.settings.schema,
            log_target: self.settings.log_target,
            features: self.layout.columns(),
            thresholds,
            loaded_at: self.loaded_at.to_rfc3339(),
        }
    }

    /// Raw model output in native units (thousands per year).
    fn estimate(&self, query: &WageQuery) -> Result<f64, PredictError> {
        let row = self
            .layout
            .assemble(query)
            .map_err(PredictError::ModelInvocation)?;

        let raw = self.model.predict(&row).map_err(PredictError::model)?;
        let estimate = if self.settings.log_target {
            raw.exp()
        } else {
            raw
        };

        if !estimate.is_finite() {
            return Err(PredictError::ModelInvocation(format!(
                "model produced a non-finite estimate ({estimate})"
            )));
        }
        Ok(estimate)
    }
}

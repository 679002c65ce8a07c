use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use log::info;
use tract_onnx::prelude::*;

use crate::linear::LinearRegressor;
use crate::types::FeatureRow;

/// A trained single-output regressor scored one row at a time.
pub trait Regressor: Send + Sync {
    fn predict(&self, row: &FeatureRow) -> anyhow::Result<f64>;

    /// Short artifact family name, surfaced by the model info endpoint.
    fn kind(&self) -> &'static str;

    fn columns(&self) -> Vec<String>;
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX regressor executed by tract. The graph takes a single `[1, n]` f32
/// input whose column order is fixed at load time.
pub struct OnnxRegressor {
    model: Plan,
    columns: Vec<String>,
}

impl OnnxRegressor {
    pub fn load<P: AsRef<Path>>(model_path: P, columns: Vec<String>) -> TractResult<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(model_path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, columns.len())),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, columns })
    }

    fn check_layout(&self, row: &FeatureRow) -> anyhow::Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "feature row has {} columns, model expects {}",
                row.len(),
                self.columns.len()
            );
        }
        for (idx, (got, expected)) in row.names().zip(&self.columns).enumerate() {
            if got != expected.as_str() {
                bail!("column {idx} is `{got}`, model expects `{expected}`");
            }
        }
        Ok(())
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, row: &FeatureRow) -> anyhow::Result<f64> {
        self.check_layout(row)?;

        let input = Tensor::from_shape(&[1, row.len()], &row.values())?;
        let outputs = self.model.run(tvec!(input.into()))?;

        let value: f32 = *outputs
            .first()
            .ok_or_else(|| anyhow!("model returned no outputs"))?
            .to_array_view::<f32>()?
            .iter()
            .next()
            .ok_or_else(|| anyhow!("model output tensor is empty"))?;

        Ok(f64::from(value))
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }
}

/// Loads the artifact at `path`, picking the runtime from the file extension.
///
/// `columns` is the feature layout the caller will assemble rows in. ONNX
/// graphs carry no column names, so the layout is bound at load time; linear
/// artifacts name their own columns and only use `columns` for logging.
pub fn load_artifact(path: &Path, columns: Vec<String>) -> anyhow::Result<Arc<dyn Regressor>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let model: Arc<dyn Regressor> = match ext.as_str() {
        "onnx" => Arc::new(
            OnnxRegressor::load(path, columns)
                .with_context(|| format!("loading ONNX artifact {}", path.display()))?,
        ),
        "json" => Arc::new(
            LinearRegressor::from_path(path)
                .with_context(|| format!("loading linear artifact {}", path.display()))?,
        ),
        other => bail!(
            "unsupported artifact extension `{other}` for {} (expected .onnx or .json)",
            path.display()
        ),
    };

    info!(
        "loaded {} artifact from {} ({} columns)",
        model.kind(),
        path.display(),
        model.columns().len()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn rejects_unknown_extension() {
        let err = load_artifact(Path::new("best_wage_model.pkl"), vec![])
            .err()
            .expect("pkl must be rejected");
        assert!(err.to_string().contains("unsupported artifact extension"));
    }

    #[test]
    fn missing_onnx_file_is_an_error() {
        let res = load_artifact(Path::new("/nonexistent/model.onnx"), vec!["age".into()]);
        assert!(res.is_err());
    }

    fn shipped_onnx() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../models/best_wage_model.onnx")
    }

    // Column order the shipped ONNX export was traced with.
    fn extended_columns() -> Vec<String> {
        let mut cols = vec!["age".to_string(), "year".to_string()];
        let blocks: [(&str, &[&str]); 6] = [
            (
                "education",
                &["< HS Grad", "HS Grad", "Some College", "College Grad", "Advanced Degree"],
            ),
            ("jobclass", &["Industrial", "Information"]),
            ("health", &["Regular o Mala", "Muy Buena o Excelente"]),
            ("health_ins", &["Yes", "No"]),
            ("maritl", &["Never Married", "Married", "Widowed", "Divorced", "Separated"]),
            ("race", &["White", "Black", "Asian", "Other"]),
        ];
        for (field, levels) in blocks {
            cols.extend(levels.iter().map(|l| format!("{field}={l}")));
        }
        cols
    }

    fn example_row() -> FeatureRow {
        let hot = [
            "education=College Grad",
            "jobclass=Information",
            "health=Muy Buena o Excelente",
            "health_ins=Yes",
            "maritl=Never Married",
            "race=White",
        ];
        let mut row = FeatureRow::new();
        for name in extended_columns() {
            let value = match name.as_str() {
                "age" => 30.0,
                "year" => 2006.0,
                n if hot.contains(&n) => 1.0,
                _ => 0.0,
            };
            row.push(name, value);
        }
        row
    }

    #[test]
    fn onnx_artifact_scores_a_row() {
        let model = load_artifact(&shipped_onnx(), extended_columns()).unwrap();
        assert_eq!(model.kind(), "onnx");
        assert_eq!(model.columns().len(), 22);

        // -2163.1 + 30*0.35 + 2006*1.1 + 38 + 5 + 6 + 18 - 12 + 3
        let pred = model.predict(&example_row()).unwrap();
        assert!((pred - 112.0).abs() < 1e-2, "got {pred}");
    }

    #[test]
    fn onnx_matches_linear_export() {
        let onnx = load_artifact(&shipped_onnx(), extended_columns()).unwrap();
        let linear = LinearRegressor::from_path(shipped_onnx().with_extension("json")).unwrap();

        let mut row = example_row();
        row.push("age", 61.0);
        row.push("education=College Grad", 0.0);
        row.push("education=Advanced Degree", 1.0);
        row.push("race=White", 0.0);
        row.push("race=Asian", 1.0);

        let a = onnx.predict(&row).unwrap();
        let b = linear.predict(&row).unwrap();
        assert!((a - b).abs() < 1e-2, "onnx {a} vs linear {b}");
    }

    #[test]
    fn onnx_rejects_row_of_wrong_width() {
        let model = load_artifact(&shipped_onnx(), extended_columns()).unwrap();

        let source = example_row();

        let mut row = FeatureRow::new();
        for name in source.names().skip(1) {
            row.push(name, source.get(name).unwrap());
        }

        let err = model.predict(&row).unwrap_err();
        assert_eq!(err.to_string(), "feature row has 21 columns, model expects 22");
    }

    #[test]
    fn onnx_rejects_reordered_columns() {
        let model = load_artifact(&shipped_onnx(), extended_columns()).unwrap();
        let source = example_row();

        let mut row = FeatureRow::new();
        row.push("year", 2006.0);
        row.push("age", 30.0);
        for name in source.names().skip(2) {
            row.push(name, source.get(name).unwrap());
        }

        let err = model.predict(&row).unwrap_err();
        assert_eq!(err.to_string(), "column 0 is `year`, model expects `age`");
    }

    #[test]
    fn onnx_layout_must_match_graph_width() {
        let mut columns = extended_columns();
        columns.pop();
        assert!(load_artifact(&shipped_onnx(), columns).is_err());
    }
}

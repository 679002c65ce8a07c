//! Wage classification service: scores an applicant record with a pre-trained
//! regressor, buckets the estimate into six salary bands and describes it.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod routes;
pub mod service;

pub use config::AppConfig;
pub use error::PredictError;
pub use models::{PredictionResult, WageQuery};
pub use service::PredictionService;

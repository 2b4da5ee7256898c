// Model accuracy metrics shown in the status bar.

use serde::Deserialize;
use thiserror::Error;

use crate::source::{DataSource, SourceError};

#[derive(Debug, Error)]
pub enum MetricsLoadError {
    #[error("failed to read metrics from {0}")]
    Unreachable(#[source] SourceError),

    #[error("metrics are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Per-model RMSE from the projection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ModelMetrics {
    pub rf: f64,
    pub xgb: f64,
    pub lgb: f64,
}

impl ModelMetrics {
    /// Mean RMSE across the three models.
    pub fn ensemble_rmse(&self) -> f64 {
        (self.rf + self.xgb + self.lgb) / 3.0
    }
}

pub fn format_rmse(rmse: f64) -> String {
    format!("Ensemble RMSE: {rmse:.2}")
}

pub async fn fetch_metrics(source: &DataSource) -> Result<ModelMetrics, MetricsLoadError> {
    let text = source
        .read_text()
        .await
        .map_err(MetricsLoadError::Unreachable)?;
    Ok(serde_json::from_str(&text)?)
}

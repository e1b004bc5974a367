use chrono::{DateTime, Utc};
use gastric_decision::decisions::{CaseIntake, Decision};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

static DECISION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Response body for a composed decision. The core decision is deterministic; the id and
/// timestamp are assigned here.
#[derive(Debug, Serialize)]
pub(crate) struct DecisionEnvelope {
    pub(crate) decision_id: String,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) decision: Decision,
}

impl DecisionEnvelope {
    pub(crate) fn new(decision: Decision) -> Self {
        let generated_at = Utc::now();
        let sequence = DECISION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self {
            decision_id: format!("dec-{}-{sequence:06}", generated_at.format("%Y%m%d%H%M%S")),
            generated_at,
            decision,
        }
    }
}

pub(crate) fn load_case(path: &Path) -> Result<CaseIntake, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

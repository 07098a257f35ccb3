//! Outcome Log - Append-only JSONL Order Outcomes
//!
//! Persists order outcomes to `<dir>/outcomes.jsonl`, one JSON object
//! per line, and writes the metrics exposition to `<dir>/metrics.prom`
//! when the run finishes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::adapters::metrics::AuctionMetrics;
use crate::ports::outcome_sink::{OrderOutcome, OutcomeSink};

const OUTCOMES_FILE: &str = "outcomes.jsonl";
const METRICS_FILE: &str = "metrics.prom";

/// Append-only JSONL outcome writer.
pub struct OutcomeLog {
    /// `<dir>/outcomes.jsonl`.
    outcomes_path: PathBuf,
    /// `<dir>/metrics.prom`.
    metrics_path: PathBuf,
    /// Metrics dumped on `finish`.
    metrics: Option<Arc<AuctionMetrics>>,
}

impl OutcomeLog {
    /// Create the report directory if needed.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

        Ok(Self {
            outcomes_path: dir.join(OUTCOMES_FILE),
            metrics_path: dir.join(METRICS_FILE),
            metrics: None,
        })
    }

    /// Also write `metrics` when the run finishes.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<AuctionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn outcomes_path(&self) -> &Path {
        &self.outcomes_path
    }

    /// Append one outcome line.
    #[instrument(skip(self, outcome), fields(order_id = %outcome.order_id))]
    pub async fn append(&self, outcome: &OrderOutcome) -> Result<()> {
        let mut json =
            serde_json::to_string(outcome).context("Failed to serialize order outcome")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.outcomes_path)
            .await
            .context("Failed to open outcome log file")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write order outcome")?;
        file.flush().await.context("Failed to flush outcome log")?;

        Ok(())
    }

    /// Load every outcome written so far, skipping malformed lines.
    pub async fn load_all(&self) -> Result<Vec<OrderOutcome>> {
        if !fs::try_exists(&self.outcomes_path).await? {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.outcomes_path).await?;
        let mut outcomes = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<OrderOutcome>(line) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(error = %e, "Skipping malformed outcome record"),
            }
        }
        Ok(outcomes)
    }
}

#[async_trait]
impl OutcomeSink for OutcomeLog {
    async fn record(&self, outcome: &OrderOutcome) -> Result<()> {
        self.append(outcome).await
    }

    #[instrument(skip(self))]
    async fn finish(&self) -> Result<()> {
        if let Some(metrics) = &self.metrics {
            fs::write(&self.metrics_path, metrics.render()?)
                .await
                .context("Failed to write metrics file")?;
        }
        info!(path = %self.outcomes_path.display(), "Outcome report written");
        Ok(())
    }
}

//! Backtest summaries loaded ahead of time.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::{BacktestProvider, SourceError};
use crate::types::BacktestSummary;

/// In-memory backtest results keyed by instrument code.
#[derive(Debug, Clone, Default)]
pub struct StaticBacktestProvider {
    summaries: HashMap<String, BacktestSummary>,
}

impl StaticBacktestProvider {
    pub fn new(summaries: HashMap<String, BacktestSummary>) -> Self {
        Self { summaries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `{"<code>": {"winRate": 0.7, "totalTrades": 12}, ...}`.
    ///
    /// Entries that do not deserialize or carry a win rate outside [0, 1] are
    /// skipped with a warning; the rest still load.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let raw: HashMap<String, Value> = serde_json::from_str(json)?;
        let mut summaries = HashMap::with_capacity(raw.len());

        for (code, value) in raw {
            match serde_json::from_value::<BacktestSummary>(value) {
                Ok(summary) if summary.is_valid() => {
                    summaries.insert(code, summary);
                }
                Ok(summary) => warn!("Skipping backtest for {}: win rate {} out of range", code, summary.win_rate),
                Err(e) => warn!("Skipping backtest for {}: {}", code, e),
            }
        }

        Ok(Self { summaries })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let provider = Self::from_json(&contents)?;
        info!("Loaded {} backtest summaries from {}", provider.len(), path.display());
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

#[async_trait]
impl BacktestProvider for StaticBacktestProvider {
    async fn summary(&self, code: &str) -> Result<Option<BacktestSummary>, SourceError> {
        Ok(self.summaries.get(code).copied())
    }
}

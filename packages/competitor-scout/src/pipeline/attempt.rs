//! Unit-of-work isolation.
//!
//! Every external call in the pipeline (one query, one source, one
//! competitor) runs through [`attempt`]: a failure is logged with the stage
//! and unit it belongs to, and replaced by a fallback value so the batch
//! carries on.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ScoutError};
use crate::traits::llm::{CompletionModel, Message};
use crate::types::config::PipelineConfig;

/// Pipeline stage a unit of work belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    QueryGeneration,
    Search,
    Fetch,
    Extraction,
    Enrichment,
    Summary,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryGeneration => "query_generation",
            Self::Search => "search",
            Self::Fetch => "fetch",
            Self::Extraction => "extraction",
            Self::Enrichment => "enrichment",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one external call for logging.
#[derive(Debug, Clone, Copy)]
pub struct UnitOfWork<'a> {
    pub stage: Stage,

    /// Query string, URL or competitor name
    pub label: &'a str,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(stage: Stage, label: &'a str) -> Self {
        Self { stage, label }
    }
}

/// Run `work`, returning `fallback` (and logging) if it fails.
pub async fn attempt<T, Fut>(unit: UnitOfWork<'_>, work: Fut, fallback: T) -> T
where
    Fut: Future<Output = Result<T>>,
{
    match work.await {
        Ok(value) => value,
        Err(e) => {
            warn!(
                stage = %unit.stage,
                unit = unit.label,
                error = %e,
                "Unit of work failed, using fallback"
            );
            fallback
        }
    }
}

/// Bound `work` by `limit`, mapping expiry to [`ScoutError::Timeout`].
pub async fn within<T, Fut>(limit: Duration, work: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| ScoutError::Timeout(limit))?
}

/// One completion call with the configured model and timeout.
pub(crate) async fn complete<L>(llm: &L, messages: &[Message], config: &PipelineConfig) -> Result<String>
where
    L: CompletionModel + ?Sized,
{
    within(config.llm_timeout(), llm.complete(messages, &config.model)).await
}

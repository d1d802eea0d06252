use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::screener::ScreenerRecord;
use crate::domain::errors::ScreenerError;
use crate::domain::services::screener::dimension_filters::PerformanceWindow;

/// Latest metrics per security for a bar window
#[async_trait]
pub trait ScreenerDataSource: Send + Sync {
    /// One record per security, built from its most recent bar in `window`
    async fn latest_rows(
        &self,
        window: PerformanceWindow,
    ) -> Result<Vec<ScreenerRecord>, ScreenerError>;
}

#[derive(Clone, Default)]
pub struct InMemoryScreenerSource {
    rows: Arc<RwLock<HashMap<PerformanceWindow, Vec<ScreenerRecord>>>>,
}

impl InMemoryScreenerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_rows(&self, window: PerformanceWindow, rows: Vec<ScreenerRecord>) {
        self.rows.write().await.insert(window, rows);
    }
}

#[async_trait]
impl ScreenerDataSource for InMemoryScreenerSource {
    async fn latest_rows(
        &self,
        window: PerformanceWindow,
    ) -> Result<Vec<ScreenerRecord>, ScreenerError> {
        Ok(self
            .rows
            .read()
            .await
            .get(&window)
            .cloned()
            .unwrap_or_default())
    }
}

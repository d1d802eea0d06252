//! Snapshot Reader Trait
//!
//! Scoring reads one complete metric snapshot per security through this
//! seam, so calculators never touch storage directly.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::snapshot::SecurityMetricSnapshot;
use crate::domain::errors::ScoringError;

#[async_trait]
pub trait SnapshotReader: Send + Sync {
    /// Full snapshot for a symbol, `ScoringError::NotFound` when the symbol is unknown
    async fn load_snapshot(&self, symbol: &str) -> Result<SecurityMetricSnapshot, ScoringError>;

    /// Every symbol with a stored snapshot, ascending
    async fn list_symbols(&self) -> Result<Vec<String>, ScoringError>;
}

/// Snapshot reader backed by a map, for tests and one-off runs
#[derive(Clone, Default)]
pub struct InMemorySnapshotReader {
    snapshots: Arc<RwLock<HashMap<String, SecurityMetricSnapshot>>>,
}

impl InMemorySnapshotReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, snapshot: SecurityMetricSnapshot) {
        self.snapshots
            .write()
            .await
            .insert(snapshot.symbol.clone(), snapshot);
    }
}

#[async_trait]
impl SnapshotReader for InMemorySnapshotReader {
    async fn load_snapshot(&self, symbol: &str) -> Result<SecurityMetricSnapshot, ScoringError> {
        self.snapshots
            .read()
            .await
            .get(symbol)
            .cloned()
            .ok_or_else(|| ScoringError::NotFound {
                symbol: symbol.to_string(),
            })
    }

    async fn list_symbols(&self) -> Result<Vec<String>, ScoringError> {
        let mut symbols: Vec<String> = self.snapshots.read().await.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

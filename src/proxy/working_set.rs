//! Shared collection of proxies confirmed working during a run

use crate::proxy::models::ProxyRecord;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Concurrency-safe result set shared by all workers.
///
/// Each worker appends its local list once; contributions are kept per worker
/// so that [`WorkingSet::records`] can return them in worker order regardless
/// of which worker finished first.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    inner: Arc<Mutex<Vec<(usize, Vec<ProxyRecord>)>>>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a worker's confirmed-working proxies
    pub async fn append(&self, worker: usize, records: Vec<ProxyRecord>) {
        if records.is_empty() {
            return;
        }
        self.inner.lock().await.push((worker, records));
    }

    /// All collected proxies, ordered by worker index
    pub async fn records(&self) -> Vec<ProxyRecord> {
        let mut contributions = self.inner.lock().await.clone();
        contributions.sort_by_key(|(worker, _)| *worker);
        contributions.into_iter().flat_map(|(_, r)| r).collect()
    }
}

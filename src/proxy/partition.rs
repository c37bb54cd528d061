//! Splits a proxy list into contiguous per-worker chunks

use crate::proxy::models::ProxyRecord;
use std::num::NonZeroUsize;

/// Ordered slice of the proxy list owned by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadChunk {
    /// Worker index, used for log tagging
    pub index: usize,
    pub records: Vec<ProxyRecord>,
}

impl ThreadChunk {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Partition `records` into at most `threads` contiguous chunks of
/// `ceil(len / threads)` records each.
///
/// Every record lands in exactly one chunk and order is preserved. When there
/// are fewer records than threads, fewer chunks are returned; an empty list
/// yields no chunks.
pub fn partition(records: Vec<ProxyRecord>, threads: NonZeroUsize) -> Vec<ThreadChunk> {
    if records.is_empty() {
        return Vec::new();
    }

    let size = records.len().div_ceil(threads.get());
    let mut chunks = Vec::new();
    let mut rest = records.into_iter().peekable();

    while rest.peek().is_some() {
        let records: Vec<_> = rest.by_ref().take(size).collect();
        chunks.push(ThreadChunk {
            index: chunks.len(),
            records,
        });
    }

    chunks
}

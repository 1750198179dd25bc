//! Glue between per-target resolution tasks and a single output writer
//!
//! Targets resolve concurrently, but every completed host goes through one
//! channel into one writer task, so lines from different hosts never
//! interleave on the sink.

use crate::error::{ScanError, ScanResult};
use crate::output::{HostResult, OutputManager};
use crate::resolver::{DnsClient, HostResolver};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Totals reported by [`write_results`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub hosts: usize,
    pub records: usize,
}

/// Resolve `target` on the blocking pool.
///
/// A lookup task that panics or is cancelled counts as a failed resolution
/// of that target.
pub async fn resolve_target<C>(resolver: Arc<HostResolver<C>>, target: String) -> ScanResult<Vec<String>>
where
    C: DnsClient + Send + Sync + 'static,
{
    let host = target.clone();
    tokio::task::spawn_blocking(move || resolver.resolve(&target))
        .await
        .map_err(|e| ScanError::ResolutionFailed {
            host,
            source: Some(Box::new(e)),
        })?
}

/// Drain completed hosts from `rx` into `writer` until every sender is dropped.
///
/// A sink failure stops the writer and is returned; the writer is handed back
/// on success so callers can inspect or close it.
pub async fn write_results<W: Write>(
    mut rx: mpsc::Receiver<HostResult>,
    mut manager: OutputManager,
    mut writer: W,
) -> ScanResult<(W, RunStats)> {
    let mut stats = RunStats::default();

    while let Some(result) = rx.recv().await {
        manager.write_host(&result, &mut writer)?;
        stats.hosts += 1;
        stats.records += result.ports.len();
    }

    writer.flush()?;
    Ok((writer, stats))
}

//! Bounded-concurrency fan-out across filings.
//!
//! The core extractor is synchronous by design (§5): this pool demonstrates
//! that it's safe to call from many threads on distinct inputs, via
//! `tokio::task::spawn_blocking` gated by a semaphore, rather than claiming
//! to be a tuned production scheduler.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::archive::FilingSource;
use crate::sink::RowSink;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub filings_seen: usize,
    pub filings_ok: usize,
    pub filings_failed: usize,
    pub rows_written: usize,
}

/// Processes every filing `source` lists, writing successful extractions to
/// `sink`. One bad filing is logged and skipped; it never aborts the run.
pub async fn run(
    source: Arc<dyn FilingSource>,
    sink: Arc<dyn RowSink>,
    concurrency: usize,
) -> Result<RunSummary> {
    let paths = source.list()?;
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let ok = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let rows_written = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(paths.len());

    for path in paths.clone() {
        let semaphore = Arc::clone(&semaphore);
        let source = Arc::clone(&source);
        let sink = Arc::clone(&sink);
        let ok = Arc::clone(&ok);
        let failed = Arc::clone(&failed);
        let rows_written = Arc::clone(&rows_written);

        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
            let result = tokio::task::spawn_blocking(move || process_one(source.as_ref(), sink.as_ref(), &path))
                .await
                .expect("filing task panicked");

            match result {
                Ok(n) => {
                    ok.fetch_add(1, Ordering::Relaxed);
                    rows_written.fetch_add(n, Ordering::Relaxed);
                }
                Err(_) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await?;
    }

    sink.finish()?;

    Ok(RunSummary {
        filings_seen: paths.len(),
        filings_ok: ok.load(Ordering::Relaxed),
        filings_failed: failed.load(Ordering::Relaxed),
        rows_written: rows_written.load(Ordering::Relaxed),
    })
}

fn process_one(source: &dyn FilingSource, sink: &dyn RowSink, path: &PathBuf) -> Result<usize> {
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let bytes = source.read(path)?;

    let rows = match ch_xbrl_core::extract(filename, &bytes) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(filename, error = %e, "skipping filing");
            return Err(e.into());
        }
    };

    let count = rows.len();
    sink.write_rows(&rows)?;
    debug!(filename, rows = count, "wrote filing");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::LocalDirectorySource;
    use crate::sink::CsvSink;

    #[tokio::test]
    async fn run_skips_bad_filings_and_counts_good_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Prod1_1_00000001_20220101.xml"),
            r#"<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance">
                <CompaniesHouseRegisteredNumber>00000001</CompaniesHouseRegisteredNumber>
               </xbrli:xbrl>"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("Prod1_1_00000002_20220101.xml"), b"<unclosed>").unwrap();

        let source: Arc<dyn FilingSource> = Arc::new(LocalDirectorySource::new(dir.path()));
        let out_path = dir.path().join("out.csv");
        let sink: Arc<dyn RowSink> = Arc::new(CsvSink::create(&out_path).unwrap());

        let summary = run(source, sink, 2).await.unwrap();

        assert_eq!(summary.filings_seen, 2);
        assert_eq!(summary.filings_ok, 1);
        assert_eq!(summary.filings_failed, 1);
        assert_eq!(summary.rows_written, 1);
    }
}

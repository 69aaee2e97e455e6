//! Replaying recorded exchanges through a dumper.
//!
//! Exchanges are dealt round-robin to a fixed set of scoped worker
//! threads. Each worker owns one [`DumpContext`] named `worker-<n>`, so its
//! timestamp cache is never shared.

use std::thread;

use tracing::error;

use crate::dumper::RequestDumper;
use crate::fixture::RecordedExchange;
use crate::sink::LogSink;

/// Outcome of a replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Exchanges whose request and response blocks were both written.
    pub completed: usize,
    /// Exchanges whose pipeline failed; only the request block was written.
    pub failed: usize,
    /// Workers that panicked. Their exchanges are counted in `lost`.
    pub panicked: usize,
    /// Exchanges assigned to a panicked worker.
    pub lost: usize,
}

impl ReplaySummary {
    /// Exchanges whose outcome is known.
    pub fn total(&self) -> usize {
        self.completed + self.failed
    }

    /// Whether every exchange was accounted for.
    pub fn is_complete(&self) -> bool {
        self.panicked == 0
    }

    fn add(&mut self, other: ReplaySummary) {
        self.completed += other.completed;
        self.failed += other.failed;
        self.panicked += other.panicked;
        self.lost += other.lost;
    }
}

/// Replay `exchanges` through `dumper` on `workers` threads.
///
/// With one worker the exchanges are dumped in order. A worker that panics
/// is reported through [`ReplaySummary::panicked`]; the other workers run
/// to completion.
pub fn replay<S: LogSink>(
    dumper: &RequestDumper<S>,
    exchanges: &[RecordedExchange],
    workers: usize,
) -> ReplaySummary {
    let workers = workers.clamp(1, exchanges.len().max(1));

    let mut summary = ReplaySummary::default();
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|n| {
                let assigned = exchanges.iter().skip(n).step_by(workers).count();
                let batch = exchanges.iter().skip(n).step_by(workers);
                (assigned, scope.spawn(move || run_worker(dumper, n + 1, batch)))
            })
            .collect();
        for (n, (assigned, handle)) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(partial) => summary.add(partial),
                Err(_) => {
                    error!(worker = n + 1, exchanges = assigned, "replay worker panicked");
                    summary.add(ReplaySummary {
                        panicked: 1,
                        lost: assigned,
                        ..ReplaySummary::default()
                    });
                }
            }
        }
    });
    summary
}

fn run_worker<'a, S, I>(dumper: &RequestDumper<S>, n: usize, batch: I) -> ReplaySummary
where
    S: LogSink,
    I: Iterator<Item = &'a RecordedExchange>,
{
    let mut ctx = dumper.context(format!("worker-{}", n));
    let mut summary = ReplaySummary::default();
    for exchange in batch {
        let mut response = exchange.initial_response();
        let result = dumper.dump(&mut ctx, &exchange.request, &mut response, |rq, rs| {
            exchange.run_pipeline(rq, rs)
        });
        match result {
            Ok(()) => summary.completed += 1,
            Err(_) => summary.failed += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{RecordedRequest, RecordedResponse};
    use crate::sink::MemorySink;
    use rd_config::TimestampZone;
    use rd_redact::RedactionPolicy;
    use std::sync::Arc;

    fn exchanges(n: usize) -> Vec<RecordedExchange> {
        (0..n)
            .map(|i| {
                RecordedExchange::new(
                    RecordedRequest::http_get(&format!("/item/{}", i)),
                    RecordedResponse::http(200),
                )
            })
            .collect()
    }

    fn dumper() -> RequestDumper<MemorySink> {
        RequestDumper::new(Arc::new(RedactionPolicy::default()), MemorySink::new())
            .with_zone(TimestampZone::Utc)
    }

    #[test]
    fn test_single_worker_keeps_order() {
        let dumper = dumper();
        let summary = replay(&dumper, &exchanges(3), 1);
        assert_eq!(summary, ReplaySummary { completed: 3, ..ReplaySummary::default() });

        let uris: Vec<String> = dumper
            .sink()
            .lines()
            .into_iter()
            .filter(|l| l.contains("requestURI="))
            .collect();
        assert_eq!(
            uris,
            vec![
                "worker-1         requestURI=/item/0",
                "worker-1         requestURI=/item/1",
                "worker-1         requestURI=/item/2",
            ]
        );
    }

    #[test]
    fn test_failures_counted() {
        let dumper = dumper();
        let mut input = exchanges(2);
        input[1] = input[1].clone().failing("upstream timeout");
        let summary = replay(&dumper, &input, 1);
        assert_eq!(summary, ReplaySummary { completed: 1, failed: 1, ..ReplaySummary::default() });
    }

    #[test]
    fn test_workers_own_their_context() {
        let dumper = dumper();
        let summary = replay(&dumper, &exchanges(8), 4);
        assert_eq!(summary.total(), 8);

        let lines = dumper.sink().lines();
        for n in 1..=4 {
            let prefix = format!("worker-{} ", n);
            let starts = lines
                .iter()
                .filter(|l| l.starts_with(&prefix) && l.contains("START TIME"))
                .count();
            assert_eq!(starts, 2, "worker-{}", n);
        }
    }

    /// Forwards to a memory sink but panics on one worker's lines.
    struct FailingWorkerSink {
        inner: MemorySink,
        failing_prefix: &'static str,
    }

    impl LogSink for FailingWorkerSink {
        fn write_line(&self, line: &str) {
            if line.starts_with(self.failing_prefix) {
                panic!("sink rejected {}", line);
            }
            self.inner.write_line(line);
        }
    }

    #[test]
    fn test_panicked_worker_is_reported() {
        let sink = FailingWorkerSink {
            inner: MemorySink::new(),
            failing_prefix: "worker-2 ",
        };
        let dumper = RequestDumper::new(Arc::new(RedactionPolicy::default()), sink);
        let summary = replay(&dumper, &exchanges(4), 2);

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.panicked, 1);
        assert_eq!(summary.lost, 2);
        assert!(!summary.is_complete());
        assert_eq!(summary.total() + summary.lost, 4);
    }

    #[test]
    fn test_empty_input() {
        let dumper = dumper();
        assert_eq!(replay(&dumper, &[], 4), ReplaySummary::default());
        assert!(dumper.sink().lines().is_empty());
    }
}

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
        Arc,
    },
    thread,
    time::Duration,
};

use tracing::instrument;

use crate::{
    domain::{DocumentReference, ErrorKind, Policy, TraversalResult},
    engine::Traversal,
    storage::DocumentParser,
};

/// A shared flag asking a running traversal to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs `work` on a worker thread and waits at most `deadline` for it.
///
/// When the deadline passes first, the worker's [`CancelFlag`] is raised and
/// the worker is abandoned: it may keep running until it next checks the
/// flag, and whatever it eventually produces is discarded. The returned result
/// then reports a timeout. There is no retry.
#[instrument(level = "debug", skip(work))]
pub fn run_bounded<F>(work: F, deadline: Duration) -> TraversalResult
where
    F: FnOnce(CancelFlag) -> TraversalResult + Send + 'static,
{
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    let (sender, receiver) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("dtdiff-traversal".to_string())
        .spawn(move || {
            // The receiver is gone if the deadline already passed.
            let _ = sender.send(work(worker_cancel));
        });

    if let Err(e) = spawned {
        tracing::error!("failed to start comparison worker: {e}");
        return TraversalResult::failed(ErrorKind::WorkerFailed);
    }

    match receiver.recv_timeout(deadline) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            cancel.cancel();
            tracing::warn!("comparison aborted after {} seconds", deadline.as_secs_f64());
            TraversalResult::timed_out(deadline)
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::error!("comparison worker terminated without a result");
            TraversalResult::failed(ErrorKind::WorkerFailed)
        }
    }
}

/// Compares the trees rooted at `golden` and `target` within `deadline`.
pub fn compare_bounded<P>(
    parser: P,
    golden: DocumentReference,
    target: DocumentReference,
    policy: Policy,
    deadline: Duration,
) -> TraversalResult
where
    P: DocumentParser + Send + 'static,
{
    run_bounded(
        move |cancel| {
            Traversal::new(parser, policy)
                .with_cancel(cancel)
                .run(&golden, &target)
        },
        deadline,
    )
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::{
        domain::{DiffRecord, Row, Table},
        storage::{MemoryStore, ParseError},
    };

    /// Delays every parse to make traversals slow.
    struct SlowParser {
        inner: MemoryStore,
        delay: Duration,
    }

    impl DocumentParser for SlowParser {
        fn parse(&self, reference: &DocumentReference) -> Result<Table, ParseError> {
            thread::sleep(self.delay);
            self.inner.parse(reference)
        }
    }

    /// Two identical chains `side/0.htm -> side/1.htm -> ... -> side/{depth}.htm`.
    fn chains(depth: usize) -> MemoryStore {
        let mut store = MemoryStore::new();
        for side in ["g", "t"] {
            for i in 0..=depth {
                let link = (i < depth).then(|| DocumentReference::new(format!("{side}/{}.htm", i + 1)));
                store.insert(Table::new(
                    DocumentReference::new(format!("{side}/{i}.htm")),
                    [(Row::new(i.to_string(), "node", "8", "0x0", "chain"), link)],
                ));
            }
        }
        store
    }

    #[test]
    fn result_within_deadline_is_returned_unchanged() {
        let expected = TraversalResult::completed(
            vec![DiffRecord::new("g/a.htm".into(), "t/a.htm".into())],
            Vec::new(),
        );
        let returned = expected.clone();

        let result = run_bounded(move |_| returned, Duration::from_secs(5));

        assert_eq!(result, expected);
    }

    #[test]
    fn deadline_abandons_worker_and_raises_flag() {
        let observed = Arc::new(AtomicBool::new(false));
        let worker_observed = Arc::clone(&observed);

        let result = run_bounded(
            move |cancel| {
                while !cancel.is_cancelled() {
                    thread::sleep(Duration::from_millis(5));
                }
                worker_observed.store(true, Ordering::SeqCst);
                TraversalResult::completed(Vec::new(), Vec::new())
            },
            Duration::from_millis(50),
        );

        assert!(result.timed_out);
        assert!(!result.same);
        assert!(result.diffs.is_empty());
        assert_eq!(
            result.error,
            Some(ErrorKind::TimeoutExceeded { seconds: 0.05 })
        );

        let start = Instant::now();
        while !observed.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(observed.load(Ordering::SeqCst));
    }

    #[test]
    fn panicking_worker_is_reported() {
        let result = run_bounded(|_| panic!("parser exploded"), Duration::from_secs(5));

        assert_eq!(result.error, Some(ErrorKind::WorkerFailed));
        assert!(!result.same);
        assert!(!result.timed_out);
    }

    #[test]
    fn slow_traversal_times_out_without_verdict() {
        let parser = SlowParser {
            inner: chains(200),
            delay: Duration::from_millis(10),
        };

        let started = Instant::now();
        let result = compare_bounded(
            parser,
            "g/0.htm".into(),
            "t/0.htm".into(),
            Policy::Full,
            Duration::from_millis(100),
        );

        assert!(result.timed_out);
        assert!(!result.same);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn fast_traversal_completes_within_deadline() {
        let result = compare_bounded(
            chains(20),
            "g/0.htm".into(),
            "t/0.htm".into(),
            Policy::Fast,
            Duration::from_secs(10),
        );

        assert!(result.same);
        assert!(!result.timed_out);
        assert!(result.error.is_none());
    }
}

//! Status polling engine
//!
//! Watches one resource through repeated snapshot queries until it reaches
//! the desired status, a designated failure status, or the caller aborts
//! the wait. Events stream to the returned channel as they happen; the
//! channel closes exactly once, right after the terminal event.

use crate::config::WatchConfig;
use crate::event::{WatchError, WatchEvent};
use crate::target::WatchTarget;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Event channel capacity.
///
/// Small on purpose: a slow consumer backpressures the poll loop instead
/// of growing an unbounded queue. The loop owns nothing besides this
/// channel, so blocking on a full buffer is safe, including for the final
/// send before close.
const EVENT_CAPACITY: usize = 10;

/// Start watching `target` and return the event stream.
///
/// Returns immediately; the poll loop runs on its own tokio task. The very
/// first query fires with no delay so a resource that already satisfies
/// the desired condition is answered in a single tick. Queries are
/// strictly sequential: the next tick's timer starts only after the
/// previous tick's event has been delivered.
///
/// Transient query errors and empty payloads are reported on the stream
/// and retried on the normal interval, indefinitely. Absence of the
/// resource, a failure status, cancellation, and stop all end the stream.
pub fn watch<T: WatchTarget>(
    target: T,
    config: WatchConfig<T::Status>,
) -> mpsc::Receiver<WatchEvent<T::Snapshot>> {
    let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
    tokio::spawn(run(target, config, tx));
    rx
}

/// Sleep out `wait`, racing both abort signals.
///
/// Biased so a signal raised before the timer elapsed deterministically
/// wins, and cancellation outranks stop.
async fn sleep_or_abort(
    cancel: &CancellationToken,
    stop: &CancellationToken,
    wait: Duration,
) -> Option<WatchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Some(WatchError::Cancelled),
        _ = stop.cancelled() => Some(WatchError::Stopped),
        _ = tokio::time::sleep(wait) => None,
    }
}

async fn run<T: WatchTarget>(
    target: T,
    config: WatchConfig<T::Status>,
    tx: mpsc::Sender<WatchEvent<T::Snapshot>>,
) {
    let started = Instant::now();
    info!(
        resource = %target.resource(),
        desired = %config.desired,
        initial_wait = ?config.initial_wait,
        poll_interval = ?config.poll_interval,
        "watching resource"
    );

    // Very first query fires with no wait in case the resource has already
    // reached the desired status.
    let mut wait = Duration::ZERO;
    // One-time grace period, armed until the first non-terminal snapshot.
    let mut grace = true;

    loop {
        if let Some(abort) = sleep_or_abort(&config.cancel, &config.stop, wait).await {
            warn!(resource = %target.resource(), error = %abort, "wait aborted");
            let _ = tx.send(WatchEvent::Error(abort)).await;
            return;
        }
        wait = config.poll_interval;

        let snapshot = match target.describe().await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                warn!(resource = %target.resource(), "expected non-empty response; retrying");
                if tx
                    .send(WatchEvent::Error(WatchError::EmptyResponse))
                    .await
                    .is_err()
                {
                    return;
                }
                continue;
            }
            Err(err) if target.is_absent_error(&err) => {
                if target.status_means_absent(&config.desired) {
                    info!(resource = %target.resource(), "resource already gone as desired; done");
                    let _ = tx.send(WatchEvent::Gone).await;
                } else {
                    warn!(
                        resource = %target.resource(),
                        error = %err,
                        "resource does not exist; aborting"
                    );
                    let _ = tx
                        .send(WatchEvent::Error(WatchError::Absent {
                            resource: target.resource().to_string(),
                            source: err,
                        }))
                        .await;
                }
                return;
            }
            Err(err) => {
                warn!(resource = %target.resource(), error = %err, "describe failed; retrying");
                if tx
                    .send(WatchEvent::Error(WatchError::Describe(err)))
                    .await
                    .is_err()
                {
                    return;
                }
                continue;
            }
        };

        let status = target.status_of(&snapshot);
        info!(
            resource = %target.resource(),
            status = %status,
            elapsed = ?started.elapsed(),
            "poll"
        );

        if status == config.desired {
            let _ = tx.send(WatchEvent::Observed(snapshot)).await;
            info!(resource = %target.resource(), status = %status, "desired status; done");
            return;
        }

        if config.failure.contains(&status) {
            warn!(
                resource = %target.resource(),
                status = %status,
                desired = %config.desired,
                "failure status; aborting"
            );
            let error = WatchError::FailureStatus {
                status: status.to_string(),
            };
            let _ = tx.send(WatchEvent::Failed { snapshot, error }).await;
            return;
        }

        if tx.send(WatchEvent::Observed(snapshot)).await.is_err() {
            return;
        }
        if let Some(on_tick) = &config.on_tick {
            on_tick();
        }

        if grace {
            grace = false;
            if !config.initial_wait.is_zero() {
                debug!(
                    resource = %target.resource(),
                    initial_wait = ?config.initial_wait,
                    "grace sleep before second query"
                );
                if let Some(abort) =
                    sleep_or_abort(&config.cancel, &config.stop, config.initial_wait).await
                {
                    warn!(resource = %target.resource(), error = %abort, "wait aborted");
                    let _ = tx.send(WatchEvent::Error(abort)).await;
                    return;
                }
                // The query after the grace period fires right away.
                wait = Duration::ZERO;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{DescribeError, WatchTarget};
    use eks_waiter_common::ClusterStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    type ScriptResult = Result<Option<StubSnapshot>, DescribeError>;

    #[derive(Debug, Clone, PartialEq)]
    struct StubSnapshot {
        status: ClusterStatus,
    }

    /// Target that replays a scripted sequence of query results
    struct ScriptTarget {
        results: Mutex<VecDeque<ScriptResult>>,
    }

    impl ScriptTarget {
        fn new(results: impl IntoIterator<Item = ScriptResult>) -> Self {
            Self {
                results: Mutex::new(results.into_iter().collect()),
            }
        }
    }

    impl WatchTarget for ScriptTarget {
        type Snapshot = StubSnapshot;
        type Status = ClusterStatus;

        fn resource(&self) -> &str {
            "test-cluster"
        }

        async fn describe(&self) -> ScriptResult {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }

        fn status_of(&self, snapshot: &StubSnapshot) -> ClusterStatus {
            snapshot.status.clone()
        }

        fn is_absent_error(&self, error: &DescribeError) -> bool {
            crate::classify::is_cluster_gone(error)
        }

        fn status_means_absent(&self, status: &ClusterStatus) -> bool {
            status.means_absent()
        }
    }

    fn snapshot(status: ClusterStatus) -> ScriptResult {
        Ok(Some(StubSnapshot { status }))
    }

    fn not_found() -> ScriptResult {
        Err(DescribeError::new(
            "ResourceNotFoundException",
            "No cluster found for name: test-cluster",
        ))
    }

    fn fast_config(desired: ClusterStatus) -> WatchConfig<ClusterStatus> {
        WatchConfig::new(
            desired,
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
        .failing_on([ClusterStatus::Failed])
    }

    #[tokio::test]
    async fn immediate_desired_yields_single_event() {
        let target = ScriptTarget::new([snapshot(ClusterStatus::Active)]);
        let mut rx = watch(target, fast_config(ClusterStatus::Active));

        let event = rx.recv().await.unwrap();
        match event {
            WatchEvent::Observed(s) => assert_eq!(s.status, ClusterStatus::Active),
            other => panic!("expected Observed, got {other:?}"),
        }
        assert!(rx.recv().await.is_none(), "stream should be closed");
    }

    #[tokio::test]
    async fn failure_status_yields_snapshot_with_error() {
        let target = ScriptTarget::new([
            snapshot(ClusterStatus::Creating),
            snapshot(ClusterStatus::Failed),
        ]);
        let mut rx = watch(target, fast_config(ClusterStatus::Active));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, WatchEvent::Observed(_)));

        let second = rx.recv().await.unwrap();
        match second {
            WatchEvent::Failed { snapshot, error } => {
                assert_eq!(snapshot.status, ClusterStatus::Failed);
                assert!(matches!(error, WatchError::FailureStatus { .. }));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_before_first_query_emits_no_snapshots() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let target = ScriptTarget::new([snapshot(ClusterStatus::Active)]);
        let config = fast_config(ClusterStatus::Active).with_cancel(cancel);
        let mut rx = watch(target, config);

        let event = rx.recv().await.unwrap();
        match event {
            WatchEvent::Error(error) => assert!(error.is_cancelled()),
            other => panic!("expected cancellation error, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn absent_as_desired_yields_gone() {
        let target = ScriptTarget::new([not_found()]);
        let mut rx = watch(target, fast_config(ClusterStatus::DeletedOrNotExist));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, WatchEvent::Gone));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn absent_while_still_expected_aborts() {
        let target = ScriptTarget::new([not_found(), snapshot(ClusterStatus::Active)]);
        let mut rx = watch(target, fast_config(ClusterStatus::Active));

        let event = rx.recv().await.unwrap();
        match event {
            WatchEvent::Error(WatchError::Absent { resource, .. }) => {
                assert_eq!(resource, "test-cluster");
            }
            other => panic!("expected Absent error, got {other:?}"),
        }
        // No further polling after unexpected absence.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn transient_error_then_desired() {
        let target = ScriptTarget::new([
            Err(DescribeError::new("ThrottlingException", "Rate exceeded")),
            snapshot(ClusterStatus::Active),
        ]);
        let mut rx = watch(target, fast_config(ClusterStatus::Active));

        let first = rx.recv().await.unwrap();
        match first {
            WatchEvent::Error(error) => assert!(!error.is_terminal()),
            other => panic!("expected transient error, got {other:?}"),
        }

        let second = rx.recv().await.unwrap();
        assert!(matches!(second, WatchEvent::Observed(_)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn empty_response_is_reported_and_survived() {
        let target = ScriptTarget::new([Ok(None), snapshot(ClusterStatus::Active)]);
        let mut rx = watch(target, fast_config(ClusterStatus::Active));

        let first = rx.recv().await.unwrap();
        match first {
            WatchEvent::Error(error) => {
                assert!(matches!(error, WatchError::EmptyResponse));
            }
            other => panic!("expected EmptyResponse error, got {other:?}"),
        }

        let second = rx.recv().await.unwrap();
        assert!(matches!(second, WatchEvent::Observed(_)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn tick_hook_fires_once_per_nonterminal_snapshot() {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&ticks);

        let target = ScriptTarget::new([
            snapshot(ClusterStatus::Creating),
            snapshot(ClusterStatus::Creating),
            snapshot(ClusterStatus::Active),
        ]);
        let config = fast_config(ClusterStatus::Active)
            .on_tick(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        let mut rx = watch(target, config);

        let mut events = 0;
        while rx.recv().await.is_some() {
            events += 1;
        }
        assert_eq!(events, 3);
        // Hook runs for the two CREATING observations, not the terminal one.
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stop_during_grace_period_emits_stop_error() {
        let stop = CancellationToken::new();

        let target = ScriptTarget::new([snapshot(ClusterStatus::Creating)]);
        let config = WatchConfig::new(
            ClusterStatus::Active,
            Duration::from_secs(60),
            Duration::from_secs(60),
        )
        .with_stop(stop.clone());
        let mut rx = watch(target, config);

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, WatchEvent::Observed(_)));

        // The engine is now in the grace sleep; stop it.
        stop.cancel();

        let second = rx.recv().await.unwrap();
        match second {
            WatchEvent::Error(error) => {
                assert!(error.is_stopped());
                assert!(!error.is_cancelled());
            }
            other => panic!("expected stop error, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }
}

//! eks-waiter: wait for an EKS cluster or cluster update to reach a status
//!
//! Streams every status observation to the log and exits nonzero when the
//! wait ends in anything but the desired status.

use anyhow::Result;
use clap::{Parser, Subcommand};
use eks_waiter::aws::{AwsContext, EksClient};
use eks_waiter::{watch, ClusterWatcher, UpdateWatcher, WatchConfig, WatchEvent};
use eks_waiter_common::defaults::{
    DEFAULT_CLUSTER_INITIAL_WAIT_SECS, DEFAULT_CLUSTER_POLL_INTERVAL_SECS,
    DEFAULT_UPDATE_INITIAL_WAIT_SECS, DEFAULT_UPDATE_POLL_INTERVAL_SECS,
};
use eks_waiter_common::{ClusterStatus, UpdateStatus};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "eks-waiter")]
#[command(about = "Wait for an EKS cluster or update to reach a desired status")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait for a cluster to reach a status
    Cluster {
        /// Cluster name
        #[arg(short, long)]
        name: String,

        /// Status that ends the wait successfully
        /// (e.g. ACTIVE, or DELETED/NOT-EXIST to wait for deletion)
        #[arg(short, long, default_value = "ACTIVE")]
        desired: String,

        /// AWS region
        #[arg(long, default_value = "us-east-2")]
        region: String,

        /// One-time wait after the first observation, in seconds
        #[arg(long, default_value_t = DEFAULT_CLUSTER_INITIAL_WAIT_SECS)]
        initial_wait: u64,

        /// Interval between status queries, in seconds
        #[arg(long, default_value_t = DEFAULT_CLUSTER_POLL_INTERVAL_SECS)]
        poll_interval: u64,

        /// Overall wait horizon in seconds (0 = no limit)
        #[arg(long, default_value = "0")]
        timeout: u64,
    },

    /// Wait for a cluster update to reach a status
    Update {
        /// Cluster name
        #[arg(short, long)]
        cluster: String,

        /// Update request id
        #[arg(short, long)]
        update_id: String,

        /// Status that ends the wait successfully
        #[arg(short, long, default_value = "Successful")]
        desired: String,

        /// AWS region
        #[arg(long, default_value = "us-east-2")]
        region: String,

        /// One-time wait after the first observation, in seconds
        #[arg(long, default_value_t = DEFAULT_UPDATE_INITIAL_WAIT_SECS)]
        initial_wait: u64,

        /// Interval between status queries, in seconds
        #[arg(long, default_value_t = DEFAULT_UPDATE_POLL_INTERVAL_SECS)]
        poll_interval: u64,

        /// Overall wait horizon in seconds (0 = no limit)
        #[arg(long, default_value = "0")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match args.command {
        Command::Cluster {
            name,
            desired,
            region,
            initial_wait,
            poll_interval,
            timeout,
        } => {
            let desired = ClusterStatus::parse(&desired);
            info!(cluster = %name, desired = %desired, region = %region, "waiting for cluster");

            let aws = AwsContext::new(&region).await;
            let watcher = ClusterWatcher::new(EksClient::from_context(&aws), name)?;
            let config = arm_signals(
                WatchConfig::new(
                    desired,
                    Duration::from_secs(initial_wait),
                    Duration::from_secs(poll_interval),
                )
                .failing_on([ClusterStatus::Failed]),
                timeout,
            );
            consume(watch(watcher, config)).await
        }

        Command::Update {
            cluster,
            update_id,
            desired,
            region,
            initial_wait,
            poll_interval,
            timeout,
        } => {
            let desired = UpdateStatus::parse(&desired);
            info!(
                cluster = %cluster,
                update_id = %update_id,
                desired = %desired,
                region = %region,
                "waiting for cluster update"
            );

            let aws = AwsContext::new(&region).await;
            let watcher = UpdateWatcher::new(EksClient::from_context(&aws), cluster, update_id)?;
            let config = arm_signals(
                WatchConfig::new(
                    desired,
                    Duration::from_secs(initial_wait),
                    Duration::from_secs(poll_interval),
                )
                .failing_on([UpdateStatus::Failed, UpdateStatus::Cancelled]),
                timeout,
            );
            consume(watch(watcher, config)).await
        }
    }
}

/// Arm the two abort signals: `--timeout` drives cancellation, Ctrl-C
/// drives stop. The two produce distinguishable errors on the stream.
fn arm_signals<S>(config: WatchConfig<S>, timeout_secs: u64) -> WatchConfig<S> {
    let cancel = CancellationToken::new();
    let stop = CancellationToken::new();

    if timeout_secs > 0 {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
            warn!(timeout_secs, "wait horizon exceeded; cancelling");
            cancel.cancel();
        });
    }

    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping wait");
                stop.cancel();
            }
        });
    }

    config.with_cancel(cancel).with_stop(stop)
}

/// Drain the event stream; the last event before closure decides the
/// process outcome.
async fn consume<S>(mut rx: mpsc::Receiver<WatchEvent<S>>) -> Result<()> {
    let mut last: Option<WatchEvent<S>> = None;
    while let Some(event) = rx.recv().await {
        match &event {
            // The engine already logs each poll.
            WatchEvent::Observed(_) => {}
            WatchEvent::Error(error) => warn!(error = %error, "watch error"),
            WatchEvent::Failed { error, .. } => warn!(error = %error, "watch failed"),
            WatchEvent::Gone => info!("resource already gone"),
        }
        last = Some(event);
    }

    match last {
        Some(WatchEvent::Observed(_)) | Some(WatchEvent::Gone) => Ok(()),
        Some(WatchEvent::Failed { error, .. }) | Some(WatchEvent::Error(error)) => {
            Err(error.into())
        }
        None => anyhow::bail!("watch ended without emitting any event"),
    }
}

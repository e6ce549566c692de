// Two workers sharing one store race for the same lease; only one runs the
// job, the other skips. Run with:
//
//   RUST_LOG=distlock=debug cargo run --example guarded_job

use distlock::{InMemoryLockStore, LeaseGuard};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> distlock::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = Arc::new(InMemoryLockStore::new());
    let worker_a = LeaseGuard::new(store.clone(), "worker-a");
    let worker_b = LeaseGuard::new(store.clone(), "worker-b");

    let (ran_a, ran_b) = tokio::join!(
        worker_a.run("nightly-report", "", 30, || async {
            info!("worker-a generating the report");
            tokio::time::sleep(Duration::from_millis(50)).await;
            "report.pdf"
        }),
        worker_b.run("nightly-report", "", 30, || async {
            info!("worker-b generating the report");
            tokio::time::sleep(Duration::from_millis(50)).await;
            "report.pdf"
        }),
    );

    info!(?ran_a, ?ran_b, "exactly one worker should have produced a value");
    Ok(())
}

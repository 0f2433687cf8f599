//! # Example: admission_chain
//!
//! Layered admission: a root quota, a per-scope freeze, and a deferred vote.
//!
//! ## Flow
//! ```text
//! api.jobs.schedule("sync")
//!     ├─ gate(api.jobs)  ──► accept
//!     ├─ api: "jobs.sync" ──► maintenance vote (deferred)
//!     └─ root: "api.jobs.sync" ──► quota (accept / refuse)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example admission_chain --features logging
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use taskscope::{Config, Coordinator, Deferred, LogWriter, SchedulerFn, Subscribe, Verdict};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let coord = Coordinator::builder(Config::default())
        .with_subscribers(vec![Arc::new(LogWriter::new()) as Arc<dyn Subscribe>])
        .build();
    let root = coord.root();

    // Root: at most two `api.*` scheduling requests.
    let admitted = Arc::new(AtomicUsize::new(0));
    let quota = Arc::clone(&admitted);
    root.add_scheduler(SchedulerFn::arc("api-quota", move |t: &str| {
        if !t.starts_with("api.") {
            return Verdict::Accept;
        }
        if quota.fetch_add(1, Ordering::SeqCst) < 2 {
            Verdict::Accept
        } else {
            Verdict::from("api quota exhausted")
        }
    }));

    // api: wait for the maintenance window to end.
    let api = root.context("api")?;
    let window: Deferred<()> = Deferred::new();
    let w = window.clone();
    api.add_scheduler(SchedulerFn::arc("maintenance", move |_: &str| {
        Verdict::Defer(w.clone())
    }));

    let jobs = api.context("jobs")?;
    let first = jobs.schedule("sync")?;
    let second = jobs.schedule("sync")?;
    let third = jobs.schedule("sync")?;
    println!("[app] third refused: {:?}", third.outcome());

    tokio::time::sleep(Duration::from_millis(100)).await;
    window.resolve(());

    for request in [first, second] {
        let task = request.await?;
        println!("[app] admitted {} (#{})", task.full_type(), task.id());
        task.resolve();
    }

    coord.shutdown().await;
    Ok(())
}

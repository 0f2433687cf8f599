//! # Example: capture_release
//!
//! Holds a burst of report jobs behind a capture, then opens the gate.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait and wire it into [`Coordinator::builder`].
//! - Hold scheduling with [`Scope::capture`] and open it with [`Scope::release`].
//! - Query live tasks with status filters.
//!
//! ## Flow
//! ```text
//! reports.capture("daily.*")
//!     ├─► schedule("daily.n") ×3 ──► GateHeld / TaskDeferred (status: scheduled)
//!     ├─► sleep (window closed)
//!     └─► release("daily.*") ──► GateOpened ──► TaskAdmitted (FIFO) ──► resolve
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example capture_release
//! ```

use std::{sync::Arc, time::Duration};
use taskscope::{Config, Coordinator, Event, EventKind, Scope, Subscribe};

/// Prints gate and lifecycle events.
struct ConsoleSubscriber;

#[async_trait::async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        let task = ev.task.as_deref().unwrap_or("<none>");
        match ev.kind {
            EventKind::GateHeld => println!("[sub] held:     {task}"),
            EventKind::GateOpened => println!("[sub] opened:   {task}"),
            EventKind::TaskAdmitted => println!("[sub] admitted: {task}"),
            EventKind::TaskResolved => println!("[sub] resolved: {task}"),
            EventKind::TaskRejected => println!(
                "[sub] rejected: {task} reason={}",
                ev.reason.as_deref().unwrap_or("<none>")
            ),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

fn report(scope: &Scope, n: usize) -> anyhow::Result<()> {
    scope.schedule(format!("daily.n{n}"))?.done(move |task| {
        println!("[app] running report #{n} ({})", task.full_type());
        task.resolve();
    });
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let coord = Coordinator::builder(Config::default())
        .with_subscribers(vec![Arc::new(ConsoleSubscriber) as Arc<dyn Subscribe>])
        .build();

    let reports = coord.root().context("reports")?;
    reports.capture("daily.*")?;

    for n in 0..3 {
        report(&reports, n)?;
    }
    println!(
        "[app] waiting: {} scheduled, {} running",
        reports.find("* [scheduled]")?.len(),
        reports.find("* [running]")?.len()
    );

    tokio::time::sleep(Duration::from_millis(200)).await;

    let all = reports.when("daily.*")?;
    let opened = reports.release("daily.*")?;
    println!("[app] released {opened} gates");
    all.await?;

    coord.shutdown().await;
    Ok(())
}

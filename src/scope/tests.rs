use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::admission::{SchedulerFn, Verdict};
use crate::config::Config;
use crate::deferred::Deferred;
use crate::error::{Rejection, ScopeError};
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use crate::tasks::{Task, TaskStatus};

use super::{Coordinator, Scope};

fn count(scope: &Scope, selector: &str) -> usize {
    scope.find(selector).unwrap().len()
}

#[test]
fn test_scope_naming() {
    let root = Scope::root();
    let a = root.context("a").unwrap();
    let ax = a.context("x").unwrap();
    let axy = ax.context("y").unwrap();

    assert_eq!(root.full_name(), "");
    assert!(root.is_root());
    assert_eq!(a.full_name(), "a");
    assert_eq!(ax.full_name(), "a.x");
    assert_eq!(axy.full_name(), "a.x.y");
    assert_eq!(axy.relative_name(), "y");
    assert!(axy.owner().unwrap().ptr_eq(&ax));
    assert!(axy.is_within(&root));
    assert!(!a.is_within(&ax));

    let t = axy.create("job").unwrap();
    assert_eq!(t.full_type(), "a.x.y.job");
    assert_eq!(t.scoped_type(), "job");
}

#[test]
fn test_find_all_from_root() {
    let root = Scope::root();
    let c1 = root.context("foo.bar.common").unwrap();
    let c12 = c1.context("har.deeper").unwrap();
    let c2 = root.context("foo.bar.common").unwrap();

    for scope in [&c1, &c2, &c12] {
        for _ in 0..3 {
            scope.create("test").unwrap();
        }
    }

    assert_eq!(root.task_count(), 9);
    assert_eq!(count(&root, "*"), 9);
    assert_eq!(count(&root, "foo.bar.*"), 9);
    assert_eq!(count(&root, "foo*"), 9);
    assert_eq!(count(&root, "*test"), 9);
    assert_eq!(count(&root, "*test2"), 0);
    assert_eq!(count(&c1, "*"), 6);
}

#[test]
fn test_find_mine_others_all() {
    let root = Scope::root();
    let c1 = root.context("foo.bar.common").unwrap();
    let c2 = root.context("foo.bar.common").unwrap();

    for _ in 0..3 {
        c1.create("test").unwrap();
    }
    for _ in 0..6 {
        c2.create("test").unwrap();
    }

    assert_eq!(root.tasks().len(), 9);
    assert_eq!(count(&c1, "test"), 3);
    assert_eq!(count(&c2, "test"), 6);
    assert_eq!(count(&c2, "test [all]"), 9);
    assert_eq!(count(&c2, "test [mine]"), 6);
    assert_eq!(count(&c2, "test [others]"), 3);
}

#[test]
fn test_find_scheduled_running() {
    let root = Scope::root();
    root.capture("*.delayed").unwrap();

    let c1 = root.context("foo.bar.common").unwrap();
    let c2 = root.context("foo.bar.common").unwrap();

    for _ in 0..3 {
        c1.schedule("test").unwrap();
    }
    c1.schedule("test.delayed").unwrap();
    for _ in 0..4 {
        c2.schedule("test.delayed").unwrap();
    }
    for _ in 0..2 {
        c2.schedule("test").unwrap();
    }

    assert_eq!(root.task_count(), 10);
    assert_eq!(count(&c1, "test*"), 4);
    assert_eq!(count(&c2, "test*"), 6);
    assert_eq!(count(&c2, "test* [mine, scheduled]"), 4);
    assert_eq!(count(&c2, "test* [mine, running]"), 2);
    assert_eq!(count(&c2, "test* [others, running]"), 3);
    assert_eq!(count(&c2, "test* [all, running]"), 5);
    assert_eq!(count(&c2, "test* [running, all]"), 5);
}

#[test]
fn test_find_returns_oldest_first() {
    let root = Scope::root();
    let ids: Vec<_> = (0..4)
        .map(|i| root.create(&format!("job.n{i}")).unwrap().id())
        .collect();
    let found: Vec<_> = root.find("job.*").unwrap().iter().map(Task::id).collect();
    assert_eq!(found, ids);
}

#[test]
fn test_registry_shrinks_on_settlement() {
    let root = Scope::root();
    let tasks: Vec<Task> = (0..5).map(|_| root.create("job").unwrap()).collect();
    assert_eq!(root.task_count(), 5);

    tasks[0].resolve();
    tasks[1].reject(Rejection::reason("boom"));
    assert_eq!(root.task_count(), 3);
    assert!(root.tasks().iter().all(|t| !t.is_settled()));

    // first writer wins, the entry is removed only once
    assert!(!tasks[0].reject(Rejection::Canceled));
    assert_eq!(tasks[0].deferred().outcome(), Some(Ok(())));
    assert_eq!(root.task_count(), 3);
}

#[test]
fn test_cancel_rejects_every_match() {
    let root = Scope::root();
    let a = root.context("a").unwrap();
    let canceled = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let c = Arc::clone(&canceled);
        a.create("job").unwrap().fail(move |r| {
            if r.is_canceled() {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
    }
    let other = a.create("other").unwrap();

    assert_eq!(a.cancel("job").unwrap(), 4);
    assert_eq!(canceled.load(Ordering::SeqCst), 4);
    assert_eq!(root.task_count(), 1);
    assert!(!other.is_settled());
    assert_eq!(a.cancel("job").unwrap(), 0);
}

#[test]
fn test_forget_and_remember() {
    let root = Scope::root();
    let first = root.create("first").unwrap();
    let second = root.create("second").unwrap();

    root.remember(&first);
    let order: Vec<_> = root.tasks().iter().map(|t| t.id()).collect();
    assert_eq!(order, vec![second.id(), first.id()]);

    assert!(root.forget(&first));
    assert!(!root.forget(&first));
    assert_eq!(root.task_count(), 1);
    assert!(!first.is_settled());

    // settling a forgotten task is harmless
    first.resolve();
    assert_eq!(root.task_count(), 1);
}

#[test]
fn test_invalid_inputs_fail_fast() {
    let root = Scope::root();
    assert!(matches!(
        root.create("Bad"),
        Err(ScopeError::InvalidType { .. })
    ));
    assert!(matches!(root.create(""), Err(ScopeError::InvalidType { .. })));
    assert!(matches!(
        root.context("A"),
        Err(ScopeError::InvalidScope { .. })
    ));
    assert!(matches!(
        root.find("job [bogus]"),
        Err(ScopeError::InvalidSelector { .. })
    ));
    assert!(matches!(
        root.capture("job [running, scheduled]"),
        Err(ScopeError::InvalidSelector { .. })
    ));
    assert!(matches!(
        root.schedule("Nope"),
        Err(ScopeError::InvalidType { .. })
    ));
    assert_eq!(root.task_count(), 0);
}

#[test]
fn test_allowed_walks_owner_chain_with_rescoped_types() {
    let root = Scope::root();
    let a = root.context("a").unwrap();
    let ax = a.context("x").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    for scope in [&root, &a, &ax] {
        let seen = Arc::clone(&seen);
        let name = scope.full_name().to_string();
        scope.add_scheduler(SchedulerFn::arc("recorder", move |t: &str| {
            seen.lock().unwrap().push(format!("{name}:{t}"));
            Verdict::Accept
        }));
    }

    assert!(ax.allowed("job").is_accept());
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["a.x:job", "a:x.job", ":a.x.job"]
    );
}

#[test]
fn test_first_local_refusal_short_circuits() {
    let root = Scope::root();
    let later = Arc::new(AtomicUsize::new(0));
    let owner_calls = Arc::new(AtomicUsize::new(0));

    let oc = Arc::clone(&owner_calls);
    root.add_scheduler(SchedulerFn::arc("owner", move |_: &str| {
        oc.fetch_add(1, Ordering::SeqCst);
        Verdict::Accept
    }));

    let a = root.context("a").unwrap();
    a.add_scheduler(SchedulerFn::arc("never", |_: &str| Verdict::refuse()));
    let l = Arc::clone(&later);
    a.add_scheduler(SchedulerFn::arc("later", move |_: &str| {
        l.fetch_add(1, Ordering::SeqCst);
        Verdict::Accept
    }));

    assert_eq!(a.allowed("job"), Verdict::Refuse(Rejection::Refused));
    assert_eq!(later.load(Ordering::SeqCst), 0);
    assert_eq!(owner_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_refusal_reaches_task_and_request() {
    let root = Scope::root();
    root.add_scheduler(SchedulerFn::arc("frozen", |t: &str| {
        if t.starts_with("db.") {
            Verdict::from("frozen")
        } else {
            Verdict::Accept
        }
    }));
    let db = root.context("db").unwrap();

    let failed = Arc::new(Mutex::new(None));
    let f = Arc::clone(&failed);
    let task = db.create("migrate").unwrap();
    task.fail(move |r| *f.lock().unwrap() = Some(r.clone()));

    let request = db.schedule(&task).unwrap();
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::reason("frozen")));
    assert_eq!(*failed.lock().unwrap(), Some(Rejection::reason("frozen")));
    assert_eq!(task.status(), TaskStatus::Settled);
    assert_eq!(root.task_count(), 0);
}

#[test]
fn test_deferred_votes_are_joined() {
    let root = Scope::root();
    let a = root.context("a").unwrap();
    let local: Deferred<()> = Deferred::new();
    let upper: Deferred<()> = Deferred::new();

    let l = local.clone();
    a.add_scheduler(SchedulerFn::arc("local", move |_: &str| Verdict::Defer(l.clone())));
    let u = upper.clone();
    root.add_scheduler(SchedulerFn::arc("upper", move |_: &str| Verdict::Defer(u.clone())));

    let request = a.schedule("job").unwrap();
    let task = a.find("job").unwrap().remove(0);
    assert_eq!(task.status(), TaskStatus::Scheduled);
    assert!(task.is_awaiting_admission());

    local.resolve(());
    assert!(!request.is_settled());
    upper.resolve(());

    let admitted = request.outcome().unwrap().unwrap();
    assert!(admitted.ptr_eq(&task));
    assert_eq!(task.status(), TaskStatus::Running);
    assert!(!task.is_awaiting_admission());
}

#[test]
fn test_deferred_refusal_rejects_task() {
    let root = Scope::root();
    let vote: Deferred<()> = Deferred::new();
    let v = vote.clone();
    root.add_scheduler(SchedulerFn::arc("slow", move |_: &str| Verdict::Defer(v.clone())));

    let request = root.schedule("job").unwrap();
    let task = root.find("job").unwrap().remove(0);
    vote.reject(Rejection::reason("quota"));

    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::reason("quota")));
    assert_eq!(task.rejection(), Some(Rejection::reason("quota")));
    assert_eq!(root.task_count(), 0);
}

#[test]
fn test_cancel_during_admission_never_runs() {
    let root = Scope::root();
    let vote: Deferred<()> = Deferred::new();
    let v = vote.clone();
    root.add_scheduler(SchedulerFn::arc("slow", move |_: &str| Verdict::Defer(v.clone())));

    let request = root.schedule("job").unwrap();
    let task = root.find("job [scheduled]").unwrap().remove(0);
    let ran = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ran);
    request.done(move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(root.cancel("job").unwrap(), 1);
    vote.resolve(());

    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::Canceled));
    assert_eq!(task.status(), TaskStatus::Settled);
    assert_eq!(task.rejection(), Some(Rejection::Canceled));
}

#[test]
fn test_cancel_then_deferred_refusal_keeps_first_reason() {
    let root = Scope::root();
    let vote: Deferred<()> = Deferred::new();
    let v = vote.clone();
    root.add_scheduler(SchedulerFn::arc("slow", move |_: &str| Verdict::Defer(v.clone())));

    let request = root.schedule("job").unwrap();
    let task = root.find("job").unwrap().remove(0);
    root.cancel("job").unwrap();
    vote.reject(Rejection::reason("late"));

    assert_eq!(task.rejection(), Some(Rejection::Canceled));
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::reason("late")));
}

#[test]
fn test_capture_release_is_fifo() {
    let root = Scope::root();
    root.capture("*").unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    for x in (0..10).rev() {
        let log = Arc::clone(&log);
        root.schedule(format!("sample.task.{x}"))
            .unwrap()
            .done(move |task| {
                log.lock().unwrap().push(x);
                task.resolve();
            });
    }

    assert_eq!(count(&root, "sample.task.*"), 10);
    let all = root.when("sample.task.*").unwrap();
    assert!(log.lock().unwrap().is_empty());

    assert_eq!(root.release("*").unwrap(), 10);
    assert_eq!(*log.lock().unwrap(), (0..10).rev().collect::<Vec<_>>());
    assert!(all.is_resolved());
    assert!(root.is_idle());
}

#[test]
fn test_same_type_requests_share_one_gate() {
    let root = Scope::root();
    root.capture("job").unwrap();

    let first = root.schedule("job").unwrap();
    let second = root.schedule("job").unwrap();
    assert_eq!(root.release("job").unwrap(), 1);
    assert!(first.is_resolved());
    assert!(second.is_resolved());
}

#[test]
fn test_ancestor_capture_holds_descendants() {
    let root = Scope::root();
    let a = root.context("a").unwrap();
    let ax = a.context("x").unwrap();
    a.capture("x.*").unwrap();

    let held = ax.schedule("job").unwrap();
    let free = a.schedule("job").unwrap();
    assert!(!held.is_settled());
    assert!(free.is_resolved());

    assert_eq!(a.release("other").unwrap(), 0);
    assert!(!held.is_settled());
    assert_eq!(a.capture_count(), 1);

    assert_eq!(a.release("x.*").unwrap(), 1);
    assert_eq!(held.outcome().unwrap().unwrap().status(), TaskStatus::Running);
}

#[test]
fn test_overlapping_captures_keep_holding() {
    let root = Scope::root();
    root.capture("*").unwrap();
    root.capture("job*").unwrap();

    let request = root.schedule("job").unwrap();
    assert_eq!(root.release("*").unwrap(), 0);
    assert!(!request.is_settled());
    assert_eq!(root.capture_count(), 1);

    assert_eq!(root.release("job*").unwrap(), 1);
    assert!(request.is_resolved());
}

#[test]
fn test_universal_release_clears_all_captures() {
    let root = Scope::root();
    root.capture("a*").unwrap();
    root.capture("b*").unwrap();
    let a = root.schedule("alpha").unwrap();
    let b = root.schedule("beta").unwrap();

    assert_eq!(root.release("*").unwrap(), 2);
    assert_eq!(root.capture_count(), 0);
    assert!(a.is_resolved() && b.is_resolved());
}

#[test]
fn test_reschedule_existing_task() {
    let root = Scope::root();
    let task = root.create("job").unwrap();
    assert_eq!(task.status(), TaskStatus::Running);

    root.capture("job").unwrap();
    let request = root.schedule(task.clone()).unwrap();
    assert_eq!(task.status(), TaskStatus::Scheduled);

    root.release("job").unwrap();
    assert!(request.outcome().unwrap().unwrap().ptr_eq(&task));
    assert_eq!(task.status(), TaskStatus::Running);
    assert_eq!(root.task_count(), 1);
}

#[test]
fn test_rescheduling_settled_task_rejects_request() {
    let root = Scope::root();

    let canceled = root.create("job").unwrap();
    canceled.reject(Rejection::Canceled);
    let request = root.schedule(&canceled).unwrap();
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::Canceled));
    assert_eq!(canceled.status(), TaskStatus::Settled);

    let finished = root.create("job").unwrap();
    finished.resolve();
    let request = root.schedule(&finished).unwrap();
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::Settled));
    assert_eq!(finished.status(), TaskStatus::Settled);
}

#[test]
fn test_cancel_inside_scheduler_rejects_request() {
    let root = Scope::root();
    let r = root.clone();
    root.add_scheduler(SchedulerFn::arc("canceler", move |_: &str| {
        r.cancel("job").unwrap();
        Verdict::Accept
    }));

    let ran = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&ran);
    let request = root.schedule("job").unwrap();
    request.done(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::Canceled));
    assert!(root.is_idle());
}

#[test]
fn test_release_counts_gates_of_refused_requests() {
    let root = Scope::root();
    root.capture("job").unwrap();
    root.add_scheduler(SchedulerFn::arc("deny", |_: &str| {
        Verdict::Refuse(Rejection::reason("denied"))
    }));

    let request = root.schedule("job").unwrap();
    assert_eq!(request.outcome().unwrap().err(), Some(Rejection::reason("denied")));
    assert!(root.is_idle());

    assert_eq!(root.release("job").unwrap(), 1);
    assert_eq!(root.release("job").unwrap(), 0);
}

#[test]
fn test_when_waits_for_scheduling_requests() {
    let root = Scope::root();
    root.capture("job*").unwrap();

    let requests = vec![root.schedule("job.a").unwrap(), root.schedule("job.b").unwrap()];
    let both = root.when(requests.clone()).unwrap();
    assert!(!both.is_settled());

    root.release("job*").unwrap();
    assert!(requests.iter().all(|r| r.is_resolved()));
    assert!(both.is_resolved());
}

#[test]
fn test_when_inputs() {
    let root = Scope::root();
    assert!(root.when("nothing.*").unwrap().is_resolved());

    let a = root.create("a").unwrap();
    let b = root.create("b").unwrap();
    let both = root.when(vec![a.clone(), b.clone()]).unwrap();
    a.resolve();
    assert!(!both.is_settled());
    b.reject(Rejection::reason("b failed"));
    assert_eq!(both.outcome(), Some(Err(Rejection::reason("b failed"))));

    let d: Deferred<()> = Deferred::new();
    let w = root.when(vec![d.clone()]).unwrap();
    d.resolve(());
    assert!(w.is_resolved());

    assert!(root.when("x [nope]").is_err());
}

#[tokio::test]
async fn test_await_deferred_admission() {
    let root = Scope::root();
    root.capture("slow").unwrap();

    let request = root.schedule("slow").unwrap();
    let waiter = tokio::spawn(async move { request.await });
    tokio::task::yield_now().await;

    root.release("slow").unwrap();
    let task = waiter.await.unwrap().unwrap();
    assert_eq!(task.full_type(), "slow");
}

#[derive(Default)]
struct Recorder(Mutex<Vec<EventKind>>);

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.0.lock().unwrap().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn test_coordinator_delivers_events_before_shutdown() {
    let rec = Arc::new(Recorder::default());
    let coord = Coordinator::builder(Config::default())
        .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
        .build();

    let a = coord.root().context("a").unwrap();
    a.capture("job").unwrap();
    let request = a.schedule("job").unwrap();
    a.release("job").unwrap();
    request.outcome().unwrap().unwrap().resolve();
    coord.shutdown().await;

    let kinds = rec.0.lock().unwrap().clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::ScopeCreated,
            EventKind::CaptureAdded,
            EventKind::TaskCreated,
            EventKind::TaskScheduled,
            EventKind::GateHeld,
            EventKind::TaskDeferred,
            EventKind::CaptureReleased,
            EventKind::GateOpened,
            EventKind::TaskAdmitted,
            EventKind::TaskResolved,
        ]
    );
}

#[tokio::test]
async fn test_muted_coordinator_publishes_nothing() {
    let cfg = Config {
        events: false,
        ..Config::default()
    };
    let coord = Coordinator::builder(cfg).build();
    let mut rx = coord.subscribe();
    coord.root().create("job").unwrap().resolve();
    assert!(rx.try_recv().is_err());
    coord.shutdown().await;
}

use super::*;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;

#[derive(Debug, PartialEq, Eq)]
struct Marker(u32);

impl DebugInfo for Marker {
    const KIND: DebugInfoKind = DebugInfoKind::TestInfo;
}

#[derive(Debug, PartialEq, Eq)]
struct Label(&'static str);

impl DebugInfo for Label {
    const KIND: DebugInfoKind = DebugInfoKind::TestInfo2;
}

#[derive(Debug)]
struct ProducerTag(&'static str);

impl DebugInfo for ProducerTag {
    const KIND: DebugInfoKind = DebugInfoKind::ProducerInfo;
}

fn marker() -> Option<u32> {
    get_as::<Marker>().map(|m| m.0)
}

fn label() -> Option<&'static str> {
    get_as::<Label>().map(|l| l.0)
}

/// Runs `f` on a fresh thread so a deliberate panic cannot leave frames
/// behind on the test harness thread.
fn on_fresh_thread<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::spawn(f)
        .join()
        .expect("test thread should not panic")
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_default()
}

#[test]
fn empty_stack_lookup_is_absent() {
    on_fresh_thread(|| {
        for kind in DebugInfoKind::ALL {
            assert!(get(kind).is_none(), "{kind} should be absent");
        }
        assert!(current().is_empty());
        assert_eq!(current().depth(), 0);
    });
}

#[test]
fn nested_guards_innermost_wins_and_everything_is_restored() {
    on_fresh_thread(|| {
        let mut guards = Vec::new();
        guards.push(DebugInfoGuard::new(Arc::new(Marker(1))));
        guards.push(DebugInfoGuard::new(Arc::new(Label("outer"))));
        guards.push(DebugInfoGuard::new(Arc::new(Marker(2))));
        guards.push(DebugInfoGuard::new(Arc::new(ProducerTag("model-a"))));

        assert_eq!(marker(), Some(2));
        assert_eq!(label(), Some("outer"));
        assert_eq!(
            get_as::<ProducerTag>().map(|p| p.0),
            Some("model-a")
        );
        assert!(get(DebugInfoKind::ProfilerState).is_none());
        assert_eq!(current().depth(), 4);

        // Vec drops front to back, which would be outermost first.
        while let Some(guard) = guards.pop() {
            drop(guard);
        }

        for kind in DebugInfoKind::ALL {
            assert!(get(kind).is_none(), "{kind} should be absent after all guards");
        }
    });
}

#[test]
fn same_kind_shadows_and_unshadows() {
    on_fresh_thread(|| {
        let _outer = DebugInfoGuard::new(Arc::new(Marker(1)));
        {
            let _inner = DebugInfoGuard::new(Arc::new(Marker(2)));
            assert_eq!(marker(), Some(2));
        }
        assert_eq!(marker(), Some(1));
    });
}

#[test]
fn untyped_get_returns_the_pushed_payload() {
    on_fresh_thread(|| {
        let payload: Arc<dyn DebugInfoBase> = Arc::new(Marker(7));
        let _guard = DebugInfoGuard::with_kind(DebugInfoKind::TestInfo, Arc::clone(&payload));
        let found = get(DebugInfoKind::TestInfo).expect("payload should be present");
        assert!(Arc::ptr_eq(&found, &payload));
    });
}

#[test]
fn snapshot_round_trip_restores_lookups() {
    on_fresh_thread(|| {
        let _a = DebugInfoGuard::new(Arc::new(Marker(1)));
        let _b = DebugInfoGuard::new(Arc::new(Label("captured")));
        let snapshot = current();

        let _c = DebugInfoGuard::new(Arc::new(Marker(2)));
        let _d = DebugInfoGuard::new(Arc::new(ProducerTag("later")));
        assert_eq!(marker(), Some(2));

        {
            let _restored = DebugInfoGuard::install(snapshot.clone());
            assert_eq!(marker(), Some(1));
            assert_eq!(label(), Some("captured"));
            assert!(get(DebugInfoKind::ProducerInfo).is_none());
            assert!(current().ptr_eq(&snapshot));
        }

        assert_eq!(marker(), Some(2));
        assert_eq!(get_as::<ProducerTag>().map(|p| p.0), Some("later"));
    });
}

#[test]
fn snapshot_is_unaffected_by_later_pushes() {
    on_fresh_thread(|| {
        let snapshot = current();
        let _guard = DebugInfoGuard::new(Arc::new(Marker(1)));
        assert!(snapshot.is_empty());
        assert!(snapshot.lookup(DebugInfoKind::TestInfo).is_none());
        assert_eq!(current().lookup_as::<Marker>().map(|m| m.0), Some(1));
    });
}

#[test]
fn cross_thread_inheritance_does_not_leak_back() {
    on_fresh_thread(|| {
        let _x = DebugInfoGuard::new(Arc::new(Marker(10)));
        let snapshot = current();
        let (done_tx, done_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel::<()>();

        let child = std::thread::spawn(move || {
            let _inherited = DebugInfoGuard::install(snapshot);
            let inherited = marker();
            let _y = DebugInfoGuard::new(Arc::new(Marker(20)));
            done_tx.send(()).expect("parent should be listening");
            resume_rx.recv().expect("parent should resume child");
            (inherited, marker())
        });

        done_rx.recv().expect("child should signal");
        // The child's Y is active right now; the parent must still see X.
        assert_eq!(marker(), Some(10));
        resume_tx.send(()).expect("child should be waiting");

        let (inherited, overridden) = child.join().expect("child should not panic");
        assert_eq!(inherited, Some(10));
        assert_eq!(overridden, Some(20));
        assert_eq!(marker(), Some(10));
    });
}

#[test]
fn thread_spawn_inherits_current_stack() {
    on_fresh_thread(|| {
        let _guard = DebugInfoGuard::new(Arc::new(Label("parent")));
        let seen = thread::spawn(label).join().expect("child should not panic");
        assert_eq!(seen, Some("parent"));

        let named = thread::spawn_named("lineage-child", || {
            (std::thread::current().name().map(str::to_owned), label())
        })
        .expect("thread should spawn")
        .join()
        .expect("child should not panic");
        assert_eq!(named, (Some("lineage-child".to_owned()), Some("parent")));
    });
}

#[test]
fn many_threads_read_one_snapshot() {
    on_fresh_thread(|| {
        let _guard = DebugInfoGuard::new(Arc::new(Marker(42)));
        let handles: Vec<_> = (0..8).map(|_| thread::spawn(marker)).collect();
        for handle in handles {
            assert_eq!(handle.join().expect("reader should not panic"), Some(42));
        }
    });
}

#[test]
fn mismatched_pop_leaves_stack_unchanged() {
    on_fresh_thread(|| {
        let _guard = DebugInfoGuard::new(Arc::new(Marker(1)));
        let before = current();

        let err = DebugInfoStack::pop(DebugInfoKind::TestInfo2).expect_err("pop should fail");
        assert_eq!(
            err,
            DebugInfoError::MismatchedKind {
                expected: DebugInfoKind::TestInfo2,
                found: DebugInfoKind::TestInfo,
            }
        );
        assert!(current().ptr_eq(&before));
        assert_eq!(marker(), Some(1));
    });
}

#[test]
fn pop_on_empty_stack_is_an_error() {
    on_fresh_thread(|| {
        let err = DebugInfoStack::pop(DebugInfoKind::ProfilerState).expect_err("pop should fail");
        assert_eq!(
            err,
            DebugInfoError::EmptyStack {
                expected: DebugInfoKind::ProfilerState
            }
        );
    });
}

#[test]
fn raw_push_and_pop_return_handles_and_payloads() {
    on_fresh_thread(|| {
        let pushed = DebugInfoStack::push(DebugInfoKind::TestInfo, Arc::new(Marker(3)));
        assert!(pushed.ptr_eq(&current()));
        assert_eq!(pushed.depth(), 1);

        let popped = DebugInfoStack::pop(DebugInfoKind::TestInfo).expect("pop should succeed");
        assert_eq!(format!("{popped:?}"), "Marker(3)");
        assert!(current().is_empty());
        // The handle taken before the pop still reaches the frame.
        assert_eq!(pushed.lookup_as::<Marker>().map(|m| m.0), Some(3));
    });
}

#[test]
fn force_current_returns_displaced_stack() {
    on_fresh_thread(|| {
        let pushed = DebugInfoStack::push(DebugInfoKind::TestInfo, Arc::new(Marker(5)));
        let displaced = DebugInfoStack::force_current(DebugInfoStack::EMPTY);
        assert!(displaced.ptr_eq(&pushed));
        assert!(marker().is_none());
        drop(DebugInfoStack::force_current(displaced));
        assert_eq!(marker(), Some(5));
        drop(DebugInfoStack::force_current(DebugInfoStack::default()));
    });
}

#[test]
fn out_of_order_drop_panics() {
    let message = on_fresh_thread(|| {
        let result = catch_unwind(|| {
            let outer = DebugInfoGuard::new(Arc::new(Marker(1)));
            let _inner = DebugInfoGuard::new(Arc::new(Marker(2)));
            drop(outer);
        });
        panic_message(result.expect_err("dropping the outer guard first should panic"))
    });
    assert!(message.contains("LIFO"), "unexpected panic message: {message}");
}

#[test]
fn guard_restores_while_unwinding() {
    on_fresh_thread(|| {
        let _outer = DebugInfoGuard::new(Arc::new(Marker(1)));
        let result: std::thread::Result<()> = catch_unwind(|| {
            let _inner = DebugInfoGuard::new(Arc::new(Marker(2)));
            let _label = DebugInfoGuard::new(Arc::new(Label("doomed")));
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(marker(), Some(1));
        assert!(label().is_none());
    });
}

#[test]
fn misuse_during_unwinding_falls_back_to_previous_stack() {
    on_fresh_thread(|| {
        let result: std::thread::Result<()> = catch_unwind(|| {
            let _outer = DebugInfoGuard::new(Arc::new(Marker(1)));
            let leaked = DebugInfoGuard::new(Arc::new(Marker(2)));
            std::mem::forget(leaked);
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(current().is_empty());
    });
}

#[test]
fn whole_stack_guard_detects_leaked_inner_guard() {
    let message = on_fresh_thread(|| {
        let result = catch_unwind(|| {
            let _installed = DebugInfoGuard::install(DebugInfoStack::EMPTY);
            std::mem::forget(DebugInfoGuard::new(Arc::new(Marker(9))));
        });
        panic_message(result.expect_err("leaked inner guard should be detected"))
    });
    assert!(message.contains("whole-stack"), "unexpected panic message: {message}");
}

#[test]
fn typed_lookup_rejects_wrong_payload_type() {
    on_fresh_thread(|| {
        let _guard = DebugInfoGuard::with_kind(DebugInfoKind::TestInfo, Arc::new(Label("odd")));

        let err = DebugInfoStack::try_get_as::<Marker>().expect_err("type mismatch expected");
        assert!(matches!(
            err,
            DebugInfoError::PayloadType {
                kind: DebugInfoKind::TestInfo,
                expected,
                found,
            } if expected.ends_with("Marker") && found.ends_with("Label")
        ));

        let result = catch_unwind(AssertUnwindSafe(|| get_as::<Marker>()));
        let message = panic_message(result.expect_err("get_as should panic"));
        assert!(message.contains("TEST_INFO"), "unexpected panic message: {message}");
    });
}

#[test]
fn scoped_helpers_restore_on_return() {
    on_fresh_thread(|| {
        let inside = with_debug_info(Arc::new(Marker(4)), marker);
        assert_eq!(inside, Some(4));
        assert!(marker().is_none());

        let snapshot = with_debug_info(Arc::new(Label("snap")), current);
        assert_eq!(with_stack(snapshot, label), Some("snap"));
        assert!(label().is_none());
    });
}

#[test]
fn dump_lists_frames_innermost_first() {
    on_fresh_thread(|| {
        let _a = DebugInfoGuard::new(Arc::new(Marker(1)));
        let _b = DebugInfoGuard::new(Arc::new(Label("top")));

        let dump = current().dump();
        assert_eq!(dump.frames.len(), 2);
        assert_eq!(dump.frames[0].kind, DebugInfoKind::TestInfo2);
        assert!(dump.frames[0].type_name.ends_with("Label"));
        assert_eq!(dump.frames[0].debug, "Label(\"top\")");
        assert_eq!(dump.frames[1].kind, DebugInfoKind::TestInfo);

        let json = dump.to_json().expect("dump should serialize");
        assert!(json.contains("frames"), "unexpected json: {json}");
        assert!(json.contains("Marker(1)"), "unexpected json: {json}");
    });
}

#[test]
fn kinds_display_in_screaming_snake_case() {
    assert_eq!(DebugInfoKind::ProducerInfo.to_string(), "PRODUCER_INFO");
    assert_eq!(DebugInfoKind::MobileRuntimeInfo.to_string(), "MOBILE_RUNTIME_INFO");
    assert_eq!(DebugInfoKind::TestInfo2.to_string(), "TEST_INFO_2");
}

#[derive(Debug)]
struct ReportOnDrop(mpsc::Sender<(usize, bool)>);

impl Drop for ReportOnDrop {
    fn drop(&mut self) {
        let _ = self.0.send((current().depth(), get(DebugInfoKind::TestInfo).is_none()));
    }
}

impl DebugInfo for ReportOnDrop {
    const KIND: DebugInfoKind = DebugInfoKind::TestInfo;
}

#[test]
fn payload_dropped_during_thread_exit_sees_empty_stack() {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        // Left on the stack so it is released with the thread-local itself.
        drop(DebugInfoStack::push(
            DebugInfoKind::TestInfo,
            Arc::new(ReportOnDrop(tx)),
        ));
    })
    .join()
    .expect("thread should exit cleanly");
    assert_eq!(rx.recv().expect("payload should be dropped"), (0, true));
}

#[test]
fn snapshots_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DebugInfoStack>();
    assert_send_sync::<StackDump>();
}

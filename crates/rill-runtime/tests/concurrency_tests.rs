//! Concurrency tests: `parallel` tasks, the task registry, and the
//! per-value lock discipline.

use rill_runtime::{Interpreter, Value};

fn run(source: &str) -> Value {
    Interpreter::default()
        .run(source, "conc.rill")
        .expect("program should evaluate")
}

#[test]
fn test_parallel_task_shares_scope() {
    let value = run(
        "val data = [0]\n\
         parallel { data[0] = 7 }\n\
         wait\n\
         data[0]",
    );
    assert_eq!(value, Value::Number(7.0));
}

#[test]
fn test_wait_blocks_until_tasks_finish() {
    // Several tasks each append through the shared handle; after `wait`
    // every append must be visible.
    let value = run(
        "val data = [0]\n\
         loop (val i = 0; i < 8; i = i + 1) parallel { data + 1; }\n\
         wait\n\
         size data",
    );
    assert_eq!(value, Value::Number(9.0));
}

#[test]
fn test_uncaught_throw_in_task_does_not_cancel_siblings() {
    let value = run(
        "val data = [0]\n\
         parallel { throw \"task failure\"; }\n\
         parallel { data[0] = 3 }\n\
         wait\n\
         data[0]",
    );
    assert_eq!(value, Value::Number(3.0));
}

#[test]
fn test_driver_drains_tasks_before_reporting() {
    // The uncaught top-level throw must not abandon the running task:
    // by the time the diagnostic is produced the task has completed.
    let interpreter = Interpreter::default();
    let diagnostic = interpreter
        .run(
            "val data = [0]\n\
             parallel { data[0] = 1 }\n\
             throw \"stop\"",
            "drain.rill",
        )
        .expect_err("top-level throw should surface");
    assert_eq!(diagnostic.message, "stop");

    let after = interpreter.run("data[0]", "after.rill").unwrap();
    assert_eq!(after, Value::Number(1.0));
}

#[test]
fn test_locked_read_modify_write_never_loses_updates() {
    // Two tasks increment a shared counter 25 times each under `lock`;
    // the final value must be exactly 50.
    let value = run(
        "val counter = 0\n\
         val worker = func() loop (val i = 0; i < 25; i = i + 1) lock (counter) counter = counter + 1\n\
         parallel worker()\n\
         parallel worker()\n\
         wait\n\
         counter",
    );
    assert_eq!(value, Value::Number(50.0));
}

#[test]
fn test_locks_on_different_values_do_not_serialize() {
    // Independent values take independent locks; both tasks finish.
    let value = run(
        "val a = 0\n\
         val b = 0\n\
         parallel lock (a) a = a + 1\n\
         parallel lock (b) b = b + 1\n\
         wait\n\
         a + b",
    );
    assert_eq!(value, Value::Number(2.0));
}

#[test]
fn test_lock_releases_on_signal_path() {
    // The first lock body throws; the lock must still be released so the
    // later lock can be taken.
    let value = run(
        "val shared = 0\n\
         catch { lock (shared) { throw \"inside\"; } } handle e { 0 }\n\
         lock (shared) shared = shared + 1\n\
         shared",
    );
    assert_eq!(value, Value::Number(1.0));
}

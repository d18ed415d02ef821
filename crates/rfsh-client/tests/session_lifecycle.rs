//! Session lifecycle and concurrency tests: guard serializability,
//! keep-alive probe timing, orderly shutdown.

mod common;

use std::time::Duration;

use common::{docs_tree, ScriptedPrompter};

use rfsh_client::{CommandOutput, SessionController, Step};
use rfsh_core::guard::SharedConnection;
use rfsh_core::keepalive::{Keepalive, KeepaliveConfig, KeepaliveTimer};
use rfsh_core::settings::Settings;
use rfsh_test_utils::StubClient;

fn fast_config(full_ms: u64, poll_ms: u64) -> KeepaliveConfig {
    KeepaliveConfig {
        full_interval: Duration::from_millis(full_ms),
        poll_interval: Duration::from_millis(poll_ms),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn round_trips_never_overlap_across_both_tasks() {
    let stub = docs_tree().with_op_delay(Duration::from_millis(10));
    let journal = stub.journal();
    let conn = SharedConnection::new(stub, KeepaliveTimer::new(fast_config(10, 5)));

    // Background prober plus two foreground tasks hammering the guard.
    let keepalive = Keepalive::spawn(conn.clone());
    let fg1 = {
        let conn = conn.clone();
        tokio::spawn(async move {
            for _ in 0..8 {
                conn.info("/").await.unwrap();
            }
        })
    };
    let fg2 = {
        let conn = conn.clone();
        tokio::spawn(async move {
            for _ in 0..8 {
                conn.read_dir("/docs").await.unwrap();
            }
        })
    };

    fg1.await.unwrap();
    fg2.await.unwrap();
    keepalive.stop().await;

    assert!(journal.records().len() >= 16);
    assert!(
        journal.overlapping().is_none(),
        "overlapping round-trips: {:?}",
        journal.overlapping()
    );
}

#[tokio::test(start_paused = true)]
async fn idle_session_probes_once_per_full_interval() {
    let stub = docs_tree();
    let journal = stub.journal();
    let conn = SharedConnection::new(stub, KeepaliveTimer::new(fast_config(50, 10)));

    let keepalive = Keepalive::spawn(conn.clone());
    // Two full intervals of inactivity.
    tokio::time::sleep(Duration::from_millis(105)).await;
    keepalive.stop().await;

    let probes = journal.count("ping");
    assert!(
        (2..=3).contains(&probes),
        "expected one probe per interval, got {probes}"
    );
}

#[tokio::test(start_paused = true)]
async fn foreground_activity_suppresses_probes() {
    let stub = docs_tree();
    let journal = stub.journal();
    let conn = SharedConnection::new(stub, KeepaliveTimer::new(fast_config(50, 10)));

    let keepalive = Keepalive::spawn(conn.clone());
    // A successful foreground round-trip on every tick keeps the
    // countdown topped up; the scheduler must stay quiet.
    for _ in 0..12 {
        tokio::time::sleep(Duration::from_millis(9)).await;
        conn.info("/").await.unwrap();
    }
    keepalive.stop().await;

    assert_eq!(journal.count("ping"), 0);
    assert_eq!(journal.count("info"), 12);
}

#[tokio::test(start_paused = true)]
async fn failed_probes_are_swallowed_and_retried_next_interval() {
    let stub = docs_tree().with_ping_failure(9, "gone away");
    let journal = stub.journal();
    let conn = SharedConnection::new(stub, KeepaliveTimer::new(fast_config(30, 10)));

    let keepalive = Keepalive::spawn(conn.clone());
    tokio::time::sleep(Duration::from_millis(65)).await;
    keepalive.stop().await;

    // Still exactly one attempt per interval, and the next foreground
    // command is where the failure surfaces.
    let probes = journal.count("ping");
    assert!((2..=3).contains(&probes), "got {probes}");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_scheduler_handle_stops_the_loop() {
    let stub = docs_tree();
    let journal = stub.journal();
    let conn = SharedConnection::new(stub, KeepaliveTimer::new(fast_config(50, 10)));

    let keepalive = Keepalive::spawn(conn.clone());
    drop(keepalive);

    // Well past several full intervals: a leaked loop would probe (or
    // busy-spin) here.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(journal.count("ping"), 0);
}

#[tokio::test(start_paused = true)]
async fn exit_mid_sleep_disconnects_exactly_once_after_scheduler_stops() {
    let stub = docs_tree();
    let journal = stub.journal();
    let mut controller = SessionController::new(stub, Settings::default(), fast_config(50, 10));
    let journal_handle = journal.clone();

    controller.start().await.unwrap();
    // Scheduler is mid-sleep when the user types the exit command.
    tokio::time::sleep(Duration::from_millis(3)).await;

    let mut prompter = ScriptedPrompter::empty();
    let step = controller.handle_line("exit", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Exit);

    controller.shutdown().await;
    controller.shutdown().await;

    assert_eq!(journal_handle.count("disconnect"), 1);
    let records = journal_handle.records();
    assert_eq!(records.last().map(|r| r.op), Some("disconnect"));
}

#[tokio::test]
async fn empty_input_is_a_no_op() {
    let stub = docs_tree();
    let journal = stub.journal();
    let mut controller =
        SessionController::new(stub, Settings::default(), KeepaliveConfig::default());
    let mut prompter = ScriptedPrompter::empty();

    let step = controller.handle_line("   ", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Output(CommandOutput::None));
    assert!(journal.records().is_empty());
}

#[tokio::test]
async fn all_exit_aliases_break_the_loop() {
    let stub = docs_tree();
    let mut controller =
        SessionController::new(stub, Settings::default(), KeepaliveConfig::default());
    let mut prompter = ScriptedPrompter::empty();

    for word in ["exit", "quit", "disconnect", ":q"] {
        let step = controller.handle_line(word, &mut prompter).await.unwrap();
        assert_eq!(step, Step::Exit, "{word}");
    }
}

#[tokio::test]
async fn a_rejected_setting_is_recoverable_and_the_session_continues() {
    let stub = docs_tree();
    let mut controller =
        SessionController::new(stub, Settings::default(), KeepaliveConfig::default());
    let mut prompter = ScriptedPrompter::empty();

    let err = controller
        .handle_line("cfg volume 11", &mut prompter)
        .await
        .unwrap_err();
    // Runtime setting rejections are prompt-level errors, not the
    // startup-class config failures that terminate the process.
    assert!(err.is_recoverable());

    let step = controller.handle_line("pwd", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Output(CommandOutput::Line("/".to_string())));
}

#[tokio::test]
async fn a_failed_command_leaves_the_session_usable() {
    let stub = docs_tree();
    let mut controller =
        SessionController::new(stub, Settings::default(), KeepaliveConfig::default());
    let mut prompter = ScriptedPrompter::empty();

    let err = controller
        .handle_line("cat /nowhere", &mut prompter)
        .await
        .unwrap_err();
    assert!(err.is_recoverable());

    let step = controller.handle_line("pwd", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Output(CommandOutput::Line("/".to_string())));
}

#[tokio::test]
async fn end_to_end_session_scenario() {
    let stub = docs_tree();
    let mut controller =
        SessionController::new(stub, Settings::default(), KeepaliveConfig::default());
    let mut prompter = ScriptedPrompter::empty();

    controller.start().await.unwrap();

    let step = controller.handle_line("cd docs", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Output(CommandOutput::Line("/docs".to_string())));
    assert_eq!(controller.session().cwd, "/docs");

    let step = controller.handle_line("ls", &mut prompter).await.unwrap();
    assert_eq!(
        step,
        Step::Output(CommandOutput::Listing(vec![
            "a.txt".to_string(),
            "sub".to_string(),
        ]))
    );

    let step = controller.handle_line("cd ..", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Output(CommandOutput::Line("/".to_string())));
    assert_eq!(controller.session().cwd, "/");

    let step = controller.handle_line("quit", &mut prompter).await.unwrap();
    assert_eq!(step, Step::Exit);
    controller.shutdown().await;
}

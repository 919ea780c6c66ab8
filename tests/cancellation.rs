mod common;
use crate::common::{init_tracing, options, Harness, RecordingNotifier, ScriptedFetcher};

use std::sync::Arc;
use std::time::Duration;

use changewatch::engine::{poll_source, PollContext, Scheduler};
use changewatch::notify::ReportSink;
use changewatch::source::SourceDescriptor;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_in_flight_fetches() {
    init_tracing();

    let names: Vec<String> = (0..5).map(|i| format!("stuck-{i}.txt")).collect();
    let fetcher = ScriptedFetcher::new();
    for name in &names {
        fetcher.push_hang(name);
    }

    // The fetch timeout is far longer than anything the test waits for.
    let harness = Harness::start(
        names.iter().map(|n| SourceDescriptor::local_file(n)).collect(),
        fetcher,
        RecordingNotifier::new(),
        4,
        options(10, 600),
    );
    sleep(Duration::from_secs(1)).await;

    let started = Instant::now();
    let (summaries, notifier) = harness.stop().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(summaries.len(), 5);
    for summary in &summaries {
        // An abandoned fetch is not a cycle.
        assert_eq!(summary.cycles, 0);
        assert!(!summary.has_baseline);
    }
    assert!(notifier.reports().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_shared_token_stops_every_loop() {
    init_tracing();

    let fetcher = ScriptedFetcher::new();
    fetcher.push_lines("a.txt", &["a"]).push_lines("b.txt", &["b"]);

    let (sink, writer) = ReportSink::spawn(Box::new(RecordingNotifier::new()), 4);
    let cancel = CancellationToken::new();
    let handle = Scheduler::new(
        vec![
            SourceDescriptor::local_file("a.txt"),
            SourceDescriptor::local_file("b.txt"),
        ],
        Arc::new(fetcher),
        sink,
        options(10, 2),
    )
    .spawn(cancel.clone());
    assert_eq!(handle.len(), 2);

    let waiter = tokio::spawn(handle.run_until_cancelled());
    sleep(Duration::from_secs(15)).await;
    cancel.cancel();

    let summaries = waiter.await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|s| s.cycles == 2 && s.has_baseline));

    // Every sink handle is gone once the loops are, so the writer finishes.
    writer.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_start_delay_skips_the_source() {
    init_tracing();

    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.push_lines("late.txt", &["x"]);

    let (sink, _writer) = ReportSink::spawn(Box::new(RecordingNotifier::new()), 4);
    let cancel = CancellationToken::new();
    let ctx = PollContext {
        source: SourceDescriptor::local_file("late.txt"),
        fetcher: fetcher.clone(),
        sink,
        interval: Duration::from_secs(10),
        fetch_timeout: Duration::from_secs(2),
        start_delay: Duration::from_secs(30),
        cancel: cancel.clone(),
    };

    let task = tokio::spawn(poll_source(ctx));
    sleep(Duration::from_secs(5)).await;
    cancel.cancel();

    let summary = task.await.unwrap();
    assert_eq!(summary.cycles, 0);
    assert_eq!(fetcher.calls("late.txt"), 0);
}

#[tokio::test(start_paused = true)]
async fn unbounded_grace_still_shuts_down() {
    init_tracing();

    let fetcher = ScriptedFetcher::new();
    fetcher.push_lines("a.txt", &["a"]).push_hang("a.txt");

    let mut opts = options(10, 600);
    opts.shutdown_grace = Duration::MAX;

    let harness = Harness::start(
        vec![SourceDescriptor::local_file("a.txt")],
        fetcher,
        RecordingNotifier::new(),
        4,
        opts,
    );
    sleep(Duration::from_secs(15)).await;

    let (summaries, _) = harness.stop().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].cycles, 1);
    assert!(summaries[0].has_baseline);
}

//! Integration tests for the full pipeline
//!
//! These tests drive the real stage threads through scripted input:
//! - Filtering and flushing end to end
//! - Sliding-window eviction across a flush
//! - Shutdown on `exit`, end of input, and external cancellation

mod common;

use common::{collect_until, processed_values, test_timeout, ScriptedInput};
use stagepipe::{ChannelSink, FilterKind, PipelineBuilder, PipelineConfig, PipelineEvent};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn config(capacity: usize, interval_ms: u64) -> PipelineConfig {
    PipelineConfig::new(capacity, Duration::from_millis(interval_ms))
}

#[test]
fn test_end_to_end_filter_buffer_and_exit() {
    let (sink, events) = ChannelSink::new();
    let (lines, input) = ScriptedInput::new();

    let running = PipelineBuilder::new(config(10, 300))
        .with_sink(Arc::new(sink))
        .spawn(input)
        .unwrap();
    let handle = thread::spawn(move || running.run_to_completion());

    for line in ["4", "-1", "9", "foo", "6"] {
        lines.send(line.to_string()).unwrap();
    }

    let mut seen = collect_until(&events, |seen| processed_values(seen).len() == 2);
    lines.send("exit".to_string()).unwrap();

    let report = handle.join().unwrap().unwrap();
    seen.extend(events.try_iter());

    assert_eq!(processed_values(&seen), vec![9, 6]);
    assert_eq!(report.processed, 2);

    assert!(seen.contains(&PipelineEvent::Filtered {
        filter: FilterKind::NonNegative,
        value: -1
    }));
    assert!(seen.contains(&PipelineEvent::Filtered {
        filter: FilterKind::MultipleOfThree,
        value: 4
    }));
    assert!(seen.contains(&PipelineEvent::ParseError("foo".to_string())));

    let flushes: Vec<_> = seen
        .iter()
        .filter(|e| matches!(e, PipelineEvent::Flushed { .. }))
        .collect();
    assert_eq!(flushes, vec![&PipelineEvent::Flushed { count: 2 }]);

    assert_eq!(seen.last(), Some(&PipelineEvent::Ended));
}

#[test]
fn test_window_overflow_keeps_latest_values() {
    let (sink, events) = ChannelSink::new();
    let (lines, input) = ScriptedInput::new();

    let running = PipelineBuilder::new(config(3, 300))
        .with_sink(Arc::new(sink))
        .spawn(input)
        .unwrap();
    let handle = thread::spawn(move || running.run_to_completion());

    for v in [3, 6, 9, 12, 15] {
        lines.send(v.to_string()).unwrap();
    }

    let seen = collect_until(&events, |seen| processed_values(seen).len() == 3);
    assert_eq!(processed_values(&seen), vec![9, 12, 15]);

    lines.send("EXIT".to_string()).unwrap();
    let report = handle.join().unwrap().unwrap();
    assert_eq!(report.processed, 3);
}

#[test]
fn test_invalid_tokens_do_not_stop_pipeline() {
    let (sink, events) = ChannelSink::new();
    let (lines, input) = ScriptedInput::new();

    let running = PipelineBuilder::new(config(10, 50))
        .with_sink(Arc::new(sink))
        .spawn(input)
        .unwrap();
    let handle = thread::spawn(move || running.run_to_completion());

    for line in ["abc", "1.5", "", "3"] {
        lines.send(line.to_string()).unwrap();
    }

    let seen = collect_until(&events, |seen| processed_values(seen) == vec![3]);
    let parse_errors = seen
        .iter()
        .filter(|e| matches!(e, PipelineEvent::ParseError(_)))
        .count();
    assert_eq!(parse_errors, 3);

    lines.send("exit".to_string()).unwrap();
    handle.join().unwrap().unwrap();
}

#[test]
fn test_end_of_input_shuts_down() {
    let (sink, events) = ChannelSink::new();
    let (lines, input) = ScriptedInput::new();

    let running = PipelineBuilder::new(config(10, 60_000))
        .with_sink(Arc::new(sink))
        .spawn(input)
        .unwrap();
    let handle = thread::spawn(move || running.run_to_completion());

    lines.send("3".to_string()).unwrap();
    lines.send("4".to_string()).unwrap();
    // 4 reaches the second filter only after 3 was handed to the buffer.
    collect_until(&events, |seen| {
        seen.contains(&PipelineEvent::Filtered {
            filter: FilterKind::MultipleOfThree,
            value: 4,
        })
    });
    drop(lines);

    let report = handle.join().unwrap().unwrap();
    // The interval never elapsed, so the buffered 3 is abandoned.
    assert_eq!(report.processed, 0);
    assert_eq!(report.unflushed, 1);
    assert!(events.try_iter().all(|e| e != PipelineEvent::Ended));
}

#[test]
fn test_external_cancel_while_flush_blocked() {
    let (sink, events) = ChannelSink::new();
    let (lines, input) = ScriptedInput::new();

    let running = PipelineBuilder::new(config(10, 20))
        .with_sink(Arc::new(sink))
        .spawn(input)
        .unwrap();
    let cancel = running.cancellation();

    // Nobody consumes yet, so the flush blocks on its first send.
    lines.send("3".to_string()).unwrap();
    lines.send("6".to_string()).unwrap();
    collect_until(&events, |seen| {
        seen.contains(&PipelineEvent::Flushed { count: 2 })
    });

    cancel.raise();
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let _ = done_tx.send(running.run_to_completion());
    });

    let report = done_rx
        .recv_timeout(test_timeout())
        .expect("pipeline should stop once cancelled")
        .unwrap();
    assert!(report.processed <= 2);
    assert!(report.source.is_none());
    drop(lines);
}

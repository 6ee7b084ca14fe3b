//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - No record is lost or torn when many threads share one logger
//! - Per-sink ordering holds for each producing thread
//! - Derived loggers share their sink's lock
//! - Rotation under concurrent writers

use multilog::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 200;

fn file_logger(path: &std::path::Path, pattern: &str) -> Logger {
    let options = SinkOptions::default()
        .with_level(Level::Debug)
        .with_file(path)
        .with_pattern(pattern)
        .with_rotation(100, 1, 1);
    let sink = TextFileSink::new(options).expect("Failed to create sink");
    Logger::new(vec![Arc::new(sink)])
}

/// Every line is whole and every thread's lines appear in the order written
#[test]
fn test_concurrent_writers_keep_per_thread_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");
    let logger = file_logger(&log_file, "[msg]");

    let mut handles = vec![];
    for thread_id in 0..THREADS {
        let logger = logger.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..PER_THREAD {
                logger.infof(format_args!("T{} M{}", thread_id, i));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    let mut next: HashMap<usize, usize> = HashMap::new();
    for line in lines {
        let message = line.split(' ').take(2).collect::<Vec<_>>();
        assert_eq!(message.len(), 2, "torn line: {}", line);
        let thread_id: usize = message[0].trim_start_matches('T').parse().expect("thread id");
        let index: usize = message[1].trim_start_matches('M').parse().expect("message index");
        let expected = next.entry(thread_id).or_insert(0);
        assert_eq!(index, *expected, "thread {} out of order", thread_id);
        *expected += 1;
    }
    assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);
    assert_eq!(logger.metrics().failed_count(), 0);
}

/// Derived loggers write through the same lock as their parent
#[test]
fn test_derived_loggers_share_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("derived.log");
    let logger = file_logger(&log_file, "[level] [msg]");

    let mut handles = vec![];
    for thread_id in 0..THREADS {
        let derived = logger.with_field("worker", thread_id).with_group("job");
        handles.push(std::thread::spawn(move || {
            for i in 0..PER_THREAD / 4 {
                derived.warn("step", &[attr("i", i)]);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let content = std::fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD / 4);
    assert!(lines.iter().all(|line| line.starts_with("WARN step [")), "{:?}", lines.first());
    assert!(lines.iter().all(|line| line.contains(" job.i=")));
}

/// Rotation while many threads write loses nothing
#[test]
fn test_rotation_under_concurrency() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");
    let options = SinkOptions::default()
        .with_file(&log_file)
        .with_pattern("[msg]")
        .with_rotation(1, 5, 1);
    let logger = Logger::new(vec![Arc::new(TextFileSink::new(options).expect("Failed to create sink"))]);

    let payload = "y".repeat(4096);
    let mut handles = vec![];
    for _ in 0..4 {
        let logger = logger.clone();
        let payload = payload.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..150 {
                logger.info(&payload, &[]);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let mut total = 0;
    for name in ["rotating.log", "rotating.log.1", "rotating.log.2", "rotating.log.3", "rotating.log.4", "rotating.log.5"] {
        let path = temp_dir.path().join(name);
        if path.exists() {
            let content = std::fs::read_to_string(&path).expect("Failed to read log file");
            assert!(content.lines().all(|line| line.starts_with(payload.as_str())));
            total += content.lines().count();
        }
    }
    assert!(temp_dir.path().join("rotating.log.1").exists());
    assert_eq!(total, 600);
}
